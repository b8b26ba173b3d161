// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Column statistics synchronization for AWS Glue compatible catalogs.
//!
//! The crate is layered leaf to root:
//!
//! - [`pagination`]: cursor-following adapter that turns paged listing calls
//!   into a lazy stream of pages
//! - [`RequestInterceptor`]: checkpoint every outbound request passes
//!   through; [`SkipArchiveInterceptor`] disables table archival on updates
//!   and rejects unknown request kinds
//! - [`ColumnStatisticsProvider`]: reads and merge-on-write updates of
//!   table and partition column statistics
//!
//! The Glue HTTP client and the provider built on it live behind the
//! `glue` feature.

pub mod cancel;
pub mod error;
pub mod interceptor;
pub mod model;
pub mod pagination;
pub mod parameters;
pub mod partition_name;
pub mod request;
pub mod statistics;
#[cfg(feature = "glue")]
pub mod glue_client;
#[cfg(feature = "glue")]
pub mod glue_statistics;

pub use cancel::CancellationFlag;
pub use error::{CatalogError, CatalogResult, EntityFailure, ErrorCategory, TransportKind};
pub use interceptor::{RequestInterceptor, SkipArchiveInterceptor};
pub use model::{
    Column, ColumnStatistics, ColumnStatisticsMap, Database, Partition, PartitionIdentity,
    PartitionInput, StatisticsUpdate, Table, TableIdentity, TableInput,
};
pub use pagination::{collect_pages, paginate};
pub use request::CatalogRequest;
pub use statistics::ColumnStatisticsProvider;

#[cfg(feature = "glue")]
pub use glue_client::{GlueCatalogConfig, GlueClient, BATCH_GET_PARTITION_MAX_KEYS};
#[cfg(feature = "glue")]
pub use glue_statistics::GlueColumnStatisticsProvider;
