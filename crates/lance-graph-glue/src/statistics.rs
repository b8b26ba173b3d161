// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Column statistics provider trait.
//!
//! Callers see whole-table and whole-partition-set operations; paging,
//! chunking and per-partition writes stay inside the implementation.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{ColumnStatisticsMap, PartitionIdentity, StatisticsUpdate, TableIdentity};

/// Reads and writes column statistics kept in an external catalog.
#[async_trait]
pub trait ColumnStatisticsProvider: Send + Sync {
    /// Statistics of the requested columns of a table. Columns without
    /// stored statistics are omitted.
    async fn get_table_column_statistics(
        &self,
        database: &str,
        table: &str,
        column_names: &HashSet<String>,
    ) -> CatalogResult<ColumnStatisticsMap>;

    /// Statistics of the requested columns for each named partition.
    ///
    /// Partitions missing from the catalog are omitted. A failing remote
    /// call is reported against every partition name it covered, and
    /// undecodable statistics against their own partition, as
    /// [`CatalogError::PartialBatchFailure`]. The error still carries the
    /// statistics that were read.
    async fn get_partition_column_statistics(
        &self,
        database: &str,
        table: &str,
        partition_names: &HashSet<String>,
        column_names: &HashSet<String>,
    ) -> CatalogResult<HashMap<String, ColumnStatisticsMap>>;

    /// Merge `column_statistics` over the table's stored statistics and
    /// write the result back with a single table update.
    async fn update_table_column_statistics(
        &self,
        table: &TableIdentity,
        column_statistics: &ColumnStatisticsMap,
    ) -> CatalogResult<()>;

    /// Apply a batch of partition updates.
    ///
    /// Each update is an independent merge-on-write against its own
    /// partition. There is no rollback: when some partitions fail, the rest
    /// stay applied and the error is a [`CatalogError::PartialBatchFailure`]
    /// listing both sides. Two updates for the same partition are rejected
    /// up front with [`CatalogError::InvalidArgument`].
    async fn update_partition_statistics(
        &self,
        updates: Vec<StatisticsUpdate>,
    ) -> CatalogResult<()>;

    /// Single-partition form of [`Self::update_partition_statistics`].
    ///
    /// A failure is returned as the underlying error rather than a batch
    /// failure.
    async fn update_single_partition_statistics(
        &self,
        partition: PartitionIdentity,
        column_statistics: ColumnStatisticsMap,
    ) -> CatalogResult<()> {
        let update = StatisticsUpdate::new(partition, column_statistics);
        match self.update_partition_statistics(vec![update]).await {
            Err(CatalogError::PartialBatchFailure { mut failures, .. }) if failures.len() == 1 => {
                Err(failures.remove(0).error)
            }
            other => other,
        }
    }
}
