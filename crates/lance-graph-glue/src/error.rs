// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Error types shared by the interceptor, the pagination adapter and the
//! statistics provider.

use std::collections::HashMap;
use std::fmt;

use crate::model::ColumnStatisticsMap;

/// Which part of the transport failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Network failure or an unexpected HTTP status.
    Connection,
    /// The catalog throttled the request.
    Throttled,
    /// Authentication or authorization failure.
    Auth,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "connection"),
            Self::Throttled => write!(f, "throttled"),
            Self::Auth => write!(f, "auth"),
        }
    }
}

/// Coarse cause category of a [`CatalogError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Transient,
    Rejected,
    Invalid,
    Partial,
    Cancelled,
}

/// A single entity (table or partition) that failed inside a batch.
#[derive(Debug)]
pub struct EntityFailure {
    pub entity: String,
    pub error: CatalogError,
}

/// Errors that can occur while talking to the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Referenced database, table or partition is absent from the catalog.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The interceptor saw a request kind that is not on its allow-list.
    #[error("Unsupported request kind: {operation}")]
    UnsupportedRequestKind { operation: String },

    /// Remote call failed; retry policy belongs to the caller.
    #[error("Catalog {kind} error: {message}")]
    Transport { kind: TransportKind, message: String },

    /// Invalid or unparsable response from the catalog server.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Caller supplied an argument the catalog cannot represent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Some entities of a batch failed. Successful entities are not rolled back.
    ///
    /// `statistics` holds what a partial read did manage to decode, keyed by
    /// partition name. It is empty for writes.
    #[error("{}", describe_batch(.succeeded, .failures))]
    PartialBatchFailure {
        succeeded: Vec<String>,
        failures: Vec<EntityFailure>,
        statistics: HashMap<String, ColumnStatisticsMap>,
    },

    /// The operation was cancelled between remote calls.
    #[error("Operation cancelled")]
    Cancelled,
}

fn describe_batch(succeeded: &[String], failures: &[EntityFailure]) -> String {
    let failed = failures
        .iter()
        .map(|f| format!("{} ({})", f.entity, f.error))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Batch failed for {} of {} entities: {}",
        failures.len(),
        failures.len() + succeeded.len(),
        failed
    )
}

impl CatalogError {
    pub(crate) fn connection(message: impl Into<String>) -> Self {
        Self::Transport {
            kind: TransportKind::Connection,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Transport { .. } => ErrorCategory::Transient,
            Self::UnsupportedRequestKind { .. } => ErrorCategory::Rejected,
            Self::InvalidResponse(_) | Self::InvalidArgument(_) => ErrorCategory::Invalid,
            Self::PartialBatchFailure { .. } => ErrorCategory::Partial,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// True when a batch failed for every entity it contained.
    pub fn is_total_batch_failure(&self) -> bool {
        matches!(self, Self::PartialBatchFailure { succeeded, .. } if succeeded.is_empty())
    }
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
