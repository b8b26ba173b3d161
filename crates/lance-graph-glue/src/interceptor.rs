// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Request interception applied to every call before it leaves the process.

use crate::error::{CatalogError, CatalogResult};
use crate::request::{CatalogRequest, UpdateTableRequest};

/// Inspects, rewrites or rejects an outbound request.
///
/// Implementations must be pure: no I/O, no retries. An error aborts the
/// enclosing operation before anything is sent.
pub trait RequestInterceptor: Send + Sync {
    /// Human-readable name of this interceptor (e.g., "skip-archive").
    fn name(&self) -> &str;

    fn rewrite(&self, request: CatalogRequest) -> CatalogResult<CatalogRequest>;
}

/// Forces `SkipArchive` on every table update and rejects any request kind
/// it does not explicitly know.
///
/// Glue archives the previous table definition on each `UpdateTable` unless
/// told otherwise; this client assumes no such history exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipArchiveInterceptor;

impl RequestInterceptor for SkipArchiveInterceptor {
    fn name(&self) -> &str {
        "skip-archive"
    }

    fn rewrite(&self, request: CatalogRequest) -> CatalogResult<CatalogRequest> {
        match request {
            CatalogRequest::UpdateTable(update) => {
                if update.skip_archive != Some(true) {
                    tracing::debug!(
                        database = %update.database_name,
                        table = %update.table_input.name,
                        "forcing SkipArchive on UpdateTable"
                    );
                }
                Ok(CatalogRequest::UpdateTable(UpdateTableRequest {
                    skip_archive: Some(true),
                    ..update
                }))
            }

            request @ (CatalogRequest::CreateDatabase(_)
            | CatalogRequest::DeleteDatabase(_)
            | CatalogRequest::GetDatabase(_)
            | CatalogRequest::GetDatabases(_)
            | CatalogRequest::CreateTable(_)
            | CatalogRequest::DeleteTable(_)
            | CatalogRequest::GetTable(_)
            | CatalogRequest::GetTables(_)
            | CatalogRequest::GetPartitions(_)
            | CatalogRequest::BatchGetPartition(_)
            // Partition statistics are written through UpdatePartition.
            | CatalogRequest::UpdatePartition(_)) => Ok(request),

            CatalogRequest::Unrecognized { operation, .. } => {
                Err(CatalogError::UnsupportedRequestKind { operation })
            }
        }
    }
}
