// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! HTTP client for an AWS Glue compatible catalog endpoint.
//!
//! Every request is passed through a [`RequestInterceptor`] before it is
//! serialized, then sent as `POST /` with `X-Amz-Target: AWSGlue.<Operation>`.
//! Listing operations are drained with [`paginate`].

use std::sync::Arc;

use futures::stream::BoxStream;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::cancel::{is_cancelled, CancellationFlag};
use crate::error::{CatalogError, CatalogResult, TransportKind};
use crate::interceptor::{RequestInterceptor, SkipArchiveInterceptor};
use crate::model::{Database, Partition, PartitionInput, Table, TableInput};
use crate::pagination::{collect_pages, paginate};
use crate::request::*;

/// Maximum number of partitions a single `BatchGetPartition` call accepts.
pub const BATCH_GET_PARTITION_MAX_KEYS: usize = 1000;

const DEFAULT_MAX_UPDATE_CONCURRENCY: usize = 8;
const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSGlue";

/// Configuration for connecting to a Glue compatible catalog.
#[derive(Debug, Clone)]
pub struct GlueCatalogConfig {
    /// Endpoint URL (e.g., `https://glue.us-east-1.amazonaws.com`).
    pub endpoint: String,
    /// Optional bearer token for authenticated access.
    pub bearer_token: Option<String>,
    /// Optional request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Catalog (account) id sent with every request; the caller's own
    /// catalog when unset.
    pub catalog_id: Option<String>,
    /// Partitions per `BatchGetPartition` call.
    pub partition_batch_size: usize,
    /// Partition statistics updates in flight at once.
    pub max_update_concurrency: usize,
    /// `MaxResults` for listing calls; service default when unset.
    pub page_size: Option<u32>,
}

impl GlueCatalogConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bearer_token: None,
            timeout_secs: None,
            catalog_id: None,
            partition_batch_size: BATCH_GET_PARTITION_MAX_KEYS,
            max_update_concurrency: DEFAULT_MAX_UPDATE_CONCURRENCY,
            page_size: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_catalog_id(mut self, catalog_id: impl Into<String>) -> Self {
        self.catalog_id = Some(catalog_id.into());
        self
    }

    /// Clamped to `1..=BATCH_GET_PARTITION_MAX_KEYS`.
    pub fn with_partition_batch_size(mut self, size: usize) -> Self {
        self.partition_batch_size = size.clamp(1, BATCH_GET_PARTITION_MAX_KEYS);
        self
    }

    pub fn with_max_update_concurrency(mut self, concurrency: usize) -> Self {
        self.max_update_concurrency = concurrency.max(1);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Glue error payload: `{"__type": "...#EntityNotFoundException", "message": "..."}`.
#[derive(Default, Deserialize)]
struct GlueErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

fn classify_error(status: StatusCode, body: &str, target: &str) -> CatalogError {
    let parsed: GlueErrorBody = serde_json::from_str(body).unwrap_or_default();
    let error_type = parsed
        .error_type
        .as_deref()
        .map(|t| t.rsplit('#').next().unwrap_or(t))
        .unwrap_or_default();
    let message = parsed.message.unwrap_or_else(|| body.to_string());

    if error_type == "EntityNotFoundException" || status == StatusCode::NOT_FOUND {
        return CatalogError::NotFound(if message.is_empty() {
            format!("{} not found", target)
        } else {
            format!("{} not found: {}", target, message)
        });
    }

    let kind = if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || error_type == "AccessDeniedException"
    {
        TransportKind::Auth
    } else if status == StatusCode::TOO_MANY_REQUESTS || error_type == "ThrottlingException" {
        TransportKind::Throttled
    } else {
        TransportKind::Connection
    };

    let detail = if error_type.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {} {}", status, error_type)
    };
    CatalogError::Transport {
        kind,
        message: format!("{} on {}: {}", detail, target, message),
    }
}

/// Glue JSON protocol client.
pub struct GlueClient {
    config: GlueCatalogConfig,
    client: Client,
    interceptor: Arc<dyn RequestInterceptor>,
    cancel: Option<CancellationFlag>,
}

impl GlueClient {
    /// Build a client that rewrites requests with [`SkipArchiveInterceptor`].
    pub fn new(config: GlueCatalogConfig) -> CatalogResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }
        let client = builder.build().map_err(|e| {
            CatalogError::connection(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            config,
            client,
            interceptor: Arc::new(SkipArchiveInterceptor),
            cancel: None,
        })
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptor = interceptor;
        self
    }

    /// Check `flag` between successive paged and batched calls.
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &GlueCatalogConfig {
        &self.config
    }

    pub fn cancellation(&self) -> Option<&CancellationFlag> {
        self.cancel.as_ref()
    }

    /// Intercept, send and decode one request.
    pub async fn execute<T: DeserializeOwned>(&self, request: CatalogRequest) -> CatalogResult<T> {
        let request = self.interceptor.rewrite(request)?;
        let operation = request.operation().to_string();
        let target = request.target();
        let body = serde_json::to_vec(&request.to_body()?).map_err(|e| {
            CatalogError::InvalidArgument(format!("cannot encode {} request: {}", operation, e))
        })?;

        tracing::debug!(
            operation = %operation,
            target = %target,
            interceptor = self.interceptor.name(),
            "dispatching catalog request"
        );

        let mut req = self
            .client
            .post(format!("{}/", self.config.endpoint))
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .header(reqwest::header::CONTENT_TYPE, AMZ_JSON_CONTENT_TYPE)
            .body(body);
        if let Some(ref token) = self.config.bearer_token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| CatalogError::connection(e.to_string()))?;
        self.handle_response(resp, &target).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        target: &str,
    ) -> CatalogResult<T> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CatalogError::connection(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_error(status, &body, target));
        }

        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        serde_json::from_str(body)
            .map_err(|e| CatalogError::InvalidResponse(format!("{}: {}", target, e)))
    }

    // ---- Databases ----

    pub async fn create_database(&self, database_input: Value) -> CatalogResult<()> {
        let _: EmptyResponse = self
            .execute(CatalogRequest::CreateDatabase(CreateDatabaseRequest {
                catalog_id: self.config.catalog_id.clone(),
                database_input,
            }))
            .await?;
        Ok(())
    }

    pub async fn delete_database(&self, name: &str) -> CatalogResult<()> {
        let _: EmptyResponse = self
            .execute(CatalogRequest::DeleteDatabase(DeleteDatabaseRequest {
                catalog_id: self.config.catalog_id.clone(),
                name: name.to_string(),
            }))
            .await?;
        Ok(())
    }

    pub async fn get_database(&self, name: &str) -> CatalogResult<Database> {
        let body: GetDatabaseResponse = self
            .execute(CatalogRequest::GetDatabase(GetDatabaseRequest {
                catalog_id: self.config.catalog_id.clone(),
                name: name.to_string(),
            }))
            .await?;
        Ok(body.database)
    }

    pub fn database_pages(&self) -> BoxStream<'_, CatalogResult<GetDatabasesResponse>> {
        let template = GetDatabasesRequest {
            catalog_id: self.config.catalog_id.clone(),
            next_token: None,
            max_results: self.config.page_size,
        };
        paginate(
            template,
            |request: &mut GetDatabasesRequest, cursor| request.next_token = cursor,
            |page: &GetDatabasesResponse| page.next_token.clone(),
            move |request| self.execute(CatalogRequest::GetDatabases(request)),
            self.cancel.clone(),
        )
    }

    pub async fn list_databases(&self) -> CatalogResult<Vec<Database>> {
        let pages = collect_pages(self.database_pages()).await?;
        Ok(pages.into_iter().flat_map(|p| p.database_list).collect())
    }

    // ---- Tables ----

    pub async fn create_table(&self, database: &str, table_input: TableInput) -> CatalogResult<()> {
        let _: EmptyResponse = self
            .execute(CatalogRequest::CreateTable(CreateTableRequest {
                catalog_id: self.config.catalog_id.clone(),
                database_name: database.to_string(),
                table_input,
            }))
            .await?;
        Ok(())
    }

    pub async fn delete_table(&self, database: &str, table: &str) -> CatalogResult<()> {
        let _: EmptyResponse = self
            .execute(CatalogRequest::DeleteTable(DeleteTableRequest {
                catalog_id: self.config.catalog_id.clone(),
                database_name: database.to_string(),
                name: table.to_string(),
            }))
            .await?;
        Ok(())
    }

    pub async fn get_table(&self, database: &str, table: &str) -> CatalogResult<Table> {
        let body: GetTableResponse = self
            .execute(CatalogRequest::GetTable(GetTableRequest {
                catalog_id: self.config.catalog_id.clone(),
                database_name: database.to_string(),
                name: table.to_string(),
            }))
            .await?;
        Ok(body.table)
    }

    pub fn table_pages(&self, database: &str) -> BoxStream<'_, CatalogResult<GetTablesResponse>> {
        let template = GetTablesRequest {
            catalog_id: self.config.catalog_id.clone(),
            database_name: database.to_string(),
            expression: None,
            next_token: None,
            max_results: self.config.page_size,
        };
        paginate(
            template,
            |request: &mut GetTablesRequest, cursor| request.next_token = cursor,
            |page: &GetTablesResponse| page.next_token.clone(),
            move |request| self.execute(CatalogRequest::GetTables(request)),
            self.cancel.clone(),
        )
    }

    pub async fn list_tables(&self, database: &str) -> CatalogResult<Vec<Table>> {
        let pages = collect_pages(self.table_pages(database)).await?;
        Ok(pages.into_iter().flat_map(|p| p.table_list).collect())
    }

    /// Update a table definition. The interceptor forces `SkipArchive`.
    pub async fn update_table(&self, database: &str, table_input: TableInput) -> CatalogResult<()> {
        let _: EmptyResponse = self
            .execute(CatalogRequest::UpdateTable(UpdateTableRequest {
                catalog_id: self.config.catalog_id.clone(),
                database_name: database.to_string(),
                table_input,
                skip_archive: None,
                version_id: None,
            }))
            .await?;
        Ok(())
    }

    // ---- Partitions ----

    pub fn partition_pages(
        &self,
        database: &str,
        table: &str,
        expression: Option<&str>,
    ) -> BoxStream<'_, CatalogResult<GetPartitionsResponse>> {
        let template = GetPartitionsRequest {
            catalog_id: self.config.catalog_id.clone(),
            database_name: database.to_string(),
            table_name: table.to_string(),
            expression: expression.map(str::to_string),
            next_token: None,
            max_results: self.config.page_size,
        };
        paginate(
            template,
            |request: &mut GetPartitionsRequest, cursor| request.next_token = cursor,
            |page: &GetPartitionsResponse| page.next_token.clone(),
            move |request| self.execute(CatalogRequest::GetPartitions(request)),
            self.cancel.clone(),
        )
    }

    pub async fn list_partitions(
        &self,
        database: &str,
        table: &str,
        expression: Option<&str>,
    ) -> CatalogResult<Vec<Partition>> {
        let pages = collect_pages(self.partition_pages(database, table, expression)).await?;
        Ok(pages.into_iter().flat_map(|p| p.partitions).collect())
    }

    /// Fetch partitions by value list in one logical call.
    ///
    /// Keys the catalog reports as unprocessed are requested again until
    /// none remain. A follow-up that processes nothing fails as throttled.
    /// Partitions that do not exist are simply absent from the result.
    pub async fn batch_get_partitions(
        &self,
        database: &str,
        table: &str,
        values: Vec<Vec<String>>,
    ) -> CatalogResult<Vec<Partition>> {
        let mut pending: Vec<PartitionValueList> = values
            .into_iter()
            .map(|values| PartitionValueList { values })
            .collect();
        let mut partitions = Vec::with_capacity(pending.len());
        let mut first = true;

        while !pending.is_empty() {
            if !first && is_cancelled(self.cancel.as_ref()) {
                return Err(CatalogError::Cancelled);
            }
            first = false;

            let requested = pending.len();
            let body: BatchGetPartitionResponse = self
                .execute(CatalogRequest::BatchGetPartition(BatchGetPartitionRequest {
                    catalog_id: self.config.catalog_id.clone(),
                    database_name: database.to_string(),
                    table_name: table.to_string(),
                    partitions_to_get: pending,
                }))
                .await?;

            partitions.extend(body.partitions);
            if body.unprocessed_keys.len() >= requested {
                return Err(CatalogError::Transport {
                    kind: TransportKind::Throttled,
                    message: format!(
                        "catalog left all {} requested partitions of '{}.{}' unprocessed",
                        requested, database, table
                    ),
                });
            }
            if !body.unprocessed_keys.is_empty() {
                tracing::debug!(
                    database,
                    table,
                    unprocessed = body.unprocessed_keys.len(),
                    "requesting unprocessed partitions again"
                );
            }
            pending = body.unprocessed_keys;
        }

        Ok(partitions)
    }

    pub async fn update_partition(
        &self,
        database: &str,
        table: &str,
        values: Vec<String>,
        partition_input: PartitionInput,
    ) -> CatalogResult<()> {
        let _: EmptyResponse = self
            .execute(CatalogRequest::UpdatePartition(UpdatePartitionRequest {
                catalog_id: self.config.catalog_id.clone(),
                database_name: database.to_string(),
                table_name: table.to_string(),
                partition_value_list: values,
                partition_input,
            }))
            .await?;
        Ok(())
    }
}
