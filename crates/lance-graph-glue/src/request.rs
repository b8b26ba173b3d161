// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Outbound catalog requests and the responses this crate reads.
//!
//! [`CatalogRequest`] has one variant per Glue operation the client knows
//! about. Anything else travels as [`CatalogRequest::Unrecognized`], which
//! the interceptor always rejects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{Database, Partition, PartitionInput, Table, TableInput};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDatabaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    pub database_input: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteDatabaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetDatabaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetDatabasesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTableRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    pub database_name: String,
    pub table_input: TableInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteTableRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    pub database_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetTableRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    pub database_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetTablesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    pub database_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetPartitionsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    pub database_name: String,
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PartitionValueList {
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchGetPartitionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    pub database_name: String,
    pub table_name: String,
    pub partitions_to_get: Vec<PartitionValueList>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateTableRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    pub database_name: String,
    pub table_input: TableInput,
    /// When true the catalog does not archive the previous table version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_archive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdatePartitionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    pub database_name: String,
    pub table_name: String,
    pub partition_value_list: Vec<String>,
    pub partition_input: PartitionInput,
}

/// An outbound catalog operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRequest {
    CreateDatabase(CreateDatabaseRequest),
    DeleteDatabase(DeleteDatabaseRequest),
    GetDatabase(GetDatabaseRequest),
    GetDatabases(GetDatabasesRequest),
    CreateTable(CreateTableRequest),
    DeleteTable(DeleteTableRequest),
    GetTable(GetTableRequest),
    GetTables(GetTablesRequest),
    GetPartitions(GetPartitionsRequest),
    BatchGetPartition(BatchGetPartitionRequest),
    UpdateTable(UpdateTableRequest),
    UpdatePartition(UpdatePartitionRequest),
    /// Any operation without a dedicated variant.
    Unrecognized { operation: String, body: Value },
}

impl CatalogRequest {
    /// Glue operation name, as sent in `X-Amz-Target`.
    pub fn operation(&self) -> &str {
        match self {
            Self::CreateDatabase(_) => "CreateDatabase",
            Self::DeleteDatabase(_) => "DeleteDatabase",
            Self::GetDatabase(_) => "GetDatabase",
            Self::GetDatabases(_) => "GetDatabases",
            Self::CreateTable(_) => "CreateTable",
            Self::DeleteTable(_) => "DeleteTable",
            Self::GetTable(_) => "GetTable",
            Self::GetTables(_) => "GetTables",
            Self::GetPartitions(_) => "GetPartitions",
            Self::BatchGetPartition(_) => "BatchGetPartition",
            Self::UpdateTable(_) => "UpdateTable",
            Self::UpdatePartition(_) => "UpdatePartition",
            Self::Unrecognized { operation, .. } => operation,
        }
    }

    /// Human readable name of the entity the request targets, used in errors.
    pub fn target(&self) -> String {
        match self {
            Self::CreateDatabase(r) => match r.database_input.get("Name").and_then(Value::as_str) {
                Some(name) => format!("database '{}'", name),
                None => "database".to_string(),
            },
            Self::DeleteDatabase(r) => format!("database '{}'", r.name),
            Self::GetDatabase(r) => format!("database '{}'", r.name),
            Self::GetDatabases(_) => "databases".to_string(),
            Self::CreateTable(r) => format!("table '{}.{}'", r.database_name, r.table_input.name),
            Self::DeleteTable(r) => format!("table '{}.{}'", r.database_name, r.name),
            Self::GetTable(r) => format!("table '{}.{}'", r.database_name, r.name),
            Self::GetTables(r) => format!("tables in '{}'", r.database_name),
            Self::GetPartitions(r) => {
                format!("partitions of '{}.{}'", r.database_name, r.table_name)
            }
            Self::BatchGetPartition(r) => {
                format!("partitions of '{}.{}'", r.database_name, r.table_name)
            }
            Self::UpdateTable(r) => format!("table '{}.{}'", r.database_name, r.table_input.name),
            Self::UpdatePartition(r) => format!(
                "partition {:?} of '{}.{}'",
                r.partition_value_list, r.database_name, r.table_name
            ),
            Self::Unrecognized { operation, .. } => format!("{} target", operation),
        }
    }

    /// JSON body sent on the wire.
    pub fn to_body(&self) -> CatalogResult<Value> {
        let body = match self {
            Self::CreateDatabase(r) => serde_json::to_value(r),
            Self::DeleteDatabase(r) => serde_json::to_value(r),
            Self::GetDatabase(r) => serde_json::to_value(r),
            Self::GetDatabases(r) => serde_json::to_value(r),
            Self::CreateTable(r) => serde_json::to_value(r),
            Self::DeleteTable(r) => serde_json::to_value(r),
            Self::GetTable(r) => serde_json::to_value(r),
            Self::GetTables(r) => serde_json::to_value(r),
            Self::GetPartitions(r) => serde_json::to_value(r),
            Self::BatchGetPartition(r) => serde_json::to_value(r),
            Self::UpdateTable(r) => serde_json::to_value(r),
            Self::UpdatePartition(r) => serde_json::to_value(r),
            Self::Unrecognized { body, .. } => Ok(body.clone()),
        };
        body.map_err(|e| {
            CatalogError::InvalidArgument(format!(
                "cannot encode {} request: {}",
                self.operation(),
                e
            ))
        })
    }
}

// ---- Responses ----

/// Response of operations whose body this crate ignores.
#[derive(Debug, Default, Deserialize)]
pub struct EmptyResponse {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetDatabaseResponse {
    pub database: Database,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetDatabasesResponse {
    #[serde(default)]
    pub database_list: Vec<Database>,
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetTableResponse {
    pub table: Table,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetTablesResponse {
    #[serde(default)]
    pub table_list: Vec<Table>,
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetPartitionsResponse {
    #[serde(default)]
    pub partitions: Vec<Partition>,
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchGetPartitionResponse {
    #[serde(default)]
    pub partitions: Vec<Partition>,
    #[serde(default)]
    pub unprocessed_keys: Vec<PartitionValueList>,
}
