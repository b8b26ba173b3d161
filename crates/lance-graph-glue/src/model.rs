// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Catalog data types: column statistics, identities of tables and
//! partitions, and the Glue metadata objects statistics are attached to.
//!
//! Glue objects carry many fields this crate never interprets (storage
//! descriptors, view text, owners). Those are kept verbatim in `other` so a
//! read-modify-write cycle sends them back unchanged.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Statistics of a single column.
///
/// The payload is opaque to the synchronization logic; it is stored as JSON
/// in the owning table's or partition's parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStatistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_count: Option<u64>,
}

impl ColumnStatistics {
    pub fn with_range(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.min_value = Some(min.into());
        self.max_value = Some(max.into());
        self
    }

    pub fn with_null_count(mut self, count: u64) -> Self {
        self.null_count = Some(count);
        self
    }

    pub fn with_distinct_count(mut self, count: u64) -> Self {
        self.distinct_count = Some(count);
        self
    }
}

/// Column name to statistics.
pub type ColumnStatisticsMap = HashMap<String, ColumnStatistics>;

/// Identity of a table: database and table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdentity {
    pub database: String,
    pub table: String,
}

impl TableIdentity {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.table)
    }
}

/// Identity of a partition. `partition_name` is Hive style (`ds=2024-01-01/region=us`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionIdentity {
    pub database: String,
    pub table: String,
    pub partition_name: String,
}

impl PartitionIdentity {
    pub fn new(
        database: impl Into<String>,
        table: impl Into<String>,
        partition_name: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            partition_name: partition_name.into(),
        }
    }
}

impl fmt::Display for PartitionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}/{}", self.database, self.table, self.partition_name)
    }
}

/// New column statistics for one partition.
///
/// Takes ownership of the statistics map on construction; there is no way
/// to mutate it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsUpdate {
    partition: PartitionIdentity,
    column_statistics: ColumnStatisticsMap,
}

impl StatisticsUpdate {
    pub fn new(partition: PartitionIdentity, column_statistics: ColumnStatisticsMap) -> Self {
        Self {
            partition,
            column_statistics,
        }
    }

    pub fn partition(&self) -> &PartitionIdentity {
        &self.partition
    }

    pub fn column_statistics(&self) -> &ColumnStatisticsMap {
        &self.column_statistics
    }
}

/// A column definition as the catalog returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Column {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Database {
    pub name: String,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Table metadata as returned by `GetTable` / `GetTables`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Table {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partition_keys: Vec<Column>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Fields of a `Table` that `TableInput` accepts besides name, partition
/// keys and parameters. Everything else is read-only on the catalog side.
const TABLE_INPUT_FIELDS: &[&str] = &[
    "Description",
    "Owner",
    "LastAccessTime",
    "LastAnalyzedTime",
    "Retention",
    "StorageDescriptor",
    "ViewOriginalText",
    "ViewExpandedText",
    "TableType",
    "TargetTable",
    "ViewDefinition",
];

impl Table {
    /// Convert to the writable form used by `CreateTable` / `UpdateTable`.
    pub fn to_input(&self) -> TableInput {
        TableInput {
            name: self.name.clone(),
            partition_keys: self.partition_keys.clone(),
            parameters: self.parameters.clone(),
            other: retain_fields(&self.other, TABLE_INPUT_FIELDS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partition_keys: Vec<Column>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl TableInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_keys: Vec::new(),
            parameters: HashMap::new(),
            other: Map::new(),
        }
    }
}

/// Partition metadata as returned by `GetPartitions` / `BatchGetPartition`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Partition {
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

const PARTITION_INPUT_FIELDS: &[&str] = &["LastAccessTime", "StorageDescriptor", "LastAnalyzedTime"];

impl Partition {
    pub fn to_input(&self) -> PartitionInput {
        PartitionInput {
            values: self.values.clone(),
            parameters: self.parameters.clone(),
            other: retain_fields(&self.other, PARTITION_INPUT_FIELDS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PartitionInput {
    pub values: Vec<String>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

fn retain_fields(source: &Map<String, Value>, allowed: &[&str]) -> Map<String, Value> {
    source
        .iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
