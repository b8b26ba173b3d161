// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! [`ColumnStatisticsProvider`] backed by a [`GlueClient`].
//!
//! Statistics are stored in the `Parameters` map of tables and partitions
//! (see [`crate::parameters`]). Writes are merge-on-write: fetch the current
//! object, overlay the new column statistics, send the whole object back.
//! Table and partition writes follow the same three steps.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::cancel::is_cancelled;
use crate::error::{CatalogError, CatalogResult, EntityFailure};
use crate::glue_client::GlueClient;
use crate::model::{ColumnStatisticsMap, StatisticsUpdate, TableIdentity};
use crate::parameters::{decode_column_statistics, merge_column_statistics};
use crate::partition_name::{make_partition_name, partition_values};
use crate::statistics::ColumnStatisticsProvider;

/// Column statistics provider for AWS Glue compatible catalogs.
///
/// All remote calls go through the wrapped [`GlueClient`], so its interceptor,
/// batch size, update concurrency and cancellation flag apply here too.
pub struct GlueColumnStatisticsProvider {
    client: Arc<GlueClient>,
}

impl GlueColumnStatisticsProvider {
    pub fn new(client: Arc<GlueClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GlueClient {
        self.client.as_ref()
    }

    /// Names of all partitions of a table, in catalog order.
    pub async fn list_partition_names(
        &self,
        database: &str,
        table: &str,
    ) -> CatalogResult<Vec<String>> {
        let table_info = self.client.get_table(database, table).await?;
        let keys: Vec<String> = table_info
            .partition_keys
            .iter()
            .map(|column| column.name.clone())
            .collect();

        self.client
            .list_partitions(database, table, None)
            .await?
            .iter()
            .map(|partition| make_partition_name(&keys, &partition.values))
            .collect()
    }

    async fn update_one_partition(&self, update: &StatisticsUpdate) -> CatalogResult<()> {
        let partition = update.partition();
        let values = partition_values(&partition.partition_name)?;

        let current = self
            .client
            .batch_get_partitions(&partition.database, &partition.table, vec![values.clone()])
            .await?
            .into_iter()
            .find(|p| p.values == values)
            .ok_or_else(|| CatalogError::NotFound(format!("partition '{}'", partition)))?;

        let mut input = current.to_input();
        merge_column_statistics(&mut input.parameters, update.column_statistics())?;

        self.client
            .update_partition(&partition.database, &partition.table, values, input)
            .await
    }
}

#[async_trait]
impl ColumnStatisticsProvider for GlueColumnStatisticsProvider {
    async fn get_table_column_statistics(
        &self,
        database: &str,
        table: &str,
        column_names: &HashSet<String>,
    ) -> CatalogResult<ColumnStatisticsMap> {
        let table_info = self.client.get_table(database, table).await?;
        decode_column_statistics(&table_info.parameters, column_names)
    }

    async fn get_partition_column_statistics(
        &self,
        database: &str,
        table: &str,
        partition_names: &HashSet<String>,
        column_names: &HashSet<String>,
    ) -> CatalogResult<HashMap<String, ColumnStatisticsMap>> {
        let mut names: Vec<&String> = partition_names.iter().collect();
        names.sort();

        let mut resolved = Vec::with_capacity(names.len());
        let mut name_by_values: HashMap<Vec<String>, &String> = HashMap::new();
        for name in names {
            let values = partition_values(name)?;
            if let Some(previous) = name_by_values.insert(values.clone(), name) {
                return Err(CatalogError::InvalidArgument(format!(
                    "partition names '{}' and '{}' resolve to the same partition",
                    previous, name
                )));
            }
            resolved.push((name, values));
        }

        let batch_size = self.client.config().partition_batch_size.max(1);
        let mut statistics = HashMap::new();
        let mut succeeded = Vec::new();
        let mut failures = Vec::new();

        for (index, chunk) in resolved.chunks(batch_size).enumerate() {
            if index > 0 && is_cancelled(self.client.cancellation()) {
                return Err(CatalogError::Cancelled);
            }

            let values = chunk.iter().map(|(_, values)| values.clone()).collect();
            match self.client.batch_get_partitions(database, table, values).await {
                Ok(partitions) => {
                    let mut undecodable = HashSet::new();
                    for partition in partitions {
                        let Some(name) = name_by_values.get(&partition.values) else {
                            continue;
                        };
                        match decode_column_statistics(&partition.parameters, column_names) {
                            Ok(decoded) => {
                                statistics.insert((*name).clone(), decoded);
                            }
                            Err(error) => {
                                tracing::warn!(
                                    database,
                                    table,
                                    partition = %name,
                                    error = %error,
                                    "failed to decode partition statistics"
                                );
                                undecodable.insert(*name);
                                failures.push(EntityFailure {
                                    entity: (*name).clone(),
                                    error,
                                });
                            }
                        }
                    }
                    succeeded.extend(
                        chunk
                            .iter()
                            .filter(|(name, _)| !undecodable.contains(name))
                            .map(|(name, _)| (*name).clone()),
                    );
                }
                Err(error @ (CatalogError::UnsupportedRequestKind { .. } | CatalogError::Cancelled)) => {
                    return Err(error)
                }
                Err(error) => {
                    let entity = chunk
                        .iter()
                        .map(|(name, _)| name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    tracing::warn!(
                        database,
                        table,
                        partitions = %entity,
                        error = %error,
                        "failed to read partition statistics"
                    );
                    failures.push(EntityFailure { entity, error });
                }
            }
        }

        if failures.is_empty() {
            Ok(statistics)
        } else {
            Err(CatalogError::PartialBatchFailure {
                succeeded,
                failures,
                statistics,
            })
        }
    }

    async fn update_table_column_statistics(
        &self,
        table: &TableIdentity,
        column_statistics: &ColumnStatisticsMap,
    ) -> CatalogResult<()> {
        if column_statistics.is_empty() {
            return Ok(());
        }

        let current = self.client.get_table(&table.database, &table.table).await?;
        let mut input = current.to_input();
        merge_column_statistics(&mut input.parameters, column_statistics)?;

        self.client.update_table(&table.database, input).await
    }

    async fn update_partition_statistics(
        &self,
        updates: Vec<StatisticsUpdate>,
    ) -> CatalogResult<()> {
        let mut seen = HashSet::new();
        for update in &updates {
            if !seen.insert(update.partition()) {
                return Err(CatalogError::InvalidArgument(format!(
                    "duplicate statistics update for partition '{}'",
                    update.partition()
                )));
            }
        }

        let concurrency = self.client.config().max_update_concurrency.max(1);
        let cancel = self.client.cancellation();

        let outcomes: Vec<(String, CatalogResult<()>)> = stream::iter(updates)
            .map(|update| async move {
                let update = &update;
                let entity = update.partition().to_string();
                if is_cancelled(cancel) {
                    return (entity, Err(CatalogError::Cancelled));
                }
                let result = self.update_one_partition(update).await;
                (entity, result)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut succeeded = Vec::new();
        let mut failures = Vec::new();
        for (entity, result) in outcomes {
            match result {
                Ok(()) => succeeded.push(entity),
                Err(error) => {
                    tracing::warn!(partition = %entity, error = %error, "partition statistics update failed");
                    failures.push(EntityFailure { entity, error });
                }
            }
        }

        tracing::debug!(
            succeeded = succeeded.len(),
            failed = failures.len(),
            "applied partition statistics batch"
        );

        if failures.is_empty() {
            return Ok(());
        }
        succeeded.sort();
        failures.sort_by(|a, b| a.entity.cmp(&b.entity));
        Err(CatalogError::PartialBatchFailure {
            succeeded,
            failures,
            statistics: HashMap::new(),
        })
    }
}
