// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Integration tests for GlueColumnStatisticsProvider using wiremock to mock
//! the Glue JSON endpoint.

#![cfg(feature = "glue")]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use lance_graph_glue::{
    CatalogError, CatalogRequest, CancellationFlag, ColumnStatistics, ColumnStatisticsMap,
    ColumnStatisticsProvider, ErrorCategory, GlueCatalogConfig, GlueClient,
    GlueColumnStatisticsProvider, PartitionIdentity, StatisticsUpdate, TableIdentity, TableInput,
    TransportKind,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const DB: &str = "analytics";
const TABLE: &str = "events";

// ---- In-memory Glue fake ----

#[derive(Default)]
struct FakeState {
    table: Option<Value>,
    partitions: Vec<Value>,
    failing_partitions: HashSet<Vec<String>>,
    calls: Vec<(String, Value)>,
}

/// Stateful stand-in for the catalog, enough for read-modify-write cycles.
#[derive(Clone, Default)]
struct FakeGlue(Arc<Mutex<FakeState>>);

fn values_of(value: &Value) -> Vec<String> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

fn glue_error(status: u16, error_type: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "__type": error_type,
        "message": message
    }))
}

impl FakeGlue {
    fn with_table(parameters: Value) -> Self {
        let fake = FakeGlue::default();
        fake.0.lock().unwrap().table = Some(json!({
            "Name": TABLE,
            "DatabaseName": DB,
            "CreateTime": 1700000000.0,
            "VersionId": "1",
            "Owner": "etl",
            "StorageDescriptor": { "Location": "s3://bucket/events" },
            "PartitionKeys": [{ "Name": "ds", "Type": "string" }],
            "Parameters": parameters
        }));
        fake
    }

    fn add_partition(&self, value: &str, parameters: Value) {
        self.0.lock().unwrap().partitions.push(json!({
            "Values": [value],
            "DatabaseName": DB,
            "TableName": TABLE,
            "CreationTime": 1700000000.0,
            "StorageDescriptor": { "Location": format!("s3://bucket/events/ds={}", value) },
            "Parameters": parameters
        }));
    }

    fn fail_updates_for(&self, value: &str) {
        self.0
            .lock()
            .unwrap()
            .failing_partitions
            .insert(vec![value.to_string()]);
    }

    fn calls(&self, operation: &str) -> Vec<Value> {
        self.0
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(op, _)| op == operation)
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn table_parameters(&self) -> Value {
        self.0.lock().unwrap().table.as_ref().unwrap()["Parameters"].clone()
    }

    fn partition_parameters(&self, value: &str) -> Value {
        let state = self.0.lock().unwrap();
        state
            .partitions
            .iter()
            .find(|p| values_of(&p["Values"]) == vec![value.to_string()])
            .map(|p| p["Parameters"].clone())
            .unwrap()
    }

    async fn mount(&self, server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }
}

impl Respond for FakeGlue {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let operation = request
            .headers
            .get("x-amz-target")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .trim_start_matches("AWSGlue.")
            .to_string();
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);

        let mut guard = self.0.lock().unwrap();
        let state = &mut *guard;
        state.calls.push((operation.clone(), body.clone()));

        match operation.as_str() {
            "GetTable" => match &state.table {
                Some(table) => ResponseTemplate::new(200).set_body_json(json!({ "Table": table })),
                None => glue_error(400, "EntityNotFoundException", "Table not found"),
            },
            "UpdateTable" => match state.table.as_mut() {
                Some(table) => {
                    table["Parameters"] = body["TableInput"]["Parameters"].clone();
                    ResponseTemplate::new(200).set_body_json(json!({}))
                }
                None => glue_error(400, "EntityNotFoundException", "Table not found"),
            },
            "BatchGetPartition" => {
                let wanted: Vec<Vec<String>> = body["PartitionsToGet"]
                    .as_array()
                    .map(|keys| keys.iter().map(|k| values_of(&k["Values"])).collect())
                    .unwrap_or_default();
                let found: Vec<Value> = state
                    .partitions
                    .iter()
                    .filter(|p| wanted.contains(&values_of(&p["Values"])))
                    .cloned()
                    .collect();
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "Partitions": found, "UnprocessedKeys": [] }))
            }
            "UpdatePartition" => {
                let values = values_of(&body["PartitionValueList"]);
                if state.failing_partitions.contains(&values) {
                    return glue_error(500, "InternalServiceException", "Internal failure");
                }
                match state
                    .partitions
                    .iter_mut()
                    .find(|p| values_of(&p["Values"]) == values)
                {
                    Some(partition) => {
                        partition["Parameters"] = body["PartitionInput"]["Parameters"].clone();
                        ResponseTemplate::new(200).set_body_json(json!({}))
                    }
                    None => glue_error(400, "EntityNotFoundException", "Partition not found"),
                }
            }
            "GetPartitions" => {
                let page_size = body["MaxResults"].as_u64().unwrap_or(100) as usize;
                let start: usize = body["NextToken"]
                    .as_str()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(0);
                let end = (start + page_size).min(state.partitions.len());
                let mut response = json!({ "Partitions": state.partitions[start..end].to_vec() });
                if end < state.partitions.len() {
                    response["NextToken"] = json!(end.to_string());
                }
                ResponseTemplate::new(200).set_body_json(response)
            }
            other => glue_error(
                400,
                "InvalidInputException",
                &format!("unexpected operation {}", other),
            ),
        }
    }
}

// ---- Helpers ----

fn encoded(stats: &ColumnStatistics) -> String {
    serde_json::to_string(stats).unwrap()
}

fn names(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn setup_client(config: GlueCatalogConfig) -> Arc<GlueClient> {
    Arc::new(GlueClient::new(config).unwrap())
}

fn setup_provider(server: &MockServer) -> GlueColumnStatisticsProvider {
    GlueColumnStatisticsProvider::new(setup_client(GlueCatalogConfig::new(server.uri())))
}

fn partition_response(values: &[&str]) -> Value {
    let partitions: Vec<Value> = values
        .iter()
        .map(|v| {
            json!({
                "Values": [v],
                "Parameters": {
                    "column_stats.c1": encoded(&ColumnStatistics::default().with_null_count(v.len() as u64))
                }
            })
        })
        .collect();
    json!({ "Partitions": partitions })
}

// ---- get_table_column_statistics ----

#[tokio::test]
async fn test_get_table_column_statistics() {
    let server = MockServer::start().await;
    let fake = FakeGlue::with_table(json!({
        "classification": "parquet",
        "column_stats.id": encoded(&ColumnStatistics::default().with_range("1", "99").with_null_count(0)),
        "column_stats.name": encoded(&ColumnStatistics::default().with_distinct_count(7))
    }));
    fake.mount(&server).await;

    let provider = setup_provider(&server);
    let stats = provider
        .get_table_column_statistics(DB, TABLE, &names(&["id", "missing"]))
        .await
        .unwrap();

    assert_eq!(stats.len(), 1);
    assert_eq!(stats["id"].min_value.as_deref(), Some("1"));
    assert_eq!(stats["id"].max_value.as_deref(), Some("99"));
    assert_eq!(stats["id"].null_count, Some(0));
}

#[tokio::test]
async fn test_get_table_column_statistics_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("X-Amz-Target", "AWSGlue.GetTable"))
        .respond_with(glue_error(
            400,
            "com.amazonaws.glue#EntityNotFoundException",
            "Table nonexistent not found",
        ))
        .mount(&server)
        .await;

    let provider = setup_provider(&server);
    let err = provider
        .get_table_column_statistics(DB, "nonexistent", &names(&["id"]))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
    assert!(err.to_string().contains("not found"));
    assert!(err.to_string().contains("analytics.nonexistent"));
}

// ---- get_partition_column_statistics ----

#[tokio::test]
async fn test_partition_statistics_read_in_chunks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AWSGlue.BatchGetPartition"))
        .and(body_partial_json(json!({
            "DatabaseName": "d",
            "TableName": "t",
            "PartitionsToGet": [{ "Values": ["p1"] }, { "Values": ["p2"] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(partition_response(&["p1", "p2"])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AWSGlue.BatchGetPartition"))
        .and(body_partial_json(json!({
            "PartitionsToGet": [{ "Values": ["p3"] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(partition_response(&["p3"])))
        .expect(1)
        .mount(&server)
        .await;

    let config = GlueCatalogConfig::new(server.uri()).with_partition_batch_size(2);
    let provider = GlueColumnStatisticsProvider::new(setup_client(config));
    let stats = provider
        .get_partition_column_statistics(
            "d",
            "t",
            &names(&["ds=p1", "ds=p2", "ds=p3"]),
            &names(&["c1"]),
        )
        .await
        .unwrap();

    assert_eq!(stats.len(), 3);
    for name in ["ds=p1", "ds=p2", "ds=p3"] {
        assert_eq!(stats[name]["c1"].null_count, Some(2));
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unprocessed_partitions_are_requested_again() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AWSGlue.BatchGetPartition"))
        .and(body_partial_json(json!({
            "PartitionsToGet": [{ "Values": ["p1"] }, { "Values": ["p2"] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Partitions": partition_response(&["p1"])["Partitions"],
            "UnprocessedKeys": [{ "Values": ["p2"] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AWSGlue.BatchGetPartition"))
        .and(body_partial_json(json!({
            "PartitionsToGet": [{ "Values": ["p2"] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(partition_response(&["p2"])))
        .expect(1)
        .mount(&server)
        .await;

    let provider = setup_provider(&server);
    let stats = provider
        .get_partition_column_statistics(DB, TABLE, &names(&["ds=p1", "ds=p2"]), &names(&["c1"]))
        .await
        .unwrap();
    assert_eq!(stats.len(), 2);
}

#[tokio::test]
async fn test_chunk_failure_names_its_partitions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AWSGlue.BatchGetPartition"))
        .and(body_partial_json(json!({
            "PartitionsToGet": [{ "Values": ["p1"] }, { "Values": ["p2"] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(partition_response(&["p1", "p2"])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AWSGlue.BatchGetPartition"))
        .and(body_partial_json(json!({
            "PartitionsToGet": [{ "Values": ["p3"] }]
        })))
        .respond_with(glue_error(400, "ThrottlingException", "Rate exceeded"))
        .mount(&server)
        .await;

    let config = GlueCatalogConfig::new(server.uri()).with_partition_batch_size(2);
    let provider = GlueColumnStatisticsProvider::new(setup_client(config));
    let err = provider
        .get_partition_column_statistics(
            DB,
            TABLE,
            &names(&["ds=p1", "ds=p2", "ds=p3"]),
            &names(&["c1"]),
        )
        .await
        .unwrap_err();

    assert!(!err.is_total_batch_failure());
    match err {
        CatalogError::PartialBatchFailure {
            succeeded,
            failures,
            statistics,
        } => {
            assert_eq!(succeeded, vec!["ds=p1".to_string(), "ds=p2".to_string()]);
            assert_eq!(statistics.len(), 2);
            assert_eq!(statistics["ds=p1"]["c1"].null_count, Some(2));
            assert!(!statistics.contains_key("ds=p3"));
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].entity, "ds=p3");
            assert!(matches!(
                failures[0].error,
                CatalogError::Transport {
                    kind: TransportKind::Throttled,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_undecodable_partition_statistics_name_the_partition() {
    let server = MockServer::start().await;
    let fake = FakeGlue::with_table(json!({}));
    fake.add_partition(
        "p1",
        json!({ "column_stats.c1": encoded(&ColumnStatistics::default().with_null_count(3)) }),
    );
    fake.add_partition("p2", json!({ "column_stats.c1": "garbage" }));
    fake.mount(&server).await;

    let config = GlueCatalogConfig::new(server.uri()).with_partition_batch_size(1);
    let provider = GlueColumnStatisticsProvider::new(setup_client(config));
    let err = provider
        .get_partition_column_statistics(DB, TABLE, &names(&["ds=p1", "ds=p2"]), &names(&["c1"]))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Partial);
    assert!(err.to_string().contains("ds=p2"));
    match err {
        CatalogError::PartialBatchFailure {
            succeeded,
            failures,
            statistics,
        } => {
            assert_eq!(succeeded, vec!["ds=p1".to_string()]);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].entity, "ds=p2");
            assert_eq!(failures[0].error.category(), ErrorCategory::Invalid);
            assert_eq!(statistics.len(), 1);
            assert_eq!(statistics["ds=p1"]["c1"].null_count, Some(3));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fake.calls("BatchGetPartition").len(), 2);
}

#[tokio::test]
async fn test_partition_names_resolving_to_same_values_are_rejected() {
    let server = MockServer::start().await;
    let provider = setup_provider(&server);

    for aliases in [["ds=1", "ds=%31"], ["ds=1", "dt=1"]] {
        let err = provider
            .get_partition_column_statistics(DB, TABLE, &names(&aliases), &names(&["c1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
        assert!(err.to_string().contains(aliases[0]));
        assert!(err.to_string().contains(aliases[1]));
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_partition_name_is_rejected_before_sending() {
    let server = MockServer::start().await;
    let provider = setup_provider(&server);

    let err = provider
        .get_partition_column_statistics(DB, TABLE, &names(&["p1"]), &names(&["c1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidArgument(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ---- update_table_column_statistics ----

#[tokio::test]
async fn test_update_table_merges_and_skips_archive() {
    let server = MockServer::start().await;
    let old_a = ColumnStatistics::default().with_null_count(1);
    let old_b = ColumnStatistics::default().with_null_count(2);
    let fake = FakeGlue::with_table(json!({
        "classification": "parquet",
        "column_stats.a": encoded(&old_a),
        "column_stats.b": encoded(&old_b)
    }));
    fake.mount(&server).await;

    let provider = setup_provider(&server);
    let new_a = ColumnStatistics::default().with_null_count(10).with_distinct_count(3);
    let new_c = ColumnStatistics::default().with_range("a", "z");
    let update = ColumnStatisticsMap::from([
        ("a".to_string(), new_a.clone()),
        ("c".to_string(), new_c.clone()),
    ]);
    provider
        .update_table_column_statistics(&TableIdentity::new(DB, TABLE), &update)
        .await
        .unwrap();

    let updates = fake.calls("UpdateTable");
    assert_eq!(updates.len(), 1);
    let body = &updates[0];
    assert_eq!(body["SkipArchive"], true);
    assert_eq!(body["DatabaseName"], DB);
    assert_eq!(body["TableInput"]["Name"], TABLE);
    assert_eq!(body["TableInput"]["Owner"], "etl");
    assert!(body["TableInput"].get("CreateTime").is_none());
    assert!(body["TableInput"].get("VersionId").is_none());

    let parameters = fake.table_parameters();
    assert_eq!(parameters["classification"], "parquet");
    assert_eq!(parameters["column_stats.a"], encoded(&new_a));
    assert_eq!(parameters["column_stats.b"], encoded(&old_b));
    assert_eq!(parameters["column_stats.c"], encoded(&new_c));
}

#[tokio::test]
async fn test_update_table_statistics_is_idempotent() {
    let server = MockServer::start().await;
    let fake = FakeGlue::with_table(json!({ "classification": "parquet" }));
    fake.mount(&server).await;

    let provider = setup_provider(&server);
    let table = TableIdentity::new(DB, TABLE);
    let update = ColumnStatisticsMap::from([(
        "id".to_string(),
        ColumnStatistics::default().with_null_count(4),
    )]);

    provider
        .update_table_column_statistics(&table, &update)
        .await
        .unwrap();
    let once = fake.table_parameters();
    provider
        .update_table_column_statistics(&table, &update)
        .await
        .unwrap();
    assert_eq!(fake.table_parameters(), once);
}

#[tokio::test]
async fn test_update_table_request_without_flag_is_sent_with_skip_archive() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AWSGlue.UpdateTable"))
        .and(header("Content-Type", "application/x-amz-json-1.1"))
        .and(body_partial_json(json!({ "SkipArchive": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup_client(GlueCatalogConfig::new(server.uri()));
    client
        .update_table(DB, TableInput::new(TABLE))
        .await
        .unwrap();
}

// ---- update_partition_statistics ----

#[tokio::test]
async fn test_batch_update_applies_independently() {
    let server = MockServer::start().await;
    let fake = FakeGlue::with_table(json!({}));
    fake.add_partition("2024-01-01", json!({ "numRows": "10" }));
    fake.add_partition("2024-01-02", json!({}));
    fake.fail_updates_for("2024-01-02");
    fake.mount(&server).await;

    let provider = setup_provider(&server);
    let stats_a = ColumnStatistics::default().with_null_count(1);
    let updates = vec![
        StatisticsUpdate::new(
            PartitionIdentity::new(DB, TABLE, "ds=2024-01-01"),
            ColumnStatisticsMap::from([("id".to_string(), stats_a.clone())]),
        ),
        StatisticsUpdate::new(
            PartitionIdentity::new(DB, TABLE, "ds=2024-01-02"),
            ColumnStatisticsMap::from([(
                "id".to_string(),
                ColumnStatistics::default().with_null_count(2),
            )]),
        ),
    ];

    let err = provider.update_partition_statistics(updates).await.unwrap_err();
    match err {
        CatalogError::PartialBatchFailure {
            succeeded,
            failures,
            ..
        } => {
            assert_eq!(succeeded, vec!["analytics.events/ds=2024-01-01".to_string()]);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].entity, "analytics.events/ds=2024-01-02");
            assert_eq!(failures[0].error.category(), ErrorCategory::Transient);
        }
        other => panic!("unexpected error: {other}"),
    }

    let applied = fake.partition_parameters("2024-01-01");
    assert_eq!(applied["numRows"], "10");
    assert_eq!(applied["column_stats.id"], encoded(&stats_a));
    assert!(fake.partition_parameters("2024-01-02").get("column_stats.id").is_none());

    let sent = fake.calls("UpdatePartition");
    assert_eq!(sent.len(), 2);
    for body in sent {
        assert!(body["PartitionInput"].get("CreationTime").is_none());
        assert!(body["PartitionInput"]["StorageDescriptor"]["Location"].is_string());
    }
}

#[tokio::test]
async fn test_batch_update_all_succeed() {
    let server = MockServer::start().await;
    let fake = FakeGlue::with_table(json!({}));
    for day in ["2024-01-01", "2024-01-02", "2024-01-03"] {
        fake.add_partition(day, json!({}));
    }
    fake.mount(&server).await;

    let config = GlueCatalogConfig::new(server.uri()).with_max_update_concurrency(2);
    let provider = GlueColumnStatisticsProvider::new(setup_client(config));
    let updates = ["2024-01-01", "2024-01-02", "2024-01-03"]
        .iter()
        .map(|day| {
            StatisticsUpdate::new(
                PartitionIdentity::new(DB, TABLE, format!("ds={}", day)),
                ColumnStatisticsMap::from([(
                    "id".to_string(),
                    ColumnStatistics::default().with_distinct_count(5),
                )]),
            )
        })
        .collect();
    provider.update_partition_statistics(updates).await.unwrap();

    for day in ["2024-01-01", "2024-01-02", "2024-01-03"] {
        assert!(fake.partition_parameters(day)["column_stats.id"].is_string());
    }
    assert_eq!(fake.calls("UpdatePartition").len(), 3);
}

#[tokio::test]
async fn test_single_partition_update_returns_underlying_error() {
    let server = MockServer::start().await;
    let fake = FakeGlue::with_table(json!({}));
    fake.mount(&server).await;

    let provider = setup_provider(&server);
    let err = provider
        .update_single_partition_statistics(
            PartitionIdentity::new(DB, TABLE, "ds=2030-01-01"),
            ColumnStatisticsMap::from([("id".to_string(), ColumnStatistics::default())]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
    assert!(err.to_string().contains("ds=2030-01-01"));
    assert!(fake.calls("UpdatePartition").is_empty());
}

#[tokio::test]
async fn test_duplicate_partition_updates_are_rejected() {
    let server = MockServer::start().await;
    let provider = setup_provider(&server);
    let partition = PartitionIdentity::new(DB, TABLE, "ds=2024-01-01");
    let updates = vec![
        StatisticsUpdate::new(partition.clone(), HashMap::new()),
        StatisticsUpdate::new(partition, HashMap::new()),
    ];

    let err = provider.update_partition_statistics(updates).await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidArgument(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cancelled_batch_dispatches_nothing() {
    let server = MockServer::start().await;
    let fake = FakeGlue::with_table(json!({}));
    fake.add_partition("2024-01-01", json!({}));
    fake.mount(&server).await;

    let cancel = CancellationFlag::new();
    let client = GlueClient::new(GlueCatalogConfig::new(server.uri()))
        .unwrap()
        .with_cancellation(cancel.clone());
    let provider = GlueColumnStatisticsProvider::new(Arc::new(client));
    cancel.cancel();

    let err = provider
        .update_partition_statistics(vec![StatisticsUpdate::new(
            PartitionIdentity::new(DB, TABLE, "ds=2024-01-01"),
            ColumnStatisticsMap::new(),
        )])
        .await
        .unwrap_err();
    assert!(err.is_total_batch_failure());
    assert!(fake.calls("BatchGetPartition").is_empty());
}

// ---- listing ----

#[tokio::test]
async fn test_list_partition_names_follows_pages() {
    let server = MockServer::start().await;
    let fake = FakeGlue::with_table(json!({}));
    for day in ["2024-01-01", "2024-01-02", "2024-01-03"] {
        fake.add_partition(day, json!({}));
    }
    fake.mount(&server).await;

    let config = GlueCatalogConfig::new(server.uri()).with_page_size(1);
    let provider = GlueColumnStatisticsProvider::new(setup_client(config));
    let partitions = provider.list_partition_names(DB, TABLE).await.unwrap();

    assert_eq!(
        partitions,
        vec![
            "ds=2024-01-01".to_string(),
            "ds=2024-01-02".to_string(),
            "ds=2024-01-03".to_string()
        ]
    );
    let pages = fake.calls("GetPartitions");
    assert_eq!(pages.len(), 3);
    assert!(pages[0].get("NextToken").is_none());
    assert_eq!(pages[1]["NextToken"], "1");
    assert_eq!(pages[2]["NextToken"], "2");
}

#[tokio::test]
async fn test_cancelled_listing_stops_after_in_flight_page() {
    let server = MockServer::start().await;
    let fake = FakeGlue::with_table(json!({}));
    for day in ["2024-01-01", "2024-01-02"] {
        fake.add_partition(day, json!({}));
    }
    fake.mount(&server).await;

    let cancel = CancellationFlag::new();
    let client = GlueClient::new(GlueCatalogConfig::new(server.uri()).with_page_size(1))
        .unwrap()
        .with_cancellation(cancel.clone());
    cancel.cancel();

    let err = client.list_partitions(DB, TABLE, None).await.unwrap_err();
    assert!(matches!(err, CatalogError::Cancelled));
    assert_eq!(fake.calls("GetPartitions").len(), 1);
}

#[tokio::test]
async fn test_list_databases_across_pages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AWSGlue.GetDatabases"))
        .and(body_partial_json(json!({ "NextToken": "page-2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DatabaseList": [{ "Name": "staging" }]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AWSGlue.GetDatabases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DatabaseList": [{ "Name": "analytics", "Description": "Main" }],
            "NextToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup_client(GlueCatalogConfig::new(server.uri()));
    let databases = client.list_databases().await.unwrap();
    let names: Vec<&str> = databases.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["analytics", "staging"]);
    assert_eq!(databases[0].other["Description"], "Main");
}

// ---- interception and transport ----

#[tokio::test]
async fn test_unsupported_request_is_never_sent() {
    let server = MockServer::start().await;
    let client = setup_client(GlueCatalogConfig::new(server.uri()));

    let err = client
        .execute::<Value>(CatalogRequest::Unrecognized {
            operation: "DeletePartition".to_string(),
            body: json!({ "DatabaseName": DB }),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::UnsupportedRequestKind { ref operation } if operation == "DeletePartition"
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bearer_token_and_catalog_id_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("Authorization", "Bearer my-token"))
        .and(header("X-Amz-Target", "AWSGlue.GetDatabase"))
        .and(body_partial_json(json!({ "CatalogId": "123456789012", "Name": DB })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Database": { "Name": DB }
        })))
        .mount(&server)
        .await;

    let config = GlueCatalogConfig::new(server.uri())
        .with_token("my-token")
        .with_catalog_id("123456789012");
    let client = setup_client(config);
    let database = client.get_database(DB).await.unwrap();
    assert_eq!(database.name, DB);
}

#[tokio::test]
async fn test_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(glue_error(403, "AccessDeniedException", "Not authorized"))
        .mount(&server)
        .await;

    let provider = setup_provider(&server);
    let err = provider
        .get_table_column_statistics(DB, TABLE, &names(&["id"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Transport {
            kind: TransportKind::Auth,
            ..
        }
    ));
    assert!(err.to_string().contains("auth error"));
}

#[tokio::test]
async fn test_connection_error_on_bad_url() {
    let config = GlueCatalogConfig::new("http://localhost:1").with_timeout(1);
    let provider = GlueColumnStatisticsProvider::new(setup_client(config));
    let err = provider
        .get_table_column_statistics(DB, TABLE, &names(&["id"]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("connection error"));
    assert_eq!(err.category(), ErrorCategory::Transient);
}
