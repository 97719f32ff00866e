mod common;

use export::destination::MemoryDestination;
use export::error::ErrorKind;
use export::format::{BinaryBlockFormatter, JsonLinesFormatter};
use export::group::FieldKeyGrouper;
use export::notify::{LogNotifier, MailNotifier};
use export::pipeline::{ExportPipeline, RunState};
use export::source::MemorySource;
use export::store::{CheckpointStore, MemoryCheckpointStore};
use export::types::Checkpoint;
use export_config::shared::{
    DestinationConfig, ExportJobConfig, FormatConfig, NotificationConfig, SourceConfig,
};
use export_telemetry::tracing::init_test_tracing;
use serde_json::{json, Value};

use crate::common::{
    fast_retry, pipeline_config, CaptureTransport, FailingDestination, FailingTransport,
    PoisonFormatter,
};

fn order_records() -> Vec<Value> {
    vec![
        json!({"id": 0, "country": "US"}),
        json!({"id": 1, "country": "FR"}),
        json!({"id": 2, "country": "US"}),
        json!({"id": 3, "country": "FR"}),
    ]
}

fn notification_config() -> NotificationConfig {
    NotificationConfig {
        team_mails: vec!["team@example.com".to_string()],
        client_mails: vec!["client@example.com".to_string()],
        client_name: "Acme".to_string(),
        ..Default::default()
    }
}

fn parse_lines(artifact: &[u8]) -> Vec<Value> {
    std::str::from_utf8(artifact)
        .unwrap()
        .split('\n')
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn exports_grouped_artifacts_end_to_end() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let store = MemoryCheckpointStore::new();
    let transport = CaptureTransport::new();
    let notifier = MailNotifier::new(notification_config(), transport.clone(), fast_retry(1))
        .unwrap();

    let mut pipeline = ExportPipeline::new(
        pipeline_config(1, 10, vec!["country".to_string()]),
        MemorySource::new(order_records()),
        FieldKeyGrouper::new(vec!["country".to_string()]),
        JsonLinesFormatter::new(),
        destination.clone(),
        notifier,
        store.clone(),
    )
    .unwrap();

    pipeline.run().await.unwrap();
    assert_eq!(pipeline.state(), RunState::Finished);

    assert_eq!(
        destination.artifact_keys().await,
        vec!["export/FR/orders.jl".to_string(), "export/US/orders.jl".to_string()]
    );
    assert_eq!(
        parse_lines(&destination.artifact("export/US/orders.jl").await.unwrap()),
        vec![json!({"id": 0, "country": "US"}), json!({"id": 2, "country": "US"})]
    );
    assert_eq!(
        parse_lines(&destination.artifact("export/FR/orders.jl").await.unwrap()),
        vec![json!({"id": 1, "country": "FR"}), json!({"id": 3, "country": "FR"})]
    );

    // Start mail to the team, completion mail to team and clients.
    let sent = transport.sent().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].subject.contains("started"));
    assert!(sent[1].subject.contains("completed"));
    assert!(sent[1].body.contains("Records exported: 4."));

    let checkpoint = store.load_checkpoint(1).await.unwrap().unwrap();
    assert_eq!(checkpoint.offset("offset"), Some(4));
}

#[tokio::test]
async fn small_batches_accumulate_into_one_artifact() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let transport = CaptureTransport::new();
    let notifier = MailNotifier::new(notification_config(), transport.clone(), fast_retry(1))
        .unwrap();

    let mut pipeline = ExportPipeline::new(
        pipeline_config(1, 3, Vec::new()),
        MemorySource::new(order_records()),
        FieldKeyGrouper::new(Vec::new()),
        JsonLinesFormatter::new(),
        destination.clone(),
        notifier,
        MemoryCheckpointStore::new(),
    )
    .unwrap();

    pipeline.run().await.unwrap();

    // Two fetches (3 records, then 1) land in the same ungrouped artifact.
    assert_eq!(
        destination.artifact_keys().await,
        vec!["export/orders.jl".to_string()]
    );
    assert_eq!(
        parse_lines(&destination.artifact("export/orders.jl").await.unwrap()),
        order_records()
    );

    // The completion notification counts records across both batches.
    let sent = transport.sent().await;
    assert!(sent[1].body.contains("Records exported: 4."));
}

#[tokio::test]
async fn each_batch_iteration_is_timed_in_the_run_report() {
    init_test_tracing();

    let mut pipeline = ExportPipeline::new(
        pipeline_config(1, 3, Vec::new()),
        MemorySource::new(order_records()),
        FieldKeyGrouper::new(Vec::new()),
        JsonLinesFormatter::new(),
        MemoryDestination::new(),
        LogNotifier::new(),
        MemoryCheckpointStore::new(),
    )
    .unwrap();

    pipeline.run().await.unwrap();

    // Two fetches (3 records, then 1) each leave their own timestamped phase,
    // followed by the terminal one.
    let phases: Vec<String> = pipeline
        .stats()
        .phase_durations_ms()
        .into_iter()
        .map(|(phase, _)| phase)
        .collect();
    assert_eq!(phases, vec!["iteration 1", "iteration 2", "finished"]);
}

#[tokio::test]
async fn missing_group_fields_partition_under_unknown() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let records = vec![
        json!({"id": 0, "country": "US"}),
        json!({"id": 1}),
    ];

    let mut pipeline = ExportPipeline::new(
        pipeline_config(1, 10, vec!["country".to_string()]),
        MemorySource::new(records),
        FieldKeyGrouper::new(vec!["country".to_string()]),
        JsonLinesFormatter::new(),
        destination.clone(),
        LogNotifier::new(),
        MemoryCheckpointStore::new(),
    )
    .unwrap();

    pipeline.run().await.unwrap();

    assert_eq!(
        destination.artifact_keys().await,
        vec!["export/US/orders.jl".to_string(), "export/unknown/orders.jl".to_string()]
    );
}

#[tokio::test]
async fn format_failures_drop_only_the_failing_record() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let transport = CaptureTransport::new();
    let notifier = MailNotifier::new(notification_config(), transport.clone(), fast_retry(1))
        .unwrap();
    let records = vec![
        json!({"id": 0}),
        json!({"id": 1, "poison": true}),
        json!({"id": 2}),
    ];

    let mut pipeline = ExportPipeline::new(
        pipeline_config(1, 10, Vec::new()),
        MemorySource::new(records),
        FieldKeyGrouper::new(Vec::new()),
        PoisonFormatter::new(),
        destination.clone(),
        notifier,
        MemoryCheckpointStore::new(),
    )
    .unwrap();

    pipeline.run().await.unwrap();

    assert_eq!(
        parse_lines(&destination.artifact("export/orders.jl").await.unwrap()),
        vec![json!({"id": 0}), json!({"id": 2})]
    );

    let sent = transport.sent().await;
    assert!(sent[1].body.contains("Records exported: 2."));
}

#[tokio::test]
async fn delivery_failure_fails_the_run_before_checkpointing() {
    init_test_tracing();

    let store = MemoryCheckpointStore::new();
    let transport = CaptureTransport::new();
    let notifier = MailNotifier::new(notification_config(), transport.clone(), fast_retry(1))
        .unwrap();

    let job_config = ExportJobConfig {
        source: SourceConfig::Memory,
        destination: DestinationConfig::Fs {
            root: "/data/out".to_string(),
        },
        format: FormatConfig::JsonLines,
        notification: NotificationConfig {
            access_key: Some("super-secret-access".to_string().into()),
            ..notification_config()
        },
        pipeline: pipeline_config(1, 10, Vec::new()),
    };

    let mut pipeline = ExportPipeline::new(
        job_config.pipeline.clone(),
        MemorySource::new(order_records()),
        FieldKeyGrouper::new(Vec::new()),
        JsonLinesFormatter::new(),
        FailingDestination,
        notifier,
        store.clone(),
    )
    .unwrap();
    pipeline.set_config_snapshot(job_config.redacted_snapshot());

    let err = pipeline.run().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeliveryFailed);
    assert_eq!(pipeline.state(), RunState::Failed);

    // The batch was never delivered, so no position may be persisted.
    assert_eq!(store.load_checkpoint(1).await.unwrap(), None);

    // The failure mail renders every configuration section, credentials
    // redacted.
    let sent = transport.sent().await;
    assert!(sent[1].subject.contains("FAILED"));
    assert!(sent[1].body.contains("Configuration:"));
    assert!(sent[1].body.contains("\"source\""));
    assert!(sent[1].body.contains("\"destination\""));
    assert!(sent[1].body.contains("REDACTED"));
    assert!(!sent[1].body.contains("super-secret-access"));
}

#[tokio::test]
async fn notification_failures_never_change_the_run_outcome() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let notifier =
        MailNotifier::new(notification_config(), FailingTransport, fast_retry(2)).unwrap();

    let mut pipeline = ExportPipeline::new(
        pipeline_config(1, 10, Vec::new()),
        MemorySource::new(order_records()),
        FieldKeyGrouper::new(Vec::new()),
        JsonLinesFormatter::new(),
        destination.clone(),
        notifier,
        MemoryCheckpointStore::new(),
    )
    .unwrap();

    pipeline.run().await.unwrap();
    assert_eq!(pipeline.state(), RunState::Finished);
    assert!(destination.artifact("export/orders.jl").await.is_some());
}

#[tokio::test]
async fn shutdown_cancels_the_run_between_batches() {
    init_test_tracing();

    let mut pipeline = ExportPipeline::new(
        pipeline_config(1, 10, Vec::new()),
        MemorySource::new(order_records()),
        FieldKeyGrouper::new(Vec::new()),
        JsonLinesFormatter::new(),
        MemoryDestination::new(),
        LogNotifier::new(),
        MemoryCheckpointStore::new(),
    )
    .unwrap();

    pipeline.shutdown_tx().shutdown().unwrap();

    let err = pipeline.run().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(pipeline.state(), RunState::Failed);
}

#[tokio::test]
async fn resume_continues_from_the_stored_checkpoint() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let store = MemoryCheckpointStore::new();

    let mut resume_point = Checkpoint::new();
    resume_point.insert("offset", json!(2));
    store.store_checkpoint(1, resume_point).await.unwrap();

    let mut pipeline = ExportPipeline::new(
        pipeline_config(1, 10, Vec::new()),
        MemorySource::new(order_records()),
        FieldKeyGrouper::new(Vec::new()),
        JsonLinesFormatter::new(),
        destination.clone(),
        LogNotifier::new(),
        store,
    )
    .unwrap();

    pipeline.run().await.unwrap();

    assert_eq!(
        parse_lines(&destination.artifact("export/orders.jl").await.unwrap()),
        vec![json!({"id": 2, "country": "US"}), json!({"id": 3, "country": "FR"})]
    );
}

#[tokio::test]
async fn disabling_resume_restarts_from_the_beginning() {
    init_test_tracing();

    let destination = MemoryDestination::new();
    let store = MemoryCheckpointStore::new();

    let mut resume_point = Checkpoint::new();
    resume_point.insert("offset", json!(2));
    store.store_checkpoint(1, resume_point).await.unwrap();

    let mut config = pipeline_config(1, 10, Vec::new());
    config.resume_from_checkpoint = false;

    let mut pipeline = ExportPipeline::new(
        config,
        MemorySource::new(order_records()),
        FieldKeyGrouper::new(Vec::new()),
        JsonLinesFormatter::new(),
        destination.clone(),
        LogNotifier::new(),
        store,
    )
    .unwrap();

    pipeline.run().await.unwrap();

    assert_eq!(
        parse_lines(&destination.artifact("export/orders.jl").await.unwrap()),
        order_records()
    );
}

#[tokio::test]
async fn binary_block_artifacts_decode_after_a_run() {
    init_test_tracing();

    let destination = MemoryDestination::new();

    let mut pipeline = ExportPipeline::new(
        pipeline_config(1, 3, Vec::new()),
        MemorySource::new(order_records()),
        FieldKeyGrouper::new(Vec::new()),
        BinaryBlockFormatter::new(),
        destination.clone(),
        LogNotifier::new(),
        MemoryCheckpointStore::new(),
    )
    .unwrap();

    pipeline.run().await.unwrap();

    let artifact = destination.artifact("export/orders.bin").await.unwrap();
    let decoded = BinaryBlockFormatter::decode_blocks(&artifact).unwrap();
    assert_eq!(decoded, order_records());
}
