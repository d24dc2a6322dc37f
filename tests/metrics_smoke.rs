#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use mariadb_poller::poller::{Poller, StatusSource};
use mariadb_poller::sampler::{EnabledMetrics, MetricValue, Sampler};
use mariadb_poller::sink::{config::SinkConfig, registry::SinkRegistry};
use prometheus::Registry;
use std::time::Duration;

mod common;

#[tokio::test]
async fn status_snapshot_has_rate_sources() -> anyhow::Result<()> {
    let Some(dsn) = common::get_test_dsn() else {
        eprintln!("MARIADB_POLLER_DSN not set, skipping live status smoke test");
        return Ok(());
    };

    let mut source = common::connected_source(&dsn).await?;
    let before = chrono::Utc::now().timestamp_millis();
    let snapshot = source.fetch().await?;
    let rows = snapshot.rows;
    assert!(snapshot.sampled_at_millis >= before);

    for field in [
        "queries",
        "bytes_received",
        "bytes_sent",
        "innodb_data_reads",
        "innodb_data_writes",
        "innodb_buffer_pool_pages_data",
        "innodb_buffer_pool_pages_total",
    ] {
        assert!(
            rows.iter().any(|row| row.name == field),
            "SHOW GLOBAL STATUS should report {field}"
        );
    }

    source.close().await;
    Ok(())
}

#[tokio::test]
async fn prometheus_sink_publishes_live_rates() -> anyhow::Result<()> {
    let Some(dsn) = common::get_test_dsn() else {
        eprintln!("MARIADB_POLLER_DSN not set, skipping live prometheus smoke test");
        return Ok(());
    };

    let registry = Registry::new();
    let sinks = SinkRegistry::new(&SinkConfig::new().with_enabled(&["prometheus".to_string()]));
    sinks.register_metrics(&registry)?;

    let source = common::connected_source(&dsn).await?;
    let enabled = EnabledMetrics::new()
        .with("queries_per_second")
        .with("traffic_out")
        .with("Threads_connected");
    let mut poller = Poller::new(source, Sampler::new(enabled), sinks).with_prefix("smoke");

    poller.poll().await?;
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let out = poller.poll().await?;

    assert!(matches!(
        out.get("smoke_threads_connected"),
        Some(MetricValue::Int(n)) if *n >= 1
    ));

    let family = registry
        .gather()
        .into_iter()
        .find(|m| m.name() == "mariadb_poller_metric")
        .expect("prometheus sink should publish its gauge family");

    let names: Vec<String> = family
        .get_metric()
        .iter()
        .flat_map(|m| m.get_label().iter().map(|l| l.value().to_string()))
        .collect();

    assert!(names.contains(&"smoke_queries_per_second".to_string()));
    assert!(names.contains(&"smoke_traffic_out".to_string()));
    assert!(names.contains(&"smoke_threads_connected".to_string()));

    Ok(())
}
