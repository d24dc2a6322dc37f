//! Process wiring: metric registry, poll loop task and the HTTP endpoint
//! exposing `/metrics` and `/health`.

use crate::{
    config::{PollerConfig, dsn},
    poller::{MySqlStatusSource, PollStats, Poller},
    sampler::Sampler,
    sink::{config::SinkConfig, registry::SinkRegistry},
};
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::{Encoder, Registry, TEXT_FORMAT, TextEncoder};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::{net::TcpListener, sync::watch};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use ulid::Ulid;

#[derive(Clone, Copy, Default)]
struct MakeRequestUlid;

impl MakeRequestId for MakeRequestUlid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Ulid::new().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Start the poll loop and serve `/metrics` and `/health` until Ctrl-C or
/// SIGTERM.
///
/// # Errors
///
/// Returns an error if the listen address is invalid, the port cannot be
/// bound or metric registration fails.
pub async fn new(port: u16, listen: Option<String>, config: PollerConfig) -> Result<()> {
    let listener = bind(port, listen.as_deref()).await?;

    let registry = Registry::new();

    let sinks = SinkRegistry::new(&SinkConfig::new().with_enabled(&config.sinks));
    if sinks.is_empty() {
        warn!("no sinks enabled, derived metrics will be discarded");
    }
    sinks.register_metrics(&registry)?;

    let stats = PollStats::new();
    stats.register(&registry)?;

    let options = dsn::connect_options(&config.dsn)?;
    let mut source = MySqlStatusSource::new(options, config.query_timeout);
    let sampler = Sampler::new(config.enabled);
    let prefix = config.prefix;
    let interval = config.interval;

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let poller = tokio::spawn(async move {
        if let Err(e) = source.connect().await {
            warn!(error = %e, "initial database connection failed, retrying on next poll");
        }

        Poller::new(source, sampler, sinks)
            .with_prefix(prefix)
            .with_stats(stats)
            .run(interval, async move {
                let _ = shutdown_rx.changed().await;
            })
            .await;
    });

    info!(
        address = %listener.local_addr()?,
        "listening for metrics requests"
    );

    let served = axum::serve(listener, router(registry))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = poller.await {
        error!(error = %e, "poller task failed");
    }

    served.context("HTTP server error")
}

/// Routes with request-id and trace layers.
#[must_use]
pub fn router(registry: Registry) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUlid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(registry)
}

async fn metrics(State(registry): State<Registry>) -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&registry.gather(), &mut buffer) {
        Ok(()) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], buffer).into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn bind(port: u16, listen: Option<&str>) -> Result<TcpListener> {
    if let Some(ip) = listen {
        let ip: IpAddr = ip
            .trim()
            .parse()
            .with_context(|| format!("invalid listen address {ip:?}"))?;
        let addr = SocketAddr::new(ip, port);
        return TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"));
    }

    // dual stack when available
    let v6 = SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port);
    match TcpListener::bind(v6).await {
        Ok(listener) => Ok(listener),
        Err(e) => {
            warn!(error = %e, "IPv6 unavailable, falling back to 0.0.0.0");
            let v4 = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
            TcpListener::bind(v4)
                .await
                .with_context(|| format!("failed to bind {v4}"))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
