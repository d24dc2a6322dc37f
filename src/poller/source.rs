use crate::poller::PollError;
use crate::sampler::StatusRow;
use futures::future::BoxFuture;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection, Row};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn};
use tracing_futures::Instrument as _;

pub const STATUS_QUERY: &str = "SHOW GLOBAL STATUS";

/// Rows of one status query and the wall-clock time it was issued.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub rows: Vec<StatusRow>,
    pub sampled_at_millis: i64,
}

/// Anything that can produce one status snapshot per call.
pub trait StatusSource: Send {
    /// Fetch the current status rows. The snapshot is stamped once the
    /// connection is ready, right before the query is sent.
    fn fetch(&mut self) -> BoxFuture<'_, Result<StatusSnapshot, PollError>>;

    /// Release any held connection.
    fn close(&mut self) -> BoxFuture<'_, ()>;
}

/// Status source backed by a single, lazily (re)established connection.
pub struct MySqlStatusSource {
    options: MySqlConnectOptions,
    conn: Option<MySqlConnection>,
    timeout: Duration,
}

impl MySqlStatusSource {
    #[must_use]
    pub const fn new(options: MySqlConnectOptions, timeout: Duration) -> Self {
        Self {
            options,
            conn: None,
            timeout,
        }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Establish the connection now instead of on the first fetch.
    ///
    /// # Errors
    ///
    /// Returns `PollError::Connection` or `PollError::Timeout` if the server
    /// cannot be reached.
    pub async fn connect(&mut self) -> Result<(), PollError> {
        if self.conn.is_none() {
            self.conn = Some(Self::open(&self.options, self.timeout).await?);
        }
        Ok(())
    }

    async fn open(
        options: &MySqlConnectOptions,
        limit: Duration,
    ) -> Result<MySqlConnection, PollError> {
        let span = info_span!(
            "db.connect",
            db.system = "mysql",
            server.address = %options.get_host(),
            server.port = options.get_port(),
            otel.kind = "client"
        );

        let conn = timeout(limit, options.connect())
            .instrument(span)
            .await
            .map_err(|_| PollError::Timeout(limit))?
            .map_err(PollError::Connection)?;

        info!(
            host = %options.get_host(),
            port = options.get_port(),
            "connected to database"
        );

        Ok(conn)
    }

    async fn fetch_rows(&mut self) -> Result<StatusSnapshot, PollError> {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => Self::open(&self.options, self.timeout).await?,
        };

        // counters are read at query time, not when the poll started
        let sampled_at_millis = chrono::Utc::now().timestamp_millis();

        let span = info_span!(
            "db.query",
            db.system = "mysql",
            db.operation = "SHOW",
            db.statement = STATUS_QUERY,
            otel.kind = "client"
        );

        let result = timeout(
            self.timeout,
            sqlx::query(STATUS_QUERY)
                .fetch_all(&mut conn)
                .instrument(span),
        )
        .await;

        match result {
            Ok(Ok(rows)) => {
                self.conn = Some(conn);

                let rows: Vec<StatusRow> = rows
                    .into_iter()
                    .filter_map(|row| {
                        let name: Option<String> = row.try_get(0).ok();
                        let value: Option<String> = row.try_get(1).ok();
                        if name.is_none() || value.is_none() {
                            debug!(?name, "skipping status row with undecodable columns");
                        }
                        name.zip(value).map(|(n, v)| StatusRow::new(n, v))
                    })
                    .collect();

                Ok(StatusSnapshot {
                    rows,
                    sampled_at_millis,
                })
            }
            Ok(Err(e)) => {
                // server-side errors leave the session usable
                if matches!(e, sqlx::Error::Database(_)) {
                    self.conn = Some(conn);
                } else {
                    warn!(error = %e, "dropping database connection");
                }
                Err(PollError::Query(e))
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "dropping database connection after timeout");
                Err(PollError::Timeout(self.timeout))
            }
        }
    }
}

impl StatusSource for MySqlStatusSource {
    fn fetch(&mut self) -> BoxFuture<'_, Result<StatusSnapshot, PollError>> {
        Box::pin(self.fetch_rows())
    }

    fn close(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Some(conn) = self.conn.take() {
                if let Err(e) = conn.close().await {
                    warn!(error = %e, "failed to close database connection");
                } else {
                    info!("database connection closed");
                }
            }
        })
    }
}
