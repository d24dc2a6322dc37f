use anyhow::Result;
use mariadb_poller::cli::{actions, start, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let action = start::start()?;

    let result = actions::run::handle(action).await;

    telemetry::shutdown();

    result
}
