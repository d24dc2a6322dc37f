use crate::cli::actions::Action;
use crate::exporter::new;
use anyhow::Result;

/// Handle the run action
///
/// # Errors
///
/// Returns an error if the HTTP listener cannot be bound or metric
/// registration fails
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Run {
            port,
            listen,
            config,
        } => {
            new(port, listen, config).await?;
        }
    }

    Ok(())
}
