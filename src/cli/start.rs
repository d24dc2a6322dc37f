use crate::built_info;
use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;
use tracing::info;

/// Parse the command line, install logging and build the action to run.
///
/// # Errors
///
/// Returns an error if logging cannot be initialized or the configuration
/// is invalid.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(matches.get_count("verbose"))?;

    info!(
        version = built_info::PKG_VERSION,
        commit = built_info::GIT_COMMIT_HASH_SHORT.unwrap_or("unknown"),
        "starting mariadb_poller"
    );

    dispatch::handler(&matches)
}
