pub mod run;

use crate::config::PollerConfig;

#[derive(Debug)]
pub enum Action {
    Run {
        port: u16,
        listen: Option<String>,
        config: PollerConfig,
    },
}
