pub mod cli;
pub mod config;
pub mod exporter;
pub mod poller;
pub mod sampler;
pub mod sink;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
