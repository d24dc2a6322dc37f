use anyhow::Result;
use mariadb_poller::config::dsn;
use mariadb_poller::poller::MySqlStatusSource;
use nix::unistd::geteuid;
use secrecy::SecretString;
use std::env;
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;

/// DSN of a live server, if the environment provides one
#[allow(dead_code)]
pub fn get_test_dsn() -> Option<String> {
    env::var("MARIADB_POLLER_DSN")
        .ok()
        .filter(|dsn| !dsn.trim().is_empty())
}

/// Status source for `dsn`, connected eagerly so tests fail fast
#[allow(dead_code)]
pub async fn connected_source(dsn: &str) -> Result<MySqlStatusSource> {
    let options = dsn::connect_options(&SecretString::from(dsn.to_string()))?;
    let mut source = MySqlStatusSource::new(options, Duration::from_secs(20));
    source.connect().await?;
    Ok(source)
}

/// Get an available port for testing
#[allow(dead_code)]
pub fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to ephemeral port")
        .local_addr()
        .expect("Failed to get local address")
        .port()
}

/// Build test URL for HTTP requests
#[allow(dead_code)]
pub fn get_test_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}")
}

/// Wait for server to be ready
#[allow(dead_code)]
pub async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    for _ in 0..max_attempts {
        if tokio::net::TcpStream::connect(format!("127.0.0.1:{port}"))
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(100)).await;
    }
    false
}

fn socket_exists(host: &str) -> bool {
    host.strip_prefix("unix://")
        .is_none_or(|path| Path::new(path).exists())
}

/// Podman or Docker socket, honoring `DOCKER_HOST`
#[allow(dead_code)]
pub fn find_container_runtime() -> Option<String> {
    if let Ok(existing) = env::var("DOCKER_HOST")
        && !existing.is_empty()
        && socket_exists(&existing)
    {
        return Some(existing);
    }

    let uid = geteuid().as_raw();
    let candidates = [
        format!("unix:///run/user/{uid}/podman/podman.sock"),
        "unix:///run/podman/podman.sock".to_string(),
        "unix:///var/run/podman/podman.sock".to_string(),
        "unix:///var/run/docker.sock".to_string(),
    ];

    candidates.into_iter().find(|c| socket_exists(c))
}
