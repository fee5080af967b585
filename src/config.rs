use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command line and environment configuration for the relay server
#[derive(Parser, Debug, Clone)]
#[command(name = "xiangqi-relay", version, about = "Two-seat room relay for online xiangqi")]
pub struct Config {
    /// Interface to listen on
    #[arg(long, env = "RELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "RELAY_PORT", default_value_t = 9191)]
    pub port: u16,

    /// Directory with the browser client, served under /static
    #[arg(long, env = "RELAY_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Seconds between WebSocket pings sent to each client
    #[arg(long, env = "RELAY_HEARTBEAT_INTERVAL", default_value_t = 30)]
    pub heartbeat_interval: u64,

    /// Seconds of silence after which a client is dropped
    #[arg(long, env = "RELAY_CLIENT_TIMEOUT", default_value_t = 40)]
    pub client_timeout: u64,

    /// Default log filter; RUST_LOG takes precedence when set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Liveness settings handed to every session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Heartbeat {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(40),
        }
    }
}

impl Heartbeat {
    /// How often a session checks its client for silence; at most once a
    /// second, independent of the ping interval.
    pub fn check_every(&self) -> Duration {
        (self.timeout / 2).min(Duration::from_secs(1))
    }
}

impl Config {
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    pub fn heartbeat(&self) -> Heartbeat {
        let interval = Duration::from_secs(self.heartbeat_interval.max(1));
        let mut timeout = Duration::from_secs(self.client_timeout);
        // The client needs at least one full interval to answer a ping.
        if timeout <= interval {
            timeout = interval * 2;
        }
        Heartbeat { interval, timeout }
    }
}
