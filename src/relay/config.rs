//! Relay settings, from flags or environment.

use std::net::SocketAddr;
use std::time::Duration;

use clap::builder::RangedU64ValueParser;
use clap::Parser;

/// Default cap on a single protocol line.
pub const DEFAULT_MAX_LINE: usize = 64 * 1024;

/// Default number of messages queued for one connection before it is dropped.
pub const DEFAULT_OUTBOX: usize = 256;

/// Default time a single write may stall before the connection is dropped.
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 10;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "ludo-relay", version, about = "Room relay for networked Ludo games")]
pub struct RelayConfig {
    /// Address to listen on.
    #[arg(long, env = "LUDO_RELAY_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, env = "LUDO_RELAY_LOG", default_value = "info")]
    pub log: String,

    /// Longest accepted line in bytes. Longer lines are dropped with an error.
    #[arg(long, env = "LUDO_RELAY_MAX_LINE", default_value_t = DEFAULT_MAX_LINE)]
    pub max_line: usize,

    /// Messages queued per connection. A peer that lets its queue fill is
    /// disconnected.
    #[arg(
        long,
        env = "LUDO_RELAY_OUTBOX",
        default_value_t = DEFAULT_OUTBOX,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..),
    )]
    pub outbox: usize,

    /// Seconds a write to a peer may block before the peer is disconnected.
    #[arg(
        long,
        env = "LUDO_RELAY_WRITE_TIMEOUT",
        default_value_t = DEFAULT_WRITE_TIMEOUT_SECS,
        value_parser = RangedU64ValueParser::<u64>::new().range(1..),
    )]
    pub write_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log: "info".to_string(),
            max_line: DEFAULT_MAX_LINE,
            outbox: DEFAULT_OUTBOX,
            write_timeout_secs: DEFAULT_WRITE_TIMEOUT_SECS,
        }
    }
}

impl RelayConfig {
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    #[must_use]
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line;
        self
    }

    /// Queue capacity per connection, at least one.
    #[must_use]
    pub fn with_outbox(mut self, outbox: usize) -> Self {
        self.outbox = outbox.max(1);
        self
    }

    #[must_use]
    pub fn with_write_timeout_secs(mut self, secs: u64) -> Self {
        self.write_timeout_secs = secs.max(1);
        self
    }

    #[must_use]
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = RelayConfig::try_parse_from([
            "ludo-relay",
            "--bind",
            "127.0.0.1:4000",
            "--max-line",
            "128",
        ])
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:4000".parse().unwrap());
        assert_eq!(config.max_line, 128);
        assert_eq!(config.outbox, DEFAULT_OUTBOX);
    }

    #[test]
    fn test_outbox_and_write_timeout_flags() {
        let config = RelayConfig::try_parse_from([
            "ludo-relay",
            "--outbox",
            "8",
            "--write-timeout-secs",
            "2",
        ])
        .unwrap();

        assert_eq!(config.outbox, 8);
        assert_eq!(config.write_timeout(), Duration::from_secs(2));
        assert!(RelayConfig::try_parse_from(["ludo-relay", "--outbox", "0"]).is_err());
    }

    #[test]
    fn test_bad_bind_rejected() {
        let result = RelayConfig::try_parse_from(["ludo-relay", "--bind", "not-an-address"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_builders() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let config = RelayConfig::default().with_bind(addr).with_max_line(10);
        assert_eq!(config.bind, addr);
        assert_eq!(config.max_line, 10);
        assert_eq!(config.log, "info");
        assert_eq!(RelayConfig::default().with_outbox(0).outbox, 1);
    }
}
