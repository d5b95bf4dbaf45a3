pub mod repositories;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::repositories::FileRepository;

/// Minimal HTTP/1.1 server that echoes request data and serves a directory.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct ServerConfig {
    /// Directory `/files/<name>` is read from and written to
    #[arg(long, default_value = ".")]
    pub directory: PathBuf,

    /// Address to listen on when no socket is inherited through `LISTEN_FDS`
    #[arg(long, default_value = "0.0.0.0:4221")]
    pub address: String,

    /// Largest request, head and body together, that will be buffered
    #[arg(long, default_value_t = 1024 * 1024)]
    pub max_request_bytes: usize,

    /// Seconds a single socket read may wait for the peer
    #[arg(long, default_value_t = 10)]
    pub read_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            address: "0.0.0.0:4221".to_string(),
            max_request_bytes: 1024 * 1024,
            read_timeout_secs: 10,
        }
    }
}

/// Everything a connection task needs. Cheap to clone, never mutated after startup.
#[derive(Clone, Debug)]
pub struct ServerData {
    pub files: FileRepository,
    pub max_request_bytes: usize,
    pub read_timeout: Duration,
}

impl From<&ServerConfig> for ServerData {
    fn from(config: &ServerConfig) -> Self {
        Self {
            files: FileRepository::new(&config.directory),
            max_request_bytes: config.max_request_bytes,
            read_timeout: Duration::from_secs(config.read_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_parse_arguments() {
        let config = ServerConfig::parse_from([
            "raw-http-server",
            "--directory",
            "/tmp/served",
            "--read-timeout-secs",
            "3",
        ]);
        assert_eq!(config.directory, PathBuf::from("/tmp/served"));
        assert_eq!(config.address, "0.0.0.0:4221");

        let data = ServerData::from(&config);
        assert_eq!(data.read_timeout, Duration::from_secs(3));
        assert_eq!(data.max_request_bytes, 1024 * 1024);
    }

    #[test]
    fn success_defaults_match_cli_defaults() {
        let parsed = ServerConfig::parse_from(["raw-http-server"]);
        let default = ServerConfig::default();
        assert_eq!(parsed.directory, default.directory);
        assert_eq!(parsed.address, default.address);
        assert_eq!(parsed.max_request_bytes, default.max_request_bytes);
        assert_eq!(parsed.read_timeout_secs, default.read_timeout_secs);
    }
}
