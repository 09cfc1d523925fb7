use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Failure that stops the server before it serves any request
#[derive(Debug)]
pub enum StartupError {
    Config(config::ConfigError),
    InvalidAddress(String),
    Root { root: String, source: io::Error },
    Logger(io::Error),
    Runtime(io::Error),
    Bind { addr: SocketAddr, source: io::Error },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "failed to load configuration: {e}"),
            Self::InvalidAddress(msg) => f.write_str(msg),
            Self::Root { root, source } => {
                write!(f, "cannot serve directory '{root}': {source}")
            }
            Self::Logger(e) => write!(f, "failed to open log files: {e}"),
            Self::Runtime(e) => write!(f, "failed to start Tokio runtime: {e}"),
            Self::Bind { addr, source } if source.kind() == io::ErrorKind::AddrInUse => {
                write!(f, "failed to bind {addr}: port {} is already in use", addr.port())
            }
            Self::Bind { addr, source } => write!(f, "failed to bind {addr}: {source}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::InvalidAddress(_) => None,
            Self::Root { source, .. } | Self::Bind { source, .. } => Some(source),
            Self::Logger(e) | Self::Runtime(e) => Some(e),
        }
    }
}

impl From<config::ConfigError> for StartupError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e)
    }
}
