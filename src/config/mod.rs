// Configuration module entry point
// Loads layered configuration and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::Config;

/// Config file looked up in the working directory (without extension)
pub const DEFAULT_CONFIG_FILE: &str = "devserve";

/// Prefix of environment overrides, e.g. `DEVSERVE_SERVER__PORT=9000`
const ENV_PREFIX: &str = "DEVSERVE";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources in increasing priority: built-in defaults, the optional file,
    /// then `DEVSERVE_*` environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.root", ".")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default(
                "http.server_name",
                concat!("devserve/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("http.index_files", vec!["index.html", "index.htm"])?
            .set_default("http.directory_listing", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        let host = self.server.host.as_str();
        // Bare IPv6 literals need brackets before the port
        let formatted = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.server.port)
        } else {
            format!("{host}:{}", self.server.port)
        };
        formatted
            .parse()
            .map_err(|e| format!("Invalid address '{formatted}': {e}"))
    }

    /// URL printed in the startup banner
    pub fn local_url(&self) -> String {
        format!("http://localhost:{}", self.server.port)
    }
}
