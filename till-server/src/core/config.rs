/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/till | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | LOG_LEVEL | info | Tracing filter when RUST_LOG is unset |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/till HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the order database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Default tracing filter
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/till".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        }
    }

    /// Path of the order database inside the working directory
    pub fn db_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("billing.redb")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "/var/lib/till".into(),
            http_port: 3000,
            log_level: "info".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_joins_work_dir() {
        let config = Config {
            work_dir: "/tmp/till".into(),
            ..Config::default()
        };
        assert_eq!(config.db_path(), std::path::PathBuf::from("/tmp/till/billing.redb"));
    }
}
