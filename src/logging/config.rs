use std::path::PathBuf;

/// Where and how verbosely logs are written.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub production: bool,
    /// Level for this crate when `RUST_LOG` is unset.
    pub level: String,
    pub directory: PathBuf,
}

impl LogConfig {
    /// Reads `LOG_LEVEL` and `LOG_DIR`. Production defaults to `info`,
    /// everything else to `debug`.
    pub fn from_env(production: bool) -> Self {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if production {
                "info".to_string()
            } else {
                "debug".to_string()
            }
        });

        Self {
            production,
            level,
            directory: std::env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("logs")),
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> String {
        format!(
            "landing_backend={},tower_http=debug,axum=debug,sqlx=warn",
            self.level
        )
    }
}
