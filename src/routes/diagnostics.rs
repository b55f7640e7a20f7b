/**
 * Diagnostics Route
 * GET /test reports storage wiring without ever failing
 */
use std::time::Duration;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// At most this many collection names are reported.
pub const MAX_LISTED_COLLECTIONS: usize = 10;
/// Error text embedded in the report is cut to this many characters.
pub const MAX_ERROR_CHARS: usize = 50;
const COLLECTION_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Wire shape of the diagnostic report.
#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

/// Each dimension is computed on its own; none can abort another.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub connected: bool,
    pub url_configured: bool,
    pub name_configured: bool,
    /// `None` when there was no connection to ask.
    pub collections: Option<Result<Vec<String>, String>>,
}

impl Probe {
    pub async fn run(state: &AppState) -> Self {
        let connected = state.db.is_connected();

        let collections = if connected {
            let listed =
                tokio::time::timeout(COLLECTION_PROBE_TIMEOUT, state.db.collection_names()).await;
            Some(match listed {
                Ok(Ok(mut names)) => {
                    names.truncate(MAX_LISTED_COLLECTIONS);
                    Ok(names)
                }
                Ok(Err(e)) => Err(truncate(&e.to_string(), MAX_ERROR_CHARS)),
                Err(_) => Err(format!(
                    "timed out after {}s",
                    COLLECTION_PROBE_TIMEOUT.as_secs()
                )),
            })
        } else {
            None
        };

        Self {
            connected,
            url_configured: state.config.database_url.is_some(),
            name_configured: state.config.database_name.is_some(),
            collections,
        }
    }

    pub fn report(self) -> DiagnosticReport {
        let (database, collections) = match self.collections {
            Some(Ok(names)) => ("✅ Connected & Working".to_string(), names),
            Some(Err(e)) => (format!("⚠️  Connected but Error: {}", e), Vec::new()),
            None if self.url_configured => {
                ("⚠️  Available but not initialized".to_string(), Vec::new())
            }
            None => ("❌ Not Available".to_string(), Vec::new()),
        };

        DiagnosticReport {
            backend: "✅ Running".to_string(),
            database,
            database_url: set_or_not(self.url_configured),
            database_name: set_or_not(self.name_configured),
            connection_status: if self.connected {
                "Connected".to_string()
            } else {
                "Not Connected".to_string()
            },
            collections,
        }
    }
}

fn set_or_not(configured: bool) -> String {
    if configured {
        "✅ Set".to_string()
    } else {
        "❌ Not Set".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// GET /test
pub async fn test_database(State(state): State<AppState>) -> Json<DiagnosticReport> {
    let probe = Probe::run(&state).await;
    tracing::debug!(?probe, "diagnostic probe");
    Json(probe.report())
}
