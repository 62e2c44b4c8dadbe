use std::env;
use std::path::{Path, PathBuf};

/// Key the embedding host uses to persist the kill toggle in page-local
/// storage. Values are stored as raw JSON strings, localStorage-style.
pub const AUGMENT_OFF_KEY: &str = "__frameAugmentOff__";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Naming resolution gateway base URL.
    pub nebula_url: String,

    /// Asset inventory service base URL.
    pub inventory_url: String,

    /// JSON file holding page-local persisted values (the kill toggle).
    pub session_storage_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            nebula_url: required_env("NEBULA_URL"),
            inventory_url: required_env("INVENTORY_URL"),
            session_storage_path: env::var("SESSION_STORAGE_PATH").ok().map(PathBuf::from),
        }
    }

    /// Whether the persisted toggle disables the whole pipeline for this
    /// session. Read once at startup.
    pub fn augment_disabled(&self) -> bool {
        match &self.session_storage_path {
            Some(path) => augment_disabled(read_storage_value(path, AUGMENT_OFF_KEY).as_deref()),
            None => false,
        }
    }
}

/// Parse the persisted toggle value. The stored value is a raw JSON string;
/// only a literal `true` disables the pipeline. Absent or malformed values
/// fail open (pipeline runs).
pub fn augment_disabled(raw: Option<&str>) -> bool {
    let Some(raw) = raw else { return false };
    match serde_json::from_str::<bool>(raw) {
        Ok(off) => off,
        Err(_) => {
            tracing::warn!(value = raw, "malformed augment toggle, leaving pipeline on");
            false
        }
    }
}

/// Read one key from the session-storage JSON object. Any read or parse
/// problem yields `None` (the toggle then fails open).
fn read_storage_value(path: &Path, key: &str) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    let values: serde_json::Value = serde_json::from_str(&contents).ok()?;
    values.get(key)?.as_str().map(String::from)
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
