use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "AyurDiet";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address for the HTTP API.
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Sessions idle longer than this are dropped: 30 minutes.
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 1800;

/// Live sessions allowed at once; `POST /api/session` fails past this.
pub const MAX_SESSIONS: usize = 10_000;

/// Seeded doctor account, created on first start if absent.
pub const SEED_DOCTOR_NAME: &str = "Dr. Smith";
pub const SEED_DOCTOR_EMAIL: &str = "doctor@ayurdiet.local";
pub const SEED_DOCTOR_PASSWORD: &str = "ayurdiet";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,ayurdiet_lib=debug,tower_http=info"
}

/// Get the application data directory
/// ~/AyurDiet/ on all platforms, or the working directory without a home.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the database file path inside a data directory
pub fn database_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("ayurdiet.db")
}

/// Runtime configuration, read from the environment with defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind: SocketAddr,
    /// Optional JSON food table; when set, plans are sampled from it.
    pub food_table: Option<PathBuf>,
    pub session_timeout_secs: u64,
}

impl Config {
    /// Read `AYURDIET_DATA_DIR`, `AYURDIET_BIND`, `AYURDIET_FOOD_TABLE` and
    /// `AYURDIET_SESSION_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_dir = lookup("AYURDIET_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let bind = match lookup("AYURDIET_BIND") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(value = %raw, error = %e, "Invalid AYURDIET_BIND, using default");
                defaults.bind
            }),
            None => defaults.bind,
        };

        let food_table = lookup("AYURDIET_FOOD_TABLE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let session_timeout_secs = lookup("AYURDIET_SESSION_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(defaults.session_timeout_secs);

        Self {
            data_dir,
            bind,
            food_table,
            session_timeout_secs,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        database_path(&self.data_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: app_data_dir(),
            bind: DEFAULT_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8501))),
            food_table: None,
            session_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
        }
    }
}
