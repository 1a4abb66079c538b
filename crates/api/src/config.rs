use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Header-to-field column mapping file; the built-in default
    /// mapping is used when unset.
    pub column_mapping_path: Option<PathBuf>,
    /// Morphology lexicon file; an empty lexicon (no morphology
    /// support) is used when unset.
    pub morphology_lexicon_path: Option<PathBuf>,
    /// How many consecutive per-parcel classification failures fail the
    /// whole import job (default: `10`).
    pub import_error_threshold: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `COLUMN_MAPPING_PATH`     | unset                   |
    /// | `MORPHOLOGY_LEXICON_PATH` | unset                   |
    /// | `IMPORT_ERROR_THRESHOLD`  | `10`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let column_mapping_path = std::env::var("COLUMN_MAPPING_PATH").ok().map(PathBuf::from);

        let morphology_lexicon_path = std::env::var("MORPHOLOGY_LEXICON_PATH")
            .ok()
            .map(PathBuf::from);

        let import_error_threshold: u32 = std::env::var("IMPORT_ERROR_THRESHOLD")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("IMPORT_ERROR_THRESHOLD must be a valid u32");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            column_mapping_path,
            morphology_lexicon_path,
            import_error_threshold,
        }
    }
}
