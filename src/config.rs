use std::{env, path::PathBuf, str::FromStr, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub upload_dir: PathBuf,
    pub upload_max_files: usize,
    pub upload_max_file_bytes: usize,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_connect_attempts: u32,
    pub db_connect_retry_delay: Duration,
    pub list_query_timeout: Duration,
}

impl AppConfig {
    /// Defaults for everything except the two values that have no sane default.
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 5002,
            cors_origin: "http://localhost:3003".to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiry_hours: 24,
            upload_dir: PathBuf::from("uploads"),
            upload_max_files: 5,
            upload_max_file_bytes: 5 * 1024 * 1024,
            db_max_connections: 10,
            db_min_connections: 5,
            db_connect_attempts: 5,
            db_connect_retry_delay: Duration::from_secs(5),
            list_query_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let defaults = Self::new(database_url, jwt_secret);

        Ok(Self {
            host: env::var("APP_HOST").unwrap_or(defaults.host.clone()),
            port: parsed("PORT", defaults.port),
            cors_origin: env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin.clone()),
            jwt_expiry_hours: parsed("JWT_EXPIRY_HOURS", defaults.jwt_expiry_hours),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir.clone()),
            upload_max_files: parsed("UPLOAD_MAX_FILES", defaults.upload_max_files),
            upload_max_file_bytes: parsed("UPLOAD_MAX_FILE_BYTES", defaults.upload_max_file_bytes),
            db_max_connections: parsed("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            db_min_connections: parsed("DB_MIN_CONNECTIONS", defaults.db_min_connections),
            db_connect_attempts: parsed("DB_CONNECT_ATTEMPTS", defaults.db_connect_attempts).max(1),
            db_connect_retry_delay: Duration::from_secs(parsed(
                "DB_CONNECT_RETRY_DELAY_SECS",
                defaults.db_connect_retry_delay.as_secs(),
            )),
            list_query_timeout: Duration::from_secs(parsed(
                "LIST_QUERY_TIMEOUT_SECS",
                defaults.list_query_timeout.as_secs(),
            )),
            ..defaults
        })
    }

    /// Upper bound for a whole multipart upload request.
    pub fn upload_body_limit(&self) -> usize {
        self.upload_max_files * self.upload_max_file_bytes + 64 * 1024
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
