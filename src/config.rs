use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub jwt_secret: String,

    // Text oracle (OpenAI-compatible chat completions)
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub oracle_timeout_secs: u64,

    // Monthly report batch
    pub cron_secret: Option<String>,
    pub report_worker_enabled: bool,
    pub report_worker_interval_secs: u64,
    pub batch_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .expect("DATABASE_MAX_CONNECTIONS must be a number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),

            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_else(|_| String::new()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into())
                .trim_end_matches('/')
                .to_string(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            oracle_timeout_secs: env::var("ORACLE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),

            cron_secret: env::var("CRON_SECRET").ok().filter(|s| !s.is_empty()),
            report_worker_enabled: env::var("REPORT_WORKER_ENABLED")
                .unwrap_or_else(|_| "false".into())
                .parse()
                .unwrap_or(false),
            report_worker_interval_secs: env::var("REPORT_WORKER_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".into()) // hourly
                .parse()
                .unwrap_or(3600),
            batch_concurrency: env::var("BATCH_CONCURRENCY")
                .unwrap_or_else(|_| "4".into())
                .parse()
                .unwrap_or(4),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The oracle is only considered when a credential is configured.
    pub fn oracle_enabled(&self) -> bool {
        !self.openai_api_key.trim().is_empty()
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs.max(1))
    }
}

#[cfg(test)]
impl Config {
    /// Config for tests: no env lookups, oracle disabled.
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/dreamarc_test".into(),
            database_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            jwt_secret: "test-secret".into(),
            openai_api_key: String::new(),
            openai_base_url: "http://localhost:9".into(),
            openai_model: "gpt-4o-mini".into(),
            oracle_timeout_secs: 1,
            cron_secret: Some("cron-secret".into()),
            report_worker_enabled: false,
            report_worker_interval_secs: 3600,
            batch_concurrency: 2,
        }
    }
}
