use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub sources_path: PathBuf,
    pub out_csv: PathBuf,
    /// Upper bound for a whole collection run; in-flight payloads are
    /// abandoned when it elapses.
    pub run_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_payloads: usize,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}
