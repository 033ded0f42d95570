use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_USER_AGENT: &str = "insight-hub";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REPORT_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FACTS_PATH: &str = "/interesting_facts.json";

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// `None` lets a report request wait indefinitely.
    pub report_timeout: Option<Duration>,
    pub connect_timeout: Duration,
    pub facts_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            report_timeout: Some(Duration::from_secs(DEFAULT_REPORT_TIMEOUT_SECS)),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            facts_path: DEFAULT_FACTS_PATH.to_string(),
        }
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn with_report_timeout(mut self, duration: Option<Duration>) -> Self {
        self.report_timeout = duration;
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    pub fn with_facts_path(mut self, path: impl Into<String>) -> Self {
        self.facts_path = path.into();
        self
    }

    /// Base URL without a trailing slash.
    pub fn root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
