//! Configuration for the Webhooker client

use std::time::Duration;

/// The default Webhooker API domain
pub const DEFAULT_DOMAIN: &str = "https://api.webhooker.io";

/// Configuration for [`WebhookerClient`](crate::WebhookerClient)
#[derive(Debug, Clone)]
pub struct Config {
    /// API key sent with every request as the `X-API-Key` header
    pub api_key: String,

    /// Domain requests are sent to, in case it differs from the standard
    /// Webhooker API
    pub domain: String,

    /// Timeout applied to each request
    pub timeout: Duration,

    /// User-Agent header for outgoing requests
    pub user_agent: String,
}

impl Config {
    /// Create a configuration with the default Webhooker domain
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_DOMAIN)
    }

    /// Create a configuration with a custom domain
    pub fn new(api_key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            domain: domain.into(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Webhooker-Rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Create a builder for custom configuration
    pub fn builder(api_key: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder {
            config: Self::with_key(api_key),
        }
    }
}

/// Builder for [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the domain requests are sent to
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.config.domain = domain.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout = Duration::from_secs(secs);
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}
