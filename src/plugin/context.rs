//! Plugin Construction Context
//!
//! Shared, read-only service handles passed to plugin factories. One HTTP
//! client (connection pool included) and one API key store serve every
//! plugin instance; plugins clone what they need at construction time and
//! never consult process globals afterwards.

use crate::plugin::keys::ApiKeyStore;
use std::sync::Arc;
use std::time::Duration;

/// Transport-level request deadline; per-plugin scan deadlines are enforced
/// separately by the scheduler.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Service handles shared by all plugins of one process
#[derive(Clone)]
pub struct PluginContext {
    pub http: reqwest::Client,
    pub keys: Arc<ApiKeyStore>,
}

impl PluginContext {
    /// Build a context with the default HTTP client configuration
    pub fn new(keys: Arc<ApiKeyStore>) -> Result<Self, reqwest::Error> {
        Self::with_http_timeout(keys, DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_http_timeout(
        keys: Arc<ApiKeyStore>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("intelscan/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { http, keys })
    }
}
