use anyhow::Result;
use async_trait::async_trait;

/// Abstraction over the external inference service.
///
/// One call per record; the call blocks the driver and is billed per
/// invocation, so implementations should not fan out or cache.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Sends a prompt and returns the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
