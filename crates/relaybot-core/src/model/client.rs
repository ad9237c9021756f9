use async_trait::async_trait;

use crate::Result;

use super::types::*;

/// Completion API port.
///
/// One request, one response. No streaming, no tools; retry and timeout
/// behaviour is whatever the implementation's HTTP client does by default.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, req: CompletionRequest) -> Result<Completion>;
}
