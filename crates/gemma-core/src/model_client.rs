//! Model client trait.
//!
//! Abstracts the inference endpoint so the controller can be exercised with
//! scripted replies.

use crate::error::Result;
use async_trait::async_trait;

/// Issues one non-streaming generation request and returns the reply text.
///
/// # Implementation Notes
///
/// - One request, one response, one outcome. No retry, no streaming, no
///   cancellation.
/// - The reply is returned verbatim (no trimming or post-processing).
/// - Every transport failure must be reported as
///   [`AssistantError::ModelUnavailable`](crate::AssistantError::ModelUnavailable).
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends `prompt` to the model and waits for the complete reply.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Base URL of the endpoint, shown in remediation hints.
    fn endpoint(&self) -> &str;
}
