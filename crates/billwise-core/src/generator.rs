use async_trait::async_trait;

use crate::error::GenerationError;

/// External text-generation service (collaborator, not implemented here).
///
/// Invoked only after the unlock gate reports the session as unlocked; the
/// free-tier estimate is computed deterministically without it.
#[async_trait]
pub trait ContentGenerator: Send + Sync + 'static {
    async fn generate(
        &self,
        prompt: &str,
        max_output_tokens: u32,
    ) -> Result<String, GenerationError>;
}
