use anyhow::Result;

use crate::models::ImagePart;

/// Trait for the hosted model behind the advisor (Gemini, or a mock in tests)
#[async_trait::async_trait]
pub trait AIService: Send + Sync {
    /// Sends the prompt, plus the image if any, and returns the model's raw text reply.
    async fn generate_content(&self, prompt: &str, image: Option<&ImagePart>) -> Result<String>;

    /// Model identifier shown on the page
    fn model_name(&self) -> &str;
}
