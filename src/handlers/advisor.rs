use chrono::Utc;
use std::sync::Arc;

use crate::models::{AdvisoryOutcome, AdvisoryRequest, Submission};
use crate::services::image_prep::prepare_image;
use crate::services::prompt::build_prompt;
use crate::services::report::parse_report;
use crate::services::AIService;

pub const MISSING_INPUT_MESSAGE: &str = "Please provide a dish name or upload an image.";

/// Turns one form submission into one model call and its displayable outcome
pub struct AdvisorHandler {
    ai: Arc<dyn AIService>,
}

impl AdvisorHandler {
    pub fn new(ai: Arc<dyn AIService>) -> Self {
        Self { ai }
    }

    pub fn model_name(&self) -> &str {
        self.ai.model_name()
    }

    /// Renders the prompt and prepares the image. Image problems become warnings,
    /// the request still goes out without the picture.
    pub fn prepare_request(&self, submission: &Submission, warnings: &mut Vec<String>) -> AdvisoryRequest {
        let dish_name = submission.dish_name.trim().to_string();
        let prompt = build_prompt(&submission.dish_name, &submission.profile, &submission.notes);

        let image = match submission.image.as_deref() {
            Some(bytes) if !bytes.is_empty() => match prepare_image(bytes) {
                Ok(part) => Some(part),
                Err(e) => {
                    log::warn!("⚠️ Could not process uploaded image: {}", e);
                    warnings.push(format!("⚠️ Could not process image: {}", e));
                    None
                }
            },
            _ => None,
        };

        AdvisoryRequest {
            dish_name,
            prompt,
            image,
        }
    }

    pub async fn handle_submission(&self, submission: Submission) -> AdvisoryOutcome {
        log::info!(
            "📨 INCOMING SUBMISSION - Dish: '{}' | Has Image: {} | Notes: {} chars",
            submission.dish_name.trim(),
            submission.image.as_ref().map_or(false, |b| !b.is_empty()),
            submission.notes.trim().len()
        );

        if submission.is_empty() {
            log::info!("ℹ️ Empty submission, skipping model call");
            return AdvisoryOutcome::MissingInput {
                message: MISSING_INPUT_MESSAGE.to_string(),
            };
        }

        let mut warnings = Vec::new();
        let request = self.prepare_request(&submission, &mut warnings);
        log::debug!("📝 Prompt for '{}': {} chars", request.dish_name, request.prompt.len());

        let raw_text = match self.ai.generate_content(&request.prompt, request.image.as_ref()).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("❌ Model call failed: {}", e);
                return AdvisoryOutcome::Failed {
                    message: format!("❌ Error: {}", e),
                    warnings,
                };
            }
        };

        let report = match parse_report(&raw_text) {
            Ok(report) => Some(report),
            Err(e) => {
                log::warn!("⚠️ JSON parsing failed: {}", e);
                warnings.push(format!("⚠️ JSON parsing failed: {}", e));
                None
            }
        };

        AdvisoryOutcome::Answered {
            raw_text,
            report,
            warnings,
            generated_at: Utc::now(),
        }
    }
}
