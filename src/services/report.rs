use anyhow::Result;

use crate::models::NutritionReport;

/// Pulls the nutrition report out of the model's reply. Code fences are dropped and
/// the text between the first `{` and the last `}` is parsed.
pub fn parse_report(raw_text: &str) -> Result<NutritionReport> {
    let cleaned = raw_text.trim().replace("```json", "").replace("```", "");

    let (Some(first), Some(last)) = (cleaned.find('{'), cleaned.rfind('}')) else {
        anyhow::bail!("JSON structure not found in model output.");
    };
    if last < first {
        anyhow::bail!("JSON structure not found in model output.");
    }

    Ok(serde_json::from_str(&cleaned[first..=last])?)
}
