use crate::models::UserProfile;

const RESPONSE_FORMAT: &str = r#"{
  "dish_name": string,
  "ingredients": [string],
  "estimated_serving_g": number,
  "calories_kcal": number,
  "macros": {
    "carbs_g": number,
    "protein_g": number,
    "fat_g": number,
    "fiber_g": number
  },
  "micros": {
    "vitamin_a_ug": number,
    "vitamin_c_mg": number,
    "calcium_mg": number,
    "iron_mg": number,
    "sodium_mg": number
  },
  "allergens": [string],
  "confidence": {
    "overall": number,
    "calories": number,
    "ingredients": number
  },
  "portion_recommendation": {
    "amount_g": number,
    "frequency": string
  },
  "healthiness_verdict": {
    "rating": string,
    "explanation": string
  },
  "advice": [string]
}"#;

/// One-line summary of the profile for the "User context" section
pub fn user_context(profile: &UserProfile) -> String {
    let allergies = profile.allergies.trim();
    format!(
        "User: {} yrs, {}, height {} cm, weight {} kg, activity: {}, dietary_preferences: {}, allergies: {}.",
        profile.age,
        profile.gender,
        profile.height_cm,
        profile.weight_kg,
        profile.activity_level,
        profile.diet_preference,
        if allergies.is_empty() { "none" } else { allergies },
    )
}

/// Builds the instruction sent to the model. The dish name is embedded verbatim;
/// non-blank notes are appended as a trailing "Additional context" line.
pub fn build_prompt(dish_name: &str, profile: &UserProfile, notes: &str) -> String {
    let mut prompt = format!(
        "You are a nutrition expert. Analyze the dish \"{dish_name}\" and return **valid JSON only**.\n\
         \n\
         The JSON must follow exactly this format:\n\
         {RESPONSE_FORMAT}\n\
         \n\
         User context:\n\
         {context}\n\
         \n\
         Dish context: include nutrition, portion, allergens, and health advice.\n\
         Return only valid JSON — no markdown, no code fences, no explanation outside JSON.",
        context = user_context(profile),
    );

    let notes = notes.trim();
    if !notes.is_empty() {
        prompt.push_str("\nAdditional context: ");
        prompt.push_str(notes);
    }

    prompt
}
