use serde::{Deserialize, Serialize};

/// Profile entered in the sidebar of the form, folded into the prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: u32,
    pub gender: Gender,
    pub height_cm: u32,
    pub weight_kg: u32,
    pub activity_level: ActivityLevel,
    pub diet_preference: DietPreference,
    pub allergies: String, // comma separated, free text
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            age: 25,
            gender: Gender::Unspecified,
            height_cm: 170,
            weight_kg: 70,
            activity_level: ActivityLevel::Sedentary,
            diet_preference: DietPreference::None,
            allergies: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Unspecified,
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 4] = [Gender::Unspecified, Gender::Male, Gender::Female, Gender::Other];

    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "unspecified" => Some(Gender::Unspecified),
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Gender::Unspecified => "unspecified",
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    pub fn from_string(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "very active" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very active",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietPreference {
    None,
    Vegetarian,
    Vegan,
    Pescatarian,
    Keto,
    HighProtein,
    GlutenFree,
}

impl DietPreference {
    pub const ALL: [DietPreference; 7] = [
        DietPreference::None,
        DietPreference::Vegetarian,
        DietPreference::Vegan,
        DietPreference::Pescatarian,
        DietPreference::Keto,
        DietPreference::HighProtein,
        DietPreference::GlutenFree,
    ];

    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Some(DietPreference::None),
            "vegetarian" => Some(DietPreference::Vegetarian),
            "vegan" => Some(DietPreference::Vegan),
            "pescatarian" => Some(DietPreference::Pescatarian),
            "keto" => Some(DietPreference::Keto),
            "high-protein" | "high protein" => Some(DietPreference::HighProtein),
            "gluten-free" | "gluten free" => Some(DietPreference::GlutenFree),
            _ => None,
        }
    }
}

impl std::fmt::Display for DietPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DietPreference::None => "none",
            DietPreference::Vegetarian => "vegetarian",
            DietPreference::Vegan => "vegan",
            DietPreference::Pescatarian => "pescatarian",
            DietPreference::Keto => "keto",
            DietPreference::HighProtein => "high-protein",
            DietPreference::GlutenFree => "gluten-free",
        };
        write!(f, "{}", s)
    }
}

/// Image attached inline to the model request
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One form submission as received from the browser
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub dish_name: String,
    pub notes: String,
    pub image: Option<Vec<u8>>,
    pub profile: UserProfile,
}

impl Submission {
    /// True when there is nothing to analyze: blank dish name and no image bytes
    pub fn is_empty(&self) -> bool {
        self.dish_name.trim().is_empty() && self.image.as_ref().map_or(true, |b| b.is_empty())
    }
}

/// Request-scoped pairing of the user's input and the rendered prompt
#[derive(Debug, Clone)]
pub struct AdvisoryRequest {
    pub dish_name: String,
    pub prompt: String,
    pub image: Option<ImagePart>,
}

// Nutrition report returned by the model. Replies are loosely typed in practice:
// keys go missing, numbers arrive as null or as ranges like "150-200", lists as
// a single string. None of that fails the parse; fields fall back to defaults.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionReport {
    #[serde(deserialize_with = "lenient::text")]
    pub dish_name: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub ingredients: Vec<String>,
    pub estimated_serving_g: Amount,
    pub calories_kcal: Amount,
    #[serde(deserialize_with = "lenient::or_default")]
    pub macros: Macros,
    #[serde(deserialize_with = "lenient::or_default")]
    pub micros: Micros,
    #[serde(deserialize_with = "lenient::list")]
    pub allergens: Vec<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub confidence: Confidence,
    #[serde(deserialize_with = "lenient::or_default")]
    pub portion_recommendation: PortionRecommendation,
    #[serde(deserialize_with = "lenient::or_default")]
    pub healthiness_verdict: HealthinessVerdict,
    #[serde(deserialize_with = "lenient::list")]
    pub advice: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Macros {
    pub carbs_g: Amount,
    pub protein_g: Amount,
    pub fat_g: Amount,
    pub fiber_g: Amount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Micros {
    pub vitamin_a_ug: Amount,
    pub vitamin_c_mg: Amount,
    pub calcium_mg: Amount,
    pub iron_mg: Amount,
    pub sodium_mg: Amount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Confidence {
    pub overall: Amount,
    pub calories: Amount,
    pub ingredients: Amount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortionRecommendation {
    pub amount_g: Amount,
    #[serde(deserialize_with = "lenient::text")]
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthinessVerdict {
    #[serde(deserialize_with = "lenient::text")]
    pub rating: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub explanation: Option<String>,
}

/// A quantity the model was asked to give as a number. Non-numeric replies are
/// kept as text so they can still be shown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Amount {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Amount::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// 650.0 -> "650", 12.5 -> "12.5", "150-200" as given, `fallback` when missing
    pub fn display_or(&self, fallback: &str) -> String {
        match self {
            Amount::Missing => fallback.to_string(),
            Amount::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{:.0}", n),
            Amount::Number(n) => format!("{}", n),
            Amount::Text(s) => s.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Null => Amount::Missing,
            serde_json::Value::Number(n) => n.as_f64().map_or(Amount::Missing, Amount::Number),
            serde_json::Value::String(s) => match s.trim().parse::<f64>() {
                Ok(n) => Amount::Number(n),
                Err(_) if s.trim().is_empty() => Amount::Missing,
                Err(_) => Amount::Text(s),
            },
            other => Amount::Text(other.to_string()),
        };
        Ok(amount)
    }
}

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn value_text(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(value_text(Value::deserialize(deserializer)?))
    }

    pub fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().filter_map(value_text).collect(),
            other => value_text(other).into_iter().collect(),
        })
    }

    /// Nested objects: null or a value of the wrong shape becomes the default
    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }
}

impl Macros {
    /// (label, grams) pairs in display order
    pub fn entries(&self) -> [(&'static str, &Amount); 4] {
        [
            ("Carbs", &self.carbs_g),
            ("Protein", &self.protein_g),
            ("Fat", &self.fat_g),
            ("Fiber", &self.fiber_g),
        ]
    }
}

impl Micros {
    /// (label, amount, unit) triples in display order
    pub fn entries(&self) -> [(&'static str, &Amount, &'static str); 5] {
        [
            ("Vitamin a", &self.vitamin_a_ug, "µg"),
            ("Vitamin c", &self.vitamin_c_mg, "mg"),
            ("Calcium", &self.calcium_mg, "mg"),
            ("Iron", &self.iron_mg, "mg"),
            ("Sodium", &self.sodium_mg, "mg"),
        ]
    }
}

/// Result of one submission, as shown to the user
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvisoryOutcome {
    /// Nothing submitted; no model call was made
    MissingInput { message: String },
    /// Model replied. `report` is set when the reply parsed as a nutrition report
    Answered {
        raw_text: String,
        report: Option<NutritionReport>,
        warnings: Vec<String>,
        generated_at: chrono::DateTime<chrono::Utc>,
    },
    /// Model call failed
    Failed { message: String, warnings: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_enums_from_string() {
        assert_eq!(Gender::from_string("Female"), Some(Gender::Female));
        assert_eq!(ActivityLevel::from_string("very active"), Some(ActivityLevel::VeryActive));
        assert_eq!(ActivityLevel::from_string("very_active"), Some(ActivityLevel::VeryActive));
        assert_eq!(DietPreference::from_string("gluten-free"), Some(DietPreference::GlutenFree));
        assert_eq!(DietPreference::from_string("paleo"), None);
    }

    #[test]
    fn test_display_matches_from_string() {
        for level in ActivityLevel::ALL {
            assert_eq!(ActivityLevel::from_string(&level.to_string()), Some(level));
        }
        for diet in DietPreference::ALL {
            assert_eq!(DietPreference::from_string(&diet.to_string()), Some(diet));
        }
    }

    #[test]
    fn test_submission_is_empty() {
        let mut submission = Submission {
            dish_name: "   ".to_string(),
            ..Default::default()
        };
        assert!(submission.is_empty());

        submission.image = Some(Vec::new());
        assert!(submission.is_empty());

        submission.image = Some(vec![1, 2, 3]);
        assert!(!submission.is_empty());
    }

    #[test]
    fn test_report_defaults_missing_fields() {
        let report: NutritionReport =
            serde_json::from_str(r#"{"dish_name": "Dal", "macros": {"protein_g": 12}}"#).unwrap();

        assert_eq!(report.dish_name.as_deref(), Some("Dal"));
        assert_eq!(report.macros.protein_g, Amount::Number(12.0));
        assert_eq!(report.macros.fat_g, Amount::Missing);
        assert!(report.ingredients.is_empty());
        assert!(report.healthiness_verdict.rating.is_none());
    }

    #[test]
    fn test_report_tolerates_nulls_and_ranges() {
        let report: NutritionReport = serde_json::from_str(
            r#"{
                "dish_name": "Salad",
                "calories_kcal": null,
                "estimated_serving_g": "250",
                "ingredients": ["lettuce", 3, null],
                "allergens": "mustard",
                "macros": null,
                "confidence": {"overall": "0.8"},
                "portion_recommendation": {"amount_g": "150-200", "frequency": "daily"},
                "healthiness_verdict": {"rating": null, "explanation": 7}
            }"#,
        )
        .unwrap();

        assert_eq!(report.calories_kcal, Amount::Missing);
        assert_eq!(report.estimated_serving_g, Amount::Number(250.0));
        assert_eq!(report.ingredients, vec!["lettuce", "3"]);
        assert_eq!(report.allergens, vec!["mustard"]);
        assert_eq!(report.macros.carbs_g, Amount::Missing);
        assert_eq!(report.confidence.overall.as_f64(), Some(0.8));
        assert_eq!(report.portion_recommendation.amount_g, Amount::Text("150-200".to_string()));
        assert_eq!(report.portion_recommendation.frequency.as_deref(), Some("daily"));
        assert!(report.healthiness_verdict.rating.is_none());
        assert_eq!(report.healthiness_verdict.explanation.as_deref(), Some("7"));
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::Number(650.0).display_or("0"), "650");
        assert_eq!(Amount::Number(12.5).display_or("0"), "12.5");
        assert_eq!(Amount::Text("150-200".to_string()).display_or("?"), "150-200");
        assert_eq!(Amount::Missing.display_or("?"), "?");
    }
}
