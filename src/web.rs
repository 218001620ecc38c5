use axum::extract::Multipart;
use axum::http::StatusCode;
use base64::{engine::general_purpose, Engine};

use crate::models::{ActivityLevel, DietPreference, Gender, Submission, UserProfile};

pub mod page;

/// Reads the advisor form. Unknown fields are ignored; profile values that are
/// missing or out of range fall back to defaults.
pub async fn read_submission(mut multipart: Multipart) -> Result<Submission, (StatusCode, String)> {
    let mut submission = Submission::default();
    let defaults = UserProfile::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "image" {
            let data = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read image: {}", e)))?;
            // Browsers send an empty part when no file was chosen
            if !data.is_empty() {
                submission.image = Some(data.to_vec());
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read {}: {}", name, e)))?;
        let profile = &mut submission.profile;

        match name.as_str() {
            "dish_name" => submission.dish_name = value,
            "notes" => submission.notes = value,
            "age" => profile.age = parse_in_range(&value, 1, 120, defaults.age),
            "height_cm" => profile.height_cm = parse_in_range(&value, 50, 250, defaults.height_cm),
            "weight_kg" => profile.weight_kg = parse_in_range(&value, 20, 300, defaults.weight_kg),
            "gender" => profile.gender = Gender::from_string(&value).unwrap_or(defaults.gender),
            "activity_level" => {
                profile.activity_level =
                    ActivityLevel::from_string(&value).unwrap_or(defaults.activity_level)
            }
            "diet_preference" => {
                profile.diet_preference =
                    DietPreference::from_string(&value).unwrap_or(defaults.diet_preference)
            }
            "allergies" => profile.allergies = value,
            _ => log::debug!("Ignoring unknown form field: {}", name),
        }
    }

    Ok(submission)
}

fn parse_in_range(value: &str, min: u32, max: u32, default: u32) -> u32 {
    match value.trim().parse::<u32>() {
        Ok(n) if (min..=max).contains(&n) => n,
        _ => default,
    }
}

/// Data URL for echoing the upload back on the page, if the format is recognisable
pub fn preview_data_url(bytes: &[u8]) -> Option<String> {
    let format = image::guess_format(bytes).ok()?;
    Some(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        general_purpose::STANDARD.encode(bytes)
    ))
}

pub mod server {
    use super::*;
    use axum::{
        extract::{DefaultBodyLimit, State},
        response::{Html, IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use std::sync::Arc;
    use tower_http::services::ServeDir;

    use super::page::{render_page, PageView, Preview};
    use crate::handlers::AdvisorHandler;

    pub struct AppState {
        pub advisor: Arc<AdvisorHandler>,
    }

    pub fn create_router(advisor: Arc<AdvisorHandler>) -> Router {
        let state = Arc::new(AppState { advisor });
        let static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

        Router::new()
            .route("/", get(index_handler))
            .route("/analyze", post(analyze_page_handler))
            .route("/api/analyze", post(analyze_api_handler))
            .route("/health", get(health_check))
            .nest_service("/static", ServeDir::new(static_dir))
            // Uploads are not size-limited
            .layer(DefaultBodyLimit::disable())
            .with_state(state)
    }

    async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
        Html(render_page(&PageView {
            model_name: state.advisor.model_name(),
            ..Default::default()
        }))
    }

    async fn analyze_page_handler(
        State(state): State<Arc<AppState>>,
        multipart: Multipart,
    ) -> Response {
        let submission = match read_submission(multipart).await {
            Ok(s) => s,
            Err(e) => {
                log::warn!("⚠️ Rejected form submission: {}", e.1);
                return e.into_response();
            }
        };

        let preview = submission
            .image
            .as_deref()
            .map(|bytes| preview_data_url(bytes).map_or(Preview::Unavailable, Preview::DataUrl));
        let outcome = state.advisor.handle_submission(submission.clone()).await;

        Html(render_page(&PageView {
            model_name: state.advisor.model_name(),
            submission: Some(&submission),
            preview,
            outcome: Some(&outcome),
        }))
        .into_response()
    }

    async fn analyze_api_handler(
        State(state): State<Arc<AppState>>,
        multipart: Multipart,
    ) -> Response {
        match read_submission(multipart).await {
            Ok(submission) => Json(state.advisor.handle_submission(submission).await).into_response(),
            Err(e) => {
                log::warn!("⚠️ Rejected API submission: {}", e.1);
                e.into_response()
            }
        }
    }

    async fn health_check() -> &'static str {
        "OK"
    }
}
