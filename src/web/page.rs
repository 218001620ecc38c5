//! Server-rendered HTML for the single advisor page.
//!
//! Everything the model returns is untrusted text, so all of it goes through
//! [`escape_html`] before landing in the page.

use std::fmt::Write;

use crate::models::{
    ActivityLevel, AdvisoryOutcome, DietPreference, Gender, NutritionReport, Submission,
};

pub const DISCLAIMER: &str = "⚠️ Estimates only. Consult a dietitian for clinical advice.";
pub const FOOTER: &str = "Model-based estimates only — verify with trusted nutrition.";
pub const UNPARSED_HEADING: &str = "Could not parse JSON. Displaying full output:";

/// What the page shows besides the empty form
#[derive(Default)]
pub struct PageView<'a> {
    pub model_name: &'a str,
    pub submission: Option<&'a Submission>,
    pub preview: Option<Preview>,
    pub outcome: Option<&'a AdvisoryOutcome>,
}

/// Uploaded image echoed back next to the form
pub enum Preview {
    DataUrl(String),
    Unavailable,
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>🍽 Food Advisor</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n</head>\n<body>\n",
    );
    html.push_str("<div class=\"big-font\">🍔 Food Advisor </div>\n");
    html.push_str(
        "<p>Estimate nutrition, macros, vitamins, and health verdict from image or dish name</p>\n",
    );

    let default_submission = Submission::default();
    let submission = view.submission.unwrap_or(&default_submission);

    html.push_str("<form method=\"post\" action=\"/analyze\" enctype=\"multipart/form-data\" class=\"layout\">\n");
    render_sidebar(&mut html, submission);
    render_input_column(&mut html, submission);
    render_preview_column(&mut html, view.preview.as_ref());
    html.push_str("</form>\n");

    if let Some(outcome) = view.outcome {
        html.push_str("<section class=\"result\">\n");
        render_outcome(&mut html, outcome);
        html.push_str("</section>\n");
    }

    let _ = write!(
        html,
        "<hr>\n<p class=\"muted\">{} <span class=\"model\">Model: {}</span></p>\n</body>\n</html>\n",
        escape_html(FOOTER),
        escape_html(view.model_name)
    );
    html
}

fn render_select<T: std::fmt::Display + PartialEq + Copy>(
    html: &mut String,
    label: &str,
    name: &str,
    options: &[T],
    selected: T,
) {
    let _ = write!(html, "<label>{}<select name=\"{}\">", label, name);
    for option in options {
        let value = escape_html(&option.to_string());
        let marker = if *option == selected { " selected" } else { "" };
        let _ = write!(html, "<option value=\"{0}\"{1}>{0}</option>", value, marker);
    }
    html.push_str("</select></label>\n");
}

fn render_number(html: &mut String, label: &str, name: &str, value: u32, min: u32, max: u32) {
    let _ = writeln!(
        html,
        "<label>{}<input type=\"number\" name=\"{}\" value=\"{}\" min=\"{}\" max=\"{}\"></label>",
        label, name, value, min, max
    );
}

fn render_sidebar(html: &mut String, submission: &Submission) {
    let profile = &submission.profile;
    html.push_str("<aside class=\"sidebar\">\n<h2>Your Profile</h2>\n");
    render_number(html, "Age", "age", profile.age, 1, 120);
    render_select(html, "Gender", "gender", &Gender::ALL, profile.gender);
    render_number(html, "Height (cm)", "height_cm", profile.height_cm, 50, 250);
    render_number(html, "Weight (kg)", "weight_kg", profile.weight_kg, 20, 300);
    render_select(html, "Activity level", "activity_level", &ActivityLevel::ALL, profile.activity_level);
    render_select(html, "Diet preference", "diet_preference", &DietPreference::ALL, profile.diet_preference);
    let _ = writeln!(
        html,
        "<label>Allergies (comma separated)<input type=\"text\" name=\"allergies\" value=\"{}\"></label>",
        escape_html(&profile.allergies)
    );
    let _ = writeln!(html, "<hr>\n<p class=\"muted\">{}</p>\n</aside>", escape_html(DISCLAIMER));
}

fn render_input_column(html: &mut String, submission: &Submission) {
    html.push_str("<div class=\"column\">\n<h3>Input</h3>\n");
    html.push_str(
        "<label>Upload image (optional)<input type=\"file\" name=\"image\" accept=\".jpg,.jpeg,.png\"></label>\n",
    );
    html.push_str("<p>OR</p>\n");
    let _ = writeln!(
        html,
        "<label>Dish name<input type=\"text\" name=\"dish_name\" value=\"{}\" placeholder=\"e.g., chicken biryani with raita\"></label>",
        escape_html(&submission.dish_name)
    );
    let _ = writeln!(
        html,
        "<label>Extra details<textarea name=\"notes\" rows=\"3\">{}</textarea></label>",
        escape_html(&submission.notes)
    );
    html.push_str("<button type=\"submit\">Analyze</button>\n</div>\n");
}

fn render_preview_column(html: &mut String, preview: Option<&Preview>) {
    html.push_str("<div class=\"column wide\">\n<h3>Preview of the Image</h3>\n");
    match preview {
        Some(Preview::DataUrl(url)) => {
            let _ = writeln!(
                html,
                "<figure><img src=\"{}\" alt=\"Uploaded image\"><figcaption>Uploaded image</figcaption></figure>",
                escape_html(url)
            );
        }
        Some(Preview::Unavailable) => {
            html.push_str("<div class=\"warning\">⚠️ Could not preview image.</div>\n");
        }
        None => {}
    }
    html.push_str("</div>\n");
}

fn render_warnings(html: &mut String, warnings: &[String]) {
    for warning in warnings {
        let _ = writeln!(html, "<div class=\"warning\">{}</div>", escape_html(warning));
    }
}

pub fn render_outcome(html: &mut String, outcome: &AdvisoryOutcome) {
    match outcome {
        AdvisoryOutcome::MissingInput { message } => {
            let _ = writeln!(html, "<div class=\"warning\">{}</div>", escape_html(message));
        }
        AdvisoryOutcome::Failed { message, warnings } => {
            render_warnings(html, warnings);
            let _ = writeln!(html, "<div class=\"error\">{}</div>", escape_html(message));
        }
        AdvisoryOutcome::Answered {
            raw_text,
            report,
            warnings,
            ..
        } => {
            render_warnings(html, warnings);
            match report {
                Some(report) => render_report(html, report),
                None => {
                    let _ = writeln!(html, "<div class=\"warning\">{}</div>", UNPARSED_HEADING);
                    let _ = writeln!(html, "<pre class=\"raw\">{}</pre>", escape_html(raw_text));
                }
            }
        }
    }
}

fn render_list_items(html: &mut String, items: &[String]) {
    html.push_str("<ul>\n");
    for item in items {
        let _ = writeln!(html, "<li>{}</li>", escape_html(item));
    }
    html.push_str("</ul>\n");
}

fn render_report(html: &mut String, report: &NutritionReport) {
    html.push_str("<h3>✅ Nutrition Summary (Estimated)</h3>\n");
    let _ = writeln!(
        html,
        "<h3>🍽️ Dish: <strong>{}</strong></h3>",
        escape_html(report.dish_name.as_deref().unwrap_or("Unknown"))
    );

    html.push_str("<h4>🧂 Ingredients</h4>\n");
    let _ = writeln!(html, "<p>{}</p>", escape_html(&report.ingredients.join(", ")));

    html.push_str("<div class=\"columns\">\n<div class=\"column\">\n<h4>⚖️ Serving &amp; Calories</h4>\n");
    let _ = writeln!(
        html,
        "<div class=\"metric\"><span>Estimated Serving</span><strong>{} g</strong></div>",
        escape_html(&report.estimated_serving_g.display_or("0"))
    );
    let _ = writeln!(
        html,
        "<div class=\"metric\"><span>Calories</span><strong>{} kcal</strong></div>",
        escape_html(&report.calories_kcal.display_or("0"))
    );
    html.push_str("<h4>💪 Macros (per serving)</h4>\n");
    for (label, grams) in report.macros.entries() {
        let _ = writeln!(
            html,
            "<p><strong>{}</strong>: {} g</p>",
            label,
            escape_html(&grams.display_or("0"))
        );
    }
    html.push_str("</div>\n<div class=\"column\">\n<h4>🧬 Micronutrients</h4>\n");
    for (label, amount, unit) in report.micros.entries() {
        let _ = writeln!(
            html,
            "<p><strong>{}</strong>: {} {}</p>",
            label,
            escape_html(&amount.display_or("0")),
            unit
        );
    }
    html.push_str("</div>\n</div>\n");

    html.push_str("<h4>⚠️ Allergens</h4>\n");
    if report.allergens.is_empty() {
        html.push_str("<p>None</p>\n");
    } else {
        let _ = writeln!(
            html,
            "<div class=\"warning\">{}</div>",
            escape_html(&report.allergens.join(", "))
        );
    }

    let confidence = &report.confidence;
    html.push_str("<h4>📊 Confidence</h4>\n");
    let _ = writeln!(
        html,
        "<progress value=\"{}\" max=\"1\"></progress>",
        confidence.overall.as_f64().unwrap_or(0.0).clamp(0.0, 1.0)
    );
    let _ = writeln!(
        html,
        "<p class=\"muted\">Calories confidence: {:.0}% | Ingredients confidence: {:.0}%</p>",
        confidence.calories.as_f64().unwrap_or(0.0) * 100.0,
        confidence.ingredients.as_f64().unwrap_or(0.0) * 100.0
    );

    let portion = &report.portion_recommendation;
    html.push_str("<h4>🕒 Portion Recommendation</h4>\n");
    let _ = writeln!(
        html,
        "<div class=\"info\"><strong>{} g</strong> — {}</div>",
        escape_html(&portion.amount_g.display_or("?")),
        escape_html(portion.frequency.as_deref().unwrap_or("No suggestion"))
    );

    let verdict = &report.healthiness_verdict;
    html.push_str("<h4>❤️ Healthiness Verdict</h4>\n");
    let _ = writeln!(
        html,
        "<div class=\"success\"><strong>{}</strong> — {}</div>",
        escape_html(verdict.rating.as_deref().unwrap_or("-")),
        escape_html(verdict.explanation.as_deref().unwrap_or(""))
    );

    html.push_str("<h4>💡 Advice</h4>\n");
    render_list_items(html, &report.advice);

    if verdict.rating.is_some() || verdict.explanation.is_some() {
        let _ = writeln!(
            html,
            "<div class=\"info\"><strong>Verdict: {}</strong> — {}</div>",
            escape_html(&verdict.rating.as_deref().unwrap_or("—").to_uppercase()),
            escape_html(verdict.explanation.as_deref().unwrap_or(""))
        );
    }
}
