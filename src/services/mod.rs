pub mod ai_service;
pub mod gemini; // Google Gemini generateContent client
pub mod image_prep;
pub mod prompt;
pub mod report;

pub use ai_service::AIService;
pub use gemini::GeminiService;
