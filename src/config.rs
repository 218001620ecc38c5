use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8501";

#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_model: String,
    pub bind_addr: String,
}

impl Config {
    /// Reads settings from the process environment (after `.env` has been loaded)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let google_api_key = lookup("GOOGLE_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("Missing GOOGLE_API_KEY. Please set GOOGLE_API_KEY in .env file.")?;

        let gemini_model = lookup("GEMINI_MODEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let bind_addr = lookup("BIND_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            google_api_key,
            gemini_model,
            bind_addr,
        })
    }
}
