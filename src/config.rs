use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_RECORDS_FILE: &str = "appointments.csv";

pub const SYSTEM_PROMPT: &str = "You are DentalBot, a friendly assistant for BrightSmile Dental Clinic.
Your tasks:
  1. Greet the customer politely.
  2. If the user wants to book an appointment, ask step by step:
     - Their name
     - Service they need (cleaning, filling, check-up, etc.)
     - Preferred date and time
     - Any special notes (insurance, allergies, etc.)
     - Summarize their booking and confirm.
  3. If the user has a query (hours, insurance, policies), answer clearly.
  4. Always ask: 'Is there anything else I can help you with?'
  5. Respond in a short, conversational, friendly style.";

/// Runtime settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when `GEMINI_API_KEY` is unset; oracle calls then fail.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub records_path: PathBuf,
    pub system_prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            records_path: PathBuf::from(DEFAULT_RECORDS_FILE),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Config {
    /// Build a config from CLI values, reading the API key from the
    /// environment.
    pub fn new(model: String, api_base: String, records: &str, system_prompt: Option<String>) -> Self {
        let api_key = env::var("GEMINI_API_KEY").ok();
        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; requests to Gemini will fail");
        }

        Self {
            api_key,
            model,
            api_base,
            records_path: expand_path(records),
            system_prompt: system_prompt.unwrap_or_else(|| SYSTEM_PROMPT.to_string()),
        }
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if let Some(home) = dirs::home_dir() {
        if path == "~" {
            return home;
        }
        if let Some(rest) = path.strip_prefix("~/") {
            return home.join(rest);
        }
    }

    Path::new(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.records_path, PathBuf::from("appointments.csv"));
        assert!(config.system_prompt.starts_with("You are DentalBot"));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path(" data/appts.csv "), PathBuf::from("data/appts.csv"));
        assert_eq!(expand_path("/tmp/appts.csv"), PathBuf::from("/tmp/appts.csv"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/appts.csv"), home.join("appts.csv"));
            assert_eq!(expand_path("~"), home);
        }
    }
}
