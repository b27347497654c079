use crate::db::{self, Database};
use crate::dispatcher::BackoffPolicy;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_SITE_URL: &str = "https://dzowa-ai-notes.netlify.app";
pub const DEFAULT_SITE_NAME: &str = "DzowaAI Notes";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Free-tier models tried in order.
pub const DEFAULT_MODELS: &[&str] = &[
    "deepseek/deepseek-chat-v3-0324:free",
    "microsoft/phi-3-mini-128k-instruct:free",
    "mistralai/mistral-7b-instruct:free",
    "meta-llama/llama-3.2-3b-instruct:free",
    "google/gemma-2-9b-it:free",
    "huggingfaceh4/zephyr-7b-beta:free",
    "openchat/openchat-7b:free",
    "gryphe/mythomist-7b:free",
];

/// Keys accepted by the settings table.
pub const SETTING_KEYS: &[&str] = &[
    "openrouter_api_key",
    "deepseek_api_key",
    "openrouter_base_url",
    "ai_models",
    "ai_test_mode",
];

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<String>,
    pub site_url: Option<String>,
    pub site_name: Option<String>,
    /// Answer everything from the local fallback tables.
    pub test_mode: bool,
    pub timeout: Duration,
    pub backoff: BackoffPolicy,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            site_url: Some(DEFAULT_SITE_URL.to_string()),
            site_name: Some(DEFAULT_SITE_NAME.to_string()),
            test_mode: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            backoff: BackoffPolicy::default(),
            max_tokens: 300,
            temperature: 0.7,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn parse_models(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

impl AiConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AiConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        config.api_key = non_empty(lookup("OPENROUTER_API_KEY"))
            .or_else(|| non_empty(lookup("DEEPSEEK_API_KEY")));
        if let Some(url) = non_empty(lookup("OPENROUTER_BASE_URL")) {
            config.base_url = url;
        }
        if let Some(models) = non_empty(lookup("AI_MODELS")) {
            let models = parse_models(&models);
            if !models.is_empty() {
                config.models = models;
            }
        }
        if let Some(flag) = lookup("AI_TEST_MODE") {
            config.test_mode = parse_flag(&flag);
        }
        if let Some(secs) = lookup("AI_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    /// Persisted settings take precedence over the environment.
    pub fn apply_settings(mut self, db: &Database) -> db::Result<Self> {
        let key = non_empty(db.get_setting("openrouter_api_key")?)
            .or(non_empty(db.get_setting("deepseek_api_key")?));
        if key.is_some() {
            self.api_key = key;
        }
        if let Some(url) = non_empty(db.get_setting("openrouter_base_url")?) {
            self.base_url = url;
        }
        if let Some(models) = non_empty(db.get_setting("ai_models")?) {
            let models = parse_models(&models);
            if !models.is_empty() {
                self.models = models;
            }
        }
        if let Some(flag) = db.get_setting("ai_test_mode")? {
            self.test_mode = parse_flag(&flag);
        }
        Ok(self)
    }
}

/// Mask API keys for display: `abcd...wxyz`.
pub fn mask_secret(key: &str, value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if key.ends_with("_api_key") && chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = AiConfig::from_lookup(lookup(&[]));
        assert!(config.api_key.is_none());
        assert_eq!(config.models.len(), 8);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_deepseek_key_is_secondary() {
        let config = AiConfig::from_lookup(lookup(&[("DEEPSEEK_API_KEY", "ds")]));
        assert_eq!(config.api_key.as_deref(), Some("ds"));

        let config = AiConfig::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "or"),
            ("DEEPSEEK_API_KEY", "ds"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("or"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = AiConfig::from_lookup(lookup(&[("OPENROUTER_API_KEY", "  ")]));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_models_and_test_mode_from_env() {
        let config = AiConfig::from_lookup(lookup(&[
            ("AI_MODELS", "a, b,,c"),
            ("AI_TEST_MODE", "TRUE"),
        ]));
        assert_eq!(config.models, vec!["a", "b", "c"]);
        assert!(config.test_mode);
    }

    #[test]
    fn test_settings_override_environment() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("openrouter_api_key", "stored").unwrap();
        db.set_setting("ai_models", "x/y").unwrap();
        let config = AiConfig::from_lookup(lookup(&[("OPENROUTER_API_KEY", "env")]))
            .apply_settings(&db)
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("stored"));
        assert_eq!(config.models, vec!["x/y"]);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("openrouter_api_key", "sk-or-123456789"), "sk-o...6789");
        assert_eq!(mask_secret("openrouter_api_key", "short"), "short");
        assert_eq!(mask_secret("ai_models", "long-model-name"), "long-model-name");
    }
}
