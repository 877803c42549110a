//! Provider router — the directory the command handler resolves providers from.
//!
//! Providers are registered by ID. One of them is the active default; a
//! conversation origin may pin a different active provider.

use std::collections::HashMap;
use std::sync::Arc;
use personasmith_core::provider::{Provider, ProviderDirectory};
use crate::openai_compat::OpenAiCompatProvider;

/// Routes provider lookups by ID and by conversation origin.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
    origin_overrides: HashMap<String, String>,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
            origin_overrides: HashMap::new(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Pin the active provider for one conversation origin.
    pub fn set_active_for(&mut self, origin: impl Into<String>, provider_id: impl Into<String>) {
        self.origin_overrides.insert(origin.into(), provider_id.into());
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }
}

impl ProviderDirectory for ProviderRouter {
    fn by_id(&self, id: &str) -> Option<Arc<dyn Provider>> {
        self.get(id)
    }

    fn active(&self, origin: &str) -> Option<Arc<dyn Provider>> {
        self.origin_overrides
            .get(origin)
            .and_then(|id| self.get(id))
            .or_else(|| self.default())
    }
}

/// Build providers from configuration.
pub fn build_from_config(config: &personasmith_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));

        let model = provider_config
            .default_model
            .clone()
            .unwrap_or_else(|| default_model(name).to_string());

        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(name, &base_url, &api_key, model)),
        );
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let name = &config.default_provider;
        let api_key = config.api_key.clone().unwrap_or_default();
        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(
                name,
                default_base_url(name),
                api_key,
                default_model(name),
            )),
        );
    }

    router
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "moonshot" => "https://api.moonshot.cn/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

/// Get the default model for well-known providers.
fn default_model(provider_name: &str) -> &'static str {
    match provider_name {
        "openrouter" => "openai/gpt-4o-mini",
        "ollama" => "qwen2.5",
        "deepseek" => "deepseek-chat",
        "groq" => "llama-3.3-70b-versatile",
        "moonshot" => "moonshot-v1-8k",
        _ => "gpt-4o-mini",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use personasmith_config::{AppConfig, ProviderConfig};

    fn provider(name: &str) -> Arc<OpenAiCompatProvider> {
        Arc::new(OpenAiCompatProvider::new(name, default_base_url(name), "sk-test", default_model(name)))
    }

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("openai");
        router.register("openai", provider("openai"));

        assert!(router.by_id("openai").is_some());
        assert!(router.by_id("nonexistent").is_none());
        assert!(router.active("cli").is_some());
    }

    #[test]
    fn origin_override_wins() {
        let mut router = ProviderRouter::new("openai");
        router.register("openai", provider("openai"));
        router.register("ollama", provider("ollama"));
        router.set_active_for("group:42", "ollama");

        assert_eq!(router.active("group:42").unwrap().name(), "ollama");
        assert_eq!(router.active("group:7").unwrap().name(), "openai");
    }

    #[test]
    fn dangling_origin_override_falls_back() {
        let mut router = ProviderRouter::new("openai");
        router.register("openai", provider("openai"));
        router.set_active_for("group:42", "gone");
        assert_eq!(router.active("group:42").unwrap().name(), "openai");
    }

    #[test]
    fn empty_router_has_no_active_provider() {
        let router = ProviderRouter::new("openai");
        assert!(router.active("cli").is_none());
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn build_from_default_config() {
        let router = build_from_config(&AppConfig::default());
        assert_eq!(router.default().unwrap().name(), "openai");
        assert_eq!(router.providers.len(), 1);
    }

    #[test]
    fn build_registers_configured_providers() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "deepseek".into(),
            ProviderConfig {
                api_key: Some("sk-ds".into()),
                ..ProviderConfig::default()
            },
        );
        let router = build_from_config(&config);
        assert!(router.by_id("deepseek").is_some());
        assert!(router.by_id("openai").is_some());
    }
}
