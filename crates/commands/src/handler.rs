//! The persona command handler.

use std::sync::Arc;

use personasmith_agent::{build_update_system_prompt, AgentLoop, COMPLETION_SENTINEL, INITIAL_PROMPT};
use personasmith_config::AppConfig;
use personasmith_core::format::{build_persona_detail_text, build_persona_list_text};
use personasmith_core::persona::PersonaStore;
use personasmith_core::provider::{Provider, ProviderDirectory};
use personasmith_core::reply::ReplySink;
use personasmith_tools::persona_toolset;
use tracing::{error, info, warn};

use crate::error::CommandError;
use crate::parse::{parse_command, parse_update_command, Command};

/// Interim reply sent before the agent starts.
pub const ANALYZING_REPLY: &str = "🔄 分析中...";

/// Handles the persona chat commands for one host.
pub struct PersonaCommands {
    store: Arc<dyn PersonaStore>,
    providers: Arc<dyn ProviderDirectory>,
    /// Provider to prefer for updates
    provider_id: Option<String>,
    /// Model override for updates
    model: Option<String>,
}

impl PersonaCommands {
    pub fn new(store: Arc<dyn PersonaStore>, providers: Arc<dyn ProviderDirectory>) -> Self {
        Self {
            store,
            providers,
            provider_id: None,
            model: None,
        }
    }

    /// Take the provider ID and model override from configuration.
    pub fn from_config(
        store: Arc<dyn PersonaStore>,
        providers: Arc<dyn ProviderDirectory>,
        config: &AppConfig,
    ) -> Self {
        Self::new(store, providers)
            .with_provider_id(config.provider_id().map(str::to_string))
            .with_model(config.model_override().map(str::to_string))
    }

    /// Prefer this provider for updates. Blank IDs count as unset.
    pub fn with_provider_id(mut self, provider_id: Option<String>) -> Self {
        self.provider_id = non_blank(provider_id);
        self
    }

    /// Override the provider's model for updates. Blank names count as unset.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = non_blank(model);
        self
    }

    /// Route one chat line to its command and send the replies.
    ///
    /// Only unknown commands and reply delivery failures come back as errors;
    /// everything else is answered through `replies`.
    pub async fn dispatch(
        &self,
        text: &str,
        origin: &str,
        replies: &dyn ReplySink,
    ) -> Result<(), CommandError> {
        match parse_command(text) {
            Ok(Command::Detail { persona_id }) => {
                replies.send(&self.detail(persona_id.as_deref()).await).await?;
                Ok(())
            }
            Ok(Command::List) => {
                replies.send(&self.list().await).await?;
                Ok(())
            }
            Ok(Command::Update {
                persona_id,
                requirement,
            }) => self.run_update(&persona_id, &requirement, origin, replies).await,
            Err(e) if e.is_user_facing() => {
                replies.send(&e.to_string()).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Text for `人格详情`.
    pub async fn detail(&self, persona_id: Option<&str>) -> String {
        let Some(persona_id) = persona_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return CommandError::MissingDetailId.to_string();
        };

        match self.store.get(persona_id).await {
            Ok(Some(persona)) => build_persona_detail_text(persona_id, &persona),
            Ok(None) => format!("未找到人格 '{persona_id}'。"),
            Err(e) => {
                error!(persona_id, error = %e, "Failed to load persona");
                format!("获取人格失败: {e}")
            }
        }
    }

    /// Text for `人格列表`.
    pub async fn list(&self) -> String {
        match self.store.get_all().await {
            Ok(personas) if personas.is_empty() => "数据库中暂无人格。".to_string(),
            Ok(personas) => build_persona_list_text(&personas),
            Err(e) => {
                error!(error = %e, "Failed to load personas");
                format!("获取人格失败: {e}")
            }
        }
    }

    /// Pick the provider for an update started from `origin`.
    ///
    /// A configured provider ID wins; if it is unknown the active provider
    /// for the conversation is used instead.
    pub fn resolve_provider(&self, origin: &str) -> Result<Arc<dyn Provider>, CommandError> {
        let provider = match &self.provider_id {
            Some(id) => self.providers.by_id(id).or_else(|| {
                warn!(provider_id = %id, "Configured provider not found or disabled, using the active provider");
                self.providers.active(origin)
            }),
            None => self.providers.active(origin),
        };

        provider.ok_or(CommandError::ProviderUnavailable)
    }

    /// Run a raw `人格更新` line: validate, then [`Self::run_update`].
    pub async fn update(
        &self,
        text: &str,
        origin: &str,
        replies: &dyn ReplySink,
    ) -> Result<(), CommandError> {
        match parse_update_command(text) {
            Ok((persona_id, requirement)) => self.run_update(&persona_id, &requirement, origin, replies).await,
            Err(e) => {
                replies.send(&e.to_string()).await?;
                Ok(())
            }
        }
    }

    /// Update `persona_id` according to `requirement`: resolve a provider,
    /// run the agent, report.
    pub async fn run_update(
        &self,
        persona_id: &str,
        requirement: &str,
        origin: &str,
        replies: &dyn ReplySink,
    ) -> Result<(), CommandError> {
        info!(
            persona_id = %persona_id,
            requirement = %requirement,
            store = self.store.name(),
            "Received persona update command"
        );

        let tools = persona_toolset(self.store.clone());

        let provider = match self.resolve_provider(origin) {
            Ok(provider) => provider,
            Err(e) => {
                error!(origin, "{e}");
                replies.send(&e.to_string()).await?;
                return Ok(());
            }
        };

        let system_prompt = build_update_system_prompt(persona_id, requirement, COMPLETION_SENTINEL);
        let agent = AgentLoop::new(provider, tools, system_prompt).with_model(self.model.clone());

        info!(persona_id = %persona_id, "Starting persona update agent");
        replies.send(ANALYZING_REPLY).await?;

        match agent.run(INITIAL_PROMPT).await {
            Ok(outcome) => {
                info!(
                    persona_id = %persona_id,
                    iterations = outcome.iterations,
                    tool_calls = outcome.tool_calls_made,
                    tokens = outcome.total_tokens,
                    "Persona update finished"
                );
                replies.send(&format!("✅ 更新完成\n{}", outcome.summary)).await?;
            }
            Err(e) => {
                error!(persona_id = %persona_id, error = %e, "Persona update agent failed");
                replies.send(&format!("❌ 更新失败: {e}")).await?;
            }
        }

        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
