use personasmith_core::error::ProviderError;

/// Errors that abort an agent run.
///
/// Tool failures never show up here; they are fed back to the model as
/// tool-result text.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("provider call failed on iteration {iteration}: {source}")]
    Provider {
        iteration: usize,
        #[source]
        source: ProviderError,
    },
}
