//! The agent reasoning loop implementation.

use std::sync::Arc;

use personasmith_core::error::ToolError;
use personasmith_core::message::{Message, MessageToolCall, Transcript};
use personasmith_core::provider::{Provider, ProviderRequest, ProviderResponse, ResponseToolCall};
use personasmith_core::tool::{ToolCall, ToolSet};
use tracing::{debug, error, info, warn};

use crate::error::AgentError;
use crate::summary::{extract_summary, COMPLETION_SENTINEL};

/// Maximum provider calls per run.
pub const MAX_ITERATIONS: usize = 10;

/// Final text when the model is still calling tools after [`MAX_ITERATIONS`] turns.
pub const ITERATIONS_EXHAUSTED_TEXT: &str = "工具调用超过最大次数限制";

/// Assistant content recorded for a tool-calling turn without any text.
const TOOL_CALL_PLACEHOLDER: &str = "调用工具";

/// Prompt for every turn after the first; providers reject empty prompts.
const FOLLOW_UP_PROMPT: &str = " ";

/// Where a run currently stands.
#[derive(Debug, Clone)]
pub enum LoopState {
    /// Next step is a provider call.
    AwaitingResponse,
    /// The last response asked for tools; run them before calling again.
    DispatchingTools(ProviderResponse),
    /// The run is over.
    Terminated(Termination),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// The model answered without calling tools.
    Completed { final_text: String },
    /// The iteration cap was reached while the model was still calling tools.
    IterationsExhausted,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// User-facing text: whatever follows the completion sentinel, trimmed.
    pub summary: String,
    /// Raw final text before sentinel extraction.
    pub final_text: String,
    /// Number of provider calls made.
    pub iterations: usize,
    /// Total tool calls dispatched.
    pub tool_calls_made: usize,
    /// Tokens reported by the provider across all turns.
    pub total_tokens: u32,
    pub termination: Termination,
    pub transcript: Transcript,
}

/// Drives one provider through a bounded tool-calling conversation.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// Tools the model may call
    tools: ToolSet,

    /// Fixed instructions sent with every request
    system_prompt: String,

    /// Model override; `None` uses the provider default
    model: Option<String>,

    /// Marker separating reasoning from the summary
    sentinel: String,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(provider: Arc<dyn Provider>, tools: ToolSet, system_prompt: impl Into<String>) -> Self {
        Self {
            provider,
            tools,
            system_prompt: system_prompt.into(),
            model: None,
            sentinel: COMPLETION_SENTINEL.to_string(),
        }
    }

    /// Set the model override.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Use a different completion sentinel.
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Run the loop starting from `initial_prompt`.
    ///
    /// Provider failures abort the run. Tool failures are reported to the
    /// model as tool results and the run continues.
    pub async fn run(&self, initial_prompt: &str) -> Result<AgentOutcome, AgentError> {
        info!(
            provider = self.provider.name(),
            model = self.model.as_deref().unwrap_or("default"),
            tools = self.tools.len(),
            "Starting agent run"
        );

        let definitions = self.tools.definitions();
        let mut transcript = Transcript::new();
        let mut prompt = initial_prompt.to_string();
        let mut iterations = 0;
        let mut tool_calls_made = 0;
        let mut total_tokens = 0;
        let mut state = LoopState::AwaitingResponse;

        let termination = loop {
            state = match state {
                LoopState::AwaitingResponse if iterations >= MAX_ITERATIONS => {
                    warn!(iterations, "Tool call loop reached the iteration limit");
                    LoopState::Terminated(Termination::IterationsExhausted)
                }
                LoopState::AwaitingResponse => {
                    iterations += 1;
                    debug!(iteration = iterations, transcript = transcript.len(), "Agent loop iteration");

                    let request = ProviderRequest {
                        prompt: prompt.clone(),
                        system_prompt: self.system_prompt.clone(),
                        model: self.model.clone(),
                        tools: definitions.clone(),
                        contexts: transcript.messages().to_vec(),
                    };

                    let response = self
                        .provider
                        .complete(request)
                        .await
                        .map_err(|source| AgentError::Provider {
                            iteration: iterations,
                            source,
                        })?;

                    debug!(
                        iteration = iterations,
                        model = %response.model,
                        tool_calls = response.tool_calls.len(),
                        "Provider responded"
                    );
                    if let Some(usage) = &response.usage {
                        total_tokens += usage.total_tokens;
                    }

                    transcript.push(Message::user(prompt.as_str()));

                    if response.has_tool_calls() {
                        LoopState::DispatchingTools(response)
                    } else {
                        LoopState::Terminated(Termination::Completed {
                            final_text: final_text_of(&response),
                        })
                    }
                }
                LoopState::DispatchingTools(response) => {
                    tool_calls_made += response.tool_calls.len();
                    self.dispatch(&response, &mut transcript).await;
                    prompt = FOLLOW_UP_PROMPT.to_string();
                    LoopState::AwaitingResponse
                }
                LoopState::Terminated(termination) => break termination,
            };
        };

        let final_text = match &termination {
            Termination::Completed { final_text } => final_text.clone(),
            Termination::IterationsExhausted => ITERATIONS_EXHAUSTED_TEXT.to_string(),
        };
        let summary = extract_summary(&final_text, &self.sentinel);

        info!(iterations, tool_calls_made, total_tokens, "Agent run finished");

        Ok(AgentOutcome {
            summary,
            final_text,
            iterations,
            tool_calls_made,
            total_tokens,
            termination,
            transcript,
        })
    }

    /// Execute every tool call of one response, in order, and record the turn.
    async fn dispatch(&self, response: &ProviderResponse, transcript: &mut Transcript) {
        let mut descriptors = Vec::with_capacity(response.tool_calls.len());
        let mut results = Vec::with_capacity(response.tool_calls.len());

        for (index, call) in response.tool_calls.iter().enumerate() {
            let id = call
                .id
                .clone()
                .unwrap_or_else(|| format!("{}:{index}", call.name));

            let tool_call = ToolCall {
                id: id.clone(),
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            };

            debug!(tool = %call.name, call_id = %id, "Executing tool call");
            let output = match self.tools.execute(&tool_call).await {
                Ok(result) => result.output,
                Err(ToolError::NotFound(name)) => {
                    error!(tool = %name, "Tool not found");
                    format!("未找到工具: {name}")
                }
                Err(e) => {
                    error!(tool = %call.name, error = %e, "Tool execution failed");
                    format!("工具执行失败: {e}")
                }
            };

            descriptors.push(MessageToolCall {
                id: id.clone(),
                name: call.name.clone(),
                arguments: encode_arguments(call),
            });
            results.push(Message::tool_result(id, output));
        }

        let content = response
            .leading_text()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(TOOL_CALL_PLACEHOLDER);

        transcript.push(Message::assistant_tool_calls(content, descriptors));
        transcript.extend(results);
    }
}

/// Text of a tool-free response: first rendered chunk, else the raw completion.
fn final_text_of(response: &ProviderResponse) -> String {
    response
        .leading_text()
        .map(str::to_string)
        .or_else(|| response.completion_text.clone())
        .unwrap_or_default()
}

/// Arguments as they go back to the provider. Strings pass through untouched.
fn encode_arguments(call: &ResponseToolCall) -> String {
    match &call.arguments {
        serde_json::Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{build_update_system_prompt, INITIAL_PROMPT};
    use crate::test_helpers::{call, call_with_id, ScriptedProvider};
    use async_trait::async_trait;
    use personasmith_core::error::ProviderError;
    use personasmith_core::message::Role;
    use personasmith_core::provider::Usage;
    use personasmith_core::persona::{Persona, PersonaStore};
    use personasmith_core::tool::{Tool, ToolResult};
    use personasmith_store::InMemoryPersonaStore;
    use personasmith_tools::persona_toolset;
    use serde_json::json;

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str { "broken" }
        fn description(&self) -> &str { "Always fails" }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "broken".into(),
                reason: "disk on fire".into(),
            })
        }
    }

    fn bert_store() -> Arc<InMemoryPersonaStore> {
        Arc::new(InMemoryPersonaStore::with_personas(vec![Persona::new(
            "Bert",
            "You are Bert.",
        )]))
    }

    #[tokio::test]
    async fn text_only_response_completes_in_one_turn() {
        let provider = Arc::new(ScriptedProvider::new(vec![ProviderResponse::text(
            "[AGENT_DONE] nothing to do",
        )]));
        let agent = AgentLoop::new(provider.clone(), ToolSet::new(), "sys");

        let outcome = agent.run(INITIAL_PROMPT).await.unwrap();

        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.tool_calls_made, 0);
        assert_eq!(outcome.summary, "nothing to do");
        assert_eq!(outcome.transcript.len(), 1);
        assert_eq!(outcome.transcript.messages()[0].content, INITIAL_PROMPT);
        assert!(matches!(outcome.termination, Termination::Completed { .. }));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn persona_update_scenario() {
        let store = bert_store();
        let provider = Arc::new(ScriptedProvider::new(vec![
            ProviderResponse::tool_calls(vec![call("get_persona_detail", json!({"persona_id": "Bert"}))], None),
            ProviderResponse::tool_calls(
                vec![call(
                    "update_persona_details",
                    json!({"persona_id": "Bert", "system_prompt": "You are Bert. Speak formally."}),
                )],
                Some("Applying the change."),
            ),
            ProviderResponse::text("Done thinking. [AGENT_DONE] Bert's tone is now more formal."),
        ]));

        let system_prompt = build_update_system_prompt("Bert", "make him sound more formal", COMPLETION_SENTINEL);
        let agent = AgentLoop::new(provider.clone(), persona_toolset(store.clone()), system_prompt)
            .with_model(Some("gpt-4o-mini".into()));

        let outcome = agent.run(INITIAL_PROMPT).await.unwrap();

        assert_eq!(outcome.summary, "Bert's tone is now more formal.");
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.tool_calls_made, 2);
        assert_eq!(provider.call_count(), 3);

        // user, assistant, tool, user, assistant, tool, user
        let transcript = &outcome.transcript;
        assert_eq!(transcript.len(), 7);
        assert_eq!(transcript.count_role(&Role::User), 3);
        assert_eq!(transcript.count_role(&Role::Assistant), 2);
        assert_eq!(transcript.count_role(&Role::Tool), 2);

        let messages = transcript.messages();
        assert_eq!(messages[1].content, "调用工具");
        assert_eq!(messages[1].tool_calls[0].id, "get_persona_detail:0");
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("get_persona_detail:0"));
        assert!(messages[2].content.contains("You are Bert."));
        assert_eq!(messages[3].content, " ");
        assert_eq!(messages[4].content, "Applying the change.");

        let stored = store.get("Bert").await.unwrap().unwrap();
        assert_eq!(stored.system_prompt, "You are Bert. Speak formally.");

        let requests = provider.requests();
        assert_eq!(requests[0].prompt, INITIAL_PROMPT);
        assert!(requests[0].contexts.is_empty());
        assert_eq!(requests[0].tools.len(), 2);
        assert_eq!(requests[0].model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(requests[1].prompt, " ");
        assert_eq!(requests[1].contexts.len(), 3);
        assert_eq!(requests[2].contexts.len(), 6);
    }

    #[tokio::test]
    async fn iteration_cap_is_a_degraded_success() {
        let provider = Arc::new(ScriptedProvider::repeating(ProviderResponse::tool_calls(
            vec![call("get_persona_detail", json!({"persona_id": "Bert"}))],
            None,
        )));
        let agent = AgentLoop::new(provider.clone(), persona_toolset(bert_store()), "sys");

        let outcome = agent.run(INITIAL_PROMPT).await.unwrap();

        assert_eq!(provider.call_count(), MAX_ITERATIONS);
        assert_eq!(outcome.iterations, MAX_ITERATIONS);
        assert_eq!(outcome.termination, Termination::IterationsExhausted);
        assert_eq!(outcome.final_text, ITERATIONS_EXHAUSTED_TEXT);
        assert_eq!(outcome.summary, ITERATIONS_EXHAUSTED_TEXT);
        assert_eq!(outcome.tool_calls_made, MAX_ITERATIONS);
    }

    #[tokio::test]
    async fn unknown_and_failing_tools_do_not_abort() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ProviderResponse::tool_calls(
                vec![call("nope", json!({})), call("broken", json!({}))],
                Some("   "),
            ),
            ProviderResponse::text("[AGENT_DONE] gave up"),
        ]));
        let tools = ToolSet::new().with(Box::new(BrokenTool));
        let agent = AgentLoop::new(provider, tools, "sys");

        let outcome = agent.run(INITIAL_PROMPT).await.unwrap();
        let messages = outcome.transcript.messages();

        assert_eq!(messages[1].content, "调用工具");
        assert_eq!(messages[2].content, "未找到工具: nope");
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("nope:0"));
        assert!(messages[3].content.starts_with("工具执行失败: "));
        assert!(messages[3].content.contains("disk on fire"));
        assert_eq!(messages[3].tool_call_id.as_deref(), Some("broken:1"));
        assert_eq!(outcome.summary, "gave up");
    }

    #[tokio::test]
    async fn provider_ids_and_raw_arguments_are_kept() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ProviderResponse::tool_calls(
                vec![call_with_id("get_persona_detail", json!("{\"persona_id\": \"Bert\"}"), "call_abc")],
                None,
            ),
            ProviderResponse::text("ok"),
        ]));
        let agent = AgentLoop::new(provider, persona_toolset(bert_store()), "sys");

        let outcome = agent.run(INITIAL_PROMPT).await.unwrap();
        let assistant = &outcome.transcript.messages()[1];

        assert_eq!(assistant.tool_calls[0].id, "call_abc");
        assert_eq!(assistant.tool_calls[0].arguments, "{\"persona_id\": \"Bert\"}");
        assert_eq!(outcome.transcript.messages()[2].tool_call_id.as_deref(), Some("call_abc"));
    }

    #[tokio::test]
    async fn final_text_falls_back_to_completion_text() {
        let response = ProviderResponse {
            completion_text: Some("  raw answer ".into()),
            ..ProviderResponse::default()
        };
        let agent = AgentLoop::new(Arc::new(ScriptedProvider::new(vec![response])), ToolSet::new(), "sys");

        let outcome = agent.run(INITIAL_PROMPT).await.unwrap();
        assert_eq!(outcome.final_text, "  raw answer ");
        assert_eq!(outcome.summary, "raw answer");
    }

    #[tokio::test]
    async fn token_usage_is_summed_across_turns() {
        let usage = |total_tokens: u32| Some(Usage {
            prompt_tokens: total_tokens - 5,
            completion_tokens: 5,
            total_tokens,
        });
        let first = ProviderResponse {
            usage: usage(40),
            ..ProviderResponse::tool_calls(vec![call("get_persona_detail", json!({"persona_id": "Bert"}))], None)
        };
        let second = ProviderResponse {
            usage: usage(60),
            model: "gpt-4o-mini".into(),
            ..ProviderResponse::text("[AGENT_DONE] ok")
        };
        let provider = Arc::new(ScriptedProvider::new(vec![first, second]));
        let agent = AgentLoop::new(provider, persona_toolset(bert_store()), "sys");

        let outcome = agent.run(INITIAL_PROMPT).await.unwrap();
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.total_tokens, 100);
    }

    #[tokio::test]
    async fn empty_response_gives_empty_summary() {
        let agent = AgentLoop::new(
            Arc::new(ScriptedProvider::new(vec![ProviderResponse::default()])),
            ToolSet::new(),
            "sys",
        );
        let outcome = agent.run(INITIAL_PROMPT).await.unwrap();
        assert_eq!(outcome.summary, "");
    }

    #[tokio::test]
    async fn provider_failure_aborts_the_run() {
        let provider = Arc::new(ScriptedProvider::from_results(vec![
            Ok(ProviderResponse::tool_calls(
                vec![call("get_persona_detail", json!({"persona_id": "Bert"}))],
                None,
            )),
            Err(ProviderError::Network("connection reset".into())),
        ]));
        let agent = AgentLoop::new(provider, persona_toolset(bert_store()), "sys");

        let err = agent.run(INITIAL_PROMPT).await.unwrap_err();
        assert!(matches!(err, AgentError::Provider { iteration: 2, .. }));
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn custom_sentinel() {
        let agent = AgentLoop::new(
            Arc::new(ScriptedProvider::new(vec![ProviderResponse::text("x <<END>> y")])),
            ToolSet::new(),
            "sys",
        )
        .with_sentinel("<<END>>");
        assert_eq!(agent.run(INITIAL_PROMPT).await.unwrap().summary, "y");
    }
}
