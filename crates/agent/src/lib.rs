//! The persona update agent loop.
//!
//! The loop follows a **Call → Dispatch → Call** cycle:
//!
//! 1. **Send** the current prompt, the system prompt and the transcript to the provider
//! 2. **If tool calls**: execute them in order, append the results, loop back to step 1
//! 3. **If text response**: stop and hand the text back
//!
//! The loop is bounded by [`MAX_ITERATIONS`]. The final text is trimmed down to
//! whatever follows the [`COMPLETION_SENTINEL`].

pub mod error;
pub mod loop_runner;
pub mod prompt;
pub mod summary;

#[cfg(test)]
mod test_helpers;

pub use error::AgentError;
pub use loop_runner::{
    AgentLoop, AgentOutcome, LoopState, Termination, ITERATIONS_EXHAUSTED_TEXT, MAX_ITERATIONS,
};
pub use prompt::{build_update_system_prompt, INITIAL_PROMPT};
pub use summary::{extract_summary, COMPLETION_SENTINEL};
