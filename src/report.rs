//! Renderers for diagnostic snapshots.
//!
//! - [`render_text`]: terminal report
//! - [`build_prompt`]: system and user messages for an LLM troubleshooting assistant

mod prompt;
mod text;

pub use prompt::{TroubleshootingPrompt, build_prompt, critical_failure};
pub use text::render_text;
