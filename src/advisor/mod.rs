pub mod llm;
pub mod prompt;
pub mod reply;

pub use llm::{ChatCompletionClient, CompletionClient};
pub use prompt::{Prompt, PromptContext};
pub use reply::{parse_reply, ParsedReply};
