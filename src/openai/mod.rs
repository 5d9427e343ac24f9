mod completer;
mod core;

pub use completer::{
    Completer, Completion, OpenAiCompleter, SharedCompleter, UpstreamError, parse_reply,
};
pub use self::core::{Message, Role, completion};
