use serde::{Deserialize, Serialize};

/// A role-tagged message in a chat completion request.
///
/// The inference backend accepts a list of these under the Ollama chat wire
/// format; the pipeline only ever sends `system` and `user` messages and
/// receives `assistant` content back.
///
/// # Examples
///
/// ```
/// use papergist::message::Message;
///
/// let system = Message::system("You are a technical documentation writer.");
/// let user = Message::user("Extract technical content: ...");
/// assert_eq!(system.role, Message::SYSTEM);
/// assert_eq!(user.role, Message::USER);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender ("user" or "system" on the way out).
    pub role: String,
    /// The text content of the message.
    pub content: String,
}

impl Message {
    /// User input message role.
    pub const USER: &'static str = "user";
    /// System prompt or instruction message role.
    pub const SYSTEM: &'static str = "system";

    /// Creates a new message with the specified role and content.
    #[must_use]
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    /// Creates a user message with the specified content.
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self::new(Self::USER, content)
    }

    /// Creates a system message with the specified content.
    #[must_use]
    pub fn system(content: &str) -> Self {
        Self::new(Self::SYSTEM, content)
    }
}
