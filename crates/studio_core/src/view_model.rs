use crate::Message;

/// Content of the loading placeholder before any progress arrives.
pub const LOADING_TEXT: &str = "Thinking...";
/// Prompt used when an image is described without any user text.
pub const DEFAULT_DESCRIBE_PROMPT: &str = "Describe this image.";
/// Error shown when an image mode is submitted without a file.
pub const MISSING_IMAGE_TEXT: &str = "Please upload an image.";
/// Error shown when a text-only mode is submitted with just a file.
pub const MISSING_PROMPT_TEXT: &str = "Please enter a prompt.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationView {
    pub messages: Vec<Message>,
    /// Jobs whose placeholder has not settled yet.
    pub in_flight: usize,
    pub dirty: bool,
}

impl ConversationView {
    pub fn loading_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_loading()).count()
    }
}
