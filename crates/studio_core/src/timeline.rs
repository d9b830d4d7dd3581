use crate::{Message, MessageId, ProgressInfo};

/// Ordered conversation timeline.
///
/// Insertion order is preserved and never re-sorted. Messages are addressed
/// by their correlation id; a message keeps its id for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timeline {
    messages: Vec<Message>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Substitutes the message with `id` wholesale. Unknown ids are ignored.
    ///
    /// Returns whether a message was replaced.
    pub fn replace(&mut self, id: MessageId, mut message: Message) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(slot) => {
                message.id = id;
                *slot = message;
                true
            }
            None => false,
        }
    }

    /// Updates progress on the loading message with `id`.
    ///
    /// Messages that already settled are left untouched.
    pub fn update_progress(&mut self, id: MessageId, info: ProgressInfo) -> bool {
        match self
            .messages
            .iter_mut()
            .find(|m| m.id == id && m.is_loading())
        {
            Some(message) => {
                message.progress_info = Some(info);
                true
            }
            None => false,
        }
    }

    /// Updates progress on the first loading message, whichever job it belongs to.
    pub fn update_first_loading(&mut self, info: ProgressInfo) -> Option<MessageId> {
        let message = self.messages.iter_mut().find(|m| m.is_loading())?;
        message.progress_info = Some(info);
        Some(message.id)
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
