use crate::{Attachment, MessageId};

/// Work the platform layer must hand to the engine.
///
/// Every effect carries the correlation id of the loading placeholder it
/// will eventually settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    GenerateText {
        message_id: MessageId,
        prompt: String,
    },
    DescribeImage {
        message_id: MessageId,
        prompt: String,
        attachment: Attachment,
    },
    GenerateVideo {
        message_id: MessageId,
        prompt: String,
        attachment: Option<Attachment>,
    },
}

impl Effect {
    pub fn message_id(&self) -> MessageId {
        match self {
            Effect::GenerateText { message_id, .. }
            | Effect::DescribeImage { message_id, .. }
            | Effect::GenerateVideo { message_id, .. } => *message_id,
        }
    }
}
