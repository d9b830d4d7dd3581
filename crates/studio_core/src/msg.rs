use crate::{Attachment, MessageId, MessageKind, ProgressInfo, RequestMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a prompt, optionally with an uploaded file.
    PromptSubmitted {
        prompt: String,
        attachment: Option<Attachment>,
        mode: RequestMode,
    },
    /// Intermediate engine progress for the job behind a loading placeholder.
    JobProgress {
        message_id: MessageId,
        progress: ProgressInfo,
    },
    /// Engine finished the job and produced content.
    JobSucceeded {
        message_id: MessageId,
        kind: MessageKind,
        content: String,
    },
    /// Engine gave up on the job.
    JobFailed {
        message_id: MessageId,
        description: String,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
