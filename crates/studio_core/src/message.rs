/// Correlation key of a timeline message. Assigned once, never reused.
pub type MessageId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Video,
    Loading,
    Error,
}

/// Progress attached to a loading placeholder while its job is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressInfo {
    pub message: String,
    /// 0..=100.
    pub progress: u8,
}

impl ProgressInfo {
    pub fn new(message: impl Into<String>, progress: u8) -> Self {
        Self {
            message: message.into(),
            progress: progress.min(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub kind: MessageKind,
    /// Text, or a reference to binary content.
    pub content: String,
    pub file_preview: Option<String>,
    pub progress_info: Option<ProgressInfo>,
}

impl Message {
    pub fn user_text(
        id: MessageId,
        content: impl Into<String>,
        file_preview: Option<String>,
    ) -> Self {
        Self {
            id,
            role: Role::User,
            kind: MessageKind::Text,
            content: content.into(),
            file_preview,
            progress_info: None,
        }
    }

    pub fn model(id: MessageId, kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Model,
            kind,
            content: content.into(),
            file_preview: None,
            progress_info: None,
        }
    }

    pub fn loading(id: MessageId, content: impl Into<String>) -> Self {
        Self::model(id, MessageKind::Loading, content)
    }

    pub fn error(id: MessageId, description: impl Into<String>) -> Self {
        Self::model(id, MessageKind::Error, description)
    }

    pub fn is_loading(&self) -> bool {
        self.kind == MessageKind::Loading
    }
}

/// What the user asked the backend to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Text,
    DescribeImage,
    TextToVideo,
    ImageToVideo,
}

impl RequestMode {
    pub fn requires_image(self) -> bool {
        matches!(self, RequestMode::DescribeImage | RequestMode::ImageToVideo)
    }
}

/// A file uploaded alongside a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// Local reference the renderer can show as a preview.
    pub preview: String,
}
