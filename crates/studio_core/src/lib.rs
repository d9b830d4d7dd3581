//! Studio core: pure conversation state, message timeline and update loop.
mod effect;
mod message;
mod msg;
mod state;
mod timeline;
mod update;
mod view_model;

pub use effect::Effect;
pub use message::{Attachment, Message, MessageId, MessageKind, ProgressInfo, RequestMode, Role};
pub use msg::Msg;
pub use state::{AppState, ProgressRouting};
pub use timeline::Timeline;
pub use update::update;
pub use view_model::{
    ConversationView, DEFAULT_DESCRIBE_PROMPT, LOADING_TEXT, MISSING_IMAGE_TEXT,
    MISSING_PROMPT_TEXT,
};
