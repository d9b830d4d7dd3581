use studio_logging::{studio_debug, studio_warn};

use crate::view_model::{
    DEFAULT_DESCRIBE_PROMPT, LOADING_TEXT, MISSING_IMAGE_TEXT, MISSING_PROMPT_TEXT,
};
use crate::{AppState, Attachment, Effect, Message, Msg, RequestMode};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PromptSubmitted {
            prompt,
            attachment,
            mode,
        } => submit_prompt(&mut state, prompt, attachment, mode),
        Msg::JobProgress {
            message_id,
            progress,
        } => {
            if !state.apply_progress(message_id, progress) {
                studio_debug!("Progress for message {} had no loading target", message_id);
            }
            Vec::new()
        }
        Msg::JobSucceeded {
            message_id,
            kind,
            content,
        } => {
            if !state.settle(message_id, Message::model(message_id, kind, content)) {
                studio_warn!("Result for unknown message {} dropped", message_id);
            }
            Vec::new()
        }
        Msg::JobFailed {
            message_id,
            description,
        } => {
            if !state.settle(message_id, Message::error(message_id, description)) {
                studio_warn!("Failure for unknown message {} dropped", message_id);
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit_prompt(
    state: &mut AppState,
    prompt: String,
    attachment: Option<Attachment>,
    mode: RequestMode,
) -> Vec<Effect> {
    let prompt = prompt.trim().to_string();
    if prompt.is_empty() && attachment.is_none() {
        return Vec::new();
    }

    let user_content = if prompt.is_empty() {
        let name = attachment.as_ref().map(|a| a.name.as_str()).unwrap_or_default();
        format!("Uploaded file: {name}")
    } else {
        prompt.clone()
    };
    let preview = attachment.as_ref().map(|a| a.preview.clone());
    let user_id = state.next_id();
    state.append(Message::user_text(user_id, user_content, preview));

    let message_id = state.next_id();
    state.append(Message::loading(message_id, LOADING_TEXT));

    let effect = match (mode, attachment) {
        (RequestMode::Text | RequestMode::TextToVideo, _) if prompt.is_empty() => {
            state.settle(message_id, Message::error(message_id, MISSING_PROMPT_TEXT));
            return Vec::new();
        }
        (RequestMode::Text, _) => Effect::GenerateText { message_id, prompt },
        (RequestMode::TextToVideo, _) => Effect::GenerateVideo {
            message_id,
            prompt,
            attachment: None,
        },
        (RequestMode::DescribeImage, Some(attachment)) => {
            let prompt = if prompt.is_empty() {
                DEFAULT_DESCRIBE_PROMPT.to_string()
            } else {
                prompt
            };
            Effect::DescribeImage {
                message_id,
                prompt,
                attachment,
            }
        }
        (RequestMode::ImageToVideo, Some(attachment)) => Effect::GenerateVideo {
            message_id,
            prompt,
            attachment: Some(attachment),
        },
        (RequestMode::DescribeImage | RequestMode::ImageToVideo, None) => {
            state.settle(message_id, Message::error(message_id, MISSING_IMAGE_TEXT));
            return Vec::new();
        }
    };

    state.start_job(message_id);
    vec![effect]
}
