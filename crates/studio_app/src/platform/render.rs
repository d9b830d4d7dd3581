use studio_core::{ConversationView, Message, MessageKind, Role};

/// One line per timeline message.
pub fn render(view: &ConversationView) -> Vec<String> {
    view.messages.iter().map(render_message).collect()
}

fn render_message(message: &Message) -> String {
    let speaker = match message.role {
        Role::User => "you",
        Role::Model => "model",
    };
    let body = match message.kind {
        MessageKind::Text => message.content.clone(),
        MessageKind::Image => format!("[image] {}", message.content),
        MessageKind::Video => format!("[video] {}", message.content),
        MessageKind::Error => format!("[error] {}", message.content),
        MessageKind::Loading => match &message.progress_info {
            Some(info) => format!(
                "{} {} {}%",
                progress_bar(info.progress),
                info.message,
                info.progress
            ),
            None => message.content.clone(),
        },
    };
    let attachment = message
        .file_preview
        .as_deref()
        .map(|preview| format!(" (attached {preview})"))
        .unwrap_or_default();
    format!("#{} {speaker}: {body}{attachment}", message.id)
}

fn progress_bar(progress: u8) -> String {
    const WIDTH: usize = 20;
    let filled = usize::from(progress.min(100)) * WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(WIDTH - filled))
}

/// Lines of `next` that are new or differ from `previous` at the same index.
pub fn changed_lines<'a>(previous: &[String], next: &'a [String]) -> Vec<&'a str> {
    next.iter()
        .enumerate()
        .filter(|(index, line)| previous.get(*index) != Some(*line))
        .map(|(_, line)| line.as_str())
        .collect()
}
