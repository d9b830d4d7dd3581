use std::collections::BTreeSet;

use crate::view_model::ConversationView;
use crate::{Message, MessageId, ProgressInfo, Timeline};

/// How intermediate job progress finds the message it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressRouting {
    /// Route by the correlation id carried on the progress message.
    #[default]
    ById,
    /// Update whichever loading message comes first in the timeline.
    ///
    /// Misroutes progress when two jobs are in flight at once.
    FirstLoading,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    timeline: Timeline,
    last_id: MessageId,
    routing: ProgressRouting,
    in_flight: BTreeSet<MessageId>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_routing(routing: ProgressRouting) -> Self {
        Self {
            routing,
            ..Self::default()
        }
    }

    pub fn view(&self) -> ConversationView {
        ConversationView {
            messages: self.timeline.messages().to_vec(),
            in_flight: self.in_flight.len(),
            dirty: self.dirty,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn routing(&self) -> ProgressRouting {
        self.routing
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn next_id(&mut self) -> MessageId {
        self.last_id += 1;
        self.last_id
    }

    pub(crate) fn append(&mut self, message: Message) {
        self.timeline.append(message);
        self.dirty = true;
    }

    pub(crate) fn start_job(&mut self, id: MessageId) {
        self.in_flight.insert(id);
    }

    pub(crate) fn apply_progress(&mut self, id: MessageId, info: ProgressInfo) -> bool {
        let applied = match self.routing {
            ProgressRouting::ById => self.timeline.update_progress(id, info),
            ProgressRouting::FirstLoading => self.timeline.update_first_loading(info).is_some(),
        };
        self.dirty |= applied;
        applied
    }

    /// Settles the placeholder at `id`. Stale ids and settled messages are ignored.
    pub(crate) fn settle(&mut self, id: MessageId, message: Message) -> bool {
        self.in_flight.remove(&id);
        if !self.timeline.get(id).is_some_and(Message::is_loading) {
            return false;
        }
        let replaced = self.timeline.replace(id, message);
        self.dirty |= replaced;
        replaced
    }
}
