// state.rs
use crate::services::{CooldownStore, PendingReplyStore};
use crate::types::{ConversationId, PendingReply};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Replies queued by the "Reply with Goose" menu, keyed by channel.
#[derive(Default)]
pub struct PendingReplies {
    replies: Mutex<HashMap<ConversationId, PendingReply>>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pending_reply(&self, id: ConversationId, reply: PendingReply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.insert(id, reply);
        }
    }
}

impl PendingReplyStore for PendingReplies {
    fn get_pending_reply(&self, id: ConversationId) -> Option<PendingReply> {
        self.replies.lock().ok()?.get(&id).cloned()
    }

    fn clear_pending_reply(&self, id: ConversationId) {
        if let Ok(mut replies) = self.replies.lock() {
            if let Some(reply) = replies.remove(&id) {
                tracing::debug!(channel_id = %id, message_id = reply.message_id, "pending reply cleared");
            }
        }
    }
}

/// Local guess of each channel's slowmode, refreshed after every send.
#[derive(Default)]
pub struct SlowmodeTracker {
    deadlines: Mutex<HashMap<ConversationId, Instant>>,
}

impl SlowmodeTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CooldownStore for SlowmodeTracker {
    fn estimate_cooldown_ms(&self, id: ConversationId) -> u64 {
        let Ok(mut deadlines) = self.deadlines.lock() else {
            return 0;
        };
        let Some(deadline) = deadlines.get(&id) else {
            return 0;
        };

        let remaining = deadline.saturating_duration_since(Instant::now()).as_millis() as u64;
        if remaining == 0 {
            deadlines.remove(&id);
        }
        remaining
    }

    fn set_cooldown_ms(&self, id: ConversationId, cooldown_ms: u64) {
        if let Ok(mut deadlines) = self.deadlines.lock() {
            if cooldown_ms == 0 {
                deadlines.remove(&id);
            } else {
                deadlines.insert(id, Instant::now() + Duration::from_millis(cooldown_ms));
            }
        }
    }
}
