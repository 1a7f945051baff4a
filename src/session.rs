//! Per-chat session store.
//!
//! One `Session` per chat carries the dialogue state, the browse cursor and
//! the handles of the last rendered messages. All events for one chat run
//! under that chat's mutex, so state transitions never observe a torn
//! session; different chats proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use teloxide::types::{ChatId, MessageId};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::dialogue::DialogueState;

/// Paging position inside one subcategory's ordered product list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowseCursor {
    pub subcategory_id: i64,
    pub product_ids: Vec<i64>,
    pub index: usize,
}

impl BrowseCursor {
    /// Build a cursor at the first product; `None` when the list is empty,
    /// so an invariant holds: `index` is always within `product_ids`.
    pub fn new(subcategory_id: i64, product_ids: Vec<i64>) -> Option<Self> {
        if product_ids.is_empty() {
            return None;
        }
        Some(Self {
            subcategory_id,
            product_ids,
            index: 0,
        })
    }

    /// The product id under the cursor.
    pub fn current(&self) -> i64 {
        self.product_ids[self.index]
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.product_ids.len()
    }

    /// Move one step forward; at the last index this is a no-op.
    pub fn advance(&mut self) {
        if self.has_next() {
            self.index += 1;
        }
    }

    /// Move one step back; at index zero this is a no-op.
    pub fn retreat(&mut self) {
        if self.has_prev() {
            self.index -= 1;
        }
    }

    /// Re-anchor against a fresh listing of the same subcategory.
    ///
    /// Keeps the position of the currently shown product if it still
    /// exists, clamps the index otherwise. Returns `false` when the listing
    /// came back empty, in which case the cursor must be discarded and the
    /// parent scope re-rendered.
    pub fn sync(&mut self, fresh_ids: Vec<i64>) -> bool {
        if fresh_ids.is_empty() {
            return false;
        }
        let current = self.current();
        self.index = fresh_ids
            .iter()
            .position(|&id| id == current)
            .unwrap_or_else(|| self.index.min(fresh_ids.len() - 1));
        self.product_ids = fresh_ids;
        true
    }
}

/// Mutable conversation state for one chat.
#[derive(Debug, Default)]
pub struct Session {
    pub state: DialogueState,
    pub cursor: Option<BrowseCursor>,
    pub last_user_message: Option<MessageId>,
    pub last_bot_message: Option<MessageId>,
    /// Delayed re-render scheduled after a success line; superseded
    /// (aborted) by any newer event for this chat.
    pub pending_refresh: Option<JoinHandle<()>>,
}

impl Session {
    /// Return to `Idle`, dropping scratch data and the browse cursor.
    ///
    /// Message handles survive the reset so the next render can still
    /// clean up the previous screen.
    pub fn reset(&mut self) {
        self.state = DialogueState::Idle;
        self.cursor = None;
    }

    /// Abort the scheduled auto-refresh, if any.
    pub fn cancel_refresh(&mut self) {
        if let Some(task) = self.pending_refresh.take() {
            task.abort();
        }
    }
}

/// Process-wide map from chat to session. Cloning shares the same store.
///
/// Entries are created lazily on first contact and never removed; a stale
/// session simply sits idle.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<ChatId, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session for a chat, creating it on first contact.
    ///
    /// The outer map lock is held only for the lookup; callers lock the
    /// returned session for the duration of one event, which serializes
    /// events per chat without blocking other chats.
    pub async fn session(&self, chat_id: ChatId) -> Arc<Mutex<Session>> {
        let mut map = self.inner.lock().await;
        map.entry(chat_id).or_default().clone()
    }
}
