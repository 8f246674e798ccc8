//! Ordered collection of transient user-visible notices.

use std::time::Duration;

/// Opaque notice handle. Ids increase monotonically and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoticeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
    Loading,
}

impl NoticeKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, NoticeKind::Success | NoticeKind::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub kind: NoticeKind,
    pub message: String,
    pub description: Option<String>,
    pub auto_dismiss_after: Option<Duration>,
}

/// Fields to replace in place on an existing notice. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoticePatch {
    pub kind: Option<NoticeKind>,
    pub message: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub auto_dismiss_after: Option<Duration>,
}

impl NoticePatch {
    pub fn kind(mut self, kind: NoticeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn dismiss_after(mut self, after: Duration) -> Self {
        self.auto_dismiss_after = Some(after);
        self
    }
}

/// The notification channel. Display order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeBoard {
    next_id: u64,
    notices: Vec<Notice>,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self {
            next_id: 1,
            notices: Vec::new(),
        }
    }
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notice and returns its fresh id.
    pub fn add(
        &mut self,
        kind: NoticeKind,
        message: impl Into<String>,
        description: Option<String>,
        auto_dismiss_after: Option<Duration>,
    ) -> NoticeId {
        let id = NoticeId(self.next_id);
        self.next_id += 1;
        self.notices.push(Notice {
            id,
            kind,
            message: message.into(),
            description,
            auto_dismiss_after,
        });
        id
    }

    /// Applies `patch` in place. Returns the updated notice, or `None` when the
    /// id is gone (already dismissed), which is not an error.
    pub fn update(&mut self, id: NoticeId, patch: NoticePatch) -> Option<&Notice> {
        let notice = self.notices.iter_mut().find(|notice| notice.id == id)?;
        if let Some(kind) = patch.kind {
            notice.kind = kind;
        }
        if let Some(message) = patch.message {
            notice.message = message;
        }
        if let Some(description) = patch.description {
            notice.description = description;
        }
        if let Some(after) = patch.auto_dismiss_after {
            notice.auto_dismiss_after = Some(after);
        }
        Some(notice)
    }

    /// Idempotent removal.
    pub fn remove(&mut self, id: NoticeId) -> Option<Notice> {
        let index = self.notices.iter().position(|notice| notice.id == id)?;
        Some(self.notices.remove(index))
    }

    pub fn get(&self, id: NoticeId) -> Option<&Notice> {
        self.notices.iter().find(|notice| notice.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
