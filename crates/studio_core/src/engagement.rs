//! Optimistic like toggles and their bookkeeping until the remote call resolves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::content::{Engagement, EntityRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MutationId(pub u64);

/// Whether a failed remote toggle is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeFailurePolicy {
    /// Revert and log only.
    #[default]
    Silent,
    /// Revert and raise an error notice.
    Notify,
}

/// Which in-memory copy of an entity a toggle touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyLocation {
    Collection,
    Detail,
}

/// Exact change made to one copy, so a revert undoes precisely that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedToggle {
    pub location: CopyLocation,
    pub count_delta: i8,
}

/// `generation` is the feed generation the toggle was applied to. Once a
/// refresh has replaced those copies the revert has nothing left to undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLike {
    pub target: EntityRef,
    pub applied: Vec<AppliedToggle>,
    pub generation: u64,
}

/// How the most recently resolved remote toggle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeOutcome {
    pub mutation: MutationId,
    pub target: EntityRef,
    pub result: Result<(), String>,
}

/// Flips the like flag and moves the count by one. Never underflows; the
/// returned delta is what was actually applied.
pub fn toggle(engagement: &mut Engagement) -> i8 {
    engagement.liked_by_current_user = !engagement.liked_by_current_user;
    if engagement.liked_by_current_user {
        engagement.like_count += 1;
        1
    } else if engagement.like_count > 0 {
        engagement.like_count -= 1;
        -1
    } else {
        0
    }
}

/// Takes back one failed `toggle` by toggling the copy's current state again,
/// so later toggles that already landed stay counted. A toggle that saturated
/// at zero (`count_delta == 0`) gives nothing back when re-liked.
pub fn revert(engagement: &mut Engagement, count_delta: i8) {
    engagement.liked_by_current_user = !engagement.liked_by_current_user;
    if engagement.liked_by_current_user {
        if count_delta != 0 {
            engagement.like_count += 1;
        }
    } else {
        engagement.like_count = engagement.like_count.saturating_sub(1);
    }
}

/// Optimistic toggles whose remote call has not resolved yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LikeLedger {
    next_id: u64,
    pending: BTreeMap<MutationId, PendingLike>,
    last_outcome: Option<LikeOutcome>,
}

impl LikeLedger {
    pub fn begin(
        &mut self,
        target: EntityRef,
        applied: Vec<AppliedToggle>,
        generation: u64,
    ) -> MutationId {
        self.next_id += 1;
        let id = MutationId(self.next_id);
        self.pending.insert(
            id,
            PendingLike {
                target,
                applied,
                generation,
            },
        );
        id
    }

    /// Closes a pending toggle and remembers how it ended. Unknown ids change nothing.
    pub fn resolve(&mut self, id: MutationId, result: &Result<(), String>) -> Option<PendingLike> {
        let pending = self.pending.remove(&id)?;
        self.last_outcome = Some(LikeOutcome {
            mutation: id,
            target: pending.target.clone(),
            result: result.clone(),
        });
        Some(pending)
    }

    pub fn last_outcome(&self) -> Option<&LikeOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn in_flight(&self, target: &EntityRef) -> usize {
        self.pending
            .values()
            .filter(|pending| &pending.target == target)
            .count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
