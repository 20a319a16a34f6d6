//! Per-resolution like and comment state with optimistic updates.
//!
//! Every action is applied to `interaction/{id}` before the server is asked,
//! then either kept or undone when the server answers. The like and comment
//! sub-machines of one resolution are independent of each other, but each
//! allows only one outstanding request at a time. A request that is dropped
//! before it answers is undone as if the server had refused it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use rbuddy_client::{Comment, ResolutionDetail, ResolutionGateway, ResolutionSummary, PROVISIONAL_PREFIX};
use rbuddy_flux::{StateStore, StateValue, SubscriptionId};
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::rollback::Rollback;
use crate::session::SessionHandle;
use crate::state::InteractionState;

pub struct InteractionStore {
    store: Arc<StateStore>,
    gateway: Arc<dyn ResolutionGateway>,
    session: SessionHandle,
    /// Ticks once per like toggle.
    clock: AtomicU64,
}

impl InteractionStore {
    pub fn new(store: Arc<StateStore>, gateway: Arc<dyn ResolutionGateway>, session: SessionHandle) -> Self {
        Self {
            store,
            gateway,
            session,
            clock: AtomicU64::new(0),
        }
    }

    pub fn get(&self, id: &str) -> Option<InteractionState> {
        self.store.get_as(&InteractionState::path(id))
    }

    /// Watch one resolution.
    pub fn subscribe<F>(&self, id: &str, f: F) -> SubscriptionId
    where
        F: Fn(&InteractionState) + Send + Sync + 'static,
    {
        self.store.subscribe(&InteractionState::path(id), move |_, v: &StateValue| {
            if let Some(s) = v.downcast_ref::<InteractionState>() {
                f(s);
            }
        })
    }

    /// Watch every resolution.
    pub fn subscribe_all<F>(&self, f: F) -> SubscriptionId
    where
        F: Fn(&InteractionState) + Send + Sync + 'static,
    {
        self.store.subscribe(InteractionState::PATTERN, move |_, v: &StateValue| {
            if let Some(s) = v.downcast_ref::<InteractionState>() {
                f(s);
            }
        })
    }

    pub fn unsubscribe(&self, id: &str, sub: SubscriptionId) -> bool {
        self.store.unsubscribe(&InteractionState::path(id), sub)
    }

    pub fn unsubscribe_all(&self, sub: SubscriptionId) -> bool {
        self.store.unsubscribe(InteractionState::PATTERN, sub)
    }

    // ── Seeding ─────────────────────────────────────────────────────

    /// Clock reading to pass to [`seed_as_of`](Self::seed_as_of) or
    /// [`hydrate_as_of`](Self::hydrate_as_of). Take it before sending the
    /// request whose answer will be applied.
    pub fn mark(&self) -> u64 {
        self.clock.load(Ordering::SeqCst)
    }

    /// Track a resolution seen in a list, with no knowledge of when the
    /// snapshot was taken.
    ///
    /// Like fields are only taken over for ids this client has never toggled.
    pub fn seed(&self, summary: &ResolutionSummary) {
        self.seed_as_of(summary, 0);
    }

    /// Track a resolution seen in a list fetched after `mark`.
    ///
    /// An id seen for the first time is inserted as-is. For a tracked id only
    /// the idle parts are refreshed: like fields unless a toggle is pending or
    /// started after `mark`, the comment count unless the full list is held or
    /// a submit is pending.
    pub fn seed_as_of(&self, summary: &ResolutionSummary, mark: u64) {
        self.store.upsert(
            &InteractionState::path(&summary.id),
            || InteractionState::from_summary(summary),
            |s: &mut InteractionState| {
                take_likes(s, summary, mark);
                if !s.hydrated && !s.commenting {
                    s.comment_count = summary.comment_count;
                }
            },
        );
    }

    /// Take over the authoritative comment list from a detail fetch, with no
    /// knowledge of when the snapshot was taken.
    pub fn hydrate(&self, detail: ResolutionDetail) {
        self.hydrate_as_of(detail, 0);
    }

    /// Take over the authoritative comment list from a detail fetched after
    /// `mark`.
    ///
    /// While a submit is outstanding the list is parked and applied once the
    /// submit resolves, so the provisional comment is not clobbered.
    pub fn hydrate_as_of(&self, detail: ResolutionDetail, mark: u64) {
        let ResolutionDetail { summary, comments } = detail;
        let parked = self.store.upsert(
            &InteractionState::path(&summary.id),
            || InteractionState::from_summary(&summary),
            |s: &mut InteractionState| {
                take_likes(s, &summary, mark);
                if s.commenting {
                    s.parked = Some(comments);
                    true
                } else {
                    s.apply_comments(comments);
                    false
                }
            },
        );
        if parked {
            debug!(resolution = %summary.id, "comment submit pending, hydration deferred");
        } else {
            debug!(resolution = %summary.id, "hydrated");
        }
    }

    // ── Likes ───────────────────────────────────────────────────────

    /// Flip the user's like on `id`, optimistically.
    ///
    /// The count moves by exactly one in the direction of the new flag. If
    /// the server refuses, or the call is dropped before it answers, both
    /// fields go back to what they were.
    pub async fn toggle_like(&self, id: &str) -> Result<(), SyncError> {
        self.session.require_user(&self.store, "like")?;
        let path = InteractionState::path(id);

        let before = self
            .store
            .try_update(&path, |s: &mut InteractionState| {
                if s.liking {
                    return Err(SyncError::InFlight("like"));
                }
                let before = (s.like_count, s.has_liked);
                s.has_liked = !s.has_liked;
                s.like_count = if s.has_liked {
                    s.like_count + 1
                } else {
                    s.like_count.saturating_sub(1)
                };
                s.liking = true;
                s.like_epoch = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(before)
            })
            .ok_or_else(|| SyncError::UnknownResolution(id.to_string()))??;
        debug!(resolution = id, liked = !before.1, "like applied locally");

        let rollback = Rollback::new(&self.store, path.clone(), move |s: &mut InteractionState| {
            s.like_count = before.0;
            s.has_liked = before.1;
            s.liking = false;
        });

        match self.gateway.toggle_like(id).await {
            Ok(()) => {
                rollback.disarm();
                self.store.update(&path, |s: &mut InteractionState| s.liking = false);
                Ok(())
            }
            Err(e) => {
                rollback.fire();
                warn!(resolution = id, "like rolled back: {}", e);
                Err(e.into())
            }
        }
    }

    // ── Comments ────────────────────────────────────────────────────

    /// Post `text` as a comment on `id`, showing it immediately.
    ///
    /// Returns the comment as confirmed by the server.
    pub async fn add_comment(&self, id: &str, text: &str) -> Result<Comment, SyncError> {
        let user = self.session.require_user(&self.store, "comment")?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SyncError::Validation("Comment cannot be empty.".into()));
        }
        let path = InteractionState::path(id);

        let provisional = Comment {
            id: format!(
                "{}{}",
                PROVISIONAL_PREFIX,
                uuid::Uuid::new_v4().to_string().replace('-', "")
            ),
            text: text.to_string(),
            created_at: Utc::now(),
            author: user.as_author(),
        };
        let temp_id = provisional.id.clone();

        self.store
            .try_update(&path, |s: &mut InteractionState| {
                if s.commenting {
                    return Err(SyncError::InFlight("comment"));
                }
                s.comments.insert(0, provisional.clone());
                s.comment_count += 1;
                s.commenting = true;
                Ok(())
            })
            .ok_or_else(|| SyncError::UnknownResolution(id.to_string()))??;
        debug!(resolution = id, temp = %temp_id, "comment applied locally");

        let undo_id = temp_id.clone();
        let rollback = Rollback::new(&self.store, path.clone(), move |s: &mut InteractionState| {
            s.commenting = false;
            match s.parked.take() {
                Some(list) => s.apply_comments(list),
                None => {
                    let before = s.comments.len();
                    s.comments.retain(|c| c.id != undo_id);
                    if s.comments.len() < before {
                        s.comment_count = s.comment_count.saturating_sub(1);
                    }
                }
            }
        });

        match self.gateway.post_comment(id, text).await {
            Ok(server_id) => {
                rollback.disarm();
                let confirmed = Comment { id: server_id, ..provisional };
                self.store.update(&path, |s: &mut InteractionState| {
                    s.commenting = false;
                    match s.parked.take() {
                        Some(list) => {
                            let known = list.iter().any(|c| c.id == confirmed.id);
                            s.apply_comments(list);
                            if !known {
                                s.comments.insert(0, confirmed.clone());
                                s.comment_count += 1;
                            }
                        }
                        None => {
                            if let Some(c) = s.comments.iter_mut().find(|c| c.id == temp_id) {
                                c.id = confirmed.id.clone();
                            }
                        }
                    }
                });
                debug!(resolution = id, comment = %confirmed.id, "comment confirmed");
                Ok(confirmed)
            }
            Err(e) => {
                rollback.fire();
                warn!(resolution = id, "comment rolled back: {}", e);
                Err(e.into())
            }
        }
    }
}

/// Copy the like fields of a snapshot fetched after `mark`, unless a toggle
/// is pending or has started since.
fn take_likes(s: &mut InteractionState, summary: &ResolutionSummary, mark: u64) {
    if s.liking || s.like_epoch > mark {
        return;
    }
    s.like_count = summary.like_count;
    s.has_liked = summary.has_liked;
}
