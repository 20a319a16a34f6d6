//! Input forms: per-resolution comment boxes, the new-resolution form and
//! the profile name.

use std::collections::HashSet;
use std::sync::Arc;

use rbuddy_client::{Comment, ResolutionGateway, Tag, MAX_TAGS};
use rbuddy_flux::StateStore;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::feed::FeedAggregate;
use crate::interaction::InteractionStore;
use crate::rollback::Rollback;
use crate::session::SessionHandle;
use crate::state::{CommentDraft, ResolutionDraft};

const COMMENT_FAILED: &str = "Failed to add comment. Please try again later.";
const POST_FAILED: &str = "Failed to share your resolution. Please try again later.";

fn form_message(err: &SyncError, remote_failure: &str) -> String {
    if err.is_remote() {
        remote_failure.to_string()
    } else {
        err.user_message()
    }
}

// ── Comment drafts ──────────────────────────────────────────────────

/// Comment boxes, one per resolution, at `compose/comment/{id}`.
pub struct CommentComposer {
    store: Arc<StateStore>,
    interactions: Arc<InteractionStore>,
}

impl CommentComposer {
    pub fn new(store: Arc<StateStore>, interactions: Arc<InteractionStore>) -> Self {
        Self { store, interactions }
    }

    pub fn draft(&self, id: &str) -> CommentDraft {
        self.store.get_as(&CommentDraft::path(id)).unwrap_or_default()
    }

    pub fn set_draft(&self, id: &str, text: &str) {
        self.store.upsert(&CommentDraft::path(id), CommentDraft::default, |d: &mut CommentDraft| {
            d.text = text.to_string();
            d.error = None;
        });
    }

    /// Post the draft of `id`.
    ///
    /// The draft is cleared only once the server has confirmed the comment;
    /// on any failure the text stays so the user can retry. A submit while
    /// the previous one is outstanding is refused and leaves the draft alone.
    pub async fn submit(&self, id: &str) -> Result<Comment, SyncError> {
        let path = CommentDraft::path(id);
        let text = self.store.upsert(&path, CommentDraft::default, |d: &mut CommentDraft| {
            if d.busy {
                return None;
            }
            d.busy = true;
            d.error = None;
            Some(d.text.clone())
        });
        let Some(text) = text else {
            return Err(SyncError::InFlight("comment"));
        };
        let idle = Rollback::new(&self.store, path.clone(), |d: &mut CommentDraft| d.busy = false);

        let result = self.interactions.add_comment(id, &text).await;
        idle.disarm();
        match result {
            Ok(comment) => {
                self.store.update(&path, |d: &mut CommentDraft| {
                    // Keep anything typed while the request was out.
                    if d.text == text {
                        d.text.clear();
                    }
                    d.busy = false;
                });
                Ok(comment)
            }
            Err(e) => {
                let message = form_message(&e, COMMENT_FAILED);
                self.store.update(&path, |d: &mut CommentDraft| {
                    d.busy = false;
                    d.error = Some(message);
                });
                Err(e)
            }
        }
    }
}

// ── New resolution ──────────────────────────────────────────────────

/// Trimmed text and de-duplicated tags, or why they are unacceptable.
pub fn validate_resolution(text: &str, tags: &[Tag]) -> Result<(String, Vec<Tag>), SyncError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SyncError::Validation("Resolution cannot be empty.".into()));
    }
    let mut seen = HashSet::new();
    if !tags.iter().all(|t| seen.insert(*t)) {
        return Err(SyncError::Validation("Each tag can only be used once.".into()));
    }
    if tags.len() > MAX_TAGS {
        return Err(SyncError::Validation(format!("You can select up to {} tags.", MAX_TAGS)));
    }
    Ok((text.to_string(), tags.to_vec()))
}

/// "Share your resolution" form at `compose/resolution`.
pub struct ResolutionComposer {
    store: Arc<StateStore>,
    gateway: Arc<dyn ResolutionGateway>,
    session: SessionHandle,
    feed: Arc<FeedAggregate>,
}

impl ResolutionComposer {
    pub fn new(
        store: Arc<StateStore>,
        gateway: Arc<dyn ResolutionGateway>,
        session: SessionHandle,
        feed: Arc<FeedAggregate>,
    ) -> Self {
        Self { store, gateway, session, feed }
    }

    pub fn draft(&self) -> ResolutionDraft {
        self.store.get_as(ResolutionDraft::PATH).unwrap_or_default()
    }

    /// Publish a new resolution and reload the feed so it shows up.
    pub async fn submit(&self, text: &str, tags: &[Tag]) -> Result<String, SyncError> {
        self.store.set(
            ResolutionDraft::PATH,
            ResolutionDraft { text: text.to_string(), tags: tags.to_vec(), busy: true, error: None },
        );

        let created = self.create(text, tags).await;
        match &created {
            Ok(id) => {
                self.store.set(ResolutionDraft::PATH, ResolutionDraft::default());
                info!(resolution = %id, "resolution shared");
                let sort = self.feed.state().sort;
                if let Err(e) = self.feed.reset_and_load(sort).await {
                    warn!("feed reload after post failed: {}", e);
                }
            }
            Err(e) => {
                let message = form_message(e, POST_FAILED);
                self.store.update(ResolutionDraft::PATH, |d: &mut ResolutionDraft| {
                    d.busy = false;
                    d.error = Some(message);
                });
            }
        }
        created
    }

    async fn create(&self, text: &str, tags: &[Tag]) -> Result<String, SyncError> {
        self.session.require_user(&self.store, "post")?;
        let (text, tags) = validate_resolution(text, tags)?;
        Ok(self.gateway.create_resolution(&text, &tags).await?)
    }
}

// ── Profile ─────────────────────────────────────────────────────────

pub struct ProfileEditor {
    store: Arc<StateStore>,
    gateway: Arc<dyn ResolutionGateway>,
    session: SessionHandle,
}

impl ProfileEditor {
    pub fn new(store: Arc<StateStore>, gateway: Arc<dyn ResolutionGateway>, session: SessionHandle) -> Self {
        Self { store, gateway, session }
    }

    /// Change the signed-in user's display name.
    pub async fn rename(&self, name: &str) -> Result<(), SyncError> {
        self.session.require_user(&self.store, "rename")?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::Validation("Name cannot be empty.".into()));
        }
        self.gateway.update_profile(name).await?;
        self.session.rename(name);
        self.session.publish(&self.store);
        info!("display name changed");
        Ok(())
    }
}
