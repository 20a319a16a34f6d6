//! View state published into the Flux store.
//!
//! Each type lives at a well-known path (`PATH`) or, for per-resolution
//! state, at a path derived from the resolution id (`path(id)`). Front-ends
//! subscribe to these paths and render whatever they find there.

use rbuddy_client::{Comment, ResolutionDetail, ResolutionSummary, SortKey, Tag, UserIdentity};
use serde::{Deserialize, Serialize};

// ── Interaction ─────────────────────────────────────────────────────

/// Like and comment state of one resolution, shared by every view that
/// shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    pub id: String,
    pub like_count: u32,
    pub has_liked: bool,
    pub comment_count: u32,
    /// Most recent first. Empty until the detail has been loaded, apart from
    /// comments posted from this client.
    pub comments: Vec<Comment>,
    /// A like toggle is waiting for the server.
    pub liking: bool,
    /// A comment submit is waiting for the server.
    pub commenting: bool,
    /// `comments` holds the server's complete list.
    pub hydrated: bool,
    /// Server list that arrived while a submit was outstanding.
    #[serde(skip)]
    pub(crate) parked: Option<Vec<Comment>>,
    /// Store clock reading when the last toggle started. Snapshots taken
    /// before it carry a like state this client has already moved past.
    #[serde(skip)]
    pub(crate) like_epoch: u64,
}

impl InteractionState {
    pub const PATTERN: &'static str = "interaction/+";

    pub fn path(id: &str) -> String {
        format!("interaction/{}", id)
    }

    pub fn from_summary(s: &ResolutionSummary) -> Self {
        Self {
            id: s.id.clone(),
            like_count: s.like_count,
            has_liked: s.has_liked,
            comment_count: s.comment_count,
            comments: Vec::new(),
            liking: false,
            commenting: false,
            hydrated: false,
            parked: None,
            like_epoch: 0,
        }
    }

    /// Take over the server's comment list.
    pub(crate) fn apply_comments(&mut self, comments: Vec<Comment>) {
        self.comment_count = comments.len() as u32;
        self.comments = comments;
        self.hydrated = true;
    }
}

// ── Feed ────────────────────────────────────────────────────────────

/// The paged public feed.
///
/// Counters inside `items` are the values seen when the page was fetched;
/// live counters are read from `interaction/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedState {
    pub items: Vec<ResolutionSummary>,
    pub sort: SortKey,
    /// 1-based page the next load will request.
    pub next_page: u32,
    pub has_more: bool,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Bumped on every reset; a page fetched under an older generation is
    /// dropped on arrival.
    #[serde(skip)]
    pub(crate) generation: u64,
}

impl FeedState {
    pub const PATH: &'static str = "feed/state";

    pub fn new(sort: SortKey) -> Self {
        Self {
            items: Vec::new(),
            sort,
            next_page: 1,
            has_more: true,
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

// ── Detail ──────────────────────────────────────────────────────────

/// Which resolution the detail panel shows, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPanel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,
    /// The resolution as of the last successful fetch for `open`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionSummary>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Bumped on every open, refresh and close.
    #[serde(skip)]
    pub(crate) ticket: u64,
}

impl DetailPanel {
    pub const PATH: &'static str = "detail/panel";

    pub fn is_open(&self, id: &str) -> bool {
        self.open.as_deref() == Some(id)
    }
}

// ── Compose ─────────────────────────────────────────────────────────

/// Comment input box of one resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub text: String,
    pub busy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommentDraft {
    pub fn path(id: &str) -> String {
        format!("compose/comment/{}", id)
    }
}

/// "Share your resolution" form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDraft {
    pub text: String,
    pub tags: Vec<Tag>,
    pub busy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolutionDraft {
    pub const PATH: &'static str = "compose/resolution";
}

// ── Own resolutions ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnResolutions {
    pub items: Vec<ResolutionSummary>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OwnResolutions {
    pub const PATH: &'static str = "me/resolutions";
}

// ── Auth / app ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthPhase {
    Anonymous,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub phase: AuthPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserIdentity>,
    pub busy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthState {
    pub const PATH: &'static str = "auth/state";

    pub fn anonymous() -> Self {
        Self {
            phase: AuthPhase::Anonymous,
            user: None,
            busy: false,
            error: None,
        }
    }
}

/// Set when an anonymous user attempts an action that needs a session. The
/// front-end shows its login dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPrompt {
    pub message: String,
    /// What the user tried to do: `like`, `comment`, `post`, ...
    pub action: String,
}

impl LoginPrompt {
    pub const PATH: &'static str = "app/login-prompt";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Latest user-facing message (toast).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub const PATH: &'static str = "app/notice";

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

impl From<&ResolutionDetail> for InteractionState {
    fn from(d: &ResolutionDetail) -> Self {
        let mut s = InteractionState::from_summary(&d.summary);
        s.apply_comments(d.comments.clone());
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rbuddy_client::Author;

    fn summary() -> ResolutionSummary {
        ResolutionSummary {
            id: "r1".into(),
            author_id: "u1".into(),
            author_name: "Ana".into(),
            text: "Read 20 books".into(),
            tags: vec![Tag::Education],
            like_count: 3,
            comment_count: 7,
            has_liked: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn paths() {
        assert_eq!(InteractionState::path("r1"), "interaction/r1");
        assert_eq!(CommentDraft::path("r1"), "compose/comment/r1");
    }

    #[test]
    fn seeded_state_is_not_hydrated() {
        let s = InteractionState::from_summary(&summary());
        assert_eq!((s.like_count, s.has_liked, s.comment_count), (3, true, 7));
        assert!(s.comments.is_empty());
        assert!(!s.hydrated);
    }

    #[test]
    fn hydrated_state_counts_its_comments() {
        let comment = Comment {
            id: "c1".into(),
            text: "Go for it".into(),
            created_at: Utc::now(),
            author: Author { id: "u2".into(), name: "Bo".into() },
        };
        let d = ResolutionDetail { summary: summary(), comments: vec![comment] };
        let s = InteractionState::from(&d);
        assert!(s.hydrated);
        assert_eq!(s.comment_count, 1);
    }

    #[test]
    fn internal_fields_stay_out_of_json() {
        let v = serde_json::to_value(FeedState::new(SortKey::Popularity)).unwrap();
        assert_eq!(v["sort"], "popularity");
        assert_eq!(v["nextPage"], 1);
        assert!(v.get("generation").is_none());
        assert!(v.get("error").is_none());
    }
}
