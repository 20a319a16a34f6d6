//! Scripted in-memory gateway for engine tests.
//!
//! Holds a small resolution database, counts calls per operation, and can be
//! told to fail an operation or to hold its next call until released.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, TimeZone, Utc};
use rbuddy_client::{
    ApiError, Author, Comment, Page, ResolutionDetail, ResolutionGateway, ResolutionSummary,
    SortKey, Tag, UserIdentity,
};
use rbuddy_flux::StateStore;
use tokio::sync::{Notify, Semaphore};

use crate::session::SessionHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchPage,
    FetchDetail,
    ToggleLike,
    PostComment,
    CreateResolution,
    MyResolutions,
    VerifyToken,
    UpdateProfile,
}

/// Parks one gateway call until the test releases it.
pub struct Gate {
    entered: Notify,
    open: Semaphore,
}

impl Gate {
    /// Resolves once the held call has reached the gateway.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.open.add_permits(1);
    }
}

pub fn user() -> UserIdentity {
    UserIdentity {
        id: "u1".into(),
        name: "Ana".into(),
        email: "ana@example.com".into(),
        avatar: None,
    }
}

pub fn summary(n: usize) -> ResolutionSummary {
    ResolutionSummary {
        id: format!("r{:02}", n),
        author_id: "u9".into(),
        author_name: "Zed".into(),
        text: format!("resolution {}", n),
        tags: vec![Tag::Health],
        like_count: 5,
        comment_count: 0,
        has_liked: false,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() - Duration::minutes(n as i64),
    }
}

pub fn comment(id: &str, text: &str, minutes: i64) -> Comment {
    Comment {
        id: id.into(),
        text: text.into(),
        created_at: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap() + Duration::minutes(minutes),
        author: Author { id: "u2".into(), name: "Bo".into() },
    }
}

pub struct FakeGateway {
    resolutions: Mutex<Vec<ResolutionSummary>>,
    comments: Mutex<HashMap<String, Vec<Comment>>>,
    liked: Mutex<HashSet<String>>,
    failures: Mutex<HashMap<Op, ApiError>>,
    gates: Mutex<HashMap<Op, Arc<Gate>>>,
    calls: Mutex<HashMap<Op, usize>>,
    pages: Mutex<Vec<(u32, SortKey)>>,
    posted: Mutex<Vec<(String, String)>>,
    created: Mutex<Vec<(String, Vec<Tag>)>>,
    next_id: AtomicU64,
}

impl FakeGateway {
    /// A database of `n` resolutions, newest first.
    pub fn new(n: usize) -> Self {
        Self {
            resolutions: Mutex::new((0..n).map(summary).collect()),
            comments: Mutex::new(HashMap::new()),
            liked: Mutex::new(HashSet::new()),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            pages: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_comments(self, id: &str, comments: Vec<Comment>) -> Self {
        {
            let mut all = self.resolutions.lock().unwrap();
            if let Some(r) = all.iter_mut().find(|r| r.id == id) {
                r.comment_count = comments.len() as u32;
            }
        }
        self.comments.lock().unwrap().insert(id.to_string(), comments);
        self
    }

    /// Fail every call of `op` with a network error until [`heal`](Self::heal).
    pub fn fail(&self, op: Op) {
        self.fail_with(op, ApiError::Network("connection reset".into()));
    }

    pub fn fail_with(&self, op: Op, err: ApiError) {
        self.failures.lock().unwrap().insert(op, err);
    }

    pub fn heal(&self, op: Op) {
        self.failures.lock().unwrap().remove(&op);
    }

    /// Hold the next call of `op`.
    pub fn hold(&self, op: Op) -> Arc<Gate> {
        let gate = Arc::new(Gate { entered: Notify::new(), open: Semaphore::new(0) });
        self.gates.lock().unwrap().insert(op, gate.clone());
        gate
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// `(page, sort)` of every `fetch_page` call.
    pub fn pages_requested(&self) -> Vec<(u32, SortKey)> {
        self.pages.lock().unwrap().clone()
    }

    pub fn posted_comments(&self) -> Vec<(String, String)> {
        self.posted.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(String, Vec<Tag>)> {
        self.created.lock().unwrap().clone()
    }

    pub fn server_like_count(&self, id: &str) -> Option<u32> {
        self.resolutions.lock().unwrap().iter().find(|r| r.id == id).map(|r| r.like_count)
    }

    async fn enter(&self, op: Op) -> Result<(), ApiError> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
        let gate = self.gates.lock().unwrap().remove(&op);
        if let Some(gate) = gate {
            gate.entered.notify_one();
            let _permit = gate.open.acquire().await;
        }
        match self.failures.lock().unwrap().get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn decorate(&self, mut s: ResolutionSummary) -> ResolutionSummary {
        s.has_liked = self.liked.lock().unwrap().contains(&s.id);
        s
    }

    fn not_found() -> ApiError {
        ApiError::Server { status: 404, message: "Resolution not found".into() }
    }
}

#[async_trait::async_trait]
impl ResolutionGateway for FakeGateway {
    async fn fetch_page(&self, page: u32, page_size: u32, sort: SortKey) -> Result<Page, ApiError> {
        self.pages.lock().unwrap().push((page, sort));
        self.enter(Op::FetchPage).await?;
        let mut all = self.resolutions.lock().unwrap().clone();
        if sort == SortKey::Popularity {
            all.sort_by(|a, b| b.like_count.cmp(&a.like_count));
        }
        let start = (page.saturating_sub(1) * page_size) as usize;
        let items: Vec<ResolutionSummary> = all
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .map(|s| self.decorate(s))
            .collect();
        let has_more = start + items.len() < all.len();
        Ok(Page { items, has_more })
    }

    async fn fetch_detail(&self, id: &str) -> Result<ResolutionDetail, ApiError> {
        // Answered on arrival; a held gate delays only the response.
        let summary = self.resolutions.lock().unwrap().iter().find(|r| r.id == id).cloned();
        let comments = self.comments.lock().unwrap().get(id).cloned().unwrap_or_default();
        let detail = summary.map(|s| ResolutionDetail { summary: self.decorate(s), comments });
        self.enter(Op::FetchDetail).await?;
        detail.ok_or_else(Self::not_found)
    }

    async fn toggle_like(&self, id: &str) -> Result<(), ApiError> {
        self.enter(Op::ToggleLike).await?;
        let mut all = self.resolutions.lock().unwrap();
        let r = all.iter_mut().find(|r| r.id == id).ok_or_else(Self::not_found)?;
        let mut liked = self.liked.lock().unwrap();
        if liked.remove(id) {
            r.like_count = r.like_count.saturating_sub(1);
        } else {
            liked.insert(id.to_string());
            r.like_count += 1;
        }
        Ok(())
    }

    async fn post_comment(&self, id: &str, text: &str) -> Result<String, ApiError> {
        self.posted.lock().unwrap().push((id.to_string(), text.to_string()));
        self.enter(Op::PostComment).await?;
        let server_id = format!("c-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let c = Comment {
            id: server_id.clone(),
            text: text.to_string(),
            created_at: Utc::now(),
            author: user().as_author(),
        };
        self.comments.lock().unwrap().entry(id.to_string()).or_default().insert(0, c);
        if let Some(r) = self.resolutions.lock().unwrap().iter_mut().find(|r| r.id == id) {
            r.comment_count += 1;
        }
        Ok(server_id)
    }

    async fn create_resolution(&self, text: &str, tags: &[Tag]) -> Result<String, ApiError> {
        self.created.lock().unwrap().push((text.to_string(), tags.to_vec()));
        self.enter(Op::CreateResolution).await?;
        let id = format!("new-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut s = summary(0);
        s.id = id.clone();
        s.text = text.to_string();
        s.tags = tags.to_vec();
        s.author_id = user().id;
        s.author_name = user().name;
        s.like_count = 0;
        s.created_at = Utc::now();
        self.resolutions.lock().unwrap().insert(0, s);
        Ok(id)
    }

    async fn my_resolutions(&self) -> Result<Vec<ResolutionSummary>, ApiError> {
        self.enter(Op::MyResolutions).await?;
        let mine = self
            .resolutions
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.author_id == user().id)
            .cloned()
            .collect::<Vec<_>>();
        Ok(mine.into_iter().map(|s| self.decorate(s)).collect())
    }

    async fn verify_token(&self) -> Result<UserIdentity, ApiError> {
        self.enter(Op::VerifyToken).await?;
        Ok(user())
    }

    async fn update_profile(&self, _name: &str) -> Result<(), ApiError> {
        self.enter(Op::UpdateProfile).await
    }
}

/// Store, fake gateway and a signed-in session.
pub fn fixture(n: usize) -> (Arc<StateStore>, Arc<FakeGateway>, SessionHandle) {
    (
        Arc::new(StateStore::new()),
        Arc::new(FakeGateway::new(n)),
        SessionHandle::signed_in("jwt", user()),
    )
}
