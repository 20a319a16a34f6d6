//! Requests a front-end emits on the Flux router.
//!
//! Each type carries the path it is dispatched on.

use rbuddy_client::{SortKey, Tag};

/// Adopt a bearer token obtained from the identity provider.
#[derive(Debug, Clone)]
pub struct LoginReq {
    pub token: String,
}

impl LoginReq {
    pub const PATH: &'static str = "auth/login";
}

#[derive(Debug, Clone)]
pub struct LogoutReq;

impl LogoutReq {
    pub const PATH: &'static str = "auth/logout";
}

/// Infinite-scroll trigger.
#[derive(Debug, Clone)]
pub struct FeedLoadMoreReq;

impl FeedLoadMoreReq {
    pub const PATH: &'static str = "feed/load-more";
}

/// Switch ordering; reloads from the first page.
#[derive(Debug, Clone)]
pub struct FeedSortReq {
    pub sort: SortKey,
}

impl FeedSortReq {
    pub const PATH: &'static str = "feed/sort";
}

#[derive(Debug, Clone)]
pub struct ToggleLikeReq {
    pub id: String,
}

impl ToggleLikeReq {
    pub const PATH: &'static str = "resolution/like";
}

/// Keystrokes in a comment box.
#[derive(Debug, Clone)]
pub struct CommentDraftReq {
    pub id: String,
    pub text: String,
}

impl CommentDraftReq {
    pub const PATH: &'static str = "comment/draft";
}

#[derive(Debug, Clone)]
pub struct CommentSubmitReq {
    pub id: String,
}

impl CommentSubmitReq {
    pub const PATH: &'static str = "comment/submit";
}

#[derive(Debug, Clone)]
pub struct DetailOpenReq {
    pub id: String,
}

impl DetailOpenReq {
    pub const PATH: &'static str = "detail/open";
}

#[derive(Debug, Clone)]
pub struct DetailRefreshReq;

impl DetailRefreshReq {
    pub const PATH: &'static str = "detail/refresh";
}

#[derive(Debug, Clone)]
pub struct DetailCloseReq;

impl DetailCloseReq {
    pub const PATH: &'static str = "detail/close";
}

#[derive(Debug, Clone)]
pub struct CreateResolutionReq {
    pub text: String,
    pub tags: Vec<Tag>,
}

impl CreateResolutionReq {
    pub const PATH: &'static str = "resolution/create";
}

#[derive(Debug, Clone)]
pub struct LoadOwnReq;

impl LoadOwnReq {
    pub const PATH: &'static str = "me/load";
}

#[derive(Debug, Clone)]
pub struct RenameReq {
    pub name: String,
}

impl RenameReq {
    pub const PATH: &'static str = "profile/rename";
}
