use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;
use crate::model::{Page, ResolutionDetail, ResolutionSummary, SortKey, Tag, UserIdentity};
use crate::token::TokenSource;
use crate::wire::{
    CommentBody, CommentCreatedWire, CreateResolutionBody, DetailWire, LikeBody, ListWire,
    PageWire, ProfileBody, ResolutionCreatedWire, VerifyWire,
};

/// Every server round trip the sync engine performs.
///
/// The HTTP implementation is [`HttpGateway`]; tests substitute an
/// in-memory double.
#[async_trait::async_trait]
pub trait ResolutionGateway: Send + Sync + 'static {
    /// One page of the public feed. `page` is 1-based.
    async fn fetch_page(&self, page: u32, page_size: u32, sort: SortKey) -> Result<Page, ApiError>;

    async fn fetch_detail(&self, id: &str) -> Result<ResolutionDetail, ApiError>;

    /// Flip the caller's like on `id`. The server decides the direction.
    async fn toggle_like(&self, id: &str) -> Result<(), ApiError>;

    /// Returns the id the server assigned to the new comment.
    async fn post_comment(&self, id: &str, text: &str) -> Result<String, ApiError>;

    /// Returns the id of the new resolution.
    async fn create_resolution(&self, text: &str, tags: &[Tag]) -> Result<String, ApiError>;

    /// Resolutions authored by the signed-in user.
    async fn my_resolutions(&self) -> Result<Vec<ResolutionSummary>, ApiError>;

    /// Resolve the current token to a user.
    async fn verify_token(&self) -> Result<UserIdentity, ApiError>;

    async fn update_profile(&self, name: &str) -> Result<(), ApiError>;
}

/// REST gateway over reqwest.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    token_source: Arc<dyn TokenSource>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, token_source: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_source,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `base_url` followed by `segments`, each percent-encoded as exactly one
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        let invalid = || ApiError::Network(format!("invalid server url: {}", self.base_url));
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach the bearer token when the source has one.
    async fn authed(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.token_source.token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    /// Map non-2xx to `ApiError::Server`, then decode the body.
    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
        let resp = Self::expect_success(resp).await?;
        resp.json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }

    async fn expect_success(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Server { status: code, message: error_message(&body) })
    }

    async fn send<R: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<R, ApiError> {
        let req = self.authed(req).await?;
        let resp = req.send().await?;
        Self::parse(resp).await
    }

    async fn send_unit(&self, req: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let req = self.authed(req).await?;
        let resp = req.send().await?;
        Self::expect_success(resp).await.map(|_| ())
    }
}

/// The server answers errors as `{"error": "..."}` or `{"message": "..."}`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait::async_trait]
impl ResolutionGateway for HttpGateway {
    async fn fetch_page(&self, page: u32, page_size: u32, sort: SortKey) -> Result<Page, ApiError> {
        let req = self.http.get(self.url("/resolution")).query(&[
            ("page", page.to_string()),
            ("limit", page_size.to_string()),
            ("sort", sort.query_value().to_string()),
        ]);
        let wire: PageWire = self.send(req).await?;
        let items: Vec<ResolutionSummary> = wire
            .resolutions
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.into_summary())
            .collect();
        // Older servers omit `has_more`; a short page means the end.
        let has_more = wire.has_more.unwrap_or(items.len() as u32 >= page_size) && !items.is_empty();
        debug!(page, count = items.len(), has_more, "fetched feed page");
        Ok(Page { items, has_more })
    }

    async fn fetch_detail(&self, id: &str) -> Result<ResolutionDetail, ApiError> {
        let req = self.http.get(self.endpoint(&["resolution", id])?);
        let wire: DetailWire = self.send(req).await?;
        Ok(wire.data.into_detail(wire.has_liked))
    }

    async fn toggle_like(&self, id: &str) -> Result<(), ApiError> {
        let req = self.http.post(self.url("/resolution/likes")).json(&LikeBody { r_id: id });
        self.send_unit(req).await
    }

    async fn post_comment(&self, id: &str, text: &str) -> Result<String, ApiError> {
        let req = self
            .http
            .post(self.url("/resolution/comments"))
            .json(&CommentBody { r_id: id, comment: text });
        let wire: CommentCreatedWire = self.send(req).await?;
        wire.id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::Decode("comment response carried no id".into()))
    }

    async fn create_resolution(&self, text: &str, tags: &[Tag]) -> Result<String, ApiError> {
        let body = CreateResolutionBody {
            resolution: text,
            tags: tags.iter().map(Tag::as_str).collect(),
        };
        let req = self.http.post(self.url("/resolution")).json(&body);
        let wire: ResolutionCreatedWire = self.send(req).await?;
        wire.id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::Decode("create response carried no id".into()))
    }

    async fn my_resolutions(&self) -> Result<Vec<ResolutionSummary>, ApiError> {
        let req = self.http.get(self.url("/resolution/my"));
        let wire: ListWire = self.send(req).await?;
        Ok(wire
            .resolutions
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.into_summary())
            .collect())
    }

    async fn verify_token(&self) -> Result<UserIdentity, ApiError> {
        let req = self.http.get(self.url("/verify-token"));
        let wire: VerifyWire = self.send(req).await.map_err(|e| match e {
            ApiError::Server { status: 401, message } => ApiError::Auth(message),
            other => other,
        })?;
        Ok(wire.user.into_identity())
    }

    async fn update_profile(&self, name: &str) -> Result<(), ApiError> {
        let req = self.http.put(self.url("/profile")).json(&ProfileBody { name });
        self.send_unit(req).await
    }
}
