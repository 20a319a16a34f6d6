use crate::error::ApiError;

/// Supplies the bearer token for each request.
///
/// `Ok(None)` means "send the request anonymously". Reads such as the feed
/// work without a token; the server then reports `isLiked = false`.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

/// Anonymous requests only.
pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// A token obtained elsewhere (identity provider callback, config file).
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(Some(self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_auth_is_anonymous() {
        assert_eq!(NoAuth.token().await, Ok(None));
    }

    #[tokio::test]
    async fn static_token_is_returned_verbatim() {
        let ts = StaticToken::new("jwt-abc");
        assert_eq!(ts.token().await, Ok(Some("jwt-abc".to_string())));
    }
}
