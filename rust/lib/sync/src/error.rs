use rbuddy_client::ApiError;

/// Failure of an engine operation.
///
/// Network and server failures come from the gateway and have already been
/// rolled back locally by the time the caller sees them. The other variants
/// are raised before any request is sent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    #[error("network: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("invalid input: {0}")]
    Validation(String),

    /// The action needs a signed-in session.
    #[error("login required")]
    LoginRequired,

    /// The same kind of operation is still outstanding for this resolution.
    #[error("{0} already in progress")]
    InFlight(&'static str),

    #[error("unknown resolution '{0}'")]
    UnknownResolution(String),
}

impl SyncError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Network(_) => {
                "Network error. Please check your connection and try again.".into()
            }
            SyncError::Server { status: 401, .. } | SyncError::LoginRequired => {
                "Please login to share your thoughts!".into()
            }
            SyncError::Server { status: 404, .. } | SyncError::UnknownResolution(_) => {
                "This resolution is no longer available.".into()
            }
            SyncError::Server { .. } => "Something went wrong. Please try again later.".into(),
            SyncError::Validation(msg) => msg.clone(),
            SyncError::InFlight(what) => format!("Please wait, your {} is still being sent.", what),
        }
    }

    /// True for failures that happened on the wire (as opposed to local
    /// validation).
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Network(_) | SyncError::Server { .. })
    }
}

impl From<ApiError> for SyncError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Network(msg) => SyncError::Network(msg),
            ApiError::Server { status, message } => SyncError::Server { status, message },
            ApiError::Auth(_) => SyncError::LoginRequired,
            ApiError::Decode(msg) => SyncError::Network(format!("unexpected response: {}", msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_onto_sync_errors() {
        assert_eq!(
            SyncError::from(ApiError::Network("reset".into())),
            SyncError::Network("reset".into())
        );
        assert_eq!(
            SyncError::from(ApiError::Server { status: 500, message: "boom".into() }),
            SyncError::Server { status: 500, message: "boom".into() }
        );
        assert_eq!(SyncError::from(ApiError::Auth("expired".into())), SyncError::LoginRequired);
        assert!(matches!(
            SyncError::from(ApiError::Decode("eof".into())),
            SyncError::Network(m) if m.contains("eof")
        ));
    }

    #[test]
    fn user_messages() {
        assert_eq!(
            SyncError::LoginRequired.user_message(),
            "Please login to share your thoughts!"
        );
        assert_eq!(
            SyncError::Validation("Comment cannot be empty.".into()).user_message(),
            "Comment cannot be empty."
        );
        assert_eq!(
            SyncError::Server { status: 404, message: String::new() }.user_message(),
            "This resolution is no longer available."
        );
        assert!(SyncError::InFlight("comment").user_message().contains("comment"));
    }

    #[test]
    fn remote_classification() {
        assert!(SyncError::Network("x".into()).is_remote());
        assert!(SyncError::Server { status: 502, message: String::new() }.is_remote());
        assert!(!SyncError::LoginRequired.is_remote());
        assert!(!SyncError::InFlight("like").is_remote());
    }
}
