/// Failure of a single gateway round trip.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("auth: {0}")]
    Auth(String),

    /// A 2xx response whose body did not have the expected shape.
    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_for_server_errors() {
        let e = ApiError::Server { status: 503, message: "down".into() };
        assert_eq!(e.status(), Some(503));
        assert_eq!(e.to_string(), "HTTP 503: down");
        assert_eq!(ApiError::Network("refused".into()).status(), None);
    }

    #[test]
    fn unauthorized_is_401() {
        assert!(ApiError::Server { status: 401, message: String::new() }.is_unauthorized());
        assert!(!ApiError::Server { status: 403, message: String::new() }.is_unauthorized());
    }
}
