//! rbuddy HTTP client.
//!
//! Typed access to the resolutions REST API. Authentication is handled by
//! pluggable [`TokenSource`] implementations; the sync engine talks to the
//! server only through the [`ResolutionGateway`] trait.
//!
//! ```ignore
//! use rbuddy_client::{HttpGateway, ResolutionGateway, SortKey, StaticToken};
//!
//! let gw = HttpGateway::new("http://localhost:8080", Arc::new(StaticToken::new(jwt)));
//! let page = gw.fetch_page(1, 10, SortKey::Recency).await?;
//! ```

mod error;
mod gateway;
mod model;
mod token;
mod wire;


pub use error::ApiError;
pub use gateway::{HttpGateway, ResolutionGateway};
pub use model::{
    Author, Comment, Page, ResolutionDetail, ResolutionSummary, SortKey, Tag, UnknownTag,
    UserIdentity, MAX_TAGS, PROVISIONAL_PREFIX,
};
pub use token::{NoAuth, StaticToken, TokenSource};
