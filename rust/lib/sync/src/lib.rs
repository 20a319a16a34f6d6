//! rbuddy sync engine.
//!
//! Keeps the like and comment state of every resolution the user has seen in
//! one Flux store, applies user actions optimistically, and reconciles with
//! the server through a [`ResolutionGateway`](rbuddy_client::ResolutionGateway).
//!
//! # Components
//!
//! - [`InteractionStore`]: `interaction/{id}` entries and the like/comment
//!   state machines.
//! - [`FeedAggregate`]: paged feed at `feed/state`.
//! - [`DetailLoader`]: detail panel at `detail/panel`, comment hydration.
//! - [`CommentComposer`], [`ResolutionComposer`], [`ProfileEditor`]: forms.
//! - [`OwnLoader`]: the user's own resolutions at `me/resolutions`.
//! - [`ResolutionsApp`]: all of the above on one store, plus
//!   [`register_handlers`] to drive them through Flux requests.

mod app;
mod bff;
mod compose;
mod detail;
mod error;
mod feed;
mod interaction;
mod own;
mod rollback;
pub mod request;
mod session;
pub mod state;

#[cfg(test)]
mod fake;

pub use app::{ResolutionsApp, SyncConfig};
pub use bff::register_handlers;
pub use compose::{validate_resolution, CommentComposer, ProfileEditor, ResolutionComposer};
pub use detail::{DetailLoader, OpenOutcome};
pub use error::SyncError;
pub use feed::{FeedAggregate, LoadOutcome};
pub use interaction::InteractionStore;
pub use own::OwnLoader;
pub use session::SessionHandle;
pub use state::InteractionState;
