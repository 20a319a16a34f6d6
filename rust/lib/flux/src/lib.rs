//! Flux: path-addressed state engine for the rbuddy client.
//!
//! The engine owns all view state. Front-ends render from it and talk to it
//! through three primitives:
//!
//! - `get(path)`: read the current value at a path (Arc, no copy)
//! - `emit(path, payload)`: send a request to the handler(s) for that path
//! - `subscribe(pattern)`: be told whenever a matching path is written
//!
//! # Paths
//!
//! Paths are `/`-separated. The sync engine uses, among others:
//! - `interaction/{resolution_id}`: like/comment state of one resolution
//! - `feed/state`: the paged feed
//! - `detail/panel`: which resolution the detail panel shows
//! - `compose/comment/{resolution_id}`: comment drafts
//!
//! # Patterns
//!
//! Subscriptions and request handlers accept MQTT-style wildcards:
//! `interaction/+` matches every resolution, `compose/#` matches everything
//! under `compose`, and `#` matches all paths.

pub mod app;
pub mod router;
pub mod store;
pub mod trie;
pub mod value;

pub use app::Flux;
pub use router::{BoxFuture, Payload, Router};
pub use store::{ChangeHandler, StateStore};
pub use value::{StateValue, SubscriptionId};
