use std::sync::Arc;

use rbuddy_client::ResolutionGateway;
use rbuddy_flux::StateStore;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::interaction::InteractionStore;
use crate::state::DetailPanel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Comments were fetched and hydrated.
    Loaded,
    /// Comments were already hydrated; no request was made.
    Cached,
    /// The panel was closed or switched while the fetch was in flight.
    Discarded,
}

/// Drives the detail panel at `detail/panel` and hydrates comment lists.
pub struct DetailLoader {
    store: Arc<StateStore>,
    gateway: Arc<dyn ResolutionGateway>,
    interactions: Arc<InteractionStore>,
}

impl DetailLoader {
    pub fn new(
        store: Arc<StateStore>,
        gateway: Arc<dyn ResolutionGateway>,
        interactions: Arc<InteractionStore>,
    ) -> Self {
        Self { store, gateway, interactions }
    }

    pub fn panel(&self) -> DetailPanel {
        self.store.get_as(DetailPanel::PATH).unwrap_or_default()
    }

    /// Show `id`, fetching its comments unless they are already cached.
    pub async fn open(&self, id: &str) -> Result<OpenOutcome, SyncError> {
        let hydrated = self.interactions.get(id).map(|s| s.hydrated).unwrap_or(false);
        let ticket = self.begin(id, !hydrated);
        if hydrated {
            debug!(resolution = id, "detail served from cache");
            return Ok(OpenOutcome::Cached);
        }
        self.fetch(id, ticket).await
    }

    /// Re-fetch the resolution currently shown.
    pub async fn refresh(&self) -> Result<OpenOutcome, SyncError> {
        let id = self
            .panel()
            .open
            .ok_or_else(|| SyncError::Validation("No resolution is open.".into()))?;
        let ticket = self.begin(&id, true);
        self.fetch(&id, ticket).await
    }

    /// Hide the panel. Comments stay cached in the interaction store.
    pub fn close(&self) {
        self.store.upsert(DetailPanel::PATH, DetailPanel::default, |p: &mut DetailPanel| {
            p.ticket += 1;
            p.open = None;
            p.resolution = None;
            p.loading = false;
            p.error = None;
        });
    }

    fn begin(&self, id: &str, loading: bool) -> u64 {
        self.store.upsert(DetailPanel::PATH, DetailPanel::default, |p: &mut DetailPanel| {
            p.ticket += 1;
            p.resolution = p.resolution.take().filter(|r| r.id == id);
            p.open = Some(id.to_string());
            p.loading = loading;
            p.error = None;
            p.ticket
        })
    }

    fn is_current(&self, id: &str, ticket: u64) -> bool {
        let p = self.panel();
        p.ticket == ticket && p.is_open(id)
    }

    async fn fetch(&self, id: &str, ticket: u64) -> Result<OpenOutcome, SyncError> {
        let mark = self.interactions.mark();
        let result = self.gateway.fetch_detail(id).await;

        if !self.is_current(id, ticket) {
            warn!(resolution = id, "detail panel moved on, dropping result");
            return Ok(OpenOutcome::Discarded);
        }

        match result {
            Ok(detail) => {
                let count = detail.comments.len();
                let summary = detail.summary.clone();
                self.interactions.hydrate_as_of(detail, mark);
                self.store.update(DetailPanel::PATH, |p: &mut DetailPanel| {
                    if p.ticket == ticket {
                        p.loading = false;
                        p.resolution = Some(summary);
                    }
                });
                info!(resolution = id, comments = count, "detail loaded");
                Ok(OpenOutcome::Loaded)
            }
            Err(e) => {
                let err = SyncError::from(e);
                let message = err.user_message();
                self.store.update(DetailPanel::PATH, |p: &mut DetailPanel| {
                    if p.ticket == ticket {
                        p.loading = false;
                        p.error = Some(message);
                    }
                });
                warn!(resolution = id, "detail failed: {}", err);
                Err(err)
            }
        }
    }
}
