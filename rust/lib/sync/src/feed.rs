//! Paged public feed.

use std::collections::HashSet;
use std::sync::Arc;

use rbuddy_client::{ResolutionGateway, SortKey};
use rbuddy_flux::StateStore;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::interaction::InteractionStore;
use crate::rollback::Rollback;
use crate::state::FeedState;

/// What a load request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was appended.
    Loaded { added: usize, has_more: bool },
    /// Another load is outstanding; nothing was requested.
    AlreadyLoading,
    /// The server reported no further pages; nothing was requested.
    Exhausted,
    /// The feed was reset while the page was in flight; it was dropped.
    Discarded,
}

/// Accumulates feed pages into `feed/state`, one request at a time.
pub struct FeedAggregate {
    store: Arc<StateStore>,
    gateway: Arc<dyn ResolutionGateway>,
    interactions: Arc<InteractionStore>,
    page_size: u32,
}

impl FeedAggregate {
    pub fn new(
        store: Arc<StateStore>,
        gateway: Arc<dyn ResolutionGateway>,
        interactions: Arc<InteractionStore>,
        page_size: u32,
        sort: SortKey,
    ) -> Self {
        if !store.contains(FeedState::PATH) {
            store.set(FeedState::PATH, FeedState::new(sort));
        }
        Self {
            store,
            gateway,
            interactions,
            page_size: page_size.max(1),
        }
    }

    pub fn state(&self) -> FeedState {
        self.store
            .get_as(FeedState::PATH)
            .unwrap_or_else(|| FeedState::new(SortKey::default()))
    }

    /// Fetch the page at the cursor and append its unseen items.
    pub async fn load_next_page(&self) -> Result<LoadOutcome, SyncError> {
        if !self.store.contains(FeedState::PATH) {
            self.store.set(FeedState::PATH, FeedState::new(SortKey::default()));
        }
        let begun = self
            .store
            .try_update(FeedState::PATH, |s: &mut FeedState| {
                if s.loading {
                    return Err(LoadOutcome::AlreadyLoading);
                }
                if !s.has_more {
                    return Err(LoadOutcome::Exhausted);
                }
                s.loading = true;
                s.error = None;
                Ok((s.generation, s.next_page, s.sort))
            })
            .unwrap_or(Err(LoadOutcome::AlreadyLoading));
        match begun {
            Ok((generation, page, sort)) => {
                let settle = self.settle_on_drop(generation);
                let outcome = self.fetch(generation, page, sort).await;
                settle.disarm();
                outcome
            }
            Err(outcome) => Ok(outcome),
        }
    }

    /// Drop everything loaded so far and start again from page 1.
    ///
    /// A page still in flight from before the reset is discarded when it
    /// arrives.
    pub async fn reset_and_load(&self, sort: SortKey) -> Result<LoadOutcome, SyncError> {
        let generation = self.store.upsert(
            FeedState::PATH,
            || FeedState::new(sort),
            |s: &mut FeedState| {
                let generation = s.generation + 1;
                *s = FeedState::new(sort);
                s.generation = generation;
                s.loading = true;
                generation
            },
        );
        info!(?sort, "feed reset");
        let settle = self.settle_on_drop(generation);
        let outcome = self.fetch(generation, 1, sort).await;
        settle.disarm();
        outcome
    }

    /// Clears `loading` if the fetch for `generation` is abandoned.
    fn settle_on_drop(&self, generation: u64) -> Rollback<'_, FeedState> {
        Rollback::new(&self.store, FeedState::PATH, move |s: &mut FeedState| {
            if s.generation == generation {
                s.loading = false;
            }
        })
    }

    fn is_current(&self, generation: u64) -> bool {
        self.store
            .get_as::<FeedState>(FeedState::PATH)
            .map(|s| s.generation == generation)
            .unwrap_or(false)
    }

    async fn fetch(&self, generation: u64, page: u32, sort: SortKey) -> Result<LoadOutcome, SyncError> {
        let mark = self.interactions.mark();
        let result = self.gateway.fetch_page(page, self.page_size, sort).await;

        if !self.is_current(generation) {
            warn!(page, "feed was reset, dropping stale page");
            return Ok(LoadOutcome::Discarded);
        }

        let page_data = match result {
            Ok(p) => p,
            Err(e) => {
                let err = SyncError::from(e);
                let message = err.user_message();
                self.store.update(FeedState::PATH, |s: &mut FeedState| {
                    if s.generation == generation {
                        s.loading = false;
                        s.error = Some(message);
                    }
                });
                warn!(page, "feed page failed: {}", err);
                return Err(err);
            }
        };

        for item in &page_data.items {
            self.interactions.seed_as_of(item, mark);
        }

        let page_size = self.page_size;
        let outcome = self
            .store
            .try_update(FeedState::PATH, |s: &mut FeedState| {
                if s.generation != generation {
                    return Err(LoadOutcome::Discarded);
                }
                let full = page_data.items.len() as u32 >= page_size;
                let mut seen: HashSet<String> = s.items.iter().map(|i| i.id.clone()).collect();
                let before = s.items.len();
                for item in page_data.items {
                    if seen.insert(item.id.clone()) {
                        s.items.push(item);
                    }
                }
                s.next_page = page + 1;
                s.has_more = page_data.has_more && full;
                s.loading = false;
                Ok(LoadOutcome::Loaded { added: s.items.len() - before, has_more: s.has_more })
            })
            .unwrap_or(Err(LoadOutcome::Discarded));

        let outcome = match outcome {
            Ok(o) | Err(o) => o,
        };
        if let LoadOutcome::Loaded { added, has_more } = &outcome {
            info!(page, added, has_more, "feed page loaded");
        }
        Ok(outcome)
    }
}
