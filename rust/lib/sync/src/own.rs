use std::sync::Arc;

use rbuddy_client::{ResolutionGateway, ResolutionSummary};
use rbuddy_flux::StateStore;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::interaction::InteractionStore;
use crate::session::SessionHandle;
use crate::state::OwnResolutions;

/// The signed-in user's own resolutions, at `me/resolutions`.
pub struct OwnLoader {
    store: Arc<StateStore>,
    gateway: Arc<dyn ResolutionGateway>,
    interactions: Arc<InteractionStore>,
    session: SessionHandle,
}

impl OwnLoader {
    pub fn new(
        store: Arc<StateStore>,
        gateway: Arc<dyn ResolutionGateway>,
        interactions: Arc<InteractionStore>,
        session: SessionHandle,
    ) -> Self {
        Self { store, gateway, interactions, session }
    }

    pub fn state(&self) -> OwnResolutions {
        self.store.get_as(OwnResolutions::PATH).unwrap_or_default()
    }

    pub async fn load(&self) -> Result<Vec<ResolutionSummary>, SyncError> {
        self.session.require_user(&self.store, "profile")?;
        self.store.upsert(OwnResolutions::PATH, OwnResolutions::default, |s: &mut OwnResolutions| {
            s.loading = true;
            s.error = None;
        });

        let mark = self.interactions.mark();
        match self.gateway.my_resolutions().await {
            Ok(items) => {
                for item in &items {
                    self.interactions.seed_as_of(item, mark);
                }
                info!(count = items.len(), "own resolutions loaded");
                self.store.set(
                    OwnResolutions::PATH,
                    OwnResolutions { items: items.clone(), loading: false, error: None },
                );
                Ok(items)
            }
            Err(e) => {
                let err = SyncError::from(e);
                let message = err.user_message();
                self.store.update(OwnResolutions::PATH, |s: &mut OwnResolutions| {
                    s.loading = false;
                    s.error = Some(message);
                });
                warn!("own resolutions failed: {}", err);
                Err(err)
            }
        }
    }
}
