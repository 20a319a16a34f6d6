use std::sync::Arc;

use rbuddy_client::{HttpGateway, ResolutionGateway, SortKey, UserIdentity};
use rbuddy_flux::{Flux, StateStore};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bff;
use crate::compose::{CommentComposer, ProfileEditor, ResolutionComposer};
use crate::detail::DetailLoader;
use crate::error::SyncError;
use crate::feed::FeedAggregate;
use crate::interaction::InteractionStore;
use crate::own::OwnLoader;
use crate::session::SessionHandle;

/// Engine knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Items requested per feed page.
    pub page_size: u32,
    pub default_sort: SortKey,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            default_sort: SortKey::Recency,
        }
    }
}

/// Every engine component wired onto one store, one gateway and one
/// session.
pub struct ResolutionsApp {
    store: Arc<StateStore>,
    gateway: Arc<dyn ResolutionGateway>,
    session: SessionHandle,
    interactions: Arc<InteractionStore>,
    feed: Arc<FeedAggregate>,
    detail: DetailLoader,
    comments: CommentComposer,
    resolutions: ResolutionComposer,
    profile: ProfileEditor,
    own: OwnLoader,
}

impl ResolutionsApp {
    pub fn new(gateway: Arc<dyn ResolutionGateway>, session: SessionHandle, config: SyncConfig) -> Self {
        Self::with_store(Arc::new(StateStore::new()), gateway, session, config)
    }

    /// Talk to the REST server at `base_url`, authenticating as `session`.
    pub fn connect(base_url: &str, session: SessionHandle, config: SyncConfig) -> Self {
        let gateway = Arc::new(HttpGateway::new(base_url, Arc::new(session.clone())));
        Self::new(gateway, session, config)
    }

    pub fn with_store(
        store: Arc<StateStore>,
        gateway: Arc<dyn ResolutionGateway>,
        session: SessionHandle,
        config: SyncConfig,
    ) -> Self {
        let interactions = Arc::new(InteractionStore::new(store.clone(), gateway.clone(), session.clone()));
        let feed = Arc::new(FeedAggregate::new(
            store.clone(),
            gateway.clone(),
            interactions.clone(),
            config.page_size,
            config.default_sort,
        ));
        session.publish(&store);
        Self {
            detail: DetailLoader::new(store.clone(), gateway.clone(), interactions.clone()),
            comments: CommentComposer::new(store.clone(), interactions.clone()),
            resolutions: ResolutionComposer::new(store.clone(), gateway.clone(), session.clone(), feed.clone()),
            profile: ProfileEditor::new(store.clone(), gateway.clone(), session.clone()),
            own: OwnLoader::new(store.clone(), gateway.clone(), interactions.clone(), session.clone()),
            store,
            gateway,
            session,
            interactions,
            feed,
        }
    }

    /// A Flux facade over this engine's store with every request handler
    /// registered.
    pub fn into_flux(self: Arc<Self>) -> Flux {
        let flux = Flux::with_store(self.store.clone());
        bff::register_handlers(&flux, self);
        flux
    }

    pub async fn login(&self, token: &str) -> Result<UserIdentity, SyncError> {
        let result = self.session.login(token, self.gateway.as_ref()).await;
        self.session.publish(&self.store);
        result
    }

    pub fn logout(&self) {
        self.session.clear();
        self.session.publish(&self.store);
        info!("signed out");
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn interactions(&self) -> &InteractionStore {
        &self.interactions
    }

    pub fn feed(&self) -> &FeedAggregate {
        &self.feed
    }

    pub fn detail(&self) -> &DetailLoader {
        &self.detail
    }

    pub fn comments(&self) -> &CommentComposer {
        &self.comments
    }

    pub fn resolutions(&self) -> &ResolutionComposer {
        &self.resolutions
    }

    pub fn profile(&self) -> &ProfileEditor {
        &self.profile
    }

    pub fn own(&self) -> &OwnLoader {
        &self.own
    }
}
