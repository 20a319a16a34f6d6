//! Request handlers and their wiring onto Flux.
//!
//! Each request path gets one handler that downcasts the payload, drives the
//! engine, and leaves every outcome in the store. Failures end up in
//! `app/notice` for the front-end to show; nothing is returned to the
//! emitter.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use rbuddy_flux::{Flux, StateStore};
use tracing::warn;

use crate::app::ResolutionsApp;
use crate::error::SyncError;
use crate::request::*;
use crate::state::{AuthPhase, AuthState, Notice};

const TOKEN_REJECTED: &str = "Your session has expired. Please login again.";

fn report(store: &StateStore, err: &SyncError) {
    store.set(Notice::PATH, Notice::error(err.user_message()));
}

/// Register `handler` for requests of type `R` on `path`.
fn route<R, F, Fut>(flux: &Flux, path: &'static str, app: &Arc<ResolutionsApp>, handler: F)
where
    R: Any + Clone + Send + Sync,
    F: Fn(Arc<ResolutionsApp>, R, Arc<StateStore>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let app = app.clone();
    flux.on(path, move |_, payload, store| {
        let fut = payload
            .downcast_ref::<R>()
            .cloned()
            .map(|req| handler(app.clone(), req, store));
        async move {
            match fut {
                Some(fut) => fut.await,
                None => warn!(path, "payload of unexpected type"),
            }
        }
    });
}

/// Register all handlers with a Flux instance.
pub fn register_handlers(flux: &Flux, app: Arc<ResolutionsApp>) {
    // auth/login
    route(flux, LoginReq::PATH, &app, |app, req: LoginReq, store| async move {
        store.set(
            AuthState::PATH,
            AuthState { phase: AuthPhase::Anonymous, user: None, busy: true, error: None },
        );
        match app.login(&req.token).await {
            Ok(user) => {
                store.set(Notice::PATH, Notice::info(format!("Welcome, {}!", user.name)));
                // Liked flags are per user.
                let sort = app.feed().state().sort;
                if let Err(e) = app.feed().reset_and_load(sort).await {
                    report(&store, &e);
                }
            }
            Err(e) => {
                let message = match e {
                    SyncError::LoginRequired => TOKEN_REJECTED.to_string(),
                    _ => e.user_message(),
                };
                let mut auth = AuthState::anonymous();
                auth.error = Some(message.clone());
                store.set(AuthState::PATH, auth);
                store.set(Notice::PATH, Notice::error(message));
            }
        }
    });

    // auth/logout
    route(flux, LogoutReq::PATH, &app, |app, _: LogoutReq, store| async move {
        app.logout();
        let sort = app.feed().state().sort;
        if let Err(e) = app.feed().reset_and_load(sort).await {
            report(&store, &e);
        }
    });

    // feed/load-more
    route(flux, FeedLoadMoreReq::PATH, &app, |app, _: FeedLoadMoreReq, store| async move {
        if let Err(e) = app.feed().load_next_page().await {
            report(&store, &e);
        }
    });

    // feed/sort
    route(flux, FeedSortReq::PATH, &app, |app, req: FeedSortReq, store| async move {
        if let Err(e) = app.feed().reset_and_load(req.sort).await {
            report(&store, &e);
        }
    });

    // resolution/like
    route(flux, ToggleLikeReq::PATH, &app, |app, req: ToggleLikeReq, store| async move {
        if let Err(e) = app.interactions().toggle_like(&req.id).await {
            report(&store, &e);
        }
    });

    // comment/draft
    route(flux, CommentDraftReq::PATH, &app, |app, req: CommentDraftReq, _| async move {
        app.comments().set_draft(&req.id, &req.text);
    });

    // comment/submit
    route(flux, CommentSubmitReq::PATH, &app, |app, req: CommentSubmitReq, store| async move {
        if let Err(e) = app.comments().submit(&req.id).await {
            // The draft already carries the form-level message.
            if !matches!(e, SyncError::LoginRequired) {
                let text = app.comments().draft(&req.id).error.unwrap_or_else(|| e.user_message());
                store.set(Notice::PATH, Notice::error(text));
            }
        }
    });

    // detail/open
    route(flux, DetailOpenReq::PATH, &app, |app, req: DetailOpenReq, store| async move {
        if let Err(e) = app.detail().open(&req.id).await {
            report(&store, &e);
        }
    });

    // detail/refresh
    route(flux, DetailRefreshReq::PATH, &app, |app, _: DetailRefreshReq, store| async move {
        if let Err(e) = app.detail().refresh().await {
            report(&store, &e);
        }
    });

    // detail/close
    route(flux, DetailCloseReq::PATH, &app, |app, _: DetailCloseReq, _| async move {
        app.detail().close();
    });

    // resolution/create
    route(flux, CreateResolutionReq::PATH, &app, |app, req: CreateResolutionReq, store| async move {
        match app.resolutions().submit(&req.text, &req.tags).await {
            Ok(_) => store.set(Notice::PATH, Notice::info("Your resolution has been shared!")),
            Err(e) => report(&store, &e),
        }
    });

    // me/load
    route(flux, LoadOwnReq::PATH, &app, |app, _: LoadOwnReq, store| async move {
        if let Err(e) = app.own().load().await {
            report(&store, &e);
        }
    });

    // profile/rename
    route(flux, RenameReq::PATH, &app, |app, req: RenameReq, store| async move {
        match app.profile().rename(&req.name).await {
            Ok(()) => store.set(Notice::PATH, Notice::info("Profile updated.")),
            Err(e) => report(&store, &e),
        }
    });
}

#[cfg(test)]
mod tests {
    use rbuddy_client::{SortKey, Tag};

    use super::*;
    use crate::app::SyncConfig;
    use crate::fake::{FakeGateway, Op};
    use crate::session::SessionHandle;
    use crate::state::{
        CommentDraft, DetailPanel, FeedState, InteractionState, LoginPrompt, NoticeLevel,
        OwnResolutions,
    };

    fn flux_app() -> (Arc<FakeGateway>, Flux) {
        let gw = Arc::new(FakeGateway::new(15));
        let app = Arc::new(ResolutionsApp::new(gw.clone(), SessionHandle::anonymous(), SyncConfig::default()));
        (gw, app.into_flux())
    }

    fn notice(flux: &Flux) -> Option<Notice> {
        flux.get_as::<Notice>(Notice::PATH)
    }

    fn interaction(flux: &Flux, id: &str) -> InteractionState {
        flux.get_as(&InteractionState::path(id)).unwrap()
    }

    #[test]
    fn every_request_path_has_a_handler() {
        let (_, flux) = flux_app();
        for path in [
            LoginReq::PATH,
            LogoutReq::PATH,
            FeedLoadMoreReq::PATH,
            FeedSortReq::PATH,
            ToggleLikeReq::PATH,
            CommentDraftReq::PATH,
            CommentSubmitReq::PATH,
            DetailOpenReq::PATH,
            DetailRefreshReq::PATH,
            DetailCloseReq::PATH,
            CreateResolutionReq::PATH,
            LoadOwnReq::PATH,
            RenameReq::PATH,
        ] {
            assert!(flux.has_handler(path), "no handler for {}", path);
        }
    }

    #[tokio::test]
    async fn anonymous_like_shows_login_prompt() {
        let (gw, flux) = flux_app();
        flux.emit(FeedLoadMoreReq::PATH, FeedLoadMoreReq).await;
        flux.emit(ToggleLikeReq::PATH, ToggleLikeReq { id: "r00".into() }).await;

        assert_eq!(flux.get_as::<LoginPrompt>(LoginPrompt::PATH).unwrap().action, "like");
        assert_eq!(interaction(&flux, "r00").like_count, 5);
        assert_eq!(gw.calls(Op::ToggleLike), 0);
        assert_eq!(notice(&flux).unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn full_session_walkthrough() {
        let (gw, flux) = flux_app();

        flux.emit(LoginReq::PATH, LoginReq { token: "jwt".into() }).await;
        let auth = flux.get_as::<AuthState>(AuthState::PATH).unwrap();
        assert_eq!(auth.phase, AuthPhase::Authenticated);
        assert_eq!(notice(&flux).unwrap(), Notice::info("Welcome, Ana!"));
        assert_eq!(flux.get_as::<FeedState>(FeedState::PATH).unwrap().items.len(), 10);

        flux.emit(FeedLoadMoreReq::PATH, FeedLoadMoreReq).await;
        let feed = flux.get_as::<FeedState>(FeedState::PATH).unwrap();
        assert_eq!(feed.items.len(), 15);
        assert!(!feed.has_more);

        flux.emit(ToggleLikeReq::PATH, ToggleLikeReq { id: "r02".into() }).await;
        assert_eq!(interaction(&flux, "r02").like_count, 6);

        flux.emit(DetailOpenReq::PATH, DetailOpenReq { id: "r02".into() }).await;
        assert!(flux.get_as::<DetailPanel>(DetailPanel::PATH).unwrap().is_open("r02"));
        assert!(interaction(&flux, "r02").hydrated);

        flux.emit(CommentDraftReq::PATH, CommentDraftReq { id: "r02".into(), text: "Nice!".into() }).await;
        flux.emit(CommentSubmitReq::PATH, CommentSubmitReq { id: "r02".into() }).await;
        let s = interaction(&flux, "r02");
        assert_eq!(s.comment_count, 1);
        assert!(!s.comments[0].is_provisional());
        assert_eq!(
            flux.get_as::<CommentDraft>(&CommentDraft::path("r02")).unwrap().text,
            ""
        );

        flux.emit(DetailCloseReq::PATH, DetailCloseReq).await;
        assert!(flux.get_as::<DetailPanel>(DetailPanel::PATH).unwrap().open.is_none());
        assert!(interaction(&flux, "r02").hydrated);

        flux.emit(
            CreateResolutionReq::PATH,
            CreateResolutionReq { text: "Meditate".into(), tags: vec![Tag::Mindfulness] },
        )
        .await;
        assert_eq!(notice(&flux).unwrap(), Notice::info("Your resolution has been shared!"));

        flux.emit(LoadOwnReq::PATH, LoadOwnReq).await;
        assert_eq!(flux.get_as::<OwnResolutions>(OwnResolutions::PATH).unwrap().items.len(), 1);

        flux.emit(RenameReq::PATH, RenameReq { name: "Ana B".into() }).await;
        let auth = flux.get_as::<AuthState>(AuthState::PATH).unwrap();
        assert_eq!(auth.user.unwrap().name, "Ana B");

        flux.emit(LogoutReq::PATH, LogoutReq).await;
        assert_eq!(
            flux.get_as::<AuthState>(AuthState::PATH).unwrap().phase,
            AuthPhase::Anonymous
        );
        assert_eq!(gw.calls(Op::VerifyToken), 1);
    }

    #[tokio::test]
    async fn failed_login_is_reported_on_auth_state() {
        let (gw, flux) = flux_app();
        gw.fail_with(Op::VerifyToken, rbuddy_client::ApiError::Auth("expired".into()));
        flux.emit(LoginReq::PATH, LoginReq { token: "stale".into() }).await;

        let auth = flux.get_as::<AuthState>(AuthState::PATH).unwrap();
        assert_eq!(auth.phase, AuthPhase::Anonymous);
        assert!(!auth.busy);
        assert_eq!(auth.error.as_deref(), Some(TOKEN_REJECTED));
        assert_eq!(notice(&flux).unwrap(), Notice::error(TOKEN_REJECTED));
        assert_eq!(gw.calls(Op::FetchPage), 0);
    }

    #[tokio::test]
    async fn failed_comment_surfaces_form_message() {
        let (gw, flux) = flux_app();
        flux.emit(LoginReq::PATH, LoginReq { token: "jwt".into() }).await;
        gw.fail(Op::PostComment);

        flux.emit(CommentDraftReq::PATH, CommentDraftReq { id: "r01".into(), text: "Go!".into() }).await;
        flux.emit(CommentSubmitReq::PATH, CommentSubmitReq { id: "r01".into() }).await;

        assert_eq!(
            notice(&flux).unwrap(),
            Notice::error("Failed to add comment. Please try again later.")
        );
        let draft = flux.get_as::<CommentDraft>(&CommentDraft::path("r01")).unwrap();
        assert_eq!(draft.text, "Go!");
        assert_eq!(interaction(&flux, "r01").comment_count, 0);
    }

    #[tokio::test]
    async fn sort_switch_reloads_from_first_page() {
        let (gw, flux) = flux_app();
        flux.emit(FeedLoadMoreReq::PATH, FeedLoadMoreReq).await;
        flux.emit(FeedSortReq::PATH, FeedSortReq { sort: SortKey::Popularity }).await;

        let feed = flux.get_as::<FeedState>(FeedState::PATH).unwrap();
        assert_eq!(feed.sort, SortKey::Popularity);
        assert_eq!(feed.items.len(), 10);
        assert_eq!(
            gw.pages_requested(),
            vec![(1, SortKey::Recency), (1, SortKey::Popularity)]
        );
    }

    #[tokio::test]
    async fn wrong_payload_type_is_ignored() {
        let (gw, flux) = flux_app();
        assert_eq!(flux.emit(ToggleLikeReq::PATH, "r00".to_string()).await, 1);
        assert_eq!(gw.total_calls(), 0);
        assert!(notice(&flux).is_none());
    }
}
