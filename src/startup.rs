use std::any::Any;
use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    response::Response,
    routing::{get, patch, post},
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::configuration::{NoteAccessPolicy, Settings};
use crate::envelope::Envelope;
use crate::routes::auth::{login_handler, signup_handler};
use crate::routes::notes::{create_note, delete_note, list_notes, update_note};
use crate::routes::{greet, not_found};
use crate::services::auth::AuthService;
use crate::services::note::NoteService;
use crate::services::token::TokenService;
use crate::store::{NoteRepository, NoteStore, UserRepository, UserStore};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth_service: AuthService,
    pub note_service: NoteService,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        notes: Arc<dyn NoteStore>,
        tokens: TokenService,
        note_access: NoteAccessPolicy,
    ) -> Self {
        Self {
            auth_service: AuthService::new(users, tokens.clone()),
            note_service: NoteService::new(notes, note_access),
            tokens,
        }
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(greet))
        .route("/login", post(login_handler))
        .route("/signup", post(signup_handler))
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/{note_id}", patch(update_note).delete(delete_note))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(app_state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Handler panicked: {}", details);

    Envelope::<()>::failure("An unknown error occurred")
        .with_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, std::io::Error> {
        let pg_pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(2))
            .connect_lazy_with(settings.database.with_db());

        let app_state = AppState::new(
            Arc::new(UserRepository::new(pg_pool.clone())),
            Arc::new(NoteRepository::new(pg_pool)),
            TokenService::new(&settings.auth.jwt_secret),
            settings.application.note_access,
        );

        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router: build_router(app_state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
