use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bot_api::BotContext;
use shared::{
    error::{BotError, ErrorCode},
    protocol::{BotReply, BotUpdate, CallbackAction, UpdateAction},
};
use storage::SuggestionStore;
use tracing::{error, info};

mod config;

use config::{load_settings, prepare_store_path};

#[derive(Clone)]
struct AppState {
    ctx: BotContext,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let store_path = prepare_store_path(&settings.store_path)?;
    let store = SuggestionStore::open(&store_path).await.map_err(|err| {
        error!(
            path = %store_path.display(),
            %err,
            "failed to open suggestion store; verify parent directory exists and permissions are correct"
        );
        err
    })?;
    let ctx = BotContext::new(store, settings.page_size);

    let state = AppState { ctx };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "bot listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/updates", post(handle_update))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn handle_update(
    State(state): State<Arc<AppState>>,
    Json(update): Json<BotUpdate>,
) -> Result<Json<Vec<BotReply>>, (StatusCode, Json<BotError>)> {
    let replies = dispatch(&state.ctx, update).await.map_err(|err| {
        let status = match err.code {
            ErrorCode::Validation => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Storage | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(err))
    })?;
    Ok(Json(replies))
}

/// Routes one inbound update to its handler, mirroring how a bot platform
/// dispatches commands and keyboard callbacks.
async fn dispatch(ctx: &BotContext, update: BotUpdate) -> Result<Vec<BotReply>, BotError> {
    let chat_id = update.chat_id;
    match update.action {
        UpdateAction::Command { name, args } => match name.as_str() {
            "suggest" => bot_api::suggest_name(ctx, &args).await,
            "names" => bot_api::show_names(ctx, chat_id).await,
            "tournament" => bot_api::start_tournament(ctx, chat_id).await,
            other => Err(BotError::not_found(format!("unknown command '{other}'"))),
        },
        UpdateAction::Callback { token } => match CallbackAction::parse(&token) {
            Some(CallbackAction::Page(direction)) => {
                bot_api::turn_page(ctx, chat_id, direction).await
            }
            Some(CallbackAction::Vote(name)) => bot_api::cast_vote(ctx, &name).await,
            Some(CallbackAction::MatchVote(name)) => {
                bot_api::cast_match_vote(ctx, chat_id, &name).await
            }
            None => Err(BotError::not_found(format!(
                "unknown callback token '{token}'"
            ))),
        },
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
