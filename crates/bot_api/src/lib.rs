use std::sync::Arc;

use shared::{
    domain::{ChatId, PageDirection},
    error::BotError,
    protocol::{BotReply, Button, CallbackAction, Keyboard},
};
use storage::{AddOutcome, SuggestionStore};
use tracing::info;

pub mod pagination;
pub mod session;
pub mod tournament;

use crate::{
    pagination::{advance, window},
    session::Sessions,
    tournament::{MatchOutcome, StartError, Tournament},
};

#[derive(Clone)]
pub struct BotContext {
    pub store: Arc<SuggestionStore>,
    pub sessions: Sessions,
    pub page_size: usize,
}

impl BotContext {
    pub fn new(store: SuggestionStore, page_size: usize) -> Self {
        Self {
            store: Arc::new(store),
            sessions: Sessions::default(),
            page_size,
        }
    }
}

pub async fn suggest_name(ctx: &BotContext, name: &str) -> Result<Vec<BotReply>, BotError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BotError::validation("usage: suggest <name>"));
    }
    match ctx.store.add_name(name).await.map_err(internal)? {
        AddOutcome::Created => Ok(vec![BotReply::message(format!(
            "Added '{name}' to the suggestion list!"
        ))]),
        AddOutcome::AlreadyExists => Ok(vec![BotReply::message(
            "That name has already been suggested.",
        )]),
    }
}

pub async fn show_names(ctx: &BotContext, chat_id: ChatId) -> Result<Vec<BotReply>, BotError> {
    let page = ctx.sessions.with(chat_id, |session| session.page).await;
    render_page(ctx, page).await
}

pub async fn turn_page(
    ctx: &BotContext,
    chat_id: ChatId,
    direction: PageDirection,
) -> Result<Vec<BotReply>, BotError> {
    let page = ctx
        .sessions
        .with(chat_id, |session| {
            session.page = advance(session.page, direction);
            session.page
        })
        .await;
    render_page(ctx, page).await
}

async fn render_page(ctx: &BotContext, page: usize) -> Result<Vec<BotReply>, BotError> {
    let total = ctx.store.entry_count().await;
    if total == 0 {
        return Ok(vec![BotReply::message("No names have been suggested yet!")]);
    }

    let nav = window(total, page, ctx.page_size);
    let mut keyboard = Keyboard::default();
    for (name, votes) in ctx.store.page_of(page, ctx.page_size).await {
        let action = CallbackAction::Vote(name.clone());
        keyboard.push_row(vec![Button::new(format!("{name} ❤️{votes}"), &action)]);
    }

    let mut nav_row = Vec::new();
    if nav.has_prev {
        nav_row.push(Button::new(
            "⬅️ Back",
            &CallbackAction::Page(PageDirection::Prev),
        ));
    }
    if nav.has_next {
        nav_row.push(Button::new(
            "Forward ➡️",
            &CallbackAction::Page(PageDirection::Next),
        ));
    }
    keyboard.push_row(nav_row);

    Ok(vec![BotReply::message_with_keyboard(
        "Suggested names:",
        keyboard,
    )])
}

pub async fn cast_vote(ctx: &BotContext, name: &str) -> Result<Vec<BotReply>, BotError> {
    match ctx.store.record_vote(name).await.map_err(internal)? {
        Some(_) => Ok(vec![BotReply::ack(format!("You voted for '{name}'."))]),
        None => Ok(vec![BotReply::ack("That name is not on the list.")]),
    }
}

pub async fn start_tournament(ctx: &BotContext, chat_id: ChatId) -> Result<Vec<BotReply>, BotError> {
    let entrants = ctx.store.names().await;
    let mut tournament = match Tournament::start(entrants) {
        Ok(tournament) => tournament,
        Err(StartError::InsufficientEntrants) => {
            return Ok(vec![BotReply::message(
                "Not enough names for a tournament.",
            )])
        }
        Err(StartError::OddEntrantCount) => {
            return Ok(vec![BotReply::message(
                "The tournament needs an even number of entrants.",
            )])
        }
    };
    info!(chat_id = chat_id.0, "tournament started");

    let (announcement, _) = open_match(ctx, &mut tournament).await?;
    ctx.sessions
        .with(chat_id, |session| session.tournament = Some(tournament))
        .await;
    Ok(vec![announcement])
}

pub async fn cast_match_vote(
    ctx: &BotContext,
    chat_id: ChatId,
    winner: &str,
) -> Result<Vec<BotReply>, BotError> {
    // The tournament is taken out of the session while resolving so the
    // session lock is never held across store writes.
    let Some(mut tournament) = ctx
        .sessions
        .with(chat_id, |session| session.tournament.take())
        .await
    else {
        return Ok(vec![BotReply::ack("No tournament is running here.")]);
    };

    if ctx.store.record_vote(winner).await.map_err(internal)?.is_none() {
        ctx.sessions
            .with(chat_id, |session| session.tournament = Some(tournament))
            .await;
        return Ok(vec![BotReply::ack(
            "Error: that name is not on the suggestion list.",
        )]);
    }

    tournament.record_winner(winner);
    let (announcement, finished) = open_match(ctx, &mut tournament).await?;
    ctx.sessions
        .with(chat_id, |session| {
            session.tournament = (!finished).then_some(tournament);
        })
        .await;

    Ok(vec![
        announcement,
        BotReply::ack(format!("You voted for '{winner}'.")),
    ])
}

/// Announces the next pairing with current tallies, or the winner. Completion
/// flushes the store so the final tally is on disk even if nothing else
/// mutates it again.
async fn open_match(
    ctx: &BotContext,
    tournament: &mut Tournament,
) -> Result<(BotReply, bool), BotError> {
    match tournament.next_match() {
        MatchOutcome::Ready {
            round,
            match_number,
            left,
            right,
        } => {
            let mut keyboard = Keyboard::default();
            for name in [&left, &right] {
                let votes = ctx.store.votes_for(name).await.unwrap_or(0);
                let action = CallbackAction::MatchVote(name.clone());
                keyboard.push_row(vec![Button::new(format!("{name} ❤️{votes}"), &action)]);
            }
            Ok((
                BotReply::message_with_keyboard(
                    format!("Round {round}, match {match_number}:"),
                    keyboard,
                ),
                false,
            ))
        }
        MatchOutcome::Complete { winner } => {
            ctx.store.flush().await.map_err(internal)?;
            info!(%winner, "tournament finished");
            Ok((
                BotReply::message(format!("Tournament winner: {winner}!")),
                true,
            ))
        }
    }
}

fn internal(err: anyhow::Error) -> BotError {
    BotError::internal(err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
