//! Catalog browsing handlers: home, listing, and player pages.

use axum::extract::{Path, Query, State};
use axum::response::Html;
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::AppError;
use crate::views::catalog::Card;
use crate::views::{self, Layout};

/// Entries shown on the home page.
pub const HOME_LIMIT: usize = 5;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamParams {
    pub ep: Option<String>,
}

/// GET /
pub async fn home(State(ctx): State<AppContext>) -> Html<String> {
    let catalog = ctx.catalog();
    let cards: Vec<Card<'_>> = catalog
        .latest(HOME_LIMIT)
        .into_iter()
        .map(|(title, entry)| Card::resolve(title, entry, &ctx.covers))
        .collect();
    views::catalog::home(&Layout::new(ctx.site()), &cards)
}

/// GET /animes?q=
pub async fn animes(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchParams>,
) -> Html<String> {
    let query = params.q.unwrap_or_default();
    let catalog = ctx.catalog();
    let results = catalog.search(&query);
    tracing::debug!(query = %query, results = results.len(), "catalog search");

    let cards: Vec<Card<'_>> = results
        .into_iter()
        .map(|(title, entry)| Card::resolve(title, entry, &ctx.covers))
        .collect();
    views::catalog::listing(&Layout::new(ctx.site()), query.trim(), &cards)
}

/// GET /stream/{*name}?ep=
pub async fn stream(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
    Query(params): Query<StreamParams>,
) -> Result<Html<String>, AppError> {
    let catalog = ctx.catalog();
    let not_found =
        || AppError::from(anidex_core::Error::not_found("anime", &name)).with_site(ctx.site());

    let entry = catalog.get(&name).ok_or_else(not_found)?;
    let episode = entry
        .select_episode(params.ep.as_deref())
        .ok_or_else(not_found)?;

    if params.ep.as_deref().is_some_and(|ep| ep != episode.label) {
        tracing::debug!(title = %name, requested = ?params.ep, "unknown episode, showing first");
    }

    let cover = ctx.covers.resolve(&name);
    Ok(views::catalog::stream(
        &Layout::new(ctx.site()),
        &name,
        entry,
        episode,
        &cover,
    ))
}
