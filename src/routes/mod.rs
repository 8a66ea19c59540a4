use axum::Router;

use crate::state::SharedState;

pub mod communities;
pub mod competitions;
pub mod docs;
pub mod games;
pub mod health;
pub mod players;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(players::router())
        .merge(communities::router())
        .merge(competitions::router())
        .merge(games::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
