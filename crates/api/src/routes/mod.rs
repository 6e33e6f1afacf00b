//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod auth;
pub mod bookings;
pub mod health;
pub mod items;
pub mod ledger;
pub mod parties;
pub mod settings;
pub mod users;

/// Creates the API router. Everything except the health check and login needs a token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(settings::routes())
        .merge(items::routes())
        .merge(parties::routes())
        .merge(bookings::routes())
        .merge(ledger::routes())
        .merge(users::routes())
        .merge(auth::protected_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
