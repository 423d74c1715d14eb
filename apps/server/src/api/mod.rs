use std::sync::Arc;

use axum::Router;

use crate::main_lib::AppState;

mod accounts;
mod connect;
mod mappings;
mod sync;

pub fn app_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(sync::router())
        .merge(mappings::router())
        .merge(accounts::router())
        .merge(connect::router());

    Router::new().nest("/api/v1", api).with_state(state)
}
