use axum::{routing::post, Router};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn mail_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get-code", post(controller::get_code))
        .route("/verify", post(controller::verify))
}
