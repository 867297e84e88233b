// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{auth::NormalizedUser, error::ErrorBody, state::AppState};

pub mod callback;
pub mod health;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/auth/callback", post(callback::auth_callback))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        callback::auth_callback,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            NormalizedUser,
            ErrorBody,
            callback::CallbackForm,
            callback::CallbackJson,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Provider token callback"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
