// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication callback endpoint.

use axum::{
    extract::{Request, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::NormalizedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Form-encoded (urlencoded or multipart) callback body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CallbackForm {
    /// RS256-signed provider assertion.
    pub token: String,
}

/// JSON callback body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CallbackJson {
    #[serde(rename = "formData")]
    pub form_data: CallbackForm,
}

/// Resolve a provider-signed token into a chat user.
///
/// Every failure, including a missing token, yields the same 401 response.
#[utoipa::path(
    post,
    path = "/auth/callback",
    tag = "Auth",
    request_body(content(
        (CallbackForm = "application/x-www-form-urlencoded"),
        (CallbackForm = "multipart/form-data"),
        (CallbackJson = "application/json")
    )),
    responses(
        (status = 200, description = "Authenticated user", body = NormalizedUser),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    )
)]
pub async fn auth_callback(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<NormalizedUser>, ApiError> {
    state
        .authenticator
        .authenticate_http(Some(request))
        .await
        .map(Json)
        .ok_or_else(ApiError::unauthorized)
}
