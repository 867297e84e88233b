// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token extraction from the callback request body.
//!
//! Identity providers post the signed assertion either as a classic HTML form
//! (`token=<jwt>`), as browser `FormData` (`multipart/form-data`) or as JSON
//! (`{"formData": {"token": "<jwt>"}}`). The `Content-Type` header picks the
//! decoding: only the exact value `application/json` selects JSON, a
//! `multipart/form-data` media type selects multipart, and anything else is
//! read as a urlencoded form.
//!
//! Multipart bodies are decoded while the request is buffered
//! ([`AuthRequest::from_http`]), so token lookup itself never suspends.

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{FromRequest, Multipart, Request},
    http::{self, header::CONTENT_TYPE, HeaderMap},
};
use serde_json::Value;

use super::AuthFailure;

/// Form field (and `formData` member) carrying the token.
pub const TOKEN_FIELD: &str = "token";

/// JSON member wrapping the form fields.
pub const FORM_DATA_FIELD: &str = "formData";

const JSON_CONTENT_TYPE: &str = "application/json";
const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Body encoding selected by the `Content-Type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Multipart,
    Form,
}

impl BodyEncoding {
    fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(JSON_CONTENT_TYPE) => BodyEncoding::Json,
            Some(value) if is_multipart(value) => BodyEncoding::Multipart,
            _ => BodyEncoding::Form,
        }
    }
}

/// `multipart/form-data`, with or without parameters (`boundary=...`).
fn is_multipart(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(MULTIPART_CONTENT_TYPE))
}

/// A fully buffered callback request.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    content_type: Option<String>,
    body: Bytes,
    /// Text parts of a multipart body; set by [`AuthRequest::from_http`].
    fields: Option<Vec<(String, String)>>,
}

impl AuthRequest {
    pub fn new(content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.map(str::to_owned),
            body: body.into(),
            fields: None,
        }
    }

    /// Build from already-split headers and body.
    pub fn from_parts(headers: &HeaderMap, body: Bytes) -> Self {
        let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        Self::new(content_type, body)
    }

    /// Buffer the body of an HTTP request, up to `limit` bytes.
    ///
    /// A multipart body is decoded here as well; a broken multipart stream is
    /// [`AuthFailure::MalformedBody`].
    pub async fn from_http(request: Request, limit: usize) -> Result<Self, AuthFailure> {
        let (parts, body) = request.into_parts();
        let body = to_bytes(body, limit)
            .await
            .map_err(|e| AuthFailure::MalformedBody(e.to_string()))?;

        let mut buffered = Self::from_parts(&parts.headers, body.clone());
        if buffered.encoding() == BodyEncoding::Multipart {
            let request = http::Request::from_parts(parts, Body::from(body));
            buffered.fields = Some(multipart_fields(request).await?);
        }
        Ok(buffered)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn encoding(&self) -> BodyEncoding {
        BodyEncoding::from_content_type(self.content_type())
    }

    /// Extract the token string from the body.
    ///
    /// An absent, `null` or empty token is [`AuthFailure::MissingToken`].
    pub fn token(&self) -> Result<String, AuthFailure> {
        let token = match (self.encoding(), &self.fields) {
            (BodyEncoding::Json, _) => token_from_json(&self.body)?,
            (BodyEncoding::Multipart, Some(fields)) => token_from_fields(fields),
            (BodyEncoding::Multipart, None) => {
                return Err(AuthFailure::MalformedBody(
                    "multipart body was not decoded".to_string(),
                ))
            }
            (BodyEncoding::Form, _) => token_from_form(&self.body),
        };

        match token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(AuthFailure::MissingToken),
        }
    }
}

fn token_from_json(body: &[u8]) -> Result<Option<String>, AuthFailure> {
    let document: Value =
        serde_json::from_slice(body).map_err(|e| AuthFailure::MalformedBody(e.to_string()))?;

    let form_data = match document.get(FORM_DATA_FIELD) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(fields)) => fields,
        Some(_) => {
            return Err(AuthFailure::MalformedBody(format!(
                "`{FORM_DATA_FIELD}` is not an object"
            )))
        }
    };

    match form_data.get(TOKEN_FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(token)) => Ok(Some(token.clone())),
        Some(_) => Err(AuthFailure::MalformedBody(format!(
            "`{FORM_DATA_FIELD}.{TOKEN_FIELD}` is not a string"
        ))),
    }
}

fn token_from_form(body: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == TOKEN_FIELD)
        .map(|(_, value)| value.into_owned())
}

fn token_from_fields(fields: &[(String, String)]) -> Option<String> {
    fields
        .iter()
        .find(|(name, _)| name == TOKEN_FIELD)
        .map(|(_, value)| value.clone())
}

/// Collect the named text parts of a multipart body. File parts are skipped.
async fn multipart_fields(request: Request) -> Result<Vec<(String, String)>, AuthFailure> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AuthFailure::MalformedBody(e.to_string()))?;

    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AuthFailure::MalformedBody(e.to_string()))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| AuthFailure::MalformedBody(e.to_string()))?;
        fields.push((name, value));
    }

    Ok(fields)
}
