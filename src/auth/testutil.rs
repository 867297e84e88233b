// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared helpers for authentication tests: fixture keys, token minting and
//! provider-shaped payloads.
//!
//! Fixture keys live in `testdata/`. `rs256.rsa` pairs with `rs256.rsa.pub`;
//! `other.rsa` is an unrelated key for wrong-signer scenarios.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use super::{AuthRequest, Claims};

pub const SIGNING_KEY_PEM: &[u8] = include_bytes!("../../testdata/rs256.rsa");
pub const OTHER_SIGNING_KEY_PEM: &[u8] = include_bytes!("../../testdata/other.rsa");

pub fn public_key_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/rs256.rsa.pub")
}

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_secs() as i64
}

/// Sign `claims` with the fixture key (RS256).
pub fn sign(claims: &Value) -> String {
    sign_with(SIGNING_KEY_PEM, claims)
}

/// Sign `claims` with an arbitrary RSA private key (RS256).
pub fn sign_with(private_key_pem: &[u8], claims: &Value) -> String {
    let key = EncodingKey::from_rsa_pem(private_key_pem).expect("fixture key is valid PEM");
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &key)
        .expect("failed to encode test JWT")
}

/// Wrap a JSON object as verified claims, bypassing signature checks.
pub fn claims(value: Value) -> Claims {
    match value {
        Value::Object(map) => Claims::new(map),
        other => panic!("claims must be a JSON object, got {other}"),
    }
}

/// LMS launch payload as posted by the chat plugin.
pub fn moodle_claims(user: &str, admin: bool) -> Value {
    let mut roles = vec![json!(
        "http://purl.imsglobal.org/vocab/lis/v2/membership#Learner"
    )];
    if admin {
        roles.push(json!(super::parsers::ADMINISTRATOR_ROLE));
    }

    json!({
        "user": user,
        "platformId": "https://moodle.example.edu",
        "platformContext": {
            "roles": roles,
            "context": { "id": 101, "title": "Intro to Testing" }
        }
    })
}

/// Study participant payload.
pub fn prolific_claims(study_id: &str, prolific_id: &str, exp: Option<i64>) -> Value {
    let mut payload = json!({
        "studyId": study_id,
        "prolificId": prolific_id,
    });
    if let Some(exp) = exp {
        payload["exp"] = json!(exp);
    }
    payload
}

pub fn form_request(token: &str) -> AuthRequest {
    let body: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("token", token)
        .finish();
    AuthRequest::new(Some("application/x-www-form-urlencoded"), body)
}

pub fn json_request(token: &str) -> AuthRequest {
    let body = json!({ "formData": { "token": token } }).to_string();
    AuthRequest::new(Some("application/json"), body)
}

pub const MULTIPART_BOUNDARY: &str = "chat-auth-boundary";

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}

/// Browser `FormData` body with one text part per field.
pub fn multipart_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));
    body
}
