// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication failure taxonomy.

use thiserror::Error;

/// Why an authentication attempt did not produce a user.
///
/// Every variant is converted to a uniform "not authenticated" at the
/// callback boundary. The variants exist so that logs and tests can tell
/// the causes apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No request object was handed to the callback.
    #[error("no request supplied")]
    NoRequest,
    /// The body carried no token (anonymous visitor).
    #[error("no token present in request body")]
    MissingToken,
    /// The body could not be read or decoded in its declared encoding.
    #[error("request body is malformed: {0}")]
    MalformedBody(String),
    /// The verification key could not be read or parsed.
    #[error("verification key unavailable: {0}")]
    KeyUnavailable(String),
    /// Signature or structural verification failed.
    #[error("token verification failed: {0}")]
    InvalidToken(String),
    /// The token carried an `exp` in the past under an enforcing policy.
    #[error("token has expired")]
    TokenExpired,
    /// Verified claims did not match the selected parser's schema.
    #[error("claims do not match parser schema: {0}")]
    MappingError(String),
}

impl AuthFailure {
    /// Stable label for structured logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthFailure::NoRequest => "no_request",
            AuthFailure::MissingToken => "missing_token",
            AuthFailure::MalformedBody(_) => "malformed_body",
            AuthFailure::KeyUnavailable(_) => "key_unavailable",
            AuthFailure::InvalidToken(_) => "invalid_token",
            AuthFailure::TokenExpired => "token_expired",
            AuthFailure::MappingError(_) => "mapping_error",
        }
    }

    /// Failures that are normal for unauthenticated traffic and are not logged.
    pub fn is_expected(&self) -> bool {
        matches!(self, AuthFailure::NoRequest | AuthFailure::MissingToken)
    }
}
