// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication callback: the single entry point the web layer calls to
//! resolve a request into a user.
//!
//! [`Authenticator::try_authenticate`] returns the precise [`AuthFailure`];
//! [`Authenticator::authenticate`] logs it and collapses every failure to
//! `None`, so callers cannot tell an anonymous request from a rejected one.

use axum::extract::Request;

use super::{AuthFailure, AuthRequest, NormalizedUser, SelectedParser, TokenVerifier};

/// Default maximum callback body size (64 KiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Verifies callback tokens and maps them with the configured parser.
///
/// Holds no mutable state; clones are independent and safe to share across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct Authenticator {
    verifier: TokenVerifier,
    parser: SelectedParser,
    max_body_bytes: usize,
}

impl Authenticator {
    pub fn new(verifier: TokenVerifier, parser: SelectedParser) -> Self {
        Self {
            verifier,
            parser,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn parser(&self) -> &SelectedParser {
        &self.parser
    }

    /// Verify then map. Claims reach the parser only after verification.
    pub fn try_authenticate(
        &self,
        request: Option<&AuthRequest>,
    ) -> Result<NormalizedUser, AuthFailure> {
        let claims = self.verifier.verify(request)?;
        self.parser.parse(&claims)
    }

    /// Resolve `request` to a user, or `None` for any failure.
    pub fn authenticate(&self, request: Option<&AuthRequest>) -> Option<NormalizedUser> {
        match self.try_authenticate(request) {
            Ok(user) => {
                tracing::debug!(
                    parser = self.parser.name(),
                    identifier = %user.identifier,
                    "Request authenticated"
                );
                Some(user)
            }
            Err(failure) => {
                self.report(&failure);
                None
            }
        }
    }

    /// Buffer the body of a raw HTTP request, then [`authenticate`](Self::authenticate).
    pub async fn authenticate_http(&self, request: Option<Request>) -> Option<NormalizedUser> {
        let Some(request) = request else {
            return self.authenticate(None);
        };

        match AuthRequest::from_http(request, self.max_body_bytes).await {
            Ok(request) => self.authenticate(Some(&request)),
            Err(failure) => {
                self.report(&failure);
                None
            }
        }
    }

    fn report(&self, failure: &AuthFailure) {
        if failure.is_expected() {
            return;
        }

        let error_code = failure.error_code();
        match failure {
            AuthFailure::KeyUnavailable(reason) => {
                tracing::error!(
                    error_code,
                    key_path = %self.verifier.key().path().display(),
                    %reason,
                    "Verification key unavailable"
                );
            }
            AuthFailure::InvalidToken(_) | AuthFailure::TokenExpired => {
                tracing::error!(error_code, %failure, "JWT verification failed");
            }
            AuthFailure::MappingError(reason) => {
                tracing::error!(
                    error_code,
                    parser = self.parser.name(),
                    %reason,
                    "Verified claims rejected by payload parser"
                );
            }
            AuthFailure::MalformedBody(reason) => {
                tracing::error!(error_code, %reason, "Callback body could not be decoded");
            }
            AuthFailure::NoRequest | AuthFailure::MissingToken => {}
        }
    }
}
