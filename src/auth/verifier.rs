// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RS256 token verification.
//!
//! ## Flow
//!
//! 1. Extract the token from the request body
//! 2. Read the public key from disk (every call)
//! 3. Verify signature and registered claims with `jsonwebtoken`
//! 4. Return the payload as [`Claims`]
//!
//! Only RS256 is accepted. `exp` handling follows the configured
//! [`ExpiryPolicy`]; `nbf` is checked whenever present, and a token carrying
//! `aud` is rejected since no audience is configured.

use std::fmt;
use std::str::FromStr;

use jsonwebtoken::{errors::ErrorKind, Algorithm, Validation};
use serde_json::{Map, Value};

use super::{AuthFailure, AuthRequest, Claims, PublicKeyFile};

/// Default clock skew tolerance for `exp` / `nbf`: none, so a token is
/// rejected the second it expires.
pub const DEFAULT_LEEWAY_SECS: u64 = 0;

/// How the `exp` claim is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// `exp` is never checked.
    Ignore,
    /// An `exp` in the past is rejected; tokens without `exp` pass.
    #[default]
    WhenPresent,
    /// `exp` must be present and in the future.
    Required,
}

impl FromStr for ExpiryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Ok(ExpiryPolicy::Ignore),
            "when-present" => Ok(ExpiryPolicy::WhenPresent),
            "required" => Ok(ExpiryPolicy::Required),
            other => Err(format!(
                "unknown expiry policy `{other}` (expected ignore, when-present or required)"
            )),
        }
    }
}

impl fmt::Display for ExpiryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryPolicy::Ignore => write!(f, "ignore"),
            ExpiryPolicy::WhenPresent => write!(f, "when-present"),
            ExpiryPolicy::Required => write!(f, "required"),
        }
    }
}

/// Verifies callback tokens against the on-disk public key.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key: PublicKeyFile,
    expiry: ExpiryPolicy,
    leeway_secs: u64,
}

impl TokenVerifier {
    pub fn new(key: PublicKeyFile) -> Self {
        Self {
            key,
            expiry: ExpiryPolicy::default(),
            leeway_secs: DEFAULT_LEEWAY_SECS,
        }
    }

    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn key(&self) -> &PublicKeyFile {
        &self.key
    }

    pub fn expiry(&self) -> ExpiryPolicy {
        self.expiry
    }

    /// Extract and verify the token carried by `request`.
    pub fn verify(&self, request: Option<&AuthRequest>) -> Result<Claims, AuthFailure> {
        let request = request.ok_or(AuthFailure::NoRequest)?;
        let token = request.token()?;
        self.verify_token(&token)
    }

    /// Verify a bare token string.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthFailure> {
        let key = self.key.load()?;

        let token_data = jsonwebtoken::decode::<Map<String, Value>>(token, &key, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthFailure::TokenExpired,
                _ => AuthFailure::InvalidToken(e.to_string()),
            })?;

        Ok(Claims::new(token_data.claims))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = self.leeway_secs;
        validation.validate_nbf = true;

        match self.expiry {
            ExpiryPolicy::Ignore => {
                validation.validate_exp = false;
                validation.required_spec_claims.clear();
            }
            ExpiryPolicy::WhenPresent => {
                validation.validate_exp = true;
                validation.required_spec_claims.clear();
            }
            ExpiryPolicy::Required => {
                validation.validate_exp = true;
                validation.set_required_spec_claims(&["exp"]);
            }
        }

        validation
    }
}
