// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Post-launch authentication for the chat application.
//!
//! ## Auth Flow
//!
//! 1. The identity provider (LMS plugin or study platform) signs a JWT with
//!    its RSA private key and posts it to the chat app, either as a form
//!    field `token` or as JSON `{"formData": {"token": ...}}`
//! 2. The server:
//!    - Reads the RSA public key from disk
//!    - Verifies the RS256 signature (and `exp`/`nbf` per configuration)
//!    - Maps claims onto a [`NormalizedUser`] with the configured parser
//!
//! ## Security
//!
//! - Fail-closed: any error yields no user
//! - Claims are never mapped before signature verification
//! - Only RS256 is accepted; symmetric and `none` algorithms are rejected
//! - Parser selection falls back to `moodle`; verification never falls back

pub mod callback;
pub mod claims;
pub mod error;
pub mod key;
pub mod parsers;
pub mod request;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testutil;

pub use callback::Authenticator;
pub use claims::{Claims, NormalizedUser};
pub use error::AuthFailure;
pub use key::PublicKeyFile;
pub use parsers::{ParseFn, ParserRegistry, SelectedParser};
pub use request::AuthRequest;
pub use verifier::{ExpiryPolicy, TokenVerifier};
