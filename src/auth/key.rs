// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verification key loading.
//!
//! The RSA public key is read from disk on every attempt. There is no cache,
//! so a replaced key file takes effect on the next request.

use std::path::{Path, PathBuf};

use jsonwebtoken::DecodingKey;

use super::AuthFailure;

/// Default location of the PEM public key, relative to the working directory.
pub const DEFAULT_PUBLIC_KEY_PATH: &str = "rs256.rsa.pub";

/// A PEM-encoded RSA public key on disk.
#[derive(Debug, Clone)]
pub struct PublicKeyFile {
    path: PathBuf,
}

impl PublicKeyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the key.
    pub fn load(&self) -> Result<DecodingKey, AuthFailure> {
        let pem = std::fs::read(&self.path).map_err(|e| {
            AuthFailure::KeyUnavailable(format!("{}: {e}", self.path.display()))
        })?;

        DecodingKey::from_rsa_pem(&pem).map_err(|e| {
            AuthFailure::KeyUnavailable(format!("{}: {e}", self.path.display()))
        })
    }
}

impl Default for PublicKeyFile {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_KEY_PATH)
    }
}
