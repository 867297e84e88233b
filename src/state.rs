// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{Authenticator, ParserRegistry};
use crate::config::AppConfig;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    pub fn new(authenticator: Authenticator) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
        }
    }

    /// Build state from configuration using the built-in parsers.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.authenticator(&ParserRegistry::builtin()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
