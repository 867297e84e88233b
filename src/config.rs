// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is read once at startup, after
//! an optional `.env` file has been loaded.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PAYLOAD_PARSER` | Claims parser name (`moodle`, `prolific`) | `moodle` |
//! | `PUBLIC_KEY_PATH` | PEM RSA public key used to verify tokens | `rs256.rsa.pub` |
//! | `TOKEN_EXPIRY` | `ignore`, `when-present` or `required` | `when-present` |
//! | `TOKEN_LEEWAY_SECS` | Clock skew tolerance for `exp`/`nbf` | `0` |
//! | `MAX_BODY_BYTES` | Callback body size limit | `65536` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::{
    callback::DEFAULT_MAX_BODY_BYTES, key::DEFAULT_PUBLIC_KEY_PATH,
    verifier::DEFAULT_LEEWAY_SECS, Authenticator, ExpiryPolicy, ParserRegistry, PublicKeyFile,
    TokenVerifier,
};

pub const PAYLOAD_PARSER_ENV: &str = "PAYLOAD_PARSER";
pub const PUBLIC_KEY_PATH_ENV: &str = "PUBLIC_KEY_PATH";
pub const TOKEN_EXPIRY_ENV: &str = "TOKEN_EXPIRY";
pub const TOKEN_LEEWAY_SECS_ENV: &str = "TOKEN_LEEWAY_SECS";
pub const MAX_BODY_BYTES_ENV: &str = "MAX_BODY_BYTES";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Default `RUST_LOG` filter when none is set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Log output format.
///
/// Read on its own, ahead of [`AppConfig`], so the subscriber is installed
/// before configuration warnings are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Parser selector; `None` when unset.
    pub payload_parser: Option<String>,
    pub public_key_path: PathBuf,
    pub token_expiry: ExpiryPolicy,
    pub token_leeway_secs: u64,
    pub max_body_bytes: usize,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            payload_parser: None,
            public_key_path: PathBuf::from(DEFAULT_PUBLIC_KEY_PATH),
            token_expiry: ExpiryPolicy::default(),
            token_leeway_secs: DEFAULT_LEEWAY_SECS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`; unset or blank values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            payload_parser: get(PAYLOAD_PARSER_ENV),
            public_key_path: get(PUBLIC_KEY_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.public_key_path),
            token_expiry: parse_or(TOKEN_EXPIRY_ENV, get(TOKEN_EXPIRY_ENV), defaults.token_expiry),
            token_leeway_secs: parse_or(
                TOKEN_LEEWAY_SECS_ENV,
                get(TOKEN_LEEWAY_SECS_ENV),
                defaults.token_leeway_secs,
            ),
            max_body_bytes: parse_or(
                MAX_BODY_BYTES_ENV,
                get(MAX_BODY_BYTES_ENV),
                defaults.max_body_bytes,
            ),
            host: get(HOST_ENV).unwrap_or(defaults.host),
            port: parse_or(PORT_ENV, get(PORT_ENV), defaults.port),
        }
    }

    /// Bind address as `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the authenticator described by this configuration.
    pub fn authenticator(&self, registry: &ParserRegistry) -> Authenticator {
        let verifier = TokenVerifier::new(PublicKeyFile::new(&self.public_key_path))
            .with_expiry(self.token_expiry)
            .with_leeway(self.token_leeway_secs);

        Authenticator::new(verifier, registry.resolve(self.payload_parser.as_deref()))
            .with_max_body_bytes(self.max_body_bytes)
    }
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!(variable = name, value = %raw, error = %e, %default, "Invalid configuration value, using default");
            default
        }),
    }
}
