// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chat Auth Server - signed token authentication callback
//!
//! Identity providers (an LMS chat plugin, a research study platform) post an
//! RS256-signed JWT to the chat application. This crate verifies the token
//! against a public key on disk and maps its claims onto a normalized user
//! record with a configurable, provider-specific parser.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum) hosting the callback
//! - `auth` - Token extraction, verification and claims parsers
//! - `config` - Environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
