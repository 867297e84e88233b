// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified claims and the normalized user they map onto.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::AuthFailure;

/// Decoded token payload.
///
/// Only [`TokenVerifier`](super::TokenVerifier) constructs this type outside
/// of tests, after the signature has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub(crate) fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Top-level claim by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Nested claim by dotted path, e.g. `platformContext.context.id`.
    ///
    /// Each segment indexes into an object; array elements are not addressable.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.0.get(first)?, |value, segment| {
            value.as_object()?.get(segment)
        })
    }

    /// Deserialize the claims into a parser-specific schema.
    ///
    /// Missing or mistyped fields become [`AuthFailure::MappingError`].
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, AuthFailure> {
        T::deserialize(Value::Object(self.0.clone()))
            .map_err(|e| AuthFailure::MappingError(e.to_string()))
    }
}

/// Canonical identity handed to the chat application.
///
/// `metadata` always carries `user` and `provider`; the remaining keys
/// depend on the parser that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NormalizedUser {
    /// Stable user key within the provider's namespace.
    pub identifier: String,
    /// Provider-specific attributes.
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
}

impl NormalizedUser {
    pub fn new(identifier: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            identifier: identifier.into(),
            metadata,
        }
    }

    /// `metadata.role`, when the parser assigns one.
    pub fn role(&self) -> Option<&str> {
        self.metadata.get("role").and_then(Value::as_str)
    }

    /// `metadata.provider`.
    pub fn provider(&self) -> Option<&str> {
        self.metadata.get("provider").and_then(Value::as_str)
    }
}
