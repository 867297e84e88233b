// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claims parsers: provider-specific mapping from verified claims to a
//! [`NormalizedUser`].
//!
//! ## Built-in parsers
//!
//! | Name | Provider | Identifier |
//! |------|----------|------------|
//! | `moodle` (default) | LMS launch via the chat plugin | `user` |
//! | `prolific` | Research study participant | `{studyId}~{prolificId}` |
//!
//! A parser is a plain function. Further parsers are added with
//! [`ParserRegistry::register`] and selected by name through configuration;
//! the callback never names a parser itself.

use std::collections::HashMap;

use serde::{de, Deserialize, Deserializer};
use serde_json::{json, Map, Value};

use super::{AuthFailure, Claims, NormalizedUser};

/// Signature shared by every claims parser.
pub type ParseFn = fn(&Claims) -> Result<NormalizedUser, AuthFailure>;

pub const MOODLE: &str = "moodle";
pub const PROLIFIC: &str = "prolific";

/// Parser used when no selector is configured or the selector is unknown.
pub const DEFAULT_PARSER: &str = MOODLE;

/// LIS institution role marking platform administrators.
pub const ADMINISTRATOR_ROLE: &str =
    "http://purl.imsglobal.org/vocab/lis/v2/institution/person#Administrator";

/// Where study participants are sent once their session ends.
pub const PROLIFIC_RETURN_URL: &str = "https://docs.google.com/document/d/e/2PACX-1vRvyIlu7bCIuXjXQ-v0vn9jzOqATCbINgz8FtsEpdRpgsOBUJqXw4EZyf22Z9heBReDzeKQsTkev7LS/pub";

/// Identifier claims arrive as strings or bare numbers depending on the
/// provider; both become the string form.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "invalid type: {other}, expected a string or number"
        ))),
    }
}

// =============================================================================
// Moodle
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoodlePayload {
    #[serde(deserialize_with = "string_or_number")]
    user: String,
    platform_id: Value,
    platform_context: PlatformContext,
}

#[derive(Debug, Deserialize)]
struct PlatformContext {
    roles: Vec<String>,
    context: CourseContext,
}

#[derive(Debug, Deserialize)]
struct CourseContext {
    id: Value,
}

/// Map an LMS launch payload.
///
/// Administrators (by LIS institution role) get `role = "admin"`, everyone
/// else `"student"`.
pub fn parse_moodle(claims: &Claims) -> Result<NormalizedUser, AuthFailure> {
    let payload: MoodlePayload = claims.deserialize_into()?;

    let is_admin = payload
        .platform_context
        .roles
        .iter()
        .any(|role| role == ADMINISTRATOR_ROLE);
    let role = if is_admin { "admin" } else { "student" };

    let mut metadata = Map::new();
    metadata.insert("user".into(), json!(payload.user));
    metadata.insert("role".into(), json!(role));
    metadata.insert("provider".into(), json!("header"));
    metadata.insert("platform-id".into(), payload.platform_id);
    metadata.insert("courseid".into(), payload.platform_context.context.id);

    Ok(NormalizedUser::new(payload.user, metadata))
}

// =============================================================================
// Prolific
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProlificPayload {
    #[serde(deserialize_with = "string_or_number")]
    study_id: String,
    #[serde(deserialize_with = "string_or_number")]
    prolific_id: String,
    #[serde(default)]
    exp: Option<Value>,
}

/// Map a study participant payload.
///
/// The identifier scopes the participant to the study, so the same
/// participant in two studies yields two distinct users. `exp` is carried
/// through as metadata only.
pub fn parse_prolific(claims: &Claims) -> Result<NormalizedUser, AuthFailure> {
    let payload: ProlificPayload = claims.deserialize_into()?;
    tracing::debug!(study_id = %payload.study_id, "Parsing prolific payload");

    let identifier = format!("{}~{}", payload.study_id, payload.prolific_id);

    let mut metadata = Map::new();
    metadata.insert("user".into(), json!(payload.prolific_id));
    metadata.insert("provider".into(), json!("prolific"));
    metadata.insert("studyId".into(), json!(payload.study_id));
    metadata.insert("exp".into(), payload.exp.unwrap_or(Value::Null));
    metadata.insert("returnUrl".into(), json!(PROLIFIC_RETURN_URL));

    Ok(NormalizedUser::new(identifier, metadata))
}

// =============================================================================
// Registry
// =============================================================================

/// Named set of claims parsers.
#[derive(Debug, Clone)]
pub struct ParserRegistry {
    parsers: HashMap<String, ParseFn>,
}

/// The parser chosen for this process.
#[derive(Debug, Clone)]
pub struct SelectedParser {
    name: String,
    parse: ParseFn,
}

impl SelectedParser {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parse(&self, claims: &Claims) -> Result<NormalizedUser, AuthFailure> {
        (self.parse)(claims)
    }
}

impl ParserRegistry {
    /// Registry holding the built-in `moodle` and `prolific` parsers.
    pub fn builtin() -> Self {
        Self {
            parsers: HashMap::new(),
        }
        .register(MOODLE, parse_moodle)
        .register(PROLIFIC, parse_prolific)
    }

    /// Add or replace a parser.
    pub fn register(mut self, name: impl Into<String>, parse: ParseFn) -> Self {
        self.parsers.insert(name.into(), parse);
        self
    }

    pub fn get(&self, name: &str) -> Option<ParseFn> {
        self.parsers.get(name).copied()
    }

    /// Registered parser names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Pick the parser for `selector`, falling back to [`DEFAULT_PARSER`].
    pub fn resolve(&self, selector: Option<&str>) -> SelectedParser {
        let selected = match selector {
            Some(name) => match self.get(name) {
                Some(parse) => Some((name, parse)),
                None => {
                    tracing::warn!(
                        selector = name,
                        available = ?self.names(),
                        default = DEFAULT_PARSER,
                        "Unknown payload parser, using default"
                    );
                    None
                }
            },
            None => None,
        };

        let (name, parse) = selected.unwrap_or_else(|| {
            (
                DEFAULT_PARSER,
                self.get(DEFAULT_PARSER).unwrap_or(parse_moodle as ParseFn),
            )
        });

        tracing::debug!(parser = name, "Using payload parser");

        SelectedParser {
            name: name.to_string(),
            parse,
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testutil;

    #[test]
    fn moodle_admin_role_maps_to_admin() {
        let claims = testutil::claims(testutil::moodle_claims("u-17", true));
        let user = parse_moodle(&claims).unwrap();

        assert_eq!(user.identifier, "u-17");
        assert_eq!(user.role(), Some("admin"));
        assert_eq!(user.metadata["user"], "u-17");
        assert_eq!(user.metadata["provider"], "header");
        assert_eq!(user.metadata["platform-id"], "https://moodle.example.edu");
        assert_eq!(user.metadata["courseid"], 101);
    }

    #[test]
    fn moodle_without_admin_role_is_student() {
        let claims = testutil::claims(testutil::moodle_claims("u-18", false));
        let user = parse_moodle(&claims).unwrap();

        assert_eq!(user.role(), Some("student"));
    }

    #[test]
    fn moodle_admin_match_is_exact() {
        let mut payload = testutil::moodle_claims("u-19", false);
        payload["platformContext"]["roles"] = json!([
            "http://purl.imsglobal.org/vocab/lis/v2/institution/person#administrator",
            "Administrator"
        ]);
        let user = parse_moodle(&testutil::claims(payload)).unwrap();

        assert_eq!(user.role(), Some("student"));
    }

    #[test]
    fn moodle_missing_course_context_is_mapping_error() {
        let mut payload = testutil::moodle_claims("u-20", true);
        payload["platformContext"]
            .as_object_mut()
            .unwrap()
            .remove("context");

        let err = parse_moodle(&testutil::claims(payload)).unwrap_err();
        assert!(matches!(err, AuthFailure::MappingError(ref msg) if msg.contains("context")));
    }

    #[test]
    fn moodle_missing_platform_id_is_mapping_error() {
        let mut payload = testutil::moodle_claims("u-21", true);
        payload.as_object_mut().unwrap().remove("platformId");

        let err = parse_moodle(&testutil::claims(payload)).unwrap_err();
        assert!(matches!(err, AuthFailure::MappingError(_)));
    }

    #[test]
    fn moodle_roles_must_be_a_list() {
        let mut payload = testutil::moodle_claims("u-22", true);
        payload["platformContext"]["roles"] = json!(ADMINISTRATOR_ROLE);

        let err = parse_moodle(&testutil::claims(payload)).unwrap_err();
        assert!(matches!(err, AuthFailure::MappingError(_)));
    }

    #[test]
    fn moodle_numeric_user_becomes_string_identifier() {
        let mut payload = testutil::moodle_claims("ignored", false);
        payload["user"] = json!(42);
        let user = parse_moodle(&testutil::claims(payload)).unwrap();

        assert_eq!(user.identifier, "42");
        assert_eq!(user.metadata["user"], "42");
    }

    #[test]
    fn moodle_user_must_be_scalar_id() {
        for bad in [json!(true), json!({ "id": 42 }), json!(null)] {
            let mut payload = testutil::moodle_claims("ignored", false);
            payload["user"] = bad;

            let err = parse_moodle(&testutil::claims(payload)).unwrap_err();
            assert!(matches!(err, AuthFailure::MappingError(ref msg) if msg.contains("string or number")));
        }
    }

    #[test]
    fn moodle_missing_user_is_mapping_error() {
        let mut payload = testutil::moodle_claims("ignored", false);
        payload.as_object_mut().unwrap().remove("user");

        let err = parse_moodle(&testutil::claims(payload)).unwrap_err();
        assert!(matches!(err, AuthFailure::MappingError(ref msg) if msg.contains("user")));
    }

    #[test]
    fn prolific_numeric_ids_are_accepted() {
        let claims = testutil::claims(json!({ "studyId": 7, "prolificId": 99 }));
        let user = parse_prolific(&claims).unwrap();

        assert_eq!(user.identifier, "7~99");
        assert_eq!(user.metadata["studyId"], "7");
    }

    #[test]
    fn prolific_identifier_joins_study_and_participant() {
        let claims = testutil::claims(testutil::prolific_claims("S1", "P1", Some(1_900_000_000)));
        let user = parse_prolific(&claims).unwrap();

        assert_eq!(user.identifier, "S1~P1");
        assert_eq!(user.metadata["user"], "P1");
        assert_eq!(user.metadata["provider"], "prolific");
        assert_eq!(user.metadata["studyId"], "S1");
        assert_eq!(user.metadata["exp"], 1_900_000_000);
        assert_eq!(user.metadata["returnUrl"], PROLIFIC_RETURN_URL);
        assert_eq!(user.role(), None);
    }

    #[test]
    fn prolific_without_exp_carries_null() {
        let claims = testutil::claims(testutil::prolific_claims("S1", "P1", None));
        let user = parse_prolific(&claims).unwrap();

        assert_eq!(user.metadata["exp"], Value::Null);
    }

    #[test]
    fn prolific_missing_participant_is_mapping_error() {
        let claims = testutil::claims(json!({ "studyId": "S1" }));
        let err = parse_prolific(&claims).unwrap_err();

        assert!(matches!(err, AuthFailure::MappingError(ref msg) if msg.contains("prolificId")));
    }

    #[test]
    fn resolve_named_parser() {
        let registry = ParserRegistry::builtin();
        let selected = registry.resolve(Some("prolific"));

        assert_eq!(selected.name(), PROLIFIC);
        let claims = testutil::claims(testutil::prolific_claims("S1", "P1", None));
        assert_eq!(selected.parse(&claims).unwrap().identifier, "S1~P1");
    }

    #[test]
    fn resolve_missing_or_unknown_falls_back_to_moodle() {
        let registry = ParserRegistry::builtin();

        assert_eq!(registry.resolve(None).name(), MOODLE);
        assert_eq!(registry.resolve(Some("canvas")).name(), MOODLE);
        assert_eq!(registry.resolve(Some("Prolific")).name(), MOODLE);

        let claims = testutil::claims(testutil::moodle_claims("u-1", true));
        assert_eq!(
            registry.resolve(Some("canvas")).parse(&claims).unwrap().role(),
            Some("admin")
        );
    }

    #[test]
    fn registered_parser_is_selectable() {
        fn parse_guest(claims: &Claims) -> Result<NormalizedUser, AuthFailure> {
            let sub = claims
                .get("sub")
                .and_then(Value::as_str)
                .ok_or_else(|| AuthFailure::MappingError("missing field `sub`".into()))?;
            let mut metadata = Map::new();
            metadata.insert("user".into(), json!(sub));
            metadata.insert("provider".into(), json!("guest"));
            Ok(NormalizedUser::new(sub, metadata))
        }

        let registry = ParserRegistry::builtin().register("guest", parse_guest);
        assert_eq!(registry.names(), vec!["guest", "moodle", "prolific"]);

        let selected = registry.resolve(Some("guest"));
        let user = selected
            .parse(&testutil::claims(json!({ "sub": "g-1" })))
            .unwrap();
        assert_eq!(user.identifier, "g-1");
        assert_eq!(user.provider(), Some("guest"));
    }
}
