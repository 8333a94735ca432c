//! Scope model + authorization decision.
//!
//! A scope is a flat capability label of the form
//! `{resource_server_id}/{client_id}` (e.g. `users/user-manager-client`).
//! Membership is exact string equality: no hierarchy, no prefixes, no
//! wildcards. Each route declares exactly one scope it requires.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope(String);

impl Scope {
    pub fn new(resource_server_id: &str, client_id: &str) -> Self {
        Scope(format!("{}/{}", resource_server_id, client_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a provider `scope` claim (space-separated labels) into scopes.
    pub fn parse_claim(claim: &str) -> Vec<Scope> {
        claim
            .split_ascii_whitespace()
            .map(|s| Scope(s.to_string()))
            .collect()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The credential was valid but does not carry the required scope.
///
/// Kept separate from token-verification errors so callers can answer
/// 403 here and 401 there.
#[derive(Debug, Error)]
#[error("required scope '{required}' not granted")]
pub struct InsufficientScope {
    pub required: Scope,
}

pub fn authorize(granted: &[Scope], required: &Scope) -> Result<(), InsufficientScope> {
    if granted.contains(required) {
        Ok(())
    } else {
        Err(InsufficientScope {
            required: required.clone(),
        })
    }
}
