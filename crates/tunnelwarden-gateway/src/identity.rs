//! Identity collaborator (config-backed).
//!
//! Authentication itself happens elsewhere; the gateway only needs to map
//! an already-issued ticket to the authenticated user's name, attribute
//! map, and effective group memberships. The built-in source is loaded from
//! configuration. A deployment fronted by a real directory would replace
//! this lookup, which is why group retrieval stays fallible at the seam.

use std::collections::HashMap;

use tunnelwarden_core::error::{Result, WardenError};

use crate::config::schema::UserEntry;

/// An authenticated user as reported by the identity layer.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub username: String,
    pub attributes: HashMap<String, String>,
    pub groups: Vec<String>,
}

/// Ticket -> identity lookup.
pub struct IdentitySource {
    by_ticket: HashMap<String, UserIdentity>,
}

impl IdentitySource {
    pub fn from_config(users: &[UserEntry]) -> Self {
        let by_ticket = users
            .iter()
            .map(|u| {
                (
                    u.ticket.clone(),
                    UserIdentity {
                        username: u.name.clone(),
                        attributes: u.attributes.clone(),
                        groups: u.groups.clone(),
                    },
                )
            })
            .collect();
        Self { by_ticket }
    }

    /// Resolve a presented ticket to the authenticated user.
    pub fn resolve_ticket(&self, ticket: &str) -> Result<&UserIdentity> {
        self.by_ticket.get(ticket).ok_or(WardenError::AuthFailed)
    }

    /// Effective group memberships for a user. The config-backed source
    /// cannot fail, but callers must treat a failure here as degradation,
    /// not as a reason to block the session.
    pub fn effective_groups(&self, user: &UserIdentity) -> Result<Vec<String>> {
        Ok(user.groups.clone())
    }
}
