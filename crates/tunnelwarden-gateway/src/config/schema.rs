use std::collections::HashMap;

use serde::Deserialize;
use tunnelwarden_core::error::{Result, WardenError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    pub upstream: UpstreamSection,

    #[serde(default)]
    pub restrictions: RestrictionGroups,

    #[serde(default)]
    pub groups: Vec<GroupEntry>,

    #[serde(default)]
    pub users: Vec<UserEntry>,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WardenError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.upstream.validate()?;

        let mut tickets = std::collections::HashSet::new();
        for user in &self.users {
            if !tickets.insert(user.ticket.as_str()) {
                return Err(WardenError::BadRequest(format!(
                    "duplicate user ticket: {}",
                    user.ticket
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(WardenError::BadRequest(
                "gateway.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(WardenError::BadRequest(
                "gateway.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(WardenError::BadRequest(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}

/// The remote-session broker this gateway dials for the upstream leg of
/// every tunnel.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    pub addr: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl UpstreamSection {
    pub fn validate(&self) -> Result<()> {
        if self.addr.is_empty() {
            return Err(WardenError::BadRequest("upstream.addr must not be empty".into()));
        }
        if !(100..=60000).contains(&self.connect_timeout_ms) {
            return Err(WardenError::BadRequest(
                "upstream.connect_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

/// Statically configured restriction groups. Each value is a comma-separated
/// list of group names; membership in a listed group attaches the
/// corresponding restriction to the session.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RestrictionGroups {
    /// Groups whose members are restricted to read-only access.
    #[serde(default)]
    pub read_only_groups: String,

    /// Groups whose members may not share an in-use connection.
    #[serde(default)]
    pub disallow_concurrent_groups: String,
}

impl RestrictionGroups {
    pub fn read_only(&self) -> Vec<String> {
        parse_group_list(&self.read_only_groups)
    }

    pub fn disallow_concurrent(&self) -> Vec<String> {
        parse_group_list(&self.disallow_concurrent_groups)
    }
}

/// Parse a comma-separated list of group names. Whitespace preceding a name
/// is ignored; whitespace after a name is interpreted as part of the name.
/// An empty value yields no groups.
pub fn parse_group_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim_start)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// A group whose restrictions are declared through attributes, the same way
/// a backing directory would expose them.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupEntry {
    pub name: String,

    /// Attribute map for the group, including any restriction attributes.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// A user known to the gateway's built-in identity source.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserEntry {
    pub name: String,

    /// Opaque ticket presented at session establishment.
    pub ticket: String,

    /// Attribute map for the user, including any restriction attributes.
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Effective group memberships reported for the user.
    #[serde(default)]
    pub groups: Vec<String>,
}
