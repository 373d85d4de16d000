//! Global resource identity.
//!
//! A connection's string identifier is only unique within the provider that
//! issued it; two providers may coincidentally hand out the same local
//! identifier. Usage tracking therefore keys on (provider identity, kind,
//! local identifier), where provider identity is an allocated token rather
//! than the provider's name.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identity token for a resource provider instance. Tokens are allocated
/// process-wide; equality means "the same provider instance", never "two
/// providers that happen to share a name".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderId(u64);

static NEXT_PROVIDER: AtomicU64 = AtomicU64::new(1);

impl ProviderId {
    /// Allocate a fresh provider identity.
    pub fn allocate() -> Self {
        ProviderId(NEXT_PROVIDER.fetch_add(1, Ordering::Relaxed))
    }
}

/// The kinds of connectable objects that may be tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A single connection.
    Connection,
    /// A balancing group of connections.
    ConnectionGroup,
}

/// Uniquely identifies a connectable object across all providers. Created
/// fresh for each connection attempt and discarded after.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalResourceId {
    pub provider: ProviderId,
    pub kind: ResourceKind,
    pub id: String,
}

impl GlobalResourceId {
    pub fn connection(provider: ProviderId, id: impl Into<String>) -> Self {
        Self {
            provider,
            kind: ResourceKind::Connection,
            id: id.into(),
        }
    }

    pub fn connection_group(provider: ProviderId, id: impl Into<String>) -> Self {
        Self {
            provider,
            kind: ResourceKind::ConnectionGroup,
            id: id.into(),
        }
    }
}
