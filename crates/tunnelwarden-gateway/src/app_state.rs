//! Shared application state for the tunnelWarden gateway.
//!
//! Startup compiles configuration into the runtime structures every session
//! consults: the identity source, the group directory, the process-wide
//! access tracker, and the connection broker. Startup errors are explicit
//! (Result instead of panic).

use std::sync::Arc;

use tunnelwarden_core::error::Result;
use tunnelwarden_core::restrict::Restriction;

use crate::config::GatewayConfig;
use crate::connect::{AccessTracker, ConnectionBroker, ProviderId};
use crate::groups::GroupDirectory;
use crate::identity::IdentitySource;
use crate::obs::GatewayMetrics;
use crate::transport::upstream::TcpConnector;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    identity: IdentitySource,
    groups: GroupDirectory,
    broker: ConnectionBroker,
    connector: TcpConnector,
    provider: ProviderId,
    metrics: Arc<GatewayMetrics>,
}

impl AppState {
    /// Build application state from validated configuration.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let identity = IdentitySource::from_config(&cfg.users);
        let groups = GroupDirectory::from_config(&cfg.groups, &cfg.restrictions);

        // Surface config typos early: a group whose attributes enable no
        // known restriction does nothing at runtime.
        for entry in &cfg.groups {
            if Restriction::all_enabled(&entry.attributes).is_empty() {
                tracing::warn!(group = %entry.name, "group defines no known restriction attributes");
            }
        }

        let metrics = Arc::new(GatewayMetrics::default());
        let broker = ConnectionBroker::new(AccessTracker::new(), Arc::clone(&metrics));
        let connector = TcpConnector::from_config(&cfg.upstream);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                identity,
                groups,
                broker,
                connector,
                provider: ProviderId::allocate(),
                metrics,
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn identity(&self) -> &IdentitySource {
        &self.inner.identity
    }

    pub fn groups(&self) -> &GroupDirectory {
        &self.inner.groups
    }

    pub fn broker(&self) -> &ConnectionBroker {
        &self.inner.broker
    }

    pub fn connector(&self) -> &TcpConnector {
        &self.inner.connector
    }

    /// Identity of the provider this gateway fronts. Resource identifiers
    /// from distinct gateway instances never compare equal even when local
    /// identifiers collide.
    pub fn provider(&self) -> ProviderId {
        self.inner.provider
    }

    pub fn metrics(&self) -> &Arc<GatewayMetrics> {
        &self.inner.metrics
    }
}
