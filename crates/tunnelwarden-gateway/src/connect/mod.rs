//! Connection establishment with admission control.
//!
//! The broker sits between session setup and the lower transport layer:
//! it consults the session's restrictions to decide whether a new use of
//! the target resource may be admitted, dials the upstream through the
//! [`Connectable`] seam, and hands back a tunnel with the instruction
//! filter applied. The usage reservation is scope-bound: any failure after
//! admission (including an unexpected runtime failure) releases it exactly
//! once before the original error propagates unchanged.

pub mod resource;
pub mod tracker;

use std::sync::Arc;

use async_trait::async_trait;

use tunnelwarden_core::error::{Result, WardenError};
use tunnelwarden_core::restrict::{Restriction, RestrictionSet};

use crate::filter::{InstructionReader, InstructionWriter, RestrictedTunnel};
use crate::obs::GatewayMetrics;

pub use resource::{GlobalResourceId, ProviderId, ResourceKind};
pub use tracker::{AccessGuard, AccessTracker};

/// Lower transport seam: establishes the upstream leg of a tunnel and
/// hands back its two halves.
#[async_trait]
pub trait Connectable: Send + Sync {
    async fn connect(&self) -> Result<(Box<dyn InstructionReader>, Box<dyn InstructionWriter>)>;
}

/// Establishes tunnels, enforcing concurrent-access restrictions across
/// every session of the process.
pub struct ConnectionBroker {
    tracker: AccessTracker,
    metrics: Arc<GatewayMetrics>,
}

impl ConnectionBroker {
    pub fn new(tracker: AccessTracker, metrics: Arc<GatewayMetrics>) -> Self {
        Self { tracker, metrics }
    }

    pub fn tracker(&self) -> &AccessTracker {
        &self.tracker
    }

    /// Connect to the resource with the given identifier on behalf of a
    /// session carrying the given restrictions.
    ///
    /// Admission is decided first: a session subject to
    /// [`Restriction::DisallowConcurrent`] is denied when the resource is
    /// already in use, surfacing as [`WardenError::ResourceBusy`], an
    /// expected outcome rather than a system fault. After a successful admission,
    /// the reservation is held by a guard attached to the returned tunnel,
    /// so connect failures and tunnel teardown both release it exactly once.
    pub async fn connect(
        &self,
        restrictions: RestrictionSet,
        id: GlobalResourceId,
        connectable: &dyn Connectable,
    ) -> Result<RestrictedTunnel> {
        let allow_concurrent = !restrictions.contains(Restriction::DisallowConcurrent);

        let Some(guard) = self.tracker.try_acquire(id, allow_concurrent) else {
            self.metrics.admissions.inc(&[("outcome", "denied")]);
            return Err(WardenError::ResourceBusy);
        };
        self.metrics.admissions.inc(&[("outcome", "granted")]);

        // The guard releases the reservation if the dial fails
        let (reader, writer) = connectable.connect().await?;

        Ok(RestrictedTunnel::new(
            reader,
            writer,
            restrictions,
            guard,
            Arc::clone(&self.metrics),
        ))
    }
}
