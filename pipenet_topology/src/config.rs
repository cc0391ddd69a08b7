// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build configuration.

use pipenet_index::IndexKind;

use crate::error::{Result, TopologyError};

/// Default snapping tolerance, in drawing units.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Configuration threaded through a graph build.
///
/// The tolerance decides vertex identity everywhere: polyline decomposition,
/// adjacency and projection deduplication all snap through it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TopologyConfig {
    /// Points closer than this on both axes are the same vertex.
    pub tolerance: f64,
    /// Backend for the network segment index.
    pub index: IndexKind,
    /// Backend for the no-cross barrier index.
    pub barrier_index: IndexKind,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            index: IndexKind::RTree,
            barrier_index: IndexKind::RTree,
        }
    }
}

impl TopologyConfig {
    /// Set the snapping tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the network index backend.
    #[must_use]
    pub fn with_index(mut self, kind: IndexKind) -> Self {
        self.index = kind;
        self
    }

    /// Set the barrier index backend.
    #[must_use]
    pub fn with_barrier_index(mut self, kind: IndexKind) -> Self {
        self.barrier_index = kind;
        self
    }

    /// Check that the tolerance is finite and positive.
    pub fn validate(&self) -> Result<()> {
        if self.tolerance.is_finite() && self.tolerance > 0.0 {
            Ok(())
        } else {
            Err(TopologyError::InvalidTolerance(self.tolerance))
        }
    }
}
