// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The device registry and execution targets.
//!
//! Devices are registered once at startup and referenced by immutable
//! [`DeviceId`]s thereafter. The software fallback is not a registry
//! entry — it is the explicit [`Target::Cpu`] variant, so dispatch on
//! targets is exhaustiveness-checked instead of hinging on a null
//! sentinel.

use crate::DeviceDriver;
use std::sync::Arc;

/// Index of a registered accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DeviceId(usize);

impl DeviceId {
    /// Creates an id from a registry index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The registry index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a piece of work executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Target {
    /// A registered accelerator.
    Accelerator(DeviceId),
    /// The software fallback.
    Cpu,
}

impl Target {
    /// Returns `true` for the software fallback.
    pub fn is_cpu(&self) -> bool {
        matches!(self, Self::Cpu)
    }

    /// Returns the accelerator id, if any.
    pub fn device_id(&self) -> Option<DeviceId> {
        match self {
            Self::Accelerator(id) => Some(*id),
            Self::Cpu => None,
        }
    }
}

/// The set of accelerators available to the planner, built once.
pub struct DeviceRegistry {
    drivers: Vec<Arc<dyn DeviceDriver>>,
}

impl DeviceRegistry {
    /// Creates a registry from the available drivers.
    pub fn new(drivers: Vec<Arc<dyn DeviceDriver>>) -> Self {
        for (i, driver) in drivers.iter().enumerate() {
            tracing::debug!(device = driver.name(), id = i, "device registered");
        }
        Self { drivers }
    }

    /// An empty registry (software-only execution).
    pub fn empty() -> Self {
        Self { drivers: Vec::new() }
    }

    /// Number of registered accelerators (the software fallback is not
    /// counted).
    pub fn device_count(&self) -> usize {
        self.drivers.len()
    }

    /// Returns `true` if no accelerators are registered.
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Looks up a driver by id.
    pub fn driver(&self, id: DeviceId) -> Option<&Arc<dyn DeviceDriver>> {
        self.drivers.get(id.index())
    }

    /// Iterates `(id, driver)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &Arc<dyn DeviceDriver>)> {
        self.drivers
            .iter()
            .enumerate()
            .map(|(i, d)| (DeviceId::new(i), d))
    }

    /// Human-readable name for a target.
    pub fn target_name(&self, target: Target) -> String {
        match target {
            Target::Cpu => "cpu".to_string(),
            Target::Accelerator(id) => self
                .driver(id)
                .map(|d| d.name().to_string())
                .unwrap_or_else(|| format!("device#{}", id.index())),
        }
    }
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.drivers.iter().map(|d| d.name()).collect();
        f.debug_struct("DeviceRegistry").field("devices", &names).finish()
    }
}
