//! Compute demand for a single role replica.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Immutable description of the compute a single replica requires.
///
/// `capabilities` is a free-form map of backend-specific placement hints
/// (device classes, network tiers, etc.). Backends that do not understand
/// a capability ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub cpu: u32,
    pub gpu: u32,
    pub mem_mb: u64,
    pub capabilities: HashMap<String, String>,
}

impl Resources {
    /// Create a resource demand with no capabilities.
    pub fn new(cpu: u32, gpu: u32, mem_mb: u64) -> Self {
        Self {
            cpu,
            gpu,
            mem_mb,
            capabilities: HashMap::new(),
        }
    }

    /// Attach backend capabilities, replacing any previously set.
    pub fn capabilities<I, K, V>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.capabilities = capabilities
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Copy these resources, merging `overrides` on top of the capability
    /// map. On key collision the override wins. The receiver is untouched.
    pub fn copy_with<I, K, V>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut capabilities = self.capabilities.clone();
        for (k, v) in overrides {
            capabilities.insert(k.into(), v.into());
        }
        Self {
            cpu: self.cpu,
            gpu: self.gpu,
            mem_mb: self.mem_mb,
            capabilities,
        }
    }
}
