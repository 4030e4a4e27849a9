//! Key-layer safety limits and the fixed runtime configuration handle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Byte-size limits applied wherever key material enters the system.
///
/// Values are explicit about their units to avoid confusion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyLimits {
    /// Hard ceiling on an encoded key; enforced at encode time and before
    /// allocating for an incoming frame.
    pub max_key_bytes: usize,
    /// Soft threshold above which an encoded key is logged as suspicious.
    pub warn_key_bytes: usize,
}

impl Default for KeyLimits {
    fn default() -> Self {
        Self {
            max_key_bytes: 16 * 1024 * 1024,
            warn_key_bytes: 1024 * 1024,
        }
    }
}

/// Runtime configuration fixed at startup.
///
/// The value never changes after construction, so reading it is a plain
/// accessor; there is no subscription surface. Clones share the same value.
#[derive(Clone, Debug)]
pub struct ConfigHandle {
    limits: Arc<KeyLimits>,
}

impl ConfigHandle {
    pub fn fixed(limits: KeyLimits) -> Self {
        Self {
            limits: Arc::new(limits),
        }
    }

    pub fn limits(&self) -> &KeyLimits {
        &self.limits
    }
}
