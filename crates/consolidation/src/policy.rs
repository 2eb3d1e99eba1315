//! Allow-list of stack sizes an actor may request.

use serde::Serialize;

use crate::error::ConsolidationError;

pub const DEFAULT_STACK_SIZES: [u64; 4] = [2000, 3000, 4000, 5000];

/// A stack size that passed the allow-list. Only [`StackSizePolicy::validate`]
/// produces one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TargetStackSize(u64);

impl TargetStackSize {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for TargetStackSize {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSizePolicy {
    sizes: Vec<u64>,
}

impl StackSizePolicy {
    /// Build a policy from configured sizes; zeros are ignored and duplicates
    /// collapse. An empty result falls back to the defaults.
    pub fn new(sizes: impl IntoIterator<Item = u64>) -> Self {
        let mut sizes: Vec<u64> = sizes.into_iter().filter(|size| *size > 0).collect();
        sizes.sort_unstable();
        sizes.dedup();
        if sizes.is_empty() {
            return Self::default();
        }
        Self { sizes }
    }

    /// Allowed sizes, ascending.
    pub fn sizes(&self) -> &[u64] {
        &self.sizes
    }

    pub fn allows(&self, size: u64) -> bool {
        self.sizes.binary_search(&size).is_ok()
    }

    pub fn validate(&self, requested: u64) -> Result<TargetStackSize, ConsolidationError> {
        if self.allows(requested) {
            Ok(TargetStackSize(requested))
        } else {
            Err(ConsolidationError::InvalidTargetSize {
                requested,
                allowed: self.sizes.clone(),
            })
        }
    }
}

impl Default for StackSizePolicy {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_STACK_SIZES.to_vec(),
        }
    }
}
