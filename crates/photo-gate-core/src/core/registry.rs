// photo-gate-core/src/core/registry.rs
// ============================================================================
// Module: Check Registry
// Description: Discovery-time index of check implementations by name and category.
// Purpose: Validate descriptors once and serve immutable lookups to the runtime.
// Dependencies: thiserror, tracing, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The registry is built wholesale by [`Registry::discover`] over an explicit
//! set of implementations (the registered variant list — there is no runtime
//! module scanning) and is never partially mutated; a refresh builds a new
//! registry and the owner swaps the `Arc`. A check whose descriptor fails
//! validation is excluded and recorded without aborting discovery of the
//! others; an empty result set is fatal because no checks means no possible
//! verdicts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::core::descriptor::CheckCategory;
use crate::core::descriptor::CheckDescriptor;
use crate::core::descriptor::DescriptorError;
use crate::core::identifiers::CheckName;
use crate::interfaces::Check;

// ============================================================================
// SECTION: Registry Entries
// ============================================================================

/// One registered check: its immutable descriptor plus the implementation.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Validated descriptor captured at discovery time.
    pub descriptor: CheckDescriptor,
    /// Shared implementation handle.
    pub implementation: Arc<dyn Check>,
}

/// A check excluded during discovery, with the validation error that caused it.
#[derive(Debug, Clone)]
pub struct RejectedCheck {
    /// Name reported by the implementation, as offered.
    pub name: CheckName,
    /// Validation error that excluded it.
    pub error: DescriptorError,
}

/// Result of a discovery pass: the built registry plus the exclusion record.
pub struct DiscoveryReport {
    /// The validated registry.
    pub registry: Registry,
    /// Checks excluded by descriptor validation.
    pub rejected: Vec<RejectedCheck>,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for DiscoveryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryReport")
            .field("registry", &self.registry)
            .field("rejected", &self.rejected)
            .finish()
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Immutable index of validated check implementations.
pub struct Registry {
    /// Entries keyed by check name.
    entries: BTreeMap<CheckName, RegistryEntry>,
    /// Names in discovery order; the canonical default check order.
    order: Vec<CheckName>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries)
            .field("order", &self.order)
            .finish()
    }
}

impl Registry {
    /// Discovers and validates the supplied implementation set.
    ///
    /// A duplicate check name is a discovery-time conflict and fatal. A
    /// descriptor that fails validation excludes only that check and is
    /// recorded in the report. An empty surviving set is fatal.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] on duplicate names or an empty result set.
    pub fn discover(
        sources: impl IntoIterator<Item = Arc<dyn Check>>,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        let mut entries = BTreeMap::new();
        let mut order = Vec::new();
        let mut rejected = Vec::new();

        for implementation in sources {
            let descriptor = implementation.describe();
            let name = descriptor.name.clone();
            if let Err(error) = descriptor.validate() {
                warn!(check = %name, %error, "excluding check with invalid descriptor");
                rejected.push(RejectedCheck {
                    name,
                    error,
                });
                continue;
            }
            if entries.contains_key(&name) {
                return Err(DiscoveryError::DuplicateName(name));
            }
            debug!(check = %name, category = %descriptor.category, "registered check");
            order.push(name.clone());
            entries.insert(name, RegistryEntry {
                descriptor,
                implementation,
            });
        }

        if entries.is_empty() {
            return Err(DiscoveryError::Empty);
        }

        Ok(DiscoveryReport {
            registry: Self {
                entries,
                order,
            },
            rejected,
        })
    }

    /// Returns the entry for a check name.
    #[must_use]
    pub fn get(&self, name: &CheckName) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// Returns the descriptor for a check name.
    #[must_use]
    pub fn descriptor(&self, name: &CheckName) -> Option<&CheckDescriptor> {
        self.entries.get(name).map(|entry| &entry.descriptor)
    }

    /// Returns all descriptors keyed by name.
    #[must_use]
    pub fn all(&self) -> BTreeMap<CheckName, &CheckDescriptor> {
        self.entries.iter().map(|(name, entry)| (name.clone(), &entry.descriptor)).collect()
    }

    /// Returns descriptors bucketed by category, in discovery order.
    ///
    /// Every registered check appears in exactly one bucket.
    #[must_use]
    pub fn by_category(&self) -> BTreeMap<CheckCategory, Vec<&CheckDescriptor>> {
        let mut buckets: BTreeMap<CheckCategory, Vec<&CheckDescriptor>> = BTreeMap::new();
        for name in &self.order {
            if let Some(entry) = self.entries.get(name) {
                buckets.entry(entry.descriptor.category).or_default().push(&entry.descriptor);
            }
        }
        buckets
    }

    /// Check names in discovery order.
    #[must_use]
    pub fn names(&self) -> &[CheckName] {
        &self.order
    }

    /// Number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no check is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal discovery errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscoveryError {
    /// Two implementations reported the same name.
    #[error("duplicate check name at discovery: {0}")]
    DuplicateName(CheckName),
    /// No usable check survived discovery.
    #[error("discovery produced no usable checks")]
    Empty,
}
