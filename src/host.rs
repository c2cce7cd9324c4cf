//! Host collaborator contracts.
//!
//! The generator never scans program text, resolves types, or writes files
//! itself. Everything host-specific sits behind the three traits in this
//! module:
//!
//! - [`TypeOracle`] - static type resolution and declaration metadata
//! - [`OutputSink`] - receives generated source units
//! - [`DiagnosticSink`] - receives structured error reports
//!
//! Hosts implement these once; the generator core stays independent of any
//! particular toolchain.

use crate::diagnostics::Diagnostic;
use crate::enum_info::{EnumMember, EnumTypeId, ValidationRequest};

// =============================================================================
// Type Oracle
// =============================================================================

/// Host-side view of the program's type system.
///
/// `resolve` may be called concurrently during batched intake; the remaining
/// methods are only invoked for ids that `resolve` previously returned, and
/// only with declaration-level metadata in hand (no instance data).
pub trait TypeOracle: Sync {
    /// Statically determine the enumerated type of a request's value
    /// expression.
    ///
    /// Returns `None` when the type cannot be determined. An unresolved
    /// request is dropped, not an error.
    fn resolve(&self, request: &ValidationRequest) -> Option<EnumTypeId>;

    /// Display name of the type, used in generated code and messages.
    fn display_name(&self, id: EnumTypeId) -> String;

    /// Whether the declaration carries the "treat as bitset" marker.
    fn has_flags_attribute(&self, id: EnumTypeId) -> bool;

    /// Declared members with their underlying integer values.
    ///
    /// May contain duplicate values and may be unordered; the value extractor
    /// deduplicates and sorts.
    fn members(&self, id: EnumTypeId) -> Vec<EnumMember>;
}

// =============================================================================
// Output Sink
// =============================================================================

/// One named unit of generated source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Logical unit name under which the host registers the text.
    pub name: String,
    /// The generated source.
    pub text: String,
}

impl GeneratedUnit {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        GeneratedUnit {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Receives generated units and makes them available to the rest of the
/// build.
///
/// A run emits exactly one named unit, after all distinct types are
/// processed. The fixed bootstrap unit is emitted separately at
/// initialization time, independent of whether any requests arrive.
pub trait OutputSink {
    fn accept(&mut self, unit: GeneratedUnit);
}

/// Collects units in memory; the simplest host sink.
#[derive(Debug, Default)]
pub struct UnitBuffer {
    units: Vec<GeneratedUnit>,
}

impl UnitBuffer {
    pub fn new() -> Self {
        UnitBuffer { units: Vec::new() }
    }

    pub fn units(&self) -> &[GeneratedUnit] {
        &self.units
    }

    /// Find a unit by name.
    pub fn get(&self, name: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl OutputSink for UnitBuffer {
    fn accept(&mut self, unit: GeneratedUnit) {
        self.units.push(unit);
    }
}

// =============================================================================
// Diagnostic Sink
// =============================================================================

/// Receives structured error reports from the generator.
///
/// [`DiagnosticBag`](crate::diagnostics::DiagnosticBag) implements this for
/// hosts that just want to collect and format.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_buffer_lookup() {
        let mut buffer = UnitBuffer::new();
        assert!(buffer.is_empty());

        buffer.accept(GeneratedUnit::new("guards", "fn main() {}"));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.get("guards").unwrap().text, "fn main() {}");
        assert!(buffer.get("missing").is_none());
    }
}
