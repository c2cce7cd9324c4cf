//! Type classification: flags (bitset) vs. discrete enumerations.

use crate::enum_info::{EnumKind, EnumTypeId};
use crate::host::TypeOracle;

/// Classify an enumerated type from its declaration-level metadata.
///
/// A type is [`EnumKind::Flags`] if and only if its declaration carries the
/// recognized bitset marker; every other enumeration is
/// [`EnumKind::Discrete`]. No side effects, no instance data.
pub fn classify(oracle: &dyn TypeOracle, id: EnumTypeId) -> EnumKind {
    if oracle.has_flags_attribute(id) {
        EnumKind::Flags
    } else {
        EnumKind::Discrete
    }
}
