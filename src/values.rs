//! Value extraction: the ordered set of distinct underlying values of an
//! enumerated type.
//!
//! The host's member enumerator may report duplicates (several names sharing
//! one value) in any order. Downstream consumers - the range compressor in
//! particular - rely on the output here being ascending and distinct, so this
//! module owns that invariant.

use rustc_hash::FxHashSet;
use std::fmt;

use crate::enum_info::EnumMember;

/// A type with zero declared members was requested.
///
/// A type with no legal values cannot be validated meaningfully; this is a
/// hard error for that type's guard, reported as a diagnostic while
/// generation of other types continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoMembersError {
    /// Display name of the offending type.
    pub type_name: String,
}

impl fmt::Display for NoMembersError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enum type '{}' declares no members", self.type_name)
    }
}

impl std::error::Error for NoMembersError {}

/// Extract the distinct underlying values of the declared members, ascending.
///
/// Duplicate values declared under different member names collapse to one
/// value.
pub fn extract_values(
    type_name: &str,
    members: &[EnumMember],
) -> Result<Vec<i64>, NoMembersError> {
    if members.is_empty() {
        return Err(NoMembersError {
            type_name: type_name.to_string(),
        });
    }

    let mut seen = FxHashSet::default();
    let mut values: Vec<i64> = members
        .iter()
        .filter(|m| seen.insert(m.value))
        .map(|m| m.value)
        .collect();
    values.sort_unstable();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(values: &[(&str, i64)]) -> Vec<EnumMember> {
        values
            .iter()
            .map(|(name, value)| EnumMember::new(*name, *value))
            .collect()
    }

    #[test]
    fn test_sorts_unordered_members() {
        let m = members(&[("C", 5), ("A", 0), ("B", 2)]);
        assert_eq!(extract_values("Mode", &m).unwrap(), vec![0, 2, 5]);
    }

    #[test]
    fn test_duplicate_values_collapse() {
        // Aliased members share an underlying value.
        let m = members(&[("Read", 1), ("Default", 1), ("Write", 2)]);
        assert_eq!(extract_values("Access", &m).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_negative_values_sort_first() {
        let m = members(&[("Ok", 0), ("Unknown", -1)]);
        assert_eq!(extract_values("Status", &m).unwrap(), vec![-1, 0]);
    }

    #[test]
    fn test_zero_members_is_an_error() {
        let err = extract_values("Empty", &[]).unwrap_err();
        assert_eq!(err.type_name, "Empty");
        assert_eq!(err.to_string(), "enum type 'Empty' declares no members");
    }
}
