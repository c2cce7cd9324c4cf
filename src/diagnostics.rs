//! Diagnostic infrastructure for the generator.
//!
//! Generation errors are reported as structured diagnostics rather than
//! panics or silent skips: a numeric code, a severity, and a formatted
//! message. The only hard per-type failure today is a type that declares no
//! members (code EG1001); everything else either succeeds or is an expected
//! skip.
//!
//! # Components
//!
//! - `Diagnostic` - a single report with code and severity
//! - `DiagnosticBag` - a collection for one generation run
//! - `diagnostic_codes` / `diagnostic_messages` - the code space and its
//!   message templates

use serde::Serialize;
use std::fmt;

// =============================================================================
// Severity
// =============================================================================

/// The severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Get the severity name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Check if this is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Codes and message templates
// =============================================================================

/// A diagnostic code with its severity and message template.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub severity: Severity,
    pub template: &'static str,
}

/// Numeric diagnostic codes. Rendered as `EG<code>`.
pub mod diagnostic_codes {
    /// A requested type declares no members at all.
    pub const ENUM_HAS_NO_MEMBERS: u32 = 1001;
}

/// Message templates keyed by code. Placeholders `{0}`, `{1}` are filled by
/// [`format_message`].
pub mod diagnostic_messages {
    use super::{DiagnosticMessage, Severity, diagnostic_codes};

    pub const ENUM_HAS_NO_MEMBERS: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::ENUM_HAS_NO_MEMBERS,
        severity: Severity::Error,
        template: "Enum type '{0}' declares no members; no validation guard can be generated.",
    };
}

/// Format a message template, replacing `{0}`, `{1}`, ... with `args`.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A single structured report from the generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The diagnostic code (e.g. 1001, rendered as EG1001).
    pub code: u32,
    /// The severity level.
    pub severity: Severity,
    /// The formatted message.
    pub message: String,
    /// Display name of the enum type the report concerns, when applicable.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub enum_type: Option<String>,
}

impl Diagnostic {
    /// Build a diagnostic from a message template and its arguments.
    pub fn from_template(message: DiagnosticMessage, args: &[&str]) -> Self {
        Diagnostic {
            code: message.code,
            severity: message.severity,
            message: format_message(message.template, args),
            enum_type: None,
        }
    }

    /// Attach the enum type this report concerns.
    pub fn with_enum_type(mut self, name: impl Into<String>) -> Self {
        self.enum_type = Some(name.into());
        self
    }

    /// Check if this is an error.
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Diagnostic {
    /// Renders like `error[EG1001]: Enum type 'Empty' declares no members...`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[EG{:04}]: {}", self.severity, self.code, self.message)
    }
}

// =============================================================================
// DiagnosticBag
// =============================================================================

/// A collection of diagnostics for one generation run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    error_count: usize,
}

impl DiagnosticBag {
    /// Create a new empty diagnostic bag.
    pub fn new() -> Self {
        DiagnosticBag {
            diagnostics: Vec::new(),
            error_count: 0,
        }
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Check if there are any diagnostics.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Get the number of diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get all diagnostics as a slice.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate over diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Filter diagnostics by code.
    pub fn by_code(&self, code: u32) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    /// Serialize the whole bag as a JSON array, for hosts that ship
    /// diagnostics over a machine-readable channel.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.diagnostics).unwrap_or_else(|_| "[]".to_string())
    }
}

impl crate::host::DiagnosticSink for DiagnosticBag {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.add(diagnostic);
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_members(name: &str) -> Diagnostic {
        Diagnostic::from_template(diagnostic_messages::ENUM_HAS_NO_MEMBERS, &[name])
            .with_enum_type(name)
    }

    #[test]
    fn test_format_message() {
        let msg = format_message("Enum type '{0}' declares no members", &["Color"]);
        assert_eq!(msg, "Enum type 'Color' declares no members");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = no_members("Empty");
        assert_eq!(
            diag.to_string(),
            "error[EG1001]: Enum type 'Empty' declares no members; \
             no validation guard can be generated."
        );
        assert!(diag.is_error());
    }

    #[test]
    fn test_bag_counts_and_filters() {
        let mut bag = DiagnosticBag::new();
        assert!(bag.is_empty());
        assert!(!bag.has_errors());

        bag.add(no_members("A"));
        bag.add(no_members("B"));

        assert_eq!(bag.len(), 2);
        assert!(bag.has_errors());
        assert_eq!(
            bag.by_code(diagnostic_codes::ENUM_HAS_NO_MEMBERS).count(),
            2
        );
    }

    #[test]
    fn test_bag_json_shape() {
        let mut bag = DiagnosticBag::new();
        bag.add(no_members("Empty"));

        let json = bag.to_json();
        assert!(json.contains("\"code\":1001"));
        assert!(json.contains("\"severity\":\"error\""));
        assert!(json.contains("\"enum_type\":\"Empty\""));
    }
}
