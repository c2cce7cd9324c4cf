//! Validator emission: turn per-type facts into generated Rust source.
//!
//! One generation run produces a single named unit containing, in
//! first-registration order, one guard routine per enumerated type, preceded
//! by the shared pieces every guard relies on: the `InvalidEnumValue` error
//! type, the shared error-construction routine, and the generic no-op
//! dispatch stub that gives call sites something to reference before a
//! specialized guard exists.
//!
//! Discrete types compile to a short-circuiting chain of interval checks
//! (equality for single-value runs, inclusive range otherwise); flags types
//! compile to one mask check with subset semantics.

use tracing::debug;

use crate::enum_info::{EnumKind, EnumTypeInfo};
use crate::generator::GeneratorOptions;
use crate::host::GeneratedUnit;
use crate::mask::build_mask;
use crate::ranges::compress_runs;
use crate::source_writer::SourceWriter;

/// Unit name of the fixed bootstrap prelude.
pub const BOOTSTRAP_UNIT_NAME: &str = "enumguard_prelude";

/// Banner line opening every generated unit.
const GENERATED_BANNER: &str = "// Generated by enumguard. Do not edit.";

/// Fixed placeholder used when a call site provides no diagnostic label.
const DEFAULT_LABEL: &str = "value";

// =============================================================================
// Bootstrap prelude
// =============================================================================

/// Build the fixed bootstrap unit.
///
/// Emitted unconditionally at initialization time, before any request is
/// seen: the default diagnostic label call sites can reference ahead of
/// specialization. Its content never depends on the request stream.
pub fn bootstrap_unit(options: &GeneratorOptions) -> GeneratedUnit {
    let mut w = SourceWriter::new(options.newline, options.indent_width);
    w.write_line(GENERATED_BANNER);
    w.blank_line();
    w.write_line("/// Placeholder diagnostic label used when a call site does not name the");
    w.write_line("/// value being validated.");
    w.write_line(&format!("pub const DEFAULT_LABEL: &str = \"{DEFAULT_LABEL}\";"));
    GeneratedUnit::new(BOOTSTRAP_UNIT_NAME, w.finish())
}

// =============================================================================
// Validator Emitter
// =============================================================================

/// Builds the text of one generated validator unit.
pub struct ValidatorEmitter {
    writer: SourceWriter,
    member_table: bool,
}

impl ValidatorEmitter {
    pub fn new(options: &GeneratorOptions) -> Self {
        ValidatorEmitter {
            writer: SourceWriter::new(options.newline, options.indent_width),
            member_table: options.member_table,
        }
    }

    /// Emit the banner and the pieces shared by every guard: the error type,
    /// the shared error-construction routine, and the generic dispatch stub.
    pub fn emit_preamble(&mut self) {
        let w = &mut self.writer;
        w.write_line(GENERATED_BANNER);
        w.blank_line();

        w.write_line("/// Raised when a value does not correspond to any declared member (or");
        w.write_line("/// legal flag combination) of its enum type.");
        w.write_line("#[derive(Debug, Clone, PartialEq, Eq)]");
        w.write_line("pub struct InvalidEnumValue {");
        w.increase_indent();
        w.write_line("pub label: String,");
        w.write_line("pub value: i64,");
        w.write_line("pub type_name: &'static str,");
        w.decrease_indent();
        w.write_line("}");
        w.blank_line();

        w.write_line("impl core::fmt::Display for InvalidEnumValue {");
        w.increase_indent();
        w.write_line("fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {");
        w.increase_indent();
        w.write_line("write!(");
        w.increase_indent();
        w.write_line("f,");
        w.write_line("\"{}: value {} is not a declared member of {}\",");
        w.write_line("self.label, self.value, self.type_name");
        w.decrease_indent();
        w.write_line(")");
        w.decrease_indent();
        w.write_line("}");
        w.decrease_indent();
        w.write_line("}");
        w.blank_line();

        w.write_line("impl std::error::Error for InvalidEnumValue {}");
        w.blank_line();

        w.write_line("/// Shared failure path for every generated guard.");
        w.write_line(
            "fn invalid_enum_value(label: &str, value: i64, type_name: &'static str) \
             -> InvalidEnumValue {",
        );
        w.increase_indent();
        w.write_line("InvalidEnumValue {");
        w.increase_indent();
        w.write_line("label: label.to_string(),");
        w.write_line("value,");
        w.write_line("type_name,");
        w.decrease_indent();
        w.write_line("}");
        w.decrease_indent();
        w.write_line("}");
        w.blank_line();

        w.write_line("/// Fallback entry point for call sites no specialized guard exists for");
        w.write_line("/// yet. Performs no validation.");
        w.write_line("pub fn ensure_valid<T>(value: T, label: &str) -> Result<(), InvalidEnumValue> {");
        w.increase_indent();
        w.write_line("let _ = (value, label);");
        w.write_line("Ok(())");
        w.decrease_indent();
        w.write_line("}");
    }

    /// Emit the specialized guard routine for one enumerated type.
    pub fn emit_validator(&mut self, info: &EnumTypeInfo) {
        debug!(id = info.id.index(), name = %info.name, kind = ?info.kind, "emit validator");

        self.writer.blank_line();
        if self.member_table {
            self.emit_member_table(info);
        }
        match info.kind {
            EnumKind::Discrete => self.emit_discrete(info),
            EnumKind::Flags => self.emit_flags(info),
        }
    }

    /// One comment line listing the declared members, for traceability back
    /// to the source declaration.
    fn emit_member_table(&mut self, info: &EnumTypeInfo) {
        let mut line = format!("// {}:", info.name);
        let mut first = true;
        for member in &info.members {
            if !first {
                line.push(',');
            }
            first = false;
            line.push_str(&format!(" {} = {}", member.name, member.value));
        }
        self.writer.write_line(&line);
    }

    fn emit_signature(&mut self, info: &EnumTypeInfo) {
        self.writer.write_line(&format!(
            "pub fn {}(value: {}, label: &str) -> Result<(), InvalidEnumValue> {{",
            routine_name(&info.name),
            info.name
        ));
        self.writer.increase_indent();
        self.writer.write_line("let raw = value as i64;");
    }

    fn emit_failure(&mut self, info: &EnumTypeInfo) {
        self.writer.write_line(&format!(
            "Err(invalid_enum_value(label, raw, \"{}\"))",
            info.name
        ));
        self.writer.decrease_indent();
        self.writer.write_line("}");
    }

    fn emit_discrete(&mut self, info: &EnumTypeInfo) {
        self.writer.write_line(&format!(
            "/// Validates that `value` is a declared member of `{}`.",
            info.name
        ));
        self.emit_signature(info);
        for run in compress_runs(&info.values) {
            let check = if run.is_single() {
                format!("if raw == {} {{", run.min)
            } else {
                format!("if ({}..={}).contains(&raw) {{", run.min, run.max)
            };
            self.writer.write_line(&check);
            self.writer.increase_indent();
            self.writer.write_line("return Ok(());");
            self.writer.decrease_indent();
            self.writer.write_line("}");
        }
        self.emit_failure(info);
    }

    fn emit_flags(&mut self, info: &EnumTypeInfo) {
        let mask = build_mask(&info.values);
        self.writer.write_line(&format!(
            "/// Validates that `value` is a combination of declared `{}` flags.",
            info.name
        ));
        self.writer
            .write_line("/// Any subset of the declared bits is accepted, named or not.");
        self.emit_signature(info);
        self.writer.write_line(&format!("if (raw & {mask}) == raw {{"));
        self.writer.increase_indent();
        self.writer.write_line("return Ok(());");
        self.writer.decrease_indent();
        self.writer.write_line("}");
        self.emit_failure(info);
    }

    /// Consume the emitter and return the unit text.
    pub fn finish(self) -> String {
        self.writer.finish()
    }
}

/// Derive the guard routine name from a type's display name.
///
/// `Mode` becomes `ensure_valid_mode`, `ProtocolFlags` becomes
/// `ensure_valid_protocol_flags`, and path separators in namespaced display
/// names turn into underscores.
fn routine_name(type_name: &str) -> String {
    let mut suffix = String::with_capacity(type_name.len() + 4);
    let mut prev_was_lower = false;
    for ch in type_name.chars() {
        if ch.is_ascii_alphanumeric() {
            if ch.is_ascii_uppercase() {
                if prev_was_lower {
                    suffix.push('_');
                }
                suffix.push(ch.to_ascii_lowercase());
                prev_was_lower = false;
            } else {
                suffix.push(ch);
                prev_was_lower = true;
            }
        } else if !suffix.is_empty() && !suffix.ends_with('_') {
            suffix.push('_');
            prev_was_lower = false;
        }
    }
    format!("ensure_valid_{}", suffix.trim_end_matches('_'))
}
