//! Generation run orchestration.
//!
//! A [`GenerationRun`] owns all state for one batch of validation requests:
//! the deduplication registry, the working set of resolved type facts, the
//! pending diagnostics, and the cancellation flag. Requests flow in
//! (sequentially or fanned out per compilation unit with rayon), each
//! distinct enumerated type is resolved to facts exactly once, and
//! [`GenerationRun::finish`] emits the single output unit all-or-nothing.
//! Dropping the run discards everything; no state survives across runs.

use dashmap::DashMap;
use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

use crate::classify::classify;
use crate::diagnostics::{Diagnostic, diagnostic_messages};
use crate::emitter::{ValidatorEmitter, bootstrap_unit};
use crate::enum_info::{CompilationUnitId, EnumTypeId, EnumTypeInfo, ValidationRequest};
use crate::host::{DiagnosticSink, GeneratedUnit, OutputSink, TypeOracle};
use crate::registry::{Registration, TypeRegistry};
use crate::source_writer::NewlineKind;
use crate::values::extract_values;

// =============================================================================
// Options
// =============================================================================

/// Configuration for a generation run.
#[derive(Clone, Debug)]
pub struct GeneratorOptions {
    /// Logical name of the emitted unit.
    pub unit_name: String,
    /// Line endings in generated text.
    pub newline: NewlineKind,
    /// Spaces per indentation level in generated text.
    pub indent_width: usize,
    /// Emit a comment above each guard listing the declared members.
    pub member_table: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            unit_name: "enum_guards".to_string(),
            newline: NewlineKind::Lf,
            indent_width: 4,
            member_table: true,
        }
    }
}

// =============================================================================
// Cancellation
// =============================================================================

/// Cloneable cancellation flag for a run.
///
/// The host may cancel at any time; the run observes the flag at its
/// checkpoints (after each request, before each emitted type) and ceases
/// work promptly, discarding partially built state.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation of the run.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The run was cancelled before its output could be committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunCancelled;

impl fmt::Display for RunCancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generation run cancelled before emission")
    }
}

impl std::error::Error for RunCancelled {}

// =============================================================================
// Run summary
// =============================================================================

/// Counters describing what one run saw and produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Requests received.
    pub requests: usize,
    /// Requests whose type was already scheduled.
    pub duplicates: usize,
    /// Requests whose type could not be resolved (dropped, not an error).
    pub unresolved: usize,
    /// Types skipped because they declare no members.
    pub skipped_no_members: usize,
    /// Guard routines emitted.
    pub validators: usize,
}

#[derive(Debug, Default)]
struct RunStats {
    requests: AtomicUsize,
    duplicates: AtomicUsize,
    unresolved: AtomicUsize,
    skipped_no_members: AtomicUsize,
}

// =============================================================================
// Bootstrap
// =============================================================================

/// Emit the fixed bootstrap unit.
///
/// Hosts call this once at initialization, before any run, independent of
/// whether any requests ever arrive.
pub fn emit_bootstrap(options: &GeneratorOptions, output: &mut dyn OutputSink) {
    output.accept(bootstrap_unit(options));
}

// =============================================================================
// Generation run
// =============================================================================

/// All state for one generation pass over one batch of requests.
pub struct GenerationRun<'h> {
    oracle: &'h dyn TypeOracle,
    options: GeneratorOptions,
    registry: TypeRegistry,
    working: DashMap<EnumTypeId, EnumTypeInfo>,
    pending_diagnostics: Mutex<Vec<Diagnostic>>,
    cancel: CancelFlag,
    stats: RunStats,
}

impl<'h> GenerationRun<'h> {
    /// Start a run. The registry and working set begin empty.
    pub fn new(oracle: &'h dyn TypeOracle, options: GeneratorOptions) -> Self {
        GenerationRun {
            oracle,
            options,
            registry: TypeRegistry::new(),
            working: DashMap::new(),
            pending_diagnostics: Mutex::new(Vec::new()),
            cancel: CancelFlag::new(),
            stats: RunStats::default(),
        }
    }

    /// A handle the host can use to cancel this run.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Feed one request into the run.
    ///
    /// Resolution failures are expected and dropped silently; a duplicate
    /// type contributes nothing beyond a counter tick.
    pub fn add_request(&self, request: &ValidationRequest) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.stats.requests.fetch_add(1, Ordering::Relaxed);

        let Some(id) = self.oracle.resolve(request) else {
            trace!(expression = %request.expression, "request type unresolved, dropping");
            self.stats.unresolved.fetch_add(1, Ordering::Relaxed);
            return;
        };

        match self.registry.register(id) {
            Registration::AlreadySeen => {
                self.stats.duplicates.fetch_add(1, Ordering::Relaxed);
            }
            Registration::Fresh => self.build_type_facts(id),
        }
    }

    /// Feed a batch of requests sequentially.
    pub fn add_requests(&self, requests: &[ValidationRequest]) {
        for request in requests {
            self.add_request(request);
        }
    }

    /// Feed a batch of requests with per-compilation-unit fan-out.
    ///
    /// Requests are grouped by unit and units are resolved in parallel;
    /// that is the only significance the unit id has. The registry makes
    /// same-type races safe, so the outcome is identical to sequential
    /// intake up to summary counter attribution.
    pub fn add_requests_parallel(&self, requests: &[ValidationRequest]) {
        let mut by_unit: FxHashMap<CompilationUnitId, Vec<&ValidationRequest>> =
            FxHashMap::default();
        for request in requests {
            by_unit.entry(request.unit).or_default().push(request);
        }

        let groups: Vec<_> = by_unit.into_values().collect();
        groups.par_iter().for_each(|group| {
            for request in group {
                self.add_request(request);
            }
        });
    }

    /// First resolution of a type identity: gather facts, or record the
    /// zero-member diagnostic and skip.
    fn build_type_facts(&self, id: EnumTypeId) {
        let name = self.oracle.display_name(id);
        let members = self.oracle.members(id);

        match extract_values(&name, &members) {
            Ok(values) => {
                let kind = classify(self.oracle, id);
                debug!(%id, %name, ?kind, values = values.len(), "scheduled enum type");
                self.working.insert(
                    id,
                    EnumTypeInfo {
                        id,
                        name,
                        kind,
                        values,
                        members,
                    },
                );
            }
            Err(err) => {
                debug!(%id, %name, "enum type has no members, skipping");
                self.stats.skipped_no_members.fetch_add(1, Ordering::Relaxed);
                let diagnostic =
                    Diagnostic::from_template(diagnostic_messages::ENUM_HAS_NO_MEMBERS, &[
                        &err.type_name,
                    ])
                    .with_enum_type(err.type_name);
                if let Ok(mut pending) = self.pending_diagnostics.lock() {
                    pending.push(diagnostic);
                }
            }
        }
    }

    /// Emit the unit and tear the run down.
    ///
    /// Emission is all-or-nothing: on cancellation nothing reaches the
    /// output sink and pending diagnostics are discarded with the rest of
    /// the run state. On success the sink receives exactly one unit named
    /// per [`GeneratorOptions::unit_name`], with guards in
    /// first-registration order.
    pub fn finish(
        self,
        output: &mut dyn OutputSink,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<RunSummary, RunCancelled> {
        if self.cancel.is_cancelled() {
            return Err(RunCancelled);
        }

        // Ordered snapshot of the working set; the concurrent map is done.
        let mut working: IndexMap<EnumTypeId, EnumTypeInfo> =
            IndexMap::with_capacity(self.working.len());
        for id in self.registry.registration_order() {
            if let Some((_, info)) = self.working.remove(&id) {
                working.insert(id, info);
            }
        }

        let mut emitter = ValidatorEmitter::new(&self.options);
        emitter.emit_preamble();

        let mut validators = 0;
        for info in working.values() {
            if self.cancel.is_cancelled() {
                return Err(RunCancelled);
            }
            emitter.emit_validator(info);
            validators += 1;
        }
        if self.cancel.is_cancelled() {
            return Err(RunCancelled);
        }

        if let Ok(mut pending) = self.pending_diagnostics.lock() {
            for diagnostic in pending.drain(..) {
                diagnostics.report(diagnostic);
            }
        }
        output.accept(GeneratedUnit::new(
            self.options.unit_name.clone(),
            emitter.finish(),
        ));

        let summary = RunSummary {
            requests: self.stats.requests.load(Ordering::Relaxed),
            duplicates: self.stats.duplicates.load(Ordering::Relaxed),
            unresolved: self.stats.unresolved.load(Ordering::Relaxed),
            skipped_no_members: self.stats.skipped_no_members.load(Ordering::Relaxed),
            validators,
        };
        debug!(?summary, "generation run finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticBag, diagnostic_codes};
    use crate::enum_info::EnumMember;
    use crate::host::UnitBuffer;
    use rustc_hash::FxHashMap;

    /// Fixed-table oracle: expression text maps straight to a type id.
    struct TableOracle {
        types: FxHashMap<&'static str, EnumTypeId>,
        flags: Vec<EnumTypeId>,
        members: FxHashMap<EnumTypeId, Vec<EnumMember>>,
        names: FxHashMap<EnumTypeId, &'static str>,
    }

    impl TableOracle {
        fn new() -> Self {
            let mut types = FxHashMap::default();
            let mut members = FxHashMap::default();
            let mut names = FxHashMap::default();

            types.insert("mode", EnumTypeId(1));
            names.insert(EnumTypeId(1), "Mode");
            members.insert(
                EnumTypeId(1),
                vec![
                    EnumMember::new("Off", 0),
                    EnumMember::new("Slow", 1),
                    EnumMember::new("Fast", 2),
                    EnumMember::new("Turbo", 5),
                ],
            );

            types.insert("access", EnumTypeId(2));
            names.insert(EnumTypeId(2), "Access");
            members.insert(
                EnumTypeId(2),
                vec![
                    EnumMember::new("Read", 1),
                    EnumMember::new("Write", 2),
                    EnumMember::new("Exec", 4),
                ],
            );

            types.insert("empty", EnumTypeId(3));
            names.insert(EnumTypeId(3), "Empty");
            members.insert(EnumTypeId(3), Vec::new());

            TableOracle {
                types,
                flags: vec![EnumTypeId(2)],
                members,
                names,
            }
        }
    }

    impl TypeOracle for TableOracle {
        fn resolve(&self, request: &ValidationRequest) -> Option<EnumTypeId> {
            self.types.get(request.expression.as_str()).copied()
        }

        fn display_name(&self, id: EnumTypeId) -> String {
            self.names[&id].to_string()
        }

        fn has_flags_attribute(&self, id: EnumTypeId) -> bool {
            self.flags.contains(&id)
        }

        fn members(&self, id: EnumTypeId) -> Vec<EnumMember> {
            self.members[&id].clone()
        }
    }

    fn request(expr: &str) -> ValidationRequest {
        ValidationRequest::new(expr, CompilationUnitId(0))
    }

    #[test]
    fn test_duplicates_produce_one_validator() {
        let oracle = TableOracle::new();
        let run = GenerationRun::new(&oracle, GeneratorOptions::default());
        run.add_requests(&[request("mode"), request("mode"), request("mode")]);

        let mut output = UnitBuffer::new();
        let mut bag = DiagnosticBag::new();
        let summary = run.finish(&mut output, &mut bag).unwrap();

        assert_eq!(summary.requests, 3);
        assert_eq!(summary.duplicates, 2);
        assert_eq!(summary.validators, 1);
        assert_eq!(output.len(), 1);
        let text = &output.units()[0].text;
        assert_eq!(text.matches("pub fn ensure_valid_mode").count(), 1);
    }

    #[test]
    fn test_unresolved_requests_are_dropped_silently() {
        let oracle = TableOracle::new();
        let run = GenerationRun::new(&oracle, GeneratorOptions::default());
        run.add_requests(&[request("mystery"), request("mode")]);

        let mut output = UnitBuffer::new();
        let mut bag = DiagnosticBag::new();
        let summary = run.finish(&mut output, &mut bag).unwrap();

        assert_eq!(summary.unresolved, 1);
        assert_eq!(summary.validators, 1);
        assert!(bag.is_empty());
    }

    #[test]
    fn test_zero_member_type_reports_and_others_continue() {
        let oracle = TableOracle::new();
        let run = GenerationRun::new(&oracle, GeneratorOptions::default());
        run.add_requests(&[request("empty"), request("mode")]);

        let mut output = UnitBuffer::new();
        let mut bag = DiagnosticBag::new();
        let summary = run.finish(&mut output, &mut bag).unwrap();

        assert_eq!(summary.skipped_no_members, 1);
        assert_eq!(summary.validators, 1);
        assert_eq!(bag.by_code(diagnostic_codes::ENUM_HAS_NO_MEMBERS).count(), 1);
        let text = &output.units()[0].text;
        assert!(text.contains("ensure_valid_mode"));
        assert!(!text.contains("ensure_valid_empty"));
    }

    #[test]
    fn test_cancellation_commits_nothing() {
        let oracle = TableOracle::new();
        let run = GenerationRun::new(&oracle, GeneratorOptions::default());
        run.add_request(&request("mode"));
        run.cancel_flag().cancel();

        let mut output = UnitBuffer::new();
        let mut bag = DiagnosticBag::new();
        assert_eq!(run.finish(&mut output, &mut bag), Err(RunCancelled));
        assert!(output.is_empty());
        assert!(bag.is_empty());
    }

    #[test]
    fn test_cancelled_run_ignores_further_requests() {
        let oracle = TableOracle::new();
        let run = GenerationRun::new(&oracle, GeneratorOptions::default());
        run.cancel_flag().cancel();
        run.add_request(&request("mode"));

        // Nothing was registered after cancellation.
        let mut output = UnitBuffer::new();
        let mut bag = DiagnosticBag::new();
        assert_eq!(run.finish(&mut output, &mut bag), Err(RunCancelled));
    }

    #[test]
    fn test_parallel_intake_matches_sequential_output() {
        let oracle = TableOracle::new();
        let requests: Vec<ValidationRequest> = (0..64)
            .map(|i| {
                let expr = if i % 2 == 0 { "mode" } else { "access" };
                ValidationRequest::new(expr, CompilationUnitId(i % 8))
            })
            .collect();

        let run = GenerationRun::new(&oracle, GeneratorOptions::default());
        run.add_requests_parallel(&requests);
        let mut output = UnitBuffer::new();
        let mut bag = DiagnosticBag::new();
        let summary = run.finish(&mut output, &mut bag).unwrap();

        assert_eq!(summary.requests, 64);
        assert_eq!(summary.validators, 2);
        let text = &output.units()[0].text;
        assert!(text.contains("pub fn ensure_valid_mode"));
        assert!(text.contains("pub fn ensure_valid_access"));
    }

    #[test]
    fn test_bootstrap_is_request_independent() {
        let mut output = UnitBuffer::new();
        emit_bootstrap(&GeneratorOptions::default(), &mut output);
        assert_eq!(output.len(), 1);
        assert!(output.units()[0].text.contains("DEFAULT_LABEL"));
    }
}
