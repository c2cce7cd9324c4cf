//! enumguard - build-time generator of specialized enum validation guards.
//!
//! Given a stream of "validate this value of this statically-known enum type"
//! requests discovered by a host toolchain, enumguard emits one specialized
//! validation routine per distinct enumerated type: contiguous-range checks
//! for discrete enumerations, a single bitmask check for flags enumerations,
//! plus a shared error routine and a generic dispatch stub. The generator
//! runs at build time and manufactures the code that validates later; it
//! never validates runtime data itself.
//!
//! Hosts drive the pipeline through three seams: a [`TypeOracle`] that
//! resolves request expressions to enum type facts, an [`OutputSink`] that
//! registers generated units with the build, and a [`DiagnosticSink`] that
//! receives structured error reports.
//!
//! # Example
//!
//! ```ignore
//! let options = GeneratorOptions::default();
//! generator::emit_bootstrap(&options, &mut sink);
//!
//! let run = GenerationRun::new(&oracle, options);
//! run.add_requests_parallel(&requests);
//! let summary = run.finish(&mut sink, &mut diagnostics)?;
//! ```

// Core data model - type identities, requests, resolved facts
pub mod enum_info;
pub use enum_info::{
    CompilationUnitId, EnumKind, EnumMember, EnumTypeId, EnumTypeInfo, ValidationRequest,
};

// Host collaborator seams
pub mod host;
pub use host::{DiagnosticSink, GeneratedUnit, OutputSink, TypeOracle, UnitBuffer};

// Structured diagnostics
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticBag, Severity};

// Classification: flags vs. discrete
pub mod classify;
pub use classify::classify;

// Value extraction - distinct ascending member values
pub mod values;
pub use values::{NoMembersError, extract_values};

// Range compression - the core validation-check minimization
pub mod ranges;
pub use ranges::{ValueRun, ValueRuns, compress_runs};

// Flags mask construction
pub mod mask;
pub use mask::build_mask;

// Per-run deduplication of type identities
pub mod registry;
pub use registry::{Registration, TypeRegistry};

// Generated-text buffer
pub mod source_writer;
pub use source_writer::{NewlineKind, SourceWriter};

// Validator emission
pub mod emitter;
pub use emitter::{BOOTSTRAP_UNIT_NAME, ValidatorEmitter, bootstrap_unit};

// Run orchestration
pub mod generator;
pub use generator::{
    CancelFlag, GenerationRun, GeneratorOptions, RunCancelled, RunSummary, emit_bootstrap,
};

// Opt-in logging subscriber (EG_LOG)
pub mod tracing_config;
pub use tracing_config::init_tracing;
