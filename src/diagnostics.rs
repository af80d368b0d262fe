//! Diagnostic types shared by every component.
//!
//! Mirrors `tsz-common::diagnostics`: a plain data type plus a sink trait,
//! not an error type. Per spec.md §7, diagnostics never abort an operation;
//! they are pushed to a caller-supplied sink while evaluation continues with
//! a best-effort result.

/// Stable, machine-readable category for a diagnostic. Matches the "stable
/// contract, not names" categories of spec.md §7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleTag {
    AssignabilityMismatch,
    BoundViolation,
    ConstraintMismatch,
    ParamSpecMismatch,
    DataClassFieldOrdering,
    DataClassFrozenInheritance,
    UnsupportedOperator,
    OptionalOperand,
    UnionAtTypePosition,
    InconsistentOverload,
}

/// A sub-diagnostic nested under a parent diagnostic, used for the
/// "addendum (a tree of sub-diagnostics describing nested mismatches)"
/// described in spec.md §7.
#[derive(Clone, Debug)]
pub struct Addendum {
    pub message: String,
    pub children: Vec<Addendum>,
}

impl Addendum {
    #[must_use]
    pub fn leaf(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(message: impl Into<String>, children: Vec<Addendum>) -> Self {
        Self {
            message: message.into(),
            children,
        }
    }
}

/// Opaque reference to whatever the caller's AST/source representation uses
/// to identify a location. The core never interprets this value; it is
/// forwarded to [`DiagnosticSink`] verbatim. This keeps parsing/AST
/// construction out of scope (spec.md §1 Non-goals) while still letting
/// diagnostics point somewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef(pub u64);

/// A single diagnostic emitted by a core component.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub rule: RuleTag,
    pub message: String,
    pub node: NodeRef,
    pub addendum: Option<Addendum>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(rule: RuleTag, message: impl Into<String>, node: NodeRef) -> Self {
        Self {
            rule,
            message: message.into(),
            node,
            addendum: None,
        }
    }

    #[must_use]
    pub fn with_addendum(mut self, addendum: Addendum) -> Self {
        self.addendum = Some(addendum);
        self
    }
}

/// Sink every component reports diagnostics to. The host evaluator
/// implements this (or adapts its own diagnostic collector to it); the core
/// never formats or renders diagnostics itself (spec.md §1 Non-goals:
/// "diagnostic formatting").
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A sink that simply accumulates diagnostics in a `Vec`, useful for tests
/// and for simple host integrations that don't need incremental reporting.
#[derive(Default, Debug)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
