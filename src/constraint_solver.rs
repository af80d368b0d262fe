//! Constraint solver (component B, spec.md §4.B) — the largest component.
//!
//! Solves type variables given a stream of `(dest, src, variance)`
//! assignments, tracking lower/upper bounds per variable per in-flight
//! overload candidate. Grounded on `tsz-solver`'s `judge`/constraint-tracker
//! test suite (`tests/judge_tests.rs`, `tests/widening_tests.rs`,
//! `tests/relation_queries_tests.rs`) for the bound-update shape, adapted to
//! this algebra's scope-owned type variables.

use rustc_hash::FxHashMap;

use crate::diagnostics::{Addendum, Diagnostic, DiagnosticSink, NodeRef, RuleTag};
use crate::host::HostEvaluator;
use crate::intern::{TypeId, TypeInterner};
use crate::limits::MAX_CONSTRAINT_UNION_SUBTYPES;
use crate::types::class::TupleElement;
use crate::types::typevar::{ScopeId, TypeVarId, TypeVarKind};
use crate::types::TypeData;

bitflags::bitflags! {
    /// Flags governing one `assign` call (spec.md §4.B "Variance handling").
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AssignFlags: u32 {
        /// Contravariant update: narrow the upper bound toward `src`.
        const REVERSE_TYPE_VAR_MATCHING = 1 << 0;
        /// Invariant update: require `src` ≡ lower ≡ upper.
        const ENFORCE_INVARIANCE        = 1 << 1;
        /// Seed bounds from an outer expected type without overwriting
        /// existing entries.
        const POPULATING_EXPECTED_TYPE  = 1 << 2;
        /// Keep literal values in the committed lower bound rather than
        /// preferring the literal-stripped canonical form.
        const RETAIN_LITERALS_FOR_TYPE_VAR = 1 << 3;
    }
}

/// Per-type-variable accumulator of bounds (spec.md §3 `ConstraintSet`).
#[derive(Clone, Debug, Default)]
pub struct ConstraintSet {
    pub lower_bound: Option<TypeId>,
    pub lower_bound_no_literals: Option<TypeId>,
    pub upper_bound: Option<TypeId>,
    pub tuple_types: Option<Vec<TupleElement>>,
}

/// Ordered collection of per-candidate constraint sets, a lock flag, and the
/// set of scopes this tracker is permitted to mutate (spec.md §3
/// `ConstraintTracker`).
#[derive(Debug)]
pub struct ConstraintTracker {
    /// One constraint-set map per overload candidate currently in flight,
    /// in declaration order (spec.md §5: overload candidates are tried in
    /// declaration order).
    candidates: Vec<FxHashMap<TypeVarId, ConstraintSet>>,
    active: usize,
    locked: bool,
    owned_scopes: Vec<ScopeId>,
}

impl ConstraintTracker {
    #[must_use]
    pub fn new(owned_scopes: Vec<ScopeId>) -> Self {
        Self {
            candidates: vec![FxHashMap::default()],
            active: 0,
            locked: false,
            owned_scopes,
        }
    }

    /// Add another overload candidate's constraint-set slot, returning its
    /// index.
    pub fn add_candidate(&mut self) -> usize {
        self.candidates.push(FxHashMap::default());
        self.candidates.len() - 1
    }

    pub fn set_active_candidate(&mut self, index: usize) {
        self.active = index;
    }

    /// Lock the tracker: subsequent `assign` calls validate only, never
    /// mutate (spec.md §3 "lock flag").
    pub fn lock(&mut self) {
        self.locked = true;
    }

    #[must_use]
    pub fn owns_scope(&self, scope: ScopeId) -> bool {
        self.owned_scopes.contains(&scope)
    }

    #[must_use]
    pub fn constraint_set(&self, var: TypeVarId) -> Option<&ConstraintSet> {
        self.candidates[self.active].get(&var)
    }

    fn constraint_set_mut(&mut self, var: TypeVarId) -> &mut ConstraintSet {
        self.candidates[self.active].entry(var).or_default()
    }

    /// Final type-argument substitution for a solved variable: the
    /// literal-stripped lower bound when one was committed, else the raw
    /// lower bound, else the upper bound, else `Unknown` (spec.md §6
    /// `solveForExpected`).
    #[must_use]
    pub fn solve_for_expected(&self, var: TypeVarId) -> TypeId {
        match self.constraint_set(var) {
            Some(set) => set
                .lower_bound_no_literals
                .or(set.lower_bound)
                .or(set.upper_bound)
                .unwrap_or(TypeId::UNKNOWN),
            None => TypeId::UNKNOWN,
        }
    }
}

fn report(
    host: &mut dyn HostEvaluator,
    rule: RuleTag,
    message: impl Into<String>,
    node: NodeRef,
    addendum: Option<Addendum>,
) {
    let mut diag = Diagnostic::new(rule, message, node);
    if let Some(a) = addendum {
        diag = diag.with_addendum(a);
    }
    host.report_diagnostic(diag);
}

/// Is `src` definitely assignable into `dest` without further solving
/// (`Any`/`Unknown` on either side, or `Never` as a covariant source)?
fn is_trivial_short_circuit(interner: &TypeInterner, dest_upper: Option<TypeId>, src: TypeId, flags: AssignFlags) -> bool {
    if matches!(interner.resolve(src), TypeData::Any | TypeData::Unknown) {
        return true;
    }
    if matches!(interner.resolve(src), TypeData::Never) && !flags.contains(AssignFlags::ENFORCE_INVARIANCE) {
        return true;
    }
    let _ = dest_upper;
    false
}

/// Top-level entry point: `assign(dest, src, flags, tracker) -> bool`
/// (spec.md §4.B).
#[allow(clippy::too_many_arguments)]
pub fn assign(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    tracker: &mut ConstraintTracker,
    dest: TypeVarId,
    src: TypeId,
    flags: AssignFlags,
    node: NodeRef,
    depth: u32,
) -> bool {
    if depth >= crate::limits::DEFAULT_MAX_RECURSION_DEPTH {
        return true;
    }

    let def = interner.type_var(dest).clone();

    // Step 2: foreign scope -> validate against declared bound only.
    if !tracker.owns_scope(def.scope_id) {
        return match def.upper_bound {
            Some(bound) => host.assign_type(interner, bound, src, node),
            None => true,
        };
    }

    // Step 3: trivial short circuits.
    if is_trivial_short_circuit(interner, def.upper_bound, src, flags) {
        return true;
    }
    if def.kind == TypeVarKind::ParamSpec {
        if let TypeData::Function(f) = interner.resolve(src) {
            if f.is_gradual_callable() {
                return true;
            }
        }
    }

    match def.kind {
        TypeVarKind::Ordinary if def.is_constrained() => {
            assign_constrained(interner, host, tracker, dest, &def.constraints, src, flags, node)
        }
        TypeVarKind::Ordinary => assign_ordinary(interner, host, tracker, dest, src, flags, node, depth),
        TypeVarKind::ParamSpec => assign_param_spec(interner, host, tracker, dest, src, node),
        TypeVarKind::Variadic => assign_variadic(interner, tracker, dest, src),
    }
}

/// Ordinary, unconstrained type variable (spec.md §4.B steps 4-10).
#[allow(clippy::too_many_arguments)]
fn assign_ordinary(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    tracker: &mut ConstraintTracker,
    dest: TypeVarId,
    src: TypeId,
    flags: AssignFlags,
    node: NodeRef,
    depth: u32,
) -> bool {
    let def = interner.type_var(dest).clone();
    let existing = tracker.constraint_set(dest).cloned().unwrap_or_default();
    let mut upper = existing.upper_bound.or(def.upper_bound);
    let mut lower = existing.lower_bound;

    let locked = tracker.locked;

    if flags.contains(AssignFlags::ENFORCE_INVARIANCE) {
        if let Some(lb) = lower {
            let fwd = host.assign_type(interner, src, lb, node);
            let back = host.assign_type(interner, lb, src, node);
            if !(fwd && back) {
                return false;
            }
        } else {
            lower = Some(src);
            upper = Some(src);
        }
    } else if flags.contains(AssignFlags::REVERSE_TYPE_VAR_MATCHING) {
        // Contravariant: narrow the upper bound toward `src`, keep it above
        // the lower bound.
        upper = Some(match upper {
            None => src,
            Some(existing_upper) => {
                if host.assign_type(interner, existing_upper, src, node) {
                    src
                } else if host.assign_type(interner, src, existing_upper, node) {
                    existing_upper
                } else {
                    return false;
                }
            }
        });
        if let Some(lb) = lower {
            if !host.assign_type(interner, upper.unwrap(), lb, node) {
                return false;
            }
        }
    } else {
        // Covariant (default), spec.md §4.B step 6.
        lower = Some(match lower {
            None => src,
            Some(existing_lower) => {
                let src_is_unknown = matches!(interner.resolve(src), TypeData::Unknown);
                let lower_is_unknown = matches!(interner.resolve(existing_lower), TypeData::Unknown);
                if host.assign_type(interner, existing_lower, src, node) {
                    if lower_is_unknown && !src_is_unknown {
                        src
                    } else {
                        existing_lower
                    }
                } else if host.assign_type(interner, src, existing_lower, node) {
                    src
                } else {
                    let combined = interner.union([existing_lower, src]);
                    if interner
                        .resolve(combined)
                        .as_union()
                        .map(|u| u.members.len())
                        .unwrap_or(1)
                        > MAX_CONSTRAINT_UNION_SUBTYPES
                    {
                        match def.upper_bound {
                            Some(bound) => bound,
                            None => combined,
                        }
                    } else {
                        combined
                    }
                }
            }
        });
    }

    // Step 9: validate declared bound.
    if let Some(bound) = def.upper_bound {
        let candidate = match (lower, upper) {
            (Some(l), Some(u)) => interner.union([l, u]),
            (Some(l), None) => l,
            (None, Some(u)) => u,
            (None, None) => return true,
        };
        if !host.assign_type(interner, bound, candidate, node) {
            if !def.flags.contains(crate::types::typevar::TypeVarFlags::SYNTHESIZED) {
                report(
                    host,
                    RuleTag::BoundViolation,
                    "type variable's declared bound rejected the candidate type",
                    node,
                    Some(Addendum::leaf(host.print_type(interner, candidate))),
                );
                return false;
            }
        }
    }

    if locked {
        return true;
    }

    // Step 10: commit, including the literals-stripped lower bound.
    if let Some(lb) = lower {
        tracing::trace!("committing lower bound for type variable {:?}: {:?}", dest, lb);
        let no_literals = host.strip_literal_value(interner, lb);
        let canonical = if flags.contains(AssignFlags::RETAIN_LITERALS_FOR_TYPE_VAR)
            || flags.contains(AssignFlags::POPULATING_EXPECTED_TYPE)
        {
            None
        } else {
            match def.upper_bound {
                Some(bound) if host.assign_type(interner, bound, no_literals, node) => Some(no_literals),
                None => Some(no_literals),
                _ => None,
            }
        };
        let set = tracker.constraint_set_mut(dest);
        set.lower_bound = Some(lb);
        set.lower_bound_no_literals = canonical;
    }
    if let Some(ub) = upper {
        tracker.constraint_set_mut(dest).upper_bound = Some(ub);
    }

    let _ = depth;
    true
}

/// Constrained type variable (spec.md §4.B "Algorithm (constrained type
/// variable)").
fn assign_constrained(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    tracker: &mut ConstraintTracker,
    dest: TypeVarId,
    constraints: &[TypeId],
    src: TypeId,
    flags: AssignFlags,
    node: NodeRef,
) -> bool {
    let subtypes: Vec<TypeId> = match interner.resolve(src) {
        TypeData::Union(u) => u.members.clone(),
        _ => vec![src],
    };

    let narrowest_constraint = |interner: &mut TypeInterner, host: &mut dyn HostEvaluator, candidate: TypeId| {
        constraints
            .iter()
            .position(|&c| host.assign_type(interner, c, candidate, node))
    };

    let mut chosen: Option<usize> = None;
    let mut all_individually_covered = true;
    for &sub in &subtypes {
        match narrowest_constraint(interner, host, sub) {
            Some(idx) => match chosen {
                None => chosen = Some(idx),
                Some(existing) if existing == idx => {}
                Some(_) => {
                    all_individually_covered = false;
                    break;
                }
            },
            None => {
                all_individually_covered = false;
                break;
            }
        }
    }

    let final_choice = if all_individually_covered {
        chosen
    } else if subtypes.len() > 1 {
        // Union not individually coverable: accept only if the whole union
        // is assignable to a single constraint.
        narrowest_constraint(interner, host, src)
    } else {
        None
    };

    let Some(idx) = final_choice else {
        report(
            host,
            RuleTag::ConstraintMismatch,
            "constrained type variable could not be mapped to a single constraint",
            node,
            None,
        );
        return false;
    };

    if tracker.locked {
        return true;
    }
    let constraint_ty = constraints[idx];
    let set = tracker.constraint_set_mut(dest);
    set.lower_bound = Some(constraint_ty);
    set.lower_bound_no_literals = if flags.contains(AssignFlags::RETAIN_LITERALS_FOR_TYPE_VAR) {
        None
    } else {
        Some(constraint_ty)
    };
    true
}

/// Param-spec type variable (spec.md §4.B "Algorithm (param-spec)").
fn assign_param_spec(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    tracker: &mut ConstraintTracker,
    dest: TypeVarId,
    src: TypeId,
    node: NodeRef,
) -> bool {
    let existing = tracker.constraint_set(dest).and_then(|s| s.lower_bound);

    let is_gradual = |interner: &TypeInterner, ty: TypeId| {
        matches!(interner.resolve(ty), TypeData::Function(f) if f.is_gradual_callable())
    };

    let chosen = match existing {
        None => src,
        Some(existing_bound) => {
            if is_gradual(interner, existing_bound) && !is_gradual(interner, src) {
                src
            } else if is_gradual(interner, src) {
                existing_bound
            } else {
                // Compare parameter lists with an "ignore return type"
                // assignability check; store the strictly narrower one.
                let narrower = host.assign_type(interner, existing_bound, src, node);
                let wider = host.assign_type(interner, src, existing_bound, node);
                match (narrower, wider) {
                    (true, false) => src,
                    (false, true) => existing_bound,
                    (true, true) => existing_bound,
                    (false, false) => {
                        report(
                            host,
                            RuleTag::ParamSpecMismatch,
                            "incompatible parameter specifications",
                            node,
                            None,
                        );
                        return false;
                    }
                }
            }
        }
    };

    if tracker.locked {
        return true;
    }
    tracker.constraint_set_mut(dest).lower_bound = Some(chosen);
    true
}

/// Variadic type variable (spec.md §4.B "Algorithm (variadic type
/// variable)"). Widening is defined only between two unpacked tuples of
/// equal length with matching per-element `unbounded` flags.
fn assign_variadic(
    interner: &mut TypeInterner,
    tracker: &mut ConstraintTracker,
    dest: TypeVarId,
    src: TypeId,
) -> bool {
    let incoming: Vec<TupleElement> = interner
        .resolve(src)
        .as_class()
        .and_then(|class_ref| {
            class_ref
                .tuple_type_arguments
                .clone()
                .or_else(|| interner.class(class_ref.class_id).tuple_type_arguments.clone())
        })
        .unwrap_or_else(|| vec![TupleElement { type_id: src, unbounded: false }]);

    let existing = tracker.constraint_set(dest).and_then(|s| s.tuple_types.clone());
    let merged = match existing {
        None => incoming,
        Some(prev) => {
            if prev.len() != incoming.len() {
                return false;
            }
            let mut combined = Vec::with_capacity(prev.len());
            for (p, i) in prev.iter().zip(incoming.iter()) {
                if p.unbounded != i.unbounded {
                    return false;
                }
                let merged_ty = interner.union([p.type_id, i.type_id]);
                combined.push(TupleElement { type_id: merged_ty, unbounded: p.unbounded });
            }
            combined
        }
    };

    if tracker.locked {
        return true;
    }
    tracker.constraint_set_mut(dest).tuple_types = Some(merged);
    true
}
