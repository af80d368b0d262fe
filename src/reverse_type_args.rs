//! Reverse-type-argument mapper (component C, spec.md §4.C).
//!
//! Given a derived class and an expected (possibly specialized) type,
//! infers type arguments for the derived class so that some specialization
//! of it is assignable to `expected`. Called by the host when propagating
//! an expected type into a constructor call.

use crate::constraint_solver::{self, AssignFlags, ConstraintTracker};
use crate::diagnostics::NodeRef;
use crate::host::HostEvaluator;
use crate::intern::{TypeId, TypeInterner};
use crate::types::class::ClassId;
use crate::types::typevar::{TypeVarDef, TypeVarFlags, TypeVarKind, Variance};
use crate::types::{ClassRef, TypeData};

/// Outcome of [`map_reverse_type_args`]: the populated per-parameter type
/// arguments for `derived`, or `None` on failure.
#[derive(Clone, Debug, Default)]
pub struct ReverseMapResult {
    pub type_arguments: Vec<TypeId>,
    /// Set when a derived parameter was used more than once in the
    /// expected base with two different resolved values (spec.md §4.C:
    /// "mark the result invalid and use `Unknown`").
    pub invalidated: bool,
}

/// `(derived, expected) -> populated tracker` (spec.md §4.C).
#[allow(clippy::too_many_arguments)]
pub fn map_reverse_type_args(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    derived: ClassId,
    expected: TypeId,
    node: NodeRef,
    depth: u32,
) -> Option<ReverseMapResult> {
    if depth >= crate::limits::DEFAULT_MAX_RECURSION_DEPTH {
        return None;
    }

    let param_count = interner.class(derived).type_params.len();

    // `expected` is `Any`: populate every parameter with `Any`. Done.
    if matches!(interner.resolve(expected), TypeData::Any) {
        return Some(ReverseMapResult {
            type_arguments: vec![TypeId::ANY; param_count],
            invalidated: false,
        });
    }

    // Synthesized-Self TV with a bound: recurse on the bound.
    if let TypeData::TypeVar(tv_ref) = interner.resolve(expected) {
        let def = interner.type_var(tv_ref.var_id).clone();
        if def.flags.contains(TypeVarFlags::SELF_TYPE) {
            if let Some(bound) = def.upper_bound {
                return map_reverse_type_args(interner, host, derived, bound, node, depth + 1);
            }
        }
    }

    let Some(expected_class) = interner.resolve(expected).as_class().cloned() else {
        return None;
    };

    // Expected is a bare generic class (no arguments): fall back to a
    // normal assignability check seeding bounds only.
    if expected_class.type_arguments.is_empty() {
        let derived_bare = interner.intern(TypeData::Class(ClassRef::bare(
            derived,
            crate::types::class::ClassForm::Instance,
        )));
        let ok = host.assign_type(interner, expected, derived_bare, node);
        return if ok {
            Some(ReverseMapResult {
                type_arguments: vec![TypeId::UNKNOWN; param_count],
                invalidated: false,
            })
        } else {
            None
        };
    }

    // Fast path: same generic class. Copy expected's arguments directly;
    // each parameter receives exactly one value here regardless of
    // variance, since there is no prior entry to reconcile against.
    if expected_class.class_id == derived {
        let mut args = vec![TypeId::UNKNOWN; param_count];
        for (i, &arg) in expected_class.type_arguments.iter().enumerate() {
            if i >= param_count {
                break;
            }
            args[i] = arg;
        }
        return Some(ReverseMapResult {
            type_arguments: args,
            invalidated: false,
        });
    }

    // General case: synthesize fresh destination TVs for `expected`'s
    // parameters and fresh source placeholder TVs for `derived`'s
    // parameters; assign derived(sources) into expected(destinations)
    // under PopulatingExpectedType; then propagate.
    let dest_scope = crate::types::typevar::ScopeId(u32::MAX - 1);
    let src_scope = crate::types::typevar::ScopeId(u32::MAX - 2);

    let dest_tvs: Vec<_> = expected_class
        .type_arguments
        .iter()
        .map(|_| {
            interner.define_type_var(TypeVarDef {
                kind: TypeVarKind::Ordinary,
                name: crate::atom::Atom::placeholder(),
                scope_id: dest_scope,
                upper_bound: None,
                constraints: Vec::new(),
                variance: Variance::Invariant,
                flags: TypeVarFlags::SYNTHESIZED,
                param_spec_default: None,
            })
        })
        .collect();

    let source_placeholders: Vec<_> = (0..param_count)
        .map(|_| {
            interner.define_type_var(TypeVarDef {
                kind: TypeVarKind::Ordinary,
                name: crate::atom::Atom::placeholder(),
                scope_id: src_scope,
                upper_bound: None,
                constraints: Vec::new(),
                variance: Variance::Invariant,
                flags: TypeVarFlags::SYNTHESIZED,
                param_spec_default: None,
            })
        })
        .collect();

    let source_tv_types: Vec<TypeId> = source_placeholders
        .iter()
        .map(|&id| interner.intern(TypeData::TypeVar(crate::types::TypeVarRef { var_id: id })))
        .collect();
    let derived_specialized = interner.intern(TypeData::Class(ClassRef {
        class_id: derived,
        form: crate::types::class::ClassForm::Instance,
        type_arguments: source_tv_types.clone(),
        literal: None,
        tuple_type_arguments: None,
    }));

    let dest_tv_types: Vec<TypeId> = dest_tvs
        .iter()
        .map(|&id| interner.intern(TypeData::TypeVar(crate::types::TypeVarRef { var_id: id })))
        .collect();
    let expected_reconstructed = interner.intern(TypeData::Class(ClassRef {
        class_id: expected_class.class_id,
        form: expected_class.form,
        type_arguments: dest_tv_types,
        literal: None,
        tuple_type_arguments: None,
    }));

    // `assign_type` is the only structural class-vs-class comparison this
    // crate has (spec.md §4.B); it reports feasibility only; everything
    // past this point is determined from our own side, by binding each
    // destination placeholder to the source placeholder standing at the
    // same position, since this crate does not track how `derived`
    // specializes an ancestor's parameters.
    if !host.assign_type(interner, expected_reconstructed, derived_specialized, node) {
        return None;
    }

    let mut tracker = ConstraintTracker::new(vec![dest_scope]);
    for (i, &dest_tv) in dest_tvs.iter().enumerate() {
        let Some(&source_tv_ty) = source_tv_types.get(i) else {
            continue;
        };
        constraint_solver::assign(
            interner,
            host,
            &mut tracker,
            dest_tv,
            source_tv_ty,
            AssignFlags::POPULATING_EXPECTED_TYPE,
            node,
            depth + 1,
        );
    }

    // For each destination TV that resolved to a source placeholder,
    // propagate the matching expected argument to that derived parameter.
    let mut args = vec![TypeId::UNKNOWN; param_count];
    let mut assigned_once = vec![false; param_count];
    let mut invalidated = false;

    for (i, &dest_tv) in dest_tvs.iter().enumerate() {
        let solved = tracker.solve_for_expected(dest_tv);
        let members: Vec<TypeId> = match interner.resolve(solved) {
            TypeData::Union(u) => u.members.clone(),
            _ => vec![solved],
        };
        for member in members {
            if let TypeData::TypeVar(tv_ref) = interner.resolve(member) {
                if let Some(pos) = source_placeholders.iter().position(|&id| id == tv_ref.var_id) {
                    let expected_arg = expected_class.type_arguments[i];
                    if assigned_once[pos] && args[pos] != expected_arg {
                        invalidated = true;
                        args[pos] = TypeId::UNKNOWN;
                    } else {
                        args[pos] = expected_arg;
                        assigned_once[pos] = true;
                    }
                }
            }
        }
    }

    Some(ReverseMapResult {
        type_arguments: args,
        invalidated,
    })
}
