//! Type-variable data model: ordinary type variables, variadic type
//! variables ("TypeVarTuple"-style), and parameter-specification variables.
//!
//! Grounded on spec.md §3's `TypeVar (generalized)` case and on
//! `tsz-solver`'s `TypeParamInfo` (see `tests/instantiate_tests.rs`), scaled
//! up with scope ids since this algebra's type variables are *scoped* to
//! the generic definition that introduced them (spec.md Glossary, "Scope
//! id"), unlike `tsz-solver`'s flat name-keyed substitution.

use crate::atom::Atom;
use crate::intern::TypeId;

/// Stable identifier for the generic definition (class or function) that
/// introduced a type variable. A [`crate::constraint_solver::ConstraintTracker`]
/// only solves for variables whose scope it owns; variables from other
/// scopes are validated, not mutated (spec.md §4.B step 2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

/// Handle into the interner's type-variable side table, identifying one
/// specific declared type variable (as opposed to [`ScopeId`], which
/// identifies the generic definition that owns a group of them).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(pub u32);

/// Declared or inferred variance of a type parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variance {
    Covariant,
    Contravariant,
    Invariant,
}

/// Which flavor of generalized type variable this is (spec.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeVarKind {
    /// An ordinary type variable (`T`).
    Ordinary,
    /// A variadic type variable standing for a tuple of types (`Ts`,
    /// a.k.a. `TypeVarTuple`).
    Variadic,
    /// A parameter-specification variable (`P`, a.k.a. `ParamSpec`).
    ParamSpec,
}

bitflags::bitflags! {
    /// Per-instance flags on a type variable, independent of its `kind`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TypeVarFlags: u16 {
        /// Internally synthesized (e.g. a fresh destination TV created by
        /// the reverse-type-argument mapper) rather than user-declared.
        /// Synthesized variables are exempt from declared-bound validation
        /// failures (spec.md §4.B step 9).
        const SYNTHESIZED         = 1 << 0;
        /// This is the implicit `Self` type variable of a method.
        const SELF_TYPE           = 1 << 1;
        /// Placeholder standing in for "the type variable currently in
        /// scope" during recursive resolution.
        const IN_SCOPE_PLACEHOLDER = 1 << 2;
        /// A variadic type variable that has been unpacked (`*Ts`).
        const VARIADIC_UNPACKED   = 1 << 3;
        /// A variadic type variable appearing inside a union member
        /// position rather than a plain parameter list position.
        const VARIADIC_IN_UNION   = 1 << 4;
        /// A `ParamSpec` with a declared default parameter list.
        const PARAM_SPEC_DEFAULT  = 1 << 5;
    }
}

/// Per-declaration data for a generalized type variable (spec.md §3).
///
/// A `TypeVarDef` with a non-empty `constraints` list never has an
/// `upper_bound` (invariant from spec.md §3); callers that build one must
/// respect this, and the constraint solver (`constraint_solver.rs`) assumes
/// it.
#[derive(Clone, Debug)]
pub struct TypeVarDef {
    pub kind: TypeVarKind,
    pub name: Atom,
    pub scope_id: ScopeId,
    pub upper_bound: Option<TypeId>,
    pub constraints: Vec<TypeId>,
    pub variance: Variance,
    pub flags: TypeVarFlags,
    /// For a `ParamSpec` with a declared default parameter list
    /// (`PARAM_SPEC_DEFAULT`), the default captured as a function shape
    /// (spec.md §3: "`ParamSpec` argument values are encoded as a
    /// `Function` whose parameters are the captured parameter list").
    pub param_spec_default: Option<TypeId>,
}

impl TypeVarDef {
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty()
    }
}
