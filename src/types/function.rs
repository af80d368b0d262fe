//! Function / callable signature data model (spec.md §3, `Function` case).

use crate::atom::Atom;
use crate::intern::TypeId;
use crate::types::class::ClassId;
use crate::types::typevar::{ScopeId, TypeVarId};

/// Parameter category, mirroring spec.md §3's
/// `{positional, *args, **kwargs, keyword-only marker, positional-only marker}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamCategory {
    Positional,
    ArgsList,
    KwArgs,
    KeywordOnlyMarker,
    PositionalOnlyMarker,
}

/// A single declared parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub category: ParamCategory,
    pub name: Option<Atom>,
    pub declared_type: Option<TypeId>,
    pub has_default: bool,
}

impl ParamInfo {
    #[must_use]
    pub fn positional(name: Atom, declared_type: TypeId, has_default: bool) -> Self {
        Self {
            category: ParamCategory::Positional,
            name: Some(name),
            declared_type: Some(declared_type),
            has_default,
        }
    }

    /// True for the two marker categories that reserve a parameter-list
    /// slot but bind no argument themselves (the bare `*` and `/`
    /// separators).
    #[must_use]
    pub fn is_marker(&self) -> bool {
        matches!(
            self.category,
            ParamCategory::KeywordOnlyMarker | ParamCategory::PositionalOnlyMarker
        )
    }
}

bitflags::bitflags! {
    /// Flags on a function signature (spec.md §3, `Function` case).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FunctionFlags: u32 {
        const CONSTRUCTOR      = 1 << 0;
        const CLASS_METHOD     = 1 << 1;
        const STATIC_METHOD    = 1 << 2;
        const ABSTRACT         = 1 << 3;
        const OVERLOADED       = 1 << 4;
        const FINAL            = 1 << 5;
        const OVERRIDDEN       = 1 << 6;
        /// A gradual ("Any-shaped") callable: parameter list is `...`.
        const GRADUAL_CALLABLE = 1 << 7;
        const SYNTHESIZED      = 1 << 8;
        /// Set on a `@property`-wrapped getter.
        const PROPERTY_GETTER  = 1 << 9;
        const PROPERTY_SETTER  = 1 << 10;
        const PROPERTY_DELETER = 1 << 11;
        /// Set on the single non-overload implementation signature of an
        /// `Overloaded` symbol.
        const OVERLOAD_IMPLEMENTATION = 1 << 12;
    }
}

/// A function / method / constructor signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionDef {
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    pub flags: FunctionFlags,
    pub bound_class: Option<ClassId>,
    pub docstring: Option<Atom>,
    pub deprecation_message: Option<Atom>,
    /// Scope id owning the type variables `type_params` refers to, i.e. the
    /// generic context this signature itself introduces (distinct from
    /// `bound_class`'s scope, which owns the enclosing class's parameters).
    pub scope_id: ScopeId,
}

impl FunctionDef {
    #[must_use]
    pub fn is_gradual_callable(&self) -> bool {
        self.flags.contains(FunctionFlags::GRADUAL_CALLABLE)
    }

    /// Parameters in declaration order, skipping the `*`/`/` markers —
    /// the ordering the constraint solver walks when "solving parameters in
    /// declared order" (spec.md §5).
    pub fn bindable_params(&self) -> impl Iterator<Item = &ParamInfo> {
        self.params.iter().filter(|p| !p.is_marker())
    }
}

/// An `Overloaded` type: an ordered list of overload signatures plus at
/// most one non-overload implementation signature (spec.md §3).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OverloadedDef {
    /// Ids into the owning [`crate::intern::TypeInterner`]'s function side
    /// table, in declaration order (spec.md §5: "order-preserving").
    pub overloads: Vec<TypeId>,
    pub implementation: Option<TypeId>,
}
