//! The external-service boundary (spec.md §6). Every operation the core
//! needs from the surrounding checker (symbol lookup, expression
//! evaluation, diagnostic emission, printing) is expressed as a method on
//! [`HostEvaluator`], the same "dependency-injected evaluator" shape as
//! `tsz-solver`'s `TypeResolver`/`TypeDatabase` traits. The core never
//! constructs its own copy of this data; it is always borrowed from the
//! caller for the duration of one call.

use crate::diagnostics::{Diagnostic, NodeRef};
use crate::env::ExecutionEnvironment;
use crate::intern::{TypeId, TypeInterner};
use crate::types::class::ClassId;
use crate::types::literal::LiteralValue;

/// A restricted expression handle the host resolves on the core's behalf.
/// Opaque to the core, the same way [`NodeRef`] is: the core never parses
/// or walks source syntax (spec.md §1 Non-goals).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExprRef(pub u64);

/// Argument binding outcome for a single candidate signature (spec.md §6
/// `validate_call_args`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallArgsOutcome {
    Matched { return_type: TypeId },
    Mismatched,
}

/// Services the core borrows from the surrounding checker for the
/// duration of a single top-level operation. Every method here corresponds
/// to one bullet of spec.md §6.
pub trait HostEvaluator {
    /// Assign `source` to `destination`, reporting through `sink` on
    /// mismatch (spec.md §4.B, the top-level assignability entry point the
    /// constraint solver calls back into for nested checks it does not
    /// itself own, e.g. checking a magic-method's declared parameter type).
    fn assign_type(
        &mut self,
        interner: &mut TypeInterner,
        destination: TypeId,
        source: TypeId,
        node: NodeRef,
    ) -> bool;

    /// Replace every top-level type variable in `ty` with its solved value,
    /// or `Unknown` if unsolved (spec.md §6).
    fn make_top_level_type_vars_concrete(&self, interner: &mut TypeInterner, ty: TypeId) -> TypeId;

    /// Strip a literal value down to its containing class type (e.g. the
    /// literal `3` to `int`), used when a literal would otherwise leak into
    /// a widened declared-type position (spec.md §6).
    fn strip_literal_value(&self, interner: &mut TypeInterner, ty: TypeId) -> TypeId;

    /// Render `ty` for diagnostic messages. The core never formats types
    /// itself (spec.md §1 Non-goals: diagnostic formatting).
    fn print_type(&self, interner: &TypeInterner, ty: TypeId) -> String;

    fn print_src_dest_types(
        &self,
        interner: &TypeInterner,
        source: TypeId,
        destination: TypeId,
    ) -> (String, String) {
        (
            self.print_type(interner, source),
            self.print_type(interner, destination),
        )
    }

    fn get_built_in_object(&self, interner: &mut TypeInterner) -> TypeId;
    fn get_built_in_type(&self, interner: &mut TypeInterner, name: &str) -> Option<TypeId>;
    fn get_object_type(&self, interner: &mut TypeInterner) -> TypeId {
        self.get_built_in_object(interner)
    }
    fn get_tuple_class_type(&self, interner: &mut TypeInterner) -> TypeId;
    fn get_none_type(&self, interner: &mut TypeInterner) -> TypeId {
        TypeId::NONE_TYPE
    }
    fn get_union_class_type(&self, interner: &mut TypeInterner) -> TypeId;

    fn get_type_of_expression(&mut self, interner: &mut TypeInterner, expr: ExprRef) -> TypeId;
    fn get_type_of_annotation(&mut self, interner: &mut TypeInterner, expr: ExprRef) -> TypeId;

    /// Resolve and type-check a magic-method call (`__add__`, `__eq__`, …),
    /// returning `None` if the class has no such member (spec.md §4.D
    /// operator dispatch).
    fn get_type_of_magic_method_call(
        &mut self,
        interner: &mut TypeInterner,
        receiver: TypeId,
        method_name: &str,
        args: &[TypeId],
        node: NodeRef,
    ) -> Option<TypeId>;

    fn get_type_of_iterator(&mut self, interner: &mut TypeInterner, ty: TypeId) -> Option<TypeId>;

    fn validate_call_args(
        &mut self,
        interner: &mut TypeInterner,
        callee: TypeId,
        args: &[TypeId],
        node: NodeRef,
    ) -> CallArgsOutcome;

    /// Look up a symbol by name, searching outward through enclosing
    /// scopes (spec.md §6).
    fn look_up_symbol_recursive(&self, interner: &TypeInterner, name: &str) -> Option<TypeId>;

    /// Resolve `class_id`'s bound implementation of `method_name`, if any,
    /// already bound to an instance of that class (spec.md §6, used by the
    /// operator evaluator's magic-method dispatch).
    fn get_bound_magic_method(
        &mut self,
        interner: &mut TypeInterner,
        class_id: ClassId,
        method_name: &str,
    ) -> Option<TypeId>;

    /// Infer the variance of type parameter `param_index` of `class_id` by
    /// inspecting its usage sites, for classes that left the parameter's
    /// variance undeclared (spec.md §3, §4.E).
    fn infer_variance_for_class(
        &mut self,
        interner: &mut TypeInterner,
        class_id: ClassId,
        param_index: usize,
    ) -> crate::types::typevar::Variance;

    fn report_diagnostic(&mut self, diagnostic: Diagnostic);

    /// True for classes the solver special-cases structurally rather than
    /// nominally (`Protocol`, `NamedTuple`, `TypedDict`, …), per spec.md §3
    /// "special form" classes.
    fn is_special_form_class(&self, interner: &TypeInterner, class_id: ClassId) -> bool;

    fn can_be_truthy(&self, interner: &TypeInterner, ty: TypeId) -> bool;
    fn can_be_falsy(&self, interner: &TypeInterner, ty: TypeId) -> bool;

    /// Narrow `ty` by removing members that can only ever be truthy, used
    /// by `and`/`or` short-circuit narrowing (spec.md §4.D).
    fn remove_truthiness_from_type(&mut self, interner: &mut TypeInterner, ty: TypeId) -> TypeId;
    fn remove_falsiness_from_type(&mut self, interner: &mut TypeInterner, ty: TypeId) -> TypeId;

    fn execution_environment(&self) -> &ExecutionEnvironment;
}

/// Convenience used by the literal-math folder: turn a class instance back
/// into its literal payload, if it has one (spec.md §4.D step 5).
#[must_use]
pub fn literal_of(interner: &TypeInterner, ty: TypeId) -> Option<LiteralValue> {
    interner.resolve(ty).as_class().and_then(|c| c.literal.clone())
}
