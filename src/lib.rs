//! Type-reasoning core for a gradual, class-based, structurally-typed
//! language checker.
//!
//! The crate is the same shape as `tsz-solver`: a closed type algebra
//! ([`TypeData`]) interned by a single [`TypeInterner`], a set of stateless
//! operations over it (assignability, operator evaluation, class synthesis,
//! decorator application), and a [`HostEvaluator`] trait the surrounding
//! checker implements to supply everything this crate does not own itself
//! (symbol lookup, call validation, diagnostic rendering). The core holds no
//! global mutable state; every operation takes its [`TypeInterner`] and
//! [`HostEvaluator`] by reference.

pub mod atom;
pub mod class_synthesis;
pub mod constraint_solver;
pub mod decorators;
pub mod diagnostics;
pub mod env;
pub mod fold;
pub mod host;
pub mod intern;
pub mod limits;
pub mod numeric;
pub mod operators;
pub mod reverse_type_args;
pub mod types;

pub use atom::{Atom, AtomInterner};
pub use class_synthesis::{
    check_frozen_inheritance, collect_fields, exclude_class_variable, match_args_names,
    respecialize_named_tuple_base, synthesize_constructor, synthesize_dataclass_fields, synthesize_eq,
    synthesize_new, synthesize_ordering_method, synthesize_slots, FieldCtorArgs, FieldDecl,
};
pub use constraint_solver::{assign, AssignFlags, ConstraintSet, ConstraintTracker};
pub use decorators::{
    apply_builtin_function_decorator, apply_data_class_decorator, apply_generic_function_decorator,
    apply_property_decorator, get_data_class_behaviors_from_decorator, validate_data_class_transform,
    BuiltinDecorator, DataClassBehaviors, DataClassCallArgs, DataClassTransformCallArgs, DataClassTransformConfig,
    OverloadAccumulator,
};
pub use diagnostics::{Addendum, CollectingSink, Diagnostic, DiagnosticSink, NodeRef, RuleTag};
pub use env::{AliasTables, ExecutionEnvironment, Platform, TargetVersion};
pub use fold::{fold_bool_expression, fold_bool_like_expression, CompareOp, Expr};
pub use host::{literal_of, CallArgsOutcome, ExprRef, HostEvaluator};
pub use intern::{TypeId, TypeInterner};
pub use operators::{
    type_of_augmented_assignment, type_of_binary, type_of_ternary, type_of_unary, BinaryOp, OperatorContext, UnaryOp,
};
pub use reverse_type_args::{map_reverse_type_args, ReverseMapResult};
pub use types::class::{ClassDef, ClassFlags, ClassForm, ClassId, FieldInfo, TupleElement};
pub use types::function::{FunctionDef, FunctionFlags, OverloadedDef, ParamCategory, ParamInfo};
pub use types::literal::{IntLiteral, LiteralValue};
pub use types::typevar::{ScopeId, TypeVarDef, TypeVarFlags, TypeVarId, TypeVarKind, Variance};
pub use types::{ClassRef, TypeData, TypeVarRef, UnionRef};
