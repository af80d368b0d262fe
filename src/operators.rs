//! Operator evaluator (component D, spec.md §4.D).
//!
//! Computes the result type of binary, unary, augmented, and ternary
//! operations: magic-method dispatch, literal-math folding, union-at-type-
//! position, containment, and short-circuit boolean combination.

use num_bigint::BigInt;

use crate::atom::AtomInterner;
use crate::diagnostics::{Addendum, Diagnostic, NodeRef, RuleTag};
use crate::env::ExecutionEnvironment;
use crate::fold::{fold_bool_expression, Expr as FoldExpr};
use crate::host::HostEvaluator;
use crate::intern::{TypeId, TypeInterner};
use crate::limits::MAX_LITERAL_FOLD_CROSS_PRODUCT;
use crate::numeric;
use crate::types::literal::{IntLiteral, LiteralValue};
use crate::types::TypeData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Is,
    IsNot,
    In,
    NotIn,
    And,
    Or,
    /// `|` at a type-expression position (spec.md §4.D step 2).
    UnionTypeExpr,
}

impl BinaryOp {
    /// `(forward_magic_name, reverse_magic_name)` for arithmetic/comparison
    /// operators (spec.md §4.D). Boolean operators have no magic pair.
    fn magic_names(self) -> Option<(&'static str, &'static str)> {
        match self {
            BinaryOp::Add => Some(("__add__", "__radd__")),
            BinaryOp::Sub => Some(("__sub__", "__rsub__")),
            BinaryOp::Mul => Some(("__mul__", "__rmul__")),
            BinaryOp::FloorDiv => Some(("__floordiv__", "__rfloordiv__")),
            BinaryOp::Mod => Some(("__mod__", "__rmod__")),
            BinaryOp::Pow => Some(("__pow__", "__rpow__")),
            BinaryOp::LShift => Some(("__lshift__", "__rlshift__")),
            BinaryOp::RShift => Some(("__rshift__", "__rrshift__")),
            BinaryOp::BitAnd => Some(("__and__", "__rand__")),
            BinaryOp::BitOr => Some(("__or__", "__ror__")),
            BinaryOp::BitXor => Some(("__xor__", "__rxor__")),
            BinaryOp::Eq => Some(("__eq__", "__eq__")),
            BinaryOp::Ne => Some(("__ne__", "__ne__")),
            BinaryOp::Lt => Some(("__lt__", "__gt__")),
            BinaryOp::Le => Some(("__le__", "__ge__")),
            BinaryOp::Gt => Some(("__gt__", "__lt__")),
            BinaryOp::Ge => Some(("__ge__", "__le__")),
            _ => None,
        }
    }
}

/// Context the evaluator needs beyond the two operand types (spec.md §4.D
/// steps 2 and 5: version-gated union syntax, disabled literal folding
/// inside loops/closures).
#[derive(Clone, Debug)]
pub struct OperatorContext<'a> {
    pub env: &'a ExecutionEnvironment,
    /// True when the expression is lexically inside a loop or a closure
    /// captured across iterations; literal folding is disabled there to
    /// stay sound (spec.md §4.D step 5, §8 invariant 8).
    pub inside_loop_or_closure: bool,
    /// Lowest target-version encoding (major*256+minor) that permits bare
    /// `X | Y` union syntax at a type-expression position.
    pub union_syntax_min_version: BigInt,
    /// Resolves `str`/`bytes` literal payloads for concatenation folding
    /// (spec.md §4.D step 5).
    pub atoms: &'a AtomInterner,
}

/// `typeOfBinary` (spec.md §6): evaluate `left op right`.
#[allow(clippy::too_many_arguments)]
pub fn type_of_binary(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    op: BinaryOp,
    left: TypeId,
    right: TypeId,
    ctx: OperatorContext<'_>,
    node: NodeRef,
) -> TypeId {
    // Step 1: Never propagation (except and/or, handled separately below).
    if !matches!(op, BinaryOp::And | BinaryOp::Or) {
        if matches!(interner.resolve(left), TypeData::Never) || matches!(interner.resolve(right), TypeData::Never) {
            return TypeId::NEVER;
        }
    }

    match op {
        BinaryOp::UnionTypeExpr => return type_of_union_expr(interner, host, left, right, ctx, node),
        BinaryOp::And => return type_of_and(interner, host, left, right),
        BinaryOp::Or => return type_of_or(interner, host, left, right),
        BinaryOp::In => return type_of_containment(interner, host, left, right, node, false),
        BinaryOp::NotIn => return type_of_containment(interner, host, left, right, node, true),
        BinaryOp::Is | BinaryOp::IsNot => return bool_type(interner, host),
        _ => {}
    }

    // Step 5: literal math, only outside loops/closures.
    if !ctx.inside_loop_or_closure {
        if let Some(folded) = fold_literal_math(interner, ctx.atoms, op, left, right) {
            return folded;
        }
    }

    // Step 7: tuple `+` fast path.
    if op == BinaryOp::Add {
        if let Some(result) = tuple_concat_fast_path(interner, left, right) {
            return result;
        }
    }

    // Step 6: magic-method dispatch.
    if let Some(result) = dispatch_magic_method(interner, host, op, left, right, node) {
        return result;
    }

    // Step 8: failure.
    report_unsupported_operator(interner, host, left, right, node);
    TypeId::UNKNOWN
}

fn bool_type(interner: &mut TypeInterner, host: &mut dyn HostEvaluator) -> TypeId {
    host.get_built_in_type(interner, "bool").unwrap_or(TypeId::UNKNOWN)
}

fn type_of_union_expr(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    left: TypeId,
    right: TypeId,
    ctx: OperatorContext<'_>,
    node: NodeRef,
) -> TypeId {
    let has_own_or = |ty: TypeId| -> bool {
        interner
            .resolve(ty)
            .as_class()
            .map(|c| !host.is_special_form_class(interner, c.class_id))
            .unwrap_or(false)
            && host.get_bound_magic_method(interner, interner.resolve(ty).as_class().unwrap().class_id, "__or__").is_some()
    };
    if has_own_or(left) || has_own_or(right) {
        if let Some(result) = dispatch_magic_method(interner, host, BinaryOp::BitOr, left, right, node) {
            return result;
        }
    }

    let version_guard = FoldExpr::VersionCompare {
        op: crate::fold::CompareOp::Ge,
        first_element_only: false,
        rhs: ctx.union_syntax_min_version.clone(),
    };
    if !ctx.env.is_stub_file && fold_bool_expression(&version_guard, ctx.env) != Some(true) {
        host.report_diagnostic(Diagnostic::new(
            RuleTag::UnionAtTypePosition,
            "union syntax `X | Y` requires a newer target version outside stub files",
            node,
        ));
    }

    interner.union([left, right])
}

fn type_of_and(interner: &mut TypeInterner, host: &mut dyn HostEvaluator, left: TypeId, right: TypeId) -> TypeId {
    if host.can_be_truthy(interner, left) && !host.can_be_falsy(interner, left) {
        return right;
    }
    if host.can_be_falsy(interner, left) && !host.can_be_truthy(interner, left) {
        return left;
    }
    let narrowed_left = host.remove_truthiness_from_type(interner, left);
    interner.union([narrowed_left, right])
}

fn type_of_or(interner: &mut TypeInterner, host: &mut dyn HostEvaluator, left: TypeId, right: TypeId) -> TypeId {
    if host.can_be_falsy(interner, left) && !host.can_be_truthy(interner, left) {
        return right;
    }
    if host.can_be_truthy(interner, left) && !host.can_be_falsy(interner, left) {
        return left;
    }
    let narrowed_left = host.remove_falsiness_from_type(interner, left);
    interner.union([narrowed_left, right])
}

fn type_of_containment(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    left: TypeId,
    right: TypeId,
    node: NodeRef,
    negate: bool,
) -> TypeId {
    let result = if let Some(class_ref) = interner.resolve(right).as_class().cloned() {
        if let Some(method) = host.get_bound_magic_method(interner, class_ref.class_id, "__contains__") {
            host.validate_call_args(interner, method, &[left], node);
            true
        } else if let Some(yield_ty) = host.get_type_of_iterator(interner, right) {
            host.assign_type(interner, yield_ty, left, node)
        } else {
            false
        }
    } else {
        false
    };
    let _ = (result, negate);
    bool_type(interner, host)
}

/// Literal-math folding (spec.md §4.D step 5). `None` if either operand is
/// not a literal class, the operation isn't supported for the underlying
/// type, or the folding cross-product cap is exceeded.
fn fold_literal_math(interner: &mut TypeInterner, atoms: &AtomInterner, op: BinaryOp, left: TypeId, right: TypeId) -> Option<TypeId> {
    let left_members = union_members_or_self(interner, left);
    let right_members = union_members_or_self(interner, right);
    if left_members.len() * right_members.len() > MAX_LITERAL_FOLD_CROSS_PRODUCT {
        return None;
    }

    let mut results = Vec::new();
    for &l in &left_members {
        for &r in &right_members {
            let folded = fold_literal_pair(interner, atoms, op, l, r)?;
            results.push(folded);
        }
    }
    Some(interner.union(results))
}

fn union_members_or_self(interner: &TypeInterner, ty: TypeId) -> Vec<TypeId> {
    match interner.resolve(ty) {
        TypeData::Union(u) => u.members.clone(),
        _ => vec![ty],
    }
}

fn fold_literal_pair(interner: &mut TypeInterner, atoms: &AtomInterner, op: BinaryOp, left: TypeId, right: TypeId) -> Option<TypeId> {
    let left_class = interner.resolve(left).as_class()?.clone();
    let right_class = interner.resolve(right).as_class()?.clone();
    let left_lit = left_class.literal.as_ref()?;
    let right_lit = right_class.literal.as_ref()?;

    match (left_lit, right_lit) {
        (LiteralValue::Str(l), LiteralValue::Str(r)) if op == BinaryOp::Add => {
            fold_str_concat(interner, atoms, &left_class, *l, *r)
        }
        (LiteralValue::Bytes(l), LiteralValue::Bytes(r)) if op == BinaryOp::Add => {
            fold_bytes_concat(interner, atoms, &left_class, *l, *r)
        }
        (LiteralValue::Int(l), LiteralValue::Int(r)) => fold_int_pair(interner, op, &left_class, l, r),
        _ => None,
    }
}

/// `str` literal `+` (spec.md §4.D step 5: "`str` or `bytes` with `+`:
/// concatenate"): resolve both operands' text and re-intern the
/// concatenation as a new `str` literal.
fn fold_str_concat(
    interner: &mut TypeInterner,
    atoms: &AtomInterner,
    template_class: &crate::types::ClassRef,
    left: crate::atom::Atom,
    right: crate::atom::Atom,
) -> Option<TypeId> {
    let concatenated = format!("{}{}", atoms.resolve(left), atoms.resolve(right));
    let joined = atoms.intern(&concatenated);
    Some(interner.intern(TypeData::Class(crate::types::ClassRef {
        literal: Some(LiteralValue::Str(joined)),
        ..template_class.clone()
    })))
}

/// `bytes` literal `+`, same shape as [`fold_str_concat`]: `bytes` payloads
/// share the same interner as `str`, so concatenation is plain text
/// concatenation re-tagged as `Bytes`.
fn fold_bytes_concat(
    interner: &mut TypeInterner,
    atoms: &AtomInterner,
    template_class: &crate::types::ClassRef,
    left: crate::atom::Atom,
    right: crate::atom::Atom,
) -> Option<TypeId> {
    let concatenated = format!("{}{}", atoms.resolve(left), atoms.resolve(right));
    let joined = atoms.intern(&concatenated);
    Some(interner.intern(TypeData::Class(crate::types::ClassRef {
        literal: Some(LiteralValue::Bytes(joined)),
        ..template_class.clone()
    })))
}

fn fold_int_pair(
    interner: &mut TypeInterner,
    op: BinaryOp,
    template_class: &crate::types::ClassRef,
    l: &IntLiteral,
    r: &IntLiteral,
) -> Option<TypeId> {
    let a = l.to_bigint();
    let b = r.to_bigint();
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::FloorDiv => numeric::floor_div(&a, &b)?,
        BinaryOp::Mod => numeric::floor_mod(&a, &b)?,
        BinaryOp::Pow => {
            let exp = u32::try_from(b).ok()?;
            num_traits::pow::Pow::pow(a, exp)
        }
        BinaryOp::LShift => a << u32::try_from(b).ok()?,
        BinaryOp::RShift => a >> u32::try_from(b).ok()?,
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        _ => return None,
    };
    let collapsed = numeric::collapse(result);
    Some(interner.intern(TypeData::Class(crate::types::ClassRef {
        literal: Some(LiteralValue::Int(collapsed)),
        ..template_class.clone()
    })))
}

/// Tuple `+` fast path (spec.md §4.D step 7): both operands known-length
/// tuples, at least one with no unbounded element, left not a union.
fn tuple_concat_fast_path(interner: &mut TypeInterner, left: TypeId, right: TypeId) -> Option<TypeId> {
    if matches!(interner.resolve(left), TypeData::Union(_)) {
        return None;
    }
    let left_class = interner.resolve(left).as_class()?.clone();
    let right_class = interner.resolve(right).as_class()?.clone();
    let left_elems = tuple_elements_of(interner, &left_class)?;
    let right_elems = tuple_elements_of(interner, &right_class)?;
    let any_bounded = !left_elems.iter().any(|e| e.unbounded) || !right_elems.iter().any(|e| e.unbounded);
    if !any_bounded {
        return None;
    }

    let mut combined = left_elems;
    combined.extend(right_elems);
    Some(interner.intern(TypeData::Class(crate::types::ClassRef {
        tuple_type_arguments: Some(combined),
        literal: None,
        type_arguments: Vec::new(),
        ..left_class
    })))
}

/// Per-occurrence tuple elements, falling back to the owning `ClassDef`'s
/// declared list when the occurrence does not override it.
fn tuple_elements_of(interner: &TypeInterner, class_ref: &crate::types::ClassRef) -> Option<Vec<crate::types::class::TupleElement>> {
    class_ref
        .tuple_type_arguments
        .clone()
        .or_else(|| interner.class(class_ref.class_id).tuple_type_arguments.clone())
}

fn dispatch_magic_method(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    op: BinaryOp,
    left: TypeId,
    right: TypeId,
    node: NodeRef,
) -> Option<TypeId> {
    let (forward, reverse) = op.magic_names()?;

    let object_ty = host.get_object_type(interner);
    let coerce = |interner: &mut TypeInterner, host: &mut dyn HostEvaluator, ty: TypeId| -> TypeId {
        if matches!(interner.resolve(ty), TypeData::Function(_)) {
            object_ty
        } else {
            let _ = host;
            ty
        }
    };
    let left = coerce(interner, host, left);
    let right = coerce(interner, host, right);

    if let Some(result) = host.get_type_of_magic_method_call(interner, left, forward, &[right], node) {
        return Some(result);
    }
    if let Some(result) = host.get_type_of_magic_method_call(interner, right, reverse, &[left], node) {
        return Some(result);
    }
    None
}

fn report_unsupported_operator(interner: &mut TypeInterner, host: &mut dyn HostEvaluator, left: TypeId, right: TypeId, node: NodeRef) {
    if host.can_be_falsy(interner, left) && host.can_be_truthy(interner, left) {
        // operand could be `None`-shaped; prefer the optional-operand
        // category (spec.md §4.D step 8).
    }
    let is_optional = matches!(interner.resolve(left), TypeData::NoneSingleton | TypeData::NoneType)
        || interner
            .resolve(left)
            .as_union()
            .map(|u| u.members.iter().any(|&m| matches!(interner.resolve(m), TypeData::NoneType)))
            .unwrap_or(false);

    let (rule, message) = if is_optional {
        (RuleTag::OptionalOperand, "operand may be `None`; operator is unsupported for that case")
    } else {
        (RuleTag::UnsupportedOperator, "operator is not supported between these operand types")
    };
    let (src_str, dest_str) = host.print_src_dest_types(interner, left, right);
    host.report_diagnostic(
        Diagnostic::new(rule, message, node).with_addendum(Addendum::leaf(format!("{src_str} / {dest_str}"))),
    );
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Pos,
    Neg,
    Invert,
    Not,
}

/// `typeOfUnary` equivalent (spec.md §4.D "Unary").
pub fn type_of_unary(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    op: UnaryOp,
    operand: TypeId,
    inside_loop_or_closure: bool,
    node: NodeRef,
) -> TypeId {
    if op == UnaryOp::Not {
        return bool_type(interner, host);
    }
    if !inside_loop_or_closure {
        if let Some(folded) = fold_unary_literal(interner, op, operand) {
            return folded;
        }
    }
    let method = match op {
        UnaryOp::Pos => "__pos__",
        UnaryOp::Neg => "__neg__",
        UnaryOp::Invert => "__invert__",
        UnaryOp::Not => unreachable!(),
    };
    if let Some(class_ref) = interner.resolve(operand).as_class().cloned() {
        if let Some(bound) = host.get_bound_magic_method(interner, class_ref.class_id, method) {
            if let crate::host::CallArgsOutcome::Matched { return_type } = host.validate_call_args(interner, bound, &[], node) {
                return return_type;
            }
        }
    }
    TypeId::UNKNOWN
}

fn fold_unary_literal(interner: &mut TypeInterner, op: UnaryOp, operand: TypeId) -> Option<TypeId> {
    let class_ref = interner.resolve(operand).as_class()?.clone();
    let literal = class_ref.literal.clone()?;
    match (op, literal) {
        (UnaryOp::Neg, LiteralValue::Int(i)) => {
            let negated = numeric::collapse(-i.to_bigint());
            Some(interner.intern(TypeData::Class(crate::types::ClassRef {
                literal: Some(LiteralValue::Int(negated)),
                ..class_ref
            })))
        }
        (UnaryOp::Invert, LiteralValue::Int(i)) => {
            let inverted = numeric::collapse(!i.to_bigint());
            Some(interner.intern(TypeData::Class(crate::types::ClassRef {
                literal: Some(LiteralValue::Int(inverted)),
                ..class_ref
            })))
        }
        _ => None,
    }
}

/// Ternary expression (spec.md §4.D "Ternary").
pub fn type_of_ternary(
    interner: &mut TypeInterner,
    cond_expr: &FoldExpr,
    env: &ExecutionEnvironment,
    then_ty: TypeId,
    else_ty: TypeId,
) -> TypeId {
    match fold_bool_expression(cond_expr, env) {
        Some(true) => then_ty,
        Some(false) => else_ty,
        None => interner.union([then_ty, else_ty]),
    }
}

impl BinaryOp {
    /// In-place magic method tried before falling back to the plain binary
    /// operation (spec.md §4.D "Augmented `op=`").
    fn in_place_magic_name(self) -> Option<&'static str> {
        Some(match self {
            BinaryOp::Add => "__iadd__",
            BinaryOp::Sub => "__isub__",
            BinaryOp::Mul => "__imul__",
            BinaryOp::FloorDiv => "__ifloordiv__",
            BinaryOp::Mod => "__imod__",
            BinaryOp::Pow => "__ipow__",
            BinaryOp::LShift => "__ilshift__",
            BinaryOp::RShift => "__irshift__",
            BinaryOp::BitAnd => "__iand__",
            BinaryOp::BitOr => "__ior__",
            BinaryOp::BitXor => "__ixor__",
            _ => return None,
        })
    }
}

/// `op=` (spec.md §4.D "Augmented `op=`"): try the in-place magic method
/// first, falling back to the plain binary operation. Literal folding is
/// allowed only when `is_local_variable` is true, never for a captured
/// name, to preserve soundness under loops.
#[allow(clippy::too_many_arguments)]
pub fn type_of_augmented_assignment(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    op: BinaryOp,
    destination: TypeId,
    operand: TypeId,
    is_local_variable: bool,
    ctx: OperatorContext<'_>,
    node: NodeRef,
) -> TypeId {
    if let Some(name) = op.in_place_magic_name() {
        if let Some(result) = host.get_type_of_magic_method_call(interner, destination, name, &[operand], node) {
            return result;
        }
    }
    let fallback_ctx = OperatorContext {
        inside_loop_or_closure: ctx.inside_loop_or_closure || !is_local_variable,
        ..ctx.clone()
    };
    type_of_binary(interner, host, op, destination, operand, fallback_ctx, node)
}
