//! Class-synthesis engine (component E, spec.md §4.E).
//!
//! Materializes constructor, equality, ordering, and match-args members for
//! classes carrying data-class semantics: field collection across the MRO,
//! deferred two-phase field-type evaluation, and the support-member
//! synthesis that reads the resulting field table.
//!
//! Grounded on `tsz-solver`'s `ClassTypeBuilder::merge_properties`
//! (`tests/class_hierarchy_tests.rs`) for the farthest-to-nearest MRO
//! field-merge shape.

use crate::atom::Atom;
use crate::diagnostics::{Diagnostic, NodeRef, RuleTag};
use crate::host::HostEvaluator;
use crate::intern::{TypeId, TypeInterner};
use crate::types::class::{ClassFlags, ClassId, FieldInfo};
use crate::types::function::{FunctionDef, FunctionFlags, ParamCategory, ParamInfo};
use crate::types::typevar::{TypeVarDef, TypeVarFlags, TypeVarKind, Variance};

/// A single source-declared field statement, as the host hands it to the
/// synthesis engine (spec.md §4.E field-collection step 2). Type evaluation
/// for `declared_type_expr` happens in a deferred second pass the host
/// drives; this struct carries only what the engine needs to seed the
/// field table before that pass runs.
#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub name: Atom,
    pub has_value: bool,
    /// Parsed field-constructor call arguments, if the right-hand side was
    /// a call to a declared field constructor (spec.md §4.E step 4).
    pub field_ctor_args: Option<FieldCtorArgs>,
    /// True for the `_: KW_ONLY` sentinel declaration (spec.md §4.E field
    /// collection step 2): not a real field, it flips every field declared
    /// after it (in this class's own body) into keyword-only mode.
    pub is_kw_only_sentinel: bool,
}

#[derive(Clone, Debug, Default)]
pub struct FieldCtorArgs {
    pub init: Option<bool>,
    pub kw_only: Option<bool>,
    pub has_default: bool,
    pub default_factory: bool,
    pub alias: Option<Atom>,
}

/// Merge `own_fields` (this class's own declarations, in source order) onto
/// the farthest-to-nearest merged ancestor field table (spec.md §4.E field
/// collection steps 1-2). `kw_only_default` is the behavior the
/// `dataclass_transform`/decorator configuration established (spec.md §4.F).
pub fn collect_fields(
    interner: &TypeInterner,
    class_id: ClassId,
    own_fields: &[FieldDecl],
    kw_only_default: bool,
) -> (Vec<FieldInfo>, bool) {
    let class = interner.class(class_id);
    let mut merged: Vec<FieldInfo> = Vec::new();
    let mut has_unknown_ancestor = false;

    // Step 1: walk the MRO farthest ancestor to nearest, excluding `self`
    // (index 0), appending each ancestor's own data-class fields. Later
    // (nearer) entries with the same name overwrite earlier ones.
    for &ancestor_id in class.mro.iter().skip(1).rev() {
        let ancestor = interner.class(ancestor_id);
        if ancestor.has_unknown_ancestor {
            has_unknown_ancestor = true;
        }
        if !ancestor.flags.contains(ClassFlags::DATA_CLASS) {
            continue;
        }
        for field in &ancestor.fields {
            if let Some(pos) = merged.iter().position(|f| f.name == field.name) {
                merged[pos] = field.clone();
            } else {
                merged.push(field.clone());
            }
        }
    }

    // Step 2-5: this class's own fields, in source order. A `_: KW_ONLY`
    // sentinel flips `current_kw_only` permanently for every field declared
    // after it in this class's own body; it is not itself a field.
    let mut next_order = merged.iter().map(|f| f.source_order + 1).max().unwrap_or(0);
    let mut current_kw_only = kw_only_default;
    for decl in own_fields {
        if decl.is_kw_only_sentinel {
            current_kw_only = true;
            continue;
        }

        let mut field = FieldInfo::new(decl.name, next_order);
        next_order += 1;
        field.kw_only = current_kw_only;

        if let Some(ctor_args) = &decl.field_ctor_args {
            if let Some(init) = ctor_args.init {
                field.init = init;
            }
            if let Some(kw_only) = ctor_args.kw_only {
                field.kw_only = kw_only;
            }
            field.has_default = ctor_args.has_default;
            field.default_factory = ctor_args.default_factory;
            field.alias = ctor_args.alias;
        } else {
            field.has_default = decl.has_value;
        }

        if let Some(pos) = merged.iter().position(|f| f.name == field.name) {
            merged[pos] = field;
        } else {
            merged.push(field);
        }
    }

    (merged, has_unknown_ancestor)
}

/// Remove a field from the merged table when a subclass redeclares its
/// name as a plain class variable (spec.md §4.E step 5). `Final`-typed
/// class variables are exempt and stay instance fields.
pub fn exclude_class_variable(fields: &mut Vec<FieldInfo>, name: Atom, is_final: bool) {
    if is_final {
        return;
    }
    fields.retain(|f| f.name != name);
}

/// Constructor synthesis (spec.md §4.E "Constructor synthesis").
pub fn synthesize_constructor(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    class_id: ClassId,
    fields: &[FieldInfo],
    has_unknown_ancestor: bool,
    node: NodeRef,
) -> FunctionDef {
    let object_ty = host.get_object_type(interner);

    if has_unknown_ancestor {
        return permissive_init(object_ty);
    }

    let mut positional: Vec<&FieldInfo> = fields.iter().filter(|f| f.init && !f.kw_only).collect();
    positional.sort_by_key(|f| f.source_order);
    let mut keyword_only: Vec<&FieldInfo> = fields.iter().filter(|f| f.init && f.kw_only).collect();
    keyword_only.sort_by_key(|f| f.source_order);

    let mut seen_default = false;
    for field in &positional {
        if field.has_default {
            seen_default = true;
        } else if seen_default {
            host.report_diagnostic(Diagnostic::new(
                RuleTag::DataClassFieldOrdering,
                format!(
                    "non-default argument at position {} follows a default argument in the synthesized constructor",
                    field.source_order
                ),
                node,
            ));
        }
    }

    let params = field_params(&positional, &keyword_only);

    FunctionDef {
        type_params: interner.class(class_id).type_params.clone(),
        params,
        return_type: TypeId::NONE_SINGLETON,
        flags: FunctionFlags::CONSTRUCTOR | FunctionFlags::SYNTHESIZED,
        bound_class: Some(class_id),
        docstring: None,
        deprecation_message: None,
        scope_id: crate::types::typevar::ScopeId(class_id.0),
    }
}

/// Leading `self` parameter, then the positional fields, then (if any) a
/// keyword-only marker followed by the keyword-only fields. Shared by
/// [`synthesize_constructor`] and [`synthesize_new`] so both members get
/// the exact same field-derived signature shape.
fn field_params(positional: &[&FieldInfo], keyword_only: &[&FieldInfo]) -> Vec<ParamInfo> {
    let mut params = vec![ParamInfo {
        category: ParamCategory::Positional,
        name: Some(Atom::placeholder()),
        declared_type: None,
        has_default: false,
    }];
    for field in positional {
        params.push(ParamInfo::positional(
            field.alias.unwrap_or(field.name),
            field.declared_type.unwrap_or(TypeId::UNKNOWN),
            field.has_default,
        ));
    }
    if !keyword_only.is_empty() {
        params.push(ParamInfo {
            category: ParamCategory::KeywordOnlyMarker,
            name: None,
            declared_type: None,
            has_default: false,
        });
        for field in keyword_only {
            params.push(ParamInfo::positional(
                field.alias.unwrap_or(field.name),
                field.declared_type.unwrap_or(TypeId::UNKNOWN),
                field.has_default,
            ));
        }
    }
    params
}

/// A fresh implicit `Self` type variable, scoped to `class_id`, bound by the
/// class's own bare instance type (spec.md §4.E "Constructor synthesis":
/// `__new__`'s declared return is `Self`). Mirrors the Self-bound-recursion
/// shape `reverse_type_args.rs` already expects when it encounters one.
fn self_type_var(interner: &mut TypeInterner, class_id: ClassId) -> TypeId {
    let bare_instance = interner.intern(crate::types::TypeData::Class(crate::types::ClassRef::bare(
        class_id,
        crate::types::class::ClassForm::Instance,
    )));
    let var_id = interner.define_type_var(TypeVarDef {
        kind: TypeVarKind::Ordinary,
        name: Atom::placeholder(),
        scope_id: crate::types::typevar::ScopeId(class_id.0),
        upper_bound: Some(bare_instance),
        constraints: Vec::new(),
        variance: Variance::Invariant,
        flags: TypeVarFlags::SYNTHESIZED | TypeVarFlags::SELF_TYPE,
        param_spec_default: None,
    });
    interner.intern(crate::types::TypeData::TypeVar(crate::types::TypeVarRef { var_id }))
}

/// `__new__` synthesis (spec.md §4.E "Constructor synthesis": "Also emit a
/// `__new__` with a permissive signature and declared return of `Self`").
/// Shares `__init__`'s field-derived parameter shape in the normal case;
/// when an ancestor's shape is unknown, both members fall back to the
/// `*args, **kwargs` permissive signature.
pub fn synthesize_new(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    class_id: ClassId,
    fields: &[FieldInfo],
    has_unknown_ancestor: bool,
) -> FunctionDef {
    let object_ty = host.get_object_type(interner);
    let self_ty = self_type_var(interner, class_id);

    if has_unknown_ancestor {
        return FunctionDef {
            return_type: self_ty,
            ..permissive_init(object_ty)
        };
    }

    let mut positional: Vec<&FieldInfo> = fields.iter().filter(|f| f.init && !f.kw_only).collect();
    positional.sort_by_key(|f| f.source_order);
    let mut keyword_only: Vec<&FieldInfo> = fields.iter().filter(|f| f.init && f.kw_only).collect();
    keyword_only.sort_by_key(|f| f.source_order);

    FunctionDef {
        type_params: interner.class(class_id).type_params.clone(),
        params: field_params(&positional, &keyword_only),
        return_type: self_ty,
        flags: FunctionFlags::CONSTRUCTOR | FunctionFlags::SYNTHESIZED,
        bound_class: Some(class_id),
        docstring: None,
        deprecation_message: None,
        scope_id: crate::types::typevar::ScopeId(class_id.0),
    }
}

fn permissive_init(object_ty: TypeId) -> FunctionDef {
    FunctionDef {
        type_params: Vec::new(),
        params: vec![
            ParamInfo {
                category: ParamCategory::Positional,
                name: Some(Atom::placeholder()),
                declared_type: None,
                has_default: false,
            },
            ParamInfo {
                category: ParamCategory::ArgsList,
                name: None,
                declared_type: Some(object_ty),
                has_default: false,
            },
            ParamInfo {
                category: ParamCategory::KwArgs,
                name: None,
                declared_type: Some(object_ty),
                has_default: false,
            },
        ],
        return_type: TypeId::NONE_SINGLETON,
        flags: FunctionFlags::CONSTRUCTOR | FunctionFlags::SYNTHESIZED,
        bound_class: None,
        docstring: None,
        deprecation_message: None,
        scope_id: crate::types::typevar::ScopeId(0),
    }
}

/// `__match_args__`: tuple-of-string-literals of the non-excluded field
/// names, not aliases (spec.md §4.E "Support members").
#[must_use]
pub fn match_args_names(fields: &[FieldInfo]) -> Vec<Atom> {
    let mut ordered: Vec<&FieldInfo> = fields.iter().filter(|f| f.init).collect();
    ordered.sort_by_key(|f| f.source_order);
    ordered.into_iter().map(|f| f.name).collect()
}

/// `__eq__(self, x: object) -> bool` (spec.md §4.E). Synthesized unless the
/// data-class decorator explicitly disabled it.
#[must_use]
pub fn synthesize_eq(interner: &mut TypeInterner, host: &mut dyn HostEvaluator, class_id: ClassId) -> FunctionDef {
    let object_ty = host.get_object_type(interner);
    let bool_ty = host.get_built_in_type(interner, "bool").unwrap_or(TypeId::UNKNOWN);
    FunctionDef {
        type_params: Vec::new(),
        params: vec![
            ParamInfo {
                category: ParamCategory::Positional,
                name: Some(Atom::placeholder()),
                declared_type: None,
                has_default: false,
            },
            ParamInfo::positional(Atom::placeholder(), object_ty, false),
        ],
        return_type: bool_ty,
        flags: FunctionFlags::SYNTHESIZED,
        bound_class: Some(class_id),
        docstring: None,
        deprecation_message: None,
        scope_id: crate::types::typevar::ScopeId(class_id.0),
    }
}

/// `__dataclass_fields__: Dict[str, Any]` (spec.md §4.E "Support members").
/// Falls back to `unknown` for either built-in that the host doesn't
/// register, rather than failing synthesis outright.
#[must_use]
pub fn synthesize_dataclass_fields(interner: &mut TypeInterner, host: &mut dyn HostEvaluator) -> TypeId {
    let Some(dict_class_id) = host.get_built_in_type(interner, "dict").and_then(|ty| {
        interner.resolve(ty).as_class().map(|c| c.class_id)
    }) else {
        return TypeId::UNKNOWN;
    };
    let str_ty = host.get_built_in_type(interner, "str").unwrap_or(TypeId::UNKNOWN);
    interner.intern(crate::types::TypeData::Class(crate::types::ClassRef {
        type_arguments: vec![str_ty, TypeId::ANY],
        ..crate::types::ClassRef::bare(dict_class_id, crate::types::class::ClassForm::Instance)
    }))
}

/// `__lt__`/`__le__`/`__gt__`/`__ge__`: parameters are the class itself,
/// return `bool` (spec.md §4.E, only emitted when the ordering flag is
/// set).
#[must_use]
pub fn synthesize_ordering_method(interner: &mut TypeInterner, host: &mut dyn HostEvaluator, class_id: ClassId) -> FunctionDef {
    let self_ty = interner.intern(crate::types::TypeData::Class(crate::types::ClassRef::bare(
        class_id,
        crate::types::class::ClassForm::Instance,
    )));
    let bool_ty = host.get_built_in_type(interner, "bool").unwrap_or(TypeId::UNKNOWN);
    FunctionDef {
        type_params: Vec::new(),
        params: vec![
            ParamInfo {
                category: ParamCategory::Positional,
                name: Some(Atom::placeholder()),
                declared_type: None,
                has_default: false,
            },
            ParamInfo::positional(Atom::placeholder(), self_ty, false),
        ],
        return_type: bool_ty,
        flags: FunctionFlags::SYNTHESIZED,
        bound_class: Some(class_id),
        docstring: None,
        deprecation_message: None,
        scope_id: crate::types::typevar::ScopeId(class_id.0),
    }
}

/// Slots-list synthesis (spec.md §4.E "Support members"): populate from
/// local field names when the generate-slots flag is set and no slots are
/// already declared. Returns `None` (with a diagnostic) if slots were
/// already declared.
pub fn synthesize_slots(
    host: &mut dyn HostEvaluator,
    fields: &[FieldInfo],
    already_declared: bool,
    node: NodeRef,
) -> Option<Vec<Atom>> {
    if already_declared {
        host.report_diagnostic(Diagnostic::new(
            RuleTag::DataClassFieldOrdering,
            "class already declares __slots__; generated slots were not added",
            node,
        ));
        return None;
    }
    let mut names: Vec<&FieldInfo> = fields.iter().collect();
    names.sort_by_key(|f| f.source_order);
    Some(names.into_iter().map(|f| f.name).collect())
}

/// Frozen-inheritance check (spec.md §4.E "Frozen propagation", and the
/// Open Question resolution in spec.md §9: the metaclass-transform
/// anchor's own frozen flag is authoritative and is skipped when walking
/// bases).
pub fn check_frozen_inheritance(
    interner: &TypeInterner,
    host: &mut dyn HostEvaluator,
    class_id: ClassId,
    node: NodeRef,
) -> bool {
    let class = interner.class(class_id);
    if !class.flags.contains(ClassFlags::FROZEN) {
        return true;
    }
    for &ancestor_id in class.mro.iter().skip(1) {
        let ancestor = interner.class(ancestor_id);
        if ancestor.flags.contains(ClassFlags::METACLASS_TRANSFORM_ANCHOR) {
            continue;
        }
        if ancestor.flags.contains(ClassFlags::DATA_CLASS) && !ancestor.flags.contains(ClassFlags::FROZEN) {
            tracing::debug!(
                "frozen data-class {:?} rejected non-frozen ancestor {:?}",
                class_id,
                ancestor_id
            );
            host.report_diagnostic(Diagnostic::new(
                RuleTag::DataClassFrozenInheritance,
                "frozen data-class cannot derive from non-frozen data-class",
                node,
            ));
            return false;
        }
    }
    true
}

/// NamedTuple base re-specialization (spec.md §4.E "Constructor synthesis":
/// "if the class derives from a named-tuple base class, re-specialize that
/// base with the synthesized field types"). Builds the per-element type
/// list a `NamedTuple` ancestor's `ClassRef` should carry once this class's
/// own fields have resolved types, in field declaration order.
pub fn respecialize_named_tuple_base(
    interner: &TypeInterner,
    host: &dyn HostEvaluator,
    class_id: ClassId,
    fields: &[FieldInfo],
) -> Option<(ClassId, Vec<crate::types::class::TupleElement>)> {
    let class = interner.class(class_id);
    let named_tuple_base = class
        .mro
        .iter()
        .skip(1)
        .find(|&&ancestor_id| host.is_special_form_class(interner, ancestor_id))?;

    let mut ordered: Vec<&FieldInfo> = fields.iter().collect();
    ordered.sort_by_key(|f| f.source_order);
    let elements = ordered
        .into_iter()
        .map(|f| crate::types::class::TupleElement {
            type_id: f.declared_type.unwrap_or(TypeId::UNKNOWN),
            unbounded: false,
        })
        .collect();
    Some((*named_tuple_base, elements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomInterner;
    use crate::types::class::ClassDef;

    #[test]
    fn collect_fields_merges_ancestor_then_own_in_order() {
        let mut interner = TypeInterner::new();
        let atoms = AtomInterner::new();

        let mut base = ClassDef::new(atoms.intern("Base"), vec![]);
        base.flags = ClassFlags::DATA_CLASS;
        let mut base_field = FieldInfo::new(atoms.intern("a"), 0);
        base_field.declared_type = Some(TypeId::UNKNOWN);
        base.fields = vec![base_field];
        let base_id = interner.define_class(base);

        let derived = ClassDef::new(atoms.intern("Derived"), vec![ClassId(0), base_id]);
        let derived_id = interner.define_class(derived);
        interner.class_mut(derived_id).mro = vec![derived_id, base_id];

        let own = vec![FieldDecl {
            name: atoms.intern("b"),
            has_value: true,
            field_ctor_args: None,
            is_kw_only_sentinel: false,
        }];
        let (fields, unknown_ancestor) = collect_fields(&interner, derived_id, &own, false);
        assert!(!unknown_ancestor);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, atoms.intern("a"));
        assert_eq!(fields[1].name, atoms.intern("b"));
        assert!(fields[1].has_default);
    }

    #[test]
    fn match_args_excludes_non_init_fields() {
        let atoms = AtomInterner::new();
        let mut a = FieldInfo::new(atoms.intern("a"), 0);
        a.init = false;
        let b = FieldInfo::new(atoms.intern("b"), 1);
        let names = match_args_names(&[a, b]);
        assert_eq!(names, vec![atoms.intern("b")]);
    }
}
