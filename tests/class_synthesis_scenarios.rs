//! Class-synthesis engine scenarios (component E), spec.md §8 scenarios 4-5.

mod common;

use typecore::{
    check_frozen_inheritance, collect_fields, match_args_names, synthesize_constructor, synthesize_dataclass_fields,
    synthesize_eq, synthesize_new, ClassDef, ClassFlags, FieldDecl, ParamCategory, TypeData,
};

use common::{node, Fixture, MockHost};

#[test]
fn data_class_synthesis_matches_declared_field_order() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);

    let name = fixture.atoms.intern("Point");
    let class = ClassDef::new(name, vec![]);
    let class_id = fixture.interner.define_class(class);
    fixture.interner.class_mut(class_id).mro = vec![class_id, fixture.object_id];
    fixture.interner.class_mut(class_id).flags = ClassFlags::DATA_CLASS;

    let a = fixture.atoms.intern("a");
    let b = fixture.atoms.intern("b");
    let c = fixture.atoms.intern("c");
    let own_fields = vec![
        FieldDecl { name: a, has_value: false, field_ctor_args: None, is_kw_only_sentinel: false },
        FieldDecl { name: b, has_value: true, field_ctor_args: None, is_kw_only_sentinel: false },
        FieldDecl { name: c, has_value: true, field_ctor_args: None, is_kw_only_sentinel: false },
    ];

    let (mut fields, has_unknown_ancestor) = collect_fields(&fixture.interner, class_id, &own_fields, false);
    assert!(!has_unknown_ancestor);
    assert_eq!(fields.len(), 3);

    let int_ty = fixture.class_ty(fixture.int_id);
    let str_ty = fixture.class_ty(fixture.str_id);
    fields[0].declared_type = Some(int_ty);
    fields[1].declared_type = Some(str_ty);
    fields[2].declared_type = Some(int_ty);

    let ctor = synthesize_constructor(&mut fixture.interner, &mut host, class_id, &fields, has_unknown_ancestor, node());
    assert!(host.diagnostics.borrow().is_empty());

    // self, a, b, c — no keyword-only separator since nothing is kw-only.
    assert_eq!(ctor.params.len(), 4);
    assert!(!ctor.params[1].has_default);
    assert!(ctor.params[2].has_default);
    assert!(ctor.params[3].has_default);
    assert_eq!(ctor.params[1].declared_type, Some(int_ty));
    assert_eq!(ctor.params[2].declared_type, Some(str_ty));
    assert_eq!(ctor.params[3].declared_type, Some(int_ty));
    assert_eq!(ctor.return_type, typecore::TypeId::NONE_SINGLETON);

    let names = match_args_names(&fields);
    assert_eq!(names, vec![a, b, c]);

    let eq = synthesize_eq(&mut fixture.interner, &mut host, class_id);
    let bool_ty = fixture.class_ty(fixture.bool_id);
    assert_eq!(eq.return_type, bool_ty);
    assert_eq!(eq.params.len(), 2);
    assert_eq!(eq.params[1].declared_type, Some(fixture.class_ty(fixture.object_id)));
}

#[test]
fn non_default_field_after_default_is_a_diagnostic() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);

    let name = fixture.atoms.intern("Bad");
    let class = ClassDef::new(name, vec![]);
    let class_id = fixture.interner.define_class(class);
    fixture.interner.class_mut(class_id).mro = vec![class_id, fixture.object_id];
    fixture.interner.class_mut(class_id).flags = ClassFlags::DATA_CLASS;

    let a = fixture.atoms.intern("a");
    let b = fixture.atoms.intern("b");
    let own_fields = vec![
        FieldDecl { name: a, has_value: true, field_ctor_args: None, is_kw_only_sentinel: false },
        FieldDecl { name: b, has_value: false, field_ctor_args: None, is_kw_only_sentinel: false },
    ];
    let (mut fields, has_unknown_ancestor) = collect_fields(&fixture.interner, class_id, &own_fields, false);
    let int_ty = fixture.class_ty(fixture.int_id);
    fields[0].declared_type = Some(int_ty);
    fields[1].declared_type = Some(int_ty);

    synthesize_constructor(&mut fixture.interner, &mut host, class_id, &fields, has_unknown_ancestor, node());
    assert_eq!(host.diagnostics.borrow().len(), 1);
}

#[test]
fn frozen_derived_from_non_frozen_data_class_is_a_diagnostic() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);

    let base_name = fixture.atoms.intern("Base");
    let mut base = ClassDef::new(base_name, vec![]);
    base.flags = ClassFlags::DATA_CLASS;
    let base_id = fixture.interner.define_class(base);
    fixture.interner.class_mut(base_id).mro = vec![base_id, fixture.object_id];

    let derived_name = fixture.atoms.intern("Derived");
    let derived = ClassDef::new(derived_name, vec![base_id]);
    let derived_id = fixture.interner.define_class(derived);
    fixture.interner.class_mut(derived_id).mro = vec![derived_id, base_id, fixture.object_id];
    fixture.interner.class_mut(derived_id).flags = ClassFlags::DATA_CLASS | ClassFlags::FROZEN;

    let ok = check_frozen_inheritance(&fixture.interner, &mut host, derived_id, node());
    assert!(!ok);
    assert_eq!(host.diagnostics.borrow().len(), 1);
    // The diagnostic does not itself unset the flag — the derived class
    // stays marked frozen.
    assert!(fixture.interner.class(derived_id).flags.contains(ClassFlags::FROZEN));
}

#[test]
fn frozen_inheriting_from_frozen_base_is_clean() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);

    let base_name = fixture.atoms.intern("Base");
    let mut base = ClassDef::new(base_name, vec![]);
    base.flags = ClassFlags::DATA_CLASS | ClassFlags::FROZEN;
    let base_id = fixture.interner.define_class(base);
    fixture.interner.class_mut(base_id).mro = vec![base_id, fixture.object_id];

    let derived_name = fixture.atoms.intern("Derived");
    let derived = ClassDef::new(derived_name, vec![base_id]);
    let derived_id = fixture.interner.define_class(derived);
    fixture.interner.class_mut(derived_id).mro = vec![derived_id, base_id, fixture.object_id];
    fixture.interner.class_mut(derived_id).flags = ClassFlags::DATA_CLASS | ClassFlags::FROZEN;

    assert!(check_frozen_inheritance(&fixture.interner, &mut host, derived_id, node()));
    assert!(host.diagnostics.borrow().is_empty());
}

#[test]
fn synthesized_new_mirrors_the_constructor_and_returns_self() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);

    let name = fixture.atoms.intern("Point");
    let class = ClassDef::new(name, vec![]);
    let class_id = fixture.interner.define_class(class);
    fixture.interner.class_mut(class_id).mro = vec![class_id, fixture.object_id];
    fixture.interner.class_mut(class_id).flags = ClassFlags::DATA_CLASS;

    let a = fixture.atoms.intern("a");
    let own_fields = vec![FieldDecl {
        name: a,
        has_value: false,
        field_ctor_args: None,
        is_kw_only_sentinel: false,
    }];
    let (mut fields, has_unknown_ancestor) = collect_fields(&fixture.interner, class_id, &own_fields, false);
    let int_ty = fixture.class_ty(fixture.int_id);
    fields[0].declared_type = Some(int_ty);

    let new_fn = synthesize_new(&mut fixture.interner, &mut host, class_id, &fields, has_unknown_ancestor);
    assert_eq!(new_fn.params.len(), 2);
    assert_eq!(new_fn.params[1].declared_type, Some(int_ty));
    assert!(matches!(
        fixture.interner.resolve(new_fn.return_type),
        TypeData::TypeVar(_)
    ));
}

#[test]
fn synthesized_new_with_unknown_ancestor_accepts_any_args() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);

    let name = fixture.atoms.intern("Point");
    let class = ClassDef::new(name, vec![]);
    let class_id = fixture.interner.define_class(class);
    fixture.interner.class_mut(class_id).mro = vec![class_id, fixture.object_id];

    let new_fn = synthesize_new(&mut fixture.interner, &mut host, class_id, &[], true);
    assert_eq!(new_fn.params.len(), 3);
    assert_eq!(new_fn.params[1].category, ParamCategory::ArgsList);
    assert_eq!(new_fn.params[2].category, ParamCategory::KwArgs);
    assert!(matches!(
        fixture.interner.resolve(new_fn.return_type),
        TypeData::TypeVar(_)
    ));
}

#[test]
fn dataclass_fields_attribute_is_a_str_to_any_dict() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);

    let ty = synthesize_dataclass_fields(&mut fixture.interner, &mut host);
    let class_ref = fixture.interner.resolve(ty).as_class().expect("dict instance");
    assert_eq!(class_ref.class_id, fixture.dict_id);
    assert_eq!(class_ref.type_arguments.len(), 2);
    assert_eq!(class_ref.type_arguments[0], fixture.class_ty(fixture.str_id));
}
