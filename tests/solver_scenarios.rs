//! Constraint solver scenarios (component B), covering the concrete
//! scenarios and a sample of the numbered invariants from spec.md §8.

mod common;

use typecore::{
    assign, AssignFlags, ConstraintTracker, ScopeId, TypeData, TypeId, TypeVarDef, TypeVarFlags, TypeVarKind, Variance,
};

use common::{node, Fixture, MockHost};

fn ordinary_type_var(scope: ScopeId) -> TypeVarDef {
    TypeVarDef {
        kind: TypeVarKind::Ordinary,
        name: typecore::Atom::placeholder(),
        scope_id: scope,
        upper_bound: None,
        constraints: Vec::new(),
        variance: Variance::Covariant,
        flags: TypeVarFlags::empty(),
        param_spec_default: None,
    }
}

fn constrained_type_var(scope: ScopeId, constraints: Vec<TypeId>) -> TypeVarDef {
    TypeVarDef {
        constraints,
        ..ordinary_type_var(scope)
    }
}

#[test]
fn solver_widening_produces_int_or_str() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);
    let scope = ScopeId(1);
    let var_id = fixture.interner.define_type_var(ordinary_type_var(scope));
    let mut tracker = ConstraintTracker::new(vec![scope]);

    let int_ty = fixture.class_ty(fixture.int_id);
    let str_ty = fixture.class_ty(fixture.str_id);

    assert!(assign(
        &mut fixture.interner,
        &mut host,
        &mut tracker,
        var_id,
        int_ty,
        AssignFlags::empty(),
        node(),
        0,
    ));
    assert!(assign(
        &mut fixture.interner,
        &mut host,
        &mut tracker,
        var_id,
        str_ty,
        AssignFlags::empty(),
        node(),
        0,
    ));

    let lower = tracker.constraint_set(var_id).unwrap().lower_bound.unwrap();
    let expected = fixture.interner.union([int_ty, str_ty]);
    assert_eq!(lower, expected);
}

#[test]
fn constrained_type_var_rejects_incompatible_source() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);
    let scope = ScopeId(2);
    let str_ty = fixture.class_ty(fixture.str_id);
    let bytes_ty = fixture.class_ty(fixture.bytes_id);
    let var_id = fixture
        .interner
        .define_type_var(constrained_type_var(scope, vec![str_ty, bytes_ty]));
    let mut tracker = ConstraintTracker::new(vec![scope]);

    let int_ty = fixture.class_ty(fixture.int_id);
    let ok = assign(
        &mut fixture.interner,
        &mut host,
        &mut tracker,
        var_id,
        int_ty,
        AssignFlags::empty(),
        node(),
        0,
    );
    assert!(!ok);
    assert!(tracker.constraint_set(var_id).is_none());
}

#[test]
fn constrained_type_var_rejects_union_spanning_two_constraints() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);
    let scope = ScopeId(3);
    let str_ty = fixture.class_ty(fixture.str_id);
    let bytes_ty = fixture.class_ty(fixture.bytes_id);
    let var_id = fixture
        .interner
        .define_type_var(constrained_type_var(scope, vec![str_ty, bytes_ty]));
    let mut tracker = ConstraintTracker::new(vec![scope]);

    let union_ty = fixture.interner.union([str_ty, bytes_ty]);
    let ok = assign(
        &mut fixture.interner,
        &mut host,
        &mut tracker,
        var_id,
        union_ty,
        AssignFlags::empty(),
        node(),
        0,
    );
    assert!(!ok);
}

#[test]
fn reflexive_assignment_succeeds_without_diagnostics() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);
    let scope = ScopeId(4);
    let var_id = fixture.interner.define_type_var(ordinary_type_var(scope));
    let mut tracker = ConstraintTracker::new(vec![scope]);

    let int_ty = fixture.class_ty(fixture.int_id);
    assert!(assign(
        &mut fixture.interner,
        &mut host,
        &mut tracker,
        var_id,
        int_ty,
        AssignFlags::empty(),
        node(),
        0,
    ));
    assert!(host.diagnostics.borrow().is_empty());
}

#[test]
fn never_is_always_assignable_in_covariant_position() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);
    let scope = ScopeId(5);
    let var_id = fixture.interner.define_type_var(ordinary_type_var(scope));
    let mut tracker = ConstraintTracker::new(vec![scope]);

    assert!(assign(
        &mut fixture.interner,
        &mut host,
        &mut tracker,
        var_id,
        TypeId::NEVER,
        AssignFlags::empty(),
        node(),
        0,
    ));
}

#[test]
fn any_source_is_absorbed_without_mutating_bounds() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);
    let scope = ScopeId(6);
    let var_id = fixture.interner.define_type_var(ordinary_type_var(scope));
    let mut tracker = ConstraintTracker::new(vec![scope]);

    assert!(assign(
        &mut fixture.interner,
        &mut host,
        &mut tracker,
        var_id,
        TypeId::ANY,
        AssignFlags::empty(),
        node(),
        0,
    ));
    assert!(tracker.constraint_set(var_id).is_none());
}

#[test]
fn lower_bound_union_never_exceeds_the_cap() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);
    let scope = ScopeId(7);
    // No declared upper bound: once the union would exceed the cap, the
    // raw union itself collapses to `unknown` inside `TypeInterner::union`,
    // so the committed lower bound can never carry more than 64 subtypes.
    let var_id = fixture.interner.define_type_var(ordinary_type_var(scope));
    let mut tracker = ConstraintTracker::new(vec![scope]);

    for i in 0..80 {
        let lit = fixture.int_literal(i);
        assert!(assign(
            &mut fixture.interner,
            &mut host,
            &mut tracker,
            var_id,
            lit,
            AssignFlags::empty(),
            node(),
            0,
        ));
    }

    let lower = tracker.constraint_set(var_id).unwrap().lower_bound.unwrap();
    match fixture.interner.resolve(lower) {
        TypeData::Union(u) => assert!(u.members.len() <= 64),
        TypeData::Unknown => {}
        other => panic!("unexpected lower bound shape: {other:?}"),
    }
}

#[test]
fn foreign_scope_validates_without_mutating_tracker() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);
    let owned_scope = ScopeId(8);
    let foreign_scope = ScopeId(9);
    let object_ty = fixture.class_ty(fixture.object_id);
    let mut def = ordinary_type_var(foreign_scope);
    def.upper_bound = Some(object_ty);
    let var_id = fixture.interner.define_type_var(def);
    let mut tracker = ConstraintTracker::new(vec![owned_scope]);

    let int_ty = fixture.class_ty(fixture.int_id);
    assert!(assign(
        &mut fixture.interner,
        &mut host,
        &mut tracker,
        var_id,
        int_ty,
        AssignFlags::empty(),
        node(),
        0,
    ));
    assert!(tracker.constraint_set(var_id).is_none());
}
