//! Operator evaluator scenario (component D), spec.md §8 scenario 6.

mod common;

use num_bigint::BigInt;
use typecore::{type_of_binary, BinaryOp, ClassForm, OperatorContext, TypeData};

use common::{node, Fixture, MockHost};

#[test]
fn literal_folding_aborts_past_the_cross_product_cap_and_falls_back_to_int() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);

    let left_members: Vec<_> = (0..32).map(|i| fixture.int_literal(i)).collect();
    let right_members: Vec<_> = (0..3).map(|i| fixture.int_literal(100 + i)).collect();
    let left = fixture.interner.union(left_members);
    let right = fixture.interner.union(right_members);

    let ctx = OperatorContext {
        env: &host.env.clone(),
        inside_loop_or_closure: false,
        union_syntax_min_version: BigInt::from(0),
        atoms: &fixture.atoms,
    };
    let result = type_of_binary(&mut fixture.interner, &mut host, BinaryOp::Add, left, right, ctx, node());

    let class_ref = fixture.interner.resolve(result).as_class().expect("result should be a class type");
    assert_eq!(class_ref.class_id, fixture.int_id);
    assert_eq!(class_ref.form, ClassForm::Instance);
    assert!(class_ref.literal.is_none(), "cap overflow must fall back to plain int, not a literal");
    assert!(host.diagnostics.borrow().is_empty());
}

#[test]
fn literal_folding_within_the_cap_computes_a_precise_literal() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);

    let left = fixture.int_literal(2);
    let right = fixture.int_literal(3);
    let ctx = OperatorContext {
        env: &host.env.clone(),
        inside_loop_or_closure: false,
        union_syntax_min_version: BigInt::from(0),
        atoms: &fixture.atoms,
    };
    let result = type_of_binary(&mut fixture.interner, &mut host, BinaryOp::Add, left, right, ctx, node());

    let class_ref = fixture.interner.resolve(result).as_class().expect("result should be a class type");
    assert_eq!(class_ref.class_id, fixture.int_id);
    match &class_ref.literal {
        Some(typecore::LiteralValue::Int(i)) => assert_eq!(i.to_bigint(), BigInt::from(5)),
        other => panic!("expected a folded int literal, got {other:?}"),
    }
}

#[test]
fn never_propagates_through_binary_operators() {
    let mut fixture = Fixture::new();
    let mut host = MockHost::new(&fixture);

    let int_ty = fixture.class_ty(fixture.int_id);
    let ctx = OperatorContext {
        env: &host.env.clone(),
        inside_loop_or_closure: false,
        union_syntax_min_version: BigInt::from(0),
        atoms: &fixture.atoms,
    };
    let result = type_of_binary(
        &mut fixture.interner,
        &mut host,
        BinaryOp::Add,
        typecore::TypeId::NEVER,
        int_ty,
        ctx,
        node(),
    );
    assert!(matches!(fixture.interner.resolve(result), TypeData::Never));
}
