//! Shared test fixtures: a minimal [`HostEvaluator`] and a small class
//! hierarchy (`object` <- `int`/`str`/`bytes`/`bool`), enough to exercise the
//! solver, operator evaluator, and class-synthesis engine without pulling in
//! a real host integration.

use std::cell::RefCell;
use std::collections::HashMap;

use typecore::{
    Atom, AtomInterner, CallArgsOutcome, ClassDef, ClassForm, ClassId, ClassRef, Diagnostic, ExecutionEnvironment,
    ExprRef, HostEvaluator, NodeRef, Platform, TypeData, TypeId, TypeInterner, Variance,
};

pub struct Fixture {
    pub interner: TypeInterner,
    pub atoms: AtomInterner,
    pub object_id: ClassId,
    pub int_id: ClassId,
    pub str_id: ClassId,
    pub bytes_id: ClassId,
    pub bool_id: ClassId,
    pub dict_id: ClassId,
}

impl Fixture {
    pub fn new() -> Self {
        let atoms = AtomInterner::new();
        let mut interner = TypeInterner::new();

        let object_id = interner.define_class(ClassDef::new(atoms.intern("object"), vec![]));
        interner.class_mut(object_id).mro = vec![object_id];

        let mut define_scalar = |interner: &mut TypeInterner, name: &str| -> ClassId {
            let id = interner.define_class(ClassDef::new(atoms.intern(name), vec![object_id]));
            interner.class_mut(id).mro = vec![id, object_id];
            id
        };
        let int_id = define_scalar(&mut interner, "int");
        let str_id = define_scalar(&mut interner, "str");
        let bytes_id = define_scalar(&mut interner, "bytes");
        let bool_id = define_scalar(&mut interner, "bool");
        let dict_id = define_scalar(&mut interner, "dict");

        Self {
            interner,
            atoms,
            object_id,
            int_id,
            str_id,
            bytes_id,
            bool_id,
            dict_id,
        }
    }

    pub fn class_ty(&mut self, class_id: ClassId) -> TypeId {
        self.interner.intern(TypeData::Class(ClassRef::bare(class_id, ClassForm::Instance)))
    }

    pub fn int_literal(&mut self, value: i64) -> TypeId {
        self.interner.intern(TypeData::Class(ClassRef {
            class_id: self.int_id,
            form: ClassForm::Instance,
            type_arguments: Vec::new(),
            literal: Some(typecore::LiteralValue::Int(typecore::IntLiteral::Small(value))),
            tuple_type_arguments: None,
        }))
    }
}

pub struct MockHost {
    pub env: ExecutionEnvironment,
    pub diagnostics: RefCell<Vec<Diagnostic>>,
    pub builtins: HashMap<&'static str, ClassId>,
    pub object_id: ClassId,
    pub int_id: ClassId,
}

const INT_ARITHMETIC_MAGIC: &[&str] = &[
    "__add__", "__radd__", "__sub__", "__rsub__", "__mul__", "__rmul__", "__floordiv__", "__rfloordiv__",
];

impl MockHost {
    pub fn new(fixture: &Fixture) -> Self {
        let mut builtins = HashMap::new();
        builtins.insert("int", fixture.int_id);
        builtins.insert("str", fixture.str_id);
        builtins.insert("bytes", fixture.bytes_id);
        builtins.insert("bool", fixture.bool_id);
        builtins.insert("object", fixture.object_id);
        builtins.insert("dict", fixture.dict_id);
        Self {
            env: ExecutionEnvironment::new(3, 12, Platform::Linux),
            diagnostics: RefCell::new(Vec::new()),
            builtins,
            object_id: fixture.object_id,
            int_id: fixture.int_id,
        }
    }

    fn assignable(&self, interner: &TypeInterner, dest: TypeId, src: TypeId) -> bool {
        if dest == src {
            return true;
        }
        if matches!(interner.resolve(dest), TypeData::Any | TypeData::Unknown) {
            return true;
        }
        if matches!(interner.resolve(src), TypeData::Any | TypeData::Unknown | TypeData::Never) {
            return true;
        }
        if let TypeData::Union(u) = interner.resolve(dest) {
            let members = u.members.clone();
            if members.iter().any(|&m| self.assignable(interner, m, src)) {
                return true;
            }
        }
        if let TypeData::Union(u) = interner.resolve(src) {
            let members = u.members.clone();
            return members.iter().all(|&m| self.assignable(interner, dest, m));
        }
        if let (Some(d), Some(s)) = (interner.resolve(dest).as_class(), interner.resolve(src).as_class()) {
            if d.class_id == s.class_id {
                // A literal destination only accepts the identical literal;
                // a bare (non-literal) destination accepts any instance.
                return match &d.literal {
                    Some(_) => d.literal == s.literal,
                    None => true,
                };
            }
            return interner.class(s.class_id).mro.contains(&d.class_id) && d.literal.is_none();
        }
        false
    }
}

impl HostEvaluator for MockHost {
    fn assign_type(&mut self, interner: &mut TypeInterner, destination: TypeId, source: TypeId, _node: NodeRef) -> bool {
        self.assignable(interner, destination, source)
    }

    fn make_top_level_type_vars_concrete(&self, _interner: &mut TypeInterner, ty: TypeId) -> TypeId {
        ty
    }

    fn strip_literal_value(&self, interner: &mut TypeInterner, ty: TypeId) -> TypeId {
        match interner.resolve(ty).as_class().cloned() {
            Some(class_ref) if class_ref.literal.is_some() => interner.intern(TypeData::Class(ClassRef {
                literal: None,
                ..class_ref
            })),
            _ => ty,
        }
    }

    fn print_type(&self, _interner: &TypeInterner, ty: TypeId) -> String {
        format!("{ty:?}")
    }

    fn get_built_in_object(&self, interner: &mut TypeInterner) -> TypeId {
        interner.intern(TypeData::Class(ClassRef::bare(self.object_id, ClassForm::Instance)))
    }

    fn get_built_in_type(&self, interner: &mut TypeInterner, name: &str) -> Option<TypeId> {
        self.builtins
            .get(name)
            .map(|&id| interner.intern(TypeData::Class(ClassRef::bare(id, ClassForm::Instance))))
    }

    fn get_tuple_class_type(&self, interner: &mut TypeInterner) -> TypeId {
        self.get_built_in_object(interner)
    }

    fn get_union_class_type(&self, interner: &mut TypeInterner) -> TypeId {
        self.get_built_in_object(interner)
    }

    fn get_type_of_expression(&mut self, _interner: &mut TypeInterner, _expr: ExprRef) -> TypeId {
        TypeId::UNKNOWN
    }

    fn get_type_of_annotation(&mut self, _interner: &mut TypeInterner, _expr: ExprRef) -> TypeId {
        TypeId::UNKNOWN
    }

    fn get_type_of_magic_method_call(
        &mut self,
        interner: &mut TypeInterner,
        receiver: TypeId,
        method_name: &str,
        _args: &[TypeId],
        _node: NodeRef,
    ) -> Option<TypeId> {
        let receiver_is_int = interner.resolve(receiver).as_class().map(|c| c.class_id) == Some(self.int_id);
        if receiver_is_int && INT_ARITHMETIC_MAGIC.contains(&method_name) {
            return Some(interner.intern(TypeData::Class(ClassRef::bare(self.int_id, ClassForm::Instance))));
        }
        None
    }

    fn get_type_of_iterator(&mut self, _interner: &mut TypeInterner, _ty: TypeId) -> Option<TypeId> {
        None
    }

    fn validate_call_args(
        &mut self,
        _interner: &mut TypeInterner,
        _callee: TypeId,
        _args: &[TypeId],
        _node: NodeRef,
    ) -> CallArgsOutcome {
        CallArgsOutcome::Mismatched
    }

    fn look_up_symbol_recursive(&self, _interner: &TypeInterner, _name: &str) -> Option<TypeId> {
        None
    }

    fn get_bound_magic_method(&mut self, _interner: &mut TypeInterner, _class_id: ClassId, _method_name: &str) -> Option<TypeId> {
        None
    }

    fn infer_variance_for_class(&mut self, _interner: &mut TypeInterner, _class_id: ClassId, _param_index: usize) -> Variance {
        Variance::Invariant
    }

    fn report_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    fn is_special_form_class(&self, _interner: &TypeInterner, _class_id: ClassId) -> bool {
        false
    }

    fn can_be_truthy(&self, _interner: &TypeInterner, _ty: TypeId) -> bool {
        true
    }

    fn can_be_falsy(&self, _interner: &TypeInterner, _ty: TypeId) -> bool {
        true
    }

    fn remove_truthiness_from_type(&mut self, _interner: &mut TypeInterner, ty: TypeId) -> TypeId {
        ty
    }

    fn remove_falsiness_from_type(&mut self, _interner: &mut TypeInterner, ty: TypeId) -> TypeId {
        ty
    }

    fn execution_environment(&self) -> &ExecutionEnvironment {
        &self.env
    }
}

pub fn node() -> NodeRef {
    NodeRef(0)
}

#[allow(dead_code)]
pub fn atom(fixture: &Fixture, text: &str) -> Atom {
    fixture.atoms.intern(text)
}
