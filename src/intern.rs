//! Content-addressed type interning.
//!
//! Grounded on `tsz-solver`'s id-table pattern (see `tests/intern_tests.rs`):
//! every distinct [`TypeData`] value is stored exactly once and handed out
//! as a small `Copy` [`TypeId`]. Side tables for class/function/type-variable
//! *definitions* are keyed by their own id newtypes (`ClassId`, `TypeVarId`)
//! and are append-only; the content-addressed table is for the algebra
//! values themselves ([`TypeData`]), which recur constantly and benefit from
//! deduplication.

use rustc_hash::FxHashMap;

use crate::limits::MAX_CONSTRAINT_UNION_SUBTYPES;
use crate::types::class::ClassDef;
use crate::types::function::FunctionDef;
use crate::types::typevar::TypeVarDef;
use crate::types::{TypeData, UnionRef};

/// Handle into a [`TypeInterner`]'s content-addressed type table. Cheap to
/// copy and compare; never dereferenced directly, always through the
/// interner that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    const ANY_INDEX: u32 = 0;
    const UNKNOWN_INDEX: u32 = 1;
    const NEVER_INDEX: u32 = 2;
    const NONE_SINGLETON_INDEX: u32 = 3;
    const NONE_TYPE_INDEX: u32 = 4;

    pub const ANY: TypeId = TypeId(Self::ANY_INDEX);
    pub const UNKNOWN: TypeId = TypeId(Self::UNKNOWN_INDEX);
    pub const NEVER: TypeId = TypeId(Self::NEVER_INDEX);
    pub const NONE_SINGLETON: TypeId = TypeId(Self::NONE_SINGLETON_INDEX);
    pub const NONE_TYPE: TypeId = TypeId(Self::NONE_TYPE_INDEX);
}

/// The type table plus the class/function/type-variable definition side
/// tables (spec.md §5: "the core holds no global mutable state other than
/// the interner the caller owns"). A `TypeInterner` is owned by the host
/// integration, not by this crate's statics.
#[derive(Default)]
pub struct TypeInterner {
    types: Vec<TypeData>,
    lookup: FxHashMap<TypeData, TypeId>,
    classes: Vec<ClassDef>,
    functions: Vec<FunctionDef>,
    type_vars: Vec<TypeVarDef>,
}

impl TypeInterner {
    #[must_use]
    pub fn new() -> Self {
        let mut interner = Self {
            types: Vec::new(),
            lookup: FxHashMap::default(),
            classes: Vec::new(),
            functions: Vec::new(),
            type_vars: Vec::new(),
        };
        // Reserve the well-known indices in the fixed order `TypeId`'s
        // associated constants expect.
        interner.insert(TypeData::Any);
        interner.insert(TypeData::Unknown);
        interner.insert(TypeData::Never);
        interner.insert(TypeData::NoneSingleton);
        interner.insert(TypeData::NoneType);
        interner
    }

    fn insert(&mut self, data: TypeData) -> TypeId {
        if let Some(existing) = self.lookup.get(&data) {
            return *existing;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(data.clone());
        self.lookup.insert(data, id);
        id
    }

    /// Intern an arbitrary [`TypeData`] value, deduplicating against any
    /// structurally equal value already present.
    pub fn intern(&mut self, data: TypeData) -> TypeId {
        match &data {
            TypeData::Any => TypeId::ANY,
            TypeData::Unknown => TypeId::UNKNOWN,
            TypeData::Never => TypeId::NEVER,
            TypeData::NoneSingleton => TypeId::NONE_SINGLETON,
            TypeData::NoneType => TypeId::NONE_TYPE,
            _ => self.insert(data),
        }
    }

    #[must_use]
    pub fn resolve(&self, id: TypeId) -> &TypeData {
        &self.types[id.0 as usize]
    }

    /// Construct a normalized union over `members`, enforcing every
    /// invariant from spec.md §3/§8 invariant 5:
    ///
    /// - `any` anywhere makes the whole union `any`.
    /// - `unknown` anywhere (with no `any` present) makes the whole union
    ///   `unknown`.
    /// - `never` members are dropped (they contribute nothing).
    /// - an empty result collapses to `never`.
    /// - nested unions are flattened before deduplication.
    /// - a single remaining member collapses to that member, not a
    ///   one-element `Union`.
    /// - members are deduplicated and sorted by `TypeId` for deterministic
    ///   traversal (spec.md §5).
    /// - more than [`MAX_CONSTRAINT_UNION_SUBTYPES`] distinct members after
    ///   dedup collapses to `unknown` rather than growing unbounded.
    pub fn union(&mut self, members: impl IntoIterator<Item = TypeId>) -> TypeId {
        let mut flat = Vec::new();
        let mut saw_any = false;
        let mut saw_unknown = false;

        let mut stack: Vec<TypeId> = members.into_iter().collect();
        while let Some(id) = stack.pop() {
            match self.resolve(id) {
                TypeData::Any => saw_any = true,
                TypeData::Unknown => saw_unknown = true,
                TypeData::Never => {}
                TypeData::Union(u) => stack.extend(u.members.iter().copied()),
                _ => flat.push(id),
            }
        }

        if saw_any {
            return TypeId::ANY;
        }
        if saw_unknown {
            return TypeId::UNKNOWN;
        }

        flat.sort_unstable();
        flat.dedup();

        if flat.is_empty() {
            return TypeId::NEVER;
        }
        if flat.len() == 1 {
            return flat[0];
        }
        if flat.len() > MAX_CONSTRAINT_UNION_SUBTYPES {
            return TypeId::UNKNOWN;
        }

        self.insert(TypeData::Union(UnionRef { members: flat }))
    }

    // -- class side table ------------------------------------------------

    pub fn define_class(&mut self, def: ClassDef) -> crate::types::class::ClassId {
        let id = crate::types::class::ClassId(self.classes.len() as u32);
        self.classes.push(def);
        id
    }

    #[must_use]
    pub fn class(&self, id: crate::types::class::ClassId) -> &ClassDef {
        &self.classes[id.0 as usize]
    }

    pub fn class_mut(&mut self, id: crate::types::class::ClassId) -> &mut ClassDef {
        &mut self.classes[id.0 as usize]
    }

    // -- type-variable side table -----------------------------------------

    pub fn define_type_var(&mut self, def: TypeVarDef) -> crate::types::typevar::TypeVarId {
        let id = crate::types::typevar::TypeVarId(self.type_vars.len() as u32);
        self.type_vars.push(def);
        id
    }

    #[must_use]
    pub fn type_var(&self, id: crate::types::typevar::TypeVarId) -> &TypeVarDef {
        &self.type_vars[id.0 as usize]
    }

    // -- function side table (for Overloaded entries, which reference
    //    sibling function TypeIds directly rather than indices here) -------

    pub fn define_function(&mut self, def: FunctionDef) -> usize {
        self.functions.push(def);
        self.functions.len() - 1
    }

    #[must_use]
    pub fn function(&self, index: usize) -> &FunctionDef {
        &self.functions[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::class::{ClassForm, ClassId};
    use crate::types::literal::{IntLiteral, LiteralValue};
    use crate::types::ClassRef;

    fn class_ty(interner: &mut TypeInterner, class_id: ClassId) -> TypeId {
        interner.intern(TypeData::Class(ClassRef::bare(class_id, ClassForm::Instance)))
    }

    #[test]
    fn equal_type_data_dedups_to_the_same_id() {
        let mut interner = TypeInterner::new();
        let a = class_ty(&mut interner, ClassId(0));
        let b = class_ty(&mut interner, ClassId(0));
        let c = class_ty(&mut interner, ClassId(1));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn union_absorbs_any() {
        let mut interner = TypeInterner::new();
        let int_ty = class_ty(&mut interner, ClassId(0));
        let result = interner.union([int_ty, TypeId::ANY]);
        assert_eq!(result, TypeId::ANY);
    }

    #[test]
    fn union_drops_never_and_collapses_single_member() {
        let mut interner = TypeInterner::new();
        let int_ty = class_ty(&mut interner, ClassId(0));
        let result = interner.union([int_ty, TypeId::NEVER]);
        assert_eq!(result, int_ty);
    }

    #[test]
    fn union_of_distinct_members_is_sorted_and_flattened() {
        let mut interner = TypeInterner::new();
        let a = class_ty(&mut interner, ClassId(0));
        let b = class_ty(&mut interner, ClassId(1));
        let ab = interner.union([a, b]);
        let c = class_ty(&mut interner, ClassId(2));
        // Unioning a nested union with a third member must flatten, not
        // produce a union-of-unions.
        let abc = interner.union([ab, c]);
        let direct = interner.union([a, b, c]);
        assert_eq!(abc, direct);
    }

    #[test]
    fn union_beyond_cap_collapses_to_unknown() {
        let mut interner = TypeInterner::new();
        let members: Vec<TypeId> = (0..100)
            .map(|i| {
                interner.intern(TypeData::Class(ClassRef {
                    class_id: ClassId(0),
                    form: ClassForm::Instance,
                    type_arguments: Vec::new(),
                    literal: Some(LiteralValue::Int(IntLiteral::Small(i))),
                    tuple_type_arguments: None,
                }))
            })
            .collect();
        let result = interner.union(members);
        assert_eq!(result, TypeId::UNKNOWN);
    }
}
