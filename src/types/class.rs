//! Class data model (spec.md §3, `Class` case) and the field table the
//! class-synthesis engine (`class_synthesis.rs`) reads and writes.

use crate::atom::Atom;
use crate::intern::TypeId;
use crate::types::typevar::{TypeVarId, Variance};
use once_cell::unsync::OnceCell;

/// Handle into the interner's class side table, identifying one class
/// *declaration* (shared by every specialization/instantiation of it).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// Whether a `Class`-kind type refers to the class object itself
/// (`type[C]`, "instantiable") or to an inhabitant of the class
/// ("instance"). Spec.md §3: "A `Class` with literal value is always an
/// *instance* form."
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassForm {
    Instantiable,
    Instance,
}

bitflags::bitflags! {
    /// Per-class-declaration flags (spec.md §3, `Class` case: "flags
    /// (data-class, frozen, final, protocol, built-in name,
    /// runtime-checkable, generated-slots, …)").
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ClassFlags: u32 {
        const DATA_CLASS         = 1 << 0;
        const FROZEN             = 1 << 1;
        const FINAL               = 1 << 2;
        const PROTOCOL            = 1 << 3;
        const BUILT_IN            = 1 << 4;
        const RUNTIME_CHECKABLE   = 1 << 5;
        const GENERATED_SLOTS     = 1 << 6;
        /// Generate `__eq__` (data-class behavior default; can be disabled
        /// per-class).
        const GENERATE_EQ         = 1 << 7;
        /// Generate `__lt__`/`__le__`/`__gt__`/`__ge__`.
        const GENERATE_ORDER      = 1 << 8;
        /// This class is the anchor class a `dataclass_transform`-decorated
        /// metaclass/base marks as the frozen authority (spec.md §9 open
        /// question: "treat the anchor's own frozen flag as authoritative").
        const METACLASS_TRANSFORM_ANCHOR = 1 << 9;
        /// Keyword-only by default for all synthesized constructor fields.
        const KW_ONLY_DEFAULT     = 1 << 10;
    }
}

/// One element of a tuple class's ordered per-element type list (spec.md
/// §3: "optional `tupleTypeArguments` ... each marked `unbounded` or not").
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub type_id: TypeId,
    pub unbounded: bool,
}

/// A single data-class field, as recorded by the class-synthesis engine's
/// field-collection pass (spec.md §4.E).
#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub name: Atom,
    /// `None` until the deferred type-evaluation pass fills it in (spec.md
    /// §4.E step 3: "type evaluation is deferred until all local fields
    /// have been recorded").
    pub declared_type: Option<TypeId>,
    pub has_default: bool,
    /// The default is produced by a factory call (`default_factory=...`)
    /// rather than a plain value; does not affect constructor-ordering
    /// rules, only codegen the core does not perform.
    pub default_factory: bool,
    pub init: bool,
    pub kw_only: bool,
    pub alias: Option<Atom>,
    pub is_class_var: bool,
    /// `Final`-typed variables stay instance fields despite the
    /// class-variable binding rule (spec.md §4.E step 5).
    pub is_final: bool,
    /// Position among the class's own declared fields, used to keep
    /// constructor parameter order stable and to detect "non-default after
    /// default" (spec.md §4.E, constructor synthesis).
    pub source_order: u32,
}

impl FieldInfo {
    #[must_use]
    pub fn new(name: Atom, source_order: u32) -> Self {
        Self {
            name,
            declared_type: None,
            has_default: false,
            default_factory: false,
            init: true,
            kw_only: false,
            alias: None,
            is_class_var: false,
            is_final: false,
            source_order,
        }
    }
}

/// Per-declaration data for a class (spec.md §3, `Class` case).
#[derive(Debug)]
pub struct ClassDef {
    pub qualified_name: Atom,
    /// Linearized ancestor list, nearest first, `self` at index 0
    /// (method-resolution order).
    pub mro: Vec<ClassId>,
    pub type_params: Vec<TypeVarId>,
    /// Declared variance per type parameter, parallel to `type_params`.
    /// Populated eagerly for annotated parameters; for unannotated ones,
    /// left `None` until `infer_variance` fills it in lazily (spec.md §3:
    /// "inferred for unannotated class parameters lazily, once, on first
    /// use").
    pub variance: Vec<Option<Variance>>,
    pub flags: ClassFlags,
    /// Field table in source declaration order (own fields only; merged
    /// ancestor fields are computed on demand by `class_synthesis`, not
    /// stored here, since the same `ClassDef` is shared by every
    /// specialization).
    pub fields: Vec<FieldInfo>,
    pub metaclass: Option<ClassId>,
    pub deprecation_message: Option<Atom>,
    /// Declared per-element types for a tuple class's *unspecialized*
    /// form. A given occurrence (`ClassRef`) may carry its own
    /// `tuple_type_arguments` instead, e.g. the result of concatenating
    /// two known-length tuples; this is only the fallback used when an
    /// occurrence does not override it.
    pub tuple_type_arguments: Option<Vec<TupleElement>>,
    /// True if some ancestor in `mro` has an unresolved/unknown type,
    /// disabling constructor synthesis in favor of a permissive
    /// `*args, **kwargs` form (spec.md §4.E step 1).
    pub has_unknown_ancestor: bool,
    variance_cache: OnceCell<Vec<Variance>>,
}

impl ClassDef {
    #[must_use]
    pub fn new(qualified_name: Atom, mro: Vec<ClassId>) -> Self {
        Self {
            qualified_name,
            mro,
            type_params: Vec::new(),
            variance: Vec::new(),
            flags: ClassFlags::empty(),
            fields: Vec::new(),
            metaclass: None,
            deprecation_message: None,
            tuple_type_arguments: None,
            has_unknown_ancestor: false,
            variance_cache: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn field(&self, name: Atom) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolved variance per type parameter, inferring and caching on first
    /// use for any parameter left `None` in `self.variance` (spec.md §3).
    /// `infer` is called only for parameters without a declared variance.
    pub fn resolved_variance(&self, infer: impl Fn(usize) -> Variance) -> &[Variance] {
        self.variance_cache.get_or_init(|| {
            self.variance
                .iter()
                .enumerate()
                .map(|(i, v)| v.unwrap_or_else(|| infer(i)))
                .collect()
        })
    }
}
