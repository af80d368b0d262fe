//! Decorator application pipeline (component F, spec.md §4.F).
//!
//! Resolves the effect of built-in, property, `overload`,
//! `dataclass_transform`, and generic callable decorators on function and
//! class types.

use crate::diagnostics::{Diagnostic, NodeRef, RuleTag};
use crate::host::HostEvaluator;
use crate::intern::{TypeId, TypeInterner};
use crate::types::class::ClassId;
use crate::types::function::{FunctionDef, FunctionFlags, OverloadedDef};
use crate::types::TypeData;

/// A recognized built-in decorator (spec.md §4.F "Function decorators").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinDecorator {
    AbstractMethod,
    Final,
    Override,
    TypeCheckOnly,
    NoTypeCheck,
    Overload,
    StaticMethod,
    ClassMethod,
    Property,
    PropertySetter,
    PropertyDeleter,
}

impl BuiltinDecorator {
    /// Resolve a fully-qualified decorator name to its recognized kind.
    #[must_use]
    pub fn from_qualified_name(name: &str) -> Option<Self> {
        Some(match name {
            "abstractmethod" => Self::AbstractMethod,
            "typing.final" | "final" => Self::Final,
            "typing.override" | "override" => Self::Override,
            "typing.type_check_only" | "type_check_only" => Self::TypeCheckOnly,
            "no_type_check" => Self::NoTypeCheck,
            "typing.overload" | "overload" => Self::Overload,
            "staticmethod" => Self::StaticMethod,
            "classmethod" => Self::ClassMethod,
            "property" => Self::Property,
            _ => return None,
        })
    }
}

/// Configuration parsed from a `dataclass_transform(...)` call or a
/// `__dataclass_transform__`-named function (spec.md §4.F).
#[derive(Clone, Debug, Default)]
pub struct DataClassTransformConfig {
    pub keyword_only_params: bool,
    pub generate_eq: bool,
    pub generate_order: bool,
    /// `fieldDescriptorNames` (spec.md §4.F): the callables/classes this
    /// transform recognizes as a declared field constructor (spec.md §4.E
    /// field-collection step 4).
    pub field_descriptors: Vec<TypeId>,
}

/// Keyword arguments of a `dataclass_transform(...)` call itself, as the
/// host hands them to [`validate_data_class_transform`] (spec.md §6
/// "Configuration options"). Each boolean is already the result of the
/// host's own static folding; an unfoldable keyword is passed as `None` and
/// falls back to the schema default.
#[derive(Clone, Debug, Default)]
pub struct DataClassTransformCallArgs {
    pub kw_only_default: Option<bool>,
    pub eq_default: Option<bool>,
    pub order_default: Option<bool>,
    pub field_descriptors: Vec<TypeId>,
}

/// Per-call-site overrides for a data-class decorator invocation (spec.md
/// §4.F "Class decorators", §6 "Data-class decorator call").
#[derive(Clone, Copy, Debug, Default)]
pub struct DataClassCallArgs {
    pub init: Option<bool>,
    pub eq: Option<bool>,
    pub order: Option<bool>,
    pub frozen: Option<bool>,
    pub kw_only: Option<bool>,
    pub slots: Option<bool>,
}

/// Resolved behaviors after merging a `dataclass_transform` configuration's
/// defaults with a decorator call site's explicit arguments (spec.md §6
/// `applyDataClassBehaviorOverrides`).
#[derive(Clone, Copy, Debug, Default)]
pub struct DataClassBehaviors {
    pub init: bool,
    pub eq: bool,
    pub order: bool,
    pub frozen: bool,
    pub kw_only: bool,
    pub slots: bool,
}

impl DataClassBehaviors {
    #[must_use]
    pub fn from_transform_config(config: DataClassTransformConfig) -> Self {
        Self {
            init: true,
            eq: config.generate_eq,
            order: config.generate_order,
            frozen: false,
            kw_only: config.keyword_only_params,
            slots: false,
        }
    }

    /// Merge call-site overrides onto these defaults. An `unfoldable`
    /// (`None`) argument leaves the default untouched (spec.md §4.F: "an
    /// unfoldable value is silently treated as 'unspecified'").
    #[must_use]
    pub fn with_call_args(mut self, args: DataClassCallArgs) -> Self {
        if let Some(v) = args.init {
            self.init = v;
        }
        if let Some(v) = args.eq {
            self.eq = v;
        }
        if let Some(v) = args.order {
            self.order = v;
        }
        if let Some(v) = args.frozen {
            self.frozen = v;
        }
        if let Some(v) = args.kw_only {
            self.kw_only = v;
        }
        if let Some(v) = args.slots {
            self.slots = v;
        }
        self
    }
}

/// `validateDataClassTransform` (spec.md §6): parse a `dataclass_transform(
/// ...)` call's keyword arguments into its configuration, falling back to
/// the schema's own defaults (`eq_default` true, the rest false) for
/// unfoldable or absent keywords.
#[must_use]
pub fn validate_data_class_transform(args: DataClassTransformCallArgs) -> DataClassTransformConfig {
    DataClassTransformConfig {
        keyword_only_params: args.kw_only_default.unwrap_or(false),
        generate_eq: args.eq_default.unwrap_or(true),
        generate_order: args.order_default.unwrap_or(false),
        field_descriptors: args.field_descriptors,
    }
}

/// `getDataClassBehaviorsFromDecorator` (spec.md §6): resolve an applied
/// decorator back to the behaviors its `dataclass_transform` configuration
/// establishes, merged with that decorator call's own explicit arguments.
/// `None` when the host never recognized the decorator as
/// `dataclass_transform`-configured in the first place — resolving *that*
/// is the host's concern (symbol/type lookup), not this crate's.
#[must_use]
pub fn get_data_class_behaviors_from_decorator(
    config: Option<DataClassTransformConfig>,
    call_args: DataClassCallArgs,
) -> Option<DataClassBehaviors> {
    config.map(|c| DataClassBehaviors::from_transform_config(c).with_call_args(call_args))
}

/// Apply one built-in decorator to `func`, producing the (possibly cloned)
/// resulting signature (spec.md §4.F "Function decorators").
pub fn apply_builtin_function_decorator(
    mut func: FunctionDef,
    decorator: BuiltinDecorator,
) -> FunctionDef {
    match decorator {
        BuiltinDecorator::AbstractMethod => func.flags |= FunctionFlags::ABSTRACT,
        BuiltinDecorator::Final => func.flags |= FunctionFlags::FINAL,
        BuiltinDecorator::Override => func.flags |= FunctionFlags::OVERRIDDEN,
        BuiltinDecorator::Overload => func.flags |= FunctionFlags::OVERLOADED,
        BuiltinDecorator::StaticMethod if !func.flags.contains(FunctionFlags::STATIC_METHOD) => {
            func.flags |= FunctionFlags::STATIC_METHOD;
        }
        BuiltinDecorator::ClassMethod if !func.flags.contains(FunctionFlags::CLASS_METHOD) => {
            func.flags |= FunctionFlags::CLASS_METHOD;
        }
        BuiltinDecorator::TypeCheckOnly | BuiltinDecorator::NoTypeCheck => {}
        // StaticMethod/ClassMethod on an already-matching function, and the
        // property family, are handled by their own call sites below.
        BuiltinDecorator::StaticMethod
        | BuiltinDecorator::ClassMethod
        | BuiltinDecorator::Property
        | BuiltinDecorator::PropertySetter
        | BuiltinDecorator::PropertyDeleter => {}
    }
    func
}

/// Property-family decorator application (spec.md §4.F "Property-family
/// decorators").
#[must_use]
pub fn apply_property_decorator(mut func: FunctionDef, kind: BuiltinDecorator) -> FunctionDef {
    func.flags |= match kind {
        BuiltinDecorator::Property => FunctionFlags::PROPERTY_GETTER,
        BuiltinDecorator::PropertySetter => FunctionFlags::PROPERTY_SETTER,
        BuiltinDecorator::PropertyDeleter => FunctionFlags::PROPERTY_DELETER,
        _ => return func,
    };
    func
}

/// Per-symbol overload accumulator (spec.md §4.F "overload marks the
/// signature as overloaded..."; spec.md §9 "Overload collection": "an
/// explicit accumulator keyed by symbol identity, finalized when the
/// symbol table is sealed for a module", order-preserving).
#[derive(Debug, Default)]
pub struct OverloadAccumulator {
    overloads: Vec<FunctionDef>,
    implementation: Option<FunctionDef>,
}

impl OverloadAccumulator {
    pub fn push_overload(&mut self, func: FunctionDef) {
        self.overloads.push(func);
    }

    pub fn set_implementation(&mut self, func: FunctionDef) {
        self.implementation = Some(func);
    }

    /// Finalize into an `Overloaded` type, propagating the implementation's
    /// docstring/deprecation message onto overloads missing one, and
    /// reporting abstractness inconsistency across siblings (spec.md §4.F).
    pub fn finalize(mut self, interner: &mut TypeInterner, host: &mut dyn HostEvaluator, node: NodeRef) -> TypeId {
        tracing::debug!(
            "finalizing overload group: {} overload(s), implementation present: {}",
            self.overloads.len(),
            self.implementation.is_some()
        );
        if let Some(impl_fn) = &self.implementation {
            let doc = impl_fn.docstring;
            let deprecation = impl_fn.deprecation_message.clone();
            for overload in &mut self.overloads {
                if overload.docstring.is_none() {
                    overload.docstring = doc;
                }
                if overload.deprecation_message.is_none() {
                    overload.deprecation_message = deprecation.clone();
                }
            }
        }

        if let Some(first) = self.overloads.first() {
            let first_abstract = first.flags.contains(FunctionFlags::ABSTRACT);
            if self
                .overloads
                .iter()
                .any(|o| o.flags.contains(FunctionFlags::ABSTRACT) != first_abstract)
            {
                host.report_diagnostic(Diagnostic::new(
                    RuleTag::InconsistentOverload,
                    "overload signatures disagree on @abstractmethod",
                    node,
                ));
            }
        }

        let overload_ids: Vec<TypeId> = self
            .overloads
            .into_iter()
            .map(|f| interner.intern(TypeData::Function(f)))
            .collect();
        let implementation_id = self.implementation.map(|f| interner.intern(TypeData::Function(f)));

        interner.intern(TypeData::Overloaded(OverloadedDef {
            overloads: overload_ids,
            implementation: implementation_id,
        }))
    }
}

/// Generic "callable" decorator application (spec.md §4.F): type-check the
/// decorator call via the host; if the decorator is completely unannotated
/// and returns a partly-`Unknown` type, preserve the input function's type
/// (identity-decorator heuristic) instead of the call's literal result.
pub fn apply_generic_function_decorator(
    interner: &mut TypeInterner,
    host: &mut dyn HostEvaluator,
    decorator: TypeId,
    input: TypeId,
    node: NodeRef,
) -> TypeId {
    match host.validate_call_args(interner, decorator, &[input], node) {
        crate::host::CallArgsOutcome::Matched { return_type } => {
            let decorator_is_unannotated = matches!(interner.resolve(decorator), TypeData::Function(f) if f.is_gradual_callable());
            let return_is_unknown = matches!(interner.resolve(return_type), TypeData::Unknown);
            if decorator_is_unannotated && return_is_unknown {
                input
            } else {
                return_type
            }
        }
        crate::host::CallArgsOutcome::Mismatched => input,
    }
}

/// Class decorators mirror function decorators (spec.md §4.F "Class
/// decorators"). A data-class decorator invokes the synthesis engine
/// (component E) with merged behaviors; this function only computes those
/// merged behaviors and marks the class's flags, leaving member synthesis
/// to `class_synthesis::synthesize_constructor`/friends.
pub fn apply_data_class_decorator(
    interner: &mut TypeInterner,
    class_id: ClassId,
    behaviors: DataClassBehaviors,
) {
    let class = interner.class_mut(class_id);
    class.flags.set(crate::types::class::ClassFlags::DATA_CLASS, true);
    class.flags.set(crate::types::class::ClassFlags::FROZEN, behaviors.frozen);
    class
        .flags
        .set(crate::types::class::ClassFlags::GENERATE_EQ, behaviors.eq);
    class
        .flags
        .set(crate::types::class::ClassFlags::GENERATE_ORDER, behaviors.order);
    class
        .flags
        .set(crate::types::class::ClassFlags::GENERATED_SLOTS, behaviors.slots);
    class
        .flags
        .set(crate::types::class::ClassFlags::KW_ONLY_DEFAULT, behaviors.kw_only);
}
