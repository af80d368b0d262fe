//! Centralized limits and thresholds for the type-reasoning core.
//!
//! Mirrors the intent of a dedicated compiler `limits` module: one place
//! that documents *why* each cap exists so call sites never hardcode a
//! magic number inline.

/// Maximum number of non-identical subtypes a [`crate::intern::TypeInterner`]
/// will keep in a constraint solver's lower bound before collapsing to the
/// type variable's declared upper bound (or giving up and widening to the
/// broadest known supertype).
///
/// See spec.md §4.B step 6 and §8 invariant 5 ("Union-cap").
pub const MAX_CONSTRAINT_UNION_SUBTYPES: usize = 64;

/// Cross-product cap for literal-math folding (spec.md §4.D step 5 and §8
/// concrete scenario 6). When `|left_union| * |right_union|` would exceed
/// this, folding aborts and the unfolded (widened) operator result is used
/// instead.
pub const MAX_LITERAL_FOLD_CROSS_PRODUCT: usize = 64;

/// Safe-integer range literal math stays within before it is represented as
/// a machine integer rather than kept as an arbitrary-precision value
/// (spec.md §4.D step 5: "convert back to a machine integer if it fits in
/// the standard safe range").
///
/// Matches the IEEE-754 double safe-integer bound used by the host
/// language's numeric model (`2^53`).
pub const SAFE_INTEGER_BOUND: i64 = 1 << 53;

/// Default recursion depth cap for recursive type operations (assignability,
/// instantiation, printing). Exceeding this is treated as "assume
/// compatible" per spec.md §9 ("Recursive type assignability").
pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 64;

/// Maximum number of overload candidates a single call site's
/// [`crate::constraint_solver::ConstraintTracker`] will track concurrently.
/// A call with more overloads than this degrades to "use the first
/// syntactically matching overload" rather than tracking every candidate's
/// bounds, bounding tracker memory on pathological overload sets.
pub const MAX_TRACKED_OVERLOAD_CANDIDATES: usize = 64;
