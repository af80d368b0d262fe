//! Literal value payloads for `Class` types with a literal value (spec.md
//! §3: "optionally a literal value (string, bytes, int, bool, or enum
//! member)").

use crate::atom::Atom;
use crate::types::class::ClassId;
use num_bigint::BigInt;

/// An integer literal value, small enough to stay inline or boxed as a
/// big integer once it exceeds the safe-integer bound
/// ([`crate::limits::SAFE_INTEGER_BOUND`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntLiteral {
    Small(i64),
    Big(BigInt),
}

impl IntLiteral {
    #[must_use]
    pub fn from_bigint(value: BigInt) -> Self {
        match i64::try_from(&value) {
            Ok(small) => IntLiteral::Small(small),
            Err(_) => IntLiteral::Big(value),
        }
    }

    #[must_use]
    pub fn to_bigint(&self) -> BigInt {
        match self {
            IntLiteral::Small(v) => BigInt::from(*v),
            IntLiteral::Big(v) => v.clone(),
        }
    }
}

/// The literal payload itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Str(Atom),
    Bytes(Atom),
    Int(IntLiteral),
    Bool(bool),
    EnumMember { class: ClassId, member: Atom },
}
