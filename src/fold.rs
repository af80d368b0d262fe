//! Static-expression folder (component A, spec.md §4.A).
//!
//! Folds a restricted boolean-expression grammar — the subset that shows up
//! in version/platform import guards and data-class decorator arguments —
//! to `Some(true)`/`Some(false)`/`None` ("cannot fold"). Never raises.

use num_bigint::BigInt;

use crate::env::{ExecutionEnvironment, Platform};

/// The restricted expression grammar this folder accepts (spec.md §4.A).
/// The host translates its own AST into this shape; the core never parses
/// source itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    BoolLiteral(bool),
    /// A bare name. Recognized names: the `TYPE_CHECKING` sentinel (via
    /// `env.aliases`), otherwise unfoldable.
    Name(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    /// `<sys>.version_info [op] <tuple-or-int literal>`, or
    /// `<sys>.version_info[0] [op] <int literal>`.
    VersionCompare {
        op: CompareOp,
        first_element_only: bool,
        rhs: BigInt,
    },
    /// `<sys>.platform [op] "literal"` or `<os>.name [op] "literal"`.
    PlatformCompare {
        op: CompareOp,
        is_os_name: bool,
        rhs: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn apply<T: PartialOrd>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
        }
    }
}

/// Fold `expr` under `env`. `None` means "cannot fold" — the caller must
/// treat the guard as unresolved, not as false.
#[must_use]
pub fn fold_bool_expression(expr: &Expr, env: &ExecutionEnvironment) -> Option<bool> {
    match expr {
        Expr::BoolLiteral(b) => Some(*b),
        Expr::Name(name) => {
            if env.aliases.is_type_checking(name) {
                Some(true)
            } else {
                None
            }
        }
        Expr::And(lhs, rhs) => match fold_bool_expression(lhs, env) {
            Some(false) => Some(false),
            Some(true) => fold_bool_expression(rhs, env),
            None => None,
        },
        Expr::Or(lhs, rhs) => match fold_bool_expression(lhs, env) {
            Some(true) => Some(true),
            Some(false) => fold_bool_expression(rhs, env),
            None => None,
        },
        Expr::Not(inner) => fold_bool_expression(inner, env).map(|b| !b),
        Expr::VersionCompare {
            op,
            first_element_only,
            rhs,
        } => {
            let lhs = if *first_element_only {
                // Comparing only the major component: divide out the minor
                // part rather than comparing the full encoded value.
                env.target_version.encoded() / BigInt::from(256)
            } else {
                env.target_version.encoded().clone()
            };
            Some(op.apply(&lhs, rhs))
        }
        Expr::PlatformCompare { op, is_os_name, rhs } => {
            // `os.name` only distinguishes "posix"/"nt"; model it as a
            // platform-derived string rather than a second enum.
            let lhs = if *is_os_name {
                match env.target_platform {
                    Platform::Windows => "nt",
                    Platform::Linux | Platform::Darwin => "posix",
                    Platform::Other => return None,
                }
                .to_string()
            } else {
                match env.target_platform {
                    Platform::Linux => "linux".to_string(),
                    Platform::Darwin => "darwin".to_string(),
                    Platform::Windows => "win32".to_string(),
                    Platform::Other => return None,
                }
            };
            Some(op.apply(&lhs, rhs))
        }
    }
}

/// Bool-like folding: permits the same grammar but also accepts a plain
/// `bool` literal as the whole expression, returning it verbatim. Used for
/// data-class decorator keyword arguments (spec.md §4.F), where an
/// unfoldable argument must be treated as "unspecified" rather than an
/// error.
#[must_use]
pub fn fold_bool_like_expression(expr: &Expr, env: &ExecutionEnvironment) -> Option<bool> {
    fold_bool_expression(expr, env)
}
