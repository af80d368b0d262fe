//! Execution environment passed explicitly to every call that needs it.
//!
//! There is no global configuration (spec.md §9, "Global configuration:
//! none"). Callers build an [`ExecutionEnvironment`] once per analyzed
//! source unit and thread it through the static-expression folder and the
//! operator evaluator's union-at-type-position version gate.

use num_bigint::BigInt;

/// Target platform, as consumed by the static-expression folder's
/// `sys.platform` / `os.name` comparisons (spec.md §4.A).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
    #[default]
    Other,
}

impl Platform {
    /// Parse the string literal a source guard compares `sys.platform`
    /// against. Unrecognized strings fold to `Other`, which never equals a
    /// known platform, matching the "comparisons ... against string
    /// literals" contract without guessing.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "linux" => Self::Linux,
            "darwin" => Self::Darwin,
            "win32" | "windows" => Self::Windows,
            _ => Self::Other,
        }
    }
}

/// Target version, encoded as `major*256+minor` but carried as an
/// arbitrary-precision integer so a pathologically large minor version
/// (`sys.version_info >= (3, 999999999999)`) cannot silently overflow and
/// flip a guard's truth value (spec.md §4.A: "Version comparisons use
/// big-integer arithmetic to avoid overflow on large minor versions").
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TargetVersion(BigInt);

impl TargetVersion {
    #[must_use]
    pub fn new(major: u32, minor: u32) -> Self {
        Self(BigInt::from(major) * BigInt::from(256u32) + BigInt::from(minor))
    }

    /// Build a target version from the raw `major*256+minor` encoding,
    /// accepting an arbitrary-precision value directly (used when folding a
    /// guard that compares against a literal bigger than `u32`).
    #[must_use]
    pub fn from_encoded(encoded: BigInt) -> Self {
        Self(encoded)
    }

    #[must_use]
    pub fn encoded(&self) -> &BigInt {
        &self.0
    }
}

/// Alias table entries the folder consults to recognize `sys`/`os`/`typing`
/// references regardless of how the source imported them (`import sys as
/// _sys`, `from typing import TYPE_CHECKING as TC`, ...).
#[derive(Clone, Debug, Default)]
pub struct AliasTables {
    pub sys_module_aliases: Vec<String>,
    pub os_module_aliases: Vec<String>,
    pub typing_module_aliases: Vec<String>,
    /// Names bound to `typing.TYPE_CHECKING` (or an equivalent re-export)
    /// that the folder treats as the always-true sentinel.
    pub type_checking_aliases: Vec<String>,
}

impl AliasTables {
    #[must_use]
    pub fn is_sys_alias(&self, name: &str) -> bool {
        name == "sys" || self.sys_module_aliases.iter().any(|a| a == name)
    }

    #[must_use]
    pub fn is_os_alias(&self, name: &str) -> bool {
        name == "os" || self.os_module_aliases.iter().any(|a| a == name)
    }

    #[must_use]
    pub fn is_type_checking(&self, name: &str) -> bool {
        name == "TYPE_CHECKING" || self.type_checking_aliases.iter().any(|a| a == name)
    }
}

/// The environment threaded through static folding and version-gated
/// operator behavior (spec.md §6, "Version/platform environment").
#[derive(Clone, Debug)]
pub struct ExecutionEnvironment {
    pub target_version: TargetVersion,
    pub target_platform: Platform,
    pub aliases: AliasTables,
    /// Whether the current source unit is a `.pyi` stub. Stubs permit
    /// stringified forward references in more positions for the
    /// union-at-type-position operator case (spec.md §4.D step 2).
    pub is_stub_file: bool,
}

impl ExecutionEnvironment {
    #[must_use]
    pub fn new(major: u32, minor: u32, platform: Platform) -> Self {
        Self {
            target_version: TargetVersion::new(major, minor),
            target_platform: platform,
            aliases: AliasTables::default(),
            is_stub_file: false,
        }
    }
}
