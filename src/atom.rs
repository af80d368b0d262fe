//! String interning for identifier and literal-value deduplication.
//!
//! A much smaller cousin of `tsz-common`'s `Interner`/`Atom` pair, scoped to
//! what the type algebra needs: cheap `Copy` handles for field names,
//! qualified class names, and string/bytes literal payloads. The core is
//! single-threaded (spec.md §5), so this is a plain `RefCell`-backed table
//! rather than a sharded concurrent one.

use std::cell::RefCell;
use rustc_hash::FxHashMap;

/// An interned string handle. Two `Atom`s compare equal iff the strings
/// they were interned from are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(u32);

/// String interner backing [`Atom`].
#[derive(Default)]
pub struct AtomInterner {
    inner: RefCell<AtomInternerInner>,
}

#[derive(Default)]
struct AtomInternerInner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, Atom>,
}

impl Atom {
    /// Sentinel for internally synthesized names (e.g. the reverse-mapper's
    /// fresh type variables) that are never resolved back to text. Never
    /// produced by [`AtomInterner::intern`].
    #[must_use]
    pub fn placeholder() -> Self {
        Atom(u32::MAX)
    }
}

impl AtomInterner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the same [`Atom`] for equal strings across
    /// calls.
    pub fn intern(&self, text: &str) -> Atom {
        let mut inner = self.inner.borrow_mut();
        if let Some(existing) = inner.lookup.get(text) {
            return *existing;
        }
        let atom = Atom(inner.strings.len() as u32);
        let boxed: Box<str> = text.into();
        inner.strings.push(boxed.clone());
        inner.lookup.insert(boxed, atom);
        atom
    }

    /// Resolve an [`Atom`] back to its string. Panics if `atom` was not
    /// produced by this interner, mirroring the "trust internal code"
    /// guidance: atoms never cross interner instances in this crate.
    #[must_use]
    pub fn resolve(&self, atom: Atom) -> std::cell::Ref<'_, str> {
        std::cell::Ref::map(self.inner.borrow(), |inner| &*inner.strings[atom.0 as usize])
    }

    #[must_use]
    pub fn resolve_owned(&self, atom: Atom) -> String {
        self.resolve(atom).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interns_equal_strings_to_the_same_atom() {
        let interner = AtomInterner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        let c = interner.intern("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(&*interner.resolve(a), "hello");
    }
}
