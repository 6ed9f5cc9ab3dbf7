//! Session-wide string interner.
//!
//! One interner is shared by every compilation a processor runs, so names
//! stored in cached executables and tuple shapes stay comparable across
//! scripts.

use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

#[derive(Default)]
struct Table {
    map: FxHashMap<Arc<str>, Name>,
    strings: Vec<Arc<str>>,
}

/// Thread-safe string interner.
///
/// Reads take a shared lock; the write lock is only taken for strings seen
/// for the first time.
pub struct StringInterner {
    table: RwLock<Table>,
}

impl StringInterner {
    pub fn new() -> Self {
        let empty: Arc<str> = Arc::from("");
        let mut table = Table::default();
        table.map.insert(Arc::clone(&empty), Name::EMPTY);
        table.strings.push(empty);
        StringInterner {
            table: RwLock::new(table),
        }
    }

    /// Intern `s`, returning its handle.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&name) = self.table.read().map.get(s) {
            return name;
        }
        let mut table = self.table.write();
        if let Some(&name) = table.map.get(s) {
            return name;
        }
        // The interner never holds more than u32::MAX strings in practice:
        // every string comes from script text bounded by the span width.
        let index = u32::try_from(table.strings.len()).unwrap_or(u32::MAX);
        let name = Name::from_index(index);
        let stored: Arc<str> = Arc::from(s);
        table.strings.push(Arc::clone(&stored));
        table.map.insert(stored, name);
        name
    }

    /// Resolve a handle back to its text.
    ///
    /// Unknown handles resolve to the empty string.
    pub fn lookup(&self, name: Name) -> Arc<str> {
        let table = self.table.read();
        table
            .strings
            .get(name.index())
            .cloned()
            .unwrap_or_else(|| Arc::clone(&table.strings[0]))
    }

    /// Look up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.read().map.get(s).copied()
    }

    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheaply cloneable handle to a [`StringInterner`].
#[derive(Clone, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &StringInterner {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn intern_is_idempotent() {
        let interner = StringInterner::new();
        let a = interner.intern("Employees");
        let b = interner.intern("Employees");
        assert_eq!(a, b);
        assert_eq!(&*interner.lookup(a), "Employees");
    }

    #[test]
    fn empty_is_preinterned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert!(interner.is_empty());
    }

    #[test]
    fn shared_interner_is_shared_across_threads() {
        let shared = SharedInterner::new();
        let worker = shared.clone();
        let name = std::thread::spawn(move || worker.intern("value"))
            .join()
            .unwrap();
        assert_eq!(shared.get("value"), Some(name));
    }
}
