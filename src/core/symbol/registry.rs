//! Global symbol registry management.
//!
//! The registry is a table of names. Each distinct name owns one slot in a
//! `SlotMap`, and the slot key is what a [`Symbol`] stores to display itself.
//! Identity lives in the symbol itself: a symbol interned through [`symb`]
//! carries serial `0`, while fresh and anonymous symbols draw a unique serial
//! from an atomic counter. Fresh symbols reuse the slot of their name, so the
//! table only grows with the number of distinct names, never with the number
//! of fresh symbols.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, RwLock};

use rustc_hash::FxHashMap;
use slotmap::{DefaultKey, SlotMap};

use super::Symbol;
use crate::StencilError;

struct NameEntry {
    text: Arc<str>,
    // Reachable through `symb_get`
    interned: bool,
}

#[derive(Default)]
struct NameTable {
    slots: SlotMap<DefaultKey, NameEntry>,
    by_text: FxHashMap<Arc<str>, DefaultKey>,
}

impl NameTable {
    fn interned_key(&self, name: &str) -> Option<DefaultKey> {
        self.by_text
            .get(name)
            .copied()
            .filter(|&key| self.slots.get(key).is_some_and(|entry| entry.interned))
    }

    fn slot(&mut self, name: &str, interned: bool) -> DefaultKey {
        if let Some(&key) = self.by_text.get(name) {
            if interned && let Some(entry) = self.slots.get_mut(key) {
                entry.interned = true;
            }
            return key;
        }
        let text: Arc<str> = Arc::from(name);
        let key = self.slots.insert(NameEntry {
            text: Arc::clone(&text),
            interned,
        });
        self.by_text.insert(text, key);
        key
    }
}

static REGISTRY: LazyLock<RwLock<NameTable>> = LazyLock::new(|| RwLock::new(NameTable::default()));

// 0 is reserved for symbols interned by name
static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

fn next_serial() -> u64 {
    NEXT_SERIAL.fetch_add(1, Ordering::Relaxed)
}

/// Look up the display name stored for a key.
pub(crate) fn lookup_name(key: DefaultKey) -> Option<Arc<str>> {
    REGISTRY
        .read()
        .expect("Global symbol registry poisoned")
        .slots
        .get(key)
        .map(|entry| Arc::clone(&entry.text))
}

/// Create or get the symbol registered under `name`
///
/// # Panics
///
/// Panics if the global registry lock is poisoned.
#[must_use]
pub fn symb(name: &str) -> Symbol {
    let known = REGISTRY
        .read()
        .expect("Global symbol registry poisoned")
        .interned_key(name);
    if let Some(key) = known {
        return Symbol::new(Some(key), 0);
    }

    let key = REGISTRY
        .write()
        .expect("Global symbol registry poisoned")
        .slot(name, true);
    Symbol::new(Some(key), 0)
}

/// Create a named symbol that is distinct by identity.
///
/// The returned symbol displays as `name` but differs from `symb(name)` and
/// from every other fresh symbol with the same name. It is not reachable
/// through [`symb_get`].
///
/// # Panics
///
/// Panics if the global registry lock is poisoned.
#[must_use]
pub fn symb_fresh(name: &str) -> Symbol {
    let known = REGISTRY
        .read()
        .expect("Global symbol registry poisoned")
        .by_text
        .get(name)
        .copied();
    let key = match known {
        Some(key) => key,
        None => REGISTRY
            .write()
            .expect("Global symbol registry poisoned")
            .slot(name, false),
    };
    Symbol::new(Some(key), next_serial())
}

/// Create a new anonymous symbol. It takes no slot in the registry.
#[must_use]
pub fn symb_anon() -> Symbol {
    Symbol::new(None, next_serial())
}

/// Get an existing symbol by name
///
/// # Errors
/// Returns `StencilError::UnknownSymbol` if the name was never interned.
///
/// # Panics
///
/// Panics if the global registry lock is poisoned.
pub fn symb_get(name: &str) -> Result<Symbol, StencilError> {
    REGISTRY
        .read()
        .expect("Global symbol registry poisoned")
        .interned_key(name)
        .map(|key| Symbol::new(Some(key), 0))
        .ok_or_else(|| StencilError::UnknownSymbol(name.to_owned()))
}

/// Check if a name has been interned through [`symb`]
///
/// # Panics
///
/// Panics if the global registry lock is poisoned.
pub fn symbol_exists(name: &str) -> bool {
    REGISTRY
        .read()
        .expect("Global symbol registry poisoned")
        .interned_key(name)
        .is_some()
}

/// Number of distinct names held by the registry
///
/// Fresh symbols share the slot of their name and anonymous symbols take
/// none, so creating them does not change this count once the name is known.
///
/// # Panics
///
/// Panics if the global registry lock is poisoned.
pub fn symbol_count() -> usize {
    REGISTRY
        .read()
        .expect("Global symbol registry poisoned")
        .slots
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symb_interns_by_name() {
        let a = symb("registry_test_a");
        let b = symb("registry_test_a");
        assert_eq!(a, b);
        assert!(symbol_exists("registry_test_a"));
        assert_eq!(symb_get("registry_test_a"), Ok(a));
    }

    #[test]
    fn test_fresh_is_not_interned() {
        let fresh = symb_fresh("registry_test_fresh");
        assert!(!symbol_exists("registry_test_fresh"));
        assert_eq!(fresh.name().as_deref(), Some("registry_test_fresh"));
        assert_ne!(fresh, symb("registry_test_fresh"));
        assert_ne!(fresh, symb_fresh("registry_test_fresh"));
    }

    #[test]
    fn test_fresh_shares_the_name_slot() {
        let first = symb_fresh("registry_test_shared");
        let second = symb_fresh("registry_test_shared");
        assert_ne!(first, second);
        assert_eq!(first.name_key(), second.name_key());

        // Interning the name later keeps the slot and makes it reachable
        let named = symb("registry_test_shared");
        assert_eq!(named.name_key(), first.name_key());
        assert_eq!(symb_get("registry_test_shared"), Ok(named));
        assert_ne!(named, first);
    }

    #[test]
    fn test_anon_has_no_name() {
        let anon = symb_anon();
        assert!(anon.name().is_none());
        assert!(anon.name_key().is_none());
        assert_ne!(anon, symb_anon());
    }

    #[test]
    fn test_symb_get_missing() {
        assert_eq!(
            symb_get("registry_test_never_created"),
            Err(StencilError::UnknownSymbol("registry_test_never_created".into()))
        );
    }
}
