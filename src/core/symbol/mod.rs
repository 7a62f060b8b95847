//! Symbols with identity semantics
//!
//! # Symbol Interning
//!
//! `symb(name)` interns by name: every call with the same name returns the
//! same symbol. `Symbol::fresh(name)` creates a symbol that merely *displays*
//! as `name`; it is equal only to itself. The Crank-Nicolson gridpoints are
//! fresh symbols, so two discretizations never share gridpoints.
//!
//! # Example
//! ```
//! use symb_cn::{Symbol, symb};
//!
//! let x = symb("doc_symbol_x");
//! assert_eq!(x, symb("doc_symbol_x"));
//!
//! let fresh = Symbol::fresh("doc_symbol_x");
//! assert_ne!(x, fresh);
//! assert_eq!(fresh.name().as_deref(), Some("doc_symbol_x"));
//! ```

mod operators;
pub mod registry;

pub use registry::{symb, symb_anon, symb_fresh, symb_get, symbol_count, symbol_exists};

use std::sync::Arc;

use slotmap::DefaultKey;

use crate::Expr;

// ============================================================================
// Public Symbol Type
// ============================================================================

/// Lightweight `Copy` handle to a symbol.
///
/// A symbol is its name slot plus a serial: `0` for the symbol interned under
/// that name, a unique counter value for fresh and anonymous symbols.
/// Equality and hashing use both, never the display text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    name: Option<DefaultKey>,
    serial: u64,
}

impl Symbol {
    pub(crate) const fn new(name: Option<DefaultKey>, serial: u64) -> Self {
        Self { name, serial }
    }

    /// Create a fresh named symbol, distinct from every other symbol
    #[must_use]
    pub fn fresh(name: &str) -> Self {
        registry::symb_fresh(name)
    }

    /// Create a new anonymous symbol
    #[must_use]
    pub fn anon() -> Self {
        registry::symb_anon()
    }

    /// Serial of a fresh or anonymous symbol; `0` for one interned by name
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.serial
    }

    /// Registry slot of the display name, `None` for anonymous symbols
    #[inline]
    #[must_use]
    pub const fn name_key(&self) -> Option<DefaultKey> {
        self.name
    }

    /// Get the name of the symbol (None for anonymous symbols)
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.name_arc().map(|arc| arc.to_string())
    }

    /// Get the name as an `Arc<str>` (avoiding String allocation)
    #[must_use]
    pub fn name_arc(&self) -> Option<Arc<str>> {
        self.name.and_then(registry::lookup_name)
    }

    /// Name used in diagnostics; anonymous symbols render as `$id`
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name().unwrap_or_else(|| format!("${}", self.id()))
    }

    /// Convert to an Expr
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        Expr::from_interned(InternedSymbol::new(*self, self.name_arc()))
    }

    /// Raise to a power
    pub fn pow(&self, exp: impl Into<Expr>) -> Expr {
        Expr::pow_static(self.to_expr(), exp.into())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// InternedSymbol - the leaf stored inside expressions
// ============================================================================

/// Symbol leaf carried by `ExprKind::Symbol`.
///
/// Holds the `Symbol` for identity and a cached copy of the name so that
/// display does not touch the registry.
#[derive(Debug, Clone)]
pub struct InternedSymbol {
    symbol: Symbol,
    name: Option<Arc<str>>,
}

impl InternedSymbol {
    pub(crate) const fn new(symbol: Symbol, name: Option<Arc<str>>) -> Self {
        Self { symbol, name }
    }

    /// The `Symbol` handle this leaf refers to
    #[inline]
    #[must_use]
    pub const fn symbol(&self) -> Symbol {
        self.symbol
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.symbol.id()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(n) => n.to_string(),
            None => format!("${}", self.id()),
        }
    }
}

// Identity comparison: the cached name never takes part
impl PartialEq for InternedSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for InternedSymbol {}

impl std::hash::Hash for InternedSymbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl PartialEq<Symbol> for InternedSymbol {
    fn eq(&self, other: &Symbol) -> bool {
        self.symbol == *other
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<Symbol> for Expr {
    fn from(s: Symbol) -> Self {
        s.to_expr()
    }
}

impl From<&Symbol> for Expr {
    fn from(s: &Symbol) -> Self {
        s.to_expr()
    }
}

impl From<f64> for Expr {
    fn from(n: f64) -> Self {
        Self::number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_basic() {
        let x = symb("symbol_mod_x");
        assert_eq!(x.name().as_deref(), Some("symbol_mod_x"));
        assert_eq!(format!("{}", x.to_expr()), "symbol_mod_x");
        assert_eq!(format!("{x}"), "symbol_mod_x");
    }

    #[test]
    fn test_fresh_symbols_same_name_distinct_identity() {
        let a = Symbol::fresh("V^m_l");
        let b = Symbol::fresh("V^m_l");
        assert_ne!(a, b);
        assert_eq!(a.name(), b.name());
        assert_ne!(a.to_expr(), b.to_expr());
    }

    #[test]
    fn test_anon_display() {
        let anon = Symbol::anon();
        assert_eq!(anon.display_name(), format!("${}", anon.id()));
        assert_ne!(anon.id(), 0);
        assert_eq!(symb("symbol_mod_serial").id(), 0);
    }

    #[test]
    fn test_interned_symbol_refers_back() {
        let x = symb("symbol_mod_back");
        let expr = x.to_expr();
        match expr.kind() {
            crate::ExprKind::Symbol(s) => {
                assert_eq!(s.symbol(), x);
                assert!(*s == x);
                assert_eq!(s.name(), Some("symbol_mod_back"));
            }
            other => panic!("Expected Symbol, got {other:?}"),
        }
    }
}
