//! Core types for symbolic algebra
//!
//! This module contains the fundamental types:
//! - `Expr` / `ExprKind` - Expression AST
//! - `Symbol` / `InternedSymbol` - Symbol system
//! - `StencilError` - Error types
//! - Display formatting (to_string, to_latex)
//! - `Algebra` - the backend trait the stencil utilities are generic over

mod display; // Display implementations for Expr
pub(crate) mod error;
pub(crate) mod expr;
pub(crate) mod symbol;
pub(crate) mod traits;

// Public re-exports (for external API)
pub use display::LatexFormatter;
pub use error::StencilError;
pub use expr::{Bindings, Expr, ExprKind};
pub use symbol::{
    InternedSymbol, Symbol, symb, symb_anon, symb_fresh, symb_get, symbol_count, symbol_exists,
};
pub use traits::Algebra;

impl Algebra for Expr {
    type Symbol = Symbol;

    fn number(n: f64) -> Self {
        Self::number(n)
    }

    fn from_symbol(symbol: Symbol) -> Self {
        symbol.to_expr()
    }

    fn fresh_symbol(name: &str) -> Symbol {
        Symbol::fresh(name)
    }

    fn powi(self, exp: i32) -> Self {
        Self::pow_static(self, Self::number(f64::from(exp)))
    }

    fn substitute(&self, symbol: &Symbol, value: &Self) -> Self {
        Self::substitute(self, symbol, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double<E: Algebra>(e: E) -> E {
        e.clone() + e
    }

    #[test]
    fn test_expr_is_an_algebra() {
        let x = symb("core_alg_x");
        let e = <Expr as Algebra>::from_symbol(x);
        assert_eq!(double(e.clone()), x + x);
        assert_eq!(
            Algebra::substitute(&e.clone().powi(2), &x, &Expr::number(3.0)),
            Expr::number(9.0)
        );
    }

    #[test]
    fn test_fresh_symbol_through_trait() {
        let a = <Expr as Algebra>::fresh_symbol("core_alg_fresh");
        let b = <Expr as Algebra>::fresh_symbol("core_alg_fresh");
        assert_ne!(a, b);
        assert_ne!(symb("core_alg_fresh"), a);
    }
}
