//! Symbolic Crank-Nicolson stencils for option-pricing PDEs
//!
//! A small symbolic-algebra core with two finite-difference utilities on top:
//!
//! - **Coefficient extraction**: the linear coefficient of each named term in
//!   an affine expression, isolated by substituting the term with `1` and
//!   every other term with `0` ([`find_coefficients`]). [`split_affine`]
//!   also separates the constant and checks the affine assumption.
//! - **Crank-Nicolson discretization**: replaces `V`, `dV`, `Vx`, `Vxx` in a
//!   model expression with a stencil over six fresh gridpoints, picking the
//!   rule from the [`RowType`] ([`discretize_crank_nicolson`],
//!   [`CrankNicolson`]).
//!
//! Putting them together gives one row of the tridiagonal system
//! ([`StencilRow`]).
//!
//! # Usage Examples
//!
//! ```
//! use symb_cn::{CrankNicolson, PdeSymbols, RowType, symb};
//!
//! // Black-Scholes in log-space, one time step of length dt:
//! // -dV + dt*(0.5*s^2*Vxx + (r - 0.5*s^2)*Vx - r*V)
//! let vars = PdeSymbols::named("V", "dV", "Vx", "Vxx");
//! let (s, r, dt) = (symb("sigma"), symb("r"), symb("dt"));
//! let drift = r - 0.5 * s.pow(2.0);
//! let model = -vars.change
//!     + dt * (0.5 * s.pow(2.0) * vars.second + drift * vars.first - r * vars.value);
//!
//! let row = CrankNicolson::new(symb("dx"))
//!     .row(RowType::Normal)
//!     .assemble(&model, &vars)
//!     .unwrap();
//! println!("{row}");
//! ```
//!
//! # Backends
//!
//! [`find_coefficients`] and [`discretize_crank_nicolson`] are generic over
//! the [`Algebra`] trait; [`Expr`] is the backend shipped here.

mod coefficients;
mod core;
mod simplify;
mod stencil;

#[cfg(feature = "parallel")]
pub mod parallel;

#[cfg(test)]
mod tests;

// Re-export key types for easier usage
pub use coefficients::{
    AffineForm, AffineSplit, Coefficients, DEFAULT_AFFINE_TOLERANCE, find_coefficients,
    split_affine,
};
pub use crate::core::{
    Algebra, Bindings, Expr, ExprKind, InternedSymbol, LatexFormatter, StencilError, Symbol, symb,
    symb_anon, symb_fresh, symb_get, symbol_count, symbol_exists,
};
pub use stencil::row::{NumericRow, StencilRow, TridiagonalCoefficients};
pub use stencil::{
    CrankNicolson, DEFAULT_BASE_NAME, Discretized, Gridpoints, PdeSymbols, RowType,
    discretize_crank_nicolson, discretize_crank_nicolson_named,
};

/// Default maximum AST depth of a model expression
pub const DEFAULT_MAX_DEPTH: usize = 100;
/// Default maximum AST node count of a model expression
pub const DEFAULT_MAX_NODES: usize = 10_000;
