//! The `Algebra` capability trait and the float comparison used by the affine
//! check.
//!
//! `Algebra` is the narrow surface the finite-difference utilities need from a
//! symbolic backend: numeric literals, symbol leaves, fresh symbols, integer
//! powers, substitution and the four arithmetic operators. [`Expr`](crate::Expr)
//! is the backend shipped with this crate.

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A symbolic expression backend usable by the coefficient extractor and the
/// Crank-Nicolson discretizer.
///
/// Implementors must treat values as immutable: `substitute` returns a new
/// value and leaves `self` untouched.
pub trait Algebra:
    Clone
    + PartialEq
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Leaf type compared by identity, not by display name.
    type Symbol: Copy + Eq + Hash + Debug;

    /// Numeric literal
    fn number(n: f64) -> Self;

    /// Wrap a symbol as an expression
    fn from_symbol(symbol: Self::Symbol) -> Self;

    /// Create a symbol that is distinct from every existing symbol, even one
    /// with the same display name.
    fn fresh_symbol(name: &str) -> Self::Symbol;

    /// Integer power
    fn powi(self, exp: i32) -> Self;

    /// Replace every occurrence of `symbol` with `value`
    fn substitute(&self, symbol: &Self::Symbol, value: &Self) -> Self;
}

/// Relative comparison used by the affine sample check
#[inline]
pub(crate) fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    let scale = 1.0_f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= tolerance * scale
}
