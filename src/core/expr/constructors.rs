//! Expression constructors.
//!
//! Every constructor is "smart": it flattens, folds numbers and applies the
//! 0/1 identities. Substitution rebuilds through these constructors, so a
//! substituted expression is already in the same reduced form as one built
//! directly.

use std::sync::Arc;

use super::{Expr, ExprKind, compute_expr_hash, next_id};
use crate::core::symbol::{InternedSymbol, symb};

impl Expr {
    /// Create a new expression with fresh ID
    #[must_use]
    pub fn new(kind: ExprKind) -> Self {
        let hash = compute_expr_hash(&kind);
        Self {
            id: next_id(),
            hash,
            kind,
        }
    }

    /// Get the unique ID of the expression
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Get the structural hash of the expression
    #[inline]
    #[must_use]
    pub const fn structural_hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Unwrap an `Arc<Expr>` without cloning when this is the last reference
    #[must_use]
    pub fn unwrap_arc(arc: Arc<Self>) -> Self {
        Arc::try_unwrap(arc).unwrap_or_else(|arc| (*arc).clone())
    }

    // -------------------------------------------------------------------------
    // Accessor methods
    // -------------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match &self.kind {
            ExprKind::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True only for the number `0` (either sign), never for a small value
    #[inline]
    pub fn is_zero_num(&self) -> bool {
        self.as_number() == Some(0.0)
    }

    #[inline]
    pub fn is_one_num(&self) -> bool {
        self.as_number() == Some(1.0)
    }

    // -------------------------------------------------------------------------
    // Basic constructors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn number(n: f64) -> Self {
        Self::new(ExprKind::Number(n))
    }

    /// Create a symbol expression (interned by name)
    pub fn symbol(s: impl AsRef<str>) -> Self {
        symb(s.as_ref()).to_expr()
    }

    pub(crate) fn from_interned(interned: InternedSymbol) -> Self {
        Self::new(ExprKind::Symbol(interned))
    }

    // -------------------------------------------------------------------------
    // N-ary Sum constructor
    // -------------------------------------------------------------------------

    /// Create a sum expression from terms.
    ///
    /// Flattens nested sums, folds numeric terms into one leading constant
    /// and drops it when exactly zero. Like terms are left alone; see
    /// [`Expr::collect_terms`].
    #[must_use]
    pub fn sum(terms: Vec<Self>) -> Self {
        Self::sum_from_arcs(terms.into_iter().map(Arc::new).collect())
    }

    /// Create sum from Arc terms
    #[must_use]
    pub fn sum_from_arcs(terms: Vec<Arc<Self>>) -> Self {
        let mut flat: Vec<Arc<Self>> = Vec::with_capacity(terms.len());
        let mut numeric_sum: f64 = 0.0;

        for t in terms {
            match &t.kind {
                ExprKind::Number(n) => numeric_sum += n,
                ExprKind::Sum(inner) => {
                    for term in inner {
                        if let ExprKind::Number(n) = term.kind {
                            numeric_sum += n;
                        } else {
                            flat.push(Arc::clone(term));
                        }
                    }
                }
                _ => flat.push(t),
            }
        }

        // Numbers first; -0.0 normalizes to 0
        if numeric_sum != 0.0 || flat.is_empty() {
            flat.insert(0, Arc::new(Self::number(numeric_sum + 0.0)));
        }

        if flat.len() == 1 {
            return Self::unwrap_arc(flat.pop().expect("flat has exactly one element"));
        }
        Self::new(ExprKind::Sum(flat))
    }

    // -------------------------------------------------------------------------
    // N-ary Product constructor
    // -------------------------------------------------------------------------

    /// Create a product expression from factors.
    ///
    /// Flattens nested products and folds numeric factors into one leading
    /// coefficient. An exact zero coefficient collapses the product to `0`;
    /// an exact unit coefficient is dropped.
    #[must_use]
    pub fn product(factors: Vec<Self>) -> Self {
        Self::product_from_arcs(factors.into_iter().map(Arc::new).collect())
    }

    /// Create product from Arc factors
    #[must_use]
    pub fn product_from_arcs(factors: Vec<Arc<Self>>) -> Self {
        let mut flat: Vec<Arc<Self>> = Vec::with_capacity(factors.len());
        let mut coefficient: f64 = 1.0;

        for f in factors {
            match &f.kind {
                ExprKind::Number(n) => coefficient *= n,
                ExprKind::Product(inner) => {
                    for factor in inner {
                        if let ExprKind::Number(n) = factor.kind {
                            coefficient *= n;
                        } else {
                            flat.push(Arc::clone(factor));
                        }
                    }
                }
                _ => flat.push(f),
            }
        }

        if coefficient == 0.0 {
            return Self::number(0.0);
        }
        if flat.is_empty() {
            return Self::number(coefficient);
        }
        if coefficient != 1.0 {
            flat.insert(0, Arc::new(Self::number(coefficient)));
        }

        if flat.len() == 1 {
            return Self::unwrap_arc(flat.pop().expect("flat has exactly one element"));
        }
        Self::new(ExprKind::Product(flat))
    }

    // -------------------------------------------------------------------------
    // Binary constructors
    // -------------------------------------------------------------------------

    /// a + b
    #[must_use]
    pub fn add_expr(left: Self, right: Self) -> Self {
        Self::sum(vec![left, right])
    }

    /// a - b → Sum([a, Product([-1, b])])
    #[must_use]
    pub fn sub_expr(left: Self, right: Self) -> Self {
        Self::sum(vec![left, right.negate()])
    }

    /// a * b
    #[must_use]
    pub fn mul_expr(left: Self, right: Self) -> Self {
        Self::product(vec![left, right])
    }

    /// Create division
    ///
    /// Inline optimizations:
    /// - `x / x = 1` for non-zero `x`
    /// - `m / n` folds when both are numbers and `n != 0`
    /// - `x / 1 = x`
    /// - `0 / x = 0` for `x` not the number zero
    ///
    /// Division by the literal `0` is kept as a node.
    #[must_use]
    pub fn div_expr(left: Self, right: Self) -> Self {
        if left == right && !left.is_zero_num() {
            return Self::number(1.0);
        }
        if let (Some(m), Some(n)) = (left.as_number(), right.as_number())
            && n != 0.0
        {
            return Self::number(m / n);
        }
        if right.is_one_num() {
            return left;
        }
        if left.is_zero_num() && !right.is_zero_num() {
            return Self::number(0.0);
        }
        Self::new(ExprKind::Div(Arc::new(left), Arc::new(right)))
    }

    /// Create a power
    ///
    /// Inline optimizations: `x^0 = 1`, `x^1 = x`, `1^x = 1`, `0^n = 0` for
    /// positive `n`, and numeric folding when the result is finite.
    #[must_use]
    pub fn pow_static(base: Self, exponent: Self) -> Self {
        if exponent.is_zero_num() {
            return Self::number(1.0);
        }
        if exponent.is_one_num() {
            return base;
        }
        if base.is_one_num() {
            return Self::number(1.0);
        }
        if base.is_zero_num()
            && let Some(n) = exponent.as_number()
            && n > 0.0
        {
            return Self::number(0.0);
        }
        if let (Some(b), Some(e)) = (base.as_number(), exponent.as_number()) {
            let result = b.powf(e);
            if result.is_finite() {
                return Self::number(result);
            }
        }
        Self::new(ExprKind::Pow(Arc::new(base), Arc::new(exponent)))
    }

    /// Raise to a power (since Rust `^` is XOR, not power)
    #[must_use]
    pub fn pow_of(self, exp: impl Into<Self>) -> Self {
        Self::pow_static(self, exp.into())
    }

    /// -x → Product([-1, x])
    #[must_use]
    pub fn negate(self) -> Self {
        Self::product(vec![Self::number(-1.0), self])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_folds_numbers_first() {
        let x = Expr::symbol("ctor_x");
        let s = Expr::sum(vec![Expr::number(2.0), x.clone(), Expr::number(3.0)]);
        match &s.kind {
            ExprKind::Sum(terms) => {
                assert_eq!(terms[0].as_number(), Some(5.0));
                assert_eq!(*terms[1], x);
            }
            other => panic!("Expected Sum, got {other:?}"),
        }
    }

    #[test]
    fn test_sum_drops_zero_and_collapses() {
        let x = Expr::symbol("ctor_zero_x");
        assert_eq!(Expr::sum(vec![x.clone(), Expr::number(0.0)]), x);
        assert_eq!(Expr::sum(vec![]), Expr::number(0.0));
        assert_eq!(
            Expr::sum(vec![Expr::number(1.5), Expr::number(-1.5)]),
            Expr::number(0.0)
        );
    }

    #[test]
    fn test_product_identities() {
        let x = Expr::symbol("ctor_prod_x");
        assert_eq!(Expr::product(vec![x.clone(), Expr::number(1.0)]), x);
        assert_eq!(
            Expr::product(vec![x.clone(), Expr::number(0.0)]),
            Expr::number(0.0)
        );
        assert_eq!(Expr::product(vec![]), Expr::number(1.0));

        let scaled = Expr::product(vec![x.clone(), Expr::number(2.0), Expr::number(3.0)]);
        match &scaled.kind {
            ExprKind::Product(factors) => {
                assert_eq!(factors.len(), 2);
                assert_eq!(factors[0].as_number(), Some(6.0));
            }
            other => panic!("Expected Product, got {other:?}"),
        }
    }

    #[test]
    fn test_tiny_numbers_are_kept() {
        let x = Expr::symbol("ctor_tiny_x");

        let scaled = Expr::product(vec![Expr::number(1e-15), x.clone()]);
        assert_eq!(scaled.to_string(), "0.000000000000001*ctor_tiny_x");

        let folded = Expr::product(vec![Expr::number(1e-8), x.clone(), Expr::number(1e-8)]);
        match &folded.kind {
            ExprKind::Product(factors) => assert_eq!(factors[0].as_number(), Some(1e-8 * 1e-8)),
            other => panic!("Expected Product, got {other:?}"),
        }

        let shifted = Expr::sum(vec![x.clone(), Expr::number(1e-15)]);
        assert_eq!(shifted, Expr::sum(vec![Expr::number(1e-15), x.clone()]));
        assert_ne!(shifted, x);

        assert!(!Expr::number(1e-300).is_zero_num());
        assert!(Expr::number(-0.0).is_zero_num());
        assert_eq!(Expr::sum(vec![Expr::number(-0.0)]).as_number(), Some(0.0));
    }

    #[test]
    fn test_double_negation_cancels() {
        let x = Expr::symbol("ctor_neg_x");
        assert_eq!(x.clone().negate().negate(), x);
    }

    #[test]
    fn test_div_rules() {
        let x = Expr::symbol("ctor_div_x");
        assert_eq!(Expr::div_expr(x.clone(), x.clone()), Expr::number(1.0));
        assert_eq!(Expr::div_expr(x.clone(), Expr::number(1.0)), x);
        assert_eq!(
            Expr::div_expr(Expr::number(0.0), x.clone()),
            Expr::number(0.0)
        );
        assert_eq!(
            Expr::div_expr(Expr::number(1.0), Expr::number(4.0)),
            Expr::number(0.25)
        );
        assert!(matches!(
            Expr::div_expr(x, Expr::number(0.0)).kind,
            ExprKind::Div(_, _)
        ));
    }

    #[test]
    fn test_pow_rules() {
        let x = Expr::symbol("ctor_pow_x");
        assert_eq!(x.clone().pow_of(0.0), Expr::number(1.0));
        assert_eq!(x.clone().pow_of(1.0), x);
        assert_eq!(Expr::number(3.0).pow_of(2.0), Expr::number(9.0));
        assert_eq!(Expr::number(0.0).pow_of(2.0), Expr::number(0.0));
        assert!(matches!(x.pow_of(2.0).kind, ExprKind::Pow(_, _)));
    }
}
