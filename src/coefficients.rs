//! Linear coefficient extraction by zeroing.
//!
//! [`find_coefficients`] reads off the coefficient of each requested term by
//! substituting that term with `1` and every other term with `0`. It assumes,
//! without checking, that the expression is affine in the terms:
//!
//! ```text
//! expr = constant + Σ term_i * coefficient_i
//! ```
//!
//! A constant independent of every term therefore shows up in *every*
//! coefficient. [`AffineSplit`] separates the constant out and can verify the
//! affine assumption numerically at two sample points.

use log::{debug, trace};

use crate::core::traits::approx_eq;
use crate::{Algebra, Bindings, Expr, StencilError, Symbol};

/// Default relative tolerance of the affine sample check
pub const DEFAULT_AFFINE_TOLERANCE: f64 = 1e-9;

const PROBE_POINTS: usize = 2;

// =============================================================================
// Coefficients
// =============================================================================

/// Ordered mapping from term to coefficient.
///
/// One entry per distinct requested term, in first-occurrence order.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients<S, E> {
    entries: Vec<(S, E)>,
}

impl<S: PartialEq, E> Coefficients<S, E> {
    /// Coefficient of `symbol`, if it was requested
    pub fn get(&self, symbol: &S) -> Option<&E> {
        self.entries
            .iter()
            .find_map(|(s, e)| (s == symbol).then_some(e))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (S, E)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The terms, in order
    pub fn symbols(&self) -> impl Iterator<Item = &S> {
        self.entries.iter().map(|(s, _)| s)
    }

    fn map_values<F>(self, mut f: F) -> Self
    where
        F: FnMut(E) -> E,
    {
        Self {
            entries: self.entries.into_iter().map(|(s, e)| (s, f(e))).collect(),
        }
    }
}

impl<S, E> IntoIterator for Coefficients<S, E> {
    type Item = (S, E);
    type IntoIter = std::vec::IntoIter<(S, E)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, S, E> IntoIterator for &'a Coefficients<S, E> {
    type Item = &'a (S, E);
    type IntoIter = std::slice::Iter<'a, (S, E)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// =============================================================================
// Extraction
// =============================================================================

/// Coefficient of each term in an expression assumed affine in `terms`.
///
/// For every term `s`: substitute `s -> 1`, then every other term `-> 0` in
/// input order. Whatever the backend's constructors make of the result is the
/// coefficient. Repeated terms yield a single entry. No precondition is
/// checked; see [`split_affine`] for a checked variant.
///
/// # Example
/// ```
/// use symb_cn::{find_coefficients, symb};
///
/// let (a, b, x, y) = (symb("fc_a"), symb("fc_b"), symb("fc_x"), symb("fc_y"));
/// let expr = a * x + b * y;
/// let coeffs = find_coefficients(&expr, &[x, y]);
/// assert_eq!(coeffs.get(&x), Some(&a.to_expr()));
/// assert_eq!(coeffs.get(&y), Some(&b.to_expr()));
/// ```
pub fn find_coefficients<E: Algebra>(expr: &E, terms: &[E::Symbol]) -> Coefficients<E::Symbol, E> {
    let one = E::number(1.0);
    let zero = E::number(0.0);

    let mut entries = Vec::with_capacity(terms.len());
    for (i, target) in terms.iter().enumerate() {
        if terms[..i].contains(target) {
            continue;
        }
        let coefficient = terms
            .iter()
            .filter(|other| *other != target)
            .fold(expr.substitute(target, &one), |acc, other| {
                acc.substitute(other, &zero)
            });
        trace!("coefficient of {target:?}: {coefficient:?}");
        entries.push((*target, coefficient));
    }
    Coefficients { entries }
}

// =============================================================================
// Affine split
// =============================================================================

/// `constant + Σ term * coefficient`, with the constant separated out.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineForm<S, E> {
    pub constant: E,
    pub coefficients: Coefficients<S, E>,
}

impl AffineForm<Symbol, Expr> {
    /// Rebuild `constant + Σ term * coefficient`
    pub fn to_expr(&self) -> Expr {
        let mut terms = Vec::with_capacity(self.coefficients.len() + 1);
        terms.push(self.constant.clone());
        for (symbol, coefficient) in &self.coefficients {
            terms.push(Expr::mul_expr(symbol.to_expr(), coefficient.clone()));
        }
        Expr::sum(terms)
    }
}

/// Builder for the checked affine split
///
/// # Example
/// ```
/// use symb_cn::{AffineSplit, Expr, StencilError, symb};
///
/// let x = symb("as_doc_x");
/// let c = symb("as_doc_c");
/// let form = AffineSplit::new().split(&(3.0 * x + c), &[x]).unwrap();
/// assert_eq!(form.constant, c.to_expr());
/// assert_eq!(form.coefficients.get(&x), Some(&Expr::number(3.0)));
///
/// let squared = AffineSplit::new().split(&x.pow(2.0), &[x]);
/// assert!(matches!(squared, Err(StencilError::NotAffine { .. })));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AffineSplit {
    tolerance: f64,
    verify: bool,
}

impl Default for AffineSplit {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_AFFINE_TOLERANCE,
            verify: true,
        }
    }
}

impl AffineSplit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative tolerance of the sample comparison
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Enable or disable the sample check
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Split `expr` into a constant and one coefficient per term.
    ///
    /// The constant is `expr` with every term set to `0`; each coefficient is
    /// the zeroing coefficient minus that constant, with like terms
    /// collected. Coefficients are exact for affine input but are not
    /// otherwise simplified.
    ///
    /// # Errors
    /// - `NotAffine` when the sample check is enabled and `expr` disagrees with
    ///   its affine reconstruction; `term` names the first term whose
    ///   coefficient does not match a one-term variation
    /// - `UnboundSymbol` / `NonFinite` when a sample evaluation fails, e.g. a
    ///   division by the literal `0`
    pub fn split(
        &self,
        expr: &Expr,
        terms: &[Symbol],
    ) -> Result<AffineForm<Symbol, Expr>, StencilError> {
        let zero = Expr::number(0.0);
        let constant = terms
            .iter()
            .fold(expr.clone(), |acc, t| acc.substitute(t, &zero));

        let negated_constant = negated_terms(&constant);
        let coefficients = find_coefficients(expr, terms).map_values(|raw| {
            let mut parts = Vec::with_capacity(negated_constant.len() + 1);
            parts.push(raw);
            parts.extend(negated_constant.iter().cloned());
            Expr::sum(parts).collect_terms()
        });

        let form = AffineForm {
            constant,
            coefficients,
        };
        if self.verify {
            self.check_samples(expr, terms, &form)?;
        }
        Ok(form)
    }

    fn check_samples(
        &self,
        expr: &Expr,
        terms: &[Symbol],
        form: &AffineForm<Symbol, Expr>,
    ) -> Result<(), StencilError> {
        let mut symbols = expr.free_symbols();
        for t in terms {
            if !symbols.contains(t) {
                symbols.push(*t);
            }
        }

        for point in 0..PROBE_POINTS {
            let bindings = sample_bindings(&symbols, point);
            let actual = expr.eval_f64(&bindings)?;
            let predicted = evaluate_form(form, &bindings)?;
            if approx_eq(actual, predicted, self.tolerance) {
                continue;
            }

            let residual = (actual - predicted).abs();
            let term = self
                .offending_term(expr, form, &bindings)?
                .or_else(|| terms.first().copied());
            let term = term.map_or_else(String::new, |s| s.display_name());
            debug!("affine check failed at sample {point}: '{term}', residual {residual:e}");
            return Err(StencilError::NotAffine { term, residual });
        }
        Ok(())
    }

    /// First term whose coefficient disagrees with a one-term variation
    fn offending_term(
        &self,
        expr: &Expr,
        form: &AffineForm<Symbol, Expr>,
        bindings: &Bindings,
    ) -> Result<Option<Symbol>, StencilError> {
        let base = expr.eval_f64(bindings)?;
        for (symbol, coefficient) in &form.coefficients {
            let Some(&value) = bindings.get(symbol) else {
                continue;
            };
            let mut shifted = bindings.clone();
            shifted.insert(*symbol, value + 1.0);

            let delta = expr.eval_f64(&shifted)? - base;
            let slope = coefficient.eval_f64(bindings)?;
            if !approx_eq(delta, slope, self.tolerance) {
                return Ok(Some(*symbol));
            }
        }
        Ok(None)
    }
}

/// [`AffineSplit`] with default settings
///
/// # Errors
/// See [`AffineSplit::split`].
pub fn split_affine(
    expr: &Expr,
    terms: &[Symbol],
) -> Result<AffineForm<Symbol, Expr>, StencilError> {
    AffineSplit::new().split(expr, terms)
}

fn negated_terms(expr: &Expr) -> Vec<Expr> {
    match expr.kind() {
        crate::ExprKind::Sum(terms) => terms.iter().map(|t| (**t).clone().negate()).collect(),
        _ if expr.is_zero_num() => Vec::new(),
        _ => vec![expr.clone().negate()],
    }
}

fn evaluate_form(
    form: &AffineForm<Symbol, Expr>,
    bindings: &Bindings,
) -> Result<f64, StencilError> {
    let mut total = form.constant.eval_f64(bindings)?;
    for (symbol, coefficient) in &form.coefficients {
        let value = bindings
            .get(symbol)
            .copied()
            .ok_or_else(|| StencilError::UnboundSymbol(symbol.display_name()))?;
        total += coefficient.eval_f64(bindings)? * value;
    }
    Ok(total)
}

/// Deterministic values in roughly [0.75, 2.35], never 0 or 1
#[allow(clippy::cast_precision_loss)]
fn sample_bindings(symbols: &[Symbol], point: usize) -> Bindings {
    symbols
        .iter()
        .enumerate()
        .map(|(k, s)| {
            let step = (k * 37 + point * 101) % 97;
            (*s, 0.75 + step as f64 / 61.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symb;
    use approx::assert_relative_eq;

    #[test]
    fn test_affine_two_terms() {
        let a = symb("coef_a");
        let b = symb("coef_b");
        let x = symb("coef_x");
        let y = symb("coef_y");

        let coeffs = find_coefficients(&(a * x + b * y), &[x, y]);
        assert_eq!(coeffs.len(), 2);
        assert_eq!(coeffs.get(&x), Some(&a.to_expr()));
        assert_eq!(coeffs.get(&y), Some(&b.to_expr()));
        assert_eq!(coeffs.symbols().copied().collect::<Vec<_>>(), vec![x, y]);
    }

    #[test]
    fn test_constant_leaks_into_every_coefficient() {
        let a = symb("coef_leak_a");
        let b = symb("coef_leak_b");
        let c = symb("coef_leak_c");
        let x = symb("coef_leak_x");
        let y = symb("coef_leak_y");

        let coeffs = find_coefficients(&(a * x + b * y + c), &[x, y]);
        assert_eq!(coeffs.get(&x), Some(&(a + c)));
        assert_eq!(coeffs.get(&y), Some(&(b + c)));
    }

    #[test]
    fn test_empty_terms() {
        let x = symb("coef_empty_x");
        assert!(find_coefficients(&(2.0 * x), &[]).is_empty());
    }

    #[test]
    fn test_duplicate_terms_collapse() {
        let x = symb("coef_dup_x");
        let y = symb("coef_dup_y");
        let coeffs = find_coefficients(&(3.0 * x + 4.0 * y), &[x, y, x]);
        assert_eq!(coeffs.len(), 2);
        assert_eq!(coeffs.get(&x), Some(&Expr::number(3.0)));
        assert_eq!(coeffs.get(&y), Some(&Expr::number(4.0)));
    }

    #[test]
    fn test_unrequested_term_has_no_entry() {
        let x = symb("coef_missing_x");
        let y = symb("coef_missing_y");
        let coeffs = find_coefficients(&(x + y), &[x]);
        assert_eq!(coeffs.get(&y), None);
        // y is not zeroed: it is not in the term set
        assert_eq!(coeffs.get(&x), Some(&(1.0 + y)));
    }

    #[test]
    fn test_non_affine_is_unchecked() {
        let x = symb("coef_sq_x");
        let coeffs = find_coefficients(&(x.pow(2.0) + 5.0 * x), &[x]);
        // 1^2 + 5*1: well-defined but not a linear coefficient
        assert_eq!(coeffs.get(&x), Some(&Expr::number(6.0)));
    }

    #[test]
    fn test_split_removes_constant() {
        let a = symb("split_a");
        let b = symb("split_b");
        let c = symb("split_c");
        let x = symb("split_x");
        let y = symb("split_y");

        let form = split_affine(&(a * x + b * y + c), &[x, y]).unwrap();
        assert_eq!(form.constant, c.to_expr());
        assert_eq!(form.coefficients.get(&x), Some(&a.to_expr()));
        assert_eq!(form.coefficients.get(&y), Some(&b.to_expr()));
    }

    #[test]
    fn test_split_symbolic_constant_sum() {
        let k = symb("split_sum_k");
        let r = symb("split_sum_r");
        let x = symb("split_sum_x");
        let expr = 2.0 * x + k + 3.0 * r;

        let form = split_affine(&expr, &[x]).unwrap();
        assert_eq!(form.coefficients.get(&x), Some(&Expr::number(2.0)));
        assert_eq!(form.constant, k + 3.0 * r);
    }

    #[test]
    fn test_split_rejects_square() {
        let x = symb("split_sq_x");
        let y = symb("split_sq_y");
        let err = split_affine(&(x.pow(2.0) + y), &[x, y]).unwrap_err();
        match err {
            StencilError::NotAffine { term, residual } => {
                assert_eq!(term, "split_sq_x");
                assert!(residual > 0.0);
            }
            other => panic!("Expected NotAffine, got {other:?}"),
        }
    }

    #[test]
    fn test_split_rejects_cross_term() {
        let x = symb("split_cross_x");
        let y = symb("split_cross_y");
        let result = split_affine(&(x * y), &[x, y]);
        assert!(matches!(result, Err(StencilError::NotAffine { .. })));
    }

    #[test]
    fn test_split_without_verification_accepts_anything() {
        let x = symb("split_noverify_x");
        let form = AffineSplit::new()
            .verify(false)
            .split(&(x.pow(2.0) + 5.0 * x), &[x])
            .unwrap();
        assert_eq!(form.coefficients.get(&x), Some(&Expr::number(6.0)));
    }

    #[test]
    fn test_round_trip_matches_numerically() {
        let a = symb("split_rt_a");
        let c = symb("split_rt_c");
        let x = symb("split_rt_x");
        let y = symb("split_rt_y");
        let expr = (a * x + 2.0 * y) / 4.0 + c;

        let form = split_affine(&expr, &[x, y]).unwrap();
        let mut bindings = Bindings::default();
        for (s, v) in [(a, 1.5), (c, -2.0), (x, 0.3), (y, 7.0)] {
            bindings.insert(s, v);
        }
        assert_relative_eq!(
            form.to_expr().eval_f64(&bindings).unwrap(),
            expr.eval_f64(&bindings).unwrap(),
            max_relative = 1e-12
        );
    }
}
