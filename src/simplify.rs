//! Opt-in like-term collection.
//!
//! The constructors never merge `2*x + 3*x`; they only fold numbers. The
//! affine split needs `(a + c) - c` to come back as `a`, so it runs
//! [`Expr::collect_terms`] on each coefficient. Nothing else in the crate
//! simplifies implicitly.

use rustc_hash::FxHashMap;

use crate::{Expr, ExprKind};

impl Expr {
    /// Merge like terms in every sum, bottom-up.
    ///
    /// Terms are grouped by their non-numeric part, so `2*x + 3*x` becomes
    /// `5*x` and `x - x` becomes `0`. A sum divided by a number is distributed
    /// first, so `(u + d)/2 - u/2` becomes `0.5*d`. Groups keep the order in
    /// which their first member appeared.
    ///
    /// # Example
    /// ```
    /// use symb_cn::symb;
    /// let a = symb("collect_doc_a");
    /// let c = symb("collect_doc_c");
    /// assert_eq!(((a + c) - c).collect_terms(), a.to_expr());
    /// ```
    #[must_use]
    pub fn collect_terms(&self) -> Self {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Symbol(_) => self.clone(),
            ExprKind::Sum(terms) => {
                combine_like_terms(terms.iter().map(|t| t.collect_terms()).collect())
            }
            ExprKind::Product(factors) => {
                let product = Self::product(factors.iter().map(|f| f.collect_terms()).collect());
                // n * (a + b) -> n*a + n*b so negated sums can cancel
                if let ExprKind::Product(factors) = &product.kind
                    && factors.len() == 2
                    && let (Some(n), ExprKind::Sum(terms)) =
                        (factors[0].as_number(), &factors[1].kind)
                {
                    return combine_like_terms(
                        terms
                            .iter()
                            .map(|t| Self::product(vec![Self::number(n), (**t).clone()]))
                            .collect(),
                    );
                }
                product
            }
            ExprKind::Div(u, v) => {
                let u = u.collect_terms();
                let v = v.collect_terms();
                if let (ExprKind::Sum(terms), Some(n)) = (&u.kind, v.as_number())
                    && n != 0.0
                {
                    let distributed = terms
                        .iter()
                        .map(|t| Self::div_expr((**t).clone(), Self::number(n)))
                        .collect();
                    return combine_like_terms(distributed);
                }
                Self::div_expr(u, v)
            }
            ExprKind::Pow(base, exp) => {
                Self::pow_static(base.collect_terms(), exp.collect_terms())
            }
        }
    }
}

fn combine_like_terms(terms: Vec<Expr>) -> Expr {
    let flat = Expr::sum(terms);
    let ExprKind::Sum(flat_terms) = &flat.kind else {
        return flat;
    };

    let mut groups: Vec<(Expr, f64)> = Vec::with_capacity(flat_terms.len());
    let mut index: FxHashMap<Expr, usize> = FxHashMap::default();
    for term in flat_terms {
        let (coeff, base) = split_coefficient(term);
        if let Some(&i) = index.get(&base) {
            groups[i].1 += coeff;
        } else {
            index.insert(base.clone(), groups.len());
            groups.push((base, coeff));
        }
    }

    // Nothing merged
    if groups.len() == flat_terms.len() {
        return flat;
    }

    Expr::sum(
        groups
            .into_iter()
            .filter(|(_, coeff)| *coeff != 0.0)
            .map(|(base, coeff)| Expr::product(vec![Expr::number(coeff), base]))
            .collect(),
    )
}

/// Split a term into its numeric coefficient and the rest; `(c, 1)` for a number
fn split_coefficient(term: &Expr) -> (f64, Expr) {
    match &term.kind {
        ExprKind::Number(n) => (*n, Expr::number(1.0)),
        ExprKind::Product(factors) => match factors[0].as_number() {
            Some(c) => {
                let rest = Expr::product_from_arcs(factors[1..].to_vec());
                let (inner, base) = split_coefficient(&rest);
                (c * inner, base)
            }
            None => (1.0, term.clone()),
        },
        ExprKind::Div(u, v) => match v.as_number() {
            Some(n) if n != 0.0 => {
                let (c, base) = split_coefficient(u);
                (c / n, base)
            }
            _ => (1.0, term.clone()),
        },
        ExprKind::Symbol(_) | ExprKind::Sum(_) | ExprKind::Pow(_, _) => (1.0, term.clone()),
    }
}
