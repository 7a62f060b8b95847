//! Substitution, numeric evaluation and tree analysis.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use super::{Expr, ExprKind};
use crate::{StencilError, Symbol};

/// Numeric values bound to symbols for evaluation
pub type Bindings = FxHashMap<Symbol, f64>;

impl Expr {
    // -------------------------------------------------------------------------
    // Substitution
    // -------------------------------------------------------------------------

    /// Replace every occurrence of `symbol` with `replacement`.
    ///
    /// The result is rebuilt through the smart constructors, so
    /// `(a*x).substitute(x, 0)` is `0`, not `a*0`. Unchanged subtrees are
    /// shared with `self`.
    ///
    /// # Example
    /// ```
    /// use symb_cn::{Expr, symb};
    /// let x = symb("subs_doc_x");
    /// let y = symb("subs_doc_y");
    /// let expr = x * y;
    /// assert_eq!(expr.substitute(&x, &Expr::number(1.0)), y.to_expr());
    /// ```
    #[must_use]
    pub fn substitute(&self, symbol: &Symbol, replacement: &Self) -> Self {
        self.substitute_changed(symbol, replacement)
            .unwrap_or_else(|| self.clone())
    }

    /// Apply substitutions one after another, each on the result of the last.
    #[must_use]
    pub fn substitute_all(&self, substitutions: &[(Symbol, Self)]) -> Self {
        let mut out = self.clone();
        for (symbol, value) in substitutions {
            out = out.substitute(symbol, value);
        }
        out
    }

    /// Returns None when `symbol` does not occur
    fn substitute_changed(&self, symbol: &Symbol, replacement: &Self) -> Option<Self> {
        match &self.kind {
            ExprKind::Number(_) => None,
            ExprKind::Symbol(s) => (*s == *symbol).then(|| replacement.clone()),
            ExprKind::Sum(children) => {
                let rebuilt = Self::substitute_children(children, symbol, replacement)?;
                Some(Self::sum_from_arcs(rebuilt))
            }
            ExprKind::Product(children) => {
                let rebuilt = Self::substitute_children(children, symbol, replacement)?;
                Some(Self::product_from_arcs(rebuilt))
            }
            ExprKind::Div(u, v) | ExprKind::Pow(u, v) => {
                let new_u = u.substitute_changed(symbol, replacement);
                let new_v = v.substitute_changed(symbol, replacement);
                if new_u.is_none() && new_v.is_none() {
                    return None;
                }
                let u = new_u.unwrap_or_else(|| (**u).clone());
                let v = new_v.unwrap_or_else(|| (**v).clone());
                Some(if matches!(self.kind, ExprKind::Div(_, _)) {
                    Self::div_expr(u, v)
                } else {
                    Self::pow_static(u, v)
                })
            }
        }
    }

    fn substitute_children(
        children: &[Arc<Self>],
        symbol: &Symbol,
        replacement: &Self,
    ) -> Option<Vec<Arc<Self>>> {
        let mut changed = false;
        let rebuilt: Vec<Arc<Self>> = children
            .iter()
            .map(|c| match c.substitute_changed(symbol, replacement) {
                Some(new) => {
                    changed = true;
                    Arc::new(new)
                }
                None => Arc::clone(c),
            })
            .collect();
        changed.then_some(rebuilt)
    }

    // -------------------------------------------------------------------------
    // Evaluation
    // -------------------------------------------------------------------------

    /// Partial evaluation: bound symbols become numbers, the rest stay symbolic.
    #[must_use]
    pub fn evaluate(&self, bindings: &Bindings) -> Self {
        let mut out = self.clone();
        for (symbol, value) in bindings {
            out = out.substitute(symbol, &Self::number(*value));
        }
        out
    }

    /// Full numeric evaluation.
    ///
    /// # Errors
    /// `UnboundSymbol` if a symbol has no value, `NonFinite` if the result is
    /// NaN or infinite (e.g. division by a zero step).
    pub fn eval_f64(&self, bindings: &Bindings) -> Result<f64, StencilError> {
        let value = self.eval_inner(bindings)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(StencilError::NonFinite)
        }
    }

    fn eval_inner(&self, bindings: &Bindings) -> Result<f64, StencilError> {
        match &self.kind {
            ExprKind::Number(n) => Ok(*n),
            ExprKind::Symbol(s) => match bindings.get(&s.symbol()) {
                Some(value) => Ok(*value),
                None => Err(StencilError::UnboundSymbol(s.display_name())),
            },
            ExprKind::Sum(terms) => terms.iter().map(|t| t.eval_inner(bindings)).sum(),
            ExprKind::Product(factors) => {
                factors.iter().map(|f| f.eval_inner(bindings)).product()
            }
            ExprKind::Div(u, v) => Ok(u.eval_inner(bindings)? / v.eval_inner(bindings)?),
            ExprKind::Pow(u, v) => Ok(u.eval_inner(bindings)?.powf(v.eval_inner(bindings)?)),
        }
    }

    // -------------------------------------------------------------------------
    // Analysis
    // -------------------------------------------------------------------------

    /// Count the total number of nodes in the AST
    pub fn node_count(&self) -> usize {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Symbol(_) => 1,
            ExprKind::Sum(c) | ExprKind::Product(c) => {
                1 + c.iter().map(|a| a.node_count()).sum::<usize>()
            }
            ExprKind::Div(l, r) | ExprKind::Pow(l, r) => 1 + l.node_count() + r.node_count(),
        }
    }

    /// Get the maximum nesting depth of the AST
    pub fn max_depth(&self) -> usize {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Symbol(_) => 1,
            ExprKind::Sum(c) | ExprKind::Product(c) => {
                1 + c.iter().map(|a| a.max_depth()).max().unwrap_or(0)
            }
            ExprKind::Div(l, r) | ExprKind::Pow(l, r) => 1 + l.max_depth().max(r.max_depth()),
        }
    }

    /// Check if the expression contains a specific symbol (by identity)
    pub fn contains_symbol(&self, symbol: &Symbol) -> bool {
        match &self.kind {
            ExprKind::Number(_) => false,
            ExprKind::Symbol(s) => *s == *symbol,
            ExprKind::Sum(c) | ExprKind::Product(c) => c.iter().any(|a| a.contains_symbol(symbol)),
            ExprKind::Div(l, r) | ExprKind::Pow(l, r) => {
                l.contains_symbol(symbol) || r.contains_symbol(symbol)
            }
        }
    }

    /// All symbols in the expression, in first-occurrence order
    pub fn free_symbols(&self) -> Vec<Symbol> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        self.collect_symbols(&mut seen, &mut out);
        out
    }

    fn collect_symbols(&self, seen: &mut FxHashSet<Symbol>, out: &mut Vec<Symbol>) {
        match &self.kind {
            ExprKind::Number(_) => {}
            ExprKind::Symbol(s) => {
                if seen.insert(s.symbol()) {
                    out.push(s.symbol());
                }
            }
            ExprKind::Sum(c) | ExprKind::Product(c) => {
                for child in c {
                    child.collect_symbols(seen, out);
                }
            }
            ExprKind::Div(l, r) | ExprKind::Pow(l, r) => {
                l.collect_symbols(seen, out);
                r.collect_symbols(seen, out);
            }
        }
    }
}
