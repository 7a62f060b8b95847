//! Display implementations for expressions.
//!
//! ## Standard Display (`to_string()` / `{}`)
//! - `V^u_l + V^d_l - 2*V^m_l`
//! - `(V^m_l + V^m_r)/2`
//!
//! ## LaTeX Format (`to_latex()`)
//! - `\frac{V^m_l + V^m_r}{2}`
//!
//! Sums print negative terms with ` - `; products print a leading `-` for a
//! negative coefficient.

use std::fmt;
use std::sync::Arc;

use crate::{Expr, ExprKind};

#[derive(Clone, Copy)]
enum FormatMode {
    Standard,
    Latex,
}

/// Returns the positive counterpart of a term with a negative leading coefficient
fn extract_negative(expr: &Expr) -> Option<Expr> {
    match &expr.kind {
        ExprKind::Product(factors) => extract_negative_product(factors),
        ExprKind::Number(n) if *n < 0.0 => Some(Expr::number(-*n)),
        _ => None,
    }
}

fn format_recursive(f: &mut fmt::Formatter<'_>, expr: &Expr, mode: FormatMode) -> fmt::Result {
    match mode {
        FormatMode::Standard => write!(f, "{expr}"),
        FormatMode::Latex => write!(f, "{}", LatexFormatter { expr }),
    }
}

/// Parenthesize sums appearing as product factors
fn format_factor(f: &mut fmt::Formatter<'_>, expr: &Expr, mode: FormatMode) -> fmt::Result {
    if matches!(expr.kind, ExprKind::Sum(_)) {
        let (open, close) = match mode {
            FormatMode::Standard => ("(", ")"),
            FormatMode::Latex => (r"\left(", r"\right)"),
        };
        write!(f, "{open}")?;
        format_recursive(f, expr, mode)?;
        write!(f, "{close}")
    } else {
        format_recursive(f, expr, mode)
    }
}

fn format_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        write!(f, "{}", if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.fract() == 0.0 && n.abs() < 1e10 {
        #[allow(clippy::cast_possible_truncation)]
        let n_int = n as i64;
        write!(f, "{n_int}")
    } else {
        write!(f, "{n}")
    }
}

fn format_sum(f: &mut fmt::Formatter<'_>, terms: &[Arc<Expr>], mode: FormatMode) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        match (i, extract_negative(term)) {
            (0, Some(positive)) => {
                write!(f, "-")?;
                format_factor(f, &positive, mode)?;
            }
            (0, None) => format_recursive(f, term, mode)?,
            (_, Some(positive)) => {
                write!(f, " - ")?;
                format_factor(f, &positive, mode)?;
            }
            (_, None) => {
                write!(f, " + ")?;
                format_recursive(f, term, mode)?;
            }
        }
    }
    Ok(())
}

fn format_product(
    f: &mut fmt::Formatter<'_>,
    factors: &[Arc<Expr>],
    mode: FormatMode,
) -> fmt::Result {
    let sep = match mode {
        FormatMode::Standard => "*",
        FormatMode::Latex => r" \cdot ",
    };

    if let Some(positive) = extract_negative_product(factors) {
        write!(f, "-")?;
        return format_factor(f, &positive, mode);
    }

    for (i, factor) in factors.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        format_factor(f, factor, mode)?;
    }
    Ok(())
}

fn extract_negative_product(factors: &[Arc<Expr>]) -> Option<Expr> {
    if let ExprKind::Number(n) = factors[0].kind
        && n < 0.0
    {
        let mut rest: Vec<Arc<Expr>> = Vec::with_capacity(factors.len());
        if n != -1.0 {
            rest.push(Arc::new(Expr::number(-n)));
        }
        rest.extend_from_slice(&factors[1..]);
        return Some(Expr::product_from_arcs(rest));
    }
    None
}

fn format_div(f: &mut fmt::Formatter<'_>, u: &Expr, v: &Expr, mode: FormatMode) -> fmt::Result {
    if matches!(mode, FormatMode::Latex) {
        write!(f, r"\frac{{")?;
        format_recursive(f, u, mode)?;
        write!(f, "}}{{")?;
        format_recursive(f, v, mode)?;
        return write!(f, "}}");
    }

    if matches!(u.kind, ExprKind::Sum(_)) {
        write!(f, "(")?;
        format_recursive(f, u, mode)?;
        write!(f, ")/")?;
    } else {
        format_recursive(f, u, mode)?;
        write!(f, "/")?;
    }

    // Parenthesize denominator if it's not simple
    if matches!(v.kind, ExprKind::Symbol(_) | ExprKind::Pow(_, _))
        || v.as_number().is_some_and(|n| n >= 0.0)
    {
        format_recursive(f, v, mode)
    } else {
        write!(f, "(")?;
        format_recursive(f, v, mode)?;
        write!(f, ")")
    }
}

fn format_pow(f: &mut fmt::Formatter<'_>, u: &Expr, v: &Expr, mode: FormatMode) -> fmt::Result {
    let base_needs_parens = match &u.kind {
        ExprKind::Number(n) => *n < 0.0,
        ExprKind::Symbol(_) => false,
        _ => true,
    };

    let (open, close) = match mode {
        FormatMode::Standard => ("(", ")"),
        FormatMode::Latex => (r"\left(", r"\right)"),
    };
    if base_needs_parens {
        write!(f, "{open}")?;
        format_recursive(f, u, mode)?;
        write!(f, "{close}")?;
    } else {
        format_recursive(f, u, mode)?;
    }

    match mode {
        FormatMode::Latex => {
            write!(f, "^{{")?;
            format_recursive(f, v, mode)?;
            write!(f, "}}")
        }
        FormatMode::Standard => {
            write!(f, "^")?;
            if matches!(v.kind, ExprKind::Symbol(_)) || v.as_number().is_some_and(|n| n >= 0.0) {
                format_recursive(f, v, mode)
            } else {
                write!(f, "(")?;
                format_recursive(f, v, mode)?;
                write!(f, ")")
            }
        }
    }
}

// =============================================================================
// DISPLAY IMPLEMENTATION
// =============================================================================

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number(n) => format_number(f, *n),
            ExprKind::Symbol(s) => write!(f, "{}", s.display_name()),
            ExprKind::Sum(terms) => format_sum(f, terms, FormatMode::Standard),
            ExprKind::Product(factors) => format_product(f, factors, FormatMode::Standard),
            ExprKind::Div(u, v) => format_div(f, u, v, FormatMode::Standard),
            ExprKind::Pow(u, v) => format_pow(f, u, v, FormatMode::Standard),
        }
    }
}

// =============================================================================
// LATEX FORMATTER
// =============================================================================

pub struct LatexFormatter<'expr> {
    pub(crate) expr: &'expr Expr,
}

impl fmt::Display for LatexFormatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expr = self.expr;
        match &expr.kind {
            ExprKind::Number(n) => format_number(f, *n),
            // Gridpoint names such as V^u_l are already LaTeX
            ExprKind::Symbol(s) => write!(f, "{}", s.display_name()),
            ExprKind::Sum(terms) => format_sum(f, terms, FormatMode::Latex),
            ExprKind::Product(factors) => format_product(f, factors, FormatMode::Latex),
            ExprKind::Div(u, v) => format_div(f, u, v, FormatMode::Latex),
            ExprKind::Pow(u, v) => format_pow(f, u, v, FormatMode::Latex),
        }
    }
}

impl Expr {
    /// Render as LaTeX
    #[must_use]
    pub fn to_latex(&self) -> String {
        LatexFormatter { expr: self }.to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Expr, Symbol, symb};

    #[test]
    fn test_display_number() {
        assert_eq!(format!("{}", Expr::number(3.0)), "3");
        assert!(format!("{}", Expr::number(0.125)).starts_with("0.125"));
        assert_eq!(format!("{}", Expr::number(-2.0)), "-2");
    }

    #[test]
    fn test_display_negative_terms() {
        let a = symb("disp_a");
        let b = symb("disp_b");
        assert_eq!(format!("{}", a - 2.0 * b), "disp_a - 2*disp_b");
        assert_eq!(format!("{}", -a + b), "-disp_a + disp_b");
        assert_eq!(format!("{}", -(a * b)), "-disp_a*disp_b");
    }

    #[test]
    fn test_display_fraction_parens() {
        let x = symb("disp_x");
        let dx = symb("disp_dx");
        assert_eq!(format!("{}", (x + 1.0) / 2.0), "(1 + disp_x)/2");
        assert_eq!(format!("{}", x / (2.0 * dx)), "disp_x/(2*disp_dx)");
        assert_eq!(format!("{}", x / dx.pow(2.0)), "disp_x/disp_dx^2");
    }

    #[test]
    fn test_display_gridpoint_average() {
        let m_l = Symbol::fresh("V^m_l");
        let m_r = Symbol::fresh("V^m_r");
        let avg = (m_l + m_r) / 2.0;
        assert_eq!(avg.to_string(), "(V^m_l + V^m_r)/2");
        assert_eq!(avg.to_latex(), r"\frac{V^m_l + V^m_r}{2}");
    }

    #[test]
    fn test_display_power_of_product() {
        let x = symb("disp_pow_x");
        let y = symb("disp_pow_y");
        assert_eq!(
            format!("{}", (x * y).pow_of(2.0)),
            "(disp_pow_x*disp_pow_y)^2"
        );
    }
}
