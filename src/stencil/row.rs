//! One row of the tridiagonal Crank-Nicolson system.
//!
//! A discretized expression is affine in its six gridpoints. Splitting it
//! gives, per time layer, the coefficients of the upper, middle and lower
//! gridpoints, plus a constant (source) term.

use std::fmt;

use super::{Discretized, Gridpoints, RowType};
use crate::{Bindings, Coefficients, Expr, StencilError, Symbol, split_affine};

/// Coefficients of `[upper, middle, lower]` in one time layer
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalCoefficients {
    pub upper: Expr,
    pub diag: Expr,
    pub lower: Expr,
}

impl TridiagonalCoefficients {
    fn from_layer(coefficients: &Coefficients<Symbol, Expr>, layer: &Gridpoints<Symbol>) -> Self {
        let pick = |s: &Symbol| {
            coefficients
                .get(s)
                .cloned()
                .unwrap_or_else(|| Expr::number(0.0))
        };
        Self {
            upper: pick(&layer.upper),
            diag: pick(&layer.middle),
            lower: pick(&layer.lower),
        }
    }

    /// Numeric `[upper, diag, lower]`
    ///
    /// # Errors
    /// `UnboundSymbol` or `NonFinite` from evaluation.
    pub fn eval_f64(&self, bindings: &Bindings) -> Result<[f64; 3], StencilError> {
        Ok([
            self.upper.eval_f64(bindings)?,
            self.diag.eval_f64(bindings)?,
            self.lower.eval_f64(bindings)?,
        ])
    }
}

impl fmt::Display for TridiagonalCoefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.upper, self.diag, self.lower)
    }
}

/// A stencil row: `left · [Vu_l, Vm_l, Vd_l] + right · [Vu_r, Vm_r, Vd_r] + constant`
#[derive(Debug, Clone, PartialEq)]
pub struct StencilRow {
    /// Current time layer
    pub left: TridiagonalCoefficients,
    /// Next time layer
    pub right: TridiagonalCoefficients,
    /// Part of the expression independent of every gridpoint
    pub constant: Expr,
    pub row_type: RowType,
}

impl StencilRow {
    /// Split a discretized expression over its six gridpoints.
    ///
    /// # Errors
    /// `NotAffine` if the model made the expression non-linear in the
    /// gridpoints (e.g. `V^2`); evaluation errors from the sample check.
    pub fn from_discretized(discretized: &Discretized<Expr>) -> Result<Self, StencilError> {
        let form = split_affine(&discretized.expr, &discretized.symbols())?;
        Ok(Self {
            left: TridiagonalCoefficients::from_layer(&form.coefficients, &discretized.left),
            right: TridiagonalCoefficients::from_layer(&form.coefficients, &discretized.right),
            constant: form.constant,
            row_type: discretized.row,
        })
    }

    /// Evaluate every coefficient and the constant
    ///
    /// # Errors
    /// `UnboundSymbol` or `NonFinite` from evaluation.
    pub fn eval_f64(&self, bindings: &Bindings) -> Result<NumericRow, StencilError> {
        Ok(NumericRow {
            left: self.left.eval_f64(bindings)?,
            right: self.right.eval_f64(bindings)?,
            constant: self.constant.eval_f64(bindings)?,
        })
    }
}

/// A [`StencilRow`] evaluated at concrete parameter values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRow {
    /// `[upper, diag, lower]` of the current layer
    pub left: [f64; 3],
    /// `[upper, diag, lower]` of the next layer
    pub right: [f64; 3],
    pub constant: f64,
}

impl fmt::Display for StencilRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} row: left {}, right {}, constant {}",
            self.row_type, self.left, self.right, self.constant
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CrankNicolson, PdeSymbols, symb};
    use approx::assert_relative_eq;

    #[test]
    fn test_value_row() {
        let vars = PdeSymbols::named("row_v_V", "row_v_dV", "row_v_Vx", "row_v_Vxx");
        let row = CrankNicolson::new(symb("row_v_dx"))
            .assemble(&vars.value.to_expr(), &vars)
            .unwrap();

        let half = Expr::number(0.5);
        let zero = Expr::number(0.0);
        assert_eq!(row.left.diag, half);
        assert_eq!(row.right.diag, half);
        assert_eq!(row.left.upper, zero);
        assert_eq!(row.right.lower, zero);
        assert_eq!(row.constant, zero);
        assert_eq!(row.row_type, RowType::Normal);
    }

    #[test]
    fn test_second_derivative_row_numeric() {
        let vars = PdeSymbols::named("row_xx_V", "row_xx_dV", "row_xx_Vx", "row_xx_Vxx");
        let row = CrankNicolson::new(0.5)
            .assemble(&vars.second.to_expr(), &vars)
            .unwrap();

        // 1/(2*dx^2) = 2, middle gets -2 of that
        let bindings = Bindings::default();
        let left = row.left.eval_f64(&bindings).unwrap();
        let right = row.right.eval_f64(&bindings).unwrap();
        let expected = [2.0, -4.0, 2.0, 2.0, -4.0, 2.0];
        for (got, want) in left.iter().chain(&right).zip(expected) {
            assert_relative_eq!(*got, want, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_source_term_is_constant() {
        let vars = PdeSymbols::named("row_src_V", "row_src_dV", "row_src_Vx", "row_src_Vxx");
        let f = symb("row_src_f");
        let row = CrankNicolson::new(0.1)
            .row(RowType::LowerBoundary)
            .assemble(&(vars.change + f), &vars)
            .unwrap();

        assert_eq!(row.constant, f.to_expr());
        assert_eq!(row.right.diag, Expr::number(1.0));
        assert_eq!(row.left.diag, Expr::number(-1.0));
        assert_eq!(row.row_type, RowType::LowerBoundary);
    }

    #[test]
    fn test_eval_row_with_parameters() {
        let vars = PdeSymbols::named("row_eval_V", "row_eval_dV", "row_eval_Vx", "row_eval_Vxx");
        let r = symb("row_eval_r");
        let dt = symb("row_eval_dt");
        // -dV + r*dt*V
        let model = -vars.change + r * dt * vars.value;
        let row = CrankNicolson::new(0.1).assemble(&model, &vars).unwrap();

        let mut bindings = Bindings::default();
        bindings.insert(r, 0.05);
        bindings.insert(dt, 0.5);
        let numeric = row.eval_f64(&bindings).unwrap();
        assert_relative_eq!(numeric.left[1], 1.0 + 0.0125, max_relative = 1e-12);
        assert_relative_eq!(numeric.right[1], -1.0 + 0.0125, max_relative = 1e-12);
        assert_relative_eq!(numeric.left[0], 0.0);
        assert_relative_eq!(numeric.constant, 0.0);

        assert!(matches!(
            row.eval_f64(&Bindings::default()),
            Err(StencilError::UnboundSymbol(_))
        ));
    }

    #[test]
    fn test_nonlinear_model_rejected() {
        let vars = PdeSymbols::named("row_nl_V", "row_nl_dV", "row_nl_Vx", "row_nl_Vxx");
        let result = CrankNicolson::new(0.1).assemble(&vars.value.pow(2.0), &vars);
        assert!(matches!(result, Err(StencilError::NotAffine { .. })));
    }
}
