//! Parallel batch row assembly using Rayon
//!
//! Enable with the `parallel` feature:
//! ```toml
//! symb_cn = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! Each row is discretized with its own fresh gridpoints, so results never
//! share symbols.

use rayon::prelude::*;

use crate::{Bindings, CrankNicolson, Expr, NumericRow, PdeSymbols, RowType, StencilError};
use crate::{StencilRow, Symbol};

/// Assemble one stencil row per `(model, row type)` pair in parallel.
///
/// `builder` supplies the step size, gridpoint prefix and limits; its own row
/// type is replaced by each pair's. Results keep the input order.
///
/// # Example
/// ```
/// use symb_cn::{CrankNicolson, PdeSymbols, RowType};
/// use symb_cn::parallel::assemble_rows;
///
/// let vars = PdeSymbols::named("par_doc_V", "par_doc_dV", "par_doc_Vx", "par_doc_Vxx");
/// let model = vars.second.to_expr();
/// let rows = assemble_rows(
///     &CrankNicolson::new(0.1),
///     &[(model.clone(), RowType::Normal), (model, RowType::UpperBoundary)],
///     &vars,
/// );
/// assert_eq!(rows.len(), 2);
/// assert!(rows.iter().all(Result::is_ok));
/// ```
pub fn assemble_rows(
    builder: &CrankNicolson,
    models: &[(Expr, RowType)],
    vars: &PdeSymbols<Symbol>,
) -> Vec<Result<StencilRow, StencilError>> {
    models
        .par_iter()
        .map(|(model, row)| builder.clone().row(*row).assemble(model, vars))
        .collect()
}

/// Evaluate assembled rows at one set of parameter values in parallel
pub fn evaluate_rows(
    rows: &[StencilRow],
    bindings: &Bindings,
) -> Vec<Result<NumericRow, StencilError>> {
    rows.par_iter().map(|row| row.eval_f64(bindings)).collect()
}
