use thiserror::Error;

/// Errors raised by the fallible entry points of the crate.
///
/// The algebra engine itself never fails: constructors and substitution are
/// total. Errors come from configuration checks, numeric evaluation and the
/// optional affine verification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StencilError {
    /// A row-type string other than `normal`, `up` or `dn`
    #[error("Unknown row type '{0}': expected one of 'normal', 'up', 'dn'")]
    UnknownRowType(String),

    /// The spatial step is the literal number zero
    #[error("Spatial step size dx must not be zero")]
    ZeroStepSize,

    #[error("Expression nesting depth exceeds maximum limit")]
    MaxDepthExceeded,

    #[error("Expression size exceeds maximum node count limit")]
    MaxNodesExceeded,

    /// `symb_get` on a name that was never interned
    #[error("Symbol '{0}' not found. Use symb() to create it first.")]
    UnknownSymbol(String),

    /// Numeric evaluation reached a symbol with no bound value
    #[error("No value bound for symbol '{0}'")]
    UnboundSymbol(String),

    /// Numeric evaluation produced NaN or infinity
    #[error("Evaluation produced a non-finite value")]
    NonFinite,

    /// The expression is not affine in the requested terms
    #[error("Expression is not affine in '{term}': sample residual {residual:e}")]
    NotAffine { term: String, residual: f64 },
}
