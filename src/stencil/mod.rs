//! Crank-Nicolson discretization of a 1-D pricing PDE.
//!
//! A model expression is written in four continuous symbols: the value `V`,
//! its change over the time step `dV`, and the spatial derivatives `Vx` and
//! `Vxx`. Discretizing replaces them with a stencil over six fresh gridpoints,
//! three per time layer:
//!
//! ```text
//!            left (current)   right (next)
//!   upper        V^u_l           V^u_r
//!   middle       V^m_l           V^m_r
//!   lower        V^d_l           V^d_r
//! ```
//!
//! Substitutions, applied in this order to the partially substituted
//! expression:
//!
//! | symbol | normal | upper boundary | lower boundary |
//! |---|---|---|---|
//! | `V` | `(Vm_l + Vm_r)/2` | same | same |
//! | `dV` | `Vm_r - Vm_l` | same | same |
//! | `Vx` | `((Vu_l - Vd_l)/2 + (Vu_r - Vd_r)/2)/(2*dx)` | `((Vm_l - Vd_l)/2 + (Vm_r - Vd_r)/2)/dx` | `((Vu_l - Vm_l)/2 + (Vu_r - Vm_r)/2)/dx` |
//! | `Vxx` | `((Vu_l + Vd_l - 2*Vm_l) + (Vu_r + Vd_r - 2*Vm_r))/(2*dx^2)` | `0` | `0` |
//!
//! `dV` is not divided by the time step; the model expression carries it.

pub mod row;

use std::fmt;
use std::str::FromStr;

use log::{debug, trace};

use crate::{
    Algebra, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, Expr, StencilError, StencilRow, Symbol, symb,
};

/// Display prefix of the gridpoint symbols
pub const DEFAULT_BASE_NAME: &str = "V";

// =============================================================================
// Row type
// =============================================================================

/// Which stencil a grid row uses.
///
/// Parsing accepts the short names `normal`, `up` and `dn`; anything else is
/// an error.
///
/// ```
/// use symb_cn::{RowType, StencilError};
/// assert_eq!("up".parse::<RowType>(), Ok(RowType::UpperBoundary));
/// assert!(matches!(
///     "sideways".parse::<RowType>(),
///     Err(StencilError::UnknownRowType(_))
/// ));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RowType {
    /// Interior row: upper, middle and lower neighbors exist
    #[default]
    Normal,
    /// Top row: no upper neighbor
    UpperBoundary,
    /// Bottom row: no lower neighbor
    LowerBoundary,
}

impl RowType {
    pub const ALL: [Self; 3] = [Self::Normal, Self::UpperBoundary, Self::LowerBoundary];

    /// Short name, the inverse of parsing
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::UpperBoundary => "up",
            Self::LowerBoundary => "dn",
        }
    }

    pub const fn is_boundary(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl FromStr for RowType {
    type Err = StencilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "up" => Ok(Self::UpperBoundary),
            "dn" => Ok(Self::LowerBoundary),
            other => Err(StencilError::UnknownRowType(other.to_string())),
        }
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Symbols in and out
// =============================================================================

/// The four continuous symbols a model expression is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdeSymbols<S> {
    /// `V`
    pub value: S,
    /// `dV`
    pub change: S,
    /// `Vx`
    pub first: S,
    /// `Vxx`
    pub second: S,
}

impl<S> PdeSymbols<S> {
    pub const fn new(value: S, change: S, first: S, second: S) -> Self {
        Self {
            value,
            change,
            first,
            second,
        }
    }
}

impl PdeSymbols<Symbol> {
    /// Intern the four symbols by name
    pub fn named(value: &str, change: &str, first: &str, second: &str) -> Self {
        Self::new(symb(value), symb(change), symb(first), symb(second))
    }
}

/// Gridpoints of one time layer, `[upper, middle, lower]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gridpoints<S> {
    pub upper: S,
    pub middle: S,
    pub lower: S,
}

impl<S: Copy> Gridpoints<S> {
    pub const fn to_array(&self) -> [S; 3] {
        [self.upper, self.middle, self.lower]
    }

    fn fresh<E: Algebra<Symbol = S>>(base_name: &str, layer: char) -> Self {
        Self {
            upper: E::fresh_symbol(&format!("{base_name}^u_{layer}")),
            middle: E::fresh_symbol(&format!("{base_name}^m_{layer}")),
            lower: E::fresh_symbol(&format!("{base_name}^d_{layer}")),
        }
    }
}

/// Result of a discretization: the expression and its six gridpoints
#[derive(Debug, Clone, PartialEq)]
pub struct Discretized<E: Algebra> {
    pub expr: E,
    /// Current time layer
    pub left: Gridpoints<E::Symbol>,
    /// Next time layer
    pub right: Gridpoints<E::Symbol>,
    pub row: RowType,
}

impl<E: Algebra> Discretized<E> {
    /// `(expr, [Vu_l, Vm_l, Vd_l], [Vu_r, Vm_r, Vd_r])`
    pub fn into_parts(self) -> (E, [E::Symbol; 3], [E::Symbol; 3]) {
        (self.expr, self.left.to_array(), self.right.to_array())
    }

    /// All six gridpoints, left layer first
    pub fn symbols(&self) -> [E::Symbol; 6] {
        let [lu, lm, ld] = self.left.to_array();
        let [ru, rm, rd] = self.right.to_array();
        [lu, lm, ld, ru, rm, rd]
    }
}

// =============================================================================
// Discretization
// =============================================================================

/// Substitute `V`, `dV`, `Vx`, `Vxx` with the Crank-Nicolson stencil for `row`.
///
/// Six fresh gridpoints are created on every call; two calls never share
/// gridpoints even though their names match. Symbols other than the four in
/// `vars` pass through untouched. `dx` is used as given, so a literal zero
/// step leaves a division by zero in the result (the [`CrankNicolson`]
/// builder rejects it).
///
/// # Example
/// ```
/// use symb_cn::{PdeSymbols, RowType, discretize_crank_nicolson, symb};
///
/// let vars = PdeSymbols::named("cn_doc_V", "cn_doc_dV", "cn_doc_Vx", "cn_doc_Vxx");
/// let dx = symb("cn_doc_dx").to_expr();
/// let out = discretize_crank_nicolson(&vars.value.to_expr(), &vars, &dx, RowType::Normal);
/// assert_eq!(out.expr.to_string(), "(V^m_l + V^m_r)/2");
/// ```
pub fn discretize_crank_nicolson<E: Algebra>(
    model_expr: &E,
    vars: &PdeSymbols<E::Symbol>,
    dx: &E,
    row: RowType,
) -> Discretized<E> {
    discretize_crank_nicolson_named(model_expr, vars, dx, row, DEFAULT_BASE_NAME)
}

/// [`discretize_crank_nicolson`] with a custom gridpoint name prefix
pub fn discretize_crank_nicolson_named<E: Algebra>(
    model_expr: &E,
    vars: &PdeSymbols<E::Symbol>,
    dx: &E,
    row: RowType,
    base_name: &str,
) -> Discretized<E> {
    let left = Gridpoints::fresh::<E>(base_name, 'l');
    let right = Gridpoints::fresh::<E>(base_name, 'r');

    let [u_l, m_l, d_l] = left.to_array().map(E::from_symbol);
    let [u_r, m_r, d_r] = right.to_array().map(E::from_symbol);
    let two = || E::number(2.0);

    let value = (m_l.clone() + m_r.clone()) / two();
    let change = m_r.clone() - m_l.clone();
    let (first, second) = match row {
        RowType::UpperBoundary => (
            ((m_l - d_l.clone()) / two() + (m_r - d_r.clone()) / two()) / dx.clone(),
            E::number(0.0),
        ),
        RowType::LowerBoundary => (
            ((u_l.clone() - m_l) / two() + (u_r.clone() - m_r) / two()) / dx.clone(),
            E::number(0.0),
        ),
        RowType::Normal => (
            ((u_l.clone() - d_l.clone()) / two() + (u_r.clone() - d_r.clone()) / two())
                / (two() * dx.clone()),
            ((u_l + d_l - two() * m_l) + (u_r + d_r - two() * m_r))
                / (two() * dx.clone().powi(2)),
        ),
    };
    debug!("Crank-Nicolson stencil for {row} row");

    let steps = [
        (&vars.value, value),
        (&vars.change, change),
        (&vars.first, first),
        (&vars.second, second),
    ];
    let expr = steps
        .iter()
        .fold(model_expr.clone(), |acc, (symbol, replacement)| {
            trace!("substitute {symbol:?} -> {replacement:?}");
            acc.substitute(symbol, replacement)
        });

    Discretized {
        expr,
        left,
        right,
        row,
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for Crank-Nicolson discretization over [`Expr`]
///
/// # Example
/// ```
/// use symb_cn::{CrankNicolson, PdeSymbols, RowType, symb};
///
/// let vars = PdeSymbols::named("cnb_V", "cnb_dV", "cnb_Vx", "cnb_Vxx");
/// let model = vars.second.to_expr();
/// let out = CrankNicolson::new(symb("cnb_dx"))
///     .row(RowType::UpperBoundary)
///     .discretize(&model, &vars)
///     .unwrap();
/// assert_eq!(out.expr.to_string(), "0");
/// ```
#[derive(Debug, Clone)]
pub struct CrankNicolson {
    dx: Expr,
    row: RowType,
    base_name: String,
    max_depth: Option<usize>,
    max_nodes: Option<usize>,
}

impl CrankNicolson {
    /// Create a builder for spatial step `dx`, normal row, default limits
    pub fn new(dx: impl Into<Expr>) -> Self {
        Self {
            dx: dx.into(),
            row: RowType::Normal,
            base_name: DEFAULT_BASE_NAME.to_string(),
            max_depth: Some(DEFAULT_MAX_DEPTH),
            max_nodes: Some(DEFAULT_MAX_NODES),
        }
    }

    pub fn row(mut self, row: RowType) -> Self {
        self.row = row;
        self
    }

    /// Display prefix of the gridpoint names (`V` gives `V^u_l`, ...)
    pub fn base_name(mut self, name: impl Into<String>) -> Self {
        self.base_name = name.into();
        self
    }

    /// Set maximum AST depth of the model expression
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set maximum AST node count of the model expression
    pub fn max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    pub fn step(&self) -> &Expr {
        &self.dx
    }

    pub const fn row_type(&self) -> RowType {
        self.row
    }

    /// Discretize `model_expr`
    ///
    /// # Errors
    /// `ZeroStepSize` if `dx` is exactly the number zero; `MaxDepthExceeded` or
    /// `MaxNodesExceeded` if the model expression is over the limits.
    pub fn discretize(
        &self,
        model_expr: &Expr,
        vars: &PdeSymbols<Symbol>,
    ) -> Result<Discretized<Expr>, StencilError> {
        if self.dx.is_zero_num() {
            return Err(StencilError::ZeroStepSize);
        }
        if let Some(max_d) = self.max_depth
            && model_expr.max_depth() > max_d
        {
            return Err(StencilError::MaxDepthExceeded);
        }
        if let Some(max_n) = self.max_nodes
            && model_expr.node_count() > max_n
        {
            return Err(StencilError::MaxNodesExceeded);
        }

        Ok(discretize_crank_nicolson_named(
            model_expr,
            vars,
            &self.dx,
            self.row,
            &self.base_name,
        ))
    }

    /// Discretize, then read off the tridiagonal row
    ///
    /// # Errors
    /// Anything [`Self::discretize`] or [`StencilRow::from_discretized`]
    /// returns.
    pub fn assemble(
        &self,
        model_expr: &Expr,
        vars: &PdeSymbols<Symbol>,
    ) -> Result<StencilRow, StencilError> {
        StencilRow::from_discretized(&self.discretize(model_expr, vars)?)
    }
}
