//! Abstract Syntax Tree for symbolic expressions.
//!
//! # Architecture
//!
//! ## N-ary Sum/Product
//! `a + b + c` is `Sum([a, b, c])`, not nested binary additions. Constructors
//! flatten automatically, so the association of the input never shows up in
//! the structure: `(a + b) + c` and `a + (b + c)` are the same value.
//! Subtraction is `a + (-1 * b)`; negation is `-1 * a`.
//!
//! ## Automatic evaluation
//! Constructors fold numbers and apply the 0/1 identities (see
//! [`constructors`]). This is the only simplification the engine performs on
//! its own, and it is what makes "substitute 1, then 0" recover coefficients.
//!
//! ## Structural Hashing
//! Each `Expr` has a pre-computed `hash` field for O(1) equality rejection.
//!
//! # Usage
//!
//! ```
//! use symb_cn::{Expr, symb};
//!
//! let x = symb("expr_doc_x");
//! let expr = 3.0 * x + 1.0;
//! let at_two = expr.substitute(&x, &Expr::number(2.0));
//! assert_eq!(at_two, Expr::number(7.0));
//! ```

mod analysis;
mod constructors;

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use crate::core::symbol::InternedSymbol;

pub use analysis::Bindings;

// =============================================================================
// EXPRESSION ID COUNTER
// =============================================================================

static EXPR_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_id() -> u64 {
    EXPR_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Cached Arc<Expr> for 0.0, used during Drop to swap out children without allocation
static DUMMY_ARC: LazyLock<Arc<Expr>> = LazyLock::new(|| {
    Arc::new(Expr {
        id: 0,
        hash: compute_expr_hash(&ExprKind::Number(0.0)),
        kind: ExprKind::Number(0.0),
    })
});

// =============================================================================
// EXPR - The main expression type
// =============================================================================

/// An immutable symbolic expression.
///
/// Equality is structural; the `id` is only for debugging.
#[derive(Debug, Clone)]
pub struct Expr {
    pub(crate) id: u64,
    pub(crate) hash: u64,
    pub(crate) kind: ExprKind,
}

impl Deref for Expr {
    type Target = ExprKind;
    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

impl PartialEq for Expr {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast reject: different hashes mean definitely not equal
        if self.hash != other.hash {
            return false;
        }
        self.kind == other.kind
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

/// The structure of an expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Constant number
    Number(f64),

    /// Symbol leaf, compared by identity
    Symbol(InternedSymbol),

    /// N-ary sum, flat, numeric constant (if any) first
    Sum(Vec<Arc<Expr>>),

    /// N-ary product, flat, numeric coefficient (if any) first
    Product(Vec<Arc<Expr>>),

    /// Division (binary - not associative)
    Div(Arc<Expr>, Arc<Expr>),

    /// Exponentiation (binary - not associative)
    Pow(Arc<Expr>, Arc<Expr>),
}

/// Structural hash of a node kind.
///
/// Children contribute their cached hashes, so this is O(arity).
pub fn compute_expr_hash(kind: &ExprKind) -> u64 {
    let mut hasher = FxHasher::default();
    kind.hash(&mut hasher);
    hasher.finish()
}

impl Hash for ExprKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Number(n) => {
                // Normalize -0.0 to 0.0 before hashing
                let normalized = if *n == 0.0 { 0.0 } else { *n };
                normalized.to_bits().hash(state);
            }
            Self::Symbol(s) => s.hash(state),
            Self::Sum(children) | Self::Product(children) => {
                children.len().hash(state);
                for c in children {
                    c.hash.hash(state);
                }
            }
            Self::Div(l, r) | Self::Pow(l, r) => {
                l.hash.hash(state);
                r.hash.hash(state);
            }
        }
    }
}

// =============================================================================
// DROP IMPLEMENTATION - Iterative drop to prevent stack overflow
// =============================================================================

impl Drop for Expr {
    fn drop(&mut self) {
        fn drain_children(kind: &mut ExprKind, queue: &mut Vec<Arc<Expr>>) {
            match kind {
                ExprKind::Sum(children) | ExprKind::Product(children) => {
                    queue.extend(std::mem::take(children));
                }
                ExprKind::Div(left, right) | ExprKind::Pow(left, right) => {
                    queue.push(std::mem::replace(left, Arc::clone(&DUMMY_ARC)));
                    queue.push(std::mem::replace(right, Arc::clone(&DUMMY_ARC)));
                }
                ExprKind::Number(_) | ExprKind::Symbol(_) => {}
            }
        }

        let mut work_queue = Vec::new();
        drain_children(&mut self.kind, &mut work_queue);

        while let Some(child_arc) = work_queue.pop() {
            if let Ok(mut child_expr) = Arc::try_unwrap(child_arc) {
                drain_children(&mut child_expr.kind, &mut work_queue);
            }
        }
    }
}
