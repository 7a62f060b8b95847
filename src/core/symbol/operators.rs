//! Operator overloading for `Expr`, `&Expr`, `Symbol` and `f64`.
//!
//! All operators route through the auto-evaluating constructors, so
//! `x * 0.0` is already `0` and `x - x` stays `x + -1*x`.

use std::ops::{Add, Div, Mul, Neg, Sub};

use super::Symbol;
use crate::Expr;

// ===== Macro for generating operator implementations =====

macro_rules! impl_binary_ops {
    ($lhs:ty, $rhs:ty, $to_lhs:expr, $to_rhs:expr) => {
        impl Add<$rhs> for $lhs {
            type Output = Expr;
            fn add(self, rhs: $rhs) -> Expr {
                Expr::add_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
        impl Sub<$rhs> for $lhs {
            type Output = Expr;
            fn sub(self, rhs: $rhs) -> Expr {
                Expr::sub_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
        impl Mul<$rhs> for $lhs {
            type Output = Expr;
            fn mul(self, rhs: $rhs) -> Expr {
                Expr::mul_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
        impl Div<$rhs> for $lhs {
            type Output = Expr;
            fn div(self, rhs: $rhs) -> Expr {
                Expr::div_expr($to_lhs(self), $to_rhs(rhs))
            }
        }
    };
}

// Expr operations
impl_binary_ops!(Expr, Expr, |s: Expr| s, |r: Expr| r);
impl_binary_ops!(Expr, Symbol, |s: Expr| s, Expr::from);
impl_binary_ops!(Expr, f64, |s: Expr| s, Expr::number);
impl_binary_ops!(Expr, &Expr, |s: Expr| s, |r: &Expr| r.clone());

// &Expr operations
impl_binary_ops!(&Expr, &Expr, |s: &Expr| s.clone(), |r: &Expr| r.clone());
impl_binary_ops!(&Expr, Expr, |s: &Expr| s.clone(), |r: Expr| r);
impl_binary_ops!(&Expr, Symbol, |s: &Expr| s.clone(), Expr::from);
impl_binary_ops!(&Expr, f64, |s: &Expr| s.clone(), Expr::number);

// Symbol operations
impl_binary_ops!(Symbol, Symbol, Expr::from, Expr::from);
impl_binary_ops!(Symbol, Expr, Expr::from, |r: Expr| r);
impl_binary_ops!(Symbol, &Expr, Expr::from, |r: &Expr| r.clone());
impl_binary_ops!(Symbol, f64, Expr::from, Expr::number);

// f64 on the left
impl_binary_ops!(f64, Expr, Expr::number, |r: Expr| r);
impl_binary_ops!(f64, &Expr, Expr::number, |r: &Expr| r.clone());
impl_binary_ops!(f64, Symbol, Expr::number, Expr::from);

// Negation
impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.negate()
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.clone().negate()
    }
}

impl Neg for Symbol {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.to_expr().negate()
    }
}
