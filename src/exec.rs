//! Stack-machine execution of compiled bytecode.
//!
//! One `match` dispatch per opcode over three cursors: the instruction
//! stream itself, a read cursor into the immediate pool, and the operand
//! stack pointer. No allocation happens here; the caller supplies a stack
//! of at least `stack_capacity` cells, which the compiler guarantees is
//! the exact high-water mark, so the indexing below cannot go out of
//! bounds on bytecode this crate produced.
//!
//! Domain violations abort execution with the corresponding error code;
//! they never panic and never produce a partial stack the caller could
//! observe.

use crate::compile::Op;
use crate::error::EvalError;
use crate::math;

/// Execute `code` against `values`, using `stack` as the operand stack.
///
/// # Panics
///
/// Panics if `stack` is shorter than the compiled stack capacity or if a
/// `Var` opcode references past `values.len()`; both are programmer
/// errors, not runtime conditions.
pub(crate) fn run(
    code: &[Op],
    immediates: &[f64],
    values: &[f64],
    stack: &mut [f64],
) -> Result<f64, EvalError> {
    let mut sp = 0usize;
    let mut dp = 0usize;

    for &op in code {
        match op {
            // Hot opcodes first: pushes and the four basic binaries.
            Op::PushImmed => {
                stack[sp] = immediates[dp];
                dp += 1;
                sp += 1;
            }
            Op::Var(index) => {
                stack[sp] = values[usize::from(index)];
                sp += 1;
            }
            Op::Add => {
                sp -= 1;
                stack[sp - 1] += stack[sp];
            }
            Op::Sub => {
                sp -= 1;
                stack[sp - 1] -= stack[sp];
            }
            Op::Mul => {
                sp -= 1;
                stack[sp - 1] *= stack[sp];
            }
            Op::Div => {
                sp -= 1;
                if stack[sp] == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                stack[sp - 1] /= stack[sp];
            }
            Op::Pow => {
                sp -= 1;
                let exponent = stack[sp];
                let base = stack[sp - 1];
                if base == 0.0 && exponent < 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                if base <= 0.0 && exponent != exponent.trunc() {
                    return Err(EvalError::FractionalPowerOfNegative);
                }
                stack[sp - 1] = base.powf(exponent);
            }
            Op::Neg => stack[sp - 1] = -stack[sp - 1],

            Op::Abs => stack[sp - 1] = stack[sp - 1].abs(),
            Op::Exp => stack[sp - 1] = stack[sp - 1].exp(),
            Op::Log10 => {
                let x = stack[sp - 1];
                if x <= 0.0 {
                    return Err(EvalError::LogOfNonPositive);
                }
                stack[sp - 1] = x.log10();
            }
            Op::Ln => {
                let x = stack[sp - 1];
                if x <= 0.0 {
                    return Err(EvalError::LogOfNonPositive);
                }
                stack[sp - 1] = x.ln();
            }
            Op::Sqrt => {
                let x = stack[sp - 1];
                if x < 0.0 {
                    return Err(EvalError::SqrtOfNegative);
                }
                stack[sp - 1] = x.sqrt();
            }
            Op::Sinh => stack[sp - 1] = stack[sp - 1].sinh(),
            Op::Cosh => stack[sp - 1] = stack[sp - 1].cosh(),
            Op::Tanh => stack[sp - 1] = stack[sp - 1].tanh(),
            Op::Sin => stack[sp - 1] = stack[sp - 1].sin(),
            Op::Cos => stack[sp - 1] = stack[sp - 1].cos(),
            Op::Tan => stack[sp - 1] = stack[sp - 1].tan(),
            Op::Asin => {
                let x = stack[sp - 1];
                if x.abs() > 1.0 {
                    return Err(EvalError::AsinAcosOutOfRange);
                }
                stack[sp - 1] = x.asin();
            }
            Op::Acos => {
                let x = stack[sp - 1];
                if x.abs() > 1.0 {
                    return Err(EvalError::AsinAcosOutOfRange);
                }
                stack[sp - 1] = x.acos();
            }
            Op::Atan => stack[sp - 1] = stack[sp - 1].atan(),

            Op::Besj0 => stack[sp - 1] = math::besj0(stack[sp - 1]),
            Op::Besj1 => stack[sp - 1] = math::besj1(stack[sp - 1]),
            Op::Besy0 => {
                let x = stack[sp - 1];
                if x <= 0.0 {
                    return Err(EvalError::Besy0NonPositive);
                }
                stack[sp - 1] = math::besy0(x);
            }
            Op::Besy1 => {
                let x = stack[sp - 1];
                if x <= 0.0 {
                    return Err(EvalError::Besy1NonPositive);
                }
                stack[sp - 1] = math::besy1(x);
            }
            Op::Erfcs => stack[sp - 1] = math::erfc_scaled(stack[sp - 1]),
            Op::Erfc => stack[sp - 1] = math::erfc(stack[sp - 1]),
            Op::Erf => stack[sp - 1] = math::erf(stack[sp - 1]),
            Op::Gamma => {
                let x = stack[sp - 1];
                if x <= 0.0 && x.fract() == 0.0 {
                    return Err(EvalError::GammaAtPole);
                }
                stack[sp - 1] = math::gamma(x).unwrap_or(f64::NAN);
            }

            Op::Atan2 => {
                sp -= 1;
                let x = stack[sp];
                stack[sp - 1] = stack[sp - 1].atan2(x);
            }
        }
    }

    debug_assert_eq!(sp, 1, "bytecode must leave exactly one result");
    debug_assert_eq!(dp, immediates.len(), "all immediates must be consumed");
    Ok(stack[0])
}
