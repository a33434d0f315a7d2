//! Runtime formula engine for user-supplied mathematical expressions.
//!
//! Expressions arrive as text at runtime (think plot annotations or
//! derived quantities in a simulation UI), are validated and compiled to
//! a compact stack-machine bytecode, and are then evaluated against
//! variable vectors at high rates over large datasets.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌───────────────┐   ┌──────────────┐
//! │   source   │ → │ normalise +  │ → │   recursive   │ → │ stack-machine│
//! │   string   │   │ syntax check │   │   lowering    │   │  interpreter │
//! └────────────┘   └──────────────┘   └───────────────┘   └──────────────┘
//!                   position map        postfix bytecode     domain errors
//!                   to the original     + immediates          (codes 1..8)
//!                   for diagnostics     + stack capacity
//! ```
//!
//! There is no AST: the compiler analyses substring windows of the
//! normalised text directly, which keeps the pipeline small and the
//! compiled form dense. Each compiled [`Formula`] records the exact
//! operand-stack high-water mark, so evaluation never allocates and never
//! bounds-faults on its own bytecode.
//!
//! # Registry
//!
//! Hosts that manage many formulas address them through a
//! [`FormulaRegistry`]: a fixed table of slots with parse/evaluate
//! operations, an error channel for domain errors (division by zero,
//! `sqrt` of a negative, ...), and the process-specific `mu0` scalar
//! behind the `mu` constant.
//!
//! ```
//! use formulac::FormulaRegistry;
//!
//! let mut registry = FormulaRegistry::new(8);
//! registry
//!     .parse(1, "atan2(y, x) * 180 / pi", &["x", "y"], false)
//!     .expect("valid formula");
//!
//! let angle = registry.evaluate(1, &[1.0, 1.0]);
//! assert!((angle - 45.0).abs() < 1e-12);
//! ```
//!
//! Standalone use goes through [`Formula`] directly:
//!
//! ```
//! use formulac::{Constants, Formula};
//!
//! let mut f = Formula::compile("2 ** (1+2)", &[] as &[&str], &Constants::default())
//!     .expect("valid formula");
//! assert_eq!(f.eval(&[]).expect("in domain"), 8.0);
//! ```
//!
//! # Expression language
//!
//! - Operators `+ - * / ^` with the usual precedence; `**` is accepted as
//!   a synonym for `^`. `-` binds looser than `*`, `/` and `^`
//!   (`-x^2 = -(x^2)`) and tighter than `+`/`-` (`-x+y = (-x)+y`).
//! - Real literals with optional exponent, accepting `d`/`D` markers next
//!   to `e`/`E` (`2d-7`).
//! - Case-insensitive builtin functions: `abs exp log10 log sqrt sinh
//!   cosh tanh sin cos tan asin acos atan2 atan besj0 besj1 besy0 besy1
//!   erfcs erfc erf gamf`.
//! - Case-sensitive variable names, fixed per formula at parse time.
//! - Named constants `pi` and `mu` (the latter reads the registry's
//!   `mu0`, default 1, at parse time).

mod compile;
mod constants;
mod error;
mod exec;
mod formula;
mod functions;
pub mod math;
mod registry;
mod scan;
mod traits;

#[cfg(test)]
mod tests;

pub use compile::Op;
pub use constants::Constants;
pub use error::{EvalError, SyntaxError, SyntaxErrorKind, eval_err_msg};
pub use formula::Formula;
pub use registry::FormulaRegistry;
pub use traits::MathScalar;

/// Validate an expression against a variable-name list without compiling
/// or keeping anything.
///
/// # Errors
///
/// Returns the first [`SyntaxError`], located in the original string.
///
/// # Example
///
/// ```
/// use formulac::check;
///
/// assert!(check("sin(x) + 1", &["x"]).is_ok());
/// assert!(check("sin(x", &["x"]).is_err());
/// ```
pub fn check<S: AsRef<str>>(text: &str, vars: &[S]) -> Result<(), SyntaxError> {
    Formula::check(text, vars)
}
