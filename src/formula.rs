//! A compiled formula and its evaluation entry points.

use crate::compile::{Lowerer, Op};
use crate::constants::Constants;
use crate::error::{EvalError, SyntaxError};
use crate::exec;
use crate::scan::{Scanned, syntax_check};

/// A formula compiled to stack-machine bytecode.
///
/// Construction validates the text and lowers it in one step; the value is
/// then immutable except for its embedded scratch stack, which lets
/// [`eval`](Formula::eval) run without allocating. For evaluation through
/// a shared reference (e.g. across threads), use
/// [`eval_with`](Formula::eval_with) and bring a per-call stack.
///
/// # Example
///
/// ```
/// use formulac::{Constants, Formula};
///
/// let mut hypot = Formula::compile("sqrt(x^2 + y^2)", &["x", "y"], &Constants::default())
///     .expect("valid formula");
/// let r = hypot.eval(&[3.0, 4.0]).expect("in domain");
/// assert!((r - 5.0).abs() < 1e-12);
/// ```
pub struct Formula {
    code: Box<[Op]>,
    immediates: Box<[f64]>,
    stack_capacity: usize,
    var_count: usize,
    /// Scratch operand stack, exactly `stack_capacity` cells.
    stack: Vec<f64>,
}

impl Formula {
    /// Validate and compile an expression over the given variable names.
    ///
    /// Variable order fixes the layout of the value vector passed to the
    /// evaluation methods. Named constants (`pi`, `mu`) are resolved
    /// against `consts` now and baked into the immediates.
    ///
    /// # Errors
    ///
    /// Returns the first [`SyntaxError`], located in the original string.
    pub fn compile<S: AsRef<str>>(
        text: &str,
        vars: &[S],
        consts: &Constants,
    ) -> Result<Self, SyntaxError> {
        let names: Vec<&str> = vars.iter().map(AsRef::as_ref).collect();
        let scanned = Scanned::new(text);
        syntax_check(&scanned, &names, consts)?;
        let lowered = Lowerer::lower(&scanned, &names, consts)?;

        Ok(Self {
            code: lowered.code.into_boxed_slice(),
            immediates: lowered.immediates.into_boxed_slice(),
            stack_capacity: lowered.stack_capacity,
            var_count: names.len(),
            stack: vec![0.0; lowered.stack_capacity],
        })
    }

    /// Validate only; nothing is compiled or kept.
    ///
    /// # Errors
    ///
    /// Returns the first [`SyntaxError`], located in the original string.
    pub fn check<S: AsRef<str>>(text: &str, vars: &[S]) -> Result<(), SyntaxError> {
        let names: Vec<&str> = vars.iter().map(AsRef::as_ref).collect();
        let scanned = Scanned::new(text);
        syntax_check(&scanned, &names, &Constants::default())
    }

    /// Evaluate against one value vector using the embedded scratch stack.
    ///
    /// # Errors
    ///
    /// Returns the domain-error code (1..8) of the first violating opcode.
    ///
    /// # Panics
    ///
    /// Panics if `values` is shorter than the variable list given at
    /// compile time; that is a programmer error, not a runtime condition.
    #[inline]
    pub fn eval(&mut self, values: &[f64]) -> Result<f64, EvalError> {
        exec::run(&self.code, &self.immediates, values, &mut self.stack)
    }

    /// Evaluate with a caller-supplied stack, leaving `self` shared.
    ///
    /// The stack is resized to the formula's capacity as needed; reuse one
    /// buffer across calls to stay allocation-free.
    ///
    /// # Errors
    ///
    /// Same as [`eval`](Formula::eval).
    #[inline]
    pub fn eval_with(&self, values: &[f64], stack: &mut Vec<f64>) -> Result<f64, EvalError> {
        if stack.len() < self.stack_capacity {
            stack.resize(self.stack_capacity, 0.0);
        }
        exec::run(&self.code, &self.immediates, values, stack)
    }

    /// Evaluate over columnar data: `columns[v][p]` is the value of
    /// variable `v` at point `p`, and `out[p]` receives the result.
    ///
    /// Points that hit a domain error produce 0 (matching the scalar
    /// error convention) and the first error is returned after the whole
    /// batch has been filled.
    ///
    /// # Errors
    ///
    /// The first domain error encountered, if any.
    ///
    /// # Panics
    ///
    /// Panics if `columns.len()` differs from the variable count or the
    /// columns and `out` disagree on length.
    pub fn eval_batch(&mut self, columns: &[&[f64]], out: &mut [f64]) -> Result<(), EvalError> {
        assert_eq!(columns.len(), self.var_count, "one column per variable");
        let points = out.len();
        assert!(
            columns.iter().all(|c| c.len() == points),
            "columns and output must have equal length"
        );

        let mut first_err = None;
        let mut values = vec![0.0; self.var_count];
        for (p, slot) in out.iter_mut().enumerate() {
            for (v, column) in columns.iter().enumerate() {
                values[v] = column[p];
            }
            match exec::run(&self.code, &self.immediates, &values, &mut self.stack) {
                Ok(r) => *slot = r,
                Err(err) => {
                    *slot = 0.0;
                    first_err.get_or_insert(err);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Parallel version of [`eval_batch`](Formula::eval_batch), chunked
    /// over rayon's thread pool with per-thread scratch stacks.
    ///
    /// Falls back to the sequential path below 256 points, where the
    /// fork/join overhead outweighs the work.
    ///
    /// # Errors
    ///
    /// The first domain error in point order, if any.
    ///
    /// # Panics
    ///
    /// Same shape requirements as [`eval_batch`](Formula::eval_batch).
    #[cfg(feature = "parallel")]
    pub fn eval_batch_parallel(
        &mut self,
        columns: &[&[f64]],
        out: &mut [f64],
    ) -> Result<(), EvalError> {
        use rayon::prelude::*;

        const MIN_PARALLEL_POINTS: usize = 256;

        assert_eq!(columns.len(), self.var_count, "one column per variable");
        let points = out.len();
        assert!(
            columns.iter().all(|c| c.len() == points),
            "columns and output must have equal length"
        );

        if points < MIN_PARALLEL_POINTS {
            return self.eval_batch(columns, out);
        }

        let code = &self.code;
        let immediates = &self.immediates;
        let capacity = self.stack_capacity;
        let var_count = self.var_count;

        let first_err = out
            .par_iter_mut()
            .enumerate()
            .map_init(
                || (vec![0.0; capacity], vec![0.0; var_count]),
                |(stack, values), (p, slot)| {
                    for (v, column) in columns.iter().enumerate() {
                        values[v] = column[p];
                    }
                    match exec::run(code, immediates, values, stack) {
                        Ok(r) => {
                            *slot = r;
                            None
                        }
                        Err(err) => {
                            *slot = 0.0;
                            Some((p, err))
                        }
                    }
                },
            )
            .flatten()
            .min_by_key(|&(p, _)| p);

        first_err.map_or(Ok(()), |(_, err)| Err(err))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The compiled bytecode.
    #[inline]
    #[must_use]
    pub fn bytecode(&self) -> &[Op] {
        &self.code
    }

    /// The immediate pool, in `PushImmed` consumption order.
    #[inline]
    #[must_use]
    pub fn immediates(&self) -> &[f64] {
        &self.immediates
    }

    /// Exact operand-stack requirement of the bytecode.
    #[inline]
    #[must_use]
    pub const fn stack_capacity(&self) -> usize {
        self.stack_capacity
    }

    /// Number of variables fixed at compile time.
    #[inline]
    #[must_use]
    pub const fn var_count(&self) -> usize {
        self.var_count
    }
}

impl std::fmt::Debug for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Formula")
            .field("instruction_count", &self.code.len())
            .field("immediate_count", &self.immediates.len())
            .field("stack_capacity", &self.stack_capacity)
            .field("var_count", &self.var_count)
            .finish()
    }
}
