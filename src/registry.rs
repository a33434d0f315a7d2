//! The function-slot registry.
//!
//! A registry is a fixed-length table of independently compiled formulas,
//! addressed by 1-based slot index. It owns the shared pieces of engine
//! state: the `mu0` scalar read by the `mu` constant at parse time, and
//! the evaluation error channel (`eval_err_*`) that callers poll after
//! [`evaluate`](FormulaRegistry::evaluate) returned 0.
//!
//! The registry is a plain value: create one per subsystem and drop it
//! when done. [`teardown`](FormulaRegistry::teardown) exists for hosts
//! that manage the lifecycle explicitly and is idempotent;
//! re-[`init`](FormulaRegistry::init) without a teardown is tolerated but
//! logs a warning and reclaims the previous slots first.

use tracing::warn;

use crate::constants::Constants;
use crate::error::{EvalError, SyntaxError, SyntaxErrorKind};
use crate::formula::Formula;

/// Fixed-size table of compiled formula slots.
///
/// # Example
///
/// ```
/// use formulac::FormulaRegistry;
///
/// let mut registry = FormulaRegistry::new(4);
/// registry
///     .parse(1, "sqrt(x^2 + y^2)", &["x", "y"], false)
///     .expect("valid formula");
///
/// let r = registry.evaluate(1, &[3.0, 4.0]);
/// assert!((r - 5.0).abs() < 1e-12);
/// assert_eq!(registry.eval_err_code(), 0);
/// ```
pub struct FormulaRegistry {
    slots: Vec<Option<Formula>>,
    constants: Constants,
    eval_err: Option<EvalError>,
}

impl FormulaRegistry {
    /// Allocate a registry with `n` empty slots, indexed `1..=n`.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            slots: vec_of_none(n),
            constants: Constants::default(),
            eval_err: None,
        }
    }

    /// Re-initialise with `n` empty slots.
    ///
    /// Calling this while compiled slots are still live is tolerated: the
    /// old slots are reclaimed first and a warning is logged, since it
    /// usually means a missing [`teardown`](FormulaRegistry::teardown).
    pub fn init(&mut self, n: usize) {
        let live = self.slots.iter().filter(|s| s.is_some()).count();
        if live > 0 {
            warn!(live, "formula registry re-initialised without teardown");
        }
        self.slots = vec_of_none(n);
        self.eval_err = None;
    }

    /// Release every slot. Idempotent; the registry can be re-`init`ed or
    /// simply dropped afterwards.
    pub fn teardown(&mut self) {
        self.slots.clear();
        self.eval_err = None;
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the registry has no slots (after `teardown`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Value substituted for the `mu` constant in subsequent parses.
    #[must_use]
    pub const fn mu0(&self) -> f64 {
        self.constants.mu0
    }

    /// Set the `mu` constant. Affects parses from now on; formulas already
    /// compiled keep the value that was baked into their immediates.
    pub const fn set_mu0(&mut self, mu0: f64) {
        self.constants.mu0 = mu0;
    }

    /// Compile `text` over `vars` into slot `slot` (1-based), replacing
    /// any previous content. On failure the slot keeps its old content.
    ///
    /// With `verbose` set, a failed parse prints the caret diagnostic to
    /// stderr, pointing into the original string.
    ///
    /// # Errors
    ///
    /// The first [`SyntaxError`], or `SlotOutOfRange` for a bad index.
    pub fn parse<S: AsRef<str>>(
        &mut self,
        slot: usize,
        text: &str,
        vars: &[S],
        verbose: bool,
    ) -> Result<(), SyntaxError> {
        if slot == 0 || slot > self.slots.len() {
            return Err(SyntaxError::new(SyntaxErrorKind::SlotOutOfRange, 0));
        }
        match Formula::compile(text, vars, &self.constants) {
            Ok(formula) => {
                self.slots[slot - 1] = Some(formula);
                Ok(())
            }
            Err(err) => {
                if verbose {
                    eprintln!("{}", err.render(text));
                }
                Err(err)
            }
        }
    }

    /// Validate `text` without touching any slot.
    ///
    /// # Errors
    ///
    /// The first [`SyntaxError`], as for [`parse`](FormulaRegistry::parse).
    pub fn check<S: AsRef<str>>(
        &self,
        text: &str,
        vars: &[S],
        verbose: bool,
    ) -> Result<(), SyntaxError> {
        Formula::check(text, vars).inspect_err(|err| {
            if verbose {
                eprintln!("{}", err.render(text));
            }
        })
    }

    /// Evaluate slot `slot` against `values`.
    ///
    /// On success clears the error channel and returns the result; on a
    /// domain error stores the code (readable via
    /// [`eval_err`](FormulaRegistry::eval_err) /
    /// [`eval_err_code`](FormulaRegistry::eval_err_code)) and returns 0.
    ///
    /// # Panics
    ///
    /// Panics when `slot` is out of range or empty, or when `values` is
    /// shorter than the variable list the slot was parsed with; these are
    /// programmer errors.
    pub fn evaluate(&mut self, slot: usize, values: &[f64]) -> f64 {
        let formula = self
            .slots
            .get_mut(slot.wrapping_sub(1))
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("evaluate of empty or out-of-range slot {slot}"));
        match formula.eval(values) {
            Ok(result) => {
                self.eval_err = None;
                result
            }
            Err(err) => {
                self.eval_err = Some(err);
                0.0
            }
        }
    }

    /// Domain error recorded by the most recent
    /// [`evaluate`](FormulaRegistry::evaluate), if any.
    #[must_use]
    pub const fn eval_err(&self) -> Option<EvalError> {
        self.eval_err
    }

    /// Numeric code of the recorded error; 0 means the last evaluation
    /// succeeded.
    #[must_use]
    pub fn eval_err_code(&self) -> u8 {
        self.eval_err.map_or(0, EvalError::code)
    }

    /// Message for the recorded error; empty when the last evaluation
    /// succeeded.
    #[must_use]
    pub fn eval_err_msg(&self) -> &'static str {
        self.eval_err.map_or("", EvalError::message)
    }

    /// Borrow a compiled slot, e.g. for bytecode introspection or
    /// [`Formula::eval_with`] from worker threads.
    #[must_use]
    pub fn slot(&self, slot: usize) -> Option<&Formula> {
        self.slots.get(slot.wrapping_sub(1)).and_then(Option::as_ref)
    }
}

fn vec_of_none(n: usize) -> Vec<Option<Formula>> {
    let mut slots = Vec::with_capacity(n);
    slots.resize_with(n, || None);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_evaluate() {
        let mut registry = FormulaRegistry::new(2);
        registry.parse(1, "x+1", &["x"], false).unwrap();
        registry.parse(2, "x*x", &["x"], false).unwrap();
        assert_eq!(registry.evaluate(1, &[41.0]), 42.0);
        assert_eq!(registry.evaluate(2, &[3.0]), 9.0);
    }

    #[test]
    fn reparse_replaces_slot_content() {
        let mut registry = FormulaRegistry::new(1);
        registry.parse(1, "x+1", &["x"], false).unwrap();
        registry.parse(1, "x-1", &["x"], false).unwrap();
        assert_eq!(registry.evaluate(1, &[10.0]), 9.0);
    }

    #[test]
    fn failed_parse_keeps_previous_content() {
        let mut registry = FormulaRegistry::new(1);
        registry.parse(1, "x+1", &["x"], false).unwrap();
        assert!(registry.parse(1, "x+", &["x"], false).is_err());
        assert_eq!(registry.evaluate(1, &[1.0]), 2.0);
    }

    #[test]
    fn slot_bounds() {
        let mut registry = FormulaRegistry::new(2);
        let err = registry.parse(0, "1", &[] as &[&str], false).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::SlotOutOfRange);
        let err = registry.parse(3, "1", &[] as &[&str], false).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::SlotOutOfRange);
        assert!(registry.parse(2, "1", &[] as &[&str], false).is_ok());
    }

    #[test]
    fn error_channel_is_sticky_until_next_success() {
        let mut registry = FormulaRegistry::new(1);
        registry.parse(1, "1/x", &["x"], false).unwrap();

        assert_eq!(registry.evaluate(1, &[0.0]), 0.0);
        assert_eq!(registry.eval_err(), Some(EvalError::DivisionByZero));
        assert_eq!(registry.eval_err_code(), 1);
        assert_eq!(registry.eval_err_msg(), "Division by zero");

        assert_eq!(registry.evaluate(1, &[2.0]), 0.5);
        assert_eq!(registry.eval_err_code(), 0);
        assert_eq!(registry.eval_err_msg(), "");
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut registry = FormulaRegistry::new(3);
        registry.parse(1, "1", &[] as &[&str], false).unwrap();
        registry.teardown();
        assert!(registry.is_empty());
        registry.teardown();
        assert!(registry.is_empty());
        registry.init(2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn reinit_reclaims_live_slots() {
        let mut registry = FormulaRegistry::new(2);
        registry.parse(1, "1", &[] as &[&str], false).unwrap();
        registry.init(5);
        assert_eq!(registry.len(), 5);
        assert!(registry.slot(1).is_none());
    }

    #[test]
    fn mu0_is_baked_at_parse_time() {
        let mut registry = FormulaRegistry::new(2);
        registry.set_mu0(2.5);
        registry.parse(1, "mu", &[] as &[&str], false).unwrap();
        registry.set_mu0(7.0);
        registry.parse(2, "mu", &[] as &[&str], false).unwrap();

        // Slot 1 keeps the value in force when it was parsed.
        assert_eq!(registry.evaluate(1, &[]), 2.5);
        assert_eq!(registry.evaluate(2, &[]), 7.0);
    }

    #[test]
    #[should_panic(expected = "empty or out-of-range slot")]
    fn evaluating_an_empty_slot_panics() {
        let mut registry = FormulaRegistry::new(1);
        let _ = registry.evaluate(1, &[]);
    }
}
