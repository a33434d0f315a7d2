//! Named constants available in formulas.
//!
//! Two tokens are recognised, each matched as a two-character prefix:
//! `pi` and `mu`. `pi` is fixed; `mu` reads the registry's `mu0` scalar at
//! parse time, so its value is baked into the compiled immediates and
//! later changes to `mu0` do not affect existing slots.

/// Parse-time constant environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constants {
    /// Value substituted for the `mu` token. Defaults to 1.
    pub mu0: f64,
}

impl Default for Constants {
    fn default() -> Self {
        Self { mu0: 1.0 }
    }
}

impl Constants {
    /// Match a constant as a two-character prefix of `rest`, returning its
    /// numeric value. Matching is case-sensitive, like variable names.
    pub(crate) fn match_prefix(&self, rest: &[u8]) -> Option<f64> {
        if rest.starts_with(b"pi") {
            Some(std::f64::consts::PI)
        } else if rest.starts_with(b"mu") {
            Some(self.mu0)
        } else {
            None
        }
    }
}
