use std::fmt;

/// Syntax violations found while validating or compiling a formula.
///
/// The position always refers to the user's **original** string (before
/// `**` rewriting and whitespace elision), so diagnostics can point at the
/// character the user actually typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxError {
    /// What went wrong.
    pub kind: SyntaxErrorKind,
    /// 0-indexed byte offset into the original string. May equal the
    /// string length when the problem is at end of input.
    pub position: usize,
}

/// Categories of syntax errors, one per diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyntaxErrorKind {
    /// Two operator characters in a row where an operand was required.
    MultipleOperators,
    /// Operand expected but the string (or the sub-expression) ended.
    MissingOperand,
    /// Malformed real-number literal.
    InvalidNumber,
    /// Token is neither a number, a known variable nor a named constant.
    InvalidElement,
    /// A `)` without a matching `(`.
    MismatchedParenthesis,
    /// `()` with nothing inside.
    EmptyParentheses,
    /// Unclosed `(` at end of input.
    MissingCloseParen,
    /// Builtin function name not immediately followed by `(`.
    MissingOpenParen,
    /// Function called with the wrong number of arguments.
    WrongArgumentCount,
    /// Comma outside a two-argument function call.
    MisplacedComma,
    /// Registry slot index outside `1..=n`.
    SlotOutOfRange,
}

impl SyntaxErrorKind {
    /// Diagnostic message for this kind.
    pub const fn message(self) -> &'static str {
        match self {
            Self::MultipleOperators => "Multiple operators",
            Self::MissingOperand => "Missing operand",
            Self::InvalidNumber => "Invalid number format",
            Self::InvalidElement => "Invalid element",
            Self::MismatchedParenthesis => "Mismatched parenthesis",
            Self::EmptyParentheses => "Empty parentheses",
            Self::MissingCloseParen => "Missing )",
            Self::MissingOpenParen => "Missing ( after function name",
            Self::WrongArgumentCount => "Wrong number of function arguments",
            Self::MisplacedComma => "Misplaced comma",
            Self::SlotOutOfRange => "Function slot out of range",
        }
    }
}

impl SyntaxError {
    pub(crate) const fn new(kind: SyntaxErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    /// Render the caret diagnostic against the original string:
    ///
    /// ```text
    /// *** Error in syntax of function string: Missing )
    ///
    ///  ((x+1)
    ///        ^
    /// ```
    ///
    /// The original is prefixed by one space and the caret is padded to the
    /// fault position.
    #[must_use]
    pub fn render(&self, original: &str) -> String {
        format!(
            "*** Error in syntax of function string: {}\n\n {}\n {}^",
            self.kind.message(),
            original,
            " ".repeat(self.position.min(original.len())),
        )
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at position {}",
            self.kind.message(),
            self.position + 1
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Domain errors raised while evaluating compiled bytecode.
///
/// The discriminants are the stable error codes `1..=8` surfaced by
/// [`FormulaRegistry::eval_err_code`](crate::FormulaRegistry::eval_err_code).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EvalError {
    /// Division by zero.
    DivisionByZero = 1,
    /// Square root of a negative operand.
    SqrtOfNegative = 2,
    /// `ln` or `log10` of a non-positive operand.
    LogOfNonPositive = 3,
    /// `asin`/`acos` operand outside `[-1, 1]`.
    AsinAcosOutOfRange = 4,
    /// Negative base raised to a non-integral power.
    FractionalPowerOfNegative = 5,
    /// `besy0` of a non-positive operand.
    Besy0NonPositive = 6,
    /// `besy1` of a non-positive operand.
    Besy1NonPositive = 7,
    /// Gamma function at a non-positive integer (a pole).
    GammaAtPole = 8,
}

impl EvalError {
    /// Stable numeric code, `1..=8`.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`EvalError::code`]. Returns `None` for 0 and anything
    /// above 8.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::DivisionByZero),
            2 => Some(Self::SqrtOfNegative),
            3 => Some(Self::LogOfNonPositive),
            4 => Some(Self::AsinAcosOutOfRange),
            5 => Some(Self::FractionalPowerOfNegative),
            6 => Some(Self::Besy0NonPositive),
            7 => Some(Self::Besy1NonPositive),
            8 => Some(Self::GammaAtPole),
            _ => None,
        }
    }

    /// Human-readable message for this error.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DivisionByZero => "Division by zero",
            Self::SqrtOfNegative => "Square root of negative argument",
            Self::LogOfNonPositive => "Logarithm of non-positive argument",
            Self::AsinAcosOutOfRange => "Inverse sine/cosine of argument outside [-1,1]",
            Self::FractionalPowerOfNegative => "Negative base raised to fractional power",
            Self::Besy0NonPositive => "besy0 of non-positive argument",
            Self::Besy1NonPositive => "besy1 of non-positive argument",
            Self::GammaAtPole => "Gamma function at non-positive integer",
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for EvalError {}

/// Message table keyed by evaluation error code.
///
/// Returns the empty string for 0 (no error) and for codes outside `1..=8`,
/// mirroring the behaviour callers expect when they feed a stored
/// `eval_err_code` straight back in.
#[must_use]
pub fn eval_err_msg(code: u8) -> &'static str {
    EvalError::from_code(code).map_or("", EvalError::message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in 1..=8u8 {
            let err = EvalError::from_code(code).unwrap();
            assert_eq!(err.code(), code);
            assert!(!err.message().is_empty());
        }
        assert_eq!(EvalError::from_code(0), None);
        assert_eq!(EvalError::from_code(9), None);
    }

    #[test]
    fn message_table_is_empty_outside_range() {
        assert_eq!(eval_err_msg(0), "");
        assert_eq!(eval_err_msg(9), "");
        assert_eq!(eval_err_msg(1), "Division by zero");
        assert_eq!(eval_err_msg(8), "Gamma function at non-positive integer");
    }

    #[test]
    fn caret_lines_up_with_original() {
        let err = SyntaxError::new(SyntaxErrorKind::InvalidElement, 2);
        let rendered = err.render("x $ y");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "*** Error in syntax of function string: Invalid element");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], " x $ y");
        // One space of prefix plus two of padding puts the caret under '$'.
        assert_eq!(lines[3], "   ^");
    }
}
