//! Left-to-right syntax validation of the normalised string.
//!
//! A single fail-fast pass that tracks parenthesis depth, operand/operator
//! alternation, function arity and number well-formedness. The compiler
//! only runs on strings this pass has accepted, which lets it assume a
//! well-formed token stream.

use super::{Scanned, scan_real};
use crate::constants::Constants;
use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::functions;

const OPERATOR_BYTES: [u8; 5] = [b'+', b'-', b'*', b'/', b'^'];

#[inline]
fn is_operator(b: u8) -> bool {
    OPERATOR_BYTES.contains(&b)
}

/// Bytes that terminate a variable name.
#[inline]
fn is_name_delimiter(b: u8) -> bool {
    is_operator(b) || b == b',' || b == b')' || b == b' '
}

/// Find the `)` matching the `(` at `open`.
fn matching_paren(f: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (k, &b) in f.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(k);
                }
            }
            _ => {}
        }
    }
    None
}

/// Count commas at the top level of `f[from..to]`.
fn top_level_commas(f: &[u8], from: usize, to: usize) -> usize {
    let mut depth = 0i32;
    let mut commas = 0;
    for &b in &f[from..to] {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b',' if depth == 0 => commas += 1,
            _ => {}
        }
    }
    commas
}

/// Validate the normalised expression against the variable-name list.
///
/// Returns the first violation, located in the original string via the
/// position map.
pub(crate) fn syntax_check(
    scanned: &Scanned,
    vars: &[&str],
    consts: &Constants,
) -> Result<(), SyntaxError> {
    let f = scanned.bytes();
    let n = f.len();
    let fail = |kind, pos| Err(scanned.error(kind, pos));

    if n == 0 {
        return fail(SyntaxErrorKind::MissingOperand, 0);
    }

    let mut i = 0;
    let mut depth = 0u32;
    // Remaining comma allowance per open parenthesis; >0 only for the
    // argument list of a two-argument function.
    let mut commas: Vec<u8> = Vec::new();

    loop {
        // An operand is expected here. Optionally consume one sign.
        if f[i] == b'+' || f[i] == b'-' {
            i += 1;
            if i >= n {
                return fail(SyntaxErrorKind::MissingOperand, i);
            }
            if is_operator(f[i]) || f[i] == b',' {
                return fail(SyntaxErrorKind::MultipleOperators, i);
            }
        }

        if f[i] == b'(' {
            depth += 1;
            commas.push(0);
            i += 1;
            if i >= n {
                return fail(SyntaxErrorKind::MissingOperand, i);
            }
            continue;
        }

        if f[i] == b')' {
            if i > 0 && f[i - 1] == b'(' {
                return fail(SyntaxErrorKind::EmptyParentheses, i);
            }
            return fail(SyntaxErrorKind::MissingOperand, i);
        }

        if f[i].is_ascii_digit() || f[i] == b'.' {
            match scan_real(f, i) {
                Ok(tok) => i = tok.end,
                Err(pos) => return fail(SyntaxErrorKind::InvalidNumber, pos),
            }
        } else if f[i].is_ascii_alphabetic() {
            if let Some(def) = functions::longest_match(&f[i..]) {
                // Builtin call: `(` must follow the name immediately, and
                // the argument list must carry exactly arity-1 top-level
                // commas. The scan then continues *into* the list.
                let open = i + def.name.len();
                if open >= n || f[open] != b'(' {
                    return fail(SyntaxErrorKind::MissingOpenParen, open);
                }
                let Some(close) = matching_paren(f, open) else {
                    return fail(SyntaxErrorKind::MissingCloseParen, n);
                };
                let found = top_level_commas(f, open + 1, close);
                if found + 1 != usize::from(def.arity) {
                    return fail(SyntaxErrorKind::WrongArgumentCount, i);
                }
                depth += 1;
                commas.push(def.arity - 1);
                i = open + 1;
                if i >= n {
                    return fail(SyntaxErrorKind::MissingOperand, i);
                }
                continue;
            }

            // Variable, then named constant.
            let mut end = i;
            while end < n && !is_name_delimiter(f[end]) {
                end += 1;
            }
            let name = &f[i..end];
            if vars.iter().any(|v| v.as_bytes() == name) {
                i = end;
            } else if consts.match_prefix(name).is_some() {
                i += 2;
            } else {
                return fail(SyntaxErrorKind::InvalidElement, i);
            }
        } else if f[i] == b',' {
            return fail(SyntaxErrorKind::MissingOperand, i);
        } else {
            return fail(SyntaxErrorKind::InvalidElement, i);
        }

        // Close any parentheses the operand ended.
        while i < n && f[i] == b')' {
            if depth == 0 {
                return fail(SyntaxErrorKind::MismatchedParenthesis, i);
            }
            depth -= 1;
            commas.pop();
            i += 1;
        }

        if i >= n {
            if depth > 0 {
                return fail(SyntaxErrorKind::MissingCloseParen, n);
            }
            return Ok(());
        }

        // A binary operator or an argument separator must follow.
        if is_operator(f[i]) {
            i += 1;
            if i >= n {
                return fail(SyntaxErrorKind::MissingOperand, i);
            }
            if matches!(f[i], b'*' | b'/' | b'^') {
                return fail(SyntaxErrorKind::MultipleOperators, i);
            }
            continue;
        }
        if f[i] == b',' {
            match commas.last_mut() {
                Some(allowance) if *allowance > 0 => *allowance -= 1,
                _ => return fail(SyntaxErrorKind::MisplacedComma, i),
            }
            i += 1;
            if i >= n {
                return fail(SyntaxErrorKind::MissingOperand, i);
            }
            continue;
        }
        return fail(SyntaxErrorKind::InvalidElement, i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str, vars: &[&str]) -> Result<(), SyntaxError> {
        syntax_check(&Scanned::new(text), vars, &Constants::default())
    }

    fn kind_of(text: &str, vars: &[&str]) -> SyntaxErrorKind {
        check(text, vars).unwrap_err().kind
    }

    #[test]
    fn accepts_well_formed_expressions() {
        let vars = &["x", "y"];
        for expr in [
            "2+3*4",
            "-2^2",
            "sqrt(x^2+y^2)",
            "atan2(1,1)",
            "1/(x-x)",
            "log(-1)",
            "(-8)^(1/3)",
            "pi*mu",
            "2 ** (1+2)",
            "gamf(-3)",
            "x^-2",
            "1++x",
            "sin(cos(tan(x)))",
            "atan2(sin(x), cos(y))",
            "-(x+y)",
            "-sin(x)",
            "+x",
            "1.5e+3*x",
            "2d-7",
            ".5",
        ] {
            assert!(check(expr, vars).is_ok(), "expected {expr:?} to pass");
        }
    }

    #[test]
    fn rejects_the_specified_scenarios() {
        let vars = &["x", "y"];
        assert_eq!(kind_of("((x+1)", vars), SyntaxErrorKind::MissingCloseParen);
        assert_eq!(kind_of("x y", vars), SyntaxErrorKind::InvalidElement);
        assert_eq!(kind_of("foo(x)", vars), SyntaxErrorKind::InvalidElement);
        assert_eq!(kind_of("sin()", vars), SyntaxErrorKind::EmptyParentheses);
        assert_eq!(kind_of("atan2(1)", vars), SyntaxErrorKind::WrongArgumentCount);
        assert_eq!(kind_of("3.e", vars), SyntaxErrorKind::InvalidNumber);
        assert_eq!(kind_of("+*x", vars), SyntaxErrorKind::MultipleOperators);
    }

    #[test]
    fn operator_alternation() {
        let vars = &["x"];
        assert_eq!(kind_of("x+*2", vars), SyntaxErrorKind::MultipleOperators);
        assert_eq!(kind_of("x*", vars), SyntaxErrorKind::MissingOperand);
        assert_eq!(kind_of("x+", vars), SyntaxErrorKind::MissingOperand);
        assert_eq!(kind_of("--x", vars), SyntaxErrorKind::MultipleOperators);
        // `a * * b` must not fuse into a power
        assert_eq!(kind_of("x * * 2", vars), SyntaxErrorKind::MultipleOperators);
        assert!(check("x ** 2", vars).is_ok());
    }

    #[test]
    fn parenthesis_tracking() {
        let vars = &["x"];
        assert_eq!(kind_of("x+1)", vars), SyntaxErrorKind::MismatchedParenthesis);
        assert_eq!(kind_of("()", vars), SyntaxErrorKind::EmptyParentheses);
        assert_eq!(kind_of("(x", vars), SyntaxErrorKind::MissingCloseParen);
        assert_eq!(kind_of("sin(x", vars), SyntaxErrorKind::MissingCloseParen);
        assert_eq!(kind_of("(", vars), SyntaxErrorKind::MissingOperand);
    }

    #[test]
    fn function_arity() {
        let vars = &["x"];
        assert_eq!(kind_of("atan2(1,2,3)", vars), SyntaxErrorKind::WrongArgumentCount);
        assert_eq!(kind_of("sin(1,2)", vars), SyntaxErrorKind::WrongArgumentCount);
        // A nested comma belongs to the inner call, not the outer one.
        assert!(check("atan2(atan2(1,2),3)", vars).is_ok());
        assert_eq!(
            kind_of("atan2((1,2))", vars),
            SyntaxErrorKind::WrongArgumentCount
        );
        assert_eq!(kind_of("atan2(1,)", vars), SyntaxErrorKind::MissingOperand);
        assert_eq!(kind_of("atan2(,1)", vars), SyntaxErrorKind::MissingOperand);
    }

    #[test]
    fn stray_commas() {
        let vars = &["x"];
        assert_eq!(kind_of("1,2", vars), SyntaxErrorKind::MisplacedComma);
        assert_eq!(kind_of("(1,2)", vars), SyntaxErrorKind::MisplacedComma);
    }

    #[test]
    fn function_name_requires_open_paren() {
        // A variable whose name starts with a builtin name is rejected;
        // the builtin match wins and demands its parenthesis.
        assert_eq!(kind_of("exp_max", &["exp_max"]), SyntaxErrorKind::MissingOpenParen);
        assert_eq!(kind_of("sin", &[]), SyntaxErrorKind::MissingOpenParen);
    }

    #[test]
    fn constants_are_two_character_prefixes() {
        assert!(check("pi", &[]).is_ok());
        assert!(check("mu*pi", &[]).is_ok());
        // `pit` consumes `pi` and then trips over the trailing `t`.
        assert_eq!(kind_of("pit", &[]), SyntaxErrorKind::InvalidElement);
        // Case-sensitive, unlike function names.
        assert_eq!(kind_of("PI", &[]), SyntaxErrorKind::InvalidElement);
    }

    #[test]
    fn variables_are_case_sensitive() {
        assert!(check("Volt", &["Volt"]).is_ok());
        assert_eq!(kind_of("volt", &["Volt"]), SyntaxErrorKind::InvalidElement);
    }

    #[test]
    fn empty_variable_table_falls_through_to_constants() {
        assert!(check("pi^2", &[]).is_ok());
        assert_eq!(kind_of("x", &[]), SyntaxErrorKind::InvalidElement);
    }

    #[test]
    fn empty_input() {
        assert_eq!(kind_of("", &[]), SyntaxErrorKind::MissingOperand);
        assert_eq!(kind_of("   ", &[]), SyntaxErrorKind::MissingOperand);
    }

    #[test]
    fn error_positions_refer_to_the_original_string() {
        // The fault is the `$` at original offset 4.
        let err = check("x + $", &["x"]).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::InvalidElement);
        assert_eq!(err.position, 4);

        // End-of-input faults point one past the original string.
        let err = check("x + ", &["x"]).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::MissingOperand);
        assert_eq!(err.position, 4);
    }
}
