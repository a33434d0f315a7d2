//! Builtin function table.
//!
//! Function names are matched case-insensitively as literal prefixes with
//! explicit longest-match selection, so `atan2` wins over `atan`, `erfcs`
//! over `erfc` over `erf`, and `log10` over `log`. Variable names, by
//! contrast, are matched case-sensitively (see the scanner); the asymmetry
//! is deliberate and preserved from the engine this one replaces.

use crate::compile::Op;

/// One entry of the builtin table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FunctionDef {
    /// Canonical (lowercase) name.
    pub name: &'static str,
    /// Number of arguments; 1 for everything except `atan2`.
    pub arity: u8,
    /// Opcode emitted after the argument subexpressions.
    pub op: Op,
}

/// Every builtin. Order does not matter for lookup correctness because
/// [`longest_match`] scans the whole table, but related names are grouped
/// for readability.
pub(crate) static FUNCTIONS: &[FunctionDef] = &[
    FunctionDef { name: "abs", arity: 1, op: Op::Abs },
    FunctionDef { name: "exp", arity: 1, op: Op::Exp },
    FunctionDef { name: "log10", arity: 1, op: Op::Log10 },
    FunctionDef { name: "log", arity: 1, op: Op::Ln },
    FunctionDef { name: "sqrt", arity: 1, op: Op::Sqrt },
    FunctionDef { name: "sinh", arity: 1, op: Op::Sinh },
    FunctionDef { name: "cosh", arity: 1, op: Op::Cosh },
    FunctionDef { name: "tanh", arity: 1, op: Op::Tanh },
    FunctionDef { name: "sin", arity: 1, op: Op::Sin },
    FunctionDef { name: "cos", arity: 1, op: Op::Cos },
    FunctionDef { name: "tan", arity: 1, op: Op::Tan },
    FunctionDef { name: "asin", arity: 1, op: Op::Asin },
    FunctionDef { name: "acos", arity: 1, op: Op::Acos },
    FunctionDef { name: "atan2", arity: 2, op: Op::Atan2 },
    FunctionDef { name: "atan", arity: 1, op: Op::Atan },
    FunctionDef { name: "besj0", arity: 1, op: Op::Besj0 },
    FunctionDef { name: "besj1", arity: 1, op: Op::Besj1 },
    FunctionDef { name: "besy0", arity: 1, op: Op::Besy0 },
    FunctionDef { name: "besy1", arity: 1, op: Op::Besy1 },
    FunctionDef { name: "erfcs", arity: 1, op: Op::Erfcs },
    FunctionDef { name: "erfc", arity: 1, op: Op::Erfc },
    FunctionDef { name: "erf", arity: 1, op: Op::Erf },
    FunctionDef { name: "gamf", arity: 1, op: Op::Gamma },
];

/// Case-insensitive longest prefix match of `rest` against the table.
pub(crate) fn longest_match(rest: &[u8]) -> Option<&'static FunctionDef> {
    let mut best: Option<&'static FunctionDef> = None;
    for def in FUNCTIONS {
        let n = def.name.len();
        if rest.len() >= n
            && rest[..n].eq_ignore_ascii_case(def.name.as_bytes())
            && best.is_none_or(|b| n > b.name.len())
        {
            best = Some(def);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_prefers_longer_names() {
        assert_eq!(longest_match(b"atan2(1,1)").unwrap().name, "atan2");
        assert_eq!(longest_match(b"atan(1)").unwrap().name, "atan");
        assert_eq!(longest_match(b"erfcs(x)").unwrap().name, "erfcs");
        assert_eq!(longest_match(b"erfc(x)").unwrap().name, "erfc");
        assert_eq!(longest_match(b"erf(x)").unwrap().name, "erf");
        assert_eq!(longest_match(b"log10(x)").unwrap().name, "log10");
        assert_eq!(longest_match(b"log(x)").unwrap().name, "log");
        assert_eq!(longest_match(b"tanh(x)").unwrap().name, "tanh");
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(longest_match(b"SIN(x)").unwrap().name, "sin");
        assert_eq!(longest_match(b"Atan2(y,x)").unwrap().name, "atan2");
        assert_eq!(longest_match(b"GAMF(2)").unwrap().name, "gamf");
    }

    #[test]
    fn unknown_names_miss() {
        assert!(longest_match(b"foo(x)").is_none());
        assert!(longest_match(b"x").is_none());
        assert!(longest_match(b"").is_none());
    }

    #[test]
    fn only_atan2_takes_two_arguments() {
        for def in FUNCTIONS {
            if def.name == "atan2" {
                assert_eq!(def.arity, 2);
            } else {
                assert_eq!(def.arity, 1);
            }
        }
    }
}
