//! Three-address code
//!
//! Code is not produced by a separate pass: every syntax node carries the list of
//! quadruples for its subtree, assembled while the parser builds the node.
//! - [`quad`]: Instructions ([`Quad`]) and their operands ([`Address`])
//! - [`emitter`]: Temporary and label allocation
//!
//! # Result Convention
//!
//! The value computed by a code list lives in the `res` field of its last
//! quadruple. Parents read it with [`result_of`] to wire their own instruction:
//! ```text
//! a + b   →   code(a) ++ code(b) ++ [+ res(a) res(b) → Tk]
//! ```

pub mod emitter;
pub mod quad;

pub use emitter::Emitter;
pub use quad::{Address, Constant, Operator, Quad};

/// Result address of a code list (the `res` of its last quadruple)
pub fn result_of(code: &[Quad]) -> Option<&Address> {
    code.last().and_then(|quad| quad.res.as_ref())
}

/// Render a code list as a table, one quadruple per row
pub fn render_table(code: &[Quad]) -> String {
    let mut out = String::from("| op | arg1 | arg2 | res |\n");
    for quad in code {
        out.push_str(&quad.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_of_last_quad() {
        let code = vec![
            Quad::assign(Address::int(1), Address::Temp(0)),
            Quad::assign(Address::int(2), Address::Temp(1)),
        ];
        assert_eq!(result_of(&code), Some(&Address::Temp(1)));
        assert_eq!(result_of(&[]), None);
    }

    #[test]
    fn test_render_table() {
        let code = vec![
            Quad::assign(Address::int(5), Address::Temp(0)),
            Quad::assign(Address::Temp(0), Address::name("x")),
        ];
        assert_eq!(
            render_table(&code),
            "| op | arg1 | arg2 | res |\n| ASSIGN | 5 | - | T0 |\n| ASSIGN | T0 | - | x |\n"
        );
    }
}
