//! Boolean functions over register state in reverse Polish notation.

use core::fmt;
use core::str::FromStr;

use crate::bits::Bit;
use crate::error::{FsrError, Result};

/// One token of an RPN expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    /// Pushes the state bit at this (0-based) index.
    Index(usize),
    /// Pops two values and pushes their XOR.
    Xor,
    /// Pops two values and pushes their AND.
    And,
}

impl FromStr for Token {
    type Err = FsrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "+" | "xor" => Ok(Token::Xor),
            "*" | "and" => Ok(Token::And),
            digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits
                .parse::<usize>()
                .map(Token::Index)
                .map_err(|_| FsrError::MalformedExpression(format!("index {s:?} out of range"))),
            _ => Err(FsrError::MalformedExpression(format!("unknown token {s:?}"))),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Index(i) => write!(f, "{i}"),
            Token::Xor => f.write_str("xor"),
            Token::And => f.write_str("and"),
        }
    }
}

/// Validated RPN boolean expression used for output and feedback functions.
///
/// Construction only checks the token balance; index bounds depend on the
/// state the expression is evaluated against and are checked in
/// [`Expression::evaluate`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Expression {
    tokens: Vec<Token>,
    max_index: usize,
}

impl Expression {
    /// Builds an expression, requiring exactly one more operand than operators.
    pub fn new(tokens: Vec<Token>) -> Result<Self> {
        let operands = tokens
            .iter()
            .filter(|t| matches!(t, Token::Index(_)))
            .count();
        let operators = tokens.len() - operands;
        if operands != operators + 1 {
            return Err(FsrError::MalformedExpression(format!(
                "{operands} operands and {operators} operators"
            )));
        }
        let max_index = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Index(i) => Some(*i),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        Ok(Self { tokens, max_index })
    }

    /// Expression that reads a single state bit.
    pub fn single(index: usize) -> Self {
        Self {
            tokens: vec![Token::Index(index)],
            max_index: index,
        }
    }

    /// Tokens in evaluation order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// True if the expression is a lone index.
    pub fn is_single(&self) -> bool {
        self.tokens.len() == 1
    }

    /// Evaluates the expression against `bits` with a value stack.
    ///
    /// Every bit the expression reads must be 0 or 1.
    pub fn evaluate(&self, bits: &[Bit]) -> Result<Bit> {
        if self.max_index >= bits.len() {
            return Err(FsrError::IndexOutOfRange {
                index: self.max_index,
                len: bits.len(),
            });
        }

        let mut stack: Vec<Bit> = Vec::with_capacity(self.tokens.len());
        for &token in &self.tokens {
            match token {
                Token::Index(i) => match bits[i] {
                    bit @ (0 | 1) => stack.push(bit),
                    other => return Err(FsrError::InvalidBit(other)),
                },
                Token::Xor | Token::And => {
                    let first = stack.pop().ok_or(FsrError::StackUnderflow)?;
                    let second = stack.pop().ok_or(FsrError::StackUnderflow)?;
                    let value = if token == Token::Xor {
                        second ^ first
                    } else {
                        second & first
                    };
                    stack.push(value);
                }
            }
        }

        match stack.as_slice() {
            [value] => Ok(*value),
            rest => Err(FsrError::UnresolvedExpression(rest.len())),
        }
    }
}

impl FromStr for Expression {
    type Err = FsrError;

    /// Parses whitespace or comma separated tokens, e.g. `"0 1 and 2 xor"`.
    fn from_str(s: &str) -> Result<Self> {
        let tokens = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Token>>>()?;
        Self::new(tokens)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::{And, Index, Xor};

    fn expr(tokens: &[Token]) -> Expression {
        Expression::new(tokens.to_vec()).expect("well-formed expression")
    }

    #[test]
    fn xor_truth_table() {
        let f = expr(&[Index(0), Index(1), Xor]);
        assert_eq!(f.evaluate(&[0, 0]), Ok(0));
        assert_eq!(f.evaluate(&[1, 0]), Ok(1));
        assert_eq!(f.evaluate(&[0, 1]), Ok(1));
        assert_eq!(f.evaluate(&[1, 1]), Ok(0));
    }

    #[test]
    fn and_truth_table() {
        let f = expr(&[Index(0), Index(1), And]);
        assert_eq!(f.evaluate(&[0, 0]), Ok(0));
        assert_eq!(f.evaluate(&[1, 0]), Ok(0));
        assert_eq!(f.evaluate(&[0, 1]), Ok(0));
        assert_eq!(f.evaluate(&[1, 1]), Ok(1));
    }

    #[test]
    fn xor_chains_are_order_invariant() {
        let nested = expr(&[Index(0), Index(1), Index(2), Xor, Xor]);
        let chained = expr(&[Index(0), Index(1), Xor, Index(2), Xor]);
        assert_eq!(nested.evaluate(&[0, 1, 0]), Ok(1));
        assert_eq!(chained.evaluate(&[0, 1, 0]), Ok(1));
    }

    #[test]
    fn mixed_operators_respect_postfix_order() {
        let f = expr(&[Index(0), Index(1), Index(2), And, Xor]);
        assert_eq!(f.evaluate(&[1, 1, 0]), Ok(1));
        assert_eq!(f.evaluate(&[0, 1, 0]), Ok(0));
        let g = expr(&[Index(0), Index(1), Index(2), Xor, And]);
        assert_eq!(g.evaluate(&[1, 1, 0]), Ok(1));
        assert_eq!(g.evaluate(&[0, 1, 0]), Ok(0));
    }

    #[test]
    fn unbalanced_expressions_are_rejected() {
        for tokens in [
            vec![Index(0), Index(1)],
            vec![Index(0), Xor],
            vec![Index(0), Index(1), Xor, Xor],
            vec![],
        ] {
            assert!(matches!(
                Expression::new(tokens),
                Err(FsrError::MalformedExpression(_))
            ));
        }
    }

    #[test]
    fn out_of_range_index_fails_on_evaluation() {
        let f = expr(&[Index(0), Index(1), Xor]);
        assert_eq!(
            f.evaluate(&[1]),
            Err(FsrError::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn operator_before_operands_underflows() {
        let f = expr(&[Index(0), Xor, Index(1)]);
        assert_eq!(f.evaluate(&[1, 0]), Err(FsrError::StackUnderflow));
    }

    #[test]
    fn leftover_operands_are_unresolved() {
        let f = Expression {
            tokens: vec![Index(0), Index(1), Xor, Index(0)],
            max_index: 1,
        };
        assert_eq!(f.evaluate(&[1, 0]), Err(FsrError::UnresolvedExpression(2)));
    }

    #[test]
    fn non_binary_inputs_are_rejected() {
        let f = expr(&[Index(0), Index(1), Xor]);
        assert_eq!(f.evaluate(&[2, 0]), Err(FsrError::InvalidBit(2)));
        assert_eq!(f.evaluate(&[0, 3]), Err(FsrError::InvalidBit(3)));
        assert_eq!(Expression::single(0).evaluate(&[3]), Err(FsrError::InvalidBit(3)));
        // Unread positions are not inspected.
        assert_eq!(Expression::single(0).evaluate(&[1, 7]), Ok(1));
    }

    #[test]
    fn parses_symbolic_and_word_operators() {
        let f: Expression = "0 1 and 2 xor".parse().expect("parse");
        let g: Expression = "0,1,*,2,+".parse().expect("parse");
        assert_eq!(f, g);
        assert_eq!(f.to_string(), "0-1-and-2-xor");
        assert!(matches!(
            "0 1 nand".parse::<Expression>(),
            Err(FsrError::MalformedExpression(_))
        ));
        assert!(matches!(
            "0 -1 xor".parse::<Expression>(),
            Err(FsrError::MalformedExpression(_))
        ));
        assert_eq!("XOR".parse::<Token>(), Ok(Xor));
        for token in ["+1", "^", "&", "", "1.0", "99999999999999999999999"] {
            assert!(
                matches!(
                    token.parse::<Token>(),
                    Err(FsrError::MalformedExpression(_))
                ),
                "{token:?} should be rejected"
            );
        }
    }
}
