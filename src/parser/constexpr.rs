//! Constant integer expressions used for array sizes and case labels
//! (spec.md §4.3): a left-fold over `+ - * / %` with parenthesised atoms.
//! Evaluation order is left to right and is directly observable for the
//! non-associative operators (§8, testable property #5).

use crate::error::Diagnostic;
use crate::lexer::token::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
    /// `const_int_expr := const_atom { ('+'|'-'|'*'|'/'|'%') const_atom }`.
    pub(crate) fn const_int_expr(&mut self) -> i64 {
        let mut value = self.const_atom();
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => '+',
                TokenKind::Minus => '-',
                TokenKind::Star => '*',
                TokenKind::Slash => '/',
                TokenKind::Percent => '%',
                _ => break,
            };
            self.advance();
            let rhs = self.const_atom();
            value = match op {
                '+' => value.wrapping_add(rhs),
                '-' => value.wrapping_sub(rhs),
                '*' => value.wrapping_mul(rhs),
                '/' if rhs != 0 => value.wrapping_div(rhs),
                '%' if rhs != 0 => value.wrapping_rem(rhs),
                '/' | '%' => {
                    let span = self.current_span();
                    self.report(Diagnostic::semantic("division by zero in constant expression", span));
                    0
                }
                _ => unreachable!(),
            };
        }
        value
    }

    /// `const_atom := integer-literal | '(' const_int_expr ')'`.
    fn const_atom(&mut self) -> i64 {
        match self.current.kind.clone() {
            TokenKind::IntLiteral(v) => {
                self.advance();
                v
            }
            TokenKind::LParen => {
                self.advance();
                let v = self.const_int_expr();
                self.expect(&TokenKind::RParen, "after constant expression");
                v
            }
            _ => {
                let span = self.current_span();
                self.report(Diagnostic::syntactic(
                    format!("expected a constant integer expression, found {:?}", self.current.kind),
                    span,
                ));
                0
            }
        }
    }
}
