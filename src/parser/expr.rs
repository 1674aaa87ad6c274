//! Expressions (spec.md §4.3): literals, identifier load/inc/dec/assign,
//! calls, and parenthesised sub-expressions. Every production leaves its
//! result in the primary accumulator — there's no expression stack beyond
//! the call-argument pushes.

use crate::error::{Diagnostic, IoError, Span};
use crate::lexer::token::TokenKind;
use crate::symtab::Symbol;

use super::{Parser, PRIMARY_REG};

impl<'a> Parser<'a> {
    pub(crate) fn expression(&mut self) -> Result<(), IoError> {
        match self.current.kind.clone() {
            TokenKind::LParen => {
                self.advance();
                self.expression()?;
                self.expect(&TokenKind::RParen, "after parenthesised expression");
                Ok(())
            }
            TokenKind::IntLiteral(v) => {
                self.advance();
                self.cx.emitter.emit_load_int_constant(v, PRIMARY_REG, "integer literal")
            }
            TokenKind::StringLiteral(bytes) => {
                let lexeme = self.current.lexeme.clone();
                self.advance();
                let mut buffer = bytes;
                buffer.push(0);
                let label = self.cx.allocate_label("string constant");
                self.cx.strings.push(crate::symtab::StringConstant {
                    label,
                    lexeme,
                    bytes: buffer,
                });
                self.cx.emitter.emit_load_label_addr(label, "string literal address")
            }
            TokenKind::Identifier(name) => {
                let span = self.current_span();
                self.advance();
                self.identifier_tail(name, span)
            }
            TokenKind::FloatLiteral(v) => {
                // §7 "Incomplete feature": floating-point arithmetic has no
                // emission of its own, so a bare float literal (e.g.
                // `33.3;`) becomes a commented no-op rather than a value in
                // the accumulator.
                self.advance();
                self.cx
                    .emitter
                    .emit("nop", "", &format!("floating constant {v} (arithmetic not emitted)"))
            }
            _ => {
                let span = self.current_span();
                self.report(Diagnostic::syntactic(
                    format!("expected an expression, found {:?}", self.current.kind),
                    span,
                ));
                // Guarantee forward progress: an expression-starter that
                // isn't recognised must still be consumed, or callers like
                // `statement()`'s expression-statement fallthrough loop
                // forever re-parsing the same token (§7 "continues
                // parsing to end-of-input" requires actual progress).
                self.advance();
                Ok(())
            }
        }
    }

    fn identifier_tail(&mut self, name: String, span: Span) -> Result<(), IoError> {
        match self.current.kind.clone() {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let amount: i32 = if self.current.kind == TokenKind::PlusPlus { 1 } else { -1 };
                self.advance();
                let Some(symbol) = self.lookup_symbol(&name) else {
                    self.report(Diagnostic::undeclared(&name, span));
                    return Ok(());
                };
                if symbol.read_only {
                    self.report(Diagnostic::semantic(
                        format!("cannot modify read-only '{name}'"),
                        span,
                    ));
                    return Ok(());
                }
                self.cx.emitter.load_scalar(&symbol, PRIMARY_REG, "load before inc/dec")?;
                self.cx.emitter.emit_inc_scalar(&symbol, amount)
            }
            TokenKind::Assign => {
                self.advance();
                self.expression()?;
                let Some(symbol) = self.lookup_symbol(&name) else {
                    self.report(Diagnostic::undeclared(&name, span));
                    return Ok(());
                };
                if symbol.read_only {
                    self.report(Diagnostic::semantic(
                        format!("cannot assign to read-only '{name}'"),
                        span,
                    ));
                    return Ok(());
                }
                self.cx.emitter.store_scalar(&symbol, PRIMARY_REG, "assignment")
            }
            TokenKind::LParen => {
                self.advance();
                let mut argc: u32 = 0;
                if self.current.kind != TokenKind::RParen {
                    loop {
                        self.expression()?;
                        self.cx.emitter.emit_push_d("push argument")?;
                        argc += 1;
                        if self.current.kind == TokenKind::Comma {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                self.expect(&TokenKind::RParen, "after call arguments");
                if self.lookup_symbol(&name).is_none() {
                    self.report(Diagnostic::undeclared(&name, span));
                }
                self.cx.emitter.emit_call_function(&name, "call")?;
                self.cx.emitter.emit_stack_cleanup(argc * 2, "pop arguments")
            }
            _ => {
                let Some(symbol) = self.lookup_symbol(&name) else {
                    self.report(Diagnostic::undeclared(&name, span));
                    return Ok(());
                };
                self.cx
                    .emitter
                    .load_scalar(&symbol, PRIMARY_REG, &format!("load {name}"))
            }
        }
    }

    /// Locals shadow externs (§4.2: "a local can shadow an extern and
    /// lookups are deliberately scope-ordered by the caller"). Returns an
    /// owned copy since the caller needs to hold it across further calls
    /// that mutate `self.cx.emitter`.
    fn lookup_symbol(&self, name: &str) -> Option<Symbol> {
        self.cx
            .locals
            .lookup(name)
            .or_else(|| self.cx.externs.lookup(name))
            .cloned()
    }
}
