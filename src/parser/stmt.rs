//! Statements and their control-flow label shapes (spec.md §4.3).
//!
//! Every construct here allocates its labels from the shared counter up
//! front, then emits in the exact canonical order the specification lays
//! out — this is the part of the system that earns "single-pass": no
//! statement ever revisits code it already wrote.

use crate::error::{Diagnostic, IoError};
use crate::lexer::token::TokenKind;
use crate::symtab::Keyword;

use super::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn statement(&mut self) -> Result<(), IoError> {
        match self.current.kind.clone() {
            TokenKind::LBrace => self.block(),
            TokenKind::Keyword(Keyword::Return) => self.return_statement(),
            TokenKind::Keyword(Keyword::If) => self.if_statement(),
            TokenKind::Keyword(Keyword::While) => self.while_statement(),
            TokenKind::Keyword(Keyword::Do) => self.do_statement(),
            TokenKind::Keyword(Keyword::For) => self.for_statement(),
            TokenKind::Keyword(Keyword::Switch) => self.switch_statement(),
            TokenKind::Keyword(Keyword::Break) => self.break_statement(),
            TokenKind::Keyword(Keyword::Continue) => self.continue_statement(),
            TokenKind::Keyword(Keyword::Goto) => self.goto_statement(),
            TokenKind::Semi => {
                self.advance();
                Ok(())
            }
            _ => {
                self.expression()?;
                self.expect(&TokenKind::Semi, "after expression statement");
                Ok(())
            }
        }
    }

    /// A nested compound statement. Unlike a function body, it carries no
    /// `local_decl` section of its own: declarations are accepted only at
    /// the top of a function body, where the frame size is still being
    /// accumulated before the prologue is emitted (§4.3, §9 — a
    /// single-pass emitter can't widen a frame after its prologue line has
    /// already been written).
    pub(crate) fn block(&mut self) -> Result<(), IoError> {
        self.expect(&TokenKind::LBrace, "to start block");
        while self.current.kind != TokenKind::RBrace && self.current.kind != TokenKind::Eof {
            self.statement()?;
        }
        self.expect(&TokenKind::RBrace, "to close block");
        Ok(())
    }

    fn return_statement(&mut self) -> Result<(), IoError> {
        let span = self.current_span();
        self.advance(); // 'return'
        let has_expr = !matches!(self.current.kind, TokenKind::Semi);
        let return_type = self.function.as_ref().map(|f| f.return_type);

        if has_expr {
            self.expression()?;
            if return_type == Some(crate::symtab::Type::Void) {
                self.report(Diagnostic::semantic(
                    "'return' with a value in a void function",
                    span,
                ));
            }
        } else if matches!(return_type, Some(t) if t != crate::symtab::Type::Void) {
            self.report(Diagnostic::semantic(
                "'return' without a value in a non-void function",
                span,
            ));
        }

        self.expect(&TokenKind::Semi, "after 'return'");
        match self.function.as_ref().map(|f| f.return_label) {
            Some(label) => self.cx.emitter.emit_jump(label, "return"),
            None => Ok(()),
        }
    }

    fn if_statement(&mut self) -> Result<(), IoError> {
        self.advance(); // 'if'
        self.expect(&TokenKind::LParen, "after 'if'");
        self.expression()?;
        self.expect(&TokenKind::RParen, "after if condition");
        self.cx.emitter.emit_compare_int_constant(0, "test if condition")?;

        let else_label = self.cx.allocate_label("if else/end");
        self.cx
            .emitter
            .emit_branch_if_equal(else_label, "branch to else/end if condition is false")?;
        self.statement()?;

        if self.current.kind == TokenKind::Keyword(Keyword::Else) {
            let endif_label = self.cx.allocate_label("if endif");
            self.cx.emitter.emit_jump(endif_label, "skip else branch")?;
            self.cx.emitter.emit_label(else_label)?;
            self.advance(); // 'else'
            self.statement()?;
            self.cx.emitter.emit_label(endif_label)?;
        } else {
            self.cx.emitter.emit_label(else_label)?;
        }
        Ok(())
    }

    fn while_statement(&mut self) -> Result<(), IoError> {
        self.advance(); // 'while'
        let continue_label = self.cx.allocate_label("while continue/top");
        let bottom_label = self.cx.allocate_label("while bottom");

        self.cx.emitter.emit_label(continue_label)?;
        self.expect(&TokenKind::LParen, "after 'while'");
        self.expression()?;
        self.expect(&TokenKind::RParen, "after while condition");
        self.cx.emitter.emit_compare_int_constant(0, "test while condition")?;
        self.cx
            .emitter
            .emit_branch_if_equal(bottom_label, "exit loop if condition is false")?;

        self.break_stack.push(bottom_label);
        self.continue_stack.push(continue_label);
        self.statement()?;
        self.break_stack.pop();
        self.continue_stack.pop();

        self.cx.emitter.emit_jump(continue_label, "repeat loop test")?;
        self.cx.emitter.emit_label(bottom_label)?;
        Ok(())
    }

    fn do_statement(&mut self) -> Result<(), IoError> {
        self.advance(); // 'do'
        let top_label = self.cx.allocate_label("do top");
        let continue_label = self.cx.allocate_label("do continue");
        let bottom_label = self.cx.allocate_label("do bottom");

        self.cx.emitter.emit_label(top_label)?;
        self.break_stack.push(bottom_label);
        self.continue_stack.push(continue_label);
        self.statement()?;
        self.break_stack.pop();
        self.continue_stack.pop();

        self.cx.emitter.emit_label(continue_label)?;
        self.expect(&TokenKind::Keyword(Keyword::While), "after do body");
        self.expect(&TokenKind::LParen, "after 'while' in do-while");
        self.expression()?;
        self.expect(&TokenKind::RParen, "after do-while condition");
        self.expect(&TokenKind::Semi, "after do-while");

        self.cx.emitter.emit_compare_int_constant(0, "test do-while condition")?;
        self.cx
            .emitter
            .emit_branch_not_equal(top_label, "repeat loop if condition is true")?;
        self.cx.emitter.emit_label(bottom_label)?;
        Ok(())
    }

    fn for_statement(&mut self) -> Result<(), IoError> {
        self.advance(); // 'for'
        self.expect(&TokenKind::LParen, "after 'for'");

        let test_label = self.cx.allocate_label("for test");
        let continue_label = self.cx.allocate_label("for continue");
        let stmt_label = self.cx.allocate_label("for statement");
        let bottom_label = self.cx.allocate_label("for bottom");

        self.for_clause()?;
        self.expect(&TokenKind::Semi, "after for init");

        self.cx.emitter.emit_label(test_label)?;
        self.for_clause()?;
        self.expect(&TokenKind::Semi, "after for condition");
        self.cx.emitter.emit_compare_int_constant(0, "test for condition")?;
        self.cx
            .emitter
            .emit_branch_if_equal(bottom_label, "exit loop if condition is false")?;
        self.cx.emitter.emit_jump(stmt_label, "skip increment on first pass")?;

        self.cx.emitter.emit_label(continue_label)?;
        self.for_clause()?;
        self.expect(&TokenKind::RParen, "after for clauses");
        self.cx.emitter.emit_jump(test_label, "retest loop condition")?;

        self.cx.emitter.emit_label(stmt_label)?;
        self.break_stack.push(bottom_label);
        self.continue_stack.push(continue_label);
        self.statement()?;
        self.break_stack.pop();
        self.continue_stack.pop();
        self.cx.emitter.emit_jump(continue_label, "run increment")?;
        self.cx.emitter.emit_label(bottom_label)?;
        Ok(())
    }

    /// A `for` clause position; an immediately following `;`/`)` is an
    /// empty clause (`for(;;)`), tolerated even though the formal grammar
    /// only spells out the non-empty form.
    fn for_clause(&mut self) -> Result<(), IoError> {
        if matches!(self.current.kind, TokenKind::Semi | TokenKind::RParen) {
            return Ok(());
        }
        self.expression()
    }

    fn switch_statement(&mut self) -> Result<(), IoError> {
        self.advance(); // 'switch'
        self.expect(&TokenKind::LParen, "after 'switch'");
        self.expression()?;
        self.expect(&TokenKind::RParen, "after switch subject");

        let table_label = self.cx.allocate_label("switch table");
        let bottom_label = self.cx.allocate_label("switch bottom");
        self.cx.emitter.emit_jump(table_label, "dispatch through case table")?;

        self.expect(&TokenKind::LBrace, "to start switch body");
        self.break_stack.push(bottom_label);
        self.default_seen_stack.push(false);

        let mut cases: Vec<(i64, u32)> = Vec::new();
        let mut default_label: Option<u32> = None;

        while self.current.kind != TokenKind::RBrace && self.current.kind != TokenKind::Eof {
            match self.current.kind.clone() {
                TokenKind::Keyword(Keyword::Case) => {
                    self.advance();
                    let value = self.const_int_expr();
                    self.expect(&TokenKind::Colon, "after case label");
                    let case_label = self.cx.allocate_label("switch case");
                    self.cx.emitter.emit_label(case_label)?;
                    cases.push((value, case_label));
                }
                TokenKind::Keyword(Keyword::Default) => {
                    let span = self.current_span();
                    self.advance();
                    self.expect(&TokenKind::Colon, "after 'default'");
                    if *self.default_seen_stack.last().unwrap() {
                        self.report(Diagnostic::semantic(
                            "multiple 'default' labels in one switch",
                            span,
                        ));
                    } else {
                        let label = self.cx.allocate_label("switch default");
                        self.cx.emitter.emit_label(label)?;
                        default_label = Some(label);
                        *self.default_seen_stack.last_mut().unwrap() = true;
                    }
                }
                _ => self.statement()?,
            }
        }
        self.expect(&TokenKind::RBrace, "to close switch body");
        self.cx.emitter.emit_jump(bottom_label, "fall through past switch body")?;

        self.cx.emitter.emit_label(table_label)?;
        for (value, label) in &cases {
            self.cx.emitter.emit_compare_int_constant(*value, "case test")?;
            self.cx.emitter.emit_branch_if_equal(*label, "matched case")?;
        }
        if let Some(label) = default_label {
            self.cx.emitter.emit_jump(label, "default case")?;
        }
        self.cx.emitter.emit_label(bottom_label)?;

        self.break_stack.pop();
        self.default_seen_stack.pop();
        Ok(())
    }

    fn break_statement(&mut self) -> Result<(), IoError> {
        let span = self.current_span();
        self.advance(); // 'break'
        self.expect(&TokenKind::Semi, "after 'break'");
        match self.break_stack.last().copied() {
            Some(label) => self.cx.emitter.emit_jump(label, "break"),
            None => {
                self.report(Diagnostic::semantic(
                    "'break' outside any enclosing loop or switch",
                    span,
                ));
                Ok(())
            }
        }
    }

    fn continue_statement(&mut self) -> Result<(), IoError> {
        let span = self.current_span();
        self.advance(); // 'continue'
        self.expect(&TokenKind::Semi, "after 'continue'");
        match self.continue_stack.last().copied() {
            Some(label) => self.cx.emitter.emit_jump(label, "continue"),
            None => {
                self.report(Diagnostic::semantic(
                    "'continue' outside any enclosing loop",
                    span,
                ));
                Ok(())
            }
        }
    }

    /// `goto identifier` is parsed — the identifier is consumed and the
    /// statement otherwise has no effect — but no target code is ever
    /// emitted for it (§4.3, §9: a documented limitation, not a bug to fix
    /// here).
    fn goto_statement(&mut self) -> Result<(), IoError> {
        self.advance(); // 'goto'
        let span = self.current_span();
        let name = self.expect_identifier("after 'goto'");
        self.expect(&TokenKind::Semi, "after goto target");
        if let Some(name) = name {
            self.report(Diagnostic::incomplete(
                format!("'goto {name}' parses but emits no target code"),
                span,
            ));
        }
        Ok(())
    }
}
