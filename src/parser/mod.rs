//! Recursive-descent parser with one-token lookahead, driving code
//! generation directly from its reductions (spec.md §4.3, §9).
//!
//! Every parse function begins with `self.current` already holding the
//! first token of its production and returns with `self.current` holding
//! the first unconsumed token — the discipline spec.md calls "the system's
//! only intermediate representation". There is no AST: control constructs
//! and expressions emit assembly as they're recognised.

mod constexpr;
mod decl;
mod expr;
mod stmt;


use crate::codegen::Reg;
use crate::context::CompilationContext;
use crate::error::{Diagnostic, IoError, Span};
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::Scanner;
use crate::symtab::Type;

/// Per-function mutable state, reset at every function entry (§4.3 frame
/// layout, §9 single register-variable budget).
pub(crate) struct FunctionState {
    pub return_type: Type,
    pub return_label: u32,
    pub next_auto_offset: i32,
    pub next_param_offset: i32,
    pub register_reserved: bool,
    pub name: String,
}

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Token,
    pub(crate) cx: CompilationContext,
    trace_tokens: bool,
    trace_syntax: bool,
    pub(crate) function: Option<FunctionState>,
    pub(crate) break_stack: Vec<u32>,
    pub(crate) continue_stack: Vec<u32>,
    pub(crate) default_seen_stack: Vec<bool>,
}

impl<'a> Parser<'a> {
    pub fn new(
        source: &'a str,
        cx: CompilationContext,
        trace_tokens: bool,
        trace_syntax: bool,
    ) -> Self {
        let mut scanner = Scanner::new(source);
        let mut cx = cx;
        let current = Self::scan_one(&mut scanner, &mut cx, trace_tokens);
        Self {
            scanner,
            current,
            cx,
            trace_tokens,
            trace_syntax,
            function: None,
            break_stack: Vec::new(),
            continue_stack: Vec::new(),
            default_seen_stack: Vec::new(),
        }
    }

    fn scan_one(scanner: &mut Scanner<'a>, cx: &mut CompilationContext, trace: bool) -> Token {
        let tok = scanner.next_token(&cx.keywords, &mut cx.diagnostics);
        if trace {
            println!("TOKEN: {:?} '{}' at {}", tok.kind, tok.lexeme, tok.span);
        }
        tok
    }

    /// Consume `self.current`, scan the next token into its place, and
    /// return the consumed token.
    fn advance(&mut self) -> Token {
        let next = Self::scan_one(&mut self.scanner, &mut self.cx, self.trace_tokens);
        std::mem::replace(&mut self.current, next)
    }

    fn trace(&self, msg: &str) {
        if self.trace_syntax {
            println!("SYNTAX: {msg}");
        }
    }

    fn report(&mut self, diag: Diagnostic) {
        self.cx.report(diag);
    }

    fn current_span(&self) -> Span {
        self.current.span
    }

    /// Consume `self.current` if it matches `kind`, reporting and leaving
    /// the lookahead untouched otherwise (§7: "parsing continues with the
    /// current lookahead").
    fn expect(&mut self, kind: &TokenKind, context: &str) -> bool {
        if &self.current.kind == kind {
            self.advance();
            true
        } else {
            let span = self.current_span();
            self.report(Diagnostic::syntactic(
                format!("expected {kind:?} {context}, found {:?}", self.current.kind),
                span,
            ));
            false
        }
    }

    fn expect_identifier(&mut self, context: &str) -> Option<String> {
        if let TokenKind::Identifier(name) = self.current.kind.clone() {
            self.advance();
            Some(name)
        } else {
            let span = self.current_span();
            self.report(Diagnostic::syntactic(
                format!("expected identifier {context}, found {:?}", self.current.kind),
                span,
            ));
            None
        }
    }

    /// Drive the whole translation unit: parse top-level declarations
    /// until end-of-input (grammar's `translation_unit` production).
    pub fn run(&mut self) -> Result<(), IoError> {
        while self.current.kind != TokenKind::Eof {
            if self.current.kind == TokenKind::Semi {
                self.advance();
                continue;
            }
            self.top_level_declaration()?;
        }
        Ok(())
    }

    /// Flush the emitter's trailer and hand back whatever diagnostics were
    /// collected during the run.
    pub fn close(self) -> Result<Vec<Diagnostic>, IoError> {
        self.cx.emitter.close()?;
        Ok(self.cx.diagnostics)
    }
}

/// Picks the widest-fitting register for a 16-bit expression result. The
/// compiler always evaluates expressions into `D`; wider loads (`X`/`Y`)
/// are only ever used as addressing helpers inside `codegen`, never chosen
/// here.
pub(crate) const PRIMARY_REG: Reg = Reg::D;
