//! `CompilationContext` — the single mutable-state bundle threaded through
//! the parser (spec.md §9 design note: "should be consolidated into a
//! single compilation context value... not kept as global singletons").
//!
//! Owns both symbol tables, the emitter, the process-wide label counter,
//! the per-function string-constant buffer, and the diagnostics sink.

use std::path::Path;

use crate::codegen::Emitter;
use crate::error::{Diagnostic, IoError};
use crate::symtab::{KeywordTable, StringConstant, SymbolTable};

pub struct CompilationContext {
    pub externs: SymbolTable,
    pub locals: SymbolTable,
    pub keywords: KeywordTable,
    pub emitter: Emitter,
    pub diagnostics: Vec<Diagnostic>,
    pub strings: Vec<StringConstant>,
    next_label: u32,
}

impl CompilationContext {
    pub fn new(output_path: &Path) -> Result<Self, IoError> {
        Ok(Self {
            externs: SymbolTable::new(),
            locals: SymbolTable::new(),
            keywords: KeywordTable::new(),
            emitter: Emitter::open(output_path)?,
            diagnostics: Vec::new(),
            strings: Vec::new(),
            next_label: 0,
        })
    }

    /// Mint the next `l####` label. `purpose` exists only for call-site
    /// readability/logging — the counter doesn't branch on it (§3
    /// "NextLabel counter").
    pub fn allocate_label(&mut self, purpose: &str) -> u32 {
        let label = self.next_label;
        self.next_label += 1;
        log::trace!("allocated label l{label:04} for {purpose}");
        label
    }

    /// Clears the local symbol table and the per-function string buffer.
    /// Called once at the end of every function body; the label counter
    /// is deliberately untouched — it runs for the whole compilation.
    pub fn forget_function_state(&mut self) {
        self.locals.clear();
        self.strings.clear();
    }

    pub fn report(&mut self, diag: Diagnostic) {
        log::debug!("{diag}");
        self.diagnostics.push(diag);
    }
}
