//! `sc6809c`: a single-pass compiler for a small C-family subset, emitting
//! textual 6809 assembly.
//!
//! The pipeline is scanner → symbol table → parser (driving code
//! generation directly from its reductions, with no separate IR) → code
//! emitter. [`driver::compile_file`] wires the four together for one
//! source file; [`context::CompilationContext`] is the mutable state they
//! share.

pub mod codegen;
pub mod context;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod symtab;
