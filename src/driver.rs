//! Orchestrates one compilation: open source, derive the output path, run
//! the parser to end-of-input, close the emitter, print diagnostics.
//!
//! Out of scope for the core (spec.md §1): this module, and `main`'s CLI
//! handling, are the "external collaborators" the specification explicitly
//! excludes from the front-end proper.

use std::fs;
use std::path::{Path, PathBuf};

use crate::context::CompilationContext;
use crate::error::IoError;
use crate::parser::Parser;

/// `sourcePath` with its final `.` suffix replaced by `.asm` (§3's
/// "Assembler sink" — opened on a path derived from the source path).
fn output_path_for(source: &Path) -> PathBuf {
    match source.to_str().and_then(|s| s.rfind('.')) {
        Some(dot) => PathBuf::from(format!("{}.asm", &source.to_str().unwrap()[..dot])),
        None => source.with_extension("asm"),
    }
}

/// Compile one source file, printing any reported diagnostics to standard
/// error. I/O failures (source or output) propagate to the caller, which
/// skips the file and moves on to the next one (§6).
pub fn compile_file(source_path: &Path, trace_tokens: bool, trace_syntax: bool) -> Result<(), IoError> {
    log::info!("compiling {}", source_path.display());

    let source = fs::read_to_string(source_path).map_err(|e| IoError::OpenSource {
        path: source_path.to_path_buf(),
        source: e,
    })?;

    let output_path = output_path_for(source_path);
    let cx = CompilationContext::new(&output_path)?;
    let mut parser = Parser::new(&source, cx, trace_tokens, trace_syntax);
    parser.run()?;
    let diagnostics = parser.close()?;

    for diag in &diagnostics {
        eprintln!("{diag}");
    }
    log::info!(
        "wrote {} with {} diagnostic(s)",
        output_path.display(),
        diagnostics.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_replaces_final_suffix() {
        assert_eq!(output_path_for(Path::new("prog.c")), PathBuf::from("prog.asm"));
        assert_eq!(output_path_for(Path::new("a.b.c")), PathBuf::from("a.b.asm"));
    }

    #[test]
    fn output_path_appends_suffix_when_none_present() {
        assert_eq!(output_path_for(Path::new("prog")), PathBuf::from("prog.asm"));
    }

    #[test]
    fn compile_file_reports_missing_source() {
        let result = compile_file(Path::new("/nonexistent/path/prog.c"), false, false);
        assert!(matches!(result, Err(IoError::OpenSource { .. })));
    }
}
