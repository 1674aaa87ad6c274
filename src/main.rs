//! CLI front-end (spec.md §6): `sc6809c [-T] [-S] <source-path>...`.
//!
//! `-T` dumps every scanned token to standard output; `-S` dumps a
//! parse-event trace. Any other `-`-prefixed argument is rejected with a
//! usage line and a nonzero exit; positional arguments are source files,
//! compiled in order. Exit status is zero on normal completion even when
//! diagnostics were reported — they're informational, not fatal.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

fn usage(program: &str) {
    eprintln!("usage: {program} [-T] [-S] <source-path>...");
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "sc6809c".to_string());

    let mut trace_tokens = false;
    let mut trace_syntax = false;
    let mut sources: Vec<PathBuf> = Vec::new();

    for arg in args {
        match arg.as_str() {
            "-T" => trace_tokens = true,
            "-S" => trace_syntax = true,
            flag if flag.starts_with('-') => {
                usage(&program);
                return ExitCode::FAILURE;
            }
            path => sources.push(PathBuf::from(path)),
        }
    }

    if sources.is_empty() {
        usage(&program);
        return ExitCode::FAILURE;
    }

    for source in &sources {
        if let Err(e) = sc6809c::driver::compile_file(source, trace_tokens, trace_syntax) {
            eprintln!("{e}");
        }
    }

    ExitCode::SUCCESS
}
