//! Full-pipeline tests: scan a fixture program from `tests/test_programs/`,
//! run it through [`sc6809c::driver::compile_file`], and assert on the
//! emitted assembly text. Mirrors the teacher's `tests/integration_tests.rs`
//! pattern of reading fixed test programs and checking the pipeline's
//! observable output rather than internal state.

use std::fs;
use std::path::PathBuf;

use tempfile::Builder;

/// Copies a fixture into a fresh temp `.c` file (so each test gets its own
/// `.asm` sibling instead of clobbering a shared one), compiles it, and
/// returns the emitted assembly text.
fn compile_fixture(name: &str) -> String {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/test_programs")
        .join(name);
    let source = fs::read_to_string(&fixture).expect("fixture readable");

    let temp = Builder::new().suffix(".c").tempfile().unwrap();
    fs::write(temp.path(), &source).unwrap();

    sc6809c::driver::compile_file(temp.path(), false, false).expect("compilation succeeds");

    let asm_path = temp.path().with_extension("asm");
    let text = fs::read_to_string(&asm_path).expect("assembly output written");
    let _ = fs::remove_file(&asm_path);
    text
}

#[test]
fn nested_for_loops_over_externs_balance_prologue_and_epilogue() {
    let text = compile_fixture("sugar_and_tea.c");
    assert_eq!(text.matches("pshs").count(), text.matches("puls").count());
    // Two 'for' loops, each comparing its counter to zero.
    assert_eq!(text.matches("cmpd #0").count(), 2);
    assert!(text.contains("_SugarAndTeaAndRum"));
    assert!(text.contains("jsr  _vduchar"));
    assert!(text.contains("jsr  _newline"));
}

#[test]
fn register_loop_counter_reserves_one_slot_and_static_gets_a_label() {
    let text = compile_fixture("register_and_static.c");
    // The prologue saves the extra reserved register alongside the frame
    // pointer (§4.4 emit_function_entry, save_register = true).
    assert!(text.contains("pshs u,x"));
    assert!(text.contains("puls u,x"));
    // The static local gets a zero-initialised l#### cell distinct from
    // the frame-relative auto/register addressing used elsewhere. Label 0
    // is minted first for the function's own return label, so the static's
    // label is l0001.
    assert!(text.contains("l0001"));
    assert!(text.contains("static int sugar"));
    // 'tea' is the reserved register variable: every access (assignment,
    // the loop test, and 'tea--') transfers to/from X rather than a frame
    // slot, so the decrement in 'for (tea = 40; tea; tea--)' actually
    // touches the same storage the assignment and test read.
    assert!(text.contains("tfr  d,x"));
    assert!(text.contains("tfr  x,d"));
    assert!(text.contains("leax -1,x"));
}

#[test]
fn static_scalar_switch_dispatch_builds_a_compare_chain() {
    let text = compile_fixture("cargo_switch.c");
    assert_eq!(text.matches("cmpd").count(), 3);
    assert!(text.contains("#0"));
    assert!(text.contains("#1"));
    assert!(text.contains("#2"));
    // case 2 falls through to the switch's own end with no 'default:'.
    assert!(!text.contains("default case"));
}

#[test]
fn break_and_continue_target_their_nearest_enclosing_construct() {
    let text = compile_fixture("control_flow.c");
    // One 'for', one 'do-while': each contributes its own bottom label
    // that the body's break/continue jump to, plus the do-while's own
    // branch-not-equal back edge.
    assert!(text.contains("lbne"));
    assert!(text.contains("jmp"));
    assert_eq!(text.matches("pshs u").count(), 1);
}

#[test]
fn diagnostics_do_not_abort_the_rest_of_the_file() {
    let temp = Builder::new().suffix(".c").tempfile().unwrap();
    fs::write(temp.path(), "int x; void f(void) { break; } int y;\n").unwrap();
    sc6809c::driver::compile_file(temp.path(), false, false).expect("I/O still succeeds");
    let asm_path = temp.path().with_extension("asm");
    let text = fs::read_to_string(&asm_path).unwrap();
    let _ = fs::remove_file(&asm_path);
    assert!(text.contains("_x"));
    assert!(text.contains("_y"));
    assert!(text.contains("_f"));
}
