use super::*;
use std::fs;
use tempfile::NamedTempFile;

fn scratch_path() -> (NamedTempFile, PathBuf) {
    let file = NamedTempFile::new().unwrap();
    let path = file.path().to_path_buf();
    (file, path)
}

#[test]
fn preamble_and_trailer_match_fixed_frame() {
    let (_guard, path) = scratch_path();
    let emitter = Emitter::open(&path).unwrap();
    emitter.close().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("        setdp 0\n        org   $0400\nappEntry jmp  _main\n"));
    assert!(text.trim_end().ends_with("end  appEntry"));
}

#[test]
fn emit_formats_instruction_line() {
    let (_guard, path) = scratch_path();
    let mut emitter = Emitter::open(&path).unwrap();
    emitter.emit("ldd", "#42", "load constant").unwrap();
    emitter.close().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("        ldd  #42                              ; load constant\n"));
}

#[test]
fn label_name_has_four_digit_form() {
    assert_eq!(label_name(7), "l0007");
    assert_eq!(label_name(1234), "l1234");
}

#[test]
fn mangled_name_gets_underscore_prefix() {
    assert_eq!(mangled_name("X"), "_X");
}

#[test]
fn extern_scalar_int_emits_fdb() {
    let sym = Symbol {
        storage_class: StorageClass::Extern,
        name: "X".into(),
        ty: Type::Int,
        p_level: 0,
        label: None,
        fp_offset: 0,
        read_only: false,
    };
    let (_guard, path) = scratch_path();
    let mut emitter = Emitter::open(&path).unwrap();
    emitter.emit_extern_scalar_init(&sym.name, sym.ty, 42, "int X = 42").unwrap();
    emitter.close().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("_X"));
    assert!(text.contains("fdb"));
    assert!(text.contains("42"));
}

#[test]
fn inc_on_word_scalar_uses_load_ea_store_triplet() {
    let sym = Symbol {
        storage_class: StorageClass::Extern,
        name: "i".into(),
        ty: Type::Int,
        p_level: 0,
        label: None,
        fp_offset: 0,
        read_only: false,
    };
    let (_guard, path) = scratch_path();
    let mut emitter = Emitter::open(&path).unwrap();
    emitter.emit_inc_scalar(&sym, -1).unwrap();
    emitter.close().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("ldx"));
    assert!(text.contains("leax"));
    assert!(text.contains("stx"));
}

#[test]
fn inc_on_byte_scalar_uses_single_instruction() {
    let sym = Symbol {
        storage_class: StorageClass::Extern,
        name: "c".into(),
        ty: Type::Char,
        p_level: 0,
        label: None,
        fp_offset: 0,
        read_only: false,
    };
    let (_guard, path) = scratch_path();
    let mut emitter = Emitter::open(&path).unwrap();
    emitter.emit_inc_scalar(&sym, 1).unwrap();
    emitter.close().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("inc"));
    assert!(!text.contains("ldx"));
}

#[test]
fn static_char_array_chunks_at_seven_bytes() {
    let sc = StringConstant {
        label: 1,
        lexeme: "\"ABCDEFGHI\"".into(),
        bytes: b"ABCDEFGHI\0".to_vec(),
    };
    let (_guard, path) = scratch_path();
    let mut emitter = Emitter::open(&path).unwrap();
    emitter.emit_static_char_array(&sc, "s").unwrap();
    emitter.close().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let fcb_lines: Vec<&str> = text.lines().filter(|l| l.contains("fcb")).collect();
    assert_eq!(fcb_lines.len(), 2);
}
