use super::*;

fn sym(name: &str, storage_class: StorageClass) -> Symbol {
    Symbol {
        storage_class,
        name: name.to_string(),
        ty: Type::Int,
        p_level: 0,
        label: None,
        fp_offset: 0,
        read_only: false,
    }
}

#[test]
fn add_rejects_duplicate_name() {
    let mut table = SymbolTable::new();
    assert!(table.add(sym("x", StorageClass::Extern)));
    assert!(!table.add(sym("x", StorageClass::Extern)));
    assert_eq!(table.len(), 1);
}

#[test]
fn lookup_finds_inserted_symbol() {
    let mut table = SymbolTable::new();
    table.add(sym("count", StorageClass::Auto));
    let found = table.lookup("count").expect("present");
    assert_eq!(found.storage_class, StorageClass::Auto);
}

#[test]
fn clear_empties_table() {
    let mut table = SymbolTable::new();
    table.add(sym("tmp", StorageClass::Auto));
    table.clear();
    assert!(table.is_empty());
    assert!(table.lookup("tmp").is_none());
}

#[test]
fn pointer_value_size_is_always_two() {
    let mut s = sym("p", StorageClass::Auto);
    s.ty = Type::Double;
    s.p_level = 1;
    assert_eq!(s.value_size(), 2);
}

#[test]
fn scalar_value_size_follows_type() {
    let mut s = sym("d", StorageClass::Auto);
    s.ty = Type::Double;
    assert_eq!(s.value_size(), 8);
}

#[test]
fn names_collide_past_max_name_len() {
    // Two identifiers sharing their first 32 characters but differing
    // after that are the same symbol (§3: truncated to 32 significant
    // characters, mirroring symtab.c's strncpy(..., MAXNAME)).
    let long_a = format!("{}Apple", "a".repeat(MAX_NAME_LEN));
    let long_b = format!("{}Banana", "a".repeat(MAX_NAME_LEN));
    let mut table = SymbolTable::new();
    assert!(table.add(sym(&long_a, StorageClass::Extern)));
    assert!(!table.add(sym(&long_b, StorageClass::Extern)));
    assert_eq!(table.len(), 1);
    assert!(table.lookup(&long_b).is_some());
}

#[test]
fn keyword_table_resolves_fixed_set() {
    let kw = KeywordTable::new();
    assert_eq!(kw.lookup("while"), Some(Keyword::While));
    assert_eq!(kw.lookup("int"), Some(Keyword::Int));
    assert_eq!(kw.lookup("not_a_keyword"), None);
}

#[test]
fn modifier_keywords_are_not_base_types() {
    assert!(!Keyword::Unsigned.is_type());
    assert!(!Keyword::Short.is_type());
    assert!(Keyword::Int.is_type());
}
