//! Symbol table: two flat, linearly-searched scopes — file-scope externs
//! and the active function's locals — plus the keyword map the scanner
//! consults.
//!
//! Grounded on `examples/original_source/symtab.c`: linear `Vec` scan,
//! first-match-wins insertion, `forget_locals` clearing the local table at
//! function end. The two tables are not merged into one keyed by scope,
//! because that's not how the original behaves: a local can shadow an
//! extern and lookups are deliberately scope-ordered by the caller, not by
//! the table itself.

#[cfg(test)]
mod tests;

use std::collections::HashMap;

pub const MAX_NAME_LEN: usize = 32;

/// Truncates `name` in place to its first [`MAX_NAME_LEN`] bytes (identifier
/// lexemes are ASCII, so byte and character boundaries coincide).
fn truncate_name(name: &mut String) {
    if name.len() > MAX_NAME_LEN {
        name.truncate(MAX_NAME_LEN);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Auto,
    Extern,
    Register,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Void,
}

impl Type {
    /// Size in bytes used for frame layout (§4.3) and storage directives.
    pub fn size(self) -> u32 {
        match self {
            Type::Char | Type::UChar => 1,
            Type::Short | Type::UShort | Type::Int | Type::UInt => 2,
            Type::Long | Type::ULong | Type::Float => 4,
            Type::Double => 8,
            Type::Void => 0,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Type::Char | Type::Short | Type::Int | Type::Long)
    }

    pub fn is_integral(self) -> bool {
        !matches!(self, Type::Float | Type::Double | Type::Void)
    }
}

/// A compiler-minted numeric label, or "none" for symbols that don't carry
/// static storage (auto/register/extern-without-static-init locals).
pub type Label = Option<u32>;

#[derive(Debug, Clone)]
pub struct Symbol {
    pub storage_class: StorageClass,
    pub name: String,
    pub ty: Type,
    pub p_level: u32,
    pub label: Label,
    pub fp_offset: i32,
    pub read_only: bool,
}

impl Symbol {
    pub fn is_pointer(&self) -> bool {
        self.p_level > 0
    }

    /// Size of a single value of this symbol, ignoring array extents:
    /// pointers are always 2 bytes regardless of pointee type (§4.3).
    pub fn value_size(&self) -> u32 {
        if self.is_pointer() {
            2
        } else {
            self.ty.size()
        }
    }
}

/// Insertion-ordered, linearly-searched symbol scope.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns `false` without modifying the table if `name` is already
    /// present — the caller (the parser) is responsible for reporting the
    /// redeclaration and discarding the second declaration's effect.
    ///
    /// Names are truncated to [`MAX_NAME_LEN`] significant characters
    /// before the lookup (§3), matching `symtab.c`'s `strncpy(...,
    /// MAXNAME)`: two identifiers differing only past that point collide
    /// as a redeclaration.
    pub fn add(&mut self, mut symbol: Symbol) -> bool {
        truncate_name(&mut symbol.name);
        if self.lookup(&symbol.name).is_some() {
            return false;
        }
        self.entries.push(symbol);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut truncated = name.to_string();
        truncate_name(&mut truncated);
        self.entries.iter().find(|s| s.name == truncated)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let mut truncated = name.to_string();
        truncate_name(&mut truncated);
        self.entries.iter_mut().find(|s| s.name == truncated)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-function static-string-literal buffer: filled while parsing a
/// function body, drained and emitted when the function's epilogue closes.
#[derive(Debug, Clone)]
pub struct StringConstant {
    pub label: u32,
    pub lexeme: String,
    pub bytes: Vec<u8>,
}

impl StringConstant {
    /// Length including the terminating zero byte the scanner appended.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Populated once at scanner startup with the fixed keyword set from §6.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    map: HashMap<&'static str, Keyword>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Break,
    Continue,
    Do,
    For,
    While,
    Return,
    If,
    Else,
    Goto,
    Case,
    Switch,
    Default,
    Sizeof,
    Auto,
    Register,
    Static,
    Extern,
    Const,
    Volatile,
    Typedef,
    Int,
    Float,
    Double,
    Char,
    Short,
    Long,
    Unsigned,
    Signed,
    Void,
    Struct,
    Union,
    Enum,
}

impl Keyword {
    /// Keywords that name a base type the parser can start a declaration
    /// with. `signed`/`unsigned`/`short`/`long` are type *modifiers*, not
    /// base types on their own (§4.3) — `installKeyword(text, kind,
    /// isType)`'s `isType` flag from spec.md §4.2. `struct`/`union`/`enum`
    /// are recognised keywords with no production behaviour in the core
    /// (§9 open questions): reserved but inactive, not base types here.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Keyword::Int | Keyword::Float | Keyword::Double | Keyword::Char | Keyword::Void
        )
    }

    /// `short`/`long`/`signed`/`unsigned` modify the base type that follows
    /// them; they never stand alone as a complete type specifier.
    pub fn is_type_modifier(self) -> bool {
        matches!(
            self,
            Keyword::Short | Keyword::Long | Keyword::Signed | Keyword::Unsigned
        )
    }
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("break", Keyword::Break),
    ("continue", Keyword::Continue),
    ("do", Keyword::Do),
    ("for", Keyword::For),
    ("while", Keyword::While),
    ("return", Keyword::Return),
    ("if", Keyword::If),
    ("else", Keyword::Else),
    ("goto", Keyword::Goto),
    ("case", Keyword::Case),
    ("switch", Keyword::Switch),
    ("default", Keyword::Default),
    ("sizeof", Keyword::Sizeof),
    ("auto", Keyword::Auto),
    ("register", Keyword::Register),
    ("static", Keyword::Static),
    ("extern", Keyword::Extern),
    ("const", Keyword::Const),
    ("volatile", Keyword::Volatile),
    ("typedef", Keyword::Typedef),
    ("int", Keyword::Int),
    ("float", Keyword::Float),
    ("double", Keyword::Double),
    ("char", Keyword::Char),
    ("short", Keyword::Short),
    ("long", Keyword::Long),
    ("unsigned", Keyword::Unsigned),
    ("signed", Keyword::Signed),
    ("void", Keyword::Void),
    ("struct", Keyword::Struct),
    ("union", Keyword::Union),
    ("enum", Keyword::Enum),
];

impl KeywordTable {
    pub fn new() -> Self {
        let mut map = HashMap::with_capacity(KEYWORDS.len());
        for &(text, kw) in KEYWORDS {
            map.insert(text, kw);
        }
        Self { map }
    }

    /// `installKeyword` from §4.2: here the table is fixed at construction
    /// (the language has no user macro layer), but the entry point is kept
    /// so a reimplementation wishing to extend the set has one seam.
    pub fn install(&mut self, text: &'static str, kw: Keyword) {
        self.map.insert(text, kw);
    }

    pub fn lookup(&self, text: &str) -> Option<Keyword> {
        self.map.get(text).copied()
    }
}
