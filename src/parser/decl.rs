//! Declarations: file-scope decl_tail forms, function prototypes/definitions,
//! parameter lists, and function-local declarations (spec.md §4.3).

use crate::error::{Diagnostic, IoError, Span};
use crate::lexer::token::TokenKind;
use crate::symtab::{Keyword, StorageClass, Symbol, Type};

use super::{FunctionState, Parser};

/// A parameter as collected during `param_list`, before it's turned into a
/// `Symbol` with a frame offset (offsets aren't known until the whole list
/// and the function's local declarations have been seen).
pub(crate) struct ParsedParam {
    pub ty: Type,
    pub p_level: u32,
    pub name: String,
    pub read_only: bool,
}

/// Size a value occupies in a stack frame, rounded for alignment (§4.3):
/// distinct from `Type::size()`, which is the storage-directive byte count.
fn frame_size(ty: Type, p_level: u32) -> u32 {
    if p_level > 0 {
        return 2;
    }
    match ty {
        Type::Char | Type::UChar => 2,
        Type::Short | Type::UShort | Type::Int | Type::UInt => 2,
        Type::Long | Type::ULong | Type::Float => 4,
        Type::Double => 8,
        Type::Void => 0,
    }
}

/// The `Type` to hand to a storage directive: pointers are always 2 bytes
/// regardless of what they point to (§3's "pLevel > 0 implies the symbol's
/// value type is pointer-sized regardless of type"), so a `char *`/`float
/// **` extern still gets a 2-byte `fdb` cell, not a 1-byte `fcb` or 4-byte
/// `fqb` sized for its pointee.
fn storage_type(ty: Type, p_level: u32) -> Type {
    if p_level > 0 {
        Type::UShort
    } else {
        ty
    }
}

fn type_name(ty: Type) -> &'static str {
    match ty {
        Type::Char => "char",
        Type::UChar => "unsigned char",
        Type::Short => "short",
        Type::UShort => "unsigned short",
        Type::Int => "int",
        Type::UInt => "unsigned int",
        Type::Long => "long",
        Type::ULong => "unsigned long",
        Type::Float => "float",
        Type::Double => "double",
        Type::Void => "void",
    }
}

impl<'a> Parser<'a> {
    /// `declaration := ';' | type {'*'} identifier decl_tail` (§4.3).
    pub(crate) fn top_level_declaration(&mut self) -> Result<(), IoError> {
        let Some(ty) = self.parse_base_type() else {
            let span = self.current_span();
            self.report(Diagnostic::syntactic(
                format!("expected a declaration, found {:?}", self.current.kind),
                span,
            ));
            self.advance();
            return Ok(());
        };
        let p_level = self.parse_pointer_stars();
        let span = self.current_span();
        let Some(name) = self.expect_identifier("in declaration") else {
            return Ok(());
        };

        match self.current.kind.clone() {
            TokenKind::LParen => self.function_declaration(ty, p_level, name, span),
            TokenKind::LBracket => self.array_declaration(ty, p_level, name, span),
            TokenKind::Assign => self.scalar_declaration_with_init(ty, p_level, name, span),
            TokenKind::Semi => {
                self.advance();
                self.declare_extern_scalar(ty, p_level, &name, span, None)
            }
            _ => {
                self.report(Diagnostic::syntactic(
                    format!("expected declaration tail, found {:?}", self.current.kind),
                    span,
                ));
                self.advance();
                Ok(())
            }
        }
    }

    fn declare_extern_scalar(
        &mut self,
        ty: Type,
        p_level: u32,
        name: &str,
        span: Span,
        init: Option<i64>,
    ) -> Result<(), IoError> {
        let symbol = Symbol {
            storage_class: StorageClass::Extern,
            name: name.to_string(),
            ty,
            p_level,
            label: None,
            fp_offset: 0,
            read_only: false,
        };
        if !self.cx.externs.add(symbol) {
            self.report(Diagnostic::redeclaration(name, span));
        }
        let value = init.unwrap_or(0);
        let comment = format!("{} {} = {}", type_name(ty), name, value);
        self.cx
            .emitter
            .emit_extern_scalar_init(name, storage_type(ty, p_level), value, &comment)
    }

    fn scalar_declaration_with_init(
        &mut self,
        ty: Type,
        p_level: u32,
        name: String,
        span: Span,
    ) -> Result<(), IoError> {
        self.advance(); // '='
        if p_level == 0 && matches!(ty, Type::Float | Type::Double) {
            let value = match self.current.kind.clone() {
                TokenKind::FloatLiteral(v) => {
                    self.advance();
                    v
                }
                TokenKind::IntLiteral(v) => {
                    self.advance();
                    v as f64
                }
                _ => {
                    let s = self.current_span();
                    self.report(Diagnostic::syntactic(
                        format!("expected a floating constant, found {:?}", self.current.kind),
                        s,
                    ));
                    0.0
                }
            };
            self.expect(&TokenKind::Semi, "after declaration");
            let symbol = Symbol {
                storage_class: StorageClass::Extern,
                name: name.clone(),
                ty,
                p_level,
                label: None,
                fp_offset: 0,
                read_only: false,
            };
            if !self.cx.externs.add(symbol) {
                self.report(Diagnostic::redeclaration(&name, span));
            }
            let comment = format!("{} {} = {}", type_name(ty), name, value);
            if ty == Type::Float {
                self.cx.emitter.emit_extern_float(&name, value as f32, &comment)
            } else {
                self.cx.emitter.emit_extern_double(&name, value, &comment)
            }
        } else {
            let value = self.const_int_expr();
            self.expect(&TokenKind::Semi, "after declaration");
            self.declare_extern_scalar(ty, p_level, &name, span, Some(value))
        }
    }

    fn array_declaration(
        &mut self,
        ty: Type,
        p_level: u32,
        name: String,
        span: Span,
    ) -> Result<(), IoError> {
        self.advance(); // '['
        let count = self.const_int_expr();
        self.expect(&TokenKind::RBracket, "after array size");
        self.expect(&TokenKind::Semi, "after array declaration");
        let symbol = Symbol {
            storage_class: StorageClass::Extern,
            name: name.clone(),
            ty,
            p_level,
            label: None,
            fp_offset: 0,
            read_only: false,
        };
        if !self.cx.externs.add(symbol) {
            self.report(Diagnostic::redeclaration(&name, span));
        }
        let comment = format!("{} {}[{}]", type_name(ty), name, count);
        self.cx
            .emitter
            .emit_extern_array(&name, storage_type(ty, p_level), count.max(0) as u32, &comment)
    }

    fn function_declaration(
        &mut self,
        ty: Type,
        p_level: u32,
        name: String,
        span: Span,
    ) -> Result<(), IoError> {
        self.advance(); // '('
        let params = self.parse_param_list()?;
        self.expect(&TokenKind::RParen, "after parameter list");

        let symbol = Symbol {
            storage_class: StorageClass::Extern,
            name: name.clone(),
            ty,
            p_level,
            label: None,
            fp_offset: 0,
            read_only: true,
        };
        // A prototype followed by its own definition shares a name on
        // purpose; the symbol table has no separate "has body" bit, so
        // this path never reports a redeclaration for functions.
        self.cx.externs.add(symbol);

        match self.current.kind.clone() {
            TokenKind::Semi => {
                self.advance();
                Ok(())
            }
            TokenKind::LBrace => self.function_definition(ty, &name, params),
            _ => {
                self.report(Diagnostic::syntactic(
                    format!("expected ';' or function body, found {:?}", self.current.kind),
                    span,
                ));
                Ok(())
            }
        }
    }

    fn function_definition(
        &mut self,
        ty: Type,
        name: &str,
        params: Vec<ParsedParam>,
    ) -> Result<(), IoError> {
        self.advance(); // '{'

        let mut next_param_offset: i32 = 4;
        for p in &params {
            let fp_offset = next_param_offset;
            next_param_offset += frame_size(p.ty, p.p_level) as i32;
            let span = self.current_span();
            let symbol = Symbol {
                storage_class: StorageClass::Auto,
                name: p.name.clone(),
                ty: p.ty,
                p_level: p.p_level,
                label: None,
                fp_offset,
                read_only: p.read_only,
            };
            if !self.cx.locals.add(symbol) {
                self.report(Diagnostic::redeclaration(&p.name, span));
            }
        }

        self.function = Some(FunctionState {
            return_type: ty,
            return_label: self.cx.allocate_label("function return"),
            next_auto_offset: 0,
            next_param_offset,
            register_reserved: false,
            name: name.to_string(),
        });
        self.trace(&format!("entering function {name}"));

        while self.try_local_decl()? {}

        let auto_bytes = self
            .function
            .as_ref()
            .map(|f| (-f.next_auto_offset) as u32)
            .unwrap_or(0);
        let register_reserved = self.function.as_ref().map(|f| f.register_reserved).unwrap_or(false);
        self.cx.emitter.emit_function_entry(name, auto_bytes, register_reserved)?;

        while self.current.kind != TokenKind::RBrace && self.current.kind != TokenKind::Eof {
            self.statement()?;
        }
        self.expect(&TokenKind::RBrace, "to close function body");

        let return_label = self.function.as_ref().map(|f| f.return_label).unwrap_or(0);
        self.cx.emitter.emit_function_exit(return_label, register_reserved)?;

        let strings = std::mem::take(&mut self.cx.strings);
        for sc in &strings {
            self.cx.emitter.emit_static_char_array(sc, name)?;
        }

        self.cx.forget_function_state();
        self.function = None;
        Ok(())
    }

    pub(crate) fn parse_param_list(&mut self) -> Result<Vec<ParsedParam>, IoError> {
        let mut params = Vec::new();
        if self.current.kind == TokenKind::Keyword(Keyword::Void) {
            self.advance();
            return Ok(params);
        }
        if self.current.kind == TokenKind::RParen {
            return Ok(params);
        }
        loop {
            let read_only = if self.current.kind == TokenKind::Keyword(Keyword::Const) {
                self.advance();
                true
            } else {
                false
            };
            let span = self.current_span();
            let Some(ty) = self.parse_base_type() else {
                self.report(Diagnostic::syntactic(
                    format!("expected parameter type, found {:?}", self.current.kind),
                    span,
                ));
                break;
            };
            let p_level = self.parse_pointer_stars();
            let Some(name) = self.expect_identifier("in parameter list") else {
                break;
            };
            params.push(ParsedParam { ty, p_level, name, read_only });
            if self.current.kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            break;
        }
        Ok(params)
    }

    pub(crate) fn parse_pointer_stars(&mut self) -> u32 {
        let mut n = 0;
        while self.current.kind == TokenKind::Star {
            self.advance();
            n += 1;
        }
        n
    }

    /// Consumes an optional run of `signed`/`unsigned`/`short`/`long`
    /// modifiers followed by a base type keyword, folding the pair into a
    /// single `Type` variant (§4.3). `struct`/`union`/`enum` are accepted
    /// syntactically but produce no structural type: reserved but inactive
    /// (§9 open questions), reported as an incomplete feature and treated
    /// as `int`.
    pub(crate) fn parse_base_type(&mut self) -> Option<Type> {
        let mut unsigned = false;
        let mut short = false;
        let mut long = false;
        let mut saw_modifier = false;
        loop {
            match self.current.kind.clone() {
                TokenKind::Keyword(Keyword::Unsigned) => {
                    unsigned = true;
                    saw_modifier = true;
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Signed) => {
                    saw_modifier = true;
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Short) => {
                    short = true;
                    saw_modifier = true;
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Long) => {
                    long = true;
                    saw_modifier = true;
                    self.advance();
                }
                _ => break,
            }
        }

        let base = match self.current.kind.clone() {
            TokenKind::Keyword(Keyword::Int) => {
                self.advance();
                Some(Type::Int)
            }
            TokenKind::Keyword(Keyword::Char) => {
                self.advance();
                Some(Type::Char)
            }
            TokenKind::Keyword(Keyword::Float) => {
                self.advance();
                Some(Type::Float)
            }
            TokenKind::Keyword(Keyword::Double) => {
                self.advance();
                Some(Type::Double)
            }
            TokenKind::Keyword(Keyword::Void) => {
                self.advance();
                Some(Type::Void)
            }
            TokenKind::Keyword(k) if matches!(k, Keyword::Struct | Keyword::Union | Keyword::Enum) => {
                let span = self.current_span();
                self.advance();
                if self.current.kind.is_identifier() {
                    self.advance();
                }
                self.report(Diagnostic::incomplete(
                    "struct/union/enum types are reserved but inactive",
                    span,
                ));
                Some(Type::Int)
            }
            _ if saw_modifier => Some(Type::Int),
            _ => None,
        };

        base.map(|b| match b {
            Type::Int if short => {
                if unsigned {
                    Type::UShort
                } else {
                    Type::Short
                }
            }
            Type::Int if long => {
                if unsigned {
                    Type::ULong
                } else {
                    Type::Long
                }
            }
            Type::Int => {
                if unsigned {
                    Type::UInt
                } else {
                    Type::Int
                }
            }
            Type::Char if unsigned => Type::UChar,
            other => other,
        })
    }

    fn looks_like_local_decl(&self) -> bool {
        match &self.current.kind {
            TokenKind::Keyword(k) => {
                matches!(k, Keyword::Static | Keyword::Auto | Keyword::Register | Keyword::Const)
                    || k.is_type()
                    || k.is_type_modifier()
                    || matches!(k, Keyword::Struct | Keyword::Union | Keyword::Enum)
            }
            _ => false,
        }
    }

    /// `local_decl := [storage_class | 'const'] type {'*'} identifier ';'`
    /// (§4.3). Returns `false` (consuming nothing) once the lookahead stops
    /// looking like a declaration, which is how the caller knows the
    /// declaration section of a block has ended.
    pub(crate) fn try_local_decl(&mut self) -> Result<bool, IoError> {
        if !self.looks_like_local_decl() {
            return Ok(false);
        }

        let mut storage = StorageClass::Auto;
        let mut read_only = false;
        loop {
            match self.current.kind.clone() {
                TokenKind::Keyword(Keyword::Static) => {
                    storage = StorageClass::Static;
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Auto) => {
                    storage = StorageClass::Auto;
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Register) => {
                    storage = StorageClass::Register;
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Const) => {
                    read_only = true;
                    self.advance();
                }
                _ => break,
            }
        }

        let type_span = self.current_span();
        let Some(ty) = self.parse_base_type() else {
            self.report(Diagnostic::syntactic(
                format!("expected type in local declaration, found {:?}", self.current.kind),
                type_span,
            ));
            self.skip_to_semi();
            return Ok(true);
        };
        let p_level = self.parse_pointer_stars();
        let name_span = self.current_span();
        let Some(name) = self.expect_identifier("in local declaration") else {
            self.skip_to_semi();
            return Ok(true);
        };

        if storage == StorageClass::Register {
            let eligible = p_level == 0 && matches!(ty, Type::Char | Type::Int);
            let already_reserved = self.function.as_ref().map(|f| f.register_reserved).unwrap_or(true);
            if !eligible || already_reserved {
                storage = StorageClass::Auto;
            } else if let Some(f) = self.function.as_mut() {
                f.register_reserved = true;
            }
        }

        let (label, fp_offset) = if storage == StorageClass::Static {
            let label = self.cx.allocate_label("static local");
            let comment = format!("static {} {}", type_name(ty), name);
            match (ty, p_level) {
                (Type::Float, 0) => self.cx.emitter.emit_static_float(label, 0.0, &comment)?,
                (Type::Double, 0) => self.cx.emitter.emit_static_double(label, 0.0, &comment)?,
                _ => self
                    .cx
                    .emitter
                    .emit_static_scalar(label, storage_type(ty, p_level), 0, &comment)?,
            }
            (Some(label), 0)
        } else if storage == StorageClass::Register {
            // Lives in the reserved index register, not the frame (§4.3,
            // §9) — no auto slot to allocate.
            (None, 0)
        } else {
            let size = frame_size(ty, p_level) as i32;
            let offset = match self.function.as_mut() {
                Some(f) => {
                    f.next_auto_offset -= size;
                    f.next_auto_offset
                }
                None => 0,
            };
            (None, offset)
        };

        let symbol = Symbol {
            storage_class: storage,
            name: name.clone(),
            ty,
            p_level,
            label,
            fp_offset,
            read_only,
        };
        if !self.cx.locals.add(symbol) {
            self.report(Diagnostic::redeclaration(&name, name_span));
        }
        self.expect(&TokenKind::Semi, "after local declaration");
        Ok(true)
    }

    /// Error recovery: discard tokens up to and including the next `;`, or
    /// end-of-input, whichever comes first.
    fn skip_to_semi(&mut self) {
        while !matches!(self.current.kind, TokenKind::Semi | TokenKind::Eof) {
            self.advance();
        }
        if self.current.kind == TokenKind::Semi {
            self.advance();
        }
    }
}
