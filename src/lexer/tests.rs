use super::*;
use crate::error::Diagnostic;
use crate::symtab::{Keyword, KeywordTable};

fn lex_all(src: &str) -> Vec<TokenKind> {
    let kw = KeywordTable::new();
    let mut diags = Vec::new();
    let mut scanner = Scanner::new(src);
    let mut out = Vec::new();
    loop {
        let tok = scanner.next_token(&kw, &mut diags);
        let done = tok.kind == TokenKind::Eof;
        out.push(tok.kind);
        if done {
            break;
        }
    }
    out
}

#[test]
fn recognises_identifiers_and_keywords() {
    let toks = lex_all("int Sugar");
    assert_eq!(
        toks,
        vec![
            TokenKind::Keyword(Keyword::Int),
            TokenKind::Identifier("Sugar".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn decimal_octal_and_hex_integers() {
    let toks = lex_all("42 052 0x2A");
    assert_eq!(
        toks,
        vec![
            TokenKind::IntLiteral(42),
            TokenKind::IntLiteral(42),
            TokenKind::IntLiteral(42),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn integer_suffixes_do_not_change_value() {
    let toks = lex_all("10UL");
    assert_eq!(toks, vec![TokenKind::IntLiteral(10), TokenKind::Eof]);
}

#[test]
fn float_literal_with_exponent_and_suffix() {
    let toks = lex_all("153e4");
    match &toks[0] {
        TokenKind::FloatLiteral(v) => assert!((*v - 153e4).abs() < 1e-6),
        other => panic!("expected float, got {other:?}"),
    }
}

#[test]
fn string_literal_decodes_escapes() {
    let toks = lex_all(r#""A\n""#);
    assert_eq!(toks[0], TokenKind::StringLiteral(vec![b'A', b'\n']));
}

#[test]
fn char_literal_decodes_escape_to_integer() {
    let toks = lex_all(r"'\n'");
    assert_eq!(toks[0], TokenKind::IntLiteral(b'\n' as i64));
}

#[test]
fn compound_operators_prefer_longest_match() {
    let toks = lex_all("<<= << <= < >>= >> >= >");
    assert_eq!(
        toks,
        vec![
            TokenKind::LtLtEq,
            TokenKind::LtLt,
            TokenKind::LtEq,
            TokenKind::Lt,
            TokenKind::GtGtEq,
            TokenKind::GtGt,
            TokenKind::GtEq,
            TokenKind::Gt,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn line_comment_is_skipped() {
    let toks = lex_all("1 // comment\n2");
    assert_eq!(
        toks,
        vec![TokenKind::IntLiteral(1), TokenKind::IntLiteral(2), TokenKind::Eof]
    );
}

#[test]
fn block_comment_is_skipped() {
    let toks = lex_all("1 /* a \n b */ 2");
    assert_eq!(
        toks,
        vec![TokenKind::IntLiteral(1), TokenKind::IntLiteral(2), TokenKind::Eof]
    );
}

#[test]
fn unknown_character_becomes_invalid_token() {
    let toks = lex_all("@");
    assert_eq!(toks, vec![TokenKind::Invalid('@'), TokenKind::Eof]);
}

#[test]
fn unterminated_string_is_reported_not_rejected() {
    let kw = KeywordTable::new();
    let mut diags: Vec<Diagnostic> = Vec::new();
    let mut scanner = Scanner::new("\"abc");
    let tok = scanner.next_token(&kw, &mut diags);
    assert_eq!(tok.kind, TokenKind::StringLiteral(vec![b'a', b'b', b'c']));
    assert_eq!(diags.len(), 1);
}

#[test]
fn repeated_eof_after_end_of_input() {
    let kw = KeywordTable::new();
    let mut diags = Vec::new();
    let mut scanner = Scanner::new("");
    assert_eq!(scanner.next_token(&kw, &mut diags).kind, TokenKind::Eof);
    assert_eq!(scanner.next_token(&kw, &mut diags).kind, TokenKind::Eof);
}
