// kooix-scanner - import directive skim
// Finds `import "path";` directives at bracket depth 0 without a full tokenizer

use logos::Logos;

/// Token kinds the import skim cares about.
///
/// Everything else in a source file (operators, numbers, non-ASCII text)
/// comes out of [`Lexer`] as a [`ScanError`] and is skipped by the scanner.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'s> {
    #[token("import")]
    Import,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // Read verbatim up to the next quote, no escapes
    #[regex(r#""[^"]*""#, string_body)]
    Str(&'s str),

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[token(";")]
    Semicolon,

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,
}

fn string_body<'s>(lex: &mut logos::Lexer<'s, Token<'s>>) -> Option<&'s str> {
    lex.slice().strip_prefix('"')?.strip_suffix('"')
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan<'s> {
    pub token: Token<'s>,
    pub span: std::ops::Range<usize>,
}

pub struct Lexer<'s> {
    inner: logos::Lexer<'s, Token<'s>>,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            inner: Token::lexer(source),
        }
    }
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Result<TokenSpan<'s>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.inner.next()?;
        let span = self.inner.span();

        match token {
            Ok(token) => Some(Ok(TokenSpan { token, span })),
            Err(_) => Some(Err(ScanError::Unrecognized { span })),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Unrecognized input at {span:?}")]
    Unrecognized { span: std::ops::Range<usize> },
}

/// Progress through an `import "path" ;` directive
enum Pending<'s> {
    Idle,
    Keyword,
    Path(&'s str),
}

/// Collect the raw specifiers of every well-formed top-level import, in
/// source order.
///
/// A directive only counts at bracket depth 0 (`{}`, `()` and `[]` all nest).
/// An `import` that is not followed by a string literal and a `;` is ignored,
/// and so is anything inside a block.
pub fn scan_imports(source: &str) -> Vec<String> {
    let mut imports = Vec::new();
    let mut depth: usize = 0;
    let mut pending = Pending::Idle;

    for item in Lexer::new(source) {
        let token = item.ok().map(|spanned| spanned.token);

        match (std::mem::replace(&mut pending, Pending::Idle), token) {
            (Pending::Keyword, Some(Token::Str(path))) => {
                pending = Pending::Path(path);
                continue;
            }
            (Pending::Path(path), Some(Token::Semicolon)) => {
                imports.push(path.to_string());
                continue;
            }
            _ => {}
        }

        match token {
            Some(Token::LBrace | Token::LParen | Token::LBracket) => depth += 1,
            Some(Token::RBrace | Token::RParen | Token::RBracket) => {
                depth = depth.saturating_sub(1);
            }
            Some(Token::Import) if depth == 0 => pending = Pending::Keyword,
            _ => {}
        }
    }

    imports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        let source = r#"import "lib/io"; fn main() { x[i] }"#;
        let tokens: Vec<_> = Lexer::new(source).map(|r| r.unwrap().token).collect();

        assert_eq!(tokens[0], Token::Import);
        assert_eq!(tokens[1], Token::Str("lib/io"));
        assert_eq!(tokens[2], Token::Semicolon);
        assert_eq!(tokens[3], Token::Ident);
        assert_eq!(tokens[4], Token::Ident);
        assert_eq!(tokens[5], Token::LParen);
        assert_eq!(tokens[6], Token::RParen);
        assert_eq!(tokens[7], Token::LBrace);
        assert_eq!(tokens[8], Token::Ident);
        assert_eq!(tokens[9], Token::LBracket);
    }

    #[test]
    fn test_import_prefix_is_identifier() {
        let tokens: Vec<_> = Lexer::new("imports importer")
            .map(|r| r.unwrap().token)
            .collect();
        assert_eq!(tokens, vec![Token::Ident, Token::Ident]);
    }

    #[test]
    fn test_unrecognized_input() {
        let mut lexer = Lexer::new("+");
        assert!(matches!(
            lexer.next(),
            Some(Err(ScanError::Unrecognized { .. }))
        ));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_basic_import() {
        assert_eq!(scan_imports(r#"import "a";"#), vec!["a"]);
    }

    #[test]
    fn test_source_order() {
        let source = "import \"x\";\nimport \"y\";\nfn main() -> Int { 0 };\nimport \"z\";\n";
        assert_eq!(scan_imports(source), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_form_feed_is_whitespace() {
        assert_eq!(scan_imports("import\x0c\"a\"\x0c;\x0c"), vec!["a"]);
    }

    #[test]
    fn test_nested_import_ignored() {
        let source = "fn f() { import \"inner\"; }\nimport \"outer\";";
        assert_eq!(scan_imports(source), vec!["outer"]);
    }

    #[test]
    fn test_depth_floors_at_zero() {
        let source = "}}) import \"a\";";
        assert_eq!(scan_imports(source), vec!["a"]);
    }

    #[test]
    fn test_comments_between_parts() {
        let source = "import // lib\n \"lib\" // then\n ;";
        assert_eq!(scan_imports(source), vec!["lib"]);
    }

    #[test]
    fn test_commented_out_import() {
        assert!(scan_imports("// import \"a\";\n").is_empty());
    }

    #[test]
    fn test_malformed_imports_ignored() {
        assert!(scan_imports("import \"a\"").is_empty());
        assert!(scan_imports("import a;").is_empty());
        assert!(scan_imports("import \"a\" as A;").is_empty());
        assert!(scan_imports("import;").is_empty());
    }

    #[test]
    fn test_malformed_then_valid() {
        assert_eq!(scan_imports("import import \"b\";"), vec!["b"]);
        assert_eq!(scan_imports("import \"a\" import \"b\";"), vec!["b"]);
    }

    #[test]
    fn test_path_is_verbatim() {
        assert_eq!(scan_imports(r#"import "../x\y z";"#), vec![r"../x\y z"]);
    }
}
