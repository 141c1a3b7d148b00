use logos::Logos;
use std::fmt;

/// Token types for C#-like declaration sources
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token<'src> {
    // Keywords
    #[token("using")]
    Using,

    #[token("namespace")]
    Namespace,

    #[token("class")]
    Class,

    #[token("struct")]
    Struct,

    #[token("interface")]
    Interface,

    // Modifiers
    #[token("public")]
    Public,

    #[token("private")]
    Private,

    #[token("protected")]
    Protected,

    #[token("internal")]
    Internal,

    #[token("static")]
    Static,

    #[token("abstract")]
    Abstract,

    #[token("virtual")]
    Virtual,

    #[token("override")]
    Override,

    #[token("sealed")]
    Sealed,

    #[token("readonly")]
    Readonly,

    #[token("async")]
    Async,

    #[token("partial")]
    Partial,

    #[token("const")]
    Const,

    // Identifiers (get/set/init are contextual and stay identifiers)
    #[regex(r"@?[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice())]
    Ident(&'src str),

    // Literals only matter inside opaque bodies, but a brace in a string must not
    // unbalance the body scan
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice())]
    String(&'src str),

    #[regex(r"'([^'\\\n]|\\.)+'", |lex| lex.slice())]
    Char(&'src str),

    #[regex(r"[0-9]+(\.[0-9]+)?[fFdDmMlLuU]?", |lex| lex.slice())]
    Number(&'src str),

    // Symbols
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

    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("=>")]
    Arrow,

    #[token("=")]
    Equals,

    #[token("?")]
    Question,

    #[token("~")]
    Tilde,

    /// Never produced: the callback skips to the closing `*/`
    #[token("/*", skip_block_comment)]
    BlockComment,

    // Operators inside bodies and initializers
    #[regex(r"[+\-*/%!&|^#$]", |lex| lex.slice())]
    Punct(&'src str),
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Using => write!(f, "using"),
            Token::Namespace => write!(f, "namespace"),
            Token::Class => write!(f, "class"),
            Token::Struct => write!(f, "struct"),
            Token::Interface => write!(f, "interface"),
            Token::Public => write!(f, "public"),
            Token::Private => write!(f, "private"),
            Token::Protected => write!(f, "protected"),
            Token::Internal => write!(f, "internal"),
            Token::Static => write!(f, "static"),
            Token::Abstract => write!(f, "abstract"),
            Token::Virtual => write!(f, "virtual"),
            Token::Override => write!(f, "override"),
            Token::Sealed => write!(f, "sealed"),
            Token::Readonly => write!(f, "readonly"),
            Token::Async => write!(f, "async"),
            Token::Partial => write!(f, "partial"),
            Token::Const => write!(f, "const"),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::String(s) => write!(f, "string {}", s),
            Token::Char(c) => write!(f, "char {}", c),
            Token::Number(n) => write!(f, "number {}", n),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::LAngle => write!(f, "'<'"),
            Token::RAngle => write!(f, "'>'"),
            Token::Colon => write!(f, "':'"),
            Token::Semicolon => write!(f, "';'"),
            Token::Comma => write!(f, "','"),
            Token::Dot => write!(f, "'.'"),
            Token::Arrow => write!(f, "'=>'"),
            Token::Equals => write!(f, "'='"),
            Token::Question => write!(f, "'?'"),
            Token::Tilde => write!(f, "'~'"),
            Token::BlockComment => write!(f, "comment"),
            Token::Punct(p) => write!(f, "'{}'", p),
        }
    }
}

/// An unterminated comment runs to the end of the source
fn skip_block_comment<'src>(lex: &mut logos::Lexer<'src, Token<'src>>) -> logos::Skip {
    let rest = lex.remainder();
    let end = rest.find("*/").map_or(rest.len(), |i| i + 2);
    lex.bump(end);
    logos::Skip
}

/// Tokenize a source string
pub fn tokenize(source: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let source = "using namespace class struct interface";
        let tokens = tokenize(source);

        assert_eq!(tokens[0].0, Token::Using);
        assert_eq!(tokens[1].0, Token::Namespace);
        assert_eq!(tokens[2].0, Token::Class);
        assert_eq!(tokens[3].0, Token::Struct);
        assert_eq!(tokens[4].0, Token::Interface);
    }

    #[test]
    fn test_identifiers_are_not_keywords() {
        let tokens = tokenize("classy get set _value @event");
        assert_eq!(tokens[0].0, Token::Ident("classy"));
        assert_eq!(tokens[1].0, Token::Ident("get"));
        assert_eq!(tokens[2].0, Token::Ident("set"));
        assert_eq!(tokens[3].0, Token::Ident("_value"));
        assert_eq!(tokens[4].0, Token::Ident("@event"));
    }

    #[test]
    fn test_comments_skipped() {
        let source = "// line\nclass /* block */ T";
        let tokens = tokenize(source);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].0, Token::Ident("T"));
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        let tokens = tokenize("int /* a * b\n { */ x; /** doc **/");
        let kinds: Vec<_> = tokens.iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(
            kinds,
            vec![Token::Ident("int"), Token::Ident("x"), Token::Semicolon]
        );
    }

    #[test]
    fn test_brace_inside_string_is_one_token() {
        let tokens = tokenize(r#"{ Log("{"); }"#);
        let braces = tokens
            .iter()
            .filter(|(t, _)| matches!(t, Token::LBrace | Token::RBrace))
            .count();
        assert_eq!(braces, 2);
    }

    #[test]
    fn test_arrow_and_equals() {
        let tokens = tokenize("=> =");
        assert_eq!(tokens[0].0, Token::Arrow);
        assert_eq!(tokens[1].0, Token::Equals);
    }
}
