use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw text of the token. For string literals this is the decoded value,
    /// for error tokens the offending input.
    pub text: Box<str>,
    pub pos: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<Box<str>>, pos: Position) -> Token {
        Token {
            kind,
            text: text.into(),
            pos,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {:?}, {})", self.kind, self.text, self.pos)
    }
}

/// A 1-based line and column pair pointing at the first character of a
/// token (or of the node built from it).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub const fn new(line: u32, column: u32) -> Position {
        Position { line, column }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({self})")
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Fn,
    Const,
    Var,
    Struct,
    Return,
    If,
    Else,
    While,
    For,
    Break,
    Continue,
    Comptime,
    Inline,
    Pub,
    Try,

    True,
    False,
    Null,
    Undefined,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Amp,
    AmpAmp,
    PipePipe,
    EqEq,
    BangEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    Question,
    Dot,

    Colon,
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    Identifier,
    PrimitiveType,
    Number,
    String,

    Eof,
    ErrorUnexpectedChar,
    ErrorUnterminatedString,
}

/// Coarse token classification.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenClass {
    Keyword,
    PrimitiveType,
    Literal,
    Identifier,
    Operator,
    Punctuation,
    Eof,
    Error,
}

impl TokenKind {
    pub fn class(self) -> TokenClass {
        use TokenKind::*;
        match self {
            Fn | Const | Var | Struct | Return | If | Else | While | For | Break | Continue
            | Comptime | Inline | Pub | Try => TokenClass::Keyword,
            True | False | Null | Undefined | Number | String => TokenClass::Literal,
            Plus | Minus | Star | Slash | Percent | Bang | Amp | AmpAmp | PipePipe | EqEq
            | BangEq | Less | LessEq | Greater | GreaterEq | Assign | PlusAssign
            | MinusAssign | StarAssign | SlashAssign | PercentAssign | Question | Dot => {
                TokenClass::Operator
            }
            Colon | Semicolon | Comma | LParen | RParen | LBrace | RBrace | LBracket
            | RBracket => TokenClass::Punctuation,
            Identifier => TokenClass::Identifier,
            PrimitiveType => TokenClass::PrimitiveType,
            Eof => TokenClass::Eof,
            ErrorUnexpectedChar | ErrorUnterminatedString => TokenClass::Error,
        }
    }

    pub fn is_error(self) -> bool {
        self.class() == TokenClass::Error
    }

    /// Source spelling of fixed tokens, used in diagnostics.
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            Fn => "fn",
            Const => "const",
            Var => "var",
            Struct => "struct",
            Return => "return",
            If => "if",
            Else => "else",
            While => "while",
            For => "for",
            Break => "break",
            Continue => "continue",
            Comptime => "comptime",
            Inline => "inline",
            Pub => "pub",
            Try => "try",
            True => "true",
            False => "false",
            Null => "null",
            Undefined => "undefined",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Bang => "!",
            Amp => "&",
            AmpAmp => "&&",
            PipePipe => "||",
            EqEq => "==",
            BangEq => "!=",
            Less => "<",
            LessEq => "<=",
            Greater => ">",
            GreaterEq => ">=",
            Assign => "=",
            PlusAssign => "+=",
            MinusAssign => "-=",
            StarAssign => "*=",
            SlashAssign => "/=",
            PercentAssign => "%=",
            Question => "?",
            Dot => ".",
            Colon => ":",
            Semicolon => ";",
            Comma => ",",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Identifier => "identifier",
            PrimitiveType => "type name",
            Number => "number",
            String => "string",
            Eof => "end of input",
            ErrorUnexpectedChar => "unexpected character",
            ErrorUnterminatedString => "unterminated string",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class() {
            TokenClass::Keyword | TokenClass::Operator | TokenClass::Punctuation => {
                write!(f, "'{}'", self.describe())
            }
            _ => f.write_str(self.describe()),
        }
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "fn" => TokenKind::Fn,
    "const" => TokenKind::Const,
    "var" => TokenKind::Var,
    "struct" => TokenKind::Struct,
    "return" => TokenKind::Return,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "for" => TokenKind::For,
    "break" => TokenKind::Break,
    "continue" => TokenKind::Continue,
    "comptime" => TokenKind::Comptime,
    "inline" => TokenKind::Inline,
    "pub" => TokenKind::Pub,
    "try" => TokenKind::Try,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
    "null" => TokenKind::Null,
    "undefined" => TokenKind::Undefined,
};

pub static PRIMITIVE_TYPES: phf::Set<&'static str> = phf::phf_set! {
    "i8", "i16", "i32", "i64", "i128", "isize",
    "u8", "u16", "u32", "u64", "u128", "usize",
    "f16", "f32", "f64", "f128",
    "bool", "void", "type", "anyerror", "noreturn",
    "comptime_int", "comptime_float",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_agrees_with_class() {
        for (name, kind) in KEYWORDS.entries() {
            assert_eq!(kind.describe(), *name);
            assert!(matches!(
                kind.class(),
                TokenClass::Keyword | TokenClass::Literal
            ));
        }
    }

    #[test]
    fn display_quotes_fixed_tokens() {
        assert_eq!(TokenKind::Semicolon.to_string(), "';'");
        assert_eq!(TokenKind::Fn.to_string(), "'fn'");
        assert_eq!(TokenKind::Identifier.to_string(), "identifier");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }
}
