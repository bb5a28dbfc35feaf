use crate::token::{Position, Token, TokenKind, KEYWORDS, PRIMITIVE_TYPES};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 1_024;

/// Lexes the provided string, producing the tokens into the provided buffer.
///
/// The buffer always ends with exactly one [`TokenKind::Eof`] token. Lexical
/// errors never abort the scan, they are produced as error-kind tokens.
pub fn lex(src: &str, tokens: &mut Vec<Token>) {
    Lexer::new(src, tokens).lex();
}

/// A convenience function that allocates a new buffer per lexed input and
/// returns it.
pub fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY.min(src.len() / 2 + 1));
    lex(src, &mut tokens);
    tokens
}

/// A lexical error, as carried by an error-kind token.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Unexpected character '{0}'")]
    UnexpectedChar(char),
}

impl Error {
    /// Returns the error represented by the given token, if it is an
    /// error-kind token.
    pub fn of(token: &Token) -> Option<Error> {
        match token.kind {
            TokenKind::ErrorUnterminatedString => Some(Error::UnterminatedString),
            TokenKind::ErrorUnexpectedChar => {
                let c = token.text.chars().next().unwrap_or('\0');
                Some(Error::UnexpectedChar(c))
            }
            _ => None,
        }
    }
}

struct Lexer<'src, 'tok> {
    src: &'src str,
    cursor: usize,
    current_lo: usize,
    line: u32,
    column: u32,
    current_pos: Position,
    /// Decoded value of the string literal being scanned.
    buf: String,
    tokens: &'tok mut Vec<Token>,
}

impl Lexer<'_, '_> {
    /// Scans the source string until the input is exhausted.
    fn lex(mut self) {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            self.skip_trivia();
            let next = self.scan_token_kind();
            let is_eof = next == TokenKind::Eof;
            self.produce(next);
            if is_eof {
                break;
            }
        }
    }

    /// Tries to scan the current character.
    fn scan_token_kind(&mut self) -> TokenKind {
        use TokenKind::*;
        match self.mark_advance() {
            '\0' if self.cursor == self.current_lo => Eof,
            '+' => self.assign_variant(Plus, PlusAssign),
            '-' => self.assign_variant(Minus, MinusAssign),
            '*' => self.assign_variant(Star, StarAssign),
            '/' => self.assign_variant(Slash, SlashAssign),
            '%' => self.assign_variant(Percent, PercentAssign),
            '=' => self.assign_variant(Assign, EqEq),
            '!' => self.assign_variant(Bang, BangEq),
            '<' => self.assign_variant(Less, LessEq),
            '>' => self.assign_variant(Greater, GreaterEq),
            '&' => match self.peek() {
                '&' => self.advance_with(AmpAmp),
                _ => Amp,
            },
            '|' => match self.peek() {
                '|' => self.advance_with(PipePipe),
                _ => ErrorUnexpectedChar,
            },
            '?' => Question,
            '.' => Dot,
            ':' => Colon,
            ';' => Semicolon,
            ',' => Comma,
            '(' => LParen,
            ')' => RParen,
            '{' => LBrace,
            '}' => RBrace,
            '[' => LBracket,
            ']' => RBracket,
            quote @ ('"' | '\'') => self.string(quote),
            '@' if is_identifier_start(self.peek()) => self.identifier_or_keyword(),
            c if is_identifier_start(c) => self.identifier_or_keyword(),
            c if c.is_ascii_digit() => self.number(),
            _ => ErrorUnexpectedChar,
        }
    }

    /// Handles the `op` / `op=` pair shared by most operators.
    fn assign_variant(&mut self, single: TokenKind, with_eq: TokenKind) -> TokenKind {
        match self.peek() {
            '=' => self.advance_with(with_eq),
            _ => single,
        }
    }

    /// Scans a string literal delimited by `quote`, decoding escape
    /// sequences into `buf` as it goes.
    ///
    /// Line breaks are allowed inside the literal; only running out of input
    /// leaves the string unterminated.
    fn string(&mut self, quote: char) -> TokenKind {
        self.buf.clear();
        loop {
            let current = self.advance();
            if current == '\0' && self.is_at_end() {
                return TokenKind::ErrorUnterminatedString;
            }
            match current {
                '\\' => {
                    let escaped = self.advance();
                    if escaped == '\0' && self.is_at_end() {
                        return TokenKind::ErrorUnterminatedString;
                    }
                    self.buf.push(unescape(escaped));
                }
                c if c == quote => return TokenKind::String,
                c => self.buf.push(c),
            }
        }
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        while is_identifier_suffix(self.peek()) {
            self.advance();
        }
        let substr = self.substr();
        if let Some(keyword) = KEYWORDS.get(substr).copied() {
            keyword
        } else if PRIMITIVE_TYPES.contains(substr) {
            TokenKind::PrimitiveType
        } else {
            TokenKind::Identifier
        }
    }

    fn number(&mut self) -> TokenKind {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        // The fractional dot is only taken if a digit follows it, so that
        // `1.foo` still lexes as a number followed by a member access.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        TokenKind::Number
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                c if c.is_whitespace() => {
                    self.advance();
                }
                '/' if self.peek_next() == '/' => {
                    while !matches!(self.peek(), '\n' | '\0') || self.peek_is_nul_char() {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }
}

impl Lexer<'_, '_> {
    /// Constructs a new lexer with the default state.
    fn new<'src, 'tok>(src: &'src str, tokens: &'tok mut Vec<Token>) -> Lexer<'src, 'tok> {
        Lexer {
            src,
            cursor: 0,
            current_lo: 0,
            line: 1,
            column: 1,
            current_pos: Position::START,
            buf: String::new(),
            tokens,
        }
    }

    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> char {
        self.current_lo = self.cursor;
        self.current_pos = Position::new(self.line, self.column);
        self.advance()
    }

    /// Returns the next character and advances. Returns `'\0'` without
    /// advancing once the input is exhausted.
    fn advance(&mut self) -> char {
        let Some(c) = self.rest().chars().next() else {
            return '\0';
        };
        self.cursor += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the next character without advancing.
    fn peek(&self) -> char {
        self.rest().chars().next().unwrap_or('\0')
    }

    /// Returns the character after the next one without advancing.
    fn peek_next(&self) -> char {
        self.rest().chars().nth(1).unwrap_or('\0')
    }

    /// Whether the next character is a NUL present in the input (as opposed
    /// to the end-of-input sentinel).
    fn peek_is_nul_char(&self) -> bool {
        self.rest().starts_with('\0')
    }

    fn is_at_end(&self) -> bool {
        self.cursor >= self.src.len()
    }

    fn rest(&self) -> &str {
        &self.src[self.cursor..]
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        &self.src[self.current_lo..self.cursor]
    }

    /// Produces a token using the marked bounds.
    fn produce(&mut self, kind: TokenKind) {
        let text: Box<str> = match kind {
            TokenKind::String => std::mem::take(&mut self.buf).into(),
            _ => self.substr().into(),
        };
        self.tokens.push(Token::new(kind, text, self.current_pos));
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_suffix(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Decodes the character following a backslash. Characters outside the
/// escape table are kept as they are.
fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other, // covers \\, \" and \'
    }
}

/// Inverse of the lexer's escape decoding, used when re-emitting string
/// literals.
pub fn escape(raw: &str) -> String {
    let mut buf = String::with_capacity(raw.len() + 2);
    for c in raw.chars() {
        match c {
            '\n' => buf.push_str("\\n"),
            '\t' => buf.push_str("\\t"),
            '\r' => buf.push_str("\\r"),
            '\\' => buf.push_str("\\\\"),
            '"' => buf.push_str("\\\""),
            '\'' => buf.push_str("\\'"),
            c => buf.push(c),
        }
    }
    buf
}
