#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Ident(String),
    StringLit(String),
    HexColor(String), // including the leading `#`
    Unknown(String),  // any character outside the grammar

    // Operators
    Plus,   // +
    Minus,  // -
    Star,   // *
    Slash,  // /
    Eq,     // =

    // Punctuation
    Comma,  // ,
    Dot,    // .
    LParen, // (
    RParen, // )

    Eof,
}

impl TokenKind {
    /// True when the token is the bare word `word`. Command verbs are plain
    /// identifiers so that entities and variables may reuse them as names.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Self::Ident(s) if s == word)
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character within its line.
    pub offset: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset, column: offset + 1 }
    }
}
