use crate::error::{Error, ErrorCode};
use crate::syntax::token::{Token, TokenKind};

/// Tokenizes a single script line. Scripts are line-oriented, so the lexer
/// never sees a newline; `line` is only carried for error positions.
pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, line: usize) -> Self {
        Self { source: source.as_bytes(), pos: 0, line }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            // a trailing comment ends the line; Eof sits where it starts
            if self.is_at_end() || self.at_comment() {
                tokens.push(Token::new(TokenKind::Eof, self.pos));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        let ch = self.advance();

        let kind = match ch {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'=' => TokenKind::Eq,
            b',' => TokenKind::Comma,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'/' => TokenKind::Slash,
            b'.' => {
                if self.peek().is_ascii_digit() { TokenKind::Number(self.read_number(start)) }
                else { TokenKind::Dot }
            }
            b'#' => TokenKind::HexColor(self.read_hex_color(start)),
            b'"' => TokenKind::StringLit(self.read_string(start)?),
            b'0'..=b'9' => TokenKind::Number(self.read_number(start)),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => TokenKind::Ident(self.read_ident(start)),

            // Stray characters become tokens of their own; only forms that
            // take the raw rest of the line (`say`, colors) can accept them.
            _ => {
                while !self.is_at_end() && (self.peek() & 0xC0) == 0x80 { self.advance(); }
                TokenKind::Unknown(self.text(start))
            }
        };

        Ok(Token::new(kind, start))
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.source[self.pos];
        self.pos += 1;
        ch
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.source[self.pos] }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn at_comment(&self) -> bool {
        self.source[self.pos..].starts_with(b"//")
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_ascii_whitespace() {
            self.advance();
        }
    }

    fn text(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.source[start..self.pos]).into_owned()
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    /// `#` followed by any run of alphanumerics. Validity of the digits is the
    /// drawing surface's business, not the lexer's.
    fn read_hex_color(&mut self, start: usize) -> String {
        while !self.is_at_end() && self.peek().is_ascii_alphanumeric() { self.advance(); }
        self.text(start)
    }

    fn read_string(&mut self, start: usize) -> Result<String, Error> {
        let mut bytes = Vec::new();
        loop {
            if self.is_at_end() {
                return Err(Error::new(ErrorCode::L002, self.line, start + 1,
                    "unterminated string literal"));
            }
            let ch = self.advance();
            if ch == b'"' { break; }
            if ch == b'\\' {
                let esc_col = self.pos + 1;
                if self.is_at_end() {
                    return Err(Error::new(ErrorCode::L002, self.line, start + 1,
                        "unterminated string literal"));
                }
                match self.advance() {
                    b'n'  => bytes.push(b'\n'),
                    b't'  => bytes.push(b'\t'),
                    b'"'  => bytes.push(b'"'),
                    b'\\' => bytes.push(b'\\'),
                    other => {
                        return Err(Error::new(ErrorCode::L003, self.line, esc_col,
                            format!("unknown escape sequence `\\{}`", other as char)));
                    }
                }
            } else {
                bytes.push(ch);
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_number(&mut self, start: usize) -> f64 {
        while !self.is_at_end() && self.peek().is_ascii_digit() { self.advance(); }
        // consume a decimal point only when a digit follows, so `a.x` style
        // accessors after a number are never swallowed
        if self.peek() == b'.' && self.source.get(self.pos + 1).is_some_and(u8::is_ascii_digit) {
            self.advance();
            while !self.is_at_end() && self.peek().is_ascii_digit() { self.advance(); }
        }
        self.text(start).parse().unwrap_or(0.0)
    }

    fn read_ident(&mut self, start: usize) -> String {
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == b'_') {
            self.advance();
        }
        self.text(start)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
