//! Line-oriented recursive-descent parser.
//!
//! Every line is tokenized on its own and turned into exactly one tagged
//! `Command`, or rejected. Forms are tried in a fixed order — key guard,
//! property assignment, variable assignment, then verb-led commands — and the
//! first form whose leading tokens match owns the line: a line that starts
//! like a key guard but is malformed is rejected, never re-read as something
//! else. Sub-commands (`then <action>`, `on click <action>`) are parsed
//! recursively from the raw remainder of the line.

use crate::error::{Error, ErrorCode};
use crate::syntax::ast::*;
use crate::syntax::lexer::Lexer;
use crate::syntax::token::{Token, TokenKind};

/// Parse a whole script. Never fails: unrecognized lines are collected in
/// `Script::unrecognized` and left out of the statement list.
pub fn parse_script(source: &str) -> Script {
    let mut script = Script::default();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        match parse_line(raw, line) {
            None => {}
            Some(Ok(command)) => {
                let per_frame = command.is_per_frame();
                script.statements.push(Statement { line, command, per_frame });
            }
            Some(Err(reason)) => {
                log::debug!(target: "jcscript", "line {line} not recognized: {reason}");
                script.unrecognized.push(Unrecognized { line, text: raw.trim().to_string(), reason });
            }
        }
    }

    script
}

/// Parse one line. `None` for blank lines and `//` comments.
pub fn parse_line(text: &str, line: usize) -> Option<Result<Command, Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return None;
    }
    Some(Parser::new(trimmed, line, 0).and_then(Parser::parse_command))
}

/// Parse a standalone arithmetic expression.
pub fn parse_expression(text: &str, line: usize) -> Result<Expr, Error> {
    let mut p = Parser::new(text, line, 0)?;
    let expr = p.parse_expr()?;
    p.expect_eof()?;
    Ok(expr)
}

// ─────────────────────────────────────────────────────────────────────────────

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    line: usize,
    /// Column offset of `source` inside the original line, for nested actions.
    base: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, line: usize, base: usize) -> Result<Self, Error> {
        let tokens = Lexer::new(source, line).tokenize().map_err(|mut e| {
            e.column += base;
            e
        })?;
        Ok(Self { source, tokens, pos: 0, line, base })
    }

    /// Parse the entire token stream as one command.
    pub fn parse_command(mut self) -> Result<Command, Error> {
        let command = self.parse_form()?;
        self.expect_eof()?;
        Ok(command)
    }

    fn parse_form(&mut self) -> Result<Command, Error> {
        let TokenKind::Ident(head) = self.peek_kind() else {
            return Err(self.unexpected("a command"));
        };

        if head == "if" && self.peek_at(1).is_word("key") {
            return self.parse_key_guard();
        }
        if self.is_property_assign() {
            return self.parse_property_assign().map(Command::SetProperty);
        }
        if self.peek_at(1) == TokenKind::Eq {
            return self.parse_assign();
        }

        match head.as_str() {
            "say"    => self.parse_say(),
            "make"   => self.parse_make(),
            "draw"   => self.parse_draw(),
            "play"   => self.parse_play(),
            "let"    => self.parse_let(),
            "add"    => self.parse_add(),
            "random" => { self.advance(); self.parse_random_range().map(Command::Random) }
            "rotate" => self.parse_rotate(),
            "on"     => self.parse_on_click(),
            "every"  => self.parse_every(),
            _ => Err(self.unexpected("a command")),
        }
    }

    // ─── Guards and callbacks ────────────────────────────────────────────────

    /// `if key "<K>" down then <ACTION>`
    fn parse_key_guard(&mut self) -> Result<Command, Error> {
        self.expect_word("if")?;
        self.expect_word("key")?;
        let key = self.expect_string()?;
        self.expect_word("down")?;
        self.expect_word("then")?;
        let action = self.parse_action()?;
        Ok(Command::KeyGuard { key: key.to_lowercase(), action: Box::new(action) })
    }

    /// `on click <ACTION>`
    fn parse_on_click(&mut self) -> Result<Command, Error> {
        self.expect_word("on")?;
        self.expect_word("click")?;
        let action = self.parse_action()?;
        Ok(Command::OnClick(Box::new(action)))
    }

    /// `every N seconds then <ACTION>`
    fn parse_every(&mut self) -> Result<Command, Error> {
        self.expect_word("every")?;
        let seconds = self.expect_number()?;
        if !self.matches_word("seconds") {
            self.expect_word("second")?;
        }
        self.expect_word("then")?;
        let action = self.parse_action()?;
        Ok(Command::Every { seconds, action: Box::new(action) })
    }

    /// The remainder of the line, parsed as a command of its own.
    fn parse_action(&mut self) -> Result<Command, Error> {
        let offset = self.peek().offset;
        let rest = self.rest_text()?;
        let nested = Parser::new(rest, self.line, self.base + offset)?.parse_command()?;
        self.pos = self.tokens.len() - 1;
        Ok(nested)
    }

    // ─── Assignments ─────────────────────────────────────────────────────────

    /// `entity.prop = value`
    fn parse_property_assign(&mut self) -> Result<PropertyAssign, Error> {
        let entity = self.expect_ident()?;
        self.expect(TokenKind::Dot)?;
        let property = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;

        let value = match property.as_str() {
            "x" | "y" | "w" | "h" => PropertyValue::Number(self.expr_source()),
            "colour" | "color"    => PropertyValue::Color(self.rest_text()?.to_string()),
            "text"                => PropertyValue::Text(strip_quotes(self.rest_text()?).to_string()),
            _                     => PropertyValue::Unknown(self.rest_text_or_empty().to_string()),
        };
        self.pos = self.tokens.len() - 1;
        Ok(PropertyAssign { entity, property, value })
    }

    /// `name = expr`
    fn parse_assign(&mut self) -> Result<Command, Error> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let value = self.expr_source();
        self.pos = self.tokens.len() - 1;
        Ok(Command::Assign { name, value })
    }

    /// Capture the rest of the line as expression text; parse failures are
    /// kept alongside for the evaluator to report.
    fn expr_source(&self) -> ExprSource {
        let text = self.rest_text_or_empty().to_string();
        let parsed = if text.is_empty() {
            Err(Error::new(ErrorCode::P002, self.line, self.base + self.peek().column, "missing expression"))
        } else {
            let offset = self.peek().offset;
            Parser::new(&text, self.line, self.base + offset).and_then(|mut p| {
                let expr = p.parse_expr()?;
                p.expect_eof()?;
                Ok(expr)
            })
        };
        ExprSource { text, parsed }
    }

    // ─── Verbs ───────────────────────────────────────────────────────────────

    /// `say "msg"` — unquoted text is accepted verbatim.
    fn parse_say(&mut self) -> Result<Command, Error> {
        self.expect_word("say")?;
        let text = strip_quotes(self.rest_text()?).to_string();
        self.pos = self.tokens.len() - 1;
        Ok(Command::Say(text))
    }

    /// `make it <color>` / `make background <color>`
    fn parse_make(&mut self) -> Result<Command, Error> {
        self.expect_word("make")?;
        let command = if self.matches_word("it") {
            Command::SetColor(self.rest_text()?.to_string())
        } else if self.matches_word("background") {
            Command::Background(self.rest_text()?.to_string())
        } else {
            return Err(self.unexpected("`it` or `background`"));
        };
        self.pos = self.tokens.len() - 1;
        Ok(command)
    }

    /// `draw circle at (x,y) radius N` / `draw line from (x1,y1) to (x2,y2) width N`
    fn parse_draw(&mut self) -> Result<Command, Error> {
        self.expect_word("draw")?;
        if self.matches_word("circle") {
            self.expect_word("at")?;
            let center = self.parse_point()?;
            self.expect_word("radius")?;
            let radius = self.parse_unary()?;
            Ok(Command::DrawCircle { center, radius })
        } else if self.matches_word("line") {
            self.expect_word("from")?;
            let from = self.parse_point()?;
            self.expect_word("to")?;
            let to = self.parse_point()?;
            self.expect_word("width")?;
            let width = self.parse_unary()?;
            Ok(Command::DrawLine { from, to, width })
        } else {
            Err(self.unexpected("`circle` or `line`"))
        }
    }

    /// `play sound "<name>.sound"`
    fn parse_play(&mut self) -> Result<Command, Error> {
        self.expect_word("play")?;
        self.expect_word("sound")?;
        Ok(Command::PlaySound(self.expect_string()?))
    }

    /// `let <name> = <spawn | image | text | random | expr>`
    fn parse_let(&mut self) -> Result<Command, Error> {
        self.expect_word("let")?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;

        let next = self.peek_at(1);
        let value = match self.peek_kind() {
            TokenKind::Ident(w) if w == "spawn" && next != TokenKind::Eof => {
                self.advance();
                let x = self.parse_unary()?;
                let y = self.parse_unary()?;
                let w = self.parse_unary()?;
                let h = self.parse_unary()?;
                LetValue::Spawn { x, y, w, h }
            }
            TokenKind::Ident(w) if w == "image" && matches!(next, TokenKind::StringLit(_)) => {
                self.advance();
                let path = self.expect_string()?;
                self.expect_word("at")?;
                let at = self.parse_point()?;
                self.expect_word("size")?;
                let w = self.parse_unary()?;
                let h = self.parse_unary()?;
                LetValue::Image { path, at, w, h }
            }
            TokenKind::Ident(w) if w == "text" && matches!(next, TokenKind::StringLit(_)) => {
                self.advance();
                let text = self.expect_string()?;
                self.expect_word("at")?;
                let at = self.parse_point()?;
                self.expect_word("size")?;
                let size = self.parse_unary()?;
                if !self.matches_word("colour") {
                    self.expect_word("color")?;
                }
                let color = self.expect_color()?;
                self.expect_word("font")?;
                let font = self.expect_string()?;
                LetValue::Text { text, at, size, color, font }
            }
            TokenKind::Ident(w) if w == "random" && next.is_word("from") => {
                self.advance();
                LetValue::Random(self.parse_random_range()?)
            }
            _ => LetValue::Number(self.parse_expr()?),
        };

        Ok(Command::Let { name, value })
    }

    /// `add <var> <±number>`
    fn parse_add(&mut self) -> Result<Command, Error> {
        self.expect_word("add")?;
        let name = self.expect_ident()?;
        let amount = self.expect_number()?;
        Ok(Command::Add { name, amount })
    }

    /// `from A to B`, after the `random` keyword.
    fn parse_random_range(&mut self) -> Result<RandomRange, Error> {
        self.expect_word("from")?;
        let min = self.expect_integer()?;
        self.expect_word("to")?;
        let max = self.expect_integer()?;
        Ok(RandomRange { min, max })
    }

    /// `rotate <entity> by N degrees`
    fn parse_rotate(&mut self) -> Result<Command, Error> {
        self.expect_word("rotate")?;
        let entity = self.expect_ident()?;
        self.expect_word("by")?;
        let degrees = self.expect_number()?;
        if !self.matches_word("degrees") {
            self.expect_word("degree")?;
        }
        Ok(Command::Rotate { entity, degrees })
    }

    // ─── Expressions (precedence climbing) ───────────────────────────────────

    pub fn parse_expr(&mut self) -> Result<Expr, Error> {
        self.parse_addition()
    }

    fn parse_addition(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_multiplication()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus  => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplication()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_multiplication(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star  => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right) };
        }
        Ok(left)
    }

    /// Also the "atom" used for single numeric slots (`spawn x y w h`,
    /// `radius N`): it never consumes a binary operator, so `spawn 10 -5 …`
    /// reads as two arguments.
    fn parse_unary(&mut self) -> Result<Expr, Error> {
        if self.matches(TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(match operand {
                Expr::Number(n) => Expr::Number(-n),
                other => Expr::Neg(Box::new(other)),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        match self.peek_kind() {
            TokenKind::Number(n) => { self.advance(); Ok(Expr::Number(n)) }
            TokenKind::Ident(name) => {
                self.advance();
                if self.matches(TokenKind::Dot) {
                    let prop = self.expect_ident()?;
                    Ok(Expr::Property { entity: name, prop })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `(x,y)`
    fn parse_point(&mut self) -> Result<Point, Error> {
        self.expect(TokenKind::LParen)?;
        let x = self.parse_expr()?;
        self.expect(TokenKind::Comma)?;
        let y = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(Point { x, y })
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind.clone()
    }

    fn peek_at(&self, n: usize) -> TokenKind {
        self.tokens.get(self.pos + n).map(|t| t.kind.clone()).unwrap_or(TokenKind::Eof)
    }

    /// `ident . ident =`
    fn is_property_assign(&self) -> bool {
        matches!(self.peek_at(0), TokenKind::Ident(_))
            && self.peek_at(1) == TokenKind::Dot
            && matches!(self.peek_at(2), TokenKind::Ident(_))
            && self.peek_at(3) == TokenKind::Eq
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().kind == *kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(&kind) { self.advance(); true } else { false }
    }

    fn matches_word(&mut self, word: &str) -> bool {
        if self.peek().kind.is_word(word) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(Error::new(
                ErrorCode::P002,
                self.line,
                self.base + tok.column,
                format!("expected {:?}, found {:?}", kind, tok.kind),
            ))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), Error> {
        if self.matches_word(word) {
            Ok(())
        } else {
            Err(self.missing(&format!("`{word}`")))
        }
    }

    fn expect_ident(&mut self) -> Result<String, Error> {
        match self.peek_kind() {
            TokenKind::Ident(s) => { self.advance(); Ok(s) }
            _ => Err(self.missing("identifier")),
        }
    }

    fn expect_string(&mut self) -> Result<String, Error> {
        match self.peek_kind() {
            TokenKind::StringLit(s) => { self.advance(); Ok(s) }
            _ => Err(self.missing("string literal")),
        }
    }

    /// A single color token: `#rrggbb` or a bare name.
    fn expect_color(&mut self) -> Result<String, Error> {
        match self.peek_kind() {
            TokenKind::HexColor(s) | TokenKind::Ident(s) => { self.advance(); Ok(s) }
            _ => Err(self.missing("color")),
        }
    }

    /// A numeric literal with an optional leading `-`.
    fn expect_number(&mut self) -> Result<f64, Error> {
        let negative = self.matches(TokenKind::Minus);
        match self.peek_kind() {
            TokenKind::Number(n) => { self.advance(); Ok(if negative { -n } else { n }) }
            _ => Err(self.missing("number")),
        }
    }

    fn expect_integer(&mut self) -> Result<i64, Error> {
        let col = self.peek().column;
        let n = self.expect_number()?;
        if n.fract() != 0.0 {
            return Err(Error::new(ErrorCode::P001, self.line, self.base + col,
                format!("expected whole number, found {n}")));
        }
        Ok(n as i64)
    }

    fn expect_eof(&mut self) -> Result<(), Error> {
        if self.check(&TokenKind::Eof) { Ok(()) } else { Err(self.unexpected("end of line")) }
    }

    /// Raw source text from the current token up to the end of the line or
    /// the start of a trailing comment.
    fn rest_text_or_empty(&self) -> &'a str {
        let end = self.tokens.last().map_or(self.source.len(), |eof| eof.offset);
        self.source[self.peek().offset..end].trim()
    }

    fn rest_text(&self) -> Result<&'a str, Error> {
        let rest = self.rest_text_or_empty();
        if rest.is_empty() { Err(self.missing("value")) } else { Ok(rest) }
    }

    fn missing(&self, expected: &str) -> Error {
        let tok = self.peek();
        Error::new(
            ErrorCode::P002,
            self.line,
            self.base + tok.column,
            format!("expected {}, found {:?}", expected, tok.kind),
        )
    }

    fn unexpected(&self, expected: &str) -> Error {
        let tok = self.peek();
        let code = if matches!(tok.kind, TokenKind::Unknown(_)) { ErrorCode::L001 } else { ErrorCode::P001 };
        Error::new(
            code,
            self.line,
            self.base + tok.column,
            format!("expected {}, found {:?}", expected, tok.kind),
        )
    }
}

/// `"text"` → `text`; anything not wrapped in quotes is returned unchanged.
fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(s)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Command {
        parse_line(src, 1).expect("line was skipped").expect("parse failed")
    }

    fn parse_err(src: &str) -> Error {
        parse_line(src, 1).expect("line was skipped").expect_err("expected parse error")
    }

    fn num(n: f64) -> Expr { Expr::Number(n) }

    // ── skipping ─────────────────────────────────────────────────────────────

    #[test]
    fn blank_and_comment_lines_skipped() {
        assert!(parse_line("", 1).is_none());
        assert!(parse_line("   ", 1).is_none());
        assert!(parse_line("// hello", 1).is_none());
        assert!(parse_line("   // indented", 1).is_none());
    }

    // ── simple verbs ─────────────────────────────────────────────────────────

    #[test]
    fn say_quoted() {
        assert!(matches!(parse(r#"say "Hello, World!""#), Command::Say(s) if s == "Hello, World!"));
    }

    #[test]
    fn say_unquoted_keeps_raw_text() {
        assert!(matches!(parse("say hi there 100%"), Command::Say(s) if s == "hi there 100%"));
    }

    #[test]
    fn bare_say_is_error() {
        parse_err("say");
    }

    #[test]
    fn make_it_color() {
        assert!(matches!(parse("make it Blue"), Command::SetColor(c) if c == "Blue"));
        assert!(matches!(parse("make it #FF0000"), Command::SetColor(c) if c == "#FF0000"));
    }

    #[test]
    fn make_background() {
        assert!(matches!(parse("make background #87ceeb"), Command::Background(c) if c == "#87ceeb"));
    }

    #[test]
    fn make_without_target_is_error() {
        parse_err("make blue");
    }

    #[test]
    fn draw_circle() {
        match parse("draw circle at (100,100) radius 30") {
            Command::DrawCircle { center, radius } => {
                assert_eq!(center.x, num(100.0));
                assert_eq!(center.y, num(100.0));
                assert_eq!(radius, num(30.0));
            }
            other => panic!("expected DrawCircle, got {other:?}"),
        }
    }

    #[test]
    fn draw_circle_at_pointer() {
        match parse("draw circle at (mouseX, mouseY - 5) radius 4") {
            Command::DrawCircle { center, .. } => {
                assert_eq!(center.x, Expr::Var("mouseX".into()));
                assert!(matches!(center.y, Expr::Binary { op: BinOp::Sub, .. }));
            }
            other => panic!("expected DrawCircle, got {other:?}"),
        }
    }

    #[test]
    fn draw_line() {
        match parse("draw line from (50,50) to (150,150) width 5") {
            Command::DrawLine { from, to, width } => {
                assert_eq!(from.x, num(50.0));
                assert_eq!(to.y, num(150.0));
                assert_eq!(width, num(5.0));
            }
            other => panic!("expected DrawLine, got {other:?}"),
        }
    }

    #[test]
    fn draw_circle_missing_radius_is_error() {
        parse_err("draw circle at (1,2)");
    }

    #[test]
    fn play_sound_keeps_path() {
        assert!(matches!(parse(r#"play sound "jump.sound""#), Command::PlaySound(p) if p == "jump.sound"));
    }

    #[test]
    fn add_signed() {
        assert!(matches!(parse("add score -5"), Command::Add { name, amount } if name == "score" && amount == -5.0));
        assert!(matches!(parse("add lives 1"), Command::Add { amount, .. } if amount == 1.0));
    }

    #[test]
    fn add_without_amount_is_error() {
        parse_err("add score");
    }

    #[test]
    fn random_statement() {
        assert!(matches!(parse("random from 1 to 6"), Command::Random(RandomRange { min: 1, max: 6 })));
    }

    #[test]
    fn random_requires_whole_numbers() {
        parse_err("random from 1.5 to 6");
    }

    #[test]
    fn rotate_degrees() {
        assert!(matches!(parse("rotate ufo by 2 degrees"), Command::Rotate { entity, degrees } if entity == "ufo" && degrees == 2.0));
        assert!(matches!(parse("rotate ufo by -2 degrees"), Command::Rotate { degrees, .. } if degrees == -2.0));
    }

    // ── declarations ─────────────────────────────────────────────────────────

    #[test]
    fn let_number() {
        match parse("let score = 0") {
            Command::Let { name, value: LetValue::Number(e) } => {
                assert_eq!(name, "score");
                assert_eq!(e, num(0.0));
            }
            other => panic!("expected Let number, got {other:?}"),
        }
    }

    #[test]
    fn let_negative_number() {
        assert!(matches!(parse("let v = -3"), Command::Let { value: LetValue::Number(Expr::Number(n)), .. } if n == -3.0));
    }

    #[test]
    fn let_spawn() {
        match parse("let player = spawn 50 50 40 40") {
            Command::Let { name, value: LetValue::Spawn { x, y, w, h } } => {
                assert_eq!(name, "player");
                assert_eq!((x, y, w, h), (num(50.0), num(50.0), num(40.0), num(40.0)));
            }
            other => panic!("expected spawn, got {other:?}"),
        }
    }

    #[test]
    fn let_spawn_negative_args_are_separate() {
        match parse("let p = spawn 10 -5 20 20") {
            Command::Let { value: LetValue::Spawn { y, .. }, .. } => assert_eq!(y, num(-5.0)),
            other => panic!("expected spawn, got {other:?}"),
        }
    }

    #[test]
    fn let_spawn_missing_arg_is_error() {
        parse_err("let p = spawn 10 10 20");
    }

    #[test]
    fn let_image() {
        match parse(r#"let sprite = image "player.image" at (100,100) size 64 64"#) {
            Command::Let { value: LetValue::Image { path, at, w, h }, .. } => {
                assert_eq!(path, "player.image");
                assert_eq!(at.x, num(100.0));
                assert_eq!((w, h), (num(64.0), num(64.0)));
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn let_image_without_suffix_still_parses() {
        // the suffix rule is enforced when the declaration runs
        assert!(matches!(
            parse(r#"let sprite = image "foo" at (0,0) size 10 10"#),
            Command::Let { value: LetValue::Image { .. }, .. }
        ));
    }

    #[test]
    fn let_text() {
        match parse(r#"let scoreText = text "Score: 0" at (20,40) size 20 colour black font "Arial""#) {
            Command::Let { value: LetValue::Text { text, size, color, font, .. }, .. } => {
                assert_eq!(text, "Score: 0");
                assert_eq!(size, num(20.0));
                assert_eq!(color, "black");
                assert_eq!(font, "Arial");
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn let_text_accepts_color_spelling_and_hex() {
        assert!(matches!(
            parse(r#"let t = text "hi" at (0,0) size 12 color #ff0000 font "Mono""#),
            Command::Let { value: LetValue::Text { color, .. }, .. } if color == "#ff0000"
        ));
    }

    #[test]
    fn let_text_missing_font_is_error() {
        parse_err(r#"let t = text "hi" at (0,0) size 12 colour red"#);
    }

    #[test]
    fn let_random() {
        assert!(matches!(
            parse("let roll = random from 1 to 6"),
            Command::Let { value: LetValue::Random(RandomRange { min: 1, max: 6 }), .. }
        ));
    }

    #[test]
    fn let_expression() {
        assert!(matches!(parse("let total = lives * 2"), Command::Let { value: LetValue::Number(Expr::Binary { .. }), .. }));
    }

    #[test]
    fn let_garbage_is_error() {
        parse_err("let x = 5 apples");
    }

    // ── assignments ──────────────────────────────────────────────────────────

    #[test]
    fn property_assign_numeric() {
        match parse("a.x = a.x + 5") {
            Command::SetProperty(PropertyAssign { entity, property, value: PropertyValue::Number(src) }) => {
                assert_eq!(entity, "a");
                assert_eq!(property, "x");
                assert_eq!(src.text, "a.x + 5");
                assert!(src.parsed.is_ok());
            }
            other => panic!("expected property assign, got {other:?}"),
        }
    }

    #[test]
    fn property_assign_malformed_expression_is_kept() {
        match parse("a.x = a.x +") {
            Command::SetProperty(PropertyAssign { value: PropertyValue::Number(src), .. }) => {
                assert_eq!(src.text, "a.x +");
                assert!(src.parsed.is_err());
            }
            other => panic!("expected property assign, got {other:?}"),
        }
    }

    #[test]
    fn property_assign_colour_and_color() {
        assert!(matches!(
            parse("box.colour = Red"),
            Command::SetProperty(PropertyAssign { value: PropertyValue::Color(c), .. }) if c == "Red"
        ));
        assert!(matches!(
            parse("box.color = #00ff00"),
            Command::SetProperty(PropertyAssign { value: PropertyValue::Color(c), .. }) if c == "#00ff00"
        ));
    }

    #[test]
    fn property_assign_text_strips_quotes() {
        assert!(matches!(
            parse(r#"label.text = "Game Over""#),
            Command::SetProperty(PropertyAssign { value: PropertyValue::Text(t), .. }) if t == "Game Over"
        ));
    }

    #[test]
    fn property_assign_unknown_property() {
        assert!(matches!(
            parse("ufo.velocityX = 3"),
            Command::SetProperty(PropertyAssign { value: PropertyValue::Unknown(_), .. })
        ));
    }

    #[test]
    fn variable_assign() {
        match parse("score = score * 2") {
            Command::Assign { name, value } => {
                assert_eq!(name, "score");
                assert!(matches!(value.parsed, Ok(Expr::Binary { op: BinOp::Mul, .. })));
            }
            other => panic!("expected assign, got {other:?}"),
        }
    }

    #[test]
    fn let_is_not_mistaken_for_assignment() {
        assert!(matches!(parse("let x = 1"), Command::Let { .. }));
        assert!(matches!(parse("x = 1"), Command::Assign { .. }));
    }

    #[test]
    fn verb_names_usable_as_variables() {
        assert!(matches!(parse("say = 3"), Command::Assign { name, .. } if name == "say"));
    }

    // ── guards and callbacks ─────────────────────────────────────────────────

    #[test]
    fn key_guard_property_assign() {
        match parse(r#"if key "ArrowUp" down then a.y = a.y - 1"#) {
            Command::KeyGuard { key, action } => {
                assert_eq!(key, "arrowup");
                assert!(matches!(*action, Command::SetProperty(_)));
            }
            other => panic!("expected key guard, got {other:?}"),
        }
    }

    #[test]
    fn key_guard_wraps_ordinary_command() {
        match parse(r#"if key "Space" down then add score 1"#) {
            Command::KeyGuard { key, action } => {
                assert_eq!(key, "space");
                assert!(matches!(*action, Command::Add { .. }));
            }
            other => panic!("expected key guard, got {other:?}"),
        }
    }

    #[test]
    fn key_guard_is_per_frame() {
        assert!(parse(r#"if key "a" down then say "a""#).is_per_frame());
        assert!(!parse("add score 1").is_per_frame());
    }

    #[test]
    fn key_guard_with_unknown_action_is_error() {
        parse_err(r#"if key "a" down then fly away"#);
    }

    #[test]
    fn malformed_key_guard_is_not_reparsed() {
        let err = parse_err(r#"if key "a" then a.x = 1"#);
        assert_eq!(err.code, ErrorCode::P002);
    }

    #[test]
    fn on_click() {
        assert!(matches!(parse(r#"on click say "Clicked!""#), Command::OnClick(a) if matches!(*a, Command::Say(_))));
    }

    #[test]
    fn on_click_without_action_is_error() {
        parse_err("on click");
    }

    #[test]
    fn every_seconds() {
        match parse("every 0.5 seconds then add score 1") {
            Command::Every { seconds, action } => {
                assert_eq!(seconds, 0.5);
                assert!(matches!(*action, Command::Add { .. }));
            }
            other => panic!("expected every, got {other:?}"),
        }
    }

    #[test]
    fn every_singular_second() {
        assert!(matches!(parse("every 1 second then say tick"), Command::Every { .. }));
    }

    #[test]
    fn every_with_block_body_is_error() {
        parse_err("every 2 seconds {");
    }

    #[test]
    fn nested_action_error_column_is_line_relative() {
        let err = parse_err(r#"on click draw circle at (1,2) radius"#);
        assert_eq!(err.column, 37);
    }

    // ── misses ───────────────────────────────────────────────────────────────

    #[test]
    fn unknown_verb_is_error() {
        assert_eq!(parse_err("jump around").code, ErrorCode::P001);
    }

    #[test]
    fn stray_character_reports_lexer_code() {
        assert_eq!(parse_err("% nope").code, ErrorCode::L001);
    }

    #[test]
    fn parse_script_splits_and_records_misses() {
        let script = parse_script("let a = spawn 1 2 3 4\n\n// note\nset velocity of a to x:1 y:2\nif key \"w\" down then a.y = a.y - 1\n");
        assert_eq!(script.statements.len(), 2);
        assert_eq!(script.setup_statements().count(), 1);
        assert_eq!(script.per_frame_statements().count(), 1);
        assert_eq!(script.statements[1].line, 5);
        assert_eq!(script.unrecognized.len(), 1);
        assert_eq!(script.unrecognized[0].line, 4);
    }

    #[test]
    fn parse_expression_precedence() {
        let e = parse_expression("1 + 2 * 3", 1).unwrap();
        assert_eq!(e.to_string(), "(1 + (2 * 3))");
    }

    #[test]
    fn parse_expression_rejects_trailing_tokens() {
        assert!(parse_expression("1 2", 1).is_err());
    }
}
