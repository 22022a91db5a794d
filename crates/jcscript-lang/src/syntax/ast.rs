use std::fmt;

use crate::error::Error;

// ─── Script ──────────────────────────────────────────────────────────────────

/// A parsed script: one statement per recognized line, in source order.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub statements: Vec<Statement>,
    /// Lines that matched no command form. They never reach the runtime and
    /// produce no diagnostic there; hosts may surface them if they choose.
    pub unrecognized: Vec<Unrecognized>,
}

impl Script {
    pub fn setup_statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|s| !s.per_frame)
    }

    pub fn per_frame_statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|s| s.per_frame)
    }
}

#[derive(Debug, Clone)]
pub struct Statement {
    /// 1-based source line.
    pub line: usize,
    pub command: Command,
    /// Key-guarded commands run on every `update()`; everything else runs once in `setup()`.
    pub per_frame: bool,
}

#[derive(Debug, Clone)]
pub struct Unrecognized {
    pub line: usize,
    pub text: String,
    pub reason: Error,
}

// ─── Commands ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Command {
    /// `say "hello"`
    Say(String),
    /// `make it blue` — raw color token
    SetColor(String),
    /// `make background #87ceeb`
    Background(String),
    /// `draw circle at (x,y) radius r`
    DrawCircle { center: Point, radius: Expr },
    /// `draw line from (x1,y1) to (x2,y2) width w`
    DrawLine { from: Point, to: Point, width: Expr },
    /// `play sound "pop.sound"` — path exactly as written
    PlaySound(String),
    /// `let name = …`
    Let { name: String, value: LetValue },
    /// `score = score * 2`
    Assign { name: String, value: ExprSource },
    /// `player.x = player.x + 5`
    SetProperty(PropertyAssign),
    /// `add score -1`
    Add { name: String, amount: f64 },
    /// `random from 1 to 6`
    Random(RandomRange),
    /// `rotate player by 15 degrees`
    Rotate { entity: String, degrees: f64 },
    /// `on click <action>`
    OnClick(Box<Command>),
    /// `every 0.5 seconds then <action>`
    Every { seconds: f64, action: Box<Command> },
    /// `if key "ArrowUp" down then <action>` — key stored lower-cased
    KeyGuard { key: String, action: Box<Command> },
}

impl Command {
    pub fn is_per_frame(&self) -> bool {
        matches!(self, Self::KeyGuard { .. })
    }

    /// Short tag used in log lines.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Say(_)           => "say",
            Self::SetColor(_)      => "make-it",
            Self::Background(_)    => "make-background",
            Self::DrawCircle { .. } => "draw-circle",
            Self::DrawLine { .. }  => "draw-line",
            Self::PlaySound(_)     => "play-sound",
            Self::Let { value, .. } => match value {
                LetValue::Spawn { .. }  => "spawn",
                LetValue::Image { .. }  => "image-decl",
                LetValue::Text { .. }   => "text-decl",
                LetValue::Random(_)     => "let-random",
                LetValue::Number(_)     => "let",
            },
            Self::Assign { .. }    => "assign",
            Self::SetProperty(_)   => "property-assign",
            Self::Add { .. }       => "add",
            Self::Random(_)        => "random",
            Self::Rotate { .. }    => "rotate",
            Self::OnClick(_)       => "on-click",
            Self::Every { .. }     => "every",
            Self::KeyGuard { .. }  => "key-guard",
        }
    }
}

#[derive(Debug, Clone)]
pub enum LetValue {
    /// `spawn x y w h`
    Spawn { x: Expr, y: Expr, w: Expr, h: Expr },
    /// `image "ufo.image" at (x,y) size w h`
    Image { path: String, at: Point, w: Expr, h: Expr },
    /// `text "Score" at (x,y) size 20 colour black font "Arial"`
    Text { text: String, at: Point, size: Expr, color: String, font: String },
    /// `random from 1 to 6`
    Random(RandomRange),
    /// `0`, `lives * 2`
    Number(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone)]
pub struct PropertyAssign {
    pub entity: String,
    pub property: String,
    pub value: PropertyValue,
}

#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// `x`, `y`, `w`, `h`
    Number(ExprSource),
    /// `colour` / `color` — raw color token
    Color(String),
    /// `text` — literal string
    Text(String),
    /// Anything else; rejected when executed.
    Unknown(String),
}

#[derive(Debug, Clone)]
pub struct Point {
    pub x: Expr,
    pub y: Expr,
}

// ─── Expressions ─────────────────────────────────────────────────────────────

/// Right-hand side of an assignment. Kept as text so that malformed arithmetic
/// is reported when the assignment runs instead of silently dropping the line.
#[derive(Debug, Clone)]
pub struct ExprSource {
    pub text: String,
    pub parsed: Result<Expr, Error>,
}

/// Arithmetic only: literals, names, `entity.prop`, four operators, grouping.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Var(String),
    Property { entity: String, prop: String },
    Neg(Box<Expr>),
    Binary { left: Box<Expr>, op: BinOp, right: Box<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Var(name) => f.write_str(name),
            Self::Property { entity, prop } => write!(f, "{entity}.{prop}"),
            Self::Neg(inner) => write!(f, "-{inner}"),
            Self::Binary { left, op, right } => write!(f, "({left} {} {right})", op.symbol()),
        }
    }
}
