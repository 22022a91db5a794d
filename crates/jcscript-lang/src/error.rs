use thiserror::Error;

/// Error codes prefixed by phase: L = lexer, P = parser, R = reference,
/// T = type, E = evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexer
    L001, // unexpected character
    L002, // unterminated string literal
    L003, // invalid escape sequence

    // Parser
    P001, // unexpected token
    P002, // missing expected token

    // Reference
    R001, // unknown entity
    R002, // unknown variable
    R003, // asset path without the required suffix
    R004, // asset not registered, or registered with the wrong kind

    // Type
    T001, // property is not numeric / not supported by this entity kind
    T002, // unknown property
    T003, // invalid timer period

    // Evaluation
    E001, // malformed arithmetic
    E002, // result is not a finite number
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::L003 => "L003",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::R001 => "R001",
            Self::R002 => "R002",
            Self::R003 => "R003",
            Self::R004 => "R004",
            Self::T001 => "T001",
            Self::T002 => "T002",
            Self::T003 => "T003",
            Self::E001 => "E001",
            Self::E002 => "E002",
        }
    }

    /// Lexer and parser codes describe a line that was never turned into a command.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::L001 | Self::L002 | Self::L003 | Self::P001 | Self::P002)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positioned syntax error produced while tokenizing or parsing one line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{code}] {line}:{column} — {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self { code, line, column, message: message.into() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────

/// A failure while executing a command. Never crosses the Runtime boundary:
/// the Runtime reports it to the diagnostic sink and moves on.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{code}] line {line} — {message}")]
pub struct RuntimeError {
    pub code: ErrorCode,
    pub line: usize,
    pub message: String,
}

impl RuntimeError {
    pub fn new(code: ErrorCode, line: usize, message: impl Into<String>) -> Self {
        Self { code, line, message: message.into() }
    }

    pub fn unknown_entity(line: usize, name: &str) -> Self {
        Self::new(ErrorCode::R001, line, format!("Entity \"{name}\" not found"))
    }

    pub fn unknown_variable(line: usize, name: &str) -> Self {
        Self::new(ErrorCode::R002, line, format!("Variable \"{name}\" is not defined"))
    }
}
