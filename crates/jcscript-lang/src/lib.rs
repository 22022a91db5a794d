pub mod syntax;
pub mod runtime;
pub mod host;
pub mod error;

pub use error::{Error, ErrorCode, RuntimeError};
pub use host::{
    Asset, AssetKind, AssetLibrary, AssetProvider, Diagnostic, DiagnosticSink, Diagnostics,
    DrawCommand, DrawList, DrawingSurface, Level,
};
pub use runtime::color::Color;
pub use runtime::entity::Entity;
pub use runtime::{HostEvent, Phase, Runtime, RuntimeConfig};
pub use syntax::ast::{Command, Script, Statement, Unrecognized};
pub use syntax::token::{Token, TokenKind};

// ─── Public API ──────────────────────────────────────────────────────────────

/// Parse script text line by line. Never fails: lines that match no command
/// form are listed in `Script::unrecognized` and otherwise ignored.
///
/// ```
/// let script = jcscript_lang::compile("let score = 0\nadd score 5");
/// let mut rt = jcscript_lang::Runtime::new(script);
/// rt.setup();
/// assert_eq!(rt.variable("score"), Some(5.0));
/// ```
pub fn compile(source: &str) -> Script {
    syntax::parser::parse_script(source)
}
