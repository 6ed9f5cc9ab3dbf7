//! Recursive-descent parser for Vela scripts.
//!
//! The expression grammar is an explicit precedence cascade, lowest
//! binding first:
//!
//! ```text
//! connector   in or xor like matches ifnull
//! and         and
//! bitwise     & | ^ << >>
//! comparison  = <> < <= > >= ?=
//! additive    + -
//! multiply    * / %
//! interval    ..
//! exponent    **
//! unary       not - ~ exists isnull ++
//! postfix     .member  [index]  (call)  <T>(call)
//! ```
//!
//! Each level is left-associative and produces a single n-ary
//! [`ExprKind::Binary`](vela_ir::ast::ExprKind::Binary) node holding all of
//! its operands, rather than a nested binary tree.

mod cursor;
mod error;
mod grammar;

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{Expr, ExprArena, ExprId, ExprKind, ModuleDecl, Script};
use vela_ir::{Span, StringInterner, TokenList};

use cursor::Cursor;
pub use error::ParseError;

/// Parser configuration.
#[derive(Copy, Clone, Debug)]
pub struct ParseOptions {
    /// Require the whole input to be consumed.
    pub strict: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { strict: true }
    }
}

/// Parse a lexed script.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn parse(
    source: &str,
    tokens: &TokenList,
    options: ParseOptions,
) -> Result<Script, ParseError> {
    let mut parser = Parser::new(source, tokens, ExprArena::new());
    let script = parser.parse_script(options)?;
    tracing::debug!(exprs = script.arena.expr_count(), "parsed script");
    Ok(script)
}

/// Lex and parse `source` in one step.
pub fn parse_source(
    source: &str,
    interner: &StringInterner,
    options: ParseOptions,
) -> Result<Script, Diagnostic> {
    let tokens = vela_lexer::lex(source, interner)?;
    parse(source, &tokens, options).map_err(Diagnostic::from)
}

/// Parse module declarations from `source` into an existing arena.
///
/// Used to bring catalog modules into the arena of the script that
/// imports them, so every node a compilation touches shares one id space.
/// Spans of the returned declarations refer to `source`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_modules(
    source: &str,
    interner: &StringInterner,
    arena: &mut ExprArena,
) -> Result<Vec<ModuleDecl>, Diagnostic> {
    let tokens = vela_lexer::lex(source, interner)?;
    let mut parser = Parser::new(source, &tokens, std::mem::take(arena));
    let parsed = parser.parse_module_list();
    *arena = std::mem::take(&mut parser.arena);
    parsed.map_err(Diagnostic::from)
}

pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    source: &'a str,
    arena: ExprArena,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: &'a TokenList, arena: ExprArena) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            source,
            arena,
        }
    }

    /// Allocate an expression spanning from `start` to the last consumed
    /// token.
    fn alloc(&mut self, kind: ExprKind, start: Span) -> ExprId {
        let span = start.merge(self.cursor.previous_span());
        self.arena.alloc(Expr::new(kind, span))
    }

    fn span_of(&self, id: ExprId) -> Span {
        self.arena.get(id).span
    }

    fn trailing_input(&self) -> ParseError {
        ParseError::new(
            ErrorCode::E1005,
            format!("unexpected {} after end of script", self.cursor.current_kind()),
            self.cursor.current_span(),
        )
    }
}

#[cfg(test)]
mod tests;
