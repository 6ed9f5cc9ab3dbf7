//! Intermediate representation for the Vela query processor.
//!
//! Everything the front-end phases share lives here:
//!
//! - [`Span`]: byte ranges into the script text
//! - [`Name`] and [`StringInterner`]: interned identifiers
//! - [`QualifiedName`]: `\`-separated, optionally rooted identifiers
//! - [`Token`], [`TokenKind`], [`TokenList`]: lexer output
//! - [`Literal`], [`VersionNumber`]: literal payloads
//! - [`ast`]: the arena-allocated syntax tree produced by the parser
//!
//! AST nodes are addressed by [`ExprId`]; later passes key their side
//! tables by id rather than by structural equality.

pub mod ast;
mod interner;
pub mod literal;
mod name;
mod qualified;
mod span;
mod token;

pub use ast::{ExprArena, ExprId, ExprRange, ParsedTypeId};
pub use interner::{SharedInterner, StringInterner};
pub use literal::{Literal, VersionNumber};
pub use name::Name;
pub use qualified::QualifiedName;
pub use span::Span;
pub use token::{Token, TokenKind, TokenList};
