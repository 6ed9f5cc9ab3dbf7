//! Type expressions.

use vela_diagnostic::ErrorCode;
use vela_ir::ast::{AttrDecl, ParsedType, ParsedTypeKind, TupleTypeDecl};
use vela_ir::{ParsedTypeId, TokenKind};

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// A type followed by any number of `?`.
    pub(crate) fn parse_type(&mut self) -> Result<ParsedTypeId, ParseError> {
        let start = self.cursor.current_span();
        let mut ty = self.parse_base_type()?;
        while self.cursor.eat(&TokenKind::Question) {
            let span = start.merge(self.cursor.previous_span());
            ty = self.arena.alloc_type(ParsedType {
                kind: ParsedTypeKind::Optional(ty),
                span,
            });
        }
        Ok(ty)
    }

    fn parse_base_type(&mut self) -> Result<ParsedTypeId, ParseError> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::Ident(_) | TokenKind::Backslash => {
                ParsedTypeKind::Named(self.parse_qualified_name()?.0)
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let element = self.parse_type()?;
                self.cursor.expect(&TokenKind::RBracket)?;
                ParsedTypeKind::List(element)
            }
            TokenKind::LBrace => {
                self.cursor.advance();
                let tuple_follows = self.cursor.check(&TokenKind::Colon)
                    || self.cursor.check(&TokenKind::Key)
                    || (self.cursor.check_ident()
                        && matches!(self.cursor.peek_kind(1), TokenKind::Colon));
                if tuple_follows {
                    ParsedTypeKind::Tuple(Box::new(self.parse_tuple_type_body()?))
                } else {
                    let element = self.parse_type()?;
                    self.cursor.expect(&TokenKind::RBrace)?;
                    ParsedTypeKind::Set(element)
                }
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let mut params = Vec::new();
                while !self.cursor.eat(&TokenKind::RParen) {
                    params.push(self.parse_type()?);
                    self.cursor.eat(&TokenKind::Comma);
                }
                self.cursor.expect(&TokenKind::Arrow)?;
                let ret = self.parse_type()?;
                ParsedTypeKind::Function { params, ret }
            }
            TokenKind::Eof => return Err(self.cursor.end_of_input()),
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1004,
                    format!("expected type, found {other}"),
                    start,
                ))
            }
        };
        Ok(self.arena.alloc_type(ParsedType {
            kind,
            span: start.merge(self.cursor.previous_span()),
        }))
    }

    /// After `{`: `:}` or `name: T ... key{..} ref ..}`.
    fn parse_tuple_type_body(&mut self) -> Result<TupleTypeDecl, ParseError> {
        let mut decl = TupleTypeDecl::default();
        if self.cursor.eat(&TokenKind::Colon) {
            self.cursor.expect(&TokenKind::RBrace)?;
            return Ok(decl);
        }
        loop {
            match self.cursor.current_kind() {
                TokenKind::RBrace => {
                    self.cursor.advance();
                    return Ok(decl);
                }
                TokenKind::Key => decl.keys.push(self.parse_key_decl()?),
                TokenKind::Ref => decl.refs.push(self.parse_ref_decl()?),
                _ => {
                    let name = self.cursor.expect_ident()?;
                    self.cursor.expect(&TokenKind::Colon)?;
                    let ty = self.parse_type()?;
                    decl.attrs.push(AttrDecl { name, ty });
                }
            }
            self.cursor.eat(&TokenKind::Comma);
        }
    }
}
