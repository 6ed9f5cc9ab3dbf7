//! Terms: literals, identifiers, selectors and the keyword-led forms.

use smallvec::SmallVec;
use vela_diagnostic::ErrorCode;
use vela_ir::ast::{
    CaseArm, CaseExpr, ExprId, ExprKind, FunctionSelector, KeyDecl, Param, RefDecl, TupleAttr,
    TupleSelector,
};
use vela_ir::{Literal, TokenKind};

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Dispatch on the current token to the matching term.
    pub(crate) fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        match self.cursor.current_kind() {
            TokenKind::Literal(lit) => {
                self.cursor.advance();
                Ok(self.alloc(ExprKind::Literal(lit), start))
            }
            TokenKind::True | TokenKind::False => {
                let value = self.cursor.check(&TokenKind::True);
                self.cursor.advance();
                Ok(self.alloc(ExprKind::Literal(Literal::Boolean(value)), start))
            }
            TokenKind::Null => {
                self.cursor.advance();
                Ok(self.alloc(ExprKind::Null, start))
            }
            TokenKind::Ident(_) | TokenKind::Backslash => {
                let (name, _) = self.parse_qualified_name()?;
                Ok(self.alloc(ExprKind::Ident(name), start))
            }
            TokenKind::LParen if self.at_function_selector() => {
                let func = self
                    .parse_function_selector()
                    .map_err(|e| e.in_context("a function selector"))?;
                Ok(self.alloc(ExprKind::Function(Box::new(func)), start))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                self.cursor.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let items = self.parse_items(&TokenKind::RBracket)?;
                Ok(self.alloc(ExprKind::List(items), start))
            }
            TokenKind::LBrace => self.parse_brace_selector(),
            TokenKind::If => self.parse_if(),
            TokenKind::Case => self.parse_case().map_err(|e| e.in_context("a case expression")),
            TokenKind::Try => self.parse_try(),
            TokenKind::For
            | TokenKind::Let
            | TokenKind::Where
            | TokenKind::Order
            | TokenKind::Return => self
                .parse_clause()
                .map_err(|e| e.in_context("a clause expression")),
            TokenKind::Eof => Err(self.cursor.end_of_input()),
            other => Err(ParseError::new(
                ErrorCode::E1002,
                format!("expected expression, found {other}"),
                start,
            )),
        }
    }

    /// Expressions up to `close`, with optional comma separators.
    fn parse_items(&mut self, close: &TokenKind) -> Result<vela_ir::ExprRange, ParseError> {
        let mut items: SmallVec<[ExprId; 8]> = SmallVec::new();
        while !self.cursor.eat(close) {
            if self.cursor.is_at_end() {
                return Err(self.cursor.unexpected(close.describe()));
            }
            items.push(self.parse_expr()?);
            self.cursor.eat(&TokenKind::Comma);
        }
        Ok(self.arena.alloc_list(items))
    }

    /// `{:}` / `{name: ...}` are tuples; anything else in braces is a set.
    fn parse_brace_selector(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(&TokenKind::LBrace)?.span;
        let is_tuple = self.cursor.check(&TokenKind::Colon)
            || (self.cursor.check_ident() && matches!(self.cursor.peek_kind(1), TokenKind::Colon))
            || self.cursor.check(&TokenKind::Key)
            || self.cursor.check(&TokenKind::Ref);
        if !is_tuple {
            let items = self.parse_items(&TokenKind::RBrace)?;
            return Ok(self.alloc(ExprKind::Set(items), start));
        }

        if self.cursor.eat(&TokenKind::Colon) {
            self.cursor.expect(&TokenKind::RBrace)?;
            return Ok(self.alloc(ExprKind::Tuple(Box::default()), start));
        }

        let mut tuple = TupleSelector::default();
        loop {
            match self.cursor.current_kind() {
                TokenKind::RBrace => {
                    self.cursor.advance();
                    break;
                }
                TokenKind::Key => tuple.keys.push(self.parse_key_decl()?),
                TokenKind::Ref => tuple.refs.push(self.parse_ref_decl()?),
                TokenKind::Eof => return Err(self.cursor.unexpected("`}`")),
                _ => {
                    let attr_start = self.cursor.current_span();
                    let name = if self.cursor.check_ident()
                        && matches!(self.cursor.peek_kind(1), TokenKind::Colon)
                    {
                        let name = self.cursor.expect_ident()?;
                        self.cursor.advance();
                        Some(name)
                    } else {
                        None
                    };
                    let value = self.parse_expr()?;
                    tuple.attrs.push(TupleAttr {
                        name,
                        value,
                        span: attr_start.merge(self.cursor.previous_span()),
                    });
                }
            }
            self.cursor.eat(&TokenKind::Comma);
        }
        Ok(self.alloc(ExprKind::Tuple(Box::new(tuple)), start))
    }

    /// `key { a b }`
    pub(crate) fn parse_key_decl(&mut self) -> Result<KeyDecl, ParseError> {
        let start = self.cursor.expect(&TokenKind::Key)?.span;
        let attrs = self.parse_ident_group()?;
        Ok(KeyDecl {
            attrs,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `ref Name { a } Target { b }`
    pub(crate) fn parse_ref_decl(&mut self) -> Result<RefDecl, ParseError> {
        let start = self.cursor.expect(&TokenKind::Ref)?.span;
        let name = self.cursor.expect_ident()?;
        let source = self.parse_ident_group()?;
        let (target, target_span) = self.parse_qualified_name()?;
        let target_attrs = self.parse_ident_group()?;
        Ok(RefDecl {
            name,
            source,
            target,
            target_span,
            target_attrs,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn parse_ident_group(&mut self) -> Result<Vec<vela_ir::ast::Ident>, ParseError> {
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut names = Vec::new();
        while !self.cursor.eat(&TokenKind::RBrace) {
            names.push(self.cursor.expect_ident()?);
            self.cursor.eat(&TokenKind::Comma);
        }
        Ok(names)
    }

    /// `(` followed by `)` (not a function type) or by `name :`.
    pub(crate) fn at_function_selector(&self) -> bool {
        if !self.cursor.check(&TokenKind::LParen) {
            return false;
        }
        match (self.cursor.peek_kind(1), self.cursor.peek_kind(2)) {
            (TokenKind::RParen, TokenKind::Arrow) => false,
            (TokenKind::RParen, _) => true,
            (TokenKind::Ident(_), TokenKind::Colon) => true,
            _ => false,
        }
    }

    /// `(p: T, ...) [: R] [=>] body`
    pub(crate) fn parse_function_selector(&mut self) -> Result<FunctionSelector, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.cursor.eat(&TokenKind::RParen) {
            let name = self.cursor.expect_ident()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let ty = self.parse_type()?;
            params.push(Param { name, ty });
            self.cursor.eat(&TokenKind::Comma);
        }
        let ret = if self.cursor.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.cursor.eat(&TokenKind::FatArrow);
        let body = self.parse_expr()?;
        Ok(FunctionSelector { params, ret, body })
    }

    /// `if c then a else b`
    fn parse_if(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(&TokenKind::If)?.span;
        let cond = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Then)?;
        let then_branch = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Else)?;
        let else_branch = self.parse_expr()?;
        Ok(self.alloc(
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            },
            start,
        ))
    }

    /// `case [subject] (when w then t)+ [else e] end`
    fn parse_case(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(&TokenKind::Case)?.span;
        let subject = if self.cursor.check(&TokenKind::When) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let mut arms = Vec::new();
        while self.cursor.eat(&TokenKind::When) {
            let when = self.parse_expr()?;
            self.cursor.expect(&TokenKind::Then)?;
            let then = self.parse_expr()?;
            arms.push(CaseArm { when, then });
        }
        if arms.is_empty() {
            return Err(self.cursor.unexpected("`when`"));
        }
        let else_branch = if self.cursor.eat(&TokenKind::Else) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.cursor.expect(&TokenKind::End)?;
        Ok(self.alloc(
            ExprKind::Case(Box::new(CaseExpr {
                subject,
                arms,
                else_branch,
            })),
            start,
        ))
    }

    /// `try body catch handler`
    fn parse_try(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(&TokenKind::Try)?.span;
        let body = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Catch)?;
        let handler = self.parse_expr()?;
        Ok(self.alloc(ExprKind::Try { body, handler }, start))
    }
}
