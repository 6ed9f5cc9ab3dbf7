//! Clause expressions: `for* let* [where] [order(..)] return`.

use vela_diagnostic::ErrorCode;
use vela_ir::ast::{Clause, ExprId, ExprKind, ForClause, LetClause, OrderDim};
use vela_ir::TokenKind;

use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_clause(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();

        let mut fors = Vec::new();
        while self.cursor.eat(&TokenKind::For) {
            let var = self.cursor.expect_ident()?;
            self.cursor.expect(&TokenKind::In)?;
            let source = self.parse_expr()?;
            fors.push(ForClause { var, source });
        }

        let mut lets = Vec::new();
        while self.cursor.eat(&TokenKind::Let) {
            let var = self.cursor.expect_ident()?;
            self.cursor.expect(&TokenKind::ColonEq)?;
            let value = self.parse_expr()?;
            lets.push(LetClause { var, value });
        }

        let filter = if self.cursor.eat(&TokenKind::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut order = Vec::new();
        if self.cursor.check(&TokenKind::Order) {
            let order_span = self.cursor.advance().span;
            if fors.is_empty() {
                return Err(ParseError::new(
                    ErrorCode::E1007,
                    "`order` needs at least one `for` to order over",
                    order_span,
                ));
            }
            self.cursor.expect(&TokenKind::LParen)?;
            while !self.cursor.eat(&TokenKind::RParen) {
                if self.cursor.is_at_end() {
                    return Err(self.cursor.unexpected("`)`"));
                }
                let expr = self.parse_expr()?;
                let descending = if self.cursor.eat(&TokenKind::Desc) {
                    true
                } else {
                    self.cursor.eat(&TokenKind::Asc);
                    false
                };
                order.push(OrderDim { expr, descending });
                self.cursor.eat(&TokenKind::Comma);
            }
        }

        if !self.cursor.check(&TokenKind::Return) {
            if self.cursor.is_at_end() {
                return Err(self.cursor.unexpected("`return`"));
            }
            return Err(ParseError::new(
                ErrorCode::E1007,
                format!(
                    "a clause expression must end in `return`, found {}",
                    self.cursor.current_kind()
                ),
                self.cursor.current_span(),
            ));
        }
        self.cursor.advance();
        let body = self.parse_expr()?;

        Ok(self.alloc(
            ExprKind::Clause(Box::new(Clause {
                fors,
                lets,
                filter,
                order,
                body,
            })),
            start,
        ))
    }
}
