//! Binary precedence cascade, unary operators and postfix forms.

use smallvec::SmallVec;
use vela_ir::ast::{BinaryOp, ExprId, ExprKind, Precedence, UnaryOp};
use vela_ir::TokenKind;
use vela_stack::ensure_sufficient_stack;

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse a full expression.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_connector())
    }

    /// `in or xor like matches ifnull`
    fn parse_connector(&mut self) -> Result<ExprId, ParseError> {
        self.binary_level(Precedence::Connector, Self::parse_and)
    }

    /// `and`
    fn parse_and(&mut self) -> Result<ExprId, ParseError> {
        self.binary_level(Precedence::And, Self::parse_bitwise)
    }

    /// `& | ^ << >>`
    fn parse_bitwise(&mut self) -> Result<ExprId, ParseError> {
        self.binary_level(Precedence::Bitwise, Self::parse_comparison)
    }

    /// `= <> < <= > >= ?=`
    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        self.binary_level(Precedence::Comparison, Self::parse_additive)
    }

    /// `+ -`
    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        self.binary_level(Precedence::Additive, Self::parse_multiplicative)
    }

    /// `* / %`
    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        self.binary_level(Precedence::Multiplicative, Self::parse_interval)
    }

    /// `..`
    fn parse_interval(&mut self) -> Result<ExprId, ParseError> {
        self.binary_level(Precedence::Interval, Self::parse_exponent)
    }

    /// `**`
    fn parse_exponent(&mut self) -> Result<ExprId, ParseError> {
        self.binary_level(Precedence::Exponent, Self::parse_unary)
    }

    /// One left-associative level: collect every operand at this
    /// precedence into a single n-ary node.
    fn binary_level(
        &mut self,
        level: Precedence,
        operand: impl Fn(&mut Self) -> Result<ExprId, ParseError>,
    ) -> Result<ExprId, ParseError> {
        let first = operand(self)?;
        let Some(op) = self.match_binary_op(level) else {
            return Ok(first);
        };

        let start = self.span_of(first);
        let mut operands: SmallVec<[ExprId; 4]> = SmallVec::new();
        let mut ops: SmallVec<[BinaryOp; 4]> = SmallVec::new();
        operands.push(first);
        let mut next = Some(op);
        while let Some(op) = next {
            self.consume_binary_op(op);
            ops.push(op);
            operands.push(operand(self)?);
            next = self.match_binary_op(level);
        }

        let operands = self.arena.alloc_list(operands);
        let ops = self.arena.alloc_ops(ops);
        Ok(self.alloc(ExprKind::Binary { operands, ops }, start))
    }

    /// Binary operator at the current token, if it belongs to `level`.
    fn match_binary_op(&self, level: Precedence) -> Option<BinaryOp> {
        let op = match self.cursor.current_kind() {
            TokenKind::In => BinaryOp::In,
            TokenKind::Or => BinaryOp::Or,
            TokenKind::Xor => BinaryOp::Xor,
            TokenKind::Like => BinaryOp::Like,
            TokenKind::Matches => BinaryOp::Matches,
            TokenKind::IfNull => BinaryOp::IfNull,
            TokenKind::And => BinaryOp::And,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::Shl => BinaryOp::Shl,
            TokenKind::Gt if self.cursor.is_shift_right() => BinaryOp::Shr,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::QuestionEq => BinaryOp::Compare,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::DotDot => BinaryOp::Interval,
            TokenKind::StarStar => BinaryOp::Power,
            _ => return None,
        };
        (op.precedence() == level).then_some(op)
    }

    fn consume_binary_op(&mut self, op: BinaryOp) {
        self.cursor.advance();
        if op == BinaryOp::Shr {
            self.cursor.advance();
        }
    }

    /// `not - ~ exists isnull ++` followed by a postfix expression.
    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        let op = match self.cursor.current_kind() {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Exists => UnaryOp::Exists,
            TokenKind::IsNull => UnaryOp::IsNull,
            TokenKind::Plus if self.cursor.is_successor() => {
                self.cursor.advance();
                UnaryOp::Successor
            }
            _ => return self.parse_postfix(),
        };
        self.cursor.advance();
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        Ok(self.alloc(ExprKind::Unary { op, operand }, start))
    }

    /// A primary term followed by any number of `.member`, `[index]`,
    /// `(args)` or `<T>(args)` suffixes.
    ///
    /// Index and call brackets must touch the preceding token, so that
    /// `[a (b)]` stays a two-element list.
    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        let start = self.span_of(expr);
        loop {
            match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    let member = self.parse_primary()?;
                    expr = self.alloc(ExprKind::Deref { target: expr, member }, start);
                }
                TokenKind::LBracket if self.cursor.adjacent_to_previous() => {
                    self.cursor.advance();
                    let index = self.parse_expr()?;
                    self.cursor.expect(&TokenKind::RBracket)?;
                    expr = self.alloc(ExprKind::Index { target: expr, index }, start);
                }
                TokenKind::LParen if self.cursor.adjacent_to_previous() => {
                    let args = self.parse_call_args()?;
                    expr = self.alloc(
                        ExprKind::Call {
                            callee: expr,
                            type_args: Vec::new(),
                            args,
                        },
                        start,
                    );
                }
                TokenKind::Lt
                    if self.cursor.adjacent_to_previous()
                        && matches!(self.arena.get(expr).kind, ExprKind::Ident(_)) =>
                {
                    let Some(type_args) = self.try_parse_type_args() else {
                        return Ok(expr);
                    };
                    let args = self.parse_call_args()?;
                    expr = self.alloc(
                        ExprKind::Call {
                            callee: expr,
                            type_args,
                            args,
                        },
                        start,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `( expr [,] expr ... )`
    fn parse_call_args(&mut self) -> Result<vela_ir::ExprRange, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let mut args: SmallVec<[ExprId; 4]> = SmallVec::new();
        while !self.cursor.eat(&TokenKind::RParen) {
            if self.cursor.is_at_end() {
                return Err(self.cursor.unexpected("`)`"));
            }
            args.push(self.parse_expr()?);
            self.cursor.eat(&TokenKind::Comma);
        }
        Ok(self.arena.alloc_list(args))
    }

    /// Speculatively parse `<T, ...>` directly followed by `(`. On failure
    /// the cursor is restored and `<` is left for the comparison level.
    fn try_parse_type_args(&mut self) -> Option<Vec<vela_ir::ParsedTypeId>> {
        let snapshot = self.cursor.position();
        let parsed = (|| -> Result<Vec<vela_ir::ParsedTypeId>, ParseError> {
            self.cursor.expect(&TokenKind::Lt)?;
            let mut types = vec![self.parse_type()?];
            while self.cursor.eat(&TokenKind::Comma) {
                types.push(self.parse_type()?);
            }
            self.cursor.expect(&TokenKind::Gt)?;
            Ok(types)
        })();
        match parsed {
            Ok(types) if self.cursor.check(&TokenKind::LParen) => Some(types),
            _ => {
                self.cursor.set_position(snapshot);
                None
            }
        }
    }
}
