//! Operator lowering.
//!
//! A binary chain `a op1 b op2 c` of one precedence level folds to the
//! left. `and`/`or` skip their right operand once the result is known,
//! and `ifnull` only evaluates its right operand when the left is `null`.

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{BinaryOp, ExprId, UnaryOp};
use vela_ir::Span;
use vela_runtime::{ops, Value};
use vela_types::Type;

use super::{internal, Compiler};
use crate::code::{at, code, eval_bool, Compiled};

impl Compiler<'_> {
    pub(super) fn compile_binary(
        &mut self,
        operands: &[ExprId],
        ops: &[BinaryOp],
    ) -> Result<Compiled, Diagnostic> {
        let Some((&first, rest)) = operands.split_first() else {
            return Err(internal("binary chain without operands"));
        };
        let mut acc = self.compile_expr(first)?;
        let mut acc_span = self.span(first);
        for (&op, &operand) in ops.iter().zip(rest) {
            let right = self.compile_expr(operand)?;
            acc_span = acc_span.merge(self.span(operand));
            acc = self.apply_binary(op, acc, right, acc_span)?;
        }
        Ok(acc)
    }

    fn apply_binary(
        &mut self,
        op: BinaryOp,
        left: Compiled,
        right: Compiled,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let Some(sig) = vela_types::binary(op, &left.ty, &right.ty) else {
            return Err(unsupported_binary(op, &left.ty, &right.ty, span));
        };
        let l = self.coerce(left, &sig.left, span)?;
        let r = self.coerce(right, &sig.right, span)?;
        let eval = match op {
            BinaryOp::And => code(move |env| {
                Ok(Value::Boolean(eval_bool(&l, env)? && eval_bool(&r, env)?))
            }),
            BinaryOp::Or => code(move |env| {
                Ok(Value::Boolean(eval_bool(&l, env)? || eval_bool(&r, env)?))
            }),
            BinaryOp::IfNull => code(move |env| {
                let value = l(env)?;
                if value.is_null() {
                    r(env)
                } else {
                    Ok(value)
                }
            }),
            BinaryOp::Interval => code(move |env| {
                let from = l(env)?;
                let to = r(env)?;
                ops::interval(&from, &to, env.run)
            }),
            _ => code(move |env| {
                let a = l(env)?;
                let b = r(env)?;
                ops::binary(op, &a, &b)
            }),
        };
        Ok(Compiled::new(at(eval, span), sig.result))
    }

    pub(super) fn compile_unary(
        &mut self,
        op: UnaryOp,
        operand: ExprId,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let inner = self.compile_expr(operand)?;
        let Some(sig) = vela_types::unary(op, &inner.ty) else {
            return Err(Diagnostic::error(ErrorCode::E3001)
                .with_message(format!(
                    "operator `{}` is not supported for `{}`",
                    op.as_symbol(),
                    inner.ty
                ))
                .with_label(span, "unsupported operator"));
        };
        let value = self.coerce(inner, &sig.operand, span)?;
        let eval = code(move |env| {
            let v = value(env)?;
            ops::unary(op, &v)
        });
        Ok(Compiled::new(at(eval, span), sig.result))
    }
}

fn unsupported_binary(op: BinaryOp, left: &Type, right: &Type, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3001)
        .with_message(format!(
            "operator `{}` is not supported for `{left}` and `{right}`",
            op.as_symbol()
        ))
        .with_label(span, "unsupported operator")
}
