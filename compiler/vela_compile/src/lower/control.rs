//! `if`, `case` and `try`.

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{BinaryOp, CaseExpr, ExprId};
use vela_ir::Span;
use vela_runtime::{convert, ops, Value};
use vela_types::{common_type, conversion, Conversion, Type};

use super::{internal, type_mismatch, Compiler};
use crate::code::{at, code, eval_bool, Code, Compiled};

/// One `when` of a `case` with a subject.
struct Comparison {
    subject: Conversion,
    when: Code,
    then: Code,
}

impl Compiler<'_> {
    pub(super) fn compile_if(
        &mut self,
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let cond = self.compile_as(cond, &Type::Boolean)?;
        let then = self.compile_expr(then_branch)?;
        let otherwise = self.compile_expr(else_branch)?;
        let ty = self.branch_type(&then.ty, &otherwise.ty, self.span(else_branch))?;
        let then = self.coerce(then, &ty, self.span(then_branch))?;
        let otherwise = self.coerce(otherwise, &ty, self.span(else_branch))?;
        let eval = code(move |env| {
            if eval_bool(&cond, env)? {
                then(env)
            } else {
                otherwise(env)
            }
        });
        Ok(Compiled::new(at(eval, span), ty))
    }

    pub(super) fn compile_case(
        &mut self,
        case: &CaseExpr,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let subject = case.subject.map(|s| self.compile_expr(s)).transpose()?;
        let mut whens = Vec::with_capacity(case.arms.len());
        let mut thens = Vec::with_capacity(case.arms.len());
        for arm in &case.arms {
            let when = self.compile_expr(arm.when)?;
            let when_span = self.span(arm.when);
            let when = match &subject {
                Some(subject) => {
                    let Some(sig) = vela_types::binary(BinaryOp::Eq, &subject.ty, &when.ty) else {
                        return Err(Diagnostic::error(ErrorCode::E3001)
                            .with_message(format!(
                                "cannot compare `{}` with `{}`",
                                subject.ty, when.ty
                            ))
                            .with_label(when_span, "in this `when`"));
                    };
                    let convert_subject = conversion(&subject.ty, &sig.left)
                        .ok_or_else(|| internal("equality operand without a conversion"))?;
                    (Some(convert_subject), self.coerce(when, &sig.right, when_span)?)
                }
                None => (None, self.coerce(when, &Type::Boolean, when_span)?),
            };
            whens.push(when);
            thens.push(self.compile_expr(arm.then)?);
        }
        let otherwise = case.else_branch.map(|e| self.compile_expr(e)).transpose()?;

        let mut ty = match thens.first() {
            Some(first) => first.ty.clone(),
            None => return Err(internal("case without arms")),
        };
        for (then, arm) in thens.iter().zip(&case.arms).skip(1) {
            ty = self.branch_type(&ty, &then.ty, self.span(arm.then))?;
        }
        ty = match (&otherwise, case.else_branch) {
            (Some(otherwise), Some(id)) => self.branch_type(&ty, &otherwise.ty, self.span(id))?,
            _ => Type::optional(ty),
        };

        let mut arms = Vec::with_capacity(thens.len());
        for ((then, (subject_conv, when)), arm) in thens.into_iter().zip(whens).zip(&case.arms) {
            let then = self.coerce(then, &ty, self.span(arm.then))?;
            arms.push((subject_conv, when, then));
        }
        let otherwise = match (otherwise, case.else_branch) {
            (Some(otherwise), Some(id)) => Some(self.coerce(otherwise, &ty, self.span(id))?),
            _ => None,
        };

        let eval = match subject {
            Some(subject) => {
                let mut comparisons = Vec::with_capacity(arms.len());
                for (conv, when, then) in arms {
                    let subject = conv.ok_or_else(|| internal("case arm without a subject"))?;
                    comparisons.push(Comparison {
                        subject,
                        when,
                        then,
                    });
                }
                let subject = subject.code;
                code(move |env| {
                    let value = subject(env)?;
                    for arm in &comparisons {
                        let when = (arm.when)(env)?;
                        let left = convert(value.clone(), &arm.subject);
                        if ops::binary(BinaryOp::Eq, &left, &when)? == Value::Boolean(true) {
                            return (arm.then)(env);
                        }
                    }
                    match &otherwise {
                        Some(otherwise) => otherwise(env),
                        None => Ok(Value::Null),
                    }
                })
            }
            None => {
                let arms: Vec<(Code, Code)> =
                    arms.into_iter().map(|(_, when, then)| (when, then)).collect();
                code(move |env| {
                    for (when, then) in &arms {
                        if eval_bool(when, env)? {
                            return then(env);
                        }
                    }
                    match &otherwise {
                        Some(otherwise) => otherwise(env),
                        None => Ok(Value::Null),
                    }
                })
            }
        };
        Ok(Compiled::new(at(eval, span), ty))
    }

    /// `try body catch handler`: the handler runs when `body` raises a
    /// catchable fault. Cancellation and limit faults pass through.
    pub(super) fn compile_try(
        &mut self,
        body: ExprId,
        handler: ExprId,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let guarded = self.compile_expr(body)?;
        let fallback = self.compile_expr(handler)?;
        let ty = self.branch_type(&guarded.ty, &fallback.ty, self.span(handler))?;
        let guarded = self.coerce(guarded, &ty, self.span(body))?;
        let fallback = self.coerce(fallback, &ty, self.span(handler))?;
        let eval = code(move |env| match guarded(env) {
            Err(error) if error.is_catchable() => {
                tracing::debug!(%error, "caught runtime error");
                fallback(env)
            }
            result => result,
        });
        Ok(Compiled::new(at(eval, span), ty))
    }

    fn branch_type(&self, a: &Type, b: &Type, span: Span) -> Result<Type, Diagnostic> {
        common_type(a, b).ok_or_else(|| {
            type_mismatch(span, a, b)
                .with_note(format!("branches must share a type; found `{a}` and `{b}`"))
        })
    }
}
