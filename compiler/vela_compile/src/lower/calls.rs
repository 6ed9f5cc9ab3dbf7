//! Calls and function selectors.
//!
//! `f(args)` is one of:
//! - a built-in call, typed by instantiating one of its signatures;
//! - a direct call of a module function, by index into the run's table;
//! - an indirect call of a function value;
//! - a restriction `collection(predicate)`, pushed down to the repository
//!   when the collection is a module variable.

use std::sync::Arc;

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{ExprId, ExprKind, FunctionSelector, MemberKind, ParsedTypeId};
use vela_ir::Span;
use vela_plan::{MemberRef, Resolved, SymbolKind};
use vela_runtime::builtins::{self, Builtin, BuiltinCall, BuiltinId};
use vela_runtime::{Env, FunctionValue, RuntimeError, Value};
use vela_stack::ensure_sufficient_stack;
use vela_types::{Instance, SignatureError, Type};

use super::{internal, Compiler};
use crate::code::{at, code, Code, Compiled};
use crate::members::MemberEntry;
use crate::scope::Binding;

impl Compiler<'_> {
    pub(super) fn compile_call(
        &mut self,
        id: ExprId,
        callee: ExprId,
        type_args: &[ParsedTypeId],
        args: &[ExprId],
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        if let Some(symbol) = self.callee_symbol(callee) {
            match symbol {
                SymbolKind::Builtin(builtin) => {
                    return self.compile_builtin_call(builtin, type_args, args, span);
                }
                SymbolKind::Member(member) if type_args.is_empty() => {
                    if let Some(call) = self.compile_member_call(id, member, args, span)? {
                        return Ok(call);
                    }
                }
                _ => {}
            }
        }
        if !type_args.is_empty() {
            return Err(Diagnostic::error(ErrorCode::E3002)
                .with_message("only built-in functions take type arguments")
                .with_label(span, "unexpected type arguments"));
        }
        let target = self.compile_expr(callee)?;
        match target.ty.clone() {
            Type::Set(_) | Type::List(_) => match args {
                [predicate] => self.compile_restrict(id, target, *predicate, span),
                _ => Err(Diagnostic::error(ErrorCode::E3009)
                    .with_message("a restriction takes exactly one predicate")
                    .with_label(span, format!("{} arguments given", args.len()))),
            },
            Type::Function(func) => {
                let values = self.compile_args(&func.params, args, span)?;
                let callee = target.code;
                let eval = code(move |env| match callee(env)? {
                    Value::Function(f) => {
                        let args = evaluate(&values, env)?;
                        f.call(env.run, args)
                    }
                    other => Err(RuntimeError::invalid_argument(format!(
                        "cannot call {other}"
                    ))),
                });
                Ok(Compiled::new(at(eval, span), func.ret.clone()))
            }
            other => Err(Diagnostic::error(ErrorCode::E3004)
                .with_message(format!("a value of type `{other}` cannot be called"))
                .with_label(self.span(callee), "not a function")),
        }
    }

    /// The global symbol a plain identifier callee names, unless an
    /// active element scope binds that name.
    fn callee_symbol(&self, callee: ExprId) -> Option<SymbolKind> {
        let ExprKind::Ident(name) = &self.arena.get(callee).kind else {
            return None;
        };
        let symbol = match self.plan.resolution(callee)? {
            Resolved::Symbol(symbol) => *symbol,
            Resolved::Member { scopes, fallback } => {
                if self.scope_binds(scopes, name) {
                    return None;
                }
                (*fallback)?
            }
        };
        Some(self.plan.symbol(symbol).kind.clone())
    }

    /// Calls that can be bound statically: module functions and
    /// restrictions of module variables. `None` falls back to the
    /// general path.
    fn compile_member_call(
        &mut self,
        id: ExprId,
        member: MemberRef,
        args: &[ExprId],
        span: Span,
    ) -> Result<Option<Compiled>, Diagnostic> {
        let plan = self.plan;
        match &plan.member(member).kind {
            MemberKind::Variable(_) => {
                let MemberEntry::Variable { repository, ty } = self.member_entry(member, span)?
                else {
                    return Err(internal("variable member without storage"));
                };
                match (args, ty.element()) {
                    ([predicate], Some(_)) => self
                        .compile_stored_restrict(id, repository, ty, *predicate, span)
                        .map(Some),
                    _ => Ok(None),
                }
            }
            MemberKind::Function(_) => {
                let MemberEntry::Function { index, ty } = self.member_entry(member, span)? else {
                    return Err(internal("function member without an index"));
                };
                let Some(func) = ty.as_function() else {
                    return Err(internal("function member without a function type"));
                };
                let values = self.compile_args(&func.params, args, span)?;
                let eval = code(move |env| {
                    let args = evaluate(&values, env)?;
                    let run = env.run;
                    let f = run
                        .function(index)
                        .ok_or_else(|| RuntimeError::host("module function missing"))?;
                    f.call(run, args)
                });
                Ok(Some(Compiled::new(at(eval, span), func.ret.clone())))
            }
            _ => Ok(None),
        }
    }

    /// Compile `args` against `params`: arity must match and every
    /// argument must convert to its parameter type.
    fn compile_args(
        &mut self,
        params: &[Type],
        args: &[ExprId],
        span: Span,
    ) -> Result<Vec<Code>, Diagnostic> {
        if params.len() != args.len() {
            return Err(Diagnostic::error(ErrorCode::E3009)
                .with_message(format!(
                    "expected {} argument(s), found {}",
                    params.len(),
                    args.len()
                ))
                .with_label(span, "wrong number of arguments"));
        }
        params
            .iter()
            .zip(args)
            .map(|(param, &arg)| self.compile_as(arg, param))
            .collect()
    }

    fn compile_builtin_call(
        &mut self,
        id: BuiltinId,
        type_args: &[ParsedTypeId],
        args: &[ExprId],
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let builtin = builtins::get(id).ok_or_else(|| internal("unknown built-in"))?;
        let explicit = type_args
            .iter()
            .map(|&ty| self.resolve_type(ty))
            .collect::<Result<Vec<_>, _>>()?;
        let compiled = args
            .iter()
            .map(|&arg| self.compile_expr(arg))
            .collect::<Result<Vec<_>, _>>()?;
        let arg_types: Vec<Type> = compiled.iter().map(|c| c.ty.clone()).collect();

        let mut failures = Vec::new();
        for signature in &builtin.signatures {
            match signature.instantiate(&explicit, &arg_types) {
                Ok(instance) => return self.emit_builtin(builtin, instance, compiled, args, span),
                Err(error) => failures.push(error),
            }
        }
        Err(overload_error(builtin, &arg_types, &failures, span))
    }

    fn emit_builtin(
        &self,
        builtin: &'static Builtin,
        instance: Instance,
        compiled: Vec<Compiled>,
        args: &[ExprId],
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let mut values = Vec::with_capacity(compiled.len());
        for ((arg, param), &id) in compiled.into_iter().zip(&instance.params).zip(args) {
            values.push(self.coerce(arg, param, self.span(id))?);
        }
        let func = builtin.func;
        let type_args: Arc<[Type]> = instance.type_args.into();
        let eval = code(move |env| {
            let args = evaluate(&values, env)?;
            func(&BuiltinCall {
                args,
                type_args: &type_args,
                run: env.run,
            })
        });
        Ok(Compiled::new(at(eval, span), instance.ret))
    }

    pub(super) fn compile_function_selector(
        &mut self,
        id: ExprId,
        func: &FunctionSelector,
    ) -> Result<Compiled, Diagnostic> {
        let plan = self.plan;
        let params = plan.params(id);
        let param_types = func
            .params
            .iter()
            .map(|p| self.resolve_type(p.ty))
            .collect::<Result<Vec<_>, _>>()?;
        let ret = func.ret.map(|ret| self.resolve_type(ret)).transpose()?;

        self.contexts.push();
        let body = self.compile_body(params, &param_types, ret.as_ref(), func.body);
        let context = self.contexts.pop();
        let (body, ret) = body?;

        let size = context.frame_size();
        let captures = context.into_captures();
        let eval = code(move |env| {
            let captured: Vec<(usize, Value)> =
                captures.iter().map(|c| (c.to, env.get(c.from))).collect();
            let body = Arc::clone(&body);
            Ok(Value::Function(FunctionValue::new(move |run, args| {
                run.check_cancelled()?;
                let mut inner = Env::with_prefix(run, size, args);
                for (slot, value) in &captured {
                    inner.set(*slot, value.clone());
                }
                ensure_sufficient_stack(|| body(&mut inner))
            })))
        });
        Ok(Compiled::new(eval, Type::function(param_types, ret)))
    }

    /// Declare `params` in the innermost context and compile `body`,
    /// converting it to `ret` when one is declared.
    pub(crate) fn compile_body(
        &mut self,
        params: &[vela_plan::SymbolId],
        param_types: &[Type],
        ret: Option<&Type>,
        body: ExprId,
    ) -> Result<(Code, Type), Diagnostic> {
        for (&symbol, ty) in params.iter().zip(param_types) {
            self.declare(Binding::Symbol(symbol), ty.clone());
        }
        let compiled = self.compile_expr(body)?;
        match ret {
            Some(ret) => Ok((self.coerce(compiled, ret, self.span(body))?, ret.clone())),
            None => Ok((compiled.code, compiled.ty)),
        }
    }
}

fn evaluate(codes: &[Code], env: &mut Env<'_>) -> Result<Vec<Value>, RuntimeError> {
    let mut values = Vec::with_capacity(codes.len());
    for code in codes {
        values.push(code(env)?);
    }
    Ok(values)
}

fn overload_error(
    builtin: &Builtin,
    arg_types: &[Type],
    failures: &[SignatureError],
    span: Span,
) -> Diagnostic {
    let shown: Vec<String> = arg_types.iter().map(ToString::to_string).collect();
    let arity = !failures.is_empty()
        && failures.iter().all(|f| {
            matches!(f, SignatureError::Arity { .. } | SignatureError::TypeArgCount { .. })
        });
    let code = if arity {
        ErrorCode::E3009
    } else {
        ErrorCode::E3002
    };
    let mut diagnostic = Diagnostic::error(code)
        .with_message(format!(
            "no overload of `{}` accepts ({})",
            builtin.name,
            shown.join(", ")
        ))
        .with_label(span, "in this call");
    for failure in failures {
        diagnostic = diagnostic.with_note(failure.to_string());
    }
    diagnostic
}
