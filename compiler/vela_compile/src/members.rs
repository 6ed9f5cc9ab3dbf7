//! Module members: constants, variables and functions.
//!
//! Constants and functions without a declared return type are "value
//! members": their type is known only once their body is compiled, so
//! they are compiled up front in dependency order and may not depend on
//! themselves. Functions with a declared return type get their table
//! index and type on first reference and their bodies are compiled
//! afterwards, which is what allows recursion.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{ExprId, ExprKind, FunctionSelector, MemberKind, ParsedTypeId};
use vela_ir::Span;
use vela_plan::{MemberRef, Owner};
use vela_runtime::{Env, RuntimeError, StorageTarget, Value};
use vela_stack::ensure_sufficient_stack;
use vela_types::Type;

use crate::code::{code, Code, Compiled};
use crate::executable::FunctionDef;
use crate::lower::{internal, Compiler};
use crate::scope::ContextStack;

#[derive(Clone)]
pub(crate) enum MemberEntry {
    /// Reads the constant, evaluating its initializer on first use.
    Const { read: Code, ty: Type },
    /// Index into the executable's storage targets.
    Variable { repository: usize, ty: Type },
    /// Index into the run's function table.
    Function { index: usize, ty: Type },
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

#[derive(Default)]
struct Order {
    marks: FxHashMap<MemberRef, Mark>,
    path: Vec<MemberRef>,
    out: Vec<MemberRef>,
}

impl<'a> Compiler<'a> {
    /// `Module\member`, as shown in diagnostics.
    pub(crate) fn member_name(&self, member: MemberRef) -> String {
        let module = self.plan.module(member.module);
        let name = self.interner.lookup(self.plan.member(member).name.name);
        format!("{}\\{name}", module.display)
    }

    /// Compile every value member the script depends on, dependencies
    /// first.
    pub(crate) fn compile_members(&mut self) -> Result<(), Diagnostic> {
        let mut order = Order::default();
        for dep in self.plan.dependencies(Owner::Script) {
            if self.is_code_member(dep.member) {
                self.visit(dep.member, &mut order)?;
            }
        }
        for member in order.out {
            self.compile_value_member(member)?;
        }
        Ok(())
    }

    /// Compile the bodies of annotated functions referenced so far,
    /// including any they reference in turn.
    pub(crate) fn drain_pending(&mut self) -> Result<(), Diagnostic> {
        while let Some(member) = self.pending.pop() {
            let Some(MemberEntry::Function { index, ty }) = self.members.get(&member).cloned()
            else {
                return Err(internal("pending function without an entry"));
            };
            let (expr, func) = self.selector(member)?;
            let sig = ty
                .as_function()
                .cloned()
                .ok_or_else(|| internal("function member without a function type"))?;
            let plan = self.plan;
            let params = plan.params(expr);
            let ((body, _), frame_size) = self.isolated(|this| {
                this.compile_body(params, &sig.params, Some(&sig.ret), func.body)
            })?;
            self.functions[index] = Some(FunctionDef { frame_size, body });
            tracing::debug!(member = %self.member_name(member), "compiled function");
        }
        Ok(())
    }

    pub(crate) fn member_entry(
        &mut self,
        member: MemberRef,
        span: Span,
    ) -> Result<MemberEntry, Diagnostic> {
        if let Some(entry) = self.members.get(&member) {
            return Ok(entry.clone());
        }
        let plan = self.plan;
        let entry = match &plan.member(member).kind {
            MemberKind::Variable(ty) => self.register_variable(member, *ty)?,
            MemberKind::Function(_) => {
                let (_, func) = self.selector(member)?;
                match func.ret {
                    Some(ret) => self.declare_function(member, func, ret)?,
                    None => return Err(self.self_reference(member, span)),
                }
            }
            MemberKind::Const(_) => return Err(self.self_reference(member, span)),
            MemberKind::Typedef(_) | MemberKind::Enum(_) => {
                return Err(internal(format!(
                    "type member `{}` used as a value",
                    self.member_name(member)
                )));
            }
        };
        self.members.insert(member, entry.clone());
        Ok(entry)
    }

    pub(crate) fn member_value(
        &mut self,
        member: MemberRef,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        match self.member_entry(member, span)? {
            MemberEntry::Const { read, ty } => Ok(Compiled::new(read, ty)),
            MemberEntry::Variable { repository, ty } => {
                let target = self.storage[repository].to_string();
                let read = code(move |env| {
                    let run = env.run;
                    let repo = run
                        .repository(repository)
                        .ok_or_else(|| RuntimeError::no_storage(&target))?;
                    repo.get(None, run.max_rows()).map_err(|e| e.at(span))
                });
                Ok(Compiled::new(read, ty))
            }
            MemberEntry::Function { index, ty } => {
                let read = code(move |env| {
                    env.run
                        .function(index)
                        .cloned()
                        .map(Value::Function)
                        .ok_or_else(|| RuntimeError::host("module function missing"))
                });
                Ok(Compiled::new(read, ty))
            }
        }
    }

    /// Code storing the value produced by `value` into a module variable.
    pub(crate) fn assign_member(
        &mut self,
        member: MemberRef,
        value: ExprId,
        span: Span,
    ) -> Result<Code, Diagnostic> {
        let MemberEntry::Variable { repository, ty } = self.member_entry(member, span)? else {
            return Err(internal("assignment to a non-variable member"));
        };
        let value = self.compile_as(value, &ty)?;
        let target = self.storage[repository].to_string();
        Ok(code(move |env| {
            let v = value(env)?;
            let run = env.run;
            let repo = run
                .repository(repository)
                .ok_or_else(|| RuntimeError::no_storage(&target))?;
            repo.set(None, v).map_err(|e| e.at(span))?;
            Ok(Value::Void)
        }))
    }

    /// Run `f` as the body of a fresh invocation frame, returning the
    /// frame size it needs.
    pub(crate) fn isolated<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Diagnostic>,
    ) -> Result<(T, usize), Diagnostic> {
        let contexts = std::mem::replace(&mut self.contexts, ContextStack::new());
        let scopes = std::mem::take(&mut self.scopes);
        let result = f(self);
        let frame_size = self.contexts.root_frame_size();
        self.contexts = contexts;
        self.scopes = scopes;
        Ok((result?, frame_size))
    }

    fn selector(&self, member: MemberRef) -> Result<(ExprId, &'a FunctionSelector), Diagnostic> {
        let arena = self.arena;
        let plan = self.plan;
        let MemberKind::Function(expr) = &plan.member(member).kind else {
            return Err(internal("not a function member"));
        };
        match &arena.get(*expr).kind {
            ExprKind::Function(func) => Ok((*expr, func)),
            _ => Err(internal("function member without a selector")),
        }
    }

    fn is_code_member(&self, member: MemberRef) -> bool {
        matches!(
            self.plan.member(member).kind,
            MemberKind::Const(_) | MemberKind::Function(_)
        )
    }

    /// Constants and functions whose type comes from their body.
    fn is_value_member(&self, member: MemberRef) -> bool {
        match &self.plan.member(member).kind {
            MemberKind::Const(_) => true,
            MemberKind::Function(_) => {
                matches!(self.selector(member), Ok((_, func)) if func.ret.is_none())
            }
            _ => false,
        }
    }

    /// Depth-first walk over member references. A cycle is allowed only
    /// when every member on it is a function with a declared return type.
    fn visit(&self, member: MemberRef, order: &mut Order) -> Result<(), Diagnostic> {
        ensure_sufficient_stack(|| {
            if order.marks.get(&member) == Some(&Mark::Done) {
                return Ok(());
            }
            order.marks.insert(member, Mark::Active);
            order.path.push(member);
            for dep in self.plan.dependencies(Owner::Member(member)) {
                if !self.is_code_member(dep.member) {
                    continue;
                }
                match order.marks.get(&dep.member).copied() {
                    Some(Mark::Done) => {}
                    Some(Mark::Active) => self.check_cycle(dep.member, dep.span, &order.path)?,
                    None => self.visit(dep.member, order)?,
                }
            }
            order.path.pop();
            order.marks.insert(member, Mark::Done);
            if self.is_value_member(member) {
                order.out.push(member);
            }
            Ok(())
        })
    }

    fn check_cycle(
        &self,
        start: MemberRef,
        span: Span,
        path: &[MemberRef],
    ) -> Result<(), Diagnostic> {
        let from = path.iter().position(|&m| m == start).unwrap_or(0);
        let cycle = &path[from..];
        if !cycle.iter().any(|&m| self.is_value_member(m)) {
            return Ok(());
        }
        let names: Vec<String> = cycle.iter().map(|&m| self.member_name(m)).collect();
        let first = names.first().cloned().unwrap_or_default();
        let mut diagnostic = self
            .self_reference(start, span)
            .with_note(format!("cycle: {} -> {first}", names.join(" -> ")));
        if cycle.iter().any(|&m| matches!(self.plan.member(m).kind, MemberKind::Function(_))) {
            diagnostic =
                diagnostic.with_note("declare the return type of a function to let it recurse");
        }
        Err(diagnostic)
    }

    fn self_reference(&self, member: MemberRef, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorCode::E3003)
            .with_message(format!("`{}` depends on itself", self.member_name(member)))
            .with_label(span, "recursive reference")
    }

    fn compile_value_member(&mut self, member: MemberRef) -> Result<(), Diagnostic> {
        let plan = self.plan;
        let entry = match &plan.member(member).kind {
            MemberKind::Const(expr) => {
                let (init, frame_size) = self.isolated(|this| this.compile_expr(*expr))?;
                let slot = self.globals;
                self.globals += 1;
                let body = init.code;
                let read = code(move |env| {
                    let run = env.run;
                    let cached = run.global(slot);
                    if !matches!(cached, Value::Void) {
                        return Ok(cached);
                    }
                    let mut frame = Env::new(run, frame_size);
                    let value = ensure_sufficient_stack(|| body(&mut frame))?;
                    run.set_global(slot, value.clone());
                    Ok(value)
                });
                MemberEntry::Const { read, ty: init.ty }
            }
            MemberKind::Function(_) => {
                let (expr, func) = self.selector(member)?;
                let param_types = self.param_types(func)?;
                let index = self.functions.len();
                self.functions.push(None);
                let params = plan.params(expr);
                let ((body, ret), frame_size) = self
                    .isolated(|this| this.compile_body(params, &param_types, None, func.body))?;
                self.functions[index] = Some(FunctionDef { frame_size, body });
                MemberEntry::Function {
                    index,
                    ty: Type::function(param_types, ret),
                }
            }
            _ => return Err(internal("not a value member")),
        };
        tracing::debug!(member = %self.member_name(member), "compiled member");
        self.members.insert(member, entry);
        Ok(())
    }

    /// Reserve a table slot for a function with a declared return type;
    /// its body is compiled by [`drain_pending`](Self::drain_pending).
    fn declare_function(
        &mut self,
        member: MemberRef,
        func: &FunctionSelector,
        ret: ParsedTypeId,
    ) -> Result<MemberEntry, Diagnostic> {
        let params = self.param_types(func)?;
        let ret = self.resolve_type(ret)?;
        let index = self.functions.len();
        self.functions.push(None);
        self.pending.push(member);
        Ok(MemberEntry::Function {
            index,
            ty: Type::function(params, ret),
        })
    }

    fn param_types(&mut self, func: &FunctionSelector) -> Result<Vec<Type>, Diagnostic> {
        func.params
            .iter()
            .map(|param| self.resolve_type(param.ty))
            .collect()
    }

    fn register_variable(
        &mut self,
        member: MemberRef,
        ty: ParsedTypeId,
    ) -> Result<MemberEntry, Diagnostic> {
        let ty = self.resolve_type(ty)?;
        let plan = self.plan;
        let module = plan.module(member.module);
        let repository = self.storage.len();
        self.storage.push(StorageTarget {
            module: Arc::clone(&module.display),
            version: module.version,
            member: self.interner.lookup(plan.member(member).name.name),
            ty: ty.clone(),
        });
        Ok(MemberEntry::Variable { repository, ty })
    }
}
