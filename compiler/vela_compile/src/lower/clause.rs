//! `for ... let ... where ... order ... return` lowering.
//!
//! Each `for` is one nesting level. Inside the innermost level the
//! `where` filter runs first, preceded only by the `let` bindings it
//! reads; the remaining `let`s, the order keys and the `return` body run
//! for rows that pass. Surviving rows are collected, sorted stably by the
//! order keys and turned into the result collection.

use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{Clause, ExprId};
use vela_ir::Span;
use vela_plan::{Resolved, SymbolId};
use vela_runtime::{Env, EvalResult, RuntimeError, Value};
use vela_types::{Type, TypeFlags};

use super::{internal, Compiler};
use crate::code::{at, code, elements, eval_bool, position, Code, Compiled};
use crate::scope::Binding;

struct Level {
    source: Code,
    var: usize,
    value: usize,
    index: usize,
}

struct OrderKey {
    key: Code,
    descending: bool,
}

struct ClauseCode {
    levels: Vec<Level>,
    /// `let`s the filter reads, bound before it.
    guard_lets: Vec<(usize, Code)>,
    lets: Vec<(usize, Code)>,
    filter: Option<Code>,
    order: Vec<OrderKey>,
    body: Code,
    list: bool,
}

type Rows = Vec<(Vec<Value>, Value)>;

impl ClauseCode {
    fn run(&self, env: &mut Env<'_>) -> EvalResult {
        if self.levels.is_empty() {
            return self.single(env);
        }
        let mut rows = Rows::new();
        self.iterate(0, env, &mut rows)?;
        if !self.order.is_empty() {
            rows.sort_by(|(a, _), (b, _)| self.compare(a, b));
        }
        let values = rows.into_iter().map(|(_, value)| value);
        Ok(if self.list {
            Value::list_from(values)
        } else {
            Value::set_from(values)
        })
    }

    /// A clause without `for`: one row, or `null` when filtered out.
    fn single(&self, env: &mut Env<'_>) -> EvalResult {
        if !self.passes(env)? {
            return Ok(Value::Null);
        }
        (self.body)(env)
    }

    fn iterate(
        &self,
        depth: usize,
        env: &mut Env<'_>,
        rows: &mut Rows,
    ) -> Result<(), RuntimeError> {
        let Some(level) = self.levels.get(depth) else {
            return self.emit(env, rows);
        };
        let source = (level.source)(env)?;
        for (i, item) in elements(&source)?.into_iter().enumerate() {
            env.run.check_cancelled()?;
            env.set(level.var, item.clone());
            env.set(level.value, item);
            env.set(level.index, position(i)?);
            self.iterate(depth + 1, env, rows)?;
        }
        Ok(())
    }

    fn emit(&self, env: &mut Env<'_>, rows: &mut Rows) -> Result<(), RuntimeError> {
        if !self.passes(env)? {
            return Ok(());
        }
        let mut keys = Vec::with_capacity(self.order.len());
        for dim in &self.order {
            keys.push((dim.key)(env)?);
        }
        let value = (self.body)(env)?;
        rows.push((keys, value));
        Ok(())
    }

    /// Bind the `let`s and apply the filter. `false` skips the row before
    /// any `let` the filter does not read has run.
    fn passes(&self, env: &mut Env<'_>) -> Result<bool, RuntimeError> {
        bind_lets(&self.guard_lets, env)?;
        if let Some(filter) = &self.filter {
            if !eval_bool(filter, env)? {
                return Ok(false);
            }
        }
        bind_lets(&self.lets, env)?;
        Ok(true)
    }

    fn compare(&self, a: &[Value], b: &[Value]) -> Ordering {
        for ((x, y), dim) in a.iter().zip(b).zip(&self.order) {
            let ordering = x.compare(y);
            let ordering = if dim.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn bind_lets(lets: &[(usize, Code)], env: &mut Env<'_>) -> Result<(), RuntimeError> {
    for (slot, value) in lets {
        let v = value(env)?;
        env.set(*slot, v);
    }
    Ok(())
}

impl Compiler<'_> {
    pub(super) fn compile_clause(
        &mut self,
        id: ExprId,
        clause: &Clause,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let plan = self.plan;
        let bindings = plan
            .clause(id)
            .ok_or_else(|| internal("clause without bindings"))?;

        let mut levels = Vec::with_capacity(clause.fors.len());
        let mut list = !clause.order.is_empty();
        for (item, binding) in clause.fors.iter().zip(&bindings.fors) {
            let source = self.compile_expr(item.source)?;
            let element = match &source.ty {
                Type::List(element) => {
                    list = true;
                    Type::clone(element)
                }
                Type::Set(element) => Type::clone(element),
                other => {
                    return Err(Diagnostic::error(ErrorCode::E3005)
                        .with_message(format!("cannot iterate over a value of type `{other}`"))
                        .with_label(self.span(item.source), "expected a set or list"));
                }
            };
            levels.push(Level {
                source: source.code,
                value: self.declare(Binding::Symbol(binding.value), element.clone()),
                var: self.declare(Binding::Symbol(binding.var), element),
                index: self.declare(Binding::Symbol(binding.index), Type::Integer),
            });
        }

        let guarded = self.guard_symbols(clause, &bindings.lets);
        let mut guard_lets = Vec::new();
        let mut lets = Vec::with_capacity(clause.lets.len());
        for (item, &symbol) in clause.lets.iter().zip(&bindings.lets) {
            let value = self.compile_expr(item.value)?;
            let slot = self.declare(Binding::Symbol(symbol), value.ty);
            if guarded.contains(&symbol) {
                guard_lets.push((slot, value.code));
            } else {
                lets.push((slot, value.code));
            }
        }

        let filter = match clause.filter {
            Some(filter) => Some(self.compile_as(filter, &Type::Boolean)?),
            None => None,
        };

        let mut order = Vec::with_capacity(clause.order.len());
        for dim in &clause.order {
            let key = self.compile_expr(dim.expr)?;
            if !key.ty.strip_optional().flags().contains(TypeFlags::ORDERED) {
                return Err(Diagnostic::error(ErrorCode::E3001)
                    .with_message(format!("cannot order by a value of type `{}`", key.ty))
                    .with_label(self.span(dim.expr), "not an ordered type"));
            }
            order.push(OrderKey {
                key: key.code,
                descending: dim.descending,
            });
        }

        let body = self.compile_expr(clause.body)?;
        let ty = if !levels.is_empty() {
            if list {
                Type::list(body.ty)
            } else {
                Type::set(body.ty)
            }
        } else if filter.is_some() {
            Type::optional(body.ty)
        } else {
            body.ty
        };

        let clause = ClauseCode {
            levels,
            guard_lets,
            lets,
            filter,
            order,
            body: body.code,
            list,
        };
        Ok(Compiled::new(at(code(move |env| clause.run(env)), span), ty))
    }

    /// The `let` symbols the `where` filter reads, directly or through
    /// other `let`s.
    fn guard_symbols(&self, clause: &Clause, lets: &[SymbolId]) -> FxHashSet<SymbolId> {
        let Some(filter) = clause.filter else {
            return FxHashSet::default();
        };
        let mut read = self.symbols_read(filter);
        for (item, symbol) in clause.lets.iter().zip(lets).rev() {
            if read.contains(symbol) {
                read.extend(self.symbols_read(item.value));
            }
        }
        lets.iter().copied().filter(|s| read.contains(s)).collect()
    }

    fn symbols_read(&self, root: ExprId) -> FxHashSet<SymbolId> {
        let mut symbols = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            match self.plan.resolution(id) {
                Some(Resolved::Symbol(symbol)) => {
                    symbols.insert(*symbol);
                }
                Some(Resolved::Member {
                    fallback: Some(symbol),
                    ..
                }) => {
                    symbols.insert(*symbol);
                }
                _ => {}
            }
            stack.extend(self.arena.children(id));
        }
        symbols
    }
}
