//! Selectors, indexing, dereference and restriction.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{ExprId, ExprKind, TupleSelector};
use vela_ir::Span;
use vela_runtime::{Env, Row, RuntimeError, Value};
use vela_types::{Attribute, TupleType, Type};

use super::{internal, Compiler, ElementScope};
use crate::code::{at, code, constant, elements, eval_bool, position, Code, Compiled};
use crate::scope::Binding;
use crate::types::tuple_error;

/// Slots an element scope binds in the current context.
#[derive(Copy, Clone)]
struct ElementSlots {
    element: usize,
    position: Option<usize>,
}

impl ElementSlots {
    fn bind(self, env: &mut Env<'_>, element: Value, index: usize) -> Result<(), RuntimeError> {
        env.set(self.element, element);
        if let Some(slot) = self.position {
            env.set(slot, position(index)?);
        }
        Ok(())
    }
}

impl Compiler<'_> {
    pub(super) fn compile_collection(
        &mut self,
        items: &[ExprId],
        list: bool,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let wrap = |element: Type| {
            if list {
                Type::list(element)
            } else {
                Type::set(element)
            }
        };
        let Some((&first, rest)) = items.split_first() else {
            let empty = if list {
                Value::empty_list()
            } else {
                Value::empty_set()
            };
            return Ok(Compiled::new(constant(empty), wrap(Type::Void)));
        };
        let first = self.compile_expr(first)?;
        let element = first.ty;
        let mut codes = vec![first.code];
        for &item in rest {
            codes.push(self.compile_as(item, &element)?);
        }
        let eval = code(move |env| {
            let mut values = Vec::with_capacity(codes.len());
            for item in &codes {
                values.push(item(env)?);
            }
            Ok(if list {
                Value::list_from(values)
            } else {
                Value::set_from(values)
            })
        });
        Ok(Compiled::new(at(eval, span), wrap(element)))
    }

    pub(super) fn compile_tuple(
        &mut self,
        selector: &TupleSelector,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let mut attrs = Vec::with_capacity(selector.attrs.len());
        let mut values = Vec::with_capacity(selector.attrs.len());
        for attr in &selector.attrs {
            let name = match (&attr.name, &self.arena.get(attr.value).kind) {
                (Some(ident), _) => ident.name,
                (None, ExprKind::Ident(name)) => name.last(),
                (None, _) => {
                    return Err(Diagnostic::error(ErrorCode::E3006)
                        .with_message("cannot infer an attribute name for this value")
                        .with_label(attr.span, "write `name: value`"));
                }
            };
            let value = self.compile_expr(attr.value)?;
            let name = self.interner.lookup(name);
            attrs.push(Attribute {
                name: Arc::clone(&name),
                ty: value.ty,
            });
            values.push((name, value.code));
        }
        let (keys, refs) = self.keys_and_refs(&selector.keys, &selector.refs);
        let tuple = TupleType::new(attrs, keys, refs).map_err(|e| tuple_error(&e, span))?;
        let tuple = Arc::new(tuple);
        let mut fields: Vec<Option<Code>> = vec![None; values.len()];
        for (name, value) in values {
            let index = tuple
                .index_of(&name)
                .ok_or_else(|| internal("tuple attribute lost its slot"))?;
            fields[index] = Some(value);
        }
        let fields: Vec<Code> = fields.into_iter().flatten().collect();
        let shape = self.shapes.shape(&tuple);
        let eval = code(move |env| {
            let mut row = Vec::with_capacity(fields.len());
            for field in &fields {
                row.push(field(env)?);
            }
            Ok(Value::Tuple(Row::new(Arc::clone(&shape), row)))
        });
        Ok(Compiled::new(eval, Type::Tuple(tuple)))
    }

    pub(super) fn compile_index(
        &mut self,
        target: ExprId,
        index: ExprId,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let list = self.compile_expr(target)?;
        let Type::List(element) = &list.ty else {
            return Err(Diagnostic::error(ErrorCode::E3001)
                .with_message(format!("cannot index a value of type `{}`", list.ty))
                .with_label(span, "only lists can be indexed"));
        };
        let element = Type::clone(element);
        let position = self.compile_as(index, &Type::Long)?;
        let items = list.code;
        let eval = code(move |env| {
            let value = items(env)?;
            let index = position(env)?;
            let Value::List(values) = &value else {
                return Ok(Value::Null);
            };
            let Some(i) = index.as_i64() else {
                return Err(RuntimeError::invalid_argument("list index is null"));
            };
            usize::try_from(i)
                .ok()
                .and_then(|i| values.get(i))
                .cloned()
                .ok_or_else(|| RuntimeError::index_out_of_range(i, values.len()))
        });
        Ok(Compiled::new(at(eval, span), element))
    }

    pub(super) fn compile_deref(
        &mut self,
        id: ExprId,
        target: ExprId,
        member: ExprId,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let source = self.compile_expr(target)?;
        let frame = self.plan.member_frame(id);
        match source.ty.clone() {
            Type::Set(element) | Type::List(element) => {
                let list = source.ty.is_list();
                let (slots, body) = self.element_body(frame, Type::clone(&element), true, member)?;
                let items = source.code;
                let project = body.code;
                let eval = code(move |env| {
                    let source = items(env)?;
                    let mut out = Vec::new();
                    for (i, item) in elements(&source)?.into_iter().enumerate() {
                        env.run.check_cancelled()?;
                        slots.bind(env, item, i)?;
                        out.push(project(env)?);
                    }
                    Ok(if list {
                        Value::list_from(out)
                    } else {
                        Value::set_from(out)
                    })
                });
                let ty = if list {
                    Type::list(body.ty)
                } else {
                    Type::set(body.ty)
                };
                Ok(Compiled::new(at(eval, span), ty))
            }
            Type::Tuple(_) => {
                let (slots, body) = self.element_body(frame, source.ty.clone(), false, member)?;
                let tuple = source.code;
                let project = body.code;
                let eval = code(move |env| {
                    let value = tuple(env)?;
                    slots.bind(env, value, 0)?;
                    project(env)
                });
                Ok(Compiled::new(eval, body.ty))
            }
            Type::Optional(inner) if inner.as_tuple().is_some() => {
                let (slots, body) = self.element_body(frame, Type::clone(&inner), false, member)?;
                let tuple = source.code;
                let project = body.code;
                let eval = code(move |env| {
                    let value = tuple(env)?;
                    if value.is_null() {
                        return Ok(Value::Null);
                    }
                    slots.bind(env, value, 0)?;
                    project(env)
                });
                Ok(Compiled::new(eval, Type::optional(body.ty)))
            }
            other => Err(Diagnostic::error(ErrorCode::E3001)
                .with_message(format!("cannot dereference a value of type `{other}`"))
                .with_label(span, "expected a tuple, set or list")),
        }
    }

    /// `source(predicate)`: keep the elements for which `predicate` holds.
    pub(super) fn compile_restrict(
        &mut self,
        id: ExprId,
        source: Compiled,
        predicate: ExprId,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let element = source
            .ty
            .element()
            .cloned()
            .ok_or_else(|| internal("restriction of a non-collection"))?;
        let (slots, keep) = self.predicate(id, element, predicate)?;
        let items = source.code;
        let eval = code(move |env| {
            let source = items(env)?;
            let mut kept = Vec::new();
            for (i, item) in elements(&source)?.into_iter().enumerate() {
                env.run.check_cancelled()?;
                slots.bind(env, item.clone(), i)?;
                if eval_bool(&keep, env)? {
                    kept.push(item);
                }
            }
            Ok(source.same_kind(kept))
        });
        Ok(Compiled::new(at(eval, span), source.ty))
    }

    /// Restriction of a module variable, evaluated by its repository.
    pub(super) fn compile_stored_restrict(
        &mut self,
        id: ExprId,
        repository: usize,
        ty: Type,
        predicate: ExprId,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let element = ty
            .element()
            .cloned()
            .ok_or_else(|| internal("restriction of a non-collection"))?;
        let (slots, keep) = self.predicate(id, element, predicate)?;
        let target = self.storage[repository].to_string();
        let eval = code(move |env| {
            let run = env.run;
            let repo = run
                .repository(repository)
                .ok_or_else(|| RuntimeError::no_storage(&target))?;
            let index = Cell::new(0);
            let env = RefCell::new(env);
            let condition = |element: &Value| -> Result<bool, RuntimeError> {
                run.check_cancelled()?;
                let mut guard = env.borrow_mut();
                let env: &mut Env<'_> = &mut **guard;
                slots.bind(env, element.clone(), index.replace(index.get() + 1))?;
                eval_bool(&keep, env)
            };
            repo.get(Some(&condition), run.max_rows())
        });
        Ok(Compiled::new(at(eval, span), ty))
    }

    fn predicate(
        &mut self,
        id: ExprId,
        element: Type,
        predicate: ExprId,
    ) -> Result<(ElementSlots, Code), Diagnostic> {
        let frame = self.plan.member_frame(id);
        let (slots, body) = self.element_body(frame, element, true, predicate)?;
        let keep = self.coerce(body, &Type::Boolean, self.span(predicate))?;
        Ok((slots, keep))
    }

    /// Compile `body` with the element scope of `frame` active.
    fn element_body(
        &mut self,
        frame: Option<vela_plan::FrameId>,
        element: Type,
        position: bool,
        body: ExprId,
    ) -> Result<(ElementSlots, Compiled), Diagnostic> {
        let frame = frame.ok_or_else(|| internal("element scope without a frame"))?;
        let slots = ElementSlots {
            element: self.declare(Binding::Element(frame), element.clone()),
            position: position.then(|| self.declare(Binding::Position(frame), Type::Integer)),
        };
        let scope = ElementScope { element, position };
        let compiled = self.with_scope(frame, scope, |this| this.compile_expr(body))?;
        Ok((slots, compiled))
    }
}
