//! Identifier lowering.

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::ExprId;
use vela_ir::{QualifiedName, Span};
use vela_plan::{FrameId, Resolved, SymbolId, SymbolKind};
use vela_runtime::builtins::{self, BuiltinCall, BuiltinId};
use vela_runtime::{EnumValue, FunctionValue, Value};
use vela_types::Type;

use super::{internal, Compiler};
use crate::code::{code, constant, read_slot, Compiled};
use crate::scope::Binding;

impl Compiler<'_> {
    pub(super) fn compile_ident(
        &mut self,
        id: ExprId,
        name: &QualifiedName,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let plan = self.plan;
        let Some(resolved) = plan.resolution(id) else {
            return Err(internal(format!(
                "`{}` was not resolved",
                name.display(self.interner)
            )));
        };
        match resolved {
            Resolved::Symbol(symbol) => self.compile_symbol(*symbol, span),
            Resolved::Member { scopes, fallback } => {
                if let Some(simple) = name.as_simple() {
                    let text = self.interner.lookup(simple);
                    for frame in scopes {
                        if let Some(found) = self.element_name(*frame, &text)? {
                            return Ok(found);
                        }
                    }
                }
                match fallback {
                    Some(symbol) => self.compile_symbol(*symbol, span),
                    None => Err(self.no_such_name(scopes, name, span)),
                }
            }
        }
    }

    /// `value`, `index` or an attribute of the element bound by `frame`,
    /// when that scope is active and binds `name`.
    fn element_name(&mut self, frame: FrameId, name: &str) -> Result<Option<Compiled>, Diagnostic> {
        let Some(scope) = self.scopes.get(&frame).cloned() else {
            return Ok(None);
        };
        let element_slot = |this: &mut Self| {
            this.contexts
                .slot(Binding::Element(frame))
                .ok_or_else(|| internal("element scope without a slot"))
        };
        match name {
            "value" => {
                let slot = element_slot(self)?;
                Ok(Some(Compiled::new(read_slot(slot), scope.element)))
            }
            "index" if scope.position => {
                let slot = self
                    .contexts
                    .slot(Binding::Position(frame))
                    .ok_or_else(|| internal("element scope without a position slot"))?;
                Ok(Some(Compiled::new(read_slot(slot), Type::Integer)))
            }
            _ => {
                let Some(tuple) = scope.element.as_tuple() else {
                    return Ok(None);
                };
                let Some(field) = tuple.index_of(name) else {
                    return Ok(None);
                };
                let ty = tuple.attrs()[field].ty.clone();
                let slot = element_slot(self)?;
                let read = code(move |env| match env.local(slot) {
                    Some(Value::Tuple(row)) => Ok(row.field(field).cloned().unwrap_or(Value::Null)),
                    _ => Ok(Value::Null),
                });
                Ok(Some(Compiled::new(read, ty)))
            }
        }
    }

    /// Whether an active scope among `scopes` binds `name`.
    pub(super) fn scope_binds(&self, scopes: &[FrameId], name: &QualifiedName) -> bool {
        let Some(simple) = name.as_simple() else {
            return false;
        };
        let text = self.interner.lookup(simple);
        scopes
            .iter()
            .filter_map(|frame| self.scopes.get(frame))
            .any(|scope| match &*text {
                "value" => true,
                "index" => scope.position,
                attr => scope
                    .element
                    .as_tuple()
                    .is_some_and(|tuple| tuple.index_of(attr).is_some()),
            })
    }

    fn no_such_name(&self, scopes: &[FrameId], name: &QualifiedName, span: Span) -> Diagnostic {
        let shown = name.display(self.interner);
        let tuple = scopes
            .iter()
            .filter_map(|frame| self.scopes.get(frame))
            .find(|scope| scope.element.as_tuple().is_some());
        match tuple {
            Some(scope) => Diagnostic::error(ErrorCode::E3011)
                .with_message(format!("`{}` has no attribute `{shown}`", scope.element))
                .with_label(span, "unknown attribute"),
            None => Diagnostic::error(ErrorCode::E2001)
                .with_message(format!("unknown identifier `{shown}`"))
                .with_label(span, "not found in this scope"),
        }
    }

    pub(crate) fn compile_symbol(
        &mut self,
        symbol: SymbolId,
        span: Span,
    ) -> Result<Compiled, Diagnostic> {
        let plan = self.plan;
        match &plan.symbol(symbol).kind {
            SymbolKind::Local | SymbolKind::ScriptVar(_) => {
                let binding = Binding::Symbol(symbol);
                let ty = self.binding_types.get(&binding).cloned();
                let slot = self.contexts.slot(binding);
                match (slot, ty) {
                    (Some(slot), Some(ty)) => Ok(Compiled::new(read_slot(slot), ty)),
                    _ => Err(internal(format!(
                        "`{}` has no slot",
                        plan.symbol(symbol).name.display(self.interner)
                    ))),
                }
            }
            SymbolKind::Member(member) => self.member_value(*member, span),
            SymbolKind::EnumValue { member, ordinal } => {
                let ty = self.member_type(*member, span)?;
                let Type::Enum(enumeration) = &ty else {
                    return Err(internal("enumeration value of a non-enumeration"));
                };
                let value = Value::Enum(EnumValue {
                    ty: enumeration.clone(),
                    ordinal: *ordinal,
                });
                Ok(Compiled::new(constant(value), ty))
            }
            SymbolKind::Builtin(id) => builtin_value(*id, span),
            SymbolKind::Scalar(_) | SymbolKind::Attribute => Err(internal(format!(
                "`{}` is not a value",
                plan.symbol(symbol).name.display(self.interner)
            ))),
        }
    }
}

/// A built-in used as a first-class value. Only built-ins with a single
/// non-generic signature have a function type.
fn builtin_value(id: BuiltinId, span: Span) -> Result<Compiled, Diagnostic> {
    let Some(builtin) = builtins::get(id) else {
        return Err(internal("unknown built-in"));
    };
    let [signature] = builtin.signatures.as_slice() else {
        return Err(generic_builtin(builtin.name, span));
    };
    if !signature.generics.is_empty() {
        return Err(generic_builtin(builtin.name, span));
    }
    let func = builtin.func;
    let value = Value::Function(FunctionValue::new(move |run, args| {
        func(&BuiltinCall {
            args,
            type_args: &[],
            run,
        })
    }));
    let ty = Type::function(signature.params.clone(), signature.ret.clone());
    Ok(Compiled::new(constant(value), ty))
}

fn generic_builtin(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3002)
        .with_message(format!("`{name}` is generic or overloaded and can only be called"))
        .with_label(span, "used as a value here")
}
