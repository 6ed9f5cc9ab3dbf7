//! Script-level lowering: `var`s, assignments and the result expression.

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{Assignment, Script, VarDecl};
use vela_plan::{SymbolId, SymbolKind};
use vela_runtime::Value;
use vela_types::Type;

use crate::code::{code, Code};
use crate::executable::{Executable, ScriptVar};
use crate::lower::{internal, Compiler};
use crate::scope::Binding;

/// The script's own code, before it is packaged with the members.
pub(crate) struct ScriptCode {
    vars: Vec<ScriptVar>,
    statements: Vec<Code>,
    body: Option<Code>,
    result_type: Type,
}

impl Compiler<'_> {
    pub(crate) fn compile_script(&mut self, script: &Script) -> Result<ScriptCode, Diagnostic> {
        let plan = self.plan;
        let mut vars = Vec::with_capacity(script.vars.len());
        for (decl, &symbol) in script.vars.iter().zip(plan.script_vars()) {
            vars.push(self.compile_var(decl, symbol)?);
        }
        let mut statements = Vec::with_capacity(script.assignments.len());
        for (assignment, &target) in script.assignments.iter().zip(plan.assignments()) {
            statements.push(self.compile_assignment(assignment, target)?);
        }
        let (body, result_type) = match script.body {
            Some(body) => {
                let compiled = self.compile_expr(body)?;
                (Some(compiled.code), compiled.ty)
            }
            None => (None, Type::Void),
        };
        Ok(ScriptCode {
            vars,
            statements,
            body,
            result_type,
        })
    }

    fn compile_var(&mut self, decl: &VarDecl, symbol: SymbolId) -> Result<ScriptVar, Diagnostic> {
        let declared = decl.ty.map(|ty| self.resolve_type(ty)).transpose()?;
        let (ty, init) = match (declared, decl.init) {
            (Some(ty), Some(init)) => {
                let code = self.compile_as(init, &ty)?;
                (ty, Some(code))
            }
            (Some(ty), None) => (ty, None),
            (None, Some(init)) => {
                let compiled = self.compile_expr(init)?;
                (compiled.ty, Some(compiled.code))
            }
            (None, None) => {
                return Err(Diagnostic::error(ErrorCode::E3008)
                    .with_message(format!(
                        "cannot infer the type of `{}`",
                        self.interner.lookup(decl.name.name)
                    ))
                    .with_label(decl.span, "add a type or an initial value"));
            }
        };
        let slot = self.declare(Binding::Symbol(symbol), ty.clone());
        Ok(ScriptVar {
            name: self.interner.lookup(decl.name.name),
            ty,
            slot,
            init,
        })
    }

    fn compile_assignment(
        &mut self,
        assignment: &Assignment,
        target: SymbolId,
    ) -> Result<Code, Diagnostic> {
        let plan = self.plan;
        match &plan.symbol(target).kind {
            SymbolKind::ScriptVar(_) => {
                let binding = Binding::Symbol(target);
                let (Some(slot), Some(ty)) =
                    (self.contexts.slot(binding), self.binding_types.get(&binding).cloned())
                else {
                    return Err(internal("assignment to an undeclared variable"));
                };
                let value = self.compile_as(assignment.value, &ty)?;
                Ok(code(move |env| {
                    let v = value(env)?;
                    env.set(slot, v);
                    Ok(Value::Void)
                }))
            }
            SymbolKind::Member(member) => {
                self.assign_member(*member, assignment.value, assignment.target_span)
            }
            _ => Err(internal("assignment target is not a variable")),
        }
    }

    /// Package the script with every member it reached.
    pub(crate) fn finish(self, script: ScriptCode) -> Result<Executable, Diagnostic> {
        let frame_size = self.contexts.root_frame_size();
        let functions = self
            .functions
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| internal("module function left uncompiled"))?;
        Ok(Executable {
            vars: script.vars,
            statements: script.statements,
            body: script.body,
            result_type: script.result_type,
            frame_size,
            globals: self.globals,
            functions,
            storage: self.storage,
        })
    }
}
