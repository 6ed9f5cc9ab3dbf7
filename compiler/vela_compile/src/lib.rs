//! Compilation of planned Vela scripts.
//!
//! [`compile`] type-checks a [`Script`] against its [`Plan`] and lowers
//! it into an [`Executable`]: a tree of closures over numbered local
//! slots. Every type decision (implicit conversions, overload choice,
//! element scopes, the result kind of a clause) is made here, so running
//! an executable never inspects a type.
//!
//! Module members are compiled on demand. Constants become lazily
//! initialised globals of each run, variables become storage targets
//! resolved through the host's
//! [`RepositoryFactory`](vela_runtime::RepositoryFactory), and functions
//! become entries of a per-run function table.

mod code;
mod executable;
mod lower;
mod members;
mod scope;
mod script;
mod types;

use vela_diagnostic::Diagnostic;
use vela_ir::ast::Script;
use vela_ir::StringInterner;
use vela_plan::Plan;
use vela_runtime::ShapeCache;

pub use executable::{Arguments, Executable, ExecutionContext};

use lower::Compiler;

/// Compile `script`, which `plan` was produced for.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile(
    script: &Script,
    plan: &Plan,
    interner: &StringInterner,
    shapes: &ShapeCache,
) -> Result<Executable, Diagnostic> {
    let mut compiler = Compiler::new(&script.arena, plan, interner, shapes);
    compiler.compile_members()?;
    let code = compiler.compile_script(script)?;
    compiler.drain_pending()?;
    let executable = compiler.finish(code)?;
    tracing::debug!(
        functions = executable.functions.len(),
        storage = executable.storage.len(),
        result_type = %executable.result_type,
        "script compiled"
    );
    Ok(executable)
}

#[cfg(test)]
mod tests;
