//! The compiled form of a script and how it is run.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use vela_runtime::{
    coerce, zero_value, CancellationToken, Env, EvalResult, FunctionValue, RepositoryFactory,
    RunState, RuntimeError, ShapeCache, StorageTarget, Value,
};
use vela_stack::ensure_sufficient_stack;
use vela_types::Type;

use crate::code::Code;

/// Body of a module function.
pub(crate) struct FunctionDef {
    pub(crate) frame_size: usize,
    pub(crate) body: Code,
}

/// A script `var`.
pub(crate) struct ScriptVar {
    pub(crate) name: Arc<str>,
    pub(crate) ty: Type,
    pub(crate) slot: usize,
    pub(crate) init: Option<Code>,
}

/// Values for script variables, by name.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    values: FxHashMap<Arc<str>, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(Arc::from(name), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What one run of an [`Executable`] needs from its host.
pub struct ExecutionContext<'a> {
    pub args: &'a Arguments,
    pub factory: &'a dyn RepositoryFactory,
    pub shapes: Arc<ShapeCache>,
    pub cancel: CancellationToken,
    pub max_rows: usize,
}

/// A compiled script. Immutable and shareable between threads; every
/// [`run`](Executable::run) gets its own locals, constants and
/// repositories.
pub struct Executable {
    pub(crate) vars: Vec<ScriptVar>,
    pub(crate) statements: Vec<Code>,
    pub(crate) body: Option<Code>,
    pub(crate) result_type: Type,
    pub(crate) frame_size: usize,
    pub(crate) globals: usize,
    pub(crate) functions: Vec<FunctionDef>,
    pub(crate) storage: Vec<StorageTarget>,
}

impl Executable {
    /// Type of the script's result; `Void` when it has no body.
    pub fn result_type(&self) -> &Type {
        &self.result_type
    }

    /// The script's `var`s, which double as its parameters.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.vars.iter().map(|var| (var.name.as_ref(), &var.ty))
    }

    /// Module variables the script reads or writes.
    pub fn storage(&self) -> &[StorageTarget] {
        &self.storage
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&self, ctx: &ExecutionContext<'_>) -> EvalResult {
        for name in ctx.args.names() {
            if !self.vars.iter().any(|var| var.name.as_ref() == name) {
                tracing::warn!(argument = name, "argument matches no script variable");
            }
        }
        let repositories = self
            .storage
            .iter()
            .map(|target| {
                ctx.factory
                    .repository(target)
                    .ok_or_else(|| RuntimeError::no_storage(&target.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let functions = self
            .functions
            .iter()
            .map(|def| {
                let body = Arc::clone(&def.body);
                let size = def.frame_size;
                FunctionValue::new(move |run, args| {
                    run.check_cancelled()?;
                    let mut env = Env::with_prefix(run, size, args);
                    ensure_sufficient_stack(|| body(&mut env))
                })
            })
            .collect();
        let run = RunState::new(
            self.globals,
            functions,
            repositories,
            Arc::clone(&ctx.shapes),
            ctx.cancel.clone(),
            ctx.max_rows,
        );
        let mut env = Env::new(&run, self.frame_size);

        for var in &self.vars {
            let value = match (ctx.args.get(&var.name), &var.init) {
                (Some(arg), _) => coerce(arg.clone(), &var.ty)?,
                (None, Some(init)) => init(&mut env)?,
                (None, None) => zero_value(&var.ty, run.shapes()),
            };
            env.set(var.slot, value);
        }
        for statement in &self.statements {
            statement(&mut env)?;
        }
        let result = match &self.body {
            Some(body) => body(&mut env)?,
            None => Value::Void,
        };
        tracing::debug!(result_type = %self.result_type, "script finished");
        Ok(result)
    }
}
