//! Script evaluation: parse, plan, compile, then run under the caller's
//! limits.

use std::sync::{Arc, OnceLock};

use crossbeam::channel::{self, RecvTimeoutError};
use dashmap::DashMap;
use rayon::prelude::*;
use vela_compile::{Arguments, Executable, ExecutionContext};
use vela_diagnostic::{Diagnostic, LineIndex};
use vela_ir::SharedInterner;
use vela_plan::Catalog;
use vela_runtime::{
    CancellationToken, MemoryStore, RepositoryFactory, RuntimeError, ShapeCache, Value,
};

use crate::{Connection, ProcessorOptions, ScriptError};

/// What a compiled script depends on besides the catalog, which is fixed
/// for the life of a processor.
#[derive(Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text: Arc<str>,
    default_usings: Vec<String>,
    strict: bool,
}

/// Configures a [`Processor`].
pub struct ProcessorBuilder {
    catalog: Catalog,
    factory: Option<Arc<dyn RepositoryFactory>>,
    cache: bool,
}

impl ProcessorBuilder {
    /// Make the modules declared in `source` available to `using`.
    pub fn module(mut self, source: &str) -> Result<Self, ScriptError> {
        self.catalog
            .add(source)
            .map_err(|d| d.locate(&LineIndex::new(source)))?;
        Ok(self)
    }

    #[must_use]
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Storage for module variables. Defaults to a fresh [`MemoryStore`].
    #[must_use]
    pub fn factory(mut self, factory: Arc<dyn RepositoryFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Keep compiled scripts for reuse. On by default.
    #[must_use]
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    pub fn build(self) -> Processor {
        tracing::debug!(
            modules = self.catalog.len(),
            cache = self.cache,
            "processor built"
        );
        Processor {
            catalog: self.catalog,
            factory: self
                .factory
                .unwrap_or_else(|| Arc::new(MemoryStore::new())),
            interner: SharedInterner::new(),
            shapes: shared_shapes(),
            cache: self.cache.then(DashMap::new),
        }
    }
}

static SHAPES: OnceLock<Arc<ShapeCache>> = OnceLock::new();

/// Row shapes generated for tuple types, shared by every processor in the
/// process.
fn shared_shapes() -> Arc<ShapeCache> {
    Arc::clone(SHAPES.get_or_init(|| Arc::new(ShapeCache::default())))
}

/// Evaluates scripts against a module catalog and a repository factory.
///
/// A processor is shared freely between threads. Compiled scripts are kept
/// for its whole life; generated row shapes live in a process-wide cache.
pub struct Processor {
    catalog: Catalog,
    factory: Arc<dyn RepositoryFactory>,
    interner: SharedInterner,
    shapes: Arc<ShapeCache>,
    cache: Option<DashMap<CacheKey, Arc<Executable>>>,
}

impl Processor {
    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder {
            catalog: Catalog::new(),
            factory: None,
            cache: true,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// A connection evaluating against `factory` instead of the
    /// processor's own storage.
    pub fn connect(self: &Arc<Self>, factory: Arc<dyn RepositoryFactory>) -> Connection {
        Connection::new(Arc::clone(self), factory)
    }

    /// Compile `text` without running it.
    #[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
    pub fn prepare(
        &self,
        text: &str,
        options: &ProcessorOptions,
    ) -> Result<Arc<Executable>, ScriptError> {
        let Some(cache) = &self.cache else {
            return self.compile(text, options).map(Arc::new);
        };
        let key = CacheKey {
            text: Arc::from(text),
            default_usings: options.default_usings.clone(),
            strict: options.strict,
        };
        if let Some(hit) = cache.get(&key) {
            tracing::debug!("executable cache hit");
            return Ok(Arc::clone(hit.value()));
        }
        let executable = Arc::new(self.compile(text, options)?);
        Ok(Arc::clone(cache.entry(key).or_insert(executable).value()))
    }

    /// Run `text` for its effects on storage.
    pub fn execute(
        &self,
        text: &str,
        args: &Arguments,
        options: &ProcessorOptions,
    ) -> Result<(), ScriptError> {
        self.evaluate(text, args, options).map(drop)
    }

    /// Run `text` and return its result.
    pub fn evaluate(
        &self,
        text: &str,
        args: &Arguments,
        options: &ProcessorOptions,
    ) -> Result<Value, ScriptError> {
        let executable = self.prepare(text, options)?;
        self.run(&executable, args, self.factory.as_ref(), options)
    }

    /// Evaluate every script concurrently. Results keep the order of
    /// `scripts`; if any evaluation fails, all failures are reported
    /// together.
    #[tracing::instrument(level = "debug", skip_all, fields(scripts = scripts.len()))]
    pub fn evaluate_batch<S>(
        &self,
        scripts: &[S],
        args: &Arguments,
        options: &ProcessorOptions,
    ) -> Result<Vec<Value>, ScriptError>
    where
        S: AsRef<str> + Sync,
    {
        let results: Vec<Result<Value, ScriptError>> = scripts
            .par_iter()
            .map(|text| self.evaluate(text.as_ref(), args, options))
            .collect();
        let mut values = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(value) => values.push(value),
                Err(err) => errors.push(err),
            }
        }
        if errors.is_empty() {
            Ok(values)
        } else {
            tracing::debug!(failed = errors.len(), "batch evaluation failed");
            Err(ScriptError::aggregate(errors))
        }
    }

    fn compile(&self, text: &str, options: &ProcessorOptions) -> Result<Executable, ScriptError> {
        let located = |d: Diagnostic| ScriptError::Diagnostic(d.locate(&LineIndex::new(text)));
        let interner = &*self.interner;
        let mut script =
            vela_parse::parse_source(text, interner, options.parse_options()).map_err(located)?;
        let plan = vela_plan::plan(&mut script, &self.catalog, interner, &options.default_usings)
            .map_err(located)?;
        vela_compile::compile(&script, &plan, interner, &self.shapes).map_err(located)
    }

    /// Run on a worker thread. When the time limit passes first, the run
    /// is cancelled and awaited before the limit is reported.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) fn run(
        &self,
        executable: &Executable,
        args: &Arguments,
        factory: &dyn RepositoryFactory,
        options: &ProcessorOptions,
    ) -> Result<Value, ScriptError> {
        let cancel = CancellationToken::new();
        let ctx = ExecutionContext {
            args,
            factory,
            shapes: Arc::clone(&self.shapes),
            cancel: cancel.clone(),
            max_rows: options.maximum_rows,
        };
        let (sender, receiver) = channel::bounded(1);
        std::thread::scope(|scope| {
            std::thread::Builder::new()
                .name("vela-worker".to_owned())
                .spawn_scoped(scope, move || {
                    let _ = sender.send(executable.run(&ctx));
                })?;
            match receiver.recv_timeout(options.maximum_time) {
                Ok(result) => result.map_err(ScriptError::from),
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(
                        limit_ms = options.maximum_time.as_millis(),
                        "time limit exceeded, cancelling"
                    );
                    cancel.cancel();
                    let _ = receiver.recv();
                    Err(ScriptError::TimeLimitExceeded(options.maximum_time))
                }
                Err(RecvTimeoutError::Disconnected) => {
                    Err(RuntimeError::host("script worker stopped without a result").into())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests;
