//! A processor bound to one storage backend.

use std::sync::Arc;

use vela_compile::Arguments;
use vela_runtime::{RepositoryFactory, Value};

use crate::{Processor, ProcessorOptions, ScriptError};

/// Runs ad-hoc scripts against a fixed repository factory with fixed
/// options. Compiled scripts are shared with the processor's cache.
#[derive(Clone)]
pub struct Connection {
    processor: Arc<Processor>,
    factory: Arc<dyn RepositoryFactory>,
    options: ProcessorOptions,
}

impl Connection {
    pub fn new(processor: Arc<Processor>, factory: Arc<dyn RepositoryFactory>) -> Self {
        Connection {
            processor,
            factory,
            options: ProcessorOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ProcessorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    pub fn processor(&self) -> &Arc<Processor> {
        &self.processor
    }

    pub fn execute(&self, text: &str, args: &Arguments) -> Result<(), ScriptError> {
        self.evaluate(text, args).map(drop)
    }

    pub fn evaluate(&self, text: &str, args: &Arguments) -> Result<Value, ScriptError> {
        let executable = self.processor.prepare(text, &self.options)?;
        self.processor
            .run(&executable, args, self.factory.as_ref(), &self.options)
    }
}
