//! Execution state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{FunctionValue, Repository, RuntimeError, ShapeCache, Value};

/// Cooperative cancellation signal shared between the façade and a
/// running program.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// State shared by every frame of one execution.
pub struct RunState {
    globals: RwLock<Vec<Value>>,
    functions: Vec<FunctionValue>,
    repositories: Vec<Arc<dyn Repository>>,
    shapes: Arc<ShapeCache>,
    cancel: CancellationToken,
    max_rows: usize,
}

impl RunState {
    pub fn new(
        globals: usize,
        functions: Vec<FunctionValue>,
        repositories: Vec<Arc<dyn Repository>>,
        shapes: Arc<ShapeCache>,
        cancel: CancellationToken,
        max_rows: usize,
    ) -> Self {
        RunState {
            globals: RwLock::new(vec![Value::Void; globals]),
            functions,
            repositories,
            shapes,
            cancel,
            max_rows,
        }
    }

    /// Fail with [`RuntimeError::cancelled`] once cancellation was
    /// requested. Called at every loop step and function entry.
    #[inline]
    pub fn check_cancelled(&self) -> Result<(), RuntimeError> {
        if self.cancel.is_cancelled() {
            Err(RuntimeError::cancelled())
        } else {
            Ok(())
        }
    }

    pub fn global(&self, slot: usize) -> Value {
        self.globals.read().get(slot).cloned().unwrap_or(Value::Void)
    }

    pub fn set_global(&self, slot: usize, value: Value) {
        if let Some(target) = self.globals.write().get_mut(slot) {
            *target = value;
        }
    }

    pub fn function(&self, index: usize) -> Option<&FunctionValue> {
        self.functions.get(index)
    }

    pub fn repository(&self, index: usize) -> Option<&Arc<dyn Repository>> {
        self.repositories.get(index)
    }

    pub fn shapes(&self) -> &ShapeCache {
        &self.shapes
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }
}

/// Locals of one function invocation, addressed by slot.
pub struct Env<'a> {
    locals: Vec<Value>,
    pub run: &'a RunState,
}

impl<'a> Env<'a> {
    pub fn new(run: &'a RunState, frame_size: usize) -> Self {
        Env {
            locals: vec![Value::Void; frame_size],
            run,
        }
    }

    /// A frame whose first slots hold `prefix` (captures, then arguments).
    pub fn with_prefix(run: &'a RunState, frame_size: usize, mut prefix: Vec<Value>) -> Self {
        if prefix.len() < frame_size {
            prefix.resize(frame_size, Value::Void);
        }
        Env {
            locals: prefix,
            run,
        }
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Value {
        self.locals.get(slot).cloned().unwrap_or(Value::Void)
    }

    #[inline]
    pub fn local(&self, slot: usize) -> Option<&Value> {
        self.locals.get(slot)
    }

    #[inline]
    pub fn set(&mut self, slot: usize, value: Value) {
        if let Some(target) = self.locals.get_mut(slot) {
            *target = value;
        }
    }
}
