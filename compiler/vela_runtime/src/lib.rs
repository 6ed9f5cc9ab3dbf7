//! Runtime support for compiled Vela programs.
//!
//! - [`Value`]: the value representation, with key-aware tuple equality
//! - [`RuntimeError`]: faults raised while a program runs
//! - [`Env`] and [`RunState`]: per-call locals and per-execution state,
//!   including the cancellation signal
//! - [`ShapeCache`]: memoized row shapes for tuple types
//! - [`ops`]: operator evaluation
//! - [`Repository`] and [`RepositoryFactory`]: storage seam for module
//!   variables, with an in-memory implementation
//! - [`builtins`]: the `System` module

pub mod builtins;
mod convert;
mod env;
mod error;
pub mod ops;
mod repository;
mod shape;
mod value;

pub use convert::{coerce, convert, zero_value};
pub use env::{CancellationToken, Env, RunState};
pub use error::{EvalResult, RuntimeError, RuntimeErrorKind};
pub use repository::{
    Condition, MemoryRepository, MemoryStore, Repository, RepositoryFactory, StorageTarget,
};
pub use shape::{RowShape, ShapeCache};
pub use value::{EnumValue, FunctionValue, Row, Value};

#[cfg(test)]
mod tests;
