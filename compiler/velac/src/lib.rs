//! The Vela processor.
//!
//! ```text
//! script text
//!     │  vela_lexer / vela_parse
//!     ▼
//! Script ──► vela_plan::plan ──► Plan
//!     │                            │
//!     └──────── vela_compile ◄─────┘
//!                   │
//!                   ▼
//!              Executable ──► run on a worker, bounded by
//!                             ProcessorOptions::maximum_time
//! ```
//!
//! [`Processor`] owns everything that outlives a single script: the module
//! catalog, the default repository factory, the interner, the row-shape
//! cache and the executable cache. [`Connection`] pairs a processor with
//! another repository factory and a set of options.

mod connection;
mod error;
mod options;
mod processor;

pub use connection::Connection;
pub use error::ScriptError;
pub use options::ProcessorOptions;
pub use processor::{Processor, ProcessorBuilder};

pub use vela_compile::{Arguments, Executable};
pub use vela_runtime::{MemoryStore, RepositoryFactory, Value};
