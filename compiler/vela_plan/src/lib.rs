//! Name resolution for Vela scripts.
//!
//! Planning runs between parsing and compilation. It builds one
//! [`Frame`] per binding construct and resolves every identifier to a
//! [`Symbol`], leaving node-keyed tables in a [`Plan`]:
//!
//! - `using` declarations are linked against the script's own modules,
//!   the host [`Catalog`] and the built-in `System` module
//! - unqualified names may match the tail of an imported qualified name
//!   when exactly one candidate exists
//! - inside a dereference or single-argument call, simple names stay
//!   open as [`Resolved::Member`]: the compiler decides whether they
//!   mean an attribute of the element once the element type is known
//! - references between module members are recorded per [`Owner`] so
//!   members can be compiled in dependency order

mod catalog;
mod frame;
mod link;
mod plan;
mod planner;
mod symbol;

pub use catalog::{select_version, Catalog, CatalogEntry};
pub use frame::{Frame, FrameId, FrameKind};
pub use plan::{ClauseBindings, Dependency, ForBinding, Owner, Plan, Resolved};
pub use planner::plan;
pub use symbol::{MemberRef, ModuleId, ModuleInfo, ModuleOrigin, Symbol, SymbolId, SymbolKind};

#[cfg(test)]
mod tests;
