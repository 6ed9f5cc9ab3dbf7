//! Storage seam for module variables.
//!
//! Every variable member of an imported module is backed by a
//! [`Repository`] obtained from the host's [`RepositoryFactory`]. The
//! processor never touches storage any other way.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use vela_ir::VersionNumber;
use vela_types::Type;

use crate::{zero_value, EvalResult, RuntimeError, ShapeCache, Value};

/// Row predicate pushed down to a repository read or write.
pub type Condition<'a> = dyn Fn(&Value) -> Result<bool, RuntimeError> + 'a;

/// Storage for one module variable.
///
/// Implementations are expected to synchronise internally; the processor
/// calls them from whichever thread runs the script.
pub trait Repository: Send + Sync {
    /// Read the variable. For collection variables `condition` selects
    /// the elements to return, and at most `max_rows` may be returned.
    fn get(&self, condition: Option<&Condition<'_>>, max_rows: usize) -> EvalResult;

    /// Write the variable. With a condition, only the matching elements
    /// of a collection are replaced by `value`'s elements.
    fn set(&self, condition: Option<&Condition<'_>>, value: Value) -> Result<(), RuntimeError>;
}

/// What a repository is requested for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StorageTarget {
    /// Qualified module name, e.g. `Acme\Hr`.
    pub module: Arc<str>,
    pub version: VersionNumber,
    pub member: Arc<str>,
    pub ty: Type,
}

impl fmt::Display for StorageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.module, self.member)
    }
}

/// Host-supplied source of repositories.
pub trait RepositoryFactory: Send + Sync {
    /// `None` when the host has no storage for `target`.
    fn repository(&self, target: &StorageTarget) -> Option<Arc<dyn Repository>>;
}

/// A repository holding its value in memory.
pub struct MemoryRepository {
    value: RwLock<Value>,
}

impl MemoryRepository {
    pub fn new(value: Value) -> Self {
        MemoryRepository {
            value: RwLock::new(value),
        }
    }

    /// Current contents, ignoring limits.
    pub fn snapshot(&self) -> Value {
        self.value.read().clone()
    }
}

impl Repository for MemoryRepository {
    fn get(&self, condition: Option<&Condition<'_>>, max_rows: usize) -> EvalResult {
        let value = self.value.read().clone();
        let Some(elements) = value.elements() else {
            return Ok(value);
        };
        let mut selected = Vec::new();
        for element in elements {
            if let Some(condition) = condition {
                if !condition(element)? {
                    continue;
                }
            }
            if selected.len() == max_rows {
                return Err(RuntimeError::row_limit(max_rows));
            }
            selected.push(element.clone());
        }
        Ok(value.same_kind(selected))
    }

    fn set(&self, condition: Option<&Condition<'_>>, value: Value) -> Result<(), RuntimeError> {
        let mut stored = self.value.write();
        let updated = match (condition, stored.elements()) {
            (Some(condition), Some(existing)) => {
                let mut kept = Vec::new();
                for element in existing {
                    if !condition(element)? {
                        kept.push(element.clone());
                    }
                }
                if let Some(replacements) = value.elements() {
                    kept.extend(replacements.cloned());
                }
                stored.same_kind(kept)
            }
            _ => value,
        };
        *stored = updated;
        Ok(())
    }
}

/// A [`RepositoryFactory`] that serves every target from memory, seeded
/// with the target type's zero value on first use.
///
/// Repositories live as long as the store, so writes made by one script
/// are visible to the next.
#[derive(Default)]
pub struct MemoryStore {
    repositories: DashMap<(Arc<str>, Arc<str>), Arc<MemoryRepository>>,
    shapes: ShapeCache,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `module\member` with `value`, replacing any previous contents.
    pub fn insert(&self, module: &str, member: &str, value: Value) {
        self.repositories.insert(
            (Arc::from(module), Arc::from(member)),
            Arc::new(MemoryRepository::new(value)),
        );
    }

    /// Contents of `module\member`, if it was ever seeded or used.
    pub fn get(&self, module: &str, member: &str) -> Option<Value> {
        self.repositories
            .get(&(Arc::from(module), Arc::from(member)))
            .map(|repo| repo.snapshot())
    }
}

impl RepositoryFactory for MemoryStore {
    fn repository(&self, target: &StorageTarget) -> Option<Arc<dyn Repository>> {
        let key = (Arc::clone(&target.module), Arc::clone(&target.member));
        let repo = self
            .repositories
            .entry(key)
            .or_insert_with(|| {
                tracing::debug!(%target, "creating in-memory repository");
                Arc::new(MemoryRepository::new(zero_value(&target.ty, &self.shapes)))
            })
            .clone();
        Some(repo)
    }
}
