//! Row shapes for tuple values.
//!
//! Every tuple value points at the [`RowShape`] of its type. Shapes are
//! memoized by structural type equality, so tuples of identical types
//! built by different scripts or threads share one shape.

use std::sync::Arc;

use dashmap::DashMap;
use vela_types::TupleType;

/// Field layout of a tuple type, in attribute-name order.
#[derive(Debug, PartialEq, Eq)]
pub struct RowShape {
    ty: Arc<TupleType>,
    key: Option<Vec<usize>>,
}

impl RowShape {
    pub fn new(ty: Arc<TupleType>) -> Self {
        let key = ty.primary_key();
        RowShape { ty, key }
    }

    pub fn ty(&self) -> &Arc<TupleType> {
        &self.ty
    }

    /// Field positions of the primary key.
    pub fn key(&self) -> Option<&[usize]> {
        self.key.as_deref()
    }

    pub fn len(&self) -> usize {
        self.ty.attrs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ty.attrs().is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.ty.index_of(name)
    }

    pub fn name(&self, index: usize) -> &str {
        &self.ty.attrs()[index].name
    }
}

/// Concurrent memo of row shapes.
#[derive(Default)]
pub struct ShapeCache {
    shapes: DashMap<TupleType, Arc<RowShape>>,
}

impl ShapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shape for `ty`, creating it on first use.
    pub fn shape(&self, ty: &Arc<TupleType>) -> Arc<RowShape> {
        if let Some(existing) = self.shapes.get(ty.as_ref()) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .shapes
            .entry(TupleType::clone(ty))
            .or_insert_with(|| {
                tracing::trace!(shape = %ty, "new row shape");
                Arc::new(RowShape::new(Arc::clone(ty)))
            });
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
