//! Lexical frames.
//!
//! Every binding construct gets exactly one frame, chained to the frame
//! it appears in. Frames live in the [`Plan`](crate::Plan) and are
//! addressed by [`FrameId`], so the compiler can ask which frame a node
//! opened after planning is done.

use rustc_hash::FxHashMap;
use vela_ir::QualifiedName;

use crate::{ModuleId, SymbolId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u32);

impl FrameId {
    pub(crate) fn new(index: usize) -> Self {
        FrameId(u32::try_from(index).unwrap_or(u32::MAX))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// Scalar type names, `System` and every imported member, by
    /// qualified name.
    Global,
    /// Script `var`s; the script body is planned here.
    Script,
    Module(ModuleId),
    Clause,
    Function,
    TupleType,
    /// Body of a dereference or restriction. Binds nothing itself: the
    /// element's attributes, `value` and `index` are only known once the
    /// compiler has typed the target.
    Member,
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub parent: Option<FrameId>,
    pub kind: FrameKind,
    names: FxHashMap<QualifiedName, SymbolId>,
}

impl Frame {
    pub(crate) fn new(parent: Option<FrameId>, kind: FrameKind) -> Self {
        Frame {
            parent,
            kind,
            names: FxHashMap::default(),
        }
    }

    /// Exact lookup in this frame only.
    pub fn get(&self, name: &QualifiedName) -> Option<SymbolId> {
        self.names.get(name).copied()
    }

    /// Bind `name`, returning the symbol it replaces.
    pub(crate) fn insert(&mut self, name: QualifiedName, symbol: SymbolId) -> Option<SymbolId> {
        self.names.insert(name, symbol)
    }

    /// Distinct symbols whose registered name ends with `suffix`.
    pub(crate) fn suffix_matches(&self, suffix: &QualifiedName) -> Vec<SymbolId> {
        let mut found: Vec<SymbolId> = self
            .names
            .iter()
            .filter(|(name, _)| name.ends_with(suffix))
            .map(|(_, &symbol)| symbol)
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
