//! The planner's output.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use vela_ir::ast::{ExprId, MemberDecl, ParsedTypeId};
use vela_ir::Span;

use crate::{Frame, FrameId, MemberRef, ModuleId, ModuleInfo, Symbol, SymbolId};

/// How an identifier expression was resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    Symbol(SymbolId),
    /// A simple name used inside one or more member frames (innermost
    /// first). It names an attribute, `value` or `index` of the element
    /// bound by one of those frames if that element has one; otherwise
    /// it means `fallback`.
    Member {
        scopes: SmallVec<[FrameId; 2]>,
        fallback: Option<SymbolId>,
    },
}

/// Bindings introduced by one `for` clause.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ForBinding {
    pub var: SymbolId,
    pub value: SymbolId,
    pub index: SymbolId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClauseBindings {
    pub frame: FrameId,
    pub fors: Vec<ForBinding>,
    pub lets: Vec<SymbolId>,
}

/// Code whose references are tracked for member compilation order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Script `var`s, assignments and body.
    Script,
    Member(MemberRef),
}

/// A member referenced from some owner, with the referencing span.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    pub member: MemberRef,
    pub span: Span,
}

/// Frames, symbols and per-node resolutions for one script.
#[derive(Debug, Default)]
pub struct Plan {
    pub(crate) frames: Vec<Frame>,
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) modules: Vec<ModuleInfo>,
    pub(crate) resolutions: FxHashMap<ExprId, Resolved>,
    pub(crate) type_names: FxHashMap<ParsedTypeId, SymbolId>,
    pub(crate) member_frames: FxHashMap<ExprId, FrameId>,
    pub(crate) clauses: FxHashMap<ExprId, ClauseBindings>,
    pub(crate) params: FxHashMap<ExprId, Vec<SymbolId>>,
    pub(crate) script_vars: Vec<SymbolId>,
    pub(crate) assignments: Vec<SymbolId>,
    pub(crate) deps: FxHashMap<Owner, Vec<Dependency>>,
    pub(crate) imports_system: bool,
}

impl Plan {
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.index()]
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn module(&self, id: ModuleId) -> &ModuleInfo {
        &self.modules[id.index()]
    }

    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    pub fn member(&self, member: MemberRef) -> &MemberDecl {
        self.module(member.module).member(member.index)
    }

    /// Resolution of an [`ExprKind::Ident`](vela_ir::ast::ExprKind::Ident)
    /// node.
    pub fn resolution(&self, expr: ExprId) -> Option<&Resolved> {
        self.resolutions.get(&expr)
    }

    /// Symbol a named type expression refers to.
    pub fn type_symbol(&self, ty: ParsedTypeId) -> Option<SymbolId> {
        self.type_names.get(&ty).copied()
    }

    /// Member frame opened by a dereference or single-argument call.
    pub fn member_frame(&self, expr: ExprId) -> Option<FrameId> {
        self.member_frames.get(&expr).copied()
    }

    pub fn clause(&self, expr: ExprId) -> Option<&ClauseBindings> {
        self.clauses.get(&expr)
    }

    /// Parameter symbols of a function selector.
    pub fn params(&self, expr: ExprId) -> &[SymbolId] {
        self.params.get(&expr).map_or(&[], Vec::as_slice)
    }

    /// Symbols of the script's `var`s, in declaration order.
    pub fn script_vars(&self) -> &[SymbolId] {
        &self.script_vars
    }

    /// Target symbol of each assignment, in statement order.
    pub fn assignments(&self) -> &[SymbolId] {
        &self.assignments
    }

    /// Members `owner` refers to, in first-reference order.
    pub fn dependencies(&self, owner: Owner) -> &[Dependency] {
        self.deps.get(&owner).map_or(&[], Vec::as_slice)
    }

    /// Whether `System` is among the imports.
    pub fn imports_system(&self) -> bool {
        self.imports_system
    }
}
