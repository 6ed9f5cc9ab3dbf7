//! Slot allocation for invocation frames.
//!
//! Each function body (and the script itself) gets a [`FnContext`]:
//! bindings live in numbered slots of its [`Env`](vela_runtime::Env).
//! Parameters take the first slots. A name bound by an enclosing body is
//! captured on first use: the closure copies the outer slot into a fresh
//! inner slot when it is created.

use rustc_hash::FxHashMap;
use vela_plan::{FrameId, SymbolId};

/// What a slot holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Binding {
    Symbol(SymbolId),
    /// Current element of a restriction or dereference body.
    Element(FrameId),
    /// Current position of a restriction or dereference body.
    Position(FrameId),
}

/// Copy `from` (a slot of the enclosing frame) into `to` at closure
/// creation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Capture {
    pub(crate) from: usize,
    pub(crate) to: usize,
}

#[derive(Debug, Default)]
pub(crate) struct FnContext {
    slots: usize,
    bindings: FxHashMap<Binding, usize>,
    captures: Vec<Capture>,
}

impl FnContext {
    fn alloc(&mut self) -> usize {
        self.slots += 1;
        self.slots - 1
    }

    pub(crate) fn frame_size(&self) -> usize {
        self.slots
    }

    pub(crate) fn into_captures(self) -> Vec<Capture> {
        self.captures
    }
}

/// Nested function contexts, outermost first.
#[derive(Debug, Default)]
pub(crate) struct ContextStack {
    contexts: Vec<FnContext>,
}

impl ContextStack {
    pub(crate) fn new() -> Self {
        ContextStack {
            contexts: vec![FnContext::default()],
        }
    }

    pub(crate) fn push(&mut self) {
        self.contexts.push(FnContext::default());
    }

    pub(crate) fn pop(&mut self) -> FnContext {
        self.contexts.pop().unwrap_or_default()
    }

    /// Frame size of the outermost context.
    pub(crate) fn root_frame_size(&self) -> usize {
        self.contexts.first().map_or(0, FnContext::frame_size)
    }

    /// Bind `binding` to a new slot of the innermost context.
    pub(crate) fn declare(&mut self, binding: Binding) -> usize {
        if self.contexts.is_empty() {
            self.contexts.push(FnContext::default());
        }
        let last = self.contexts.len() - 1;
        let ctx = &mut self.contexts[last];
        let slot = ctx.alloc();
        ctx.bindings.insert(binding, slot);
        slot
    }

    /// Slot of `binding` in the innermost context, capturing it through
    /// every enclosing context that does not bind it yet.
    pub(crate) fn slot(&mut self, binding: Binding) -> Option<usize> {
        let depth = self.contexts.len().checked_sub(1)?;
        self.slot_at(depth, binding)
    }

    fn slot_at(&mut self, depth: usize, binding: Binding) -> Option<usize> {
        if let Some(&slot) = self.contexts[depth].bindings.get(&binding) {
            return Some(slot);
        }
        let outer = self.slot_at(depth.checked_sub(1)?, binding)?;
        let ctx = &mut self.contexts[depth];
        let slot = ctx.alloc();
        ctx.bindings.insert(binding, slot);
        ctx.captures.push(Capture {
            from: outer,
            to: slot,
        });
        Some(slot)
    }
}
