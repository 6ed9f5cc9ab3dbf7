//! Expression lowering.
//!
//! [`Compiler::compile_expr`] dispatches on the node kind; each family of
//! forms lives in its own submodule:
//!
//! - `names`: identifiers, including element-scope attributes
//! - `operators`: n-ary binary chains and unary operators
//! - `collections`: selectors, indexing, dereference and restriction
//! - `clause`: `for`/`let`/`where`/`order`/`return`
//! - `calls`: built-in, direct and indirect calls, function selectors
//! - `control`: `if`, `case` and `try`

mod calls;
mod clause;
mod collections;
mod control;
mod names;
mod operators;

use rustc_hash::FxHashMap;
use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::ast::{ExprArena, ExprId, ExprKind};
use vela_ir::{Literal, Span, StringInterner};
use vela_plan::{FrameId, MemberRef, Plan};
use vela_runtime::{convert, ShapeCache, StorageTarget, Value};
use vela_stack::ensure_sufficient_stack;
use vela_types::{conversion, Type};

use crate::code::{code, constant, Code, Compiled};
use crate::executable::FunctionDef;
use crate::members::MemberEntry;
use crate::scope::{Binding, ContextStack};

/// An active restriction or dereference body.
#[derive(Clone, Debug)]
pub(crate) struct ElementScope {
    pub(crate) element: Type,
    /// Whether `index` is bound; tuple dereferences have no position.
    pub(crate) position: bool,
}

pub(crate) struct Compiler<'a> {
    pub(crate) arena: &'a ExprArena,
    pub(crate) plan: &'a Plan,
    pub(crate) interner: &'a StringInterner,
    pub(crate) shapes: &'a ShapeCache,
    pub(crate) contexts: ContextStack,
    pub(crate) binding_types: FxHashMap<Binding, Type>,
    pub(crate) scopes: FxHashMap<FrameId, ElementScope>,
    pub(crate) members: FxHashMap<MemberRef, MemberEntry>,
    /// Resolved typedef and enum members; `None` while resolving.
    pub(crate) member_types: FxHashMap<MemberRef, Option<Type>>,
    pub(crate) globals: usize,
    pub(crate) functions: Vec<Option<FunctionDef>>,
    /// Annotated module functions whose bodies are still to compile.
    pub(crate) pending: Vec<MemberRef>,
    pub(crate) storage: Vec<StorageTarget>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(
        arena: &'a ExprArena,
        plan: &'a Plan,
        interner: &'a StringInterner,
        shapes: &'a ShapeCache,
    ) -> Self {
        Compiler {
            arena,
            plan,
            interner,
            shapes,
            contexts: ContextStack::new(),
            binding_types: FxHashMap::default(),
            scopes: FxHashMap::default(),
            members: FxHashMap::default(),
            member_types: FxHashMap::default(),
            globals: 0,
            functions: Vec::new(),
            pending: Vec::new(),
            storage: Vec::new(),
        }
    }

    pub(crate) fn compile_expr(&mut self, id: ExprId) -> Result<Compiled, Diagnostic> {
        ensure_sufficient_stack(|| self.compile_expr_inner(id))
    }

    fn compile_expr_inner(&mut self, id: ExprId) -> Result<Compiled, Diagnostic> {
        let arena = self.arena;
        let expr = arena.get(id);
        let span = expr.span;
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(Compiled::new(
                constant(Value::from_literal(literal, self.interner)),
                literal_type(literal),
            )),
            ExprKind::Null => Ok(Compiled::new(constant(Value::Null), Type::null())),
            ExprKind::Ident(name) => self.compile_ident(id, name, span),
            ExprKind::Binary { operands, ops } => {
                self.compile_binary(arena.list(*operands), arena.ops(*ops))
            }
            ExprKind::Unary { op, operand } => self.compile_unary(*op, *operand, span),
            ExprKind::Deref { target, member } => self.compile_deref(id, *target, *member, span),
            ExprKind::Index { target, index } => self.compile_index(*target, *index, span),
            ExprKind::Call {
                callee,
                type_args,
                args,
            } => self.compile_call(id, *callee, type_args, arena.list(*args), span),
            ExprKind::List(items) => self.compile_collection(arena.list(*items), true, span),
            ExprKind::Set(items) => self.compile_collection(arena.list(*items), false, span),
            ExprKind::Tuple(selector) => self.compile_tuple(selector, span),
            ExprKind::Function(func) => self.compile_function_selector(id, func),
            ExprKind::Clause(clause) => self.compile_clause(id, clause, span),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.compile_if(*cond, *then_branch, *else_branch, span),
            ExprKind::Case(case) => self.compile_case(case, span),
            ExprKind::Try { body, handler } => self.compile_try(*body, *handler, span),
        }
    }

    /// Code producing `compiled`'s value as a value of type `to`.
    pub(crate) fn coerce(
        &self,
        compiled: Compiled,
        to: &Type,
        span: Span,
    ) -> Result<Code, Diagnostic> {
        let Some(conv) = conversion(&compiled.ty, to) else {
            return Err(type_mismatch(span, to, &compiled.ty));
        };
        if conv.is_identity() {
            return Ok(compiled.code);
        }
        let inner = compiled.code;
        Ok(code(move |env| Ok(convert(inner(env)?, &conv))))
    }

    /// Compile `id` and require a value assignable to `to`.
    pub(crate) fn compile_as(&mut self, id: ExprId, to: &Type) -> Result<Code, Diagnostic> {
        let compiled = self.compile_expr(id)?;
        self.coerce(compiled, to, self.arena.get(id).span)
    }

    pub(crate) fn span(&self, id: ExprId) -> Span {
        self.arena.get(id).span
    }

    /// Declare `binding` in the innermost context with type `ty`.
    pub(crate) fn declare(&mut self, binding: Binding, ty: Type) -> usize {
        self.binding_types.insert(binding, ty);
        self.contexts.declare(binding)
    }

    /// Run `f` with the element scope of `frame` active.
    pub(crate) fn with_scope<T>(
        &mut self,
        frame: FrameId,
        scope: ElementScope,
        f: impl FnOnce(&mut Self) -> Result<T, Diagnostic>,
    ) -> Result<T, Diagnostic> {
        let previous = self.scopes.insert(frame, scope);
        let result = f(self);
        match previous {
            Some(previous) => self.scopes.insert(frame, previous),
            None => self.scopes.remove(&frame),
        };
        result
    }
}

pub(crate) fn literal_type(literal: &Literal) -> Type {
    match literal {
        Literal::Boolean(_) => Type::Boolean,
        Literal::Integer(_) => Type::Integer,
        Literal::Long(_) => Type::Long,
        Literal::Double(_) => Type::Double,
        Literal::String(_) => Type::String,
        Literal::Char(_) => Type::Char,
        Literal::Name(_) => Type::Name,
        Literal::DateTime(_) => Type::DateTime,
        Literal::TimeSpan(_) => Type::TimeSpan,
        Literal::Version(_) => Type::Version,
        Literal::Guid(_) => Type::Guid,
    }
}

pub(crate) fn type_mismatch(span: Span, expected: &Type, found: &Type) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3008)
        .with_message(format!("expected `{expected}`, found `{found}`"))
        .with_label(span, format!("this has type `{found}`"))
}

pub(crate) fn internal(message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9001).with_message(message)
}
