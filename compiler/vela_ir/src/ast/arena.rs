//! Flat storage for expressions and type expressions.

use std::fmt;

use smallvec::SmallVec;

use super::{BinaryOp, Expr, ExprKind, ParsedType};

/// Index of an [`Expr`] in an [`ExprArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// Index of a [`ParsedType`] in an [`ExprArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct ParsedTypeId(u32);

impl ParsedTypeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Contiguous run of expression ids stored in the arena's list pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ExprRange {
    start: u32,
    len: u32,
}

impl ExprRange {
    pub const EMPTY: ExprRange = ExprRange { start: 0, len: 0 };

    #[inline]
    pub const fn len(self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Operators of an n-ary binary node, parallel to its operand tail.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct OpRange {
    start: u32,
    len: u32,
}

impl OpRange {
    #[inline]
    pub const fn len(self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

fn to_u32(n: usize) -> u32 {
    // Arena sizes are bounded by the script length, which spans cap at u32.
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[derive(Clone, Default, Debug)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    lists: Vec<ExprId>,
    ops: Vec<BinaryOp>,
    types: Vec<ParsedType>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(to_u32(self.exprs.len()));
        self.exprs.push(expr);
        id
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn alloc_list(&mut self, items: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = to_u32(self.lists.len());
        self.lists.extend(items);
        ExprRange {
            start,
            len: to_u32(self.lists.len()) - start,
        }
    }

    #[inline]
    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        &self.lists[start..start + range.len()]
    }

    pub fn alloc_ops(&mut self, ops: impl IntoIterator<Item = BinaryOp>) -> OpRange {
        let start = to_u32(self.ops.len());
        self.ops.extend(ops);
        OpRange {
            start,
            len: to_u32(self.ops.len()) - start,
        }
    }

    #[inline]
    pub fn ops(&self, range: OpRange) -> &[BinaryOp] {
        let start = range.start as usize;
        &self.ops[start..start + range.len()]
    }

    pub fn alloc_type(&mut self, ty: ParsedType) -> ParsedTypeId {
        let id = ParsedTypeId(to_u32(self.types.len()));
        self.types.push(ty);
        id
    }

    #[inline]
    pub fn ty(&self, id: ParsedTypeId) -> &ParsedType {
        &self.types[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Every expression id, in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = ExprId> {
        (0..to_u32(self.exprs.len())).map(ExprId)
    }

    /// Direct sub-expressions of `id`, in evaluation order.
    pub fn children(&self, id: ExprId) -> SmallVec<[ExprId; 4]> {
        let mut out = SmallVec::new();
        match &self.get(id).kind {
            ExprKind::Literal(_) | ExprKind::Null | ExprKind::Ident(_) => {}
            ExprKind::Binary { operands, .. } => out.extend_from_slice(self.list(*operands)),
            ExprKind::Unary { operand, .. } => out.push(*operand),
            ExprKind::Deref { target, member } => {
                out.push(*target);
                out.push(*member);
            }
            ExprKind::Index { target, index } => {
                out.push(*target);
                out.push(*index);
            }
            ExprKind::Call { callee, args, .. } => {
                out.push(*callee);
                out.extend_from_slice(self.list(*args));
            }
            ExprKind::List(items) | ExprKind::Set(items) => {
                out.extend_from_slice(self.list(*items));
            }
            ExprKind::Tuple(tuple) => out.extend(tuple.attrs.iter().map(|a| a.value)),
            ExprKind::Function(func) => out.push(func.body),
            ExprKind::Clause(clause) => {
                out.extend(clause.fors.iter().map(|f| f.source));
                out.extend(clause.lets.iter().map(|l| l.value));
                out.extend(clause.filter);
                out.extend(clause.order.iter().map(|o| o.expr));
                out.push(clause.body);
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                out.push(*cond);
                out.push(*then_branch);
                out.push(*else_branch);
            }
            ExprKind::Case(case) => {
                out.extend(case.subject);
                for arm in &case.arms {
                    out.push(arm.when);
                    out.push(arm.then);
                }
                out.extend(case.else_branch);
            }
            ExprKind::Try { body, handler } => {
                out.push(*body);
                out.push(*handler);
            }
        }
        out
    }
}
