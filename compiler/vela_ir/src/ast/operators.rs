//! Binary and unary operators.

/// Precedence levels, lowest binding first.
///
/// Every level is left-associative; the parser accumulates one n-ary node
/// per level.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Precedence {
    /// `in or xor like matches ifnull`
    Connector,
    /// `and`
    And,
    /// `& | ^ << >>`
    Bitwise,
    /// `= <> < <= > >= ?=`
    Comparison,
    /// `+ -`
    Additive,
    /// `* / %`
    Multiplicative,
    /// `..`
    Interval,
    /// `**`
    Exponent,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Connectors
    In,
    Or,
    Xor,
    Like,
    Matches,
    IfNull,

    And,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Compare,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Interval,
    Power,
}

impl BinaryOp {
    /// Source-level spelling, for diagnostics.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Like => "like",
            Self::Matches => "matches",
            Self::IfNull => "ifnull",
            Self::And => "and",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Compare => "?=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Interval => "..",
            Self::Power => "**",
        }
    }

    pub const fn precedence(self) -> Precedence {
        match self {
            Self::In | Self::Or | Self::Xor | Self::Like | Self::Matches | Self::IfNull => {
                Precedence::Connector
            }
            Self::And => Precedence::And,
            Self::BitAnd | Self::BitOr | Self::BitXor | Self::Shl | Self::Shr => {
                Precedence::Bitwise
            }
            Self::Eq
            | Self::NotEq
            | Self::Lt
            | Self::LtEq
            | Self::Gt
            | Self::GtEq
            | Self::Compare => Precedence::Comparison,
            Self::Add | Self::Sub => Precedence::Additive,
            Self::Mul | Self::Div | Self::Mod => Precedence::Multiplicative,
            Self::Interval => Precedence::Interval,
            Self::Power => Precedence::Exponent,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    /// `not`
    Not,
    /// `-`
    Neg,
    /// `~`
    BitNot,
    /// `exists`
    Exists,
    /// `isnull`
    IsNull,
    /// `++`
    Successor,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Neg => "-",
            Self::BitNot => "~",
            Self::Exists => "exists",
            Self::IsNull => "isnull",
            Self::Successor => "++",
        }
    }
}
