use std::fmt;

/// Phase that raised a diagnostic, derived from the code's first digit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Phase {
    Lexical,
    Syntax,
    Planning,
    Compilation,
    Runtime,
    Limit,
    Internal,
}

/// Error codes for all processor diagnostics.
///
/// Format: E#### where the first digit is the phase:
/// - E0xxx: lexical errors
/// - E1xxx: syntax errors
/// - E2xxx: planning (name resolution) errors
/// - E3xxx: compilation (typing) errors
/// - E4xxx: runtime faults
/// - E5xxx: service-level limits
/// - E9xxx: internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexical (E0xxx)
    /// Unterminated string literal
    E0001,
    /// Illegal character
    E0002,
    /// Invalid numeric literal
    E0003,
    /// Invalid escape sequence
    E0004,
    /// Character literal is not exactly one character
    E0005,
    /// Invalid character code
    E0006,
    /// Unterminated block comment
    E0007,
    /// Unexpected end of input
    E0008,
    /// Unknown literal suffix
    E0009,
    /// Literal text does not parse as its suffix's type
    E0010,

    // Syntax (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Expected identifier
    E1003,
    /// Expected type
    E1004,
    /// Input remains after the script
    E1005,
    /// Invalid version number
    E1006,
    /// Malformed clause expression
    E1007,

    // Planning (E2xxx)
    /// Unknown identifier
    E2001,
    /// Identifier conflict
    E2002,
    /// Rooted identifier outside a reference position
    E2003,
    /// Symbol of the wrong kind
    E2004,
    /// No storage instance for an imported module variable
    E2005,
    /// Unknown module or no matching version
    E2006,
    /// Key or reference names an undeclared attribute
    E2007,

    // Compilation (E3xxx)
    /// Operator not supported for the operand type
    E3001,
    /// Generic parameter unresolved or mismatched
    E3002,
    /// Recursive declaration
    E3003,
    /// Invoking a value that is not a function
    E3004,
    /// Invalid `for` source type
    E3005,
    /// Cannot infer attribute name
    E3006,
    /// Ambiguous reference
    E3007,
    /// Type mismatch
    E3008,
    /// Wrong number of arguments
    E3009,
    /// Invalid assignment target
    E3010,
    /// Unknown attribute
    E3011,

    // Runtime (E4xxx)
    /// Host or storage fault
    E4001,
    /// Division by zero
    E4002,
    /// Arithmetic overflow
    E4003,
    /// Index out of range
    E4004,
    /// Invalid argument to a built-in
    E4005,
    /// Several concurrent evaluations failed
    E4006,
    /// Execution cancelled
    E4007,

    // Limits (E5xxx)
    /// Maximum execution time exceeded
    E5001,
    /// Maximum row count exceeded
    E5002,

    // Internal (E9xxx)
    /// Internal processor error
    E9001,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E0007 => "E0007",
            ErrorCode::E0008 => "E0008",
            ErrorCode::E0009 => "E0009",
            ErrorCode::E0010 => "E0010",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::E3009 => "E3009",
            ErrorCode::E3010 => "E3010",
            ErrorCode::E3011 => "E3011",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E4006 => "E4006",
            ErrorCode::E4007 => "E4007",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E9001 => "E9001",
        }
    }

    pub const fn phase(&self) -> Phase {
        match self.as_str().as_bytes()[1] {
            b'0' => Phase::Lexical,
            b'1' => Phase::Syntax,
            b'2' => Phase::Planning,
            b'3' => Phase::Compilation,
            b'4' => Phase::Runtime,
            b'5' => Phase::Limit,
            _ => Phase::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_leading_digit() {
        assert_eq!(ErrorCode::E0008.phase(), Phase::Lexical);
        assert_eq!(ErrorCode::E2001.phase(), Phase::Planning);
        assert_eq!(ErrorCode::E3007.phase(), Phase::Compilation);
        assert_eq!(ErrorCode::E5001.phase(), Phase::Limit);
        assert_eq!(ErrorCode::E9001.phase(), Phase::Internal);
    }
}
