//! Type capability flags.

use bitflags::bitflags;

bitflags! {
    /// What a type supports, computed by [`Type::flags`](crate::Type::flags).
    ///
    /// Operator typing and built-in constraints test these instead of
    /// listing types.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeFlags: u16 {
        /// `=` and `<>`.
        const EQUATABLE = 1 << 0;
        /// `< <= > >= ?=` and sorting.
        const ORDERED = 1 << 1;
        /// Arithmetic.
        const NUMERIC = 1 << 2;
        /// Bitwise operators, shifts, `..` and `++`.
        const INTEGRAL = 1 << 3;
        const SCALAR = 1 << 4;
        /// `DateTime` and `TimeSpan`.
        const TEMPORAL = 1 << 5;
        const COLLECTION = 1 << 6;
        const OPTIONAL = 1 << 7;
        const TUPLE = 1 << 8;
        const FUNCTION = 1 << 9;
    }
}
