//! Types of the Vela language.
//!
//! [`Type`] is a tagged union: scalars, enumerations, `Set`/`List`,
//! `Optional`, tuples, functions and `Void`. Nothing here knows how to
//! evaluate a value; the compiler asks this crate two questions and
//! emits code from the answers:
//!
//! - can a value of type `A` be used where `B` is expected, and how
//!   ([`conversion`], [`common_type`])
//! - which operand and result types an operator has for a pair of
//!   operand types ([`binary`], [`unary`])
//!
//! Generic built-in signatures are instantiated by structural
//! unification in [`Signature::instantiate`].

mod convert;
mod flags;
mod ops;
mod ty;
mod unify;

pub use convert::{common_type, conversion, is_assignable, Conversion};
pub use flags::TypeFlags;
pub use ops::{binary, unary, BinarySig, UnarySig};
pub use ty::{Attribute, EnumType, FunctionType, Key, Reference, TupleError, TupleType, Type};
pub use unify::{Instance, Signature, SignatureError};

#[cfg(test)]
mod tests;
