//! Grammar productions, split by construct.
//!
//! - `script.rs`: statements (`using`, `module`, `var`, assignments)
//! - `expr.rs`: the binary precedence cascade, unary and postfix operators
//! - `primary.rs`: terms, selectors, `if`/`case`/`try`
//! - `clause.rs`: `for`/`let`/`where`/`order`/`return` comprehensions
//! - `ty.rs`: type expressions

mod clause;
mod expr;
mod primary;
mod script;
mod ty;
