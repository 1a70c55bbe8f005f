//! Planning core of the monthly duty roster.
//!
//! A pure function over a relational snapshot: the [`context`] module
//! assembles and validates the snapshot, [`compiler`] turns it into a
//! mixed-integer model with hard coverage/quota/coupling constraints and a
//! weighted soft objective, and [`solver`] drives the MILP engine and maps
//! the result back to `(employee, shift instance)` pairs. Storage and the
//! public planning operation live in the companion `roster_store` crate.

pub mod compiler;
pub mod context;
pub mod solver;
pub mod types;
