//! Operators module: Chickering's Insert and Delete operators and their
//! validity conditions.
//!
//! Depends on `graph`. Does not import from `pattern` or `proof`.

pub mod apply;
pub mod validity;
