//! GES kernel: the graph carrier of the equivalence search.
//!
//! # API Surface
//!
//! - [`graph`] -- variables, edges, [`graph::GraphStore`], DAG utilities
//! - [`knowledge`] -- background knowledge and its resolved index form
//! - [`operators`] -- Insert/Delete operators and their validity tests
//! - [`pattern`] -- pattern completion (basic pattern + knowledge + Meek)
//! - [`proof`] -- canonical JSON and domain-separated content hashing
//!
//! # Module Dependency Direction
//!
//! `graph` ← `knowledge` ← `operators` / `pattern` ← `proof`
//!
//! One-way only. No cycles. `graph` depends on nothing internal.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod graph;
pub mod knowledge;
pub mod operators;
pub mod pattern;
pub mod proof;
