//! topounify-core: shared-arc unification (sans-IO).
//!
//! Takes a topology that has already been cut into arcs (index ranges over
//! one flat coordinate buffer) and detects arcs whose point sequences
//! coincide exactly, forward or reversed, with an earlier arc. Each such
//! duplicate is redirected onto the earlier arc's range, so a shared
//! boundary is stored once and referenced many times.
//!
//! Building blocks, leaves first:
//!
//! - [`points`]: point view over the coordinate buffer
//! - [`table`]: point-keyed hash table with a fixed, portable hash
//! - [`endpoint`]: arcs registered at each endpoint
//! - [`scan`]: lockstep coincidence walks between two arcs
//! - [`unify`](mod@unify): the driver
//!
//! This crate has **no I/O dependencies**. Reading topologies from disk
//! and writing shared-arc output lives in `topounify-export` and the CLI.

pub mod diagnostics;
pub mod endpoint;
pub mod points;
pub mod scan;
pub mod table;
pub mod types;
pub mod unify;

pub use types::{Arc, ArcId, Point, Topology, UnifyConfig, UnifyError};
pub use unify::{ArcAlias, InvalidAlias, Unification, unify, unify_with_config};
