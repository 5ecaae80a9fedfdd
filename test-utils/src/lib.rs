//! Shared helpers for the tests of the workspace crates.

mod approx_eq;
mod asset;

#[doc(hidden)]
pub use float_cmp::approx_eq;

pub use crate::{
    approx_eq::Leaves,
    asset::{catalogue, resolve_path, DATA_DIR},
};
