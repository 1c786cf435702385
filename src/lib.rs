#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::len_without_is_empty)]

extern crate alloc;

mod utils;
pub use utils::helper;

mod error;
pub use error::TreeError;

mod policy;
pub use policy::DuplicatePolicy;

mod traversal;
pub use traversal::Traversal;

mod tree;
pub use tree::{BalancedTree, FloatBalancedTree};
