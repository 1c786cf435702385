pub mod helper;

mod arena;
pub(crate) use arena::{Arena, NIL};
