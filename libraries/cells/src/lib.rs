//! Cell convenience types.

#![cfg_attr(not(test), no_std)]

mod optional_cell;

pub use optional_cell::OptionalCell;
