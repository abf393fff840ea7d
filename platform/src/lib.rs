//! Kernel boundary for userland drivers.
//!
//! The kernel exposes hardware exclusively through three primitives:
//! `command` issues a request and returns immediately, `subscribe` registers
//! a callback delivered when an asynchronous operation completes, and
//! `yield_for` suspends the calling context until a flag becomes true,
//! servicing pending callbacks in the meantime. This crate defines those
//! primitives as traits so drivers can be written against any provider: a
//! real syscall binding on hardware, or a scripted fake in tests.

#![cfg_attr(not(test), no_std)]

pub mod errorcode;
pub mod syscalls;

pub use errorcode::{decode_status, ErrorCode};
pub use syscalls::{Syscalls, Upcall};
