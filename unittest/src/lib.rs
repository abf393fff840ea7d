//! Scripted fake kernel for driver tests.
//!
//! [`FakeKernel`] implements the [`Syscalls`] boundary entirely in memory:
//! command results are scripted per (driver, command) pair, subscriptions
//! land in a table, and asynchronous completions are queued and delivered
//! at points the test controls, either explicitly via
//! [`FakeKernel::deliver_pending`] or from inside a blocked
//! [`Syscalls::yield_for`]. That makes interleavings deterministic: a test
//! decides exactly which completions exist before a driver blocks, and in
//! what order they arrive.

mod kernel;

pub use kernel::{Command, FakeKernel};
