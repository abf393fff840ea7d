//! The three kernel primitives, as traits.

use core::cell::Cell;

use crate::ErrorCode;

/// A callback registered with the kernel through [`Syscalls::subscribe`].
///
/// The kernel invokes the registered upcall when the subscribed operation
/// completes. The `&self` reference plays the role of the opaque user-data
/// pointer in the underlying ABI: it identifies which instance's state the
/// delivery belongs to, so a driver can implement `Upcall` on itself rather
/// than routing through a global.
///
/// Upcalls run on the same logical execution context as the code that
/// subscribed them. They are only ever delivered while that context is
/// suspended in [`Syscalls::yield_for`] (or an equivalent yield point), never
/// preemptively, so implementations may mutate `Cell`-based state without
/// locking. An upcall must never block.
pub trait Upcall {
    /// Deliver a completion. The meaning of the three arguments is defined
    /// by the driver that was subscribed to.
    fn upcall(&self, arg0: u32, arg1: u32, arg2: u32);
}

/// Access to the kernel's system call interface.
///
/// Implemented by the real syscall binding on hardware and by the fake
/// kernel in `userland-unittest`. The lifetime `'a` is the region the kernel
/// may hold subscribed upcall references for; drivers are parameterized over
/// it the same way.
pub trait Syscalls<'a> {
    /// Issue a command to a driver. Returns immediately with the driver's
    /// success payload, or the error code it rejected the command with
    /// (invalid argument, busy hardware, absent driver).
    fn command(&self, driver: u32, command: u32, argument: u32) -> Result<u32, ErrorCode>;

    /// Register `upcall` on a driver's subscription slot. A later subscribe
    /// on the same slot replaces the earlier upcall; at most one is active
    /// per slot.
    fn subscribe(
        &self,
        driver: u32,
        subscribe: u32,
        upcall: &'a dyn Upcall,
    ) -> Result<(), ErrorCode>;

    /// Suspend the calling context until `condition` reads true, yielding to
    /// the kernel. While suspended, the kernel may deliver any pending
    /// upcalls, including upcalls for unrelated drivers; one of them is
    /// expected to eventually set `condition`. There is no timeout: if no
    /// delivery ever sets the flag, this never returns.
    fn yield_for(&self, condition: &Cell<bool>);
}
