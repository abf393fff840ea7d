//! The fake kernel proper.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use log::trace;
use userland_platform::{decode_status, ErrorCode, Syscalls, Upcall};

/// A record of one `command` call, in issue order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    pub driver: u32,
    pub command: u32,
    pub argument: u32,
}

/// One queued completion, not yet delivered.
#[derive(Clone, Copy, Debug)]
struct Pending {
    driver: u32,
    subscribe: u32,
    args: (u32, u32, u32),
}

/// An in-memory kernel with scripted behavior.
///
/// Every `command` and `subscribe` succeeds unless a test scripts a failure
/// with [`FakeKernel::fail_command`] / [`FakeKernel::fail_subscribe`].
/// Scripted results are stored as the raw signed statuses the real ABI
/// returns and run through [`decode_status`] on the way out, so the
/// status-code mapping is exercised on every call.
pub struct FakeKernel<'a> {
    subscriptions: RefCell<Vec<(u32, u32, &'a dyn Upcall)>>,
    command_results: RefCell<Vec<(u32, u32, isize)>>,
    subscribe_results: RefCell<Vec<(u32, u32, isize)>>,
    pending: RefCell<VecDeque<Pending>>,
    commands: RefCell<Vec<Command>>,
    yields: Cell<usize>,
}

impl<'a> FakeKernel<'a> {
    pub fn new() -> FakeKernel<'a> {
        FakeKernel {
            subscriptions: RefCell::new(Vec::new()),
            command_results: RefCell::new(Vec::new()),
            subscribe_results: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            commands: RefCell::new(Vec::new()),
            yields: Cell::new(0),
        }
    }

    /// Script `command(driver, command, _)` to fail with `error`. The
    /// scripted result persists across calls.
    pub fn fail_command(&self, driver: u32, command: u32, error: ErrorCode) {
        self.command_results
            .borrow_mut()
            .push((driver, command, isize::from(error)));
    }

    /// Script `subscribe(driver, subscribe, _)` to fail with `error`.
    pub fn fail_subscribe(&self, driver: u32, subscribe: u32, error: ErrorCode) {
        self.subscribe_results
            .borrow_mut()
            .push((driver, subscribe, isize::from(error)));
    }

    /// Queue a completion for a driver's subscription slot, as if the
    /// hardware finished an operation. Nothing is delivered until the
    /// context yields or the test calls [`FakeKernel::deliver_pending`].
    pub fn schedule_upcall(&self, driver: u32, subscribe: u32, args: (u32, u32, u32)) {
        self.pending.borrow_mut().push_back(Pending {
            driver,
            subscribe,
            args,
        });
    }

    /// Deliver the oldest queued completion, if any. A completion for a slot
    /// nothing is subscribed to is dropped, as the real kernel drops upcalls
    /// for processes that never registered one. Returns whether a completion
    /// was dequeued.
    pub fn deliver_next(&self) -> bool {
        let next = self.pending.borrow_mut().pop_front();
        let Some(event) = next else {
            return false;
        };
        // Copy the upcall reference out before invoking it: the upcall may
        // re-enter the kernel (subscribe, command) from its handler.
        let upcall = self
            .subscriptions
            .borrow()
            .iter()
            .find(|(driver, subscribe, _)| *driver == event.driver && *subscribe == event.subscribe)
            .map(|(_, _, upcall)| *upcall);
        match upcall {
            Some(upcall) => {
                trace!(
                    "fake kernel: upcall ({}, {}) args {:?}",
                    event.driver,
                    event.subscribe,
                    event.args
                );
                upcall.upcall(event.args.0, event.args.1, event.args.2);
            }
            None => trace!(
                "fake kernel: dropping upcall ({}, {}), no subscriber",
                event.driver,
                event.subscribe
            ),
        }
        true
    }

    /// Deliver every queued completion, in order.
    pub fn deliver_pending(&self) {
        while self.deliver_next() {}
    }

    /// All commands issued so far, in order.
    pub fn commands(&self) -> Vec<Command> {
        self.commands.borrow().clone()
    }

    /// The most recent command, if any.
    pub fn last_command(&self) -> Option<Command> {
        self.commands.borrow().last().copied()
    }

    pub fn pending_upcalls(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_subscribed(&self, driver: u32, subscribe: u32) -> bool {
        self.subscriptions
            .borrow()
            .iter()
            .any(|(d, s, _)| *d == driver && *s == subscribe)
    }

    /// How many times a context has blocked in `yield_for`.
    pub fn yield_count(&self) -> usize {
        self.yields.get()
    }

    fn scripted(results: &RefCell<Vec<(u32, u32, isize)>>, driver: u32, id: u32) -> isize {
        results
            .borrow()
            .iter()
            .find(|(d, i, _)| *d == driver && *i == id)
            .map_or(0, |(_, _, status)| *status)
    }
}

impl<'a> Syscalls<'a> for FakeKernel<'a> {
    fn command(&self, driver: u32, command: u32, argument: u32) -> Result<u32, ErrorCode> {
        self.commands.borrow_mut().push(Command {
            driver,
            command,
            argument,
        });
        decode_status(Self::scripted(&self.command_results, driver, command))
    }

    fn subscribe(
        &self,
        driver: u32,
        subscribe: u32,
        upcall: &'a dyn Upcall,
    ) -> Result<(), ErrorCode> {
        decode_status(Self::scripted(&self.subscribe_results, driver, subscribe))?;
        let mut subscriptions = self.subscriptions.borrow_mut();
        // One active upcall per slot; a new subscribe replaces it.
        match subscriptions
            .iter_mut()
            .find(|(d, s, _)| *d == driver && *s == subscribe)
        {
            Some(entry) => entry.2 = upcall,
            None => subscriptions.push((driver, subscribe, upcall)),
        }
        Ok(())
    }

    fn yield_for(&self, condition: &Cell<bool>) {
        self.yields.set(self.yields.get() + 1);
        while !condition.get() {
            // A real kernel would suspend here until more work arrived. With
            // scripted completions an empty queue means the flag can never
            // flip, which is a test bug, not a valid blocked state.
            assert!(
                self.deliver_next(),
                "yield_for would block forever: no pending upcalls can set the condition"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingUpcall {
        seen: RefCell<Vec<(u32, u32, u32)>>,
    }

    impl CountingUpcall {
        fn new() -> CountingUpcall {
            CountingUpcall {
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Upcall for CountingUpcall {
        fn upcall(&self, arg0: u32, arg1: u32, arg2: u32) {
            self.seen.borrow_mut().push((arg0, arg1, arg2));
        }
    }

    #[test]
    fn commands_succeed_by_default_and_are_logged() {
        let kernel = FakeKernel::new();
        assert_eq!(kernel.command(7, 1, 0), Ok(0));
        assert_eq!(
            kernel.last_command(),
            Some(Command {
                driver: 7,
                command: 1,
                argument: 0
            })
        );
    }

    #[test]
    fn scripted_command_failure_is_returned() {
        let kernel = FakeKernel::new();
        kernel.fail_command(7, 2, ErrorCode::Busy);
        assert_eq!(kernel.command(7, 2, 1), Err(ErrorCode::Busy));
        // Other commands on the same driver are untouched.
        assert_eq!(kernel.command(7, 1, 0), Ok(0));
    }

    #[test]
    fn upcalls_are_delivered_in_order() {
        let kernel = FakeKernel::new();
        let upcall = CountingUpcall::new();
        kernel.subscribe(7, 0, &upcall).unwrap();
        kernel.schedule_upcall(7, 0, (0, 1, 10));
        kernel.schedule_upcall(7, 0, (0, 1, 20));
        kernel.deliver_pending();
        assert_eq!(*upcall.seen.borrow(), vec![(0, 1, 10), (0, 1, 20)]);
    }

    #[test]
    fn unsubscribed_upcall_is_dropped() {
        let kernel = FakeKernel::new();
        kernel.schedule_upcall(3, 0, (0, 0, 0));
        kernel.deliver_pending();
        assert_eq!(kernel.pending_upcalls(), 0);
    }

    #[test]
    fn resubscribe_replaces_the_upcall() {
        let kernel = FakeKernel::new();
        let first = CountingUpcall::new();
        let second = CountingUpcall::new();
        kernel.subscribe(7, 0, &first).unwrap();
        kernel.subscribe(7, 0, &second).unwrap();
        kernel.schedule_upcall(7, 0, (0, 0, 1));
        kernel.deliver_pending();
        assert!(first.seen.borrow().is_empty());
        assert_eq!(second.seen.borrow().len(), 1);
    }

    #[test]
    #[should_panic(expected = "yield_for would block forever")]
    fn yield_with_nothing_pending_is_a_test_bug() {
        let kernel = FakeKernel::new();
        let flag = Cell::new(false);
        kernel.yield_for(&flag);
    }
}
