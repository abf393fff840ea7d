//! Sampling controller for the kernel's ADC driver.

use core::cell::Cell;

use log::{debug, trace};
use userland_cells::OptionalCell;
use userland_platform::{ErrorCode, Syscalls, Upcall};

/// Driver number of the kernel's ADC driver.
pub const DRIVER_NUM: u32 = 7;

/// Command IDs understood by the ADC driver.
pub mod command {
    /// Existence probe; every driver answers command 0.
    pub const EXISTS: u32 = 0;
    /// Power up and configure the converter.
    pub const INITIALIZE: u32 = 1;
    /// Start one conversion; the argument is the channel index.
    pub const SINGLE_SAMPLE: u32 = 2;
    /// Start repeated conversions; the argument packs channel and frequency,
    /// see [`Adc::sample_continuous`](super::Adc::sample_continuous).
    pub const CONTINUOUS_SAMPLE: u32 = 3;
}

/// Subscription slots of the ADC driver.
pub mod subscribe {
    /// A conversion completed; the upcall carries the raw reading.
    pub const SAMPLE_READY: u32 = 0;
}

/// Receives readings while continuous sampling is active.
pub trait Client {
    /// Called once per completed conversion, with the raw reading, in
    /// delivery order. Runs from the driver's upcall and must not block.
    fn sample_ready(&self, sample: u16);
}

/// Userland side of the ADC driver.
///
/// Holds the state shared between the registered upcall and a caller blocked
/// in [`Adc::read_single_sample`]: the latest raw reading and a fired flag.
/// Upcalls and callers run on the same logical execution context (upcalls
/// are only delivered while it is yielded), so plain cells are sufficient;
/// there is nothing to lock.
///
/// At most one request is outstanding at a time. Each instance is an
/// independent context: tests instantiate one per fake kernel.
pub struct Adc<'a, S: Syscalls<'a>> {
    syscalls: &'a S,
    sample: Cell<u16>,
    fired: Cell<bool>,
    client: OptionalCell<&'a dyn Client>,
}

impl<'a, S: Syscalls<'a>> Adc<'a, S> {
    pub const fn new(syscalls: &'a S) -> Adc<'a, S> {
        Adc {
            syscalls,
            sample: Cell::new(0),
            fired: Cell::new(false),
            client: OptionalCell::empty(),
        }
    }

    /// Whether the kernel has an ADC driver at all.
    pub fn exists(&self) -> bool {
        self.syscalls
            .command(DRIVER_NUM, command::EXISTS, 0)
            .is_ok()
    }

    /// Power up the converter. Must be called before sampling.
    pub fn initialize(&self) -> Result<(), ErrorCode> {
        self.syscalls
            .command(DRIVER_NUM, command::INITIALIZE, 0)
            .map(|_| ())
    }

    /// Request one conversion on `channel` without waiting for the result.
    /// The reading arrives through the `SAMPLE_READY` subscription.
    pub fn sample(&self, channel: u8) -> Result<(), ErrorCode> {
        self.syscalls
            .command(DRIVER_NUM, command::SINGLE_SAMPLE, u32::from(channel))
            .map(|_| ())
    }

    /// Request repeated conversions on `channel` at `frequency` Hz.
    ///
    /// The command carries a single 32-bit argument, so channel and
    /// frequency share it: channel in the low 8 bits, frequency in the
    /// remaining 24. The high 8 bits of `frequency` are dropped.
    pub fn sample_continuous(&self, channel: u8, frequency: u32) -> Result<(), ErrorCode> {
        let chan_freq = (frequency << 8) | u32::from(channel);
        self.syscalls
            .command(DRIVER_NUM, command::CONTINUOUS_SAMPLE, chan_freq)
            .map(|_| ())
    }

    /// Read one sample from `channel`, blocking until the conversion
    /// completes.
    ///
    /// Supersedes continuous sampling: any installed [`Client`] stops being
    /// invoked before the request is issued. Subscription or command
    /// rejections are returned as-is, with no retry.
    ///
    /// There is no timeout. If the hardware never completes, this never
    /// returns; the underlying yield primitive makes the same promise and a
    /// bounded wait has to be built above this interface. While blocked, the
    /// kernel may deliver upcalls for any other subscribed driver.
    ///
    /// The reading is the raw conversion code. For a 12-bit converter
    /// referenced at 3.3 V, `millivolts = reading * 3300 / 4095`.
    pub fn read_single_sample(&'a self, channel: u8) -> Result<u16, ErrorCode> {
        self.client.clear();
        // Clear before issuing the command: a stale flag from an earlier
        // read would end the wait without a genuine completion.
        self.fired.set(false);
        self.syscalls
            .subscribe(DRIVER_NUM, subscribe::SAMPLE_READY, self)?;
        self.sample(channel)?;

        self.syscalls.yield_for(&self.fired);

        let sample = self.sample.get();
        trace!("adc: channel {} read {:#06x}", channel, sample);
        Ok(sample)
    }

    /// Start relaying conversions on `channel` at `frequency` Hz to
    /// `client`, returning immediately.
    ///
    /// Every completed conversion invokes `client.sample_ready` until a
    /// [`Adc::read_single_sample`] call supersedes the stream or
    /// [`Adc::stop_continuous_sampling`] clears it. If subscription or
    /// command issuance is rejected the client is uninstalled again, so a
    /// failed start never leaves a partial relay behind.
    pub fn start_continuous_sampling(
        &'a self,
        channel: u8,
        frequency: u32,
        client: &'a dyn Client,
    ) -> Result<(), ErrorCode> {
        self.client.set(client);
        if let Err(error) = self
            .syscalls
            .subscribe(DRIVER_NUM, subscribe::SAMPLE_READY, self)
        {
            self.client.clear();
            debug!("adc: continuous subscribe rejected: {:?}", error);
            return Err(error);
        }
        if let Err(error) = self.sample_continuous(channel, frequency) {
            self.client.clear();
            debug!("adc: continuous command rejected: {:?}", error);
            return Err(error);
        }
        debug!("adc: continuous sampling channel {} at {} Hz", channel, frequency);
        Ok(())
    }

    /// Stop relaying readings to the continuous-mode client.
    ///
    /// The kernel ABI has no stop command, so the hardware keeps sampling
    /// until the next request; readings delivered in the meantime are
    /// recorded but no longer relayed.
    pub fn stop_continuous_sampling(&self) {
        self.client.clear();
    }
}

impl<'a, S: Syscalls<'a>> Upcall for Adc<'a, S> {
    fn upcall(&self, _callback_type: u32, _channel: u32, sample: u32) {
        let sample = sample as u16;
        self.sample.set(sample);
        self.fired.set(true);
        // A delivery with no one waiting and no client installed just
        // overwrote stale state; with one outstanding request at a time
        // that is harmless.
        self.client.map(|client| client.sample_ready(sample));
    }
}
