//! Userland ADC driver.
//!
//! The kernel's ADC driver is purely asynchronous: userland issues a command
//! and a conversion result arrives later as an upcall. This crate fakes a
//! synchronous single-sample read on top of that, and exposes continuous
//! sampling by relaying every delivered reading to a caller-supplied client.
//!
//! ```
//! use userland_adc::{subscribe, Adc, DRIVER_NUM};
//! use userland_unittest::FakeKernel;
//!
//! let kernel = FakeKernel::new();
//! let adc = Adc::new(&kernel);
//! adc.initialize().unwrap();
//!
//! // The hardware will complete one conversion on channel 1.
//! kernel.schedule_upcall(DRIVER_NUM, subscribe::SAMPLE_READY, (0, 1, 0x0800));
//! assert_eq!(adc.read_single_sample(1), Ok(2048));
//! ```

#![cfg_attr(not(test), no_std)]

mod adc;

pub use adc::{command, subscribe, Adc, Client, DRIVER_NUM};
