//! Serial-line proxy for a physical RP2040/RP2350 interpolator
//!
//! Wraps the software model from `interp-emu` and mirrors every register
//! operation onto a device running the interpolator test firmware, so the two
//! implementations can be compared register for register.

pub mod protocol;
pub mod proxy;

pub use protocol::{HwError, SerialPort, Transport};
pub use proxy::HardwareInterp;
