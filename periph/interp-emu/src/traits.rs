use crate::state::InterpState;

/// The register-level operation set of one interpolator.
///
/// Implemented by the pure software model and by hardware proxies that mirror
/// every operation onto a physical device; the associated error type lets the
/// proxies surface transport failures that the software model cannot have.
pub trait InterpOps {
    type Error;

    /// Write accumulator `i` (0-1).
    fn set_accum(&mut self, i: usize, value: u32) -> Result<(), Self::Error>;

    /// Write base register `i` (0-2).
    fn set_base(&mut self, i: usize, value: u32) -> Result<(), Self::Error>;

    /// Write the CTRL register of lane `i` (0-1).
    fn set_ctrl(&mut self, i: usize, value: u32) -> Result<(), Self::Error>;

    /// Add `value` to accumulator `i` (0-1), wrapping on overflow.
    fn add(&mut self, i: usize, value: u32) -> Result<(), Self::Error>;

    /// Packed write of BASE0 and BASE1 from the two 16-bit halves of `value`,
    /// sign-extended according to the lane signedness configuration.
    fn base01(&mut self, value: u32) -> Result<(), Self::Error>;

    /// Read lane result `i` (0-2) without side effects.
    fn peek(&mut self, i: usize) -> Result<u32, Self::Error>;

    /// Read the raw shift/mask/sign result of lane `i` (0-1), before the base
    /// adder, clamp, and blend stages.
    fn peekraw(&mut self, i: usize) -> Result<u32, Self::Error>;

    /// Read lane result `i` (0-2) and write results back into the
    /// accumulators, honoring each lane's cross-result routing.
    fn pop(&mut self, i: usize) -> Result<u32, Self::Error>;

    /// Snapshot the full register state, including derived outputs.
    fn save(&mut self) -> Result<InterpState, Self::Error>;

    /// Load the writable registers from a snapshot and rederive the outputs.
    /// The snapshot's derived fields are ignored.
    fn restore(&mut self, state: &InterpState) -> Result<(), Self::Error>;
}
