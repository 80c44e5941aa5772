//! Blocking delay abstraction

/// Bounded blocking delays
///
/// Used for settle times between register or pin transitions. A delay
/// blocks the calling thread only; it never yields control of the device
/// the caller holds.
pub trait DelayHal {
    /// Blocks for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<D: DelayHal + ?Sized> DelayHal for &mut D {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms);
    }
}
