///! Device configuration

use crate::{constants::*, errors::*, register::*};


/// Reference and crystal settings, fixed for the lifetime of a device.
///
/// ```
/// use si5351::{config::Config, register::CrystalLoad};
///
/// let cfg = Config::default()
///     .reference(27_000_000)
///     .crystal_load(CrystalLoad::Load8pF);
/// assert_eq!(cfg.ref_hz, 27_000_000);
/// ```
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Config {
    /// Reference oscillator frequency, Hz
    pub ref_hz: u32,
    /// Crystal internal load capacitance
    pub crystal_load: CrystalLoad,
}

/// 25 MHz crystal with 10 pF load, the usual breakout board fit.
impl Default for Config {
    fn default() -> Self {
        Config {
            ref_hz: XTAL_FREQ_25MHZ,
            crystal_load: CrystalLoad::Load10pF,
        }
    }
}

impl Config {

    /// Sets reference oscillator frequency
    pub fn reference(mut self: Self, ref_hz: u32) -> Self {
        self.ref_hz = ref_hz;
        self
    }

    /// Sets crystal load capacitance
    pub fn crystal_load(mut self: Self, load: CrystalLoad) -> Self {
        self.crystal_load = load;
        self
    }

    /// Checks the settings against the chip's input range
    pub fn validate(self: &Self) -> Result<(), PlanError> {
        (if !(REF_FREQ_MIN ..= REF_FREQ_MAX).contains(&self.ref_hz) { Err(PlanError::OutOfRange(Limit::ReferenceFrequency)) } else { Ok(())} )?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.ref_hz, 25_000_000);
        assert_eq!(c.crystal_load, CrystalLoad::Load10pF);
        assert_eq!(c.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_reference() {
        assert_eq!(
            Config::default().reference(1_000_000).validate(),
            Err(PlanError::OutOfRange(Limit::ReferenceFrequency))
        );
        assert_eq!(
            Config::default().reference(100_000_000).validate(),
            Err(PlanError::OutOfRange(Limit::ReferenceFrequency))
        );
        assert!(Config::default().reference(XTAL_FREQ_27MHZ).validate().is_ok());
    }
}
