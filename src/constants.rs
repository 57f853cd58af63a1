//! Constants

/// Default 7-bit I2C address (ADDR pin low)
pub const I2C_ADDRESS_DEFAULT: u8 = 0x60;

/// 25 MHz crystal, the most common Si5351A module fit
pub const XTAL_FREQ_25MHZ: u32 = 25_000_000;

/// 27 MHz crystal
pub const XTAL_FREQ_27MHZ: u32 = 27_000_000;

/// Minimum allowed reference frequency
pub const REF_FREQ_MIN: u32 = 10_000_000;

/// Maximum allowed reference frequency (no CLKIN divider)
pub const REF_FREQ_MAX: u32 = 40_000_000;

/// PLL VCO min frequency
pub const VCO_FREQ_MIN: u64 = 600_000_000;

/// PLL VCO max frequency
pub const VCO_FREQ_MAX: u64 = 900_000_000;

/// The VCO frequency the planner aims for.
/// Middle of the VCO band.
pub const VCO_FREQ_TARGET: u64 = 800_000_000;

/// Feedback multisynth integer part range
pub const PLL_MULT_MIN: u32 = 15;
pub const PLL_MULT_MAX: u32 = 90;

/// Output multisynth integer part range
pub const MS_DIV_MIN: u32 = 4;
pub const MS_DIV_MAX: u32 = 900;

/// Fractional numerator / denominator are 20 bit wide
pub const FRAC_BITS: u32 = 20;

/// Largest value a 20 bit numerator or denominator can hold
pub const FRAC_MAX: u32 = (1 << FRAC_BITS) - 1;

/// Lowest multisynth output the planner is willing to use,
/// R divider brings lower targets up to this.
pub const SYNTH_OUT_MIN_FREQ: u64 = 1_000_000;

/// Lowest output frequency,
/// 1 MHz multisynth output and divide-by-128 R divider, rounded up.
pub const OUT_FREQ_MIN: u64 = 8_000;

/// Highest output frequency
pub const OUT_FREQ_MAX: u64 = 160_000_000;

/// PLL reset register value, resets PLL A and PLL B together.
pub const PLL_RESET_BOTH: u8 = (1 << 7) | (1 << 5);

/// Output enable register value: all CLKx outputs enabled
pub const OUTPUTS_ENABLED: u8 = 0x00;

/// Output enable register value: all CLKx outputs disabled
pub const OUTPUTS_DISABLED: u8 = 0xFF;
