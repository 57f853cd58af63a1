//! Si5351 registers

use core::marker::PhantomData;

use crate::{errors::*, fraction::*};


/// Register addresses used by the driver
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Register {
    DeviceStatus = 0,
    OutputEnable = 3,
    OebPinEnable = 9,
    PllInputSource = 15,
    Clk0Control = 16,
    Clk1Control = 17,
    Clk2Control = 18,
    PllA = 26,
    PllB = 34,
    Multisynth0 = 42,
    Multisynth1 = 50,
    Multisynth2 = 58,
    PllReset = 177,
    CrystalLoad = 183,
}

impl Register {
    #[inline]
    pub fn addr(self: Self) -> u8 {
        self as u8
    }
}


/// Register kind marker types
macro_rules! gen_register_marker {
    ($r:ident) => {
        /// Register kind marker
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        pub struct $r {}
    }
}

gen_register_marker!(ClkControl);
gen_register_marker!(Status);
gen_register_marker!(XtalLoad);
gen_register_marker!(MsConfig);


/// Single 8 bit register value
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Reg<R> {
    /// Register byte
    pub w: u8,
    phantom: PhantomData<R>,
}

impl<R> Default for Reg<R> {
    #[inline]
    fn default() -> Self { Reg::new(0) }
}

/// Bit operations on register bytes
impl<R> Reg<R> {
    #[inline]
    pub fn new(w: u8) -> Self {
        Reg { w, phantom: PhantomData }
    }

    #[inline]
    pub fn get<F>(self: &Self) -> F
    where F: Sized + BitField<R> + From<u8>
    {
        F::from(
            (self.w >> F::offset()) & F::mask()
        )
    }

    #[inline]
    pub fn set<F>(mut self: Self, f: F) -> Self
    where F: Sized + BitField<R> + Into<u8>
    {
        let fbits = (f.into() & F::mask()) << F::offset();
        let rbits = self.w & (! ( F::mask() << F::offset() ));
        self.w = rbits | fbits;
        self
    }
}


/// Bit operations on 8bit registers
pub trait BitField<R> {
    /// Number of bits in the bit field
    fn num_bits() -> u8;

    /// Offset from 0
    fn offset() -> u8;

    #[inline]
    fn mask() -> u8 {
        !(0xFFu8.checked_shl(Self::num_bits() as u32).unwrap_or(0))
    }
}

/// Generate BitField implementation
macro_rules! gen_bitfield_impl {
	($r:ty, $n:ident, $nb:tt, $off:tt) => {
        impl BitField<$r> for $n {
            #[inline] fn num_bits() -> u8 { $nb }
            #[inline] fn offset() -> u8 { $off }
        }
    }
}

/// Small bitfield-encoded numbers boilerplate
macro_rules! gen_bitfield_struct {
	($(#[$meta:meta])*, $r:ty, $n:ident, $nb:tt, $off:tt) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        pub struct $n(pub u8);

        gen_bitfield_impl!($r, $n, $nb, $off);

        impl From<u8> for $n { #[inline] fn from(x: u8) -> Self { $n(x) } }
        impl From<$n> for u8 { #[inline] fn from(x: $n) -> u8 { x.0 } }
	};
}

/// Enum bitfields, variants listed in bit value order, one per value
macro_rules! gen_bitfield_enum {
	($r:ty, $n:ident, $nb:tt, $off:tt, [$($v:ident),+]) => {
        gen_bitfield_impl!($r, $n, $nb, $off);

        impl From<u8> for $n {
            #[inline]
            fn from(x: u8) -> Self {
                const VALUES: &[$n] = &[$($n::$v),+];
                VALUES[x as usize % VALUES.len()]
            }
        }
        impl From<$n> for u8 { #[inline] fn from(x: $n) -> u8 { x as u8 } }
    }
}


/// CLKx_PDN, powers the output driver down
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum ClkPowerDown {
    PoweredUp,
    PoweredDown,
}
gen_bitfield_enum!(ClkControl, ClkPowerDown, 1, 7, [PoweredUp, PoweredDown]);


/// MSx_INT, integer mode for the output multisynth.
/// Set when the fractional part is zero, improves jitter.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum MsIntegerMode {
    Fractional,
    Integer,
}
gen_bitfield_enum!(ClkControl, MsIntegerMode, 1, 6, [Fractional, Integer]);


/// MSx_SRC, which PLL feeds the output multisynth
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Pll {
    A,
    B,
}
gen_bitfield_enum!(ClkControl, Pll, 1, 5, [A, B]);


/// CLKx_INV, inverts the output clock
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum ClkInvert {
    Normal,
    Inverted,
}
gen_bitfield_enum!(ClkControl, ClkInvert, 1, 4, [Normal, Inverted]);


/// CLKx_SRC, what drives the output.
/// The driver always uses the channel's own multisynth.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum ClkSource {
    Xtal,
    ClkIn,
    MultisynthAlt,
    Multisynth,
}
gen_bitfield_enum!(ClkControl, ClkSource, 2, 2, [Xtal, ClkIn, MultisynthAlt, Multisynth]);


/// CLKx_IDRV, output drive strength
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum DriveStrength {
    Drive2mA,
    Drive4mA,
    Drive6mA,
    Drive8mA,
}
gen_bitfield_enum!(ClkControl, DriveStrength, 2, 0, [Drive2mA, Drive4mA, Drive6mA, Drive8mA]);


/// Rx_DIV, power of two output divider following the multisynth.
/// Extends the output range down to ~8 kHz.
#[derive(Debug,Copy,Clone,PartialEq,Eq,PartialOrd,Ord)]
pub enum RDiv {
    Div1,
    Div2,
    Div4,
    Div8,
    Div16,
    Div32,
    Div64,
    Div128,
}
gen_bitfield_enum!(MsConfig, RDiv, 3, 4, [Div1, Div2, Div4, Div8, Div16, Div32, Div64, Div128]);

impl RDiv {
    /// Exponent, output is divided by `2^exponent`
    #[inline]
    pub fn exponent(self: Self) -> u32 {
        self as u32
    }

    /// Divide ratio
    #[inline]
    pub fn divisor(self: Self) -> u32 {
        1 << self.exponent()
    }
}


gen_bitfield_struct!(
    /// MSx_P1[17:16], top bits of P1 share a byte with Rx_DIV
    , MsConfig, P1High, 2, 0
);


/// Clock control register (16, 17, 18)
pub type ClockControl = Reg<ClkControl>;

impl ClockControl {
    /// Control byte for a channel fed by its own multisynth at 8 mA.
    pub fn for_multisynth(pll: Pll, integer: bool, invert: bool) -> Self {
        Self::default()
            .set(ClkPowerDown::PoweredUp)
            .set(if integer { MsIntegerMode::Integer } else { MsIntegerMode::Fractional })
            .set(pll)
            .set(if invert { ClkInvert::Inverted } else { ClkInvert::Normal })
            .set(ClkSource::Multisynth)
            .set(DriveStrength::Drive8mA)
    }

    /// Control byte of a powered down output
    pub fn powered_down() -> Self {
        Self::default().set(ClkPowerDown::PoweredDown)
    }
}


gen_bitfield_struct!(
    /// SYS_INIT, device is still initializing after power up
    , Status, SysInit, 1, 7
);
gen_bitfield_struct!(
    /// LOL_B, PLL B lost lock
    , Status, LolB, 1, 6
);
gen_bitfield_struct!(
    /// LOL_A, PLL A lost lock
    , Status, LolA, 1, 5
);
gen_bitfield_struct!(
    /// LOS, CLKIN signal lost
    , Status, Los, 1, 4
);

/// Device status register (0)
pub type DeviceStatus = Reg<Status>;

impl DeviceStatus {
    #[inline]
    pub fn initializing(self: &Self) -> bool {
        self.get::<SysInit>().0 != 0
    }

    #[inline]
    pub fn pll_locked(self: &Self, pll: Pll) -> bool {
        match pll {
            Pll::A => self.get::<LolA>().0 == 0,
            Pll::B => self.get::<LolB>().0 == 0,
        }
    }

    #[inline]
    pub fn clkin_lost(self: &Self) -> bool {
        self.get::<Los>().0 != 0
    }
}


/// XTAL_CL, crystal internal load capacitance
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum CrystalLoad {
    /// Reserved on the chip, don't use
    Reserved,
    Load6pF,
    Load8pF,
    Load10pF,
}
gen_bitfield_enum!(XtalLoad, CrystalLoad, 2, 6, [Reserved, Load6pF, Load8pF, Load10pF]);

/// Crystal load register (183).
/// Low bits must be written as 0b010010.
pub type CrystalLoadReg = Reg<XtalLoad>;

impl CrystalLoadReg {
    pub fn with_load(load: CrystalLoad) -> Self {
        Self::new(0b0001_0010).set(load)
    }
}


/// Multisynth parameters `a + b / c`, shared encoding of the
/// PLL feedback and the output multisynth blocks.
///
/// ```text
/// P1[17:0] = 128 * a + floor(128 * b / c) - 512
/// P2[19:0] = 128 * b - c * floor(128 * b / c)
/// P3[19:0] = c
/// ```
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct DividerParams {
    /// Integer part
    pub a: u32,
    /// Fractional part
    pub frac: Fraction,
}

impl DividerParams {

    /// Integer only ratio
    pub fn integer(a: u32) -> Self {
        DividerParams { a, frac: Fraction::ZERO }
    }

    /// Ratio with a fractional part
    pub fn new(a: u32, frac: Fraction) -> Self {
        DividerParams { a, frac }
    }

    #[inline]
    fn frac_128(self: &Self) -> u32 {
        128 * self.frac.num / self.frac.denom
    }

    /// P1 (18 bits)
    #[inline]
    pub fn p1(self: &Self) -> u32 {
        (128 * self.a + self.frac_128()).saturating_sub(512)
    }

    /// P2 (20 bits)
    #[inline]
    pub fn p2(self: &Self) -> u32 {
        128 * self.frac.num - self.frac.denom * self.frac_128()
    }

    /// P3 (20 bits)
    #[inline]
    pub fn p3(self: &Self) -> u32 {
        self.frac.denom
    }

    /// True when there is no fractional part
    #[inline]
    pub fn is_integer(self: &Self) -> bool {
        self.frac.is_zero()
    }

    /// Ratio as a number
    #[inline]
    pub fn ratio(self: &Self) -> f64 {
        self.a as f64 + self.frac.value()
    }

    /// Check the integer part against `min ..= max`
    pub fn check(self: &Self, min: u32, max: u32, limit: Limit) -> Result<(), PlanError> {
        if !(min ..= max).contains(&self.a) {
            return Err(PlanError::OutOfRange(limit));
        }
        Fraction::new(self.frac.num, self.frac.denom)?;
        Ok(())
    }

    /// Register block in device format, 8 consecutive registers.
    /// `r_div` is only meaningful for output multisynths, PLL blocks pass `RDiv::Div1`.
    pub fn to_bytes(self: &Self, r_div: RDiv) -> [u8; 8] {
        let p1 = self.p1();
        let p2 = self.p2();
        let p3 = self.p3();

        let b2 = Reg::<MsConfig>::default()
            .set(P1High(((p1 >> 16) & 0x03) as u8))
            .set(r_div);

        [
            ((p3 >> 8) & 0xFF) as u8,
            ( p3       & 0xFF) as u8,
            b2.w,
            ((p1 >> 8) & 0xFF) as u8,
            ( p1       & 0xFF) as u8,
            (((p3 >> 12) & 0xF0) | ((p2 >> 16) & 0x0F)) as u8,
            ((p2 >> 8) & 0xFF) as u8,
            ( p2       & 0xFF) as u8,
        ]
    }

    /// Decode a register block written by [`DividerParams::to_bytes`].
    pub fn from_bytes(bytes: &[u8; 8]) -> (Self, RDiv) {
        let b2 = Reg::<MsConfig>::new(bytes[2]);
        let p1_high : P1High = b2.get();
        let r_div : RDiv = b2.get();

        let p1 = ((p1_high.0 as u32) << 16) | ((bytes[3] as u32) << 8) | bytes[4] as u32;
        let p2 = (((bytes[5] & 0x0F) as u32) << 16) | ((bytes[6] as u32) << 8) | bytes[7] as u32;
        let p3 = (((bytes[5] & 0xF0) as u32) << 12) | ((bytes[0] as u32) << 8) | bytes[1] as u32;

        // 128 * b = P2 + c * floor(128 * b / c), and that floor is P1's low 7 bits
        let c = p3.max(1);
        let p1 = p1 + 512;
        let frac_128 = p1 & 0x7F;
        let a = p1 >> 7;
        let b = (p2 + c * frac_128) / 128;

        let frac = if b == 0 { Fraction::ZERO } else { Fraction { num: b, denom: c } };
        (DividerParams { a, frac }, r_div)
    }
}
