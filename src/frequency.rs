///! Frequency calculations

use log::debug;

use crate::{constants::*, errors::*, fraction::*, register::*};


impl RDiv {

    /// Smallest R divider that keeps the multisynth output
    /// at or above `SYNTH_OUT_MIN_FREQ` for a given target.
    pub fn select(f_out_hz: u64) -> RDiv {
        const DIVIDERS: [RDiv; 7] = [
            RDiv::Div128,
            RDiv::Div64,
            RDiv::Div32,
            RDiv::Div16,
            RDiv::Div8,
            RDiv::Div4,
            RDiv::Div2,
        ];

        // R = 2^r is needed when f_out < SYNTH_OUT_MIN / 2^(r-1)
        DIVIDERS.iter()
            .copied()
            .find(|r| f_out_hz < SYNTH_OUT_MIN_FREQ >> (r.exponent() - 1))
            .unwrap_or(RDiv::Div1)
    }
}


/// Complete divider chain for one output:
/// ```text
/// f_VCO = f_REF * (pll.a + pll.b / pll.c)
/// f_OUT = f_VCO / (ms.a + ms.b / ms.c) / R
/// ```
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Plan {
    /// Reference oscillator, Hz
    pub ref_hz: u32,
    /// Feedback multisynth (PLL multiplier)
    pub pll: DividerParams,
    /// Output multisynth divider
    pub ms: DividerParams,
    /// Output R divider
    pub r_div: RDiv,
    /// VCO frequency the plan was built for, Hz
    pub vco_hz: u64,
}

impl Plan {

    /// Dividers for an output frequency close to `f_out_hz`.
    ///
    /// The VCO is aimed at 800 MHz, the multisynth divider is picked first
    /// and the PLL fraction absorbs whatever the multisynth fraction lost.
    pub fn new(ref_hz: u32, f_out_hz: u64) -> Result<Self, PlanError> {
        Plan::with_r_div(ref_hz, f_out_hz, RDiv::select(f_out_hz))
    }

    /// Same as [`Plan::new`] with an explicit R divider.
    pub fn with_r_div(ref_hz: u32, f_out_hz: u64, r_div: RDiv) -> Result<Self, PlanError> {
        (if !(REF_FREQ_MIN ..= REF_FREQ_MAX).contains(&ref_hz) { Err(PlanError::OutOfRange(Limit::ReferenceFrequency)) } else { Ok(())} )?;
        (if !(OUT_FREQ_MIN ..= OUT_FREQ_MAX).contains(&f_out_hz) { Err(PlanError::OutOfRange(Limit::OutputFrequency)) } else { Ok(())} )?;

        let ms_freq = f_out_hz << r_div.exponent();

        let ms_int = VCO_FREQ_TARGET / ms_freq;
        (if !(MS_DIV_MIN as u64 ..= MS_DIV_MAX as u64).contains(&ms_int) { Err(PlanError::OutOfRange(Limit::MultisynthDivider)) } else { Ok(())} )?;

        let ms_rem = VCO_FREQ_TARGET - ms_freq * ms_int;
        let ms = DividerParams::new(ms_int as u32, Fraction::reduce(ms_rem, ms_freq));

        // f_VCO = ms_freq * (a + b/c), truncated to whole Hz
        let c = ms.frac.denom as u64;
        let vco_hz = ms_freq * (ms.a as u64 * c + ms.frac.num as u64) / c;
        (if !(VCO_FREQ_MIN ..= VCO_FREQ_MAX).contains(&vco_hz) { Err(PlanError::OutOfRange(Limit::VcoFrequency)) } else { Ok(())} )?;

        let ref_hz64 = ref_hz as u64;
        let pll_int = vco_hz / ref_hz64;
        (if !(PLL_MULT_MIN as u64 ..= PLL_MULT_MAX as u64).contains(&pll_int) { Err(PlanError::OutOfRange(Limit::PllMultiplier)) } else { Ok(())} )?;

        let pll_rem = vco_hz - ref_hz64 * pll_int;
        let pll = DividerParams::new(pll_int as u32, Fraction::reduce(pll_rem, ref_hz64));

        let plan = Plan { ref_hz, pll, ms, r_div, vco_hz };
        debug!(
            "plan {} Hz: R/{} ms {}+{}/{} pll {}+{}/{} vco {} Hz",
            f_out_hz, r_div.divisor(),
            ms.a, ms.frac.num, ms.frac.denom,
            pll.a, pll.frac.num, pll.frac.denom,
            vco_hz,
        );
        Ok(plan)
    }

    /// Actual VCO frequency the PLL settings produce, Hz
    pub fn f_vco(self: &Self) -> f64 {
        self.ref_hz as f64 * self.pll.ratio()
    }

    /// Actual output frequency
    pub fn f_out(self: &Self) -> f64 {
        self.f_vco() / self.ms.ratio() / self.r_div.divisor() as f64
    }

    /// Actual output frequency, rounded to whole Hz.
    /// f_OUT = f_REF * (pa * pc + pb) * mc / (pc * (ma * mc + mb) * R)
    pub fn f_out_hz(self: &Self) -> u64 {
        let pll_c = self.pll.frac.denom as u128;
        let ms_c = self.ms.frac.denom as u128;

        let num = self.ref_hz as u128
            * (self.pll.a as u128 * pll_c + self.pll.frac.num as u128)
            * ms_c;
        let den = pll_c
            * (self.ms.a as u128 * ms_c + self.ms.frac.num as u128)
            * self.r_div.divisor() as u128;

        ((num + den / 2) / den) as u64
    }
}
