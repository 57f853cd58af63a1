///! Device

use log::{debug, trace, warn};

use crate::config::*;
use crate::constants::*;
use crate::errors::*;
use crate::frequency::*;
use crate::register::*;
use crate::transport::*;


/// Output channel, each one has its own multisynth
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Channel {
    Clk0,
    Clk1,
    Clk2,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Clk0, Channel::Clk1, Channel::Clk2];

    #[inline]
    pub fn index(self: Self) -> usize {
        self as usize
    }

    /// CLKx control register
    #[inline]
    pub fn control_register(self: Self) -> Register {
        const REGS: [Register; 3] = [Register::Clk0Control, Register::Clk1Control, Register::Clk2Control];
        REGS[self.index()]
    }

    /// First register of the MSx parameter block
    #[inline]
    pub fn multisynth_register(self: Self) -> Register {
        const REGS: [Register; 3] = [Register::Multisynth0, Register::Multisynth1, Register::Multisynth2];
        REGS[self.index()]
    }
}

impl Pll {
    #[inline]
    pub fn index(self: Self) -> usize {
        self as usize
    }

    /// First register of the feedback multisynth parameter block
    #[inline]
    pub fn register(self: Self) -> Register {
        match self {
            Pll::A => Register::PllA,
            Pll::B => Register::PllB,
        }
    }
}


/// Channel life cycle
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum ChannelState {
    /// Output driver powered down
    Disabled,
    /// Register writes in progress, or interrupted by a bus error
    Configuring,
    /// Running
    Enabled,
}

/// What the driver knows about an output channel
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct OutputChannel {
    pub state: ChannelState,
    /// PLL feeding the channel's multisynth
    pub pll: Pll,
    /// Output polarity inverted
    pub inverted: bool,
    /// Last dividers programmed by `set_frequency`
    pub plan: Option<Plan>,
}

impl Default for OutputChannel {
    fn default() -> Self {
        OutputChannel { state: ChannelState::Disabled, pll: Pll::A, inverted: false, plan: None }
    }
}


/// Si5351 (3 output variant) device.
///
/// The handle owns the bus transport, every operation that touches
/// registers needs `&mut self`. Both PLLs are shared by all channels and
/// a PLL reset always resets both of them, wrap the handle in a mutex
/// when more than one context programs the same chip.
pub struct Si5351<T> {
    transport: T,
    config: Config,
    channels: [OutputChannel; 3],
    /// Last programmed feedback multisynth settings, per PLL
    plls: [Option<DividerParams>; 2],
    /// Last programmed VCO frequency, per PLL
    vco_hz: [Option<u64>; 2],
}


impl<T> Si5351<T>
where T: Transport,
{
    /// Creates the device (unconfigured, registers untouched).
    pub fn new(transport: T, config: Config) -> Result<Self, Error<T::Error>> {
        config.validate()?;
        Ok(Si5351 {
            transport,
            config,
            channels: [OutputChannel::default(); 3],
            plls: [None; 2],
            vco_hz: [None; 2],
        })
    }

    /// Gives the transport back
    pub fn release(self: Self) -> T {
        self.transport
    }

    pub fn config(self: &Self) -> &Config {
        &self.config
    }

    /// Driver side view of a channel
    pub fn channel(self: &Self, channel: Channel) -> &OutputChannel {
        &self.channels[channel.index()]
    }

    /// VCO frequency last programmed into a PLL
    pub fn vco_hz(self: &Self, pll: Pll) -> Option<u64> {
        self.vco_hz[pll.index()]
    }

    /// Waits for the chip to finish its power up sequence,
    /// then puts it into a known state: all outputs disabled and powered down,
    /// both PLLs fed from the crystal.
    /// Blocking call.
    pub fn init(self: &mut Self) -> Result<(), Error<T::Error>> {
        nb::block!(self.poll_ready())?;

        self.enable_outputs(false)?;
        // OEB pin doesn't control the outputs
        self.write_register(Register::OebPinEnable, 0xFF)?;
        self.write_register(Register::PllInputSource, 0x00)?;

        for &ch in Channel::ALL.iter() {
            self.disable_output(ch)?;
        }

        let load = CrystalLoadReg::with_load(self.config.crystal_load);
        self.write_register(Register::CrystalLoad, load.w)?;

        self.plls = [None; 2];
        self.vco_hz = [None; 2];
        debug!("init done, xtal {} Hz", self.config.ref_hz);
        Ok(())
    }

    /// Device status register
    pub fn read_device_status(self: &mut Self) -> Result<DeviceStatus, Error<T::Error>> {
        Ok(DeviceStatus::new(self.read_register(Register::DeviceStatus)?))
    }

    /// `WouldBlock` until the chip is out of its power up initialization.
    pub fn poll_ready(self: &mut Self) -> nb::Result<(), Error<T::Error>> {
        let status = self.read_device_status()?;
        if status.initializing() {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    /// Sets `channel` to the frequency closest to `f_out_hz`, fed by `pll`,
    /// non-inverted, with all outputs enabled afterwards.
    /// See [`Si5351::set_frequency_with`].
    pub fn set_frequency(
        self: &mut Self,
        channel: Channel,
        pll: Pll,
        f_out_hz: u64,
    ) -> Result<Plan, Error<T::Error>> {
        self.set_frequency_with(channel, pll, f_out_hz, false, true)
    }

    /// Sets `channel` to the frequency closest to `f_out_hz`, fed by `pll`.
    ///
    /// Outputs are muted for the duration of the update and re-enabled
    /// at the end when `enable` is set, otherwise they stay disabled.
    /// The output polarity is set from `invert` on every call.
    /// If the PLL settings change both PLLs are reset, any other
    /// channel using the same PLL follows the new VCO frequency.
    ///
    /// Nothing is written when the frequency is out of range.
    /// On a bus error the channel is left in `Configuring`.
    pub fn set_frequency_with(
        self: &mut Self,
        channel: Channel,
        pll: Pll,
        f_out_hz: u64,
        invert: bool,
        enable: bool,
    ) -> Result<Plan, Error<T::Error>> {
        let plan = Plan::new(self.config.ref_hz, f_out_hz)?;

        self.channels[channel.index()].state = ChannelState::Configuring;
        self.enable_outputs(false)?;

        if self.plls[pll.index()] != Some(plan.pll) {
            for &other in Channel::ALL.iter() {
                let ch = &self.channels[other.index()];
                if other != channel && ch.pll == pll && ch.state == ChannelState::Enabled {
                    warn!("{:?} retunes {:?}, shared PLL {:?}", channel, other, pll);
                }
            }
            self.write_pll(pll, &plan.pll)?;
        }

        self.write_multisynth(channel, pll, &plan.ms, plan.r_div, invert)?;
        self.channels[channel.index()].plan = Some(plan);

        self.enable_outputs(enable)?;
        self.channels[channel.index()].state = ChannelState::Enabled;
        Ok(plan)
    }

    /// Programs a PLL with explicit settings and resets both PLLs.
    /// VCO = f_REF * (a + b / c), `a` in 15 ..= 90.
    ///
    /// Outputs are not muted, call [`Si5351::enable_outputs`] around it if needed.
    pub fn setup_pll(self: &mut Self, pll: Pll, params: &DividerParams) -> Result<(), Error<T::Error>> {
        params.check(PLL_MULT_MIN, PLL_MULT_MAX, Limit::PllMultiplier)?;

        let vco = (self.config.ref_hz as f64 * params.ratio()) as u64;
        (if !(VCO_FREQ_MIN ..= VCO_FREQ_MAX).contains(&vco) { Err(Error::OutOfRange(Limit::VcoFrequency)) } else { Ok(())} )?;

        self.write_pll(pll, params)
    }

    /// Programs a channel's output multisynth with explicit settings and powers the output up,
    /// non-inverted. f_OUT = f_VCO / (a + b / c) / R, `a` in 4 ..= 900.
    ///
    /// Outputs are not muted, call [`Si5351::enable_outputs`] around it if needed.
    pub fn setup_multisynth(
        self: &mut Self,
        channel: Channel,
        pll: Pll,
        params: &DividerParams,
        r_div: RDiv,
    ) -> Result<(), Error<T::Error>> {
        params.check(MS_DIV_MIN, MS_DIV_MAX, Limit::MultisynthDivider)?;

        self.channels[channel.index()].state = ChannelState::Configuring;
        self.channels[channel.index()].plan = None;
        self.write_multisynth(channel, pll, params, r_div, false)?;
        self.channels[channel.index()].state = ChannelState::Enabled;
        Ok(())
    }

    /// Enables (or disables) all outputs
    pub fn enable_outputs(self: &mut Self, enabled: bool) -> Result<(), Error<T::Error>> {
        let value = if enabled { OUTPUTS_ENABLED } else { OUTPUTS_DISABLED };
        self.write_register(Register::OutputEnable, value)
    }

    /// Powers a channel's output driver down, other channels keep running.
    pub fn disable_output(self: &mut Self, channel: Channel) -> Result<(), Error<T::Error>> {
        self.write_register(channel.control_register(), ClockControl::powered_down().w)?;
        self.channels[channel.index()].state = ChannelState::Disabled;
        Ok(())
    }

    /// Inverts (or restores) a channel's output polarity.
    /// Read-modify-write of the control register, other settings are kept.
    pub fn invert_output(self: &mut Self, channel: Channel, invert: bool) -> Result<(), Error<T::Error>> {
        let reg = channel.control_register();
        let ctrl = ClockControl::new(self.read_register(reg)?)
            .set(if invert { ClkInvert::Inverted } else { ClkInvert::Normal });
        self.write_register(reg, ctrl.w)?;
        self.channels[channel.index()].inverted = invert;
        Ok(())
    }


    /// Writes a PLL block followed by the PLL reset.
    fn write_pll(self: &mut Self, pll: Pll, params: &DividerParams) -> Result<(), Error<T::Error>> {
        // forget the old settings first, a failed write leaves the PLL unknown
        self.plls[pll.index()] = None;
        self.vco_hz[pll.index()] = None;

        self.write_block(pll.register(), &params.to_bytes(RDiv::Div1))?;
        self.reset_plls()?;

        self.plls[pll.index()] = Some(*params);
        self.vco_hz[pll.index()] = Some((self.config.ref_hz as f64 * params.ratio()) as u64);
        debug!("PLL {:?} {}+{}/{}", pll, params.a, params.frac.num, params.frac.denom);
        Ok(())
    }

    /// Writes an MS block and the channel control byte, output powered up.
    /// PLL binding and polarity are recorded once the control byte is written,
    /// channel state is left to the caller.
    fn write_multisynth(
        self: &mut Self,
        channel: Channel,
        pll: Pll,
        params: &DividerParams,
        r_div: RDiv,
        invert: bool,
    ) -> Result<(), Error<T::Error>> {
        self.write_block(channel.multisynth_register(), &params.to_bytes(r_div))?;

        let ctrl = ClockControl::for_multisynth(pll, params.is_integer(), invert);
        self.write_register(channel.control_register(), ctrl.w)?;

        let ch = &mut self.channels[channel.index()];
        ch.pll = pll;
        ch.inverted = invert;

        debug!("{:?} <- PLL {:?} ms {}+{}/{} R/{}", channel, pll, params.a, params.frac.num, params.frac.denom, r_div.divisor());
        Ok(())
    }

    /// Resets PLL A and PLL B, there is no single PLL reset.
    #[inline(always)]
    fn reset_plls(self: &mut Self) -> Result<(), Error<T::Error>> {
        self.write_register(Register::PllReset, PLL_RESET_BOTH)
    }

    #[inline(always)]
    fn write_register(self: &mut Self, reg: Register, value: u8) -> Result<(), Error<T::Error>> {
        trace!("reg {} <- {:#04x}", reg.addr(), value);
        self.transport.write_byte(reg.addr(), value).map_err(Error::Transport)
    }

    #[inline(always)]
    fn write_block(self: &mut Self, reg: Register, values: &[u8]) -> Result<(), Error<T::Error>> {
        trace!("reg {}.. <- {:02x?}", reg.addr(), values);
        self.transport.write_block(reg.addr(), values).map_err(Error::Transport)
    }

    #[inline(always)]
    fn read_register(self: &mut Self, reg: Register) -> Result<u8, Error<T::Error>> {
        self.transport.read_byte(reg.addr()).map_err(Error::Transport)
    }
}
