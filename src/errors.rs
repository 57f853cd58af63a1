//! Errors

use core::fmt;

/// Which of the chip's limits a request ran into
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Limit {
    /// Reference oscillator outside 10 .. 40 MHz
    ReferenceFrequency,
    /// Requested output outside 8 kHz .. 160 MHz
    OutputFrequency,
    /// Output multisynth integer part outside 4 .. 900
    MultisynthDivider,
    /// Feedback multisynth integer part outside 15 .. 90
    PllMultiplier,
    /// VCO outside 600 .. 900 MHz
    VcoFrequency,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Limit::ReferenceFrequency => write!(f, "reference frequency"),
            Limit::OutputFrequency => write!(f, "output frequency"),
            Limit::MultisynthDivider => write!(f, "multisynth divider"),
            Limit::PllMultiplier => write!(f, "PLL multiplier"),
            Limit::VcoFrequency => write!(f, "VCO frequency"),
        }
    }
}

/// Divider planning errors, detected before anything touches the bus.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum PlanError {
    /// Requested settings can't be expressed within the chip's ranges
    OutOfRange(Limit),
    /// Fraction doesn't fit the 20 bit register fields or has a zero denominator
    FractionOverflow,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlanError::OutOfRange(l) => write!(f, "{} out of range", l),
            PlanError::FractionOverflow => write!(f, "fraction does not fit 20 bits"),
        }
    }
}

/// Driver errors, `E` is the bus transport error.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Error<E> {
    /// See [`PlanError::OutOfRange`]
    OutOfRange(Limit),
    /// See [`PlanError::FractionOverflow`]
    FractionOverflow,
    /// Bus read or write failed, passed through as is
    Transport(E),
}

impl<E> From<PlanError> for Error<E> {
    #[inline]
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::OutOfRange(l) => Error::OutOfRange(l),
            PlanError::FractionOverflow => Error::FractionOverflow,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OutOfRange(l) => write!(f, "{} out of range", l),
            Error::FractionOverflow => write!(f, "fraction does not fit 20 bits"),
            Error::Transport(e) => write!(f, "transport error: {:?}", e),
        }
    }
}
