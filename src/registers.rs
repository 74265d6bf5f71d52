#![allow(missing_docs)]
use bilge::prelude::*;

/// Register addresses
#[derive(Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Temperature register address.
    Temperature,

    /// Configuration register address.
    Configuration,

    /// Temperature low limit (T-Low) register address.
    LowLimit,

    /// Temperature high limit (T-High) register address.
    HighLimit,
}

impl From<Register> for u8 {
    fn from(reg: Register) -> Self {
        match reg {
            Register::Temperature => 0,
            Register::Configuration => 1,
            Register::LowLimit => 2,
            Register::HighLimit => 3,
        }
    }
}

/// Temperature register. The T-Low and T-High registers share this layout:
/// a left-justified 12-bit two's complement value, 0.0625℃ per bit.
#[bitsize(16)]
#[derive(Clone, Copy, DebugBits, FromBits, PartialEq)]
pub struct Temperature {
    reserved0_3: u4,
    counts: u12,
}

impl Temperature {
    /// Weight of one bit of the 12-bit value.
    pub const CELSIUS_PER_BIT: f32 = 0.0625;

    const MIN_COUNTS: i16 = -2048;
    const MAX_COUNTS: i16 = 2047;

    /// Build from the two bytes as they come off the bus, MSB first.
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self::from(u16::from_be_bytes(bytes))
    }

    /// The two bytes to put on the bus, MSB first.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 2] {
        u16::from(self).to_be_bytes()
    }

    /// Signed 12-bit value. Bit 11 is the sign; it is copied into the upper
    /// bits so the result is a proper two's complement `i16`.
    #[allow(clippy::cast_possible_wrap)]
    #[must_use]
    pub fn signed_counts(&self) -> i16 {
        let mut value = self.counts().value();
        if value & (1 << 11) != 0 {
            value |= 0xF800;
        }
        value as i16
    }

    /// Temperature in degrees Celsius.
    ///
    /// The weight is the same at every resolution: lower resolutions leave
    /// the unused least significant bits at zero.
    #[must_use]
    pub fn celsius(&self) -> f32 {
        f32::from(self.signed_counts()) * Self::CELSIUS_PER_BIT
    }

    /// Temperature in degrees Fahrenheit.
    #[must_use]
    pub fn fahrenheit(&self) -> f32 {
        crate::celsius_to_fahrenheit(self.celsius())
    }

    /// Encode a temperature in degrees Celsius, truncated toward zero and
    /// clamped to the -128℃..=127.9375℃ range of the register.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn from_celsius(celsius: f32) -> Self {
        let counts = ((celsius / Self::CELSIUS_PER_BIT) as i16).clamp(Self::MIN_COUNTS, Self::MAX_COUNTS);
        Self::from((counts << 4) as u16)
    }
}

/// Configuration register.
#[bitsize(8)]
#[derive(Clone, Copy, DebugBits, FromBits, PartialEq)]
pub struct Configuration {
    /// Shutdown mode
    pub sd: ShutdownMode,

    /// Thermostat mode
    pub tm: ThermostatMode,

    /// Alert polarity
    pub pol: Polarity,

    /// Fault queue
    pub fq: FaultQueue,

    /// Converter resolution
    pub res: Resolution,

    /// One-shot conversion start. Reads back the alert state.
    pub os: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::from(0b0000_0000)
    }
}

impl Configuration {
    /// Configure shutdown mode.
    #[must_use]
    pub fn with_sd(mut self, mode: ShutdownMode) -> Self {
        self.set_sd(mode);
        Self::from(self.value)
    }

    /// Configure thermostat mode.
    #[must_use]
    pub fn with_tm(mut self, mode: ThermostatMode) -> Self {
        self.set_tm(mode);
        Self::from(self.value)
    }

    /// Configure alert polarity.
    #[must_use]
    pub fn with_pol(mut self, polarity: Polarity) -> Self {
        self.set_pol(polarity);
        Self::from(self.value)
    }

    /// Configure fault queue.
    #[must_use]
    pub fn with_fq(mut self, faults: FaultQueue) -> Self {
        self.set_fq(faults);
        Self::from(self.value)
    }

    /// Configure converter resolution.
    #[must_use]
    pub fn with_res(mut self, resolution: Resolution) -> Self {
        self.set_res(resolution);
        Self::from(self.value)
    }

    /// Configure one-shot bit.
    #[must_use]
    pub fn with_os(mut self, os: bool) -> Self {
        self.set_os(os);
        Self::from(self.value)
    }
}

/// Shutdown mode.
#[bitsize(1)]
#[derive(Clone, Copy, Debug, FromBits, PartialEq, PartialOrd)]
pub enum ShutdownMode {
    /// Continuous conversion (default).
    Normal,

    /// Shutdown all device circuitry other than the serial interface. Each
    /// temperature read starts a one-shot conversion.
    Shutdown,
}

/// Thermostat mode.
#[bitsize(1)]
#[derive(Clone, Copy, Debug, FromBits, PartialEq, PartialOrd)]
pub enum ThermostatMode {
    /// Comparator mode for the thermostat.
    Comparator,

    /// Interrupt mode for the thermostat.
    Interrupt,
}

/// Polarity
#[bitsize(1)]
#[derive(Clone, Copy, Debug, FromBits, PartialEq, PartialOrd)]
pub enum Polarity {
    /// Active low (default).
    ActiveLow,

    /// Active high.
    ActiveHigh,
}

/// Number of consecutive faults needed to trip the alert.
#[bitsize(2)]
#[derive(Clone, Copy, Debug, FromBits, PartialEq, PartialOrd)]
pub enum FaultQueue {
    One,
    Two,
    Four,
    Six,
}

/// Converter resolution.
#[bitsize(2)]
#[derive(Clone, Copy, Debug, FromBits, PartialEq, PartialOrd)]
pub enum Resolution {
    /// 0.5℃, 40ms typical conversion (default).
    Bits9,

    /// 0.25℃, 80ms typical conversion.
    Bits10,

    /// 0.125℃, 160ms typical conversion.
    Bits11,

    /// 0.0625℃, 320ms typical conversion.
    Bits12,
}

impl Resolution {
    /// Number of significant bits, 9 through 12.
    #[must_use]
    pub fn bits(&self) -> u8 {
        match self {
            Resolution::Bits9 => 9,
            Resolution::Bits10 => 10,
            Resolution::Bits11 => 11,
            Resolution::Bits12 => 12,
        }
    }
}
