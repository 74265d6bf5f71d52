//! This is a platform-agnostic Rust driver for the TMP100 temperature sensor
//! based on the [`embedded-hal`] traits.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//!
//! For further details of the device architecture and operation, please refer
//! to the official [`Datasheet`].
//!
//! [`Datasheet`]: https://www.ti.com/lit/gpn/tmp100

#![doc(html_root_url = "https://docs.rs/tmp100/latest")]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]

mod registers;
pub use registers::*;

#[cfg(feature = "async")]
pub mod asynchronous;

pub mod blocking;

/// Time allowed for a one-shot conversion to settle before the temperature
/// register is read. Covers the worst case 12-bit conversion.
pub(crate) const ONE_SHOT_SETTLE_MS: u32 = 350;

/// Convert a temperature in degrees Celsius to degrees Fahrenheit.
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    1.8 * celsius + 32.0
}

/// ADD0/ADD1 pin logic level representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pin {
    /// Pin tied to GND (default).
    #[default]
    Gnd,
    /// Pin tied to V+.
    Vplus,
    /// Pin left floating.
    Float,
}

/// I2C address selected by the ADD1 and ADD0 pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address {
    add1: Pin,
    add0: Pin,
}

impl Address {
    /// Address for the given pin strapping. Returns `None` when both pins
    /// float, which the device does not decode.
    #[must_use]
    pub fn new(add1: Pin, add0: Pin) -> Option<Self> {
        match (add1, add0) {
            (Pin::Float, Pin::Float) => None,
            _ => Some(Self { add1, add0 }),
        }
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        match (address.add1, address.add0) {
            (Pin::Gnd, Pin::Gnd) | (Pin::Float, Pin::Float) => 0b100_1000,
            (Pin::Gnd, Pin::Float) => 0b100_1001,
            (Pin::Gnd, Pin::Vplus) => 0b100_1010,
            (Pin::Float, Pin::Gnd) => 0b100_1011,
            (Pin::Vplus, Pin::Gnd) => 0b100_1100,
            (Pin::Vplus, Pin::Float) => 0b100_1101,
            (Pin::Vplus, Pin::Vplus) => 0b100_1110,
            (Pin::Float, Pin::Vplus) => 0b100_1111,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn pin_strapping_selects_address() {
        let cases = [
            (Pin::Gnd, Pin::Gnd, 0x48),
            (Pin::Gnd, Pin::Float, 0x49),
            (Pin::Gnd, Pin::Vplus, 0x4a),
            (Pin::Float, Pin::Gnd, 0x4b),
            (Pin::Vplus, Pin::Gnd, 0x4c),
            (Pin::Vplus, Pin::Float, 0x4d),
            (Pin::Vplus, Pin::Vplus, 0x4e),
            (Pin::Float, Pin::Vplus, 0x4f),
        ];

        for (add1, add0, expected) in cases {
            let address = Address::new(add1, add0).unwrap();
            assert_eq!(u8::from(address), expected);
        }

        assert!(Address::new(Pin::Float, Pin::Float).is_none());
        assert_eq!(u8::from(Address::default()), 0x48);
    }

    #[test]
    fn fahrenheit_fixtures() {
        assert_approx_eq!(celsius_to_fahrenheit(0.0), 32.0, 1e-4);
        assert_approx_eq!(celsius_to_fahrenheit(100.0), 212.0, 1e-4);
        assert_approx_eq!(celsius_to_fahrenheit(-40.0), -40.0, 1e-4);
    }
}
