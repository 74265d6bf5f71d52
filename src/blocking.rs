//! Tmp100 Blocking API

#[cfg(feature = "embedded-sensors-hal")]
use embedded_sensors_hal::sensor;
#[cfg(feature = "embedded-sensors-hal")]
use embedded_sensors_hal::temperature::{DegreesCelsius, TemperatureSensor};

use super::{Address, Configuration, Register, Resolution, ShutdownMode, Temperature, ONE_SHOT_SETTLE_MS};

/// TMP100 blocking device driver
pub struct Tmp100<I2C: embedded_hal::i2c::I2c, DELAY: embedded_hal::delay::DelayNs> {
    /// The concrete I2C bus implementation
    i2c: I2C,

    /// The concrete [`embedded_hal::delay::DelayNs`] implementation
    delay: DELAY,

    /// The I2C address.
    pub(crate) addr: u8,

    /// Last shutdown mode written by this driver.
    mode: ShutdownMode,
}

impl<I2C: embedded_hal::i2c::I2c, DELAY: embedded_hal::delay::DelayNs> Tmp100<I2C, DELAY> {
    /// Create a new TMP100 instance.
    pub fn new_blocking(i2c: I2C, delay: DELAY, address: Address) -> Self {
        Self::new_blocking_with_raw_address(i2c, delay, address.into())
    }

    /// Create a new TMP100 instance with ADD1 and ADD0 tied to GND,
    /// resulting in an instance responding to address `0x48`.
    pub fn new_blocking_with_default_address(i2c: I2C, delay: DELAY) -> Self {
        Self::new_blocking(i2c, delay, Address::default())
    }

    /// Create a new TMP100 instance responding to the given 7-bit address.
    pub fn new_blocking_with_raw_address(i2c: I2C, delay: DELAY, addr: u8) -> Self {
        Self {
            i2c,
            delay,
            addr,
            mode: ShutdownMode::Normal,
        }
    }

    /// Destroy the driver instance, return the I2C bus instance.
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    /// Put the device in continuous conversion mode, keeping the current
    /// resolution.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        self.configure(None, ShutdownMode::Normal)
    }

    /// Put the device in continuous conversion mode at the given resolution.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn init_with_resolution(&mut self, resolution: Resolution) -> Result<(), I2C::Error> {
        self.configure(Some(resolution), ShutdownMode::Normal)
    }

    /// Configure resolution and shutdown mode in one register update.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn init_with_resolution_and_mode(
        &mut self,
        resolution: Resolution,
        mode: ShutdownMode,
    ) -> Result<(), I2C::Error> {
        self.configure(Some(resolution), mode)
    }

    /// Read configuration register
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn configuration(&mut self) -> Result<Configuration, I2C::Error> {
        let value = self.read_register(Register::Configuration)?;
        self.select_register(Register::Temperature)?;
        Ok(Configuration::from(value))
    }

    /// Set configuration register. The cached shutdown mode follows the
    /// written value.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn set_configuration(&mut self, config: Configuration) -> Result<(), I2C::Error> {
        self.write_register(Register::Configuration, config.into())?;
        self.mode = config.sd();
        self.select_register(Register::Temperature)
    }

    /// Read converter resolution
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn resolution(&mut self) -> Result<Resolution, I2C::Error> {
        Ok(self.configuration()?.res())
    }

    /// Set converter resolution, leaving every other configuration bit as is.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), I2C::Error> {
        self.update_configuration(|config| config.set_res(resolution))
    }

    /// Shutdown mode last written by this driver. No bus traffic: a change
    /// made to the device by anyone else is not seen here.
    pub fn shutdown_mode(&self) -> ShutdownMode {
        self.mode
    }

    /// Set shutdown mode, leaving every other configuration bit as is.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn set_shutdown_mode(&mut self, mode: ShutdownMode) -> Result<(), I2C::Error> {
        self.update_configuration(|config| config.set_sd(mode))
    }

    /// Read temperature in degrees Fahrenheit. In shutdown mode a one-shot
    /// conversion is started first.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails. If the one-shot start
    /// fails, the pointer may be left on the configuration register; the
    /// next temperature read re-addresses it.
    pub fn temperature(&mut self) -> Result<f32, I2C::Error> {
        Ok(self.sample()?.fahrenheit())
    }

    /// Read temperature in degrees Celsius. In shutdown mode a one-shot
    /// conversion is started first.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn temperature_celsius(&mut self) -> Result<f32, I2C::Error> {
        Ok(self.sample()?.celsius())
    }

    /// Read temperature low limit register, in degrees Celsius
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn low_limit(&mut self) -> Result<f32, I2C::Error> {
        self.read_limit(Register::LowLimit)
    }

    /// Set temperature low limit register, in degrees Celsius
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn set_low_limit(&mut self, limit: f32) -> Result<(), I2C::Error> {
        self.write_limit(Register::LowLimit, limit)
    }

    /// Read temperature high limit register, in degrees Celsius
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn high_limit(&mut self) -> Result<f32, I2C::Error> {
        self.read_limit(Register::HighLimit)
    }

    /// Set temperature high limit register, in degrees Celsius
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub fn set_high_limit(&mut self, limit: f32) -> Result<(), I2C::Error> {
        self.write_limit(Register::HighLimit, limit)
    }

    fn configure(&mut self, resolution: Option<Resolution>, mode: ShutdownMode) -> Result<(), I2C::Error> {
        self.update_configuration(|config| {
            if let Some(resolution) = resolution {
                config.set_res(resolution);
            }
            config.set_sd(mode);
        })
    }

    fn update_configuration<F>(&mut self, f: F) -> Result<(), I2C::Error>
    where
        F: FnOnce(&mut Configuration),
    {
        let mut config = Configuration::from(self.read_register(Register::Configuration)?);
        f(&mut config);
        self.write_register(Register::Configuration, config.into())?;
        self.mode = config.sd();
        self.select_register(Register::Temperature)
    }

    fn sample(&mut self) -> Result<Temperature, I2C::Error> {
        if self.mode == ShutdownMode::Shutdown {
            self.start_one_shot()?;
        }
        let raw = self.read_word(Register::Temperature)?;
        Ok(Temperature::from_be_bytes(raw))
    }

    fn start_one_shot(&mut self) -> Result<(), I2C::Error> {
        let config = Configuration::from(self.read_register(Register::Configuration)?).with_os(true);
        self.write_register(Register::Configuration, config.into())?;

        #[cfg(feature = "defmt")]
        defmt::trace!("tmp100 {=u8:#x}: one-shot conversion started", self.addr);

        self.delay.delay_ms(ONE_SHOT_SETTLE_MS);
        Ok(())
    }

    fn read_limit(&mut self, reg: Register) -> Result<f32, I2C::Error> {
        let raw = self.read_word(reg)?;
        self.select_register(Register::Temperature)?;
        Ok(Temperature::from_be_bytes(raw).celsius())
    }

    fn write_limit(&mut self, reg: Register, limit: f32) -> Result<(), I2C::Error> {
        self.write_word(reg, Temperature::from_celsius(limit).to_be_bytes())?;
        self.select_register(Register::Temperature)
    }

    fn select_register(&mut self, reg: Register) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, &[reg.into()])
    }

    fn read_register(&mut self, reg: Register) -> Result<u8, I2C::Error> {
        let mut byte = [0; 1];
        self.i2c.write_read(self.addr, &[reg.into()], &mut byte)?;
        Ok(byte[0])
    }

    fn write_register(&mut self, reg: Register, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, &[reg.into(), value])
    }

    fn read_word(&mut self, reg: Register) -> Result<[u8; 2], I2C::Error> {
        let mut bytes = [0; 2];
        self.i2c.write_read(self.addr, &[reg.into()], &mut bytes)?;
        Ok(bytes)
    }

    fn write_word(&mut self, reg: Register, value: [u8; 2]) -> Result<(), I2C::Error> {
        let mut data = [0; 3];

        data[0] = reg.into();
        data[1..].copy_from_slice(&value);

        self.i2c.write(self.addr, &data)
    }
}

/// Tmp100 Errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E: embedded_hal::i2c::Error> {
    /// I2C Bus Error
    Bus(E),
}

#[cfg(feature = "embedded-sensors-hal")]
impl<E: embedded_hal::i2c::Error> sensor::Error for Error<E> {
    fn kind(&self) -> sensor::ErrorKind {
        sensor::ErrorKind::Other
    }
}

#[cfg(feature = "embedded-sensors-hal")]
impl<I2C: embedded_hal::i2c::I2c, DELAY: embedded_hal::delay::DelayNs> sensor::ErrorType for Tmp100<I2C, DELAY> {
    type Error = Error<I2C::Error>;
}

#[cfg(feature = "embedded-sensors-hal")]
impl<I2C: embedded_hal::i2c::I2c, DELAY: embedded_hal::delay::DelayNs> TemperatureSensor for Tmp100<I2C, DELAY> {
    fn temperature(&mut self) -> Result<DegreesCelsius, Self::Error> {
        self.temperature_celsius().map_err(Error::Bus)
    }
}
