//! Tmp100 Async API

#[cfg(feature = "embedded-sensors-hal-async")]
use embedded_sensors_hal_async::sensor;
#[cfg(feature = "embedded-sensors-hal-async")]
use embedded_sensors_hal_async::temperature::{DegreesCelsius, TemperatureSensor, TemperatureThresholdSet};

use super::{Address, Configuration, Register, Resolution, ShutdownMode, Temperature, ONE_SHOT_SETTLE_MS};

/// TMP100 asynchronous device driver
pub struct Tmp100<I2C: embedded_hal_async::i2c::I2c, DELAY: embedded_hal_async::delay::DelayNs> {
    /// The concrete I2C bus implementation
    i2c: I2C,

    /// The concrete [`embedded_hal_async::delay::DelayNs`] implementation
    delay: DELAY,

    /// The I2C address.
    pub(crate) addr: u8,

    /// Last shutdown mode written by this driver.
    mode: ShutdownMode,
}

impl<I2C: embedded_hal_async::i2c::I2c, DELAY: embedded_hal_async::delay::DelayNs> Tmp100<I2C, DELAY> {
    /// Create a new TMP100 instance.
    pub fn new_async(i2c: I2C, delay: DELAY, address: Address) -> Self {
        Self::new_async_with_raw_address(i2c, delay, address.into())
    }

    /// Create a new TMP100 instance with ADD1 and ADD0 tied to GND,
    /// resulting in an instance responding to address `0x48`.
    pub fn new_async_with_default_address(i2c: I2C, delay: DELAY) -> Self {
        Self::new_async(i2c, delay, Address::default())
    }

    /// Create a new TMP100 instance responding to the given 7-bit address.
    pub fn new_async_with_raw_address(i2c: I2C, delay: DELAY, addr: u8) -> Self {
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
    pub async fn init(&mut self) -> Result<(), I2C::Error> {
        self.configure(None, ShutdownMode::Normal).await
    }

    /// Put the device in continuous conversion mode at the given resolution.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn init_with_resolution(&mut self, resolution: Resolution) -> Result<(), I2C::Error> {
        self.configure(Some(resolution), ShutdownMode::Normal).await
    }

    /// Configure resolution and shutdown mode in one register update.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn init_with_resolution_and_mode(
        &mut self,
        resolution: Resolution,
        mode: ShutdownMode,
    ) -> Result<(), I2C::Error> {
        self.configure(Some(resolution), mode).await
    }

    /// Read configuration register
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn configuration(&mut self) -> Result<Configuration, I2C::Error> {
        let value = self.read_register(Register::Configuration).await?;
        self.select_register(Register::Temperature).await?;
        Ok(Configuration::from(value))
    }

    /// Set configuration register. The cached shutdown mode follows the
    /// written value.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn set_configuration(&mut self, config: Configuration) -> Result<(), I2C::Error> {
        self.write_register(Register::Configuration, config.into()).await?;

        // Only cache mode after successful write
        self.mode = config.sd();
        self.select_register(Register::Temperature).await
    }

    /// Read converter resolution
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn resolution(&mut self) -> Result<Resolution, I2C::Error> {
        Ok(self.configuration().await?.res())
    }

    /// Set converter resolution, leaving every other configuration bit as is.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn set_resolution(&mut self, resolution: Resolution) -> Result<(), I2C::Error> {
        self.update_configuration(|config| config.set_res(resolution)).await
    }

    /// Shutdown mode last written by this driver. No bus traffic.
    pub fn shutdown_mode(&self) -> ShutdownMode {
        self.mode
    }

    /// Set shutdown mode, leaving every other configuration bit as is.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn set_shutdown_mode(&mut self, mode: ShutdownMode) -> Result<(), I2C::Error> {
        self.update_configuration(|config| config.set_sd(mode)).await
    }

    /// Read temperature in degrees Fahrenheit. In shutdown mode a one-shot
    /// conversion is started first.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails. If the one-shot start
    /// fails, the pointer may be left on the configuration register; the
    /// next temperature read re-addresses it.
    pub async fn temperature(&mut self) -> Result<f32, I2C::Error> {
        Ok(self.sample().await?.fahrenheit())
    }

    /// Read temperature in degrees Celsius. In shutdown mode a one-shot
    /// conversion is started first.
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn temperature_celsius(&mut self) -> Result<f32, I2C::Error> {
        Ok(self.sample().await?.celsius())
    }

    /// Read temperature low limit register, in degrees Celsius
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn low_limit(&mut self) -> Result<f32, I2C::Error> {
        self.read_limit(Register::LowLimit).await
    }

    /// Set temperature low limit register, in degrees Celsius
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn set_low_limit(&mut self, limit: f32) -> Result<(), I2C::Error> {
        self.write_limit(Register::LowLimit, limit).await
    }

    /// Read temperature high limit register, in degrees Celsius
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn high_limit(&mut self) -> Result<f32, I2C::Error> {
        self.read_limit(Register::HighLimit).await
    }

    /// Set temperature high limit register, in degrees Celsius
    ///
    /// # Errors
    ///
    /// `I2C::Error` when the I2C transaction fails
    pub async fn set_high_limit(&mut self, limit: f32) -> Result<(), I2C::Error> {
        self.write_limit(Register::HighLimit, limit).await
    }

    async fn configure(&mut self, resolution: Option<Resolution>, mode: ShutdownMode) -> Result<(), I2C::Error> {
        self.update_configuration(|config| {
            if let Some(resolution) = resolution {
                config.set_res(resolution);
            }
            config.set_sd(mode);
        })
        .await
    }

    async fn update_configuration<F>(&mut self, f: F) -> Result<(), I2C::Error>
    where
        F: FnOnce(&mut Configuration),
    {
        let mut config = Configuration::from(self.read_register(Register::Configuration).await?);
        f(&mut config);
        self.write_register(Register::Configuration, config.into()).await?;
        self.mode = config.sd();
        self.select_register(Register::Temperature).await
    }

    async fn sample(&mut self) -> Result<Temperature, I2C::Error> {
        if self.mode == ShutdownMode::Shutdown {
            let config = Configuration::from(self.read_register(Register::Configuration).await?).with_os(true);
            self.write_register(Register::Configuration, config.into()).await?;

            #[cfg(feature = "defmt")]
            defmt::trace!("tmp100 {=u8:#x}: one-shot conversion started", self.addr);

            self.delay.delay_ms(ONE_SHOT_SETTLE_MS).await;
        }
        let raw = self.read_word(Register::Temperature).await?;
        Ok(Temperature::from_be_bytes(raw))
    }

    async fn read_limit(&mut self, reg: Register) -> Result<f32, I2C::Error> {
        let raw = self.read_word(reg).await?;
        self.select_register(Register::Temperature).await?;
        Ok(Temperature::from_be_bytes(raw).celsius())
    }

    async fn write_limit(&mut self, reg: Register, limit: f32) -> Result<(), I2C::Error> {
        self.write_word(reg, Temperature::from_celsius(limit).to_be_bytes()).await?;
        self.select_register(Register::Temperature).await
    }

    async fn select_register(&mut self, reg: Register) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, &[reg.into()]).await
    }

    async fn read_register(&mut self, reg: Register) -> Result<u8, I2C::Error> {
        let mut byte = [0; 1];
        self.i2c.write_read(self.addr, &[reg.into()], &mut byte).await?;
        Ok(byte[0])
    }

    async fn write_register(&mut self, reg: Register, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, &[reg.into(), value]).await
    }

    async fn read_word(&mut self, reg: Register) -> Result<[u8; 2], I2C::Error> {
        let mut bytes = [0; 2];
        self.i2c.write_read(self.addr, &[reg.into()], &mut bytes).await?;
        Ok(bytes)
    }

    async fn write_word(&mut self, reg: Register, value: [u8; 2]) -> Result<(), I2C::Error> {
        let mut data = [0; 3];

        data[0] = reg.into();
        data[1..].copy_from_slice(&value);

        self.i2c.write(self.addr, &data).await
    }
}

/// Tmp100 Errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E: embedded_hal_async::i2c::Error> {
    /// I2C Bus Error
    Bus(E),
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<E: embedded_hal_async::i2c::Error> sensor::Error for Error<E> {
    fn kind(&self) -> sensor::ErrorKind {
        match *self {
            Self::Bus(_) => sensor::ErrorKind::Peripheral,
        }
    }
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<I2C: embedded_hal_async::i2c::I2c, DELAY: embedded_hal_async::delay::DelayNs> sensor::ErrorType
    for Tmp100<I2C, DELAY>
{
    type Error = Error<I2C::Error>;
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<I2C: embedded_hal_async::i2c::I2c, DELAY: embedded_hal_async::delay::DelayNs> TemperatureSensor
    for Tmp100<I2C, DELAY>
{
    async fn temperature(&mut self) -> Result<DegreesCelsius, Self::Error> {
        self.temperature_celsius().await.map_err(Error::Bus)
    }
}

#[cfg(feature = "embedded-sensors-hal-async")]
impl<I2C: embedded_hal_async::i2c::I2c, DELAY: embedded_hal_async::delay::DelayNs> TemperatureThresholdSet
    for Tmp100<I2C, DELAY>
{
    async fn set_temperature_threshold_low(&mut self, threshold: DegreesCelsius) -> Result<(), Self::Error> {
        self.set_low_limit(threshold).await.map_err(Error::Bus)
    }

    async fn set_temperature_threshold_high(&mut self, threshold: DegreesCelsius) -> Result<(), Self::Error> {
        self.set_high_limit(threshold).await.map_err(Error::Bus)
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};

    use super::*;
    use crate::Pin;

    #[tokio::test]
    async fn handle_address_accordingly() {
        let expectations = vec![];

        let mock = Mock::new(&expectations);
        let tmp = Tmp100::new_async_with_default_address(mock, NoopDelay::new());
        assert_eq!(tmp.addr, 0x48);
        let mut mock = tmp.destroy();
        mock.done();

        let mock = Mock::new(&expectations);
        let address = Address::new(Pin::Float, Pin::Gnd).unwrap();
        let tmp = Tmp100::new_async(mock, NoopDelay::new(), address);
        assert_eq!(tmp.addr, 0x4b);
        let mut mock = tmp.destroy();
        mock.done();
    }

    #[tokio::test]
    async fn read_temperature_default_address() {
        let expectations = vec![
            vec![Transaction::write_read(0x48, vec![0x00], vec![0x64, 0x00])],
            vec![Transaction::write_read(0x48, vec![0x00], vec![0x19, 0x00])],
            vec![Transaction::write_read(0x48, vec![0x00], vec![0x00, 0x00])],
            vec![Transaction::write_read(0x48, vec![0x00], vec![0xd8, 0x00])],
            vec![Transaction::write_read(0x48, vec![0x00], vec![0xc9, 0x00])],
        ];
        let temps = [212.0, 77.0, 32.0, -40.0, -67.0];

        for (e, t) in expectations.iter().zip(temps.iter()) {
            let mock = Mock::new(e);
            let mut tmp100 = Tmp100::new_async_with_default_address(mock, NoopDelay::new());
            let result = tmp100.temperature().await;
            assert!(result.is_ok());

            let temp = result.unwrap();
            assert_approx_eq!(temp, *t, 1e-3);

            let mut mock = tmp100.destroy();
            mock.done();
        }
    }

    #[tokio::test]
    async fn failed_temperature_read_is_reported() {
        let expectations =
            vec![Transaction::write_read(0x48, vec![0x00], vec![0x00, 0x00]).with_error(ErrorKind::Other)];

        let mock = Mock::new(&expectations);
        let mut tmp = Tmp100::new_async_with_default_address(mock, NoopDelay::new());
        assert!(matches!(tmp.temperature().await, Err(ErrorKind::Other)));

        let mut mock = tmp.destroy();
        mock.done();
    }

    #[tokio::test]
    async fn one_shot_conversion_in_shutdown_mode() {
        let expectations = vec![
            Transaction::write_read(0x48, vec![0x01], vec![0x00]),
            Transaction::write(0x48, vec![0x01, 0x61]),
            Transaction::write(0x48, vec![0x00]),
            Transaction::write_read(0x48, vec![0x01], vec![0x61]),
            Transaction::write(0x48, vec![0x01, 0xe1]),
            Transaction::write_read(0x48, vec![0x00], vec![0xff, 0xc0]),
        ];

        let mock = Mock::new(&expectations);
        let mut tmp = Tmp100::new_async_with_default_address(mock, NoopDelay::new());
        let result = tmp
            .init_with_resolution_and_mode(Resolution::Bits12, ShutdownMode::Shutdown)
            .await;
        assert!(result.is_ok());
        assert_eq!(tmp.shutdown_mode(), ShutdownMode::Shutdown);

        let result = tmp.temperature_celsius().await;
        assert_approx_eq!(result.unwrap(), -0.25, 1e-4);

        let mut mock = tmp.destroy();
        mock.done();
    }

    #[tokio::test]
    async fn cached_mode_follows_write_when_restore_fails() {
        let expectations = vec![
            Transaction::write_read(0x48, vec![0x01], vec![0x00]),
            Transaction::write(0x48, vec![0x01, 0x01]),
            Transaction::write(0x48, vec![0x00]).with_error(ErrorKind::Other),
        ];

        let mock = Mock::new(&expectations);
        let mut tmp = Tmp100::new_async_with_default_address(mock, NoopDelay::new());
        let result = tmp.set_shutdown_mode(ShutdownMode::Shutdown).await;
        assert!(matches!(result, Err(ErrorKind::Other)));
        assert_eq!(tmp.shutdown_mode(), ShutdownMode::Shutdown);

        let mut mock = tmp.destroy();
        mock.done();
    }

    #[tokio::test]
    async fn set_resolution_keeps_other_bits() {
        let expectations = vec![
            Transaction::write_read(0x48, vec![0x01], vec![0x9f]),
            Transaction::write(0x48, vec![0x01, 0xbf]),
            Transaction::write(0x48, vec![0x00]),
            Transaction::write_read(0x48, vec![0x01], vec![0xbf]),
            Transaction::write(0x48, vec![0x00]),
        ];

        let mock = Mock::new(&expectations);
        let mut tmp = Tmp100::new_async_with_default_address(mock, NoopDelay::new());
        assert!(tmp.set_resolution(Resolution::Bits10).await.is_ok());
        assert_eq!(tmp.resolution().await.unwrap(), Resolution::Bits10);

        let mut mock = tmp.destroy();
        mock.done();
    }

    #[tokio::test]
    async fn read_write_limit_registers() {
        let expectations = vec![
            Transaction::write(0x48, vec![0x02, 0xe7, 0x00]),
            Transaction::write(0x48, vec![0x00]),
            Transaction::write_read(0x48, vec![0x02], vec![0xe7, 0x00]),
            Transaction::write(0x48, vec![0x00]),
        ];

        let mock = Mock::new(&expectations);
        let mut tmp = Tmp100::new_async_with_default_address(mock, NoopDelay::new());
        assert!(tmp.set_low_limit(-25.0).await.is_ok());
        assert_approx_eq!(tmp.low_limit().await.unwrap(), -25.0, 1e-4);

        let mut mock = tmp.destroy();
        mock.done();
    }

    #[cfg(feature = "embedded-sensors-hal-async")]
    #[tokio::test]
    async fn sensor_hal_thresholds_and_temperature() {
        let expectations = vec![
            Transaction::write(0x48, vec![0x02, 0x19, 0x00]),
            Transaction::write(0x48, vec![0x00]),
            Transaction::write(0x48, vec![0x03, 0x50, 0x00]),
            Transaction::write(0x48, vec![0x00]),
            Transaction::write_read(0x48, vec![0x00], vec![0x50, 0x00]),
        ];

        let mock = Mock::new(&expectations);
        let mut tmp = Tmp100::new_async_with_default_address(mock, NoopDelay::new());

        assert!(tmp.set_temperature_threshold_low(25.0).await.is_ok());
        assert!(tmp.set_temperature_threshold_high(80.0).await.is_ok());

        let temp = TemperatureSensor::temperature(&mut tmp).await.unwrap();
        assert_approx_eq!(temp, 80.0, 1e-4);

        let mut mock = tmp.destroy();
        mock.done();
    }
}
