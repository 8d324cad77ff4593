//! [`ServoDriver`] implementation for the PCA9685 driver

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use embedded_hal::blocking::i2c::{Write, WriteRead};
use log::debug;
use pwm_pca9685::{Channel, Pca9685};

use super::{ServoDriver, ServoError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const MAX_PWM: u16 = 4096;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<I2C, E> ServoDriver for Pca9685<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>
{
    /// Channels are numbered as on the board so they can be configured in
    /// parameter files.
    type Channel = u8;

    fn set_duty_cycle(
        &mut self,
        channel: Self::Channel,
        duty_cycle: f64
    ) -> Result<(), ServoError> {

        // If the duty cycle is out of range return an error
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(ServoError::InvalidDutyCycle)
        }

        let channel = channel_for(channel)?;
        let off_count = (duty_cycle * (MAX_PWM as f64)).round() as u16;

        let result = if off_count == 0 {
            self.set_channel_full_off(channel)
        }
        else if off_count >= MAX_PWM {
            // Full off takes priority over full on, so clear it first
            self.set_channel_off(channel, 0)
                .and_then(|_| self.set_channel_full_on(channel, 0))
        }
        else {
            self.set_channel_on(channel, 0)
                .and_then(|_| self.set_channel_off(channel, off_count))
        };

        result.map_err(|e| match e {
            pwm_pca9685::Error::I2C(_) => ServoError::I2c,
            pwm_pca9685::Error::InvalidInputData => ServoError::InvalidDutyCycle
        })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Set the PWM frequency of the board and enable its oscillator.
///
/// The frequency is `25 MHz / (4096 * (prescale + 1))`, `121` gives the
/// 50 Hz servos expect.
pub fn init_board<I2C, E>(pwm: &mut Pca9685<I2C>, prescale: u8) -> Result<(), ServoError>
where
    I2C: Write<Error = E> + WriteRead<Error = E>
{
    pwm.set_prescale(prescale).map_err(|e| match e {
        pwm_pca9685::Error::I2C(_) => ServoError::I2c,
        pwm_pca9685::Error::InvalidInputData => ServoError::InvalidPrescale(prescale)
    })?;

    pwm.enable().map_err(|_| ServoError::I2c)?;

    debug!("PCA9685 enabled with prescale {}", prescale);

    Ok(())
}

/// The board channel with the given number.
pub fn channel_for(channel: u8) -> Result<Channel, ServoError> {
    Ok(match channel {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return Err(ServoError::InvalidChannel(channel))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    const ADDRESS: u8 = 0x40;

    /// I2C bus which records writes, answers reads with zeros, and can be
    /// made to fail.
    #[derive(Default)]
    struct MockI2c {
        writes: Vec<(u8, Vec<u8>)>,
        fail: Rc<Cell<bool>>,
    }

    impl Write for MockI2c {
        type Error = ();

        fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), ()> {
            if self.fail.get() {
                return Err(());
            }
            self.writes.push((address, bytes.to_vec()));
            Ok(())
        }
    }

    impl WriteRead for MockI2c {
        type Error = ();

        fn write_read(&mut self, _address: u8, _bytes: &[u8], buffer: &mut [u8]) -> Result<(), ()> {
            if self.fail.get() {
                return Err(());
            }
            for b in buffer.iter_mut() {
                *b = 0;
            }
            Ok(())
        }
    }

    fn board() -> Pca9685<MockI2c> {
        Pca9685::new(MockI2c::default(), ADDRESS).unwrap()
    }

    #[test]
    fn test_init_board() {
        let mut pwm = board();
        init_board(&mut pwm, 121).unwrap();

        let i2c = pwm.destroy();
        assert!(i2c.writes.iter().all(|(a, _)| *a == ADDRESS));
        assert!(i2c.writes.contains(&(ADDRESS, vec![0xFE, 121])));

        let mut pwm = board();
        assert_eq!(init_board(&mut pwm, 2), Err(ServoError::InvalidPrescale(2)));
    }

    #[test]
    fn test_set_duty_cycle() {
        let mut pwm = board();

        // 0.075 * 4096 = 307.2 -> 307 = 0x0133, off register of channel 0
        pwm.set_duty_cycle(0, 0.075).unwrap();
        pwm.set_duty_cycle(2, 0.0).unwrap();
        pwm.set_duty_cycle(15, 1.0).unwrap();

        assert_eq!(pwm.set_duty_cycle(16, 0.5), Err(ServoError::InvalidChannel(16)));
        assert_eq!(pwm.set_duty_cycle(0, 1.5), Err(ServoError::InvalidDutyCycle));

        let i2c = pwm.destroy();
        assert!(i2c.writes.contains(&(ADDRESS, vec![0x06, 0, 0])));
        assert!(i2c.writes.contains(&(ADDRESS, vec![0x08, 0x33, 0x01])));

        // Channel 2 fully off, channel 15 fully on
        assert!(i2c.writes.contains(&(ADDRESS, vec![0x10, 0x00, 0x10])));
        assert!(i2c.writes.contains(&(ADDRESS, vec![0x42, 0x00, 0x10])));
    }

    #[test]
    fn test_bus_errors() {
        let fail = Rc::new(Cell::new(false));
        let mut pwm = Pca9685::new(
            MockI2c {
                fail: fail.clone(),
                ..Default::default()
            },
            ADDRESS,
        )
        .unwrap();

        fail.set(true);

        assert_eq!(pwm.set_duty_cycle(0, 0.5), Err(ServoError::I2c));
        assert_eq!(init_board(&mut pwm, 121), Err(ServoError::I2c));
    }

    #[test]
    fn test_channel_for() {
        assert_eq!(channel_for(0), Ok(Channel::C0));
        assert_eq!(channel_for(15), Ok(Channel::C15));
        assert_eq!(channel_for(16), Err(ServoError::InvalidChannel(16)));
    }
}
