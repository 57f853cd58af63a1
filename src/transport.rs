//! Register access over the bus

use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::constants::*;


/// Byte wide register access to one chip.
pub trait Transport {
    type Error;

    /// Writes a single register
    fn write_byte(self: &mut Self, reg: u8, value: u8) -> Result<(), Self::Error>;

    /// Reads a single register
    fn read_byte(self: &mut Self, reg: u8) -> Result<u8, Self::Error>;

    /// Writes consecutive registers starting at `start`, in order.
    fn write_block(self: &mut Self, start: u8, values: &[u8]) -> Result<(), Self::Error> {
        for (i, v) in values.iter().enumerate() {
            self.write_byte(start.wrapping_add(i as u8), *v)?;
        }
        Ok(())
    }
}


/// [`Transport`] over an `embedded-hal` I2C bus
pub struct I2cTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cTransport<I2C> {

    /// Chip at the default 0x60 address
    pub fn new(i2c: I2C) -> Self {
        I2cTransport::with_address(i2c, I2C_ADDRESS_DEFAULT)
    }

    /// Chip at a given 7 bit address
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        I2cTransport { i2c, address }
    }

    /// 7 bit device address
    pub fn address(self: &Self) -> u8 {
        self.address
    }

    /// Gives the bus back
    pub fn release(self: Self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Transport for I2cTransport<I2C>
where I2C: Write<Error = E> + WriteRead<Error = E>,
{
    type Error = E;

    fn write_byte(self: &mut Self, reg: u8, value: u8) -> Result<(), E> {
        self.i2c.write(self.address, &[reg, value])
    }

    fn read_byte(self: &mut Self, reg: u8) -> Result<u8, E> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    /// Register address auto-increments, a whole divider block goes out in one transfer.
    fn write_block(self: &mut Self, start: u8, values: &[u8]) -> Result<(), E> {
        if values.is_empty() {
            return Ok(());
        }

        let mut buf = [0u8; 9];
        let n = values.len().min(buf.len() - 1);
        buf[0] = start;
        buf[1 ..= n].copy_from_slice(&values[.. n]);
        self.i2c.write(self.address, &buf[..= n])?;

        for (i, v) in values.iter().enumerate().skip(n) {
            self.write_byte(start.wrapping_add(i as u8), *v)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeI2c {
        writes: [[u8; 9]; 4],
        lens: [usize; 4],
        count: usize,
        reg_value: u8,
    }

    impl Write for FakeI2c {
        type Error = ();
        fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), ()> {
            assert_eq!(addr, 0x61);
            self.writes[self.count][.. bytes.len()].copy_from_slice(bytes);
            self.lens[self.count] = bytes.len();
            self.count += 1;
            Ok(())
        }
    }

    impl WriteRead for FakeI2c {
        type Error = ();
        fn write_read(&mut self, addr: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), ()> {
            assert_eq!(addr, 0x61);
            assert_eq!(bytes, &[16]);
            buffer[0] = self.reg_value;
            Ok(())
        }
    }

    #[test]
    fn single_register_access() {
        let mut t = I2cTransport::with_address(FakeI2c { reg_value: 0x4F, ..Default::default() }, 0x61);
        t.write_byte(3, 0xFF).unwrap();
        assert_eq!(t.read_byte(16), Ok(0x4F));

        let i2c = t.release();
        assert_eq!(i2c.count, 1);
        assert_eq!(&i2c.writes[0][.. i2c.lens[0]], &[3, 0xFF]);
    }

    #[test]
    fn block_is_one_transfer() {
        let mut t = I2cTransport::with_address(FakeI2c::default(), 0x61);
        t.write_block(42, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        let i2c = t.release();
        assert_eq!(i2c.count, 1);
        assert_eq!(&i2c.writes[0][.. i2c.lens[0]], &[42, 1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
