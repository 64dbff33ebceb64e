use std::io;

use byteorder::{LittleEndian, WriteBytesExt};

/// Extends [`io::Write`] with methods for writing Bitcoin-style wire types.
pub trait WriteZerocoinExt: io::Write {
    /// Writes a `u64` using the Bitcoin `CompactSize` encoding.
    fn write_compactsize(&mut self, n: u64) -> io::Result<()> {
        match n {
            0x0000_0000..=0x0000_00fc => self.write_u8(n as u8),
            0x0000_00fd..=0x0000_ffff => {
                self.write_u8(0xfd)?;
                self.write_u16::<LittleEndian>(n as u16)
            }
            0x0001_0000..=0xffff_ffff => {
                self.write_u8(0xfe)?;
                self.write_u32::<LittleEndian>(n as u32)
            }
            _ => {
                self.write_u8(0xff)?;
                self.write_u64::<LittleEndian>(n)
            }
        }
    }
}

/// Mark all types implementing `Write` as implementing the extension.
impl<W: io::Write + ?Sized> WriteZerocoinExt for W {}
