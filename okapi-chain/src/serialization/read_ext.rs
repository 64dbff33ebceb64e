use std::io;

use byteorder::{LittleEndian, ReadBytesExt};

use super::SerializationError;

/// Extends [`io::Read`] with methods for reading Bitcoin-style wire types.
pub trait ReadZerocoinExt: io::Read {
    /// Reads a `u64` using the Bitcoin `CompactSize` encoding.
    ///
    /// # Security
    ///
    /// Deserialized sizes must be validated before being used to preallocate
    /// memory. Non-canonical encodings are rejected, so every value has
    /// exactly one serialization.
    fn read_compactsize(&mut self) -> Result<u64, SerializationError> {
        let flag_byte = self.read_u8()?;
        match flag_byte {
            n @ 0x00..=0xfc => Ok(u64::from(n)),
            0xfd => {
                let n = self.read_u16::<LittleEndian>()?;
                if n < 0xfd {
                    return Err(SerializationError::Parse("non-canonical compactsize"));
                }
                Ok(u64::from(n))
            }
            0xfe => {
                let n = self.read_u32::<LittleEndian>()?;
                if n <= 0xffff {
                    return Err(SerializationError::Parse("non-canonical compactsize"));
                }
                Ok(u64::from(n))
            }
            0xff => {
                let n = self.read_u64::<LittleEndian>()?;
                if n <= 0xffff_ffff {
                    return Err(SerializationError::Parse("non-canonical compactsize"));
                }
                Ok(n)
            }
        }
    }

    /// Convenience method to read a `[u8; 32]`.
    fn read_32_bytes(&mut self) -> io::Result<[u8; 32]> {
        let mut bytes = [0; 32];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

/// Mark all types implementing `Read` as implementing the extension.
impl<R: io::Read + ?Sized> ReadZerocoinExt for R {}
