use std::io;

use num_bigint::BigUint;
use num_traits::Zero;

use super::WriteZerocoinExt;

/// Consensus-critical serialization for Okapi.
///
/// This trait provides a generic serialization for consensus-critical
/// formats, such as transaction inputs and spend proofs.
///
/// The `zerocoin_` prefix alerts the reader that the serialization in use is
/// consensus-critical serialization, rather than some other kind of
/// serialization.
///
/// Notice that the error type is [`std::io::Error`]; this indicates that
/// serialization MUST be infallible up to errors in the underlying writer.
/// In other words, any type implementing `ZerocoinSerialize` must make
/// illegal states unrepresentable.
pub trait ZerocoinSerialize: Sized {
    /// Write `self` to the given `writer` using the canonical format.
    fn zerocoin_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error>;

    /// Helper function to construct a vec to serialize the current struct into
    fn zerocoin_serialize_to_vec(&self) -> Result<Vec<u8>, io::Error> {
        let mut data = Vec::new();
        self.zerocoin_serialize(&mut data)?;
        Ok(data)
    }
}

/// Serialize a byte vector as a compactsize number of bytes, then the bytes.
impl ZerocoinSerialize for Vec<u8> {
    fn zerocoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compactsize(self.len() as u64)?;
        writer.write_all(self)
    }
}

/// Serialize a big integer as a compactsize length, then the big-endian
/// magnitude bytes.
///
/// Zero serializes as an empty byte string, and leading zero bytes are never
/// written, so every value has exactly one serialization.
impl ZerocoinSerialize for BigUint {
    fn zerocoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        let bytes = if self.is_zero() {
            Vec::new()
        } else {
            self.to_bytes_be()
        };
        writer.write_compactsize(bytes.len() as u64)?;
        writer.write_all(&bytes)
    }
}
