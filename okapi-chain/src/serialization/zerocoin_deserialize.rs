use std::io;

use num_bigint::BigUint;

use super::{ReadZerocoinExt, SerializationError, MAX_BIGNUM_BYTE_LEN};

/// Consensus-critical deserialization for Okapi.
///
/// This trait provides a generic deserialization for consensus-critical
/// formats, such as transaction inputs and spend proofs.
///
/// The `zerocoin_` prefix alerts the reader that the serialization in use is
/// consensus-critical serialization, rather than some other kind of
/// serialization.
pub trait ZerocoinDeserialize: Sized {
    /// Try to read `self` from the given `reader`.
    fn zerocoin_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError>;
}

/// Deserialize a byte vector with a compactsize length prefix.
impl ZerocoinDeserialize for Vec<u8> {
    fn zerocoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = reader.read_compactsize()?;
        if len > MAX_BIGNUM_BYTE_LEN {
            return Err(SerializationError::Parse("byte vector too large"));
        }

        let mut bytes = vec![0u8; len.try_into()?];
        reader.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

/// Deserialize a big integer from a compactsize length and big-endian
/// magnitude bytes, rejecting non-canonical encodings.
impl ZerocoinDeserialize for BigUint {
    fn zerocoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let bytes = Vec::<u8>::zerocoin_deserialize(&mut reader)?;
        if bytes.first() == Some(&0) {
            return Err(SerializationError::Parse("bignum has leading zero byte"));
        }
        Ok(BigUint::from_bytes_be(&bytes))
    }
}
