//! Transaction identifiers and output binding hashes.

use std::{fmt, io};

use serde::{Deserialize, Serialize};

use crate::{
    serialization::{ReadZerocoinExt, SerializationError, ZerocoinDeserialize, ZerocoinSerialize},
    sha256d_writer::Sha256dWriter,
};

/// A transaction hash.
///
/// Note: Okapi displays transaction hashes in big-endian byte-order,
/// following the u256 convention set by Bitcoin.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut reversed_bytes = self.0;
        reversed_bytes.reverse();
        f.write_str(&hex::encode(reversed_bytes))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut reversed_bytes = self.0;
        reversed_bytes.reverse();
        f.debug_tuple("transaction::Hash")
            .field(&hex::encode(reversed_bytes))
            .finish()
    }
}

impl std::str::FromStr for Hash {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; 32];
        if hex::decode_to_slice(s, &mut bytes[..]).is_err() {
            Err(SerializationError::Parse("hex decoding error"))
        } else {
            bytes.reverse();
            Ok(Hash(bytes))
        }
    }
}

impl ZerocoinSerialize for Hash {
    fn zerocoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.0)
    }
}

impl ZerocoinDeserialize for Hash {
    fn zerocoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Hash(reader.read_32_bytes()?))
    }
}

/// The SHA256d hash of the outputs a spend pays into.
///
/// A spend proof signs this hash, binding the proof to one specific set of
/// transaction outputs. Replaying the proof against any other output set
/// changes the hash and invalidates the signature.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct OutputsHash(pub [u8; 32]);

impl OutputsHash {
    /// Hash the canonical serialization of a spend's outputs.
    pub fn of(serialized_outputs: &[u8]) -> Self {
        use std::io::Write;

        let mut hash_writer = Sha256dWriter::default();
        hash_writer
            .write_all(serialized_outputs)
            .expect("Sha256dWriter is infallible");
        Self(hash_writer.finish())
    }
}

impl fmt::Debug for OutputsHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("OutputsHash")
            .field(&hex::encode(self.0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_display_is_big_endian() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        let hash = Hash(bytes);

        let displayed = hash.to_string();
        assert!(displayed.ends_with("ab"));
        assert_eq!(displayed.parse::<Hash>().unwrap(), hash);
    }

    #[test]
    fn outputs_hash_is_deterministic() {
        assert_eq!(OutputsHash::of(b"outputs"), OutputsHash::of(b"outputs"));
        assert_ne!(OutputsHash::of(b"outputs"), OutputsHash::of(b"other"));
    }
}
