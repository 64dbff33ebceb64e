//! Consensus-critical serialization.
//!
//! Types that appear in transaction inputs or wallet records implement
//! [`ZerocoinSerialize`] and [`ZerocoinDeserialize`], and must round-trip
//! byte-for-byte. For internal storage that is not consensus-critical,
//! prefer Serde.

mod error;
mod read_ext;
mod write_ext;
mod zerocoin_deserialize;
mod zerocoin_serialize;

pub use error::SerializationError;
pub use read_ext::ReadZerocoinExt;
pub use write_ext::WriteZerocoinExt;
pub use zerocoin_deserialize::ZerocoinDeserialize;
pub use zerocoin_serialize::ZerocoinSerialize;

/// The maximum serialized length of a big-integer field, in bytes.
///
/// Serial numbers, randomness, and accumulator values all fit well inside
/// this bound; larger values are rejected before allocation.
pub const MAX_BIGNUM_BYTE_LEN: u64 = 512;
