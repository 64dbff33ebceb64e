//! Coin denominations.

use std::{fmt, io};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

use crate::serialization::{SerializationError, ZerocoinDeserialize, ZerocoinSerialize};

/// A zerocoin denomination.
///
/// Coins are only ever minted in these fixed value classes, and each
/// denomination has its own independent accumulator. The set is closed:
/// adding a denomination is a consensus change.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub enum Denomination {
    /// A one-unit coin.
    One,
    /// A five-unit coin.
    Five,
    /// A ten-unit coin.
    Ten,
    /// A fifty-unit coin.
    Fifty,
    /// A one-hundred-unit coin.
    OneHundred,
    /// A five-hundred-unit coin.
    FiveHundred,
    /// A one-thousand-unit coin.
    OneThousand,
    /// A five-thousand-unit coin.
    FiveThousand,
}

impl Denomination {
    /// All denominations, in ascending value order.
    pub const ALL: [Denomination; 8] = [
        Denomination::One,
        Denomination::Five,
        Denomination::Ten,
        Denomination::Fifty,
        Denomination::OneHundred,
        Denomination::FiveHundred,
        Denomination::OneThousand,
        Denomination::FiveThousand,
    ];

    /// The coin value of this denomination, in whole units.
    pub fn value(&self) -> i64 {
        match self {
            Denomination::One => 1,
            Denomination::Five => 5,
            Denomination::Ten => 10,
            Denomination::Fifty => 50,
            Denomination::OneHundred => 100,
            Denomination::FiveHundred => 500,
            Denomination::OneThousand => 1_000,
            Denomination::FiveThousand => 5_000,
        }
    }

    /// Returns the denomination with the given value, if there is one.
    pub fn from_value(value: i64) -> Option<Denomination> {
        Denomination::ALL.into_iter().find(|d| d.value() == value)
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Denominations are serialized as their 32-bit value, following the
/// original wallet's integer encoding.
impl ZerocoinSerialize for Denomination {
    fn zerocoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u32::<LittleEndian>(self.value() as u32)
    }
}

impl ZerocoinDeserialize for Denomination {
    fn zerocoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let value = reader.read_u32::<LittleEndian>()?;
        Denomination::from_value(i64::from(value))
            .ok_or(SerializationError::Parse("unknown denomination value"))
    }
}
