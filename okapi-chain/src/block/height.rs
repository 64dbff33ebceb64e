//! Typed block heights.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::serialization::SerializationError;

/// The height of a block is the length of the chain back to the genesis block.
///
/// # Invariants
///
/// Users should not construct block heights greater than `Height::MAX`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Height(pub u32);

impl Height {
    /// The minimum Height.
    ///
    /// Due to the underlying type, it is impossible to construct block heights
    /// less than `Height::MIN`.
    pub const MIN: Height = Height(0);

    /// The maximum Height.
    ///
    /// The original wallet stored heights in signed 32-bit integers, so the
    /// maximum height must stay representable as an `i32`.
    pub const MAX: Height = Height(i32::MAX as u32);
}

impl std::str::FromStr for Height {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse() {
            Ok(h) if (Height(h) <= Height::MAX) => Ok(Height(h)),
            Ok(_) => Err(SerializationError::Parse("Height exceeds maximum height")),
            Err(_) => Err(SerializationError::Parse("Height(u32) integer parse error")),
        }
    }
}

impl Add<i32> for Height {
    type Output = Option<Height>;

    fn add(self, rhs: i32) -> Option<Height> {
        let result = i64::from(self.0) + i64::from(rhs);
        if (i64::from(Height::MIN.0)..=i64::from(Height::MAX.0)).contains(&result) {
            Some(Height(result as u32))
        } else {
            None
        }
    }
}

impl Sub<i32> for Height {
    type Output = Option<Height>;

    fn sub(self, rhs: i32) -> Option<Height> {
        self + rhs.checked_neg()?
    }
}

impl Sub<Height> for Height {
    /// The difference in blocks between two heights.
    ///
    /// The result is always in range, because heights are limited to
    /// `i32::MAX`.
    type Output = i32;

    fn sub(self, rhs: Height) -> i32 {
        (i64::from(self.0) - i64::from(rhs.0))
            .try_into()
            .expect("height differences always fit in i32")
    }
}

#[cfg(any(test, feature = "proptest-impl"))]
use proptest::prelude::*;

#[cfg(any(test, feature = "proptest-impl"))]
impl Arbitrary for Height {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        (Height::MIN.0..=Height::MAX.0).prop_map(Height).boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
