//! Zerocoin parameter sets.

use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

/// The RSA-2048 challenge modulus, used as the accumulator group modulus.
///
/// Nobody is known to hold the factorization of this number, which is what
/// makes the accumulator group an unknown-order group.
const ACCUMULATOR_MODULUS: &str = "2519590847565789349402718324004839857142928212620403202777713783604366202070\
    7595556264018525880784406918290641249515082189298559149176184502808489120072\
    8449926873928072877767359714183472702618963750149718246911650776133798590957\
    0009733045974880842840179742910064245869181719511874612151517265463228221686\
    9987549182422433637259085141865462043576798423387184774447920739934236584823\
    8242811981638150106748104516603773060562016196762561338441436038339044149526\
    3443219011465754445417842402092461651572335077870774981712577246796292638635\
    6373289912154831438167899885040445364023527381951378636564391212010397122822\
    120720357";

/// The modulus of the coin commitment group: the secp256k1 field prime.
///
/// Serial numbers and randomness open coin commitments in this group, which
/// is separate from the accumulator group.
const COMMITMENT_MODULUS: &str = "1157920892373161954235709850086879078532699846656405640394575840079088346716\
    63";

lazy_static! {
    static ref PARAMS_V1: Params = Params::build(ParamsVersion::V1);
    static ref PARAMS_V2: Params = Params::build(ParamsVersion::V2);
}

/// The version of a zerocoin parameter set.
///
/// Two parameter sets were deployed on the network and must remain mutually
/// distinguishable forever: accumulators, witnesses, and coins built from
/// one set can never be combined with values from the other.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ParamsVersion {
    /// The legacy parameter set.
    V1,
    /// The current parameter set, introduced with public-key-backed coins.
    V2,
}

/// One deployed set of zerocoin public parameters.
///
/// Parameter sets are constructed once at startup and passed by reference
/// into the witness engine; there is no global current-params singleton.
#[derive(Clone, Debug)]
pub struct Params {
    version: ParamsVersion,
    modulus: BigUint,
    accumulator_base: BigUint,
    serial_range: BigUint,
    commitment_modulus: BigUint,
    commitment_base_g: BigUint,
    commitment_base_h: BigUint,
}

impl Params {
    fn build(version: ParamsVersion) -> Params {
        // The accumulator base is the agreed starting value of every empty
        // accumulator; it differs between versions so that v1 and v2
        // aggregates can never collide.
        let accumulator_base = match version {
            ParamsVersion::V1 => BigUint::from(961u32),
            ParamsVersion::V2 => BigUint::from(60u32),
        };

        Params {
            version,
            modulus: ACCUMULATOR_MODULUS
                .parse()
                .expect("hardcoded accumulator modulus parses"),
            accumulator_base,
            serial_range: BigUint::one() << 256,
            commitment_modulus: COMMITMENT_MODULUS
                .parse()
                .expect("hardcoded commitment modulus parses"),
            commitment_base_g: BigUint::from(2u32),
            commitment_base_h: BigUint::from(3u32),
        }
    }

    /// Returns the parameter set for `version`.
    pub fn for_version(version: ParamsVersion) -> &'static Params {
        match version {
            ParamsVersion::V1 => &PARAMS_V1,
            ParamsVersion::V2 => &PARAMS_V2,
        }
    }

    /// The version of this parameter set.
    pub fn version(&self) -> ParamsVersion {
        self.version
    }

    /// The accumulator group modulus.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// The starting value of an empty accumulator.
    pub fn accumulator_base(&self) -> &BigUint {
        &self.accumulator_base
    }

    /// The exclusive upper bound on valid serial numbers.
    pub fn serial_range(&self) -> &BigUint {
        &self.serial_range
    }

    /// Computes the coin commitment opened by `serial` and `randomness`:
    /// `g^serial * h^randomness mod p` in the commitment group.
    pub fn coin_commitment(&self, serial: &BigUint, randomness: &BigUint) -> BigUint {
        let g_to_s = self
            .commitment_base_g
            .modpow(serial, &self.commitment_modulus);
        let h_to_r = self
            .commitment_base_h
            .modpow(randomness, &self.commitment_modulus);

        (g_to_s * h_to_r) % &self.commitment_modulus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_stay_distinguishable() {
        let v1 = Params::for_version(ParamsVersion::V1);
        let v2 = Params::for_version(ParamsVersion::V2);

        assert_eq!(v1.version(), ParamsVersion::V1);
        assert_eq!(v2.version(), ParamsVersion::V2);
        assert_ne!(v1.accumulator_base(), v2.accumulator_base());
    }

    #[test]
    fn commitment_depends_on_both_openings() {
        let params = Params::for_version(ParamsVersion::V2);

        let serial = BigUint::from(123_456u32);
        let randomness = BigUint::from(654_321u32);

        let commitment = params.coin_commitment(&serial, &randomness);
        assert_ne!(
            commitment,
            params.coin_commitment(&serial, &BigUint::from(1u32))
        );
        assert_ne!(
            commitment,
            params.coin_commitment(&BigUint::from(1u32), &randomness)
        );
    }
}
