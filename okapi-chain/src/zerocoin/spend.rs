//! The public coin spend: a spend proof that reveals the coin's serial
//! number instead of carrying an accumulator witness.
//!
//! Once enabled by consensus rules, a spender can prove ownership by
//! revealing the serial number and randomness committed to at mint time,
//! plus an ECDSA signature by the coin's one-time key over a hash of the
//! outputs being paid. Binding the signature to the outputs stops a spend
//! proof from being replayed against a different set of outputs.

use std::{collections::HashSet, io};

use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_traits::Zero;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use crate::{
    serialization::{SerializationError, ZerocoinDeserialize, ZerocoinSerialize},
    transaction::{self, OutputsHash},
    zerocoin::{Params, PublicCoin, ZerocoinMint, PUBKEY_COIN_VERSION},
};

/// Serial numbers that are banned from spending by consensus.
///
/// This network shipped with an empty ban list; the set exists so that a
/// ban can be deployed without a validation-logic change.
const INVALID_SERIAL_STRINGS: &[&str] = &[];

lazy_static! {
    static ref SECP256K1: Secp256k1<secp256k1::All> = Secp256k1::new();
    static ref INVALID_SERIALS: HashSet<BigUint> = INVALID_SERIAL_STRINGS
        .iter()
        .map(|s| s.parse().expect("hardcoded invalid serials parse"))
        .collect();
}

/// The context a spend proof was signed for.
///
/// The tag is part of the signed domain, so a proof produced for one
/// context cannot be repurposed for another. The set is closed: it must
/// never gain variants whose byte values collide with deployed ones.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum SpendType {
    /// A typical spend transaction; the coin is unusable afterwards.
    Spend,
    /// A spend that occurs as a stake.
    Stake,
    /// Proving ownership of coins used as masternode collateral.
    MnCollateral,
    /// Signing messages that do not belong to the contexts above.
    SignMessage,
}

impl From<SpendType> for u8 {
    fn from(spend_type: SpendType) -> u8 {
        match spend_type {
            SpendType::Spend => 0,
            SpendType::Stake => 1,
            SpendType::MnCollateral => 2,
            SpendType::SignMessage => 3,
        }
    }
}

impl TryFrom<u8> for SpendType {
    type Error = SerializationError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(SpendType::Spend),
            1 => Ok(SpendType::Stake),
            2 => Ok(SpendType::MnCollateral),
            3 => Ok(SpendType::SignMessage),
            _ => Err(SerializationError::Parse("unknown spend type")),
        }
    }
}

/// An error describing why a public coin spend is invalid.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum SpendError {
    /// The revealed serial number is out of range or banned.
    #[error("spend reveals an invalid serial number")]
    InvalidSerial,

    /// The signature does not verify against the spend's public key and
    /// bound output hash.
    #[error("spend signature does not verify")]
    InvalidSignature,

    /// The revealed serial and randomness do not open the coin commitment.
    #[error("revealed openings do not match the coin commitment")]
    InvalidCommitment,

    /// The coin predates the public-spend scheme.
    #[error("coin version does not support public spends")]
    WrongCoinVersion,

    /// Validation was requested without the mint's public coin attached.
    #[error("spend has no public coin to validate against")]
    MissingPublicCoin,
}

/// A public coin spend proof.
///
/// The wire format is the ordered fields `coin_serial_number, randomness,
/// pubkey, vch_sig`, and must round-trip byte-for-byte: the serialized form
/// is embedded in transaction inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicCoinSpend {
    coin_serial_number: BigUint,
    randomness: BigUint,
    pubkey: PublicKey,
    vch_sig: Vec<u8>,

    /// The hash of the transaction whose output minted the coin being spent.
    ///
    /// Provenance, not part of the wire format; the caller must populate it
    /// before validation is meaningful.
    pub tx_hash: Option<transaction::Hash>,
    /// The index of the mint output inside that transaction.
    pub output_index: Option<u32>,
    /// The hash of the outputs this spend pays into.
    pub hash_tx_out: Option<OutputsHash>,
    /// The public coin being spent, attached by the validator from the
    /// referenced mint output.
    pub pub_coin: Option<PublicCoin>,
}

impl PublicCoinSpend {
    /// Assembles a spend from its serialized fields.
    pub fn new(
        coin_serial_number: BigUint,
        randomness: BigUint,
        pubkey: PublicKey,
        vch_sig: Vec<u8>,
    ) -> Self {
        PublicCoinSpend {
            coin_serial_number,
            randomness,
            pubkey,
            vch_sig,
            tx_hash: None,
            output_index: None,
            hash_tx_out: None,
            pub_coin: None,
        }
    }

    /// Builds and signs a spend of `mint` paying into the outputs hashed by
    /// `hash_tx_out`.
    ///
    /// This is the wallet-side constructor: the mint record supplies the
    /// committed openings and provenance, and `secret_key` is the coin's
    /// one-time key.
    pub fn from_mint(
        mint: &ZerocoinMint,
        hash_tx_out: OutputsHash,
        secret_key: &SecretKey,
    ) -> Result<Self, SpendError> {
        if mint.is_v1() {
            return Err(SpendError::WrongCoinVersion);
        }

        let message =
            Message::from_slice(&hash_tx_out.0).expect("an outputs hash is a valid message");
        let signature = SECP256K1.sign_ecdsa(&message, secret_key);

        Ok(PublicCoinSpend {
            coin_serial_number: mint.serial_number().clone(),
            randomness: mint.randomness().clone(),
            pubkey: PublicKey::from_secret_key(&SECP256K1, secret_key),
            vch_sig: signature.serialize_der().to_vec(),
            tx_hash: Some(mint.txid()),
            output_index: Some(mint.output_index()),
            hash_tx_out: Some(hash_tx_out),
            pub_coin: Some(mint.public_coin()),
        })
    }

    /// The version byte this spend reports: always the pubkey coin version.
    pub fn version(&self) -> u8 {
        PUBKEY_COIN_VERSION
    }

    /// The context this spend proof is valid for: always [`SpendType::Spend`].
    pub fn spend_type(&self) -> SpendType {
        SpendType::Spend
    }

    /// The revealed serial number.
    pub fn coin_serial_number(&self) -> &BigUint {
        &self.coin_serial_number
    }

    /// The revealed commitment randomness.
    pub fn randomness(&self) -> &BigUint {
        &self.randomness
    }

    /// The coin's one-time public key.
    pub fn pubkey(&self) -> &PublicKey {
        &self.pubkey
    }

    /// The DER-encoded ECDSA signature over the bound output hash.
    pub fn vch_sig(&self) -> &[u8] {
        &self.vch_sig
    }

    /// The hash this spend's signature commits to.
    pub fn signature_hash(&self) -> Option<[u8; 32]> {
        self.hash_tx_out.map(|hash| hash.0)
    }

    /// Checks that the revealed serial number is well-formed under `params`.
    ///
    /// Returns false, never errors, on malformed input.
    pub fn has_valid_serial(&self, params: &Params) -> bool {
        !self.coin_serial_number.is_zero()
            && self.coin_serial_number < *params.serial_range()
            && !INVALID_SERIALS.contains(&self.coin_serial_number)
    }

    /// Checks that the signature verifies against the embedded public key
    /// and the bound output hash.
    ///
    /// Returns false, never errors, on malformed input or when the output
    /// hash has not been populated.
    pub fn has_valid_signature(&self) -> bool {
        let Some(hash) = self.signature_hash() else {
            return false;
        };
        let Ok(message) = Message::from_slice(&hash) else {
            return false;
        };
        let Ok(signature) = Signature::from_der(&self.vch_sig) else {
            return false;
        };

        SECP256K1
            .verify_ecdsa(&message, &signature, &self.pubkey)
            .is_ok()
    }

    /// Validates this spend against the attached public coin.
    ///
    /// The caller must populate [`Self::pub_coin`] (and the other provenance
    /// fields) from the referenced mint output first.
    pub fn check(&self, params: &Params) -> Result<(), SpendError> {
        if !self.has_valid_serial(params) {
            return Err(SpendError::InvalidSerial);
        }
        if !self.has_valid_signature() {
            return Err(SpendError::InvalidSignature);
        }

        let coin = self.pub_coin.as_ref().ok_or(SpendError::MissingPublicCoin)?;
        if coin.version() != params.version() {
            return Err(SpendError::WrongCoinVersion);
        }

        let commitment = params.coin_commitment(&self.coin_serial_number, &self.randomness);
        if commitment != *coin.commitment() {
            return Err(SpendError::InvalidCommitment);
        }

        Ok(())
    }
}

impl ZerocoinSerialize for PublicCoinSpend {
    fn zerocoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.coin_serial_number.zerocoin_serialize(&mut writer)?;
        self.randomness.zerocoin_serialize(&mut writer)?;
        self.pubkey.serialize().to_vec().zerocoin_serialize(&mut writer)?;
        self.vch_sig.zerocoin_serialize(&mut writer)
    }
}

impl ZerocoinDeserialize for PublicCoinSpend {
    fn zerocoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let coin_serial_number = BigUint::zerocoin_deserialize(&mut reader)?;
        let randomness = BigUint::zerocoin_deserialize(&mut reader)?;

        let pubkey_bytes = Vec::<u8>::zerocoin_deserialize(&mut reader)?;
        if pubkey_bytes.len() != 33 {
            return Err(SerializationError::Parse(
                "public key must be 33 compressed bytes",
            ));
        }
        let pubkey = PublicKey::from_slice(&pubkey_bytes)
            .map_err(|_| SerializationError::Parse("malformed public key"))?;

        let vch_sig = Vec::<u8>::zerocoin_deserialize(&mut reader)?;

        Ok(PublicCoinSpend::new(
            coin_serial_number,
            randomness,
            pubkey,
            vch_sig,
        ))
    }
}
