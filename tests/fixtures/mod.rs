//! Known-good vectors shared by the integration tests.
//!
//! Signatures were produced with the keys below over the prefixed message
//! `"\x19Hedera Signed Message:\n44" + digest_text`.

#![allow(dead_code)]

use alloy_primitives::{address, Address, U256};
use intent_core::signing::{KeyType, PublicKey, RawSignature};
use intent_core::types::{OrderIntent, Side};

/// Well-known development key (DO NOT USE IN PRODUCTION).
pub const ECDSA_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const ECDSA_PUBLIC_KEY: &str =
    "038318535b54105d4a7aae60c08fc45f9687181b4fdfc625bd1a753fa7397fed75";
pub const ECDSA_ADDRESS: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// Seed bytes 0x01..=0x20.
pub const ED25519_PRIVATE_KEY: &str =
    "0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20";
pub const ED25519_PUBLIC_KEY: &str =
    "79b5562e8fe654f94078b112e8a98ba7901f853ae695bed7e0e3910bad049664";

/// Compressed secp256k1 account key used in cross-path runs.
pub const CROSS_PATH_PUBLIC_KEY: &str =
    "03b6e6702057a1b8be59b567314abecf4c2c3a7492ceb289ca0422b18edbac0787";

pub const SIGNER: Address = address!("440a1d7af93b92920bce50b4c0d2a8e6dcfebfd6");

pub struct Fixture {
    pub name: &'static str,
    pub side: Side,
    pub collateral_abs_scaled: u64,
    pub market_id: &'static str,
    pub tx_id: &'static str,
    pub payload: &'static str,
    pub digest: &'static str,
    pub digest_text: &'static str,
    pub ecdsa_signature: &'static str,
    pub ed25519_signature: &'static str,
}

impl Fixture {
    pub fn intent(&self) -> OrderIntent {
        OrderIntent::new(
            self.side,
            U256::from(self.collateral_abs_scaled),
            SIGNER,
            self.market_id.parse().unwrap(),
            self.tx_id.parse().unwrap(),
        )
    }

    pub fn payload_bytes(&self) -> Vec<u8> {
        hex::decode(self.payload).unwrap()
    }

    /// Signature and public key for each supported algorithm.
    pub fn signers(&self) -> [(RawSignature, PublicKey); 2] {
        [
            (
                RawSignature::from_hex(self.ecdsa_signature).unwrap(),
                ecdsa_public_key(),
            ),
            (
                RawSignature::from_hex(self.ed25519_signature).unwrap(),
                ed25519_public_key(),
            ),
        ]
    }
}

pub const FIXTURES: &[Fixture] = &[
    Fixture {
        name: "sell-1000",
        side: Side::Sell,
        collateral_abs_scaled: 0x3e8,
        market_id: "0189c0a8-7e80-7e80-8000-000000000003",
        tx_id: "019b4a9f-fd6e-7096-829a-4958d6ed10d4",
        payload: "f100000000000000000000000000000000000000000000000000000000000003e8440a1d7af93b92920bce50b4c0d2a8e6dcfebfd60189c0a87e807e808000000000000003019b4a9ffd6e7096829a4958d6ed10d4",
        digest: "ead6d3a197634b3688318a8f6e406ec3c7779a4eefe097a4ed3ba93b576d375f",
        digest_text: "6tbToZdjSzaIMYqPbkBuw8d3mk7v4Jek7TupO1dtN18=",
        ecdsa_signature: "857184325a65f7aab77e84e3e8795cf56c12c9abb58c9dd611d231cbb7c368f7187019fdc29d36aab2c55af64f99de0f6405669cc3941bd0ba9bf36fc95d63e7",
        ed25519_signature: "06f5460c638fee8f69e36a86e380342f629d694f03657e6e9d26d7c78f4399b9686da8bc6a612a68ba8b35b3db0a7c2242d9051eb6d99d2f8b558d6ffd64c10f",
    },
    Fixture {
        name: "sell-131000",
        side: Side::Sell,
        collateral_abs_scaled: 0x1ffb8,
        market_id: "0189c0a8-7e80-7e80-8000-000000000002",
        tx_id: "019aef10-408b-7057-8850-c8975f012489",
        payload: "f1000000000000000000000000000000000000000000000000000000000001ffb8440a1d7af93b92920bce50b4c0d2a8e6dcfebfd60189c0a87e807e808000000000000002019aef10408b70578850c8975f012489",
        digest: "d5fa86ec2ff604d0bfeffbaafe342b9738e8d14b8e8f8eb58d0df2d6e1eb502b",
        digest_text: "1fqG7C/2BNC/7/uq/jQrlzjo0UuOj461jQ3y1uHrUCs=",
        ecdsa_signature: "128714ef9d88c8b6d99771eb7d358159eb2fdd77fb55a3b75e85b9e3fe3e3a1f5a2aa41459d33f25fe4a6859239d9e3af2129b4748e76d2424f4534cf534ba33",
        ed25519_signature: "b2b1355e69b5c8714cb7c91120e42eb719c1838f70e56505ece6521162737365142ab43d9908a12ecd2b0d1a20e762d4071ad99792a205d625c0e7bda8066d0d",
    },
];

pub fn ecdsa_public_key() -> PublicKey {
    PublicKey::from_hex(KeyType::EcdsaSecp256k1, ECDSA_PUBLIC_KEY).unwrap()
}

pub fn ed25519_public_key() -> PublicKey {
    PublicKey::from_hex(KeyType::Ed25519, ED25519_PUBLIC_KEY).unwrap()
}

pub fn cross_path_public_key() -> PublicKey {
    PublicKey::from_hex(KeyType::EcdsaSecp256k1, CROSS_PATH_PUBLIC_KEY).unwrap()
}
