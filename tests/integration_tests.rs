//! Integration tests for component interactions.
//!
//! These tests run the signer, the off-chain verifier, and the settlement-side
//! verifier against one another.

mod fixtures;

use alloy_primitives::{Address, U256};
use auth::IntentWallet;
use fixtures::{FIXTURES, SIGNER};
use intent_core::settlement::{
    verify_both, InMemoryLedger, OnChainVerifier, SettlementFields,
};
use intent_core::signing::{
    digest_pipeline, payload_digest, KeyType, OffChainVerifier, PublicKey, RawSignature,
    Verification,
};
use intent_core::types::{IntentId, OrderIntent, Side};
use intent_core::Error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Duration;

fn ledger_for(account: Address, key: &PublicKey) -> OnChainVerifier<InMemoryLedger> {
    OnChainVerifier::new(
        InMemoryLedger::from((account, key.clone())),
        "Hedera",
        Duration::from_secs(5),
    )
}

fn flip(bytes: &mut [u8], bit: usize) {
    bytes[bit / 8] ^= 1 << (bit % 8);
}

fn random_intent(rng: &mut StdRng, signer: Address) -> OrderIntent {
    let side = if rng.gen::<bool>() { Side::Buy } else { Side::Sell };
    OrderIntent::new(
        side,
        U256::from(rng.gen::<u64>()),
        signer,
        IntentId::from_u128(rng.gen()),
        IntentId::from_u128(rng.gen()),
    )
}

/// Test that the fixture intents encode and hash to the recorded values.
#[test]
fn test_fixture_pipeline_values() {
    for fixture in FIXTURES {
        let intent = fixture.intent();
        assert_eq!(intent.encode_hex(), fixture.payload, "{}", fixture.name);
        assert_eq!(
            hex::encode(payload_digest(&intent.encode())),
            fixture.digest,
            "{}",
            fixture.name
        );

        let expected = format!("\x19Hedera Signed Message:\n44{}", fixture.digest_text);
        assert_eq!(digest_pipeline(&intent), expected.into_bytes(), "{}", fixture.name);
        assert_eq!(OrderIntent::decode_hex(fixture.payload).unwrap(), intent);
    }
}

/// Test the collateral, market, and tx segments of the scenario intent.
#[test]
fn test_scenario_segments() {
    let payload = FIXTURES[1].payload_bytes();
    let segments = [&payload[1..33], &payload[53..85]].concat();
    assert_eq!(
        hex::encode(segments),
        "000000000000000000000000000000000000000000000000000000000001ffb80189c0a87e807e808000000000000002019aef10408b70578850c8975f012489"
    );
}

/// Test that the cross-path account key parses and keeps its encoding.
#[test]
fn test_cross_path_public_key_parses() {
    let key = fixtures::cross_path_public_key();
    assert_eq!(key.key_type(), KeyType::EcdsaSecp256k1);
    assert_eq!(key.to_hex(), fixtures::CROSS_PATH_PUBLIC_KEY);
    assert_eq!(key.to_bytes().len(), 33);
    assert!(key.evm_address().is_some());

    let prefixed = format!("0x{}", fixtures::CROSS_PATH_PUBLIC_KEY);
    assert_eq!(
        PublicKey::from_hex(KeyType::EcdsaSecp256k1, &prefixed).unwrap(),
        key
    );
    assert!(matches!(
        PublicKey::from_hex(KeyType::Ed25519, fixtures::CROSS_PATH_PUBLIC_KEY),
        Err(Error::Format { .. })
    ));
}

/// Test that known-good signatures verify on both paths.
#[tokio::test]
async fn test_cross_path_consistency() {
    let off_chain = OffChainVerifier::default();

    for fixture in FIXTURES {
        let intent = fixture.intent();
        for (signature, key) in fixture.signers() {
            let on_chain = ledger_for(SIGNER, &key);
            let outcome = verify_both(&off_chain, &on_chain, &intent, &signature, &key)
                .await
                .unwrap();

            assert_eq!(outcome.off_chain, Verification::Verified, "{} {}", fixture.name, key.key_type());
            assert_eq!(outcome.on_chain, Verification::Verified, "{} {}", fixture.name, key.key_type());
            assert!(outcome.agree());
            assert!(outcome.verified());
        }
    }
}

/// Test that every single-bit change to the signature is rejected on both paths.
#[tokio::test]
async fn test_signature_bit_flips_rejected() {
    let off_chain = OffChainVerifier::default();
    let fixture = &FIXTURES[0];
    let payload = fixture.payload_bytes();
    let fields = SettlementFields::from_payload(&payload).unwrap();

    for (signature, key) in fixture.signers() {
        let on_chain = ledger_for(SIGNER, &key);
        for bit in 0..512 {
            let mut bytes = *signature.as_bytes();
            flip(&mut bytes, bit);
            let flipped = RawSignature::from_array(bytes);

            let off = off_chain.verify_payload(&payload, &flipped, &key).unwrap();
            let on = on_chain.verify(&fields, &flipped, &key).await.unwrap();
            assert_eq!(off, Verification::Rejected, "{} bit {}", key.key_type(), bit);
            assert_eq!(on, Verification::Rejected, "{} bit {}", key.key_type(), bit);
        }
    }
}

/// Test that every single-bit change to the payload is rejected on both paths.
#[tokio::test]
async fn test_payload_bit_flips_rejected() {
    let off_chain = OffChainVerifier::default();

    for fixture in FIXTURES {
        for (signature, key) in fixture.signers() {
            let on_chain = ledger_for(SIGNER, &key);
            for bit in 0..(85 * 8) {
                let mut payload = fixture.payload_bytes();
                flip(&mut payload, bit);
                let fields = SettlementFields::from_payload(&payload).unwrap();

                let off = off_chain.verify_payload(&payload, &signature, &key).unwrap();
                let on = on_chain.verify(&fields, &signature, &key).await.unwrap();
                assert_eq!(off, Verification::Rejected, "{} bit {}", fixture.name, bit);
                assert_eq!(on, Verification::Rejected, "{} bit {}", fixture.name, bit);
            }
        }
    }
}

/// Test that wrong-length inputs are format errors, not rejections.
#[tokio::test]
async fn test_malformed_inputs_are_errors() {
    let off_chain = OffChainVerifier::default();
    let fixture = &FIXTURES[0];
    let intent = fixture.intent();
    let key = fixtures::ed25519_public_key();

    assert!(matches!(
        off_chain.verify(&intent, &[0u8; 63], &key.to_bytes(), KeyType::Ed25519),
        Err(Error::Format { .. })
    ));
    assert!(matches!(
        off_chain.verify(&intent, &[0u8; 64], &[0u8; 31], KeyType::Ed25519),
        Err(Error::Format { .. })
    ));
    assert!(matches!(
        off_chain.verify_payload(&fixture.payload_bytes()[..84], &RawSignature::from_array([0; 64]), &key),
        Err(Error::Format { .. })
    ));
    assert!(matches!(
        OrderIntent::decode(&[0u8; 86]),
        Err(Error::Format { .. })
    ));
    assert!(matches!(
        SettlementFields::from_payload(&[]),
        Err(Error::Format { .. })
    ));
}

/// Test the container path end to end with a wallet-produced signature.
#[tokio::test]
async fn test_wallet_container_round_trip() {
    let wallet = IntentWallet::from_private_key(KeyType::Ed25519, fixtures::ED25519_PRIVATE_KEY).unwrap();
    let intent = FIXTURES[1].intent();
    let signed = wallet.sign_intent(&intent).unwrap();
    let container = signed.container().encode();

    let off = OffChainVerifier::default()
        .verify_container(&intent, &container, &signed.public_key)
        .unwrap();
    let on = ledger_for(SIGNER, &signed.public_key)
        .verify_container(&SettlementFields::from(&intent), &container)
        .await
        .unwrap();

    assert_eq!(off, Verification::Verified);
    assert_eq!(on, Verification::Verified);
    assert_eq!(signed.signature.to_hex(), FIXTURES[1].ed25519_signature);
}

/// Test freshly signed intents from both wallet types on both paths.
#[tokio::test]
async fn test_wallet_signatures_verify_on_both_paths() {
    let mut rng = StdRng::seed_from_u64(42);
    let off_chain = OffChainVerifier::default();

    let wallets = [
        IntentWallet::from_private_key(KeyType::EcdsaSecp256k1, fixtures::ECDSA_PRIVATE_KEY).unwrap(),
        IntentWallet::from_private_key(KeyType::Ed25519, fixtures::ED25519_PRIVATE_KEY).unwrap(),
    ];

    for wallet in &wallets {
        let key = wallet.public_key();
        let account = key.evm_address().unwrap_or(SIGNER);
        let on_chain = ledger_for(account, &key);

        for _ in 0..16 {
            let intent = random_intent(&mut rng, account);
            let signed = wallet.sign_intent(&intent).unwrap();
            let outcome = verify_both(&off_chain, &on_chain, &intent, &signed.signature, &key)
                .await
                .unwrap();
            assert!(outcome.verified(), "{} {}", wallet.key_type(), intent.tx_id);
        }
    }
}

/// Test that an ECDSA signature is not accepted for another account.
#[tokio::test]
async fn test_other_account_not_authorized() {
    let fixture = &FIXTURES[0];
    let [(signature, key), _] = fixture.signers();
    let on_chain = ledger_for(fixtures::ECDSA_ADDRESS, &key);

    let outcome = on_chain
        .verify(&SettlementFields::from(&fixture.intent()), &signature, &key)
        .await
        .unwrap();
    assert_eq!(outcome, Verification::Rejected);
}

/// Test that verification can be shared across threads.
#[test]
fn test_parallel_off_chain_verification() {
    let wallet = IntentWallet::from_private_key(KeyType::Ed25519, fixtures::ED25519_PRIVATE_KEY).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let signed: Vec<_> = (0..256)
        .map(|_| wallet.sign_intent(&random_intent(&mut rng, SIGNER)).unwrap())
        .collect();

    let verifier = OffChainVerifier::default();
    let verified = signed
        .par_iter()
        .filter(|signed| verifier.verify_signed(signed).is_verified())
        .count();
    assert_eq!(verified, signed.len());

    let fixture = &FIXTURES[0];
    let intent = fixture.intent();
    let outcomes: Vec<_> = (0..1024)
        .into_par_iter()
        .map(|_| digest_pipeline(&intent))
        .collect();
    assert!(outcomes.windows(2).all(|pair| pair[0] == pair[1]));
}
