//! Signature container: the ledger's `SignatureMap` protobuf envelope.
//!
//! ```text
//! message SignatureMap  { repeated SignaturePair sigPair = 1; }
//! message SignaturePair {
//!     bytes pubKeyPrefix = 1;
//!     oneof signature {
//!         bytes contract        = 2;
//!         bytes ed25519         = 3;
//!         bytes RSA_3072        = 4;
//!         bytes ECDSA_384       = 5;
//!         bytes ECDSA_secp256k1 = 6;
//!     }
//! }
//! ```
//!
//! Only the `ed25519` and `ECDSA_secp256k1` slots are supported. The key prefix
//! identifies the signer but is not authoritative: verifiers take the public
//! key from their caller.

use super::keys::{KeyType, PublicKey, RawSignature};
use crate::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};

const WIRE_VARINT: u64 = 0;
const WIRE_FIXED64: u64 = 1;
const WIRE_LEN: u64 = 2;
const WIRE_FIXED32: u64 = 5;

const MAP_SIG_PAIR: u64 = 1;

const PAIR_PUB_KEY_PREFIX: u64 = 1;
const PAIR_CONTRACT: u64 = 2;
const PAIR_ED25519: u64 = 3;
const PAIR_RSA_3072: u64 = 4;
const PAIR_ECDSA_384: u64 = 5;
const PAIR_ECDSA_SECP256K1: u64 = 6;

/// One signature pair: key prefix plus a signature in one algorithm slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureContainer {
    public_key_prefix: Vec<u8>,
    signature: RawSignature,
    key_type: KeyType,
}

impl SignatureContainer {
    pub fn new(public_key_prefix: impl Into<Vec<u8>>, signature: RawSignature, key_type: KeyType) -> Self {
        Self {
            public_key_prefix: public_key_prefix.into(),
            signature,
            key_type,
        }
    }

    /// Container whose prefix is the full key and whose slot matches the key type.
    pub fn for_key(public_key: &PublicKey, signature: RawSignature) -> Self {
        Self::new(public_key.to_bytes(), signature, public_key.key_type())
    }

    pub fn public_key_prefix(&self) -> &[u8] {
        &self.public_key_prefix
    }

    pub fn signature(&self) -> &RawSignature {
        &self.signature
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Encode as a `SignatureMap` holding this single pair.
    pub fn encode(&self) -> Vec<u8> {
        let pair = self.encode_pair();
        let mut out = BytesMut::with_capacity(pair.len() + 3);
        put_len_field(&mut out, MAP_SIG_PAIR, &pair);
        out.to_vec()
    }

    fn encode_pair(&self) -> Vec<u8> {
        let slot = match self.key_type {
            KeyType::EcdsaSecp256k1 => PAIR_ECDSA_SECP256K1,
            KeyType::Ed25519 => PAIR_ED25519,
        };

        let mut pair = BytesMut::with_capacity(self.public_key_prefix.len() + 70);
        put_len_field(&mut pair, PAIR_PUB_KEY_PREFIX, &self.public_key_prefix);
        put_len_field(&mut pair, slot, self.signature.as_bytes());
        pair.to_vec()
    }

    fn decode_pair(mut buf: &[u8]) -> Result<Self> {
        let mut public_key_prefix = Vec::new();
        let mut slot: Option<(KeyType, RawSignature)> = None;

        while buf.has_remaining() {
            let (field, wire) = read_key(&mut buf)?;
            match (field, wire) {
                (PAIR_PUB_KEY_PREFIX, WIRE_LEN) => {
                    public_key_prefix = read_len(&mut buf)?.to_vec();
                }
                (PAIR_ED25519 | PAIR_ECDSA_SECP256K1, WIRE_LEN) => {
                    let key_type = if field == PAIR_ED25519 {
                        KeyType::Ed25519
                    } else {
                        KeyType::EcdsaSecp256k1
                    };
                    let signature = RawSignature::from_slice(read_len(&mut buf)?)?;
                    if slot.replace((key_type, signature)).is_some() {
                        return Err(Error::format("signature pair populates more than one slot"));
                    }
                }
                (PAIR_CONTRACT | PAIR_RSA_3072 | PAIR_ECDSA_384, WIRE_LEN) => {
                    return Err(Error::UnsupportedAlgorithm {
                        algorithm: slot_name(field).to_string(),
                    });
                }
                (_, wire) => skip_field(&mut buf, wire)?,
            }
        }

        let (key_type, signature) = slot.ok_or(Error::MissingSignature)?;
        Ok(Self {
            public_key_prefix,
            signature,
            key_type,
        })
    }
}

/// Build a container from loosely-typed parts.
///
/// `key_type` must name one of the two supported algorithms.
pub fn build_container(public_key: &[u8], signature: &[u8], key_type: &str) -> Result<Vec<u8>> {
    let key_type: KeyType = key_type.parse()?;
    let signature = RawSignature::from_slice(signature)?;
    Ok(SignatureContainer::new(public_key, signature, key_type).encode())
}

/// Open a container and return its first signature pair.
pub fn open_container(bytes: &[u8]) -> Result<SignatureContainer> {
    decode_signature_map(bytes)?
        .into_iter()
        .next()
        .ok_or(Error::MissingSignature)
}

/// Decode every signature pair in a `SignatureMap`.
pub fn decode_signature_map(bytes: &[u8]) -> Result<Vec<SignatureContainer>> {
    let mut buf = bytes;
    let mut pairs = Vec::new();

    while buf.has_remaining() {
        let (field, wire) = read_key(&mut buf)?;
        match (field, wire) {
            (MAP_SIG_PAIR, WIRE_LEN) => {
                let pair = read_len(&mut buf)?;
                pairs.push(SignatureContainer::decode_pair(pair)?);
            }
            (_, wire) => skip_field(&mut buf, wire)?,
        }
    }

    Ok(pairs)
}

fn slot_name(field: u64) -> &'static str {
    match field {
        PAIR_CONTRACT => "contract",
        PAIR_RSA_3072 => "RSA_3072",
        PAIR_ECDSA_384 => "ECDSA_384",
        _ => "unknown",
    }
}

fn put_varint(buf: &mut BytesMut, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

fn put_len_field(buf: &mut BytesMut, field: u64, data: &[u8]) {
    put_varint(buf, (field << 3) | WIRE_LEN);
    put_varint(buf, data.len() as u64);
    buf.put_slice(data);
}

fn read_varint(buf: &mut &[u8]) -> Result<u64> {
    let mut value = 0u64;
    for shift in (0..64).step_by(7) {
        if !buf.has_remaining() {
            return Err(Error::format("truncated varint in signature container"));
        }
        let byte = buf.get_u8();
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(Error::format("varint overflow in signature container"))
}

fn read_key(buf: &mut &[u8]) -> Result<(u64, u64)> {
    let key = read_varint(buf)?;
    let field = key >> 3;
    if field == 0 {
        return Err(Error::format("field number 0 in signature container"));
    }
    Ok((field, key & 0x07))
}

fn read_len<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8]> {
    let len = read_varint(buf)?;
    let len = usize::try_from(len)
        .ok()
        .filter(|len| *len <= buf.remaining())
        .ok_or_else(|| Error::format("length-delimited field overruns signature container"))?;
    let whole: &'a [u8] = *buf;
    let (data, rest) = whole.split_at(len);
    *buf = rest;
    Ok(data)
}

fn skip_field(buf: &mut &[u8], wire: u64) -> Result<()> {
    let width = match wire {
        WIRE_VARINT => {
            read_varint(buf)?;
            return Ok(());
        }
        WIRE_LEN => {
            read_len(buf)?;
            return Ok(());
        }
        WIRE_FIXED64 => 8,
        WIRE_FIXED32 => 4,
        other => {
            return Err(Error::format(format!(
                "unsupported wire type {} in signature container",
                other
            )))
        }
    };
    if buf.remaining() < width {
        return Err(Error::format("truncated fixed-width field in signature container"));
    }
    buf.advance(width);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ECDSA_PUBLIC_KEY: &str =
        "038318535b54105d4a7aae60c08fc45f9687181b4fdfc625bd1a753fa7397fed75";

    fn sample_signature() -> RawSignature {
        let mut bytes = [0u8; 64];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        RawSignature::from_array(bytes)
    }

    #[test]
    fn test_ecdsa_container_wire_bytes() {
        let key = hex::decode(ECDSA_PUBLIC_KEY).unwrap();
        let encoded = build_container(&key, sample_signature().as_bytes(), "ECDSA_SECP256K1").unwrap();

        // SignatureMap.sigPair, length 101
        assert_eq!(&encoded[..2], &[0x0a, 0x65]);
        // SignaturePair.pubKeyPrefix, length 33
        assert_eq!(&encoded[2..4], &[0x0a, 0x21]);
        assert_eq!(&encoded[4..37], key.as_slice());
        // SignaturePair.ECDSA_secp256k1, length 64
        assert_eq!(&encoded[37..39], &[0x32, 0x40]);
        assert_eq!(&encoded[39..], sample_signature().as_bytes());
    }

    #[test]
    fn test_ed25519_slot_tag() {
        let encoded =
            SignatureContainer::new(vec![0xaa; 32], sample_signature(), KeyType::Ed25519).encode();
        assert_eq!(&encoded[..2], &[0x0a, 0x64]);
        assert_eq!(&encoded[36..38], &[0x1a, 0x40]);
    }

    #[test]
    fn test_open_returns_parts() {
        let key = hex::decode(ECDSA_PUBLIC_KEY).unwrap();
        let encoded = build_container(&key, sample_signature().as_bytes(), "ECDSA-secp256k1").unwrap();
        let opened = open_container(&encoded).unwrap();
        assert_eq!(opened.public_key_prefix(), key.as_slice());
        assert_eq!(opened.signature(), &sample_signature());
        assert_eq!(opened.key_type(), KeyType::EcdsaSecp256k1);
    }

    #[test]
    fn test_empty_prefix_allowed() {
        let container = SignatureContainer::new(Vec::new(), sample_signature(), KeyType::Ed25519);
        let opened = open_container(&container.encode()).unwrap();
        assert!(opened.public_key_prefix().is_empty());
        assert_eq!(opened, container);
    }

    #[test]
    fn test_build_unknown_algorithm() {
        let result = build_container(&[0x01; 33], sample_signature().as_bytes(), "RSA_3072");
        assert!(matches!(result, Err(Error::UnsupportedAlgorithm { .. })));
    }

    #[test]
    fn test_build_rejects_wrong_signature_length() {
        let result = build_container(&[0x01; 33], &[0u8; 65], "ED25519");
        assert!(matches!(result, Err(Error::Format { .. })));
    }

    #[test]
    fn test_open_missing_signature() {
        // Empty map.
        assert!(matches!(open_container(&[]), Err(Error::MissingSignature)));

        // Pair with only a key prefix.
        let mut pair = BytesMut::new();
        put_len_field(&mut pair, PAIR_PUB_KEY_PREFIX, &[0x02; 33]);
        let mut map = BytesMut::new();
        put_len_field(&mut map, MAP_SIG_PAIR, &pair);
        assert!(matches!(open_container(&map), Err(Error::MissingSignature)));
    }

    #[test]
    fn test_open_unsupported_slot() {
        let mut pair = BytesMut::new();
        put_len_field(&mut pair, PAIR_PUB_KEY_PREFIX, &[0x02; 4]);
        put_len_field(&mut pair, PAIR_RSA_3072, &[0x00; 384]);
        let mut map = BytesMut::new();
        put_len_field(&mut map, MAP_SIG_PAIR, &pair);

        match open_container(&map) {
            Err(Error::UnsupportedAlgorithm { algorithm }) => assert_eq!(algorithm, "RSA_3072"),
            other => panic!("expected UnsupportedAlgorithm, got {:?}", other),
        }
    }

    #[test]
    fn test_open_rejects_two_slots() {
        let mut pair = BytesMut::new();
        put_len_field(&mut pair, PAIR_ED25519, sample_signature().as_bytes());
        put_len_field(&mut pair, PAIR_ECDSA_SECP256K1, sample_signature().as_bytes());
        let mut map = BytesMut::new();
        put_len_field(&mut map, MAP_SIG_PAIR, &pair);
        assert!(matches!(open_container(&map), Err(Error::Format { .. })));
    }

    #[test]
    fn test_open_malformed() {
        let encoded =
            SignatureContainer::new(vec![0x03; 33], sample_signature(), KeyType::EcdsaSecp256k1)
                .encode();

        // Truncated.
        assert!(matches!(
            open_container(&encoded[..encoded.len() - 1]),
            Err(Error::Format { .. })
        ));
        // Unterminated varint.
        assert!(matches!(open_container(&[0x0a, 0xff]), Err(Error::Format { .. })));
        // Wire type 3 (deprecated groups).
        assert!(matches!(open_container(&[0x0b]), Err(Error::Format { .. })));
        // Field number 0.
        assert!(matches!(open_container(&[0x02, 0x00]), Err(Error::Format { .. })));
    }

    #[test]
    fn test_open_wrong_signature_length_in_slot() {
        let mut pair = BytesMut::new();
        put_len_field(&mut pair, PAIR_ED25519, &[0x01; 65]);
        let mut map = BytesMut::new();
        put_len_field(&mut map, MAP_SIG_PAIR, &pair);
        assert!(matches!(open_container(&map), Err(Error::Format { .. })));
    }

    #[test]
    fn test_unknown_fields_skipped() {
        let container =
            SignatureContainer::new(vec![0x07; 32], sample_signature(), KeyType::Ed25519);
        let mut map = BytesMut::new();
        // field 9, varint
        map.put_slice(&[0x48, 0x96, 0x01]);
        map.put_slice(&container.encode());
        // field 10, fixed32
        map.put_slice(&[0x55, 0x01, 0x02, 0x03, 0x04]);
        assert_eq!(open_container(&map).unwrap(), container);
    }

    #[test]
    fn test_multiple_pairs() {
        let first = SignatureContainer::new(vec![0x01; 32], sample_signature(), KeyType::Ed25519);
        let second =
            SignatureContainer::new(vec![0x02; 33], sample_signature(), KeyType::EcdsaSecp256k1);
        let mut map = first.encode();
        map.extend_from_slice(&second.encode());

        let pairs = decode_signature_map(&map).unwrap();
        assert_eq!(pairs, vec![first.clone(), second]);
        assert_eq!(open_container(&map).unwrap(), first);
    }
}
