//! Content identifiers: binary parsing, the two string bases gateways hand
//! out (base58btc CIDv0, base32 CIDv1) and block hash checks.

use std::fmt;

use zkart_verify::Sha256Hasher;

use super::CarError;
use super::pb::{read_slice, read_varint};

pub(crate) const DAG_PB: u64 = 0x70;
pub(crate) const RAW: u64 = 0x55;
const SHA2_256: u64 = 0x12;
const IDENTITY: u64 = 0x00;

const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cid {
    pub(crate) codec:     u64,
    pub(crate) hash_code: u64,
    pub(crate) digest:    Vec<u8>,
}

impl Cid {
    pub fn parse_str(input: &str) -> Result<Self, CarError> {
        let unsupported = || CarError::UnsupportedCid(input.to_string());
        let bytes = if input.len() == 46 && input.starts_with("Qm") {
            decode_base58(input).ok_or_else(unsupported)?
        } else if let Some(rest) = input.strip_prefix('b') {
            decode_base32(rest).ok_or_else(unsupported)?
        } else {
            return Err(unsupported());
        };

        let (cid, used) = Self::read_bytes(&bytes)?;
        if used != bytes.len() {
            return Err(unsupported());
        }
        Ok(cid)
    }

    /// Parse a binary CID from the front of `buf`, returning it and its length.
    pub(crate) fn read_bytes(buf: &[u8]) -> Result<(Self, usize), CarError> {
        if buf.len() >= 34 && buf[0] == 0x12 && buf[1] == 0x20 {
            return Ok((
                Self {
                    codec:     DAG_PB,
                    hash_code: SHA2_256,
                    digest:    buf[2..34].to_vec(),
                },
                34,
            ));
        }

        let mut pos = 0;
        let version = read_varint(buf, &mut pos)?;
        if version != 1 {
            return Err(CarError::UnsupportedCid(format!("CID version {version}")));
        }
        let codec = read_varint(buf, &mut pos)?;
        let hash_code = read_varint(buf, &mut pos)?;
        let len = read_varint(buf, &mut pos)?;
        let digest = read_slice(buf, &mut pos, len)?.to_vec();
        Ok((
            Self {
                codec,
                hash_code,
                digest,
            },
            pos,
        ))
    }

    /// Check `data` against this CID's multihash.
    pub(crate) fn verify(&self, data: &[u8]) -> Result<(), CarError> {
        let matches = match self.hash_code {
            SHA2_256 => Sha256Hasher::digest(data).as_slice() == self.digest.as_slice(),
            IDENTITY => data == self.digest.as_slice(),
            other => return Err(CarError::UnsupportedCid(format!("multihash 0x{other:x}"))),
        };
        if matches {
            Ok(())
        } else {
            Err(CarError::DigestMismatch(self.to_string()))
        }
    }

    /// Blocks are addressed by multihash; the codec only says how to decode.
    pub(crate) fn multihash_key(&self) -> (u64, &[u8]) { (self.hash_code, &self.digest) }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cid(codec=0x{:x}, {})", self.codec, hex::encode(&self.digest))
    }
}

fn decode_base58(input: &str) -> Option<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::new();
    for c in input.bytes() {
        let mut carry = BASE58_ALPHABET.iter().position(|&a| a == c)? as u32;
        for byte in bytes.iter_mut() {
            carry += u32::from(*byte) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    let zeros = input.bytes().take_while(|&c| c == b'1').count();
    bytes.extend(std::iter::repeat_n(0, zeros));
    bytes.reverse();
    Some(bytes)
}

fn decode_base32(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer = 0u32;
    let mut bits = 0u32;
    for c in input.bytes() {
        let value = BASE32_ALPHABET.iter().position(|&a| a == c.to_ascii_lowercase())? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }
    Some(out)
}
