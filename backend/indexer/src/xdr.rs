//! Minimal reader for base64 XDR `ScVal`s, the default encoding of topics and
//! values in `getEvents` responses.
//!
//! Only the variants the campaign ledger publishes are understood: symbols,
//! addresses, integers, and the maps produced by `#[contracttype]` structs.
//! Anything else is rejected with [`IndexerError::EventParse`].

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{Map, Value};

use crate::errors::{IndexerError, Result};

const SCV_BOOL: u32 = 0;
const SCV_VOID: u32 = 1;
const SCV_U32: u32 = 3;
const SCV_I32: u32 = 4;
const SCV_U64: u32 = 5;
const SCV_I64: u32 = 6;
const SCV_TIMEPOINT: u32 = 7;
const SCV_DURATION: u32 = 8;
const SCV_U128: u32 = 9;
const SCV_I128: u32 = 10;
const SCV_BYTES: u32 = 13;
const SCV_STRING: u32 = 14;
pub(crate) const SCV_SYMBOL: u32 = 15;
const SCV_VEC: u32 = 16;
const SCV_MAP: u32 = 17;
const SCV_ADDRESS: u32 = 18;

const SC_ADDRESS_ACCOUNT: u32 = 0;
const SC_ADDRESS_CONTRACT: u32 = 1;
const PUBLIC_KEY_ED25519: u32 = 0;

/// Nesting limit for vectors and maps.
const MAX_DEPTH: usize = 16;

/// A decoded `ScVal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScValue {
    Bool(bool),
    Void,
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    U128(u128),
    I128(i128),
    Bytes(Vec<u8>),
    Str(String),
    Symbol(String),
    /// Strkey form: `G…` for accounts, `C…` for contracts.
    Address(String),
    Vec(Vec<ScValue>),
    Map(Vec<(ScValue, ScValue)>),
}

impl ScValue {
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Textual form of a scalar topic: symbols, strings and addresses.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Symbol(s) | Self::Str(s) | Self::Address(s) => Some(s),
            _ => None,
        }
    }

    /// JSON view used by payload decoding.
    ///
    /// 64- and 128-bit integers become decimal strings so amounts survive
    /// JSON untouched; maps keyed by symbols become objects.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Void => Value::Null,
            Self::U32(v) => Value::from(*v),
            Self::I32(v) => Value::from(*v),
            Self::U64(v) => Value::String(v.to_string()),
            Self::I64(v) => Value::String(v.to_string()),
            Self::U128(v) => Value::String(v.to_string()),
            Self::I128(v) => Value::String(v.to_string()),
            Self::Bytes(b) => Value::String(BASE64.encode(b)),
            Self::Str(s) | Self::Symbol(s) | Self::Address(s) => Value::String(s.clone()),
            Self::Vec(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(entries) => {
                if entries.iter().all(|(k, _)| k.as_text().is_some()) {
                    let object: Map<String, Value> = entries
                        .iter()
                        .filter_map(|(k, v)| k.as_text().map(|k| (k.to_string(), v.to_json())))
                        .collect();
                    Value::Object(object)
                } else {
                    Value::Array(
                        entries
                            .iter()
                            .map(|(k, v)| Value::Array(vec![k.to_json(), v.to_json()]))
                            .collect(),
                    )
                }
            }
        }
    }
}

/// Decode a base64 XDR `ScVal`. Trailing bytes are an error.
pub fn decode_base64(raw: &str) -> Result<ScValue> {
    let bytes = BASE64
        .decode(raw.trim())
        .map_err(|e| parse_error(format!("invalid base64: {e}")))?;
    let mut reader = Reader::new(&bytes);
    let value = reader.sc_val(0)?;
    if !reader.is_empty() {
        return Err(parse_error(format!(
            "{} trailing bytes after ScVal",
            reader.remaining()
        )));
    }
    Ok(value)
}

fn parse_error(msg: String) -> IndexerError {
    IndexerError::EventParse(format!("XDR: {msg}"))
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(parse_error(format!(
                "need {n} bytes at offset {}, have {}",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    fn bool(&mut self) -> Result<bool> {
        match self.u32()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(parse_error(format!("invalid bool {other}"))),
        }
    }

    /// Variable-length opaque data, padded to a multiple of four bytes.
    fn opaque(&mut self) -> Result<&'a [u8]> {
        let len = self.u32()? as usize;
        let data = self.take(len)?;
        self.take((4 - len % 4) % 4)?;
        Ok(data)
    }

    fn text(&mut self) -> Result<String> {
        let data = self.opaque()?;
        String::from_utf8(data.to_vec()).map_err(|e| parse_error(format!("invalid utf-8: {e}")))
    }

    fn count(&mut self) -> Result<usize> {
        let n = self.u32()? as usize;
        // Every element takes at least four bytes.
        if n > self.remaining() / 4 {
            return Err(parse_error(format!("length {n} exceeds input")));
        }
        Ok(n)
    }

    fn address(&mut self) -> Result<String> {
        match self.u32()? {
            SC_ADDRESS_ACCOUNT => match self.u32()? {
                PUBLIC_KEY_ED25519 => {
                    let key = self.array::<32>()?;
                    Ok(stellar_strkey::ed25519::PublicKey(key).to_string())
                }
                other => Err(parse_error(format!("unknown public key type {other}"))),
            },
            SC_ADDRESS_CONTRACT => {
                let hash = self.array::<32>()?;
                Ok(stellar_strkey::Contract(hash).to_string())
            }
            other => Err(parse_error(format!("unknown address type {other}"))),
        }
    }

    fn sc_val(&mut self, depth: usize) -> Result<ScValue> {
        if depth > MAX_DEPTH {
            return Err(parse_error("ScVal nested too deeply".to_string()));
        }
        let value = match self.u32()? {
            SCV_BOOL => ScValue::Bool(self.bool()?),
            SCV_VOID => ScValue::Void,
            SCV_U32 => ScValue::U32(self.u32()?),
            SCV_I32 => ScValue::I32(i32::from_be_bytes(self.array()?)),
            SCV_U64 | SCV_TIMEPOINT | SCV_DURATION => ScValue::U64(self.u64()?),
            SCV_I64 => ScValue::I64(i64::from_be_bytes(self.array()?)),
            SCV_U128 => {
                let hi = self.u64()? as u128;
                let lo = self.u64()? as u128;
                ScValue::U128((hi << 64) | lo)
            }
            SCV_I128 => {
                let hi = i64::from_be_bytes(self.array()?) as i128;
                let lo = self.u64()? as i128;
                ScValue::I128((hi << 64) | lo)
            }
            SCV_BYTES => ScValue::Bytes(self.opaque()?.to_vec()),
            SCV_STRING => ScValue::Str(self.text()?),
            SCV_SYMBOL => ScValue::Symbol(self.text()?),
            SCV_VEC => {
                let mut items = Vec::new();
                if self.bool()? {
                    for _ in 0..self.count()? {
                        items.push(self.sc_val(depth + 1)?);
                    }
                }
                ScValue::Vec(items)
            }
            SCV_MAP => {
                let mut entries = Vec::new();
                if self.bool()? {
                    for _ in 0..self.count()? {
                        let key = self.sc_val(depth + 1)?;
                        let val = self.sc_val(depth + 1)?;
                        entries.push((key, val));
                    }
                }
                ScValue::Map(entries)
            }
            SCV_ADDRESS => ScValue::Address(self.address()?),
            other => return Err(parse_error(format!("unsupported ScVal type {other}"))),
        };
        Ok(value)
    }
}


#[cfg(test)]
mod tests {
    use super::encode::*;
    use super::*;

    #[test]
    fn decodes_symbol() {
        let value = decode_base64(&b64(&symbol("withdrawn"))).unwrap();
        assert_eq!(value.as_symbol(), Some("withdrawn"));
    }

    #[test]
    fn decodes_account_and_contract_addresses_to_strkeys() {
        let key = [7u8; 32];
        let value = decode_base64(&b64(&account(key))).unwrap();
        let expected = stellar_strkey::ed25519::PublicKey(key).to_string();
        assert!(expected.starts_with('G'));
        assert_eq!(value, ScValue::Address(expected));

        let value = decode_base64(&b64(&contract([9u8; 32]))).unwrap();
        assert!(value.as_text().unwrap().starts_with('C'));
    }

    #[test]
    fn decodes_u128_beyond_u64() {
        let big = (u64::MAX as u128) * 3 + 17;
        let value = decode_base64(&b64(&u128(big))).unwrap();
        assert_eq!(value, ScValue::U128(big));
        assert_eq!(value.to_json(), Value::String(big.to_string()));
    }

    #[test]
    fn struct_map_becomes_json_object() {
        let bytes = fields(&[
            ("minimum_contribution", u128(100)),
            ("owner", account([1u8; 32])),
            ("status", u32(1)),
        ]);
        let json = decode_base64(&b64(&bytes)).unwrap().to_json();
        assert_eq!(json["minimum_contribution"], "100");
        assert_eq!(json["status"], 1);
        assert!(json["owner"].as_str().unwrap().starts_with('G'));
    }

    #[test]
    fn rejects_truncated_and_trailing_input() {
        let mut bytes = u128(5);
        bytes.pop();
        assert!(decode_base64(&b64(&bytes)).is_err());

        let mut bytes = u32(5);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert!(decode_base64(&b64(&bytes)).is_err());
    }

    #[test]
    fn plain_words_are_not_xdr() {
        assert!(decode_base64("refunded").is_err());
        assert!(decode_base64("contrib").is_err());
    }
}
