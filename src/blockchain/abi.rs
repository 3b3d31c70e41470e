// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ARC-4 ABI encoding for application method calls.
//!
//! A method is identified by its signature, e.g. `transferToken(address)void`.
//! The first application argument is the 4-byte selector; each ABI argument
//! follows as its own application argument. Return values come back in the
//! last log line, prefixed with [`RETURN_PREFIX`].

use std::{fmt, str::FromStr};

use sha2::{Digest, Sha512_256};

use super::address::{Address, PUBLIC_KEY_LEN};

/// Prefix of the log entry that carries a method's return value.
pub const RETURN_PREFIX: [u8; 4] = [0x15, 0x1f, 0x7c, 0x75];

/// Application calls carry at most 16 arguments, the selector included.
const MAX_APP_ARGS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    #[error("Invalid ABI type: {0}")]
    InvalidType(String),

    #[error("Invalid method signature: {0}")]
    InvalidSignature(String),

    #[error("Value does not match ABI type {expected}")]
    TypeMismatch { expected: String },

    #[error("Value out of range for {0}")]
    ValueOutOfRange(String),

    #[error("Expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Encoded value exceeds 65535 bytes")]
    TooLong,

    #[error("Encoded value is truncated")]
    Truncated,

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Method returned no value")]
    MissingReturn,
}

/// An ARC-4 type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    Uint(u16),
    Byte,
    Bool,
    Address,
    String,
    StaticArray(Box<AbiType>, usize),
    DynamicArray(Box<AbiType>),
    Tuple(Vec<AbiType>),
}

/// A value of an [`AbiType`]. Both array kinds use `Array`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(u64),
    Byte(u8),
    Bool(bool),
    Address(Address),
    String(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            AbiValue::Byte(b) => Some(u64::from(*b)),
            _ => None,
        }
    }
}

impl AbiType {
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::String | AbiType::DynamicArray(_) => true,
            AbiType::StaticArray(elem, _) => elem.is_dynamic(),
            AbiType::Tuple(elems) => elems.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// Encoded length of a static type.
    fn static_len(&self) -> usize {
        match self {
            AbiType::Uint(bits) => usize::from(*bits) / 8,
            AbiType::Byte | AbiType::Bool => 1,
            AbiType::Address => PUBLIC_KEY_LEN,
            AbiType::StaticArray(elem, n) if **elem == AbiType::Bool => n.div_ceil(8),
            AbiType::StaticArray(elem, n) => n * elem.static_len(),
            AbiType::Tuple(elems) => {
                let mut len = 0;
                let mut i = 0;
                while i < elems.len() {
                    if elems[i] == AbiType::Bool {
                        i += bool_run(elems, i);
                        len += 1;
                    } else {
                        len += elems[i].static_len();
                        i += 1;
                    }
                }
                len
            }
            AbiType::String | AbiType::DynamicArray(_) => 0,
        }
    }

    pub fn encode(&self, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
        match (self, value) {
            (AbiType::Uint(bits), AbiValue::Uint(v)) => {
                if *bits < 64 && (*v >> *bits) != 0 {
                    return Err(AbiError::ValueOutOfRange(self.to_string()));
                }
                let width = usize::from(*bits) / 8;
                let mut out = vec![0u8; width];
                let be = v.to_be_bytes();
                let take = width.min(be.len());
                out[width - take..].copy_from_slice(&be[be.len() - take..]);
                Ok(out)
            }
            (AbiType::Byte, AbiValue::Byte(b)) => Ok(vec![*b]),
            (AbiType::Bool, AbiValue::Bool(b)) => Ok(vec![if *b { 0x80 } else { 0x00 }]),
            (AbiType::Address, AbiValue::Address(a)) => Ok(a.as_bytes().to_vec()),
            (AbiType::String, AbiValue::String(s)) => {
                let mut out = length_prefix(s.len())?;
                out.extend_from_slice(s.as_bytes());
                Ok(out)
            }
            (AbiType::StaticArray(elem, n), AbiValue::Array(values)) => {
                if values.len() != *n {
                    return Err(AbiError::LengthMismatch {
                        expected: *n,
                        actual: values.len(),
                    });
                }
                encode_sequence(&vec![(**elem).clone(); *n], values)
            }
            (AbiType::DynamicArray(elem), AbiValue::Array(values)) => {
                let mut out = length_prefix(values.len())?;
                out.extend(encode_sequence(&vec![(**elem).clone(); values.len()], values)?);
                Ok(out)
            }
            (AbiType::Tuple(elems), AbiValue::Tuple(values)) => {
                if values.len() != elems.len() {
                    return Err(AbiError::LengthMismatch {
                        expected: elems.len(),
                        actual: values.len(),
                    });
                }
                encode_sequence(elems, values)
            }
            _ => Err(AbiError::TypeMismatch {
                expected: self.to_string(),
            }),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<AbiValue, AbiError> {
        match self {
            AbiType::Uint(bits) => {
                let width = usize::from(*bits) / 8;
                if bytes.len() != width {
                    return Err(AbiError::Truncated);
                }
                let split = width.saturating_sub(8);
                if bytes[..split].iter().any(|b| *b != 0) {
                    return Err(AbiError::ValueOutOfRange(self.to_string()));
                }
                let mut be = [0u8; 8];
                be[8 - (width - split)..].copy_from_slice(&bytes[split..]);
                Ok(AbiValue::Uint(u64::from_be_bytes(be)))
            }
            AbiType::Byte => match bytes {
                [b] => Ok(AbiValue::Byte(*b)),
                _ => Err(AbiError::Truncated),
            },
            AbiType::Bool => match bytes {
                [0x80] => Ok(AbiValue::Bool(true)),
                [0x00] => Ok(AbiValue::Bool(false)),
                _ => Err(AbiError::InvalidEncoding("bool".into())),
            },
            AbiType::Address => {
                let key: [u8; PUBLIC_KEY_LEN] =
                    bytes.try_into().map_err(|_| AbiError::Truncated)?;
                Ok(AbiValue::Address(Address::from_public_key(key)))
            }
            AbiType::String => {
                let (len, rest) = read_length(bytes)?;
                if rest.len() != len {
                    return Err(AbiError::Truncated);
                }
                let s = std::str::from_utf8(rest)
                    .map_err(|e| AbiError::InvalidEncoding(e.to_string()))?;
                Ok(AbiValue::String(s.to_string()))
            }
            AbiType::StaticArray(elem, n) => Ok(AbiValue::Array(decode_sequence(
                &vec![(**elem).clone(); *n],
                bytes,
            )?)),
            AbiType::DynamicArray(elem) => {
                let (len, rest) = read_length(bytes)?;
                Ok(AbiValue::Array(decode_sequence(
                    &vec![(**elem).clone(); len],
                    rest,
                )?))
            }
            AbiType::Tuple(elems) => Ok(AbiValue::Tuple(decode_sequence(elems, bytes)?)),
        }
    }
}

fn length_prefix(len: usize) -> Result<Vec<u8>, AbiError> {
    let len = u16::try_from(len).map_err(|_| AbiError::TooLong)?;
    Ok(len.to_be_bytes().to_vec())
}

fn read_length(bytes: &[u8]) -> Result<(usize, &[u8]), AbiError> {
    match bytes {
        [hi, lo, rest @ ..] => Ok((usize::from(u16::from_be_bytes([*hi, *lo])), rest)),
        _ => Err(AbiError::Truncated),
    }
}

/// Number of consecutive bools starting at `start`, capped at one byte.
fn bool_run(types: &[AbiType], start: usize) -> usize {
    types[start..]
        .iter()
        .take(8)
        .take_while(|t| **t == AbiType::Bool)
        .count()
}

fn encode_sequence(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    // Each entry is a head and, for dynamic elements, the tail it points at.
    let mut parts: Vec<(Vec<u8>, Option<Vec<u8>>)> = Vec::with_capacity(types.len());

    let mut i = 0;
    while i < types.len() {
        let ty = &types[i];
        if *ty == AbiType::Bool {
            let run = bool_run(types, i);
            let mut packed = 0u8;
            for (bit, value) in values[i..i + run].iter().enumerate() {
                match value {
                    AbiValue::Bool(true) => packed |= 0x80 >> bit,
                    AbiValue::Bool(false) => {}
                    _ => {
                        return Err(AbiError::TypeMismatch {
                            expected: "bool".into(),
                        })
                    }
                }
            }
            parts.push((vec![packed], None));
            i += run;
        } else if ty.is_dynamic() {
            parts.push((vec![0, 0], Some(ty.encode(&values[i])?)));
            i += 1;
        } else {
            parts.push((ty.encode(&values[i])?, None));
            i += 1;
        }
    }

    let head_len: usize = parts.iter().map(|(head, _)| head.len()).sum();
    let mut offset = head_len;
    for (head, tail) in parts.iter_mut() {
        if let Some(tail) = tail {
            let at = u16::try_from(offset).map_err(|_| AbiError::TooLong)?;
            head.copy_from_slice(&at.to_be_bytes());
            offset += tail.len();
        }
    }
    if offset > usize::from(u16::MAX) {
        return Err(AbiError::TooLong);
    }

    let mut out = Vec::with_capacity(offset);
    for (head, _) in &parts {
        out.extend_from_slice(head);
    }
    for (_, tail) in parts {
        if let Some(tail) = tail {
            out.extend(tail);
        }
    }
    Ok(out)
}

fn decode_sequence(types: &[AbiType], bytes: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let mut values: Vec<Option<AbiValue>> = vec![None; types.len()];
    let mut dynamic: Vec<(usize, usize)> = Vec::new();
    let mut pos = 0;

    let mut i = 0;
    while i < types.len() {
        let ty = &types[i];
        if *ty == AbiType::Bool {
            let run = bool_run(types, i);
            let packed = *bytes.get(pos).ok_or(AbiError::Truncated)?;
            for bit in 0..run {
                values[i + bit] = Some(AbiValue::Bool(packed & (0x80 >> bit) != 0));
            }
            pos += 1;
            i += run;
        } else if ty.is_dynamic() {
            let (offset, _) = read_length(bytes.get(pos..).ok_or(AbiError::Truncated)?)?;
            dynamic.push((i, offset));
            pos += 2;
            i += 1;
        } else {
            let len = ty.static_len();
            let slice = bytes.get(pos..pos + len).ok_or(AbiError::Truncated)?;
            values[i] = Some(ty.decode(slice)?);
            pos += len;
            i += 1;
        }
    }

    if dynamic.is_empty() && pos != bytes.len() {
        return Err(AbiError::InvalidEncoding("trailing bytes".into()));
    }

    for (k, &(index, start)) in dynamic.iter().enumerate() {
        let end = dynamic.get(k + 1).map_or(bytes.len(), |&(_, next)| next);
        let slice = bytes.get(start..end).ok_or(AbiError::Truncated)?;
        values[index] = Some(types[index].decode(slice)?);
    }

    values
        .into_iter()
        .map(|v| v.ok_or(AbiError::Truncated))
        .collect()
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Byte => f.write_str("byte"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::Address => f.write_str("address"),
            AbiType::String => f.write_str("string"),
            AbiType::StaticArray(elem, n) => write!(f, "{elem}[{n}]"),
            AbiType::DynamicArray(elem) => write!(f, "{elem}[]"),
            AbiType::Tuple(elems) => {
                f.write_str("(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{elem}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for AbiType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || AbiError::InvalidType(s.to_string());

        if let Some(body) = s.strip_suffix(']') {
            let open = body.rfind('[').ok_or_else(invalid)?;
            let elem: AbiType = body[..open].parse()?;
            let size = &body[open + 1..];
            return if size.is_empty() {
                Ok(AbiType::DynamicArray(Box::new(elem)))
            } else {
                let n = size.parse().map_err(|_| invalid())?;
                Ok(AbiType::StaticArray(Box::new(elem), n))
            };
        }

        if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            return split_top_level(inner)
                .ok_or_else(invalid)?
                .into_iter()
                .map(str::parse)
                .collect::<Result<Vec<_>, _>>()
                .map(AbiType::Tuple);
        }

        match s {
            "byte" => Ok(AbiType::Byte),
            "bool" => Ok(AbiType::Bool),
            "address" => Ok(AbiType::Address),
            "string" => Ok(AbiType::String),
            _ => {
                let bits: u16 = s
                    .strip_prefix("uint")
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(invalid)?;
                if bits == 0 || bits > 512 || bits % 8 != 0 {
                    return Err(invalid());
                }
                Ok(AbiType::Uint(bits))
            }
        }
    }
}

/// Split a comma separated list, ignoring commas nested in parentheses.
fn split_top_level(s: &str) -> Option<Vec<&str>> {
    if s.is_empty() {
        return Some(Vec::new());
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&s[start..]);
    Some(parts)
}

/// An ABI method: name, argument types and optional return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub args: Vec<AbiType>,
    pub returns: Option<AbiType>,
}

impl Method {
    /// Canonical signature, e.g. `emmitAndGetShares(string,string,uint64)uint64`.
    pub fn signature(&self) -> String {
        let args = AbiType::Tuple(self.args.clone()).to_string();
        let returns = self
            .returns
            .as_ref()
            .map_or_else(|| "void".to_string(), ToString::to_string);
        format!("{}{}{}", self.name, args, returns)
    }

    pub fn selector(&self) -> [u8; 4] {
        let digest = Sha512_256::digest(self.signature().as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }

    /// Build the application argument list: selector first, then one entry
    /// per ABI argument. Arguments past the 15th are packed into a tuple.
    pub fn encode_app_args(&self, values: &[AbiValue]) -> Result<Vec<Vec<u8>>, AbiError> {
        if values.len() != self.args.len() {
            return Err(AbiError::LengthMismatch {
                expected: self.args.len(),
                actual: values.len(),
            });
        }

        let mut app_args = vec![self.selector().to_vec()];
        let direct = MAX_APP_ARGS - 2;

        if self.args.len() < MAX_APP_ARGS {
            for (ty, value) in self.args.iter().zip(values) {
                app_args.push(ty.encode(value)?);
            }
        } else {
            for (ty, value) in self.args[..direct].iter().zip(&values[..direct]) {
                app_args.push(ty.encode(value)?);
            }
            let packed = AbiType::Tuple(self.args[direct..].to_vec());
            app_args.push(packed.encode(&AbiValue::Tuple(values[direct..].to_vec()))?);
        }

        Ok(app_args)
    }

    /// Decode the return value from a confirmed call's logs.
    pub fn decode_return(&self, logs: &[Vec<u8>]) -> Result<Option<AbiValue>, AbiError> {
        let Some(returns) = &self.returns else {
            return Ok(None);
        };

        let payload = logs
            .last()
            .and_then(|log| log.strip_prefix(&RETURN_PREFIX[..]))
            .ok_or(AbiError::MissingReturn)?;

        returns.decode(payload).map(Some)
    }
}

impl FromStr for Method {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AbiError::InvalidSignature(s.to_string());

        let open = s.find('(').ok_or_else(invalid)?;
        let name = &s[..open];
        if name.is_empty() {
            return Err(invalid());
        }

        let mut depth = 0usize;
        let mut close = None;
        for (i, c) in s[open..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(open + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(invalid)?;

        let args = match s[open..=close].parse::<AbiType>()? {
            AbiType::Tuple(args) => args,
            _ => return Err(invalid()),
        };

        let returns = match &s[close + 1..] {
            "void" => None,
            "" => return Err(invalid()),
            ty => Some(ty.parse()?),
        };

        Ok(Method {
            name: name.to_string(),
            args,
            returns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_contract_signatures() {
        let method: Method = "createHolder(address,(string,string,string,string))void"
            .parse()
            .unwrap();
        assert_eq!(method.name, "createHolder");
        assert_eq!(
            method.args,
            vec![
                AbiType::Address,
                AbiType::Tuple(vec![AbiType::String; 4]),
            ]
        );
        assert!(method.returns.is_none());
        assert_eq!(
            method.signature(),
            "createHolder(address,(string,string,string,string))void"
        );

        let emit: Method = "emmitAndGetShares(string,string,uint64)uint64".parse().unwrap();
        assert_eq!(emit.returns, Some(AbiType::Uint(64)));

        let nested: AbiType = "(uint64,bool[3])[]".parse().unwrap();
        assert_eq!(nested.to_string(), "(uint64,bool[3])[]");
    }

    #[test]
    fn rejects_malformed_types() {
        assert!("uint7".parse::<AbiType>().is_err());
        assert!("uint1024".parse::<AbiType>().is_err());
        assert!("(uint64".parse::<AbiType>().is_err());
        assert!("float".parse::<AbiType>().is_err());
        assert!("noParens".parse::<Method>().is_err());
        assert!("m(uint64)".parse::<Method>().is_err());
    }

    #[test]
    fn known_selector() {
        let method: Method = "add(uint64,uint64)uint128".parse().unwrap();
        assert_eq!(method.selector(), [0x8a, 0xa3, 0xb6, 0x1f]);
    }

    #[test]
    fn encodes_uint_and_range_checks() {
        let encoded = AbiType::Uint(64).encode(&AbiValue::Uint(1000)).unwrap();
        assert_eq!(encoded, vec![0, 0, 0, 0, 0, 0, 0x03, 0xe8]);

        let wide = AbiType::Uint(128).encode(&AbiValue::Uint(1)).unwrap();
        assert_eq!(wide.len(), 16);
        assert_eq!(wide[15], 1);
        assert_eq!(AbiType::Uint(128).decode(&wide).unwrap(), AbiValue::Uint(1));

        assert_eq!(
            AbiType::Uint(8).encode(&AbiValue::Uint(256)),
            Err(AbiError::ValueOutOfRange("uint8".into()))
        );
    }

    #[test]
    fn encodes_holder_tuple_with_offsets() {
        let ty = AbiType::Tuple(vec![AbiType::String; 4]);
        let value = AbiValue::Tuple(vec![
            AbiValue::String("a".into()),
            AbiValue::String("bc".into()),
            AbiValue::String(String::new()),
            AbiValue::String("d".into()),
        ]);

        let encoded = ty.encode(&value).unwrap();
        assert_eq!(
            encoded,
            vec![
                0, 8, 0, 11, 0, 15, 0, 17, // heads
                0, 1, b'a', //
                0, 2, b'b', b'c', //
                0, 0, //
                0, 1, b'd',
            ]
        );
        assert_eq!(ty.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn packs_consecutive_bools() {
        let ty: AbiType = "(bool,bool,bool,uint16)".parse().unwrap();
        let value = AbiValue::Tuple(vec![
            AbiValue::Bool(true),
            AbiValue::Bool(false),
            AbiValue::Bool(true),
            AbiValue::Uint(513),
        ]);

        let encoded = ty.encode(&value).unwrap();
        assert_eq!(encoded, vec![0xa0, 0x02, 0x01]);
        assert_eq!(ty.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn encodes_dynamic_array() {
        let ty: AbiType = "uint16[]".parse().unwrap();
        let value = AbiValue::Array(vec![AbiValue::Uint(1), AbiValue::Uint(2)]);
        let encoded = ty.encode(&value).unwrap();
        assert_eq!(encoded, vec![0, 2, 0, 1, 0, 2]);
        assert_eq!(ty.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn type_mismatch_is_reported() {
        assert_eq!(
            AbiType::Address.encode(&AbiValue::String("x".into())),
            Err(AbiError::TypeMismatch {
                expected: "address".into()
            })
        );
    }

    #[test]
    fn app_args_start_with_selector() {
        let method: Method = "transferToken(address)void".parse().unwrap();
        let args = method
            .encode_app_args(&[AbiValue::Address(Address::ZERO)])
            .unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], method.selector().to_vec());
        assert_eq!(args[1], vec![0u8; 32]);

        assert_eq!(
            method.encode_app_args(&[]),
            Err(AbiError::LengthMismatch {
                expected: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn decodes_return_from_last_log() {
        let method: Method = "emmitAndGetShares(string,string,uint64)uint64".parse().unwrap();
        let mut log = RETURN_PREFIX.to_vec();
        log.extend_from_slice(&42u64.to_be_bytes());

        let logs = vec![b"unrelated".to_vec(), log];
        assert_eq!(
            method.decode_return(&logs).unwrap(),
            Some(AbiValue::Uint(42))
        );

        assert_eq!(
            method.decode_return(&[b"no prefix".to_vec()]),
            Err(AbiError::MissingReturn)
        );

        let void: Method = "transferToken(address)void".parse().unwrap();
        assert_eq!(void.decode_return(&[]).unwrap(), None);
    }
}
