//! Conversions between alloy-dyn-abi values and facade records

use alloy_dyn_abi::{DecodedEvent, DynSolValue};
use alloy_json_abi::{Event, Param};
use alloy_primitives::{keccak256, Address, B256, U256};
use anyhow::{bail, Context, Result};

use crate::domain::governance::{FieldValue, Record};

/// Convert a decoded value into a facade field
pub fn field_value(value: &DynSolValue) -> FieldValue {
    match value {
        DynSolValue::Bool(b) => FieldValue::Bool(*b),
        DynSolValue::Uint(u, _) => FieldValue::Uint(*u),
        DynSolValue::Int(i, _) => FieldValue::Text(i.to_string()),
        DynSolValue::Address(addr) => FieldValue::Address(*addr),
        DynSolValue::String(s) => FieldValue::Text(s.clone()),
        DynSolValue::Bytes(bytes) => FieldValue::Bytes(bytes.clone()),
        DynSolValue::FixedBytes(word, size) => {
            FieldValue::Bytes(word.as_slice()[..(*size).min(32)].to_vec())
        }
        other => FieldValue::Text(format!("{:?}", other)),
    }
}

/// Name each output value after its ABI parameter
///
/// A single struct output is flattened so its members become top-level
/// fields (`getProposal` returns one `Proposal` tuple).
pub fn record_from_outputs(params: &[Param], values: &[DynSolValue]) -> Record {
    let mut record = Record::new();
    if let ([param], [DynSolValue::Tuple(fields)]) = (params, values) {
        if !param.components.is_empty() {
            insert_named(&mut record, &param.components, fields);
            return record;
        }
    }
    insert_named(&mut record, params, values);
    record
}

fn insert_named(record: &mut Record, params: &[Param], values: &[DynSolValue]) {
    for (idx, (param, value)) in params.iter().zip(values).enumerate() {
        record.insert(field_name(&param.name, idx), field_value(value));
    }
}

/// Name the indexed and body values of a decoded log
pub fn record_from_event(event: &Event, decoded: &DecodedEvent) -> Record {
    let mut record = Record::new();
    let indexed = event.inputs.iter().filter(|p| p.indexed);
    for (idx, (param, value)) in indexed.zip(&decoded.indexed).enumerate() {
        record.insert(field_name(&param.name, idx), field_value(value));
    }
    let body = event.inputs.iter().filter(|p| !p.indexed);
    for (idx, (param, value)) in body.zip(&decoded.body).enumerate() {
        record.insert(field_name(&param.name, idx), field_value(value));
    }
    record
}

fn field_name(name: &str, idx: usize) -> String {
    if name.trim().is_empty() {
        format!("arg{}", idx)
    } else {
        name.to_string()
    }
}

/// Parse a textual call argument as the given Solidity type
pub fn coerce_arg(ty: &str, raw: &str) -> Result<DynSolValue> {
    let raw = raw.trim();
    match ty {
        "address" => Ok(DynSolValue::Address(parse_address(raw)?)),
        "bool" => Ok(DynSolValue::Bool(parse_bool(raw)?)),
        "string" => Ok(DynSolValue::String(raw.to_string())),
        _ if ty.starts_with("uint") => {
            let bits = uint_bits(ty)?;
            Ok(DynSolValue::Uint(parse_uint(raw)?, bits))
        }
        _ => bail!("unsupported argument type '{}'", ty),
    }
}

/// Encode a filter value as an indexed topic
pub fn encode_topic(ty: &str, raw: &str) -> Result<B256> {
    let raw = raw.trim();
    match ty {
        "address" => Ok(parse_address(raw)?.into_word()),
        "bool" => Ok(B256::with_last_byte(parse_bool(raw)? as u8)),
        // Dynamic indexed values are stored as their hash
        "string" | "bytes" => Ok(keccak256(raw.as_bytes())),
        _ if ty.starts_with("uint") => {
            uint_bits(ty)?;
            Ok(B256::from(parse_uint(raw)?.to_be_bytes::<32>()))
        }
        _ => bail!("unsupported topic type '{}'", ty),
    }
}

fn uint_bits(ty: &str) -> Result<usize> {
    let suffix = &ty["uint".len()..];
    if suffix.is_empty() {
        return Ok(256);
    }
    let bits: usize = suffix
        .parse()
        .with_context(|| format!("invalid integer type '{}'", ty))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        bail!("invalid integer type '{}'", ty);
    }
    Ok(bits)
}

fn parse_uint(raw: &str) -> Result<U256> {
    raw.parse::<U256>()
        .with_context(|| format!("'{}' is not an unsigned integer", raw))
}

fn parse_address(raw: &str) -> Result<Address> {
    raw.parse::<Address>()
        .with_context(|| format!("'{}' is not an address", raw))
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => bail!("'{}' is not a bool", raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_uint_arg() {
        let value = coerce_arg("uint256", "136").unwrap();
        assert_eq!(value, DynSolValue::Uint(U256::from(136u64), 256));
        assert!(coerce_arg("uint256", "not-a-number").is_err());
        assert!(coerce_arg("uint256", "-1").is_err());
    }

    #[test]
    fn test_coerce_other_args() {
        let addr = "0x36faa1e49ff125ac72ceae0d5a2e35bc9add6591";
        assert!(matches!(
            coerce_arg("address", addr).unwrap(),
            DynSolValue::Address(_)
        ));
        assert_eq!(coerce_arg("bool", "true").unwrap(), DynSolValue::Bool(true));
        assert!(coerce_arg("bytes32", "0x00").is_err());
    }

    #[test]
    fn test_encode_uint_topic() {
        let topic = encode_topic("uint256", "136").unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 136;
        assert_eq!(topic, B256::from(expected));
    }

    #[test]
    fn test_encode_address_topic() {
        let topic = encode_topic("address", "0x36faa1e49ff125ac72ceae0d5a2e35bc9add6591").unwrap();
        assert_eq!(&topic[..12], &[0u8; 12]);
        assert_eq!(hex::encode(&topic[12..]), "36faa1e49ff125ac72ceae0d5a2e35bc9add6591");
    }

    #[test]
    fn test_record_from_struct_output() {
        let function: alloy_json_abi::Function = serde_json::from_str(
            r#"{
                "type": "function",
                "name": "getProposal",
                "stateMutability": "view",
                "inputs": [{ "name": "proposalId", "type": "uint256" }],
                "outputs": [{
                    "name": "proposal",
                    "type": "tuple",
                    "components": [
                        { "name": "result", "type": "uint8" },
                        { "name": "feeRecipient", "type": "address" },
                        { "name": "yesCount", "type": "uint256" }
                    ]
                }]
            }"#,
        )
        .unwrap();
        let values = vec![DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(1u64), 8),
            DynSolValue::Address(Address::repeat_byte(0x11)),
            DynSolValue::Uint(U256::from(42u64), 256),
        ])];

        let record = record_from_outputs(&function.outputs, &values);
        assert_eq!(record.get("result"), Some(&FieldValue::Uint(U256::from(1u64))));
        assert_eq!(
            record.get("feeRecipient"),
            Some(&FieldValue::Address(Address::repeat_byte(0x11)))
        );
        assert_eq!(record.get("yesCount"), Some(&FieldValue::Uint(U256::from(42u64))));
    }

    #[test]
    fn test_unnamed_outputs_get_positional_names() {
        let function =
            alloy_json_abi::Function::parse("function f() view returns (uint256, bool)").unwrap();
        let values = vec![
            DynSolValue::Uint(U256::from(3u64), 256),
            DynSolValue::Bool(false),
        ];
        let record = record_from_outputs(&function.outputs, &values);
        assert_eq!(record.get("arg0"), Some(&FieldValue::Uint(U256::from(3u64))));
        assert_eq!(record.get("arg1"), Some(&FieldValue::Bool(false)));
    }
}
