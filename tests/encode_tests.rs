//! Wire-format checks: encode values and compare the exact payload bytes.

use pretty_assertions::assert_eq;
use rawpkt::{IntWidth, Packet, Record, Shape, Value};
use std::time::{Duration, UNIX_EPOCH};

fn payload_of(value: &Value) -> Vec<u8> {
    let mut packet = Packet::new(1, false, false);
    packet.encode_value(value).unwrap();
    assert_eq!(packet.size() as usize, packet.buffer().len());
    packet.payload().to_vec()
}

fn hexdump(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ")
}

#[test]
fn test_encode_text() {
    let payload = payload_of(&Value::Text("Hello world".into()));
    let mut expected = vec![0x0B, 0x00, 0x00, 0x00];
    expected.extend_from_slice(b"Hello world");
    assert_eq!(hexdump(&payload), hexdump(&expected));
}

#[test]
fn test_encode_text_byte_length() {
    // Two characters, five bytes.
    let payload = payload_of(&Value::Text("é€".into()));
    assert_eq!(&payload[..4], &[0x05, 0x00, 0x00, 0x00]);
    assert_eq!(payload.len(), 9);
}

#[test]
fn test_encode_sequence_count() {
    let value = Value::sequence(
        Shape::Uint(IntWidth::W16),
        vec![Value::U16(1), Value::U16(2), Value::U16(3)],
    );
    assert_eq!(payload_of(&value), [0x03, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00]);
}

#[test]
fn test_encode_fixed_array_unframed() {
    let value = Value::array(
        Shape::Uint(IntWidth::W8),
        (0..5).map(Value::U8).collect(),
    );
    assert_eq!(payload_of(&value), [0, 1, 2, 3, 4]);
}

#[test]
fn test_encode_optional_absent_is_zero() {
    let target = Shape::record(
        "Item",
        vec![("id", Shape::Int(IntWidth::Native)), ("name", Shape::Text)],
    );
    let absent = Value::optional(target.clone(), None);
    let zero = Value::optional(target.clone(), Some(Value::zero(&target)));
    assert_eq!(payload_of(&absent), payload_of(&zero));
    assert_eq!(payload_of(&absent), [0u8; 8]);
}

#[test]
fn test_encode_timestamp() {
    let value = Value::timestamp(UNIX_EPOCH + Duration::new(1_700_000_000, 999_000_000));
    assert_eq!(
        hexdump(&payload_of(&value)),
        "00 f1 53 65 00 00 00 00"
    );
}

#[test]
fn test_encode_record_in_declaration_order() {
    let value = Value::Record(
        Record::new("Mixed")
            .with_field("flag", true)
            .with_field("small", -1i8)
            .with_field("wide", 0x0102u16)
            .with_field("native", 8usize)
            .with_field("pos", 1.5f32),
    );
    let mut expected = vec![0x01, 0xFF, 0x02, 0x01, 0x08, 0x00, 0x00, 0x00];
    expected.extend_from_slice(&1.5f32.to_le_bytes());
    assert_eq!(payload_of(&value), expected);
}

#[test]
fn test_encode_nested_empty_containers() {
    let value = Value::Record(
        Record::new("Outer")
            .with_field("items", Value::sequence(Shape::Text, vec![]))
            .with_field("note", ""),
    );
    assert_eq!(payload_of(&value), [0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn test_encode_appends_after_previous() {
    let mut packet = Packet::new(3, true, false);
    packet.encode_value(&Value::U8(1)).unwrap();
    packet.encode_value(&Value::U8(2)).unwrap();
    packet.write_raw(&[0xAB]).unwrap();
    assert_eq!(
        packet.buffer(),
        &[0x09, 0x00, 0x01, 0x00, 0x03, 0x00, 0x01, 0x02, 0xAB]
    );
}

#[test]
fn test_encode_under_parsed_shape() {
    let shape: Shape = "{ a: u8, b: [i16; 2] }".parse().unwrap();
    let value = Value::Record(
        Record::new("")
            .with_field("a", 9u8)
            .with_field(
                "b",
                Value::array(Shape::Int(IntWidth::W16), vec![Value::I16(-1), Value::I16(2)]),
            ),
    );
    let mut packet = Packet::new(1, false, false);
    packet.encode_as(&shape, &value).unwrap();
    assert_eq!(packet.payload(), &[0x09, 0xFF, 0xFF, 0x02, 0x00]);
}

#[test]
fn test_encode_shape_mismatch_is_error() {
    let mut packet = Packet::new(1, false, false);
    let err = packet
        .encode_as(&Shape::Text, &Value::U32(1))
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid target: expected text, got u32");
    assert_eq!(packet.size(), 6);
}
