//! Round-trip tests: encode then decode should return the original value.

use pretty_assertions::assert_eq;
use rawpkt::{Packet, PacketDecode, PacketEncode, Record, Shape, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, PacketEncode, PacketDecode)]
struct Item {
    id: isize,
    name: [u8; 5],
    description: String,
    pos_x: f32,
    uint16_test: u16,
    bool_test: bool,
    int8_test: i8,
    int16_test: i16,
    uint_test: usize,
}

#[derive(Debug, Clone, PartialEq, PacketEncode, PacketDecode)]
struct Inventory {
    now: SystemTime,
    name: [u8; 5],
    abc: i16,
    one_item: Item,
    items: [Item; 3],
    item_slice: Vec<Item>,
    item_ptr_slice: Vec<Option<Box<Item>>>,
    my_string: String,
}

fn sample_item() -> Item {
    Item {
        id: 1,
        name: [0, 1, 2, 3, 4],
        description: "Hello world".into(),
        pos_x: 3.55,
        uint16_test: 23,
        bool_test: false,
        int8_test: 3,
        int16_test: 32,
        uint_test: 8,
    }
}

fn sample_inventory(now: SystemTime) -> Inventory {
    let item = sample_item();
    Inventory {
        now,
        name: [6; 5],
        abc: 20,
        one_item: item.clone(),
        items: [item.clone(), item.clone(), item.clone()],
        item_slice: vec![item.clone(), item.clone(), item.clone(), item.clone()],
        item_ptr_slice: vec![Some(Box::new(item))],
        my_string: "this is test string".into(),
    }
}

fn whole_seconds(time: SystemTime) -> SystemTime {
    let secs = time.duration_since(UNIX_EPOCH).unwrap().as_secs();
    UNIX_EPOCH + Duration::from_secs(secs)
}

#[test]
fn test_roundtrip_nested_struct() {
    let now = UNIX_EPOCH + Duration::new(1_700_000_123, 456_000_000);
    let original = sample_inventory(now);

    let mut packet = Packet::new(1, true, false);
    packet.encode(&original).unwrap();
    assert_eq!(packet.size() as usize, packet.buffer().len());

    let decoded: Inventory = packet.read().unwrap();
    assert_eq!(decoded.now, whole_seconds(now));
    assert_eq!(decoded.items[0], original.items[0]);
    assert_eq!(decoded.item_ptr_slice[0].as_ref().unwrap().id, 1);
    assert_eq!(decoded.one_item.uint_test, 8);

    let expected = Inventory {
        now: whole_seconds(now),
        ..original
    };
    assert_eq!(decoded, expected);
    assert_eq!(packet.size(), 6);
    assert!(packet.is_encrypted());
}

#[test]
fn test_roundtrip_into_existing_target() {
    let original = sample_inventory(UNIX_EPOCH + Duration::from_secs(42));
    let mut packet = Packet::new(1, false, false);
    packet.encode(&original).unwrap();

    let mut target = sample_inventory(UNIX_EPOCH);
    target.item_slice.clear();
    target.my_string = "stale".into();
    packet.decode(&mut target).unwrap();
    assert_eq!(target, original);
}

#[test]
fn test_roundtrip_absent_optional_decodes_as_zero() {
    #[derive(Debug, PartialEq, PacketEncode, PacketDecode)]
    struct Holder {
        item: Option<Box<Item>>,
    }

    let mut packet = Packet::new(1, false, false);
    packet.encode(&Holder { item: None }).unwrap();
    let decoded: Holder = packet.read().unwrap();

    let zero = decoded.item.expect("always present after decode");
    assert_eq!(zero.id, 0);
    assert_eq!(zero.description, "");
    assert_eq!(zero.name, [0; 5]);
}

#[test]
fn test_roundtrip_dynamic_value() {
    let shape = Inventory::shape();
    let value = sample_inventory(UNIX_EPOCH + Duration::from_secs(7)).to_value();
    assert_eq!(value.shape(), shape);

    let mut packet = Packet::new(2, false, true);
    packet.encode_value(&value).unwrap();

    let descriptor = shape.to_string();
    let parsed: Shape = descriptor.parse().unwrap();
    assert_eq!(parsed, shape);

    let decoded = packet.read_value(&parsed).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_roundtrip_extreme_scalars() {
    let value = Value::Record(
        Record::new("Limits")
            .with_field("a", i8::MIN)
            .with_field("b", i16::MIN)
            .with_field("c", i32::MIN)
            .with_field("d", i64::MIN)
            .with_field("e", u64::MAX)
            .with_field("f", f64::MIN_POSITIVE)
            .with_field("g", i32::MIN as isize)
            .with_field("h", u32::MAX as usize),
    );
    let mut packet = Packet::new(1, false, false);
    packet.encode_value(&value).unwrap();
    assert_eq!(packet.remaining(), 1 + 2 + 4 + 8 + 8 + 8 + 4 + 4);

    let decoded = packet.read_value(&value.shape()).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_roundtrip_many_packets_in_one_buffer() {
    let mut packet = Packet::new(1, false, false);
    for i in 0..10u32 {
        packet.encode(&i).unwrap();
        packet.encode(&format!("entry {}", i)).unwrap();
    }
    for i in 0..10u32 {
        assert_eq!(packet.read::<u32>().unwrap(), i);
        assert_eq!(packet.read::<String>().unwrap(), format!("entry {}", i));
    }
    assert_eq!(packet.remaining(), 0);
}

#[test]
fn test_roundtrip_through_bytes() {
    let original = sample_item();
    let mut packet = Packet::new(0x0405, false, false);
    packet.encode(&original).unwrap();

    let bytes = packet.into_bytes();
    let mut received = Packet::from_bytes(bytes).unwrap();
    assert_eq!(received.packet_type(), 0x0405);
    assert_eq!(received.read::<Item>().unwrap(), original);
}
