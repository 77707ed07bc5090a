//! End-to-end search compilation against a field definition.
//!
//! Value buffers are compared in little-endian order, so every search
//! pins its byte order explicitly.

use adabas_types::{
    AdaType, ByteOrder, Definition, FieldKind, FieldOption, Platform, SearchInfo, SearchTree,
};

/// Field layout shared by most scenarios.
fn definition(platform: Platform) -> Definition {
    Definition::new(
        platform,
        vec![
            AdaType::new(FieldKind::UInt4, "U4"),
            AdaType::new(FieldKind::Byte, "B1"),
            AdaType::new(FieldKind::UByte, "BC"),
            AdaType::new(FieldKind::UInt2, "I2"),
            AdaType::new(FieldKind::UInt8, "U8"),
            AdaType::group(
                "AB",
                vec![
                    AdaType::new(FieldKind::Alpha, "AE").with_length(0),
                    AdaType::new(FieldKind::Alpha, "AD").with_length(6),
                    AdaType::new(FieldKind::Packed, "AC").with_length(1),
                ],
            ),
            AdaType::new(FieldKind::Alpha, "SA")
                .with_length(8)
                .with_option(FieldOption::Unique)
                .with_option(FieldOption::Descriptor),
            AdaType::new(FieldKind::UInt8, "AA").with_option(FieldOption::Descriptor),
        ],
    )
    .unwrap()
}

fn compile(platform: Platform, query: &str) -> (SearchInfo, SearchTree) {
    let mut info = SearchInfo::new(platform, query)
        .unwrap()
        .with_byte_order(ByteOrder::Little);
    let tree = info.generate_tree(&definition(platform)).unwrap();
    (info, tree)
}

fn u64_le(v: u64) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

#[test]
fn single_descriptor_equality() {
    let (info, tree) = compile(Platform::open_system(), "AA=123");
    assert_eq!(tree.search_buffer(), "AA,8,B,EQ.");
    assert_eq!(tree.value_buffer().unwrap(), u64_le(123));
    assert!(!info.need_search());
    assert!(!tree.need_search());
}

#[test]
fn and_with_non_descriptor() {
    let (info, tree) = compile(Platform::open_system(), "AA=1 AND BC=2");
    assert_eq!(tree.search_buffer(), "AA,8,B,EQ,D,BC,1,B,EQ.");
    let mut expected = u64_le(1);
    expected.push(2);
    assert_eq!(tree.value_buffer().unwrap(), expected);
    assert!(info.need_search());
}

#[test]
fn lowercase_keywords() {
    let (_, tree) = compile(Platform::open_system(), "AA=1   and BC=2");
    assert_eq!(tree.search_buffer(), "AA,8,B,EQ,D,BC,1,B,EQ.");
}

#[test]
fn or_across_fields() {
    let (info, tree) = compile(Platform::open_system(), "AA=1 OR BC=2 OR AC=1");
    assert_eq!(tree.search_buffer(), "AA,8,B,EQ,R,BC,1,B,EQ,R,AC,1,P,EQ.");
    let mut expected = u64_le(1);
    expected.extend_from_slice(&[2, 0x1C]);
    assert_eq!(tree.value_buffer().unwrap(), expected);
    assert!(info.need_search());
}

#[test]
fn or_on_one_descriptor_is_mor() {
    let (info, tree) = compile(Platform::open_system(), "AA=1 OR AA=2");
    assert_eq!(tree.search_buffer(), "AA,8,B,EQ,O,AA,8,B,EQ.");
    assert!(!info.need_search());
}

#[test]
fn alpha_values() {
    let (_, tree) = compile(Platform::open_system(), "AE='ABCDEF' AND AD='X123'");
    assert_eq!(tree.search_buffer(), "AE,0,A,EQ,D,AD,6,A,EQ.");
    let values = tree.value_buffer().unwrap();
    assert_eq!(values[0], 7);
    assert_eq!(&values[1..7], b"ABCDEF");
    assert_eq!(&values[7..], b"X123  ");
}

#[test]
fn escaped_quote_in_literal() {
    let (_, tree) = compile(Platform::open_system(), "AD='O\\'Neil'");
    assert_eq!(tree.value_buffer().unwrap(), b"O'Neil".to_vec());
}

#[test]
fn open_system_closed_range() {
    let (info, tree) = compile(Platform::open_system(), "AA=[12:44]");
    assert_eq!(tree.search_buffer(), "AA,8,B,GE,S,AA,8,B,LE.");
    let mut expected = u64_le(12);
    expected.extend(u64_le(44));
    assert_eq!(tree.value_buffer().unwrap(), expected);
    assert!(!info.need_search());
}

#[test]
fn open_system_half_open_range_with_and() {
    let (info, tree) = compile(Platform::open_system(), "AA=(12:44] AND AD='SMITH'");
    assert_eq!(tree.search_buffer(), "AA,8,B,GT,S,AA,8,B,LE,D,AD,6,A,EQ.");
    let values = tree.value_buffer().unwrap();
    assert_eq!(values.len(), 22);
    assert_eq!(&values[16..], b"SMITH ");
    assert!(info.need_search());
}

#[test]
fn mainframe_closed_range() {
    let (info, tree) = compile(Platform::mainframe(), "AA=[12:44]");
    assert_eq!(tree.search_buffer(), "AA,8,B,S,AA,8,B.");
    let mut expected = u64_le(12);
    expected.extend(u64_le(44));
    assert_eq!(tree.value_buffer().unwrap(), expected);
    assert!(info.need_search());
}

#[test]
fn mainframe_open_range() {
    let (_, tree) = compile(Platform::mainframe(), "AA=(12:44)");
    assert_eq!(
        tree.search_buffer(),
        "AA,8,B,S,AA,8,B,N,AA,8,B,D,AA,8,B,NE."
    );
    let values = tree.value_buffer().unwrap();
    assert_eq!(values.len(), 32);
    assert_eq!(&values[16..24], &u64_le(12)[..]);
    assert_eq!(&values[24..], &u64_le(44)[..]);
}

#[test]
fn mainframe_right_open_alpha_range() {
    let (_, tree) = compile(Platform::mainframe(), "SA=[10111011:10111013)");
    assert_eq!(tree.search_buffer(), "SA,8,A,S,SA,8,A,N,SA,8,A.");
    assert_eq!(
        tree.value_buffer().unwrap(),
        b"101110111011101310111013".to_vec()
    );
}

#[test]
fn mainframe_equality_is_doubled() {
    let platform = Platform::mainframe();
    let definition = Definition::new(
        platform,
        vec![AdaType::new(FieldKind::Alpha, "SA").with_length(3)],
    )
    .unwrap();
    let mut info = SearchInfo::new(platform, "SA='ABC'").unwrap();
    let tree = info.generate_tree(&definition).unwrap();
    assert_eq!(tree.search_buffer(), "SA,3,A,S,SA,3,A.");
    assert_eq!(tree.value_buffer().unwrap(), b"ABCABC".to_vec());
}

#[test]
fn mixed_literal() {
    let platform = Platform::open_system();
    let definition = Definition::new(
        platform,
        vec![AdaType::new(FieldKind::Alpha, "AA").with_length(0)],
    )
    .unwrap();
    let mut info = SearchInfo::new(platform, "AA=0x01'ABCD'101")
        .unwrap()
        .with_byte_order(ByteOrder::Little);
    let tree = info.generate_tree(&definition).unwrap();
    assert_eq!(tree.search_buffer(), "AA,0,A,EQ.");
    assert_eq!(
        tree.value_buffer().unwrap(),
        vec![8, 0x01, 0x41, 0x42, 0x43, 0x44, 0xF2, 0x03]
    );
}

#[test]
fn order_by_and_search_fields() {
    let (_, tree) = compile(
        Platform::open_system(),
        "AA=1 AND BC=2 AND SA='X' AND AA=3",
    );
    assert_eq!(tree.order_by(), vec!["AA".to_string(), "SA".to_string()]);
    assert_eq!(
        tree.search_fields(),
        vec!["AA".to_string(), "BC".to_string(), "SA".to_string()]
    );
}

#[test]
fn multiple_value_descriptor() {
    let platform = Platform::open_system();
    let definition = Definition::new(
        platform,
        vec![
            AdaType::new(FieldKind::UInt4, "U4"),
            AdaType::multiple(
                AdaType::new(FieldKind::Alpha, "MA")
                    .with_length(4)
                    .with_option(FieldOption::Descriptor),
            ),
        ],
    )
    .unwrap();
    let mut info = SearchInfo::new(platform, "MA='AB'").unwrap();
    let tree = info.generate_tree(&definition).unwrap();
    assert_eq!(tree.search_buffer(), "MA,4,A,EQ.");
    assert_eq!(tree.value_buffer().unwrap(), b"AB  ".to_vec());
    assert!(!info.need_search());

    let mut info = SearchInfo::new(platform, "MA='AB' AND U4=1").unwrap();
    let tree = info.generate_tree(&definition).unwrap();
    assert_eq!(tree.search_buffer(), "MA,4,A,EQ,D,U4,4,B,EQ.");
    assert!(info.need_search());
}

#[test]
fn not_equal_forces_search() {
    let (info, tree) = compile(Platform::open_system(), "AA!=5");
    assert_eq!(tree.search_buffer(), "AA,8,B,NE.");
    assert!(info.need_search());
}

#[test]
fn errors() {
    let d = definition(Platform::open_system());
    let code = |query: &str| {
        let mut info = SearchInfo::new(Platform::open_system(), query).unwrap();
        info.generate_tree(&d).unwrap_err().code()
    };
    assert_eq!(code("CC=1"), 42);
    assert_eq!(code("AA=>1"), 170);
    assert_eq!(code("AA 1"), 170);
    assert_eq!(code("AA<[1:2]"), 170);
    assert_eq!(code("AA=0x0(2)"), 171);
    assert_eq!(code("BC=300"), 57);
    assert_eq!(code("AD='TOO LONG'"), 77);
}
