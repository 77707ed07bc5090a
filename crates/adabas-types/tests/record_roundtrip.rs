//! Whole-record store and parse through a definition.

use adabas_types::value::ValueCodec;
use adabas_types::{
    AdaType, BufferOption, CodecConfig, Definition, FieldKind, Platform, Scalar, SecondCall,
};

fn mixed_definition(platform: Platform) -> Definition {
    Definition::new(
        platform,
        vec![
            AdaType::new(FieldKind::UInt4, "U4"),
            AdaType::new(FieldKind::Int2, "I2"),
            AdaType::new(FieldKind::Packed, "PF")
                .with_length(4)
                .with_fractional(2),
            AdaType::new(FieldKind::Unpacked, "UN").with_length(5),
            AdaType::new(FieldKind::Double, "DB"),
            AdaType::new(FieldKind::Date, "DT").with_length(4),
            AdaType::new(FieldKind::Alpha, "AN").with_length(8),
            AdaType::new(FieldKind::LaAlpha, "LA"),
        ],
    )
    .unwrap()
}

#[test]
fn little_endian_record_roundtrip() {
    let platform = Platform::new(0x21);
    let mut d = mixed_definition(platform);
    d.set_value("U4", 0x01020304u32).unwrap();
    d.set_value("I2", -2).unwrap();
    d.set_value("PF", "1234.56").unwrap();
    d.set_value("UN", -42).unwrap();
    d.set_value("DB", 1.5).unwrap();
    d.set_value("DT", "2019/10/30").unwrap();
    d.set_value("AN", "SMITH").unwrap();
    d.set_value("LA", "long alpha").unwrap();

    let mut opt = BufferOption::new(true, 0);
    let (format, _) = d.format_buffer(&opt);
    assert_eq!(format, "U4,4,B,I2,2,F,PF,4,P,UN,5,U,DB,8,G,DT,4,P,AN,8,A,LA,0,A.");
    let record = d.store_buffer(&mut opt).unwrap();
    assert_eq!(&record[..6], &[4, 3, 2, 1, 0xFE, 0xFF]);
    assert_eq!(&record[6..10], &[0x01, 0x23, 0x45, 0x6C]);
    assert_eq!(&record[record.len() - 12..record.len() - 10], &[12, 0]);

    let mut parsed = mixed_definition(platform);
    parsed.parse_buffer(&record, &mut BufferOption::default()).unwrap();
    assert_eq!(parsed.value("U4").unwrap().uint32().unwrap(), 0x01020304);
    assert_eq!(parsed.value("I2").unwrap().int16().unwrap(), -2);
    assert_eq!(parsed.value("PF").unwrap().string(), "1234.56");
    assert_eq!(parsed.value("UN").unwrap().int64().unwrap(), -42);
    assert_eq!(parsed.value("DB").unwrap().float64().unwrap(), 1.5);
    assert_eq!(parsed.value("DT").unwrap().string(), "2019/10/30");
    assert_eq!(parsed.value("DT").unwrap().int64().unwrap(), 737726);
    assert_eq!(parsed.value("AN").unwrap().string(), "SMITH   ");
    assert_eq!(parsed.value("LA").unwrap().string(), "long alpha");
}

#[test]
fn failed_assignment_keeps_record_intact() {
    let mut d = mixed_definition(Platform::open_system());
    d.set_value("AN", "ABC").unwrap();
    assert_eq!(d.set_value("AN", "ABCDEFGHIJ").unwrap_err().code(), 77);
    assert_eq!(d.set_value("PF", "1.234").unwrap_err().code(), 103);
    assert_eq!(d.set_value("U4", -1).unwrap_err().code(), 101);
    assert_eq!(d.set_value("DT", "30.10.2019").unwrap_err().code(), 106);
    assert_eq!(d.value("AN").unwrap().string(), "ABC     ");
}

fn lob_definition() -> Definition {
    Definition::new(
        Platform::open_system(),
        vec![
            AdaType::new(FieldKind::UInt4, "U4"),
            AdaType::new(FieldKind::LbAlpha, "LB"),
        ],
    )
    .unwrap()
}

#[test]
fn lob_store_in_chunks() {
    let mut d = lob_definition();
    d.set_value("U4", 7u32).unwrap();
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    d.set_value("LB", Scalar::Bytes(payload.clone())).unwrap();

    let mut collected = Vec::new();
    let mut formats = Vec::new();
    let mut call = 0;
    loop {
        let mut opt = BufferOption::new(true, call);
        formats.push(d.format_buffer(&opt).0);
        let record = d.store_buffer(&mut opt).unwrap();
        collected.extend_from_slice(&record);
        if opt.need_second_call != SecondCall::Store {
            break;
        }
        call += 1;
    }
    assert_eq!(
        formats,
        vec![
            "U4,4,B,LB(1,40960).",
            "LB(40961,40960).",
            "LB(81921,18080).",
        ]
    );
    assert_eq!(&collected[..4], &[0, 0, 0, 7]);
    assert_eq!(&collected[4..], &payload[..]);
}

#[test]
fn lob_read_with_second_call() {
    let mut d = lob_definition();
    let (format, length) = d.format_buffer(&BufferOption::default());
    assert_eq!(format, "U4,4,B,LBL,4,LB(1,4096).");
    assert_eq!(length, 4 + 4 + 4096);

    let payload: Vec<u8> = (0..5000u32).map(|i| b'A' + (i % 26) as u8).collect();
    let mut first = vec![0, 0, 0, 9];
    first.extend_from_slice(&5000u32.to_be_bytes());
    first.extend_from_slice(&payload[..4096]);

    let mut opt = BufferOption::default();
    d.parse_buffer(&first, &mut opt).unwrap();
    assert_eq!(opt.need_second_call, SecondCall::Read);
    assert_eq!(d.value("LB").unwrap().lob_size(), Some(5000));

    let mut opt = BufferOption::new(false, 1);
    let (format, length) = d.format_buffer(&opt);
    assert_eq!(format, "LB(4097,904).");
    assert_eq!(length, 904);
    d.parse_buffer(&payload[4096..], &mut opt).unwrap();
    assert_eq!(opt.need_second_call, SecondCall::None);
    assert_eq!(d.value("LB").unwrap().bytes(), payload);
    assert_eq!(d.value("U4").unwrap().int64().unwrap(), 9);
}

#[test]
fn lob_read_size_mismatch() {
    let mut d = lob_definition();
    let mut first = vec![0, 0, 0, 1];
    first.extend_from_slice(&5000u32.to_be_bytes());
    first.extend_from_slice(&[b'x'; 4096]);
    d.parse_buffer(&first, &mut BufferOption::default()).unwrap();
    let err = d
        .parse_buffer(&[b'y'; 10], &mut BufferOption::new(false, 1))
        .unwrap_err();
    assert_eq!(err.code(), 56);
}

fn periodic_definition() -> Definition {
    Definition::new(
        Platform::open_system(),
        vec![AdaType::periodic(
            "PE",
            vec![
                AdaType::new(FieldKind::UByte, "P1"),
                AdaType::multiple(AdaType::new(FieldKind::UInt2, "PM")),
            ],
        )],
    )
    .unwrap()
}

#[test]
fn periodic_group_with_multiple_field() {
    let mut d = periodic_definition();
    {
        let pe = d.value_mut("PE").unwrap().as_structure_mut().unwrap();
        let first = pe.occurrence_mut(1);
        first[0].set_value(Scalar::from(7)).unwrap();
        let pm = first[1].as_structure_mut().unwrap();
        pm.push_value(Scalar::from(1)).unwrap();
        pm.push_value(Scalar::from(2)).unwrap();
        pe.occurrence_mut(2)[0].set_value(Scalar::from(8)).unwrap();
    }

    let mut opt = BufferOption::new(true, 0);
    let (format, _) = d.format_buffer(&opt);
    assert_eq!(format, "P11,1,B,PM1(1),2,B,PM1(2),2,B,P12,1,B.");
    assert_eq!(d.store_buffer(&mut opt).unwrap(), vec![7, 0, 1, 0, 2, 8]);

    let mut read = periodic_definition();
    let (format, length) = read.format_buffer(&BufferOption::default());
    assert_eq!(format, "PEC,4,PE1-N.");
    assert_eq!(length, 32768);

    let record = [0, 0, 0, 2, 7, 0, 0, 0, 2, 0, 1, 0, 2, 8, 0, 0, 0, 0];
    read.parse_buffer(&record, &mut BufferOption::default()).unwrap();
    let pe = read.value("PE").unwrap().as_structure().unwrap();
    assert_eq!(pe.nr_elements(), 2);
    let pm = pe.elements()[0][1].as_structure().unwrap();
    assert_eq!(pm.nr_elements(), 2);
    assert_eq!(pm.elements()[1][0].int64().unwrap(), 2);
    assert_eq!(pm.elements()[1][0].pe_index(), 1);
    assert_eq!(pm.elements()[1][0].mu_index(), 2);
    assert_eq!(pe.elements()[1][0].int64().unwrap(), 8);
    assert_eq!(pe.elements()[1][1].as_structure().unwrap().nr_elements(), 0);
}

#[test]
fn configured_platform() {
    let config = CodecConfig::from_toml_str(
        r#"
architecture = 0

[packed_signs]
positive = 12
negative = 13

[lob]
store_chunk_size = 1024
"#,
    )
    .unwrap();
    let platform = config.platform().unwrap();
    let mut d = Definition::new(
        platform,
        vec![
            AdaType::new(FieldKind::Packed, "PA").with_length(2),
            AdaType::new(FieldKind::Alpha, "AN").with_length(3),
        ],
    )
    .unwrap();
    d.set_value("PA", -5).unwrap();
    d.set_value("AN", "A").unwrap();
    let mut opt = config.buffer_option(true);
    assert!(opt.mainframe);
    assert_eq!(opt.lob_chunk_size, 1024);
    let record = d.store_buffer(&mut opt).unwrap();
    assert_eq!(record, vec![0x00, 0x5D, b'A', 0x40, 0x40]);
}
