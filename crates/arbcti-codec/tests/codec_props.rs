use arbcti_codec::{
    checksum, pack, unpack, verify_checksum, FieldDescriptor, Fields, MessageSpec, TextEncoding,
    WireFormat,
};
use proptest::prelude::*;

static FIELDS: [FieldDescriptor; 5] = [
    FieldDescriptor::int("channel", 20, WireFormat::U32, 0),
    FieldDescriptor::int("status", 24, WireFormat::I16, 0),
    FieldDescriptor::f32("voltage_v", 26, 0.0),
    FieldDescriptor::f64("test_time_s", 30, 0.0),
    FieldDescriptor::text("schedule", 38, 40, TextEncoding::Utf16Le, ""),
];

static REPORT: MessageSpec = MessageSpec {
    name: "report",
    msg_length: 80,
    command_code: 0xEEBA_0003,
    fields: &FIELDS,
};

proptest! {
    #[test]
    fn packed_messages_always_carry_valid_checksum(
        channel in any::<u32>(),
        status in any::<i16>(),
        voltage in -1.0e6f32..1.0e6f32,
    ) {
        let overrides = Fields::new()
            .with("channel", channel)
            .with("status", status)
            .with("voltage_v", voltage);
        let msg = pack(&REPORT, &overrides).unwrap();
        prop_assert_eq!(msg.len(), 80);
        prop_assert!(verify_checksum(&msg));
    }

    #[test]
    fn decoded_values_match_overrides(
        channel in any::<u32>(),
        status in any::<i16>(),
        voltage in any::<f32>().prop_filter("finite", |v| v.is_finite()),
        elapsed in any::<f64>().prop_filter("finite", |v| v.is_finite()),
        schedule in "[a-zA-Z0-9_ .-]{0,20}",
    ) {
        let overrides = Fields::new()
            .with("channel", channel)
            .with("status", status)
            .with("voltage_v", voltage)
            .with("test_time_s", elapsed)
            .with("schedule", schedule.clone());
        let fields = unpack(&REPORT, &pack(&REPORT, &overrides).unwrap()).unwrap();

        prop_assert_eq!(fields.uint("channel"), Some(u64::from(channel)));
        prop_assert_eq!(fields.int("status"), Some(i64::from(status)));
        prop_assert_eq!(fields.float("voltage_v"), Some(f64::from(voltage)));
        prop_assert_eq!(fields.float("test_time_s"), Some(elapsed));
        prop_assert_eq!(fields.text("schedule"), Some(schedule.as_str()));
    }

    #[test]
    fn checksum_wraps_at_sixteen_bits(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let expected = bytes.iter().map(|b| u32::from(*b)).sum::<u32>() % 65536;
        prop_assert_eq!(u32::from(checksum(&bytes)), expected);
    }
}
