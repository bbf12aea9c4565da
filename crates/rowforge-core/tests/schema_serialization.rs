use rowforge_core::{Backend, ColumnDescriptor, TableRef};

#[test]
fn table_refs_round_trip_through_json() {
    let table = TableRef::qualified("analytics", "events");
    let encoded = serde_json::to_value(&table).expect("encode");
    assert_eq!(encoded["schema"], "analytics");
    assert_eq!(encoded["name"], "events");

    let decoded: TableRef = serde_json::from_value(encoded).expect("decode");
    assert_eq!(decoded, table);
}

#[test]
fn bit_width_is_omitted_when_unset() {
    let plain = serde_json::to_value(ColumnDescriptor::new("user_name")).expect("encode");
    assert!(plain.get("bit_width").is_none());

    let decoded: ColumnDescriptor =
        serde_json::from_str(r#"{"name": "bit_flag", "bit_width": 8}"#).expect("decode");
    assert_eq!(decoded, ColumnDescriptor::new("bit_flag").with_bit_width(8));
}

#[test]
fn backends_deserialize_from_config_names() {
    let backends: Vec<Backend> =
        serde_json::from_str(r#"["bigquery", "mysql", "postgresql"]"#).expect("decode");
    assert_eq!(backends, Backend::ALL.to_vec());
}
