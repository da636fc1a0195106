mod common;

use std::fs;

use common::{config, observation, yearly_series};
use dimgroup::assemble::{Assembler, CubeMetadata, RawVector, StaticMetadataSource};
use dimgroup::io::{self, partition_rows};
use dimgroup::{group_records, IntersectionTable, Value, SUMMARY_LABEL};

#[test]
fn test_records_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    let records = yearly_series("Canada", &[2020, 2021], &[1.0, 2.0]);

    io::write_records(&path, &records).unwrap();
    let loaded = io::read_records(&path).unwrap();
    assert_eq!(loaded, records);
}

#[test]
fn test_write_groups_renders_summary_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groups.json");
    let records = yearly_series("Canada", &[2020, 2021, 2022], &[10.0, 20.0, 30.0]);
    let groups = group_records(&records, &config()).unwrap();

    io::write_groups(&path, &groups).unwrap();

    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let group = &written[0];
    assert_eq!(group["differing_key"], "RefPeriod");
    assert_eq!(group["spans_multiple_entities"], false);
    let rows = group["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[2]["RefPeriod"], SUMMARY_LABEL);
    assert_eq!(rows[2]["Data_Value"], 20.0);
}

#[test]
fn test_partitions_deduplicate_rows_across_groups() {
    let mut records = yearly_series("Canada", &[2020, 2021], &[1.0, 2.0]);
    records.extend(yearly_series("Alberta", &[2020, 2021], &[3.0, 4.0]));
    records.push(observation(2, "Canada", 2020, 9.0));
    records.push(observation(2, "Canada", 2021, 8.0));

    let groups = group_records(&records, &config()).unwrap();
    let partitions = partition_rows(&groups, "ProductId", Some("Title"));

    // Summaries of product-varying groups carry the label as their product id
    let keys: Vec<&str> = partitions.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["1", "2", SUMMARY_LABEL]);
    assert_eq!(partitions[0].label, "1-Test cube");

    let product_one = &partitions[0];
    let unique: std::collections::HashSet<_> = product_one.rows.iter().collect();
    assert_eq!(unique.len(), product_one.rows.len());
    for record in records.iter().filter(|r| r.get("ProductId") == Some(&Value::Number(1.0))) {
        assert!(product_one.rows.contains(record));
    }
}

#[test]
fn test_csv_exports() {
    let dir = tempfile::tempdir().unwrap();
    let records = yearly_series("Canada", &[2020, 2021], &[1.5, 2.5]);
    let groups = group_records(&records, &config()).unwrap();
    let rows: Vec<_> = groups[0].rows().cloned().collect();

    let rows_path = dir.path().join("rows.csv");
    io::write_rows(&rows_path, &rows).unwrap();
    let text = fs::read_to_string(&rows_path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("ProductId,Title,RefPeriod,VectorId,Geography,Data_Value")
    );
    assert_eq!(lines.next(), Some("1,Test cube,2020,101,Canada,1.5"));
    assert!(text.contains(SUMMARY_LABEL));

    let table_path = dir.path().join("intersection.csv");
    io::write_intersection(&table_path, &IntersectionTable::build(&records)).unwrap();
    let table = fs::read_to_string(&table_path).unwrap();
    assert!(table.starts_with("attribute,value"));
    assert!(table.contains("RefPeriod,2020"));
    assert!(table.contains("RefPeriod,2021"));
}

#[test]
fn test_assembled_records_group_by_period() {
    let metadata: Vec<CubeMetadata> = serde_json::from_str(
        r#"[{
            "productId": 36100434,
            "cubeTitleEn": "Gross domestic product",
            "dimension": [
                {"dimensionNameEn": "Geography", "member": [{"memberId": 1, "memberNameEn": "Canada"}]},
                {"dimensionNameEn": "Prices", "member": [{"memberId": 2, "memberNameEn": "Chained 2017 dollars"}]}
            ]
        }]"#,
    )
    .unwrap();
    let vectors: Vec<RawVector> = serde_json::from_str(
        r#"[{
            "productId": 36100434,
            "coordinate": "1.2.0.0.0.0.0.0.0.0",
            "vectorId": 65201210,
            "vectorDataPoint": [
                {"refPer": "2021-01-01", "value": 100.0, "scalarFactorCode": 6},
                {"refPer": "2022-01-01", "value": 110.0, "scalarFactorCode": 6},
                {"refPer": "2023-01-01", "value": 120.0, "scalarFactorCode": 6}
            ]
        }]"#,
    )
    .unwrap();

    let mut assembler = Assembler::new(StaticMetadataSource::new(metadata));
    let records = assembler.assemble(&vectors).unwrap();
    assert_eq!(records.len(), 3);

    let groups = group_records(&records, &dimgroup::GroupingConfig::default()).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].differing_key(), "RefPeriod");

    let summary = groups[0].summary().unwrap();
    assert_eq!(summary.get("Data_Value").and_then(|v| v.as_f64()), Some(110.0));
    assert_eq!(summary.get("Scaled Value").and_then(|v| v.as_f64()), Some(110_000_000.0));
}

#[test]
fn test_assembled_value_dimension_groups() {
    let metadata: Vec<CubeMetadata> = serde_json::from_str(
        r#"[{
            "productId": 36100401,
            "cubeTitleEn": "Gross domestic product by industry",
            "dimension": [
                {"dimensionNameEn": "Geography", "member": [{"memberId": 1, "memberNameEn": "Canada"}]},
                {"dimensionNameEn": "Value", "member": [
                    {"memberId": 1, "memberNameEn": "Goods"},
                    {"memberId": 2, "memberNameEn": "Services"}
                ]}
            ]
        }]"#,
    )
    .unwrap();
    let vectors: Vec<RawVector> = serde_json::from_str(
        r#"[
            {"productId": 36100401, "coordinate": "1.1", "vectorId": 1,
             "vectorDataPoint": [{"refPer": "2022-01-01", "value": 40.0}]},
            {"productId": 36100401, "coordinate": "1.2", "vectorId": 2,
             "vectorDataPoint": [{"refPer": "2022-01-01", "value": 60.0}]}
        ]"#,
    )
    .unwrap();

    let mut assembler = Assembler::new(StaticMetadataSource::new(metadata));
    let records = assembler.assemble(&vectors).unwrap();

    let groups = group_records(&records, &dimgroup::GroupingConfig::default()).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].differing_key(), "Value_desc");
    let summary = groups[0].summary().unwrap();
    assert_eq!(summary.get("Data_Value").and_then(|v| v.as_f64()), Some(50.0));
}
