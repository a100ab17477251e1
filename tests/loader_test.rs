mod common;

use std::fs::File;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use galaxy_explorer::data::loader::load_file;
use galaxy_explorer::data::model::RawValue;
use galaxy_explorer::{Catalog, ExplorerConfig};

use common::{open_text, write_file};

#[test]
fn comments_blank_rows_and_ragged_rows() {
    let catalog = open_text(
        "ragged.txt",
        "# header comment\nobjname;bt\n\nNGC1;1\nNGC2;2;extra\nNGC3\nNGC4;4\nNGC5;5\nNGC6;6\n",
    );
    assert_eq!(catalog.len(), 6);
    let bt = catalog.series("bt").unwrap();
    assert_eq!(bt.values(), vec![1.0, 2.0, 4.0, 5.0, 6.0]);
}

#[test]
fn latin1_files_are_decoded() {
    let mut bytes = b"objname;bt\n".to_vec();
    bytes.extend_from_slice(b"Ab\xe9ll;1\n");
    let (_dir, path) = write_file("latin1.csv", &bytes);
    let table = load_file(&path, &ExplorerConfig::default().loader).unwrap();
    assert_eq!(table.rows[0][0], RawValue::String("Abéll".into()));
}

#[test]
fn json_records_keep_key_order() {
    let json = r#"[
        {"objname": "NGC1", "pgc": 11, "bt": 1.5, "vt": "1,2"},
        {"objname": "NGC2", "pgc": 12, "bt": null, "vt": 2},
        {"objname": "NGC3", "pgc": 13, "bt": 3, "vt": 3},
        {"objname": "NGC4", "pgc": 14, "bt": 4, "vt": 4},
        {"objname": "NGC5", "pgc": 15, "bt": 5, "vt": 5},
        {"objname": "NGC6", "pgc": 16, "bt": 6, "vt": 6, "extra": 1}
    ]"#;
    let (_dir, path) = write_file("catalog.json", json.as_bytes());
    let catalog = Catalog::open(&path, &ExplorerConfig::default()).unwrap();
    assert_eq!(catalog.parameters(), ["bt", "vt"]);
    assert_eq!(catalog.series("bt").unwrap().values(), vec![1.5, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(catalog.series("vt").unwrap().values()[0], 1.2);
    assert_eq!(catalog.resolve("PGC16").unwrap().0, 5);
}

#[test]
fn parquet_columns_load_by_type() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("objname", DataType::Utf8, true),
        Field::new("pgc", DataType::Int64, true),
        Field::new("bt", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec![Some("NGC1"), Some("G"), None, Some(" ... "), Some("NGC5")])),
        Arc::new(Int64Array::from(vec![Some(1), Some(2), Some(3), None, Some(5)])),
        Arc::new(Float64Array::from(vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("catalog.parquet");
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let catalog = Catalog::open(&path, &ExplorerConfig::default()).unwrap();
    assert_eq!(catalog.len(), 5);
    assert_eq!(
        catalog.names().as_slice(),
        ["NGC1", "PGC2", "PGC3", "Galaxy_4", "NGC5"]
    );
    // placeholder text is missing in Parquet too
    let table = load_file(&path, &ExplorerConfig::default().loader).unwrap();
    assert_eq!(table.rows[3][0], RawValue::Null);
    // four values is below the plotting minimum
    assert!(catalog.parameters().is_empty());
    assert_eq!(catalog.dataset().column("bt").unwrap().present_count(), 4);
}

#[test]
fn unsupported_extension_is_an_error() {
    let (_dir, path) = write_file("catalog.xlsx", b"");
    let err = Catalog::open(&path, &ExplorerConfig::default()).unwrap_err();
    assert!(err.to_string().contains("Unsupported file extension"));
}

#[test]
fn config_file_overrides_loader_and_policy() {
    let toml = "[loader]\ndelimiter = \",\"\n\n[plot]\nhistogram_bins = 4\n";
    let (_dir, config_path) = write_file("explorer.toml", toml.as_bytes());
    let config = ExplorerConfig::from_path(&config_path).unwrap();
    assert_eq!(config.loader.delimiter, ',');
    assert_eq!(config.plot.histogram_bins, 4);
    assert_eq!(config.naming.secondary_prefix, "PGC");

    let (_data, path) = write_file("comma.csv", b"objname,bt\nA01,1\nA02,2\nA03,3\nA04,4\nA05,5\n");
    let catalog = Catalog::open(&path, &config).unwrap();
    assert_eq!(catalog.parameters(), ["bt"]);
}
