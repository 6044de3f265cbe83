use std::fs;

use super::*;

fn ghi_dni_bundle(dir: &Path, gid: usize) -> SiteBundle {
    solar_collection(dir)
        .build_bundle(gid, &["ghi".to_string(), "dni".to_string()])
        .unwrap()
}

#[test]
fn export_layout_is_record_then_variables_then_rows() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = ghi_dni_bundle(dir.path(), 0);

    let path = export(&bundle, &dir.path().join("out.csv")).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "Location ID,Latitude,Longitude,State,Time Zone");
    assert_eq!(lines[1], "0,40.0,-105.0,CO,-7");
    assert_eq!(lines[2], "ghi,dni");
    assert_eq!(lines[3], "0.0,100.0");
    assert_eq!(lines[4], "1.0,101.0");
    assert_eq!(lines[5], "2.0,102.0");
}

#[test]
fn directory_destination_names_the_file_by_site() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let bundle = ghi_dni_bundle(dir.path(), 1);

    let path = export(&bundle, out.path()).unwrap();
    assert_eq!(path, out.path().join("site_1.csv"));

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().nth(1).unwrap(), "1,41.0,-104.0,WY,-6");
}

#[test]
fn csv_destination_is_taken_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = ghi_dni_bundle(dir.path(), 0);

    let target = dir.path().join("renamed.csv");
    let path = export(&bundle, &target).unwrap();
    assert_eq!(path, target);
    assert!(target.exists());
}

#[test]
fn other_destinations_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = ghi_dni_bundle(dir.path(), 0);

    assert!(matches!(
        export(&bundle, &dir.path().join("no_such_dir")),
        Err(ExportError::Destination(_))
    ));
    assert!(matches!(
        export(&bundle, &dir.path().join("data.parquet")),
        Err(ExportError::Destination(_))
    ));
}

#[test]
fn delimiters_in_site_attributes_are_quoted() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("county", DataType::Utf8, false),
    ]));
    let meta = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(vec![40.0])),
            Arc::new(Float64Array::from(vec![-105.0])),
            Arc::new(StringArray::from(vec!["Boulder, CO"])),
        ],
    )
    .unwrap();
    let store = MemStore::builder()
        .meta(meta)
        .time_axis(TimeAxis::new(vec![TimeAxis::parse("2012-01-01").unwrap()]).unwrap())
        .dataset("ghi", vec![Float64Array::from(vec![0.0])])
        .build()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let collection = open_solar("nsrdb_2012.h5", store, IndexCache::new(dir.path()).unwrap());
    let bundle = collection.build_bundle(0, &["ghi".to_string()]).unwrap();
    let path = export(&bundle, &dir.path().join("out.csv")).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "Location ID,Latitude,Longitude,County");
    assert_eq!(lines[1], "0,40.0,-105.0,\"Boulder, CO\"");
}

#[test]
fn reexport_overwrites_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = ghi_dni_bundle(dir.path(), 0);
    let target = dir.path().join("out.csv");

    export(&bundle, &target).unwrap();
    export(&bundle, &target).unwrap();

    let content = fs::read_to_string(&target).unwrap();
    assert_eq!(content.lines().count(), 6);
}
