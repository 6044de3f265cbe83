
pub use std::sync::Arc;

pub use arrow::array::{Array, Float64Array, Int64Array};
pub use arrow::datatypes::{DataType, Field, Schema};
pub use arrow::record_batch::RecordBatch;
pub use arrow_array::StringArray;
pub use chrono::Duration;

pub use super::*;

pub fn sample_meta() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("state", DataType::Utf8, false),
        Field::new("county", DataType::Utf8, false),
        Field::new("timezone", DataType::Int64, false),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(vec![40.0, 41.0, 40.5])),
            Arc::new(Float64Array::from(vec![-105.0, -104.0, -104.5])),
            Arc::new(StringArray::from(vec!["CO", "WY", "CO"])),
            Arc::new(StringArray::from(vec!["Boulder", "Albany", "Larimer"])),
            Arc::new(Int64Array::from(vec![-7, -7, -7])),
        ],
    )
    .unwrap()
}

pub fn hourly_axis(start: &str, steps: usize) -> TimeAxis {
    let start = TimeAxis::parse(start).unwrap();
    TimeAxis::new(
        (0..steps)
            .map(|i| start + Duration::hours(i as i64))
            .collect(),
    )
    .unwrap()
}

pub fn ghi_columns() -> Vec<Float64Array> {
    vec![
        Float64Array::from(vec![0.0, 100.0, 200.0, 300.0]),
        Float64Array::from(vec![10.0, 110.0, 210.0, 310.0]),
        Float64Array::from(vec![20.0, 120.0, 220.0, 320.0]),
    ]
}

/// Three sites, four hourly steps, one "ghi" dataset with per-site ramps.
pub fn sample_store() -> MemStore {
    MemStore::builder()
        .meta(sample_meta())
        .time_axis(hourly_axis("2012-01-01T00:00", 4))
        .dataset("ghi", ghi_columns())
        .build()
        .unwrap()
}

pub fn values_of(array: &Float64Array) -> Vec<f64> {
    array.values().to_vec()
}
