pub mod files;

pub use std::path::Path;
pub use std::sync::Arc;

pub use arrow::array::{Float64Array, Int64Array};
pub use arrow::datatypes::{DataType, Field, Schema};
pub use arrow::record_batch::RecordBatch;
pub use arrow_array::StringArray;
pub use chrono::Duration;

pub use crate::query::{Collection, open_solar, open_wind};
pub use crate::spatial::IndexCache;
pub use crate::store::{MemStore, TimeAxis};

pub use super::*;

pub fn sample_meta() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("state", DataType::Utf8, false),
        Field::new("timezone", DataType::Int64, false),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(vec![40.0, 41.0])),
            Arc::new(Float64Array::from(vec![-105.0, -104.0])),
            Arc::new(StringArray::from(vec!["CO", "WY"])),
            Arc::new(Int64Array::from(vec![-7, -6])),
        ],
    )
    .unwrap()
}

fn hourly_axis(steps: usize) -> TimeAxis {
    let start = TimeAxis::parse("2012-01-01T00:00").unwrap();
    TimeAxis::new(
        (0..steps)
            .map(|i| start + Duration::hours(i as i64))
            .collect(),
    )
    .unwrap()
}

fn two_site_ramps(base: f64) -> Vec<Float64Array> {
    vec![
        Float64Array::from(vec![base, base + 1.0, base + 2.0]),
        Float64Array::from(vec![base + 10.0, base + 11.0, base + 12.0]),
    ]
}

/// Two sites, three hourly steps, every solar default variable present.
pub fn solar_collection(cache_dir: &Path) -> Collection<MemStore> {
    let store = MemStore::builder()
        .meta(sample_meta())
        .time_axis(hourly_axis(3))
        .dataset("ghi", two_site_ramps(0.0))
        .dataset("dni", two_site_ramps(100.0))
        .dataset("dhi", two_site_ramps(200.0))
        .dataset("air_temperature", two_site_ramps(300.0))
        .dataset("wind_speed", two_site_ramps(400.0))
        .build()
        .unwrap();
    open_solar("nsrdb_2012.h5", store, IndexCache::new(cache_dir).unwrap())
}

/// Two sites, three hourly steps, 80 m and 100 m wind variable sets.
pub fn wind_collection(cache_dir: &Path) -> Collection<MemStore> {
    let mut builder = MemStore::builder()
        .meta(sample_meta())
        .time_axis(hourly_axis(3));
    for height in [80, 100] {
        for (i, name) in crate::query::Domain::wind_datasets(height).iter().enumerate() {
            builder = builder.dataset(name, two_site_ramps((height * 10 + i as u32 * 100) as f64));
        }
    }
    open_wind(
        "wtk_2012.h5",
        builder.build().unwrap(),
        IndexCache::new(cache_dir).unwrap(),
    )
}
