
pub use std::path::Path;
pub use std::sync::Arc;

pub use arrow::array::{Array, Float64Array, Int64Array};
pub use arrow::datatypes::{DataType, Field, Schema};
pub use arrow::record_batch::RecordBatch;
pub use arrow_array::StringArray;
pub use chrono::Duration;

pub use crate::spatial::IndexCache;
pub use crate::store::{MemStore, SpatialShards, TemporalShards, TimeAxis};

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
            Arc::new(Float64Array::from(vec![40.0, 41.0, 40.5])),
            Arc::new(Float64Array::from(vec![-105.0, -104.0, -104.5])),
            Arc::new(StringArray::from(vec!["CO", "WY", "CO"])),
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

/// Three sites, four hourly steps in 2012, "ghi" and "dni" ramps.
pub fn solar_store(start: &str, base: f64) -> MemStore {
    let ramp = |site: f64| {
        Float64Array::from(vec![
            base + site,
            base + site + 1.0,
            base + site + 2.0,
            base + site + 3.0,
        ])
    };
    MemStore::builder()
        .meta(sample_meta())
        .time_axis(hourly_axis(start, 4))
        .dataset("ghi", vec![ramp(0.0), ramp(10.0), ramp(20.0)])
        .dataset("dni", vec![ramp(500.0), ramp(510.0), ramp(520.0)])
        .build()
        .unwrap()
}

pub fn solar_collection(cache_dir: &Path) -> Collection<MemStore> {
    open_solar(
        "nsrdb_2012.h5",
        solar_store("2012-01-01T00:00", 0.0),
        IndexCache::new(cache_dir).unwrap(),
    )
}

fn one_site_shard(lat: f64, lon: f64, state: &str, base: f64) -> MemStore {
    let schema = Arc::new(Schema::new(vec![
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("state", DataType::Utf8, false),
    ]));
    let meta = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(vec![lat])),
            Arc::new(Float64Array::from(vec![lon])),
            Arc::new(StringArray::from(vec![state])),
        ],
    )
    .unwrap();
    MemStore::builder()
        .meta(meta)
        .time_axis(hourly_axis("2012-01-01T00:00", 4))
        .dataset(
            "ghi",
            vec![Float64Array::from(vec![base, base + 1.0, base + 2.0, base + 3.0])],
        )
        .build()
        .unwrap()
}

/// The three sample sites split into one shard each, gids assigned in
/// shard order.
pub fn spatial_collection(cache_dir: &Path) -> Collection<SpatialShards<MemStore>> {
    let shards = SpatialShards::open(vec![
        one_site_shard(40.0, -105.0, "CO", 0.0),
        one_site_shard(41.0, -104.0, "WY", 100.0),
        one_site_shard(40.5, -104.5, "CO", 200.0),
    ])
    .unwrap();
    open_solar("nsrdb_2012.h5", shards, IndexCache::new(cache_dir).unwrap())
}

/// 2012 and 2013 shards over one site set, values offset by 1000 per year.
pub fn temporal_collection(cache_dir: &Path) -> Collection<TemporalShards<MemStore>> {
    let shards = TemporalShards::open(vec![
        (2012, solar_store("2012-01-01T00:00", 0.0)),
        (2013, solar_store("2013-01-01T00:00", 1000.0)),
    ])
    .unwrap();
    open_solar("nsrdb_2012.h5", shards, IndexCache::new(cache_dir).unwrap())
}

#[test]
fn domain_bundle_variables() {
    assert_eq!(
        Domain::Solar.bundle_datasets(),
        vec!["ghi", "dni", "dhi", "air_temperature", "wind_speed"]
    );
    assert!(
        Domain::Nsrdb
            .bundle_datasets()
            .contains(&"surface_pressure".to_string())
    );
    assert_eq!(
        Domain::Wave.bundle_datasets(),
        vec![
            "significant_wave_height",
            "energy_period",
            "mean_wave_direction",
            "water_depth"
        ]
    );
}

#[test]
fn wind_bundle_tracks_hub_height() {
    assert_eq!(
        Domain::wind_datasets(80),
        vec![
            "windspeed_80m",
            "winddirection_80m",
            "temperature_80m",
            "pressure_80m"
        ]
    );
    assert_eq!(Domain::Wind.bundle_datasets(), Domain::wind_datasets(100));
}
