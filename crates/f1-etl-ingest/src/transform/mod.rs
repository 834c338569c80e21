//! Row transformation: raw CSV rows into typed, normalized records
//!
//! One pure function per entity. Each validates the header against the
//! entity's declared schema, then coerces every row; the first row that
//! cannot be coerced fails the whole dataset.

pub mod coerce;
pub mod raw;
pub mod records;
pub mod schema;

pub use raw::{read_dataset, RawDataset};
pub use records::{Constructor, Driver, FieldValue, Race, RaceResult, Row};

use crate::config::TransformOptions;
use crate::dataset::Dataset;
use crate::error::SchemaError;
use schema::{EntitySchema, RowView};
use serde::Serialize;
use tracing::warn;

/// Normalized output of one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "dataset", content = "records", rename_all = "lowercase")]
pub enum NormalizedDataset {
    Constructors(Vec<Constructor>),
    Drivers(Vec<Driver>),
    Races(Vec<Race>),
    Results(Vec<RaceResult>),
}

impl NormalizedDataset {
    pub fn dataset(&self) -> Dataset {
        match self {
            NormalizedDataset::Constructors(_) => Dataset::Constructors,
            NormalizedDataset::Drivers(_) => Dataset::Drivers,
            NormalizedDataset::Races(_) => Dataset::Races,
            NormalizedDataset::Results(_) => Dataset::Results,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NormalizedDataset::Constructors(r) => r.len(),
            NormalizedDataset::Drivers(r) => r.len(),
            NormalizedDataset::Races(r) => r.len(),
            NormalizedDataset::Results(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column values per record, in [`Dataset::columns`] order
    pub fn field_rows(&self) -> Vec<Vec<FieldValue>> {
        fn rows<R: Row>(records: &[R]) -> Vec<Vec<FieldValue>> {
            records.iter().map(Row::values).collect()
        }

        match self {
            NormalizedDataset::Constructors(r) => rows(r),
            NormalizedDataset::Drivers(r) => rows(r),
            NormalizedDataset::Races(r) => rows(r),
            NormalizedDataset::Results(r) => rows(r),
        }
    }
}

/// Apply `build` to every row through the schema's column index
fn map_rows<T>(
    schema: &'static EntitySchema,
    raw: &RawDataset,
    mut build: impl FnMut(&RowView<'_>) -> Result<T, SchemaError>,
) -> Result<Vec<T>, SchemaError> {
    let index = schema.resolve(raw)?;
    raw.rows
        .iter()
        .enumerate()
        .map(|(i, fields)| build(&index.row(i + 1, fields)))
        .collect()
}

pub fn transform_constructors(raw: &RawDataset) -> Result<Vec<Constructor>, SchemaError> {
    map_rows(&schema::CONSTRUCTORS, raw, |row| {
        Ok(Constructor {
            constructor_id: row.integer("constructorId")?,
            name: row.text("name"),
        })
    })
}

pub fn transform_drivers(raw: &RawDataset) -> Result<Vec<Driver>, SchemaError> {
    map_rows(&schema::DRIVERS, raw, |row| {
        let fullname = [row.value("forename"), row.value("surname")]
            .into_iter()
            .filter_map(coerce::present)
            .collect::<Vec<_>>()
            .join(" ");

        Ok(Driver {
            driver_id: row.integer("driverId")?,
            fullname,
        })
    })
}

pub fn transform_races(raw: &RawDataset) -> Result<Vec<Race>, SchemaError> {
    map_rows(&schema::RACES, raw, |row| {
        Ok(Race {
            race_id: row.integer("raceId")?,
            year: row.integer("year")?,
            name: row.text("name"),
            date: coerce::parse_race_date(row.value("date")),
        })
    })
}

pub fn transform_results(
    raw: &RawDataset,
    options: &TransformOptions,
) -> Result<Vec<RaceResult>, SchemaError> {
    map_rows(&schema::RESULTS, raw, |row| {
        let raw_points = row.value("points");
        let points = match coerce::parse_points(raw_points) {
            Some(points) => points,
            None if options.strict_points => return Err(row.coercion_error("points", raw_points)),
            None => 0,
        };

        let raw_lap = row.value("fastestLapTime");
        let fastest_lap_time = coerce::parse_lap_time(raw_lap);
        if fastest_lap_time.is_none() && coerce::present(raw_lap).is_some() {
            warn!(row = row.number(), value = raw_lap, "Unparsable fastestLapTime, storing NULL");
        }

        Ok(RaceResult {
            result_id: row.integer("resultId")?,
            race_id: row.integer("raceId")?,
            driver_id: row.integer("driverId")?,
            constructor_id: row.integer("constructorId")?,
            position_order: row.integer("positionOrder")?,
            points,
            fastest_lap_time,
        })
    })
}

/// Dispatch a raw dataset to its entity transformer
pub fn transform(
    raw: &RawDataset,
    options: &TransformOptions,
) -> Result<NormalizedDataset, SchemaError> {
    Ok(match raw.dataset {
        Dataset::Constructors => NormalizedDataset::Constructors(transform_constructors(raw)?),
        Dataset::Drivers => NormalizedDataset::Drivers(transform_drivers(raw)?),
        Dataset::Races => NormalizedDataset::Races(transform_races(raw)?),
        Dataset::Results => NormalizedDataset::Results(transform_results(raw, options)?),
    })
}
