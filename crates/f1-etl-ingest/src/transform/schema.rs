//! Declared source schemas for the four datasets
//!
//! Each dataset lists the raw columns it needs. Headers are checked once per
//! dataset, producing a [`ColumnIndex`] that every row is read through.

use super::coerce;
use super::raw::RawDataset;
use crate::dataset::Dataset;
use crate::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
    Date,
    /// Numeric, possibly fractional, defaulted when absent
    Points,
    LapTime,
}

impl ColumnType {
    pub fn label(self) -> &'static str {
        match self {
            ColumnType::Integer => "an integer",
            ColumnType::Text => "text",
            ColumnType::Date => "a date",
            ColumnType::Points => "a number",
            ColumnType::LapTime => "a lap time",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    /// Alternative header spellings accepted when `name` itself is absent
    pub aliases: &'static [&'static str],
    pub column_type: ColumnType,
}

impl Column {
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            aliases: &[],
            column_type,
        }
    }

    pub const fn with_aliases(
        name: &'static str,
        column_type: ColumnType,
        aliases: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            aliases,
            column_type,
        }
    }
}

#[derive(Debug)]
pub struct EntitySchema {
    pub dataset: Dataset,
    pub columns: &'static [Column],
}

pub static CONSTRUCTORS: EntitySchema = EntitySchema {
    dataset: Dataset::Constructors,
    columns: &[
        Column::new("constructorId", ColumnType::Integer),
        Column::new("name", ColumnType::Text),
    ],
};

pub static DRIVERS: EntitySchema = EntitySchema {
    dataset: Dataset::Drivers,
    columns: &[
        Column::new("driverId", ColumnType::Integer),
        Column::new("forename", ColumnType::Text),
        Column::new("surname", ColumnType::Text),
    ],
};

pub static RACES: EntitySchema = EntitySchema {
    dataset: Dataset::Races,
    columns: &[
        Column::new("raceId", ColumnType::Integer),
        Column::new("year", ColumnType::Integer),
        Column::new("name", ColumnType::Text),
        Column::new("date", ColumnType::Date),
    ],
};

pub static RESULTS: EntitySchema = EntitySchema {
    dataset: Dataset::Results,
    columns: &[
        Column::new("resultId", ColumnType::Integer),
        // Some published copies misspell the header
        Column::with_aliases("raceId", ColumnType::Integer, &["raceld"]),
        Column::new("driverId", ColumnType::Integer),
        Column::new("constructorId", ColumnType::Integer),
        Column::new("positionOrder", ColumnType::Integer),
        Column::new("points", ColumnType::Points),
        Column::new("fastestLapTime", ColumnType::LapTime),
    ],
};

impl EntitySchema {
    pub fn for_dataset(dataset: Dataset) -> &'static EntitySchema {
        match dataset {
            Dataset::Constructors => &CONSTRUCTORS,
            Dataset::Drivers => &DRIVERS,
            Dataset::Races => &RACES,
            Dataset::Results => &RESULTS,
        }
    }

    fn column(&self, name: &str) -> Option<(usize, &Column)> {
        self.columns.iter().enumerate().find(|(_, c)| c.name == name)
    }

    /// Locate every declared column in the raw header
    pub fn resolve(&'static self, raw: &RawDataset) -> Result<ColumnIndex, SchemaError> {
        let mut positions = Vec::with_capacity(self.columns.len());
        let mut missing = Vec::new();

        for column in self.columns {
            let position = raw.column_position(column.name).or_else(|| {
                column
                    .aliases
                    .iter()
                    .find_map(|alias| raw.column_position(alias))
            });

            match position {
                Some(p) => positions.push(p),
                None => missing.push(column.name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns {
                dataset: self.dataset,
                columns: missing,
            });
        }

        Ok(ColumnIndex {
            schema: self,
            positions,
        })
    }
}

/// Header positions of a schema's columns in one raw dataset
#[derive(Debug)]
pub struct ColumnIndex {
    schema: &'static EntitySchema,
    positions: Vec<usize>,
}

impl ColumnIndex {
    /// View over one data row; `number` is 1-based
    pub fn row<'a>(&'a self, number: usize, fields: &'a [String]) -> RowView<'a> {
        RowView {
            index: self,
            number,
            fields,
        }
    }
}

pub struct RowView<'a> {
    index: &'a ColumnIndex,
    number: usize,
    fields: &'a [String],
}

impl<'a> RowView<'a> {
    pub fn number(&self) -> usize {
        self.number
    }

    /// Raw field text for a declared column
    pub fn value(&self, column: &str) -> &'a str {
        self.index
            .schema
            .column(column)
            .and_then(|(i, _)| self.index.positions.get(i))
            .and_then(|&p| self.fields.get(p))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Required integer; absent or non-numeric is a coercion error
    pub fn integer(&self, column: &str) -> Result<i32, SchemaError> {
        let value = self.value(column);
        coerce::parse_integer(value).ok_or_else(|| self.coercion_error(column, value))
    }

    pub fn text(&self, column: &str) -> String {
        coerce::text(self.value(column))
    }

    pub fn coercion_error(&self, column: &str, value: &str) -> SchemaError {
        let expected = self
            .index
            .schema
            .column(column)
            .map(|(_, c)| c.column_type.label())
            .unwrap_or("a value");

        SchemaError::TypeCoercion {
            dataset: self.index.schema.dataset,
            row: self.number,
            column: column.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_cover_their_dataset() {
        for dataset in Dataset::ALL {
            assert_eq!(EntitySchema::for_dataset(dataset).dataset, dataset);
        }
    }

    #[test]
    fn test_resolve_reports_every_missing_column() {
        let raw = RawDataset::new(Dataset::Races, &["raceId", "name"], &[]);
        let err = RACES.resolve(&raw).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns {
                dataset: Dataset::Races,
                columns: vec!["year".to_string(), "date".to_string()],
            }
        );
    }

    #[test]
    fn test_resolve_accepts_alias() {
        let raw = RawDataset::new(
            Dataset::Results,
            &[
                "resultId",
                "raceld",
                "driverId",
                "constructorId",
                "positionOrder",
                "points",
                "fastestLapTime",
            ],
            &[&["1", "18", "1", "1", "1", "10", "1:27.452"]],
        );
        let index = RESULTS.resolve(&raw).unwrap();
        let row = index.row(1, &raw.rows[0]);
        assert_eq!(row.integer("raceId").unwrap(), 18);
    }

    #[test]
    fn test_canonical_name_wins_over_alias() {
        let raw = RawDataset::new(
            Dataset::Results,
            &[
                "raceld",
                "resultId",
                "raceId",
                "driverId",
                "constructorId",
                "positionOrder",
                "points",
                "fastestLapTime",
            ],
            &[&["99", "1", "18", "1", "1", "1", "10", "\\N"]],
        );
        let index = RESULTS.resolve(&raw).unwrap();
        assert_eq!(index.row(1, &raw.rows[0]).integer("raceId").unwrap(), 18);
    }

    #[test]
    fn test_integer_coercion_error_carries_position() {
        let raw = RawDataset::new(Dataset::Constructors, &["constructorId", "name"], &[&["x1", "Ferrari"]]);
        let index = CONSTRUCTORS.resolve(&raw).unwrap();
        let err = index.row(1, &raw.rows[0]).integer("constructorId").unwrap_err();
        assert_eq!(
            err,
            SchemaError::TypeCoercion {
                dataset: Dataset::Constructors,
                row: 1,
                column: "constructorId".to_string(),
                value: "x1".to_string(),
                expected: "an integer",
            }
        );
    }
}
