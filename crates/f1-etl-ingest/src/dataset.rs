//! The four datasets handled by the pipeline

use serde::{Deserialize, Serialize};

/// One of the fixed Formula 1 datasets
///
/// Each dataset maps to one CSV file (`<name>.csv`) and one destination table
/// of the same name. The declaration order is the referent-first load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Constructors,
    Drivers,
    Races,
    Results,
}

impl Dataset {
    /// Every dataset, referents before dependents
    pub const ALL: [Dataset; 4] = [
        Dataset::Constructors,
        Dataset::Drivers,
        Dataset::Races,
        Dataset::Results,
    ];

    /// Safe table clearing order: most-dependent table first
    pub const TRUNCATE_ORDER: [Dataset; 4] = [
        Dataset::Results,
        Dataset::Races,
        Dataset::Drivers,
        Dataset::Constructors,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dataset::Constructors => "constructors",
            Dataset::Drivers => "drivers",
            Dataset::Races => "races",
            Dataset::Results => "results",
        }
    }

    /// Destination table name
    pub fn table_name(self) -> &'static str {
        self.name()
    }

    /// File name used both upstream and in the extraction directory
    pub fn file_name(self) -> String {
        format!("{}.csv", self.name())
    }

    /// Normalized column names, in insert order
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Dataset::Constructors => &["constructorId", "name"],
            Dataset::Drivers => &["driverId", "fullname"],
            Dataset::Races => &["raceId", "year", "name", "date"],
            Dataset::Results => &[
                "resultId",
                "raceId",
                "driverId",
                "constructorId",
                "positionOrder",
                "points",
                "fastestLapTime",
            ],
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        let name = name.strip_suffix(".csv").unwrap_or(&name);
        Dataset::ALL
            .into_iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| format!("Unknown dataset: {}", s))
    }
}
