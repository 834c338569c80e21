//! Destination table definitions and per-dialect SQL rendering

use crate::config::DatabaseBackend;
use crate::dataset::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Text,
    Date,
    Time,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
}

impl ColumnDef {
    const fn required(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
        }
    }

    const fn nullable(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: Dataset,
    pub referenced_column: &'static str,
}

/// Destination table; the first column is the primary key
#[derive(Debug)]
pub struct TableDef {
    pub dataset: Dataset,
    pub columns: &'static [ColumnDef],
    pub foreign_keys: &'static [ForeignKey],
}

pub static CONSTRUCTORS: TableDef = TableDef {
    dataset: Dataset::Constructors,
    columns: &[
        ColumnDef::required("constructorId", SqlType::Integer),
        ColumnDef::required("name", SqlType::Text),
    ],
    foreign_keys: &[],
};

pub static DRIVERS: TableDef = TableDef {
    dataset: Dataset::Drivers,
    columns: &[
        ColumnDef::required("driverId", SqlType::Integer),
        ColumnDef::required("fullname", SqlType::Text),
    ],
    foreign_keys: &[],
};

pub static RACES: TableDef = TableDef {
    dataset: Dataset::Races,
    columns: &[
        ColumnDef::required("raceId", SqlType::Integer),
        ColumnDef::required("year", SqlType::Integer),
        ColumnDef::required("name", SqlType::Text),
        ColumnDef::nullable("date", SqlType::Date),
    ],
    foreign_keys: &[],
};

pub static RESULTS: TableDef = TableDef {
    dataset: Dataset::Results,
    columns: &[
        ColumnDef::required("resultId", SqlType::Integer),
        ColumnDef::required("raceId", SqlType::Integer),
        ColumnDef::required("driverId", SqlType::Integer),
        ColumnDef::required("constructorId", SqlType::Integer),
        ColumnDef::required("positionOrder", SqlType::Integer),
        ColumnDef::required("points", SqlType::Integer),
        ColumnDef::nullable("fastestLapTime", SqlType::Time),
    ],
    foreign_keys: &[
        ForeignKey {
            column: "raceId",
            references: Dataset::Races,
            referenced_column: "raceId",
        },
        ForeignKey {
            column: "driverId",
            references: Dataset::Drivers,
            referenced_column: "driverId",
        },
        ForeignKey {
            column: "constructorId",
            references: Dataset::Constructors,
            referenced_column: "constructorId",
        },
    ],
};

impl TableDef {
    pub fn for_dataset(dataset: Dataset) -> &'static TableDef {
        match dataset {
            Dataset::Constructors => &CONSTRUCTORS,
            Dataset::Drivers => &DRIVERS,
            Dataset::Races => &RACES,
            Dataset::Results => &RESULTS,
        }
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for `backend`
    pub fn create_sql(&self, backend: DatabaseBackend) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let mut sql = format!(
                    "{} {}",
                    quote_ident(backend, column.name),
                    type_name(backend, column.sql_type)
                );
                if i == 0 {
                    sql.push_str(" PRIMARY KEY");
                } else if !column.nullable {
                    sql.push_str(" NOT NULL");
                }
                sql
            })
            .collect();

        for fk in self.foreign_keys {
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                quote_ident(backend, fk.column),
                quote_ident(backend, fk.references.table_name()),
                quote_ident(backend, fk.referenced_column)
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(backend, self.dataset.table_name()),
            parts.join(", ")
        )
    }
}

/// Quote an identifier so mixed-case column names survive
pub fn quote_ident(backend: DatabaseBackend, ident: &str) -> String {
    match backend {
        DatabaseBackend::MySql => format!("`{}`", ident),
        DatabaseBackend::Postgres | DatabaseBackend::Sqlite => format!("\"{}\"", ident),
    }
}

fn type_name(backend: DatabaseBackend, sql_type: SqlType) -> &'static str {
    match (backend, sql_type) {
        (_, SqlType::Integer) => "INTEGER",
        (DatabaseBackend::MySql, SqlType::Text) => "VARCHAR(255)",
        (_, SqlType::Text) => "TEXT",
        (_, SqlType::Date) => "DATE",
        (DatabaseBackend::MySql, SqlType::Time) => "TIME(3)",
        (_, SqlType::Time) => "TIME",
    }
}

/// `INSERT INTO t (c1, c2, ...) ` prefix for a multi-row insert
pub fn insert_prefix(backend: DatabaseBackend, dataset: Dataset) -> String {
    let columns = dataset
        .columns()
        .iter()
        .map(|c| quote_ident(backend, c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) ",
        quote_ident(backend, dataset.table_name()),
        columns
    )
}

/// Statement that empties a table, for backends that can do it in one statement
pub fn truncate_sql(backend: DatabaseBackend, dataset: Dataset) -> String {
    let table = quote_ident(backend, dataset.table_name());
    match backend {
        DatabaseBackend::Postgres => format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", table),
        DatabaseBackend::MySql => format!("TRUNCATE TABLE {}", table),
        DatabaseBackend::Sqlite => format!("DELETE FROM {}", table),
    }
}
