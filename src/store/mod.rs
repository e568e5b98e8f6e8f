pub mod filter;
pub mod models;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use duckdb::{params, params_from_iter, Connection, Row};
use thiserror::Error;
use tracing::{debug, info};

use crate::db::DbPool;
use filter::QueryFilter;
use models::{NewWeatherQuery, WeatherQuery};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("weather query {0} not found")]
    NotFound(i64),
    #[error("end date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("database error: {0}")]
    Database(#[from] duckdb::Error),
    #[error("unreadable row: {0}")]
    Corrupt(String),
}

const SELECT_COLUMNS: &str = "SELECT id, location_name, lat, lon,
        CAST(start_date AS VARCHAR), CAST(end_date AS VARCHAR), CAST(created_at AS VARCHAR)
    FROM weather_queries";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Row as it comes out of DuckDB, before the date columns are parsed.
struct RawRow {
    id: i64,
    location_name: String,
    lat: f64,
    lon: f64,
    start_date: String,
    end_date: String,
    created_at: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            location_name: row.get(1)?,
            lat: row.get(2)?,
            lon: row.get(3)?,
            start_date: row.get(4)?,
            end_date: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_query(self) -> Result<WeatherQuery, StoreError> {
        let date = |s: &str| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map_err(|e| StoreError::Corrupt(format!("row {}: date '{}': {}", self.id, s, e)))
        };
        let start_date = date(&self.start_date)?;
        let end_date = date(&self.end_date)?;
        let created_at = NaiveDateTime::parse_from_str(&self.created_at, TIMESTAMP_FORMAT)
            .map_err(|e| StoreError::Corrupt(format!("row {}: timestamp '{}': {}", self.id, self.created_at, e)))?;

        Ok(WeatherQuery {
            id: self.id,
            location_name: self.location_name,
            lat: self.lat,
            lon: self.lon,
            start_date,
            end_date,
            created_at,
        })
    }
}

fn validate(query: &NewWeatherQuery) -> Result<(), StoreError> {
    if query.end_date < query.start_date {
        return Err(StoreError::InvalidDateRange {
            start: query.start_date,
            end: query.end_date,
        });
    }
    Ok(())
}

/// Saved weather queries. Every call checks its own connection out of the pool.
///
/// All methods block; async callers should go through `spawn_blocking`.
#[derive(Clone)]
pub struct QueryStore {
    pool: DbPool,
}

impl QueryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, query: &NewWeatherQuery) -> Result<i64, StoreError> {
        validate(query)?;
        let conn = self.pool.get()?;

        let id: i64 = conn.query_row("SELECT nextval('weather_queries_id_seq')", [], |row| row.get(0))?;
        let created_at = Utc::now().naive_utc();

        conn.execute(
            "INSERT INTO weather_queries (id, location_name, lat, lon, start_date, end_date, created_at)
             VALUES (?, ?, ?, ?, CAST(? AS DATE), CAST(? AS DATE), CAST(? AS TIMESTAMP))",
            params![
                id,
                query.location_name,
                query.lat,
                query.lon,
                query.start_date.to_string(),
                query.end_date.to_string(),
                created_at.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            ],
        )?;

        info!("Saved weather query {} for {}", id, query.location_name);
        Ok(id)
    }

    pub fn get(&self, id: i64) -> Result<Option<WeatherQuery>, StoreError> {
        let conn = self.pool.get()?;
        fetch_one(&conn, id)
    }

    /// Overwrites all editable fields. Nothing is written when `id` is unknown.
    pub fn update(&self, id: i64, query: &NewWeatherQuery) -> Result<(), StoreError> {
        validate(query)?;
        let conn = self.pool.get()?;

        let changed = conn.execute(
            "UPDATE weather_queries
             SET location_name = ?, lat = ?, lon = ?,
                 start_date = CAST(? AS DATE), end_date = CAST(? AS DATE)
             WHERE id = ?",
            params![
                query.location_name,
                query.lat,
                query.lon,
                query.start_date.to_string(),
                query.end_date.to_string(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        info!("Updated weather query {}", id);
        Ok(())
    }

    /// Deleting an unknown id is not an error.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM weather_queries WHERE id = ?", params![id])?;

        if removed == 0 {
            debug!("Delete of weather query {} matched nothing", id);
        } else {
            info!("Deleted weather query {}", id);
        }
        Ok(())
    }

    pub fn list(&self, filter: &QueryFilter) -> Result<Vec<WeatherQuery>, StoreError> {
        let conn = self.pool.get()?;
        let (where_clause, values) = filter.to_sql();
        let sql = format!("{}{} ORDER BY id", SELECT_COLUMNS, where_clause);
        debug!("Listing weather queries: {}", sql);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), RawRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRow::into_query).collect()
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let conn = self.pool.get()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM weather_queries", [], |row| row.get(0))?)
    }
}

fn fetch_one(conn: &Connection, id: i64) -> Result<Option<WeatherQuery>, StoreError> {
    let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
    match conn.query_row(&sql, params![id], RawRow::from_row) {
        Ok(raw) => raw.into_query().map(Some),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
