use duckdb::Connection;
use tracing::info;

const CREATE_WEATHER_QUERIES: &str = "
    CREATE SEQUENCE IF NOT EXISTS weather_queries_id_seq START 1;
    CREATE TABLE IF NOT EXISTS weather_queries (
        id BIGINT PRIMARY KEY DEFAULT nextval('weather_queries_id_seq'),
        location_name VARCHAR NOT NULL,
        lat DOUBLE NOT NULL,
        lon DOUBLE NOT NULL,
        start_date DATE NOT NULL,
        end_date DATE NOT NULL,
        created_at TIMESTAMP NOT NULL
    );
";

/// Creates the tables the store needs. Safe to run on every start.
pub fn ensure_schema(conn: &Connection) -> Result<(), duckdb::Error> {
    conn.execute_batch(CREATE_WEATHER_QUERIES)?;
    info!("Schema ready: weather_queries");
    Ok(())
}
