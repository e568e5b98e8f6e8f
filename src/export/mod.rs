mod xml;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::store::models::WeatherQuery;

/// Plain-text answer used instead of an empty document.
pub const NO_DATA_MESSAGE: &str = "No data found for given filters.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Xml,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Xml => "application/xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "" | "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            _ => Err(ExportError::UnknownFormat(value.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported export format '{0}', expected csv, json or xml")]
    UnknownFormat(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("xml error: {0}")]
    Xml(String),
}

/// One exported record, in column order.
#[derive(Debug, Serialize)]
pub struct ExportRow<'a> {
    pub id: i64,
    pub location_name: &'a str,
    pub lat: f64,
    pub lon: f64,
    pub start_date: String,
    pub end_date: String,
}

impl<'a> From<&'a WeatherQuery> for ExportRow<'a> {
    fn from(query: &'a WeatherQuery) -> Self {
        Self {
            id: query.id,
            location_name: &query.location_name,
            lat: query.lat,
            lon: query.lon,
            start_date: query.start_date.to_string(),
            end_date: query.end_date.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Export {
    pub body: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

/// Serializes the records. Callers handle the empty case with [`NO_DATA_MESSAGE`].
pub fn export(records: &[WeatherQuery], format: ExportFormat) -> Result<Export, ExportError> {
    let rows: Vec<ExportRow<'_>> = records.iter().map(ExportRow::from).collect();

    let body = match format {
        ExportFormat::Csv => to_csv(&rows)?,
        ExportFormat::Json => to_json(&rows)?,
        ExportFormat::Xml => xml::to_xml(&rows)?,
    };

    Ok(Export {
        body,
        content_type: format.content_type(),
        file_name: format!("weather_queries.{}", format.extension()),
    })
}

fn to_csv(rows: &[ExportRow<'_>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}

fn to_json(rows: &[ExportRow<'_>]) -> Result<Vec<u8>, ExportError> {
    let mut body = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut body, formatter);
    rows.serialize(&mut serializer)?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn record(id: i64, name: &str) -> WeatherQuery {
        WeatherQuery {
            id,
            location_name: name.to_string(),
            lat: 48.8566,
            lon: 2.3522,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            created_at: NaiveDateTime::parse_from_str("2024-01-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
        }
    }

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(" Xml ".parse::<ExportFormat>().unwrap(), ExportFormat::Xml);
        assert_eq!("".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("parquet".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn csv_has_header_and_rows_in_order() {
        let export = export(&[record(1, "Paris, France"), record(2, "London")], ExportFormat::Csv).unwrap();
        let text = String::from_utf8(export.body).unwrap();

        assert_eq!(
            text,
            "id,location_name,lat,lon,start_date,end_date\n\
             1,\"Paris, France\",48.8566,2.3522,2024-01-01,2024-01-05\n\
             2,London,48.8566,2.3522,2024-01-01,2024-01-05\n"
        );
        assert_eq!(export.content_type, "text/csv");
        assert_eq!(export.file_name, "weather_queries.csv");
    }

    #[test]
    fn json_is_indented_with_four_spaces() {
        let export = export(&[record(7, "Paris")], ExportFormat::Json).unwrap();
        let text = String::from_utf8(export.body).unwrap();

        assert!(text.starts_with("[\n    {\n        \"id\": 7,"), "{}", text);
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["location_name"], "Paris");
        assert_eq!(parsed[0]["start_date"], "2024-01-01");
        assert!(parsed[0].get("created_at").is_none());
    }

    #[test]
    fn xml_wraps_records_without_type_attributes() {
        let export = export(&[record(3, "Ham & Eggs")], ExportFormat::Xml).unwrap();
        let text = String::from_utf8(export.body).unwrap();

        assert!(text.contains("<weather_queries>"), "{}", text);
        assert!(text.contains("<weather_query>"));
        assert!(text.contains("<id>3</id>"));
        assert!(text.contains("<location_name>Ham &amp; Eggs</location_name>"));
        assert!(text.contains("<end_date>2024-01-05</end_date>"));
        assert!(!text.contains("type="));
        assert_eq!(export.content_type, "application/xml");
    }

    #[test]
    fn whole_coordinates_keep_their_decimal_point_in_every_format() {
        let mut query = record(4, "Null Island");
        query.lat = 1.0;
        query.lon = -3.0;

        let xml = String::from_utf8(export(&[query.clone()], ExportFormat::Xml).unwrap().body).unwrap();
        assert!(xml.contains("<lat>1.0</lat>"), "{}", xml);
        assert!(xml.contains("<lon>-3.0</lon>"), "{}", xml);

        let csv = String::from_utf8(export(&[query.clone()], ExportFormat::Csv).unwrap().body).unwrap();
        assert!(csv.contains(",1.0,-3.0,"), "{}", csv);

        let json = String::from_utf8(export(&[query], ExportFormat::Json).unwrap().body).unwrap();
        assert!(json.contains("\"lat\": 1.0"), "{}", json);
    }
}
