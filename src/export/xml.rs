use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{ExportError, ExportRow};

const ROOT: &str = "weather_queries";
const ITEM: &str = "weather_query";

/// `<weather_queries>` holding one `<weather_query>` per row; leaves carry text only.
pub(super) fn to_xml(rows: &[ExportRow<'_>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(&mut writer, Event::Start(BytesStart::new(ROOT)))?;

    for row in rows {
        write(&mut writer, Event::Start(BytesStart::new(ITEM)))?;
        leaf(&mut writer, "id", &row.id.to_string())?;
        leaf(&mut writer, "location_name", row.location_name)?;
        leaf(&mut writer, "lat", &number(row.lat))?;
        leaf(&mut writer, "lon", &number(row.lon))?;
        leaf(&mut writer, "start_date", &row.start_date)?;
        leaf(&mut writer, "end_date", &row.end_date)?;
        write(&mut writer, Event::End(BytesEnd::new(ITEM)))?;
    }

    write(&mut writer, Event::End(BytesEnd::new(ROOT)))?;
    Ok(writer.into_inner())
}

// Same spelling as the csv and json writers: 1.0 stays "1.0"
fn number(value: f64) -> String {
    format!("{:?}", value)
}

fn leaf(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> Result<(), ExportError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(value)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ExportError> {
    writer
        .write_event(event)
        .map_err(|e| ExportError::Xml(e.to_string()))
}
