//! Import and export of the quote collection
//!
//! Export produces indented JSON; import accepts only a JSON array and
//! replaces the collection wholesale (see `Store::replace`).

use std::path::Path;

use serde_json::Value;

use crate::error::{QuoteError, QuoteResult};
use crate::models::Quote;
use crate::storage::persistence::atomic_write;

/// Default name of the export artifact
pub const EXPORT_FILE_NAME: &str = "quotes.json";

/// Serialize the collection as indented JSON
pub fn export_json(quotes: &[Quote]) -> QuoteResult<String> {
    serde_json::to_string_pretty(quotes).map_err(QuoteError::Encode)
}

/// Write the export artifact to `path`
pub fn export_to_path(path: &Path, quotes: &[Quote]) -> QuoteResult<()> {
    let json = export_json(quotes)?;
    write_export(path, &json)
}

/// Write already serialized export contents to `path`
///
/// Goes through a temp file and rename, so an existing artifact is either
/// replaced whole or left as it was.
pub fn write_export(path: &Path, contents: &str) -> QuoteResult<()> {
    atomic_write(path, contents.as_bytes())?;
    Ok(())
}

/// Parse import file contents
///
/// The payload must be a JSON array of objects. Object fields are not
/// validated beyond that; missing ones load as empty strings.
pub fn parse_import(contents: &str) -> QuoteResult<Vec<Quote>> {
    let value: Value = serde_json::from_str(contents).map_err(QuoteError::InvalidJson)?;

    let Value::Array(items) = value else {
        return Err(QuoteError::NotAnArray);
    };

    if !items.iter().all(Value::is_object) {
        return Err(QuoteError::NotAnArray);
    }

    serde_json::from_value(Value::Array(items)).map_err(|_| QuoteError::NotAnArray)
}
