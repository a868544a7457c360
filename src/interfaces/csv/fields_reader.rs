use crate::domain::form::FormFields;
use crate::error::{RequestError, Result};
use std::io::Read;

const FIELD_COLUMN: &str = "field";
const VALUE_COLUMN: &str = "value";

/// Reads form fields from a `field,value` CSV source.
///
/// Lets a request be prepared offline with the same field names the web form
/// submits. Repeated field names accumulate like repeated multipart parts.
pub struct FieldsReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> FieldsReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Consumes the source and collects every row.
    ///
    /// Short rows read as an empty value; rows without a field name are skipped.
    pub fn fields(mut self) -> Result<FormFields> {
        let headers = self
            .reader
            .headers()
            .map_err(|e| RequestError::DecodeError(format!("line 1: {e}")))?;
        let field_at = headers
            .iter()
            .position(|name| name == FIELD_COLUMN)
            .ok_or_else(|| RequestError::DecodeError(format!("line 1: missing `{FIELD_COLUMN}` column")))?;
        let value_at = headers.iter().position(|name| name == VALUE_COLUMN);

        let mut fields = FormFields::new();
        for (line, record) in self.reader.into_records().enumerate() {
            let record = record.map_err(|e| RequestError::DecodeError(format!("line {}: {e}", line + 2)))?;
            let field = record.get(field_at).unwrap_or_default();
            if field.is_empty() {
                continue;
            }
            let value = value_at.and_then(|at| record.get(at)).unwrap_or_default();
            fields.append(field, value);
        }
        Ok(fields)
    }
}
