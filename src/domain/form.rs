use super::attachment::AttachmentRef;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// A decoded form value. Repeated field names accumulate in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    /// The value a single-valued reader sees: the first one submitted.
    pub fn first(&self) -> &str {
        match self {
            FieldValue::Single(value) => value,
            FieldValue::Multiple(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            FieldValue::Single(existing) => {
                *self = FieldValue::Multiple(vec![std::mem::take(existing), value]);
            }
            FieldValue::Multiple(values) => values.push(value),
        }
    }
}

/// Text fields of a submission keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: BTreeMap<String, FieldValue>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.fields.entry(name.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(value),
            Entry::Vacant(entry) => {
                entry.insert(FieldValue::Single(value));
            }
        }
    }

    /// First value of `name`, if the field was submitted at all.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(FieldValue::first)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FormFields::new();
        for (name, value) in iter {
            fields.append(name, value);
        }
        fields
    }
}

/// Everything the payload decoder produced for one request.
#[derive(Debug, Default)]
pub struct DecodedPayload {
    pub fields: FormFields,
    pub files: Vec<AttachmentRef>,
}

impl DecodedPayload {
    pub fn new(fields: FormFields, files: Vec<AttachmentRef>) -> Self {
        Self { fields, files }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_fields_resolve_to_first() {
        let mut fields = FormFields::new();
        fields.append("solicitante", "Ana Souza");
        fields.append("solicitante", "Someone Else");
        fields.append("departamento", "Logistics");

        assert_eq!(fields.get("solicitante"), Some("Ana Souza"));
        assert_eq!(fields.get("departamento"), Some("Logistics"));
        assert_eq!(fields.get("missing"), None);
        assert_eq!(
            fields.fields.get("solicitante"),
            Some(&FieldValue::Multiple(vec![
                "Ana Souza".to_string(),
                "Someone Else".to_string()
            ]))
        );
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_collect_from_pairs() {
        let fields: FormFields = [("row_count", "2"), ("data_0", "01/10/2026")]
            .into_iter()
            .collect();
        assert_eq!(fields.get("row_count"), Some("2"));
        assert!(!fields.is_empty());
    }
}
