use crate::error::Result;
use reqwest::blocking::multipart::{Form, Part};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// A single form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        content_type: String,
        data: Vec<u8>,
    },
}

impl FormField {
    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}

/// Multipart/form-data body sent in upload mode.
///
/// Fields are kept as plain data until the request is sent; the transport
/// turns them into a reqwest [`Form`], which owns the wire format and picks
/// the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multipart {
    fields: Vec<FormField>,
}

impl Multipart {
    pub fn new() -> Self {
        Multipart::default()
    }

    /// Turn the top-level fields of a JSON object into text fields.
    ///
    /// Strings are sent as-is, `null` and `false` as empty, `true` as `1`,
    /// anything else as its JSON text.
    pub fn from_json_fields(fields: &Map<String, Value>) -> Self {
        fields.iter().fold(Multipart::new(), |form, (name, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null | Value::Bool(false) => String::new(),
                Value::Bool(true) => "1".to_string(),
                other => other.to_string(),
            };
            form.text(name.clone(), text)
        })
    }

    /// Add a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Add a file part from memory
    pub fn bytes(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.fields.push(FormField::File {
            name: name.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        });
        self
    }

    /// Add a file part read from disk, sent as application/octet-stream
    pub fn file(self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());

        Ok(self.bytes(name, filename, "application/octet-stream", data))
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Value of the first text field with the given name
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|field| match field {
            FormField::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build the reqwest form for sending
    pub fn to_form(&self) -> reqwest::Result<Form> {
        let mut form = Form::new();

        for field in &self.fields {
            form = match field {
                FormField::Text { name, value } => form.text(name.clone(), value.clone()),
                FormField::File {
                    name,
                    filename,
                    content_type,
                    data,
                } => {
                    let part = Part::bytes(data.clone())
                        .file_name(filename.clone())
                        .mime_str(content_type)?;
                    form.part(name.clone(), part)
                }
            };
        }

        Ok(form)
    }
}
