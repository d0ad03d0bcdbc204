//! Reading and writing the `project.pbxproj` property-list format.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

pub mod parser;
pub mod value;
pub mod writer;

pub use parser::ParseError;
pub use value::{Dictionary, Value};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error("missing 'objects' dictionary")]
    MissingObjects,
    #[error("object '{0}' is not a dictionary")]
    MalformedObject(String),
}

/// A parsed project descriptor with its object table split out for
/// lookup by ID.
///
/// `root` keeps an empty `objects` entry as a placeholder so the writer can
/// emit the table at its original position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Dictionary,
    pub objects: BTreeMap<String, Dictionary>,
}

impl Document {
    pub fn parse(input: &str) -> Result<Self, DocumentError> {
        Self::from_root(parser::parse(input)?)
    }

    pub fn from_root(mut root: Dictionary) -> Result<Self, DocumentError> {
        let table = match root.get_mut("objects") {
            Some(Value::Dictionary(table)) => std::mem::take(table),
            _ => return Err(DocumentError::MissingObjects),
        };

        let mut objects = BTreeMap::new();
        for (id, object) in table.iter() {
            let object = object
                .as_dictionary()
                .ok_or_else(|| DocumentError::MalformedObject(id.to_string()))?;
            objects.insert(id.to_string(), object.clone());
        }

        Ok(Self { root, objects })
    }

    pub fn to_pbxproj(&self, annotations: &HashMap<String, String>) -> String {
        writer::write(self, annotations)
    }
}
