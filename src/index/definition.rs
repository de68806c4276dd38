use serde::{Deserialize, Serialize};

/// User-declared index definition, as delivered by the outer CREATE
/// command. Serializable so the shell can persist definitions and
/// re-supply them on restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub prefixes: Vec<String>,
    pub schema: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

/// Analyzer kind of a schema field. Only `Text` fields are indexed;
/// the engine logs and skips the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Tag,
    Numeric,
    Geo,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>, prefixes: Vec<String>) -> Self {
        IndexDefinition {
            name: name.into(),
            prefixes,
            schema: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.schema.push(FieldSpec {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn with_text_field(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Text)
    }
}
