//! Raw configuration documents of commands and interactions.
//!
//! Documents are read with figment. The format is chosen from the file
//! extension: `.yaml` and `.yml` files are read as YAML, everything else as
//! TOML.

use std::path::Path;

use figment::{
    Figment,
    providers::{Format, Toml, Yaml},
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::commands::LoadError;

/// Document of a text command.
#[derive(Debug, Deserialize)]
pub struct CommandDocument {
    pub description: String,
    #[serde(default)]
    pub calls: Vec<String>,
    pub permissions: Option<Vec<String>>,
    pub executor: Option<String>,
}

/// Document of an interaction command.
#[derive(Debug, Deserialize)]
pub struct InteractionDocument {
    pub description: String,
    pub permissions: Option<Vec<String>>,
    pub executor: Option<String>,
    /// Parameters as a list of records (`[[parameter]]` tables)
    #[serde(default)]
    pub parameter: Vec<ParameterRecord>,
    /// Parameters as parallel arrays (`parameters.name`, `parameters.type`, ...)
    pub parameters: Option<ParallelParameters>,
}

/// One parameter declared as a record.
#[derive(Debug, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "autoComplete")]
    pub auto_complete: bool,
    #[serde(default)]
    pub choices: Vec<String>,
}

/// Parameters declared as index aligned arrays.
#[derive(Debug, Deserialize)]
pub struct ParallelParameters {
    pub name: Vec<String>,
    pub description: Vec<String>,
    pub required: Vec<bool>,
    #[serde(rename = "autoComplete")]
    pub auto_complete: Vec<bool>,
    pub choice: Vec<Vec<String>>,
    #[serde(rename = "type")]
    pub kind: Vec<String>,
}

/// Reads the document stored at `path`.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let figment = match path.extension().and_then(|extension| extension.to_str()) {
        Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
        _ => Figment::from(Toml::file(path)),
    };

    figment.extract().map_err(|e| LoadError::Document {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}
