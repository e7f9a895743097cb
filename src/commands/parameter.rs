//! Parameters of interaction commands.

use std::{fmt, str::FromStr};

use crate::commands::{
    LoadError,
    document::{ParallelParameters, ParameterRecord},
};

/// Kind of value a parameter accepts.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

impl FromStr for ParameterType {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_uppercase().as_str() {
            "STRING" => Ok(ParameterType::String),
            "INTEGER" => Ok(ParameterType::Integer),
            "BOOLEAN" => Ok(ParameterType::Boolean),
            "USER" => Ok(ParameterType::User),
            "CHANNEL" => Ok(ParameterType::Channel),
            "ROLE" => Ok(ParameterType::Role),
            "MENTIONABLE" => Ok(ParameterType::Mentionable),
            "NUMBER" => Ok(ParameterType::Number),
            "ATTACHMENT" => Ok(ParameterType::Attachment),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterType::String => "STRING",
            ParameterType::Integer => "INTEGER",
            ParameterType::Boolean => "BOOLEAN",
            ParameterType::User => "USER",
            ParameterType::Channel => "CHANNEL",
            ParameterType::Role => "ROLE",
            ParameterType::Mentionable => "MENTIONABLE",
            ParameterType::Number => "NUMBER",
            ParameterType::Attachment => "ATTACHMENT",
        };
        f.write_str(name)
    }
}

/// One parameter of an interaction command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Kind of accepted value
    pub kind: ParameterType,
    /// Parameter name, as shown by the platform
    pub name: String,
    /// Parameter description, as shown by the platform
    pub description: String,
    /// Whether the parameter must be filled
    pub required: bool,
    /// Whether the platform should ask the bot for completions
    pub auto_complete: bool,
    /// Allowed literal values, empty when unconstrained
    pub choices: Vec<String>,
}

fn parse_kind(owner: &str, kind: &str) -> Result<ParameterType, LoadError> {
    kind.parse::<ParameterType>()
        .map_err(|_| LoadError::UnknownParameterType {
            name: owner.to_owned(),
            kind: kind.to_owned(),
        })
}

impl ParameterSpec {
    /// Builds a parameter from its record form.
    pub fn from_record(owner: &str, record: ParameterRecord) -> Result<Self, LoadError> {
        Ok(ParameterSpec {
            kind: parse_kind(owner, &record.kind)?,
            name: record.name,
            description: record.description,
            required: record.required,
            auto_complete: record.auto_complete,
            choices: record.choices,
        })
    }
}

/// Builds the parameters of interaction `owner` from either encoding.
///
/// Any invalid entry (unknown type, arrays of different lengths) fails the
/// whole list: parameters are never dropped individually, which would shift
/// the remaining arrays out of alignment.
pub fn parse_parameters(
    owner: &str,
    records: Vec<ParameterRecord>,
    parallel: Option<ParallelParameters>,
) -> Result<Vec<ParameterSpec>, LoadError> {
    match parallel {
        Some(_) if !records.is_empty() => Err(LoadError::AmbiguousParameters(owner.to_owned())),
        Some(parallel) => parse_parallel(owner, parallel),
        None => records
            .into_iter()
            .map(|record| ParameterSpec::from_record(owner, record))
            .collect(),
    }
}

fn parse_parallel(owner: &str, parallel: ParallelParameters) -> Result<Vec<ParameterSpec>, LoadError> {
    let expected = parallel.name.len();
    let lengths = [
        ("description", parallel.description.len()),
        ("required", parallel.required.len()),
        ("autoComplete", parallel.auto_complete.len()),
        ("choice", parallel.choice.len()),
        ("type", parallel.kind.len()),
    ];

    if let Some((field, length)) = lengths.iter().find(|(_, length)| *length != expected) {
        return Err(LoadError::ParameterCountMismatch {
            name: owner.to_owned(),
            detail: format!("{} names but {} {}", expected, length, field),
        });
    }

    // Types first so no spec is built for a list that ends up rejected
    let kinds = parallel
        .kind
        .iter()
        .map(|kind| parse_kind(owner, kind))
        .collect::<Result<Vec<_>, _>>()?;

    let parameters = parallel
        .name
        .into_iter()
        .zip(parallel.description)
        .zip(parallel.required)
        .zip(parallel.auto_complete)
        .zip(parallel.choice)
        .zip(kinds)
        .map(
            |(((((name, description), required), auto_complete), choices), kind)| ParameterSpec {
                kind,
                name,
                description,
                required,
                auto_complete,
                choices,
            },
        )
        .collect();

    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_parallel(count: usize) -> ParallelParameters {
        ParallelParameters {
            name: (0..count).map(|i| format!("name{}", i)).collect(),
            description: (0..count).map(|i| format!("description{}", i)).collect(),
            required: (0..count).map(|i| i % 2 == 0).collect(),
            auto_complete: (0..count).map(|i| i % 3 == 0).collect(),
            choice: (0..count).map(|i| vec![format!("choice{}", i)]).collect(),
            kind: (0..count).map(|_| "string".to_string()).collect(),
        }
    }

    fn create_record(name: &str, kind: &str) -> ParameterRecord {
        ParameterRecord {
            name: name.to_string(),
            description: format!("{} description", name),
            kind: kind.to_string(),
            required: true,
            auto_complete: false,
            choices: vec![],
        }
    }

    #[test]
    fn test_parameter_type_parse() {
        assert_eq!("USER".parse::<ParameterType>(), Ok(ParameterType::User));
        assert_eq!("integer".parse::<ParameterType>(), Ok(ParameterType::Integer));
        assert_eq!("SUB_COMMAND".parse::<ParameterType>(), Err(()));
    }

    #[test]
    fn test_parameter_type_display() {
        assert_eq!(ParameterType::Mentionable.to_string(), "MENTIONABLE");
    }

    #[test]
    fn test_parallel_fields_pulled_from_matching_index() {
        let parameters = parse_parameters("poll", vec![], Some(create_parallel(4))).unwrap();

        assert_eq!(parameters.len(), 4);
        for (i, parameter) in parameters.iter().enumerate() {
            assert_eq!(parameter.name, format!("name{}", i));
            assert_eq!(parameter.description, format!("description{}", i));
            assert_eq!(parameter.required, i % 2 == 0);
            assert_eq!(parameter.auto_complete, i % 3 == 0);
            assert_eq!(parameter.choices, vec![format!("choice{}", i)]);
            assert_eq!(parameter.kind, ParameterType::String);
        }
    }

    #[test]
    fn test_parallel_empty_arrays() {
        let parameters = parse_parameters("ping", vec![], Some(create_parallel(0))).unwrap();
        assert!(parameters.is_empty());
    }

    #[test]
    fn test_parallel_length_mismatch_rejected() {
        let mut parallel = create_parallel(3);
        parallel.auto_complete.pop();

        let result = parse_parameters("poll", vec![], Some(parallel));

        match result {
            Err(LoadError::ParameterCountMismatch { name, detail }) => {
                assert_eq!(name, "poll");
                assert!(detail.contains("autoComplete"));
            }
            other => panic!("Expected ParameterCountMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_parallel_unknown_type_rejects_whole_list() {
        let mut parallel = create_parallel(3);
        parallel.kind[1] = "COLOR".to_string();

        let result = parse_parameters("poll", vec![], Some(parallel));

        assert!(matches!(
            result,
            Err(LoadError::UnknownParameterType { kind, .. }) if kind == "COLOR"
        ));
    }

    #[test]
    fn test_records_keep_declaration_order() {
        let records = vec![create_record("member", "USER"), create_record("days", "INTEGER")];

        let parameters = parse_parameters("ban", records, None).unwrap();

        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "member");
        assert_eq!(parameters[0].kind, ParameterType::User);
        assert_eq!(parameters[1].name, "days");
        assert_eq!(parameters[1].kind, ParameterType::Integer);
    }

    #[test]
    fn test_records_unknown_type_rejected() {
        let records = vec![create_record("member", "USER"), create_record("color", "COLOR")];

        let result = parse_parameters("ban", records, None);

        assert!(matches!(result, Err(LoadError::UnknownParameterType { .. })));
    }

    #[test]
    fn test_both_encodings_rejected() {
        let records = vec![create_record("member", "USER")];

        let result = parse_parameters("ban", records, Some(create_parallel(1)));

        assert!(matches!(result, Err(LoadError::AmbiguousParameters(name)) if name == "ban"));
    }
}
