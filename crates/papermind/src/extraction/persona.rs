//! Persona input parsing
//!
//! Reads the collection input JSON. Both the structured shape
//! (`{"persona": {"role": ...}, "job_to_be_done": {"task": ...}}`) and the
//! flat string shape are accepted; blank or missing fields fall back to the
//! generic defaults here, at the caller boundary.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::Persona;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PersonaField {
    Structured { role: String },
    Plain(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JobField {
    Structured { task: String },
    Plain(String),
}

#[derive(Debug, Deserialize)]
struct PersonaInput {
    persona: Option<PersonaField>,
    job_to_be_done: Option<JobField>,
}

/// Load the persona input file for a collection
pub fn load_persona(path: &Path) -> Result<Persona> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Persona(format!("cannot read '{}': {}", path.display(), e)))?;
    parse_persona(&raw)
}

/// Parse persona input JSON
pub fn parse_persona(raw: &str) -> Result<Persona> {
    let input: PersonaInput =
        serde_json::from_str(raw).map_err(|e| Error::Persona(e.to_string()))?;

    let role = input.persona.map(|p| match p {
        PersonaField::Structured { role } => role,
        PersonaField::Plain(role) => role,
    });
    let task = input.job_to_be_done.map(|j| match j {
        JobField::Structured { task } => task,
        JobField::Plain(task) => task,
    });

    Ok(Persona::with_defaults(role, task))
}
