//! Builds the `RUN` request document from the operation name and arguments.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::{Value, json};

use crate::AppError;

/// Operation whose arguments are a message and a tab number.
const SEND: &str = "send";
/// Message source for `send` when no argument is given.
pub(crate) const PROMPT_FILE: &str = "prompt.txt";

/// Builds `{"type":"RUN","name":name,"args":[...]}`.
///
/// Relative paths resolve against `cwd`.
pub(crate) fn build_request(
    name: &str,
    arguments: &[String],
    cwd: &Path,
) -> Result<Value, AppError> {
    let args = if name == SEND {
        send_arguments(arguments, cwd)?
    } else {
        arguments.iter().map(|argument| loose_json(argument)).collect()
    };
    Ok(json!({
        "type": "RUN",
        "name": name,
        "args": args,
    }))
}

fn send_arguments(arguments: &[String], cwd: &Path) -> Result<Vec<Value>, AppError> {
    let message = match arguments.first() {
        Some(candidate) => message_or_file(candidate, cwd)?,
        None => read_prompt(cwd)?,
    };
    let tab = match arguments.get(1) {
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::InvalidTabNumber {
                value: value.clone(),
            })?,
        None => 0,
    };
    Ok(vec![Value::String(message), Value::from(tab)])
}

/// Returns the trimmed contents of `candidate` when it names a file, or the
/// text itself otherwise.
fn message_or_file(candidate: &str, cwd: &Path) -> Result<String, AppError> {
    let path = cwd.join(candidate);
    if !path.is_file() {
        return Ok(candidate.to_owned());
    }
    fs::read_to_string(&path)
        .map(|text| text.trim().to_owned())
        .map_err(|source| AppError::ReadMessage { path, source })
}

fn read_prompt(cwd: &Path) -> Result<String, AppError> {
    let path = cwd.join(PROMPT_FILE);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(text.trim().to_owned()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            Err(AppError::MissingPrompt { path })
        }
        Err(source) => Err(AppError::ReadMessage { path, source }),
    }
}

/// Parses `argument` as JSON, falling back to a plain string.
fn loose_json(argument: &str) -> Value {
    serde_json::from_str(argument).unwrap_or_else(|_| Value::String(argument.to_owned()))
}
