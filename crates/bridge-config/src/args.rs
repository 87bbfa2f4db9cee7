//! Filtering of process arguments destined for the configuration loader.
//!
//! Host applications launch the bridge with positional arguments of their own
//! (an extension origin, a parent window handle). Those would be rejected by
//! the generated command-line parser, so only recognised configuration flags
//! and their values are retained.

use std::ffi::{OsStr, OsString};

/// Flags understood by [`crate::Config`].
///
/// MAINTENANCE: keep in sync with the fields of [`crate::Config`].
pub const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--tcp-host",
    "--tcp-port",
    "--request-timeout-secs",
    "--client-read-timeout-secs",
    "--max-request-bytes",
    "--max-frame-bytes",
    "--log-filter",
    "--log-format",
    "--log-file",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Skip;
    }

    let mut parts = text.splitn(2, '=');
    let flag = parts.next().unwrap_or_default();
    let has_inline_value = parts.next().is_some();

    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Skip
    }
}

/// Returns the program name followed by every recognised configuration flag.
///
/// Unknown tokens are dropped. A recognised flag written without an inline
/// `=value` keeps the token that follows it.
#[must_use]
pub fn config_arguments(args: &[OsString]) -> Vec<OsString> {
    let mut iter = args.iter();
    let mut filtered: Vec<OsString> = Vec::with_capacity(args.len());
    let Some(program) = iter.next() else {
        return filtered;
    };
    filtered.push(program.clone());

    while let Some(argument) = iter.next() {
        match classify(argument) {
            FlagAction::Include { needs_value } => {
                filtered.push(argument.clone());
                if needs_value && let Some(value) = iter.next() {
                    filtered.push(value.clone());
                }
            }
            FlagAction::Skip => {}
        }
    }

    filtered
}
