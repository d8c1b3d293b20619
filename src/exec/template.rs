// src/exec/template.rs

//! `{placeholder}` substitution for tool command templates.

use std::sync::OnceLock;

use regex::Regex;

fn placeholder_re() -> Result<&'static Regex, String> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    match RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}")) {
        Ok(re) => Ok(re),
        Err(err) => Err(format!("invalid placeholder pattern: {err}")),
    }
}

/// Reject placeholders not in `allowed`.
pub fn check_placeholders(template: &str, allowed: &[&str]) -> Result<(), String> {
    for caps in placeholder_re()?.captures_iter(template) {
        let name = &caps[1];
        if !allowed.contains(&name) {
            return Err(format!(
                "unknown placeholder {{{name}}} (allowed: {})",
                allowed
                    .iter()
                    .map(|a| format!("{{{a}}}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
    }
    Ok(())
}

/// Substitute `vars` into `template`, shell-quoting each value.
///
/// A placeholder without a value is an error.
pub fn render(template: &str, vars: &[(&str, String)]) -> Result<String, String> {
    let mut missing = None;
    let rendered = placeholder_re()?.replace_all(template, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match vars.iter().find(|(k, _)| *k == name) {
            Some((_, value)) => shell_quote(value),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(format!("no value for placeholder {{{name}}}")),
        None => Ok(rendered.into_owned()),
    }
}

fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '\\'));
    if safe {
        value.to_string()
    } else if cfg!(windows) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
