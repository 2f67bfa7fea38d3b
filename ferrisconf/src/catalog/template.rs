//! Configuration templates and read-only queries.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TemplateError};
use crate::platform::{Mode, SubMode};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_][a-z0-9_]*)\}").expect("placeholder pattern is valid"));

/// One step of a configuration template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TemplateStep {
    /// Enter global configuration from privileged exec.
    EnterConfig,

    /// Enter a configuration sub-mode.
    EnterSubmode { kind: SubMode, command: String },

    /// Send a command that must be accepted in `mode`.
    Command { text: String, mode: Mode },

    /// The prompt must now start with this hostname.
    ConfirmHostname { hostname: String },

    /// Walk back to a shallower mode.
    ExitTo { mode: Mode },

    /// Save the running configuration.
    Persist,
}

impl TemplateStep {
    /// Send a command in global configuration.
    pub fn global(text: impl Into<String>) -> Self {
        TemplateStep::Command {
            text: text.into(),
            mode: Mode::GlobalConfig,
        }
    }

    /// Send a command inside a sub-mode.
    pub fn sub(kind: SubMode, text: impl Into<String>) -> Self {
        TemplateStep::Command {
            text: text.into(),
            mode: Mode::SubConfig(kind),
        }
    }

    fn render(&self, template: &str, params: &[(&str, &str)]) -> Result<Self> {
        let fill = |text: &str| substitute(template, text, params);
        Ok(match self {
            TemplateStep::EnterSubmode { kind, command } => TemplateStep::EnterSubmode {
                kind: *kind,
                command: fill(command)?,
            },
            TemplateStep::Command { text, mode } => TemplateStep::Command {
                text: fill(text)?,
                mode: *mode,
            },
            TemplateStep::ConfirmHostname { hostname } => TemplateStep::ConfirmHostname {
                hostname: fill(hostname)?,
            },
            other => other.clone(),
        })
    }
}

impl fmt::Display for TemplateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateStep::EnterConfig => write!(f, "enter config"),
            TemplateStep::EnterSubmode { command, .. } => write!(f, "{}", command),
            TemplateStep::Command { text, .. } => write!(f, "{}", text),
            TemplateStep::ConfirmHostname { hostname } => write!(f, "confirm hostname {}", hostname),
            TemplateStep::ExitTo { mode } => write!(f, "exit to {}", mode),
            TemplateStep::Persist => write!(f, "persist"),
        }
    }
}

/// Replace `{name}` placeholders in `text`.
///
/// Every placeholder must have a value, and values may not contain control
/// characters: a newline in a value would send a second command.
fn substitute(template: &str, text: &str, params: &[(&str, &str)]) -> Result<String> {
    let mut error = None;
    let rendered = PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
        let name = &caps[1];
        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) if value.chars().any(char::is_control) => {
                error.get_or_insert(TemplateError::InvalidParameter {
                    name: name.to_string(),
                });
                String::new()
            }
            Some((_, value)) => value.to_string(),
            None => {
                error.get_or_insert(TemplateError::MissingParameter {
                    template: template.to_string(),
                    name: name.to_string(),
                });
                String::new()
            }
        }
    });
    match error {
        Some(e) => Err(e.into()),
        None => Ok(rendered.into_owned()),
    }
}

/// A named, ordered list of configuration steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Template name (e.g., "loopback").
    pub name: String,

    /// Steps in the order they are applied.
    pub steps: Vec<TemplateStep>,
}

impl Template {
    /// Create an empty template.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn with_step(mut self, step: TemplateStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Names of the placeholders used by this template, in first-use order.
    pub fn parameters(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for step in &self.steps {
            let text = match step {
                TemplateStep::EnterSubmode { command, .. } => command,
                TemplateStep::Command { text, .. } => text,
                TemplateStep::ConfirmHostname { hostname } => hostname,
                _ => continue,
            };
            for caps in PLACEHOLDER.captures_iter(text) {
                if !names.iter().any(|n| n == &caps[1]) {
                    names.push(caps[1].to_string());
                }
            }
        }
        names
    }

    /// Substitute `params` into every step.
    ///
    /// Fails before anything is sent if a placeholder has no value.
    pub fn render(&self, params: &[(&str, &str)]) -> Result<Template> {
        let steps = self
            .steps
            .iter()
            .map(|step| step.render(&self.name, params))
            .collect::<Result<Vec<_>>>()?;
        Ok(Template {
            name: self.name.clone(),
            steps,
        })
    }
}

/// A read-only show command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Query name (e.g., "running_config").
    pub name: String,

    /// Command text, possibly with placeholders.
    pub command: String,

    /// Mode the command must be sent from.
    pub mode: Mode,
}

impl Query {
    /// Create a query run from privileged exec.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            mode: Mode::PrivilegedExec,
        }
    }

    /// The command text with placeholders filled in.
    pub fn render(&self, params: &[(&str, &str)]) -> Result<String> {
        substitute(&self.name, &self.command, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn loopback() -> Template {
        Template::new("loopback")
            .with_step(TemplateStep::EnterConfig)
            .with_step(TemplateStep::EnterSubmode {
                kind: SubMode::Interface,
                command: "interface loopback {loopback_id}".to_string(),
            })
            .with_step(TemplateStep::sub(
                SubMode::Interface,
                "ip address {address} {mask}",
            ))
            .with_step(TemplateStep::ExitTo {
                mode: Mode::PrivilegedExec,
            })
    }

    #[test]
    fn test_render() {
        let rendered = loopback()
            .render(&[
                ("loopback_id", "0"),
                ("address", "10.0.0.1"),
                ("mask", "255.255.255.0"),
            ])
            .unwrap();

        assert_eq!(rendered.steps[0], TemplateStep::EnterConfig);
        assert_eq!(rendered.steps[1].to_string(), "interface loopback 0");
        assert_eq!(rendered.steps[2].to_string(), "ip address 10.0.0.1 255.255.255.0");
        assert_eq!(rendered.steps[3].to_string(), "exit to privileged-exec");
    }

    #[test]
    fn test_missing_parameter() {
        let err = loopback()
            .render(&[("loopback_id", "0"), ("address", "10.0.0.1")])
            .unwrap_err();
        match err {
            Error::Template(TemplateError::MissingParameter { template, name }) => {
                assert_eq!(template, "loopback");
                assert_eq!(name, "mask");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_control_characters_rejected() {
        let err = loopback()
            .render(&[
                ("loopback_id", "0\nreload"),
                ("address", "10.0.0.1"),
                ("mask", "255.255.255.0"),
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Template(TemplateError::InvalidParameter { ref name }) if name == "loopback_id"
        ));
    }

    #[test]
    fn test_values_are_not_validated() {
        let rendered = loopback()
            .render(&[
                ("loopback_id", "0"),
                ("address", "not-an-ip"),
                ("mask", "x"),
            ])
            .unwrap();
        assert_eq!(rendered.steps[2].to_string(), "ip address not-an-ip x");
    }

    #[test]
    fn test_parameters() {
        assert_eq!(loopback().parameters(), vec!["loopback_id", "address", "mask"]);
    }

    #[test]
    fn test_query_render() {
        let query = Query::new("section", "show running-config | section {protocol}");
        assert_eq!(
            query.render(&[("protocol", "ospf")]).unwrap(),
            "show running-config | section ospf"
        );
    }

    #[test]
    fn test_steps_deserialize() {
        let step: TemplateStep =
            serde_json::from_str(r#"{"step":"exit_to","mode":"privileged_exec"}"#).unwrap();
        assert_eq!(
            step,
            TemplateStep::ExitTo {
                mode: Mode::PrivilegedExec
            }
        );
    }
}
