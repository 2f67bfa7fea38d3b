//! Prompt grammar: which text identifies which mode.

use indexmap::IndexMap;
use regex::bytes::Regex;

use super::mode::Mode;

/// Prompt patterns for a single mode.
///
/// A mode may be recognised by several alternative patterns. `not_contains`
/// strings veto a match, for prompts whose pattern alone is too loose
/// (e.g. `#` matches both privileged and config prompts).
#[derive(Debug, Clone)]
pub struct ModePrompt {
    /// The mode this prompt identifies.
    pub mode: Mode,

    /// Alternative patterns, any of which identifies the mode.
    pub patterns: Vec<Regex>,

    /// Strings that must NOT be in the prompt for this mode to match.
    pub not_contains: Vec<String>,
}

impl ModePrompt {
    /// Create a prompt definition with a single pattern.
    pub fn new(mode: Mode, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            mode,
            patterns: vec![Regex::new(pattern)?],
            not_contains: vec![],
        })
    }

    /// Add an alternative pattern.
    pub fn with_alternative(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.patterns.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Add a not_contains guard.
    pub fn with_not_contains(mut self, text: impl Into<String>) -> Self {
        self.not_contains.push(text.into());
        self
    }

    /// Check if this mode's prompt matches the given text.
    pub fn matches(&self, prompt: &str) -> bool {
        if self.not_contains.iter().any(|nc| prompt.contains(nc.as_str())) {
            return false;
        }
        self.patterns.iter().any(|p| p.is_match(prompt.as_bytes()))
    }
}

/// The prompt grammar of a device dialect.
///
/// Mode prompts are kept in a fixed priority order: deepest mode first. Some
/// prompts are textual extensions of others (`R1(config)#` ends in the same
/// `#` as `R1#`), so the most specific pattern must always be tried first.
/// The order is enforced on insertion and does not depend on the order the
/// caller registers modes in.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    modes: IndexMap<Mode, ModePrompt>,

    /// Login username prompt.
    pub username: Regex,

    /// Login (and enable) password prompt.
    pub password: Regex,

    /// Pagination marker, e.g. ` --More-- `.
    pub pagination: Regex,
}

impl PromptSpec {
    /// Create an empty grammar with the given login and pagination patterns.
    pub fn new(username: &str, password: &str, pagination: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            modes: IndexMap::new(),
            username: Regex::new(username)?,
            password: Regex::new(password)?,
            pagination: Regex::new(pagination)?,
        })
    }

    /// Register the prompt for a mode, replacing any previous definition.
    pub fn with_mode(mut self, prompt: ModePrompt) -> Self {
        self.modes.insert(prompt.mode, prompt);
        // Stable sort: equal depths keep registration order.
        self.modes
            .sort_by(|a, _, b, _| b.depth().cmp(&a.depth()));
        self
    }

    /// Determine the mode from a prompt string.
    ///
    /// Modes are tried in priority order and the first match wins.
    pub fn classify(&self, prompt: &str) -> Option<Mode> {
        self.modes
            .values()
            .find(|p| p.matches(prompt))
            .map(|p| p.mode)
    }

    /// Get the prompt definition for a mode.
    pub fn get(&self, mode: Mode) -> Option<&ModePrompt> {
        self.modes.get(&mode)
    }

    /// All mode prompts in priority order.
    pub fn prompts(&self) -> impl Iterator<Item = &ModePrompt> {
        self.modes.values()
    }

    /// Modes known to this grammar, in priority order.
    pub fn modes(&self) -> impl Iterator<Item = Mode> + '_ {
        self.modes.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mode::SubMode;

    fn make_spec() -> PromptSpec {
        // Registered shallow-first on purpose; classify must still prefer
        // the config prompts.
        PromptSpec::new(r"(?mi)^username:\s?$", r"(?mi)^password:\s?$", r"--More--")
            .unwrap()
            .with_mode(ModePrompt::new(Mode::UserExec, r"(?m)^\S+>\s?$").unwrap())
            .with_mode(ModePrompt::new(Mode::PrivilegedExec, r"(?m)^\S+#\s?$").unwrap())
            .with_mode(ModePrompt::new(Mode::GlobalConfig, r"(?m)^\S+\(config\)#\s?$").unwrap())
            .with_mode(
                ModePrompt::new(Mode::SubConfig(SubMode::Interface), r"(?m)^\S+\(config-if\)#\s?$")
                    .unwrap(),
            )
    }

    #[test]
    fn test_priority_order_is_deepest_first() {
        let spec = make_spec();
        let modes: Vec<Mode> = spec.modes().collect();
        assert_eq!(
            modes,
            vec![
                Mode::SubConfig(SubMode::Interface),
                Mode::GlobalConfig,
                Mode::PrivilegedExec,
                Mode::UserExec,
            ]
        );
    }

    #[test]
    fn test_classify_prefers_most_specific() {
        let spec = make_spec();
        // `\S+#` alone would also match these.
        assert_eq!(spec.classify("R1(config)#"), Some(Mode::GlobalConfig));
        assert_eq!(
            spec.classify("R1(config-if)#"),
            Some(Mode::SubConfig(SubMode::Interface))
        );
        assert_eq!(spec.classify("R1#"), Some(Mode::PrivilegedExec));
        assert_eq!(spec.classify("R1>"), Some(Mode::UserExec));
        assert_eq!(spec.classify("Building configuration..."), None);
    }

    #[test]
    fn test_not_contains_vetoes_match() {
        let prompt = ModePrompt::new(Mode::PrivilegedExec, r"#\s*$")
            .unwrap()
            .with_not_contains("(config");
        assert!(prompt.matches("router#"));
        assert!(!prompt.matches("router(config)#"));
    }

    #[test]
    fn test_alternative_patterns() {
        let prompt = ModePrompt::new(Mode::UserExec, r">\s?$")
            .unwrap()
            .with_alternative(r"\$\s?$")
            .unwrap();
        assert!(prompt.matches("switch>"));
        assert!(prompt.matches("user@host:~$ "));
        assert!(!prompt.matches("switch#"));
    }
}
