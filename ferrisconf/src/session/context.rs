//! Per-device session state.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::platform::Mode;

/// Placeholder written to logs and transcripts instead of a secret.
pub const HIDDEN: &str = "<hidden>";

/// Login and enable credentials.
///
/// Secrets never appear in `Debug` output.
pub struct Credentials {
    /// Login username.
    pub username: String,

    /// Login password.
    pub password: SecretString,

    /// Enable secret, if the device asks for one.
    pub enable_secret: Option<SecretString>,
}

impl Credentials {
    /// Create credentials without an enable secret.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            enable_secret: None,
        }
    }

    /// Set the enable secret.
    pub fn with_enable_secret(mut self, secret: impl Into<String>) -> Self {
        self.enable_secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Replace every secret standing alone in `text` with [`HIDDEN`].
    ///
    /// A secret only counts when whitespace or the ends of `text` surround
    /// it, so a secret `class` leaves `class-map` alone.
    pub fn mask(&self, text: &str) -> String {
        let secrets = std::iter::once(&self.password).chain(self.enable_secret.as_ref());
        let mut masked = text.to_string();
        for secret in secrets {
            let secret = secret.expose_secret();
            if !secret.is_empty() && masked.contains(secret) {
                masked = mask_token(&masked, secret);
            }
        }
        masked
    }
}

fn mask_token(text: &str, secret: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, _) in text.match_indices(secret) {
        let end = start + secret.len();
        let alone = text[..start].chars().next_back().is_none_or(char::is_whitespace)
            && text[end..].chars().next().is_none_or(char::is_whitespace);
        if alone {
            out.push_str(&text[last..start]);
            out.push_str(HIDDEN);
            last = end;
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Copy a secret without exposing it anywhere but the new box.
pub(crate) fn duplicate(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: duplicate(&self.password),
            enable_secret: self.enable_secret.as_ref().map(duplicate),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &HIDDEN)
            .field(
                "enable_secret",
                &self.enable_secret.as_ref().map(|_| HIDDEN),
            )
            .finish()
    }
}

/// Bounded record of everything written and read since the last command.
///
/// When the limit is exceeded the oldest text is dropped.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    text: String,
    limit: usize,
    truncated: bool,
}

impl Transcript {
    /// Create an empty transcript holding at most `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            limit,
            truncated: false,
        }
    }

    /// Append text, dropping the oldest bytes past the limit.
    pub fn push(&mut self, text: &str) {
        self.text.push_str(text);
        if self.text.len() > self.limit {
            let mut cut = self.text.len() - self.limit;
            while !self.text.is_char_boundary(cut) {
                cut += 1;
            }
            self.text.drain(..cut);
            self.truncated = true;
        }
    }

    /// Start over for a new command.
    pub fn clear(&mut self) {
        self.text.clear();
        self.truncated = false;
    }

    /// The recorded text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether older text has been dropped.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// State the automaton keeps for one device.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Device address, for logs.
    pub host: String,

    /// Credentials used to log in and escalate.
    pub credentials: Credentials,

    /// Hostname the device is expected to be configured with.
    pub target_hostname: Option<String>,

    mode: Mode,
    prompt: String,
    transcript: Transcript,
}

impl SessionContext {
    /// Create a context for a freshly attached transport.
    pub fn new(host: impl Into<String>, credentials: Credentials, transcript_limit: usize) -> Self {
        Self {
            host: host.into(),
            credentials,
            target_hostname: None,
            mode: Mode::LoginPrompt,
            prompt: String::new(),
            transcript: Transcript::new(transcript_limit),
        }
    }

    /// The mode the device was last confirmed to be in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// The last prompt seen.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub(crate) fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Text exchanged since the last command was issued, secrets masked.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Record text in the transcript with secrets masked.
    pub(crate) fn record(&mut self, text: &str) {
        let masked = self.credentials.mask(text);
        self.transcript.push(&masked);
    }

    pub(crate) fn begin_command(&mut self) {
        self.transcript.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_secrets() {
        let creds = Credentials::new("admin", "cisco").with_enable_secret("class");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("cisco"));
        assert!(!debug.contains("class"));
    }

    #[test]
    fn test_mask() {
        let creds = Credentials::new("admin", "cisco").with_enable_secret("class");
        assert_eq!(
            creds.mask("Password: cisco\nenable class"),
            "Password: <hidden>\nenable <hidden>"
        );
    }

    #[test]
    fn test_mask_leaves_words_containing_a_secret() {
        let creds = Credentials::new("admin", "cisco").with_enable_secret("class");
        assert_eq!(
            creds.mask("class-map match-any VOICE\nusername ciscoadmin\n class\n"),
            "class-map match-any VOICE\nusername ciscoadmin\n <hidden>\n"
        );
    }

    #[test]
    fn test_clone_keeps_secrets() {
        let creds = Credentials::new("admin", "cisco").with_enable_secret("class");
        let copy = creds.clone();
        assert_eq!(copy.password.expose_secret(), "cisco");
        assert_eq!(
            copy.enable_secret.as_ref().map(|s| s.expose_secret()),
            Some("class")
        );
    }

    #[test]
    fn test_transcript_is_bounded() {
        let mut transcript = Transcript::new(8);
        transcript.push("0123456789");
        assert_eq!(transcript.as_str(), "23456789");
        assert!(transcript.is_truncated());

        transcript.clear();
        transcript.push("ok");
        assert_eq!(transcript.as_str(), "ok");
        assert!(!transcript.is_truncated());
    }

    #[test]
    fn test_context_records_masked_text() {
        let creds = Credentials::new("admin", "cisco");
        let mut ctx = SessionContext::new("10.0.0.1", creds, 1024);
        assert_eq!(ctx.mode(), Mode::LoginPrompt);

        ctx.record("Password: cisco\n");
        assert_eq!(ctx.transcript().as_str(), "Password: <hidden>\n");

        ctx.begin_command();
        assert!(ctx.transcript().as_str().is_empty());
    }
}
