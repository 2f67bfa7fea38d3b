//! Cisco IOS dialect.
//!
//! Supports IOS routers with the following modes:
//! - user exec with `>` prompt
//! - privileged exec with `#` prompt
//! - global configuration with `(config)#` prompt
//! - interface and router sub-modes with `(config-if)#` / `(config-router)#`
//!
//! # Prompt Examples
//!
//! ```text
//! R1>                     # user exec
//! R1#                     # privileged exec
//! R1(config)#             # global configuration
//! R1(config-if)#          # interface configuration
//! R1(config-subif)#       # sub-interface configuration
//! R1(config-router)#      # routing protocol configuration
//! ```
//!
//! # Mode Ladder
//!
//! ```text
//! ┌──────┐  enable   ┌────┐  configure terminal  ┌────────────┐  interface / router  ┌──────────────┐
//! │  >   ├───────────► #  ├──────────────────────► (config)#  ├──────────────────────► (config-*)#  │
//! └──────┘◄──disable─┴────┘◄────────exit─────────┴────────────┘◄────────exit─────────┴──────────────┘
//! ```

use crate::platform::{Dialect, Mode, ModePrompt, PromptSpec, SubMode};

/// Hostname characters IOS accepts in a prompt.
const HOST: &str = r"[\w.\-@/:]{1,63}";

/// Create the Cisco IOS dialect.
///
/// Prompt patterns use `(?m)` so `^`/`$` anchor to line boundaries; the
/// hostname class excludes `(` so `R1(config)#` can never satisfy the
/// privileged pattern, and the `(config` guard backs that up.
pub fn dialect() -> Dialect {
    try_dialect().expect("built-in IOS patterns are valid")
}

fn try_dialect() -> Result<Dialect, regex::Error> {
    let prompts = PromptSpec::new(
        r"(?mi)^\s*user ?name:\s?$",
        r"(?mi)^\s*password:\s?$",
        r" ?--More-- ?",
    )?
    .with_mode(ModePrompt::new(Mode::UserExec, &format!(r"(?m)^{HOST}>\s?$"))?)
    .with_mode(
        ModePrompt::new(Mode::PrivilegedExec, &format!(r"(?m)^{HOST}#\s?$"))?
            .with_not_contains("(config"),
    )
    .with_mode(ModePrompt::new(
        Mode::GlobalConfig,
        &format!(r"(?m)^{HOST}\(config\)#\s?$"),
    )?)
    .with_mode(ModePrompt::new(
        Mode::SubConfig(SubMode::Interface),
        &format!(r"(?m)^{HOST}\(config-(?:sub)?if[\w.\-/:]*\)#\s?$"),
    )?)
    .with_mode(ModePrompt::new(
        Mode::SubConfig(SubMode::Router),
        &format!(r"(?m)^{HOST}\(config-router\)#\s?$"),
    )?);

    Ok(Dialect::new("cisco_ios", prompts)?
        .with_login_denied(r"(?mi)^%\s*(?:login invalid|authentication failed)")?
        .with_login_denied(r"(?mi)^%?\s*access denied")?
        .with_enable_denied(r"(?mi)^%\s*(?:access denied|bad secrets|authentication failed)")?
        .with_persist_question(r"(?m)Destination filename \[[^\]]*\]\?\s*$")?
        .with_persist_question(r"(?m)\[confirm\]\s*$")?
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Unknown command")
        .with_failure_pattern("% Unrecognized command"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cisco_dialect() {
        let dialect = dialect();
        assert_eq!(dialect.name, "cisco_ios");
        assert_eq!(dialect.prompts.modes().count(), 5);
        assert_eq!(dialect.enable_command, "enable");
        assert_eq!(dialect.persist_command, "write memory");
    }

    #[test]
    fn test_exec_prompts() {
        let spec = dialect().prompts;
        assert_eq!(spec.classify("R1>"), Some(Mode::UserExec));
        assert_eq!(spec.classify("\nR1> "), Some(Mode::UserExec));
        assert_eq!(spec.classify("core-rtr.lab#"), Some(Mode::PrivilegedExec));
    }

    #[test]
    fn test_config_prompts_never_classify_as_privileged() {
        let spec = dialect().prompts;
        assert_eq!(spec.classify("R1(config)#"), Some(Mode::GlobalConfig));
        assert_eq!(
            spec.classify("R1(config-if)#"),
            Some(Mode::SubConfig(SubMode::Interface))
        );
        assert_eq!(
            spec.classify("R1(config-subif)#"),
            Some(Mode::SubConfig(SubMode::Interface))
        );
        assert_eq!(
            spec.classify("R1(config-router)#"),
            Some(Mode::SubConfig(SubMode::Router))
        );
        assert!(!spec.get(Mode::PrivilegedExec).unwrap().matches("R1(config)#"));
    }

    #[test]
    fn test_output_lines_are_not_prompts() {
        let spec = dialect().prompts;
        assert_eq!(spec.classify("hostname R1"), None);
        assert_eq!(spec.classify(" ip address 10.0.0.1 255.255.255.0"), None);
        assert_eq!(spec.classify("interface Loopback0"), None);
    }

    #[test]
    fn test_login_and_pagination_patterns() {
        let spec = dialect().prompts;
        assert!(spec.username.is_match(b"\r\nUser Access Verification\n\nUsername: "));
        assert!(spec.password.is_match(b"Password: "));
        assert!(spec.pagination.is_match(b"interface Loopback0\n --More-- "));
    }

    #[test]
    fn test_denial_patterns() {
        let dialect = dialect();
        assert!(dialect.enable_denied[0].is_match(b"% Access denied\n"));
        assert!(dialect.enable_denied[0].is_match(b"% Bad secrets\n"));
        assert!(dialect.login_denied[0].is_match(b"% Login invalid\n"));
    }
}
