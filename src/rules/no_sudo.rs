//! Privilege escalation.

use crate::decision::Decision;
use crate::shell::{command_name, split_commands, tokenize};

/// Deny a command if any of its segments runs under `sudo`.
pub fn check_no_sudo(command: &str) -> Decision {
    let escalates = split_commands(command)
        .iter()
        .any(|segment| command_name(&tokenize(&segment.command)) == Some("sudo"));
    if escalates {
        return Decision::deny(
            "shell.sudo",
            "Blocked: sudo is not allowed. Run commands without elevated privileges.",
        );
    }
    Decision::allow()
}
