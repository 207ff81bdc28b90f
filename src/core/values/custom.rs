//! User-defined metrics backed by shell commands.

use std::process::Command;

/// Runs the shell command behind a custom metric key and returns its output
pub trait CommandRunner {
    fn run(&mut self, command: &str) -> String;
}

/// Runs commands through the platform shell and captures trimmed stdout.
///
/// Commands run synchronously on the caller's thread; a slow command stalls
/// the refresh cycle for as long as it takes. Spawn failures and non-zero exit
/// codes are not distinguished from empty output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellCommandRunner;

impl CommandRunner for ShellCommandRunner {
    fn run(&mut self, command: &str) -> String {
        match shell_command(command).output() {
            Ok(output) => {
                if !output.status.success() {
                    log::debug!(
                        "Custom metric command exited with {}: {}",
                        output.status,
                        command
                    );
                }
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            Err(e) => {
                log::debug!("Failed to spawn custom metric command '{}': {}", command, e);
                String::new()
            }
        }
    }
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    use std::os::windows::process::CommandExt;

    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]).creation_flags(0x08000000); // CREATE_NO_WINDOW
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_trimmed_stdout() {
        let mut runner = ShellCommandRunner;
        assert_eq!(runner.run("echo '  42  '"), "42");
    }

    #[test]
    fn test_failing_command_yields_its_output() {
        let mut runner = ShellCommandRunner;
        assert_eq!(runner.run("exit 3"), "");
        assert_eq!(runner.run("echo partial; exit 1"), "partial");
    }
}
