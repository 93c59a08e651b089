//! Shell completion generation

use std::io::Write;

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Cli;

/// Write the completion script for `shell` to `out`
pub fn write(shell: Shell, out: &mut dyn Write) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    generate(shell, &mut command, name, out);
}

/// Run the completion command
pub fn run(shell: Shell) {
    write(shell, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_completions_mention_subcommands() {
        let mut buf = Vec::new();
        write(Shell::Bash, &mut buf);

        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("bugmart"));
        assert!(script.contains("listing"));
        assert!(script.contains("currency"));
    }
}
