use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::{Cli, CompletionShell};
use crate::error::CliError;

const BIN_NAME: &str = "daybook";

impl CompletionShell {
    const fn shell(self) -> Shell {
        match self {
            Self::Bash => Shell::Bash,
            Self::Zsh => Shell::Zsh,
            Self::Fish => Shell::Fish,
            Self::PowerShell => Shell::PowerShell,
        }
    }

    /// Conventional script name when writing into a directory
    pub const fn script_name(self) -> &'static str {
        match self {
            Self::Bash => "daybook.bash",
            Self::Zsh => "_daybook",
            Self::Fish => "daybook.fish",
            Self::PowerShell => "_daybook.ps1",
        }
    }
}

/// Print the script, or write it to `output_path` (a file or an existing directory).
pub fn run_completions(
    shell: CompletionShell,
    output_path: Option<&Path>,
) -> Result<Option<PathBuf>, CliError> {
    let mut script = Vec::new();
    generate(shell.shell(), &mut Cli::command(), BIN_NAME, &mut script);

    let Some(path) = output_path else {
        io::stdout().write_all(&script)?;
        return Ok(None);
    };

    let target = if path.is_dir() {
        path.join(shell.script_name())
    } else {
        path.to_path_buf()
    };
    std::fs::write(&target, &script)?;
    println!("{}", target.display());
    Ok(Some(target))
}
