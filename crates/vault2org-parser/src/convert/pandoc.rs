//! Pandoc subprocess converter

use super::Converter;
use crate::error::ConvertError;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Pandoc input format: Markdown with Obsidian-style `[[target|title]]` links
const FROM_FORMAT: &str = "markdown+wikilinks_title_after_pipe";

/// Converter that shells out to `pandoc`
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: PathBuf,
    extra_args: Vec<String>,
}

impl PandocConverter {
    /// Use the given pandoc executable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    /// Append arguments after the built-in ones
    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--from")
            .arg(FROM_FORMAT)
            .arg("--to")
            .arg("org")
            .arg("--wrap=none")
            .args(&self.extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl Converter for PandocConverter {
    fn name(&self) -> &'static str {
        "pandoc"
    }

    fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
        let program = self.program_name();
        debug!(program = %program, bytes = markdown.len(), "running pandoc");

        let mut child = self.command().spawn().map_err(|source| ConvertError::Spawn {
            program: program.clone(),
            source,
        })?;

        // Feed stdin from a separate thread so a large document cannot
        // deadlock against a full stdout pipe.
        let mut stdin = child.stdin.take();
        let input = markdown.to_string();
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            if let Some(stdin) = stdin.as_mut() {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });

        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("pandoc stdin writer panicked")));

        if !output.status.success() {
            return Err(ConvertError::Failed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        Ok(String::from_utf8(output.stdout)?)
    }
}
