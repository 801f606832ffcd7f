//! Colored terminal output for release runs
//!
//! Status lines go to stdout, failures and captured tool output to stderr.

use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    stdout: BufferWriter,
    stderr: BufferWriter,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.quiet)
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(quiet: bool) -> Self {
        Self {
            stdout: BufferWriter::stdout(ColorChoice::Auto),
            stderr: BufferWriter::stderr(ColorChoice::Auto),
            quiet,
        }
    }

    fn styled(
        &self,
        writer: &BufferWriter,
        marker: &str,
        color: Color,
        message: &str,
    ) -> std::io::Result<()> {
        let mut buffer = writer.buffer();
        buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(&mut buffer, "{marker}")?;
        buffer.reset()?;
        writeln!(&mut buffer, " {message}")?;
        writer.print(&buffer)
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.stdout.buffer();
        writeln!(&mut buffer)?;
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        writeln!(&mut buffer, "==> {title}")?;
        buffer.reset()?;
        self.stdout.print(&buffer)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.styled(&self.stdout, "✓", Color::Green, message)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.styled(&self.stdout, "WARNING:", Color::Yellow, message)
    }

    /// Print an error message (always shown)
    pub fn error(&self, message: &str) {
        if self.styled(&self.stderr, "ERROR:", Color::Red, message).is_err() {
            eprintln!("ERROR: {message}");
        }
    }

    /// Echo captured tool output verbatim to stderr (always shown)
    pub fn captured(&self, output: &str) {
        if self.write_captured(output).is_err() {
            eprint!("{output}");
        }
    }

    fn write_captured(&self, output: &str) -> std::io::Result<()> {
        let mut buffer = self.stderr.buffer();
        buffer.write_all(output.as_bytes())?;
        if !output.ends_with('\n') {
            writeln!(&mut buffer)?;
        }
        self.stderr.print(&buffer)
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.stdout.buffer();
        writeln!(&mut buffer, "    {message}")?;
        self.stdout.print(&buffer)
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.stdout.buffer();
        writeln!(&mut buffer, "{message}")?;
        self.stdout.print(&buffer)
    }
}
