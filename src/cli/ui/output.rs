use console::style;

use crate::pipeline::StageKind;

#[derive(Debug, Clone, Copy)]
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Suppresses informational lines; errors and warnings still print
    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    pub fn section(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold());
            println!("{}", "─".repeat(40));
        }
    }

    pub fn item(&self, label: &str, text: &str) {
        if !self.quiet {
            println!("  {} {}", style(label).cyan(), text);
        }
    }

    /// Stage change notification
    pub fn stage(&self, stage: StageKind) {
        if self.quiet {
            return;
        }
        let marker = match stage {
            StageKind::Complete => style("●").green(),
            StageKind::Failed => style("●").red(),
            StageKind::GateBlocked => style("●").yellow(),
            _ => style("●").dim(),
        };
        println!("{} {}", marker, style(stage).bold());
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
