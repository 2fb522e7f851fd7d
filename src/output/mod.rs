mod html;
mod progress;
mod styling;

pub use html::{render, write_report};
pub use progress::PhaseProgress;
pub use styling::{cyan, dim, magenta_bold};

/// Prints the `gatelens` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🚦 gatelens"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Quality Gate Report Generator")
    );
}
