//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Centralized stylesheet for CLI output colors.
#[derive(Default, Clone)]
pub struct Styles {
    /// Passed checks and completed steps (green)
    pub success: Style,
    /// Teardown problems and retries (yellow)
    pub warning: Style,
    /// Failed checks and lifecycle errors (red)
    pub error: Style,
    /// Step progress (cyan)
    pub info: Style,
    /// Dimmed/secondary text
    pub dim: Style,
    /// Scenario titles
    pub header: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.info = Style::new().cyan();
        self.dim = Style::new().dimmed();
        self.header = Style::new().bold().cyan();
    }
}
