//! Landing page: heading, tagline and the calculator widget, centred.

use super::Shell;

/// Page heading.
pub const TITLE: &str = "Kalkulator Modern";

/// Tagline under the heading.
pub const SUBTITLE: &str =
    "Kalkulator dengan desain glass morphism yang elegan dan smooth animations";

/// Landing page copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingPage {
    /// Heading
    pub title: String,
    /// Tagline
    pub subtitle: String,
}

impl Default for LandingPage {
    fn default() -> Self {
        Self {
            title: TITLE.to_string(),
            subtitle: SUBTITLE.to_string(),
        }
    }
}

impl LandingPage {
    /// Page with the stock copy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Heading, tagline, a blank line, then the widget; every line centred
    /// on the widest one.
    pub fn render(&self, shell: &Shell) -> String {
        let widget = shell.render();
        let mut lines = vec![self.title.as_str(), self.subtitle.as_str(), ""];
        lines.extend(widget.lines());

        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        lines
            .iter()
            .map(|line| format!("{:^width$}", line, width = width).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_copy() {
        let page = LandingPage::new();
        assert_eq!(page.title, "Kalkulator Modern");
        assert!(page.subtitle.starts_with("Kalkulator dengan desain"));
    }

    #[test]
    fn test_render_layout() {
        let page = LandingPage::new();
        let shell = Shell::new();
        let rendered = page.render(&shell);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0].trim(), TITLE);
        assert_eq!(lines[1], SUBTITLE);
        assert_eq!(lines[2], "");
        assert!(lines[3].trim_start().starts_with('╭'));

        // Title is centred against the tagline
        let indent = lines[0].len() - lines[0].trim_start().len();
        assert_eq!(indent, (SUBTITLE.chars().count() - TITLE.chars().count()) / 2);
    }
}
