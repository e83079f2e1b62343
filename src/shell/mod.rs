//! # UI Shell
//!
//! Presentational glue: the keypad grid, the display box, and the landing
//! page around them. Everything renders to plain text.
//!
//! ```text
//!     shell/
//!     ├── mod.rs          (Shell: display + keypad driving the engine)
//!     ├── keypad.rs       (button grid)
//!     └── landing.rs      (landing page copy and layout)
//! ```

mod keypad;
mod landing;

pub use keypad::{Button, ButtonVariant, Keypad, COLUMNS, ROWS};
pub use landing::{LandingPage, SUBTITLE, TITLE};

use crate::calculator::{Calculator, Input};
use crate::error::UnknownInput;

/// Calculator widget: a [`Calculator`] wired to the [`Keypad`].
///
/// ```rust
/// use kalkulator::Shell;
///
/// let mut shell = Shell::new();
/// for label in ["7", "+", "3", "="] {
///     shell.press_label(label).unwrap();
/// }
/// assert_eq!(shell.display(), "10");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Shell {
    calculator: Calculator,
    keypad: Keypad,
}

impl Shell {
    /// Widget showing `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Presses the button with `label`. ASCII stand-ins such as `*` and `/`
    /// are accepted too. Returns the new display text.
    ///
    /// # Errors
    ///
    /// [`UnknownInput`] when the label matches no key; state is unchanged.
    pub fn press_label(&mut self, label: &str) -> Result<&str, UnknownInput> {
        let input = match self.keypad.find(label) {
            Some(button) => button.input,
            None => label.parse()?,
        };

        Ok(self.press(input))
    }

    /// Sends an input to the engine and returns the new display text.
    pub fn press(&mut self, input: Input) -> &str {
        self.calculator.press(input);
        self.calculator.display()
    }

    /// Current display text.
    pub fn display(&self) -> &str {
        self.calculator.display()
    }

    /// Underlying engine.
    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// The keypad.
    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// Display box stacked on the keypad grid.
    pub fn render(&self) -> String {
        let width = self.keypad.render_width();
        let inner = width - 4;

        // Overlong values are cut at the end, like a truncated text box
        let shown: String = if self.display().chars().count() > inner {
            let mut cut: String = self.display().chars().take(inner - 1).collect();
            cut.push('…');
            cut
        } else {
            self.display().to_string()
        };

        let border = "─".repeat(width - 2);
        format!(
            "╭{border}╮\n│ {shown:>inner$} │\n╰{border}╯\n{grid}",
            border = border,
            shown = shown,
            inner = inner,
            grid = self.keypad.render(),
        )
    }
}
