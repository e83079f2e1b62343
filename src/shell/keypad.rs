//! Button grid of the calculator widget.
//!
//! ```text
//!     col:   0       1       2       3
//!          ┌───────────────┬───────┬───────┐
//!     0    │     Clear     │   ÷   │   ×   │
//!          ├───────┬───────┼───────┼───────┤
//!     1    │   7   │   8   │   9   │   −   │
//!     2    │   4   │   5   │   6   │   +   │
//!     3    │   1   │   2   │   3   │   =   │
//!          ├───────┴───────┼───────┤       │
//!     4    │       0       │   .   │       │
//!          └───────────────┴───────┴───────┘
//! ```

use crate::calculator::{Input, Operator};

/// Number of grid columns.
pub const COLUMNS: u8 = 4;

/// Number of grid rows.
pub const ROWS: u8 = 5;

const CELL_WIDTH: usize = 7;

/// Visual style of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonVariant {
    /// Digits and the decimal point
    Number,
    /// `÷ × − +`
    Operator,
    /// `=`
    Equals,
    /// `Clear`
    Clear,
}

/// One keypad button and where it sits in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    /// Text on the button
    pub label: &'static str,
    /// Input sent when pressed
    pub input: Input,
    /// Style
    pub variant: ButtonVariant,
    /// Top-left row
    pub row: u8,
    /// Top-left column
    pub col: u8,
    /// Columns covered
    pub col_span: u8,
    /// Rows covered
    pub row_span: u8,
}

impl Button {
    const fn new(label: &'static str, input: Input, variant: ButtonVariant, row: u8, col: u8) -> Self {
        Self {
            label,
            input,
            variant,
            row,
            col,
            col_span: 1,
            row_span: 1,
        }
    }

    const fn digit(d: u8, label: &'static str, row: u8, col: u8) -> Self {
        Self::new(label, Input::Digit(d), ButtonVariant::Number, row, col)
    }

    const fn operator(op: Operator, label: &'static str, row: u8, col: u8) -> Self {
        Self::new(label, Input::Operator(op), ButtonVariant::Operator, row, col)
    }

    const fn spanning(mut self, col_span: u8, row_span: u8) -> Self {
        self.col_span = col_span;
        self.row_span = row_span;
        self
    }

    /// Whether the button covers grid cell `(row, col)`.
    pub fn covers(&self, row: u8, col: u8) -> bool {
        (self.row..self.row + self.row_span).contains(&row)
            && (self.col..self.col + self.col_span).contains(&col)
    }
}

static BUTTONS: [Button; 17] = [
    Button::new("Clear", Input::Clear, ButtonVariant::Clear, 0, 0).spanning(2, 1),
    Button::operator(Operator::Divide, "÷", 0, 2),
    Button::operator(Operator::Multiply, "×", 0, 3),
    Button::digit(7, "7", 1, 0),
    Button::digit(8, "8", 1, 1),
    Button::digit(9, "9", 1, 2),
    Button::operator(Operator::Subtract, "−", 1, 3),
    Button::digit(4, "4", 2, 0),
    Button::digit(5, "5", 2, 1),
    Button::digit(6, "6", 2, 2),
    Button::operator(Operator::Add, "+", 2, 3),
    Button::digit(1, "1", 3, 0),
    Button::digit(2, "2", 3, 1),
    Button::digit(3, "3", 3, 2),
    Button::new("=", Input::Equals, ButtonVariant::Equals, 3, 3).spanning(1, 2),
    Button::digit(0, "0", 4, 0).spanning(2, 1),
    Button::new(".", Input::Decimal, ButtonVariant::Number, 4, 2),
];

/// The fixed calculator keypad.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keypad;

impl Keypad {
    /// All buttons in reading order.
    pub fn buttons(&self) -> &'static [Button] {
        &BUTTONS
    }

    /// Button with exactly this label.
    pub fn find(&self, label: &str) -> Option<&'static Button> {
        self.buttons().iter().find(|button| button.label == label)
    }

    /// Button covering grid cell `(row, col)`.
    pub fn button_at(&self, row: u8, col: u8) -> Option<&'static Button> {
        self.buttons().iter().find(|button| button.covers(row, col))
    }

    /// Text rendering of the grid, one line per row.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(ROWS as usize);

        for row in 0..ROWS {
            let mut cells = Vec::new();
            let mut col = 0;

            while col < COLUMNS {
                match self.button_at(row, col) {
                    Some(button) => {
                        let width = CELL_WIDTH * button.col_span as usize
                            + (button.col_span as usize - 1);
                        // Lower half of a tall button is drawn without a label
                        let label = if button.row == row { button.label } else { "" };
                        cells.push(format!("[{:^inner$}]", label, inner = width - 2));
                        col += button.col_span;
                    }
                    None => {
                        cells.push(" ".repeat(CELL_WIDTH));
                        col += 1;
                    }
                }
            }

            lines.push(cells.join(" "));
        }

        lines.join("\n")
    }

    /// Width in characters of a rendered row.
    pub fn render_width(&self) -> usize {
        CELL_WIDTH * COLUMNS as usize + (COLUMNS as usize - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_cell_covered_once() {
        let keypad = Keypad;
        for row in 0..ROWS {
            for col in 0..COLUMNS {
                let covering = keypad
                    .buttons()
                    .iter()
                    .filter(|button| button.covers(row, col))
                    .count();
                assert_eq!(covering, 1, "cell ({}, {})", row, col);
            }
        }
    }

    #[test]
    fn test_layout() {
        let keypad = Keypad;
        assert_eq!(keypad.buttons().len(), 17);
        assert_eq!(keypad.button_at(0, 1).unwrap().label, "Clear");
        assert_eq!(keypad.button_at(4, 3).unwrap().label, "=");
        assert_eq!(keypad.button_at(4, 1).unwrap().label, "0");
        assert_eq!(keypad.button_at(1, 3).unwrap().input, Input::Operator(Operator::Subtract));
    }

    #[test]
    fn test_variants() {
        let keypad = Keypad;
        assert_eq!(keypad.find("Clear").unwrap().variant, ButtonVariant::Clear);
        assert_eq!(keypad.find("=").unwrap().variant, ButtonVariant::Equals);
        assert_eq!(keypad.find("÷").unwrap().variant, ButtonVariant::Operator);
        assert_eq!(keypad.find(".").unwrap().variant, ButtonVariant::Number);
        assert!(keypad.find("%").is_none());
    }

    #[test]
    fn test_render() {
        let keypad = Keypad;
        let rendered = keypad.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), ROWS as usize);
        for line in &lines {
            assert_eq!(line.chars().count(), keypad.render_width());
        }
        assert!(lines[0].starts_with("[    Clear    ]"));
        assert!(lines[3].ends_with("[  =  ]"));
        assert!(lines[4].starts_with("[      0      ]"));
        assert!(lines[4].ends_with("[  .  ] [     ]"));
    }
}
