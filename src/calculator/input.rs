//! Keypad inputs.

use super::operator::Operator;
use crate::error::UnknownInput;
use std::fmt;
use std::str::FromStr;

/// A single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    /// Digit `0`–`9`. Values above 9 are ignored by the engine.
    Digit(u8),
    /// Decimal point
    Decimal,
    /// Operator selection
    Operator(Operator),
    /// `=`
    Equals,
    /// Clear everything
    Clear,
}

impl Input {
    /// Keypad label for this input.
    pub fn label(&self) -> String {
        match self {
            Self::Digit(d) => d.to_string(),
            Self::Decimal => ".".to_string(),
            Self::Operator(op) => op.symbol().to_string(),
            Self::Equals => "=".to_string(),
            Self::Clear => "Clear".to_string(),
        }
    }

    /// Parses a whitespace-separated sequence such as `"7 + 3 ="`.
    ///
    /// ```rust
    /// use kalkulator::{Input, Operator};
    ///
    /// let inputs = Input::parse_sequence("1 . 5 ×").unwrap();
    /// assert_eq!(inputs[3], Input::Operator(Operator::Multiply));
    /// ```
    pub fn parse_sequence(text: &str) -> Result<Vec<Input>, UnknownInput> {
        text.split_whitespace().map(str::parse).collect()
    }
}

impl FromStr for Input {
    type Err = UnknownInput;

    /// Accepts keypad symbols and their ASCII stand-ins
    /// (`-`, `*`, `/`, `C`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();

        let input = match label {
            "." | "," => Self::Decimal,
            "+" => Self::Operator(Operator::Add),
            "-" | "−" => Self::Operator(Operator::Subtract),
            "×" | "*" | "x" => Self::Operator(Operator::Multiply),
            "÷" | "/" => Self::Operator(Operator::Divide),
            "=" => Self::Equals,
            _ if label.eq_ignore_ascii_case("clear") || label.eq_ignore_ascii_case("c") => {
                Self::Clear
            }
            _ => match label.as_bytes() {
                [d @ b'0'..=b'9'] => Self::Digit(d - b'0'),
                _ => return Err(UnknownInput(label.to_string())),
            },
        };

        Ok(input)
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
