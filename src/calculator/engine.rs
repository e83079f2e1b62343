//! # Calculator Engine
//!
//! Four-function state machine evaluated strictly left to right, one key at
//! a time. There is no operator precedence: `2 + 3 × 4 =` is `20`.
//!
//! ```text
//!                 digit / "."
//!         ┌──────────────────────────┐
//!         ▼                          │
//!    Accumulating ──── operator ───► AwaitingOperand
//!         ▲                          │   │
//!         │           "="            │   │ operator (re-selects)
//!         └── digit ◄────────────────┘ ◄─┘
//! ```

use super::input::Input;
use super::operator::{format_number, parse_operand, Operator};
use tracing::debug;

/// Display text shown after a division by zero.
pub const ERROR_DISPLAY: &str = "Error";

/// What the next digit will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Digits extend the shown operand
    Accumulating,
    /// The next digit starts a new operand
    AwaitingOperand,
}

/// Calculator state.
///
/// The display is kept as text so partial input like `"5."` survives.
///
/// ```rust
/// use kalkulator::{Calculator, Input};
///
/// let mut calc = Calculator::new();
/// calc.press_all(Input::parse_sequence("7 + 3 =").unwrap());
/// assert_eq!(calc.display(), "10");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculator {
    display: String,
    pending_operand: Option<String>,
    pending_operator: Option<Operator>,
    awaiting_operand: bool,
}

impl Default for Calculator {
    fn default() -> Self {
        Self {
            display: "0".to_string(),
            pending_operand: None,
            pending_operator: None,
            awaiting_operand: false,
        }
    }
}

impl Calculator {
    /// Fresh calculator showing `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one input.
    pub fn press(&mut self, input: Input) {
        match input {
            Input::Digit(digit) => self.input_digit(digit),
            Input::Decimal => self.input_decimal(),
            Input::Operator(op) => self.select_operator(op),
            Input::Equals => self.equals(),
            Input::Clear => self.clear(),
        }
    }

    /// Feeds inputs in order.
    pub fn press_all<I>(&mut self, inputs: I)
    where
        I: IntoIterator<Item = Input>,
    {
        for input in inputs {
            self.press(input);
        }
    }

    /// Appends a digit, or starts a new operand with it.
    pub fn input_digit(&mut self, digit: u8) {
        if self.is_error() || digit > 9 {
            return;
        }

        let digit = char::from(b'0' + digit);

        if self.awaiting_operand {
            self.display = digit.to_string();
            self.awaiting_operand = false;
        } else if self.display == "0" {
            self.display = digit.to_string();
        } else {
            self.display.push(digit);
        }
    }

    /// Adds the decimal point; a second one in the same operand is ignored.
    pub fn input_decimal(&mut self) {
        if self.is_error() {
            return;
        }

        if self.awaiting_operand {
            self.display = "0.".to_string();
            self.awaiting_operand = false;
        } else if !self.display.contains('.') {
            self.display.push('.');
        }
    }

    /// Chooses the next operation, first resolving any pending one.
    pub fn select_operator(&mut self, op: Operator) {
        if self.is_error() {
            return;
        }

        match (self.pending_operand.as_deref(), self.pending_operator) {
            (None, _) => {
                self.pending_operand = Some(self.display.clone());
            }
            (Some(first), Some(pending)) => {
                let Some(result) = evaluate(first, &self.display, pending) else {
                    self.fail();
                    return;
                };
                self.pending_operand = Some(result.clone());
                self.display = result;
            }
            // Operand without operator does not occur; keep the operand
            (Some(_), None) => {}
        }

        self.pending_operator = Some(op);
        self.awaiting_operand = true;
    }

    /// Resolves the pending operation. No-op when nothing is pending.
    pub fn equals(&mut self) {
        if self.is_error() {
            return;
        }

        let (Some(first), Some(op)) = (self.pending_operand.as_deref(), self.pending_operator)
        else {
            return;
        };

        match evaluate(first, &self.display, op) {
            Some(result) => {
                self.display = result;
                self.pending_operand = None;
                self.pending_operator = None;
                self.awaiting_operand = true;
            }
            None => self.fail(),
        }
    }

    /// Back to `0` with nothing pending. The only way out of the error state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn fail(&mut self) {
        debug!("Division by zero; calculator locked until clear");
        self.display = ERROR_DISPLAY.to_string();
        self.pending_operand = None;
        self.pending_operator = None;
        self.awaiting_operand = true;
    }

    /// Text currently shown.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Stored first operand, if an operation is pending.
    pub fn pending_operand(&self) -> Option<&str> {
        self.pending_operand.as_deref()
    }

    /// Selected but unresolved operator.
    pub fn pending_operator(&self) -> Option<Operator> {
        self.pending_operator
    }

    /// Whether the next digit appends or replaces.
    pub fn phase(&self) -> Phase {
        if self.awaiting_operand {
            Phase::AwaitingOperand
        } else {
            Phase::Accumulating
        }
    }

    /// `true` while the display shows [`ERROR_DISPLAY`].
    pub fn is_error(&self) -> bool {
        self.display == ERROR_DISPLAY
    }
}

fn evaluate(first: &str, second: &str, op: Operator) -> Option<String> {
    op.apply(parse_operand(first), parse_operand(second))
        .map(format_number)
}
