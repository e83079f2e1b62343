//! # Calculator
//!
//! ```text
//!     calculator/
//!     ├── mod.rs          (module organization)
//!     ├── engine.rs       (state machine)
//!     ├── input.rs        (key presses and label parsing)
//!     └── operator.rs     (arithmetic and number formatting)
//! ```

mod engine;
mod input;
mod operator;

pub use engine::{Calculator, Phase, ERROR_DISPLAY};
pub use input::Input;
pub use operator::Operator;
