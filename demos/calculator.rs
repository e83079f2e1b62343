//! Calculator widget demo.
//!
//! Pass key labels as arguments (`cargo run --example calculator -- 7 + 3 =`)
//! or run without arguments for a few canned sequences.

use kalkulator::{App, AppConfig, Calculator, Input};
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        canned_sequences();
        return;
    }

    let mut app = match App::new(AppConfig::default()) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("invalid configuration: {}", err);
            return;
        }
    };

    for label in &args {
        if let Err(err) = app.shell_mut().press_label(label) {
            eprintln!("{}", err);
        }
    }

    println!("{}", app.render_landing());
}

fn canned_sequences() {
    println!("=== Calculator Example ===\n");

    for sequence in ["7 + 3 =", "1 . 1 + 1 . 9 =", "5 ÷ 0 =", "2 × 3 + 4 =", "9 − 1 2 ="] {
        let mut calc = Calculator::new();

        match Input::parse_sequence(sequence) {
            Ok(inputs) => {
                calc.press_all(inputs);
                println!("   {:<18} → {}", sequence, calc.display());
            }
            Err(err) => println!("   {:<18} → {}", sequence, err),
        }
    }
}
