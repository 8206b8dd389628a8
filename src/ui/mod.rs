//! Terminal output helpers
//!
//! Styled markers and spinners on a terminal, plain `[OK]`/`[WARN]` lines in
//! CI and when output is piped.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{key_value, key_value_status, section, step_info, step_ok, step_warn_hint};
pub use progress::TaskSpinner;
