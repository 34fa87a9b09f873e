//! CLI 명령 구현.

pub mod buy;
pub mod shutdown;

pub use buy::{run_buy, BuyOutcome};
pub use shutdown::shutdown_signal;
