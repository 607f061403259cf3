//! Connection setup: pragmas and transaction helpers.

pub mod pragmas;
pub mod transaction;

pub use pragmas::apply_pragmas;
pub use transaction::with_immediate_transaction;
