pub mod health;
pub mod transaction;

pub use health::health;
pub use transaction::{create_transaction, method_not_allowed};
