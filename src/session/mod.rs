pub mod clock;
pub mod coordinator;
pub mod cursor;
pub mod evaluator;
pub mod input;
pub mod ledger;
pub mod timer;

pub use coordinator::{SessionCoordinator, SessionError};
pub use input::EditKey;
