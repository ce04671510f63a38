//! Session store, aggregation services and the clock/id collaborator seams.

pub mod ids;
pub mod services;
pub mod store;
pub mod time;

pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use store::{SessionStart, TransactionStore};
pub use time::{Clock, FixedClock, SystemClock};
