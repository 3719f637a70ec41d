//! Session lifecycle: connection state, periodic tasks and their teardown.

pub mod clock;
pub mod connection;
pub mod scheduler;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use connection::{ConnectionState, SessionKey, TransitionError};
pub use scheduler::{PreparedWithdraw, Scheduler, SessionError, WithdrawAmount};
pub use session::{BalanceView, Session, SessionCore, SharedCore, StreamView};
