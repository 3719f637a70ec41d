pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod presentation;

pub use config::{Config, SessionConfig};
pub use datasource::{
    ChainDataSource, DataSourceError, JsonRpcDataSource, MockDataSource, TxHash,
};
pub use domain::{Address, Amount, Decimal, StreamSnapshot, TimeSecs};
pub use engine::{InterpolationEngine, ReconciliationPolicy, StreamDetails};
pub use error::AppError;
pub use orchestration::{Scheduler, SessionError, SessionKey, SystemClock, WithdrawAmount};
pub use presentation::{DisplayState, PresentationFormatter};
