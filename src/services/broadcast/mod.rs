//! Broadcast fan-out: transport, dispatcher and report aggregation

pub mod dispatcher;
pub mod report;
pub mod transport;

pub use dispatcher::{select_targets, BroadcastDispatcher, DispatchSettings, GroupCheckSummary};
pub use report::{BroadcastJob, TargetResult};
pub use transport::{classify_request_error, DeliveryOutcome, DeliveryTransport, TelegramTransport};
