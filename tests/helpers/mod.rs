//! Test helpers module
//!
//! In-memory stand-ins for the relay's ports plus a throwaway SQLite database,
//! so the translator chain and broadcast dispatcher can be driven end to end
//! without Telegram or a translation API.

pub mod database_helper;
pub mod fakes;
pub mod test_data;

pub use database_helper::*;
pub use fakes::*;
pub use test_data::*;
