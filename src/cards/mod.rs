//! Card system: instances and the filter vocabulary triggers use.
//!
//! ## Key Types
//!
//! - `CardInstance`: Runtime card state (zone, owner, controller, SVars)
//! - `CardType`: Types a filter can select on
//! - `CardFilter`, `PlayerFilter`, `Comparison`: parsed declaration values

pub mod filter;
pub mod instance;

pub use filter::{CardFilter, CmpOp, Comparison, PlayerFilter};
pub use instance::{CardInstance, CardType};
