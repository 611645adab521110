//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Every request (in_flight.rs):
//!     enter → guard held for the request → drop = exit
//!
//! Shutdown (shutdown.rs):
//!     Running → signal → Draining (listener closed) → in-flight reaches 0
//!     or timeout → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → begin drain
//!     second SIGTERM/SIGINT → force stop
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: forced exit after deadline
//! - In-progress requests are never cancelled when draining starts

pub mod in_flight;
pub mod shutdown;
pub mod signals;

pub use in_flight::{InFlight, InFlightGuard};
pub use shutdown::{DrainOutcome, Phase, ShutdownCoordinator};
