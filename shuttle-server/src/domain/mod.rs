//! Domain types for the transfer optimization engine.
//!
//! This module contains the core domain model types for routes, stops,
//! bookings and transfer results. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod booking;
mod date;
mod route;
mod stop;
mod transfer;

pub use booking::{Booking, BookingStatus};
pub use date::{InvalidServiceDate, ServiceDate};
pub use route::{InvalidRouteId, Route, RouteId, RouteStatus};
pub use stop::{Stop, StopCategory, StopId};
pub use transfer::{MatchConfidence, PassengerTransfer, TransferClassification};
