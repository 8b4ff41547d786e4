//! Passenger booking types.

use super::{RouteId, ServiceDate};

/// Lifecycle status of a booking. Only confirmed bookings count anywhere
/// in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

impl BookingStatus {
    /// Whether the passenger is actually expected on the bus.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }

    /// Parse the wire-format token used by the booking subsystem.
    /// Unknown tokens are treated as pending, never as confirmed.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" | "canceled" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }
}

/// A passenger riding a specific route on a specific date.
///
/// The boarding stop is free text as entered at booking time, not a
/// foreign key into any route's stop list; reconciling it against stop
/// lists is the matcher's job.
#[derive(Debug, Clone)]
pub struct Booking {
    pub student_id: String,
    pub student_name: String,
    pub roll_number: String,
    pub route: RouteId,
    pub date: ServiceDate,
    pub boarding_stop: String,
    pub status: BookingStatus,
}

impl Booking {
    /// Create a confirmed booking.
    pub fn confirmed(
        student_id: impl Into<String>,
        student_name: impl Into<String>,
        roll_number: impl Into<String>,
        route: RouteId,
        date: ServiceDate,
        boarding_stop: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            student_name: student_name.into(),
            roll_number: roll_number.into(),
            route,
            date,
            boarding_stop: boarding_stop.into(),
            status: BookingStatus::Confirmed,
        }
    }
}
