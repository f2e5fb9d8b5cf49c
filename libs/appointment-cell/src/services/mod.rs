pub mod booking;
pub mod conflict;
pub mod query;

pub use booking::AppointmentBookingService;
pub use conflict::ConflictDetectionService;
pub use query::AppointmentQueryService;
