pub mod appointment;
pub mod doctor;
pub mod error;
pub mod scheduling;

pub use appointment::{Appointment, NewAppointment};
pub use doctor::{Doctor, NewDoctor, WorkingHours, WorkingHoursError, WorkingWindow};
pub use error::{AppError, SchedulingError};
pub use scheduling::{AppointmentType, DurationTable, SchedulingConfig};
