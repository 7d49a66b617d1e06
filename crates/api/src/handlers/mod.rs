pub mod bookings;
pub mod catalog;
pub mod forms;
pub mod relay;
