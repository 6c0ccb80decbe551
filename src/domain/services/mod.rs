pub mod availability;
pub mod calendar;
pub mod policy;
pub mod reservation;
pub mod slots;
