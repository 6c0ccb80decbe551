pub mod availability;
pub mod availability_rule;
pub mod blocked_interval;
pub mod booking;
pub mod booking_management;
pub mod health;
pub mod session_type;
pub mod therapist;
