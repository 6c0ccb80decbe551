pub mod therapist;
pub mod availability_rule;
pub mod blocked_interval;
pub mod session_type;
pub mod booking;
pub mod job;
