pub mod email;
pub mod factory;
pub mod meeting;
pub mod repositories;
