pub mod bulk;
pub mod cv;
pub mod filters;
pub mod handlers;
pub mod repository;
pub mod seed;
pub mod validation;
