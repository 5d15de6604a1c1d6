pub mod activity;
pub mod collaborator;
pub mod collection;
pub mod day;
pub mod friendship;
pub mod session;
pub mod trip;
pub mod user;
