pub mod availability;
pub mod event;
pub mod requests;
pub mod response;
