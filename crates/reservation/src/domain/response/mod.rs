pub mod api;
pub mod product;
pub mod reservation;
