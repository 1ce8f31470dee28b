pub mod product;
pub mod reservation;
