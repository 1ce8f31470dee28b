pub mod product;
pub mod reservation;
pub mod sweeper;
