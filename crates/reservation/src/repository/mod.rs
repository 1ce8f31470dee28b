pub mod product;
pub mod product_cache;
pub mod reservation;
