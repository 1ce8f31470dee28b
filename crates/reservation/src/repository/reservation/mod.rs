mod command;
mod query;

pub use self::command::ReservationCommandRepository;
pub use self::query::ReservationQueryRepository;

pub(crate) const RESERVATION_COLUMNS: &str = "reservation_id, user_id, product_id, quantity, \
     status, expires_at, created_at, updated_at";
