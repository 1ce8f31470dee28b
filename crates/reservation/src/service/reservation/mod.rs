mod command;
mod query;

pub use self::command::ReservationCommandService;
pub use self::query::ReservationQueryService;
