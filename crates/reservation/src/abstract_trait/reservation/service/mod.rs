mod command;
mod query;

pub use self::command::{DynReservationCommandService, ReservationCommandServiceTrait};
pub use self::query::{DynReservationQueryService, ReservationQueryServiceTrait};
