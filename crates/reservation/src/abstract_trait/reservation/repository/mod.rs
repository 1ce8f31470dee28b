mod command;
mod query;

pub use self::command::{
    DynReservationCommandRepository, ReservationCommandRepositoryTrait, ReserveCommand,
    ReserveOutcome,
};
pub use self::query::{DynReservationQueryRepository, ReservationQueryRepositoryTrait};
