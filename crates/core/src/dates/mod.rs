pub mod aggregate;
pub mod model;
pub mod store;

pub use aggregate::{aggregate_interest, interested_count};
pub use model::{BookedDate, TravelDate, TravelDateAvailability};
pub use store::{PgTravelDateStore, StoreError, TravelDateStore};
