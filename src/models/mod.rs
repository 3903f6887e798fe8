pub mod admin;
pub mod bus;
pub mod location;
pub mod route;
pub mod trip;

pub use admin::Admin;
pub use bus::{Bus, BusStatus, DailyLocation, GeoPoint};
pub use location::LocationPing;
pub use route::Route;
pub use trip::{Trip, TripStatus};
