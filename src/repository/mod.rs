pub mod admin_repo;
pub mod bus_repo;
pub mod errors;
pub mod location_repo;
pub mod route_repo;
pub mod trip_repo;

pub use admin_repo::AdminRepository;
pub use bus_repo::BusRepository;
pub use errors::check_duplicate_error;
pub use location_repo::LocationRepository;
pub use route_repo::RouteRepository;
pub use trip_repo::TripRepository;
