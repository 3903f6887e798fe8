use sqlx::PgPool;

use crate::config::Config;
use crate::repository::{
    AdminRepository, BusRepository, LocationRepository, RouteRepository, TripRepository,
};
use crate::service::ResolutionService;

/// Shared application state: one repository per aggregate plus the
/// resolution service, all cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub routes: RouteRepository,
    pub buses: BusRepository,
    pub trips: TripRepository,
    pub locations: LocationRepository,
    pub admins: AdminRepository,
    pub resolution: ResolutionService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let buses = BusRepository::new(pool.clone());
        let locations = LocationRepository::new(pool.clone());
        let resolution = ResolutionService::new(buses.clone(), locations.clone());

        Self {
            config,
            routes: RouteRepository::new(pool.clone()),
            buses,
            trips: TripRepository::new(pool.clone()),
            locations,
            admins: AdminRepository::new(pool),
            resolution,
        }
    }
}
