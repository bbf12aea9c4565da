use rand::{Rng, RngCore};

/// A populated place on land, used for geographic point columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub place: &'static str,
    pub country_code: &'static str,
    pub timezone: &'static str,
}

impl LandLocation {
    const fn new(
        latitude: f64,
        longitude: f64,
        place: &'static str,
        country_code: &'static str,
        timezone: &'static str,
    ) -> Self {
        Self {
            latitude,
            longitude,
            place,
            country_code,
            timezone,
        }
    }

    /// `POINT(lon lat)` well-known text.
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }
}

pub const LAND_LOCATIONS: &[LandLocation] = &[
    LandLocation::new(19.07283, 72.88261, "Mumbai", "IN", "Asia/Kolkata"),
    LandLocation::new(28.65195, 77.23149, "Delhi", "IN", "Asia/Kolkata"),
    LandLocation::new(12.97194, 77.59369, "Bengaluru", "IN", "Asia/Kolkata"),
    LandLocation::new(22.56263, 88.36304, "Kolkata", "IN", "Asia/Kolkata"),
    LandLocation::new(13.08784, 80.27847, "Chennai", "IN", "Asia/Kolkata"),
    LandLocation::new(-23.5475, -46.63611, "Sao Paulo", "BR", "America/Sao_Paulo"),
    LandLocation::new(-22.90642, -43.18223, "Rio de Janeiro", "BR", "America/Sao_Paulo"),
    LandLocation::new(-15.77972, -47.92972, "Brasilia", "BR", "America/Sao_Paulo"),
    LandLocation::new(40.71427, -74.00597, "New York City", "US", "America/New_York"),
    LandLocation::new(34.05223, -118.24368, "Los Angeles", "US", "America/Los_Angeles"),
    LandLocation::new(41.85003, -87.65005, "Chicago", "US", "America/Chicago"),
    LandLocation::new(29.76328, -95.36327, "Houston", "US", "America/Chicago"),
    LandLocation::new(43.70011, -79.4163, "Toronto", "CA", "America/Toronto"),
    LandLocation::new(19.42847, -99.12766, "Mexico City", "MX", "America/Mexico_City"),
    LandLocation::new(-34.61315, -58.37723, "Buenos Aires", "AR", "America/Argentina/Buenos_Aires"),
    LandLocation::new(51.50853, -0.12574, "London", "GB", "Europe/London"),
    LandLocation::new(48.85341, 2.3488, "Paris", "FR", "Europe/Paris"),
    LandLocation::new(52.52437, 13.41053, "Berlin", "DE", "Europe/Berlin"),
    LandLocation::new(40.4165, -3.70256, "Madrid", "ES", "Europe/Madrid"),
    LandLocation::new(38.71667, -9.13333, "Lisbon", "PT", "Europe/Lisbon"),
    LandLocation::new(30.06263, 31.24967, "Cairo", "EG", "Africa/Cairo"),
    LandLocation::new(6.45407, 3.39467, "Lagos", "NG", "Africa/Lagos"),
    LandLocation::new(-26.20227, 28.04363, "Johannesburg", "ZA", "Africa/Johannesburg"),
    LandLocation::new(35.6895, 139.69171, "Tokyo", "JP", "Asia/Tokyo"),
    LandLocation::new(31.22222, 121.45806, "Shanghai", "CN", "Asia/Shanghai"),
    LandLocation::new(1.28967, 103.85007, "Singapore", "SG", "Asia/Singapore"),
    LandLocation::new(-6.21462, 106.84513, "Jakarta", "ID", "Asia/Jakarta"),
    LandLocation::new(-33.86785, 151.20732, "Sydney", "AU", "Australia/Sydney"),
];

/// Pick a land location uniformly at random.
pub fn random_location(rng: &mut dyn RngCore) -> &'static LandLocation {
    &LAND_LOCATIONS[rng.random_range(0..LAND_LOCATIONS.len())]
}
