use chrono::TimeZone;
use rand::{Rng, RngCore};

use rowforge_core::Backend;

use crate::generators::{GeneratedValue, GeneratorContext};

const MYSQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn latitude(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    GeneratedValue::Float(ctx.catalog.latitude(rng))
}

pub fn longitude(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    GeneratedValue::Float(ctx.catalog.longitude(rng))
}

/// `POINT(lon lat)` of a place on land.
pub fn point(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    GeneratedValue::Text(ctx.catalog.location_on_land(rng).to_wkt())
}

pub fn text(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    GeneratedValue::Text(ctx.catalog.text(rng))
}

pub fn phone(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    GeneratedValue::Text(ctx.catalog.phone_number(rng))
}

pub fn inet(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    let address = if rng.random_bool(0.5) {
        ctx.catalog.ipv4(rng)
    } else {
        ctx.catalog.ipv6(rng)
    };
    GeneratedValue::Text(address)
}

/// MySQL receives timestamps as `YYYY-MM-DD HH:MM:SS` text.
pub fn timestamp(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    let value = ctx.catalog.date_time(rng);
    match ctx.backend {
        Backend::Mysql => GeneratedValue::Text(value.format(MYSQL_TIMESTAMP_FORMAT).to_string()),
        Backend::Bigquery | Backend::Postgresql => GeneratedValue::Timestamp(value),
    }
}

/// A wall-clock date/time read in the run's time zone.
///
/// Wall times skipped by a DST jump are read as UTC instead.
pub fn timestamp_with_zone(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    let naive = ctx.catalog.date_time(rng);
    let local = ctx
        .timezone
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| ctx.timezone.from_utc_datetime(&naive));
    GeneratedValue::TimestampTz(local.fixed_offset())
}

pub fn time(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    GeneratedValue::Time(ctx.catalog.time(rng))
}

#[cfg(test)]
mod tests {
    use chrono_tz::Tz;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::faker_rs::{FakerCatalog, LAND_LOCATIONS};

    fn context(catalog: &FakerCatalog, backend: Backend) -> GeneratorContext<'_> {
        GeneratorContext {
            backend,
            catalog,
            timezone: Tz::Asia__Kolkata,
            row_id: 0,
        }
    }

    #[test]
    fn points_come_from_land_locations() {
        let catalog = FakerCatalog::default();
        let ctx = context(&catalog, Backend::Bigquery);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let GeneratedValue::Text(wkt) = point(&ctx, &mut rng) else {
            panic!("points are text");
        };
        assert!(wkt.starts_with("POINT("));
        assert!(LAND_LOCATIONS.iter().any(|location| location.to_wkt() == wkt));
    }

    #[test]
    fn zoned_timestamps_carry_the_zone_offset() {
        let catalog = FakerCatalog::default();
        let ctx = context(&catalog, Backend::Postgresql);
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let GeneratedValue::TimestampTz(value) = timestamp_with_zone(&ctx, &mut rng) else {
            panic!("expected a zoned timestamp");
        };
        assert_eq!(value.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
    }

    #[test]
    fn mysql_timestamps_are_text() {
        let catalog = FakerCatalog::default();
        let mut rng = ChaCha8Rng::seed_from_u64(29);
        let mysql = timestamp(&context(&catalog, Backend::Mysql), &mut rng);
        let GeneratedValue::Text(value) = mysql else {
            panic!("mysql timestamps are text");
        };
        assert!(chrono::NaiveDateTime::parse_from_str(&value, MYSQL_TIMESTAMP_FORMAT).is_ok());
        assert!(matches!(
            timestamp(&context(&catalog, Backend::Bigquery), &mut rng),
            GeneratedValue::Timestamp(_)
        ));
    }

    #[test]
    fn inet_values_parse_as_addresses() {
        let catalog = FakerCatalog::default();
        let ctx = context(&catalog, Backend::Postgresql);
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        for _ in 0..50 {
            let GeneratedValue::Text(value) = inet(&ctx, &mut rng) else {
                panic!("inet is text");
            };
            assert!(value.parse::<std::net::IpAddr>().is_ok(), "{value}");
        }
    }
}
