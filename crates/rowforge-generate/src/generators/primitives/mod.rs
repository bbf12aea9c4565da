use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::{Rng, RngCore};

use rowforge_core::Backend;

use crate::faker_rs::random_bytes;
use crate::generators::GeneratedValue;

/// 2^63: signed 64-bit magnitude used for warehouse integers and `bigint`.
pub const INT64_RANGE: f64 = 9_223_372_036_854_775_808.0;
pub const MYSQL_INT_RANGE: f64 = 2_147_483_647.0;
/// 2^31.
pub const POSTGRES_INT_RANGE: f64 = 2_147_483_648.0;
/// Largest magnitude of a warehouse NUMERIC (29 integer digits).
pub const NUMERIC_RANGE: f64 = 9.999_999_999_999_999_999_999_999_999_9e28;
/// Largest magnitude of a warehouse BIGNUMERIC.
pub const BIG_NUMERIC_RANGE: f64 = 5.789_604_461_865_809_771_178_549_250_434_395_392_663e38;

const ENCODED_BYTES_LEN: usize = 16;
const RAW_BYTES_LEN: usize = 10;

pub fn integer(backend: Backend, rng: &mut dyn RngCore) -> GeneratedValue {
    let bound = match backend {
        Backend::Bigquery => INT64_RANGE,
        Backend::Mysql => MYSQL_INT_RANGE,
        Backend::Postgresql => POSTGRES_INT_RANGE,
    };
    GeneratedValue::Int(truncated_uniform(bound, rng))
}

pub fn bigint(rng: &mut dyn RngCore) -> GeneratedValue {
    GeneratedValue::Int(truncated_uniform(INT64_RANGE, rng))
}

pub fn big_numeric(rng: &mut dyn RngCore) -> GeneratedValue {
    GeneratedValue::Float(rng.random_range(-BIG_NUMERIC_RANGE..BIG_NUMERIC_RANGE))
}

/// Warehouse numerics span the NUMERIC range; the row stores draw from `[0, 1)`.
pub fn numeric(backend: Backend, rng: &mut dyn RngCore) -> GeneratedValue {
    match backend {
        Backend::Bigquery => GeneratedValue::Float(rng.random_range(-NUMERIC_RANGE..NUMERIC_RANGE)),
        Backend::Mysql | Backend::Postgresql => unit_float(rng),
    }
}

pub fn unit_float(rng: &mut dyn RngCore) -> GeneratedValue {
    GeneratedValue::Float(rng.random_range(0.0..1.0))
}

pub fn boolean(rng: &mut dyn RngCore) -> GeneratedValue {
    GeneratedValue::Bool(rng.random_bool(0.5))
}

/// `width` characters of `0`/`1`.
pub fn bits(width: u32, rng: &mut dyn RngCore) -> GeneratedValue {
    let value = (0..width)
        .map(|_| if rng.random_bool(0.5) { '1' } else { '0' })
        .collect();
    GeneratedValue::Text(value)
}

/// MySQL binds raw bytes; the other backends take base64 text.
pub fn bytes(backend: Backend, rng: &mut dyn RngCore) -> GeneratedValue {
    match backend {
        Backend::Mysql => GeneratedValue::Bytes(random_bytes(rng, RAW_BYTES_LEN)),
        Backend::Bigquery | Backend::Postgresql => {
            GeneratedValue::Text(BASE64.encode(random_bytes(rng, ENCODED_BYTES_LEN)))
        }
    }
}

fn truncated_uniform(bound: f64, rng: &mut dyn RngCore) -> i64 {
    rng.random_range(-bound..bound).trunc() as i64
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn bit_strings_have_requested_width() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for width in [1, 8, 64] {
            let GeneratedValue::Text(value) = bits(width, &mut rng) else {
                panic!("bits must be text");
            };
            assert_eq!(value.len(), width as usize);
            assert!(value.chars().all(|ch| ch == '0' || ch == '1'));
        }
    }

    #[test]
    fn bytes_differ_per_backend() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert!(matches!(bytes(Backend::Mysql, &mut rng), GeneratedValue::Bytes(raw) if raw.len() == RAW_BYTES_LEN));
        let GeneratedValue::Text(encoded) = bytes(Backend::Postgresql, &mut rng) else {
            panic!("postgres bytes must be base64 text");
        };
        assert_eq!(BASE64.decode(encoded).expect("base64").len(), ENCODED_BYTES_LEN);
    }

    #[test]
    fn row_store_numerics_stay_in_unit_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        for _ in 0..1_000 {
            let value = numeric(Backend::Mysql, &mut rng).as_f64().expect("float");
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn big_numerics_are_finite() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..1_000 {
            let value = big_numeric(&mut rng).as_f64().expect("float");
            assert!(value.is_finite());
            assert!(value.abs() <= BIG_NUMERIC_RANGE);
        }
    }
}
