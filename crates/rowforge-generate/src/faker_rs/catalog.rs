use std::fmt;

use chrono::{DateTime, NaiveDateTime, NaiveTime};
use fake::Fake;
use rand::{Rng, RngCore};

use crate::errors::GenerationError;
use crate::faker_rs::land::{LandLocation, random_location};
use crate::faker_rs::locales::LocaleKey;
use crate::generators::GeneratedValue;

/// Length of the blobs produced by the `binary` capability.
pub const BINARY_LENGTH: usize = 16;

/// Upper bound (2025-12-31T23:59:59Z) for generated date/times, starting at the epoch.
const DATE_TIME_MAX_SECONDS: i64 = 1_767_225_599;

const SECONDS_PER_DAY: u32 = 86_400;

type Producer = fn(&mut dyn RngCore, LocaleKey) -> GeneratedValue;

/// A named zero-argument fake-data producer.
pub struct Capability {
    pub name: &'static str,
    produce: Producer,
}

impl Capability {
    const fn new(name: &'static str, produce: Producer) -> Self {
        Self { name, produce }
    }

    pub fn produce(&self, locale: LocaleKey, rng: &mut dyn RngCore) -> GeneratedValue {
        (self.produce)(rng, locale)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability").field("name", &self.name).finish()
    }
}

/// Render a `fake` faker in the requested locale.
macro_rules! localized {
    ($module:ident :: $faker:ident ( $($arg:expr),* ), $locale:expr, $rng:expr) => {
        match $locale {
            LocaleKey::EnUs => {
                let value: String =
                    fake::faker::$module::raw::$faker(fake::locales::EN $(, $arg)*).fake_with_rng($rng);
                value
            }
            LocaleKey::PtBr => {
                let value: String =
                    fake::faker::$module::raw::$faker(fake::locales::PT_BR $(, $arg)*).fake_with_rng($rng);
                value
            }
        }
    };
}

macro_rules! text_capability {
    ($name:literal, $module:ident :: $faker:ident ( $($arg:expr),* )) => {
        Capability::new($name, |rng, locale| {
            GeneratedValue::Text(localized!($module::$faker($($arg),*), locale, rng))
        })
    };
}

/// Registry order is the lookup order of the substring fallback; keep it sorted.
static CAPABILITIES: &[Capability] = &[
    Capability::new("address", address),
    Capability::new("binary", binary),
    Capability::new("boolean", |rng, _| {
        let value: bool = fake::faker::boolean::raw::Boolean(fake::locales::EN, 50).fake_with_rng(rng);
        GeneratedValue::Bool(value)
    }),
    text_capability!("bs", company::Bs()),
    text_capability!("building_number", address::BuildingNumber()),
    text_capability!("buzzword", company::Buzzword()),
    text_capability!("catch_phrase", company::CatchPhrase()),
    text_capability!("city", address::CityName()),
    text_capability!("city_suffix", address::CitySuffix()),
    text_capability!("color", color::HexColor()),
    text_capability!("company", company::CompanyName()),
    text_capability!("company_suffix", company::CompanySuffix()),
    text_capability!("country", address::CountryName()),
    text_capability!("country_code", address::CountryCode()),
    text_capability!("credit_card_number", creditcard::CreditCardNumber()),
    text_capability!("currency_code", currency::CurrencyCode()),
    text_capability!("currency_name", currency::CurrencyName()),
    text_capability!("currency_symbol", currency::CurrencySymbol()),
    Capability::new("date", |rng, _| {
        GeneratedValue::Date(random_date_time(rng).date())
    }),
    Capability::new("date_time", |rng, _| {
        GeneratedValue::Timestamp(random_date_time(rng))
    }),
    text_capability!("domain_suffix", internet::DomainSuffix()),
    text_capability!("email", internet::FreeEmail()),
    text_capability!("file_extension", filesystem::FileExtension()),
    text_capability!("file_name", filesystem::FileName()),
    text_capability!("file_path", filesystem::FilePath()),
    text_capability!("first_name", name::FirstName()),
    text_capability!("free_email", internet::FreeEmail()),
    text_capability!("geohash", address::Geohash(8)),
    text_capability!("hex_color", color::HexColor()),
    Capability::new("hostname", |rng, locale| GeneratedValue::Text(hostname(rng, locale))),
    text_capability!("http_status_code", http::RfcStatusCode()),
    text_capability!("industry", company::Industry()),
    text_capability!("ip_address", internet::IP()),
    text_capability!("ipv4", internet::IPv4()),
    text_capability!("ipv6", internet::IPv6()),
    text_capability!("isbn10", barcode::Isbn10()),
    text_capability!("isbn13", barcode::Isbn13()),
    text_capability!("job", job::Title()),
    text_capability!("job_field", job::Field()),
    text_capability!("last_name", name::LastName()),
    Capability::new("latitude", |rng, _| GeneratedValue::Float(latitude(rng))),
    Capability::new("license_plate", |rng, _| {
        let value: String =
            fake::faker::automotive::raw::LicencePlate(fake::locales::FR_FR).fake_with_rng(rng);
        GeneratedValue::Text(value)
    }),
    Capability::new("location_on_land", |rng, _| {
        let location = random_location(rng);
        GeneratedValue::Text(format!(
            "{}, {}, {}, {}, {}",
            location.latitude,
            location.longitude,
            location.place,
            location.country_code,
            location.timezone
        ))
    }),
    Capability::new("longitude", |rng, _| GeneratedValue::Float(longitude(rng))),
    text_capability!("mac_address", internet::MACAddress()),
    text_capability!("mime_type", filesystem::MimeType()),
    text_capability!("name", name::Name()),
    text_capability!("paragraph", lorem::Paragraph(3..6)),
    text_capability!("password", internet::Password(8..20)),
    text_capability!("phone_number", phone_number::PhoneNumber()),
    text_capability!("position", job::Position()),
    text_capability!("postcode", address::PostCode()),
    text_capability!("prefix", name::Title()),
    text_capability!("profession", company::Profession()),
    text_capability!("rgb_color", color::RgbColor()),
    text_capability!("safe_email", internet::SafeEmail()),
    text_capability!("secondary_address", address::SecondaryAddress()),
    text_capability!("seniority", job::Seniority()),
    text_capability!("sentence", lorem::Sentence(4..10)),
    text_capability!("state", address::StateName()),
    text_capability!("state_abbr", address::StateAbbr()),
    Capability::new("street_address", |rng, locale| {
        let number = localized!(address::BuildingNumber(), locale, rng);
        let street = localized!(address::StreetName(), locale, rng);
        GeneratedValue::Text(format!("{number} {street}"))
    }),
    text_capability!("street_name", address::StreetName()),
    text_capability!("street_suffix", address::StreetSuffix()),
    text_capability!("suffix", name::Suffix()),
    text_capability!("text", lorem::Paragraph(1..4)),
    Capability::new("time", |rng, _| GeneratedValue::Time(random_time(rng))),
    text_capability!("timezone", address::TimeZone()),
    Capability::new("url", |rng, locale| {
        GeneratedValue::Text(format!("https://www.{}/", hostname(rng, locale)))
    }),
    text_capability!("user_agent", internet::UserAgent()),
    text_capability!("user_name", internet::Username()),
    Capability::new("uuid4", |rng, _| {
        let mut bytes = [0_u8; 16];
        rng.fill_bytes(&mut bytes);
        GeneratedValue::Text(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
    }),
    text_capability!("word", lorem::Word()),
    text_capability!("zipcode", address::ZipCode()),
];

/// Fake-data provider exposing a finite, enumerable set of named capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakerCatalog {
    locale: LocaleKey,
}

impl FakerCatalog {
    pub fn new(locale: LocaleKey) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> LocaleKey {
        self.locale
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        CAPABILITIES
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        CAPABILITIES.iter().map(|capability| capability.name)
    }

    pub fn get(&self, name: &str) -> Option<&'static Capability> {
        CAPABILITIES.iter().find(|capability| capability.name == name)
    }

    /// First capability, in registry order, whose name occurs inside `column`.
    pub fn find_in(&self, column: &str) -> Option<&'static Capability> {
        CAPABILITIES
            .iter()
            .find(|capability| column.contains(capability.name))
    }

    pub fn produce(
        &self,
        name: &str,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let capability = self
            .get(name)
            .ok_or_else(|| GenerationError::UnknownCapability(name.to_string()))?;
        Ok(capability.produce(self.locale, rng))
    }

    pub fn location_on_land(&self, rng: &mut dyn RngCore) -> &'static LandLocation {
        random_location(rng)
    }

    pub fn phone_number(&self, rng: &mut dyn RngCore) -> String {
        localized!(phone_number::PhoneNumber(), self.locale, rng)
    }

    pub fn text(&self, rng: &mut dyn RngCore) -> String {
        localized!(lorem::Paragraph(1..4), self.locale, rng)
    }

    pub fn ipv4(&self, rng: &mut dyn RngCore) -> String {
        localized!(internet::IPv4(), self.locale, rng)
    }

    pub fn ipv6(&self, rng: &mut dyn RngCore) -> String {
        localized!(internet::IPv6(), self.locale, rng)
    }

    pub fn date_time(&self, rng: &mut dyn RngCore) -> NaiveDateTime {
        random_date_time(rng)
    }

    pub fn time(&self, rng: &mut dyn RngCore) -> NaiveTime {
        random_time(rng)
    }

    pub fn latitude(&self, rng: &mut dyn RngCore) -> f64 {
        latitude(rng)
    }

    pub fn longitude(&self, rng: &mut dyn RngCore) -> f64 {
        longitude(rng)
    }

    pub fn binary(&self, rng: &mut dyn RngCore) -> Vec<u8> {
        random_bytes(rng, BINARY_LENGTH)
    }
}

pub(crate) fn random_bytes(rng: &mut dyn RngCore, len: usize) -> Vec<u8> {
    let mut bytes = vec![0_u8; len];
    rng.fill_bytes(&mut bytes);
    bytes
}

fn address(rng: &mut dyn RngCore, locale: LocaleKey) -> GeneratedValue {
    let number = localized!(address::BuildingNumber(), locale, rng);
    let street = localized!(address::StreetName(), locale, rng);
    let city = localized!(address::CityName(), locale, rng);
    let state = localized!(address::StateAbbr(), locale, rng);
    let zip = localized!(address::ZipCode(), locale, rng);
    GeneratedValue::Text(format!("{number} {street}, {city}, {state} {zip}"))
}

fn binary(rng: &mut dyn RngCore, _locale: LocaleKey) -> GeneratedValue {
    GeneratedValue::Bytes(random_bytes(rng, BINARY_LENGTH))
}

/// `word.suffix`, lower-cased and stripped to DNS label characters.
fn hostname(rng: &mut dyn RngCore, locale: LocaleKey) -> String {
    let word = localized!(lorem::Word(), locale, rng);
    let suffix = localized!(internet::DomainSuffix(), locale, rng);
    let label: String = word
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect();
    let label = if label.is_empty() { "host".to_string() } else { label };
    format!("{label}.{suffix}")
}

fn random_date_time(rng: &mut dyn RngCore) -> NaiveDateTime {
    let seconds = rng.random_range(0..=DATE_TIME_MAX_SECONDS);
    DateTime::from_timestamp(seconds, 0)
        .map(|value| value.naive_utc())
        .unwrap_or_default()
}

fn random_time(rng: &mut dyn RngCore) -> NaiveTime {
    let seconds = rng.random_range(0..SECONDS_PER_DAY);
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default()
}

fn latitude(rng: &mut dyn RngCore) -> f64 {
    round_coordinate(rng.random_range(-90.0..=90.0))
}

fn longitude(rng: &mut dyn RngCore) -> f64 {
    round_coordinate(rng.random_range(-180.0..=180.0))
}

fn round_coordinate(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
