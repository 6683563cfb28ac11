//! Monitoring-request validation.
//!
//! Pure, total, side-effect free.  Checks run in a fixed order and stop at
//! the first failure:
//!
//! ```text
//!  presence ─▶ numeric ─▶ latitude range ─▶ longitude range ─▶ interval range
//! ```

use core::fmt;

use serde::Serialize;

use crate::config::ClientConfig;

/// Inclusive latitude bounds (degrees).
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
/// Inclusive longitude bounds (degrees).
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Untrusted form fields exactly as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    pub latitude: String,
    pub longitude: String,
    pub target_id: String,
    /// Blank means "use the configured default interval".
    pub interval: String,
}

impl RawRequest {
    pub fn new(
        latitude: impl Into<String>,
        longitude: impl Into<String>,
        target_id: impl Into<String>,
        interval: impl Into<String>,
    ) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            target_id: target_id.into(),
            interval: interval.into(),
        }
    }
}

/// A request that passed every check.  Immutable once built; the only way
/// to obtain one is through [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringRequest {
    latitude: f64,
    longitude: f64,
    target_id: String,
    interval_secs: u16,
}

impl MonitoringRequest {
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn interval_secs(&self) -> u16 {
        self.interval_secs
    }
}

/// Why a [`RawRequest`] was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingField,
    NotANumber,
    LatitudeOutOfRange,
    LongitudeOutOfRange,
    IntervalOutOfRange,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField => write!(f, "latitude, longitude and bus number are all required"),
            Self::NotANumber => write!(f, "latitude and longitude must be numbers"),
            Self::LatitudeOutOfRange => write!(f, "latitude must be between -90 and 90"),
            Self::LongitudeOutOfRange => write!(f, "longitude must be between -180 and 180"),
            Self::IntervalOutOfRange => write!(f, "update interval is out of range"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate raw form fields against the configured interval bounds.
pub fn validate(
    raw: &RawRequest,
    config: &ClientConfig,
) -> Result<MonitoringRequest, ValidationError> {
    let lat = raw.latitude.trim();
    let lng = raw.longitude.trim();
    let target = raw.target_id.trim();

    if lat.is_empty() || lng.is_empty() || target.is_empty() {
        return Err(ValidationError::MissingField);
    }

    let latitude = parse_finite(lat)?;
    let longitude = parse_finite(lng)?;

    if !(LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&latitude) {
        return Err(ValidationError::LatitudeOutOfRange);
    }
    if !(LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&longitude) {
        return Err(ValidationError::LongitudeOutOfRange);
    }

    let interval_secs = parse_interval(raw.interval.trim(), config)?;

    Ok(MonitoringRequest {
        latitude,
        longitude,
        target_id: target.to_owned(),
        interval_secs,
    })
}

fn parse_finite(field: &str) -> Result<f64, ValidationError> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ValidationError::NotANumber),
    }
}

fn parse_interval(field: &str, config: &ClientConfig) -> Result<u16, ValidationError> {
    if field.is_empty() {
        return Ok(config.default_interval_secs);
    }
    // Parse wide so that "-5" and "70000" report a range error, not a parse error.
    let secs = field
        .parse::<i64>()
        .map_err(|_| ValidationError::IntervalOutOfRange)?;
    let bounds = i64::from(config.min_interval_secs)..=i64::from(config.max_interval_secs);
    if !bounds.contains(&secs) {
        return Err(ValidationError::IntervalOutOfRange);
    }
    Ok(secs as u16)
}
