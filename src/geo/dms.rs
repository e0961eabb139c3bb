use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Seconds are kept to hundredths so that a decimal -> DMS -> decimal round
/// trip stays within 1e-4 degrees.
const SECONDS_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Hemisphere {
    N,
    S,
    E,
    W,
}

impl Hemisphere {
    pub fn sign(&self) -> f64 {
        match self {
            Hemisphere::N | Hemisphere::E => 1.0,
            Hemisphere::S | Hemisphere::W => -1.0,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Hemisphere::N),
            'S' => Some(Hemisphere::S),
            'E' => Some(Hemisphere::E),
            'W' => Some(Hemisphere::W),
            _ => None,
        }
    }
}

impl std::fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            Hemisphere::N => 'N',
            Hemisphere::S => 'S',
            Hemisphere::E => 'E',
            Hemisphere::W => 'W',
        };
        write!(f, "{}", c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Dms {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
    pub hemisphere: Hemisphere,
}

impl std::fmt::Display for Dms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}° {}' {:.2}\" {}",
            self.degrees, self.minutes, self.seconds, self.hemisphere
        )
    }
}

/// Splits a decimal coordinate into degrees, minutes and seconds.
///
/// Seconds that round up to a full minute carry into the minutes, and a full
/// 60 minutes carries into the degrees. The hemisphere follows the sign of the
/// input: N/S for latitudes, E/W for longitudes; zero counts as positive.
pub fn to_dms(decimal_degrees: f64, is_latitude: bool) -> Dms {
    let hemisphere = match (is_latitude, decimal_degrees < 0.0) {
        (true, false) => Hemisphere::N,
        (true, true) => Hemisphere::S,
        (false, false) => Hemisphere::E,
        (false, true) => Hemisphere::W,
    };

    let absolute = decimal_degrees.abs();
    let mut degrees = absolute.floor();
    let fractional = absolute - degrees;
    let mut minutes = (fractional * 60.0).floor();
    let mut seconds = ((fractional * 3600.0) % 60.0 * SECONDS_SCALE).round() / SECONDS_SCALE;

    if seconds >= 60.0 {
        seconds = 0.0;
        minutes += 1.0;
    }
    if minutes >= 60.0 {
        minutes = 0.0;
        degrees += 1.0;
    }

    Dms {
        degrees: degrees as u32,
        minutes: minutes as u32,
        seconds,
        hemisphere,
    }
}

/// Inverse of [`to_dms`]. The hemisphere alone decides the sign.
pub fn from_dms(degrees: f64, minutes: f64, seconds: f64, hemisphere: Hemisphere) -> f64 {
    hemisphere.sign() * (degrees.abs() + minutes / 60.0 + seconds / 3600.0)
}

impl Dms {
    pub fn to_decimal(&self) -> f64 {
        from_dms(
            self.degrees as f64,
            self.minutes as f64,
            self.seconds,
            self.hemisphere,
        )
    }
}
