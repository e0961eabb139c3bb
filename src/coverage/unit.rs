use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Display unit of a coverage raster and its field-strength samples.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UnitKey {
    /// Field strength in dBµV/m.
    #[default]
    Dbuv,
    /// Received power in dBm.
    Dbm,
}

impl UnitKey {
    pub const ALL: [UnitKey; 2] = [UnitKey::Dbuv, UnitKey::Dbm];

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "dbuv" => Some(UnitKey::Dbuv),
            "dbm" => Some(UnitKey::Dbm),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnitKey::Dbuv => "dBµV/m",
            UnitKey::Dbm => "dBm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_wire_names() {
        assert_eq!(UnitKey::Dbuv.to_string(), "dbuv");
        assert_eq!(UnitKey::Dbm.as_ref(), "dbm");
        assert_eq!(UnitKey::from_key("DBM"), Some(UnitKey::Dbm));
        assert_eq!(UnitKey::from_key("watts"), None);
        assert_eq!(serde_json::to_string(&UnitKey::Dbuv).unwrap(), "\"dbuv\"");
    }
}
