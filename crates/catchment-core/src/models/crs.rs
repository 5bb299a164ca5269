//! Coordinate reference systems known to the pipeline.

use serde::{Deserialize, Serialize};

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// Build a CRS from a bare EPSG code, naming the ones we know.
    pub fn from_epsg(epsg: u32) -> Self {
        match epsg {
            4326 => Self::wgs84(),
            3414 => Self::svy21(),
            3857 => Self::new(3857, "Web Mercator"),
            other => Self::new(other, format!("EPSG:{}", other)),
        }
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84")
    }

    /// SVY21 / Singapore TM (EPSG:3414)
    pub fn svy21() -> Self {
        Self::new(3414, "SVY21 / Singapore TM")
    }

    /// Authority string understood by PROJ, e.g. `EPSG:3414`
    pub fn authority(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }

    /// Whether two CRS describe the same frame
    pub fn matches(&self, other: &Crs) -> bool {
        self.epsg == other.epsg
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{} ({})", self.epsg, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_epsg_names_known_codes() {
        assert_eq!(Crs::from_epsg(4326), Crs::wgs84());
        assert_eq!(Crs::from_epsg(3414).name, "SVY21 / Singapore TM");
        assert_eq!(Crs::from_epsg(32648).name, "EPSG:32648");
    }

    #[test]
    fn test_matches_compares_epsg_only() {
        let a = Crs::new(3414, "SVY21");
        let b = Crs::svy21();
        assert!(a.matches(&b));
        assert!(!a.matches(&Crs::wgs84()));
        assert_eq!(a.authority(), "EPSG:3414");
    }
}
