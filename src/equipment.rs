//! Bike catalog and bike profiles.

use crate::world::surface::TyreType;
use serde::{Deserialize, Serialize};

/// How a bike's rolling resistance is determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrrSource {
    /// Look the coefficient up from the road surface for this tyre type
    Tyre(TyreType),
    /// Use a fixed coefficient regardless of surface
    Fixed(f64),
}

/// A selectable bike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BikeProfile {
    /// Display name
    pub name: String,
    /// Bike weight in kilograms
    pub weight_kg: f64,
    /// Rolling resistance source
    pub crr: CrrSource,
}

impl BikeProfile {
    /// Create a bike whose Crr follows the road surface.
    pub fn with_tyre(name: &str, weight_kg: f64, tyre: TyreType) -> Self {
        Self {
            name: name.to_string(),
            weight_kg,
            crr: CrrSource::Tyre(tyre),
        }
    }

    /// Create a bike with a fixed Crr.
    pub fn with_fixed_crr(name: &str, weight_kg: f64, crr: f64) -> Self {
        Self {
            name: name.to_string(),
            weight_kg,
            crr: CrrSource::Fixed(crr),
        }
    }

    /// Tyre type used for surface lookups. Fixed-Crr bikes report road tyres.
    pub fn tyre_type(&self) -> TyreType {
        match self.crr {
            CrrSource::Tyre(tyre) => tyre,
            CrrSource::Fixed(_) => TyreType::Road,
        }
    }
}

/// Built-in bikes: name, weight in kg, tyre type.
const BUILTIN_BIKES: &[(&str, f64, TyreType)] = &[
    ("Canyon Aeroad 2021, DT Swiss ARC 1100 DICUT DISC", 6.326516434, TyreType::Road),
    ("Pinarello Dogma F, DT Swiss ARC 1100 DICUT DISC", 6.111778897, TyreType::Road),
    ("Scott Addict RC, DT Swiss ARC 1100 DICUT DISC", 5.969539361, TyreType::Road),
    ("Scott Addict RC, ENVE SES 7.8", 5.551463039, TyreType::Road),
    ("Specialized Aethos S-Works, DT Swiss ARC 1100 DICUT 62", 5.20017971, TyreType::Road),
    ("Specialized Aethos S-Works, Lightweight Meilenstein", 4.773019002, TyreType::Road),
    ("Specialized Venge S-Works, DT Swiss ARC 1100 DICUT DISC", 6.392870542, TyreType::Road),
    ("Zwift Concept Z1 (Tron)", 5.841040875, TyreType::Road),
    ("Gravel: Canyon Grail, ENVE G23", 6.295709214, TyreType::Gravel),
    ("Gravel: Specialized Crux, Cadex AR 35", 6.376319988, TyreType::Gravel),
    ("Gravel: Specialized Crux, ENVE G23", 6.180817163, TyreType::Gravel),
    ("TT: Cadex Tri, DT Swiss ARC 1100 DICUT DISC", 8.731950421, TyreType::Road),
    ("TT: Canyon Speedmax CF SLX Disc, DT Swiss ARC 1100 DICUT DISC", 8.777536839, TyreType::Road),
    ("TT: Canyon Speedmax CF SLX Disc, ENVE SES 7.8", 8.307936447, TyreType::Road),
    ("TT: Scott Plasma RC Ultimate, DT Swiss ARC 1100 DICUT DISC", 8.569863648, TyreType::Road),
    ("MTB: Trek Super Caliber", 11.5578441, TyreType::Mtb),
];

/// Ordered list of selectable bikes. The first entry is the default.
#[derive(Debug, Clone)]
pub struct BikeCatalog {
    bikes: Vec<BikeProfile>,
}

impl Default for BikeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BikeCatalog {
    /// Catalog of the built-in bikes.
    pub fn builtin() -> Self {
        Self {
            bikes: BUILTIN_BIKES
                .iter()
                .map(|(name, weight, tyre)| BikeProfile::with_tyre(name, *weight, *tyre))
                .collect(),
        }
    }

    /// Catalog from an explicit list. An empty list falls back to the built-ins.
    pub fn from_bikes(bikes: Vec<BikeProfile>) -> Self {
        if bikes.is_empty() {
            Self::builtin()
        } else {
            Self { bikes }
        }
    }

    /// Look a bike up by exact name.
    pub fn get(&self, name: &str) -> Option<&BikeProfile> {
        self.bikes.iter().find(|bike| bike.name == name)
    }

    /// The default bike (first catalog entry).
    pub fn default_bike(&self) -> &BikeProfile {
        &self.bikes[0]
    }

    /// Look a bike up by name, falling back to the default bike.
    pub fn select(&self, name: &str) -> &BikeProfile {
        match self.get(name) {
            Some(bike) => bike,
            None => {
                let fallback = self.default_bike();
                tracing::warn!("Unknown bike '{}', using '{}'", name, fallback.name);
                fallback
            }
        }
    }

    /// Iterate over the catalog in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &BikeProfile> {
        self.bikes.iter()
    }

    /// Get the number of bikes in the catalog.
    pub fn len(&self) -> usize {
        self.bikes.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.bikes.is_empty()
    }
}
