//! Road surface and rolling-resistance lookup.
//!
//! Each course road is split into sections by ascending breakpoints of
//! progress along the road. A position maps to the surface of the first
//! breakpoint at or beyond it. Rolling resistance then depends on the
//! surface and the tyre type of the bike.

use crate::telemetry::types::{Sample, ROAD_COMPLETION_SCALE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// Built-in surface table shipped with the crate.
const BUILTIN_TABLE: &str = include_str!("../../data/crr.json");

/// Surface used for rolling resistance when a road is not in the table.
pub const DEFAULT_SURFACE: &str = "pavement_sand";

/// Rolling resistance used when even the default surface has no entry.
pub const FALLBACK_CRR: f64 = 0.004;

/// Tyre category used to pick a rolling-resistance coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TyreType {
    /// Slick road tyres
    #[default]
    Road,
    /// Gravel tyres
    Gravel,
    /// Mountain bike tyres
    Mtb,
}

impl std::fmt::Display for TyreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TyreType::Road => write!(f, "road"),
            TyreType::Gravel => write!(f, "gravel"),
            TyreType::Mtb => write!(f, "mtb"),
        }
    }
}

/// Errors raised while loading a surface table.
#[derive(Debug, Error)]
pub enum SurfaceTableError {
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid breakpoint '{breakpoint}' on course {course_id} road {road_id}")]
    InvalidBreakpoint {
        course_id: i64,
        road_id: i64,
        breakpoint: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// On-disk JSON layout.
#[derive(Debug, Deserialize)]
struct SurfaceTableFile {
    #[serde(default)]
    default_surface: Option<String>,
    surfaces: HashMap<String, HashMap<TyreType, f64>>,
    /// course id -> road id -> fixed-point progress -> surface
    #[serde(default)]
    roads: HashMap<i64, HashMap<i64, BTreeMap<String, String>>>,
}

/// End of a road section, as normalized progress in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
struct Breakpoint {
    progress: f64,
    surface: String,
}

/// Surface resolved for a position, with its rolling-resistance coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceResolution<'a> {
    /// Surface name, `None` if the road is not in the table
    pub surface: Option<&'a str>,
    /// Rolling-resistance coefficient
    pub crr: f64,
}

/// Static course/road surface table plus per-surface Crr values.
#[derive(Debug, Clone)]
pub struct SurfaceTable {
    default_surface: String,
    surfaces: HashMap<String, HashMap<TyreType, f64>>,
    roads: HashMap<(i64, i64), Vec<Breakpoint>>,
}

impl Default for SurfaceTable {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE)
    }
}

impl SurfaceTable {
    /// Create an empty table with the given default surface.
    pub fn new(default_surface: &str) -> Self {
        Self {
            default_surface: default_surface.to_string(),
            surfaces: HashMap::new(),
            roads: HashMap::new(),
        }
    }

    /// Parse the table shipped with the crate.
    pub fn builtin() -> Result<Self, SurfaceTableError> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Load a table from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, SurfaceTableError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a table from JSON.
    ///
    /// Breakpoint keys are fixed-point road progress (`0..=1000000`).
    pub fn from_json(json: &str) -> Result<Self, SurfaceTableError> {
        let file: SurfaceTableFile = serde_json::from_str(json)?;
        let mut table = Self::new(file.default_surface.as_deref().unwrap_or(DEFAULT_SURFACE));
        table.surfaces = file.surfaces;

        for (course_id, roads) in file.roads {
            for (road_id, sections) in roads {
                let mut breakpoints = Vec::with_capacity(sections.len());
                for (key, surface) in sections {
                    let progress = key
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|p| *p <= ROAD_COMPLETION_SCALE)
                        .ok_or_else(|| SurfaceTableError::InvalidBreakpoint {
                            course_id,
                            road_id,
                            breakpoint: key.clone(),
                        })?;
                    breakpoints.push((progress, surface));
                }
                table.insert_road(course_id, road_id, breakpoints);
            }
        }

        tracing::debug!(
            "Loaded surface table with {} surfaces and {} roads",
            table.surfaces.len(),
            table.roads.len()
        );
        Ok(table)
    }

    /// Set the Crr of a surface for one tyre type.
    pub fn insert_crr(&mut self, surface: &str, tyre: TyreType, crr: f64) {
        self.surfaces
            .entry(surface.to_string())
            .or_default()
            .insert(tyre, crr);
    }

    /// Define the sections of a road from `(fixed-point progress, surface)` pairs.
    pub fn insert_road<S: Into<String>>(
        &mut self,
        course_id: i64,
        road_id: i64,
        sections: impl IntoIterator<Item = (u32, S)>,
    ) {
        let mut breakpoints: Vec<Breakpoint> = sections
            .into_iter()
            .map(|(progress, surface)| Breakpoint {
                progress: progress.min(ROAD_COMPLETION_SCALE) as f64
                    / ROAD_COMPLETION_SCALE as f64,
                surface: surface.into(),
            })
            .collect();
        breakpoints.sort_by(|a, b| a.progress.total_cmp(&b.progress));
        self.roads.insert((course_id, road_id), breakpoints);
    }

    /// Surface name used when a road is unknown.
    pub fn default_surface(&self) -> &str {
        &self.default_surface
    }

    /// Surface at normalized `progress` on a road, `None` if the road is unknown.
    pub fn surface_at(&self, course_id: i64, road_id: i64, progress: f64) -> Option<&str> {
        let breakpoints = self.roads.get(&(course_id, road_id))?;
        breakpoints
            .iter()
            .find(|bp| progress <= bp.progress)
            .or_else(|| breakpoints.last())
            .map(|bp| bp.surface.as_str())
    }

    /// Crr for a surface and tyre, falling back to the default surface.
    pub fn crr_for(&self, surface: Option<&str>, tyre: TyreType) -> f64 {
        surface
            .and_then(|name| self.surfaces.get(name))
            .and_then(|by_tyre| by_tyre.get(&tyre))
            .or_else(|| {
                self.surfaces
                    .get(&self.default_surface)
                    .and_then(|by_tyre| by_tyre.get(&tyre))
            })
            .copied()
            .unwrap_or(FALLBACK_CRR)
    }

    /// Resolve surface and Crr from raw road completion.
    pub fn resolve(
        &self,
        course_id: i64,
        road_id: i64,
        road_completion: u32,
        reverse: bool,
        tyre: TyreType,
    ) -> SurfaceResolution<'_> {
        let sample = Sample {
            road_completion,
            reverse,
            ..Default::default()
        };
        let progress = sample.normalized_road_progress();
        let surface = self.surface_at(course_id, road_id, progress);
        SurfaceResolution {
            surface,
            crr: self.crr_for(surface, tyre),
        }
    }

    /// Resolve surface and Crr for the position reported by a sample.
    pub fn resolve_sample(&self, sample: &Sample, tyre: TyreType) -> SurfaceResolution<'_> {
        self.resolve(
            sample.course_id,
            sample.road_id,
            sample.road_completion,
            sample.reverse,
            tyre,
        )
    }
}

/// Human-readable surface label (`pavement_sand` -> `pavement/sand`).
pub fn surface_label(surface: Option<&str>) -> String {
    surface.unwrap_or("Unknown").replacen('_', "/", 1)
}
