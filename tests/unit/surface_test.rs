//! Unit tests for surface and rolling-resistance lookup.

use aerowatch::world::surface::{SurfaceTable, SurfaceTableError, TyreType, FALLBACK_CRR};

fn single_break_table() -> SurfaceTable {
    let mut table = SurfaceTable::default();
    table.insert_road(6, 5, [(300_000, "pavement")]);
    table.insert_crr("pavement", TyreType::Road, 0.004);
    table.insert_crr("pavement_sand", TyreType::Road, 0.0045);
    table
}

#[test]
fn test_single_breakpoint_forward() {
    let table = single_break_table();
    let resolved = table.resolve(6, 5, 250_000, false, TyreType::Road);
    assert_eq!(resolved.surface, Some("pavement"));
    assert_eq!(resolved.crr, 0.004);
}

#[test]
fn test_single_breakpoint_reverse() {
    let table = single_break_table();
    // Reverse 250000 normalizes to 0.75, past the only breakpoint, so the
    // last breakpoint applies.
    let resolved = table.resolve(6, 5, 250_000, true, TyreType::Road);
    assert_eq!(resolved.surface, Some("pavement"));
    assert_eq!(table.surface_at(6, 5, 0.75), Some("pavement"));
}

#[test]
fn test_reverse_picks_mirrored_section() {
    let mut table = SurfaceTable::default();
    table.insert_road(1, 1, [(300_000, "cobbles"), (1_000_000, "pavement")]);

    assert_eq!(table.resolve(1, 1, 250_000, false, TyreType::Road).surface, Some("cobbles"));
    assert_eq!(table.resolve(1, 1, 250_000, true, TyreType::Road).surface, Some("pavement"));
    assert_eq!(table.resolve(1, 1, 800_000, true, TyreType::Road).surface, Some("cobbles"));
}

#[test]
fn test_breakpoint_is_inclusive() {
    let mut table = SurfaceTable::default();
    table.insert_road(1, 1, [(500_000, "dirt"), (1_000_000, "gravel")]);
    assert_eq!(table.surface_at(1, 1, 0.5), Some("dirt"));
    assert_eq!(table.surface_at(1, 1, 0.500001), Some("gravel"));
}

#[test]
fn test_missing_default_uses_fallback() {
    let table = SurfaceTable::new("nothing");
    assert_eq!(table.crr_for(None, TyreType::Mtb), FALLBACK_CRR);
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        SurfaceTable::from_json("{"),
        Err(SurfaceTableError::Parse(_))
    ));
}

#[test]
fn test_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crr.json");
    std::fs::write(
        &path,
        r#"{ "default_surface": "pavement",
             "surfaces": { "pavement": { "road": 0.0041 } },
             "roads": {} }"#,
    )
    .unwrap();

    let table = SurfaceTable::from_path(&path).unwrap();
    assert_eq!(table.crr_for(None, TyreType::Road), 0.0041);
}

