//! Integration test modules.

mod multi_athlete_test;
mod replay_export_test;
