//! Unit test modules.

mod cda_test;
mod csv_export_test;
mod gradient_test;
mod surface_test;
