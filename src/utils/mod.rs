pub mod idutils;
pub mod params;
pub mod pbutil;
