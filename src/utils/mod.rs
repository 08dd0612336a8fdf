pub mod coordinates;
pub mod files;
pub mod status;
