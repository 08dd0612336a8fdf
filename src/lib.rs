pub mod bus;
pub mod config;
pub mod controller;
pub mod geojson;
pub mod layers;
pub mod models;
pub mod selection;
pub mod traits;
pub mod utils;

pub use bus::MemoryBus;
pub use config::Config;
pub use controller::MapController;
pub use models::events::{MapEvent, Notification};
pub use traits::{EventBus, FileSaver};
