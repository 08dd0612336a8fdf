pub mod bus;
pub mod saver;

pub use bus::EventBus;
pub use saver::FileSaver;
