pub mod events;
pub mod feature;
pub mod geometry;
pub mod layer;
pub mod time;
pub mod viewport;
