pub mod context;
pub mod finding;
pub mod plant_profile;
pub mod sun_exposure;
pub mod zone;

pub use context::*;
pub use finding::*;
pub use plant_profile::*;
pub use sun_exposure::*;
pub use zone::*;
