pub mod bridge;
pub use bridge::Bridge;

pub mod bytes;

pub mod ctrl_surf;
pub use ctrl_surf::ControlSurface;

pub mod daw;

pub mod midi;

pub mod settings;
pub use settings::Settings;
