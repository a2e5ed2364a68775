use std::time::Instant;

use crate::{
    daw::{Daw, Topic},
    midi,
};

pub mod display;

pub mod error;
pub use error::Error;

pub mod event;
pub use event::CtrlSurfEvent;

pub mod listener;

pub mod mixer;

pub mod mode;
pub use mode::Mode;

pub mod msg;
pub use msg::Msg;

pub mod protocol;

pub mod session;

pub mod surface;
pub use surface::Op1;

/// Host lifecycle hooks of a control surface.
///
/// Handlers don't fail: they return the messages to route to the DAW
/// and to the device.
pub trait ControlSurface {
    fn msg_from_device(&mut self, msg: midi::Msg, daw: &mut dyn Daw) -> Vec<Msg>;

    /// Handles a change notified by the DAW on an observed `topic`.
    fn daw_event(&mut self, topic: Topic, daw: &mut dyn Daw) -> Vec<Msg>;

    /// Periodic call from the host.
    fn tick(&mut self, now: Instant, daw: &mut dyn Daw) -> Vec<Msg>;

    fn rebuild_midi_map(&mut self, daw: &mut dyn Daw) -> Vec<Msg>;

    /// Restarts the device identification.
    fn refresh_state(&mut self);

    /// Releases everything the surface holds in the DAW.
    fn disconnect(&mut self, daw: &mut dyn Daw) -> Vec<Msg>;

    fn is_connected(&self) -> bool;
}
