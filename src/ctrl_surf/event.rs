use crate::daw::{NavDirection, Quantization, TrackId, View};

/// Commands the control surface sends to the DAW.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CtrlSurfEvent {
    Transport(Transport),
    Mixer(Mixer),
    Navigation(Navigation),
    Edit(Edit),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transport {
    StartPlaying,
    PlaySelection,
    Stop,
    ToggleRecord,
    ToggleMetronome,
    TapTempo,
    ToggleLoop,
    ToggleOverdub,
    /// Moves the play position by the given number of beats.
    ScrubBy(i32),
    SetQuantization(Quantization),
    BackToArranger,
    ToggleFollowSong,
}

impl From<Transport> for CtrlSurfEvent {
    fn from(evt: Transport) -> Self {
        Self::Transport(evt)
    }
}

/// Channel strip commands.
///
/// Encoder moves are relative steps, the host maps them onto the
/// parameter range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mixer {
    Volume(TrackId, i8),
    Pan(TrackId, i8),
    Send(TrackId, usize, i8),
    ToggleMute(TrackId),
    ToggleSolo(TrackId),
    ToggleArm(TrackId),
    /// Releases solo & mute, and arm when `disarm` is set.
    Clear {
        track: TrackId,
        disarm: bool,
    },
}

impl From<Mixer> for CtrlSurfEvent {
    fn from(evt: Mixer) -> Self {
        Self::Mixer(evt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Navigation {
    ShowView(View),
    HideView(View),
    Scroll {
        direction: NavDirection,
        view: View,
        modifier: bool,
    },
    Zoom {
        direction: NavDirection,
        view: View,
        modifier: bool,
    },
}

impl From<Navigation> for CtrlSurfEvent {
    fn from(evt: Navigation) -> Self {
        Self::Navigation(evt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edit {
    Undo,
    Redo,
}

impl From<Edit> for CtrlSurfEvent {
    fn from(evt: Edit) -> Self {
        Self::Edit(evt)
    }
}
