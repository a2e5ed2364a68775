//! The DAW side of the bridge.
//!
//! The session object model belongs to the host: the control surface only
//! reads it through [`Song`], subscribes to changes through [`Notifier`]
//! and asks for changes by handing [`CtrlSurfEvent`]s to [`Daw`].

use std::{fmt, sync::Arc, time::Duration};

use crate::ctrl_surf::CtrlSurfEvent;

pub mod quantization;
pub use quantization::Quantization;

pub mod sandbox;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TrackId(pub u32);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ClipSlotId(pub u32);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ClipId(pub u32);

/// Handle returned by [`Notifier::add_listener`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListenerId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub name: Arc<str>,
    pub can_be_armed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clip {
    pub id: ClipId,
    /// `0x00RRGGBB`
    pub color: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipSlot {
    pub id: ClipSlotId,
    pub clip: Option<Clip>,
}

impl ClipSlot {
    pub fn has_clip(&self) -> bool {
        self.clip.is_some()
    }
}

/// Song position in `bars.beats.sixteenths.ticks`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BeatTime {
    pub bars: i32,
    pub beats: u8,
    pub sixteenths: u8,
    pub ticks: u16,
}

impl BeatTime {
    pub const TICKS_PER_SIXTEENTH: u16 = 240;

    /// Converts a position expressed in quarter notes, assuming 4/4.
    pub fn from_beats(beats: f64) -> Self {
        let sixteenths_total = (beats * 4f64).floor() as i64;
        let ticks = ((beats * 4f64).fract().abs() * Self::TICKS_PER_SIXTEENTH as f64) as u16;
        let beats_total = sixteenths_total.div_euclid(4);

        Self {
            bars: beats_total.div_euclid(4) as i32 + 1,
            beats: beats_total.rem_euclid(4) as u8 + 1,
            sixteenths: sixteenths_total.rem_euclid(4) as u8 + 1,
            ticks,
        }
    }
}

impl fmt::Display for BeatTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{:03}",
            self.bars, self.beats, self.sixteenths, self.ticks
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransportState {
    pub is_playing: bool,
    pub record_mode: bool,
    pub tempo: f64,
    /// Raw clip trigger quantization as reported by the host.
    pub quantization: u8,
    pub song_time: BeatTime,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum View {
    Session,
    Arranger,
    Detail,
    Browser,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Session => "Session",
            View::Arranger => "Arranger",
            View::Detail => "Detail",
            View::Browser => "Browser",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
}

/// What a listener is subscribed to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Topic {
    /// The track list changed, the MIDI map must be rebuilt.
    Tracks,
    SelectedTrack,
    SelectedScene,
    HasClip(ClipSlotId),
    ClipColor(ClipId),
}

/// Read access to the session.
pub trait Song {
    /// Regular tracks, master & return tracks excluded.
    fn tracks(&self) -> Vec<Track>;

    fn track_count(&self) -> usize {
        self.tracks().len()
    }

    fn master_track(&self) -> Track;
    fn selected_track(&self) -> Track;
    fn selected_scene_name(&self) -> Arc<str>;
    fn scene_count(&self) -> usize;
    fn clip_slot(&self, track_idx: usize, scene_idx: usize) -> Option<ClipSlot>;
    fn transport(&self) -> TransportState;
    fn is_view_visible(&self, view: View) -> bool;
}

/// Change subscription.
pub trait Notifier {
    fn add_listener(&mut self, topic: Topic) -> ListenerId;
    fn has_listener(&self, id: ListenerId) -> bool;
    fn remove_listener(&mut self, id: ListenerId);

    /// Takes the notifications raised since last call.
    ///
    /// Only topics with at least one listener are reported.
    fn take_notifications(&mut self) -> Vec<Topic>;
}

pub trait Daw: Song + Notifier {
    fn handle_event(&mut self, event: CtrlSurfEvent);

    /// Periodic call, `elapsed` since the previous one.
    fn tick(&mut self, _elapsed: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_time() {
        assert_eq!(BeatTime::from_beats(0f64).to_string(), "1.1.1.000");
        assert_eq!(BeatTime::from_beats(1f64).to_string(), "1.2.1.000");
        assert_eq!(BeatTime::from_beats(4.25).to_string(), "2.1.2.000");
        assert_eq!(BeatTime::from_beats(4.375).to_string(), "2.1.2.120");
        assert_eq!(BeatTime::from_beats(33f64).to_string(), "9.2.1.000");
    }
}
