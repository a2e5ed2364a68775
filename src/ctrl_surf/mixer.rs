use super::{
    event::Mixer,
    mode::Mode,
    protocol::{cc, Button, Control, Encoder},
    CtrlSurfEvent,
};
use crate::{
    daw::{Track, TrackId},
    midi,
};

const SOLO: Button = Button::Ss6;
const ARM: Button = Button::Ss7;
const MUTE: Button = Button::Ss5;

const VOLUME: Encoder = Encoder::E1;
const PAN: Encoder = Encoder::E2;
const SENDS: [Encoder; 2] = [Encoder::E3, Encoder::E4];

/// Hardware controls assigned to the selected track.
///
/// There is only one strip: binding a track releases every control
/// assigned to the previous one first.
#[derive(Debug, Default)]
pub struct ChannelStrip {
    track: Option<TrackId>,
    volume: Option<Encoder>,
    pan: Option<Encoder>,
    sends: [Option<Encoder>; 2],
    mute: Option<Button>,
    solo: Option<Button>,
    arm: Option<Button>,
}

impl ChannelStrip {
    pub fn track(&self) -> Option<TrackId> {
        self.track
    }

    pub fn bind_track(&mut self, track: &Track, master: TrackId, mode: Mode) {
        self.clear();

        log::debug!("Binding strip to track {}", track.name);
        self.track = Some(track.id);

        self.solo = Some(SOLO);
        if track.can_be_armed {
            self.arm = Some(ARM);
        }
        if track.id != master {
            self.mute = Some(MUTE);
        }

        self.set_encoder_routing(mode);
    }

    /// Assigns the encoders to the bound track, unless `mode` uses them.
    ///
    /// Buttons are left untouched.
    pub fn set_encoder_routing(&mut self, mode: Mode) {
        self.volume = None;
        self.pan = None;
        self.sends = [None; 2];

        if self.track.is_none() || !mode.routes_encoders_to_strip() {
            return;
        }

        self.volume = Some(VOLUME);
        self.pan = Some(PAN);
        self.sends = SENDS.map(Some);
    }

    pub fn clear(&mut self) {
        *self = ChannelStrip::default();
    }

    /// Converts `control` input into a command for the bound track.
    ///
    /// Returns `None` when `control` is not bound to the strip.
    pub fn route(&self, control: Control, value: u8) -> Option<CtrlSurfEvent> {
        let track = self.track?;

        match control {
            Control::Encoder(encoder) => {
                let steps = midi::relative::to_steps(value);
                if steps == 0 {
                    return None;
                }

                if self.volume == Some(encoder) {
                    return Some(Mixer::Volume(track, steps).into());
                }
                if self.pan == Some(encoder) {
                    return Some(Mixer::Pan(track, steps).into());
                }

                self.sends
                    .iter()
                    .position(|send| *send == Some(encoder))
                    .map(|idx| Mixer::Send(track, idx, steps).into())
            }
            Control::Button(button) if value == cc::PRESSED => {
                let button = Some(button);
                if self.mute == button {
                    Some(Mixer::ToggleMute(track).into())
                } else if self.solo == button {
                    Some(Mixer::ToggleSolo(track).into())
                } else if self.arm == button {
                    Some(Mixer::ToggleArm(track).into())
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Every bound control along with the track it drives.
    pub fn bound_controls(&self) -> Vec<(Control, TrackId)> {
        let track = match self.track {
            Some(track) => track,
            None => return Vec::new(),
        };

        let encoders = [self.volume, self.pan, self.sends[0], self.sends[1]]
            .into_iter()
            .flatten()
            .map(Control::from);
        let buttons = [self.mute, self.solo, self.arm]
            .into_iter()
            .flatten()
            .map(Control::from);

        encoders.chain(buttons).map(|control| (control, track)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    const MASTER: TrackId = TrackId(0);

    fn track(id: u32, can_be_armed: bool) -> Track {
        Track {
            id: TrackId(id),
            name: format!("track {id}").into(),
            can_be_armed,
        }
    }

    fn controls(strip: &ChannelStrip) -> BTreeSet<Control> {
        strip.bound_controls().into_iter().map(|(c, _)| c).collect()
    }

    #[test]
    fn full_binding() {
        let mut strip = ChannelStrip::default();
        strip.bind_track(&track(3, true), MASTER, Mode::Mixer);

        let bound = strip.bound_controls();
        assert_eq!(bound.len(), 7);
        assert!(bound.iter().all(|(_, id)| *id == TrackId(3)));

        let set = controls(&strip);
        assert_eq!(set.len(), 7);
        for encoder in [Encoder::E1, Encoder::E2, Encoder::E3, Encoder::E4] {
            assert!(set.contains(&Control::Encoder(encoder)));
        }
        for button in [SOLO, ARM, MUTE] {
            assert!(set.contains(&Control::Button(button)));
        }
    }

    #[test]
    fn capabilities() {
        let mut strip = ChannelStrip::default();

        strip.bind_track(&track(4, false), MASTER, Mode::Perform);
        assert!(!controls(&strip).contains(&Control::Button(ARM)));
        assert!(controls(&strip).contains(&Control::Button(MUTE)));

        strip.bind_track(&track(0, false), MASTER, Mode::Perform);
        let set = controls(&strip);
        assert!(!set.contains(&Control::Button(MUTE)));
        assert!(!set.contains(&Control::Button(ARM)));
        assert!(set.contains(&Control::Button(SOLO)));
    }

    #[test]
    fn rebinding_releases_previous_track() {
        let mut strip = ChannelStrip::default();
        strip.bind_track(&track(1, true), MASTER, Mode::Clip);
        strip.bind_track(&track(2, false), MASTER, Mode::Clip);

        let bound = strip.bound_controls();
        assert!(bound.iter().all(|(_, id)| *id == TrackId(2)));
        assert!(!controls(&strip).contains(&Control::Button(ARM)));
        assert_eq!(strip.route(Control::Button(ARM), cc::PRESSED), None);
    }

    #[test]
    fn transport_mode_keeps_buttons() {
        let mut strip = ChannelStrip::default();
        strip.bind_track(&track(5, true), MASTER, Mode::Mixer);

        strip.set_encoder_routing(Mode::Transport);
        let set = controls(&strip);
        assert_eq!(set.len(), 3);
        assert!(set.iter().all(|c| matches!(c, Control::Button(_))));

        strip.set_encoder_routing(Mode::Perform);
        assert_eq!(controls(&strip).len(), 7);

        strip.bind_track(&track(6, true), MASTER, Mode::Transport);
        assert_eq!(controls(&strip).len(), 3);
    }

    #[test]
    fn routing() {
        let mut strip = ChannelStrip::default();
        assert_eq!(strip.route(Control::Encoder(VOLUME), 1), None);

        strip.bind_track(&track(7, true), MASTER, Mode::Mixer);
        let id = TrackId(7);

        assert_eq!(
            strip.route(Control::Encoder(VOLUME), 1),
            Some(Mixer::Volume(id, 1).into())
        );
        assert_eq!(
            strip.route(Control::Encoder(PAN), 127),
            Some(Mixer::Pan(id, -1).into())
        );
        assert_eq!(
            strip.route(Control::Encoder(Encoder::E4), 3),
            Some(Mixer::Send(id, 1, 3).into())
        );
        assert_eq!(strip.route(Control::Encoder(VOLUME), 0), None);

        assert_eq!(
            strip.route(Control::Button(SOLO), cc::PRESSED),
            Some(Mixer::ToggleSolo(id).into())
        );
        assert_eq!(strip.route(Control::Button(SOLO), cc::RELEASED), None);
        assert_eq!(
            strip.route(Control::Button(MUTE), cc::PRESSED),
            Some(Mixer::ToggleMute(id).into())
        );
        assert_eq!(strip.route(Control::Button(Button::Play), cc::PRESSED), None);

        strip.clear();
        assert_eq!(strip.track(), None);
        assert!(strip.bound_controls().is_empty());
        assert_eq!(strip.route(Control::Button(SOLO), cc::PRESSED), None);
    }
}
