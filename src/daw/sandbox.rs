//! In-memory session.
//!
//! Stands in for the host object model: the binary drives it when no DAW
//! is attached and the tests use it to observe what the surface asks for.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use super::{
    BeatTime, Clip, ClipId, ClipSlot, ClipSlotId, Daw, ListenerId, Notifier, Quantization, Song,
    Topic, Track, TrackId, TransportState, View,
};
use crate::ctrl_surf::event::{CtrlSurfEvent, Edit, Mixer, Navigation, Transport};

const STEP: f64 = 1f64 / 127f64;
const MASTER_ID: TrackId = TrackId(0);

#[derive(Clone, Debug)]
pub struct TrackState {
    pub track: Track,
    pub volume: f64,
    pub pan: f64,
    pub sends: [f64; 2],
    pub mute: bool,
    pub solo: bool,
    pub arm: bool,
    slots: Vec<ClipSlot>,
}

impl TrackState {
    fn new(track: Track) -> Self {
        Self {
            track,
            volume: 0.85,
            pan: 0f64,
            sends: [0f64; 2],
            mute: false,
            solo: false,
            arm: false,
            slots: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    master: TrackState,
    tracks: Vec<TrackState>,
    scenes: Vec<Arc<str>>,
    selected_track: Option<usize>,
    selected_scene: usize,

    is_playing: bool,
    record_mode: bool,
    metronome: bool,
    loop_enabled: bool,
    overdub: bool,
    back_to_arranger: bool,
    follow_song: bool,
    tempo: f64,
    quantization: u8,
    position: f64,

    session_visible: bool,
    detail_visible: bool,
    browser_visible: bool,

    listeners: BTreeMap<ListenerId, Topic>,
    notifications: Vec<Topic>,
    handled: Vec<CtrlSurfEvent>,
    dangling_removals: usize,
    next_id: u32,
    next_listener: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            master: TrackState::new(Track {
                id: MASTER_ID,
                name: "Master".into(),
                can_be_armed: false,
            }),
            tracks: Vec::new(),
            scenes: Vec::new(),
            selected_track: None,
            selected_scene: 0,

            is_playing: false,
            record_mode: false,
            metronome: false,
            loop_enabled: false,
            overdub: false,
            back_to_arranger: false,
            follow_song: true,
            tempo: 120f64,
            quantization: Quantization::Bar.into(),
            position: 0f64,

            session_visible: true,
            detail_visible: false,
            browser_visible: false,

            listeners: BTreeMap::new(),
            notifications: Vec::new(),
            handled: Vec::new(),
            dangling_removals: 0,
            next_id: MASTER_ID.0 + 1,
            next_listener: 1,
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn notify(&mut self, topic: Topic) {
        if self.listeners.values().any(|t| *t == topic) && !self.notifications.contains(&topic) {
            self.notifications.push(topic);
        }
    }

    fn forget(&mut self, topic: Topic) {
        self.listeners.retain(|_, t| *t != topic);
    }

    /// Adds a track with an empty slot per scene, returns its index.
    pub fn add_track(&mut self, name: &str, can_be_armed: bool) -> usize {
        let id = TrackId(self.next_id());
        let mut state = TrackState::new(Track {
            id,
            name: name.into(),
            can_be_armed,
        });

        for _ in 0..self.scenes.len() {
            let slot_id = ClipSlotId(self.next_id());
            state.slots.push(ClipSlot {
                id: slot_id,
                clip: None,
            });
        }

        self.tracks.push(state);
        self.notify(Topic::Tracks);

        self.tracks.len() - 1
    }

    /// Removes a track, along with its clip slots.
    pub fn remove_track(&mut self, idx: usize) {
        if idx >= self.tracks.len() {
            return;
        }

        let removed = self.tracks.remove(idx);
        // Listeners die with the objects they observe
        for slot in removed.slots.iter() {
            self.forget(Topic::HasClip(slot.id));
            if let Some(clip) = slot.clip {
                self.forget(Topic::ClipColor(clip.id));
            }
        }

        match self.selected_track {
            Some(sel) if sel == idx => {
                self.selected_track = None;
                self.notify(Topic::SelectedTrack);
            }
            Some(sel) if sel > idx => self.selected_track = Some(sel - 1),
            _ => (),
        }

        self.notify(Topic::Tracks);
    }

    /// Adds a scene with an empty slot per track, returns its index.
    pub fn add_scene(&mut self, name: &str) -> usize {
        self.scenes.push(name.into());

        for idx in 0..self.tracks.len() {
            let slot_id = ClipSlotId(self.next_id());
            self.tracks[idx].slots.push(ClipSlot {
                id: slot_id,
                clip: None,
            });
        }

        self.scenes.len() - 1
    }

    pub fn rename_scene(&mut self, idx: usize, name: &str) {
        if let Some(scene) = self.scenes.get_mut(idx) {
            *scene = name.into();
        }
    }

    /// Creates (`Some(color)`) or deletes (`None`) the clip in a slot.
    pub fn set_clip(&mut self, track_idx: usize, scene_idx: usize, color: Option<u32>) {
        let clip = color.map(|color| Clip {
            id: ClipId(self.next_id()),
            color,
        });

        let (slot_id, prev) = match self.slot_mut(track_idx, scene_idx) {
            Some(slot) => (slot.id, std::mem::replace(&mut slot.clip, clip)),
            None => return,
        };

        if let Some(prev) = prev {
            self.forget(Topic::ClipColor(prev.id));
        }

        self.notify(Topic::HasClip(slot_id));
    }

    pub fn set_clip_color(&mut self, track_idx: usize, scene_idx: usize, color: u32) {
        let clip_id = match self.slot_mut(track_idx, scene_idx) {
            Some(ClipSlot {
                clip: Some(clip), ..
            }) => {
                clip.color = color;
                clip.id
            }
            _ => return,
        };

        self.notify(Topic::ClipColor(clip_id));
    }

    /// Selects a regular track, or the master track with `None`.
    pub fn select_track(&mut self, idx: Option<usize>) {
        let idx = idx.filter(|idx| *idx < self.tracks.len());
        if self.selected_track != idx {
            self.selected_track = idx;
            self.notify(Topic::SelectedTrack);
        }
    }

    pub fn select_scene(&mut self, idx: usize) {
        if idx < self.scenes.len() && self.selected_scene != idx {
            self.selected_scene = idx;
            self.notify(Topic::SelectedScene);
        }
    }

    pub fn set_tempo(&mut self, tempo: f64) {
        self.tempo = tempo;
    }

    pub fn set_quantization(&mut self, raw: u8) {
        self.quantization = raw;
    }

    pub fn set_position(&mut self, beats: f64) {
        self.position = beats;
    }

    /// Advances the song position when playing.
    pub fn advance(&mut self, secs: f64) {
        if self.is_playing {
            self.position += secs * self.tempo / 60f64;
        }
    }

    pub fn track_state(&self, idx: usize) -> Option<&TrackState> {
        self.tracks.get(idx)
    }

    pub fn track_state_mut(&mut self, idx: usize) -> Option<&mut TrackState> {
        self.tracks.get_mut(idx)
    }

    pub fn master_state(&self) -> &TrackState {
        &self.master
    }

    pub fn is_metronome_on(&self) -> bool {
        self.metronome
    }

    pub fn is_loop_on(&self) -> bool {
        self.loop_enabled
    }

    pub fn is_overdub_on(&self) -> bool {
        self.overdub
    }

    pub fn is_back_to_arranger(&self) -> bool {
        self.back_to_arranger
    }

    pub fn follows_song(&self) -> bool {
        self.follow_song
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Topics which currently have at least one listener.
    pub fn listened_topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.listeners.values().copied().collect();
        topics.sort();
        topics
    }

    /// Number of attempts at removing a listener which was already gone.
    pub fn dangling_removals(&self) -> usize {
        self.dangling_removals
    }

    /// Events handled so far, oldest first.
    pub fn handled(&self) -> &[CtrlSurfEvent] {
        &self.handled
    }

    fn slot_mut(&mut self, track_idx: usize, scene_idx: usize) -> Option<&mut ClipSlot> {
        self.tracks
            .get_mut(track_idx)
            .and_then(|track| track.slots.get_mut(scene_idx))
    }

    fn state_mut(&mut self, id: TrackId) -> Option<&mut TrackState> {
        if id == self.master.track.id {
            return Some(&mut self.master);
        }

        self.tracks.iter_mut().find(|state| state.track.id == id)
    }

    fn handle_mixer(&mut self, event: Mixer) {
        use Mixer::*;

        let track = match event {
            Volume(track, _)
            | Pan(track, _)
            | Send(track, _, _)
            | ToggleMute(track)
            | ToggleSolo(track)
            | ToggleArm(track)
            | Clear { track, .. } => track,
        };

        let state = match self.state_mut(track) {
            Some(state) => state,
            None => {
                log::warn!("Sandbox: {event:?} targets an unknown track");
                return;
            }
        };

        match event {
            Volume(_, steps) => {
                state.volume = (state.volume + steps as f64 * STEP).clamp(0f64, 1f64);
            }
            Pan(_, steps) => {
                state.pan = (state.pan + 2f64 * steps as f64 * STEP).clamp(-1f64, 1f64);
            }
            Send(_, idx, steps) => {
                if let Some(send) = state.sends.get_mut(idx) {
                    *send = (*send + steps as f64 * STEP).clamp(0f64, 1f64);
                }
            }
            ToggleMute(_) => state.mute = !state.mute,
            ToggleSolo(_) => state.solo = !state.solo,
            ToggleArm(_) => {
                if state.track.can_be_armed {
                    state.arm = !state.arm;
                }
            }
            Clear { disarm, .. } => {
                if disarm {
                    state.arm = false;
                }
                state.solo = false;
                state.mute = false;
            }
        }
    }

    fn handle_transport(&mut self, event: Transport) {
        use Transport::*;

        match event {
            StartPlaying | PlaySelection => self.is_playing = true,
            Stop => self.is_playing = false,
            ToggleRecord => self.record_mode = !self.record_mode,
            ToggleMetronome => self.metronome = !self.metronome,
            TapTempo => log::debug!("Sandbox: tap tempo"),
            ToggleLoop => self.loop_enabled = !self.loop_enabled,
            ToggleOverdub => self.overdub = !self.overdub,
            ScrubBy(beats) => self.position = (self.position + beats as f64).max(0f64),
            SetQuantization(q) => self.quantization = q.into(),
            BackToArranger => self.back_to_arranger = false,
            ToggleFollowSong => self.follow_song = !self.follow_song,
        }
    }

    fn handle_navigation(&mut self, event: Navigation) {
        use Navigation::*;

        match event {
            ShowView(view) => self.set_view_visible(view, true),
            HideView(view) => self.set_view_visible(view, false),
            Scroll { .. } | Zoom { .. } => log::debug!("Sandbox: {event:?}"),
        }
    }

    fn set_view_visible(&mut self, view: View, visible: bool) {
        match view {
            View::Session => self.session_visible = visible,
            View::Arranger => self.session_visible = !visible,
            View::Detail => self.detail_visible = visible,
            View::Browser => self.browser_visible = visible,
        }
    }
}

impl Song for Session {
    fn tracks(&self) -> Vec<Track> {
        self.tracks.iter().map(|state| state.track.clone()).collect()
    }

    fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn master_track(&self) -> Track {
        self.master.track.clone()
    }

    fn selected_track(&self) -> Track {
        self.selected_track
            .and_then(|idx| self.tracks.get(idx))
            .unwrap_or(&self.master)
            .track
            .clone()
    }

    fn selected_scene_name(&self) -> Arc<str> {
        self.scenes
            .get(self.selected_scene)
            .cloned()
            .unwrap_or_else(|| "".into())
    }

    fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    fn clip_slot(&self, track_idx: usize, scene_idx: usize) -> Option<ClipSlot> {
        self.tracks
            .get(track_idx)
            .and_then(|track| track.slots.get(scene_idx))
            .copied()
    }

    fn transport(&self) -> TransportState {
        TransportState {
            is_playing: self.is_playing,
            record_mode: self.record_mode,
            tempo: self.tempo,
            quantization: self.quantization,
            song_time: BeatTime::from_beats(self.position),
        }
    }

    fn is_view_visible(&self, view: View) -> bool {
        match view {
            View::Session => self.session_visible,
            View::Arranger => !self.session_visible,
            View::Detail => self.detail_visible,
            View::Browser => self.browser_visible,
        }
    }
}

impl Notifier for Session {
    fn add_listener(&mut self, topic: Topic) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, topic);

        id
    }

    fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        if self.listeners.remove(&id).is_none() {
            log::error!("Sandbox: removing unknown listener {id:?}");
            self.dangling_removals += 1;
        }
    }

    fn take_notifications(&mut self) -> Vec<Topic> {
        std::mem::take(&mut self.notifications)
    }
}

impl Daw for Session {
    fn handle_event(&mut self, event: CtrlSurfEvent) {
        log::trace!("Sandbox: {event:?}");

        match event {
            CtrlSurfEvent::Transport(event) => self.handle_transport(event),
            CtrlSurfEvent::Mixer(event) => self.handle_mixer(event),
            CtrlSurfEvent::Navigation(event) => self.handle_navigation(event),
            CtrlSurfEvent::Edit(Edit::Undo) => log::debug!("Sandbox: undo"),
            CtrlSurfEvent::Edit(Edit::Redo) => log::debug!("Sandbox: redo"),
        }

        self.handled.push(event);
    }

    fn tick(&mut self, elapsed: Duration) {
        self.advance(elapsed.as_secs_f64());
    }
}
