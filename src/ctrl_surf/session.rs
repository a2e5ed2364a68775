//! Clip slots observation for the color display.

use std::{collections::BTreeMap, ops::Range};

use super::{listener::Registry, protocol::Rgb};
use crate::daw::{ClipId, ClipSlotId, Notifier, Song, Topic};

pub const DEFAULT_NUM_TRACKS: usize = 8;
pub const DEFAULT_NUM_SCENES: usize = 4;

/// Observes the clip slots of a window of the session grid.
///
/// A presence listener is registered for each slot in the window and a
/// color listener for each clip these slots hold. Nothing else is
/// observed.
#[derive(Debug)]
pub struct SessionObserver {
    num_tracks: usize,
    num_scenes: usize,
    track_offset: usize,
    scene_offset: usize,
    slots: Registry<ClipSlotId>,
    clips: Registry<ClipId>,
    clip_of: BTreeMap<ClipSlotId, ClipId>,
}

impl Default for SessionObserver {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_TRACKS, DEFAULT_NUM_SCENES)
    }
}

impl SessionObserver {
    pub fn new(num_tracks: usize, num_scenes: usize) -> Self {
        Self {
            num_tracks,
            num_scenes,
            track_offset: 0,
            scene_offset: 0,
            slots: Registry::default(),
            clips: Registry::default(),
            clip_of: BTreeMap::new(),
        }
    }

    pub fn num_tracks(&self) -> usize {
        self.num_tracks
    }

    pub fn track_offset(&self) -> usize {
        self.track_offset
    }

    pub fn observed_slots(&self) -> impl Iterator<Item = ClipSlotId> + '_ {
        self.slots.keys()
    }

    pub fn observed_clips(&self) -> impl Iterator<Item = ClipId> + '_ {
        self.clips.keys()
    }

    fn track_range<S: Song + ?Sized>(&self, song: &S) -> Range<usize> {
        let end = (self.track_offset + self.num_tracks).min(song.track_count());
        self.track_offset..end.max(self.track_offset)
    }

    fn scene_range<S: Song + ?Sized>(&self, song: &S) -> Range<usize> {
        let end = (self.scene_offset + self.num_scenes).min(song.scene_count());
        self.scene_offset..end.max(self.scene_offset)
    }

    /// Drops every listener then observes the current window.
    pub fn rebuild<D: Song + Notifier + ?Sized>(&mut self, daw: &mut D) {
        self.teardown(daw);

        for track_idx in self.track_range(&*daw) {
            for scene_idx in self.scene_range(&*daw) {
                let slot = match daw.clip_slot(track_idx, scene_idx) {
                    Some(slot) => slot,
                    None => continue,
                };

                self.slots.insert(slot.id, Topic::HasClip(slot.id), daw);
                if let Some(clip) = slot.clip {
                    self.clips.insert(clip.id, Topic::ClipColor(clip.id), daw);
                    self.clip_of.insert(slot.id, clip.id);
                }
            }
        }

        log::debug!(
            "Observing {} slots & {} clips from track {}",
            self.slots.len(),
            self.clips.len(),
            self.track_offset,
        );
    }

    pub fn on_window_shift<D: Song + Notifier + ?Sized>(&mut self, daw: &mut D) -> Vec<Rgb> {
        self.rebuild(daw);
        self.render_color_frame(&*daw)
    }

    /// Handles a clip added to or removed from `slot_id`.
    ///
    /// Returns the new color frame, or `None` if the slot is not observed.
    pub fn on_slot_changed<D: Song + Notifier + ?Sized>(
        &mut self,
        slot_id: ClipSlotId,
        daw: &mut D,
    ) -> Option<Vec<Rgb>> {
        if !self.slots.contains(slot_id) {
            return None;
        }

        let slot = self.track_range(&*daw).find_map(|track_idx| {
            self.scene_range(&*daw)
                .filter_map(|scene_idx| daw.clip_slot(track_idx, scene_idx))
                .find(|slot| slot.id == slot_id)
        });
        let slot = match slot {
            Some(slot) => slot,
            None => {
                // Pending a rebuild on track list change
                log::debug!("{slot_id:?} left the window");
                return None;
            }
        };

        let prev = self.clip_of.get(&slot_id).copied();
        let cur = slot.clip.map(|clip| clip.id);
        if prev != cur {
            if let Some(prev) = prev {
                self.clip_of.remove(&slot_id);
                self.clips.remove(prev, daw);
            }
            if let Some(cur) = cur {
                self.clip_of.insert(slot_id, cur);
                self.clips.insert(cur, Topic::ClipColor(cur), daw);
            }
        }

        Some(self.render_color_frame(&*daw))
    }

    pub fn on_clip_color_changed<S: Song + ?Sized>(
        &self,
        clip_id: ClipId,
        song: &S,
    ) -> Option<Vec<Rgb>> {
        self.clips
            .contains(clip_id)
            .then(|| self.render_color_frame(song))
    }

    /// One color per observed track for the first observed scene.
    pub fn render_color_frame<S: Song + ?Sized>(&self, song: &S) -> Vec<Rgb> {
        let count = song
            .track_count()
            .saturating_sub(self.track_offset)
            .min(self.num_tracks);

        (self.track_offset..self.track_offset + count)
            .map(|track_idx| {
                song.clip_slot(track_idx, self.scene_offset)
                    .and_then(|slot| slot.clip)
                    .map_or(Rgb::BLACK, |clip| Rgb::from_clip_color(clip.color))
            })
            .collect()
    }

    pub fn reset_frame(&self) -> Vec<Rgb> {
        vec![Rgb::BLACK; self.num_tracks]
    }

    /// Moves the window by `delta` tracks.
    ///
    /// Returns the new color frame if the window actually moved.
    pub fn scroll<D: Song + Notifier + ?Sized>(
        &mut self,
        delta: isize,
        daw: &mut D,
    ) -> Option<Vec<Rgb>> {
        let max = daw.track_count().saturating_sub(1) as isize;
        let offset = (self.track_offset as isize + delta).clamp(0, max) as usize;
        if offset == self.track_offset {
            return None;
        }

        self.track_offset = offset;

        Some(self.on_window_shift(daw))
    }

    pub fn teardown<N: Notifier + ?Sized>(&mut self, host: &mut N) {
        self.slots.clear(host);
        self.clips.clear(host);
        self.clip_of.clear();
    }
}
