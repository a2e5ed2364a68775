//! OP-1 control surface.

use std::time::{Duration, Instant};

use super::{
    display,
    event::{Edit, Mixer, Navigation, Transport},
    listener::Registry,
    mixer::ChannelStrip,
    mode::{Mode, ModeSelector},
    msg::ConnectionStatus,
    protocol::{
        cc,
        sysex::{self, Rgb},
        Button, Control, Encoder,
    },
    session::{self, SessionObserver},
    ControlSurface, CtrlSurfEvent, Error, Msg,
};
use crate::{
    daw::{Daw, NavDirection, Quantization, Topic, View},
    midi,
};

#[derive(Clone, Debug)]
pub struct Config {
    pub channel: midi::Channel,
    pub num_tracks: usize,
    pub num_scenes: usize,
    pub retry_interval: Duration,
    pub max_retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: midi::Channel::default(),
            num_tracks: session::DEFAULT_NUM_TRACKS,
            num_scenes: session::DEFAULT_NUM_SCENES,
            retry_interval: Duration::from_secs(1),
            max_retries: 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Connection {
    Disconnected,
    Identifying {
        attempts: usize,
        next_attempt: Option<Instant>,
    },
    Connected,
}

pub struct Op1 {
    config: Config,
    connection: Connection,
    mode: ModeSelector,
    strip: ChannelStrip,
    session: SessionObserver,
    song_listeners: Registry<Topic>,
    shift: bool,
    e3_pushed: bool,
    e4_pushed: bool,
    detail_visible: bool,
    is_torn_down: bool,
}

impl Op1 {
    /// Builds the surface and returns the messages for its initial state.
    pub fn new(config: Config, daw: &mut dyn Daw) -> (Self, Vec<Msg>) {
        let mut this = Self {
            session: SessionObserver::new(config.num_tracks, config.num_scenes),
            config,
            connection: Connection::Disconnected,
            mode: ModeSelector::default(),
            strip: ChannelStrip::default(),
            song_listeners: Registry::default(),
            shift: false,
            e3_pushed: false,
            e4_pushed: false,
            detail_visible: daw.is_view_visible(View::Detail),
            is_torn_down: false,
        };

        for topic in [Topic::Tracks, Topic::SelectedTrack, Topic::SelectedScene] {
            this.song_listeners.insert(topic, topic, daw);
        }
        this.bind_selected_track(daw);
        this.session.rebuild(daw);

        let msgs = vec![
            sysex::encode_text(" ").to_device(),
            sysex::encode_color_frame(&this.session.reset_frame()).to_device(),
            this.color_frame(&this.session.render_color_frame(&*daw)),
            this.mode_display(daw),
        ];

        (this, msgs)
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn strip(&self) -> &ChannelStrip {
        &self.strip
    }

    pub fn session(&self) -> &SessionObserver {
        &self.session
    }

    fn bind_selected_track(&mut self, daw: &dyn Daw) {
        let master = daw.master_track().id;
        self.strip
            .bind_track(&daw.selected_track(), master, self.mode.mode());
    }

    fn color_frame(&self, colors: &[Rgb]) -> Msg {
        sysex::encode_color_frame(colors).to_device()
    }

    fn mode_display(&self, daw: &dyn Daw) -> Msg {
        let text = match self.mode.mode() {
            Mode::Perform => display::render_perform(),
            Mode::Clip => display::render_clip(daw),
            Mode::Transport => display::render_transport(daw),
            Mode::Mixer => display::render_mixer(daw),
        };

        sysex::encode_text(&text).to_device()
    }

    fn select_mode(&mut self, mode: Mode, daw: &dyn Daw) -> Vec<Msg> {
        if !self.mode.select(mode) {
            return Msg::none();
        }

        self.strip.set_encoder_routing(mode);

        self.mode_display(daw).into()
    }

    fn sysex_from_device(&mut self, msg: midi::Msg, daw: &dyn Daw) -> Vec<Msg> {
        if let Err(err) = msg.parse_sysex() {
            log::debug!("{}", Error::from(err));
            return Msg::none();
        }

        if !sysex::is_identify_response(msg.inner()) {
            log::debug!("{}", Error::UnexpectedDeviceMsg(msg.display().to_owned()));
            return Msg::none();
        }

        if self.connection == Connection::Connected {
            log::debug!("Ignoring identity reply: already connected");
            return Msg::none();
        }

        log::info!("OP-1 connected");
        self.connection = Connection::Connected;

        vec![
            ConnectionStatus::Result(Ok(())).into(),
            sysex::enable_remote_mode().to_device(),
            self.mode_display(daw),
            self.color_frame(&self.session.render_color_frame(daw)),
        ]
    }

    fn control_from_device(&mut self, control: Control, value: u8, daw: &mut dyn Daw) -> Vec<Msg> {
        let is_pressed = value == cc::PRESSED;

        match control {
            Control::Button(Button::Shift) => {
                self.shift = is_pressed;
                Msg::none()
            }
            Control::EncoderPush(Encoder::E3) => {
                self.e3_pushed = is_pressed;
                Msg::none()
            }
            Control::EncoderPush(Encoder::E4) => {
                self.e4_pushed = is_pressed;
                Msg::none()
            }
            Control::EncoderPush(_) => Msg::none(),
            Control::Encoder(encoder) if self.mode.mode() == Mode::Transport => {
                self.transport_encoder(encoder, value, daw)
            }
            Control::Button(button) if is_pressed => self.button_pressed(button, daw),
            _ => self
                .strip
                .route(control, value)
                .map_or_else(Msg::none, |event| event.to_app().into()),
        }
    }

    fn transport_encoder(&self, encoder: Encoder, value: u8, daw: &dyn Daw) -> Vec<Msg> {
        let steps = midi::relative::to_steps(value);
        if steps == 0 {
            return Msg::none();
        }
        let is_up = steps > 0;

        let event: CtrlSurfEvent = match encoder {
            Encoder::E1 => Transport::ScrubBy(if is_up { 1 } else { -1 }).into(),
            Encoder::E2 => {
                let raw = daw.transport().quantization;
                match Quantization::try_from(raw) {
                    Ok(cur) => {
                        let next = cur.step(if is_up { 1 } else { -1 });
                        if next == cur {
                            return Msg::none();
                        }
                        Transport::SetQuantization(next).into()
                    }
                    Err(err) => {
                        log::warn!("Can't step quantization: {err}");
                        return Msg::none();
                    }
                }
            }
            Encoder::E3 => Navigation::Scroll {
                direction: if is_up {
                    NavDirection::Right
                } else {
                    NavDirection::Left
                },
                view: View::Arranger,
                modifier: self.e3_pushed,
            }
            .into(),
            Encoder::E4 => {
                let direction = match (self.e4_pushed, is_up) {
                    (true, true) => NavDirection::Down,
                    (true, false) => NavDirection::Up,
                    (false, true) => NavDirection::Right,
                    (false, false) => NavDirection::Left,
                };
                Navigation::Zoom {
                    direction,
                    view: View::Arranger,
                    modifier: false,
                }
                .into()
            }
        };

        event.to_app().into()
    }

    fn button_pressed(&mut self, button: Button, daw: &mut dyn Daw) -> Vec<Msg> {
        use self::Button::*;

        if let Some(mode) = Mode::from_button(button) {
            return self.select_mode(mode, daw);
        }

        let event: CtrlSurfEvent = match button {
            Play if self.shift => Transport::PlaySelection.into(),
            Play => Transport::StartPlaying.into(),
            Stop => Transport::Stop.into(),
            Rec => Transport::ToggleRecord.into(),
            Metronome => Transport::ToggleMetronome.into(),
            Help => Transport::TapTempo.into(),
            Ss3 => Transport::ToggleLoop.into(),
            Ss4 => Transport::ToggleOverdub.into(),
            Seq if self.shift => Transport::ToggleFollowSong.into(),
            Seq => Transport::BackToArranger.into(),
            ArrowDown if self.shift => Edit::Undo.into(),
            ArrowDown => {
                let view = if daw.is_view_visible(View::Session) {
                    View::Arranger
                } else {
                    View::Session
                };
                Navigation::ShowView(view).into()
            }
            Scissor if self.shift => Edit::Redo.into(),
            Scissor => {
                self.detail_visible = !self.detail_visible;
                if self.detail_visible {
                    Navigation::ShowView(View::Detail).into()
                } else {
                    Navigation::HideView(View::Detail).into()
                }
            }
            Micro | Com => Navigation::Scroll {
                direction: if button == Micro {
                    NavDirection::Up
                } else {
                    NavDirection::Down
                },
                view: View::Arranger,
                modifier: false,
            }
            .into(),
            Ss8 => return clear_tracks(daw),
            LeftArrow | RightArrow => {
                let delta = if button == LeftArrow { -1 } else { 1 };
                return self
                    .session
                    .scroll(delta, daw)
                    .map_or_else(Msg::none, |colors| self.color_frame(&colors).into());
            }
            _ => {
                return self
                    .strip
                    .route(Control::Button(button), cc::PRESSED)
                    .map_or_else(Msg::none, |event| event.to_app().into());
            }
        };

        event.to_app().into()
    }
}

/// Releases solo & mute of every track, as well as arm when possible.
fn clear_tracks(daw: &dyn Daw) -> Vec<Msg> {
    daw.tracks()
        .into_iter()
        .map(|track| {
            Msg::from(Mixer::Clear {
                track: track.id,
                disarm: track.can_be_armed,
            })
        })
        .collect()
}

impl ControlSurface for Op1 {
    fn msg_from_device(&mut self, msg: midi::Msg, daw: &mut dyn Daw) -> Vec<Msg> {
        log::trace!("Device: {}", msg.display());

        if self.is_torn_down {
            return Msg::none();
        }

        if msg.is_sysex() {
            return self.sysex_from_device(msg, daw);
        }

        match *msg.inner() {
            [tag_chan, number, value] if midi::Tag::from(tag_chan) == midi::control_change::TAG => {
                if midi::Channel::from(tag_chan) != self.config.channel {
                    log::trace!("Ignoring CC on another channel");
                    return Msg::none();
                }

                match Control::from_cc(number) {
                    Some(control) => self.control_from_device(control, value, daw),
                    None => {
                        log::debug!("Unassigned CC {number}");
                        Msg::none()
                    }
                }
            }
            _ => Msg::none(),
        }
    }

    fn daw_event(&mut self, topic: Topic, daw: &mut dyn Daw) -> Vec<Msg> {
        if self.is_torn_down {
            log::trace!("Ignoring {topic:?} after disconnection");
            return Msg::none();
        }

        match topic {
            Topic::Tracks => self.rebuild_midi_map(daw),
            Topic::SelectedTrack => {
                self.bind_selected_track(daw);
                if self.mode.mode() == Mode::Mixer {
                    self.mode_display(daw).into()
                } else {
                    Msg::none()
                }
            }
            Topic::SelectedScene if self.mode.mode() == Mode::Clip => self.mode_display(daw).into(),
            Topic::SelectedScene => Msg::none(),
            Topic::HasClip(slot) => self
                .session
                .on_slot_changed(slot, daw)
                .map_or_else(Msg::none, |colors| self.color_frame(&colors).into()),
            Topic::ClipColor(clip) => self
                .session
                .on_clip_color_changed(clip, &*daw)
                .map_or_else(Msg::none, |colors| self.color_frame(&colors).into()),
        }
    }

    fn tick(&mut self, now: Instant, daw: &mut dyn Daw) -> Vec<Msg> {
        if self.is_torn_down {
            return Msg::none();
        }

        let mut msgs = Msg::none();

        let attempts = match self.connection {
            Connection::Disconnected => Some(0),
            Connection::Identifying {
                attempts,
                next_attempt: Some(next_attempt),
            } if now >= next_attempt => Some(attempts),
            _ => None,
        };

        if let Some(attempts) = attempts {
            if attempts < self.config.max_retries {
                log::info!(
                    "Trying OP-1 connection ({}/{})",
                    attempts + 1,
                    self.config.max_retries,
                );
                self.connection = Connection::Identifying {
                    attempts: attempts + 1,
                    next_attempt: Some(now + self.config.retry_interval),
                };
                msgs.push(ConnectionStatus::InProgress.into());
                msgs.push(sysex::identify_request().to_device());
            } else {
                self.connection = Connection::Identifying {
                    attempts,
                    next_attempt: None,
                };
                let err = Error::NoIdentifyResponse { attempts };
                msgs.push(ConnectionStatus::Result(Err(err)).into());
            }
        }

        if self.is_connected() && self.mode.mode() == Mode::Transport {
            msgs.push(self.mode_display(daw));
        }

        self.detail_visible = daw.is_view_visible(View::Detail);

        msgs
    }

    fn rebuild_midi_map(&mut self, daw: &mut dyn Daw) -> Vec<Msg> {
        if self.is_torn_down {
            return Msg::none();
        }

        let colors = self.session.on_window_shift(daw);
        self.color_frame(&colors).into()
    }

    fn refresh_state(&mut self) {
        log::debug!("Refreshing state");
        self.connection = Connection::Disconnected;
    }

    fn disconnect(&mut self, daw: &mut dyn Daw) -> Vec<Msg> {
        if self.is_torn_down {
            return Msg::none();
        }

        log::info!("Disconnecting OP-1");

        self.session.teardown(daw);
        self.song_listeners.clear(daw);
        self.strip.clear();
        self.connection = Connection::Disconnected;
        self.is_torn_down = true;

        sysex::disable_remote_mode().to_device().into()
    }

    fn is_connected(&self) -> bool {
        self.connection == Connection::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daw::{sandbox::Session, Notifier, Song};

    const IDENTITY_REPLY: [u8; 12] = [
        0xf0, 0x7e, 0x00, 0x06, 0x02, 0x00, 32, 118, 0x00, 0x00, 0x00, 0xf7,
    ];

    fn cc_msg(control: impl Into<Control>, value: u8) -> midi::Msg {
        let control: Control = control.into();
        let tag_chan = midi::control_change::TAG | midi::Channel::default();
        [tag_chan, control.cc(), value].into()
    }

    /// Applies the DAW commands, returns the device frames.
    fn apply(msgs: Vec<Msg>, session: &mut Session) -> Vec<midi::Msg> {
        let mut frames = Vec::new();
        for msg in msgs {
            match msg {
                Msg::ToApp(event) => session.handle_event(event),
                Msg::ToDevice(frame) => frames.push(frame),
                Msg::ConnectionStatus(_) => (),
            }
        }

        frames
    }

    fn events(msgs: &[Msg]) -> Vec<CtrlSurfEvent> {
        msgs.iter()
            .filter_map(|msg| match msg {
                Msg::ToApp(event) => Some(*event),
                _ => None,
            })
            .collect()
    }

    fn count(frames: &[midi::Msg], expected: &[u8]) -> usize {
        frames.iter().filter(|frame| frame.inner() == expected).count()
    }

    fn setup() -> (Op1, Session) {
        let mut session = Session::new();
        for name in ["intro", "verse", "chorus"] {
            session.add_scene(name);
        }
        for (name, can_be_armed) in [("Drums", true), ("Lead Synth!! ", true), ("Bus", false)] {
            session.add_track(name, can_be_armed);
        }
        session.set_clip(0, 0, Some(0xff0000));
        session.select_track(Some(0));
        session.take_notifications();

        let (op1, _) = Op1::new(Config::default(), &mut session);

        (op1, session)
    }

    fn assert_no_leak(session: &Session) {
        assert_eq!(session.listener_count(), 0);
        assert_eq!(session.dangling_removals(), 0);
    }

    #[test]
    fn startup_frames() {
        let mut session = Session::new();
        session.add_scene("intro");
        session.add_track("bass", true);

        let (op1, msgs) = Op1::new(Config::default(), &mut session);
        let frames = apply(msgs, &mut session);

        assert_eq!(frames[0], sysex::encode_text(""));
        assert_eq!(frames[1], sysex::encode_color_frame(&[Rgb::BLACK; 8]));
        assert_eq!(frames[2], sysex::encode_color_frame(&[Rgb::BLACK]));
        assert_eq!(frames[3], sysex::encode_text("perform\rmode"));
        assert_eq!(op1.mode(), Mode::Perform);
        assert!(!op1.is_connected());
    }

    #[test]
    fn identify_connects_once() {
        let (mut op1, mut session) = setup();
        let enable = sysex::ENABLE_REMOTE_MODE;

        let frames = apply(op1.tick(Instant::now(), &mut session), &mut session);
        assert_eq!(count(&frames, &sysex::IDENTIFY_REQUEST), 1);

        let msgs = op1.msg_from_device(IDENTITY_REPLY.into(), &mut session);
        assert!(matches!(
            msgs[0],
            Msg::ConnectionStatus(ConnectionStatus::Result(Ok(())))
        ));
        let frames = apply(msgs, &mut session);
        assert_eq!(count(&frames, &enable), 1);
        assert!(op1.is_connected());

        let frames = apply(
            op1.msg_from_device(IDENTITY_REPLY.into(), &mut session),
            &mut session,
        );
        assert_eq!(count(&frames, &enable), 0);

        // No more identify requests once connected
        let frames = apply(
            op1.tick(Instant::now() + Duration::from_secs(2), &mut session),
            &mut session,
        );
        assert_eq!(count(&frames, &sysex::IDENTIFY_REQUEST), 0);
    }

    #[test]
    fn foreign_sysex() {
        let (mut op1, mut session) = setup();

        let mut reply = IDENTITY_REPLY;
        reply[6] = 0x00;
        assert!(op1.msg_from_device(reply.into(), &mut session).is_empty());
        assert!(op1
            .msg_from_device([0xf0, 0x7e].into(), &mut session)
            .is_empty());
        assert!(!op1.is_connected());
    }

    #[test]
    fn bounded_identify_retries() {
        let (mut op1, mut session) = setup();
        let start = Instant::now();

        let mut requests = 0;
        let mut failures = 0;
        for idx in 0..20u64 {
            let msgs = op1.tick(start + Duration::from_millis(500 * idx), &mut session);
            failures += msgs
                .iter()
                .filter(|msg| {
                    matches!(
                        msg,
                        Msg::ConnectionStatus(ConnectionStatus::Result(Err(
                            Error::NoIdentifyResponse { attempts: 5 }
                        )))
                    )
                })
                .count();
            let frames = apply(msgs, &mut session);
            requests += count(&frames, &sysex::IDENTIFY_REQUEST);

            // Attempts are at least one retry interval apart
            if idx % 2 == 1 {
                assert_eq!(count(&frames, &sysex::IDENTIFY_REQUEST), 0);
            }
        }
        assert_eq!(requests, 5);
        assert_eq!(failures, 1);

        op1.refresh_state();
        let frames = apply(
            op1.tick(start + Duration::from_secs(30), &mut session),
            &mut session,
        );
        assert_eq!(count(&frames, &sysex::IDENTIFY_REQUEST), 1);
    }

    #[test]
    fn transport_mode_releases_encoders() {
        let (mut op1, mut session) = setup();
        assert_eq!(op1.strip().bound_controls().len(), 7);

        let msgs = op1.msg_from_device(cc_msg(Button::Mode3, cc::PRESSED), &mut session);
        assert_eq!(op1.mode(), Mode::Transport);
        let frames = apply(msgs, &mut session);
        assert_eq!(frames, vec![sysex::encode_text(" 1b 120.00\r1.1.1")]);

        let bound = op1.strip().bound_controls();
        assert_eq!(bound.len(), 3);
        for button in [Button::Ss5, Button::Ss6, Button::Ss7] {
            assert!(bound.iter().any(|(c, _)| *c == Control::Button(button)));
        }

        // Encoders now drive the transport
        let msgs = op1.msg_from_device(cc_msg(Encoder::E1, 1), &mut session);
        assert_eq!(events(&msgs), [CtrlSurfEvent::from(Transport::ScrubBy(1))]);

        // Pressing the active mode button again does nothing
        assert!(op1
            .msg_from_device(cc_msg(Button::Mode3, cc::PRESSED), &mut session)
            .is_empty());

        op1.msg_from_device(cc_msg(Button::Mode1, cc::PRESSED), &mut session);
        assert_eq!(op1.strip().bound_controls().len(), 7);
    }

    #[test]
    fn mixer_mode_shows_selected_track() {
        let (mut op1, mut session) = setup();

        let frames = apply(
            op1.msg_from_device(cc_msg(Button::Mode4, cc::PRESSED), &mut session),
            &mut session,
        );
        assert_eq!(frames, vec![sysex::encode_text("sel. track\rdrums")]);

        session.select_track(Some(1));
        assert_eq!(session.take_notifications(), vec![Topic::SelectedTrack]);
        let frames = apply(
            op1.daw_event(Topic::SelectedTrack, &mut session),
            &mut session,
        );
        assert_eq!(frames, vec![sysex::encode_text("sel. track\rlead synth!!")]);

        let lead = session.track_state(1).unwrap().track.id;
        assert!(op1.strip().bound_controls().iter().all(|(_, id)| *id == lead));

        // Master can't be muted nor armed
        session.select_track(None);
        op1.daw_event(Topic::SelectedTrack, &mut session);
        let bound = op1.strip().bound_controls();
        assert_eq!(bound.len(), 5);
        assert!(!bound.iter().any(|(c, _)| *c == Control::Button(Button::Ss5)));
    }

    #[test]
    fn clip_mode_shows_selected_scene() {
        let (mut op1, mut session) = setup();

        session.select_scene(2);
        assert!(op1.daw_event(Topic::SelectedScene, &mut session).is_empty());

        let frames = apply(
            op1.msg_from_device(cc_msg(Button::Mode2, cc::PRESSED), &mut session),
            &mut session,
        );
        assert_eq!(frames, vec![sysex::encode_text("sel. scene\rchorus")]);

        session.select_scene(1);
        let frames = apply(
            op1.daw_event(Topic::SelectedScene, &mut session),
            &mut session,
        );
        assert_eq!(frames, vec![sysex::encode_text("sel. scene\rverse")]);
    }

    #[test]
    fn strip_commands() {
        let (mut op1, mut session) = setup();
        let drums = session.track_state(0).unwrap().track.id;

        let msgs = op1.msg_from_device(cc_msg(Encoder::E1, 127), &mut session);
        assert_eq!(events(&msgs), [CtrlSurfEvent::from(Mixer::Volume(drums, -1))]);

        for button in [Button::Ss5, Button::Ss6, Button::Ss7] {
            apply(
                op1.msg_from_device(cc_msg(button, cc::PRESSED), &mut session),
                &mut session,
            );
            apply(
                op1.msg_from_device(cc_msg(button, cc::RELEASED), &mut session),
                &mut session,
            );
        }
        let state = session.track_state(0).unwrap();
        assert!(state.mute && state.solo && state.arm);

        session.track_state_mut(1).unwrap().solo = true;
        let msgs = op1.msg_from_device(cc_msg(Button::Ss8, cc::PRESSED), &mut session);
        assert_eq!(events(&msgs).len(), 3);
        apply(msgs, &mut session);
        for idx in 0..3 {
            let state = session.track_state(idx).unwrap();
            assert!(!state.mute && !state.solo && !state.arm);
        }
    }

    #[test]
    fn shift_modifier() {
        let (mut op1, mut session) = setup();

        let play = op1.msg_from_device(cc_msg(Button::Play, cc::PRESSED), &mut session);
        assert_eq!(events(&play), [CtrlSurfEvent::from(Transport::StartPlaying)]);

        op1.msg_from_device(cc_msg(Button::Shift, cc::PRESSED), &mut session);
        let play = op1.msg_from_device(cc_msg(Button::Play, cc::PRESSED), &mut session);
        assert_eq!(events(&play), [CtrlSurfEvent::from(Transport::PlaySelection)]);
        let seq = op1.msg_from_device(cc_msg(Button::Seq, cc::PRESSED), &mut session);
        assert_eq!(events(&seq), [CtrlSurfEvent::from(Transport::ToggleFollowSong)]);
        let undo = op1.msg_from_device(cc_msg(Button::ArrowDown, cc::PRESSED), &mut session);
        assert_eq!(events(&undo), [CtrlSurfEvent::from(Edit::Undo)]);
        let redo = op1.msg_from_device(cc_msg(Button::Scissor, cc::PRESSED), &mut session);
        assert_eq!(events(&redo), [CtrlSurfEvent::from(Edit::Redo)]);
        assert_eq!(op1.mode(), Mode::Perform);

        op1.msg_from_device(cc_msg(Button::Shift, cc::RELEASED), &mut session);
        let seq = op1.msg_from_device(cc_msg(Button::Seq, cc::PRESSED), &mut session);
        assert_eq!(events(&seq), [CtrlSurfEvent::from(Transport::BackToArranger)]);
    }

    #[test]
    fn views() {
        let (mut op1, mut session) = setup();

        let msgs = op1.msg_from_device(cc_msg(Button::ArrowDown, cc::PRESSED), &mut session);
        assert_eq!(
            events(&msgs),
            [CtrlSurfEvent::from(Navigation::ShowView(View::Arranger))]
        );
        apply(msgs, &mut session);
        assert!(!session.is_view_visible(View::Session));

        let msgs = op1.msg_from_device(cc_msg(Button::Scissor, cc::PRESSED), &mut session);
        apply(msgs, &mut session);
        assert!(session.is_view_visible(View::Detail));
        let msgs = op1.msg_from_device(cc_msg(Button::Scissor, cc::PRESSED), &mut session);
        assert_eq!(
            events(&msgs),
            [CtrlSurfEvent::from(Navigation::HideView(View::Detail))]
        );
    }

    #[test]
    fn transport_encoders() {
        let (mut op1, mut session) = setup();
        op1.msg_from_device(cc_msg(Button::Mode3, cc::PRESSED), &mut session);

        let msgs = op1.msg_from_device(cc_msg(Encoder::E2, 1), &mut session);
        assert_eq!(
            events(&msgs),
            [CtrlSurfEvent::from(Transport::SetQuantization(Quantization::Half))]
        );

        session.set_quantization(Quantization::ThirtySecond.into());
        assert!(op1
            .msg_from_device(cc_msg(Encoder::E2, 1), &mut session)
            .is_empty());

        session.set_quantization(42);
        assert!(op1
            .msg_from_device(cc_msg(Encoder::E2, 127), &mut session)
            .is_empty());

        op1.msg_from_device(
            cc_msg(Control::EncoderPush(Encoder::E3), cc::PRESSED),
            &mut session,
        );
        let msgs = op1.msg_from_device(cc_msg(Encoder::E3, 127), &mut session);
        assert_eq!(
            events(&msgs),
            [CtrlSurfEvent::from(Navigation::Scroll {
                direction: NavDirection::Left,
                view: View::Arranger,
                modifier: true,
            }
            )]
        );

        op1.msg_from_device(
            cc_msg(Control::EncoderPush(Encoder::E4), cc::PRESSED),
            &mut session,
        );
        let msgs = op1.msg_from_device(cc_msg(Encoder::E4, 2), &mut session);
        assert_eq!(
            events(&msgs),
            [CtrlSurfEvent::from(Navigation::Zoom {
                direction: NavDirection::Down,
                view: View::Arranger,
                modifier: false,
            }
            )]
        );
    }

    #[test]
    fn transport_display_polled_when_connected() {
        let (mut op1, mut session) = setup();
        op1.msg_from_device(cc_msg(Button::Mode3, cc::PRESSED), &mut session);

        let frames = apply(op1.tick(Instant::now(), &mut session), &mut session);
        assert_eq!(count(&frames, &sysex::encode_text(" 1b 120.00\r1.1.1")), 0);

        op1.msg_from_device(IDENTITY_REPLY.into(), &mut session);
        session.set_position(4f64);
        let frames = apply(op1.tick(Instant::now(), &mut session), &mut session);
        assert_eq!(frames, vec![sysex::encode_text(" 1b 120.00\r2.1.1")]);
    }

    #[test]
    fn clip_colors() {
        let (mut op1, mut session) = setup();

        session.set_clip(1, 0, Some(0x00ff00));
        let topics = session.take_notifications();
        assert_eq!(topics.len(), 1);

        let frames = apply(op1.daw_event(topics[0], &mut session), &mut session);
        let expected = [
            Rgb::from_clip_color(0xff0000),
            Rgb::from_clip_color(0x00ff00),
            Rgb::BLACK,
        ];
        assert_eq!(frames, vec![sysex::encode_color_frame(&expected)]);

        session.set_clip_color(1, 0, 0x0000ff);
        let topics = session.take_notifications();
        let frames = apply(op1.daw_event(topics[0], &mut session), &mut session);
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0].inner()[7..10], &[0x7f, 0, 0]);
        assert_eq!(&frames[0].inner()[10..13], &[0, 0, 0x7f]);
    }

    #[test]
    fn no_leak_after_window_shift_and_disconnect() {
        let (mut op1, mut session) = setup();
        for idx in 0..10 {
            session.add_track(&format!("track {idx}"), idx % 2 == 0);
        }
        session.set_clip(8, 0, Some(0x123456));
        let topics = session.take_notifications();
        assert!(topics.contains(&Topic::Tracks));
        for topic in topics {
            op1.daw_event(topic, &mut session);
        }

        let frames = apply(
            op1.msg_from_device(cc_msg(Button::RightArrow, cc::PRESSED), &mut session),
            &mut session,
        );
        assert_eq!(frames.len(), 1);
        assert_eq!(op1.session().track_offset(), 1);
        assert_eq!(op1.session().observed_slots().count(), 8 * 3);

        // 3 song listeners, 24 slots & one clip
        assert_eq!(session.listener_count(), 3 + 8 * 3 + 1);

        op1.msg_from_device(cc_msg(Button::LeftArrow, cc::PRESSED), &mut session);
        assert_eq!(op1.session().track_offset(), 0);
        assert_eq!(session.listener_count(), 3 + 8 * 3 + 1);

        let frames = apply(op1.disconnect(&mut session), &mut session);
        assert_eq!(frames, vec![sysex::disable_remote_mode()]);
        assert!(op1.strip().bound_controls().is_empty());
        assert_no_leak(&session);

        assert!(op1.disconnect(&mut session).is_empty());
        assert_no_leak(&session);
    }

    #[test]
    fn stays_silent_after_disconnect() {
        let (mut op1, mut session) = setup();
        apply(op1.disconnect(&mut session), &mut session);

        let start = Instant::now();
        for secs in 0..10 {
            assert!(op1
                .tick(start + Duration::from_secs(secs), &mut session)
                .is_empty());
        }

        session.select_track(Some(1));
        assert!(op1.daw_event(Topic::SelectedTrack, &mut session).is_empty());
        assert!(op1.daw_event(Topic::Tracks, &mut session).is_empty());
        assert!(op1.rebuild_midi_map(&mut session).is_empty());
        assert!(op1.strip().bound_controls().is_empty());

        assert!(op1
            .msg_from_device(IDENTITY_REPLY.into(), &mut session)
            .is_empty());
        assert!(op1
            .msg_from_device(cc_msg(Button::Play, cc::PRESSED), &mut session)
            .is_empty());
        assert!(!op1.is_connected());
        assert_no_leak(&session);
    }

    #[test]
    fn removed_tracks_are_released() {
        let (mut op1, mut session) = setup();

        session.remove_track(0);
        for topic in session.take_notifications() {
            op1.daw_event(topic, &mut session);
        }
        assert_eq!(op1.strip().track(), Some(session.master_track().id));

        op1.disconnect(&mut session);
        assert_no_leak(&session);
    }
}
