use crossbeam_channel as channel;
use std::{
    ops::ControlFlow,
    time::{Duration, Instant},
};

use crate::{
    ctrl_surf::{self, msg::ConnectionStatus, ControlSurface},
    daw::Daw,
    midi::{self, port::InOutManager},
};

/// Notifications raised while handling notifications are handled in
/// follow-up rounds, up to this limit.
const MAX_NOTIFICATION_ROUNDS: usize = 8;

/// Requests from the host application.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Request {
    /// Restarts the device identification, e.g. after the ports were reconnected.
    ResetControlSurface,
    Shutdown,
}

/// Where the messages for the device go.
pub trait DeviceOut {
    fn send(&mut self, msg: &midi::Msg) -> Result<(), midi::Error>;
}

impl DeviceOut for InOutManager {
    fn send(&mut self, msg: &midi::Msg) -> Result<(), midi::Error> {
        InOutManager::send(self, msg)
    }
}

/// Routes messages between the device, the control surface and the DAW.
pub struct Bridge<O, D> {
    out: O,
    ctrl_surf: Box<dyn ControlSurface>,
    daw: D,
    last_tick: Option<Instant>,
}

impl<O: DeviceOut, D: Daw> Bridge<O, D> {
    /// Builds the bridge and forwards the surface `startup` messages.
    pub fn new(
        out: O,
        ctrl_surf: Box<dyn ControlSurface>,
        startup: Vec<ctrl_surf::Msg>,
        daw: D,
    ) -> Self {
        let mut this = Self {
            out,
            ctrl_surf,
            daw,
            last_tick: None,
        };

        this.handle_ctrl_surf_resp(startup);

        this
    }

    pub fn daw(&self) -> &D {
        &self.daw
    }

    pub fn out(&self) -> &O {
        &self.out
    }

    pub fn out_mut(&mut self) -> &mut O {
        &mut self.out
    }

    pub fn is_connected(&self) -> bool {
        self.ctrl_surf.is_connected()
    }

    pub fn handle_midi_msg(&mut self, msg: midi::Msg) {
        let resp = self.ctrl_surf.msg_from_device(msg, &mut self.daw);
        self.handle_ctrl_surf_resp(resp);
        self.dispatch_notifications();
    }

    pub fn handle_tick(&mut self, now: Instant) {
        if let Some(last_tick) = self.last_tick {
            self.daw.tick(now.saturating_duration_since(last_tick));
        }
        self.last_tick = Some(now);

        let resp = self.ctrl_surf.tick(now, &mut self.daw);
        self.handle_ctrl_surf_resp(resp);
        self.dispatch_notifications();
    }

    /// Restarts the device identification on next tick.
    pub fn refresh_state(&mut self) {
        self.ctrl_surf.refresh_state();
    }

    pub fn handle_request(&mut self, request: Request) -> ControlFlow<()> {
        use Request::*;
        match request {
            ResetControlSurface => {
                log::info!("Resetting control surface");
                self.refresh_state();
            }
            Shutdown => {
                log::info!("Shutdown requested");
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    /// Releases the DAW & leaves the device remote mode.
    pub fn shutdown(&mut self) {
        // Pending notifications would target released listeners
        let _ = self.daw.take_notifications();

        let resp = self.ctrl_surf.disconnect(&mut self.daw);
        self.handle_ctrl_surf_resp(resp);
    }

    fn dispatch_notifications(&mut self) {
        for _ in 0..MAX_NOTIFICATION_ROUNDS {
            let topics = self.daw.take_notifications();
            if topics.is_empty() {
                return;
            }

            for topic in topics {
                log::trace!("DAW: {topic:?}");
                let resp = self.ctrl_surf.daw_event(topic, &mut self.daw);
                self.handle_ctrl_surf_resp(resp);
            }
        }

        log::warn!("DAW notifications still pending after {MAX_NOTIFICATION_ROUNDS} rounds");
    }

    fn handle_ctrl_surf_resp(&mut self, resp: Vec<ctrl_surf::Msg>) {
        for msg in resp {
            match msg {
                ctrl_surf::Msg::ToApp(event) => {
                    log::debug!("Ctrl surf: {event:?}");
                    self.daw.handle_event(event);
                }
                ctrl_surf::Msg::ToDevice(msg) => {
                    if let Err(err) = self.out.send(&msg) {
                        log::warn!("Couldn't send {} to device: {err}", msg.display());
                    }
                }
                ctrl_surf::Msg::ConnectionStatus(status) => match status {
                    ConnectionStatus::InProgress => (),
                    ConnectionStatus::Result(Ok(())) => {
                        log::info!("Ctrl surf device handshake success");
                    }
                    ConnectionStatus::Result(Err(err)) => {
                        log::warn!("Ctrl surf device handshake: {err}");
                    }
                },
            }
        }
    }

    /// Runs until a `Shutdown` request or a channel disconnects.
    pub fn run_loop(
        mut self,
        midi_rx: channel::Receiver<midi::Msg>,
        tick_interval: Duration,
        req_rx: channel::Receiver<Request>,
    ) -> Self {
        let ticker = channel::tick(tick_interval);

        loop {
            channel::select! {
                recv(midi_rx) -> midi_msg => {
                    match midi_msg {
                        Ok(midi_msg) => self.handle_midi_msg(midi_msg),
                        Err(err) => {
                            log::error!("Error MIDI msg channel: {err}");
                            break;
                        }
                    }
                }
                recv(ticker) -> now => {
                    match now {
                        Ok(now) => self.handle_tick(now),
                        Err(err) => {
                            log::error!("Error ticker channel: {err}");
                            break;
                        }
                    }
                }
                recv(req_rx) -> request => {
                    match request {
                        Ok(request) => {
                            if self.handle_request(request).is_break() {
                                break;
                            }
                        }
                        Err(err) => {
                            log::error!("Error request channel: {err}");
                            break;
                        }
                    }
                }
            }
        }

        self.shutdown();
        log::debug!("Shutting down bridge loop");

        self
    }
}
