use std::fmt;

use super::protocol::Button;

/// Operation mode, selected with the four mode buttons.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Perform,
    Clip,
    Transport,
    Mixer,
}

impl Mode {
    pub fn from_button(button: Button) -> Option<Self> {
        use Button::*;
        match button {
            Mode1 => Some(Mode::Perform),
            Mode2 => Some(Mode::Clip),
            Mode3 => Some(Mode::Transport),
            Mode4 => Some(Mode::Mixer),
            _ => None,
        }
    }

    /// Whether the encoders drive the selected channel strip.
    ///
    /// In `Transport` mode, they drive song position, quantization
    /// and the arranger view instead.
    pub fn routes_encoders_to_strip(self) -> bool {
        self != Mode::Transport
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Perform => "Perform",
            Mode::Clip => "Clip",
            Mode::Transport => "Transport",
            Mode::Mixer => "Mixer",
        })
    }
}

#[derive(Debug, Default)]
pub struct ModeSelector {
    mode: Mode,
}

impl ModeSelector {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Selects `mode`, returns `true` if it differs from the previous one.
    pub fn select(&mut self, mode: Mode) -> bool {
        if self.mode == mode {
            return false;
        }

        log::debug!("Mode {} -> {mode}", self.mode);
        self.mode = mode;

        true
    }
}
