//! OP-1 control change assignments in remote mode.

pub const PRESSED: u8 = 127;
pub const RELEASED: u8 = 0;

mod number {
    pub const ENCODER_1: u8 = 1;
    pub const ENCODER_2: u8 = 2;
    pub const ENCODER_3: u8 = 3;
    pub const ENCODER_4: u8 = 4;

    pub const HELP: u8 = 5;
    pub const METRONOME: u8 = 6;
    pub const MODE_1: u8 = 7;
    pub const MODE_2: u8 = 8;
    pub const MODE_3: u8 = 9;
    pub const MODE_4: u8 = 10;
    pub const ARROW_DOWN: u8 = 16;
    pub const SCISSOR: u8 = 17;
    pub const SEQ: u8 = 26;
    pub const REC: u8 = 38;
    pub const PLAY: u8 = 39;
    pub const STOP: u8 = 40;
    pub const LEFT_ARROW: u8 = 41;
    pub const RIGHT_ARROW: u8 = 42;
    pub const SHIFT: u8 = 43;
    pub const MICRO: u8 = 48;
    pub const COM: u8 = 49;
    pub const SS3: u8 = 52;
    pub const SS4: u8 = 53;
    pub const SS5: u8 = 54;
    pub const SS6: u8 = 55;
    pub const SS7: u8 = 56;
    pub const SS8: u8 = 57;

    pub const ENCODER_1_PUSH: u8 = 64;
    pub const ENCODER_2_PUSH: u8 = 65;
    pub const ENCODER_3_PUSH: u8 = 66;
    pub const ENCODER_4_PUSH: u8 = 67;
}

/// The four color encoders, left to right.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Encoder {
    E1,
    E2,
    E3,
    E4,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Button {
    Help,
    Metronome,
    Mode1,
    Mode2,
    Mode3,
    Mode4,
    ArrowDown,
    Scissor,
    Seq,
    Rec,
    Play,
    Stop,
    LeftArrow,
    RightArrow,
    Shift,
    Micro,
    Com,
    Ss3,
    Ss4,
    Ss5,
    Ss6,
    Ss7,
    Ss8,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Control {
    Encoder(Encoder),
    EncoderPush(Encoder),
    Button(Button),
}

impl Control {
    pub fn from_cc(cc: u8) -> Option<Self> {
        use number::*;
        use Button::*;
        use Control::Button as B;
        use Encoder::*;

        let control = match cc {
            ENCODER_1 => Control::Encoder(E1),
            ENCODER_2 => Control::Encoder(E2),
            ENCODER_3 => Control::Encoder(E3),
            ENCODER_4 => Control::Encoder(E4),
            ENCODER_1_PUSH => Control::EncoderPush(E1),
            ENCODER_2_PUSH => Control::EncoderPush(E2),
            ENCODER_3_PUSH => Control::EncoderPush(E3),
            ENCODER_4_PUSH => Control::EncoderPush(E4),
            HELP => B(Help),
            METRONOME => B(Metronome),
            MODE_1 => B(Mode1),
            MODE_2 => B(Mode2),
            MODE_3 => B(Mode3),
            MODE_4 => B(Mode4),
            ARROW_DOWN => B(ArrowDown),
            SCISSOR => B(Scissor),
            SEQ => B(Seq),
            REC => B(Rec),
            PLAY => B(Play),
            STOP => B(Stop),
            LEFT_ARROW => B(LeftArrow),
            RIGHT_ARROW => B(RightArrow),
            SHIFT => B(Shift),
            MICRO => B(Micro),
            COM => B(Com),
            SS3 => B(Ss3),
            SS4 => B(Ss4),
            SS5 => B(Ss5),
            SS6 => B(Ss6),
            SS7 => B(Ss7),
            SS8 => B(Ss8),
            _ => return None,
        };

        Some(control)
    }

    pub fn cc(self) -> u8 {
        use number::*;
        use Button::*;
        use Encoder::*;

        match self {
            Control::Encoder(E1) => ENCODER_1,
            Control::Encoder(E2) => ENCODER_2,
            Control::Encoder(E3) => ENCODER_3,
            Control::Encoder(E4) => ENCODER_4,
            Control::EncoderPush(E1) => ENCODER_1_PUSH,
            Control::EncoderPush(E2) => ENCODER_2_PUSH,
            Control::EncoderPush(E3) => ENCODER_3_PUSH,
            Control::EncoderPush(E4) => ENCODER_4_PUSH,
            Control::Button(button) => match button {
                Help => HELP,
                Metronome => METRONOME,
                Mode1 => MODE_1,
                Mode2 => MODE_2,
                Mode3 => MODE_3,
                Mode4 => MODE_4,
                ArrowDown => ARROW_DOWN,
                Scissor => SCISSOR,
                Seq => SEQ,
                Rec => REC,
                Play => PLAY,
                Stop => STOP,
                LeftArrow => LEFT_ARROW,
                RightArrow => RIGHT_ARROW,
                Shift => SHIFT,
                Micro => MICRO,
                Com => COM,
                Ss3 => SS3,
                Ss4 => SS4,
                Ss5 => SS5,
                Ss6 => SS6,
                Ss7 => SS7,
                Ss8 => SS8,
            },
        }
    }
}

impl From<Encoder> for Control {
    fn from(encoder: Encoder) -> Self {
        Control::Encoder(encoder)
    }
}

impl From<Button> for Control {
    fn from(button: Button) -> Self {
        Control::Button(button)
    }
}
