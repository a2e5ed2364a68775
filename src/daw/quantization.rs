use std::fmt;

/// Clip trigger quantization, in the order the encoder steps through it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Quantization {
    None,
    EightBars,
    FourBars,
    TwoBars,
    Bar,
    Half,
    HalfTriplet,
    Quarter,
    QuarterTriplet,
    Eighth,
    EighthTriplet,
    Sixteenth,
    SixteenthTriplet,
    ThirtySecond,
}

/// Short code shown when the host reports a value we don't know of.
pub const UNKNOWN_CODE: &str = ":(";

impl Quantization {
    pub const ORDER: [Quantization; 14] = [
        Quantization::None,
        Quantization::EightBars,
        Quantization::FourBars,
        Quantization::TwoBars,
        Quantization::Bar,
        Quantization::Half,
        Quantization::HalfTriplet,
        Quantization::Quarter,
        Quantization::QuarterTriplet,
        Quantization::Eighth,
        Quantization::EighthTriplet,
        Quantization::Sixteenth,
        Quantization::SixteenthTriplet,
        Quantization::ThirtySecond,
    ];

    /// Returns the value at `idx`, clamped to the first / last value.
    pub fn from_index(idx: isize) -> Self {
        let idx = idx.clamp(0, Self::ORDER.len() as isize - 1);
        Self::ORDER[idx as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Moves `steps` positions in the order, stopping at both ends.
    pub fn step(self, steps: isize) -> Self {
        Self::from_index(self.index() as isize + steps)
    }

    pub fn short_code(self) -> &'static str {
        use Quantization::*;
        match self {
            None => "non",
            EightBars => "8b",
            FourBars => "4b",
            TwoBars => "2b",
            Bar => "1b",
            Half => "/2",
            HalfTriplet => "/2t",
            Quarter => "/4",
            QuarterTriplet => "/4t",
            Eighth => "/8",
            EighthTriplet => "/8t",
            Sixteenth => "/16",
            SixteenthTriplet => "/16t",
            ThirtySecond => "/32",
        }
    }
}

/// Short code for a raw host value.
pub fn short_code(raw: u8) -> &'static str {
    Quantization::try_from(raw).map_or(UNKNOWN_CODE, Quantization::short_code)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("Unknown quantization value {}", .0)]
pub struct UnknownQuantization(pub u8);

impl TryFrom<u8> for Quantization {
    type Error = UnknownQuantization;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::ORDER
            .get(raw as usize)
            .copied()
            .ok_or(UnknownQuantization(raw))
    }
}

impl From<Quantization> for u8 {
    fn from(q: Quantization) -> u8 {
        q as u8
    }
}

impl fmt::Display for Quantization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_code())
    }
}
