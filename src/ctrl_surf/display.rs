//! Text shown on the OP-1 screen.
//!
//! The screen only knows lower case letters, digits and a few punctuation
//! signs: anything else would show up as `?`, so it is turned into spaces.

use once_cell::sync::Lazy;

use crate::daw::{quantization, Song};

/// Max chars on the bottom line.
pub const LINE_LEN: usize = 20;

/// Separates the top & bottom lines.
pub const LINE_BREAK: char = '\r';

const PUNCTUATION: &[u8] = b" !\"#%*+,-./:;<=>@_";

static DISPLAYABLE: Lazy<[u8; 256]> = Lazy::new(|| {
    let mut table = [b' '; 256];

    for &c in PUNCTUATION {
        table[c as usize] = c;
    }
    for c in b'0'..=b'9' {
        table[c as usize] = c;
    }
    for c in b'a'..=b'z' {
        table[c as usize] = c;
        table[c.to_ascii_uppercase() as usize] = c;
    }
    table[b'|' as usize] = b'-';

    table
});

fn displayable_char(c: char) -> char {
    match u8::try_from(c) {
        Ok(byte) => DISPLAYABLE[byte as usize] as char,
        Err(_) => ' ',
    }
}

/// Converts `raw` so that the OP-1 can print it on one line.
pub fn to_displayable(raw: &str) -> String {
    let substituted: String = raw.chars().map(displayable_char).collect();

    let mut line = String::with_capacity(LINE_LEN);
    for (idx, word) in substituted.split_whitespace().enumerate() {
        if idx > 0 {
            line.push(' ');
        }
        line.push_str(word);
    }

    line.chars()
        .take(LINE_LEN)
        .collect::<String>()
        .trim_end()
        .to_string()
}

pub fn render_perform() -> String {
    format!("perform{LINE_BREAK}mode")
}

pub fn render_clip<S: Song + ?Sized>(song: &S) -> String {
    format!(
        "sel. scene{LINE_BREAK}{}",
        to_displayable(&song.selected_scene_name())
    )
}

pub fn render_mixer<S: Song + ?Sized>(song: &S) -> String {
    format!(
        "sel. track{LINE_BREAK}{}",
        to_displayable(&song.selected_track().name)
    )
}

pub fn render_transport<S: Song + ?Sized>(song: &S) -> String {
    let transport = song.transport();

    let playing = if transport.is_playing { ">" } else { "" };
    let record = if transport.record_mode { "*" } else { "" };

    // Drop the ticks, the screen is too small for them
    let song_time = transport.song_time.to_string();
    let song_time = &song_time[..song_time.len().saturating_sub(4)];

    format!(
        "{playing}{record} {} {:.2}{LINE_BREAK}{song_time}",
        quantization::short_code(transport.quantization),
        transport.tempo,
    )
}
