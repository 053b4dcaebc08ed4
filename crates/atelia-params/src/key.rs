//! The closed set of parameter key codes and their per-key value grammars.

/// Output formats accepted for the `f` key.
const FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// A generation parameter key.
///
/// Each key carries its own small value parser instead of one composite
/// pattern, so "ignore what doesn't validate" is local to the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKey {
    /// Natural-language snippet appended to the prompt.
    S,
    /// Candidate count, 1–4.
    Cc,
    /// Temperature, 0–1.
    T,
    /// Top-p, 1–2.
    Tp,
    /// Max output tokens.
    Mot,
    /// Aspect ratio, `w:h`.
    Ar,
    /// Output format (png, jpg, jpeg, webp).
    F,
    /// Upscale model name.
    Um,
    /// Upscale scale factor, 1–4.
    Us,
}

impl ParamKey {
    pub const ALL: [ParamKey; 9] = [
        ParamKey::S,
        ParamKey::Cc,
        ParamKey::T,
        ParamKey::Tp,
        ParamKey::Mot,
        ParamKey::Ar,
        ParamKey::F,
        ParamKey::Um,
        ParamKey::Us,
    ];

    /// Short code used in the token grammar (`cc-2`).
    pub fn code(self) -> &'static str {
        match self {
            ParamKey::S => "s",
            ParamKey::Cc => "cc",
            ParamKey::T => "t",
            ParamKey::Tp => "tp",
            ParamKey::Mot => "mot",
            ParamKey::Ar => "ar",
            ParamKey::F => "f",
            ParamKey::Um => "um",
            ParamKey::Us => "us",
        }
    }

    pub fn from_code(code: &str) -> Option<ParamKey> {
        ParamKey::ALL.iter().copied().find(|k| k.code() == code)
    }

    /// Field name in the generation submission, `None` for keys that are
    /// never sent to the backend (the prompt snippet).
    pub fn field_name(self) -> Option<&'static str> {
        match self {
            ParamKey::S => None,
            ParamKey::Cc => Some("candidateCount"),
            ParamKey::T => Some("temperature"),
            ParamKey::Tp => Some("topP"),
            ParamKey::Mot => Some("maxOutputTokens"),
            ParamKey::Ar => Some("aspectRatio"),
            ParamKey::F => Some("format"),
            ParamKey::Um => Some("upscaylModel"),
            ParamKey::Us => Some("upscaylScale"),
        }
    }

    /// Validate a non-empty raw value for this key.
    pub fn validate(self, raw: &str) -> bool {
        match self {
            ParamKey::S => is_snippet(raw),
            ParamKey::Cc | ParamKey::Us => int_in_range(raw, 1, 4),
            ParamKey::T => decimal_in_range(raw, 0.0, 1.0),
            ParamKey::Tp => decimal_in_range(raw, 1.0, 2.0),
            ParamKey::Mot => raw.len() <= 5 && raw.bytes().all(|b| b.is_ascii_digit()),
            ParamKey::Ar => is_ratio(raw),
            ParamKey::F => FORMATS.contains(&raw),
            ParamKey::Um => raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-'),
        }
    }
}

fn is_snippet(raw: &str) -> bool {
    raw.chars()
        .all(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
}

fn int_in_range(raw: &str, min: u32, max: u32) -> bool {
    raw.bytes().all(|b| b.is_ascii_digit())
        && raw
            .parse::<u32>()
            .is_ok_and(|n| (min..=max).contains(&n))
}

fn decimal_in_range(raw: &str, min: f64, max: f64) -> bool {
    raw.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && raw
            .parse::<f64>()
            .is_ok_and(|n| n >= min && n <= max)
}

fn is_ratio(raw: &str) -> bool {
    match raw.split_once(':') {
        Some((w, h)) => {
            !w.is_empty()
                && !h.is_empty()
                && w.bytes().all(|b| b.is_ascii_digit())
                && h.bytes().all(|b| b.is_ascii_digit())
        },
        None => false,
    }
}
