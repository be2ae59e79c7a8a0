//! Human-readable alert wording.
//!
//! Kept apart from classification and aggregation so the wording can change
//! without touching policy.

use proctor_types::GazeDirection;

pub fn no_face() -> String {
    "No face detected".to_string()
}

pub fn multiple_faces(face_count: u32) -> String {
    format!("{face_count} faces detected")
}

pub fn looking(direction: GazeDirection) -> String {
    format!("Looking {direction}")
}

pub fn head_rotation() -> String {
    "Excessive head movement detected".to_string()
}

/// `"<Kind Words> threshold exceeded"`, e.g. `"Multiple Faces threshold exceeded"`.
pub fn threshold_exceeded(kind_name: &str) -> String {
    format!("{} threshold exceeded", title_words(kind_name))
}

/// Underscores become spaces and every word is title-cased.
///
/// A word starts after any non-alphabetic character, so `"tab_switches"`
/// becomes `"Tab Switches"` and `"2nd_screen"` becomes `"2Nd Screen"`.
pub fn title_words(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for ch in name.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
