//! Han-script text cleanup utilities
//!
//! Sentences from the raw corpus carry punctuation, Latin letters and digits
//! alongside the Chinese text. Segmentation and coverage only ever look at
//! the CJK Unified Ideographs block, so everything else is stripped first.

/// First and last code point treated as Chinese script.
pub const HAN_START: char = '\u{4E00}';
pub const HAN_END: char = '\u{9FFF}';

/// Whether `c` lies in the CJK Unified Ideographs block.
pub fn is_han(c: char) -> bool {
    (HAN_START..=HAN_END).contains(&c)
}

/// Remove every character outside the Han range.
///
/// "他是学生。" becomes "他是学生"; "OK!" becomes "".
pub fn han_only(text: &str) -> String {
    text.chars().filter(|c| is_han(*c)).collect()
}

/// Strip a leading byte-order mark, which some corpus dumps carry on their
/// first line.
pub fn strip_bom(line: &str) -> &str {
    line.strip_prefix('\u{feff}').unwrap_or(line)
}

/// Whether a romanization starts with a lowercase letter.
///
/// Dictionaries capitalize the pinyin of proper nouns ("Lǐ" for the surname),
/// so a lowercase initial marks the common-usage reading.
pub fn starts_lowercase(romanization: &str) -> bool {
    romanization.chars().next().is_some_and(char::is_lowercase)
}
