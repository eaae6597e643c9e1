// src/debug/printers.rs

//! Printer macros for user-facing warnings and errors on stderr, and a
//! helper for one-line debug printing of log text.

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `e`println! with a severity label, e.g. `WARNING: file skipped`.
///
/// The label and message are written in one `eprintln!` so that lines from
/// different worker threads do not interleave.
#[doc(hidden)]
#[macro_export]
macro_rules! e_labeled {
    (
        $label:literal, $($args:tt)*
    ) => {
        eprintln!("{}: {}", $label, format_args!($($args)*))
    }
}
pub use e_labeled;

/// `e`println! an `err`or
#[macro_export]
macro_rules! e_err {
    (
        $($args:tt)*
    ) => {
        $crate::e_labeled!("ERROR", $($args)*)
    }
}
pub use e_err;

/// `e`println! a `w`a`r`ni`n`g
#[macro_export]
macro_rules! e_wrn {
    (
        $($args:tt)*
    ) => {
        $crate::e_labeled!("WARNING", $($args)*)
    }
}
pub use e_wrn;

/// `d`ebug [`e_err!`]; nothing in release builds
#[macro_export]
macro_rules! de_err {
    (
        $($args:tt)*
    ) => {
        {
            #[cfg(any(debug_assertions, test))]
            $crate::e_labeled!("ERROR", $($args)*);
        }
    }
}
pub use de_err;

/// `d`ebug [`e_wrn!`]; nothing in release builds
#[macro_export]
macro_rules! de_wrn {
    (
        $($args:tt)*
    ) => {
        {
            #[cfg(any(debug_assertions, test))]
            $crate::e_labeled!("WARNING", $($args)*);
        }
    }
}
pub use de_wrn;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// debug printing of log text
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Offset of the Unicode "Control Pictures" block; `U+2400 + c` pictures
/// C0 control `c`.
const CONTROL_PICTURES: u32 = 0x2400;

/// A C0 control character, or DEL, as its Unicode control picture,
/// e.g. `'\n'` returns `'␊'`. Other characters are returned as-is.
pub const fn char_to_char_noraw(c: char) -> char {
    let picture: u32 = match c as u32 {
        cu @ 0x00..=0x1F => CONTROL_PICTURES + cu,
        0x7F => CONTROL_PICTURES + 0x21,
        _ => return c,
    };
    match char::from_u32(picture) {
        Some(picture) => picture,
        None => c,
    }
}

/// `str_buf` with control characters replaced by [`char_to_char_noraw`],
/// so a log line with a `\r` or `\t` prints as one readable debug line.
#[allow(non_snake_case)]
pub fn str_to_String_noraw(str_buf: &str) -> String {
    str_buf.chars().map(char_to_char_noraw).collect()
}
