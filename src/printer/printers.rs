// src/printer/printers.rs

//! Specialized printer struct [`PrinterGroup`] and helper functions for
//! printing [`Group`]s of [`LogEntry`]s.
//!
//! [`Group`]: crate::data::group::Group
//! [`LogEntry`]: crate::data::logentry::LogEntry

use crate::common::FPath;
use crate::data::datetime::millis_to_rfc3339;
use crate::data::group::Group;
use crate::data::logentry::{Level, LogEntry};
use crate::debug::printers::de_err;

use std::collections::HashMap;
use std::io::{Result, Write};

use ::more_asserts::debug_assert_le;
use ::regex::{Regex, RegexBuilder};
pub use ::termcolor::{Color, ColorChoice, ColorSpec, WriteColor};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// globals and constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`Color`] for printing prepended data like line numbers.
///
/// [`Color`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.Color.html
pub const COLOR_DEFAULT: Color = Color::White;

/// [`Color`] for printing some user-facing error messages.
///
/// [`Color`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.Color.html
pub const COLOR_ERROR: Color = Color::Red;

/// [`Color`] of `WARN` entries.
pub const COLOR_WARN: Color = Color::Yellow;

/// [`Color`] of highlighted keywords.
pub const COLOR_KEYWORD: Color = Color::Black;

/// Background [`Color`] of highlighted keywords.
pub const COLOR_KEYWORD_BG: Color = Color::Yellow;

/// A preselection of [`Color`s] for printing file headers, one per file.
/// Chosen for a dark background console.
///
/// [`Color`s]: https://docs.rs/termcolor/1.1.3/termcolor/enum.Color.html
pub const COLORS_TEXT: [Color; 12] = [
    Color::Cyan,
    Color::Green,
    Color::Magenta,
    Color::Blue,
    Color::Rgb(153, 153, 255),
    Color::Rgb(153, 255, 153),
    Color::Rgb(255, 153, 153),
    Color::Rgb(153, 255, 255),
    Color::Rgb(255, 255, 153),
    Color::Rgb(255, 153, 255),
    Color::Rgb(127, 230, 127),
    Color::Rgb(127, 127, 230),
];

/// Parse a `--color` value.
pub fn color_choice_from_str(value: &str) -> Option<ColorChoice> {
    match value {
        "always" => Some(ColorChoice::Always),
        "auto" => Some(ColorChoice::Auto),
        "never" => Some(ColorChoice::Never),
        _ => None,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// keywords
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Case-insensitive regex matching any of `keywords` literally.
///
/// `None` if there are no non-empty keywords.
pub fn keywords_regex(keywords: &[String]) -> Option<Regex> {
    let escaped: Vec<String> = keywords
        .iter()
        .filter(|keyword| !keyword.is_empty())
        .map(|keyword| regex::escape(keyword))
        .collect();
    if escaped.is_empty() {
        return None;
    }
    match RegexBuilder::new(escaped.join("|").as_str())
        .case_insensitive(true)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(_err) => {
            de_err!("keywords_regex {:?} failed {}", keywords, _err);
            None
        }
    }
}

/// Byte offsets `[beg, end)` of each keyword match in `text`.
pub fn keyword_spans(
    regex: &Regex,
    text: &str,
) -> Vec<(usize, usize)> {
    regex
        .find_iter(text)
        .filter(|found| !found.is_empty())
        .map(|found| (found.start(), found.end()))
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PrinterGroup
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Aliased [`Result`] returned by [`PrinterGroup`] functions, the count of
/// bytes printed.
///
/// [`Result`]: std::io::Result
pub type PrinterGroupResult = Result<usize>;

/// Prints [`Group`s] as a header line followed by each entry prefixed with
/// its line number.
///
/// ```text
/// ==> /var/log/app.log 2023-01-01T00:00:00.000Z … 2023-01-01T00:00:05.000Z (2)
/// 1: 2023-01-01T00:00:00Z INFO start
/// 2: 2023-01-01T00:00:05Z ERROR boom
/// ```
///
/// [`Group`s]: crate::data::group::Group
pub struct PrinterGroup<W: WriteColor> {
    out: W,
    keywords: Option<Regex>,
    color_spec_default: ColorSpec,
    color_spec_error: ColorSpec,
    color_spec_warn: ColorSpec,
    color_spec_keyword: ColorSpec,
    /// header color of each file, assigned in order of first print
    map_path_color: HashMap<FPath, ColorSpec>,
    /// last value passed to `self.out.set_color()`
    color_spec_last: ColorSpec,
    /// groups printed so far
    groups_printed: usize,
}

/// Macro to write to `self.out`. If there is an error then
/// `return PrinterGroupResult::Err`.
macro_rules! write_or_return {
    ($out:expr, $slice_:expr, $printed:expr) => {
        match $out.write_all($slice_) {
            Ok(_) => {
                $printed += $slice_.len();
            }
            Err(err) => {
                // XXX: this will print when this program stdout is truncated, like when piping
                //      to `head`, e.g. `lws /var/log | head`
                //          Broken pipe (os error 32)
                de_err!("{}.write(…) (len {})) error {}", stringify!($out), $slice_.len(), err);
                return PrinterGroupResult::Err(err);
            }
        }
    };
}

/// Macro that sets output color, only changed if needed.
///
/// Unnecessary changes to `set_color` may cause errant formatting bytes to
/// print to the terminal.
macro_rules! setcolor_or_return {
    ($out:expr, $color_spec:expr, $color_spec_last:expr) => {
        if $color_spec != $color_spec_last {
            if let Err(err) = $out.set_color(&$color_spec) {
                de_err!("{}.set_color({:?}) returned error {}", stringify!($out), $color_spec, err);
                return PrinterGroupResult::Err(err);
            };
            $color_spec_last = $color_spec.clone();
        }
    };
}

impl<W: WriteColor> PrinterGroup<W> {
    /// Create a new `PrinterGroup` writing to `out`, highlighting any of
    /// `keywords`.
    pub fn new(
        out: W,
        keywords: &[String],
    ) -> PrinterGroup<W> {
        let mut color_spec_default = ColorSpec::new();
        color_spec_default.set_fg(Some(COLOR_DEFAULT));
        let mut color_spec_error = ColorSpec::new();
        color_spec_error.set_fg(Some(COLOR_ERROR));
        let mut color_spec_warn = ColorSpec::new();
        color_spec_warn.set_fg(Some(COLOR_WARN));
        let mut color_spec_keyword = ColorSpec::new();
        color_spec_keyword
            .set_fg(Some(COLOR_KEYWORD))
            .set_bg(Some(COLOR_KEYWORD_BG))
            .set_bold(true);
        let color_spec_last = ColorSpec::new();

        PrinterGroup {
            out,
            keywords: keywords_regex(keywords),
            color_spec_default,
            color_spec_error,
            color_spec_warn,
            color_spec_keyword,
            map_path_color: HashMap::new(),
            color_spec_last,
            groups_printed: 0,
        }
    }

    pub fn groups_printed(&self) -> usize {
        self.groups_printed
    }

    /// Release the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn color_spec_path(
        &mut self,
        path: &FPath,
    ) -> ColorSpec {
        let at = self.map_path_color.len();
        self.map_path_color
            .entry(path.clone())
            .or_insert_with(|| {
                let mut color_spec = ColorSpec::new();
                color_spec
                    .set_fg(Some(COLORS_TEXT[at % COLORS_TEXT.len()]))
                    .set_bold(true);
                color_spec
            })
            .clone()
    }

    fn color_spec_entry(
        &self,
        entry: &LogEntry,
    ) -> ColorSpec {
        match entry.severity {
            Some(Level::Error) | Some(Level::Fatal) => self.color_spec_error.clone(),
            Some(Level::Warn) => self.color_spec_warn.clone(),
            _ => self.color_spec_default.clone(),
        }
    }

    fn print_header(
        &mut self,
        group: &Group,
    ) -> PrinterGroupResult {
        let mut printed: usize = 0;
        let color_spec = self.color_spec_path(&group.file_path);
        setcolor_or_return!(self.out, color_spec, self.color_spec_last);
        let header: String = format!(
            "==> {} {} … {} ({})",
            group.file_path,
            millis_to_rfc3339(group.start_timestamp),
            millis_to_rfc3339(group.end_timestamp),
            group.len(),
        );
        write_or_return!(self.out, header.as_bytes(), printed);
        setcolor_or_return!(self.out, self.color_spec_default, self.color_spec_last);
        write_or_return!(self.out, b"\n", printed);

        Ok(printed)
    }

    /// Print `text` in `color_spec`, with keyword matches highlighted.
    fn print_highlighted(
        &mut self,
        text: &str,
        color_spec: &ColorSpec,
    ) -> PrinterGroupResult {
        let mut printed: usize = 0;
        let color_spec: ColorSpec = color_spec.clone();
        let spans: Vec<(usize, usize)> = match self.keywords.as_ref() {
            Some(regex) => keyword_spans(regex, text),
            None => Vec::new(),
        };
        let mut at: usize = 0;
        for (beg, end) in spans.into_iter() {
            debug_assert_le!(at, beg);
            if at < beg {
                setcolor_or_return!(self.out, color_spec, self.color_spec_last);
                write_or_return!(self.out, text[at..beg].as_bytes(), printed);
            }
            setcolor_or_return!(self.out, self.color_spec_keyword, self.color_spec_last);
            write_or_return!(self.out, text[beg..end].as_bytes(), printed);
            at = end;
        }
        if at < text.len() {
            setcolor_or_return!(self.out, color_spec, self.color_spec_last);
            write_or_return!(self.out, text[at..].as_bytes(), printed);
        }

        Ok(printed)
    }

    /// Print one entry. Each line of a multi-line entry is prefixed with its
    /// line number.
    pub fn print_entry(
        &mut self,
        entry: &LogEntry,
    ) -> PrinterGroupResult {
        let mut printed: usize = 0;
        let color_spec = self.color_spec_entry(entry);
        for (offset, line) in entry.raw_text.split('\n').enumerate() {
            let prefix: String = format!("{}: ", entry.line_number + offset as u64);
            setcolor_or_return!(self.out, self.color_spec_default, self.color_spec_last);
            write_or_return!(self.out, prefix.as_bytes(), printed);
            printed += self.print_highlighted(line, &color_spec)?;
            setcolor_or_return!(self.out, self.color_spec_default, self.color_spec_last);
            write_or_return!(self.out, b"\n", printed);
        }

        Ok(printed)
    }

    /// Print a group header then all of its entries.
    pub fn print_group(
        &mut self,
        group: &Group,
    ) -> PrinterGroupResult {
        let mut printed: usize = self.print_header(group)?;
        for entry in group.entries.iter() {
            printed += self.print_entry(entry)?;
        }
        self.groups_printed += 1;

        Ok(printed)
    }

    /// Print all `groups` in order, then reset the color and flush.
    pub fn print_groups(
        &mut self,
        groups: &[Group],
    ) -> PrinterGroupResult {
        let mut printed: usize = 0;
        for group in groups.iter() {
            printed += self.print_group(group)?;
        }
        if let Err(err) = self.out.reset() {
            de_err!("out.reset() returned error {}", err);
            return PrinterGroupResult::Err(err);
        }
        self.color_spec_last = ColorSpec::new();
        self.out.flush()?;

        Ok(printed)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// other printer functions (no use of PrinterGroup)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Print colored output to terminal if possible using passed stream,
/// otherwise, print plain output.
pub fn print_colored<W: WriteColor>(
    color: Color,
    value: &[u8],
    out: &mut W,
) -> std::io::Result<()> {
    match out.set_color(ColorSpec::new().set_fg(Some(color))) {
        Ok(_) => {}
        Err(err) => {
            de_err!("print_colored: std.set_color({:?}) returned error {}", color, err);
            return Err(err);
        }
    };
    match out.write_all(value) {
        Ok(_) => {}
        Err(err) => {
            de_err!("print_colored: out.write(…) returned error {}", err);
            return Err(err);
        }
    }
    match out.reset() {
        Ok(_) => {}
        Err(err) => {
            de_err!("print_colored: out.reset() returned error {}", err);
            return Err(err);
        }
    }
    out.flush()?;

    Ok(())
}

/// Print colored output to terminal on stderr.
pub fn print_colored_stderr(
    color: Color,
    color_choice_opt: Option<ColorChoice>,
    value: &[u8],
) -> std::io::Result<()> {
    let choice: ColorChoice = color_choice_opt.unwrap_or(ColorChoice::Auto);
    let mut stderr = termcolor::StandardStream::stderr(choice);
    let _stdout_lock = std::io::stdout().lock();

    print_colored(color, value, &mut stderr)
}
