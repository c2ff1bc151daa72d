//! Parsing of densitometer output lines.
//!
//! A densitometer sends one line per patch, e.g. `"v001 r123 g045 b087"`.
//! Each token is a channel letter followed by exactly three digits holding
//! the density in hundredths.

use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::sync::OnceLock;

use super::CurveStore;

/// One parsed line: lowercase channel letter to density.
pub type DensitometerReading = BTreeMap<String, f64>;

fn token_pattern() -> Option<&'static Regex> {
    static TOKEN: OnceLock<Option<Regex>> = OnceLock::new();
    TOKEN
        .get_or_init(|| Regex::new(r"^([vrgbcmy])(\d{3})$").ok())
        .as_ref()
}

/// Parse a densitometer line.
///
/// Tokens are whitespace separated and case-insensitive. Tokens that do not
/// match are ignored; a repeated channel keeps its last value. Returns `None`
/// when the line holds no valid token.
pub fn parse_line(line: &str) -> Option<DensitometerReading> {
    let pattern = token_pattern()?;
    let mut reading = DensitometerReading::new();

    for token in line.split_whitespace() {
        let token = token.to_lowercase();
        let Some(caps) = pattern.captures(&token) else {
            continue;
        };
        let Ok(hundredths) = caps[2].parse::<u32>() else {
            continue;
        };
        reading.insert(caps[1].to_string(), f64::from(hundredths) / 100.0);
    }

    (!reading.is_empty()).then_some(reading)
}

/// Record every device line from `reader` into `store`.
///
/// Invalid UTF-8 is replaced before parsing, so a garbled line still yields
/// the tokens it holds. `on_row` receives the 1-based row and the trimmed
/// line before each reading is stored. Returns the number of readings.
pub fn record_lines<R: BufRead>(
    mut reader: R,
    store: &mut CurveStore,
    mut on_row: impl FnMut(usize, &str),
) -> io::Result<usize> {
    let mut buf = Vec::new();
    let mut recorded = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if let Cow::Owned(_) = line {
            tracing::debug!(bytes = buf.len(), "Replaced invalid UTF-8 in device line");
        }
        match parse_line(&line) {
            Some(reading) => {
                on_row(store.cursor() + 1, line.trim());
                store.record_reading(&reading);
                recorded += 1;
            }
            None => tracing::debug!(line = %line.trim(), "Ignoring line without reading"),
        }
    }
    Ok(recorded)
}
