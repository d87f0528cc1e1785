use bytesize::{ByteSize, GIB, KIB, MIB, TIB};
use once_cell::sync::Lazy;
use regex::Regex;

static PARSER: Lazy<Regex> = Lazy::new(|| {
    regex::RegexBuilder::new(r"([0-9,.]+)\s*([KMGT]?(?:I?B)?)")
        .case_insensitive(true)
        .build()
        .unwrap()
});

const UNITS: [(&str, u64); 5] = [("B", 1), ("KB", KIB), ("MB", MIB), ("GB", GIB), ("TB", TIB)];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedSize {
    pub display: String,
    pub bytes: ByteSize,
}

impl NormalizedSize {
    fn zero() -> Self {
        Self {
            display: String::from("0 B"),
            bytes: ByteSize::b(0),
        }
    }

    fn from_bytes(bytes: u64) -> Self {
        Self {
            display: display(bytes),
            bytes: ByteSize::b(bytes),
        }
    }
}

fn unit_multiplier(unit: &str) -> u64 {
    match unit.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('K') => KIB,
        Some('M') => MIB,
        Some('G') => GIB,
        Some('T') => TIB,
        _ => 1,
    }
}

pub fn display(bytes: u64) -> String {
    let (symbol, factor) = UNITS
        .iter()
        .find(|(_, factor)| bytes < factor.saturating_mul(KIB))
        .copied()
        .unwrap_or(UNITS[UNITS.len() - 1]);
    format!("{:.2} {symbol}", bytes as f64 / factor as f64)
}

/// Converts a free text size like `1.5 MB` or `700 MiB` into a byte count.
///
/// Never fails: blank input gives `0 B`, text without any number is kept as
/// the display value with a zero byte count, and an unreadable number counts
/// as zero.
pub fn normalize(input: &str) -> NormalizedSize {
    let text = input.replace('\u{a0}', " ");
    let text = text.trim();
    if text.is_empty() {
        return NormalizedSize::zero();
    }

    let Some(found) = PARSER.captures(text) else {
        return NormalizedSize {
            display: text.to_string(),
            bytes: ByteSize::b(0),
        };
    };

    let value = found[1].replace(',', "").parse::<f64>().unwrap_or(0.0);
    let multiplier = found.get(2).map_or(1, |m| unit_multiplier(m.as_str()));

    NormalizedSize::from_bytes((value * multiplier as f64).floor() as u64)
}
