// Space-joined console reporting with optional ANSI foreground color.
use std::fmt;

use crate::core::error::{Error, ErrorKind};

// Dark variants use the base 30-37 codes, bright ones 90-97.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Black,
    DarkRed,
    Red,
    DarkGreen,
    Green,
    DarkYellow,
    Yellow,
    DarkBlue,
    Blue,
    DarkMagenta,
    Magenta,
    DarkCyan,
    Cyan,
    Grey,
    White,
}

impl Color {
    pub const ALL: [Color; 15] = [
        Color::Black,
        Color::DarkRed,
        Color::Red,
        Color::DarkGreen,
        Color::Green,
        Color::DarkYellow,
        Color::Yellow,
        Color::DarkBlue,
        Color::Blue,
        Color::DarkMagenta,
        Color::Magenta,
        Color::DarkCyan,
        Color::Cyan,
        Color::Grey,
        Color::White,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Color::Black => "30",
            Color::DarkRed => "31",
            Color::Red => "91",
            Color::DarkGreen => "32",
            Color::Green => "92",
            Color::DarkYellow => "33",
            Color::Yellow => "93",
            Color::DarkBlue => "34",
            Color::Blue => "94",
            Color::DarkMagenta => "35",
            Color::Magenta => "95",
            Color::DarkCyan => "36",
            Color::Cyan => "96",
            Color::Grey => "37",
            Color::White => "97",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::DarkRed => "darkred",
            Color::Red => "red",
            Color::DarkGreen => "darkgreen",
            Color::Green => "green",
            Color::DarkYellow => "darkyellow",
            Color::Yellow => "yellow",
            Color::DarkBlue => "darkblue",
            Color::Blue => "blue",
            Color::DarkMagenta => "darkmagenta",
            Color::Magenta => "magenta",
            Color::DarkCyan => "darkcyan",
            Color::Cyan => "cyan",
            Color::Grey => "grey",
            Color::White => "white",
        }
    }
}

impl std::str::FromStr for Color {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = name.trim().to_ascii_lowercase();
        Color::ALL
            .into_iter()
            .find(|color| color.name() == wanted)
            .ok_or_else(|| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("unknown color `{name}`"))
                    .with_hint(format!(
                        "Known colors: {}.",
                        Color::ALL.map(Color::name).join(", ")
                    ))
            })
    }
}

/// Wrap `text` in the color's escape sequence and reset afterwards.
pub fn paint(text: &str, color: Color) -> String {
    format!("\u{1b}[{}m{text}\u{1b}[0m", color.code())
}

/// Join parts with single spaces, print-statement style. No escapes are
/// ever emitted here; color happens only in [`report_color`].
pub fn render_line(parts: &[&dyn fmt::Display]) -> String {
    let mut out = String::new();
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        out.push_str(&part.to_string());
    }
    out
}

pub fn report(parts: &[&dyn fmt::Display]) {
    println!("{}", render_line(parts));
}

pub fn report_color(parts: &[&dyn fmt::Display], color: Color) {
    println!("{}", paint(&render_line(parts), color));
}

#[cfg(test)]
mod tests {
    use super::{Color, paint, render_line};

    #[test]
    fn paint_wraps_and_resets() {
        let painted = paint("warning", Color::Red);
        assert_eq!(painted, "\u{1b}[91mwarning\u{1b}[0m");
        assert!(painted.starts_with("\u{1b}[91m"));
        assert!(painted.ends_with("\u{1b}[0m"));
    }

    #[test]
    fn render_line_joins_with_single_spaces() {
        let count = 3;
        let ratio = 0.5;
        let line = render_line(&[&"processed", &count, &ratio]);
        assert_eq!(line, "processed 3 0.5");
        assert!(!line.contains('\u{1b}'));
    }

    #[test]
    fn render_line_of_nothing_is_empty() {
        assert_eq!(render_line(&[]), "");
    }

    #[test]
    fn color_names_round_trip() {
        for color in Color::ALL {
            let parsed: Color = color.name().parse().expect("parse");
            assert_eq!(parsed, color);
        }
        assert!("mauve".parse::<Color>().is_err());
    }
}
