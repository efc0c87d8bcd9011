//! Styles for the pubs CLI.
//!
//! Rendering code refers to styles by what the text *is* (a citekey, a tag, a
//! timestamp), never by color. `console` drops the escape codes when stdout is
//! not a terminal.

use console::Style;

pub fn citekey() -> Style {
    Style::new().cyan().bold()
}

pub fn title() -> Style {
    Style::new().bold()
}

pub fn authors() -> Style {
    Style::new()
}

pub fn year() -> Style {
    Style::new().yellow()
}

pub fn tag() -> Style {
    Style::new().magenta()
}

pub fn time() -> Style {
    Style::new().color256(246).italic()
}

pub fn success() -> Style {
    Style::new().green()
}

pub fn muted() -> Style {
    Style::new().dim()
}
