//! Line composition for the level stack.
//!
//! Pure string building, no I/O and no locking: the session hands in a
//! consistent snapshot of the level stack and writes the result itself. Two
//! variants of each line are produced, one with ANSI bold wrapping around the
//! percentages and one plain, because the terminal-title escape must carry
//! unstyled text.

use crate::level::Level;

/// Bold escape prefix wrapped around a highlighted percentage.
pub(crate) const BOLD: &str = "\x1b[1m";
/// Escape terminating a highlighted percentage.
pub(crate) const RESET: &str = "\x1b[0m";
/// Clear from cursor to end of line, used after an in-place rewrite.
pub(crate) const CLEAR_LINE: &str = "\x1b[K";

/// Joined percentage segments for a level stack, outermost level first.
pub(crate) struct Composition {
    /// Segments with bold wrapping applied, joined with `" > "`.
    pub styled: String,
    /// The same segments without escapes, for the terminal title.
    pub plain: String,
    /// The outermost level's effective completion fraction, with every inner
    /// level's partial progress folded in. Feeds the ETA estimate.
    pub fraction: f64,
}

/// Composes the stack into one line.
///
/// Walks the levels innermost to outermost; each level folds the fraction of
/// the level inside it through [`Level::fraction_with_inner`], starting from
/// zero. Display order is outermost first.
pub(crate) fn compose(levels: &[Level], highlight: bool) -> Composition {
    let mut fraction = 0.0;
    let mut styled_parts = Vec::with_capacity(levels.len());
    let mut plain_parts = Vec::with_capacity(levels.len());

    for level in levels.iter().rev() {
        fraction = level.fraction_with_inner(fraction);

        let percent = format_percent(fraction);
        let title = level.title().map(|t| format!("{t}: ")).unwrap_or_default();

        // An exact 100.0% reads as done and is never emphasized.
        if highlight && percent != "100.0%" {
            styled_parts.push(format!("{title}{BOLD}{percent}{RESET}"));
        } else {
            styled_parts.push(format!("{title}{percent}"));
        }
        plain_parts.push(format!("{title}{percent}"));
    }

    styled_parts.reverse();
    plain_parts.reverse();

    Composition {
        styled: styled_parts.join(" > "),
        plain: plain_parts.join(" > "),
        fraction,
    }
}

/// Formats a completion fraction as a fixed-width percentage.
///
/// Zero renders as the `......` placeholder so an untouched level is visibly
/// "not started" rather than a misleading `0.0%`.
pub(crate) fn format_percent(fraction: f64) -> String {
    if fraction == 0.0 {
        "......".to_owned()
    } else {
        format!("{:5.1}%", fraction * 100.0)
    }
}

/// Builds the escape sequence setting the terminal title.
///
/// A literal BEL in the text would terminate the sequence early and corrupt
/// it, so it is substituted with its control picture.
pub(crate) fn title_escape(text: &str) -> String {
    format!("\x1b]0;{}\x07", text.replace('\x07', "␇"))
}
