use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.split('\t')
        .enumerate()
        .map(|(i, part)| {
            let w = UnicodeWidthStr::width(part);
            if i > 0 { w + 4 } else { w }
        })
        .sum()
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…` if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells <= 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = grapheme_display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// Pad with spaces to exactly `cells` terminal cells, truncating first when
/// the text is wider.
pub fn fit_to_width(s: &str, cells: usize) -> String {
    let mut cell = truncate_to_width(s, cells);
    let width = display_width(&cell);
    if width < cells {
        cell.push_str(&" ".repeat(cells - width));
    }
    cell
}

/// Display width of a grapheme cluster.
fn grapheme_display_width(g: &str) -> usize {
    if g == "\t" {
        return 4;
    }
    UnicodeWidthStr::width(g)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── display_width ──────────────────────────────────────────────

    #[test]
    fn display_width_ascii() {
        assert_eq!(display_width("hello"), 5);
    }

    #[test]
    fn display_width_cjk() {
        assert_eq!(display_width("你好"), 4);
    }

    #[test]
    fn display_width_combining() {
        assert_eq!(display_width("cafe\u{0301}"), 4);
    }

    #[test]
    fn display_width_tab() {
        assert_eq!(display_width("a\tb"), 6);
    }

    // ── truncate_to_width ──────────────────────────────────────────

    #[test]
    fn truncate_no_truncation_needed() {
        assert_eq!(truncate_to_width("Fix login", 20), "Fix login");
    }

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_to_width("Fix login bug", 8), "Fix log\u{2026}");
    }

    #[test]
    fn truncate_cjk_boundary() {
        assert_eq!(truncate_to_width("你好世界", 5), "你好\u{2026}");
    }

    #[test]
    fn truncate_edges() {
        assert_eq!(truncate_to_width("hello", 0), "");
        assert_eq!(truncate_to_width("hello", 1), "\u{2026}");
    }

    // ── fit_to_width ───────────────────────────────────────────────

    #[test]
    fn fit_pads_short_text() {
        assert_eq!(fit_to_width("Bug", 6), "Bug   ");
    }

    #[test]
    fn fit_truncates_long_text() {
        assert_eq!(fit_to_width("In Progress", 6), "In Pr\u{2026}");
    }

    #[test]
    fn fit_counts_wide_cells() {
        let cell = fit_to_width("你好", 5);
        assert_eq!(display_width(&cell), 5);
        assert_eq!(cell, "你好 ");
    }
}
