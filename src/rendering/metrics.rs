//! Text measurement for the standard Helvetica faces.

/// Millimetres per typographic point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Advance widths (1/1000 em) of Helvetica for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const FALLBACK_WIDTH: u16 = 556;

// Helvetica-Bold runs about six percent wider on average.
const BOLD_FACTOR: f32 = 1.06;

fn glyph_width(c: char) -> u16 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` in millimetres at `size` points.
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(c))).sum();
    let width = units as f32 / 1000.0 * size * MM_PER_PT;
    if bold { width * BOLD_FACTOR } else { width }
}

/// Distance between baselines in millimetres at `size` points.
pub fn line_height(size: f32) -> f32 {
    size * MM_PER_PT * 1.15
}

/// Greedy word wrap to `max_width` millimetres.
///
/// Explicit newlines always break. A word wider than the line on its own is
/// split between characters. Empty input yields a single empty line.
pub fn wrap_text(text: &str, max_width: f32, size: f32, bold: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, size, bold) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for c in word.chars() {
                current.push(c);
                if text_width(&current, size, bold) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_scales_with_size() {
        let small = text_width("TOTAL", 8.0, false);
        let large = text_width("TOTAL", 16.0, false);
        assert!((large - 2.0 * small).abs() < 1e-4);
        assert!(text_width("TOTAL", 8.0, true) > small);
        assert_eq!(text_width("", 10.0, false), 0.0);
    }

    #[test]
    fn test_known_glyph_widths() {
        // "0" is 556 units: 10pt -> 5.56pt -> ~1.96mm
        let width = text_width("0", 10.0, false);
        assert!((width - 5.56 * MM_PER_PT).abs() < 1e-4);
        assert!(text_width("W", 10.0, false) > text_width("i", 10.0, false));
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "Declaro que caso nao preste as contas devidas no prazo de trinta dias";
        let lines = wrap_text(text, 40.0, 8.0, false);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 8.0, false) <= 40.0);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        let lines = wrap_text("YES\n(ACME)", 100.0, 7.0, false);
        assert_eq!(lines, vec!["YES".to_string(), "(ACME)".to_string()]);
        assert_eq!(wrap_text("", 100.0, 7.0, false), vec![String::new()]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let word = "A".repeat(80);
        let lines = wrap_text(&word, 20.0, 8.0, false);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, 8.0, false) <= 20.0);
        }
    }
}
