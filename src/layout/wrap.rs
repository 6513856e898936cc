use crate::font::GlyphMetrics;
use crate::units::Pt;

/// Length in bytes of the next line of `text`: the longest prefix whose width at
/// `size` stays strictly below `max_width`.
///
/// Breaks may fall between any two characters, since Thai puts no spaces between
/// words. The first character is always taken, even when it alone is wider than
/// `max_width`, so every call makes progress. Returns 0 only for empty text.
pub fn take_line<M: GlyphMetrics + ?Sized>(
    text: &str,
    max_width: Pt,
    size: Pt,
    metrics: &M,
) -> usize {
    let mut chars = text.char_indices();
    let Some((_, first)) = chars.next() else {
        return 0;
    };

    let mut end = first.len_utf8();
    for (index, ch) in chars {
        let candidate = &text[..index + ch.len_utf8()];
        if metrics.width_of(candidate, size) < max_width {
            end = index + ch.len_utf8();
        } else {
            break;
        }
    }
    end
}

/// Wraps `text` into lines narrower than `max_width`, lazily. See [take_line] for
/// the breaking rule. Empty text produces no lines at all.
///
/// ```
/// use school_docs::{layout::wrap_lines, GlyphMetrics, Pt};
///
/// // every character is 10pt wide
/// struct Fixed;
/// impl GlyphMetrics for Fixed {
///     fn width_of(&self, text: &str, _size: Pt) -> Pt {
///         Pt(10.0 * text.chars().count() as f32)
///     }
/// }
///
/// let lines: Vec<String> = wrap_lines("กขคงจฉช", Pt(35.0), Pt(16.0), &Fixed).collect();
/// assert_eq!(lines, vec!["กขค", "งจฉ", "ช"]);
/// ```
pub fn wrap_lines<'a, M: GlyphMetrics + ?Sized>(
    text: &'a str,
    max_width: Pt,
    size: Pt,
    metrics: &'a M,
) -> Lines<'a, M> {
    Lines {
        rest: text,
        max_width,
        size,
        metrics,
    }
}

/// Iterator returned by [wrap_lines]
pub struct Lines<'a, M: ?Sized> {
    rest: &'a str,
    max_width: Pt,
    size: Pt,
    metrics: &'a M,
}

impl<M: GlyphMetrics + ?Sized> Iterator for Lines<'_, M> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let end = take_line(self.rest, self.max_width, self.size, self.metrics);
        if end == 0 {
            return None;
        }
        let (line, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(line.to_string())
    }
}
