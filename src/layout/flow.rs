use crate::canvas::Canvas;
use crate::colour::Colour;
use crate::font::Font;
use crate::layout::{take_line, wrap_lines};
use crate::units::Pt;
use id_arena::Id;

/// Whether the first line of a paragraph starts further in than the rest
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Indent {
    FirstLine(Pt),
    None,
}

impl Indent {
    fn width(self) -> Pt {
        match self {
            Indent::FirstLine(width) => width,
            Indent::None => Pt(0.0),
        }
    }
}

/// Text settings and the column a paragraph is flowed into
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Paragraph {
    pub font: Id<Font>,
    pub size: Pt,
    pub colour: Colour,
    /// Left edge of the column
    pub left: Pt,
    /// Width of the column, lines stay strictly narrower than this
    pub width: Pt,
    /// Baseline-to-baseline distance
    pub line_height: Pt,
}

impl Paragraph {
    /// Draw `text` as wrapped lines with the first baseline at `start_y`, moving down
    /// the page. Returns the baseline after the last line drawn, or `start_y`
    /// unchanged when there is nothing to draw.
    pub fn flow(&self, canvas: &mut Canvas, text: &str, start_y: Pt, indent: Indent) -> Pt {
        if text.is_empty() {
            return start_y;
        }

        let indent = indent.width();
        let font = canvas.font(self.font);
        let first = take_line(text, self.width - indent, self.size, font);
        let (head, tail) = text.split_at(first);
        let rest: Vec<String> = wrap_lines(tail, self.width, self.size, font).collect();

        let mut y = start_y;
        canvas.draw_text(head, self.left + indent, y, self.size, self.font, self.colour);
        y -= self.line_height;
        for line in rest {
            canvas.draw_text(&line, self.left, y, self.size, self.font, self.colour);
            y -= self.line_height;
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::tests::REGULAR;
    use crate::colours;
    use crate::font::GlyphMetrics;
    use crate::pagesize::A4;

    fn setup() -> (Canvas, Paragraph) {
        let mut canvas = Canvas::new(A4);
        let font = canvas.embed_font(REGULAR.to_vec()).unwrap();
        let paragraph = Paragraph {
            font,
            size: Pt(12.0),
            colour: colours::BLACK,
            left: Pt(50.0),
            width: Pt(120.0),
            line_height: Pt(16.0),
        };
        (canvas, paragraph)
    }

    #[test]
    fn empty_text_leaves_the_cursor_alone() {
        let (mut canvas, paragraph) = setup();
        let y = paragraph.flow(&mut canvas, "", Pt(500.0), Indent::FirstLine(Pt(30.0)));
        assert_eq!(y, Pt(500.0));
        assert_eq!(canvas.page().spans().count(), 0);
    }

    #[test]
    fn advances_one_line_height_per_line() {
        let (mut canvas, paragraph) = setup();
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let y = paragraph.flow(&mut canvas, text, Pt(500.0), Indent::None);

        let spans: Vec<_> = canvas.page().spans().cloned().collect();
        assert!(spans.len() > 1);
        assert_eq!(y, Pt(500.0) - Pt(16.0) * spans.len() as f32);
        for (i, span) in spans.iter().enumerate() {
            assert_eq!(span.coords, (Pt(50.0), Pt(500.0) - Pt(16.0) * i as f32));
        }
        let joined: String = spans.iter().map(|span| span.text.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn first_line_is_indented_and_narrower() {
        let (mut canvas, paragraph) = setup();
        let text = "abcdefghijklmnopqrstuvwxyzabcdefghijklmnopqrstuvwxyz";
        paragraph.flow(&mut canvas, text, Pt(500.0), Indent::FirstLine(Pt(40.0)));

        let font = canvas.font(paragraph.font);
        let spans: Vec<_> = canvas.page().spans().collect();
        assert_eq!(spans[0].coords.0, Pt(90.0));
        assert!(font.width_of(&spans[0].text, Pt(12.0)) < Pt(80.0));
        for span in &spans[1..] {
            assert_eq!(span.coords.0, Pt(50.0));
            assert!(font.width_of(&span.text, Pt(12.0)) < Pt(120.0));
        }
    }
}
