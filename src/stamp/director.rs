//! The director's command stamp: a box in the bottom-right corner holding the
//! command text and, below it, the dated and signed footer. The box grows with
//! the command so the footer never overlaps it.

use super::{place_optional_image, Fonts, StampBase, StampObserver, StampStage};
use crate::canvas::Canvas;
use crate::codec::thai_long_date;
use crate::colours;
use crate::layout::wrap_lines;
use crate::page::RectStyle;
use crate::rect::Rect;
use crate::units::{Cm, Pt};
use chrono::NaiveDate;

pub const DIRECTOR_BOX_WIDTH: Pt = Pt(230.0);
/// Distance from the bottom and right page edges
pub const DIRECTOR_MARGIN: Pt = Pt(20.0);
/// Horizontal space taken from the box width before wrapping, split evenly
/// between the two sides
pub const TEXT_PADDING: Pt = Pt(20.0);
/// Space reserved under the command text for the date, school, name and signature
pub const SIGNATURE_BLOCK_HEIGHT: Pt = Pt(85.0);
/// Vertical padding added on top of the text and signature block
pub const BOX_PADDING: Pt = Pt(15.0);
pub const FONT_SIZE: Pt = Pt(12.0);
pub const LINE_HEIGHT: Pt = Pt(15.0);

const SIGNATURE_WIDTH: Pt = Pt(110.0);
const SIGNATURE_HEIGHT: Pt = Pt(30.0);
const LOGO_SIZE: Pt = Pt(12.0);
const LOGO_GAP: Pt = Pt(3.0);

/// The smallest box, used for short commands
pub fn min_box_height() -> Pt {
    Cm(3.0).into()
}

/// Per-call adjustments
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectorStampOptions {
    /// 1-based page to stamp, clamped into the document
    pub target_page: usize,
    /// Multiplier applied to the signature after it is fitted into its slot
    pub signature_scale: f32,
    /// Moves the signature up (positive) or down
    pub signature_offset_y: Pt,
}

impl Default for DirectorStampOptions {
    fn default() -> Self {
        DirectorStampOptions {
            target_page: 1,
            signature_scale: 1.0,
            signature_offset_y: Pt(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectorStampRequest {
    pub base: StampBase,
    /// Free text; explicit line breaks are kept
    pub command: String,
    pub director_name: String,
    pub signature: Option<Vec<u8>>,
    pub school_name: Option<String>,
    pub logo: Option<Vec<u8>>,
    /// Printed in the footer, usually today
    pub date: NaiveDate,
}

impl DirectorStampRequest {
    pub fn new<S: Into<String>, N: Into<String>>(
        base: StampBase,
        command: S,
        director_name: N,
        date: NaiveDate,
    ) -> DirectorStampRequest {
        DirectorStampRequest {
            base,
            command: command.into(),
            director_name: director_name.into(),
            signature: None,
            school_name: None,
            logo: None,
            date,
        }
    }
}

/// Break the command into display lines. Each explicit line is wrapped on its
/// own; blank lines are kept.
pub fn command_lines(canvas: &Canvas, fonts: Fonts, command: &str) -> Vec<String> {
    let width = DIRECTOR_BOX_WIDTH - TEXT_PADDING;
    let font = canvas.font(fonts.regular);
    let mut lines = Vec::new();
    if command.trim().is_empty() {
        return lines;
    }
    for segment in command.lines() {
        if segment.is_empty() {
            lines.push(String::new());
        } else {
            lines.extend(wrap_lines(segment, width, FONT_SIZE, font));
        }
    }
    lines
}

/// Height of the box for a command of `line_count` display lines
pub fn box_height(line_count: usize) -> Pt {
    let content = LINE_HEIGHT * line_count as f32 + SIGNATURE_BLOCK_HEIGHT + BOX_PADDING;
    min_box_height().max(content)
}

/// Draw the stamp in the bottom-right corner of the canvas and return its box
pub fn draw(
    canvas: &mut Canvas,
    fonts: Fonts,
    request: &DirectorStampRequest,
    options: &DirectorStampOptions,
    observer: &dyn StampObserver,
) -> Rect {
    let lines = command_lines(canvas, fonts, &request.command);
    let height = box_height(lines.len());
    let x = canvas.width() - DIRECTOR_BOX_WIDTH - DIRECTOR_MARGIN;
    let stamp = Rect::from_origin(x, DIRECTOR_MARGIN, DIRECTOR_BOX_WIDTH, height);
    log::debug!("director stamp: {} lines, box height {}", lines.len(), height);

    canvas.draw_rect(stamp, RectStyle::filled(colours::WHITE, colours::STAMP_BLUE, Pt(1.0)));

    observer.stage(StampStage::WritingCommand);
    let left = x + TEXT_PADDING / 2.0;
    let mut cursor = stamp.y2 - BOX_PADDING / 2.0 - FONT_SIZE;
    for line in &lines {
        canvas.draw_text(line, left, cursor, FONT_SIZE, fonts.regular, colours::STAMP_BLUE);
        cursor -= LINE_HEIGHT;
    }

    // footer, bottom up
    let centre = stamp.centre_x();
    let mut footer = stamp.y1 + Pt(8.0);
    let date = thai_long_date(request.date);
    canvas.draw_text_centred(&date, centre, footer, FONT_SIZE, fonts.regular, colours::STAMP_BLUE);

    footer += LINE_HEIGHT;
    if let Some(school) = request.school_name.as_deref().filter(|s| !s.is_empty()) {
        school_line(canvas, fonts, request, school, centre, footer);
    }

    footer += LINE_HEIGHT;
    let name = format!("({})", request.director_name);
    canvas.draw_text_centred(&name, centre, footer, FONT_SIZE, fonts.regular, colours::STAMP_BLUE);

    footer += LINE_HEIGHT - Pt(2.0);
    if request.signature.is_some() {
        observer.stage(StampStage::StampingSignature);
        place_optional_image(
            canvas,
            request.signature.as_deref(),
            "director signature",
            centre,
            footer + options.signature_offset_y,
            (SIGNATURE_WIDTH, SIGNATURE_HEIGHT),
            options.signature_scale,
        );
    }

    stamp
}

/// The school name centred under the name line, with the logo to its left
fn school_line(
    canvas: &mut Canvas,
    fonts: Fonts,
    request: &DirectorStampRequest,
    school: &str,
    centre: Pt,
    y: Pt,
) {
    let text_width = canvas.measure_width(school, FONT_SIZE, fonts.regular);
    let logo = request.logo.as_deref().and_then(|bytes| {
        canvas
            .embed_image_sniffed(bytes)
            .map_err(|e| log::warn!("director stamp logo could not be embedded: {e}"))
            .ok()
    });

    match logo {
        Some(image) => {
            let (width, height) = canvas.scale_to_fit(image, LOGO_SIZE, LOGO_SIZE);
            let start = centre - (width + LOGO_GAP + text_width) / 2.0;
            canvas.draw_image(image, start, y - Pt(2.0), width, height);
            let text_x = start + width + LOGO_GAP;
            canvas.draw_text(school, text_x, y, FONT_SIZE, fonts.regular, colours::STAMP_BLUE);
        }
        None => {
            canvas.draw_text_centred(school, centre, y, FONT_SIZE, fonts.regular, colours::STAMP_BLUE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::tests::png;
    use crate::font::GlyphMetrics;
    use crate::stamp::tests::canvas_with_fonts;
    use crate::stamp::NoopObserver;
    use std::cell::RefCell;

    fn request(command: &str) -> DirectorStampRequest {
        DirectorStampRequest::new(
            StampBase::BlankSheet,
            command,
            "นายสมชาย ใจดี",
            NaiveDate::from_ymd_opt(2023, 9, 15).unwrap(),
        )
    }

    #[test]
    fn short_commands_get_the_minimum_box() {
        let (mut canvas, fonts) = canvas_with_fonts();
        let stamp = draw(
            &mut canvas,
            fonts,
            &request(""),
            &DirectorStampOptions::default(),
            &NoopObserver,
        );
        assert!((stamp.height() - box_height(0)).abs() < 0.01);
        assert!(box_height(0) >= min_box_height());
        assert_eq!(box_height(0), SIGNATURE_BLOCK_HEIGHT + BOX_PADDING);
        assert!((stamp.y1 - DIRECTOR_MARGIN).abs() < 0.01);
        assert!((stamp.x2 - (canvas.width() - DIRECTOR_MARGIN)).abs() < 0.01);
    }

    #[test]
    fn long_commands_grow_the_box() {
        let (mut canvas, fonts) = canvas_with_fonts();
        let command = "ทราบ มอบฝ่ายบริหารงานทั่วไปดำเนินการตามระเบียบ ".repeat(12);
        let lines = command_lines(&canvas, fonts, &command);
        assert!(lines.len() > 5);

        let stamp = draw(
            &mut canvas,
            fonts,
            &request(&command),
            &DirectorStampOptions::default(),
            &NoopObserver,
        );
        let reserved = LINE_HEIGHT * lines.len() as f32 + SIGNATURE_BLOCK_HEIGHT + BOX_PADDING;
        assert!(stamp.height() >= reserved - Pt(0.01));

        // the last command line stays above the signature block
        let last = canvas
            .page()
            .spans()
            .filter(|span| span.text == *lines.last().unwrap())
            .last()
            .unwrap()
            .coords
            .1;
        assert!(last > stamp.y1 + SIGNATURE_BLOCK_HEIGHT);
    }

    #[test]
    fn explicit_line_breaks_and_blank_lines_are_kept() {
        let (canvas, fonts) = canvas_with_fonts();
        let lines = command_lines(&canvas, fonts, "ทราบ\n\nดำเนินการ");
        assert_eq!(lines, vec!["ทราบ", "", "ดำเนินการ"]);

        let font = canvas.font(fonts.regular);
        for line in command_lines(&canvas, fonts, &"ก".repeat(300)) {
            assert!(font.width_of(&line, FONT_SIZE) < DIRECTOR_BOX_WIDTH - TEXT_PADDING);
        }
    }

    #[test]
    fn footer_stacks_date_school_and_name() {
        let (mut canvas, fonts) = canvas_with_fonts();
        let mut request = request("ทราบ");
        request.school_name = Some("โรงเรียนบ้านหนองบัว".to_string());
        draw(
            &mut canvas,
            fonts,
            &request,
            &DirectorStampOptions::default(),
            &NoopObserver,
        );

        let y_of = |text: &str| {
            canvas
                .page()
                .spans()
                .find(|span| span.text == text)
                .unwrap()
                .coords
                .1
        };
        let date = y_of("15 กันยายน 2566");
        let school = y_of("โรงเรียนบ้านหนองบัว");
        let name = y_of("(นายสมชาย ใจดี)");
        assert!(date < school && school < name && name < y_of("ทราบ"));
    }

    #[test]
    fn signature_is_scaled_and_offset() {
        let mut request = request("ทราบ");
        request.signature = Some(png(220, 60));

        let (mut canvas, fonts) = canvas_with_fonts();
        draw(
            &mut canvas,
            fonts,
            &request,
            &DirectorStampOptions::default(),
            &NoopObserver,
        );
        let plain = canvas.page().images().next().unwrap().position;
        assert!((plain.width() - SIGNATURE_WIDTH).abs() < 0.01);

        let (mut canvas, fonts) = canvas_with_fonts();
        let options = DirectorStampOptions {
            signature_scale: 0.5,
            signature_offset_y: Pt(10.0),
            ..DirectorStampOptions::default()
        };
        draw(&mut canvas, fonts, &request, &options, &NoopObserver);
        let scaled = canvas.page().images().next().unwrap().position;
        assert!((scaled.width() - SIGNATURE_WIDTH * 0.5).abs() < 0.01);
        assert!((scaled.y1 - plain.y1 - Pt(10.0)).abs() < 0.01);
        assert!((scaled.centre_x() - plain.centre_x()).abs() < 0.01);
    }

    #[test]
    fn broken_signature_still_completes_and_reports_stages() {
        let mut request = request("ทราบ");
        request.signature = Some(b"definitely not a png".to_vec());
        request.logo = Some(b"nor this".to_vec());
        request.school_name = Some("โรงเรียน".to_string());

        let stages = RefCell::new(Vec::new());
        let observer = |stage: StampStage| stages.borrow_mut().push(stage);
        let (mut canvas, fonts) = canvas_with_fonts();
        draw(
            &mut canvas,
            fonts,
            &request,
            &DirectorStampOptions::default(),
            &observer,
        );

        assert_eq!(canvas.page().images().count(), 0);
        assert!(canvas.page().spans().any(|span| span.text == "(นายสมชาย ใจดี)"));
        assert_eq!(
            stages.into_inner(),
            vec![StampStage::WritingCommand, StampStage::StampingSignature]
        );
    }
}
