//! The receive-number stamp: a small fixed box in the top-right corner of the
//! first page recording when a document was registered.

use super::Fonts;
use crate::canvas::Canvas;
use crate::colours;
use crate::page::RectStyle;
use crate::rect::Rect;
use crate::units::Pt;

pub const RECEIVE_BOX_WIDTH: Pt = Pt(170.0);
pub const RECEIVE_BOX_HEIGHT: Pt = Pt(82.0);
/// Distance from the top and right page edges
pub const RECEIVE_MARGIN: Pt = Pt(20.0);
const PADDING: Pt = Pt(8.0);
const HEADER_SIZE: Pt = Pt(13.0);
const FONT_SIZE: Pt = Pt(12.0);
const LINE_HEIGHT: Pt = Pt(16.0);
const LOGO_SIZE: Pt = Pt(16.0);
const LOGO_GAP: Pt = Pt(4.0);
const LABEL_GAP: Pt = Pt(4.0);

/// Header used when the request names no school
pub const DEFAULT_HEADER: &str = "ทะเบียนรับหนังสือ";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiveStampRequest {
    /// The PDF being registered
    pub source: Vec<u8>,
    pub book_number: String,
    pub date: String,
    pub time: String,
    pub school_name: Option<String>,
    pub logo: Option<Vec<u8>>,
}

/// Draw the stamp in the top-right corner of the canvas and return its box. The
/// box has the same size whatever the field lengths; long values run past it.
pub fn draw(canvas: &mut Canvas, fonts: Fonts, request: &ReceiveStampRequest) -> Rect {
    let x = canvas.width() - RECEIVE_BOX_WIDTH - RECEIVE_MARGIN;
    let y = canvas.height() - RECEIVE_BOX_HEIGHT - RECEIVE_MARGIN;
    let stamp = Rect::from_origin(x, y, RECEIVE_BOX_WIDTH, RECEIVE_BOX_HEIGHT);
    canvas.draw_rect(stamp, RectStyle::outline(colours::STAMP_RED, Pt(1.0)));

    let left = x + PADDING;
    let mut cursor = stamp.y2 - PADDING - HEADER_SIZE;

    let header = request
        .school_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_HEADER);
    let header_x = match logo(canvas, fonts, request, left, cursor) {
        Some(logo) => logo.x2 + LOGO_GAP,
        None => left,
    };
    canvas.draw_text(header, header_x, cursor, HEADER_SIZE, fonts.bold, colours::STAMP_RED);

    let rows = [
        ("เลขรับที่", request.book_number.as_str()),
        ("วันที่", request.date.as_str()),
        ("เวลา", request.time.as_str()),
    ];
    for (label, value) in rows {
        cursor -= LINE_HEIGHT;
        canvas.draw_text(label, left, cursor, FONT_SIZE, fonts.bold, colours::STAMP_RED);
        let value_x = left + canvas.measure_width(label, FONT_SIZE, fonts.bold) + LABEL_GAP;
        canvas.draw_text(value, value_x, cursor, FONT_SIZE, fonts.regular, colours::STAMP_RED);
    }

    stamp
}

/// Place the logo left of the header baseline at `y`, if there is one that decodes
fn logo(
    canvas: &mut Canvas,
    fonts: Fonts,
    request: &ReceiveStampRequest,
    left: Pt,
    y: Pt,
) -> Option<Rect> {
    let bytes = request.logo.as_deref()?;
    let image = match canvas.embed_image_sniffed(bytes) {
        Ok(image) => image,
        Err(e) => {
            log::warn!("receive stamp logo could not be embedded: {e}");
            return None;
        }
    };
    let (width, height) = canvas.scale_to_fit(image, LOGO_SIZE, LOGO_SIZE);
    // sit the logo on the descender line so it spans the header's height
    let bottom = y + canvas.font(fonts.bold).descent(HEADER_SIZE);
    canvas.draw_image(image, left, bottom, width, height);
    Some(Rect::from_origin(left, bottom, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::tests::png;
    use crate::stamp::tests::canvas_with_fonts;

    fn request() -> ReceiveStampRequest {
        ReceiveStampRequest {
            book_number: "123/2566".to_string(),
            date: "15 ก.ย. 2566".to_string(),
            time: "10:30 น.".to_string(),
            school_name: Some("โรงเรียนบ้านหนองบัว".to_string()),
            ..ReceiveStampRequest::default()
        }
    }

    #[test]
    fn anchors_to_the_top_right_corner() {
        let (mut canvas, fonts) = canvas_with_fonts();
        let stamp = draw(&mut canvas, fonts, &request());
        assert!((stamp.x2 - (canvas.width() - RECEIVE_MARGIN)).abs() < 0.01);
        assert!((stamp.y2 - (canvas.height() - RECEIVE_MARGIN)).abs() < 0.01);

        let texts: Vec<&str> = canvas.page().spans().map(|span| span.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "โรงเรียนบ้านหนองบัว",
                "เลขรับที่",
                "123/2566",
                "วันที่",
                "15 ก.ย. 2566",
                "เวลา",
                "10:30 น."
            ]
        );
    }

    #[test]
    fn labels_and_values_share_a_baseline() {
        let (mut canvas, fonts) = canvas_with_fonts();
        draw(&mut canvas, fonts, &request());
        let spans: Vec<_> = canvas.page().spans().collect();
        for pair in spans[1..].chunks(2) {
            assert_eq!(pair[0].coords.1, pair[1].coords.1);
            assert!(pair[1].coords.0 > pair[0].coords.0);
            assert_eq!(pair[0].font.id, fonts.bold);
            assert_eq!(pair[1].font.id, fonts.regular);
        }
        assert!((spans[1].coords.1 - spans[3].coords.1 - LINE_HEIGHT).abs() < 0.01);
    }

    #[test]
    fn box_size_does_not_depend_on_content() {
        let (mut short_canvas, fonts) = canvas_with_fonts();
        let short = draw(&mut short_canvas, fonts, &request());

        let mut long = request();
        long.book_number = "1".repeat(200);
        long.school_name = Some("โรงเรียน".repeat(30));
        let (mut long_canvas, fonts) = canvas_with_fonts();
        let long = draw(&mut long_canvas, fonts, &long);

        assert_eq!(short, long);
        assert!((long.width() - RECEIVE_BOX_WIDTH).abs() < 0.01);
        assert!((long.height() - RECEIVE_BOX_HEIGHT).abs() < 0.01);
    }

    #[test]
    fn logo_shifts_the_header() {
        let mut with_logo = request();
        with_logo.logo = Some(png(32, 32));
        let (mut canvas, fonts) = canvas_with_fonts();
        let stamp = draw(&mut canvas, fonts, &with_logo);
        let header = canvas.page().spans().next().unwrap().clone();
        assert_eq!(canvas.page().images().count(), 1);
        assert!((header.coords.0 - (stamp.x1 + PADDING + LOGO_SIZE + LOGO_GAP)).abs() < 0.01);

        with_logo.logo = Some(b"corrupt".to_vec());
        let (mut canvas, fonts) = canvas_with_fonts();
        let stamp = draw(&mut canvas, fonts, &with_logo);
        let header = canvas.page().spans().next().unwrap().clone();
        assert_eq!(canvas.page().images().count(), 0);
        assert!((header.coords.0 - (stamp.x1 + PADDING)).abs() < 0.01);
    }

    #[test]
    fn missing_school_name_uses_the_default_header() {
        let mut request = request();
        request.school_name = None;
        let (mut canvas, fonts) = canvas_with_fonts();
        draw(&mut canvas, fonts, &request);
        assert_eq!(canvas.page().spans().next().unwrap().text, DEFAULT_HEADER);
    }
}
