//! The official leave form, composed on a blank A4 page.
//!
//! The page is laid out top to bottom: emblem, title, letterhead, subject and
//! addressee, the request paragraph, contact paragraph, closing and the
//! requester's signature. The statistics table and the director's decision box
//! rest on the bottom margin, or directly below the signature when a long
//! request pushes it that far down.
//!
//! The request paragraph is three sentences flowed as one block: only the first
//! is indented, and each starts where the previous one ended.

use super::{place_optional_image, Fonts};
use crate::canvas::Canvas;
use crate::codec::thai_long_date;
use crate::colour::Colour;
use crate::colours;
use crate::font::Font;
use crate::layout::{Indent, Margins, Paragraph};
use crate::page::RectStyle;
use crate::rect::Rect;
use crate::records::{LeaveRequest, LeaveStats, LeaveStatus, LeaveType, StaffMember};
use crate::units::{Cm, Pt};
use id_arena::Id;

pub const FONT_SIZE: Pt = Pt(15.0);
pub const TITLE_SIZE: Pt = Pt(18.0);
pub const LINE_HEIGHT: Pt = Pt(20.0);
pub const EMBLEM_SIZE: Pt = Pt(50.0);
const SIGNATURE_WIDTH: Pt = Pt(120.0);
const SIGNATURE_HEIGHT: Pt = Pt(30.0);

pub const TABLE_COLUMNS: [Pt; 4] = [Pt(95.0), Pt(60.0), Pt(60.0), Pt(55.0)];
pub const TABLE_ROW_HEIGHT: Pt = Pt(20.0);
/// Gap between the top of the bottom band and the top of the statistics table,
/// leaving room for the table caption
pub const TABLE_DROP: Pt = Pt(21.0);
const TABLE_SIZE: Pt = Pt(13.0);

pub const DIRECTOR_BOX_HEIGHT: Pt = Pt(205.0);
/// Space kept between the requester's position line and the bottom band
const BAND_GAP: Pt = Pt(15.0);
const BOX_PADDING: Pt = Pt(8.0);

/// Stands in for a date or time that is not on record
pub const DATE_PLACEHOLDER: &str = "....................";
pub const SHORT_PLACEHOLDER: &str = "........";
const SIGNATURE_PLACEHOLDER: &str = "ลงชื่อ......................................";

/// Margins of the form; the director box rests on the bottom one
pub fn margins() -> Margins {
    Margins::trbl(Pt(36.0), Cm(2.0), Pt(36.0), Cm(2.5))
}

/// First-line indent of every indented paragraph
pub fn indent() -> Pt {
    Cm(2.5).into()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveFormRequest {
    pub request: LeaveRequest,
    pub stats: LeaveStats,
    pub staff: StaffMember,
    pub school_name: String,
    pub director_name: String,
    pub teacher_signature: Option<Vec<u8>>,
    pub director_signature: Option<Vec<u8>>,
    /// Replaces the fallback emblem
    pub emblem: Option<Vec<u8>>,
    pub director_signature_scale: f32,
    pub director_signature_offset_y: Pt,
}

impl LeaveFormRequest {
    pub fn new<S: Into<String>, D: Into<String>>(
        request: LeaveRequest,
        stats: LeaveStats,
        staff: StaffMember,
        school_name: S,
        director_name: D,
    ) -> LeaveFormRequest {
        LeaveFormRequest {
            request,
            stats,
            staff,
            school_name: school_name.into(),
            director_name: director_name.into(),
            teacher_signature: None,
            director_signature: None,
            emblem: None,
            director_signature_scale: 1.0,
            director_signature_offset_y: Pt(0.0),
        }
    }

    fn position(&self) -> &str {
        if self.staff.position.is_empty() {
            &self.request.position
        } else {
            &self.staff.position
        }
    }

    fn phone(&self) -> Option<&str> {
        self.request
            .phone
            .as_deref()
            .or(self.staff.phone.as_deref())
            .filter(|phone| !phone.is_empty())
    }
}

pub fn title(leave_type: LeaveType) -> &'static str {
    match leave_type {
        LeaveType::Late => "แบบขออนุญาตเข้าสาย",
        LeaveType::OffCampus => "แบบขออนุญาตออกนอกบริเวณโรงเรียน",
        _ => "แบบใบลาป่วย ลาคลอดบุตร ลากิจส่วนตัว",
    }
}

fn time(time: Option<&str>) -> &str {
    time.filter(|time| !time.trim().is_empty())
        .unwrap_or(SHORT_PLACEHOLDER)
}

/// Who is asking: the indented opening of the request paragraph
pub fn identity_sentence(form: &LeaveFormRequest) -> String {
    format!(
        "ข้าพเจ้า {} ตำแหน่ง {} สังกัด {}",
        form.staff.name,
        form.position(),
        form.school_name
    )
}

/// What is being asked for. Time-based requests give the hours on one day,
/// the others the date range and its length in days.
pub fn request_sentence(request: &LeaveRequest) -> String {
    let reason = if request.reason.trim().is_empty() {
        SHORT_PLACEHOLDER
    } else {
        request.reason.trim()
    };
    let head = format!("ขอ{} เนื่องจาก{}", request.leave_type.label(), reason);
    if request.leave_type.is_time_based() {
        format!(
            "{head} ในวันที่ {} ตั้งแต่เวลา {} น. ถึงเวลา {} น.",
            thai_long_date(request.start_date),
            time(request.start_time.as_deref()),
            time(request.end_time.as_deref()),
        )
    } else {
        format!(
            "{head} ตั้งแต่วันที่ {} ถึงวันที่ {} มีกำหนด {} วัน",
            thai_long_date(request.start_date),
            thai_long_date(request.end_date),
            request.days(),
        )
    }
}

/// The most recent earlier leave, or dot-fill placeholders when there is none
pub fn last_leave_sentence(request: &LeaveRequest, stats: &LeaveStats) -> String {
    match &stats.last_leave {
        Some(last) if last.leave_type.is_time_based() => format!(
            "ข้าพเจ้าได้ขอ{}ครั้งสุดท้ายเมื่อวันที่ {}",
            last.leave_type.label(),
            thai_long_date(last.start_date)
        ),
        Some(last) => format!(
            "ข้าพเจ้าได้{}ครั้งสุดท้ายตั้งแต่วันที่ {} ถึงวันที่ {} มีกำหนด {} วัน",
            last.leave_type.label(),
            thai_long_date(last.start_date),
            thai_long_date(last.end_date),
            last.days
        ),
        None if request.leave_type.is_time_based() => {
            format!("ข้าพเจ้าได้ขออนุญาตครั้งสุดท้ายเมื่อวันที่ {DATE_PLACEHOLDER}")
        }
        None => format!(
            "ข้าพเจ้าได้ลา{SHORT_PLACEHOLDER}ครั้งสุดท้ายตั้งแต่วันที่ {DATE_PLACEHOLDER} \
             ถึงวันที่ {DATE_PLACEHOLDER} มีกำหนด {SHORT_PLACEHOLDER} วัน"
        ),
    }
}

pub fn contact_sentence(form: &LeaveFormRequest) -> String {
    let contact = form.request.contact_info.trim();
    format!(
        "ในระหว่าง{}จะติดต่อข้าพเจ้าได้ที่ {} หมายเลขโทรศัพท์ {}",
        form.request.leave_type.label(),
        if contact.is_empty() { DATE_PLACEHOLDER } else { contact },
        form.phone().unwrap_or(DATE_PLACEHOLDER)
    )
}

/// One row of the statistics table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub label: &'static str,
    pub previous: u32,
    pub this_request: u32,
    pub total: u32,
}

impl StatRow {
    fn new(label: &'static str, previous: u32, this_request: u32) -> StatRow {
        StatRow {
            label,
            previous,
            this_request,
            total: previous.saturating_add(this_request),
        }
    }

    /// Cell texts, with `-` for a category this request does not touch
    pub fn cells(&self) -> [String; 4] {
        let this_request = match self.this_request {
            0 => "-".to_string(),
            n => n.to_string(),
        };
        [
            self.label.to_string(),
            self.previous.to_string(),
            this_request,
            self.total.to_string(),
        ]
    }
}

/// Rows for the statistics table. Time-based requests get a single row counting
/// occurrences; the others get the three day-based categories.
pub fn stat_rows(request: &LeaveRequest, stats: &LeaveStats) -> Vec<StatRow> {
    if request.leave_type.is_time_based() {
        let kind = request.leave_type;
        return vec![StatRow::new(kind.category(), stats.previous(kind), 1)];
    }
    [LeaveType::Sick, LeaveType::Personal, LeaveType::Maternity]
        .into_iter()
        .map(|kind| {
            let this_request = if kind == request.leave_type {
                request.days()
            } else {
                0
            };
            StatRow::new(kind.category(), stats.previous(kind), this_request)
        })
        .collect()
}

/// Where the main parts of the form ended up
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveFormLayout {
    /// Baseline below the last line of the request paragraph
    pub paragraph_end: Pt,
    /// Baseline of the requester's signature line
    pub signature_line: Pt,
    pub table: Rect,
    pub director_box: Rect,
}

/// Lay out the whole form on `canvas`. `emblem` is drawn when it decodes.
pub fn draw(
    canvas: &mut Canvas,
    fonts: Fonts,
    form: &LeaveFormRequest,
    emblem: Option<&[u8]>,
) -> LeaveFormLayout {
    let page_width = canvas.width();
    let content = canvas.content_box();
    let (left, right) = (content.x1, content.x2);
    let centre = page_width / 2.0;
    let black = colours::BLACK;

    let emblem_bottom = content.y2 - EMBLEM_SIZE;
    place_optional_image(
        canvas,
        emblem,
        "emblem",
        centre,
        emblem_bottom,
        (EMBLEM_SIZE, EMBLEM_SIZE),
        1.0,
    );

    let mut y = emblem_bottom - TITLE_SIZE - Pt(8.0);
    let title = title(form.request.leave_type);
    canvas.draw_text_centred(title, centre, y, TITLE_SIZE, fonts.bold, black);

    // letterhead
    y -= LINE_HEIGHT * 1.5;
    let school_width = canvas.measure_width(&form.school_name, FONT_SIZE, fonts.regular);
    canvas.draw_text_right("เขียนที่ ", right - school_width, y, FONT_SIZE, fonts.bold, black);
    canvas.draw_text_right(&form.school_name, right, y, FONT_SIZE, fonts.regular, black);

    y -= LINE_HEIGHT;
    let date = format!("วันที่ {}", thai_long_date(form.request.written_on()));
    canvas.draw_text_centred(&date, (centre + right) / 2.0, y, FONT_SIZE, fonts.regular, black);

    y -= LINE_HEIGHT * 1.5;
    let subject = format!("ขอ{}", form.request.leave_type.label());
    labelled(canvas, fonts, "เรื่อง", &subject, left, y);
    y -= LINE_HEIGHT;
    let addressee = format!("ผู้อำนวยการ{}", form.school_name);
    labelled(canvas, fonts, "เรียน", &addressee, left, y);
    y -= LINE_HEIGHT * 2.0;

    let body = Paragraph {
        font: fonts.regular,
        size: FONT_SIZE,
        colour: black,
        left,
        width: right - left,
        line_height: LINE_HEIGHT,
    };
    y = body.flow(canvas, &identity_sentence(form), y, Indent::FirstLine(indent()));
    y = body.flow(canvas, &request_sentence(&form.request), y, Indent::None);
    y = body.flow(
        canvas,
        &last_leave_sentence(&form.request, &form.stats),
        y,
        Indent::None,
    );
    let paragraph_end = y;

    y = body.flow(canvas, &contact_sentence(form), y, Indent::FirstLine(indent()));

    canvas.draw_text("จึงเรียนมาเพื่อโปรดพิจารณา", left + indent(), y, FONT_SIZE, fonts.regular, black);
    y -= LINE_HEIGHT * 2.5;

    // the requester signs left of centre, mirroring the director's box
    let requester_centre = (left + centre) / 2.0;
    let signature_line = y;
    signature_block(
        canvas,
        fonts,
        SignatureBlock {
            signature: form.teacher_signature.as_deref(),
            what: "teacher signature",
            centre: requester_centre,
            baseline: y,
            scale: 1.0,
            offset_y: Pt(0.0),
            name: &form.staff.name,
            colour: black,
        },
    );
    canvas.draw_text_centred(
        &format!("ตำแหน่ง {}", form.position()),
        requester_centre,
        y - LINE_HEIGHT * 2.0,
        FONT_SIZE,
        fonts.regular,
        black,
    );
    y -= LINE_HEIGHT * 2.0;

    // table and director box rest on the bottom margin unless the body has
    // already run lower, in which case they follow it down
    let band_top = (content.y1 + DIRECTOR_BOX_HEIGHT).min(y - FONT_SIZE - BAND_GAP);
    let band_bottom = band_top - DIRECTOR_BOX_HEIGHT;
    if band_bottom < content.y1 {
        log::warn!(
            "leave form body runs {:.1}pt into the bottom margin",
            *(content.y1 - band_bottom)
        );
    }

    let table = statistics_table(canvas, fonts, form, left, band_top - TABLE_DROP);
    let box_left = table.x2 + Pt(15.0);
    let frame = Rect::from_origin(box_left, band_bottom, right - box_left, DIRECTOR_BOX_HEIGHT);
    let director_box = director_box(canvas, fonts, form, frame);

    LeaveFormLayout {
        paragraph_end,
        signature_line,
        table,
        director_box,
    }
}

/// A bold label followed by a regular value on the same baseline
fn labelled(canvas: &mut Canvas, fonts: Fonts, label: &str, value: &str, x: Pt, y: Pt) {
    canvas.draw_text(label, x, y, FONT_SIZE, fonts.bold, colours::BLACK);
    let value_x = x + canvas.measure_width(label, FONT_SIZE, fonts.bold) + Pt(8.0);
    canvas.draw_text(value, value_x, y, FONT_SIZE, fonts.regular, colours::BLACK);
}

struct SignatureBlock<'a> {
    signature: Option<&'a [u8]>,
    what: &'a str,
    centre: Pt,
    /// Baseline of the signature line; the name goes one line below
    baseline: Pt,
    scale: f32,
    offset_y: Pt,
    name: &'a str,
    colour: Colour,
}

/// A signature image, or a dotted line when there is none, above `(name)`
fn signature_block(canvas: &mut Canvas, fonts: Fonts, block: SignatureBlock) {
    let placed = place_optional_image(
        canvas,
        block.signature,
        block.what,
        block.centre,
        block.baseline - Pt(4.0) + block.offset_y,
        (SIGNATURE_WIDTH, SIGNATURE_HEIGHT),
        block.scale,
    );
    if placed.is_none() {
        canvas.draw_text_centred(
            SIGNATURE_PLACEHOLDER,
            block.centre,
            block.baseline,
            FONT_SIZE,
            fonts.regular,
            block.colour,
        );
    }
    canvas.draw_text_centred(
        &format!("({})", block.name),
        block.centre,
        block.baseline - LINE_HEIGHT,
        FONT_SIZE,
        fonts.regular,
        block.colour,
    );
}

fn statistics_table(
    canvas: &mut Canvas,
    fonts: Fonts,
    form: &LeaveFormRequest,
    left: Pt,
    table_top: Pt,
) -> Rect {
    let rows = stat_rows(&form.request, &form.stats);
    let width: Pt = TABLE_COLUMNS.iter().copied().sum();
    let height = TABLE_ROW_HEIGHT * (rows.len() + 1) as f32;
    let table = Rect::from_origin(left, table_top - height, width, height);

    canvas.draw_text(
        "สถิติการลาในปีงบประมาณนี้",
        left,
        table_top + Pt(6.0),
        FONT_SIZE,
        fonts.bold,
        colours::BLACK,
    );

    let header = ["ประเภท", "มาแล้ว", "ครั้งนี้", "รวม"].map(str::to_string);
    let mut top = table_top;
    table_row(canvas, fonts.bold, &header, left, top);
    for row in &rows {
        top -= TABLE_ROW_HEIGHT;
        table_row(canvas, fonts.regular, &row.cells(), left, top);
    }
    table
}

fn table_row(canvas: &mut Canvas, font: Id<Font>, cells: &[String; 4], left: Pt, top: Pt) {
    let mut x = left;
    for (text, width) in cells.iter().zip(TABLE_COLUMNS) {
        let cell = Rect::from_origin(x, top - TABLE_ROW_HEIGHT, width, TABLE_ROW_HEIGHT);
        canvas.draw_rect(cell, RectStyle::outline(colours::BLACK, Pt(0.5)));
        canvas.draw_text_centred(text, cell.centre_x(), cell.y1 + Pt(6.0), TABLE_SIZE, font, colours::BLACK);
        x += width;
    }
}

fn director_box(canvas: &mut Canvas, fonts: Fonts, form: &LeaveFormRequest, frame: Rect) -> Rect {
    canvas.draw_rect(frame, RectStyle::outline(colours::BLACK, Pt(1.0)));

    let inner_left = frame.x1 + BOX_PADDING;
    let centre = frame.centre_x();
    let black = colours::BLACK;

    let mut y = frame.y2 - BOX_PADDING - FONT_SIZE;
    canvas.draw_text("ความเห็นผู้บังคับบัญชา", inner_left, y, FONT_SIZE, fonts.bold, black);

    let status = form.request.status;
    for (choice, label) in [
        (LeaveStatus::Approved, "อนุญาต"),
        (LeaveStatus::Rejected, "ไม่อนุญาต"),
    ] {
        y -= LINE_HEIGHT;
        let mark = if status == choice { "[ / ]" } else { "[   ]" };
        canvas.draw_text(&format!("{mark} {label}"), inner_left, y, FONT_SIZE, fonts.regular, black);
    }

    y -= LINE_HEIGHT * 2.0;
    signature_block(
        canvas,
        fonts,
        SignatureBlock {
            signature: form.director_signature.as_deref(),
            what: "director signature",
            centre,
            baseline: y,
            scale: form.director_signature_scale,
            offset_y: form.director_signature_offset_y,
            name: &form.director_name,
            colour: black,
        },
    );
    y -= LINE_HEIGHT * 2.0;

    let position = Paragraph {
        font: fonts.regular,
        size: FONT_SIZE,
        colour: black,
        left: inner_left,
        width: frame.width() - BOX_PADDING * 2.0,
        line_height: LINE_HEIGHT,
    };
    y = position.flow(
        canvas,
        &format!("ผู้อำนวยการ{}", form.school_name),
        y,
        Indent::None,
    );

    if let Some(decided) = form.request.approved_date {
        let date = format!("วันที่ {}", thai_long_date(decided));
        canvas.draw_text_centred(&date, centre, y, FONT_SIZE, fonts.regular, black);
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::tests::{png, BOLD, REGULAR};
    use crate::pagesize::A4;
    use crate::records::LastLeave;
    use chrono::NaiveDate;

    fn form_canvas() -> (Canvas, Fonts) {
        let mut canvas = Canvas::with_margins(A4, margins());
        let fonts = Fonts {
            regular: canvas.embed_font(REGULAR.to_vec()).unwrap(),
            bold: canvas.embed_font(BOLD.to_vec()).unwrap(),
        };
        (canvas, fonts)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sick_form() -> LeaveFormRequest {
        let request = LeaveRequest {
            id: "lr-1".to_string(),
            teacher_id: "t-1".to_string(),
            teacher_name: "นางสาวสมศรี มีสุข".to_string(),
            position: "ครู".to_string(),
            leave_type: LeaveType::Sick,
            start_date: date("2023-09-15"),
            end_date: date("2023-09-16"),
            start_time: None,
            end_time: None,
            reason: "เป็นไข้หวัดใหญ่".to_string(),
            contact_info: "บ้านเลขที่ 12 หมู่ 3".to_string(),
            phone: Some("081-234-5678".to_string()),
            status: LeaveStatus::Pending,
            created_date: Some(date("2023-09-14")),
            approved_date: None,
        };
        let stats = LeaveStats {
            prev_sick: 3,
            ..LeaveStats::default()
        };
        let staff = StaffMember {
            id: "t-1".to_string(),
            name: "นางสาวสมศรี มีสุข".to_string(),
            position: "ครู คศ.1".to_string(),
            phone: None,
        };
        LeaveFormRequest::new(request, stats, staff, "โรงเรียนบ้านหนองบัว", "นายสมชาย ใจดี")
    }

    fn texts(canvas: &Canvas) -> Vec<String> {
        canvas.page().spans().map(|span| span.text.clone()).collect()
    }

    #[test]
    fn titles_follow_the_leave_type() {
        assert_eq!(title(LeaveType::Late), "แบบขออนุญาตเข้าสาย");
        assert_eq!(title(LeaveType::OffCampus), "แบบขออนุญาตออกนอกบริเวณโรงเรียน");
        assert_eq!(title(LeaveType::Sick), title(LeaveType::Maternity));
    }

    #[test]
    fn sick_row_adds_this_request_to_previous_days() {
        let form = sick_form();
        let rows = stat_rows(&form.request, &form.stats);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cells(), ["ป่วย", "3", "2", "5"].map(str::to_string));
        assert_eq!(rows[1].cells(), ["กิจส่วนตัว", "0", "-", "0"].map(str::to_string));
        assert_eq!(rows[2].cells(), ["คลอดบุตร", "0", "-", "0"].map(str::to_string));
    }

    #[test]
    fn time_based_requests_get_one_count_row() {
        let mut form = sick_form();
        form.request.leave_type = LeaveType::Late;
        form.stats.prev_late = 4;
        let rows = stat_rows(&form.request, &form.stats);
        assert_eq!(rows, vec![StatRow::new("เข้าสาย", 4, 1)]);
        assert_eq!(rows[0].total, 5);
    }

    #[test]
    fn only_time_based_requests_mention_times() {
        let mut form = sick_form();
        let sick = request_sentence(&form.request);
        assert!(!sick.contains("เวลา"));
        assert!(sick.contains("มีกำหนด 2 วัน"));

        form.request.leave_type = LeaveType::OffCampus;
        form.request.start_time = Some("13:00".to_string());
        form.request.end_time = Some("15:30".to_string());
        let off_campus = request_sentence(&form.request);
        assert!(off_campus.contains("ตั้งแต่เวลา 13:00 น."));
        assert!(off_campus.contains("ถึงเวลา 15:30 น."));

        form.request.end_time = None;
        assert!(request_sentence(&form.request).contains(&format!("ถึงเวลา {SHORT_PLACEHOLDER} น.")));
    }

    #[test]
    fn missing_last_leave_uses_placeholders() {
        let form = sick_form();
        let sentence = last_leave_sentence(&form.request, &form.stats);
        assert_eq!(sentence.matches(DATE_PLACEHOLDER).count(), 2);

        let mut stats = form.stats.clone();
        stats.last_leave = Some(LastLeave {
            leave_type: LeaveType::Personal,
            start_date: date("2023-05-02"),
            end_date: date("2023-05-04"),
            days: 3,
        });
        let sentence = last_leave_sentence(&form.request, &stats);
        assert!(sentence.contains("ลากิจส่วนตัว"));
        assert!(sentence.contains("2 พฤษภาคม 2566"));
        assert!(!sentence.contains(DATE_PLACEHOLDER));
    }

    #[test]
    fn request_paragraph_chains_without_reindenting() {
        let (mut canvas, fonts) = form_canvas();
        let form = sick_form();
        draw(&mut canvas, fonts, &form, None);

        let spans: Vec<_> = canvas.page().spans().cloned().collect();
        let identity = spans
            .iter()
            .position(|span| span.text.starts_with("ข้าพเจ้า "))
            .unwrap();
        assert_eq!(spans[identity].coords.0, margins().left + indent());

        // the subject line also starts with the leave label, so look past it
        let request = identity
            + spans[identity..]
                .iter()
                .position(|span| span.text.starts_with("ขอลาป่วย เนื่องจาก"))
                .unwrap();
        assert_eq!(spans[request].coords.0, margins().left);
        assert!(spans[request].coords.1 < spans[identity].coords.1);

        let last = request
            + spans[request..]
                .iter()
                .position(|span| span.text.starts_with("ข้าพเจ้าได้"))
                .unwrap();
        assert_eq!(spans[last].coords.0, margins().left);

        let contact = spans
            .iter()
            .position(|span| span.text.starts_with("ในระหว่าง"))
            .unwrap();
        assert_eq!(spans[contact].coords.0, margins().left + indent());
    }

    #[test]
    fn draws_the_table_and_director_box_along_the_bottom() {
        let (mut canvas, fonts) = form_canvas();
        let form = sick_form();
        let layout = draw(&mut canvas, fonts, &form, None);

        assert!(layout.table.x2 < layout.director_box.x1);
        assert!(layout.signature_line > layout.director_box.y2);
        assert!(layout.paragraph_end > layout.signature_line);
        assert!((layout.table.height() - TABLE_ROW_HEIGHT * 4.0).abs() < 0.01);

        let texts = texts(&canvas);
        let sick = texts.iter().position(|text| text == "ป่วย").unwrap();
        assert_eq!(texts[sick + 1..sick + 4], ["3", "2", "5"]);
        assert!(texts.contains(&"[   ] อนุญาต".to_string()));
        assert!(texts.contains(&"[   ] ไม่อนุญาต".to_string()));
        assert!(texts.contains(&"(นายสมชาย ใจดี)".to_string()));
        assert!(texts.contains(&"(นางสาวสมศรี มีสุข)".to_string()));
        assert_eq!(
            texts.iter().filter(|text| *text == SIGNATURE_PLACEHOLDER).count(),
            2
        );
        assert_eq!(
            texts.iter().filter(|text| *text == "วันที่ 14 กันยายน 2566").count(),
            1
        );
    }

    #[test]
    fn requester_signs_left_of_centre() {
        let (mut canvas, fonts) = form_canvas();
        let layout = draw(&mut canvas, fonts, &sick_form(), None);

        let name = canvas
            .page()
            .spans()
            .find(|span| span.text == "(นางสาวสมศรี มีสุข)")
            .unwrap()
            .clone();
        let width = canvas.measure_width(&name.text, FONT_SIZE, fonts.regular);
        let name_centre = name.coords.0 + width / 2.0;
        assert!(name_centre < canvas.width() / 2.0);
        assert!(name_centre > margins().left);
        assert!(layout.director_box.centre_x() > canvas.width() / 2.0);
    }

    #[test]
    fn long_reasons_push_the_bottom_band_down() {
        let (mut canvas, fonts) = form_canvas();
        let short = draw(&mut canvas, fonts, &sick_form(), None);

        let mut form = sick_form();
        form.request.reason = "ปวดศีรษะและมีไข้สูงต่อเนื่อง".repeat(12);
        let (mut canvas, fonts) = form_canvas();
        let long = draw(&mut canvas, fonts, &form, None);

        assert!(long.paragraph_end < short.paragraph_end);
        let position_line = long.signature_line - LINE_HEIGHT * 2.0;
        assert!(position_line - FONT_SIZE > long.table.y2 + TABLE_DROP);
        assert!(position_line - FONT_SIZE > long.director_box.y2);
        assert!(long.table.x2 < long.director_box.x1);
        assert!((long.director_box.height() - DIRECTOR_BOX_HEIGHT).abs() < 0.01);

        // the band never rises above the bottom margin, only sinks below it
        assert!(short.director_box.y1 <= margins().bottom + Pt(0.01));
        assert!(long.director_box.y1 <= short.director_box.y1);
    }

    #[test]
    fn oversized_stats_do_not_overflow() {
        let row = StatRow::new("ป่วย", u32::MAX, 2);
        assert_eq!(row.total, u32::MAX);
    }

    #[test]
    fn approval_checks_the_box_and_prints_the_decision_date() {
        let (mut canvas, fonts) = form_canvas();
        let mut form = sick_form();
        form.request.status = LeaveStatus::Approved;
        form.request.approved_date = Some(date("2023-09-14"));
        form.director_signature = Some(png(240, 60));
        form.teacher_signature = Some(b"broken".to_vec());
        draw(&mut canvas, fonts, &form, Some(&png(64, 64)));

        let texts = texts(&canvas);
        assert!(texts.contains(&"[ / ] อนุญาต".to_string()));
        assert!(texts.contains(&"[   ] ไม่อนุญาต".to_string()));
        assert_eq!(
            texts.iter().filter(|text| *text == "วันที่ 14 กันยายน 2566").count(),
            2
        );
        // emblem and director signature; the broken teacher signature falls back
        assert_eq!(canvas.page().images().count(), 2);
        assert_eq!(
            texts.iter().filter(|text| *text == SIGNATURE_PLACEHOLDER).count(),
            1
        );
    }

    #[test]
    fn emblem_is_centred_at_the_top() {
        let (mut canvas, fonts) = form_canvas();
        draw(&mut canvas, fonts, &sick_form(), Some(&png(100, 100)));
        let emblem = canvas.page().images().next().unwrap().position;
        assert!((emblem.centre_x() - canvas.width() / 2.0).abs() < 0.01);
        assert!((emblem.y2 - (canvas.height() - margins().top)).abs() < 0.01);
        assert!((emblem.width() - EMBLEM_SIZE).abs() < 0.01);
    }
}
