//! A single page being composed, and the only drawing surface the composers use.
//!
//! A [Canvas] owns the [Document] it draws into, so one canvas is one document:
//! nothing here is shared between compositions. Every drawing call is applied to
//! the page's content list immediately, in painting order.

use crate::colour::Colour;
use crate::document::Document;
use crate::font::{Font, GlyphMetrics};
use crate::image::{Image, ImageError, ImageKind};
use crate::info::Info;
use crate::layout::Margins;
use crate::page::{ImageLayout, Page, RectLayout, RectStyle, SpanFont, SpanLayout};
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::units::Pt;
use crate::StampError;
use id_arena::Id;

pub struct Canvas {
    document: Document,
    page: Page,
}

impl Canvas {
    /// A blank page of the given size
    pub fn new(size: PageSize) -> Canvas {
        Canvas::with_margins(size, Margins::empty())
    }

    pub fn with_margins(size: PageSize, margins: Margins) -> Canvas {
        Canvas {
            document: Document::default(),
            page: Page::new(size, Some(margins)),
        }
    }

    pub fn width(&self) -> Pt {
        self.page.width()
    }

    pub fn height(&self) -> Pt {
        self.page.height()
    }

    /// The page inside its margins
    pub fn content_box(&self) -> Rect {
        self.page.content_box
    }

    /// The page as drawn so far
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Parse a font program and register it with the document. Text can only be
    /// measured or drawn with fonts embedded this way.
    pub fn embed_font(&mut self, bytes: Vec<u8>) -> Result<Id<Font>, StampError> {
        let font = Font::load(bytes)?;
        Ok(self.document.add_font(font))
    }

    /// A font previously returned by [Canvas::embed_font]
    pub fn font(&self, id: Id<Font>) -> &Font {
        &self.document.fonts[id]
    }

    /// Decode and register an image. Corrupt payloads are returned as errors so the
    /// caller can decide to leave the image out.
    pub fn embed_image(&mut self, bytes: &[u8], kind: ImageKind) -> Result<Id<Image>, ImageError> {
        let image = Image::from_bytes(bytes, kind)?;
        Ok(self.document.add_image(image))
    }

    /// Like [Canvas::embed_image], detecting PNG or JPEG from the payload
    pub fn embed_image_sniffed(&mut self, bytes: &[u8]) -> Result<Id<Image>, ImageError> {
        let image = Image::sniffed(bytes)?;
        Ok(self.document.add_image(image))
    }

    pub fn measure_width(&self, text: &str, size: Pt, font: Id<Font>) -> Pt {
        self.font(font).width_of(text, size)
    }

    /// Size of an embedded image scaled to fit inside `max_width` × `max_height`
    pub fn scale_to_fit(&self, image: Id<Image>, max_width: Pt, max_height: Pt) -> (Pt, Pt) {
        self.document.images[image].scale_to_fit(max_width, max_height)
    }

    /// Draw a run of text with its baseline starting at (`x`, `y`)
    pub fn draw_text(
        &mut self,
        text: &str,
        x: Pt,
        y: Pt,
        size: Pt,
        font: Id<Font>,
        colour: Colour,
    ) {
        if text.is_empty() {
            return;
        }
        self.page.add_span(SpanLayout {
            text: text.to_string(),
            font: SpanFont { id: font, size },
            colour,
            coords: (x, y),
        });
    }

    /// Draw text so that it ends at `right`
    pub fn draw_text_right(
        &mut self,
        text: &str,
        right: Pt,
        y: Pt,
        size: Pt,
        font: Id<Font>,
        colour: Colour,
    ) {
        let width = self.measure_width(text, size, font);
        self.draw_text(text, right - width, y, size, font, colour);
    }

    /// Draw text horizontally centred on `centre`
    pub fn draw_text_centred(
        &mut self,
        text: &str,
        centre: Pt,
        y: Pt,
        size: Pt,
        font: Id<Font>,
        colour: Colour,
    ) {
        let width = self.measure_width(text, size, font);
        self.draw_text(text, centre - width / 2.0, y, size, font, colour);
    }

    pub fn draw_rect(&mut self, position: Rect, style: RectStyle) {
        self.page.add_rect(RectLayout { position, style });
    }

    /// Place an embedded image with its lower-left corner at (`x`, `y`)
    pub fn draw_image(&mut self, image: Id<Image>, x: Pt, y: Pt, width: Pt, height: Pt) {
        self.page.add_image(ImageLayout {
            image_id: image,
            position: Rect::from_origin(x, y, width, height),
        });
    }

    /// Hand the finished page back as a one-page document
    pub fn finish(self) -> Document {
        let Canvas { mut document, page } = self;
        document.add_page(page);
        document
    }

    /// Finish the page and serialize the document
    pub fn into_pdf(self, info: Info) -> Result<Vec<u8>, StampError> {
        let mut document = self.finish();
        document.set_info(info);
        document.write()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::colours;
    use crate::pagesize::A4;

    pub(crate) const REGULAR: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
    pub(crate) const BOLD: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let image = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([0, 0, 128, 255]),
        ));
        let mut bytes = Vec::new();
        image
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageOutputFormat::Png,
            )
            .expect("can encode png");
        bytes
    }

    #[test]
    fn draws_in_painting_order() {
        let mut canvas = Canvas::new(A4);
        let font = canvas.embed_font(REGULAR.to_vec()).unwrap();
        canvas.draw_rect(
            Rect::from_origin(Pt(10.0), Pt(10.0), Pt(100.0), Pt(50.0)),
            RectStyle::outline(colours::BLACK, Pt(1.0)),
        );
        canvas.draw_text("hello", Pt(20.0), Pt(30.0), Pt(12.0), font, colours::BLACK);
        canvas.draw_text("", Pt(20.0), Pt(30.0), Pt(12.0), font, colours::BLACK);

        let page = canvas.page();
        assert_eq!(page.contents.len(), 2);
        assert_eq!(page.spans().next().unwrap().coords, (Pt(20.0), Pt(30.0)));
        assert_eq!(page.rects().count(), 1);
    }

    #[test]
    fn right_and_centre_alignment_use_measured_width() {
        let mut canvas = Canvas::new(A4);
        let font = canvas.embed_font(REGULAR.to_vec()).unwrap();
        let width = canvas.measure_width("abc", Pt(12.0), font);
        canvas.draw_text_right("abc", Pt(300.0), Pt(100.0), Pt(12.0), font, colours::BLACK);
        canvas.draw_text_centred("abc", Pt(300.0), Pt(80.0), Pt(12.0), font, colours::BLACK);

        let xs: Vec<Pt> = canvas.page().spans().map(|span| span.coords.0).collect();
        assert_eq!(xs[0], Pt(300.0) - width);
        assert_eq!(xs[1], Pt(300.0) - width / 2.0);
    }

    #[test]
    fn corrupt_images_are_reported_not_placed() {
        let mut canvas = Canvas::new(A4);
        assert!(canvas.embed_image(b"garbage", ImageKind::Png).is_err());
        assert!(canvas.embed_image_sniffed(b"garbage").is_err());
        let image = canvas.embed_image(&png(100, 50), ImageKind::Png).unwrap();
        assert_eq!(
            canvas.scale_to_fit(image, Pt(50.0), Pt(50.0)),
            (Pt(50.0), Pt(25.0))
        );
        assert_eq!(canvas.page().images().count(), 0);
    }

    #[test]
    fn serializes_to_a_loadable_pdf() {
        let mut canvas = Canvas::new(A4);
        let font = canvas.embed_font(REGULAR.to_vec()).unwrap();
        let image = canvas.embed_image(&png(10, 10), ImageKind::Png).unwrap();
        canvas.draw_text("สวัสดี hello", Pt(72.0), Pt(700.0), Pt(16.0), font, colours::BLACK);
        canvas.draw_image(image, Pt(72.0), Pt(600.0), Pt(20.0), Pt(20.0));

        let bytes = canvas.into_pdf(Info::new("test")).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let reloaded = lopdf::Document::load_mem(&bytes).expect("valid pdf");
        assert_eq!(reloaded.get_pages().len(), 1);
    }
}
