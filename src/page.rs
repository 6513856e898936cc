use crate::colour::Colour;
use crate::content::render_contents;
use crate::font::Font;
use crate::image::Image;
use crate::layout::Margins;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{Object, ObjectIds};
use crate::units::*;
use crate::StampError;
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Name, Pdf};

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub id: Id<Font>,
    pub size: Pt,
}

/// A run of text drawn on a single baseline starting at `coords`
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    pub coords: (Pt, Pt),
}

#[derive(Clone, PartialEq, Debug)]
pub struct ImageLayout {
    pub image_id: Id<Image>,
    pub position: Rect,
}

/// How a rectangle is painted. A rectangle with neither fill nor stroke is not drawn.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct RectStyle {
    pub fill: Option<Colour>,
    pub stroke: Option<Colour>,
    pub stroke_width: Pt,
}

impl RectStyle {
    /// An unfilled box with a border
    pub fn outline(colour: Colour, stroke_width: Pt) -> RectStyle {
        RectStyle {
            fill: None,
            stroke: Some(colour),
            stroke_width,
        }
    }

    /// A filled box with a border
    pub fn filled(fill: Colour, stroke: Colour, stroke_width: Pt) -> RectStyle {
        RectStyle {
            fill: Some(fill),
            stroke: Some(stroke),
            stroke_width,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct RectLayout {
    pub position: Rect,
    pub style: RectStyle,
}

#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(Vec<SpanLayout>),
    Image(ImageLayout),
    Rect(RectLayout),
}

pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Where content can live, i.e. within the margins
    pub content_box: Rect,
    /// Everything placed on the page, in painting order
    pub contents: Vec<PageContents>,
}

impl Page {
    pub fn new(size: PageSize, margins: Option<Margins>) -> Page {
        let (width, height) = size;
        let margins = margins.unwrap_or_else(Margins::empty);
        Page {
            media_box: Rect {
                x1: Pt(0.0),
                y1: Pt(0.0),
                x2: width,
                y2: height,
            },
            content_box: Rect {
                x1: margins.left,
                y1: margins.bottom,
                x2: width - margins.right,
                y2: height - margins.top,
            },
            contents: Vec::default(),
        }
    }

    pub fn width(&self) -> Pt {
        self.media_box.width()
    }

    pub fn height(&self) -> Pt {
        self.media_box.height()
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        self.contents.push(PageContents::Text(vec![span]));
    }

    pub fn add_image(&mut self, image: ImageLayout) {
        self.contents.push(PageContents::Image(image));
    }

    pub fn add_rect(&mut self, rect: RectLayout) {
        self.contents.push(PageContents::Rect(rect));
    }

    /// All text spans on the page in painting order
    pub fn spans(&self) -> impl Iterator<Item = &SpanLayout> {
        self.contents
            .iter()
            .filter_map(|content| match content {
                PageContents::Text(spans) => Some(spans.iter()),
                _ => None,
            })
            .flatten()
    }

    /// All rectangles on the page in painting order
    pub fn rects(&self) -> impl Iterator<Item = &RectLayout> {
        self.contents.iter().filter_map(|content| match content {
            PageContents::Rect(rect) => Some(rect),
            _ => None,
        })
    }

    /// All image placements on the page in painting order
    pub fn images(&self) -> impl Iterator<Item = &ImageLayout> {
        self.contents.iter().filter_map(|content| match content {
            PageContents::Image(image) => Some(image),
            _ => None,
        })
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectIds,
        page_index: usize,
        fonts: &Arena<Font>,
        images: &Arena<Image>,
        writer: &mut Pdf,
    ) -> Result<(), StampError> {
        let id = refs
            .lookup(Object::Page(page_index))
            .ok_or(StampError::PageMissing(page_index))?;
        let page_tree = refs
            .lookup(Object::PageTree)
            .ok_or(StampError::PageMissing(page_index))?;
        let content_id = refs.assign(Object::PageContent(page_index));

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        page.parent(page_tree);

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        for (font_id, _) in fonts.iter() {
            if let Some(font_ref) = refs.lookup(Object::Font(font_id.index())) {
                resource_fonts.pair(Name(format!("F{}", font_id.index()).as_bytes()), font_ref);
            }
        }
        resource_fonts.finish();
        let mut resource_xobjects = resources.x_objects();
        for (image_id, _) in images.iter() {
            if let Some(image_ref) = refs.lookup(Object::Image(image_id.index())) {
                resource_xobjects
                    .pair(Name(format!("I{}", image_id.index()).as_bytes()), image_ref);
            }
        }
        resource_xobjects.finish();
        resources.finish();

        page.contents(content_id);
        page.finish();

        let rendered = render_contents(&self.contents, fonts)?;
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            &rendered,
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        writer
            .stream(content_id, compressed.as_slice())
            .filter(pdf_writer::Filter::FlateDecode);

        Ok(())
    }
}
