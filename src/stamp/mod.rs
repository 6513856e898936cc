//! The three document composers and the [Stamper] that drives them.
//!
//! Each composer is split in two: a layout function that draws onto a [Canvas]
//! and returns where it put things, and a method on [Stamper] that fetches the
//! fonts, picks the page to draw on and serializes the result. Layout functions
//! never fail; only the `Stamper` methods return [StampError].

use crate::assets::{AssetConfig, AssetFetcher, FontSet};
use crate::canvas::Canvas;
use crate::codec::encode_data_uri;
use crate::font::Font;
use crate::info::Info;
use crate::overlay::SourcePdf;
use crate::pagesize::A4;
use crate::rect::Rect;
use crate::units::Pt;
use crate::StampError;
use id_arena::Id;

pub mod director;
pub mod leave_form;
pub mod receive;

pub use director::{DirectorStampOptions, DirectorStampRequest};
pub use leave_form::LeaveFormRequest;
pub use receive::ReceiveStampRequest;

/// What a stamp is drawn on
#[derive(Debug, Clone, PartialEq)]
pub enum StampBase {
    /// An existing PDF document
    Pdf(Vec<u8>),
    /// A scanned page, placed on a fresh A4 page
    Image(Vec<u8>),
    /// A fresh, empty A4 page
    BlankSheet,
}

/// A finished, serialized document. The composer keeps no reference to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedDocument {
    bytes: Vec<u8>,
}

impl ComposedDocument {
    pub fn new(bytes: Vec<u8>) -> ComposedDocument {
        ComposedDocument { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The document as a `data:application/pdf;base64,` URI
    pub fn data_uri(&self) -> String {
        encode_data_uri("application/pdf", &self.bytes)
    }
}

/// Progress points reported while a director stamp is composed
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StampStage {
    LoadingFonts,
    WritingCommand,
    StampingSignature,
}

/// Receives progress notifications. Notifications cannot influence the output or
/// abort the composition.
pub trait StampObserver {
    fn stage(&self, stage: StampStage);
}

/// Ignores every notification
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopObserver;

impl StampObserver for NoopObserver {
    fn stage(&self, _stage: StampStage) {}
}

impl<F: Fn(StampStage)> StampObserver for F {
    fn stage(&self, stage: StampStage) {
        self(stage)
    }
}

/// The regular and bold faces embedded into one canvas
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fonts {
    pub regular: Id<Font>,
    pub bold: Id<Font>,
}

impl Fonts {
    pub fn embed(canvas: &mut Canvas, fonts: &FontSet) -> Result<Fonts, StampError> {
        Ok(Fonts {
            regular: canvas.embed_font(fonts.regular.clone())?,
            bold: canvas.embed_font(fonts.bold.clone())?,
        })
    }
}

/// Composes stamped and generated documents. A `Stamper` holds only its asset
/// configuration and fetcher; every call builds its own canvas and document.
pub struct Stamper<A> {
    config: AssetConfig,
    assets: A,
}

impl<A: AssetFetcher> Stamper<A> {
    pub fn new(assets: A) -> Stamper<A> {
        Stamper::with_config(AssetConfig::default(), assets)
    }

    pub fn with_config(config: AssetConfig, assets: A) -> Stamper<A> {
        Stamper { config, assets }
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    /// Fetch both font programs. Without them no text can be drawn, so a failure
    /// here aborts the composition.
    pub fn fonts(&self) -> Result<FontSet, StampError> {
        let fetch = |url: &str| {
            self.assets
                .fetch(url)
                .map_err(|source| StampError::FontUnavailable {
                    url: url.to_string(),
                    source,
                })
        };
        Ok(FontSet {
            regular: fetch(&self.config.regular_font_url)?,
            bold: fetch(&self.config.bold_font_url)?,
        })
    }

    fn fallback_emblem(&self) -> Option<Vec<u8>> {
        match self.assets.fetch(&self.config.emblem_url) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("fallback emblem unavailable, leaving it out: {e}");
                None
            }
        }
    }

    /// Stamp the receive number onto the first page of a document
    pub fn receive_stamp(
        &self,
        request: &ReceiveStampRequest,
    ) -> Result<ComposedDocument, StampError> {
        let source = SourcePdf::load(&request.source)?;
        let fonts = self.fonts()?;

        let mut canvas = Canvas::new(source.page_size(0)?);
        let faces = Fonts::embed(&mut canvas, &fonts)?;
        receive::draw(&mut canvas, faces, request);

        Ok(ComposedDocument::new(source.stamp(0, canvas.finish())?))
    }

    /// Stamp a director's command onto a document, a scanned page or a blank sheet
    pub fn director_stamp(
        &self,
        request: &DirectorStampRequest,
        options: &DirectorStampOptions,
        observer: &dyn StampObserver,
    ) -> Result<ComposedDocument, StampError> {
        let source = match &request.base {
            StampBase::Pdf(bytes) => Some(SourcePdf::load(bytes)?),
            StampBase::Image(_) | StampBase::BlankSheet => None,
        };

        observer.stage(StampStage::LoadingFonts);
        let fonts = self.fonts()?;

        let bytes = match source {
            Some(source) => {
                let page = source.clamp_page(options.target_page);
                log::debug!(
                    "director stamp on page {} of {}",
                    page + 1,
                    source.page_count()
                );
                let mut canvas = Canvas::new(source.page_size(page)?);
                let faces = Fonts::embed(&mut canvas, &fonts)?;
                director::draw(&mut canvas, faces, request, options, observer);
                source.stamp(page, canvas.finish())?
            }
            None => {
                let mut canvas = Canvas::new(A4);
                let faces = Fonts::embed(&mut canvas, &fonts)?;
                if let StampBase::Image(scan) = &request.base {
                    place_scan(&mut canvas, scan);
                }
                director::draw(&mut canvas, faces, request, options, observer);
                canvas.into_pdf(Info::new("คำสั่งผู้อำนวยการ"))?
            }
        };

        Ok(ComposedDocument::new(bytes))
    }

    /// Compose the official leave form for a request
    pub fn leave_form(&self, form: &LeaveFormRequest) -> Result<ComposedDocument, StampError> {
        let fonts = self.fonts()?;
        let emblem = match &form.emblem {
            Some(emblem) => Some(emblem.clone()),
            None => self.fallback_emblem(),
        };

        let mut canvas = Canvas::with_margins(A4, leave_form::margins());
        let faces = Fonts::embed(&mut canvas, &fonts)?;
        leave_form::draw(&mut canvas, faces, form, emblem.as_deref());

        let info = Info::new(format!(
            "{} {}",
            leave_form::title(form.request.leave_type),
            form.staff.name
        ))
        .author(&form.school_name);
        Ok(ComposedDocument::new(canvas.into_pdf(info)?))
    }
}

/// Margin kept around a scanned page placed on a fresh sheet
pub const SCAN_MARGIN: Pt = Pt(36.0);

/// Centre a scanned page on the canvas, fitted inside the margins. A scan that
/// cannot be decoded leaves the sheet blank.
fn place_scan(canvas: &mut Canvas, scan: &[u8]) -> Option<Rect> {
    let image = match canvas.embed_image_sniffed(scan) {
        Ok(image) => image,
        Err(e) => {
            log::warn!("scanned page could not be embedded, using a blank sheet: {e}");
            return None;
        }
    };
    let (width, height) = canvas.scale_to_fit(
        image,
        canvas.width() - SCAN_MARGIN * 2.0,
        canvas.height() - SCAN_MARGIN * 2.0,
    );
    let x = (canvas.width() - width) / 2.0;
    let y = (canvas.height() - height) / 2.0;
    canvas.draw_image(image, x, y, width, height);
    Some(Rect::from_origin(x, y, width, height))
}

/// Draw an optional image centred on `centre_x` with its bottom edge at `y`,
/// fitted into `max_width` × `max_height` and then scaled by `scale`. Payloads
/// that fail to decode are logged and skipped.
pub(crate) fn place_optional_image(
    canvas: &mut Canvas,
    bytes: Option<&[u8]>,
    what: &str,
    centre_x: Pt,
    y: Pt,
    (max_width, max_height): (Pt, Pt),
    scale: f32,
) -> Option<Rect> {
    let bytes = bytes.filter(|bytes| !bytes.is_empty())?;
    let image = match canvas.embed_image_sniffed(bytes) {
        Ok(image) => image,
        Err(e) => {
            log::warn!("{what} could not be embedded, leaving it out: {e}");
            return None;
        }
    };
    let (width, height) = canvas.scale_to_fit(image, max_width, max_height);
    let (width, height) = (width * scale, height * scale);
    let x = centre_x - width / 2.0;
    canvas.draw_image(image, x, y, width, height);
    Some(Rect::from_origin(x, y, width, height))
}
