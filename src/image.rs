use crate::refs::{Object, ObjectIds};
use crate::units::Pt;
use image::{ColorType, DynamicImage, ImageFormat};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Pdf};
use thiserror::Error;

/// Why an image payload could not be embedded. Composers treat every variant as
/// recoverable and simply leave the image out.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("image payload is empty")]
    Empty,

    #[error("image payload is not a PNG or JPEG")]
    UnsupportedFormat,

    #[error(transparent)]
    Decode(#[from] image::ImageError),
}

/// Raster formats accepted for signatures, logos and scanned pages
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Detect the format from the magic bytes of the payload
    pub fn sniff(bytes: &[u8]) -> Option<ImageKind> {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => Some(ImageKind::Png),
            Ok(ImageFormat::Jpeg) => Some(ImageKind::Jpeg),
            _ => None,
        }
    }

    /// Map a data-URI mime type (`image/png`, `image/jpeg`) to a kind
    pub fn from_mime(mime: &str) -> Option<ImageKind> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageKind::Png),
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            _ => None,
        }
    }

    fn format(self) -> ImageFormat {
        match self {
            ImageKind::Png => ImageFormat::Png,
            ImageKind::Jpeg => ImageFormat::Jpeg,
        }
    }
}

pub enum RasterImage {
    /// Baseline RGB JPEGs are copied into the PDF untouched
    DirectlyEmbeddableJpeg(Vec<u8>),
    Image(DynamicImage),
}

/// A decoded raster image ready to be written as an image XObject
pub struct Image {
    pub image: RasterImage,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

struct EncodeOutput {
    filter: Filter,
    bytes: Vec<u8>,
    mask: Option<Vec<u8>>,
}

impl Image {
    /// Decode an image payload of the given kind. The payload is fully decoded
    /// here, so a corrupt image is rejected before anything is placed on a page.
    pub fn from_bytes(bytes: &[u8], kind: ImageKind) -> Result<Image, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        let image = image::load_from_memory_with_format(bytes, kind.format())?;

        match (kind, image.color()) {
            (ImageKind::Jpeg, ColorType::Rgb8) => {
                let width = image.width() as f32;
                let height = image.height() as f32;

                Ok(Image {
                    image: RasterImage::DirectlyEmbeddableJpeg(bytes.to_vec()),
                    width,
                    height,
                })
            }
            _ => Ok(Self::new_raster(image)),
        }
    }

    /// Decode an image whose kind is detected from its magic bytes
    pub fn sniffed(bytes: &[u8]) -> Result<Image, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        let kind = ImageKind::sniff(bytes).ok_or(ImageError::UnsupportedFormat)?;
        Self::from_bytes(bytes, kind)
    }

    pub fn new_raster(image: DynamicImage) -> Image {
        let width = image.width() as f32;
        let height = image.height() as f32;
        Image {
            image: RasterImage::Image(image),
            width,
            height,
        }
    }

    /// Largest size with the image's aspect ratio that fits inside `max_width` ×
    /// `max_height`. Small images are scaled up to fill the box.
    pub fn scale_to_fit(&self, max_width: Pt, max_height: Pt) -> (Pt, Pt) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return (Pt(0.0), Pt(0.0));
        }
        let scale = (*max_width / self.width).min(*max_height / self.height);
        (Pt(self.width * scale), Pt(self.height * scale))
    }

    fn encode_raster(&self) -> EncodeOutput {
        match &self.image {
            RasterImage::DirectlyEmbeddableJpeg(bytes) => EncodeOutput {
                filter: Filter::DctDecode,
                bytes: bytes.clone(),
                mask: None,
            },
            RasterImage::Image(image) => {
                let level = CompressionLevel::DefaultLevel as u8;

                let mask = image.color().has_alpha().then(|| {
                    let alphas: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
                    compress_to_vec_zlib(&alphas, level)
                });

                let bytes = compress_to_vec_zlib(image.to_rgb8().as_raw(), level);

                EncodeOutput {
                    filter: Filter::FlateDecode,
                    bytes,
                    mask,
                }
            }
        }
    }

    pub(crate) fn write(&self, refs: &mut ObjectIds, image_index: usize, writer: &mut Pdf) {
        let id = refs.assign(Object::Image(image_index));
        let encoded = self.encode_raster();

        let mask_id = encoded
            .mask
            .as_ref()
            .map(|_| refs.assign(Object::SoftMask(image_index)));

        let mut image = writer.image_xobject(id, encoded.bytes.as_slice());
        image.filter(encoded.filter);
        image.width(self.width as i32);
        image.height(self.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        // transparency (signatures are usually transparent PNGs)
        if let (Some(mask_id), Some(mask)) = (mask_id, encoded.mask.as_ref()) {
            let mut s_mask = writer.image_xobject(mask_id, mask.as_slice());
            s_mask.filter(Filter::FlateDecode);
            s_mask.width(self.width as i32);
            s_mask.height(self.height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(image::RgbaImage::new(width, height));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .expect("can encode png");
        bytes
    }

    #[test]
    fn decodes_png_and_sniffs_its_kind() {
        let bytes = png(40, 20);
        assert_eq!(ImageKind::sniff(&bytes), Some(ImageKind::Png));
        let image = Image::from_bytes(&bytes, ImageKind::Png).expect("valid png");
        assert_eq!((image.width, image.height), (40.0, 20.0));
    }

    #[test]
    fn rejects_bytes_that_are_not_images() {
        assert!(matches!(
            Image::sniffed(b"definitely not an image"),
            Err(ImageError::UnsupportedFormat)
        ));
        assert!(matches!(
            Image::from_bytes(b"definitely not an image", ImageKind::Png),
            Err(ImageError::Decode(_))
        ));
        assert!(matches!(Image::sniffed(&[]), Err(ImageError::Empty)));
    }

    #[test]
    fn scale_to_fit_preserves_aspect_ratio() {
        let image = Image::from_bytes(&png(200, 100), ImageKind::Png).unwrap();
        assert_eq!(image.scale_to_fit(Pt(100.0), Pt(100.0)), (Pt(100.0), Pt(50.0)));
        assert_eq!(image.scale_to_fit(Pt(400.0), Pt(50.0)), (Pt(100.0), Pt(50.0)));
        // small images grow to fill the box
        assert_eq!(image.scale_to_fit(Pt(400.0), Pt(400.0)), (Pt(400.0), Pt(200.0)));
    }

    #[test]
    fn mime_types_map_to_kinds() {
        assert_eq!(ImageKind::from_mime("image/jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_mime("IMAGE/PNG"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_mime("application/pdf"), None);
    }
}
