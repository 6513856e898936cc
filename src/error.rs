use crate::assets::AssetFetchError;
use thiserror::Error;

/// Errors that abort a composition. Everything else (bad image payloads, a
/// missing emblem) is recovered where it happens and only logged.
#[derive(Error, Debug)]
pub enum StampError {
    #[error("ไม่สามารถโหลดฟอนต์ที่จำเป็นได้ (cannot load required font from {url})")]
    /// A required font could not be fetched; no text can be drawn without it
    FontUnavailable {
        url: String,
        #[source]
        source: AssetFetchError,
    },

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// [lopdf] failed to load or save the source document
    Pdf(#[from] lopdf::Error),

    #[error(transparent)]
    /// An I/O error occurred while serializing
    Io(#[from] std::io::Error),

    #[error("page {0} does not exist in the document")]
    /// A page referenced by index is missing
    PageMissing(usize),

    #[error("the source document has no pages")]
    EmptyDocument,
}
