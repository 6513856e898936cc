//! Payload and date helpers shared by every composer.
//!
//! Binary payloads travel as `data:<mime>;base64,<payload>` strings (or as bare
//! base64); dates are printed in the long Thai form with the Buddhist-era year,
//! e.g. `15 กันยายน 2566`.

use crate::image::ImageKind;
use crate::stamp::StampBase;
use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Offset between the Gregorian and the Buddhist-era year
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

const THAI_MONTHS: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("payload is empty")]
    Empty,

    #[error("data URI is missing the `,` separator")]
    MissingSeparator,

    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
}

/// A decoded payload together with the mime type it was labelled with, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Strictly parse a data URI or a bare base64 string.
pub fn parse_data_uri(input: &str) -> Result<Payload, DecodeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DecodeError::Empty);
    }

    let (mime, encoded) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest.split_once(',').ok_or(DecodeError::MissingSeparator)?;
            let mime = header
                .split(';')
                .next()
                .filter(|mime| !mime.is_empty())
                .map(str::to_ascii_lowercase);
            (mime, data)
        }
        None => (None, input),
    };

    // payloads copied out of JSON or e-mail are often line-wrapped
    let cleaned: String = encoded.chars().filter(|ch| !ch.is_whitespace()).collect();
    let bytes = BASE64_STD.decode(cleaned.as_bytes())?;

    Ok(Payload { mime, bytes })
}

/// Decode a data URI (or bare base64) into raw bytes. Malformed input is logged and
/// yields an empty buffer instead of an error.
pub fn decode_data_uri(input: &str) -> Vec<u8> {
    match parse_data_uri(input) {
        Ok(payload) => payload.bytes,
        Err(e) => {
            log::warn!("could not decode data URI payload: {e}");
            Vec::new()
        }
    }
}

/// Decide what a stamp is drawn on from a data URI. `application/pdf` payloads
/// are documents and PNG or JPEG payloads scanned pages; anything else is
/// recognised by its magic bytes. Empty or undecodable input means a blank
/// sheet.
pub fn base_from_data_uri(input: &str) -> StampBase {
    if input.trim().is_empty() {
        return StampBase::BlankSheet;
    }
    let payload = match parse_data_uri(input) {
        Ok(payload) if !payload.bytes.is_empty() => payload,
        Ok(_) => return StampBase::BlankSheet,
        Err(e) => {
            log::warn!("could not decode stamp base, using a blank sheet: {e}");
            return StampBase::BlankSheet;
        }
    };

    match payload.mime.as_deref() {
        Some("application/pdf") => StampBase::Pdf(payload.bytes),
        Some(mime) if ImageKind::from_mime(mime).is_some() => {
            StampBase::Image(payload.bytes)
        }
        _ if payload.bytes.starts_with(b"%PDF") => StampBase::Pdf(payload.bytes),
        _ if ImageKind::sniff(&payload.bytes).is_some() => StampBase::Image(payload.bytes),
        _ => {
            log::warn!("stamp base is neither a PDF nor an image, using a blank sheet");
            StampBase::BlankSheet
        }
    }
}

/// Wrap bytes into a `data:<mime>;base64,` URI
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64_STD.encode(bytes))
}

/// Buddhist-era year of a date
pub fn buddhist_year(date: NaiveDate) -> i32 {
    date.year() + BUDDHIST_ERA_OFFSET
}

/// Thai month name, `month` in 1..=12
pub fn thai_month(month: u32) -> &'static str {
    THAI_MONTHS[(month.clamp(1, 12) - 1) as usize]
}

/// Long Thai date: `15 กันยายน 2566`
pub fn thai_long_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        thai_month(date.month()),
        buddhist_year(date)
    )
}
