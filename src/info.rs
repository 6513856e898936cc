use crate::refs::{Object, ObjectIds};
use chrono::{DateTime, Datelike, FixedOffset, Local, Timelike};
use pdf_writer::{Date as PDate, Pdf, TextStr};

/// Metadata written to the PDF info dictionary of a composed document
#[derive(Default, Debug, Clone)]
pub struct Info {
    /// Document title, e.g. the form title and the requester's name
    pub title: Option<String>,
    /// Usually the school that issued the document
    pub author: Option<String>,
    /// When the document was composed; defaults to the moment it is written
    pub created: Option<DateTime<FixedOffset>>,
}

impl Info {
    pub fn new<S: ToString>(title: S) -> Info {
        Info {
            title: Some(title.to_string()),
            ..Info::default()
        }
    }

    /// Set the author, modifying `self`
    pub fn author<S: ToString>(mut self, author: S) -> Self {
        self.author = Some(author.to_string());
        self
    }

    pub(crate) fn write(&self, refs: &mut ObjectIds, writer: &mut Pdf) {
        let id = refs.assign(Object::Info);
        let mut info = writer.document_info(id);

        if let Some(title) = &self.title {
            info.title(TextStr(title.as_str()));
        }
        if let Some(author) = &self.author {
            info.author(TextStr(author.as_str()));
        }
        info.creator(TextStr(concat!(
            env!("CARGO_PKG_NAME"),
            " v",
            env!("CARGO_PKG_VERSION")
        )));

        let created = self
            .created
            .unwrap_or_else(|| Local::now().fixed_offset());
        info.creation_date(pdf_date(&created));
    }
}

fn pdf_date(at: &DateTime<FixedOffset>) -> PDate {
    let offset_seconds = at.offset().local_minus_utc();
    let offset_hours = offset_seconds / 3600;
    let offset_minutes = (offset_seconds % 3600 / 60).abs();
    PDate::new(at.year() as u16)
        .month(at.month() as u8)
        .day(at.day() as u8)
        .hour(at.hour() as u8)
        .minute(at.minute() as u8)
        .second(at.second() as u8)
        .utc_offset_hour(offset_hours as i8)
        .utc_offset_minute(offset_minutes as u8)
}
