//! Composes the official documents of a Thai school administration system:
//! the receive-number stamp, the director's command stamp and the leave form.
//!
//! Thai has no spaces between words, so text is wrapped character by character
//! (see [layout]) and placed at explicit coordinates on a [Canvas]. The canvas
//! writes PDF through [pdf_writer]; stamps on existing documents are merged in
//! with [lopdf] (see [SourcePdf]).
//!
//! ```no_run
//! use school_docs::{DirAssets, ReceiveStampRequest, Stamper};
//!
//! let stamper = Stamper::new(DirAssets::new("/srv/school/assets"));
//! let request = ReceiveStampRequest {
//!     source: std::fs::read("incoming.pdf")?,
//!     book_number: "123/2566".to_string(),
//!     date: "15 ก.ย. 2566".to_string(),
//!     time: "10:30 น.".to_string(),
//!     ..ReceiveStampRequest::default()
//! };
//! let stamped = stamper.receive_stamp(&request)?;
//! std::fs::write("incoming-received.pdf", stamped.into_bytes())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod assets;
pub use assets::*;

mod canvas;
pub use canvas::*;

pub mod codec;

mod colour;
pub use colour::*;

mod content;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod image;
pub use self::image::*;

mod info;
pub use info::*;

pub mod layout;

mod overlay;
pub use overlay::*;

mod page;
pub use page::*;

pub mod pagesize;

mod rect;
pub use rect::*;

mod records;
pub use records::*;

pub(crate) mod refs;

pub mod services;

pub mod stamp;
pub use stamp::{
    ComposedDocument, DirectorStampOptions, DirectorStampRequest, LeaveFormRequest,
    NoopObserver, ReceiveStampRequest, StampBase, StampObserver, StampStage, Stamper,
};

mod stats;
pub use stats::*;

mod units;
pub use units::*;

/// Re-export PDF-writer functionality, mostly for custom [pdf_writer::Content] generation
pub use pdf_writer;
