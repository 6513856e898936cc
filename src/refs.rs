//! Object numbering for the documents written by [`crate::Document`].
//!
//! Every indirect object gets its number when it is written. Pages are
//! numbered up front so the page tree can list them, and a page looks up the
//! numbers of the fonts and images it draws when its resources are written.

use pdf_writer::Ref;
use std::collections::HashMap;

/// The indirect objects a composed document is made of
#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub enum Object {
    Catalog,
    Info,
    PageTree,
    Page(usize),
    PageContent(usize),
    /// Type0 font dictionary, the one page resources point at
    Font(usize),
    /// CIDFontType2 descendant of [`Object::Font`]
    CidFont(usize),
    /// CMap mapping glyph ids back to text, so Thai can be copied out
    ToUnicode(usize),
    FontDescriptor(usize),
    /// Embedded TrueType program
    FontFile(usize),
    Image(usize),
    /// Alpha channel of a PNG, written as a soft mask
    SoftMask(usize),
}

/// Numbers handed out so far, starting at 1
pub struct ObjectIds {
    assigned: HashMap<Object, Ref>,
    next: i32,
}

impl ObjectIds {
    pub fn new() -> ObjectIds {
        ObjectIds {
            assigned: HashMap::new(),
            next: 1,
        }
    }

    pub fn lookup(&self, object: Object) -> Option<Ref> {
        self.assigned.get(&object).copied()
    }

    /// Numbers `object`. Asking twice for the same object gives it a new
    /// number and forgets the old one.
    pub fn assign(&mut self, object: Object) -> Ref {
        let id = Ref::new(self.next);
        self.next += 1;
        self.assigned.insert(object, id);
        id
    }
}
