//! PDF outline entries for problems, written with `lopdf`.

use std::fmt;

use lopdf::{Dictionary, Document, Object, ObjectId};

/// One outline entry: a problem title and the 1-based page it starts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProblemBookmark {
    pub title: String,
    pub page: usize,
}

impl ProblemBookmark {
    /// Pairs titles with recorded start pages, skipping problems that were never placed.
    pub fn collect<'a>(
        titles: impl IntoIterator<Item = &'a str>,
        pages: &[Option<usize>],
    ) -> Vec<Self> {
        titles
            .into_iter()
            .zip(pages)
            .filter_map(|(title, page)| {
                page.map(|page| Self {
                    title: title.to_owned(),
                    page,
                })
            })
            .collect()
    }
}

/// Errors that can occur while embedding bookmarks into a rendered PDF document.
#[derive(Debug)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed or written by `lopdf`.
    Pdf(lopdf::Error),
    /// The trailer has no usable `/Root` catalog dictionary.
    MissingCatalog,
    /// A bookmark points past the last page of the document.
    MissingPage { title: String, page: usize },
}

impl From<lopdf::Error> for BookmarkError {
    fn from(err: lopdf::Error) -> Self {
        Self::Pdf(err)
    }
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf(_) => write!(f, "Failed to process PDF bytes"),
            Self::MissingCatalog => write!(f, "PDF catalog entry is missing or invalid"),
            Self::MissingPage { title, page } => {
                write!(f, "Bookmark '{title}' refers to missing page {page}")
            }
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pdf(err) => Some(err),
            Self::MissingCatalog | Self::MissingPage { .. } => None,
        }
    }
}

/// Adds a flat `/Outlines` tree with one `/Dest [page /Fit]` entry per bookmark.
///
/// Returns the input unchanged when there is nothing to add.
pub fn apply_problem_bookmarks(
    pdf_bytes: &[u8],
    bookmarks: &[ProblemBookmark],
) -> Result<Vec<u8>, BookmarkError> {
    if bookmarks.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();

    let targets = bookmarks
        .iter()
        .map(|bookmark| {
            u32::try_from(bookmark.page)
                .ok()
                .and_then(|page| pages.get(&page).copied())
                .ok_or_else(|| BookmarkError::MissingPage {
                    title: bookmark.title.clone(),
                    page: bookmark.page,
                })
        })
        .collect::<Result<Vec<ObjectId>, _>>()?;

    let outlines_id = document.new_object_id();
    let entry_ids: Vec<ObjectId> = bookmarks.iter().map(|_| document.new_object_id()).collect();

    for (index, (bookmark, page_ref)) in bookmarks.iter().zip(&targets).enumerate() {
        let mut entry = Dictionary::new();
        entry.set("Title", Object::string_literal(bookmark.title.as_str()));
        entry.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(*page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        entry.set("Parent", Object::Reference(outlines_id));
        if let Some(prev) = index.checked_sub(1).map(|prev| entry_ids[prev]) {
            entry.set("Prev", Object::Reference(prev));
        }
        if let Some(next) = entry_ids.get(index + 1) {
            entry.set("Next", Object::Reference(*next));
        }
        document
            .objects
            .insert(entry_ids[index], Object::Dictionary(entry));
    }

    let mut outlines = Dictionary::new();
    outlines.set("Type", Object::Name("Outlines".into()));
    outlines.set("Count", Object::Integer(entry_ids.len() as i64));
    outlines.set("First", Object::Reference(entry_ids[0]));
    outlines.set("Last", Object::Reference(entry_ids[entry_ids.len() - 1]));
    document
        .objects
        .insert(outlines_id, Object::Dictionary(outlines));

    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;
    document
        .objects
        .get_mut(&catalog_id)
        .and_then(|catalog| catalog.as_dict_mut().ok())
        .ok_or(BookmarkError::MissingCatalog)?
        .set("Outlines", Object::Reference(outlines_id));

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}
