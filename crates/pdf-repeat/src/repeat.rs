use crate::{RepeatError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Build a document holding `copies` copies of page `page_number` (1-indexed).
///
/// Each copy is its own page object sharing the original content stream and
/// resources. Pages that are no longer referenced are pruned.
pub fn repeat_page(doc: &Document, page_number: u32, copies: usize) -> Result<Document> {
    if copies == 0 {
        return Err(RepeatError::Config(
            "Number of copies must be at least 1".to_string(),
        ));
    }

    let pages = doc.get_pages();
    let page_id = *pages.get(&page_number).ok_or(RepeatError::PageOutOfRange {
        page: page_number,
        total: pages.len(),
    })?;

    let mut output = doc.clone();
    let catalog_id = output.trailer.get(b"Root")?.as_reference()?;
    let pages_id = output
        .get_dictionary(catalog_id)?
        .get(b"Pages")?
        .as_reference()?;

    let mut template = resolved_page(&output, page_id)?;
    template.set("Parent", Object::Reference(pages_id));

    let kids: Vec<Object> = (0..copies)
        .map(|_| Object::Reference(output.add_object(template.clone())))
        .collect();

    let pages_dict = output.get_dictionary_mut(pages_id)?;
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", Object::Integer(copies as i64));
    for key in INHERITABLE {
        pages_dict.remove(key);
    }

    let pruned = output.prune_objects();
    log::debug!("Pruned {} unreferenced objects", pruned.len());
    output.renumber_objects();

    Ok(output)
}

/// Page dictionary with inherited attributes copied in from its ancestors.
fn resolved_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = doc.get_dictionary(page_id)?.clone();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    while let Some(parent_id) = parent {
        let node = doc.get_dictionary(parent_id)?;
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}
