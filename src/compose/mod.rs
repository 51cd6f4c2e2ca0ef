//! Output sheet composition
//!
//! Builds the single-page output PDF from cropped artifacts and their
//! planned placements. The two strategies differ only in how an artifact
//! becomes a drawable resource (image XObject vs. form XObject); the page
//! tree scaffolding and the placement operators are shared here.
//!
//! Placements arrive in input order and are drawn in that order. With a
//! correct planner they never intersect, so draw order is not visible; it is
//! still deterministic.

pub mod raster;
pub mod vector;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::SheetResult;
use crate::layout::CanvasSpec;

/// Start an output document and reserve the page-tree root id.
fn new_output_document() -> (Document, ObjectId) {
    let mut output = Document::with_version("1.7");
    let pages_id = output.new_object_id();
    (output, pages_id)
}

/// Assemble the single output page, page tree and catalog, then serialize.
fn finalize_single_page(
    mut output: Document,
    pages_id: ObjectId,
    canvas: &CanvasSpec,
    content_ops: Vec<String>,
    xobjects: Dictionary,
) -> SheetResult<Vec<u8>> {
    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(canvas.width),
            Object::Real(canvas.height),
        ]),
    );
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));
    let page_id = output.add_object(page_dict);

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
    ]);
    output.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    output.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn number(obj: &Object) -> f32 {
        match obj {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r,
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn test_finalized_document_has_one_page_of_canvas_size() {
        let canvas = CanvasSpec {
            width: 612.0,
            height: 792.0,
            cols: 5,
            rows: 2,
            margin_left: 55.0,
            margin_right: 55.0,
            margin_top: 52.0,
            margin_bottom: 52.0,
        };
        let (output, pages_id) = new_output_document();
        let bytes =
            finalize_single_page(output, pages_id, &canvas, vec![], Dictionary::new()).unwrap();

        let reloaded = Document::load_mem(&bytes).unwrap();
        let pages = reloaded.get_pages();
        assert_eq!(pages.len(), 1);

        let page_dict = reloaded.get_dictionary(*pages.get(&1).unwrap()).unwrap();
        let media_box = page_dict.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(number(&media_box[2]), 612.0);
        assert_eq!(number(&media_box[3]), 792.0);
    }
}
