//! Vector composition
//!
//! Each cropped source page becomes a Form XObject whose BBox is the crop
//! rectangle, so only the illustration region is visible. Placement is
//! translate-only: the crop origin is moved onto the placement origin with
//!
//! ```text
//! q 1 0 0 1 <tx - x0> <ty - y0> cm /PgN Do Q
//! ```
//!
//! No scaling and no resampling happen on this path; scaling would require
//! rasterization, which is what the raster strategy is for.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{SheetError, SheetResult};
use crate::extract::VectorArtifact;
use crate::geometry::Rect;
use crate::layout::CanvasSpec;

use super::{finalize_single_page, new_output_document};

/// Compose the output sheet from vector artifacts and their placements.
///
/// `items` is already truncated to grid capacity and ordered by input.
pub fn compose(canvas: &CanvasSpec, items: &[(VectorArtifact, Rect)]) -> SheetResult<Vec<u8>> {
    let (mut output, pages_id) = new_output_document();

    let mut content_ops = Vec::with_capacity(items.len());
    let mut xobjects = Dictionary::new();

    for (idx, (artifact, placement)) in items.iter().enumerate() {
        let xobject_id = page_xobject(&mut output, artifact)?;
        let name = format!("Pg{}", idx);
        xobjects.set(name.as_bytes(), Object::Reference(xobject_id));

        // Land the crop origin exactly on the placement origin
        let tx = placement.x0 - artifact.crop.x0;
        let ty = placement.y0 - artifact.crop.y0;

        tracing::debug!(
            index = idx,
            tx,
            ty,
            crop_width = artifact.crop.width(),
            crop_height = artifact.crop.height(),
            "Merged vector artifact"
        );

        content_ops.push(format!("q 1 0 0 1 {} {} cm /{} Do Q\n", tx, ty, name));
    }

    finalize_single_page(output, pages_id, canvas, content_ops, xobjects)
}

/// Turn the artifact's page into a Form XObject clipped to its crop.
///
/// The page's content streams are concatenated into the XObject body and its
/// resource dictionary is deep-copied into the output document. The BBox is
/// the crop rectangle, which is what restricts the visible region.
fn page_xobject(output: &mut Document, artifact: &VectorArtifact) -> SheetResult<ObjectId> {
    let source = &artifact.doc;
    let page_dict = source.get_dictionary(artifact.page_id).map_err(|e| {
        SheetError::Compose(format!("source page dictionary unavailable: {}", e))
    })?;

    let content = page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Real(artifact.crop.x0),
            Object::Real(artifact.crop.y0),
            Object::Real(artifact.crop.x1),
            Object::Real(artifact.crop.y1),
        ]),
    );

    if let Ok(resources) = page_dict.get(b"Resources") {
        let mut cache = HashMap::new();
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, resources, &mut cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content)))
}

/// Concatenated content-stream data of a page.
fn page_content(doc: &Document, page_dict: &Dictionary) -> SheetResult<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(obj) => obj,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(id) => Ok(stream_data(doc, *id)),
        Object::Array(arr) => {
            let mut result = Vec::new();
            for obj in arr {
                if let Object::Reference(id) = obj {
                    result.extend_from_slice(&stream_data(doc, *id));
                    result.push(b'\n');
                }
            }
            Ok(result)
        }
        _ => Ok(Vec::new()),
    }
}

fn stream_data(doc: &Document, id: ObjectId) -> Vec<u8> {
    let Ok(obj) = doc.get_object(id) else {
        return Vec::new();
    };
    let Ok(stream) = obj.as_stream() else {
        return Vec::new();
    };
    // Fall back to raw content for streams without a recognized filter
    match stream.decompressed_content() {
        Ok(content) => content,
        Err(_) => stream.content.clone(),
    }
}

/// Deep-copy an object graph from `source` into `output`, rewriting
/// references. The cache keeps shared resources (fonts, images) from being
/// duplicated once per reference.
fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> SheetResult<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }
            let referenced = source
                .get_object(*id)
                .map_err(|e| SheetError::Compose(format!("dangling reference {:?}: {}", id, e)))?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            let new_id = output.add_object(copied);
            cache.insert(*id, new_id);
            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(arr) => {
            let mut new_arr = Vec::with_capacity(arr.len());
            for item in arr {
                new_arr.push(copy_object_deep(output, source, item, cache)?);
            }
            Ok(Object::Array(new_arr))
        }
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Stream(Stream::new(new_dict, stream.content.clone())))
        }
        _ => Ok(obj.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract;
    use crate::geometry::Origin;
    use lopdf::dictionary;

    fn reference_spec() -> CanvasSpec {
        CanvasSpec {
            width: 612.0,
            height: 792.0,
            cols: 5,
            rows: 2,
            margin_left: 55.0,
            margin_right: 55.0,
            margin_top: 52.0,
            margin_bottom: 52.0,
        }
    }

    fn single_page_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"0 0 1 rg 60 470 95 260 re f".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => Dictionary::new(),
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn extracted(input: &str) -> VectorArtifact {
        let crop = Rect::new(Origin::TopLeftDown, 55.0, 52.0, 160.0, 339.0);
        extract::vector::extract(&single_page_pdf(), input, crop).unwrap()
    }

    #[test]
    fn test_compose_merges_clipped_form_xobjects() {
        let canvas = reference_spec();
        let items: Vec<(VectorArtifact, Rect)> = (0..2)
            .map(|idx| {
                let artifact = extracted(&format!("doc{}.pdf", idx));
                let cell = canvas.cell_rect(idx).unwrap();
                let placement = crate::layout::center_only(
                    cell,
                    artifact.crop.width(),
                    artifact.crop.height(),
                );
                (artifact, placement)
            })
            .collect();

        let bytes = compose(&canvas, &items).unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();

        let pages = reloaded.get_pages();
        assert_eq!(pages.len(), 1);

        let page_dict = reloaded.get_dictionary(*pages.get(&1).unwrap()).unwrap();
        let resources = page_dict.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert_eq!(xobjects.len(), 2);

        // The form's BBox is the crop rectangle in the source's own space
        let pg0 = xobjects.get(b"Pg0").unwrap().as_reference().unwrap();
        let stream = reloaded.get_object(pg0).unwrap().as_stream().unwrap();
        let bbox = stream.dict.get(b"BBox").unwrap().as_array().unwrap();
        let number = crate::compose::tests::number;
        assert_eq!(number(&bbox[0]), 55.0);
        assert_eq!(number(&bbox[1]), 453.0);
        assert_eq!(number(&bbox[2]), 160.0);
        assert_eq!(number(&bbox[3]), 740.0);
    }

    #[test]
    fn test_placement_is_translate_only() {
        let canvas = reference_spec();
        let artifact = extracted("doc.pdf");
        let cell = canvas.cell_rect(0).unwrap();
        let placement =
            crate::layout::center_only(cell, artifact.crop.width(), artifact.crop.height());
        let expected_tx = placement.x0 - artifact.crop.x0;
        let expected_ty = placement.y0 - artifact.crop.y0;

        let bytes = compose(&canvas, &[(artifact, placement)]).unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        let pages = reloaded.get_pages();
        let content = reloaded.get_page_content(*pages.get(&1).unwrap()).unwrap();
        let content = String::from_utf8_lossy(&content);

        // Identity scale, translation components only
        let expected = format!("q 1 0 0 1 {} {} cm /Pg0 Do Q", expected_tx, expected_ty);
        assert!(
            content.contains(&expected),
            "content stream {:?} missing {:?}",
            content,
            expected
        );
    }
}
