//! Vector extraction strategy
//!
//! Crops in document point space without resampling: the artifact is the
//! source page itself with its visible region restricted to the crop
//! rectangle. No pixel data is touched, so the crop dimensions are exact.
//!
//! PDF's native origin is bottom-left-up, while the deployment crop box is
//! measured top-left-down; the conversion uses the actual page height from
//! the page's MediaBox rather than assuming the reference 792.

use lopdf::{Document, Object, ObjectId};

use crate::error::{SheetError, SheetResult};
use crate::geometry::{Origin, Rect};

use super::VectorArtifact;

/// Maximum Parent hops when resolving an inherited MediaBox.
const MAX_TREE_DEPTH: usize = 16;

/// Parse `bytes` and restrict page 1 to `crop_box`.
///
/// `crop_box` is in document points, top-left-down (measurement space).
pub fn extract(bytes: &[u8], input: &str, crop_box: Rect) -> SheetResult<VectorArtifact> {
    debug_assert_eq!(crop_box.origin, Origin::TopLeftDown);

    let doc = Document::load_mem(bytes).map_err(|e| SheetError::Decode {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    let pages = doc.get_pages();
    let page_id = match pages.get(&1) {
        Some(id) => *id,
        None => return Err(SheetError::EmptyDocument(input.to_string())),
    };

    let media_box = resolve_media_box(&doc, page_id).ok_or_else(|| SheetError::Decode {
        input: input.to_string(),
        reason: "page 1 has no resolvable MediaBox".to_string(),
    })?;

    let page_height = media_box[3] - media_box[1];
    let crop = crop_box.with_origin(Origin::BottomLeftUp, page_height);

    tracing::debug!(
        input,
        page_height,
        crop_width = crop.width(),
        crop_height = crop.height(),
        "Restricted page 1 to crop region"
    );

    Ok(VectorArtifact { doc, page_id, crop })
}

/// Resolve a page's MediaBox, following Parent links for inherited values.
fn resolve_media_box(doc: &Document, page_id: ObjectId) -> Option<[f32; 4]> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(obj) = dict.get(b"MediaBox") {
            // MediaBox may itself be an indirect reference
            let resolved = match obj {
                Object::Reference(id) => doc.get_object(*id).ok()?,
                other => other,
            };
            let arr = resolved.as_array().ok()?;
            if arr.len() != 4 {
                return None;
            }
            let mut out = [0.0f32; 4];
            for (slot, value) in out.iter_mut().zip(arr.iter()) {
                *slot = extract_number(value)?;
            }
            return Some(out);
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => current = *parent_id,
            _ => return None,
        }
    }
    None
}

fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn single_page_pdf(width: i64, height: i64) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let content_id = doc.add_object(Stream::new(
            lopdf::Dictionary::new(),
            b"1 0 0 RG 60 500 90 200 re S".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => lopdf::Dictionary::new(),
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

    fn zero_page_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn reference_crop() -> Rect {
        Rect::new(Origin::TopLeftDown, 55.0, 52.0, 160.0, 339.0)
    }

    #[test]
    fn test_extract_carries_exact_crop_dimensions() {
        let bytes = single_page_pdf(612, 792);
        let artifact = extract(&bytes, "letter.pdf", reference_crop()).unwrap();
        // No rounding loss: exactly x1-x0 by y1-y0
        assert_eq!(artifact.crop.width(), 105.0);
        assert_eq!(artifact.crop.height(), 287.0);
        assert_eq!(artifact.crop.origin, Origin::BottomLeftUp);
        // Flipped against the 792pt page: y0 = 792 - 339
        assert_eq!(artifact.crop.y0, 453.0);
        assert_eq!(artifact.crop.y1, 740.0);
    }

    #[test]
    fn test_crop_conversion_uses_actual_page_height() {
        // A4 page: the flip must use 842, not the reference 792
        let bytes = single_page_pdf(595, 842);
        let artifact = extract(&bytes, "a4.pdf", reference_crop()).unwrap();
        assert_eq!(artifact.crop.y0, 503.0);
        assert_eq!(artifact.crop.y1, 790.0);
        assert_eq!(artifact.crop.height(), 287.0);
    }

    #[test]
    fn test_zero_page_document_is_empty() {
        let bytes = zero_page_pdf();
        let err = extract(&bytes, "empty.pdf", reference_crop()).unwrap_err();
        match err {
            SheetError::EmptyDocument(input) => assert_eq!(input, "empty.pdf"),
            other => panic!("expected EmptyDocument, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_bytes_fail_as_decode() {
        let err = extract(b"%PDF-garbage", "junk.pdf", reference_crop()).unwrap_err();
        match err {
            SheetError::Decode { input, .. } => assert_eq!(input, "junk.pdf"),
            other => panic!("expected Decode, got {:?}", other),
        }
    }
}
