//! Assembles the final PDF: the rendered report page plus the static document
//!
//! The rendered workbook is converted with the same headless binary the
//! recalculation driver uses, then concatenated with a static cover/appendix
//! PDF. Page order is fixed: generated page first, static document second.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use lopdf::{Document, Object, ObjectId};

use crate::calc::Soffice;
use crate::error::{ConvertStep, IllustrationError};

/// Convert the rendered report to PDF and append the static document
///
/// A missing static document degrades the output to the generated page
/// alone, with a warning; it never fails the artifact.
pub fn assemble_pdf(
    soffice: &Soffice,
    excel_bytes: &[u8],
    static_pdf: &Path,
) -> Result<Vec<u8>, IllustrationError> {
    let dir = tempfile::Builder::new().prefix("illustration_pdf_").tempdir()?;
    let xlsx_path = dir.path().join("report.xlsx");
    fs::write(&xlsx_path, excel_bytes)?;

    let pdf_path = soffice.convert(ConvertStep::XlsxToPdf, &xlsx_path, dir.path())?;
    let generated = fs::read(&pdf_path)?;
    debug!("generated report page ({} bytes)", generated.len());

    if static_pdf.is_file() {
        merge_documents(&generated, static_pdf)
    } else {
        warn!(
            "static document {} not found; output will contain only the generated page",
            static_pdf.display()
        );
        Ok(generated)
    }
}

/// Concatenate the generated page with the static document, in that order
fn merge_documents(generated: &[u8], static_path: &Path) -> Result<Vec<u8>, IllustrationError> {
    let first = Document::load_mem(generated)
        .map_err(|e| IllustrationError::Pdf(format!("generated page: {}", e)))?;
    let second = Document::load(static_path)
        .map_err(|e| IllustrationError::Pdf(format!("{}: {}", static_path.display(), e)))?;

    let mut merged = merge(vec![first, second])?;
    let mut out = Vec::new();
    merged
        .save_to(&mut out)
        .map_err(|e| IllustrationError::Pdf(e.to_string()))?;
    Ok(out)
}

/// Standard lopdf page-tree merge: renumber, pool objects, rebuild the
/// Pages node and Catalog over every collected page
fn merge(documents: Vec<Document>) -> Result<Document, IllustrationError> {
    let mut max_id = 1;
    let mut pages: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_page_number, object_id) in doc.get_pages() {
            let object = doc
                .get_object(object_id)
                .map_err(|e| IllustrationError::Pdf(e.to_string()))?
                .to_owned();
            pages.insert(object_id, object);
        }
        objects.extend(doc.objects);
    }

    let mut document = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Object)> = None;
    let mut pages_root: Option<(ObjectId, Object)> = None;

    for (object_id, object) in objects.iter() {
        match object.type_name().unwrap_or("") {
            "Catalog" => {
                let id = catalog.as_ref().map(|(id, _)| *id).unwrap_or(*object_id);
                catalog = Some((id, object.clone()));
            }
            "Pages" => {
                if let Ok(dict) = object.as_dict() {
                    let mut dict = dict.clone();
                    if let Some((_, Object::Dictionary(ref old))) = pages_root {
                        dict.extend(old);
                    }
                    let id = pages_root.as_ref().map(|(id, _)| *id).unwrap_or(*object_id);
                    pages_root = Some((id, Object::Dictionary(dict)));
                }
            }
            // Page objects are re-inserted with their new parent below;
            // outline trees are dropped rather than stitched together
            "Page" | "Outlines" | "Outline" => {}
            _ => {
                document.objects.insert(*object_id, object.clone());
            }
        }
    }

    let (pages_id, pages_object) = pages_root
        .ok_or_else(|| IllustrationError::Pdf("no Pages node in source documents".to_string()))?;
    let (catalog_id, catalog_object) = catalog
        .ok_or_else(|| IllustrationError::Pdf("no Catalog in source documents".to_string()))?;

    for (object_id, object) in pages.iter() {
        if let Ok(dict) = object.as_dict() {
            let mut dict = dict.clone();
            dict.set("Parent", pages_id);
            document.objects.insert(*object_id, Object::Dictionary(dict));
        }
    }

    if let Ok(dict) = pages_object.as_dict() {
        let mut dict = dict.clone();
        dict.set("Count", pages.len() as u32);
        dict.set(
            "Kids",
            pages.keys().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        );
        document.objects.insert(pages_id, Object::Dictionary(dict));
    }

    if let Ok(dict) = catalog_object.as_dict() {
        let mut dict = dict.clone();
        dict.set("Pages", pages_id);
        dict.remove(b"Outlines");
        document.objects.insert(catalog_id, Object::Dictionary(dict));
    }

    document.trailer.set("Root", catalog_id);
    document.max_id = document.objects.len() as u32;
    document.renumber_objects();
    document.compress();
    Ok(document)
}

/// Minimal one-page document used by tests across the crate
#[cfg(test)]
pub(crate) fn tiny_pdf_bytes() -> Vec<u8> {
    tiny_pdf_bytes_with_width(612)
}

/// Same document with a caller-chosen MediaBox width, so merged pages
/// stay distinguishable by source
#[cfg(test)]
fn tiny_pdf_bytes_with_width(width: i64) -> Vec<u8> {
    use lopdf::content::Content;
    use lopdf::{dictionary, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content = Content { operations: vec![] };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), 792.into()],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}
