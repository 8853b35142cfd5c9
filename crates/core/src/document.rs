//! PDF object-level operations on lopdf documents: page extraction, merging,
//! structural rewriting and assembling raster pages into a PDF.

use crate::compression::FallbackRewriter;
use crate::error::{PdfToolError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Maximum page-tree depth followed when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// Parse a PDF from memory.
pub fn load(bytes: &[u8]) -> Result<Document> {
    Document::load_mem(bytes)
        .map_err(|e| PdfToolError::PdfError(format!("failed to load PDF: {}", e)))
}

/// Number of pages in a serialized PDF.
pub fn page_count(bytes: &[u8]) -> Result<usize> {
    Ok(load(bytes)?.get_pages().len())
}

/// Copy the pages at 0-based `indices` of `source` into a new document.
///
/// Indices must be in range.
pub fn extract_pages(source: &Document, indices: &[usize]) -> Result<Vec<u8>> {
    let pages: Vec<ObjectId> = source.get_pages().into_values().collect();
    let selected = indices
        .iter()
        .map(|&idx| {
            pages.get(idx).copied().ok_or_else(|| {
                PdfToolError::PdfError(format!(
                    "page index {} out of range (document has {} pages)",
                    idx,
                    pages.len()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut assembler = PageAssembler::new(&source.version);
    assembler.append_pages(source, &selected)?;
    assembler.finish(None)
}

/// Concatenate documents in order.
pub fn merge(documents: &[Document]) -> Result<Vec<u8>> {
    let version = documents
        .iter()
        .map(|d| d.version.as_str())
        .max()
        .unwrap_or("1.5");
    let mut assembler = PageAssembler::new(version);
    for document in documents {
        let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
        assembler.append_pages(document, &pages)?;
    }
    assembler.finish(None)
}

/// Build a PDF with one page per raster.
///
/// Each raster is embedded as a JPEG image XObject filling a page whose size
/// in points is `pixels * 72 / dpi`.
pub fn rasters_to_document(rasters: &[RgbImage], dpi: u32, jpeg_quality: u8) -> Result<Vec<u8>> {
    if rasters.is_empty() {
        return Err(PdfToolError::EmptyDocument);
    }
    if dpi == 0 {
        return Err(PdfToolError::InvalidParameter {
            name: "dpi".to_string(),
            message: "dpi must be greater than 0".to_string(),
        });
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(rasters.len());

    for (idx, raster) in rasters.iter().enumerate() {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, jpeg_quality.clamp(1, 100)).encode_image(raster)?;

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => raster.width() as i64,
                "Height" => raster.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        let width = raster.width() as f32 * 72.0 / dpi as f32;
        let height = raster.height() as f32 * 72.0 / dpi as f32;
        let content = format!("q\n{:.4} 0 0 {:.4} 0 0 cm\n/Im0 Do\nQ\n", width, height);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
        debug!(page = idx + 1, width, height, "Assembled raster page");
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    save(&mut doc)
}

fn save(doc: &mut Document) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| PdfToolError::PdfError(format!("failed to serialise PDF: {}", e)))?;
    Ok(output)
}

/// Fallback rewriter: copies every page into a fresh document and sets the
/// Producer metadata.
#[derive(Debug, Clone)]
pub struct LopdfRewriter {
    producer: String,
}

impl LopdfRewriter {
    pub fn new(producer: impl Into<String>) -> Self {
        Self {
            producer: producer.into(),
        }
    }
}

impl FallbackRewriter for LopdfRewriter {
    fn rewrite(&self, input: &[u8]) -> Result<Vec<u8>> {
        let source = load(input)?;
        let pages: Vec<ObjectId> = source.get_pages().into_values().collect();
        let mut assembler = PageAssembler::new(&source.version);
        assembler.append_pages(&source, &pages)?;
        assembler.finish(Some(&self.producer))
    }
}

/// Builds a new document out of pages copied from one or more sources.
struct PageAssembler {
    target: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PageAssembler {
    fn new(version: &str) -> Self {
        let mut target = Document::with_version(version);
        let pages_id = target.new_object_id();
        Self {
            target,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Append pages of `source` in the given order. Objects shared between
    /// pages of the same source are copied once.
    fn append_pages(&mut self, source: &Document, page_ids: &[ObjectId]) -> Result<()> {
        let mut copier = ObjectCopier {
            source,
            target: &mut self.target,
            copied: HashMap::new(),
            source_pages: source.get_pages().into_values().collect(),
        };
        for &page_id in page_ids {
            let new_id = copier.copy_page(page_id, self.pages_id)?;
            self.kids.push(Object::Reference(new_id));
        }
        Ok(())
    }

    fn finish(mut self, producer: Option<&str>) -> Result<Vec<u8>> {
        let count = self.kids.len() as i64;
        self.target.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.target.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.target.trailer.set("Root", catalog_id);

        if let Some(producer) = producer {
            let info_id = self.target.add_object(dictionary! {
                "Producer" => Object::string_literal(producer),
            });
            self.target.trailer.set("Info", info_id);
        }

        save(&mut self.target)
    }
}

/// Deep copy of objects from one source document with reference memoization.
struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    copied: HashMap<ObjectId, ObjectId>,
    source_pages: HashSet<ObjectId>,
}

impl ObjectCopier<'_> {
    fn copy_page(&mut self, page_id: ObjectId, parent: ObjectId) -> Result<ObjectId> {
        let page = self.source.get_dictionary(page_id).map_err(|e| {
            PdfToolError::PdfError(format!("cannot read page object {:?}: {}", page_id, e))
        })?;

        let new_id = self.target.new_object_id();
        // Back-references to this page (e.g. annotation /P) resolve to the first copy.
        self.copied.entry(page_id).or_insert(new_id);

        let mut dict = Dictionary::new();
        for (key, value) in page.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            dict.set(key.clone(), self.copy_object(value)?);
        }
        for &key in INHERITABLE {
            if dict.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(self.source, page, key) {
                let value = self.copy_object(&value)?;
                dict.set(key.to_vec(), value);
            }
        }
        dict.set("Parent", Object::Reference(parent));

        self.target.objects.insert(new_id, Object::Dictionary(dict));
        Ok(new_id)
    }

    fn copy_object(&mut self, object: &Object) -> Result<Object> {
        match object {
            Object::Reference(id) => self.copy_reference(*id),
            Object::Dictionary(dict) => Ok(Object::Dictionary(self.copy_dictionary(dict)?)),
            Object::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.copy_object(item)?);
                }
                Ok(Object::Array(out))
            }
            Object::Stream(stream) => {
                let dict = self.copy_dictionary(&stream.dict)?;
                Ok(Object::Stream(Stream::new(dict, stream.content.clone())))
            }
            other => Ok(other.clone()),
        }
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Result<Dictionary> {
        let mut out = Dictionary::new();
        for (key, value) in dict.iter() {
            // Page-tree and field-hierarchy parents are not carried over.
            if key.as_slice() == b"Parent" {
                continue;
            }
            out.set(key.clone(), self.copy_object(value)?);
        }
        Ok(out)
    }

    fn copy_reference(&mut self, id: ObjectId) -> Result<Object> {
        if let Some(&new_id) = self.copied.get(&id) {
            return Ok(Object::Reference(new_id));
        }
        // Links to pages outside the selection would drag those pages along.
        if self.source_pages.contains(&id) {
            return Ok(Object::Null);
        }
        let object = match self.source.get_object(id) {
            Ok(object) => object,
            Err(e) => {
                warn!(?id, %e, "Cannot resolve reference, using Null");
                return Ok(Object::Null);
            }
        };

        let new_id = self.target.new_object_id();
        self.copied.insert(id, new_id);
        let copy = self.copy_object(object)?;
        self.target.objects.insert(new_id, copy);
        Ok(Object::Reference(new_id))
    }
}

/// Look up `key` on the page or its ancestors.
fn inherited_attribute(source: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = source.get_dictionary(parent_id).ok()?;
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};

    /// A PDF with `pages` pages; page N draws the text "Page N". Resources
    /// and MediaBox live on the Pages node so pages inherit them.
    pub(crate) fn sample_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for n in 1..=pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(format!("Page {}", n))]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn page_texts(bytes: &[u8]) -> Vec<String> {
        let doc = load(bytes).unwrap();
        doc.get_pages()
            .into_values()
            .map(|id| {
                let content = doc.get_page_content(id).unwrap();
                String::from_utf8_lossy(&content).to_string()
            })
            .collect()
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(&sample_pdf(4)).unwrap(), 4);
    }

    #[test]
    fn test_load_rejects_garbage() {
        assert!(matches!(load(b"not a pdf"), Err(PdfToolError::PdfError(_))));
    }

    #[test]
    fn test_extract_pages_keeps_order_and_inherited_attributes() {
        let source = load(&sample_pdf(5)).unwrap();
        let out = extract_pages(&source, &[3, 1]).unwrap();

        let texts = page_texts(&out);
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("Page 4"));
        assert!(texts[1].contains("Page 2"));

        let doc = load(&out).unwrap();
        for id in doc.get_pages().into_values() {
            let page = doc.get_dictionary(id).unwrap();
            assert!(page.has(b"MediaBox"));
            assert!(page.has(b"Resources"));
        }
    }

    #[test]
    fn test_extract_pages_out_of_range() {
        let source = load(&sample_pdf(2)).unwrap();
        assert!(matches!(
            extract_pages(&source, &[2]),
            Err(PdfToolError::PdfError(_))
        ));
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let a = load(&sample_pdf(2)).unwrap();
        let b = load(&sample_pdf(3)).unwrap();
        let out = merge(&[a, b]).unwrap();
        let texts = page_texts(&out);
        assert_eq!(texts.len(), 5);
        assert!(texts[1].contains("Page 2"));
        assert!(texts[2].contains("Page 1"));
        assert!(texts[4].contains("Page 3"));
    }

    #[test]
    fn test_rewriter_sets_producer_and_keeps_pages() {
        let rewriter = LopdfRewriter::new("SimplePDF");
        let out = rewriter.rewrite(&sample_pdf(3)).unwrap();
        let doc = load(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 3);

        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        match info.get(b"Producer").unwrap() {
            Object::String(bytes, _) => assert_eq!(bytes.as_slice(), b"SimplePDF"),
            other => panic!("Unexpected producer object {:?}", other),
        }
    }

    #[test]
    fn test_rewriter_rejects_garbage() {
        let rewriter = LopdfRewriter::new("SimplePDF");
        assert!(rewriter.rewrite(b"%PDF-garbage").is_err());
    }

    #[test]
    fn test_rasters_to_document_page_size_from_dpi() {
        let rasters = vec![RgbImage::new(300, 150), RgbImage::new(100, 200)];
        let out = rasters_to_document(&rasters, 150, 90).unwrap();
        let doc = load(&out).unwrap();
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        assert_eq!(pages.len(), 2);

        let media_box = doc
            .get_dictionary(pages[0])
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!((width - 144.0).abs() < 0.01);
        assert!((height - 72.0).abs() < 0.01);
    }

    #[test]
    fn test_rasters_to_document_rejects_empty() {
        assert!(matches!(
            rasters_to_document(&[], 150, 95),
            Err(PdfToolError::EmptyDocument)
        ));
    }
}
