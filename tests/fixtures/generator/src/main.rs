//! Test fixture generator for simplepdf.
//!
//! This binary generates test PDFs and images programmatically for use in
//! unit and integration tests and for manual runs against the toolkit.

use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// US Letter in points.
const LETTER: (i64, i64) = (612, 792);

/// A4 landscape in points.
const A4_LANDSCAPE: (i64, i64) = (842, 595);

fn main() -> Result<()> {
    let output_dir = Path::new("tests/fixtures/output");
    fs::create_dir_all(output_dir)?;

    println!("Generating test fixtures...\n");

    // Generate PDF files
    generate_simple_pdf(output_dir)?;
    generate_multipage_pdf(output_dir)?;
    generate_mixed_sizes_pdf(output_dir)?;
    generate_inherited_rotation_pdf(output_dir)?;

    // Generate image files
    generate_watermark_logo(output_dir)?;
    generate_photo_jpeg(output_dir)?;

    // Generate error test files
    generate_corrupt_pdf(output_dir)?;
    generate_empty_pdf(output_dir)?;

    println!("\nAll fixtures generated successfully!");
    Ok(())
}

/// Incrementally built PDF with one shared Helvetica font.
struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfBuilder {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        Self {
            doc,
            pages_id,
            font_id,
            kids: Vec::new(),
        }
    }

    /// Add a page showing `lines` of text from the top-left corner.
    fn page(&mut self, size: (i64, i64), lines: &[String]) -> Result<()> {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 18.into()]),
            Operation::new("TL", vec![24.into()]),
            Operation::new("Td", vec![72.into(), (size.1 - 96).into()]),
        ];
        for line in lines {
            operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));
        // Frame around the page so renders show the page bounds.
        operations.extend([
            Operation::new("RG", vec![0.2_f32.into(), 0.2_f32.into(), 0.8_f32.into()]),
            Operation::new("w", vec![4.into()]),
            Operation::new(
                "re",
                vec![20.into(), 20.into(), (size.0 - 40).into(), (size.1 - 40).into()],
            ),
            Operation::new("S", vec![]),
        ]);

        let content = Content { operations }
            .encode()
            .context("encoding page content")?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => self.font_id } },
            "MediaBox" => vec![0.into(), 0.into(), size.0.into(), size.1.into()],
        });
        self.kids.push(Object::Reference(page_id));
        Ok(())
    }

    /// Write the document. `rotate` is set on the page tree root for all pages to inherit.
    fn save(mut self, path: &Path, rotate: Option<i64>) -> Result<()> {
        let mut pages = dictionary! {
            "Type" => "Pages",
            "Count" => self.kids.len() as i64,
            "Kids" => self.kids,
        };
        if let Some(rotate) = rotate {
            pages.set("Rotate", rotate);
        }
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// Generate a single-page PDF.
fn generate_simple_pdf(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("simple.pdf");
    println!("  Creating: {}", path.display());

    let mut pdf = PdfBuilder::new();
    pdf.page(
        LETTER,
        &[
            "Hello, World! This is a simple test document.".to_string(),
            "It contains two lines of plain text.".to_string(),
        ],
    )?;
    pdf.save(&path, None)
}

/// Generate a 12-page PDF for split selectors.
fn generate_multipage_pdf(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("multipage.pdf");
    println!("  Creating: {}", path.display());

    let mut pdf = PdfBuilder::new();
    for n in 1..=12 {
        pdf.page(
            LETTER,
            &[
                format!("Page {}", n),
                format!("This is page {} of the multi-page test document.", n),
            ],
        )?;
    }
    pdf.save(&path, None)
}

/// Generate a PDF alternating portrait Letter and landscape A4 pages.
fn generate_mixed_sizes_pdf(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("mixed_sizes.pdf");
    println!("  Creating: {}", path.display());

    let mut pdf = PdfBuilder::new();
    for n in 1..=4 {
        let (size, name) = if n % 2 == 1 {
            (LETTER, "Letter portrait")
        } else {
            (A4_LANDSCAPE, "A4 landscape")
        };
        pdf.page(size, &[format!("Page {}: {}", n, name)])?;
    }
    pdf.save(&path, None)
}

/// Generate a PDF whose pages inherit Rotate from the page tree root.
fn generate_inherited_rotation_pdf(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("inherited.pdf");
    println!("  Creating: {}", path.display());

    let mut pdf = PdfBuilder::new();
    for n in 1..=3 {
        pdf.page(LETTER, &[format!("Rotated page {}", n)])?;
    }
    pdf.save(&path, Some(90))
}

/// Generate a semi-transparent logo for image watermarks.
fn generate_watermark_logo(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("watermark_logo.png");
    println!("  Creating: {}", path.display());

    let (width, height) = (400u32, 200u32);
    let logo = RgbaImage::from_fn(width, height, |x, y| {
        // Filled ellipse, transparent outside.
        let dx = (x as f32 - width as f32 / 2.0) / (width as f32 / 2.0);
        let dy = (y as f32 - height as f32 / 2.0) / (height as f32 / 2.0);
        if dx * dx + dy * dy <= 1.0 {
            Rgba([200, 30, 30, 220])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    logo.save_with_format(&path, ImageFormat::Png)?;
    Ok(())
}

/// Generate an opaque gradient JPEG for images-to-PDF.
fn generate_photo_jpeg(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("photo.jpg");
    println!("  Creating: {}", path.display());

    let photo = RgbImage::from_fn(640, 480, |x, y| {
        Rgb([(x * 255 / 640) as u8, (y * 255 / 480) as u8, 128])
    });
    photo.save_with_format(&path, ImageFormat::Jpeg)?;
    Ok(())
}

/// Generate a file with a PDF name but garbage content.
fn generate_corrupt_pdf(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("corrupt.pdf");
    println!("  Creating: {}", path.display());

    // Write invalid data (header only, no objects or xref)
    let mut file = File::create(&path)?;
    file.write_all(b"%PDF-1.4\nThis is not a valid PDF file. It's just garbage data.")?;
    Ok(())
}

/// Generate a structurally valid PDF with zero pages.
fn generate_empty_pdf(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("empty.pdf");
    println!("  Creating: {}", path.display());

    PdfBuilder::new().save(&path, None)
}
