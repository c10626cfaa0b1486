// Image source resolution tests: geometry, raster files and PDF pages.

use image::{Rgba, RgbaImage};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::path::Path;
use textmark::source::{parse_geometry, ImageSource, SourceOptions};
use textmark::watermark::{Color, Typesetter};
use textmark::Error;

fn typesetter() -> Typesetter {
    Typesetter::embedded().unwrap()
}

/// Single-page PDF, `width` x `height` points, with a filled blue square
/// in the lower-left quarter.
fn write_pdf(path: &Path, width: i64, height: i64) {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let content = format!("0 0 1 rg 0 0 {} {} re f\n", width / 2, height / 2).into_bytes();
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
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
    doc.compress();
    doc.save(path).unwrap();
}

#[test]
fn test_geometry_rejects_zero_and_overflow() {
    for spec in ["0x100", "100x0", "4294967296x10"] {
        assert!(
            matches!(parse_geometry(spec), Err(Error::InvalidGeometry(ref g)) if g == spec),
            "{spec}"
        );
    }
}

#[test]
fn test_non_geometry_missing_path() {
    let err = ImageSource::open("abcxdef", &SourceOptions::default(), &typesetter()).unwrap_err();
    assert_eq!(err.to_string(), "invalid geometry: abcxdef");
}

#[test]
fn test_blank_canvas_background_option() {
    let options = SourceOptions {
        background: Some(Color::new(10, 20, 30)),
        ..SourceOptions::default()
    };
    let (_, canvas) = ImageSource::open("3x2", &options, &typesetter()).unwrap();
    assert!(canvas.to_rgba().pixels().all(|p| p.0 == [10, 20, 30, 255]));
}

#[test]
fn test_jpeg_source_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.jpg");
    let image = RgbaImage::from_pixel(16, 9, Rgba([200, 200, 200, 255]));
    image::DynamicImage::ImageRgba8(image)
        .to_rgb8()
        .save(&path)
        .unwrap();

    let (source, canvas) = ImageSource::open(
        path.to_str().unwrap(),
        &SourceOptions::default(),
        &typesetter(),
    )
    .unwrap();
    assert!(matches!(source, ImageSource::Raster(_)));
    assert_eq!((canvas.width(), canvas.height()), (16, 9));
}

#[test]
fn test_pdf_source_scaled_by_dpi_over_white() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.pdf");
    write_pdf(&path, 144, 72);

    let options = SourceOptions {
        pdf_dpi: 36,
        ..SourceOptions::default()
    };
    let (source, canvas) =
        ImageSource::open(path.to_str().unwrap(), &options, &typesetter()).unwrap();
    assert_eq!(
        source,
        ImageSource::Pdf {
            path: path.clone(),
            dpi: 36
        }
    );
    // 144 x 72 points at half scale
    assert_eq!((canvas.width(), canvas.height()), (72, 36));

    let image = canvas.to_rgba();
    assert_eq!(image.get_pixel(5, 30).0, [0, 0, 255, 255]);
    assert_eq!(image.get_pixel(60, 5).0, [255, 255, 255, 255]);
}

#[test]
fn test_pdf_source_default_dpi() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.pdf");
    write_pdf(&path, 36, 18);
    let (_, canvas) = ImageSource::open(
        path.to_str().unwrap(),
        &SourceOptions::default(),
        &typesetter(),
    )
    .unwrap();
    assert_eq!((canvas.width(), canvas.height()), (300, 150));
}

#[test]
fn test_unrecognized_file_reports_pdf_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.bin");
    std::fs::write(&path, [0u8, 1, 2, 3, 4, 5]).unwrap();
    let err = ImageSource::open(
        path.to_str().unwrap(),
        &SourceOptions::default(),
        &typesetter(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Pdf(_)));
}
