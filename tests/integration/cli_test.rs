// End-to-end tests of the textmark binary

use super::test_harness::{decode, stderr_of, CliHarness};
use image::ImageFormat;

#[test]
fn test_default_line_on_blank_canvas() {
    let h = CliHarness::new();
    let out = h.run(&["-o", "out.png", "300x100"], "HELLO\n");
    assert!(out.status.success(), "{}", stderr_of(&out));

    let image = decode(&h.path("out.png"));
    assert_eq!(image.dimensions(), (300, 100));
    assert!(image.pixels().any(|p| p[3] > 0));
}

#[test]
fn test_png_to_stdout_by_default() {
    let h = CliHarness::new();
    let out = h.run(&["200x50"], "24:WORLD\n");
    assert!(out.status.success(), "{}", stderr_of(&out));
    assert_eq!(image::guess_format(&out.stdout).unwrap(), ImageFormat::Png);
    let image = image::load_from_memory(&out.stdout).unwrap();
    assert_eq!((image.width(), image.height()), (200, 50));
}

#[test]
fn test_fit_percent_width_end_to_end() {
    let h = CliHarness::new();
    let out = h.run_with_input(&["-o", "fit.png", "200x100"], "w50%:BIG\n");
    assert!(out.status.success(), "{}", stderr_of(&out));

    let image = decode(&h.path("fit.png"));
    let xs: Vec<u32> = image
        .enumerate_pixels()
        .filter(|(_, _, p)| p[3] > 0)
        .map(|(x, _, _)| x)
        .collect();
    let width = i64::from(xs.iter().max().unwrap() - xs.iter().min().unwrap() + 1);
    assert!((width - 100).abs() <= 2, "ink width {width}");
}

#[test]
fn test_invalid_directive_aborts_without_output() {
    let h = CliHarness::new();
    let out = h.run(&["-o", "never.png", "300x100"], "fine\nxyz:oops\n");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr_of(&out).contains("invalid format: xyz"));
    assert!(!h.path("never.png").exists());
}

#[test]
fn test_invalid_directive_on_empty_line_aborts() {
    let h = CliHarness::new();
    let out = h.run(&["-o", "never.png", "300x100"], "HELLO\nxyz:\n");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr_of(&out).contains("invalid format: xyz"));
    assert!(!h.path("never.png").exists());
}

#[test]
fn test_bad_geometry_fails() {
    let h = CliHarness::new();
    for spec in ["0x100", "abcxdef"] {
        let out = h.run(&["-o", "bad.png", spec], "HELLO\n");
        assert_eq!(out.status.code(), Some(1), "{spec}");
        assert!(stderr_of(&out).contains("invalid geometry"), "{spec}");
        assert!(!h.path("bad.png").exists());
    }
}

#[test]
fn test_portrait_orientation_threshold() {
    let h = CliHarness::new();
    let out = h.run(&["-O", "portrait", "-o", "wide.png", "120x100"], "X\n");
    assert!(out.status.success(), "{}", stderr_of(&out));
    assert_eq!(decode(&h.path("wide.png")).dimensions(), (100, 120));

    let out = h.run(&["-O", "portrait", "-o", "square.png", "100x100"], "X\n");
    assert!(out.status.success(), "{}", stderr_of(&out));
    assert_eq!(decode(&h.path("square.png")).dimensions(), (100, 100));
}

#[test]
fn test_zero_rotation_matches_none() {
    let h = CliHarness::new();
    let lines = "30:SAME\nsecond\n";
    assert!(h.run(&["-r", "none", "-o", "none.png", "240x120"], lines).status.success());
    assert!(h.run(&["-r", "0", "-o", "zero.png", "240x120"], lines).status.success());
    assert_eq!(decode(&h.path("none.png")), decode(&h.path("zero.png")));
}

#[test]
fn test_negative_degrees_accepted() {
    let h = CliHarness::new();
    let out = h.run(&["-r", "-30", "-o", "tilt.png", "200x200"], "TILT\n");
    assert!(out.status.success(), "{}", stderr_of(&out));
}

#[test]
fn test_output_is_deterministic() {
    let h = CliHarness::new();
    let lines = "w80%:DRAFT\n18:internal use only\n";
    h.run(&["-r", "ldiag", "-o", "a.png", "400x300"], lines);
    h.run(&["-r", "ldiag", "-o", "b.png", "400x300"], lines);
    assert_eq!(
        std::fs::read(h.path("a.png")).unwrap(),
        std::fs::read(h.path("b.png")).unwrap()
    );
}

#[test]
fn test_no_lines_succeeds_without_output() {
    let h = CliHarness::new();
    let out = h.run(&["-o", "empty.png", "100x100"], "# nothing here\n\n");
    assert!(out.status.success(), "{}", stderr_of(&out));
    assert!(!h.path("empty.png").exists());
}

#[test]
fn test_unknown_rotation_warns() {
    let h = CliHarness::new();
    let out = h.run(&["-r", "sideways", "-o", "w.png", "100x100"], "X\n");
    assert!(out.status.success());
    assert!(stderr_of(&out).contains("unknown rotation"));
}

#[test]
fn test_quiet_suppresses_errors() {
    let h = CliHarness::new();
    let out = h.run(&["-q", "0x0"], "X\n");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr_of(&out).is_empty());
}

#[test]
fn test_log_file_destination() {
    let h = CliHarness::new();
    let out = h.run(&["-v", "-l", "run.log", "-o", "o.png", "100x100"], "X\n");
    assert!(out.status.success());
    let log = std::fs::read_to_string(h.path("run.log")).unwrap();
    assert!(log.contains("watermark rendered"));
}

#[test]
fn test_format_flag_selects_encoder() {
    let h = CliHarness::new();
    for (name, format) in [
        ("jpeg", ImageFormat::Jpeg),
        ("bmp", ImageFormat::Bmp),
        ("tiff", ImageFormat::Tiff),
        ("webp", ImageFormat::WebP),
    ] {
        let out = h.run(&["-f", name, "120x40"], "MARK\n");
        assert!(out.status.success(), "{name}: {}", stderr_of(&out));
        assert_eq!(image::guess_format(&out.stdout).unwrap(), format, "{name}");
    }
}

#[test]
fn test_unknown_format_is_usage_error() {
    let h = CliHarness::new();
    let out = h.run(&["-f", "gif", "-o", "x.gif", "10x10"], "X\n");
    assert_eq!(out.status.code(), Some(1));
    assert!(!h.path("x.gif").exists());
}

#[test]
fn test_config_file_defaults_and_cli_override() {
    let h = CliHarness::new();
    h.write("textmark.yaml", "color: \"#ff0000\"\nformat: bmp\n");

    let out = h.run(&["-c", "textmark.yaml", "-o", "red.bmp", "100x60"], "40:R\n");
    assert!(out.status.success(), "{}", stderr_of(&out));
    assert_eq!(
        image::guess_format(&std::fs::read(h.path("red.bmp")).unwrap()).unwrap(),
        ImageFormat::Bmp
    );
    let red = decode(&h.path("red.bmp"));
    assert!(red.pixels().any(|p| p.0 == [255, 0, 0, 255]));

    let out = h.run(
        &["-c", "textmark.yaml", "--color", "#0000ff", "-f", "png", "-o", "blue.png", "100x60"],
        "40:B\n",
    );
    assert!(out.status.success(), "{}", stderr_of(&out));
    let blue = decode(&h.path("blue.png"));
    assert!(blue.pixels().any(|p| p.0 == [0, 0, 255, 255]));
    assert!(!blue.pixels().any(|p| p.0 == [255, 0, 0, 255]));
}

#[test]
fn test_invalid_config_fails() {
    let h = CliHarness::new();
    h.write("bad.yaml", "pdf_dpi: 0\n");
    let out = h.run(&["-c", "bad.yaml", "10x10"], "X\n");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr_of(&out).contains("pdf_dpi"));
}

#[test]
fn test_raster_source_keeps_pixels_outside_text() {
    let h = CliHarness::new();
    let background = image::RgbaImage::from_pixel(80, 40, image::Rgba([0, 128, 0, 255]));
    background.save(h.path("bg.png")).unwrap();

    let out = h.run(&["-o", "marked.png", "bg.png"], "10:x\n");
    assert!(out.status.success(), "{}", stderr_of(&out));
    let image = decode(&h.path("marked.png"));
    assert_eq!(image.dimensions(), (80, 40));
    assert_eq!(image.get_pixel(0, 0).0, [0, 128, 0, 255]);
}

#[test]
fn test_missing_input_file_fails() {
    let h = CliHarness::new();
    let out = h.run(&["-o", "x.png", "10x10", "no-such-lines.txt"], "");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr_of(&out).contains("no-such-lines.txt"));
}

#[test]
fn test_help_and_version_exit_zero() {
    let h = CliHarness::new();
    let help = h.run(&["--help"], "");
    assert!(help.status.success());
    assert!(String::from_utf8_lossy(&help.stdout).contains("--orientation"));

    let version = h.run(&["-V"], "");
    assert!(version.status.success());
    assert!(String::from_utf8_lossy(&version.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_source_is_usage_error() {
    let h = CliHarness::new();
    let out = h.run(&[], "");
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn test_pdf_source_rasterized_at_dpi() {
    use lopdf::{dictionary, Dictionary, Document, Object, Stream};

    let h = CliHarness::new();
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(Dictionary::new(), b"0.5 g 0 0 10 10 re f".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 144.into(), 72.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc.save(h.path("doc.pdf")).unwrap();

    let out = h.run(&["--dpi", "72", "-o", "page.png", "doc.pdf"], "w50%:COPY\n");
    assert!(out.status.success(), "{}", stderr_of(&out));
    let image = decode(&h.path("page.png"));
    // MediaBox inherited from the page tree
    assert_eq!(image.dimensions(), (144, 72));
    assert_eq!(image.get_pixel(140, 2).0, [255, 255, 255, 255]);
    assert_eq!(image.get_pixel(2, 70).0, [128, 128, 128, 255]);
}
