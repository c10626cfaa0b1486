// Block layout tests
//
// Layout is computed from real font metrics, then checked against the ink
// actually drawn by the compositor.

use textmark::canvas::Canvas;
use textmark::watermark::{
    layout, read_lines, tight_height, Compositor, Line, TextStyle, Typesetter,
};

fn lines_for(input: &str, canvas_width: u32, ts: &Typesetter) -> Vec<Line> {
    let specs = read_lines(input.as_bytes()).unwrap();
    Line::measure_all(specs, canvas_width, ts).unwrap()
}

fn ink_rows(canvas: &Canvas) -> Option<(u32, u32)> {
    let image = canvas.to_rgba();
    let rows: Vec<u32> = image
        .enumerate_pixels()
        .filter(|(_, _, p)| p[3] > 0)
        .map(|(_, y, _)| y)
        .collect();
    Some((*rows.iter().min()?, *rows.iter().max()?))
}

#[test]
fn test_empty_input_has_no_layout() {
    assert!(layout(&[], 300, 100).is_empty());
    assert_eq!(tight_height(&[]), 0.0);
}

#[test]
fn test_one_origin_per_line_in_order() {
    let ts = Typesetter::embedded().unwrap();
    let lines = lines_for("ONE\n20:TWO\n30:THREE\n", 400, &ts);
    let origins = layout(&lines, 400, 300);
    assert_eq!(origins.len(), 3);
    assert!(origins[0].y < origins[1].y);
    assert!(origins[1].y < origins[2].y);
}

#[test]
fn test_consecutive_baselines_step_by_font_box() {
    let ts = Typesetter::embedded().unwrap();
    let lines = lines_for("20:A\n30:B\n", 400, &ts);
    let origins = layout(&lines, 400, 300);
    let step = lines[0].font_extents.descent + lines[1].font_extents.ascent;
    assert!((origins[1].y - origins[0].y - step).abs() < 1e-9);
}

#[test]
fn test_single_line_vertical_margins_match() {
    let ts = Typesetter::embedded().unwrap();
    let mut canvas = Canvas::blank(300, 120).unwrap();
    let lines = lines_for("36:Quiet gypsy\n", 300, &ts);
    let origins = layout(&lines, 300, 120);
    Compositor::new(&ts, TextStyle::default()).draw(&mut canvas, &lines, &origins, 0.0);

    let (top, bottom) = ink_rows(&canvas).unwrap();
    let top_margin = i64::from(top);
    let bottom_margin = 119 - i64::from(bottom);
    assert!(
        (top_margin - bottom_margin).abs() <= 2,
        "top {top_margin} bottom {bottom_margin}"
    );
}

#[test]
fn test_multi_line_block_is_centered() {
    let ts = Typesetter::embedded().unwrap();
    let mut canvas = Canvas::blank(400, 300).unwrap();
    let lines = lines_for("24:FIRST\nsecond line\nw50%:LAST\n", 400, &ts);
    let origins = layout(&lines, 400, 300);
    Compositor::new(&ts, TextStyle::default()).draw(&mut canvas, &lines, &origins, 0.0);

    let (top, bottom) = ink_rows(&canvas).unwrap();
    let top_margin = i64::from(top);
    let bottom_margin = 299 - i64::from(bottom);
    assert!(
        (top_margin - bottom_margin).abs() <= 2,
        "top {top_margin} bottom {bottom_margin}"
    );
}

#[test]
fn test_lines_centered_horizontally_on_ink() {
    let ts = Typesetter::embedded().unwrap();
    let lines = lines_for("24:iii\n24:WWW\n", 300, &ts);
    for (line, origin) in lines.iter().zip(layout(&lines, 300, 200)) {
        let left = origin.x + line.extents.x_bearing;
        let right = 300.0 - (left + line.extents.width);
        assert!((left - right).abs() < 1e-9);
    }
}
