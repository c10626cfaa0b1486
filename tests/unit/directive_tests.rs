// Size directive tests
//
// Directives are resolved against the embedded font, so fit-width results are
// checked by measuring the line again at the resolved size.

use rstest::rstest;
use textmark::watermark::{measure, parse_directive, SizeDirective, Typesetter};
use textmark::Error;

fn typesetter() -> Typesetter {
    Typesetter::embedded().expect("embedded font")
}

#[rstest]
#[case("", 12.0)]
#[case("24", 24.0)]
#[case("7", 7.0)]
#[case("144", 144.0)]
fn test_fixed_and_default_sizes_are_literal(#[case] directive: &str, #[case] expected: f64) {
    let ts = typesetter();
    let size = parse_directive(directive, "WORLD", 300, &ts).unwrap();
    assert_eq!(size, expected);
}

#[rstest]
#[case("w100", 400, 100.0)]
#[case("w250", 400, 250.0)]
#[case("w50%", 200, 100.0)]
#[case("w25%", 800, 200.0)]
fn test_fit_width_hits_target(#[case] directive: &str, #[case] canvas_width: u32, #[case] target: f64) {
    let ts = typesetter();
    let size = parse_directive(directive, "BIG TEXT", canvas_width, &ts).unwrap();
    let (_, extents) = measure("BIG TEXT", size, &ts);
    assert!(
        (extents.width - target).abs() < 1.0,
        "{directive}: width {} target {target}",
        extents.width
    );
}

#[rstest]
#[case("bogus")]
#[case("w5xyz")]
#[case("12abc")]
#[case("w")]
#[case("w%")]
#[case("-5")]
#[case("+5")]
#[case(" 12")]
#[case("0")]
#[case("w0%")]
#[case("99999999999")]
fn test_malformed_directive_is_rejected(#[case] directive: &str) {
    let ts = typesetter();
    match parse_directive(directive, "TEXT", 300, &ts) {
        Err(Error::InvalidDirective { directive: reported }) => assert_eq!(reported, directive),
        other => panic!("{directive:?}: expected InvalidDirective, got {other:?}"),
    }
}

#[test]
fn test_invalid_directive_message() {
    let ts = typesetter();
    let err = parse_directive("xyz", "oops", 300, &ts).unwrap_err();
    assert_eq!(err.to_string(), "invalid format: xyz");
}

#[test]
fn test_fit_width_of_blank_ink_is_unmeasurable() {
    let ts = typesetter();
    let err = parse_directive("w100", "   ", 300, &ts).unwrap_err();
    assert!(matches!(err, Error::UnmeasurableText { .. }));
}

#[test]
fn test_directive_kinds() {
    assert_eq!("".parse::<SizeDirective>().unwrap(), SizeDirective::Default);
    assert_eq!("18".parse::<SizeDirective>().unwrap(), SizeDirective::Fixed(18));
    assert_eq!("w40".parse::<SizeDirective>().unwrap(), SizeDirective::FitWidth(40));
    assert_eq!("w40%".parse::<SizeDirective>().unwrap(), SizeDirective::FitPercent(40));
}

#[test]
fn test_measuring_twice_is_identical() {
    let ts = typesetter();
    let first = measure("Repeatable", 33.0, &ts);
    let second = measure("Repeatable", 33.0, &ts);
    assert_eq!(first, second);
}
