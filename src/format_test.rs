use super::*;

#[test]
fn numbers_group_by_thousands_with_narrow_nbsp() {
    assert_eq!(format_number(0), "0");
    assert_eq!(format_number(999), "999");
    assert_eq!(format_number(1_000), "1\u{202F}000");
    assert_eq!(format_number(1_234_567), "1\u{202F}234\u{202F}567");
    assert_eq!(format_number(-45_000), "-45\u{202F}000");
}

#[test]
fn percent_uses_decimal_comma() {
    assert_eq!(format_percent(45.678, 2), "45,68\u{202F}%");
    assert_eq!(format_percent(100.0, 0), "100\u{202F}%");
    assert_eq!(format_percent(1234.5, 1), "1\u{202F}234,5\u{202F}%");
    assert_eq!(format_percent(f64::NAN, 2), "-");
}

#[test]
fn percent_groups_integer_parts_beyond_i64() {
    assert_eq!(
        format_percent(1e20, 0),
        "100\u{202F}000\u{202F}000\u{202F}000\u{202F}000\u{202F}000\u{202F}000\u{202F}%"
    );
}

#[test]
fn percent_never_renders_negative_zero() {
    assert_eq!(format_percent(-0.001, 2), "0,00\u{202F}%");
    assert_eq!(format_percent(-0.0, 1), "0,0\u{202F}%");
    assert_eq!(format_percent(-12.5, 1), "-12,5\u{202F}%");
}

#[test]
fn participation_needs_registered_voters() {
    assert_eq!(participation_rate(10, 0), None);
    let rate = participation_rate(250, 1_000).unwrap();
    assert!((rate - 25.0).abs() < f64::EPSILON);
}

#[test]
fn timestamps_render_day_first() {
    assert_eq!(format_timestamp("2025-10-25T08:05:00Z"), "25/10/2025 08:05");
    assert_eq!(format_timestamp("2025-10-25T18:30:00+00:00"), "25/10/2025 18:30");
    assert_eq!(format_timestamp("hier"), "hier");
}
