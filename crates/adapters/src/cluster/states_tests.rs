use super::*;
use yare::parameterized;

#[parameterized(
    millicores = { "250m", 250 },
    whole_cores = { "2", 2000 },
)]
fn cpu_quantity_parses(raw: &str, expected: i64) {
    assert_eq!(parse_cpu_millis(raw), expected);
}

#[parameterized(
    kibibytes = { "128Ki", 128 },
    mebibytes = { "64Mi", 64 * 1024 },
    gibibytes = { "1Gi", 1024 * 1024 },
)]
fn mem_quantity_parses(raw: &str, expected: i64) {
    assert_eq!(parse_mem_ki(raw), expected);
}

#[test]
fn unparsable_quantity_is_zero() {
    assert_eq!(parse_cpu_millis("garbage"), 0);
    assert_eq!(parse_mem_ki("garbage"), 0);
}
