use mklog::{Facility, Level, Severity};

#[mklog::log_args(INFO, facility = log)]
fn by_ident(log: &Facility, a: i32) -> i32 {
    a
}

#[mklog::log_args(level = "ERROR", facility = log)]
fn by_name(log: &Facility, a: i32) -> i32 {
    a
}

#[mklog::log_args(level = 15, facility = log)]
fn by_rank(log: &Facility, a: i32) -> i32 {
    a
}

#[mklog::log_args(level = Severity::Warning, facility = log, args())]
fn by_expr(log: &Facility, a: i32) -> i32 {
    a
}

#[mklog::log_args(facility = log, args(b))]
fn selected(log: &Facility, a: i32, b: bool) -> bool {
    a > 0 && b
}

fn main() {
    let log = Facility::new();
    log.set_level(Level::DEBUG).unwrap();
    assert_eq!(by_ident(&log, 1) + by_name(&log, 2) + by_rank(&log, 3) + by_expr(&log, 4), 10);
    assert!(selected(&log, 1, true));
}
