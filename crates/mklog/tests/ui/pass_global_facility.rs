// Default options: DEBUG, every parameter, the process-wide facility.

#[mklog::log_args]
fn connect(host: &str, port: u16) -> String {
    format!("{host}:{port}")
}

fn main() {
    mklog::global().set_level(mklog::Level::ERROR).unwrap();
    assert_eq!(connect("db", 5432), "db:5432");
}
