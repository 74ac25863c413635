fn main() {
    if let Err(err) = table_schema::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
