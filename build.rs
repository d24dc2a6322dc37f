fn main() {
    built::write_built_file().unwrap_or_else(|e| {
        println!("cargo:warning=failed to acquire build-time information: {e}");
    });
}
