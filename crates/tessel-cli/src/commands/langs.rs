pub fn run() {
    let registry = match tessel_langs::registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    println!("Bundled languages ({}):", registry.len());
    for name in registry.names() {
        println!("  {name}");
    }
}
