// Outputs the DFAs of all contexts in dot format for all the modes files in the data directory.
// Run with `cargo test -- --nocapture trace_contexts_as_dot`

use std::fs;

use lexdfa::{LexerBuilder, LexerMode};

#[test]
fn trace_contexts_as_dot() {
    // Initialize the logger
    let _ = env_logger::builder()
        .is_test(true)
        .parse_env(env_logger::Env::default().default_filter_or("lexdfa::lexer=debug"))
        .try_init();

    // Iterate over all json files in the data directory that contain lexer modes
    for entry in fs::read_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data")).unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();
        if path.extension().unwrap() != "json" {
            continue;
        }

        println!("--------------------------------------------------");
        println!("Entry: {:?}", entry.file_name());
        println!("--------------------------------------------------");

        // Read the json file
        let file = fs::File::open(&path).unwrap();
        let lexer_modes: Vec<LexerMode> = serde_json::from_reader(file).unwrap();

        // Create a lexer from the lexer builder
        let lexer = LexerBuilder::new()
            .add_modes(&lexer_modes)
            .build()
            .unwrap();

        lexer
            .log_contexts_as_dot()
            .expect("Failed to trace contexts as dot");
    }
}
