//! The build script keeps generated files out of the package directory.

use std::path::Path;

#[test]
fn header_is_generated_outside_the_source_tree() {
    let source_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    assert!(!source_dir.join("include").join("todo_client.h").exists());

    let out_dir = Path::new(env!("OUT_DIR"));
    assert!(!out_dir.starts_with(source_dir));

    // Generation is best effort; when it ran, the header covers the surface.
    if let Ok(header) = std::fs::read_to_string(out_dir.join("todo_client.h")) {
        assert!(header.contains("TODO_CLIENT_H"));
        assert!(header.contains("todo_controller_new"));
        assert!(header.contains("todo_begin_submit"));
        assert!(header.contains("todo_finish"));
    }
}
