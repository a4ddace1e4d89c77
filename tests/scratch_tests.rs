use std::path::Path;

use target_mcp_server::scratch::{ScratchPaths, ScratchSpace};

#[test]
fn scratch_space_lives_until_cleanup() {
    let scratch = ScratchSpace::create().unwrap();
    let dir = scratch.paths().dir.clone();
    assert!(dir.is_dir());

    std::fs::write(scratch.paths().file("page.html"), "<p>hi</p>").unwrap();
    assert!(dir.join("page.html").is_file());

    scratch.cleanup();
    assert!(!dir.exists());
}

#[test]
fn dropped_scratch_space_is_removed() {
    let dir = {
        let scratch = ScratchSpace::create().unwrap();
        scratch.paths().dir.clone()
    };
    assert!(!dir.exists());
}

#[test]
fn scratch_files_stay_inside_the_directory() {
    let paths = ScratchPaths::in_dir(Path::new("/tmp/scratch"));
    assert_eq!(paths.file("styles.css"), Path::new("/tmp/scratch/styles.css"));
}
