use std::io::Read as _;

use super::*;

#[test]
fn sidecar_renders_title_and_caption_sections() {
    let sidecar = SidecarText {
        title: "Five ways to focus".to_owned(),
        caption: "Read more #focus".to_owned(),
        slide_text: Vec::new(),
    };

    let text = sidecar.render();
    assert!(text.starts_with("TITLE:\nFive ways to focus\n"));
    assert!(text.contains("CAPTION:\nRead more #focus\n"));
    assert!(!text.contains("SLIDE TEXT:"));
}

#[test]
fn sidecar_groups_removed_text_by_slide_number() {
    let sidecar = SidecarText {
        title: "t".to_owned(),
        caption: "c".to_owned(),
        slide_text: vec![
            (1, vec!["Hook line".to_owned()]),
            (3, vec!["Point one".to_owned(), "Point two".to_owned()]),
        ],
    };

    let text = sidecar.render();
    assert!(text.contains("SLIDE TEXT:\n"));
    assert!(text.contains("Slide 1:\n- Hook line\n"));
    assert!(text.contains("Slide 3:\n- Point one\n- Point two\n"));
}

#[test]
fn zip_builder_roundtrips_entries() {
    let mut zip = ZipBuilder::new();
    zip.add_file("images/slide-01.png", b"png-bytes").unwrap();
    zip.add_file("post-text.txt", b"TITLE:\nx\n").unwrap();
    let bytes = zip.finish().unwrap();

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_owned())
        .collect();
    assert_eq!(names, vec!["images/slide-01.png", "post-text.txt"]);

    let mut content = String::new();
    archive
        .by_name("post-text.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "TITLE:\nx\n");
}
