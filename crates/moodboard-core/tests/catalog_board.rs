use image::{Rgba, RgbaImage};
use moodboard_core::prelude::*;
use moodboard_core::board_to_json;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("moodboard-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create fixture dir");
    dir
}

fn write_png(dir: &Path, name: &str, w: u32, h: u32, color: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(w, h, Rgba(color))
        .save(&path)
        .expect("write png");
    path
}

#[test]
fn open_filters_by_extension_case_insensitively() {
    let dir = fixture_dir("filter");
    write_png(&dir, "a.png", 4, 4, [255, 0, 0, 255]);
    fs::copy(dir.join("a.png"), dir.join("b.PNG")).expect("copy");
    fs::write(dir.join("notes.txt"), "not an image").expect("write txt");
    fs::create_dir_all(dir.join("nested.png")).expect("dir named like an image");
    write_png(&dir.join("nested.png"), "deep.png", 2, 2, [0, 0, 0, 255]);

    let catalog = ImageCatalog::open(&dir).expect("open");
    let mut names: Vec<String> = catalog
        .paths()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.png", "b.PNG"]);
    assert_eq!(catalog.root(), Some(dir.as_path()));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn open_missing_directory_is_an_error_but_empty_is_not() {
    let dir = fixture_dir("empty");
    let catalog = ImageCatalog::open(&dir).expect("open empty");
    assert!(catalog.is_empty());

    let missing = dir.join("does-not-exist");
    assert!(matches!(
        ImageCatalog::open(&missing),
        Err(MoodBoardError::Io(_))
    ));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn subfolders_lists_only_directories() {
    let dir = fixture_dir("subfolders");
    fs::create_dir_all(dir.join("characters")).expect("mkdir");
    fs::create_dir_all(dir.join("props")).expect("mkdir");
    write_png(&dir, "loose.png", 2, 2, [0, 0, 0, 255]);

    let mut subs = ImageCatalog::subfolders(&dir).expect("subfolders");
    subs.sort();
    assert_eq!(subs, vec![dir.join("characters"), dir.join("props")]);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn describe_reads_dimensions_and_load_reports_decode_errors() {
    let dir = fixture_dir("describe");
    let good = write_png(&dir, "good.png", 12, 7, [1, 2, 3, 255]);
    let bad = dir.join("bad.jpg");
    fs::write(&bad, b"definitely not a jpeg").expect("write bad");

    let d = ImageCatalog::describe(&good).expect("describe");
    assert_eq!(d.size(), (12, 7));
    assert!(matches!(
        ImageCatalog::load(&bad),
        Err(MoodBoardError::Decode { .. })
    ));
    assert!(matches!(
        ImageCatalog::load(&dir.join("gone.png")),
        Err(MoodBoardError::Decode { .. })
    ));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn board_skips_undecodable_and_oversized_images() {
    let dir = fixture_dir("board");
    let red = write_png(&dir, "red.png", 40, 30, [255, 0, 0, 255]);
    let bad = dir.join("broken.png");
    fs::write(&bad, b"garbage").expect("write bad");
    let huge = write_png(&dir, "huge.png", 300, 10, [0, 0, 255, 255]);
    let green = write_png(&dir, "green.png", 20, 30, [0, 255, 0, 255]);

    let catalog =
        ImageCatalog::from_paths(vec![red.clone(), bad.clone(), huge.clone(), green.clone()]);
    let cfg = BoardConfig::builder()
        .images_per_board(4)
        .with_canvas(256, 256)
        .build();
    let window = next_window(0, cfg.images_per_board, catalog.len());
    let board = compose_board(&catalog, window, &cfg);

    assert_eq!(board.canvases.len(), 1);
    assert_eq!(board.primary().unwrap().dimensions(), (60, 30));
    assert_eq!(*board.primary().unwrap().get_pixel(45, 5), Rgba([0, 255, 0, 255]));
    assert_eq!(board.warnings.len(), 2);
    assert!(board.warnings.iter().any(|w| matches!(
        w,
        BoardWarning::Decode { path, .. } if *path == bad
    )));
    assert!(board.warnings.iter().any(|w| matches!(
        w,
        BoardWarning::Oversized { path, width: 300, height: 10 } if *path == huge
    )));
    assert_eq!(board.pages[0].placements.len(), 2);
    assert_eq!(board.pages[0].placements[1].path, green);
    assert_eq!(board.stats.num_placed, 2);

    let json = board_to_json(&board, &["board_0.png".to_string()]);
    assert_eq!(json["pages"][0]["image"], "board_0.png");
    assert_eq!(json["pages"][0]["placements"].as_array().unwrap().len(), 2);
    assert_eq!(json["warnings"].as_array().unwrap().len(), 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn plan_board_matches_composed_layout() {
    let dir = fixture_dir("plan");
    let paths: Vec<PathBuf> = (0..5)
        .map(|i| write_png(&dir, &format!("{i}.png"), 30 + i * 10, 20, [9, 9, 9, 255]))
        .collect();
    let catalog = ImageCatalog::from_paths(paths);
    let cfg = BoardConfig::builder()
        .images_per_board(3)
        .with_canvas(100, 100)
        .build();
    let window = next_window(4, cfg.images_per_board, catalog.len());

    let layout = plan_board(&catalog, window, &cfg);
    let board = compose_board(&catalog, window, &cfg);
    assert_eq!(layout.pages(), board.pages);
    assert_eq!(layout.descriptors.len(), 3);
    assert_eq!(layout.descriptors[0].path, catalog.paths()[4]);
    assert_eq!(layout.descriptors[1].path, catalog.paths()[0]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn empty_catalog_gives_empty_board() {
    let catalog = ImageCatalog::default();
    let cfg = BoardConfig::default();
    let board = compose_board(&catalog, next_window(0, 3, 0), &cfg);
    assert!(board.is_empty());
    assert!(board.warnings.is_empty());
    assert!(matches!(board.require_content(), Err(MoodBoardError::EmptyCatalog)));
}
