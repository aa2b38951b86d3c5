use image::{ImageBuffer, ImageFormat, Rgb};
use mediacull::{
    AppConfig, AutoSelector, DuplicateGroup, DuplicateGrouper, FileMetadata, FilenameParser,
    MediaScanner, PatternType, SilentReporter,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Gray horizontal gradient stored as PNG regardless of the file extension.
fn write_image(path: &Path, mirrored: bool) {
    let width = 90;
    let img = ImageBuffer::from_fn(width, 60, |x, _y| {
        let x = if mirrored { width - 1 - x } else { x };
        let v = (x * 255 / (width - 1)) as u8;
        Rgb([v, v, v])
    });
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

fn scan(dir: &Path) -> Vec<FileMetadata> {
    MediaScanner::new(AppConfig::default())
        .scan_directory(dir, true, &SilentReporter)
        .unwrap()
        .media_files
}

fn names(group: &DuplicateGroup) -> Vec<&str> {
    let mut names: Vec<&str> = group.files.iter().map(FileMetadata::filename).collect();
    names.sort();
    names
}

#[test]
fn guid_pair_forms_one_high_confidence_group() {
    let temp_dir = TempDir::new().unwrap();
    write_image(
        &temp_dir.path().join("58c9b580-5303-4b3b-b75d-f07f505f8d59.JPG"),
        false,
    );
    write_image(
        &temp_dir.path().join("58c9b580-5303-4b3b-b75d-f07f505f8d59-222115.JPG"),
        false,
    );

    let files = scan(temp_dir.path());
    let groups = DuplicateGrouper::from_config(&AppConfig::default()).group(&files);

    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.pattern_type, PatternType::Guid);
    assert_eq!(group.base_name, "58c9b580-5303-4b3b-b75d-f07f505f8d59");
    assert_eq!(group.file_count(), 2);
    // 0.95 * 0.7 + 0.3 * 0.2 + 0.2 * 0.1
    assert!((group.confidence_score - 0.745).abs() < 1e-9);
}

#[test]
fn copy_suffix_is_selected_for_deletion() {
    let temp_dir = TempDir::new().unwrap();
    let original = temp_dir.path().join("vacation_photo.jpg");
    let copy = temp_dir.path().join("vacation_photo_copy.jpg");
    write_image(&original, false);
    write_image(&copy, false);

    let files = MediaScanner::new(AppConfig::default()).scan_files(
        &[copy.clone(), original.clone()],
        &SilentReporter,
    );
    let group = DuplicateGroup::new("vacation_photo", PatternType::Generic, files, 0.7).unwrap();

    let selector = AutoSelector::from_config(&AppConfig::default());
    let result = selector.analyze(&group).unwrap();

    assert!((result.confidence - 1.0).abs() < 1e-9);
    assert!(selector.can_auto_select(&result));
    let deleted: Vec<&PathBuf> = result.files_to_delete.iter().collect();
    assert_eq!(deleted.len(), 1);
    assert!(deleted[0].ends_with("vacation_photo_copy.jpg"));
    assert!(result.files_to_keep.iter().all(|p| p.ends_with("vacation_photo.jpg")));
    assert!(!result.applied);
}

#[test]
fn visual_filtering_keeps_the_similar_pair() {
    let temp_dir = TempDir::new().unwrap();
    write_image(&temp_dir.path().join("IMG_5678.png"), false);
    write_image(&temp_dir.path().join("IMG_5678-1.png"), false);
    write_image(&temp_dir.path().join("IMG_5678-2.png"), true);

    let files = scan(temp_dir.path());
    assert_eq!(files.len(), 3);
    let groups = DuplicateGrouper::from_config(&AppConfig::default()).group(&files);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].base_name, "img_5678");
    assert_eq!(names(&groups[0]), vec!["IMG_5678-1.png", "IMG_5678.png"]);
}

#[test]
fn live_photo_pair_is_not_a_duplicate() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("IMG_0042.HEIC"), vec![0u8; 2048]).unwrap();
    fs::write(temp_dir.path().join("IMG_0042.MOV"), vec![0u8; 4096]).unwrap();

    let files = scan(temp_dir.path());
    assert_eq!(files.len(), 2);

    let mut config = AppConfig::default();
    config.enable_visual_filtering = false;
    let groups = DuplicateGrouper::from_config(&config).group(&files);
    assert!(groups.is_empty());
}

#[test]
fn every_group_has_at_least_two_files() {
    let temp_dir = TempDir::new().unwrap();
    for name in [
        "holiday.jpg",
        "holiday (1).jpg",
        "holiday-2.jpg",
        "solo_shot.jpg",
        "IMG_0001.jpg",
        "ab.jpg",
        "clip.mp4",
        "clip_1.mp4",
    ] {
        fs::write(temp_dir.path().join(name), vec![7u8; 1000]).unwrap();
    }

    let files = scan(temp_dir.path());
    let mut config = AppConfig::default();
    config.enable_visual_filtering = false;
    let groups = DuplicateGrouper::from_config(&config).group(&files);

    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g.file_count() >= 2));
    // larger group first when confidences tie
    assert_eq!(groups[0].base_name, "holiday");
    assert_eq!(groups[0].file_count(), 3);
    assert_eq!(groups[1].base_name, "clip");
}

#[test]
fn scanned_records_carry_parse_results() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("2024")).unwrap();
    fs::write(temp_dir.path().join("2024").join("IMG_9999.jpg"), b"jpeg").unwrap();
    fs::write(temp_dir.path().join("ab.jpg"), b"jpeg").unwrap();
    fs::write(temp_dir.path().join("readme.md"), b"text").unwrap();

    let output = MediaScanner::new(AppConfig::default())
        .scan_directory(temp_dir.path(), true, &SilentReporter)
        .unwrap();
    assert_eq!(output.total_files, 3);
    assert_eq!(output.media_files.len(), 2);

    let parser = FilenameParser::new();
    for file in &output.media_files {
        assert_eq!(
            file.parsed_filename().cloned(),
            parser.parse(file.filename())
        );
        assert!(file.file_path().is_absolute());
    }
}

#[test]
fn groups_survive_regrouping() {
    let temp_dir = TempDir::new().unwrap();
    write_image(&temp_dir.path().join("IMG_1111.png"), false);
    write_image(&temp_dir.path().join("IMG_1111-1.png"), false);
    write_image(&temp_dir.path().join("sunset.png"), false);
    write_image(&temp_dir.path().join("sunset (2).png"), false);

    let files = scan(temp_dir.path());
    let config = AppConfig::default();
    let first = DuplicateGrouper::from_config(&config).group(&files);
    let flattened: Vec<FileMetadata> = first.iter().flat_map(|g| g.files.clone()).collect();
    let second = DuplicateGrouper::from_config(&config).group(&flattened);

    assert_eq!(first.len(), 2);
    assert_eq!(
        first.iter().map(DuplicateGroup::key).collect::<Vec<_>>(),
        second.iter().map(DuplicateGroup::key).collect::<Vec<_>>()
    );
}
