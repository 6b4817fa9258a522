use runavik::domain::StoragePath;

#[test]
fn given_single_part_download_when_building_path_then_no_part_suffix_is_used() {
    let path = StoragePath::staged_part("req-1", None, "Some Title", "mp4");
    assert_eq!(path.as_str(), "req-1:Some Title.mp4");
}

#[test]
fn given_multi_part_download_when_building_path_then_suffix_is_one_indexed() {
    let path = StoragePath::staged_part("req-1", Some(2), "Some Title", "mp4");
    assert_eq!(path.as_str(), "req-1-part2:Some Title.mp4");
}

#[test]
fn given_display_title_when_building_transcript_path_then_it_is_prefixed() {
    let path = StoragePath::transcript("Some Title-part1.mp4");
    assert_eq!(path.as_str(), "transcription:Some Title-part1.mp4");
}

#[test]
fn given_same_inputs_when_building_paths_then_keys_are_deterministic() {
    let first = StoragePath::staged_part("req-9", Some(1), "Title", "mp4");
    let second = StoragePath::staged_part("req-9", Some(1), "Title", "mp4");
    assert_eq!(first, second);
}
