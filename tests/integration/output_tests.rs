//! Output assembly: naming, directories and the response/store matrix.

use tilesplit::output::{assemble, prepare_directory};
use tilesplit::{Extension, OutputRequest, SplitError, StoreOptions, TileRect};

use super::test_utils::{MockRasterEngine, MockTile, ScratchDir};

fn tiles(looks: &str) -> Vec<MockTile> {
    looks
        .chars()
        .enumerate()
        .map(|(i, look)| MockTile {
            rect: TileRect::new(i as u32 * 10, 0, 10, 10),
            look,
        })
        .collect()
}

#[tokio::test]
async fn test_no_tiles_to_output() {
    let dir = ScratchDir::new("none");
    let engine = MockRasterEngine::new(10, 10);

    for request in [
        OutputRequest::buffers(),
        OutputRequest::files(StoreOptions::new(dir.path(), "tile")),
    ] {
        let err = assemble(&engine, &[], &request).await.unwrap_err();
        assert!(matches!(err, SplitError::Output(_)));
        assert_eq!(err.to_string(), "no tiles to output");
    }
    assert!(!dir.path().exists());
}

#[tokio::test]
async fn test_reserved_prefixes_rejected() {
    let dir = ScratchDir::new("reserved");
    let engine = MockRasterEngine::new(10, 10);

    for prefix in ["CON", "nul", "com3", "LPT9", "a:b", "a/b", "tab\t", ""] {
        let request = OutputRequest::files(StoreOptions::new(dir.path(), prefix));
        let err = assemble(&engine, &tiles("AB"), &request).await.unwrap_err();
        assert!(matches!(err, SplitError::Naming(_)), "{:?}", prefix);
    }
    assert!(!dir.path().exists());
}

#[tokio::test]
async fn test_hundred_tiles_padded_to_width_of_count() {
    let dir = ScratchDir::new("hundred");
    let engine = MockRasterEngine::new(1000, 10);
    let looks: String = std::iter::repeat('A').take(100).collect();

    let outputs = assemble(
        &engine,
        &tiles(&looks),
        &OutputRequest::files(StoreOptions::new(dir.path(), "t")),
    )
    .await
    .unwrap();

    let names = dir.file_names();
    assert_eq!(outputs.len(), 100);
    assert_eq!(names.len(), 100);
    assert_eq!(names[0], "t_000.png");
    assert_eq!(names[99], "t_099.png");
}

#[tokio::test]
async fn test_explicit_extension_used_for_files() {
    let dir = ScratchDir::new("ext");
    let engine = MockRasterEngine::new(20, 10);
    let store = StoreOptions::new(dir.path(), "tile").with_extension(Extension::Gif);

    assemble(&engine, &tiles("AB"), &OutputRequest::files(store))
        .await
        .unwrap();

    assert_eq!(dir.file_names(), vec!["tile_0.gif", "tile_1.gif"]);
    let body = std::fs::read_to_string(dir.path().join("tile_1.gif")).unwrap();
    assert_eq!(body, "B@10,0.gif");
}

#[tokio::test]
async fn test_buffer_response_with_store_writes_and_returns() {
    let dir = ScratchDir::new("both");
    let engine = MockRasterEngine::new(20, 10);

    let outputs = assemble(
        &engine,
        &tiles("AB"),
        &OutputRequest::buffers_and_store(StoreOptions::new(dir.path(), "tile")),
    )
    .await
    .unwrap();

    assert_eq!(&outputs[0].as_buffer().unwrap()[..], b"A@0,0.png");
    assert_eq!(dir.file_names(), vec!["tile_0.png", "tile_1.png"]);
}

#[tokio::test]
async fn test_prepare_directory_is_idempotent() {
    let dir = ScratchDir::new("prepare");
    let first = prepare_directory(dir.path()).await.unwrap();
    let second = prepare_directory(dir.path()).await.unwrap();
    assert_eq!(first, second);
    assert!(first.is_absolute());
}

#[tokio::test]
async fn test_directory_blocked_by_file() {
    let dir = ScratchDir::new("blocked");
    std::fs::create_dir_all(dir.path()).unwrap();
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"x").unwrap();

    let engine = MockRasterEngine::new(20, 10);
    let request = OutputRequest::files(StoreOptions::new(&blocker, "tile"));
    let err = assemble(&engine, &tiles("AB"), &request).await.unwrap_err();

    assert!(matches!(err, SplitError::Io { .. }));
}
