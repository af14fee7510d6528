//! Pipeline behaviour observed through the mock raster engine.

use tilesplit::{
    OutputRequest, Requirement, ResponseKind, Splitter, SplitError, StoreOptions, TileRect,
    TilingRequest, UniquePolicy,
};

use super::test_utils::{Call, MockRasterEngine, ScratchDir};

fn strings(outputs: &[tilesplit::TileOutput]) -> Vec<String> {
    outputs
        .iter()
        .map(|o| String::from_utf8(o.as_buffer().unwrap().to_vec()).unwrap())
        .collect()
}

#[tokio::test]
async fn test_invalid_geometry_crops_nothing() {
    let engine = MockRasterEngine::new(320, 224);
    let splitter = Splitter::with_engine(engine.clone());

    let result = splitter
        .split("ignored.png", &TilingRequest::horizontal(7), &OutputRequest::buffers())
        .await;

    assert!(result.is_err());
    assert_eq!(engine.calls(), vec![Call::Load]);
}

#[tokio::test]
async fn test_invalid_output_loads_nothing() {
    let engine = MockRasterEngine::new(40, 10);
    let splitter = Splitter::with_engine(engine.clone());
    let output = OutputRequest {
        response: ResponseKind::File,
        store: None,
    };

    let err = splitter
        .split("ignored.png", &TilingRequest::horizontal(4), &output)
        .await
        .unwrap_err();

    assert!(matches!(err.root(), SplitError::Output(_)));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_policy_crops_nothing() {
    let engine = MockRasterEngine::new(40, 10);
    let splitter = Splitter::with_engine(engine.clone());
    let request = TilingRequest::horizontal(4)
        .with_unique(UniquePolicy::default().with_thresholds(0.1, 1.5));

    let err = splitter
        .split("ignored.png", &request, &OutputRequest::buffers())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("has to be between 0 and 1"));
    assert_eq!(engine.count(|c| matches!(c, Call::Crop(_))), 0);
}

#[tokio::test]
async fn test_stage_order() {
    let engine = MockRasterEngine::new(20, 10).with_column_looks(10, "AB");
    let splitter = Splitter::with_engine(engine.clone());
    let request = TilingRequest::horizontal(2).with_unique(UniquePolicy::default());

    splitter
        .split("ignored.png", &request, &OutputRequest::buffers())
        .await
        .unwrap();

    let left = TileRect::new(0, 0, 10, 10);
    let right = TileRect::new(10, 0, 10, 10);
    assert_eq!(
        engine.calls(),
        vec![
            Call::Load,
            Call::Crop(left),
            Call::Crop(right),
            Call::Compare(left, right),
            Call::Encode(left, tilesplit::Extension::Png),
            Call::Encode(right, tilesplit::Extension::Png),
        ]
    );
}

#[tokio::test]
async fn test_greedy_filter_keeps_first_of_each_look() {
    let engine = MockRasterEngine::new(60, 10).with_column_looks(10, "ABABCA");
    let splitter = Splitter::with_engine(engine.clone());
    let request = TilingRequest::horizontal(6).with_unique(UniquePolicy::default());

    let outputs = splitter
        .split("ignored.png", &request, &OutputRequest::buffers())
        .await
        .unwrap();

    assert_eq!(strings(&outputs), vec!["A@0,0.png", "B@10,0.png", "C@40,0.png"]);
}

#[tokio::test]
async fn test_filter_never_compares_a_tile_with_itself() {
    let engine = MockRasterEngine::new(50, 10).with_column_looks(10, "ABCDE");
    let splitter = Splitter::with_engine(engine.clone());
    let request = TilingRequest::horizontal(5).with_unique(UniquePolicy::default());

    splitter.cut("ignored.png", &request).await.unwrap();

    let compares: Vec<(TileRect, TileRect)> = engine
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Compare(a, b) => Some((a, b)),
            _ => None,
        })
        .collect();

    // all distinct: every pair compared once, earlier tile first
    assert_eq!(compares.len(), 10);
    assert!(compares.iter().all(|(a, b)| a.x < b.x));
}

#[tokio::test]
async fn test_failed_comparison_keeps_tile() {
    let engine = MockRasterEngine::new(40, 10)
        .with_column_looks(10, "AXBA")
        .failing_on('X');
    let splitter = Splitter::with_engine(engine.clone());
    let request = TilingRequest::horizontal(4).with_unique(UniquePolicy::default());

    let tiles = splitter.cut("ignored.png", &request).await.unwrap();

    let looks: String = tiles.iter().map(|t| t.look).collect();
    assert_eq!(looks, "AXB");
}

#[tokio::test]
async fn test_disabled_policy_skips_comparisons() {
    let engine = MockRasterEngine::new(40, 10).with_column_looks(10, "AAAA");
    let splitter = Splitter::with_engine(engine.clone());
    let request = TilingRequest::horizontal(4).with_unique(UniquePolicy::disabled());

    let tiles = splitter.cut("ignored.png", &request).await.unwrap();

    assert_eq!(tiles.len(), 4);
    assert_eq!(engine.count(|c| matches!(c, Call::Compare(..))), 0);
}

#[tokio::test]
async fn test_one_requirement_collapses_matching_looks() {
    let engine = MockRasterEngine::new(40, 10).with_column_looks(10, "AABB");
    let splitter = Splitter::with_engine(engine.clone());
    let one = TilingRequest::horizontal(4)
        .with_unique(UniquePolicy::default().with_requirement(Requirement::One));

    let tiles = splitter.cut("ignored.png", &one).await.unwrap();
    assert_eq!(tiles.len(), 2);
}

#[tokio::test]
async fn test_mock_tiles_written_to_files() {
    let dir = ScratchDir::new("mock-files");
    let engine = MockRasterEngine::new(30, 10).with_column_looks(10, "ABC");
    let splitter = Splitter::with_engine(engine);
    let output = OutputRequest::files(StoreOptions::new(dir.path(), "frame"));

    let outputs = splitter
        .split("ignored.png", &TilingRequest::horizontal(3), &output)
        .await
        .unwrap();

    assert_eq!(dir.file_names(), vec!["frame_0.png", "frame_1.png", "frame_2.png"]);
    let second = std::fs::read_to_string(outputs[1].as_path().unwrap()).unwrap();
    assert_eq!(second, "B@10,0.png");
}

#[tokio::test]
async fn test_unusable_directory_fails_before_cropping() {
    let dir = ScratchDir::new("occupied");
    std::fs::create_dir_all(dir.path()).unwrap();
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"x").unwrap();

    let engine = MockRasterEngine::new(40, 10).with_column_looks(10, "ABAB");
    let splitter = Splitter::with_engine(engine.clone());
    let request = TilingRequest::horizontal(4).with_unique(UniquePolicy::default());
    let output = OutputRequest::files(StoreOptions::new(&blocker, "tile"));

    let err = splitter
        .split("ignored.png", &request, &output)
        .await
        .unwrap_err();

    assert!(matches!(err.root(), SplitError::Io { .. }));
    assert!(err.to_string().contains("write permissions"));
    assert_eq!(engine.calls(), vec![Call::Load]);
}

#[tokio::test]
async fn test_directory_created_only_for_valid_geometry() {
    let dir = ScratchDir::new("lazy");
    let engine = MockRasterEngine::new(40, 10);
    let splitter = Splitter::with_engine(engine.clone());
    let output = OutputRequest::files(StoreOptions::new(dir.path(), "tile"));

    let result = splitter
        .split("ignored.png", &TilingRequest::horizontal(3), &output)
        .await;
    assert!(result.is_err());
    assert!(!dir.path().exists());

    splitter
        .split("ignored.png", &TilingRequest::horizontal(4), &output)
        .await
        .unwrap();
    assert_eq!(dir.file_names().len(), 4);
}
