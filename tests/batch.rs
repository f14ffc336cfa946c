//! Batch conversion integration tests.

use edgequake_fileconv::{
    convert_batch, ConversionConfig, ConversionProgressCallback, ConvertError, FileError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorder {
    batch_total: AtomicUsize,
    started: AtomicUsize,
    completed: Mutex<Vec<String>>,
    errors: AtomicUsize,
    success: AtomicUsize,
}

impl ConversionProgressCallback for Recorder {
    fn on_batch_start(&self, total_files: usize) {
        self.batch_total.store(total_files, Ordering::SeqCst);
    }
    fn on_file_start(&self, _index: usize, _total: usize, _input: &str) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }
    fn on_file_complete(&self, _index: usize, _total: usize, output_name: &str, _bytes: u64) {
        self.completed.lock().unwrap().push(output_name.to_string());
    }
    fn on_file_error(&self, _index: usize, _total: usize, _error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
    fn on_batch_complete(&self, _total: usize, success_count: usize) {
        self.success.store(success_count, Ordering::SeqCst);
    }
}

fn write(dir: &std::path::Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn mixed_batch_reports_each_file_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let inputs = vec![
        write(dir.path(), "a.md", "# A"),
        write(dir.path(), "b.txt", "not markdown"),
        dir.path().join("missing.md").to_string_lossy().into_owned(),
        write(dir.path(), "c.md", "*c*"),
    ];

    let recorder = Arc::new(Recorder::default());
    let config = ConversionConfig::builder()
        .concurrency(2)
        .progress_callback(recorder.clone() as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();

    let output = convert_batch(&inputs, "md_to_html", out.path(), &config)
        .await
        .unwrap();

    let indices: Vec<usize> = output.files.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert_eq!(output.files[0].output.as_deref(), Some("a.html"));
    assert!(output.files[0].output_bytes > 0);
    assert!(matches!(output.files[1].error, Some(FileError::Conversion { .. })));
    assert!(matches!(output.files[2].error, Some(FileError::Input { .. })));
    assert_eq!(output.files[3].output.as_deref(), Some("c.html"));

    assert_eq!(output.stats.total_files, 4);
    assert_eq!(output.stats.converted, 2);
    assert_eq!(output.stats.failed, 2);
    assert!(out.path().join("a.html").exists());
    assert!(!out.path().join("b.html").exists());

    assert_eq!(recorder.batch_total.load(Ordering::SeqCst), 4);
    assert_eq!(recorder.started.load(Ordering::SeqCst), 4);
    assert_eq!(recorder.errors.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.success.load(Ordering::SeqCst), 2);
    let mut done = recorder.completed.lock().unwrap().clone();
    done.sort();
    assert_eq!(done, vec!["a.html".to_string(), "c.html".to_string()]);
}

#[tokio::test]
async fn all_failed_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![write(dir.path(), "x.png", "not a png"), write(dir.path(), "y.png", "nope")];
    let err = convert_batch(&inputs, "png_to_jpg", dir.path(), &ConversionConfig::default())
        .await
        .unwrap_err();
    match err {
        ConvertError::AllFilesFailed { total, first_error } => {
            assert_eq!(total, 2);
            assert!(first_error.contains("x.png"), "{first_error}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn unknown_conversion_checked_first() {
    let err = convert_batch(
        &["whatever.csv".to_string()],
        "csv_to_toml",
        "/definitely/not/a/dir",
        &ConversionConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedConversion { .. }));
}

#[tokio::test]
async fn missing_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![write(dir.path(), "a.md", "# A")];
    let err = convert_batch(
        &inputs,
        "md_to_html",
        dir.path().join("nope"),
        &ConversionConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ConvertError::OutputDirMissing { .. }));
}

#[tokio::test]
async fn empty_batch_is_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = convert_batch(&[], "md_to_html", dir.path(), &ConversionConfig::default())
        .await
        .unwrap();
    assert!(output.files.is_empty());
    assert_eq!(output.stats.converted, 0);
}

#[tokio::test]
async fn batch_output_serialises() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![write(dir.path(), "a.yaml", "k: v\n")];
    let output = convert_batch(&inputs, "yaml_to_json", dir.path(), &ConversionConfig::default())
        .await
        .unwrap();
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["conversion"], "yaml_to_json");
    assert_eq!(json["files"][0]["output"], "a.json");
    assert!(json["files"][0].get("error").is_none());
}

#[tokio::test]
async fn shared_base_name_keeps_first_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("a")).unwrap();
    std::fs::create_dir(dir.path().join("b")).unwrap();
    let inputs = vec![
        write(&dir.path().join("a"), "x.csv", "v\n1\n"),
        write(&dir.path().join("b"), "x.csv", "v\n2\n"),
    ];

    let output = convert_batch(&inputs, "csv_to_json", out.path(), &ConversionConfig::default())
        .await
        .unwrap();

    assert_eq!(output.files[0].output.as_deref(), Some("x.json"));
    assert!(output.files[0].is_success());
    assert!(output.files[1].output.is_none());
    match &output.files[1].error {
        Some(FileError::Conversion { detail, .. }) => {
            assert!(detail.contains("x.json already produced by input #0"), "{detail}")
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(output.stats.converted, 1);
    assert_eq!(output.stats.failed, 1);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.path().join("x.json")).unwrap()).unwrap();
    assert_eq!(written, serde_json::json!([{"v": 1}]));
}
