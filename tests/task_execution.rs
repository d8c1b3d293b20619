// tests/task_execution.rs

mod common;
use crate::common::{ConfigurationBuilder, executor_with, init_tracing};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use layerbuild::clean::{CleanStatus, clean, removable_paths};
use layerbuild::config::{Controllers, LayerDescriptor, Styles};
use layerbuild::copy::copy_unprocessed;
use layerbuild::exec::{ToolKind, ToolVerdict};
use layerbuild::fs::{FileSystem, MockFileSystem};
use layerbuild::layer::LayerId;
use layerbuild::resolve::UnresolvedReason;
use layerbuild::tasks::{TaskFailure, TaskResult};

#[tokio::test]
async fn layer_dependent_tasks_skip_while_unset() {
    init_tracing();
    let (mut executor, backend, mut ctx) =
        executor_with(ConfigurationBuilder::new().build(), Arc::new(MockFileSystem::new()));

    for task in ["validateHtml", "compileCss", "validateCss", "lintJs"] {
        let result = executor.run(task, &mut ctx).await.unwrap();
        match result {
            TaskResult::Skipped(unresolved) => {
                assert_eq!(unresolved.reason, UnresolvedReason::LayerUnset, "{task}");
            }
            other => panic!("{task}: expected skip, got {other:?}"),
        }
    }
    assert!(backend.invocations().is_empty());
}

#[tokio::test]
async fn validate_css_after_content_selection_compiles_once() {
    init_tracing();
    let (mut executor, backend, mut ctx) =
        executor_with(ConfigurationBuilder::new().build(), Arc::new(MockFileSystem::new()));

    executor.run("setLayerToContent", &mut ctx).await.unwrap();
    let result = executor.run("validateCSS", &mut ctx).await.unwrap();

    assert_eq!(result, TaskResult::Success);
    assert_eq!(backend.tasks(), vec!["compileCss", "validateCss"]);

    let compile = &backend.invocations()[0];
    assert_eq!(compile.paths.source, PathBuf::from("dev/content-layer/main.scss"));
    assert_eq!(compile.paths.destination, Some(PathBuf::from("dev/content-layer/")));
    assert_eq!(compile.paths.output, Some(PathBuf::from("dev/content-layer/main.css")));
}

#[tokio::test]
async fn validation_reads_the_file_the_compiler_writes() {
    init_tracing();
    let config = ConfigurationBuilder::new()
        .with_layer(
            LayerId::Content,
            LayerDescriptor {
                views: None,
                styles: Some(Styles {
                    source: "scss/main.scss".to_string(),
                    target: "css/site.css".to_string(),
                }),
                controllers: Controllers {
                    main: "main.js".to_string(),
                },
            },
        )
        .build();
    let removable = removable_paths(&config);
    let (mut executor, backend, mut ctx) = executor_with(config, Arc::new(MockFileSystem::new()));

    executor.run("setLayerToContent", &mut ctx).await.unwrap();
    let result = executor.run("validateCss", &mut ctx).await.unwrap();
    assert_eq!(result, TaskResult::Success);

    let calls = backend.invocations();
    let compiled = PathBuf::from("dev/content-layer/css/site.css");
    assert_eq!(calls[0].paths.source, PathBuf::from("dev/content-layer/scss/main.scss"));
    assert_eq!(calls[0].paths.output.as_ref(), Some(&compiled));
    assert_eq!(calls[1].paths.source, compiled);
    assert!(removable.contains(&compiled));
}

#[tokio::test]
async fn failed_compile_aborts_validation() {
    init_tracing();
    let (mut executor, backend, mut ctx) =
        executor_with(ConfigurationBuilder::new().build(), Arc::new(MockFileSystem::new()));
    backend.fail(ToolKind::CssCompiler, "Error: expected \"}\".");

    executor.run("setLayerToContent", &mut ctx).await.unwrap();
    let result = executor.run("validateCss", &mut ctx).await.unwrap();

    assert_eq!(
        result,
        TaskResult::Failed(TaskFailure::Blocked {
            dependency: "compileCss".to_string()
        })
    );
    assert_eq!(backend.tasks(), vec!["compileCss"]);
}

#[tokio::test]
async fn skipped_dependency_reports_requested_task() {
    init_tracing();
    let (mut executor, backend, mut ctx) =
        executor_with(ConfigurationBuilder::new().build(), Arc::new(MockFileSystem::new()));

    executor.run("setLayerToBackend", &mut ctx).await.unwrap();
    match executor.run("validateCss", &mut ctx).await.unwrap() {
        TaskResult::Skipped(unresolved) => {
            assert_eq!(unresolved.task, "validateCss");
            assert_eq!(unresolved.layer, LayerId::Backend);
            assert_eq!(unresolved.reason, UnresolvedReason::NoRoute);
        }
        other => panic!("expected skip, got {other:?}"),
    }
    assert!(backend.invocations().is_empty());
}

#[tokio::test]
async fn timed_out_tool_fails_the_task() {
    init_tracing();
    let (mut executor, backend, mut ctx) =
        executor_with(ConfigurationBuilder::new().build(), Arc::new(MockFileSystem::new()));
    backend.respond(
        ToolKind::JsLinter,
        ToolVerdict::TimedOut {
            after: std::time::Duration::from_secs(2),
        },
    );

    executor.run("setLayerToSettings", &mut ctx).await.unwrap();
    let result = executor.run("lintJs", &mut ctx).await.unwrap();
    assert!(matches!(
        result,
        TaskResult::Failed(TaskFailure::TimedOut {
            tool: ToolKind::JsLinter,
            ..
        })
    ));
}

#[tokio::test]
async fn new_run_repeats_successful_steps() {
    init_tracing();
    let (mut executor, backend, mut ctx) =
        executor_with(ConfigurationBuilder::new().build(), Arc::new(MockFileSystem::new()));

    executor.run("setLayerToSettings", &mut ctx).await.unwrap();
    executor.run("compileCss", &mut ctx).await.unwrap();
    executor.run("compileCss", &mut ctx).await.unwrap();
    assert_eq!(backend.tasks(), vec!["compileCss"]);

    ctx.start_new_run();
    executor.run("compileCss", &mut ctx).await.unwrap();
    assert_eq!(backend.tasks(), vec!["compileCss", "compileCss"]);
}

#[test]
fn clean_reports_each_path_once() {
    let config = ConfigurationBuilder::new().build();
    let fs = MockFileSystem::new();
    fs.add_file("prod/manifest.json", "{}");
    fs.add_file("dev/settings-layer/main.css", "body{}");

    let paths = removable_paths(&config);
    assert_eq!(
        paths,
        vec![
            PathBuf::from("validator-results/"),
            PathBuf::from("prod/"),
            PathBuf::from("dev/content-layer/main.css"),
            PathBuf::from("dev/settings-layer/main.css"),
        ]
    );

    let reports = clean(&fs, &paths);
    assert_eq!(reports.len(), 4);
    assert_eq!(reports.iter().filter(|r| r.was_found()).count(), 2);
    assert!(!fs.exists(Path::new("prod")));
    assert!(!fs.exists(Path::new("dev/settings-layer/main.css")));
}

#[test]
fn clean_keeps_going_after_a_removal_failure() {
    let config = ConfigurationBuilder::new().build();
    let fs = MockFileSystem::new();
    fs.add_dir("validator-results");
    fs.add_dir("prod");
    fs.add_file("dev/content-layer/main.css", "a{}");
    fs.protect("prod");

    let reports = clean(&fs, &removable_paths(&config));
    let statuses: Vec<_> = reports.iter().map(|r| &r.status).collect();

    assert_eq!(statuses[0], &CleanStatus::Removed);
    assert!(matches!(statuses[1], CleanStatus::RemoveFailed(_)));
    assert_eq!(statuses[2], &CleanStatus::Removed);
    assert_eq!(statuses[3], &CleanStatus::NotFound);
}

#[tokio::test]
async fn clean_task_never_touches_tools() {
    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("validator-results/report.txt", "ok");
    let (mut executor, backend, mut ctx) =
        executor_with(ConfigurationBuilder::new().build(), fs.clone());

    let result = executor.run("clean", &mut ctx).await.unwrap();
    assert_eq!(result, TaskResult::Success);
    assert!(backend.invocations().is_empty());
    assert!(!fs.exists(Path::new("validator-results")));
}

#[test]
fn copy_skips_stylesheet_sources() {
    let config = ConfigurationBuilder::new().build();
    let fs = MockFileSystem::new();
    fs.add_file("dev/manifest.json", "{}");
    fs.add_file("dev/.env", "KEY=1");
    fs.add_file("dev/content-layer/index.html", "<html>");
    fs.add_file("dev/content-layer/main.scss", "$c: red;");
    fs.add_file("dev/content-layer/main.css", "a{}");
    fs.add_file("dev/settings-layer/main.scss", "$c: blue;");
    fs.add_file("dev/backend-layer/main.js", "chrome.runtime;");

    let summary = copy_unprocessed(&fs, &config).unwrap();
    assert_eq!(summary.copied, 5);
    assert_eq!(summary.excluded.len(), 2);

    let produced: Vec<_> = fs
        .files()
        .into_iter()
        .filter(|p| p.starts_with("prod"))
        .collect();
    assert_eq!(
        produced,
        vec![
            PathBuf::from("prod/.env"),
            PathBuf::from("prod/backend-layer/main.js"),
            PathBuf::from("prod/content-layer/index.html"),
            PathBuf::from("prod/content-layer/main.css"),
            PathBuf::from("prod/manifest.json"),
        ]
    );
}

#[tokio::test]
async fn copy_task_fails_when_development_folder_is_missing() {
    let (mut executor, _backend, mut ctx) =
        executor_with(ConfigurationBuilder::new().build(), Arc::new(MockFileSystem::new()));

    let result = executor
        .run("copyUnprocessedFilesToProdFolder", &mut ctx)
        .await
        .unwrap();
    assert!(matches!(result, TaskResult::Failed(TaskFailure::Io(_))));
}
