//! Planning without writing: plan summaries, spec files and config checks.

use pagewielder::config::{Config, SpecFile};
use pagewielder::engine::{Engine, OperationSpec, Transform};
use pagewielder::utils::expand_spec_globs;
use tempfile::TempDir;

use crate::common::{spec, temp_output_path, write_pdf};

#[test]
fn test_plan_summary_lists_every_output_page() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 4);
    let b = write_pdf(&temp_dir, "b.pdf", 2);

    let mut engine = Engine::new();
    engine
        .parse([spec(&a, "4-3"), spec(&b, "end@r270"), spec(&a, "1@delete")])
        .unwrap();
    engine.build_plan().unwrap();
    let summary = engine.plan_summary().unwrap();

    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.inputs.len(), 2);
    assert_eq!(summary.inputs[0].page_count, Some(4));
    assert_eq!(summary.inputs[0].pages_used, 2);
    assert_eq!(summary.inputs[1].pages_used, 1);

    let pages: Vec<(usize, &str)> = summary
        .pages
        .iter()
        .map(|p| (p.page, p.transform.as_str()))
        .collect();
    assert_eq!(pages, vec![(4, "identity"), (3, "identity"), (2, "rotate270")]);
}

#[test]
fn test_plan_summary_json() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 2);

    let mut engine = Engine::new();
    engine.parse([spec(&a, "2@r90")]).unwrap();
    engine.build_plan().unwrap();

    let json = serde_json::to_value(engine.plan_summary().unwrap()).unwrap();
    assert_eq!(json["total_pages"], 1);
    assert_eq!(json["pages"][0]["output_page"], 1);
    assert_eq!(json["pages"][0]["page"], 2);
    assert_eq!(json["pages"][0]["transform"], "rotate90");
}

#[test]
fn test_planning_does_not_create_output() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 2);
    let output = temp_dir.path().join("never.pdf");

    let mut engine = Engine::new();
    engine.parse([spec(&a, "")]).unwrap();
    engine.build_plan().unwrap();

    assert!(!output.exists());
}

#[tokio::test]
async fn test_spec_file_appended_after_cli_specs() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 3);
    let spec_path = temp_dir.path().join("ops.json");
    std::fs::write(
        &spec_path,
        serde_json::json!({
            "operations": [
                { "input": a, "pages": "3", "rotate": 180 },
                { "input": a, "pages": "1", "delete": true },
            ]
        })
        .to_string(),
    )
    .unwrap();

    let mut specs = vec![OperationSpec::parse(&spec(&a, "1-2")).unwrap()];
    specs.extend(SpecFile::load(&spec_path).await.unwrap().into_specs().unwrap());
    assert_eq!(specs.len(), 3);
    assert_eq!(specs[2].transform, Transform::Delete);

    let mut engine = Engine::new();
    let execution = engine.run(specs).unwrap();
    assert_eq!(execution.statistics.pages_written, 2);
    assert_eq!(execution.statistics.pages_rotated, 1);
}

#[test]
fn test_glob_specs_in_sorted_order() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(&temp_dir, "part2.pdf", 1);
    write_pdf(&temp_dir, "part1.pdf", 2);

    let pattern = temp_dir.path().join("part*.pdf");
    let specs = expand_spec_globs(vec![OperationSpec::new(pattern)]).unwrap();
    assert_eq!(specs.len(), 2);
    assert!(specs[0].input.ends_with("part1.pdf"));

    let execution = Engine::new().run(specs).unwrap();
    assert_eq!(execution.statistics.pages_written, 3);
}

#[test]
fn test_config_rejects_output_equal_to_input() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(&temp_dir, "a.pdf", 1);

    let config = Config {
        operations: vec![OperationSpec::new(&a)],
        output: Some(temp_dir.path().join(".").join("a.pdf")),
        ..Config::default()
    };
    assert!(config.validate().is_err());

    let output = temp_output_path();
    let config = Config {
        output: Some(output.to_path_buf()),
        ..config
    };
    assert!(config.validate().is_ok());
}
