//! Loading programs, points-to facts and configuration from files

use crate::common::*;
use pretty_assertions::assert_eq;
use racegraph_ir::config::{AnalysisConfig, ConfigError};
use racegraph_ir::features::points_to::{PointsToProvider, StaticPointsTo};
use racegraph_ir::features::race_detection::RaceAnalysis;
use racegraph_ir::shared::models::{Module, ModuleBuilder};
use racegraph_ir::RaceGraphError;
use std::io::Write;
use tempfile::NamedTempFile;

const COUNTER_MODULE: &str = r#"{
    "name": "counter.c",
    "functions": [
        {"name": "worker", "body": [
            {"id": 0, "op": "load", "ptr": 1, "location": {"file": "counter.c", "line": 4, "column": 5}},
            {"id": 1, "op": "store", "ptr": 1, "location": {"file": "counter.c", "line": 4, "column": 5}}
        ]},
        {"name": "main", "body": [
            {"id": 2, "op": "call", "callee": {"direct": "pthread_create"},
             "args": [{"value": 0}, "null", {"function": "worker"}, "null"]},
            {"id": 3, "op": "store", "ptr": 1, "location": {"file": "counter.c", "line": 9, "column": 5}},
            {"id": 4, "op": "call", "callee": {"direct": "pthread_join"}, "args": [{"value": 0}, "null"]}
        ]},
        {"name": "pthread_create"},
        {"name": "pthread_join"}
    ]
}"#;

const COUNTER_POINTS_TO: &str = r#"{
    "objects": ["thread", "counter"],
    "values": [
        {"value": 0, "objects": [0]},
        {"value": 1, "objects": [1]}
    ]
}"#;

#[test]
fn test_analyze_json_program() {
    let module = Module::from_json(COUNTER_MODULE).unwrap();
    let pts = StaticPointsTo::from_json(COUNTER_POINTS_TO).unwrap();
    let config = AnalysisConfig::default();

    let races = RaceAnalysis::new(&module, &pts, &config).run().unwrap();
    assert_race_count(&races, 2);
    assert_race_between_lines(&races, 4, 9);
    assert!(races.iter().all(|race| pts.describe(race.abstract_object).as_deref() == Some("counter")));

    let summary = RaceAnalysis::summarize(&races);
    assert_eq!(summary.high, 1);
    assert_eq!(summary.medium, 1);
    assert_eq!(summary.objects, 1);
}

#[test]
fn test_json_files_on_disk() {
    let mut module_file = NamedTempFile::new().unwrap();
    module_file.write_all(COUNTER_MODULE.as_bytes()).unwrap();
    let mut pts_file = NamedTempFile::new().unwrap();
    pts_file.write_all(COUNTER_POINTS_TO.as_bytes()).unwrap();

    let module = Module::from_json_file(module_file.path()).unwrap();
    let pts = StaticPointsTo::from_json_file(pts_file.path()).unwrap();
    assert_eq!(module.name(), "counter.c");
    assert!(!RaceAnalysis::new(&module, &pts, &AnalysisConfig::default())
        .run()
        .unwrap()
        .is_empty());
}

#[test]
fn test_duplicate_instruction_ids_rejected() {
    let json = r#"{
        "name": "dup.c",
        "functions": [
            {"name": "main", "body": [
                {"id": 0, "op": "other"},
                {"id": 0, "op": "other"}
            ]}
        ]
    }"#;
    assert!(Module::from_json(json).is_err());
}

#[test]
fn test_yaml_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "version: 1\npreset: fast\nentry: start\nopenmp:\n  team_size: 3\n"
    )
    .unwrap();

    let config = AnalysisConfig::from_yaml(file.path()).unwrap();
    assert_eq!(config.entry, "start");
    assert_eq!(config.openmp.team_size, 3);
    // fast preset keeps its thread cap
    assert_eq!(config.max_threads, 256);

    let mut mb = ModuleBuilder::new("start.c");
    let x = mb.value();
    mb.function(".omp_outlined.", |f| {
        f.store(x);
    });
    mb.function("start", |f| {
        omp_parallel(f, ".omp_outlined.");
    });
    let fixture = Fixture::distinct(mb.build(), &[x]);
    assert_eq!(fixture.trace(&config).thread_count(), 4);
    assert_race_count(&fixture.races_with(&config), 1);
}

#[test]
fn test_yaml_without_version_rejected() {
    let err = AnalysisConfig::from_yaml_str("preset: fast\n").unwrap_err();
    assert!(matches!(err, ConfigError::MissingVersion));
}

#[test]
fn test_invalid_config_fails_analysis() {
    let mut mb = ModuleBuilder::new("empty.c");
    mb.function("main", |f| {
        f.other();
    });
    let fixture = Fixture::distinct(mb.build(), &[]);

    let config = AnalysisConfig::default().with_team_size(1);
    let err = RaceAnalysis::new(&fixture.module, &fixture.pts, &config)
        .run()
        .unwrap_err();
    assert!(matches!(err, RaceGraphError::Config(ConfigError::Range { .. })));
}
