//! CLI module tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use super::args::{Args, Command};
use super::commands::{
    best_tour_similarity, check, cost, execute, latex, log_convexity, log_run, similarity,
    tour_costs,
};
use super::output::{costs_agree, TourCosts};
use crate::config::{Config, InstanceConfig};
use crate::error::CheckError;
use crate::nodes::NodeTable;
use crate::record::{ResultRecord, SimilarityRecord};
use crate::similarity::SimilarityMeasure;

const TRIANGLE: &str = "0;0;10\n3;0;20\n3;4;30\n";

fn record(best_fitness: f64) -> ResultRecord {
    ResultRecord {
        method: String::new(),
        timestamp: String::new(),
        best_fitness,
        worst_fitness: 80.0,
        average_fitness: 76.0,
        execution_time: None,
        best_solution: vec![0, 1, 2],
        worst_solution: vec![2, 1, 0],
        fitnesses: None,
        similarities: None,
    }
}

/// Config rooted in `dir` with the triangle as instance `TSPA`.
fn config_in(dir: &Path) -> Config {
    let data = dir.join("TSPA.csv");
    std::fs::write(&data, TRIANGLE).unwrap();

    let mut config = Config::builder()
        .logs_root(dir.join("logs"))
        .captions(false)
        .build();
    config.plot.width = 200;
    config.plot.height = 160;
    config.authority.instances = vec![InstanceConfig {
        key: "TSPA".to_string(),
        pattern: "tspA".to_string(),
        data,
    }];
    config.authority.fallback = "TSPA".to_string();
    config
}

fn subdirs(dir: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

// ============================================================================
// Args parsing tests
// ============================================================================

#[test]
fn test_command_definition_is_valid() {
    Args::command().debug_assert();
}

#[test]
fn test_parse_log() {
    let args = Args::try_parse_from(["tourcheck", "log", "data/TSPA.csv", "out.json", "LS"]).unwrap();
    assert_eq!(args.config, None);
    assert_eq!(
        args.command,
        Command::Log {
            data: PathBuf::from("data/TSPA.csv"),
            results: PathBuf::from("out.json"),
            method: "LS".to_string(),
        }
    );
}

#[test]
fn test_parse_log_missing_argument() {
    let err = Args::try_parse_from(["tourcheck", "log", "data/TSPA.csv", "out.json"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_parse_log_convexity() {
    let args = Args::try_parse_from([
        "tourcheck",
        "log-convexity",
        "data/TSPB.csv",
        "out.json",
        "ls",
        "common_nodes",
        "best",
    ])
    .unwrap();
    match args.command {
        Command::LogConvexity {
            measure, target, ..
        } => {
            assert_eq!(measure, SimilarityMeasure::CommonNodes);
            assert_eq!(target, "best");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_log_convexity_unknown_measure() {
    let result = Args::try_parse_from([
        "tourcheck",
        "log-convexity",
        "d.csv",
        "r.json",
        "ls",
        "jaccard",
        "best",
    ]);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::ValueValidation);
}

#[test]
fn test_parse_check_with_options() {
    let args = Args::try_parse_from([
        "tourcheck",
        "check",
        "logs",
        "--authority-cmd",
        "fitness-oracle",
        "--tolerance",
        "0.5",
        "--config",
        "tourcheck.yaml",
    ])
    .unwrap();
    assert_eq!(args.config, Some(PathBuf::from("tourcheck.yaml")));
    assert_eq!(
        args.command,
        Command::Check {
            root: Some(PathBuf::from("logs")),
            authority_cmd: Some("fitness-oracle".to_string()),
            tolerance: Some(0.5),
        }
    );
}

#[test]
fn test_parse_optional_roots() {
    let args = Args::try_parse_from(["tourcheck", "latex"]).unwrap();
    assert_eq!(args.command, Command::Latex { root: None });

    let args = Args::try_parse_from(["tourcheck", "correlate", "sweep"]).unwrap();
    assert_eq!(
        args.command,
        Command::Correlate {
            base: Some(PathBuf::from("sweep"))
        }
    );
}

#[test]
fn test_parse_unknown_command() {
    let err = Args::try_parse_from(["tourcheck", "plot"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
}

#[test]
fn test_parse_no_command() {
    assert!(Args::try_parse_from(["tourcheck"]).is_err());
}

// ============================================================================
// Command tests
// ============================================================================

#[test]
fn test_log_run_writes_folder() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let results = dir.path().join("raw.json");
    record(72.0).save(&results).unwrap();

    assert!(log_run(&config, &dir.path().join("TSPA.csv"), &results, "greedy").unwrap());

    let runs = subdirs(&config.paths.logs_root);
    assert_eq!(runs.len(), 1);
    let name = runs[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("greedy_"));

    let saved = ResultRecord::load(runs[0].join("results.json")).unwrap();
    assert_eq!(saved.method, "greedy");
    assert_eq!(format!("greedy_{}", saved.timestamp), name);
    assert!(runs[0].join("best_solution.png").exists());
    assert!(runs[0].join("worst_solution.png").exists());
}

#[test]
fn test_log_run_rejects_bad_tour() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let results = dir.path().join("raw.json");
    let mut bad = record(72.0);
    bad.best_solution = vec![0, 3];
    bad.save(&results).unwrap();

    let result = log_run(&config, &dir.path().join("TSPA.csv"), &results, "greedy");
    assert!(matches!(result, Err(CheckError::InvalidTour { index: 3, .. })));
    assert!(!config.paths.logs_root.exists());
}

#[test]
fn test_log_convexity_layout() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let results = dir.path().join("conv.json");
    let raw = SimilarityRecord {
        method: String::new(),
        timestamp: String::new(),
        fitnesses: vec![10.0, 11.0, 12.0],
        similarities: vec![0.8, 0.6, 0.5],
    };
    raw.save(&results).unwrap();

    let ok = log_convexity(
        &config,
        Path::new("data/TSPB.csv"),
        &results,
        "ls",
        SimilarityMeasure::CommonEdges,
        "average",
    )
    .unwrap();
    assert!(ok);

    let runs = subdirs(&config.paths.logs_root);
    assert_eq!(runs.len(), 1);
    let leaf = runs[0].join("TSPB").join("common_edges_average");
    assert!(leaf.join("similarity_vs_fitness.png").exists());
    let saved = SimilarityRecord::load(leaf.join("results.json")).unwrap();
    assert_eq!(saved.method, "ls");
    assert_eq!(saved.fitnesses, raw.fitnesses);
}

#[test]
fn test_latex_over_tree() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let run = config.paths.logs_root.join("greedy_1018_1200");
    std::fs::create_dir_all(&run).unwrap();
    record(72.0).stamped("greedy", "1018_1200").save(run.join("results.json")).unwrap();

    assert!(latex(&config, None).unwrap());
    let tex = std::fs::read_to_string(run.join("results.tex")).unwrap();
    assert!(tex.contains("Results for Greedy"));
}

#[test]
fn test_latex_missing_root() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let result = latex(&config, Some(&dir.path().join("absent")));
    assert!(matches!(result, Err(CheckError::InvalidInput(_))));
}

#[test]
fn test_check_with_objective_authority() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let root = config.paths.logs_root.clone();
    for (instance, fitness) in [("tspA", 72.0), ("tspA_bad", 71.0)] {
        let folder = root.join(instance);
        std::fs::create_dir_all(&folder).unwrap();
        record(fitness).stamped("greedy_cycle", "0101_0000").save(folder.join("results.json")).unwrap();
    }

    let consistent = check(&config, None, None, None).unwrap();
    assert!(!consistent);

    let csv = std::fs::read_to_string(root.join("fitness_comparison_table.csv")).unwrap();
    assert!(csv.contains("Greedy Cycle,tspA,72,72,true"));
    assert!(csv.contains("Greedy Cycle,tspA_bad,71,72,false"));
    assert!(root.join("fitness_comparison_table.tex").exists());

    // A tolerance of one makes the second row match as well.
    assert!(check(&config, None, None, Some(1.0)).unwrap());
}

#[test]
fn test_check_rejects_negative_tolerance() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::create_dir_all(&config.paths.logs_root).unwrap();
    let result = check(&config, None, None, Some(-1.0));
    assert!(matches!(result, Err(CheckError::InvalidInput(_))));
}

#[test]
fn test_cost_command() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("TSPA.csv");
    std::fs::write(&data, TRIANGLE).unwrap();
    let results = dir.path().join("r.json");
    record(72.0).save(&results).unwrap();
    assert!(cost(&data, &results).unwrap());
}

#[test]
fn test_tour_costs() {
    let nodes = NodeTable::from_csv_str(TRIANGLE).unwrap();
    let costs = tour_costs(&nodes, &[0, 1, 2], 72.0).unwrap();
    assert!((costs.length - 12.0).abs() < 1e-9);
    // Each node is an endpoint of two edges.
    assert!((costs.with_node_cost - 132.0).abs() < 1e-9);
    assert!((costs.objective - 72.0).abs() < 1e-9);
    assert!(costs_agree(&costs));

    let off = TourCosts {
        declared: 70.0,
        ..costs
    };
    assert!(!costs_agree(&off));
}

#[test]
fn test_similarity_command() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    record(1.0).save(&a).unwrap();
    record(2.0).save(&b).unwrap();
    assert!(similarity(&a, &b, false).unwrap());
    assert!(similarity(&a, &b, true).unwrap());
    assert!(similarity(&a, &dir.path().join("missing.json"), false).is_err());
}

#[test]
fn test_parse_similarity_per_step() {
    let args = Args::try_parse_from(["tourcheck", "similarity", "a.json", "b.json", "--per-step"]).unwrap();
    assert_eq!(
        args.command,
        Command::Similarity {
            a: PathBuf::from("a.json"),
            b: PathBuf::from("b.json"),
            per_step: true,
        }
    );
}

#[test]
fn test_best_tour_similarity_divisors() {
    // Same three-node best tour on both sides.
    let a = record(1.0);
    let b = record(2.0);

    let (edges, nodes) = best_tour_similarity(&a, &b, false);
    assert!((edges - 1.0).abs() < 1e-12);
    assert!((nodes - 1.0).abs() < 1e-12);

    // Three shared edges over two steps.
    let (edges, nodes) = best_tour_similarity(&a, &b, true);
    assert!((edges - 1.5).abs() < 1e-12);
    assert!((nodes - 1.0).abs() < 1e-12);
}

#[test]
fn test_execute_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = dir.path().join("tourcheck.yaml");
    std::fs::write(&yaml, "paths:\n  logs_root: \"/nonexistent/tourcheck-logs\"\n").unwrap();

    let args = Args::try_parse_from([
        "tourcheck",
        "--config",
        yaml.to_str().unwrap(),
        "latex",
    ])
    .unwrap();
    // The configured root does not exist.
    assert!(matches!(execute(&args), Err(CheckError::InvalidInput(_))));
}

#[test]
fn test_execute_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = dir.path().join("bad.yaml");
    std::fs::write(&yaml, "plotting: {}\n").unwrap();
    let args = Args::try_parse_from(["tourcheck", "latex", "--config", yaml.to_str().unwrap()]).unwrap();
    assert!(execute(&args).is_err());
}
