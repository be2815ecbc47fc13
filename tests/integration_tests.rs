//! End-to-end tests over synthetic result-set directories.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use fleet_stats::discover::{Classifier, Family};
use fleet_stats::occupancy::default_windows;
use fleet_stats::report::analyze_result_set;

fn temp_root(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("fleet_stats_e2e_{name}"));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// A DRT-style run: iteration directories plus semicolon-delimited stats.
fn write_drt_run(root: &Path) {
    let run = root.join("DRT");
    let output = run.join("output");

    for it in ["it.0", "it.3"] {
        fs::create_dir_all(output.join("ITERS").join(it)).unwrap();
    }
    fs::write(
        output.join("ITERS/it.3/3.drt_occupancy_time_profiles_av.txt"),
        "time\t0 pax\t1 pax\tstay\n\
         x\t5\t3\t2\n\
         x\t4\t4\t2\n",
    )
    .unwrap();

    fs::write(
        output.join("drt_vehicle_stats_av.csv"),
        "iteration;totalDistance;totalEmptyDistance;emptyRatio\n\
         0;9000;3000;0.33\n\
         3;12000;2400;0.2\n",
    )
    .unwrap();
    fs::write(
        output.join("drt_customer_stats_av.csv"),
        "iteration;wait_average;wait_p95\n0;400;900\n3;320.5;810.0\n",
    )
    .unwrap();
}

/// An AMOD-style run: headerless CSVs with description sidecars.
fn write_amod_run(root: &Path) {
    let run = root.join("HighCapacityDispatcher");
    let data = run.join("output").join("data");
    fs::create_dir_all(&data).unwrap();

    // 8-column status distribution sampled every 10 s; 0 pax must absorb
    // the rebalance counts during normalization.
    let status = "0,0,1,2,6,1,3,0\n".repeat(4000);
    fs::write(data.join("statusDistributionNumPassengers"), status).unwrap();

    let dist_dir = data.join("DistancesOverDay");
    fs::create_dir_all(&dist_dir).unwrap();
    fs::write(
        dist_dir.join("description.csv"),
        "\"total distance, pickup distance, rebalancing distance\"\n",
    )
    .unwrap();
    fs::write(
        dist_dir.join("DistancesOverDay.csv"),
        "4.0,0.5,0.1\n6.0,0.7,0.2\n",
    )
    .unwrap();

    let rtt_dir = data.join("RequestTravelTimes");
    fs::create_dir_all(&rtt_dir).unwrap();
    fs::write(
        rtt_dir.join("description.csv"),
        "\"submission time, pickup time, dropoff time\"\n",
    )
    .unwrap();
    fs::write(
        rtt_dir.join("RequestTravelTimes.csv"),
        "0,100,500\n10,210,600\n20,320,700\n30,430,800\n",
    )
    .unwrap();
}

#[test]
fn test_full_result_set_report() {
    let root = temp_root("full");
    write_drt_run(&root);
    write_amod_run(&root);

    let report = analyze_result_set(&root, &Classifier::default(), &default_windows()).unwrap();

    assert_eq!(report.run_id, root.file_name().unwrap().to_str().unwrap());
    assert!(report.failures.is_empty());
    assert_eq!(report.runs.len(), 2);

    let drt = &report.runs["DRT"];
    assert_eq!(drt.family, Family::Drt);
    assert_eq!(drt.distances.total_distance, 12000.0);
    assert_eq!(drt.distances.total_empty_distance, 2400.0);
    assert_eq!(drt.waits.mean_wait, 320.5);
    assert_eq!(drt.waits.p95_wait, 810.0);

    let amod = &report.runs["HighCapacityDispatcher"];
    assert_eq!(amod.family, Family::Amod);
    assert!((amod.distances.total_distance - 10_000.0).abs() < 1e-9);
    assert!((amod.distances.total_empty_distance - 1_500.0).abs() < 1e-9);
    assert!((amod.distances.empty_ratio - 0.15).abs() < 1e-9);
    assert!((amod.waits.mean_wait - 250.0).abs() < 1e-9);
    assert!((amod.waits.p95_wait - 385.0).abs() < 1e-9);

    // The AMOD status file covers the morning window (4000 rows * 10 s), so
    // the morning composition is defined and sums to 1.
    let morning = amod
        .occupancy
        .iter()
        .find(|c| c.window == "morning")
        .unwrap();
    let total: f64 = morning.shares.iter().map(|s| s.share).sum();
    assert!((total - 1.0).abs() < 1e-9);

    // After rebalance folding every row has 0 pax = 6 + 1. Composition
    // columns per row: 2 pax=1, 1 pax=2, 0 pax=7, stay=3 -> share 7/13.
    let zero_share = morning
        .shares
        .iter()
        .find(|s| s.state == "0 pax")
        .unwrap()
        .share;
    assert!((zero_share - 7.0 / 13.0).abs() < 1e-9);

    // The evening window lies beyond the series; its shares are NaN, not 0.
    let evening = amod
        .occupancy
        .iter()
        .find(|c| c.window == "evening")
        .unwrap();
    assert!(evening.shares.iter().all(|s| s.share.is_nan()));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_broken_run_is_isolated() {
    let root = temp_root("broken");
    write_drt_run(&root);
    // A run directory with no output at all.
    fs::create_dir_all(root.join("TShareDispatcher")).unwrap();

    let report = analyze_result_set(&root, &Classifier::default(), &default_windows()).unwrap();

    assert_eq!(report.runs.len(), 1);
    assert!(report.runs.contains_key("DRT"));
    assert!(report.failures.contains_key("TShareDispatcher"));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_strict_classifier_rejects_unknown_run_dir() {
    let root = temp_root("strict");
    write_drt_run(&root);
    fs::create_dir_all(root.join("MysteryDispatcher")).unwrap();

    let result = analyze_result_set(&root, &Classifier::strict(), &default_windows());
    assert!(result.is_err());

    fs::remove_dir_all(&root).unwrap();
}
