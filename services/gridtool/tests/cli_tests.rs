//! End-to-end tests running the gridtool binary.

use std::process::{Command, Output};

use test_utils::fixtures::ascii;
use test_utils::{create_gaussian_density, temp_test_dir, write_fixture};

fn gridtool(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gridtool"))
        .args(args)
        .env_remove("GRID_SEARCH_DISTANCE")
        .env_remove("GRID_DOWNSAMPLE_FACTOR")
        .env_remove("GRID_HULL_BOUNDARY")
        .env_remove("GRID_HULL_RESOLUTION")
        .output()
        .expect("failed to run gridtool")
}

#[test]
fn test_corners_prints_json() {
    let output = gridtool(&[
        "corners",
        "--x",
        "0",
        "--y",
        "1000000",
        "--nx",
        "200",
        "--ny",
        "100",
        "--pixel-width",
        "500",
        "--corner",
        "top_left",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let corners: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(corners["bottom_right"], serde_json::json!([100000.0, 950000.0]));
    assert_eq!(corners["top_left"], serde_json::json!([0.0, 1000000.0]));
}

#[test]
fn test_negative_anchor_accepted() {
    let output = gridtool(&[
        "corners",
        "--x",
        "-800000",
        "--y",
        "-3400000",
        "--nx",
        "301",
        "--ny",
        "561",
        "--pixel-width",
        "500",
        "--corner",
        "lower_left",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let corners: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(corners["bottom_left"], serde_json::json!([-800000.0, -3400000.0]));
}

#[test]
fn test_anchor_defaults_to_top_left() {
    let output = gridtool(&[
        "corners", "--x", "0", "--y", "1000", "--nx", "4", "--ny", "2", "--pixel-width", "10",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let corners: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(corners["top_left"], serde_json::json!([0.0, 1000.0]));
    assert_eq!(corners["bottom_left"], serde_json::json!([0.0, 980.0]));
}

#[test]
fn test_unknown_corner_fails() {
    let output = gridtool(&[
        "corners",
        "--x",
        "0",
        "--y",
        "0",
        "--nx",
        "10",
        "--ny",
        "10",
        "--pixel-width",
        "1",
        "--corner",
        "upper_right",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("upper_right"));
}

#[test]
fn test_grid_conflicts_with_explicit_geometry() {
    let dir = temp_test_dir();
    let grid = write_fixture(&dir, "small.asc", ascii::SMALL_CORNER);
    let output = gridtool(&["corners", "--grid", grid.to_str().unwrap(), "--nx", "3"]);
    assert!(!output.status.success());
}

#[test]
fn test_mesh_from_grid_file() {
    let dir = temp_test_dir();
    let grid = write_fixture(&dir, "small.asc", ascii::SMALL_CORNER);
    let out = dir.path().join("mesh.xyz");

    let output = gridtool(&[
        "mesh",
        "--grid",
        grid.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = std::fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("x,y,z"));
    assert_eq!(lines.next(), Some("105.000000,225.000000,1.00"));
    assert_eq!(text.lines().count(), 12);
}

#[test]
fn test_config_file_sets_defaults() {
    let dir = temp_test_dir();
    let config = write_fixture(&dir, "gridtool.yaml", "downsample_factor: 3\n");
    let grid = write_fixture(
        &dir,
        "grid.asc",
        "ncols 6\nnrows 3\nxllcorner 0\nyllcorner 0\ncellsize 1\n\
         1 1 1 2 2 2\n1 1 1 2 2 2\n1 1 1 2 2 2\n",
    );
    let out = dir.path().join("coarse.asc");

    let output = gridtool(&[
        "--config",
        config.to_str().unwrap(),
        "downsample",
        "-i",
        grid.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("ncols        2\n"));
    assert!(text.contains("cellsize     3\n"));
    assert!(text.ends_with("1 2\n"));
}

#[test]
fn test_hull_writes_boundary_vertices() {
    let dir = temp_test_dir();
    let text: String = create_gaussian_density(41, 25.0, 100.0)
        .into_iter()
        .map(|(x, y, d)| format!("{} {} {:e}\n", x, y, d))
        .collect();
    let density = write_fixture(&dir, "density.txt", &text);
    let out = dir.path().join("hull.xyz");

    let output = gridtool(&[
        "hull",
        "--density",
        density.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--boundary",
        "-2",
        "--resolution",
        "41",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("x,y,z\n"));
    assert!(text.lines().count() > 20);
    assert!(text.lines().skip(1).all(|l| l.ends_with(",-2.00")));
}
