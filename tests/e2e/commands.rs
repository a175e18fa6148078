//! Gallery lifecycle across separate CLI invocations.

use serde_json::Value;

use crate::common::cli::CliRunner;
use crate::common::fixtures::{gif_bytes, jpeg_bytes, png_bytes, write_file};

/// Runner with three images added, plus their ids in stored order.
fn gallery_of_three() -> (CliRunner, Vec<String>) {
    let cli = CliRunner::new();
    let dir = cli.scratch();
    let files = [
        write_file(&dir, "a.png", &png_bytes(1)),
        write_file(&dir, "b.gif", &gif_bytes(2)),
        write_file(&dir, "c.jpg", &jpeg_bytes(3)),
    ];
    for file in &files {
        // One file per batch keeps the stored order predictable.
        cli.add(&[file]).assert_success();
    }
    let ids = cli.list_ids();
    assert_eq!(ids.len(), 3);
    (cli, ids)
}

#[test]
fn reorder_by_index_persists() {
    let (cli, ids) = gallery_of_three();

    let result = cli.run_robot(&["reorder", "2", "0", "1"]);
    result.assert_success();
    let expected = vec![ids[2].clone(), ids[0].clone(), ids[1].clone()];
    assert_eq!(result.json()["order"], Value::from(expected.clone()));
    assert_eq!(cli.list_ids(), expected);
}

#[test]
fn reorder_by_id_prefix() {
    let (cli, ids) = gallery_of_three();
    let prefixes: Vec<&str> = ids.iter().rev().map(|id| &id[..8]).collect();

    let mut args = vec!["reorder"];
    args.extend(prefixes);
    cli.run_robot(&args).assert_success();
    assert_eq!(cli.list_ids(), ids.iter().rev().cloned().collect::<Vec<_>>());
}

#[test]
fn reorder_must_list_every_image() {
    let (cli, ids) = gallery_of_three();

    let result = cli.run_robot(&["reorder", "1", "0"]);
    result.assert_failure();
    let err = result
        .stderr
        .find("{\n")
        .map(|start| serde_json::from_str::<Value>(&result.stderr[start..]).unwrap())
        .expect("no error document on stderr");
    assert_eq!(err["error"], "order_mismatch");
    assert_eq!(err["notice"], "Failed to Save Order.");
    assert_eq!(cli.list_ids(), ids);
}

#[test]
fn move_shifts_the_rest() {
    let (cli, ids) = gallery_of_three();

    cli.run_robot(&["move", "0", "2"]).assert_success();
    assert_eq!(
        cli.list_ids(),
        vec![ids[1].clone(), ids[2].clone(), ids[0].clone()]
    );

    cli.run_robot(&["move", "0", "9"]).assert_failure();
}

#[test]
fn remove_then_re_add_goes_to_end() {
    let cli = CliRunner::new();
    let dir = cli.scratch();
    let a = write_file(&dir, "a.png", &png_bytes(1));
    let b = write_file(&dir, "b.png", &png_bytes(2));
    cli.add(&[&a]).assert_success();
    cli.add(&[&b]).assert_success();
    let ids = cli.list_ids();

    cli.run_robot(&["remove", "0"])
        .assert_success()
        .assert_json_field("/removed", &Value::from(ids[0].clone()))
        .assert_json_field("/summary/count", &Value::from(1));
    cli.add(&[&a]).assert_success();

    assert_eq!(cli.list_ids(), vec![ids[1].clone(), ids[0].clone()]);
}

#[test]
fn export_writes_original_bytes() {
    let cli = CliRunner::new();
    let dir = cli.scratch();
    let bytes = jpeg_bytes(5);
    let jpg = write_file(&dir, "photo.jpg", &bytes);
    cli.add(&[&jpg]).assert_success();
    let id = cli.list_ids().remove(0);

    let out_dir = dir.join("out");
    std::fs::create_dir(&out_dir).unwrap();
    let result = cli.run_robot(&["export", &id[..6], out_dir.to_str().unwrap()]);
    result
        .assert_success()
        .assert_json_field("/bytes", &Value::from(bytes.len()));

    let written = out_dir.join(format!("{id}.jpg"));
    assert_eq!(std::fs::read(written).unwrap(), bytes);

    let named = dir.join("copy.jpg");
    cli.run_robot(&["export", "0", named.to_str().unwrap()])
        .assert_success();
    assert_eq!(std::fs::read(named).unwrap(), bytes);
}

#[test]
fn add_directory_takes_top_level_files_in_name_order() {
    let cli = CliRunner::new();
    let dir = cli.scratch().join("batch");
    std::fs::create_dir_all(dir.join("nested")).unwrap();
    let _ = write_file(&dir, "b.png", &png_bytes(2));
    let _ = write_file(&dir, "a.png", &png_bytes(1));
    let _ = write_file(&dir.join("nested"), "c.png", &png_bytes(3));

    let result = cli.add(&[&dir]);
    result
        .assert_success()
        .assert_json_field("/accepted", &Value::from(2))
        .assert_json_field("/results/0/name", &Value::from("a.png"))
        .assert_json_field("/results/1/name", &Value::from("b.png"));
}

#[test]
fn theme_toggle_persists() {
    let cli = CliRunner::new();
    cli.run_robot(&["theme"])
        .assert_success()
        .assert_json_field("/theme", &Value::from("light"))
        .assert_json_field("/changed", &Value::Bool(false));

    cli.run_robot(&["theme", "toggle"])
        .assert_success()
        .assert_json_field("/theme", &Value::from("dark"));
    cli.run_robot(&["theme", "show"])
        .assert_success()
        .assert_json_field("/theme", &Value::from("dark"));

    cli.run_robot(&["theme", "light"])
        .assert_success()
        .assert_json_field("/theme", &Value::from("light"))
        .assert_json_field("/changed", &Value::Bool(true));
}

#[test]
fn completions_generate_script() {
    let cli = CliRunner::new();
    cli.run(&["completions", "bash"])
        .assert_success()
        .assert_stdout_contains("gallery");
}
