//! Integration tests for the CLI render subcommand

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const TEMPLATE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");
const PETSTORE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/petstore.yaml");

fn render(output_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("specforge").unwrap();
    cmd.env_remove("SPECFORGE_TEMPLATE_DIR")
        .env_remove("SPECFORGE_OUTPUT_DIR")
        .args([
            "render",
            "--template",
            "openapi-go-client",
            "--spec",
            PETSTORE,
            "--template-dir",
            TEMPLATE_DIR,
            "--output-dir",
        ])
        .arg(output_dir);
    cmd
}

fn json_report(cmd: &mut Command) -> Value {
    let output = cmd.args(["--format", "json"]).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

fn count_state(report: &Value, state: &str) -> usize {
    report["files"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["state"] == state)
        .count()
}

#[test]
fn test_render_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("client");

    render(&output_dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("models/Pet.go (model.go.tera)"))
        .stdout(predicate::str::contains("api/operations/listPets.go"))
        .stdout(predicate::str::contains(
            "0 rendered, 12 dry-run, 0 skipped-by-name, 0 skipped-by-scope",
        ));

    assert!(!output_dir.exists());
}

#[test]
fn test_render_writes_files() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path();

    render(output_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("12 rendered"));

    let go_mod = fs::read_to_string(output_dir.join("go.mod")).unwrap();
    assert!(go_mod.contains("module example.com/swagger-petstore"));

    let pet = fs::read_to_string(output_dir.join("models/Pet.go")).unwrap();
    assert!(pet.contains("type Pet struct {"));
    assert!(pet.contains("Id int64 `json:\"id\"`"));
    assert!(pet.contains("Tag string `json:\"tag,omitempty\"`"));
    assert!(pet.starts_with("// Code generated by specforge from Swagger Petstore 1.0.0"));

    let status = fs::read_to_string(output_dir.join("models/pet_status_enum.go")).unwrap();
    assert!(status.contains("PetStatusAvailable PetStatus = \"available\""));

    let pets = fs::read_to_string(output_dir.join("api/pets.go")).unwrap();
    assert!(pets.contains("type PetsService struct{}"));
    assert!(pets.contains("func (s *PetsService) ShowPetById() error"));

    let operation = fs::read_to_string(output_dir.join("api/operations/getInventory.go")).unwrap();
    assert!(operation.contains("const GetInventoryMethod = \"GET\""));

    let client = fs::read_to_string(output_dir.join("client.go")).unwrap();
    assert!(client.contains("// CreatePet: POST /pets"));
}

#[test]
fn test_render_json_report_with_filters() {
    let temp_dir = TempDir::new().unwrap();

    let report = json_report(
        render(temp_dir.path())
            .args(["--type", "model_each", "--ignore", "Pet.go", "--ignore", "go.mod"]),
    );

    assert_eq!(report["template"], "openapi-go-client");
    assert_eq!(report["files"].as_array().unwrap().len(), 12);
    assert_eq!(count_state(&report, "rendered"), 2);
    assert_eq!(count_state(&report, "skipped-by-name"), 2);
    assert_eq!(count_state(&report, "skipped-by-scope"), 8);
    assert_eq!(report["summary"]["skippedByScope"], 8);

    let first = &report["files"][0];
    assert_eq!(first["templateFile"], "go.mod.tera");
    assert_eq!(first["state"], "skipped-by-name");

    assert!(temp_dir.path().join("models/Order.go").exists());
    assert!(!temp_dir.path().join("models/Pet.go").exists());
    assert!(!temp_dir.path().join("go.mod").exists());
}

#[test]
fn test_render_scope_only_dry_run() {
    let temp_dir = TempDir::new().unwrap();

    let report = json_report(
        render(temp_dir.path()).args(["--dry-run", "--type", "support_once", "--type", "enum_each"]),
    );

    assert_eq!(count_state(&report, "dry-run"), 2);
    assert_eq!(count_state(&report, "skipped-by-scope"), 10);
    assert_eq!(count_state(&report, "rendered"), 0);
}

#[test]
fn test_render_rejects_unknown_type() {
    let temp_dir = TempDir::new().unwrap();

    render(temp_dir.path())
        .args(["--type", "schema_each"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown template type 'schema_each'"));
}

#[test]
fn test_render_missing_spec() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("specforge").unwrap();
    cmd.args([
        "render",
        "--template",
        "openapi-go-client",
        "--spec",
        "missing.yaml",
        "--template-dir",
        TEMPLATE_DIR,
        "--output-dir",
    ])
    .arg(temp_dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load specification from missing.yaml"));
}
