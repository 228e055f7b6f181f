use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const SEAICE: &str = r#"
id: cmip6.seaice
name: seaice
description: Sea ice realm
contact: Ada Lovelace
authors: [Ada Lovelace]
change_history:
  - { version: "0.1.0", date: "2016-05-01", author: Ada Lovelace, note: Initialised }
topics:
  - kind: realm
    id: cmip6.seaice.thermodynamics
    name: thermodynamics
    property_sets:
      - id: cmip6.seaice.thermodynamics.snow
        name: snow
        properties:
          - id: cmip6.seaice.thermodynamics.snow.processes
            name: processes
            cardinality: "1.N"
            type: ENUM
            enum:
              name: snow_process_types
              open: false
              choices:
                - { value: snow aging, description: Aging of the snow pack }
                - { value: snow melting }
          - id: cmip6.seaice.thermodynamics.snow.name
            name: name
            cardinality: "0.1"
            type: str
            injected: true
"#;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cimspec"))
}

fn scaffold() -> Result<(TempDir, PathBuf), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = temp.path().join("seaice.yaml");
    fs::write(&input, SEAICE)?;
    Ok((temp, input))
}

#[test]
fn json_writes_wrapped_document_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp, input) = scaffold()?;
    cli()
        .arg("json")
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("root.specialization = {\"id\":\"cmip6.seaice\""))
        .stdout(contains("\"label\":\"Snow > Processes\""))
        .stdout(contains("\"project\":\"cmip6\""));
    Ok(())
}

#[test]
fn json_bare_honors_project_flag() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp, input) = scaffold()?;
    let assert = cli()
        .args(["--project", "cordex", "json", "--bare"])
        .arg(&input)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let document: serde_json::Value = serde_json::from_str(&stdout)?;
    assert_eq!(document["project"], "cordex");
    assert_eq!(document["subTopics"][0]["properties"][1]["isInjected"], true);
    Ok(())
}

#[test]
fn json_uses_custom_template() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, input) = scaffold()?;
    let template = temp.path().join("wrapper.tmpl");
    fs::write(&template, "export default TOPIC;\n")?;

    cli()
        .arg("json")
        .arg(&input)
        .arg("--template")
        .arg(&template)
        .assert()
        .success()
        .stdout(contains("export default {\"id\":\"cmip6.seaice\""));
    Ok(())
}

#[test]
fn template_without_placeholder_is_a_data_error() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, input) = scaffold()?;
    let template = temp.path().join("wrapper.tmpl");
    fs::write(&template, "nothing to fill\n")?;

    cli()
        .arg("json")
        .arg(&input)
        .arg("--template")
        .arg(&template)
        .assert()
        .failure()
        .code(65)
        .stderr(contains("placeholder 'TOPIC'"));
    Ok(())
}

#[test]
fn mindmap_writes_to_output_file() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, input) = scaffold()?;
    let output = temp.path().join("out").join("seaice.mm");

    cli()
        .arg("mindmap")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(contains("Rendered mindmap for 'cmip6.seaice'"));

    let xml = fs::read_to_string(&output)?;
    assert!(xml.starts_with("<map><node "));
    assert!(xml.contains("TEXT=\"snow aging\""));
    assert!(xml.contains("TEXT=\"LEGEND\""));
    assert!(!xml.contains("TEXT=\"name\""));
    Ok(())
}

#[test]
fn json_flag_reports_a_result_object() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, input) = scaffold()?;
    let output = temp.path().join("seaice.mm");

    let assert = cli()
        .args(["--json", "mindmap"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let report: serde_json::Value = serde_json::from_str(stdout.trim())?;
    assert_eq!(report["type"], "rendered");
    assert_eq!(report["format"], "mindmap");
    assert_eq!(report["specialization"], "cmip6.seaice");
    assert!(report.get("content").is_none());
    Ok(())
}

#[test]
fn style_table_missing_a_section_is_a_config_error() -> Result<(), Box<dyn std::error::Error>> {
    let (temp, input) = scaffold()?;
    let styles = temp.path().join("styles.yaml");
    fs::write(
        &styles,
        "model:\n  bg-color: \"#fff\"\n  font-bold: true\n  font-color: \"#000\"\n  \
         font-name: courier\n  font-size: 14\n  is-collapsed: false\n  description: Model\n",
    )?;

    cli()
        .arg("--style")
        .arg(&styles)
        .arg("mindmap")
        .arg(&input)
        .assert()
        .failure()
        .code(78)
        .stderr(contains("no style configured for section"));
    Ok(())
}

#[test]
fn malformed_document_is_a_data_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = temp.path().join("broken.yaml");
    fs::write(&input, "id: cmip6.broken\nname: broken\ncolour: red\n")?;

    cli()
        .arg("json")
        .arg(&input)
        .assert()
        .failure()
        .code(65)
        .stderr(contains("broken.yaml").and(contains("document error")));
    Ok(())
}

#[test]
fn missing_input_is_an_io_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    cli()
        .arg("mindmap")
        .arg(temp.path().join("absent.yaml"))
        .assert()
        .failure()
        .code(71);
    Ok(())
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    cli().arg("graphviz").assert().failure().code(64);
}

#[test]
fn bare_conflicts_with_template() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp, input) = scaffold()?;
    cli()
        .arg("json")
        .arg(&input)
        .args(["--bare", "--template", "wrapper.tmpl"])
        .assert()
        .failure()
        .code(64);
    Ok(())
}
