//! Integration tests for top-level CLI behavior.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const CARD_TS: &str = "import { Component, Input } from '@angular/core';

@Component({
  selector: 'app-card',
  templateUrl: './card.component.html',
  styleUrl: './card.component.css',
})
export class CardComponent {
  @Input() title = '';
}
";

const CARD_HTML: &str = "<div class=\"card\">\n  <h2 class=\"title\">{{ title }}</h2>\n</div>\n";

const CARD_CSS: &str = ".card .title { color: red; }\n";

fn run_ngcontract(dir: &Path, args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_ngcontract");
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env("CONTRACT_STORE", dir.join("store"))
        .env_remove("NGCONTRACT_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run ngcontract binary")
}

fn write_card(dir: &Path, class_name: &str) {
    fs::write(dir.join("card.component.ts"), CARD_TS.replace("CardComponent", class_name)).unwrap();
    fs::write(dir.join("card.component.html"), CARD_HTML).unwrap();
    fs::write(dir.join("card.component.css"), CARD_CSS).unwrap();
}

fn saved_path(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().find(|l| l.starts_with("Saved ")).expect("no Saved line");
    line["Saved ".len()..line.rfind(" (").unwrap()].to_string()
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ngcontract(dir.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for command in ["build", "diff", "list"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn list_on_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ngcontract(dir.path(), &["list"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No contracts found"));
}

#[test]
fn build_saves_a_contract() {
    let dir = tempfile::tempdir().unwrap();
    write_card(dir.path(), "CardComponent");

    let output = run_ngcontract(dir.path(), &["build", "--ts", "card.component.ts"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let path = saved_path(&output);
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["meta"]["name"], "CardComponent");
    assert_eq!(json["meta"]["selector"], "app-card");
    assert!(json["hash"].as_str().unwrap().starts_with("sha256:"));
    assert_eq!(json["styles"]["rules"][".card .title"]["appliesTo"], serde_json::json!(["div.card > h2.title"]));

    let listed = run_ngcontract(dir.path(), &["list", "--component", "card"]);
    assert!(String::from_utf8_lossy(&listed.stdout).contains("cardcomponent"));
}

#[test]
fn build_with_a_missing_template_fails_and_names_it() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("card.component.ts"), CARD_TS).unwrap();

    let output = run_ngcontract(dir.path(), &["build", "--ts", "card.component.ts"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("card.component.html"));
    assert!(!dir.path().join("store").exists());
}

#[test]
fn diff_of_a_renamed_component() {
    let dir = tempfile::tempdir().unwrap();
    write_card(dir.path(), "CardComponent");
    let first = saved_path(&run_ngcontract(dir.path(), &["build", "--ts", "card.component.ts"]));
    write_card(dir.path(), "PanelComponent");
    let second = saved_path(&run_ngcontract(dir.path(), &["build", "--ts", "card.component.ts"]));

    let output = run_ngcontract(dir.path(), &["diff", &first, &second]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        report["diff"],
        serde_json::json!([{
            "type": "CHANGE",
            "path": ["meta", "name"],
            "oldValue": "CardComponent",
            "value": "PanelComponent"
        }])
    );
    assert_eq!(report["summary"]["changesByDomain"]["meta"]["CHANGE"], 1);
}

#[test]
fn diff_of_a_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ngcontract(dir.path(), &["diff", "a.contract.json", "b.contract.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("a.contract.json"));
}
