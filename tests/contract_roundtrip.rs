//! End-to-end: build contracts in memory, persist them, diff them.

use std::path::Path;
use std::sync::Arc;

use ngcontract::adapters::memory::{FixedClock, MemoryFileSystem};
use ngcontract::context::ServiceContext;
use ngcontract::contract::builder::{BuildRequest, ContractBuilder};
use ngcontract::diff::{diff_contracts, ChangeType, ContractDiffReport};
use ngcontract::store::{ContractStore, ListFilter};
use pretty_assertions::assert_eq;

const TS: &str = "import { Component, Input, Output, EventEmitter } from '@angular/core';

@Component({
  selector: 'app-tabs',
  templateUrl: './tabs.component.html',
  styleUrls: ['./tabs.component.scss'],
})
export class TabsComponent {
  @Input() active = 0;
  @Output() changed = new EventEmitter<number>();

  select(index: number): void {
    this.changed.emit(index);
  }
}
";

const HTML: &str = "<nav class=\"tabs\">
  @for (tab of tabs; track tab.id) {
    <button class=\"tab\" [class.active]=\"tab.id === active\" (click)=\"select(tab.id)\">{{ tab.label }}</button>
  }
  <ng-content select=\"[tab-extra]\"></ng-content>
</nav>
";

const SCSS: &str = ".tabs {\n  display: flex;\n  .tab { padding: 4px; }\n  .active { font-weight: bold; }\n}\n";

fn context(at: &str, files: &[(&str, String)]) -> ServiceContext {
    let fs = MemoryFileSystem::with_files(files.iter().map(|(p, c)| (*p, c.clone())));
    ServiceContext::with_ports(Box::new(FixedClock::parse(at).unwrap()), Arc::new(fs))
}

fn tabs(ts: &str, html: &str) -> Vec<(&'static str, String)> {
    vec![
        ("/ui/tabs/tabs.component.ts", ts.to_string()),
        ("/ui/tabs/tabs.component.html", html.to_string()),
        ("/ui/tabs/tabs.component.scss", SCSS.to_string()),
    ]
}

async fn build(ctx: &ServiceContext) -> ngcontract::contract::builder::BuiltContract {
    ContractBuilder::new(ctx)
        .build(&BuildRequest::for_class("/ui/tabs/tabs.component.ts"))
        .await
        .unwrap()
}

#[tokio::test]
async fn rebuilding_unchanged_sources_keeps_the_hash() {
    let first = build(&context("2025-06-15T10:00:00Z", &tabs(TS, HTML))).await;
    let second = build(&context("2025-09-01T08:30:00Z", &tabs(TS, HTML))).await;

    assert_eq!(first.hash, second.hash);
    assert!(diff_contracts(&first.contract, &second.contract).unwrap().is_empty());
}

#[tokio::test]
async fn renaming_the_class_only_changes_meta_name() {
    let before = build(&context("2025-06-15T10:00:00Z", &tabs(TS, HTML))).await;
    let renamed = TS.replace("TabsComponent", "TabStripComponent");
    let after = build(&context("2025-06-16T10:00:00Z", &tabs(&renamed, HTML))).await;

    let diffs = diff_contracts(&before.contract, &after.contract).unwrap();

    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].kind, ChangeType::Change);
    assert_eq!(diffs[0].path_string(), "meta.name");
    assert_ne!(before.hash, after.hash);
}

#[tokio::test]
async fn persisted_contracts_diff_like_built_ones() {
    let ctx = context("2025-06-15T10:00:00Z", &tabs(TS, HTML));
    let store = ContractStore::new(&ctx, Path::new("/contracts"));
    let original = build(&ctx).await;
    let saved = store.save(&original.contract).unwrap();

    let trimmed = HTML.replace("  <ng-content select=\"[tab-extra]\"></ng-content>\n", "");
    let later_ctx = context("2025-06-16T10:00:00Z", &tabs(TS, &trimmed));
    let later = build(&later_ctx).await;

    let loaded = store.load(&saved).unwrap();
    let report = ContractDiffReport::new(&diff_contracts(&loaded, &later.contract).unwrap());

    assert_eq!(loaded, original.contract);
    assert!(report.grouping.contains_key("slots"));
    assert!(report.grouping.contains_key("dom"));
    assert!(!report.grouping.contains_key("meta"));
    assert!(report.summary.total_changes >= report.diff.len());
    assert_eq!(store.list(&ListFilter::default()).unwrap().len(), 1);
}

#[tokio::test]
async fn dom_and_styles_sections_are_cross_referenced() {
    let built = build(&context("2025-06-15T10:00:00Z", &tabs(TS, HTML))).await;
    let contract = &built.contract;

    let button = "nav.tabs > button.tab";
    assert!(contract.dom.contains_key(button));
    assert_eq!(contract.dom[button].parent.as_deref(), Some("nav.tabs"));
    assert!(contract.dom[button].structural.is_some());
    assert_eq!(contract.styles.rules[".tabs .tab"].applies_to, vec![button.to_string()]);
    assert_eq!(contract.styles.rules[".tabs .active"].applies_to, vec![button.to_string()]);
    assert!(contract.public_api.properties.contains_key("active"));
    assert!(contract.public_api.events.contains_key("changed"));
    assert!(contract.public_api.methods.contains_key("select"));
    assert_eq!(contract.slots.get("tab-extra").map(String::as_str), Some("[tab-extra]"));
}
