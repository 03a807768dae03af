//! End-to-end pipeline tests: entities, search stage, classification, report.
//!
//! Search, article fetch and the language model are all doubles from
//! `mediascreen_scout::testing`. No network.

use std::sync::Arc;

use mediascreen_common::{Classification, Entity};
use mediascreen_scout::testing::{hit, verdict_json, MockArticles, MockSearcher, ScriptedModel};
use mediascreen_scout::{EntityScreener, ScreeningOrchestrator, VerdictClassifier};

fn keywords() -> Vec<String> {
    ["money laundering", "fraud", "corruption"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

fn acme() -> Entity {
    Entity::parse("Acme Corp").unwrap()
}

// ---------------------------------------------------------------------------
// Acme Corp: 2 dated + 1 undated, newest flagged
// ---------------------------------------------------------------------------

#[tokio::test]
async fn acme_corp_end_to_end() {
    let searcher = MockSearcher::new()
        .on_search(
            "Acme Corp",
            "fraud",
            vec![
                hit("Acme Corp", "fraud", "https://news.example/old", Some("2024-01-01")),
                hit("Acme Corp", "fraud", "https://blog.example/undated", None),
            ],
        )
        .on_search(
            "Acme Corp",
            "corruption",
            vec![hit("Acme Corp", "corruption", "https://news.example/new", Some("2024-06-01"))],
        )
        .failing("Acme Corp", "money laundering", 503);

    let articles = MockArticles::new()
        .on_page("https://news.example/new", "Acme Corp charged in bribery inquiry.")
        .on_page("https://news.example/old", "Acme Corp opens a new office.")
        .on_page("https://blog.example/undated", "Acme Corporation recipes blog.");

    let model = ScriptedModel::new()
        .on_prompt_containing(
            "bribery inquiry",
            &format!(
                "Sure! Here is the result: {} Let me know if you need more.",
                verdict_json(true, "Charged with bribery")
            ),
        )
        .on_prompt_containing("new office", &verdict_json(false, "Routine business news"))
        .on_prompt_containing("recipes blog", &verdict_json(false, "Unrelated blog"));

    let screener = EntityScreener::new(Arc::new(searcher), keywords(), 3, 10);
    let classifier = VerdictClassifier::new(Arc::new(articles), Arc::new(model));
    let orchestrator = ScreeningOrchestrator::new(screener, classifier);

    let mut progress = Vec::new();
    let report = orchestrator
        .run(&[acme()], &mut |done: usize, total: usize| progress.push((done, total)))
        .await;

    let links: Vec<_> = report.verdicts.iter().map(|v| v.link.as_str()).collect();
    assert_eq!(
        links,
        vec![
            "https://news.example/new",
            "https://news.example/old",
            "https://blog.example/undated",
        ]
    );

    let negatives: Vec<_> = report
        .verdicts
        .iter()
        .filter(|v| v.classification == Classification::Negative)
        .collect();
    assert_eq!(negatives.len(), 1);
    assert_eq!(negatives[0].link, "https://news.example/new");
    assert_eq!(negatives[0].reason, "Charged with bribery");

    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(
        report.summary().to_string(),
        "Entities processed: 1 | Articles retrieved: 3 | Articles screened: 3 | Negative articles: 1 | False hits: 2"
    );
}

// ---------------------------------------------------------------------------
// Skips degrade to fewer rows, never to an abort
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_failure_kind_only_drops_its_candidate() {
    let searcher = MockSearcher::new().on_search(
        "Acme Corp",
        "fraud",
        vec![
            hit("Acme Corp", "fraud", "https://a/unreachable", Some("2024-05-01")),
            hit("Acme Corp", "fraud", "https://a/model-down", Some("2024-04-01")),
            hit("Acme Corp", "fraud", "https://a/garbled", Some("2024-03-01")),
        ],
    )
    .on_search(
        "Acme Corp",
        "corruption",
        vec![hit("Acme Corp", "corruption", "https://a/good", None)],
    );

    let articles = MockArticles::new()
        .on_page("https://a/model-down", "outage article")
        .on_page("https://a/garbled", "garbled article")
        .on_page("https://a/good", "good article");

    let model = ScriptedModel::new()
        .failing_on("outage article", 500)
        .on_prompt_containing("garbled article", "IsNegative: yes, definitely")
        .on_prompt_containing("good article", &verdict_json(true, "Sanctioned"));

    let screener = EntityScreener::new(Arc::new(searcher), keywords(), 3, 10);
    let classifier = VerdictClassifier::new(Arc::new(articles), Arc::new(model));
    let orchestrator = ScreeningOrchestrator::new(screener, classifier);

    let mut calls = 0;
    let report = orchestrator
        .run(&[acme()], &mut |_: usize, _: usize| calls += 1)
        .await;

    assert_eq!(calls, 4);
    assert_eq!(report.len(), 1);
    assert_eq!(report.verdicts[0].link, "https://a/good");
    assert_eq!(report.summary().articles_retrieved, 4);
}

// ---------------------------------------------------------------------------
// Windowing across entities
// ---------------------------------------------------------------------------

#[tokio::test]
async fn window_of_five_bounds_each_entity_separately() {
    let many = |entity: &str| -> Vec<_> {
        (1..=3)
            .map(|i| hit(entity, "fraud", &format!("https://{entity}/f{i}"), None))
            .collect()
    };
    let searcher = MockSearcher::new()
        .on_search("Acme Corp", "fraud", many("Acme Corp"))
        .on_search("Acme Corp", "corruption", many("Acme Corp"))
        .on_search("Beta Ltd", "fraud", many("Beta Ltd"));

    let screener = EntityScreener::new(Arc::new(searcher), keywords(), 3, 5);
    let classifier = VerdictClassifier::new(
        Arc::new(MockArticles::new()),
        Arc::new(ScriptedModel::new()),
    );
    let orchestrator = ScreeningOrchestrator::new(screener, classifier);

    let entities = [acme(), Entity::parse("Beta Ltd").unwrap()];
    let mut last = (0, 0);
    let report = orchestrator
        .run(&entities, &mut |done: usize, total: usize| last = (done, total))
        .await;

    // 5 for Acme (window) + 3 for Beta, none classifiable.
    assert_eq!(last, (8, 8));
    assert!(report.is_empty());
    assert_eq!(report.entities_processed, 2);
}
