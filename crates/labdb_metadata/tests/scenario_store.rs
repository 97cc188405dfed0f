//! Integration tests for the scenario store against a real directory.

use std::collections::BTreeMap;

use labdb_metadata::{
    MetadataDb, ObjectDefinition, ScenarioDefinition, OBJECT_CONTAINER_IMAGE,
};
use proptest::prelude::*;

fn sample_definition() -> ScenarioDefinition {
    let mut objects = BTreeMap::new();
    objects.insert(
        "dataset".to_string(),
        ObjectDefinition {
            object_type: OBJECT_CONTAINER_IMAGE.to_string(),
            reference: "docker.io/library/alpine:3.19".to_string(),
            chunker: "size-256k".to_string(),
            layout: "flat".to_string(),
        },
    );
    let mut seed = BTreeMap::new();
    seed.insert("dataset".to_string(), "(0,3)".to_string());
    let mut benchmark = BTreeMap::new();
    benchmark.insert("dataset".to_string(), "(4,8)".to_string());
    ScenarioDefinition {
        objects,
        seed,
        benchmark,
    }
}

#[test]
fn scenarios_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db");

    let created = {
        let db = MetadataDb::open(&path).unwrap();
        let created = db.create_scenario("baseline", &sample_definition()).unwrap();
        db.close().unwrap();
        created
    };

    let db = MetadataDb::open(&path).unwrap();
    assert_eq!(db.get_scenario("baseline").unwrap(), created);
}

/// Copies every file in `from` into `to`, replacing what is there.
fn copy_db_files(from: &std::path::Path, to: &std::path::Path) {
    std::fs::create_dir_all(to).unwrap();
    for entry in std::fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), to.join(entry.file_name())).unwrap();
    }
}

#[test]
fn updates_survive_crash_without_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db");
    let frozen = dir.path().join("frozen");

    let updated = {
        let db = MetadataDb::open(&path).unwrap();
        let mut scenario = db.create_scenario("baseline", &sample_definition()).unwrap();
        scenario
            .document
            .seed
            .insert("extra".to_string(), "(9,9)".to_string());
        let updated = db.update_scenario(&scenario).unwrap();
        // Freeze the on-disk state before close flushes anything, as
        // a crashed process would have left it.
        copy_db_files(&path, &frozen);
        db.close().unwrap();
        updated
    };

    std::fs::remove_dir_all(&path).unwrap();
    copy_db_files(&frozen, &path);

    let db = MetadataDb::open(&path).unwrap();
    assert_eq!(db.get_scenario("baseline").unwrap(), updated);
}

#[test]
fn compaction_preserves_all_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db");

    let db = MetadataDb::open(&path).unwrap();
    for i in 0..10 {
        db.create_scenario(&format!("scenario-{i:02}"), &sample_definition())
            .unwrap();
    }
    db.delete_scenario("scenario-03").unwrap();
    db.compact().unwrap();
    db.close().unwrap();

    let db = MetadataDb::open(&path).unwrap();
    let ids: Vec<String> = db
        .list_scenarios()
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids.len(), 9);
    assert!(!ids.contains(&"scenario-03".to_string()));
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn failed_update_leaves_previous_version_readable() {
    let db = MetadataDb::open_in_memory().unwrap();
    let created = db.create_scenario("baseline", &sample_definition()).unwrap();

    let mut ghost = created.clone();
    ghost.id = "ghost".to_string();
    assert!(db.update_scenario(&ghost).unwrap_err().is_not_found());

    assert_eq!(db.get_scenario("baseline").unwrap(), created);
}

#[test]
fn repeated_updates_keep_updated_at_strictly_increasing() {
    let db = MetadataDb::open_in_memory().unwrap();
    let mut scenario = db.create_scenario("baseline", &sample_definition()).unwrap();

    let mut last = scenario.updated_at;
    for _ in 0..50 {
        scenario = db.update_scenario(&scenario).unwrap();
        assert!(scenario.updated_at > last);
        last = scenario.updated_at;
    }
    assert_eq!(scenario.created_at, db.get_scenario("baseline").unwrap().created_at);
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,11}"
}

fn node_map_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(name_strategy(), "[ -~]{0,16}", 0..4)
}

/// What a definition looks like after a persistence round trip:
/// map entries with empty values are pruned, everything else is kept.
fn pruned(mut definition: ScenarioDefinition) -> ScenarioDefinition {
    definition.seed.retain(|_, v| !v.is_empty());
    definition.benchmark.retain(|_, v| !v.is_empty());
    definition
}

fn object_strategy() -> impl Strategy<Value = ObjectDefinition> {
    ("[a-z-]{0,12}", "[ -~]{0,32}", "[a-z0-9-]{0,12}", "[a-z0-9-]{0,12}").prop_map(
        |(object_type, reference, chunker, layout)| ObjectDefinition {
            object_type,
            reference,
            chunker,
            layout,
        },
    )
}

fn definition_strategy() -> impl Strategy<Value = ScenarioDefinition> {
    (
        prop::collection::btree_map(name_strategy(), object_strategy(), 0..4),
        node_map_strategy(),
        node_map_strategy(),
    )
        .prop_map(|(objects, seed, benchmark)| ScenarioDefinition {
            objects,
            seed,
            benchmark,
        })
}

proptest! {
    #[test]
    fn any_definition_round_trips_through_the_store(definition in definition_strategy()) {
        let db = MetadataDb::open_in_memory().unwrap();
        let created = db.create_scenario("prop", &definition).unwrap();
        let want = pruned(definition);
        prop_assert_eq!(&created.document, &want);
        prop_assert_eq!(&db.get_scenario("prop").unwrap().document, &want);
    }

    #[test]
    fn any_update_replaces_the_previous_definition(
        first in definition_strategy(),
        second in definition_strategy(),
    ) {
        let db = MetadataDb::open_in_memory().unwrap();
        let mut scenario = db.create_scenario("prop", &first).unwrap();
        scenario.document = second.clone();
        let updated = db.update_scenario(&scenario).unwrap();
        let want = pruned(second);
        prop_assert_eq!(&updated.document, &want);
        prop_assert_eq!(&db.get_scenario("prop").unwrap().document, &want);
    }
}
