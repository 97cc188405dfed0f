//! The scenario document: object sources plus two experiment stages.

use std::collections::BTreeMap;

use labdb_store::{Bucket, EntryRef};
use serde::{Deserialize, Serialize};

use crate::codec::{self, Document};
use crate::error::{MetadataError, MetadataResult};
use crate::keys::{
    BUCKET_BENCHMARK, BUCKET_DEFINITION, BUCKET_OBJECTS, BUCKET_SEED, KEY_CHUNKER, KEY_LAYOUT,
    KEY_REFERENCE, KEY_TYPE,
};
use crate::record::Record;

/// Object type for sources distributed as container images.
pub const OBJECT_CONTAINER_IMAGE: &str = "oci-image";

/// A scenario record as stored in the database.
pub type Scenario = Record<ScenarioDefinition>;

/// Describes what data an experiment distributes and how it runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    /// Named data sources the experiment distributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub objects: BTreeMap<String, ObjectDefinition>,

    /// Maps object names to the nodes that hold them before the run.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub seed: BTreeMap<String, String>,

    /// Maps object names to the nodes that fetch them during the run.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub benchmark: BTreeMap<String, String>,
}

/// One named data source within a scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    /// Type discriminator, e.g. [`OBJECT_CONTAINER_IMAGE`].
    #[serde(rename = "type", default)]
    pub object_type: String,

    /// Where to fetch the source from.
    #[serde(default)]
    pub reference: String,

    /// How the source is split into blocks.
    #[serde(default)]
    pub chunker: String,

    /// How the resulting blocks are laid out.
    #[serde(default)]
    pub layout: String,
}

impl Document for ScenarioDefinition {
    fn write(&self, bucket: &mut Bucket) -> MetadataResult<()> {
        if bucket.bucket(BUCKET_DEFINITION).is_some() {
            bucket.delete_bucket(BUCKET_DEFINITION)?;
        }
        let definition = bucket.create_bucket(BUCKET_DEFINITION)?;
        write_objects(definition, &self.objects)?;
        codec::write_string_map(definition, BUCKET_SEED, &self.seed)?;
        codec::write_string_map(definition, BUCKET_BENCHMARK, &self.benchmark)?;
        Ok(())
    }

    fn read(bucket: &Bucket) -> MetadataResult<Self> {
        let Some(definition) = bucket.bucket(BUCKET_DEFINITION) else {
            return Ok(Self::default());
        };
        Ok(Self {
            objects: read_objects(definition)?,
            seed: codec::read_string_map(definition, BUCKET_SEED)?,
            benchmark: codec::read_string_map(definition, BUCKET_BENCHMARK)?,
        })
    }
}

fn write_objects(
    bucket: &mut Bucket,
    objects: &BTreeMap<String, ObjectDefinition>,
) -> MetadataResult<()> {
    if bucket.bucket(BUCKET_OBJECTS).is_some() {
        bucket.delete_bucket(BUCKET_OBJECTS)?;
    }
    if objects.is_empty() {
        return Ok(());
    }
    let outer = bucket.create_bucket(BUCKET_OBJECTS)?;
    for (name, object) in objects {
        let inner = outer.create_bucket(name.as_bytes())?;
        codec::put_text(inner, KEY_TYPE, &object.object_type)?;
        codec::put_text(inner, KEY_REFERENCE, &object.reference)?;
        codec::put_text(inner, KEY_CHUNKER, &object.chunker)?;
        codec::put_text(inner, KEY_LAYOUT, &object.layout)?;
    }
    Ok(())
}

fn read_objects(bucket: &Bucket) -> MetadataResult<BTreeMap<String, ObjectDefinition>> {
    let Some(outer) = bucket.bucket(BUCKET_OBJECTS) else {
        return Ok(BTreeMap::new());
    };
    let mut objects = BTreeMap::new();
    for (key, entry) in outer.iter() {
        let EntryRef::Bucket(inner) = entry else {
            continue;
        };
        let name = String::from_utf8(key.to_vec())
            .map_err(|_| MetadataError::corrupt("object name is not UTF-8"))?;
        let object = ObjectDefinition {
            object_type: codec::text(inner, KEY_TYPE)?.unwrap_or_default(),
            reference: codec::text(inner, KEY_REFERENCE)?.unwrap_or_default(),
            chunker: codec::text(inner, KEY_CHUNKER)?.unwrap_or_default(),
            layout: codec::text(inner, KEY_LAYOUT)?.unwrap_or_default(),
        };
        objects.insert(name, object);
    }
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScenarioDefinition {
        let mut objects = BTreeMap::new();
        objects.insert(
            "dataset".to_string(),
            ObjectDefinition {
                object_type: OBJECT_CONTAINER_IMAGE.to_string(),
                reference: "docker.io/library/busybox:latest".to_string(),
                chunker: "size-256k".to_string(),
                layout: "flat".to_string(),
            },
        );
        let mut seed = BTreeMap::new();
        seed.insert("dataset".to_string(), "(1,3)".to_string());
        let mut benchmark = BTreeMap::new();
        benchmark.insert("dataset".to_string(), "(4,8)".to_string());
        ScenarioDefinition {
            objects,
            seed,
            benchmark,
        }
    }

    #[test]
    fn definition_round_trips() {
        let mut bucket = Bucket::new();
        let want = sample();
        want.write(&mut bucket).unwrap();
        assert_eq!(ScenarioDefinition::read(&bucket).unwrap(), want);
    }

    #[test]
    fn rewrite_replaces_the_whole_definition() {
        let mut bucket = Bucket::new();
        sample().write(&mut bucket).unwrap();

        let slim = ScenarioDefinition::default();
        slim.write(&mut bucket).unwrap();

        assert_eq!(ScenarioDefinition::read(&bucket).unwrap(), slim);
        let definition = bucket.bucket(BUCKET_DEFINITION).unwrap();
        assert!(definition.bucket(BUCKET_OBJECTS).is_none());
        assert!(definition.bucket(BUCKET_SEED).is_none());
        assert!(definition.bucket(BUCKET_BENCHMARK).is_none());
    }

    #[test]
    fn missing_definition_reads_as_default() {
        let bucket = Bucket::new();
        assert_eq!(
            ScenarioDefinition::read(&bucket).unwrap(),
            ScenarioDefinition::default()
        );
    }

    #[test]
    fn empty_object_scalars_survive_round_trip() {
        let mut definition = ScenarioDefinition::default();
        definition
            .objects
            .insert("bare".to_string(), ObjectDefinition::default());

        let mut bucket = Bucket::new();
        definition.write(&mut bucket).unwrap();
        assert_eq!(ScenarioDefinition::read(&bucket).unwrap(), definition);
    }

    #[test]
    fn serde_uses_the_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["objects"]["dataset"]["type"], OBJECT_CONTAINER_IMAGE);
        assert_eq!(json["seed"]["dataset"], "(1,3)");
    }

    #[test]
    fn serde_accepts_partial_documents() {
        let definition: ScenarioDefinition =
            serde_json::from_str(r#"{"seed":{"dataset":"(0,1)"}}"#).unwrap();
        assert!(definition.objects.is_empty());
        assert_eq!(definition.seed["dataset"], "(0,1)");
        assert!(definition.benchmark.is_empty());
    }
}
