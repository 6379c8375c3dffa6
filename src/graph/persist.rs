use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::geometry::vec2;

use super::model::{Bubble, BubbleGraph, Link};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedBubble {
    id: String,
    name: String,
    radius: f32,
    velocity_x: f32,
    velocity_y: f32,
    position_x: f32,
    position_y: f32,
    #[serde(default)]
    document_id: Option<String>,
    #[serde(default)]
    content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedLink {
    from_id: String,
    to_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PersistedGraph {
    bubbles: Vec<PersistedBubble>,
    links: Vec<PersistedLink>,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SnapshotError {
    #[error("bubble at index {0} has an empty id")]
    EmptyId(usize),
    #[error("duplicate bubble id: {0}")]
    DuplicateId(String),
    #[error("bubble {0} has an invalid radius")]
    InvalidRadius(String),
    #[error("bubble {0} has a non-finite position or velocity")]
    NonFinite(String),
    #[error("link {from} -> {to} references an unknown bubble")]
    DanglingLink { from: String, to: String },
    #[error("bubble {0} is linked to itself")]
    SelfLink(String),
    #[error("duplicate link between {0} and {1}")]
    DuplicateLink(String, String),
}

pub fn encode(graph: &BubbleGraph) -> Result<String> {
    let persisted = PersistedGraph {
        bubbles: graph
            .bubbles()
            .iter()
            .map(|bubble| PersistedBubble {
                id: bubble.id.clone(),
                name: bubble.name.clone(),
                radius: bubble.radius,
                velocity_x: bubble.velocity.x,
                velocity_y: bubble.velocity.y,
                position_x: bubble.position.x,
                position_y: bubble.position.y,
                document_id: bubble.document_id.clone(),
                content: bubble.content.clone(),
            })
            .collect(),
        links: graph
            .links()
            .iter()
            .map(|link| PersistedLink {
                from_id: link.from_id.clone(),
                to_id: link.to_id.clone(),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&persisted).context("failed to encode bubble graph")
}

pub fn decode(raw: &str) -> Result<BubbleGraph> {
    let persisted: PersistedGraph =
        serde_json::from_str(raw).context("invalid bubble graph JSON")?;
    let graph = validate(persisted).context("bubble graph failed validation")?;
    Ok(graph)
}

fn validate(persisted: PersistedGraph) -> Result<BubbleGraph, SnapshotError> {
    let mut ids = HashSet::with_capacity(persisted.bubbles.len());
    let mut bubbles = Vec::with_capacity(persisted.bubbles.len());

    for (index, raw) in persisted.bubbles.into_iter().enumerate() {
        if raw.id.is_empty() {
            return Err(SnapshotError::EmptyId(index));
        }
        if !ids.insert(raw.id.clone()) {
            return Err(SnapshotError::DuplicateId(raw.id));
        }
        if !raw.radius.is_finite() || raw.radius <= 0.0 {
            return Err(SnapshotError::InvalidRadius(raw.id));
        }

        let position = vec2(raw.position_x, raw.position_y);
        let velocity = vec2(raw.velocity_x, raw.velocity_y);
        if !position.is_finite() || !velocity.is_finite() {
            return Err(SnapshotError::NonFinite(raw.id));
        }

        bubbles.push(Bubble {
            id: raw.id,
            name: raw.name,
            position,
            radius: raw.radius,
            velocity,
            document_id: raw.document_id,
            content: raw.content,
        });
    }

    let mut links: Vec<Link> = Vec::with_capacity(persisted.links.len());
    for raw in persisted.links {
        if !ids.contains(&raw.from_id) || !ids.contains(&raw.to_id) {
            return Err(SnapshotError::DanglingLink {
                from: raw.from_id,
                to: raw.to_id,
            });
        }
        if raw.from_id == raw.to_id {
            return Err(SnapshotError::SelfLink(raw.from_id));
        }
        if links.iter().any(|link| link.connects(&raw.from_id, &raw.to_id)) {
            return Err(SnapshotError::DuplicateLink(raw.from_id, raw.to_id));
        }
        links.push(Link::new(raw.from_id, raw.to_id));
    }

    Ok(BubbleGraph::from_parts(bubbles, links))
}

/// Where the canvas keeps its graph between runs.
pub trait SnapshotStore: Send {
    /// `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> Result<Option<BubbleGraph>>;
    fn save(&self, graph: &BubbleGraph) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "bubbles".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<BubbleGraph>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        decode(&raw)
            .with_context(|| format!("failed to load {}", self.path.display()))
            .map(Some)
    }

    fn save(&self, graph: &BubbleGraph) -> Result<()> {
        let json = encode(graph)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, json)
            .with_context(|| format!("failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        debug!(path = %self.path.display(), "saved bubble graph");
        Ok(())
    }
}

pub fn default_graph() -> BubbleGraph {
    let seed = [
        ("bubble1", "Alpha", (200.0, 200.0), 50.0, "doc_alpha"),
        ("bubble2", "Beta", (300.0, 250.0), 60.0, "doc_beta"),
        ("bubble3", "Gamma", (250.0, 400.0), 40.0, "doc_gamma"),
    ];

    let bubbles = seed
        .into_iter()
        .map(|(id, name, (x, y), radius, document_id)| Bubble {
            velocity: vec2(0.2, 0.2),
            document_id: Some(document_id.to_owned()),
            content: "Content".to_owned(),
            ..Bubble::new(id, name, vec2(x, y), radius)
        })
        .collect();

    BubbleGraph::from_parts(bubbles, Vec::new())
}

/// Reads the stored graph, falling back to (and immediately persisting) the
/// default graph when nothing usable is stored.
pub fn load_or_default(store: &dyn SnapshotStore) -> BubbleGraph {
    match store.load() {
        Ok(Some(graph)) => {
            info!(
                bubbles = graph.bubbles().len(),
                links = graph.links().len(),
                "loaded bubble graph"
            );
            return graph;
        }
        Ok(None) => info!("no stored bubble graph, using defaults"),
        Err(error) => warn!("load error, using defaults: {error:#}"),
    }

    let graph = default_graph();
    if let Err(error) = store.save(&graph) {
        warn!("failed to persist default bubble graph: {error:#}");
    }
    graph
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;
    use tempfile::TempDir;

    fn sample_graph() -> BubbleGraph {
        let mut first = Bubble::new("a", "Alpha", vec2(12.5, -3.25), 50.0);
        first.velocity = vec2(0.5, -1.0);
        first.document_id = Some("doc_a".into());
        first.content = "notes about alpha".into();
        let second = Bubble::new("b", "Beta", vec2(-40.0, 80.0), 45.0);
        let third = Bubble::new("c", "Gamma", vec2(300.0, 0.0), 60.0);

        BubbleGraph::from_parts(
            vec![first, second, third],
            vec![Link::new("a", "b"), Link::new("c", "a")],
        )
    }

    #[test]
    fn json_round_trip_preserves_every_field() {
        let graph = sample_graph();
        let raw = encode(&graph).unwrap();
        let decoded = decode(&raw).unwrap();
        assert_eq!(decoded, graph);
    }

    #[test]
    fn encoded_json_uses_fixed_field_names() {
        let raw = encode(&sample_graph()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let bubble = &value["bubbles"][0];
        for key in [
            "id",
            "name",
            "radius",
            "velocityX",
            "velocityY",
            "positionX",
            "positionY",
            "documentId",
            "content",
        ] {
            assert!(bubble.get(key).is_some(), "missing {key}");
        }
        assert!(value["bubbles"][1]["documentId"].is_null());
        assert_eq!(value["links"][0]["fromId"], "a");
        assert_eq!(value["links"][0]["toId"], "b");
    }

    #[test]
    fn decode_accepts_missing_optional_fields() {
        let raw = r#"{"bubbles":[{"id":"x","name":"X","radius":10.0,
            "velocityX":0.0,"velocityY":0.0,"positionX":1.0,"positionY":2.0}],
            "links":[]}"#;
        let graph = decode(raw).unwrap();
        let bubble = graph.bubble("x").unwrap();
        assert_eq!(bubble.document_id, None);
        assert_eq!(bubble.content, "");
    }

    #[test]
    fn decode_rejects_invalid_snapshots() {
        let bad = [
            r#"{"bubbles":[{"id":"x","name":"X","velocityX":0,"velocityY":0,"positionX":0,"positionY":0}],"links":[]}"#,
            r#"{"bubbles":[{"id":"x","name":"X","radius":-1,"velocityX":0,"velocityY":0,"positionX":0,"positionY":0}],"links":[]}"#,
            r#"{"bubbles":[{"id":"","name":"X","radius":1,"velocityX":0,"velocityY":0,"positionX":0,"positionY":0}],"links":[]}"#,
            r#"{"bubbles":[{"id":"x","name":"X","radius":1,"velocityX":0,"velocityY":0,"positionX":0,"positionY":0}],"links":[{"fromId":"x","toId":"y"}]}"#,
            r#"{"bubbles":[{"id":"x","name":"X","radius":1,"velocityX":0,"velocityY":0,"positionX":0,"positionY":0}],"links":[{"fromId":"x","toId":"x"}]}"#,
            r#"{"bubbles":[]}"#,
            "not json",
        ];
        for raw in bad {
            assert!(decode(raw).is_err(), "accepted {raw}");
        }
    }

    #[test]
    fn validate_reports_duplicate_ids_and_links() {
        let mut graph = sample_graph().bubbles().as_ref().clone();
        graph.push(Bubble::new("a", "Again", vec2(0.0, 0.0), 10.0));
        let raw = encode(&BubbleGraph::from_parts(graph, Vec::new())).unwrap();
        let persisted: PersistedGraph = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            validate(persisted).unwrap_err(),
            SnapshotError::DuplicateId("a".into())
        );

        let duplicated = BubbleGraph::from_parts(
            sample_graph().bubbles().as_ref().clone(),
            vec![Link::new("a", "b"), Link::new("b", "a")],
        );
        let raw = encode(&duplicated).unwrap();
        let persisted: PersistedGraph = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            validate(persisted).unwrap_err(),
            SnapshotError::DuplicateLink("b".into(), "a".into())
        );
    }

    #[test]
    fn file_store_saves_and_loads() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("nested").join("bubbles.json"));

        assert!(store.load().unwrap().is_none());
        store.save(&sample_graph()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_graph()));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn missing_file_falls_back_to_defaults_and_persists_them() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("bubbles.json"));

        let graph = load_or_default(&store);
        let names = graph
            .bubbles()
            .iter()
            .map(|bubble| bubble.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Alpha", "Beta", "Gamma"]);
        assert!(graph.links().is_empty());
        assert_eq!(store.load().unwrap(), Some(graph));
    }

    #[test]
    fn malformed_content_falls_back_to_defaults() {
        let store = MemoryStore::with_raw("{\"bubbles\": 3}");
        let graph = load_or_default(&store);
        assert_eq!(graph, default_graph());
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.stored(), Some(default_graph()));
    }

    #[test]
    fn stored_graph_is_used_as_is() {
        let store = MemoryStore::default();
        store.save(&sample_graph()).unwrap();
        assert_eq!(load_or_default(&store), sample_graph());
        assert_eq!(store.save_count(), 1);
    }
}
