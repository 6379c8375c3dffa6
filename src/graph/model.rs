use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::geometry::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct Bubble {
    pub id: String,
    pub name: String,
    pub position: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
    pub document_id: Option<String>,
    pub content: String,
}

impl Bubble {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: Vec2, radius: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            radius,
            velocity: Vec2::ZERO,
            document_id: None,
            content: String::new(),
        }
    }
}

/// Undirected edge; `(a, b)` and `(b, a)` name the same link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub from_id: String,
    pub to_id: String,
}

impl Link {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
        }
    }

    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from_id == a && self.to_id == b) || (self.from_id == b && self.to_id == a)
    }

    pub fn touches(&self, id: &str) -> bool {
        self.from_id == id || self.to_id == id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("a bubble cannot be linked to itself")]
    SelfLink,
    #[error("bubbles are already linked")]
    AlreadyExists,
    #[error("bubble not found: {0}")]
    NotFound(String),
}

/// Bubbles and links, published as whole-collection snapshots.
///
/// Every mutation builds a fresh collection and swaps it in, so a clone of
/// either `Arc` is an immutable view that later edits never touch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BubbleGraph {
    bubbles: Arc<Vec<Bubble>>,
    links: Arc<Vec<Link>>,
}

impl BubbleGraph {
    /// Builds a graph from parts the caller has already validated.
    pub fn from_parts(bubbles: Vec<Bubble>, links: Vec<Link>) -> Self {
        Self {
            bubbles: Arc::new(bubbles),
            links: Arc::new(links),
        }
    }

    pub fn bubbles(&self) -> &Arc<Vec<Bubble>> {
        &self.bubbles
    }

    pub fn links(&self) -> &Arc<Vec<Link>> {
        &self.links
    }

    pub fn bubble(&self, id: &str) -> Option<&Bubble> {
        self.bubbles.iter().find(|bubble| bubble.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bubble(id).is_some()
    }

    pub fn has_link(&self, a: &str, b: &str) -> bool {
        self.links.iter().any(|link| link.connects(a, b))
    }

    fn new_bubble_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Adds a bubble under a fresh id and returns that id. `document_id` is
    /// derived from the new id. `None` when the bubble was rejected.
    pub fn add_bubble(
        &mut self,
        position: Vec2,
        name: impl Into<String>,
        radius: f32,
        document_id: impl FnOnce(&str) -> Option<String>,
    ) -> Option<String> {
        let id = Self::new_bubble_id();
        let bubble = Bubble {
            document_id: document_id(&id),
            ..Bubble::new(id.clone(), name, position, radius)
        };
        self.insert_bubble(bubble).then_some(id)
    }

    /// Appends `bubble` unless its id is taken, its radius is not a positive
    /// finite number or its position is not finite.
    pub fn insert_bubble(&mut self, bubble: Bubble) -> bool {
        let valid_radius = bubble.radius.is_finite() && bubble.radius > 0.0;
        if bubble.id.is_empty()
            || !valid_radius
            || !bubble.position.is_finite()
            || self.contains(&bubble.id)
        {
            return false;
        }

        let mut next = Vec::with_capacity(self.bubbles.len() + 1);
        next.extend(self.bubbles.iter().cloned());
        next.push(bubble);
        self.bubbles = Arc::new(next);
        true
    }

    /// Returns `false` without touching the graph when the name is blank or
    /// the bubble is unknown.
    pub fn rename_bubble(&mut self, id: &str, new_name: &str) -> bool {
        if new_name.trim().is_empty() || !self.contains(id) {
            return false;
        }

        self.replace_bubble(id, |bubble| Bubble {
            name: new_name.to_owned(),
            ..bubble.clone()
        })
    }

    pub fn move_bubble(&mut self, id: &str, position: Vec2, velocity: Vec2) -> bool {
        self.replace_bubble(id, |bubble| Bubble {
            position,
            velocity,
            ..bubble.clone()
        })
    }

    pub fn add_link(&mut self, from_id: &str, to_id: &str) -> Result<(), LinkError> {
        if from_id == to_id {
            return Err(LinkError::SelfLink);
        }
        for id in [from_id, to_id] {
            if !self.contains(id) {
                return Err(LinkError::NotFound(id.to_owned()));
            }
        }
        if self.has_link(from_id, to_id) {
            return Err(LinkError::AlreadyExists);
        }

        let mut next = Vec::with_capacity(self.links.len() + 1);
        next.extend(self.links.iter().cloned());
        next.push(Link::new(from_id, to_id));
        self.links = Arc::new(next);
        Ok(())
    }

    /// Drops every link with `id` as either endpoint; returns how many went.
    pub fn remove_links_touching(&mut self, id: &str) -> usize {
        let before = self.links.len();
        let kept = self
            .links
            .iter()
            .filter(|link| !link.touches(id))
            .cloned()
            .collect::<Vec<_>>();
        let removed = before - kept.len();
        if removed > 0 {
            self.links = Arc::new(kept);
        }
        removed
    }

    /// Publishes a complete replacement bubble set, e.g. a simulation tick.
    pub fn replace_bubbles(&mut self, bubbles: Vec<Bubble>) {
        self.bubbles = Arc::new(bubbles);
    }

    fn replace_bubble(&mut self, id: &str, update: impl Fn(&Bubble) -> Bubble) -> bool {
        let mut found = false;
        let next = self
            .bubbles
            .iter()
            .map(|bubble| {
                if bubble.id == id {
                    found = true;
                    update(bubble)
                } else {
                    bubble.clone()
                }
            })
            .collect::<Vec<_>>();

        if found {
            self.bubbles = Arc::new(next);
        }
        found
    }
}
