//! Primitive pipeline descriptions used inside `raw` templates.
//!
//! A description is a chain of elements joined by `!`:
//!
//! ```text
//! filesrc name=src ! decodebin name=demux demux. ! videoconvert ! proxysink name=video_out
//! ```
//!
//! `key=value` tokens attach to the element before them, `name=` makes it addressable, and
//! `<name>.` jumps back to a named element to start another branch from it.

use std::collections::VecDeque;

use crate::foundation::core::{Direction, Medium};

/// Connector between two elements.
pub const CONNECTOR: &str = "!";

const PROXY_SRC: &str = "proxysrc";
const PROXY_SINK: &str = "proxysink";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementSpec {
    pub kind: String,
    pub name: Option<String>,
    pub props: Vec<(String, String)>,
}

/// Parsed primitive pipeline: elements plus directed links between them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PipelineSpec {
    pub elements: Vec<ElementSpec>,
    pub links: Vec<(usize, usize)>,
    /// Source text as written, forwarded to the collaborator.
    pub text: String,
}

/// Port exported by a template: a named `proxysrc` or `proxysink` element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PortSpec {
    pub name: String,
    pub direction: Direction,
    pub medium: Medium,
}

impl PipelineSpec {
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut elements: Vec<ElementSpec> = Vec::new();
        let mut links = Vec::new();
        let mut current: Option<usize> = None;
        let mut pending_link = false;

        for token in text.split_whitespace() {
            if token == CONNECTOR {
                if current.is_none() {
                    return Err("connector '!' has no upstream element".to_owned());
                }
                if pending_link {
                    return Err("two connectors in a row".to_owned());
                }
                pending_link = true;
                continue;
            }

            if let Some(reference) = token.strip_suffix('.').filter(|r| !r.contains('=')) {
                let idx = elements
                    .iter()
                    .position(|e| e.name.as_deref() == Some(reference))
                    .ok_or_else(|| format!("reference '{token}' names no earlier element"))?;
                if pending_link {
                    if let Some(from) = current {
                        links.push((from, idx));
                    }
                    pending_link = false;
                }
                current = Some(idx);
                continue;
            }

            if let Some((key, value)) = token.split_once('=') {
                let Some(idx) = current.filter(|_| !pending_link) else {
                    return Err(format!("property '{token}' does not follow an element"));
                };
                if key.is_empty() {
                    return Err(format!("property '{token}' has an empty key"));
                }
                if key == "name" {
                    if elements.iter().any(|e| e.name.as_deref() == Some(value)) {
                        return Err(format!("element name '{value}' is used twice"));
                    }
                    elements[idx].name = Some(value.to_owned());
                } else {
                    elements[idx].props.push((key.to_owned(), value.to_owned()));
                }
                continue;
            }

            let idx = elements.len();
            elements.push(ElementSpec {
                kind: token.to_owned(),
                name: None,
                props: Vec::new(),
            });
            if pending_link {
                if let Some(from) = current {
                    links.push((from, idx));
                }
                pending_link = false;
            }
            current = Some(idx);
        }

        if pending_link {
            return Err("pipeline ends with a dangling connector".to_owned());
        }
        if elements.is_empty() {
            return Err("pipeline has no elements".to_owned());
        }

        Ok(Self {
            elements,
            links,
            text: text.split_whitespace().collect::<Vec<_>>().join(" "),
        })
    }

    pub fn element(&self, name: &str) -> Option<&ElementSpec> {
        self.elements
            .iter()
            .find(|e| e.name.as_deref() == Some(name))
    }

    /// Exported ports in element order.
    pub fn ports(&self) -> Vec<PortSpec> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                let direction = match e.kind.as_str() {
                    PROXY_SRC => Direction::In,
                    PROXY_SINK => Direction::Out,
                    _ => return None,
                };
                let name = e.name.clone()?;
                let medium = self.infer_medium(i, &name, direction);
                Some(PortSpec {
                    name,
                    direction,
                    medium,
                })
            })
            .collect()
    }

    // Port name prefix first, then the nearest element of known medium: downstream of an
    // input, upstream of an output.
    fn infer_medium(&self, idx: usize, name: &str, direction: Direction) -> Medium {
        if name.starts_with("audio") {
            return Medium::Audio;
        }
        if name.starts_with("video") {
            return Medium::Video;
        }

        let mut seen = vec![false; self.elements.len()];
        let mut queue = VecDeque::from([idx]);
        seen[idx] = true;
        while let Some(i) = queue.pop_front() {
            if i != idx {
                if let Some(m) = medium_of_kind(&self.elements[i].kind) {
                    return m;
                }
            }
            for &(from, to) in &self.links {
                let next = match direction {
                    Direction::In if from == i => to,
                    Direction::Out if to == i => from,
                    _ => continue,
                };
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        Medium::Any
    }
}

fn medium_of_kind(kind: &str) -> Option<Medium> {
    if kind.starts_with("audio")
        || matches!(kind, "alsasink" | "pulsesink" | "volume" | "level")
    {
        return Some(Medium::Audio);
    }
    if kind.starts_with("video")
        || matches!(
            kind,
            "xvimagesink" | "ximagesink" | "glimagesink" | "compositor"
        )
    {
        return Some(Medium::Video);
    }
    None
}

#[cfg(test)]
#[path = "../../tests/unit/graph/pipeline.rs"]
mod tests;
