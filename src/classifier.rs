//! Inbound classifier: tag server warnings and forward everything downstream.
//!
//! Classification is a literal, case-sensitive prefix test against
//! [`WARNING_PREFIX`]. Non-text items are never rejected: they pass through
//! untagged and are handled as ordinary traffic.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::{Error, SinkError};
use crate::mailbox::Mailbox;
use crate::message::Item;

/// Marks a message the server emitted about itself.
pub const WARNING_PREFIX: &str = "Warning:";

/// Classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    Ordinary,
    ServerWarning,
}

impl Tag {
    /// Classify a text value.
    pub fn of(text: &str) -> Self {
        if text.starts_with(WARNING_PREFIX) {
            Self::ServerWarning
        } else {
            Self::Ordinary
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ordinary => "ordinary",
            Self::ServerWarning => "server-warning",
        }
    }

    /// Operator-facing marker printed in front of the item.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Ordinary => "[Received]",
            Self::ServerWarning => "[From server]",
        }
    }
}

/// An item together with its tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub item: Item,
    pub tag: Tag,
}

impl Classified {
    /// Classify a single item. Non-text payloads are ordinary.
    pub fn new(item: Item) -> Self {
        let tag = item.text().map(Tag::of).unwrap_or(Tag::Ordinary);
        Self { item, tag }
    }
}

/// Split raw inbound traffic into items.
///
/// The transport envelope is unwrapped first; a list payload then becomes
/// one item per element, in order, each inheriting the envelope's origin.
pub fn split_inbound(raw: serde_json::Value) -> Vec<Item> {
    let envelope = Item::from_envelope(raw);
    match envelope.payload() {
        serde_json::Value::Array(elements) => elements
            .iter()
            .map(|element| {
                let item = Item::new(element.clone());
                match envelope.origin() {
                    Some(origin) => item.with_origin(origin),
                    None => item,
                }
            })
            .collect(),
        _ => vec![envelope],
    }
}

/// Where classified items go.
pub enum Destination {
    /// Queue for later batching.
    Mailbox(Arc<Mailbox<Item>>),
    /// Hand over immediately.
    Channel(mpsc::UnboundedSender<Classified>),
    /// Nothing downstream besides the trace line.
    TraceOnly,
}

/// Classifies inbound traffic and forwards it to a [`Destination`].
pub struct InboundClassifier {
    destination: Destination,
}

impl InboundClassifier {
    pub fn new(destination: Destination) -> Self {
        Self { destination }
    }

    /// Classify and forward every item carried by `raw`.
    ///
    /// Returns the classified items in arrival order. Fails only when the
    /// destination has shut down.
    pub fn accept(&self, raw: serde_json::Value) -> Result<Vec<Classified>, Error> {
        let classified: Vec<Classified> = split_inbound(raw)
            .into_iter()
            .map(Classified::new)
            .collect();

        for entry in &classified {
            trace(entry);
            self.forward(entry)?;
        }

        Ok(classified)
    }

    fn forward(&self, entry: &Classified) -> Result<(), Error> {
        match &self.destination {
            Destination::Mailbox(mailbox) => {
                let item = if entry.item.text().is_some() {
                    entry.item.clone().with_tag(entry.tag.label())
                } else {
                    entry.item.clone()
                };
                mailbox.put(item)?;
            }
            Destination::Channel(tx) => {
                tx.send(entry.clone())
                    .map_err(|_| SinkError::Disconnected {
                        name: "classifier".to_string(),
                    })?;
            }
            Destination::TraceOnly => {}
        }
        Ok(())
    }
}

fn trace(entry: &Classified) {
    match entry.item.text() {
        Some(text) => info!(
            item_id = %entry.item.id(),
            tag = entry.tag.label(),
            origin = entry.item.origin().unwrap_or(""),
            "{} {}",
            entry.tag.marker(),
            text
        ),
        None => debug!(
            item_id = %entry.item.id(),
            payload = %entry.item.payload(),
            "Passing through non-text item"
        ),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn warning_prefix_is_literal_and_case_sensitive() {
        assert_eq!(Tag::of("Warning: disk full"), Tag::ServerWarning);
        assert_eq!(Tag::of("Warning:"), Tag::ServerWarning);
        assert_eq!(Tag::of("disk full"), Tag::Ordinary);
        assert_eq!(Tag::of("warning: disk full"), Tag::Ordinary);
        assert_eq!(Tag::of(" Warning: indented"), Tag::Ordinary);
        assert_eq!(Tag::of("Warning disk full"), Tag::Ordinary);
    }

    #[test]
    fn tag_labels() {
        assert_eq!(Tag::ServerWarning.label(), "server-warning");
        assert_eq!(Tag::Ordinary.label(), "ordinary");
        assert_eq!(
            serde_json::to_value(Tag::ServerWarning).unwrap(),
            json!("server-warning")
        );
    }

    #[test]
    fn sequence_is_tagged_per_element_in_order() {
        let classifier = InboundClassifier::new(Destination::TraceOnly);
        let out = classifier.accept(json!(["Warning: x", "y"])).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].item.text(), Some("Warning: x"));
        assert_eq!(out[0].tag, Tag::ServerWarning);
        assert_eq!(out[1].item.text(), Some("y"));
        assert_eq!(out[1].tag, Tag::Ordinary);
    }

    #[test]
    fn non_text_passes_through_untagged() {
        let mailbox = Mailbox::new();
        let classifier = InboundClassifier::new(Destination::Mailbox(Arc::clone(&mailbox)));

        let out = classifier.accept(json!(["ok", 12, {"k": "v"}])).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().skip(1).all(|c| c.tag == Tag::Ordinary));

        assert_eq!(mailbox.len(), 3);
        let first = mailbox.try_get().unwrap().unwrap();
        assert_eq!(first.tag(), Some("ordinary"));
        let second = mailbox.try_get().unwrap().unwrap();
        assert_eq!(second.payload(), &json!(12));
        assert_eq!(second.tag(), None);
    }

    #[test]
    fn envelope_content_is_classified_and_origin_kept() {
        let mailbox = Mailbox::new();
        let classifier = InboundClassifier::new(Destination::Mailbox(Arc::clone(&mailbox)));

        classifier
            .accept(json!({"content": "Warning: overload", "addr": "10.0.0.1:9"}))
            .unwrap();

        let item = mailbox.try_get().unwrap().unwrap();
        assert_eq!(item.text(), Some("Warning: overload"));
        assert_eq!(item.tag(), Some("server-warning"));
        assert_eq!(item.origin(), Some("10.0.0.1:9"));
    }

    #[test]
    fn envelope_list_elements_inherit_origin() {
        let items = split_inbound(json!({"content": ["a", "b"], "addr": "peer"}));
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.origin() == Some("peer")));
    }

    #[tokio::test]
    async fn channel_destination_receives_classified() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let classifier = InboundClassifier::new(Destination::Channel(tx));

        classifier.accept(json!("Warning: disk full")).unwrap();
        let got = rx.recv().await.unwrap();
        assert_eq!(got.tag, Tag::ServerWarning);
    }

    #[test]
    fn closed_mailbox_is_reported() {
        let mailbox = Mailbox::new();
        mailbox.close();
        let classifier = InboundClassifier::new(Destination::Mailbox(mailbox));

        let err = classifier.accept(json!("late")).unwrap_err();
        assert!(matches!(err, Error::Mailbox(_)));
    }
}
