//! Subject–verb–object extraction over dependency parses.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{roles, Parse};

pub const NO_SUBJECT: &str = "No Subject";
pub const NO_VERB: &str = "No Verb";
pub const NO_OBJECT: &str = "No Object";

/// A subject–verb–object triple. `object` is `None` when the verb has no direct
/// object or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub subject: String,
    pub verb: String,
    pub object: Option<String>,
}

impl Relationship {
    /// Placeholder emitted for sentences without any subject–verb arc.
    pub fn sentinel() -> Self {
        Self {
            subject: NO_SUBJECT.to_string(),
            verb: NO_VERB.to_string(),
            object: Some(NO_OBJECT.to_string()),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.subject == NO_SUBJECT
            && self.verb == NO_VERB
            && self.object.as_deref() == Some(NO_OBJECT)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {} → {}",
            self.subject,
            self.verb,
            self.object.as_deref().unwrap_or("None")
        )
    }
}

fn is_subject(dep: &str) -> bool {
    dep == roles::NOMINAL_SUBJECT || dep == roles::NOMINAL_SUBJECT_PASSIVE
}

fn is_object(dep: &str) -> bool {
    dep == roles::DIRECT_OBJECT || dep == roles::ATTRIBUTE
}

/// One triple per nominal subject whose head is a verb; never empty.
pub fn extract_relationships(parse: &Parse) -> Vec<Relationship> {
    let mut relationships = Vec::new();
    for (idx, token) in parse.tokens.iter().enumerate() {
        if !is_subject(&token.dep) {
            continue;
        }
        let Some(head) = parse.head_of(idx) else {
            continue;
        };
        if head.pos != roles::VERB {
            continue;
        }
        let object = parse
            .children(token.head)
            .find(|child| is_object(&child.dep))
            .map(|child| child.text.clone());
        relationships.push(Relationship {
            subject: token.text.clone(),
            verb: head.text.clone(),
            object,
        });
    }

    if relationships.is_empty() {
        relationships.push(Relationship::sentinel());
    }
    relationships
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::Token;

    fn tok(text: &str, dep: &str, head: usize, pos: &str) -> Token {
        Token {
            text: text.into(),
            dep: dep.into(),
            head,
            pos: pos.into(),
        }
    }

    fn parse(tokens: Vec<Token>) -> Parse {
        Parse {
            entities: vec![],
            tokens,
        }
    }

    #[test]
    fn active_subject_with_object() {
        // "Police arrested the suspect"
        let p = parse(vec![
            tok("Police", "nsubj", 1, "NOUN"),
            tok("arrested", "ROOT", 1, "VERB"),
            tok("the", "det", 3, "DET"),
            tok("suspect", "dobj", 1, "NOUN"),
        ]);
        assert_eq!(
            extract_relationships(&p),
            vec![Relationship {
                subject: "Police".into(),
                verb: "arrested".into(),
                object: Some("suspect".into()),
            }]
        );
    }

    #[test]
    fn passive_subject_without_object() {
        // "The company was accused of fraud"
        let p = parse(vec![
            tok("The", "det", 1, "DET"),
            tok("company", "nsubjpass", 3, "NOUN"),
            tok("was", "auxpass", 3, "AUX"),
            tok("accused", "ROOT", 3, "VERB"),
            tok("of", "prep", 3, "ADP"),
            tok("fraud", "pobj", 4, "NOUN"),
        ]);
        let rels = extract_relationships(&p);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].subject, "company");
        assert_eq!(rels[0].verb, "accused");
        assert_eq!(rels[0].object, None);
        assert!(!rels[0].is_sentinel());
    }

    #[test]
    fn first_object_child_wins() {
        let p = parse(vec![
            tok("He", "nsubj", 1, "PRON"),
            tok("gave", "ROOT", 1, "VERB"),
            tok("money", "dobj", 1, "NOUN"),
            tok("gifts", "dobj", 1, "NOUN"),
        ]);
        assert_eq!(extract_relationships(&p)[0].object.as_deref(), Some("money"));
    }

    #[test]
    fn every_subject_of_a_verb_gets_a_triple() {
        let p = parse(vec![
            tok("Tom", "nsubj", 2, "PROPN"),
            tok("Ann", "nsubj", 2, "PROPN"),
            tok("stole", "ROOT", 2, "VERB"),
            tok("cars", "dobj", 2, "NOUN"),
        ]);
        let rels = extract_relationships(&p);
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].subject, "Tom");
        assert_eq!(rels[1].subject, "Ann");
        assert!(rels.iter().all(|r| r.object.as_deref() == Some("cars")));
    }

    #[test]
    fn subject_of_non_verb_head_is_ignored() {
        // "She is a lawyer": head of the subject is an AUX
        let p = parse(vec![
            tok("She", "nsubj", 1, "PRON"),
            tok("is", "ROOT", 1, "AUX"),
            tok("a", "det", 3, "DET"),
            tok("lawyer", "attr", 1, "NOUN"),
        ]);
        assert_eq!(extract_relationships(&p), vec![Relationship::sentinel()]);
    }

    #[test]
    fn empty_parse_yields_sentinel() {
        let rels = extract_relationships(&Parse::default());
        assert_eq!(rels.len(), 1);
        assert!(rels[0].is_sentinel());
        assert_eq!(rels[0].to_string(), "No Subject → No Verb → No Object");
    }
}
