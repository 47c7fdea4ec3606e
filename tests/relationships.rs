use news_insights::{
    data::literal,
    nlp::{
        relations::{extract_relationships, Relationship},
        Parse, Token,
    },
};
use proptest::prelude::*;

fn token_strategy(len: usize) -> impl Strategy<Value = Token> {
    (
        "[a-z]{1,8}",
        prop::sample::select(vec!["nsubj", "nsubjpass", "dobj", "attr", "det", "ROOT", "prep"]),
        0..len,
        prop::sample::select(vec!["VERB", "NOUN", "AUX", "PROPN", "DET"]),
    )
        .prop_map(|(text, dep, head, pos)| Token {
            text,
            dep: dep.to_string(),
            head,
            pos: pos.to_string(),
        })
}

fn parse_strategy() -> impl Strategy<Value = Parse> {
    (1usize..12)
        .prop_flat_map(|len| prop::collection::vec(token_strategy(len), len))
        .prop_map(|tokens| Parse {
            entities: vec![],
            tokens,
        })
}

fn has_subject_verb_arc(parse: &Parse) -> bool {
    parse.tokens.iter().any(|t| {
        (t.dep == "nsubj" || t.dep == "nsubjpass") && parse.tokens[t.head].pos == "VERB"
    })
}

proptest! {
    #[test]
    fn output_is_never_empty(parse in parse_strategy()) {
        let rels = extract_relationships(&parse);
        prop_assert!(!rels.is_empty());
        if has_subject_verb_arc(&parse) {
            prop_assert!(rels.iter().all(|r| !r.is_sentinel()));
        } else {
            prop_assert_eq!(rels, vec![Relationship::sentinel()]);
        }
    }

    #[test]
    fn one_triple_per_subject_verb_arc(parse in parse_strategy()) {
        let arcs = parse
            .tokens
            .iter()
            .filter(|t| (t.dep == "nsubj" || t.dep == "nsubjpass") && parse.tokens[t.head].pos == "VERB")
            .count();
        let rels = extract_relationships(&parse);
        prop_assert_eq!(rels.len(), arcs.max(1));
    }

    #[test]
    fn triples_survive_the_literal_format(
        triples in prop::collection::vec(
            (".{0,12}", ".{0,12}", prop::option::of(".{0,12}")),
            0..6,
        )
    ) {
        let rels: Vec<Relationship> = triples
            .into_iter()
            .map(|(subject, verb, object)| Relationship { subject, verb, object })
            .collect();
        let rendered = literal::render_relationships(&rels);
        prop_assert_eq!(literal::parse_relationships(&rendered).unwrap(), rels);
    }
}

#[test]
fn sentinel_renders_like_the_interchange_format() {
    let rendered = literal::render_relationships(&[Relationship::sentinel()]);
    assert_eq!(rendered, "[('No Subject', 'No Verb', 'No Object')]");
    let parsed = literal::parse_relationships(&rendered).unwrap();
    assert!(parsed[0].is_sentinel());
}
