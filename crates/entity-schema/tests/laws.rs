//! Properties every schema must satisfy, checked over generated values.

use std::sync::{Arc, LazyLock};

use entity_schema::{
    Entity, EntityFactory, EntitySchema, PropertySchema, ValidationMode, VariantSpec, EXPLAIN_OK,
};
use proptest::prelude::*;
use serde_json::{Map, Value};

static CARD: LazyLock<Arc<EntitySchema>> = LazyLock::new(|| {
    let badge = EntityFactory::create("LawBadge")
        .property("text", [VariantSpec::String])
        .build()
        .unwrap();
    EntityFactory::create("LawCard")
        .add(PropertySchema::new("title", [VariantSpec::String]))
        .add(PropertySchema::new("count", [VariantSpec::Integer]).optional())
        .add(PropertySchema::array(
            "tags",
            [VariantSpec::enumeration("Tag", ["red", "green", "blue"])],
        ))
        .add(
            PropertySchema::new("badge", [VariantSpec::entity(&badge), VariantSpec::String])
                .optional(),
        )
        .add(PropertySchema::new("meta", [VariantSpec::Json]).optional())
        .build()
        .unwrap()
});

const KEYS: [&str; 6] = ["title", "count", "tags", "badge", "meta", "extra"];

fn modes() -> impl Strategy<Value = ValidationMode> {
    prop_oneof![
        Just(ValidationMode::Development),
        Just(ValidationMode::Production)
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        (-100.0f64..100.0).prop_map(Value::from),
        "(red|green|blue|[a-z]{0,4})".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("(text|[a-z]{1,4})", inner, 0..3)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Objects whose keys mostly come from the schema.
fn near_dto() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(prop::sample::select(KEYS.to_vec()), arb_json(), 0..6).prop_map(
        |m| {
            Value::Object(
                m.into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect::<Map<_, _>>(),
            )
        },
    )
}

fn valid_dto() -> impl Strategy<Value = Value> {
    (
        "[a-z ]{0,8}",
        prop::option::of(any::<i32>()),
        prop::collection::vec(prop::sample::select(vec!["red", "green", "blue"]), 0..4),
        prop::option::of(prop_oneof![
            "[a-z]{0,5}".prop_map(Value::from),
            "[a-z]{0,5}".prop_map(|t| serde_json::json!({ "text": t })),
        ]),
        prop::option::of(arb_json()),
    )
        .prop_map(|(title, count, tags, badge, meta)| {
            let mut dto = Map::new();
            dto.insert("title".into(), Value::from(title));
            if let Some(count) = count {
                dto.insert("count".into(), Value::from(count));
            }
            dto.insert("tags".into(), Value::from(tags));
            if let Some(badge) = badge {
                dto.insert("badge".into(), badge);
            }
            if let Some(meta) = meta {
                dto.insert("meta".into(), meta);
            }
            Value::Object(dto)
        })
}

#[test]
fn default_dto_validates_in_both_modes() {
    let dto = CARD.create_default_dto();
    assert!(CARD.is_dto(&dto, ValidationMode::Development));
    assert!(CARD.is_dto(&dto, ValidationMode::Production));
}

proptest! {
    #[test]
    fn guard_and_explainer_agree(value in prop_oneof![near_dto(), arb_json()], mode in modes()) {
        let is_dto = CARD.is_dto(&value, mode);
        let explained = CARD.explain_dto(&value, mode);
        prop_assert_eq!(is_dto, explained == EXPLAIN_OK, "explanation: {}", explained);
    }

    #[test]
    fn explanation_is_deterministic(value in near_dto(), mode in modes()) {
        prop_assert_eq!(CARD.explain_dto(&value, mode), CARD.explain_dto(&value, mode));
    }

    #[test]
    fn valid_dtos_round_trip(dto in valid_dto(), mode in modes()) {
        prop_assert!(CARD.is_dto(&dto, mode), "{}", CARD.explain_dto(&dto, mode));
        let entity = Entity::create_from_dto(&CARD, &dto, mode).unwrap();
        prop_assert_eq!(entity.get_dto(), dto);
    }

    #[test]
    fn merge_is_left_biased(
        a in valid_dto(),
        b in valid_dto(),
        keep in prop::collection::vec(any::<bool>(), 5),
    ) {
        // `b` restricted to a subset of its keys is still a valid source.
        let b: Map<String, Value> = b
            .as_object()
            .unwrap()
            .iter()
            .zip(keep.iter().cycle())
            .filter(|(_, keep)| **keep)
            .map(|((k, v), _)| (k.clone(), v.clone()))
            .collect();
        let b = Value::Object(b);
        let merged = Entity::merge(&CARD, [&a, &b], ValidationMode::Development).unwrap();
        let merged = merged.get_dto();
        for (key, value) in b.as_object().unwrap() {
            prop_assert_eq!(&merged[key], value);
        }
        for (key, value) in a.as_object().unwrap() {
            if !b.as_object().unwrap().contains_key(key) {
                prop_assert_eq!(&merged[key], value);
            }
        }
    }
}
