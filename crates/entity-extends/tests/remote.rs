use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use entity_extends::{
    FetchError, JsonFetcher, RecordPool, RemoteResolver, ResolveError, ResolverOptions,
};
use entity_schema::{EntityFactory, EntitySchema, PropertySchema, ValidationMode, VariantSpec};
use serde_json::{json, Value};
use url::Url;

static COMPONENT: LazyLock<Arc<EntitySchema>> = LazyLock::new(|| {
    EntityFactory::create("RemoteComponent")
        .property("name", [VariantSpec::String])
        .add(PropertySchema::new("extend", [VariantSpec::String]).optional())
        .add(PropertySchema::array("content", [VariantSpec::Json]).optional())
        .add(PropertySchema::new("meta", [VariantSpec::Json]).optional())
        .add(PropertySchema::new("style", [VariantSpec::Json]).optional())
        .build()
        .unwrap()
});

/// Serves fixed documents and counts every request.
#[derive(Default)]
struct MemoryFetcher {
    documents: HashMap<String, Value>,
    requests: AtomicUsize,
}

impl MemoryFetcher {
    fn with(mut self, url: &str, document: Value) -> Self {
        self.documents.insert(url.to_string(), document);
        self
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JsonFetcher for MemoryFetcher {
    async fn get_json(&self, url: &Url) -> Result<Value, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

fn resolver(fetcher: MemoryFetcher, mode: ValidationMode) -> RemoteResolver<MemoryFetcher> {
    let options = ResolverOptions::default()
        .with_mode(mode)
        .with_built_ins(["div"])
        .with_base_url(Url::parse("https://cdn.example.com/app/main.json").unwrap());
    RemoteResolver::new(options, COMPONENT.clone(), fetcher)
}

fn pool(records: Vec<Value>) -> RecordPool {
    RecordPool::from_records(records, &Default::default()).unwrap()
}

#[tokio::test]
async fn remote_ancestor_is_fetched_once_per_pass() {
    let fetcher = MemoryFetcher::default().with(
        "https://cdn.example.com/shared/base.json",
        json!({"name": "Base", "content": ["base"], "style": {"padding": 4}}),
    );
    let resolver = resolver(fetcher, ValidationMode::Development);
    let pool = pool(vec![
        json!({"name": "First", "extend": "https://cdn.example.com/shared/base.json", "content": [1]}),
        json!({"name": "Second", "extend": "../shared/base.json", "style": {"padding": 8}}),
        json!({"name": "Third", "extend": "First", "content": [3]}),
    ]);

    let resolved = resolver.resolve_collection(&pool).await.unwrap();
    assert_eq!(
        resolved,
        [
            json!({"name": "Base", "content": ["base", 1], "style": {"padding": 4}}),
            json!({"name": "Base", "content": ["base"], "style": {"padding": 8}}),
            json!({"name": "Base", "content": ["base", 1, 3], "style": {"padding": 4}}),
        ]
    );
    assert_eq!(resolver.fetcher().requests(), 1);
}

#[tokio::test]
async fn nested_relative_references_follow_the_fetched_url() {
    let fetcher = MemoryFetcher::default()
        .with(
            "https://cdn.example.com/lib/base.json",
            json!({"name": "Base", "extend": "./core.json", "content": ["base"]}),
        )
        .with(
            "https://cdn.example.com/lib/core.json",
            json!({"name": "Core", "content": ["core"], "meta": {"v": 1}}),
        );
    let resolver = resolver(fetcher, ValidationMode::Development);
    let page = json!({
        "name": "Page",
        "extend": "../lib/base.json",
        "content": ["page"],
        "meta": {"title": "Home"}
    });

    let resolved = resolver.resolve(&page, &RecordPool::new()).await.unwrap();
    assert_eq!(
        resolved,
        json!({"name": "Core", "content": ["core", "base", "page"], "meta": {"v": 1, "title": "Home"}})
    );
    assert_eq!(resolver.fetcher().requests(), 2);
}

#[tokio::test]
async fn invalid_payload_carries_the_explanation() {
    let fetcher = MemoryFetcher::default().with(
        "https://cdn.example.com/app/broken.json",
        json!({"name": 5, "content": []}),
    );
    let resolver = resolver(fetcher, ValidationMode::Development);
    let record = json!({"name": "Child", "extend": "./broken.json"});

    let err = resolver.resolve(&record, &RecordPool::new()).await.unwrap_err();
    match &err {
        ResolveError::InvalidRemote {
            reference,
            requester,
            entity,
            explanation,
        } => {
            assert_eq!(reference, "./broken.json");
            assert_eq!(requester, "Child");
            assert_eq!(entity, "RemoteComponentDTO");
            assert_eq!(explanation, "property \"name\": expected string, got number");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn newer_remote_fields_are_tolerated_in_production() {
    let document = json!({"name": "Base", "content": [], "since": "v2"});
    let url = "https://cdn.example.com/app/base.json";
    let record = json!({"name": "Child", "extend": "./base.json"});

    let strict = resolver(
        MemoryFetcher::default().with(url, document.clone()),
        ValidationMode::Development,
    );
    assert!(matches!(
        strict.resolve(&record, &RecordPool::new()).await,
        Err(ResolveError::InvalidRemote { .. })
    ));

    let relaxed = resolver(
        MemoryFetcher::default().with(url, document),
        ValidationMode::Production,
    );
    assert_eq!(
        relaxed.resolve(&record, &RecordPool::new()).await.unwrap(),
        json!({"name": "Base", "content": [], "since": "v2"})
    );
}

#[tokio::test]
async fn fetch_failures_propagate() {
    let resolver = resolver(MemoryFetcher::default(), ValidationMode::Development);
    let pool = pool(vec![
        json!({"name": "Fine", "extend": "div"}),
        json!({"name": "Lost", "extend": "./missing.json"}),
    ]);

    let err = resolver.resolve_collection(&pool).await.unwrap_err();
    assert!(matches!(
        &err,
        ResolveError::Fetch {
            source: FetchError::Status { status: 404, .. },
            ..
        }
    ));
    let message = err.to_string();
    assert!(message.contains("\"Lost\""), "{message}");
    assert!(message.contains("./missing.json"), "{message}");
}

#[tokio::test]
async fn remote_cycles_stop_after_one_fetch_each() {
    let fetcher = MemoryFetcher::default()
        .with(
            "https://cdn.example.com/app/a.json",
            json!({"name": "A", "extend": "./b.json"}),
        )
        .with(
            "https://cdn.example.com/app/b.json",
            json!({"name": "B", "extend": "./a.json"}),
        );
    let resolver = resolver(fetcher, ValidationMode::Development);
    let record = json!({"name": "Start", "extend": "./a.json"});

    assert!(matches!(
        resolver.resolve(&record, &RecordPool::new()).await,
        Err(ResolveError::Cycle { .. })
    ));
    assert_eq!(resolver.fetcher().requests(), 2);
}

#[tokio::test]
async fn collections_resolve_independently_and_concurrently() {
    let fetcher = MemoryFetcher::default().with(
        "https://cdn.example.com/app/layout.json",
        json!({"name": "Layout", "content": ["header"]}),
    );
    let resolver = resolver(fetcher, ValidationMode::Development);
    let views = pool(vec![json!({"name": "Home", "extend": "./layout.json", "content": ["home"]})]);
    let components = pool(vec![
        json!({"name": "Button", "extend": "div", "style": {"radius": 2}}),
        json!({"name": "Primary", "extend": "Button", "style": {"color": "blue"}}),
    ]);
    let routes = pool(vec![json!({"name": "/", "content": ["Home"]})]);

    let (views, components, routes) = futures::try_join!(
        resolver.resolve_collection(&views),
        resolver.resolve_collection(&components),
        resolver.resolve_collection(&routes),
    )
    .unwrap();

    assert_eq!(views, [json!({"name": "Layout", "content": ["header", "home"]})]);
    assert_eq!(
        components,
        [
            json!({"name": "div", "style": {"radius": 2}}),
            json!({"name": "div", "style": {"radius": 2, "color": "blue"}}),
        ]
    );
    assert_eq!(routes, [json!({"name": "/", "content": ["Home"]})]);
}

#[tokio::test]
async fn local_members_resolve_against_the_configured_base() {
    let local = json!({"name": "Local", "extend": "./x.json"});
    let page = json!({"name": "Page", "extend": "../lib/base.json", "content": ["page"]});
    let expected_local = json!({"name": "AppX", "content": ["app-x"]});
    let expected_page = json!({"name": "AppX", "content": ["app-x", "page"]});

    for local_first in [true, false] {
        let fetcher = MemoryFetcher::default()
            .with(
                "https://cdn.example.com/app/x.json",
                json!({"name": "AppX", "content": ["app-x"]}),
            )
            .with(
                "https://cdn.example.com/lib/x.json",
                json!({"name": "LibX", "content": ["lib-x"]}),
            )
            .with(
                "https://cdn.example.com/lib/base.json",
                json!({"name": "Base", "extend": "Local"}),
            );
        let resolver = resolver(fetcher, ValidationMode::Development);
        let (records, expected) = if local_first {
            (
                vec![local.clone(), page.clone()],
                [expected_local.clone(), expected_page.clone()],
            )
        } else {
            (
                vec![page.clone(), local.clone()],
                [expected_page.clone(), expected_local.clone()],
            )
        };

        let resolved = resolver.resolve_collection(&pool(records)).await.unwrap();
        assert_eq!(resolved, expected, "local first: {local_first}");
        assert_eq!(resolver.fetcher().requests(), 2, "local first: {local_first}");
    }
}

#[tokio::test]
async fn standalone_record_may_extend_its_pool_namesake() {
    let resolver = resolver(MemoryFetcher::default(), ValidationMode::Development);
    let pool = pool(vec![json!({"name": "Button", "content": ["base"]})]);
    let record = json!({"name": "Button", "extend": "Button", "content": ["mine"]});

    assert_eq!(
        resolver.resolve(&record, &pool).await.unwrap(),
        json!({"name": "Button", "content": ["base", "mine"]})
    );
    assert_eq!(resolver.fetcher().requests(), 0);
}
