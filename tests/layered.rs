use pathstack::{merge, table_factory, Context, Error, Mapping, Node, PathDict, Value};
use rstest::rstest;

fn make_node(toml_str: &str) -> Node {
    Node::from(toml::from_str::<toml::Table>(toml_str).unwrap())
}

fn mapping(value: Value) -> Node {
    value.as_mapping().cloned().unwrap()
}

#[test]
fn test_auto_vivification() {
    let mut store = PathDict::new();
    store.set("a.b.c", "leaf".into()).unwrap();

    let a = mapping(store.get("a").unwrap());
    let b = mapping(a.get("b").unwrap());
    assert_eq!(store.get("a.b.c").unwrap(), b.get("c").unwrap());
}

#[test]
fn test_direct_key_is_never_split() {
    let mut store = PathDict::new().with_separator("/");
    store.set("a.b", 1.into()).unwrap();

    assert_eq!(store.keys(), vec!["a.b".to_string()]);
    assert_eq!(store.get("a.b").unwrap().as_integer(), Some(1));
}

#[test]
fn test_fallthrough_and_write_isolation() {
    let context = Context::new();
    let l1 = context.get_context("l1").unwrap();
    l1.set("k", "from l1").unwrap();

    let view = context.include(&["l1", "l2"]).unwrap();
    assert_eq!(view.get("k").unwrap(), l1.get("k").unwrap());

    view.set("k", "from view").unwrap();
    let l2 = context.get_context("l2").unwrap();
    assert_eq!(l2.get("k").unwrap().as_str(), Some("from view"));
    assert_eq!(l1.get("k").unwrap().as_str(), Some("from l1"));
}

#[test]
fn test_shared_layer_is_only_written_where_it_is_top() {
    let context = Context::new();
    let upper = context.include(&["shared", "upper"]).unwrap();
    let lower = context.include(&["shared"]).unwrap();

    upper.set("x", 1).unwrap();
    assert!(!lower.contains("x"));

    lower.set("y", 2).unwrap();
    assert_eq!(upper.get("y").unwrap().as_integer(), Some(2));
    assert!(!context.get_context("upper").unwrap().contains("y"));
}

#[rstest]
#[case::mapping_on_top(&[r#"x = "scalar""#, "[x]\ny = 1"], Value::from(make_node("y = 1")))]
#[case::scalar_on_top(&["[x]\ny = 1", r#"x = "scalar""#], Value::from("scalar"))]
fn test_merge_type_conflict(#[case] layers: &[&str], #[case] expected: Value) {
    let layers: Vec<Node> = layers.iter().map(|s| make_node(s)).collect();
    assert_eq!(merge(&table_factory(), &layers, "x").unwrap(), expected);
}

#[test]
fn test_merge_recursive_union() {
    let layers = vec![make_node("[k]\na = 1\nc = 1"), make_node("[k]\nc = 2\nb = 2")];
    let merged = merge(&table_factory(), &layers, "k").unwrap();
    assert_eq!(merged, Value::from(make_node("a = 1\nc = 2\nb = 2")));
}

#[test]
fn test_merge_absent_path_fails() {
    let layers = vec![make_node("a = 1")];
    let result = merge(&table_factory(), &layers, "nonexistent");
    assert!(matches!(result, Err(Error::MissingKey { .. })));
}

#[test]
fn test_round_trip() {
    let mut store = PathDict::new();
    store.set("scalar", 1.5.into()).unwrap();
    assert_eq!(store.get("scalar").unwrap(), Value::from(1.5));

    let node = make_node("inner = true");
    store.set("mapping", node.clone().into()).unwrap();
    assert!(mapping(store.get("mapping").unwrap()).ptr_eq(&node));
}

#[test]
fn test_snapshot_deserializes() {
    #[derive(Debug, serde::Deserialize)]
    struct Settings {
        name: String,
        server: Server,
    }

    #[derive(Debug, serde::Deserialize)]
    struct Server {
        host: String,
        port: u16,
    }

    let context = Context::new();
    let defaults = context.include(&["defaults"]).unwrap();
    defaults.set("name", "app").unwrap();
    defaults.set("server.host", "localhost").unwrap();
    defaults.set("server.port", 80).unwrap();

    let local = defaults.include(&["local"]).unwrap();
    local.set("server.port", 8080).unwrap();

    let settings: Settings = local.snapshot().unwrap().deserialize().unwrap();
    assert_eq!(settings.name, "app");
    assert_eq!(settings.server.host, "localhost");
    assert_eq!(settings.server.port, 8080);
}
