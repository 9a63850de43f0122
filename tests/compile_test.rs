//! End-to-end compilation from forwarder JSON.

use logfwd_gen::compiler::graph::{self, is_topologically_ordered};
use logfwd_gen::compiler::ids;
use logfwd_gen::compiler::sinks::SinkConfig;
use logfwd_gen::spec::limit::PER_CONTAINER_KEY_FIELD;
use logfwd_gen::{Element, ElementKind, Forwarder, ForwarderSpec, Options, Secret, Secrets, compile, render};
use pretty_assertions::assert_eq;
use serde_json::json;

fn forwarder(value: serde_json::Value) -> Forwarder {
    let spec: ForwarderSpec = serde_json::from_value(value).unwrap();
    spec.validate_and_build().unwrap()
}

fn ids_of(elements: &[Element]) -> Vec<&str> {
    elements.iter().map(|e| e.component_id.as_str()).collect()
}

fn find<'a>(elements: &'a [Element], id: &str) -> &'a Element {
    elements
        .iter()
        .find(|e| e.component_id == id)
        .unwrap_or_else(|| panic!("no component {id}"))
}

fn check_graph(forwarder: &Forwarder, elements: &[Element]) {
    let sources = ids::raw_sources(forwarder);
    assert_eq!(graph::verify(elements, &sources), Ok(()));
    assert!(is_topologically_ordered(elements, &sources));
}

fn full_forwarder() -> Forwarder {
    forwarder(json!({
        "inputs": [
            {
                "name": "shop",
                "application": {
                    "namespaces": ["shop-*"],
                    "selector": { "matchLabels": { "tier": "web" } },
                    "containerLimit": { "maxRecordsPerSecond": 100 }
                }
            },
            { "name": "team-x", "application": { "selector": { "matchLabels": { "team": "x" } } } },
            { "name": "nodes", "infrastructure": {} },
            { "name": "api-audit", "receiver": { "type": "http", "http": { "format": "kubeAPIAudit" } } },
            { "name": "rsyslog-in", "receiver": { "type": "syslog", "syslog": { "port": 10514 } } }
        ],
        "outputs": [
            { "name": "es", "type": "elasticsearch", "url": "https://es.svc:9200", "limit": { "maxRecordsPerSecond": 500 } },
            { "name": "loki", "type": "loki", "url": "http://loki:3100" },
            { "name": "fluent", "type": "fluentdForward", "url": "tcp://fluentd:24224" },
            { "name": "splunk", "type": "splunk", "url": "https://splunk:8088" }
        ],
        "pipelines": [
            { "name": "apps", "inputRefs": ["shop", "team-x"], "outputRefs": ["es", "loki"], "labels": { "env": "prod" } },
            { "name": "infra-audit", "inputRefs": ["nodes", "audit", "api-audit", "rsyslog-in"], "outputRefs": ["es", "splunk", "fluent"] },
            { "inputRefs": ["application", "missing"], "outputRefs": ["loki", "nowhere"] }
        ]
    }))
}

#[test]
fn full_forwarder_layout() {
    let forwarder = full_forwarder();
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());

    assert_eq!(
        ids_of(&elements),
        vec![
            "route_container_logs",
            "application",
            "infrastructure",
            "audit",
            "route_application_logs",
            "source_throttle_shop",
            "api-audit_input",
            "rsyslog-in_input",
            "apps",
            "infra-audit",
            "pipeline_2",
            "sink_throttle_es",
            "normalize_output_es",
            "output_es",
            "output_loki",
            "output_splunk",
            "add_nodename_to_metric",
            "prometheus_output",
        ]
    );

    assert_eq!(find(&elements, "apps").inputs, vec!["route_application_logs.team-x", "source_throttle_shop"]);
    assert_eq!(
        find(&elements, "infra-audit").inputs,
        vec!["api-audit_input", "audit", "infrastructure", "rsyslog-in_input"]
    );
    assert_eq!(find(&elements, "pipeline_2").inputs, vec!["application"]);
    assert_eq!(find(&elements, "sink_throttle_es").inputs, vec!["apps", "infra-audit"]);
    assert_eq!(find(&elements, "output_loki").inputs, vec!["apps", "pipeline_2"]);

    check_graph(&forwarder, &elements);
}

#[test]
fn determinism() {
    let forwarder = full_forwarder();
    let secrets = Secrets::from([("loki".to_string(), Secret::new("loki-creds").with("token", "t0k"))]);
    let first = compile(&forwarder, &secrets, &Options::default());
    let second = compile(&forwarder.clone(), &secrets.clone(), &Options::default());
    assert_eq!(first, second);
    assert_eq!(render::to_toml(&first).unwrap(), render::to_toml(&second).unwrap());
    assert_eq!(render::to_json(&first).unwrap(), render::to_json(&second).unwrap());
}

#[test]
fn zero_threshold_suppression() {
    let forwarder = forwarder(json!({
        "inputs": [
            { "name": "zero", "application": { "namespaces": ["a"], "groupLimit": { "maxRecordsPerSecond": 0 } } },
            { "name": "negative", "application": { "containerLimit": { "maxRecordsPerSecond": -5 } } }
        ],
        "outputs": [
            { "name": "off", "type": "http", "url": "http://sink:80", "limit": { "maxRecordsPerSecond": 0 } },
            { "name": "below", "type": "http", "url": "http://sink:80", "limit": { "maxRecordsPerSecond": -1 } }
        ],
        "pipelines": [
            { "name": "p", "inputRefs": ["zero", "negative"], "outputRefs": ["off", "below"] }
        ]
    }));
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());

    assert!(!elements.iter().any(Element::is_throttle));
    assert!(!elements.iter().any(|e| e.component_id == "output_off" || e.component_id == "output_below"));

    // the route still exists, the pipeline reads straight from the branches
    let route = find(&elements, "route_application_logs");
    assert_eq!(route.branches().unwrap().collect::<Vec<_>>(), vec!["negative", "zero"]);
    assert_eq!(
        find(&elements, "p").inputs,
        vec!["route_application_logs.negative", "route_application_logs.zero"]
    );
    check_graph(&forwarder, &elements);
}

#[test]
fn unconditional_metrics() {
    let forwarder = forwarder(json!({}));
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());
    assert_eq!(ids_of(&elements), vec!["add_nodename_to_metric", "prometheus_output"]);
    assert_eq!(elements[0].inputs, vec!["internal_metrics"]);
    assert!(matches!(elements[1].kind, ElementKind::Sink(SinkConfig::PrometheusExporter(_))));
    check_graph(&forwarder, &elements);
}

#[test]
fn type_tagging_completeness() {
    let forwarder = forwarder(json!({
        "outputs": [{ "name": "web", "type": "http", "url": "http://web:80" }],
        "pipelines": [
            { "name": "all", "inputRefs": ["application", "infrastructure", "audit"], "outputRefs": ["web"] }
        ]
    }));
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());

    for (tag, inputs) in [
        ("application", vec!["route_container_logs.app"]),
        ("infrastructure", vec!["route_container_logs.infra", "journal_logs"]),
        ("audit", vec!["host_audit_logs", "k8s_audit_logs", "openshift_audit_logs", "ovn_audit_logs"]),
    ] {
        let taggers: Vec<&Element> = elements
            .iter()
            .filter(|e| e.vrl().is_some_and(|v| v.starts_with(&format!(".log_type = \"{tag}\""))))
            .collect();
        assert_eq!(taggers.len(), 1, "exactly one tagger for {tag}");
        assert_eq!(taggers[0].component_id, tag);
        assert_eq!(taggers[0].inputs, inputs);
    }
    check_graph(&forwarder, &elements);
}

#[test]
fn only_referenced_types_are_classified() {
    let forwarder = forwarder(json!({
        "pipelines": [{ "name": "a", "inputRefs": ["audit"], "outputRefs": [] }]
    }));
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());
    assert_eq!(ids_of(&elements), vec!["audit", "a", "add_nodename_to_metric", "prometheus_output"]);
}

#[test]
fn namespace_only_selector() {
    let forwarder = forwarder(json!({
        "inputs": [{ "name": "ns", "application": { "namespaces": ["ns-a", "ns-b"] } }],
        "pipelines": [{ "name": "p", "inputRefs": ["ns"], "outputRefs": [] }]
    }));
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());
    let ElementKind::Route { routes } = &find(&elements, "route_application_logs").kind else {
        panic!("expected route");
    };
    assert_eq!(
        routes["ns"],
        r#"(.kubernetes.namespace_name == "ns-a") || (.kubernetes.namespace_name == "ns-b")"#
    );
}

#[test]
fn label_only_selector() {
    let forwarder = forwarder(json!({
        "inputs": [{ "name": "team", "application": { "selector": { "matchLabels": { "team": "x" } } } }],
        "pipelines": [{ "name": "p", "inputRefs": ["team"], "outputRefs": [] }]
    }));
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());
    let ElementKind::Route { routes } = &find(&elements, "route_application_logs").kind else {
        panic!("expected route");
    };
    assert_eq!(routes["team"], r#".kubernetes.labels."team" == "x""#);
    assert!(!routes["team"].contains("namespace_name"));
}

#[test]
fn unfiltered_input_without_limit_is_not_routed() {
    let forwarder = forwarder(json!({
        "inputs": [{ "name": "everything", "application": {} }],
        "pipelines": [{ "name": "p", "inputRefs": ["everything"], "outputRefs": [] }]
    }));
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());
    assert!(!elements.iter().any(|e| e.component_id == "route_application_logs"));
    assert_eq!(find(&elements, "p").inputs, vec!["application"]);
}

#[test]
fn throttle_keying() {
    let forwarder = forwarder(json!({
        "inputs": [
            { "name": "per-container", "application": { "containerLimit": { "maxRecordsPerSecond": 100 } } },
            { "name": "per-group", "application": { "groupLimit": { "maxRecordsPerSecond": 100 } } }
        ],
        "pipelines": [{ "name": "p", "inputRefs": ["per-container", "per-group"], "outputRefs": [] }]
    }));
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());

    let throttle = |id: &str| match &find(&elements, id).kind {
        ElementKind::Throttle(t) => t.clone(),
        other => panic!("expected throttle, got {other:?}"),
    };
    let container = throttle("source_throttle_per-container");
    assert_eq!(container.threshold, 100);
    assert_eq!(container.key_field.as_deref(), Some(PER_CONTAINER_KEY_FIELD));

    let group = throttle("source_throttle_per-group");
    assert_eq!(group.threshold, 100);
    assert_eq!(group.key_field, None);

    assert_eq!(find(&elements, "source_throttle_per-group").inputs, vec!["route_application_logs.per-group"]);
    check_graph(&forwarder, &elements);
}

#[test]
fn unknown_output_type() {
    let forwarder = forwarder(json!({
        "outputs": [
            { "name": "mystery", "type": "carrierPigeon", "url": "coo://loft" },
            { "name": "after", "type": "http", "url": "http://after:80" }
        ],
        "pipelines": [{ "name": "p", "inputRefs": ["infrastructure"], "outputRefs": ["mystery", "after"] }]
    }));
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());
    assert!(!elements.iter().any(|e| e.component_id.contains("mystery")));
    assert_eq!(find(&elements, "output_after").inputs, vec!["p"]);
    assert_eq!(elements.iter().filter(|e| e.is_sink()).count(), 2);
}

#[test]
fn credential_fallback() {
    let forwarder = forwarder(json!({
        "outputs": [{ "name": "loki", "type": "loki", "url": "https://loki:3100" }],
        "pipelines": [{ "name": "p", "inputRefs": ["application"], "outputRefs": ["loki"] }]
    }));

    let fallback = Secrets::from([(
        "logcollector-token".to_string(),
        Secret::new("collector").with("token", "sa-token"),
    )]);
    let elements = compile(&forwarder, &fallback, &Options::default());
    let json = serde_json::to_value(&find(&elements, "output_loki").kind).unwrap();
    assert_eq!(json["auth"]["strategy"], "bearer");
    assert_eq!(json["auth"]["token"], "sa-token");

    // neither output secret nor fallback: no auth, still compiles
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());
    let json = serde_json::to_value(&find(&elements, "output_loki").kind).unwrap();
    assert!(json.get("auth").is_none());
    check_graph(&forwarder, &elements);
}

#[test]
fn toml_document() {
    let forwarder = full_forwarder();
    let elements = compile(&forwarder, &Secrets::new(), &Options::default());
    let text = render::to_toml(&elements).unwrap();
    let doc: toml::Table = text.parse().unwrap();

    let transforms = doc["transforms"].as_table().unwrap();
    let sinks = doc["sinks"].as_table().unwrap();
    assert_eq!(transforms["source_throttle_shop"]["type"].as_str(), Some("throttle"));
    assert_eq!(transforms["apps"]["type"].as_str(), Some("remap"));
    assert_eq!(sinks["output_es"]["type"].as_str(), Some("elasticsearch"));
    assert_eq!(sinks["prometheus_output"]["type"].as_str(), Some("prometheus_exporter"));

    // every element lands in exactly one table
    assert_eq!(transforms.len() + sinks.len(), elements.len());
}

#[test]
fn spec_rejections_surface_before_compiling() {
    let spec: ForwarderSpec = serde_json::from_value(json!({
        "inputs": [{ "name": "audit", "audit": {} }]
    }))
    .unwrap();
    assert!(spec.validate_and_build().is_err());
}

#[test]
fn generated_id_collisions_surface_before_compiling() {
    // receiver remap `output_input` against the sink of output "input"
    let spec: ForwarderSpec = serde_json::from_value(json!({
        "inputs": [{ "name": "output", "receiver": { "type": "syslog", "syslog": {} } }],
        "outputs": [{ "name": "input", "type": "http", "url": "http://sink:8080" }],
        "pipelines": [{ "inputRefs": ["output"], "outputRefs": ["input"] }]
    }))
    .unwrap();
    let err = spec.validate_and_build().unwrap_err();
    assert!(err.to_string().contains("output_input"), "{err}");
}

#[test]
fn demo_fixtures_compile() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let spec: ForwarderSpec =
        serde_json::from_str(&std::fs::read_to_string(dir.join("forwarder.json")).unwrap()).unwrap();
    let secrets: Secrets =
        serde_json::from_str(&std::fs::read_to_string(dir.join("secrets.json")).unwrap()).unwrap();
    let config = logfwd_gen::config::CompilerConfig::from_file(dir.join("logfwd-gen.toml")).unwrap();

    let forwarder = spec.validate_and_build().unwrap();
    let elements = compile(&forwarder, &secrets, &config.generator);
    check_graph(&forwarder, &elements);

    let es = serde_json::to_value(&find(&elements, "output_es").kind).unwrap();
    assert_eq!(es["auth"]["strategy"], "basic");
    let loki = serde_json::to_value(&find(&elements, "output_loki").kind).unwrap();
    assert_eq!(loki["auth"]["token"], "service-account-token");
}
