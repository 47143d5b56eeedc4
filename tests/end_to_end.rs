use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chart_atlas::charts::{Chart, ChartData, ChartKind};
use chart_atlas::config::GalleryConfig;
use chart_atlas::data::{FieldValue, Fetcher, GraphDocument, Record};
use chart_atlas::force::{ForceConfig, ForceGraph, Simulation};
use chart_atlas::hierarchy::{Hierarchy, HierarchyBuilder, NodeId, field, numeric_field};
use chart_atlas::interaction::{Tooltip, TooltipService};
use chart_atlas::layout::{PackConfig, pack};

fn find(tree: &Hierarchy, name: &str) -> NodeId {
    tree.ids()
        .find(|id| tree.node(*id).name == name)
        .unwrap_or_else(|| panic!("no node named {name}"))
}

#[test]
fn grouped_rows_aggregate_and_pack_by_area() {
    let rows = [("A", 10.0), ("B", 30.0)]
        .into_iter()
        .map(|(country, value)| {
            Record::from_iter([
                ("Continent", FieldValue::from("X")),
                ("Country", FieldValue::from(country)),
                ("Value", FieldValue::from(value)),
            ])
        })
        .collect::<Vec<_>>();
    let tree = HierarchyBuilder::new("World")
        .group_by(field("Continent"))
        .group_by(field("Country"))
        .value(numeric_field("Value"))
        .build(&rows);

    assert_eq!(tree.value(tree.root()), 40.0);
    assert_eq!(tree.value(find(&tree, "X")), 40.0);
    let (a, b) = (find(&tree, "A"), find(&tree, "B"));
    assert_eq!(tree.value(a), 10.0);
    assert_eq!(tree.value(b), 30.0);

    let layout = pack(
        &tree,
        &PackConfig {
            width: 200.0,
            height: 200.0,
            padding: 0.0,
            ..PackConfig::default()
        },
    );
    let area = |id| {
        let circle = layout.circle(id);
        circle.r * circle.r
    };
    assert!((area(b) / area(a) - 3.0).abs() < 1e-6);
}

#[test]
fn linked_pair_without_repulsion_settles_symmetrically() {
    let document: GraphDocument = serde_json::from_str(
        r#"{"nodes": [{"id": "a"}, {"id": "b"}], "links": [{"source": "a", "target": "b"}]}"#,
    )
    .unwrap();
    let config = ForceConfig {
        charge_strength: 0.0,
        ..ForceConfig::default()
    };
    let mut simulation = Simulation::new(ForceGraph::from_document(&document), config);
    simulation.run(300);

    let center = config.center();
    let [a, b] = [&simulation.nodes()[0], &simulation.nodes()[1]];
    let (da, db) = ((a.position - center).length(), (b.position - center).length());
    assert!((da - db).abs() < 1e-2, "{da} vs {db}");

    let midpoint = (a.position + b.position) / 2.0;
    assert!((midpoint - center).length() < 1e-2);
}

#[test]
fn stale_fetch_results_are_discarded() {
    let mut fetcher = Fetcher::new();
    fetcher.request(|| {
        thread::sleep(Duration::from_millis(150));
        Ok("first")
    });
    fetcher.request(|| Ok("second"));

    let delivered = fetcher.wait(Duration::from_secs(5)).map(|result| result.unwrap());
    assert_eq!(delivered, Some("second"));

    thread::sleep(Duration::from_millis(300));
    assert!(fetcher.poll().is_none());
    assert!(!fetcher.is_pending());
}

#[test]
fn tooltip_leases_guard_the_shared_overlay() {
    let service = TooltipService::new();
    let old = service.acquire("sunburst");
    old.show(Tooltip::at_pointer(0.0, 0.0, "Asia: 4.7G"));

    let new = service.acquire("treemap");
    new.show(Tooltip::at_pointer(5.0, 5.0, "China > 0-14"));
    drop(old);
    assert_eq!(service.current().map(|tip| tip.text), Some("China > 0-14".to_owned()));
    assert_eq!(service.owner().as_deref(), Some("treemap"));

    drop(new);
    assert!(service.current().is_none());
}

#[test]
fn bundled_data_mounts_every_chart() {
    let data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/data");
    let config = GalleryConfig::default();

    for kind in ChartKind::ALL {
        let data = ChartData::load(kind, &data_dir).unwrap();
        let chart = Chart::build(kind, data, &config).unwrap();
        assert_eq!(chart.kind(), kind);
        assert!(chart.tooltip().is_none());
    }
}

#[test]
fn mismatched_data_is_rejected() {
    let error = Chart::build(
        ChartKind::ForceGraph,
        ChartData::Records(Vec::new()),
        &GalleryConfig::default(),
    )
    .err()
    .unwrap();
    assert!(error.to_string().contains("Force graph"));
}
