use chart_atlas::data::{FieldValue, GraphDocument, Record};
use chart_atlas::force::{ForceConfig, ForceGraph, Simulation};
use chart_atlas::hierarchy::{ChildOrder, Hierarchy, HierarchyBuilder, field, numeric_field};
use chart_atlas::layout::{PackConfig, PartitionConfig, TreemapConfig, pack, partition, treemap};
use chart_atlas::viewport::{Gesture, ViewportConfig, ViewportController};
use proptest::prelude::*;

fn rows_strategy() -> impl Strategy<Value = Vec<(u8, u8, u32)>> {
    prop::collection::vec((0u8..3, 0u8..4, 1u32..1_000), 1..40)
}

fn build_tree(rows: &[(u8, u8, u32)]) -> Hierarchy {
    let records = rows
        .iter()
        .enumerate()
        .map(|(index, (a, b, value))| {
            Record::from_iter([
                ("a", FieldValue::from(format!("a{a}"))),
                ("b", FieldValue::from(format!("b{b}"))),
                ("leaf", FieldValue::from(format!("leaf{index}"))),
                ("v", FieldValue::from(f64::from(*value))),
            ])
        })
        .collect::<Vec<_>>();
    HierarchyBuilder::new("root")
        .group_by(field("a"))
        .group_by(field("b"))
        .leaf_name(field("leaf"))
        .value(numeric_field("v"))
        .build(&records)
}

fn graph_document(nodes: usize, links: &[(usize, usize)]) -> GraphDocument {
    let value = serde_json::json!({
        "nodes": (0..nodes).map(|index| serde_json::json!({"id": index, "group": index % 3})).collect::<Vec<_>>(),
        "links": links
            .iter()
            .map(|(source, target)| serde_json::json!({"source": source % nodes, "target": target % nodes}))
            .collect::<Vec<_>>(),
    });
    serde_json::from_value(value).unwrap()
}

proptest! {
    #[test]
    fn internal_values_sum_their_children(rows in rows_strategy()) {
        let tree = build_tree(&rows);
        let total = rows.iter().map(|row| f64::from(row.2)).sum::<f64>();
        prop_assert!((tree.value(tree.root()) - total).abs() < 1e-6);

        for id in tree.ids().filter(|id| !tree.children(*id).is_empty()) {
            let children = tree.children(id).iter().map(|child| tree.value(*child)).sum::<f64>();
            prop_assert!((tree.value(id) - children).abs() < 1e-6);
        }
    }

    #[test]
    fn packed_siblings_are_disjoint_and_contained(rows in rows_strategy(), padding in 0.0f64..4.0) {
        let tree = build_tree(&rows);
        let config = PackConfig { width: 500.0, height: 500.0, padding, order: ChildOrder::ValueDescending };
        let layout = pack(&tree, &config);
        let tolerance = 1e-6 * 500.0;

        for id in tree.ids() {
            let parent = layout.circle(id);
            let children = tree.children(id);
            for (i, a) in children.iter().enumerate() {
                let ca = layout.circle(*a);
                let reach = (ca.x - parent.x).hypot(ca.y - parent.y) + ca.r;
                prop_assert!(reach <= parent.r + tolerance, "child escapes parent by {}", reach - parent.r);

                for b in &children[i + 1..] {
                    let cb = layout.circle(*b);
                    let gap = (ca.x - cb.x).hypot(ca.y - cb.y) - ca.r - cb.r;
                    prop_assert!(gap >= -tolerance, "siblings overlap by {}", -gap);
                }
            }
        }
    }

    #[test]
    fn partition_spans_are_contiguous(rows in rows_strategy()) {
        let tree = build_tree(&rows);
        let config = PartitionConfig::default();
        let layout = partition(&tree, &config);

        for id in tree.ids().filter(|id| !tree.children(*id).is_empty()) {
            let parent = layout.arc(id);
            let children = tree.ordered_children(id, config.order);
            let first = layout.arc(children[0]);
            let last = layout.arc(children[children.len() - 1]);
            prop_assert!((first.start_angle - parent.start_angle).abs() < 1e-9);
            prop_assert!((last.end_angle - parent.end_angle).abs() < 1e-9);
            for pair in children.windows(2) {
                let (left, right) = (layout.arc(pair[0]), layout.arc(pair[1]));
                prop_assert!((left.end_angle - right.start_angle).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn unpadded_treemap_tiles_each_parent(rows in rows_strategy(), width in 200.0f64..1200.0, height in 200.0f64..900.0) {
        let tree = build_tree(&rows);
        let config = TreemapConfig { width, height, padding: 0.0, round: false, ..TreemapConfig::default() };
        let layout = treemap(&tree, &config);

        for id in tree.ids().filter(|id| !tree.children(*id).is_empty()) {
            let parent = layout.rect(id).area();
            let children = tree.children(id).iter().map(|child| layout.rect(*child).area()).sum::<f64>();
            prop_assert!((parent - children).abs() <= 1e-6 * width * height);
        }
    }

    #[test]
    fn padded_treemap_siblings_never_overlap(rows in rows_strategy()) {
        let tree = build_tree(&rows);
        let layout = treemap(&tree, &TreemapConfig::default());

        for id in tree.ids() {
            let children = tree.children(id);
            for (i, a) in children.iter().enumerate() {
                for b in &children[i + 1..] {
                    prop_assert!(!layout.rect(*a).overlaps(&layout.rect(*b)));
                }
            }
        }
    }

    #[test]
    fn viewport_gestures_respect_scale_and_extent(
        gestures in prop::collection::vec(
            prop_oneof![
                (-400.0f64..400.0, -400.0f64..400.0).prop_map(|(dx, dy)| Gesture::Pan { dx, dy }),
                (0.2f64..5.0, 0.0f64..800.0, 0.0f64..600.0)
                    .prop_map(|(factor, x, y)| Gesture::Zoom { factor, anchor: (x, y) }),
            ],
            1..30,
        )
    ) {
        let mut viewport = ViewportController::new(ViewportConfig {
            width: 800.0,
            height: 600.0,
            min_scale: 1.0,
            max_scale: 10.0,
            translate_extent: Some([[0.0, 0.0], [800.0, 600.0]]),
        });

        for gesture in gestures {
            let transform = viewport.apply_user_gesture(gesture);
            prop_assert!((1.0..=10.0).contains(&transform.scale));

            let (x0, y0) = transform.invert(0.0, 0.0);
            let (x1, y1) = transform.invert(800.0, 600.0);
            prop_assert!(x0 >= -1e-6 && y0 >= -1e-6);
            prop_assert!(x1 <= 800.0 + 1e-6 && y1 <= 600.0 + 1e-6);
        }
    }

    #[test]
    fn animated_zooms_respect_scale_and_extent(
        start in (0.2f64..5.0, 0.0f64..800.0, 0.0f64..600.0),
        target in (0.0f64..800.0, 0.0f64..600.0, 1.0f64..800.0, 1.0f64..600.0),
        frame_ms in 1.0f64..120.0,
    ) {
        let mut viewport = ViewportController::new(ViewportConfig {
            width: 800.0,
            height: 600.0,
            min_scale: 1.0,
            max_scale: 10.0,
            translate_extent: Some([[0.0, 0.0], [800.0, 600.0]]),
        });
        let (factor, ax, ay) = start;
        viewport.apply_user_gesture(Gesture::Zoom { factor, anchor: (ax, ay) });

        let (x, y, w, h) = target;
        viewport.zoom_to([[x, y], [x + w, y + h]], 750.0);
        let mut frames = 0;
        loop {
            let running = viewport.tick(frame_ms);
            let transform = viewport.current_transform();
            prop_assert!((1.0..=10.0).contains(&transform.scale));

            let (x0, y0) = transform.invert(0.0, 0.0);
            let (x1, y1) = transform.invert(800.0, 600.0);
            prop_assert!(x0 >= -1e-6 && y0 >= -1e-6);
            prop_assert!(x1 <= 800.0 + 1e-6 && y1 <= 600.0 + 1e-6);

            frames += 1;
            if !running || frames > 10_000 {
                break;
            }
        }
        prop_assert!(!viewport.is_animating());
    }

    #[test]
    fn simulation_is_deterministic_per_seed(
        nodes in 2usize..25,
        links in prop::collection::vec((0usize..25, 0usize..25), 0..40),
        seed in any::<u64>(),
        steps in 1usize..60,
    ) {
        let document = graph_document(nodes, &links);
        let config = ForceConfig { seed, ..ForceConfig::default() };
        let mut first = Simulation::new(ForceGraph::from_document(&document), config);
        let mut second = Simulation::new(ForceGraph::from_document(&document), config);

        let mut alpha = first.alpha();
        for _ in 0..steps {
            first.step();
            second.step();
            prop_assert!(first.alpha() <= alpha);
            alpha = first.alpha();
        }

        for (a, b) in first.nodes().iter().zip(second.nodes()) {
            prop_assert_eq!(a.position, b.position);
        }
    }
}
