//! Tests for the layout tree passes.

use super::*;
use crate::layout::policy::DepthExpandPolicy;
use crate::model::Marker;

fn id(raw: &str) -> NodeId {
    NodeId::new(raw).unwrap()
}

fn leaf(raw: &str) -> SourceNode {
    SourceNode::new(id(raw), "")
}

/// R -> { A -> { A1 }, B }
fn sample() -> SourceNode {
    leaf("R")
        .with_child(leaf("A").with_child(leaf("A1")))
        .with_child(leaf("B"))
}

struct Fixture {
    params: LayoutParams,
    font: FontSpec,
    policy: DepthExpandPolicy,
    expanded: BTreeMap<NodeId, bool>,
    markers: MarkerMap,
}

impl Fixture {
    fn new() -> Self {
        Self {
            params: LayoutParams::default(),
            font: FontSpec::monospace(10.0, 10.0),
            policy: DepthExpandPolicy::default(),
            expanded: BTreeMap::new(),
            markers: MarkerMap::new(),
        }
    }

    fn ctx(&self) -> LayoutContext<'_> {
        LayoutContext {
            params: &self.params,
            font: Some(&self.font),
            policy: &self.policy,
            expanded: &self.expanded,
            markers: &self.markers,
        }
    }
}

fn flat(tree: &LayoutTree) -> Vec<&str> {
    tree.flat_ids().map(NodeId::as_str).collect()
}

mod build {
    use super::*;

    #[test]
    fn root_is_last_in_arena() {
        let fx = Fixture::new();
        let tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        assert_eq!(tree.root().id().as_str(), "R");
        assert_eq!(tree.len(), 4);
        assert!(!tree.is_empty());
    }

    #[test]
    fn every_node_is_registered_even_when_hidden() {
        let fx = Fixture::new();
        let tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        assert!(tree.contains(&id("A1")));
        assert!(!tree.is_visible(&id("A1")));
        assert_eq!(tree.get(&id("A1")).unwrap().depth(), 2);
    }

    #[test]
    fn parent_links_point_upwards() {
        let fx = Fixture::new();
        let tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        let a1 = tree.get(&id("A1")).unwrap();
        let parent = tree.node(a1.parent().unwrap());
        assert_eq!(parent.id().as_str(), "A");
        assert!(tree.root().parent().is_none());
    }

    #[test]
    fn duplicate_id_skips_subtree() {
        let fx = Fixture::new();
        let source = leaf("R")
            .with_child(leaf("A"))
            .with_child(leaf("A").with_child(leaf("X")));
        let tree = LayoutTree::from_source(&source, &fx.ctx()).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains(&id("X")));
        assert_eq!(tree.root().children().len(), 1);
    }

    #[test]
    fn missing_font_is_config_error() {
        let fx = Fixture::new();
        let mut ctx = fx.ctx();
        ctx.font = None;
        let result = LayoutTree::from_source(&sample(), &ctx);
        assert_eq!(result.err(), Some(ViewError::Config("font spec")));
    }
}

mod expansion {
    use super::*;

    #[test]
    fn default_policy_expands_only_root() {
        let fx = Fixture::new();
        let tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        assert_eq!(flat(&tree), vec!["R", "A", "B"]);
    }

    #[test]
    fn persisted_state_wins_over_policy() {
        let mut fx = Fixture::new();
        fx.expanded.insert(id("A"), true);
        fx.expanded.insert(id("R"), true);
        let tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        assert_eq!(flat(&tree), vec!["R", "A", "A1", "B"]);
    }

    #[test]
    fn refresh_picks_up_new_expansion_state() {
        let mut fx = Fixture::new();
        let mut tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        let collapsed_height = tree.get(&id("A")).unwrap().height();

        fx.expanded.insert(id("A"), true);
        tree.refresh(&fx.ctx()).unwrap();

        assert!(tree.is_visible(&id("A1")));
        assert!(tree.get(&id("A")).unwrap().height() > collapsed_height);
    }

    #[test]
    fn closure_policy_is_accepted() {
        let fx = Fixture::new();
        let expand_all = |_: &LayoutNode| true;
        let ctx = LayoutContext {
            policy: &expand_all,
            ..fx.ctx()
        };
        let tree = LayoutTree::from_source(&sample(), &ctx).unwrap();
        assert_eq!(flat(&tree), vec!["R", "A", "A1", "B"]);
    }

    #[test]
    fn hidden_root_is_dropped_from_sequence_only() {
        let mut fx = Fixture::new();
        fx.params.show_root = false;
        let tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        assert_eq!(flat(&tree), vec!["A", "B"]);
        assert!(tree.contains(&id("R")));
    }

    #[test]
    fn hidden_collapsed_root_yields_empty_sequence() {
        let mut fx = Fixture::new();
        fx.params.show_root = false;
        fx.policy = DepthExpandPolicy { max_depth: 0 };
        let tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        assert!(flat(&tree).is_empty());
    }
}

mod geometry {
    use super::*;

    #[test]
    fn children_sit_below_header() {
        let fx = Fixture::new();
        let tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        let root = tree.root();
        let a = tree.get(&id("A")).unwrap();
        // header = max(10, 20) + 2 * 5
        assert_eq!(root.header_height(), 30.0);
        assert_eq!(a.abs_pos(), Point::new(10.0, 40.0));
        assert_eq!(a.rel_pos(), a.abs_pos());
    }

    #[test]
    fn absolute_position_accumulates_offsets() {
        let mut fx = Fixture::new();
        fx.expanded.insert(id("A"), true);
        let tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        let a = tree.get(&id("A")).unwrap();
        let a1 = tree.get(&id("A1")).unwrap();
        assert_eq!(
            a1.abs_pos(),
            a.abs_pos().offset(a1.rel_pos().x, a1.rel_pos().y)
        );
    }

    #[test]
    fn children_are_contained_in_parent() {
        let mut fx = Fixture::new();
        fx.expanded.insert(id("A"), true);
        let tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        let root = tree.root().abs_rect();
        for node in tree.flattened().skip(1) {
            let r = node.abs_rect();
            assert!(r.x >= root.x && r.right() <= root.right(), "{}", node.id());
            assert!(r.y >= root.y && r.bottom() <= root.bottom(), "{}", node.id());
        }
        assert_eq!(tree.content_size(), tree.root().size());
    }

    #[test]
    fn expander_only_on_nodes_with_children() {
        let fx = Fixture::new();
        let tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        use crate::layout::decoration::DecorationKind;
        assert_eq!(
            tree.get(&id("A"))
                .unwrap()
                .decorations_of(DecorationKind::Expander)
                .len(),
            1
        );
        assert!(tree
            .get(&id("B"))
            .unwrap()
            .decorations_of(DecorationKind::Expander)
            .is_empty());
    }

    #[test]
    fn marker_change_widens_header_on_refresh() {
        let mut fx = Fixture::new();
        let mut tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        let before = tree.get(&id("B")).unwrap().width();

        fx.markers
            .insert(id("B"), vec![Marker::new("pin", "P", "#FFFFFF")]);
        tree.refresh(&fx.ctx()).unwrap();

        let after = tree.get(&id("B")).unwrap().width();
        // marker side + header padding
        assert_eq!(after - before, 25.0);
    }
}

mod selection {
    use super::*;

    #[test]
    fn set_selected_returns_previous() {
        let fx = Fixture::new();
        let mut tree = LayoutTree::from_source(&sample(), &fx.ctx()).unwrap();
        assert_eq!(tree.set_selected(Some(id("A"))), None);
        assert!(tree.is_selected(&id("A")));
        assert_eq!(tree.set_selected(Some(id("B"))), Some(id("A")));
        assert!(!tree.is_selected(&id("A")));
        assert_eq!(tree.selected(), Some(&id("B")));
    }
}
