//! Tests for the view controller against a recording backend and virtual time.

use super::*;
use crate::layout::DecorationKind;
use crate::model::{Marker, Rect};
use crate::scene::{Layer, RecordingBackend};
use crate::store::{SelectedNode, SetOptions};
use crate::view_state::ManualScheduler;
use std::collections::BTreeMap;

fn id(raw: &str) -> NodeId {
    NodeId::new(raw).unwrap()
}

fn leaf(raw: &str) -> SourceNode {
    SourceNode::new(id(raw), "")
}

/// root -> { A -> { A1 }, B (wide), F0..F7 }, one child per row.
fn sample() -> SourceNode {
    let mut wide = leaf("B");
    wide.name = Some("b".repeat(60));
    let mut root = leaf("root")
        .with_child(leaf("A").with_child(leaf("A1")))
        .with_child(wide);
    for i in 0..8 {
        root = root.with_child(leaf(&format!("F{i}")));
    }
    root
}

fn options() -> ViewOptions {
    ViewOptions {
        font: Some(FontSpec::monospace(8.0, 12.0)),
        params: LayoutParams {
            max_row_width: 1.0,
            ..LayoutParams::default()
        },
        ..ViewOptions::default()
    }
}

struct Harness {
    store: Rc<SharedState>,
    sched: Rc<ManualScheduler>,
    backend: RecordingBackend,
    controller: ViewController<RecordingBackend>,
}

impl Harness {
    fn bare(options: ViewOptions) -> Self {
        let store = Rc::new(SharedState::new());
        let sched = Rc::new(ManualScheduler::new());
        let backend = RecordingBackend::new(Size::new(400.0, 300.0));
        let controller =
            ViewController::new(backend.clone(), Rc::clone(&store), sched.clone(), options);
        Self {
            store,
            sched,
            backend,
            controller,
        }
    }

    fn loaded() -> Self {
        let mut h = Self::bare(options());
        h.controller.setup().unwrap();
        h.controller.accept_source_data(&sample()).unwrap();
        h
    }

    fn view_pos(&self) -> Point {
        self.controller.camera().view_pos()
    }

    fn node_rect(&self, raw: &str) -> Rect {
        self.controller.tree().unwrap().get(&id(raw)).unwrap().abs_rect()
    }

    /// Surface point one pixel inside the node's top-left corner.
    fn surface_point(&self, raw: &str) -> Point {
        let rect = self.node_rect(raw);
        let view = self.view_pos();
        Point::new(rect.x - view.x + 1.0, rect.y - view.y + 1.0)
    }

    fn run_animation(&mut self) {
        for _ in 0..100 {
            for timer in self.sched.advance(Duration::from_millis(10)) {
                self.controller.on_timer(timer).unwrap();
            }
            if !self.controller.camera().is_animating() {
                return;
            }
        }
        panic!("animation did not finish");
    }

    fn selected_in_scene(&self) -> Vec<NodeId> {
        self.backend
            .scene()
            .layer(Layer::Main)
            .filter(|(_, e)| e.attrs.as_ref().is_some_and(|a| a.selected))
            .map(|(_, e)| e.id.clone())
            .collect()
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn accept_without_setup_reports_missing_overlay() {
        let mut h = Harness::bare(options());
        let err = h.controller.accept_source_data(&sample()).unwrap_err();
        assert_eq!(err, ViewError::MissingElement("minimap overlay"));
    }

    #[test]
    fn accept_without_font_is_a_config_error() {
        let mut h = Harness::bare(ViewOptions {
            font: None,
            ..options()
        });
        h.controller.setup().unwrap();
        let err = h.controller.accept_source_data(&sample()).unwrap_err();
        assert!(matches!(err, ViewError::Config(_)));
    }

    #[test]
    fn setup_without_content_succeeds() {
        let mut h = Harness::bare(options());
        h.controller.setup().unwrap();
        assert!(h.controller.is_set_up());
        assert!(h.controller.minimap().is_none());
        assert_eq!(h.controller.camera().size(), Size::new(400.0, 300.0));
    }

    #[test]
    fn accept_renders_flattened_sequence() {
        let h = Harness::loaded();
        let tree = h.controller.tree().unwrap();
        assert_eq!(h.backend.scene().main_ids().len(), tree.flattened().count());
        assert!(h.backend.scene().minimap.is_some());
        // fixture is larger than the viewport so every pan test has room
        let content = tree.content_size();
        assert!(content.width > 430.0 && content.height > 340.0, "{content:?}");
    }

    #[test]
    fn update_all_without_tree_is_a_noop() {
        let mut h = Harness::bare(options());
        let stats = h.controller.update_all(UpdateMode::Full).unwrap();
        assert_eq!(stats, ReconcileStats::default());
    }

    #[test]
    fn resize_reclamps_view_position() {
        let mut h = Harness::loaded();
        h.controller.pan_to(Point::new(1e6, 1e6), true).unwrap();
        let content = h.controller.tree().unwrap().content_size();
        assert_eq!(
            h.view_pos(),
            Point::new(content.width - 400.0, content.height - 300.0)
        );

        h.backend.set_surface_size(Size::new(
            content.width + 100.0,
            content.height + 100.0,
        ));
        h.controller.on_resize().unwrap();
        assert_eq!(h.view_pos(), Point::ZERO);
        assert_eq!(h.backend.scene().root_transform, Point::ZERO);
    }
}

mod panning {
    use super::*;

    #[test]
    fn drag_pans_against_pointer_and_disables_auto_pan() {
        let mut h = Harness::loaded();
        let effects = h
            .controller
            .handle_pointer(PointerEvent::Drag {
                start: Point::new(10.0, 10.0),
                dx: -30.0,
                dy: -40.0,
            })
            .unwrap();

        assert_eq!(effects, vec![Effect::SetAutoPan(false)]);
        assert_eq!(h.view_pos(), Point::new(30.0, 40.0));
        assert_eq!(h.backend.scene().root_transform, Point::new(-30.0, -40.0));
        assert!(!h.controller.camera().is_animating());
    }

    #[test]
    fn wheel_pans_along_delta() {
        let mut h = Harness::loaded();
        h.controller
            .handle_pointer(PointerEvent::Wheel { dx: 5.0, dy: 25.0 })
            .unwrap();
        assert_eq!(h.view_pos(), Point::new(5.0, 25.0));
    }

    #[test]
    fn minimap_tracks_view_position() {
        let mut h = Harness::loaded();
        h.controller.pan_to(Point::new(20.0, 30.0), true).unwrap();
        let frame = *h.controller.minimap().unwrap();
        assert_eq!(frame.visible.x, 20.0 * frame.scale);
        assert_eq!(frame.visible.y, 30.0 * frame.scale);
        assert_eq!(h.backend.scene().minimap, Some(frame));
    }

    #[test]
    fn minimap_click_animates_to_clicked_point() {
        let mut h = Harness::loaded();
        let frame = *h.controller.minimap().unwrap();
        let point = Point::new(
            frame.origin.x + frame.box_size.width / 2.0,
            frame.origin.y + frame.box_size.height / 2.0,
        );
        let expected = h
            .controller
            .camera()
            .clamp(frame.click_target(point, Size::new(400.0, 300.0)));

        let effects = h.controller.handle_pointer(PointerEvent::Click(point)).unwrap();
        assert_eq!(effects, vec![Effect::SetAutoPan(false)]);
        assert!(h.controller.camera().is_animating());

        h.run_animation();
        assert_eq!(h.view_pos(), expected);
    }

    #[test]
    fn minimap_drag_scales_delta() {
        let mut h = Harness::loaded();
        let frame = *h.controller.minimap().unwrap();
        h.controller
            .handle_pointer(PointerEvent::Drag {
                start: frame.origin.offset(1.0, 1.0),
                dx: 2.0,
                dy: 3.0,
            })
            .unwrap();
        let delta = frame.drag_delta(2.0, 3.0);
        assert_eq!(h.view_pos(), h.controller.camera().clamp(delta));
    }

    #[test]
    fn immediate_pan_supersedes_animation() {
        let mut h = Harness::loaded();
        h.controller.pan_to(Point::new(50.0, 50.0), false).unwrap();
        assert!(h.controller.camera().is_animating());

        h.controller.pan_to(Point::new(10.0, 10.0), true).unwrap();
        assert!(!h.controller.camera().is_animating());
        for timer in h.sched.advance(Duration::from_secs(1)) {
            assert!(!h.controller.on_timer(timer).unwrap());
        }
        assert_eq!(h.view_pos(), Point::new(10.0, 10.0));
    }
}

mod selection {
    use super::*;

    #[test]
    fn click_toggles_selection_and_disables_auto_pan() {
        let mut h = Harness::loaded();
        let point = h.surface_point("A");

        let effects = h.controller.handle_pointer(PointerEvent::Click(point)).unwrap();
        assert_eq!(
            effects,
            vec![Effect::SetAutoPan(false), Effect::Select(Some(id("A")))]
        );

        h.controller.on_selection_changed(Some(id("A"))).unwrap();
        let effects = h.controller.handle_pointer(PointerEvent::Click(point)).unwrap();
        assert_eq!(effects, vec![Effect::SetAutoPan(false), Effect::Select(None)]);
    }

    #[test]
    fn selecting_another_node_deselects_the_previous_one() {
        let mut h = Harness::loaded();
        h.controller.on_selection_changed(Some(id("A"))).unwrap();
        assert_eq!(h.selected_in_scene(), vec![id("A")]);

        h.controller.on_selection_changed(Some(id("B"))).unwrap();
        assert_eq!(h.selected_in_scene(), vec![id("B")]);

        h.controller.on_selection_changed(None).unwrap();
        assert!(h.selected_in_scene().is_empty());
    }

    #[test]
    fn selection_survives_new_source_data() {
        let mut h = Harness::loaded();
        h.controller.on_selection_changed(Some(id("B"))).unwrap();
        h.controller.accept_source_data(&sample()).unwrap();
        assert!(h.controller.tree().unwrap().is_selected(&id("B")));
    }

    #[test]
    fn auto_pan_follows_selection_when_enabled() {
        let mut h = Harness::loaded();
        h.store
            .set::<AutoPanToSelected>(true, SetOptions::default());

        h.controller.on_selection_changed(Some(id("F7"))).unwrap();
        let camera = h.controller.camera();
        let expected = camera.clamp(camera.focus_target(h.node_rect("F7")));
        assert_eq!(camera.target(), Some(expected));

        h.run_animation();
        assert_eq!(h.view_pos(), expected);
    }

    #[test]
    fn auto_pan_off_leaves_camera_alone() {
        let mut h = Harness::loaded();
        h.controller.on_selection_changed(Some(id("F7"))).unwrap();
        assert!(!h.controller.camera().is_animating());
        assert_eq!(h.view_pos(), Point::ZERO);
    }

    #[test]
    fn hidden_selection_does_not_pan() {
        let mut h = Harness::loaded();
        h.store
            .set::<AutoPanToSelected>(true, SetOptions::default());
        h.controller.on_selection_changed(Some(id("A1"))).unwrap();
        assert!(!h.controller.camera().is_animating());
    }

    #[test]
    fn store_selection_is_not_written_by_controller() {
        let mut h = Harness::loaded();
        let point = h.surface_point("B");
        h.controller.handle_pointer(PointerEvent::Click(point)).unwrap();
        assert_eq!(h.store.get::<SelectedNode>(), None);
    }
}

mod expansion {
    use super::*;

    #[test]
    fn double_click_persists_inverted_state() {
        let mut h = Harness::loaded();
        let point = h.surface_point("A");
        let effects = h
            .controller
            .handle_pointer(PointerEvent::DoubleClick(point))
            .unwrap();
        assert_eq!(effects, vec![Effect::PersistExpanded(id("A"), true)]);
    }

    #[test]
    fn expander_click_toggles() {
        let mut h = Harness::loaded();
        let node = h.controller.tree().unwrap().get(&id("A")).unwrap();
        let expander = node.decorations_of(DecorationKind::Expander)[0].rect;
        let point = node
            .abs_pos()
            .offset(expander.x + 1.0, expander.y + 1.0);

        let effects = h.controller.handle_pointer(PointerEvent::Click(point)).unwrap();
        assert_eq!(effects, vec![Effect::PersistExpanded(id("A"), true)]);
    }

    #[test]
    fn expanding_reveals_exactly_the_child() {
        let mut h = Harness::loaded();
        let a_handle = h.controller.reconciler().registry().main(&id("A")).unwrap().handle;

        let mut expanded = BTreeMap::new();
        expanded.insert(id("A"), true);
        h.store.set::<ExpandedNodes>(expanded, SetOptions::force());
        let stats = h.controller.update_all(UpdateMode::Full).unwrap();

        assert_eq!(stats.created, 2);
        assert_eq!(stats.destroyed, 0);
        assert!(h.backend.scene().element(Layer::Main, &id("A1")).is_some());
        assert_eq!(
            h.controller.reconciler().registry().main(&id("A")).unwrap().handle,
            a_handle
        );
    }

    #[test]
    fn unknown_toggle_produces_no_effects() {
        let h = Harness::loaded();
        let effects = h
            .controller
            .dispatch(&NodeCommand::ToggleExpand(id("missing")));
        assert!(effects.is_empty());
    }
}

mod markers {
    use super::*;

    #[test]
    fn marker_replacement_runs_full_update() {
        let mut h = Harness::loaded();
        let mut markers = MarkerMap::new();
        markers.insert(id("B"), vec![Marker::new("pin", "P", "#FFFFFF")]);
        h.controller.on_markers_changed(markers).unwrap();

        let scene = h.backend.scene();
        let (handle, _) = scene.element(Layer::Main, &id("B")).unwrap();
        assert!(scene
            .decorations_of(handle)
            .any(|d| d.decoration.key.kind == DecorationKind::Marker));
    }
}
