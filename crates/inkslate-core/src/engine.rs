//! The interaction engine: owns the board state and turns host input
//! events into gesture transitions and element edits.
//!
//! Hosts feed pointer/touch/wheel/keyboard events in and subscribe to the
//! stores (or poll [`Engine::revision`]) to schedule one render pass per
//! observable change. All event paths are infallible; anomalous input
//! degrades to "nothing happens".

use kurbo::{Point, Vec2};

use crate::element::{
    Element, ElementId, Freehand, Line, LineKind, Shape, ShapeKind, TextMeasurer,
};
use crate::eraser::EraserTracker;
use crate::input::{Modifiers, PointerButton};
use crate::selection::{Marquee, Selection};
use crate::store::Store;
use crate::text_edit::{TextEditState, TextKeyResult};
use crate::tools::{Gesture, Tool, UnknownTool};
use crate::viewport::Viewport;

/// Pinch state captured when a second touch lands.
#[derive(Debug, Clone, Copy)]
struct Pinch {
    initial_distance: f64,
    initial_zoom: f64,
}

/// Board state plus the event handlers that drive it.
///
/// Element edits go through whole-collection replacement on the elements
/// store, never in-place mutation, so subscribers always observe complete
/// states.
pub struct Engine {
    elements: Store<Vec<Element>>,
    active_tool: Store<Tool>,
    in_progress: Store<Option<Element>>,
    dragged: Store<Option<ElementId>>,
    drag_offset: Store<Option<Vec2>>,
    viewport: Viewport,
    selection: Selection,
    eraser: EraserTracker,
    gesture: Gesture,
    pinch: Option<Pinch>,
    measurer: Box<dyn TextMeasurer>,
    revision: u64,
}

impl Engine {
    pub fn new(measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            elements: Store::new(Vec::new()),
            active_tool: Store::new(Tool::default()),
            in_progress: Store::new(None),
            dragged: Store::new(None),
            drag_offset: Store::new(None),
            viewport: Viewport::default(),
            selection: Selection::new(),
            eraser: EraserTracker::new(),
            gesture: Gesture::Idle,
            pinch: None,
            measurer,
            revision: 0,
        }
    }

    // Read views for the host's overlays.

    pub fn elements(&self) -> &[Element] {
        self.elements.get()
    }

    pub fn active_tool(&self) -> Tool {
        *self.active_tool.get()
    }

    pub fn in_progress(&self) -> Option<&Element> {
        self.in_progress.get().as_ref()
    }

    pub fn dragged(&self) -> Option<ElementId> {
        *self.dragged.get()
    }

    pub fn drag_offset(&self) -> Option<Vec2> {
        *self.drag_offset.get()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn eraser(&self) -> &EraserTracker {
        &self.eraser
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Bumped on every observable state change; hosts render when it moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // Stores, for subscription. Writing to them directly is a host-level
    // command, same as the event handlers use.

    pub fn elements_store(&mut self) -> &mut Store<Vec<Element>> {
        &mut self.elements
    }

    pub fn active_tool_store(&mut self) -> &mut Store<Tool> {
        &mut self.active_tool
    }

    pub fn in_progress_store(&mut self) -> &mut Store<Option<Element>> {
        &mut self.in_progress
    }

    pub fn dragged_store(&mut self) -> &mut Store<Option<ElementId>> {
        &mut self.dragged
    }

    pub fn drag_offset_store(&mut self) -> &mut Store<Option<Vec2>> {
        &mut self.drag_offset
    }

    // Commands.

    pub fn set_active_tool(&mut self, tool: Tool) {
        log::debug!("Tool changed to {}", tool);
        self.active_tool.set(tool);
        self.bump();
    }

    /// Palette protocol entry point: tools arrive by name.
    pub fn set_active_tool_by_name(&mut self, name: &str) -> Result<(), UnknownTool> {
        let tool = name.parse::<Tool>()?;
        self.set_active_tool(tool);
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.selection.clear();
        let ids: Vec<ElementId> = self.elements.get().iter().map(|el| el.id()).collect();
        for id in ids {
            self.selection.insert(id);
        }
        log::debug!("Selected all ({} elements)", self.selection.len());
        self.bump();
    }

    /// Delete every selected element in one collection replace. Stale ids
    /// in the selection simply match nothing.
    pub fn delete_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let before = self.elements.get().len();
        let next: Vec<Element> = self
            .elements
            .get()
            .iter()
            .filter(|el| !self.selection.contains(el.id()))
            .cloned()
            .collect();
        let removed = before - next.len();
        self.elements.set(next);
        self.selection.clear();
        if removed > 0 {
            log::info!("Deleted {} selected elements", removed);
        }
        self.bump();
    }

    pub fn clear_elements(&mut self) {
        self.elements.set(Vec::new());
        self.selection.clear();
        self.bump();
    }

    pub fn reset_viewport(&mut self) {
        self.viewport.reset();
        log::debug!("Viewport reset");
        self.bump();
    }

    // Pointer events.

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton, modifiers: Modifiers) {
        // A click while typing commits the pending text. With the Text tool
        // the same click then falls through and opens a fresh session at the
        // new position; any other tool stops at the commit.
        if matches!(self.gesture, Gesture::Typing { .. }) {
            self.commit_typing();
            if self.active_tool() != Tool::Text {
                return;
            }
        }
        if !self.gesture.is_idle() {
            return;
        }

        // Middle button or Ctrl+left pans whatever the tool.
        if button == PointerButton::Middle
            || (button == PointerButton::Left && modifiers.ctrl)
        {
            self.start_pan(screen);
            return;
        }
        if button != PointerButton::Left {
            return;
        }

        let world = self.viewport.screen_to_world(screen);
        let tool = self.active_tool();
        match tool {
            Tool::Hand => self.start_pan(screen),
            Tool::Text => {
                self.gesture = Gesture::Typing {
                    editor: TextEditState::new(world),
                };
                log::debug!("Gesture -> typing");
                self.bump();
            }
            Tool::Draw => {
                self.gesture = Gesture::Drawing { path: vec![world] };
                self.bump();
            }
            Tool::Select => self.start_select(world, modifiers),
            Tool::Eraser => {
                self.eraser.set_pressed(true);
                self.eraser.set_cursor(world);
                self.mark_erase_hits(world);
                self.gesture = Gesture::Erasing;
                self.bump();
            }
            Tool::Rectangle | Tool::Circle | Tool::Diamond => {
                let kind = match tool {
                    Tool::Circle => ShapeKind::Circle,
                    Tool::Diamond => ShapeKind::Diamond,
                    _ => ShapeKind::Rectangle,
                };
                self.in_progress
                    .set(Some(Element::Shape(Shape::from_corners(kind, world, world))));
                self.gesture = Gesture::PlacingShape { anchor: world };
                self.bump();
            }
            Tool::Arrow | Tool::Dash => {
                let kind = if tool == Tool::Arrow {
                    LineKind::Arrow
                } else {
                    LineKind::Dash
                };
                self.in_progress
                    .set(Some(Element::Line(Line::new(kind, world, world))));
                self.gesture = Gesture::PlacingShape { anchor: world };
                self.bump();
            }
            // Reserved palette entries.
            Tool::Picture | Tool::Color => {}
        }
    }

    pub fn pointer_move(&mut self, screen: Point) {
        let world = self.viewport.screen_to_world(screen);
        let tool = self.active_tool();
        match &mut self.gesture {
            Gesture::Panning { anchor } => {
                self.viewport.offset = screen.to_vec2() - *anchor;
                self.bump();
            }
            Gesture::Drawing { path } => {
                path.push(world);
                self.bump();
            }
            Gesture::PlacingShape { anchor } => {
                let anchor = *anchor;
                let mut current = self.in_progress.get().clone();
                match current.as_mut() {
                    Some(Element::Shape(shape)) => shape.set_corners(anchor, world),
                    Some(Element::Line(line)) => line.set_end(world),
                    _ => {}
                }
                self.in_progress.set(current);
                self.bump();
            }
            Gesture::Selecting { marquee } => {
                marquee.end = world;
                self.bump();
            }
            Gesture::Dragging => self.drag_move(world),
            Gesture::Erasing => {
                self.eraser.set_cursor(world);
                self.mark_erase_hits(world);
                self.bump();
            }
            Gesture::Idle if tool == Tool::Eraser => {
                // Hovering eraser still tracks its ring cursor.
                self.eraser.set_cursor(world);
                self.bump();
            }
            Gesture::Idle | Gesture::Typing { .. } => {}
        }
    }

    pub fn pointer_up(&mut self) {
        // Typing outlives the pointer; it ends only via commit or discard.
        if matches!(self.gesture, Gesture::Typing { .. }) {
            return;
        }
        let finished = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match finished {
            Gesture::Idle => {}
            Gesture::Panning { .. } => self.bump(),
            Gesture::Drawing { path } => {
                self.finish_drawing(path);
                self.bump();
            }
            Gesture::PlacingShape { .. } => {
                self.finish_placement();
                self.bump();
            }
            Gesture::Selecting { marquee } => {
                self.finish_marquee(marquee);
                self.bump();
            }
            Gesture::Dragging => {
                self.dragged.set(None);
                self.drag_offset.set(None);
                self.bump();
            }
            Gesture::Erasing => {
                self.finish_erasing();
                self.bump();
            }
            Gesture::Typing { editor } => {
                // Unreachable; restore rather than lose the buffer.
                self.gesture = Gesture::Typing { editor };
            }
        }
    }

    pub fn wheel(&mut self, screen: Point, delta_y: f64) {
        self.viewport.wheel_zoom(screen, delta_y);
        self.bump();
    }

    // Touch adapters: two fingers pinch-zoom, one finger follows the
    // pointer paths. `touches` is every active touch, in order.

    pub fn touch_start(&mut self, touches: &[Point]) {
        match touches {
            [a, b] => {
                self.pinch = Some(Pinch {
                    initial_distance: a.distance(*b),
                    initial_zoom: self.viewport.zoom,
                });
            }
            [touch] if self.pinch.is_none() => {
                self.pointer_down(*touch, PointerButton::Left, Modifiers::NONE);
            }
            _ => {}
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) {
        match (touches, self.pinch) {
            ([a, b], Some(pinch)) => {
                if pinch.initial_distance > 0.0 {
                    let target =
                        pinch.initial_zoom * a.distance(*b) / pinch.initial_distance;
                    self.viewport.set_zoom_at(a.midpoint(*b), target);
                    self.bump();
                }
            }
            ([touch], None) => self.pointer_move(*touch),
            _ => {}
        }
    }

    /// `remaining` is the touches still down after the lift.
    pub fn touch_end(&mut self, remaining: &[Point]) {
        self.pinch = None;
        if matches!(self.gesture, Gesture::Drawing { .. }) {
            // A stroke can't continue across a lifted finger; commit now.
            if let Gesture::Drawing { path } =
                std::mem::replace(&mut self.gesture, Gesture::Idle)
            {
                self.finish_drawing(path);
                self.bump();
            }
            return;
        }
        if remaining.is_empty() {
            self.pointer_up();
        }
    }

    // Keyboard.

    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) {
        if let Gesture::Typing { editor } = &mut self.gesture {
            match editor.handle_key(key, modifiers) {
                TextKeyResult::Handled => self.bump(),
                TextKeyResult::Commit => self.commit_typing(),
                TextKeyResult::Discard => {
                    log::debug!("Discarded text entry");
                    self.gesture = Gesture::Idle;
                    self.bump();
                }
            }
            return;
        }

        match key {
            "Delete" | "Backspace" => self.delete_selection(),
            "Escape" => self.abort_gesture(),
            "a" if modifiers.action() => self.select_all(),
            "0" if modifiers.action() => self.reset_viewport(),
            _ => {}
        }
    }

    // Internals.

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn start_pan(&mut self, screen: Point) {
        self.gesture = Gesture::Panning {
            anchor: screen.to_vec2() - self.viewport.offset,
        };
        self.bump();
    }

    fn start_select(&mut self, world: Point, modifiers: Modifiers) {
        // First hit in collection order wins.
        let hit = self
            .elements
            .get()
            .iter()
            .find(|el| el.hit_test(world))
            .map(|el| (el.id(), el.origin()));

        match hit {
            Some((id, origin)) => {
                if !self.selection.contains(id) {
                    if modifiers.shift {
                        self.selection.insert(id);
                    } else {
                        self.selection.replace_with(id);
                    }
                }
                self.dragged.set(Some(id));
                self.drag_offset.set(Some(world - origin));
                self.gesture = Gesture::Dragging;
            }
            None => {
                if !modifiers.shift {
                    self.selection.clear();
                }
                self.gesture = Gesture::Selecting {
                    marquee: Marquee::new(world),
                };
            }
        }
        self.bump();
    }

    fn drag_move(&mut self, world: Point) {
        let Some(id) = *self.dragged.get() else {
            return;
        };
        let Some(grab) = *self.drag_offset.get() else {
            return;
        };
        // The dragged element may have vanished mid-drag.
        let Some(origin) = self
            .elements
            .get()
            .iter()
            .find(|el| el.id() == id)
            .map(|el| el.origin())
        else {
            return;
        };

        // One shared delta keeps multi-selections rigid.
        let delta = (world - grab) - origin;
        let mut next = self.elements.get().clone();
        for el in &mut next {
            if self.selection.contains(el.id()) {
                el.translate(delta);
            }
        }
        self.elements.set(next);
        self.bump();
    }

    fn mark_erase_hits(&mut self, world: Point) {
        let hits: Vec<ElementId> = self
            .elements
            .get()
            .iter()
            .filter(|el| el.hit_test(world))
            .map(|el| el.id())
            .collect();
        for id in hits {
            self.eraser.mark(id);
        }
    }

    fn finish_drawing(&mut self, path: Vec<Point>) {
        // A tap without movement leaves nothing behind.
        if path.len() > 1 {
            self.push_element(Element::Freehand(Freehand::new(path)));
        }
    }

    fn finish_placement(&mut self) {
        let taken = self.in_progress.get().clone();
        self.in_progress.set(None);
        match taken {
            None => {}
            Some(Element::Shape(ref shape)) if shape.has_zero_extent() => {
                log::debug!("Dropped zero-extent {}", shape.kind.name());
            }
            Some(Element::Line(ref line)) if line_commit_blocked(line) => {
                log::debug!("Dropped degenerate {}", line.kind.name());
            }
            Some(element) => self.push_element(element),
        }
    }

    fn finish_marquee(&mut self, marquee: Marquee) {
        let rect = marquee.rect();
        let contained: Vec<ElementId> = self
            .elements
            .get()
            .iter()
            .filter(|el| el.contained_in(rect))
            .map(|el| el.id())
            .collect();
        for id in contained {
            self.selection.insert(id);
        }
    }

    fn finish_erasing(&mut self) {
        let batch = self.eraser.take_pending();
        if batch.is_empty() {
            return;
        }
        let next: Vec<Element> = self
            .elements
            .get()
            .iter()
            .filter(|el| !batch.contains(&el.id()))
            .cloned()
            .collect();
        log::info!("Erased {} elements", batch.len());
        self.elements.set(next);
    }

    fn commit_typing(&mut self) {
        let Gesture::Typing { editor } = std::mem::replace(&mut self.gesture, Gesture::Idle)
        else {
            return;
        };
        if let Some(text) = editor.commit(self.measurer.as_ref()) {
            self.push_element(Element::Text(text));
        }
        self.bump();
    }

    fn push_element(&mut self, element: Element) {
        let mut next = self.elements.get().clone();
        log::debug!(
            "Committed {} ({} elements)",
            element.kind_name(),
            next.len() + 1
        );
        next.push(element);
        self.elements.set(next);
    }

    /// Escape: every gesture and provisional bit of state goes back to
    /// rest, committed elements untouched.
    fn abort_gesture(&mut self) {
        log::debug!("Aborted {} gesture", self.gesture.name());
        self.gesture = Gesture::Idle;
        self.pinch = None;
        if self.in_progress.get().is_some() {
            self.in_progress.set(None);
        }
        if self.dragged.get().is_some() {
            self.dragged.set(None);
        }
        if self.drag_offset.get().is_some() {
            self.drag_offset.set(None);
        }
        self.eraser.reset();
        self.selection.clear();
        self.bump();
    }
}

/// Endpoint coordinates of exactly zero read as unset and block the
/// commit, so a line ending on a world axis is dropped along with the
/// truly degenerate ones.
fn line_commit_blocked(line: &Line) -> bool {
    line.start == line.end
        || line.start.x == 0.0
        || line.start.y == 0.0
        || line.end.x == 0.0
        || line.end.y == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAdvance;

    impl TextMeasurer for FixedAdvance {
        fn measure(&self, text: &str, font_size: f64, _font_family: &str) -> f64 {
            text.chars().count() as f64 * font_size * 0.6
        }
    }

    fn engine() -> Engine {
        let _ = env_logger::builder().is_test(true).try_init();
        Engine::new(Box::new(FixedAdvance))
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn left_down(engine: &mut Engine, at: Point) {
        engine.pointer_down(at, PointerButton::Left, Modifiers::NONE);
    }

    /// Drag out a rectangle between two (screen) corners.
    fn place_rect(engine: &mut Engine, a: Point, b: Point) {
        engine.set_active_tool(Tool::Rectangle);
        left_down(engine, a);
        engine.pointer_move(b);
        engine.pointer_up();
    }

    #[test]
    fn test_hand_tool_pans() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Hand);
        left_down(&mut eng, p(100.0, 100.0));
        eng.pointer_move(p(140.0, 130.0));
        assert_eq!(eng.viewport().offset, Vec2::new(40.0, 30.0));
        eng.pointer_up();
        assert!(eng.gesture().is_idle());
    }

    #[test]
    fn test_middle_button_pans_under_any_tool() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Draw);
        eng.pointer_down(p(10.0, 10.0), PointerButton::Middle, Modifiers::NONE);
        assert!(matches!(eng.gesture(), Gesture::Panning { .. }));
        eng.pointer_move(p(30.0, 10.0));
        eng.pointer_up();
        assert_eq!(eng.viewport().offset, Vec2::new(20.0, 0.0));
        assert!(eng.elements().is_empty());
    }

    #[test]
    fn test_ctrl_left_pans_under_any_tool() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Select);
        eng.pointer_down(p(0.0, 0.0), PointerButton::Left, Modifiers::ctrl());
        assert!(matches!(eng.gesture(), Gesture::Panning { .. }));
    }

    #[test]
    fn test_draw_commits_stroke_with_at_least_two_points() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Draw);
        left_down(&mut eng, p(10.0, 10.0));
        eng.pointer_move(p(20.0, 15.0));
        eng.pointer_move(p(30.0, 10.0));
        eng.pointer_up();

        assert_eq!(eng.elements().len(), 1);
        match &eng.elements()[0] {
            Element::Freehand(stroke) => {
                assert_eq!(stroke.points().len(), 3);
                assert_eq!(stroke.points()[0], p(10.0, 10.0));
            }
            other => panic!("expected freehand, got {}", other.kind_name()),
        }

        // A tap without movement leaves nothing.
        left_down(&mut eng, p(50.0, 50.0));
        eng.pointer_up();
        assert_eq!(eng.elements().len(), 1);
    }

    #[test]
    fn test_rectangle_normalizes_when_dragged_up_left() {
        let mut eng = engine();
        place_rect(&mut eng, p(5.0, 5.0), p(-5.0, -5.0));

        assert_eq!(eng.elements().len(), 1);
        let Element::Shape(shape) = &eng.elements()[0] else {
            panic!("expected shape");
        };
        assert_eq!(shape.kind, ShapeKind::Rectangle);
        assert_eq!(shape.origin, p(-5.0, -5.0));
        assert!((shape.width - 10.0).abs() < f64::EPSILON);
        assert!((shape.height - 10.0).abs() < f64::EPSILON);
        assert!(eng.in_progress().is_none());
    }

    #[test]
    fn test_zero_extent_shape_is_dropped() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Circle);
        left_down(&mut eng, p(40.0, 40.0));
        eng.pointer_up();
        assert!(eng.elements().is_empty());
        assert!(eng.in_progress().is_none());
    }

    #[test]
    fn test_line_endpoint_on_axis_blocks_commit() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Arrow);
        left_down(&mut eng, p(10.0, 10.0));
        eng.pointer_move(p(0.0, 50.0));
        eng.pointer_up();
        assert!(eng.elements().is_empty());

        eng.set_active_tool(Tool::Dash);
        left_down(&mut eng, p(10.0, 10.0));
        eng.pointer_move(p(60.0, 80.0));
        eng.pointer_up();
        assert_eq!(eng.elements().len(), 1);
        let Element::Line(line) = &eng.elements()[0] else {
            panic!("expected line");
        };
        assert_eq!(line.kind, LineKind::Dash);
        assert_eq!(line.end, p(60.0, 80.0));
    }

    #[test]
    fn test_click_selects_and_click_elsewhere_replaces() {
        let mut eng = engine();
        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));
        place_rect(&mut eng, p(100.0, 100.0), p(120.0, 120.0));
        let first = eng.elements()[0].id();
        let second = eng.elements()[1].id();

        eng.set_active_tool(Tool::Select);
        left_down(&mut eng, p(20.0, 20.0));
        eng.pointer_up();
        assert_eq!(eng.selection().ids(), &[first]);

        left_down(&mut eng, p(110.0, 110.0));
        eng.pointer_up();
        assert_eq!(eng.selection().ids(), &[second]);

        // Shift-click unions.
        eng.pointer_down(p(20.0, 20.0), PointerButton::Left, Modifiers::shift());
        eng.pointer_up();
        assert_eq!(eng.selection().len(), 2);
    }

    #[test]
    fn test_group_drag_applies_one_shared_delta() {
        let mut eng = engine();
        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));
        place_rect(&mut eng, p(100.0, 100.0), p(120.0, 120.0));

        eng.set_active_tool(Tool::Select);
        left_down(&mut eng, p(20.0, 20.0));
        eng.pointer_up();
        eng.pointer_down(p(110.0, 110.0), PointerButton::Left, Modifiers::shift());

        // Drag the second element by (5, 7); both must move rigidly.
        eng.pointer_move(p(115.0, 117.0));
        eng.pointer_up();

        let Element::Shape(a) = &eng.elements()[0] else {
            panic!()
        };
        let Element::Shape(b) = &eng.elements()[1] else {
            panic!()
        };
        assert_eq!(a.origin, p(15.0, 17.0));
        assert_eq!(b.origin, p(105.0, 107.0));
        assert!(eng.dragged().is_none());
        assert!(eng.drag_offset().is_none());
    }

    #[test]
    fn test_clicking_selected_member_keeps_group() {
        let mut eng = engine();
        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));
        place_rect(&mut eng, p(100.0, 100.0), p(120.0, 120.0));

        eng.set_active_tool(Tool::Select);
        eng.key_down("a", Modifiers::ctrl());
        assert_eq!(eng.selection().len(), 2);

        // Plain click on a selected member must not collapse the group.
        left_down(&mut eng, p(20.0, 20.0));
        assert_eq!(eng.selection().len(), 2);
        eng.pointer_up();
    }

    #[test]
    fn test_marquee_requires_full_containment() {
        let mut eng = engine();
        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));
        place_rect(&mut eng, p(100.0, 100.0), p(120.0, 120.0));
        let first = eng.elements()[0].id();

        eng.set_active_tool(Tool::Select);

        // Partial overlap selects nothing.
        left_down(&mut eng, p(0.0, 0.0));
        eng.pointer_move(p(20.0, 20.0));
        eng.pointer_up();
        assert!(eng.selection().is_empty());

        // Full containment selects.
        left_down(&mut eng, p(0.0, 0.0));
        eng.pointer_move(p(50.0, 50.0));
        eng.pointer_up();
        assert_eq!(eng.selection().ids(), &[first]);
    }

    #[test]
    fn test_eraser_marks_monotonically_and_deletes_on_release() {
        let mut eng = engine();
        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));
        place_rect(&mut eng, p(100.0, 100.0), p(120.0, 120.0));

        eng.set_active_tool(Tool::Eraser);
        left_down(&mut eng, p(20.0, 20.0));
        assert_eq!(eng.eraser().pending().len(), 1);
        assert!(eng.eraser().pressed());

        // Sweeping empty space keeps the marks.
        eng.pointer_move(p(60.0, 60.0));
        assert_eq!(eng.eraser().pending().len(), 1);

        eng.pointer_move(p(110.0, 110.0));
        eng.pointer_move(p(20.0, 20.0));
        assert_eq!(eng.eraser().pending().len(), 2);

        eng.pointer_up();
        assert!(eng.elements().is_empty());
        assert!(!eng.eraser().has_pending());
        assert!(!eng.eraser().pressed());
    }

    #[test]
    fn test_draw_then_erase_leaves_empty_board() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Draw);
        left_down(&mut eng, p(10.0, 10.0));
        eng.pointer_move(p(20.0, 10.0));
        eng.pointer_move(p(20.0, 20.0));
        eng.pointer_up();

        assert_eq!(eng.elements().len(), 1);
        let Element::Freehand(stroke) = &eng.elements()[0] else {
            panic!("expected freehand");
        };
        assert_eq!(stroke.points().len(), 3);
        assert!(!stroke.drawables().is_empty());

        eng.set_active_tool(Tool::Eraser);
        left_down(&mut eng, p(20.0, 10.0));
        eng.pointer_up();
        assert!(eng.elements().is_empty());
    }

    #[test]
    fn test_hovering_eraser_tracks_cursor_without_marking() {
        let mut eng = engine();
        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));
        eng.set_active_tool(Tool::Eraser);
        eng.pointer_move(p(20.0, 20.0));
        assert_eq!(eng.eraser().cursor(), Some(p(20.0, 20.0)));
        assert!(!eng.eraser().has_pending());
        assert_eq!(eng.elements().len(), 1);
    }

    #[test]
    fn test_typing_commits_on_enter_with_measured_box() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Text);
        left_down(&mut eng, p(50.0, 60.0));
        assert!(matches!(eng.gesture(), Gesture::Typing { .. }));

        for key in ["h", "i"] {
            eng.key_down(key, Modifiers::NONE);
        }
        eng.key_down("Enter", Modifiers::NONE);

        assert!(eng.gesture().is_idle());
        assert_eq!(eng.elements().len(), 1);
        let Element::Text(text) = &eng.elements()[0] else {
            panic!("expected text");
        };
        assert_eq!(text.content(), "hi");
        assert_eq!(text.origin, p(50.0, 60.0));
        assert!((text.width - 2.0 * 16.0 * 0.6).abs() < 1e-10);
        assert!((text.height - 16.0 * 1.2).abs() < 1e-10);
    }

    #[test]
    fn test_whitespace_only_typing_commits_nothing() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Text);
        left_down(&mut eng, p(0.0, 0.0));
        eng.key_down(" ", Modifiers::NONE);
        eng.key_down("Enter", Modifiers::shift());
        eng.key_down("Enter", Modifiers::NONE);
        assert!(eng.elements().is_empty());
        assert!(eng.gesture().is_idle());
    }

    #[test]
    fn test_click_while_typing_commits_and_retargets() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Text);
        left_down(&mut eng, p(10.0, 10.0));
        eng.key_down("a", Modifiers::NONE);

        // One click both commits the pending entry and opens a fresh
        // session at the clicked spot.
        left_down(&mut eng, p(200.0, 200.0));
        assert_eq!(eng.elements().len(), 1);
        match eng.gesture() {
            Gesture::Typing { editor } => {
                assert_eq!(editor.position, p(200.0, 200.0));
                assert!(editor.is_empty());
            }
            other => panic!("expected a fresh typing session, got {other:?}"),
        }

        eng.key_down("b", Modifiers::NONE);
        eng.key_down("Enter", Modifiers::NONE);
        let elements = eng.elements();
        assert_eq!(elements.len(), 2);
        let Element::Text(second) = &elements[1] else {
            panic!("expected text");
        };
        assert_eq!(second.content(), "b");
        assert_eq!(second.origin, p(200.0, 200.0));
    }

    #[test]
    fn test_click_while_typing_with_other_tool_only_commits() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Text);
        left_down(&mut eng, p(10.0, 10.0));
        eng.key_down("a", Modifiers::NONE);

        // Tool switched mid-entry: the next click commits and nothing more.
        eng.set_active_tool(Tool::Rectangle);
        left_down(&mut eng, p(200.0, 200.0));
        assert_eq!(eng.elements().len(), 1);
        assert!(eng.gesture().is_idle());
        assert!(eng.in_progress().is_none());
    }

    #[test]
    fn test_escape_aborts_any_gesture_and_clears_transients() {
        let mut eng = engine();
        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));

        eng.set_active_tool(Tool::Rectangle);
        left_down(&mut eng, p(50.0, 50.0));
        eng.pointer_move(p(80.0, 80.0));
        assert!(eng.in_progress().is_some());

        eng.key_down("Escape", Modifiers::NONE);
        assert!(eng.gesture().is_idle());
        assert!(eng.in_progress().is_none());

        // The release that follows must not commit anything.
        eng.pointer_up();
        assert_eq!(eng.elements().len(), 1);

        // Escape also drops the selection and pan state.
        eng.set_active_tool(Tool::Select);
        eng.key_down("a", Modifiers::ctrl());
        assert_eq!(eng.selection().len(), 1);
        eng.key_down("Escape", Modifiers::NONE);
        assert!(eng.selection().is_empty());

        eng.set_active_tool(Tool::Hand);
        left_down(&mut eng, p(0.0, 0.0));
        eng.key_down("Escape", Modifiers::NONE);
        assert!(eng.gesture().is_idle());
    }

    #[test]
    fn test_delete_key_removes_selection() {
        let mut eng = engine();
        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));
        place_rect(&mut eng, p(100.0, 100.0), p(120.0, 120.0));

        eng.set_active_tool(Tool::Select);
        left_down(&mut eng, p(20.0, 20.0));
        eng.pointer_up();
        eng.key_down("Delete", Modifiers::NONE);

        assert_eq!(eng.elements().len(), 1);
        assert!(eng.selection().is_empty());
    }

    #[test]
    fn test_select_all_uses_lowercase_a_with_action_modifier() {
        let mut eng = engine();
        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));
        place_rect(&mut eng, p(100.0, 100.0), p(120.0, 120.0));

        eng.key_down("a", Modifiers::NONE);
        assert!(eng.selection().is_empty());

        eng.key_down("a", Modifiers::ctrl());
        assert_eq!(eng.selection().len(), 2);
    }

    #[test]
    fn test_ctrl_zero_resets_viewport() {
        let mut eng = engine();
        eng.wheel(p(200.0, 200.0), -1.0);
        eng.set_active_tool(Tool::Hand);
        left_down(&mut eng, p(0.0, 0.0));
        eng.pointer_move(p(50.0, 50.0));
        eng.pointer_up();
        assert_ne!(*eng.viewport(), Viewport::default());

        eng.key_down("0", Modifiers::ctrl());
        assert_eq!(*eng.viewport(), Viewport::default());
    }

    #[test]
    fn test_wheel_zoom_keeps_world_point_under_cursor() {
        let mut eng = engine();
        let cursor = p(400.0, 300.0);
        let before = eng.viewport().screen_to_world(cursor);
        eng.wheel(cursor, -1.0);
        assert!((eng.viewport().zoom - 1.1).abs() < f64::EPSILON);
        let after = eng.viewport().screen_to_world(cursor);
        assert!((after.x - before.x).abs() < 1e-9);
        assert!((after.y - before.y).abs() < 1e-9);
    }

    #[test]
    fn test_pinch_doubles_zoom_when_spread_doubles() {
        let mut eng = engine();
        eng.touch_start(&[p(100.0, 200.0), p(200.0, 200.0)]);
        eng.touch_move(&[p(50.0, 200.0), p(250.0, 200.0)]);
        assert!((eng.viewport().zoom - 2.0).abs() < f64::EPSILON);

        eng.touch_end(&[]);
        // A later single touch behaves as a pointer again.
        eng.set_active_tool(Tool::Hand);
        eng.touch_start(&[p(10.0, 10.0)]);
        assert!(matches!(eng.gesture(), Gesture::Panning { .. }));
        eng.touch_end(&[]);
    }

    #[test]
    fn test_second_finger_suppresses_single_touch_moves() {
        let mut eng = engine();
        eng.set_active_tool(Tool::Draw);
        eng.touch_start(&[p(10.0, 10.0)]);
        eng.touch_move(&[p(20.0, 20.0)]);
        eng.touch_start(&[p(20.0, 20.0), p(100.0, 100.0)]);

        // Single-touch moves are ignored while the pinch is recorded.
        eng.touch_move(&[p(40.0, 40.0)]);
        let Gesture::Drawing { path } = eng.gesture() else {
            panic!("expected drawing");
        };
        assert_eq!(path.len(), 2);

        // Lifting commits the stroke immediately.
        eng.touch_end(&[p(40.0, 40.0)]);
        assert_eq!(eng.elements().len(), 1);
        assert!(eng.gesture().is_idle());
    }

    #[test]
    fn test_zero_distance_pinch_never_updates_zoom() {
        let mut eng = engine();
        eng.touch_start(&[p(100.0, 100.0), p(100.0, 100.0)]);
        eng.touch_move(&[p(100.0, 100.0), p(300.0, 100.0)]);
        assert!((eng.viewport().zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_erased_ids_linger_in_selection_harmlessly() {
        let mut eng = engine();
        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));

        eng.set_active_tool(Tool::Select);
        left_down(&mut eng, p(20.0, 20.0));
        eng.pointer_up();
        assert_eq!(eng.selection().len(), 1);

        eng.set_active_tool(Tool::Eraser);
        left_down(&mut eng, p(20.0, 20.0));
        eng.pointer_up();
        assert!(eng.elements().is_empty());
        // The stale id stays selected and every path skips it.
        assert_eq!(eng.selection().len(), 1);
        eng.key_down("Delete", Modifiers::NONE);
        assert!(eng.elements().is_empty());
        assert!(eng.selection().is_empty());
    }

    #[test]
    fn test_reserved_tools_do_nothing() {
        let mut eng = engine();
        for tool in [Tool::Picture, Tool::Color] {
            eng.set_active_tool(tool);
            left_down(&mut eng, p(10.0, 10.0));
            assert!(eng.gesture().is_idle());
            eng.pointer_move(p(20.0, 20.0));
            eng.pointer_up();
            assert!(eng.elements().is_empty());
        }
    }

    #[test]
    fn test_tool_parses_by_name_and_revision_tracks_changes() {
        let mut eng = engine();
        let r0 = eng.revision();
        eng.set_active_tool_by_name("Diamond").expect("known tool");
        assert_eq!(eng.active_tool(), Tool::Diamond);
        assert!(eng.revision() > r0);

        let err = eng.set_active_tool_by_name("Polygon").unwrap_err();
        assert_eq!(err, UnknownTool("Polygon".to_string()));

        // Idle mouse movement over empty space is not a change.
        eng.set_active_tool(Tool::Select);
        let r1 = eng.revision();
        eng.pointer_move(p(999.0, 999.0));
        assert_eq!(eng.revision(), r1);
    }

    #[test]
    fn test_subscribers_observe_commits() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut eng = engine();
        let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        eng.elements_store()
            .subscribe(move |elements| sink.borrow_mut().push(elements.len()));

        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));
        assert_eq!(seen.borrow().last(), Some(&1));
    }

    #[test]
    fn test_pan_precedes_eraser_marking() {
        let mut eng = engine();
        place_rect(&mut eng, p(10.0, 10.0), p(30.0, 30.0));
        eng.set_active_tool(Tool::Eraser);
        eng.pointer_down(p(20.0, 20.0), PointerButton::Left, Modifiers::ctrl());
        assert!(matches!(eng.gesture(), Gesture::Panning { .. }));
        assert!(!eng.eraser().has_pending());
        eng.pointer_up();
        assert_eq!(eng.elements().len(), 1);
    }
}
