mod common;

use common::MockLayout;
use std::{cell::RefCell, rc::Rc};
use yomu::{
    Flow, FlipOutcome, PageNavigator, SectionNavigator,
    navigator::{NavigatorConfig, PageChange, SectionChange},
};

#[derive(Default)]
struct Calls {
    prev: usize,
    next: usize,
}

struct RecordingSections {
    calls: Rc<RefCell<Calls>>,
    accept: bool,
}

impl SectionNavigator for RecordingSections {
    fn prev_section(&mut self) -> bool {
        self.calls.borrow_mut().prev += 1;
        self.accept
    }

    fn next_section(&mut self) -> bool {
        self.calls.borrow_mut().next += 1;
        self.accept
    }
}

fn navigator(flow: Flow) -> PageNavigator {
    PageNavigator::new(NavigatorConfig {
        flow,
        page_gap: 40.0,
    })
}

fn with_sections(nav: &mut PageNavigator, accept: bool) -> Rc<RefCell<Calls>> {
    let calls = Rc::new(RefCell::new(Calls::default()));
    nav.set_sections(RecordingSections {
        calls: Rc::clone(&calls),
        accept,
    });
    calls
}

#[test]
fn test_backward_flip_at_start_without_sections_stays_put() {
    let mut layout = MockLayout::new(800.0, 4000.0);
    let mut nav = navigator(Flow::default());

    assert_eq!(nav.prev_page(&mut layout), FlipOutcome::Unchanged);
    assert_eq!(nav.position(), 0.0);
    assert_eq!(layout.scroll, 0.0);
}

#[test]
fn test_page_step_includes_gap() {
    let mut layout = MockLayout::new(800.0, 4000.0);
    let mut nav = navigator(Flow::default());

    assert_eq!(nav.page_step(&layout), 840.0);
    assert_eq!(nav.next_page(&mut layout), FlipOutcome::Moved);
    assert_eq!(nav.position(), 840.0);
    assert_eq!(layout.scroll, 840.0);
}

#[test]
fn test_partial_first_page_returns_to_start_before_crossing() {
    let mut layout = MockLayout::new(800.0, 4000.0);
    let mut nav = navigator(Flow::default());
    let calls = with_sections(&mut nav, true);

    nav.scroll_to(&mut layout, 500.0, true);
    assert_eq!(nav.prev_page(&mut layout), FlipOutcome::Moved);
    assert_eq!(nav.position(), 0.0);
    assert_eq!(calls.borrow().prev, 0);

    assert_eq!(
        nav.prev_page(&mut layout),
        FlipOutcome::SectionChanged(SectionChange::Previous)
    );
    assert_eq!(calls.borrow().prev, 1);
}

#[test]
fn test_forward_boundary_asks_next_section_once() {
    let mut layout = MockLayout::new(800.0, 4000.0);
    let mut nav = navigator(Flow::default());
    let calls = with_sections(&mut nav, true);

    nav.scroll_to(&mut layout, 4000.0 - 800.0 - 1.0, true);
    let before = nav.position();

    assert_eq!(
        nav.next_page(&mut layout),
        FlipOutcome::SectionChanged(SectionChange::Next)
    );
    assert_eq!(calls.borrow().next, 1);
    assert_eq!(nav.position(), before);
}

#[test]
fn test_declined_crossing_leaves_position_unchanged() {
    let mut layout = MockLayout::new(800.0, 1600.0);
    let mut nav = navigator(Flow::default());
    let calls = with_sections(&mut nav, false);

    nav.scroll_to(&mut layout, 800.0, true);
    assert_eq!(nav.next_page(&mut layout), FlipOutcome::Unchanged);
    assert_eq!(nav.position(), 800.0);
    assert_eq!(calls.borrow().next, 1);
}

#[test]
fn test_trailing_partial_page_uses_content_offset() {
    let mut layout = MockLayout::new(800.0, 2000.0);
    let mut nav = navigator(Flow::default());

    nav.next_page(&mut layout);
    assert_eq!(nav.next_page(&mut layout), FlipOutcome::Moved);
    assert_eq!(nav.position(), 1680.0);
    assert!(nav.is_transformed());
    assert_eq!(layout.scroll, 1200.0);
    assert_eq!(layout.transform, Some(-480.0));

    // forward stays in offset mode with nowhere to go
    assert_eq!(nav.next_page(&mut layout), FlipOutcome::Unchanged);
    assert!(nav.is_transformed());

    assert_eq!(nav.prev_page(&mut layout), FlipOutcome::Moved);
    assert!(!nav.is_transformed());
    assert_eq!(layout.transform, None);
    assert_eq!(nav.position(), 840.0);
    assert_eq!(layout.scroll, 840.0);
}

#[test]
fn test_forward_from_offset_mode_crosses_and_clears() {
    let mut layout = MockLayout::new(800.0, 2000.0);
    let mut nav = navigator(Flow::default());
    let calls = with_sections(&mut nav, true);

    nav.scroll_to(&mut layout, 1680.0, true);
    assert!(nav.is_transformed());
    assert_eq!(
        nav.next_page(&mut layout),
        FlipOutcome::SectionChanged(SectionChange::Next)
    );
    assert_eq!(calls.borrow().next, 1);
    assert!(!nav.is_transformed());
    assert_eq!(layout.transform, None);
}

#[test]
fn test_right_to_left_scrolls_negative() {
    let mut layout = MockLayout::right_to_left(800.0, 4000.0);
    let mut nav = navigator(Flow::vertical_rl());

    nav.next_page(&mut layout);
    assert_eq!(nav.position(), 840.0);
    assert_eq!(layout.scroll, -840.0);

    nav.scroll_to(&mut layout, 3600.0, true);
    assert!(nav.is_transformed());
    assert_eq!(layout.scroll, -3200.0);
    assert_eq!(layout.transform, Some(400.0));
}

#[test]
fn test_scroll_to_end_lands_on_last_page() {
    let mut layout = MockLayout::new(800.0, 2000.0);
    let mut nav = navigator(Flow::default());

    nav.scroll_to_end(&mut layout, false);
    assert_eq!(nav.position(), 1680.0);

    let mut short = MockLayout::new(800.0, 500.0);
    nav.scroll_to_end(&mut short, false);
    assert_eq!(nav.position(), 0.0);
}

#[test]
fn test_page_changes_are_reported() {
    let mut layout = MockLayout::new(800.0, 4000.0);
    let mut nav = navigator(Flow::default());
    let changes: Rc<RefCell<Vec<PageChange>>> = Rc::default();
    let sink = Rc::clone(&changes);
    nav.set_page_change_sink(move |change| sink.borrow_mut().push(change));

    nav.next_page(&mut layout);
    nav.scroll_to(&mut layout, 100.0, false);
    nav.reset(&mut layout);

    let changes = changes.borrow();
    assert_eq!(
        *changes,
        vec![
            PageChange {
                position: 840.0,
                is_user: true
            },
            PageChange {
                position: 100.0,
                is_user: false
            },
        ]
    );
    assert_eq!(nav.position(), 0.0);
    assert_eq!(layout.scroll, 0.0);
}

#[test]
fn test_sync_adopts_user_scroll() {
    let mut layout = MockLayout::right_to_left(800.0, 4000.0);
    let mut nav = navigator(Flow::vertical_rl());
    let changes: Rc<RefCell<Vec<PageChange>>> = Rc::default();
    let sink = Rc::clone(&changes);
    nav.set_page_change_sink(move |change| sink.borrow_mut().push(change));

    layout.scroll = -300.0;
    nav.sync_from_layout(&layout);
    assert_eq!(nav.position(), 300.0);

    nav.sync_from_layout(&layout);
    assert_eq!(changes.borrow().len(), 1);
    assert!(changes.borrow()[0].is_user);
}
