mod common;

use common::{CHAPTER_ONE, MockLayout};
use yomu::{
    CharacterCounter, Document, Flow, PositionIndex,
    nodes::{CountableNode, collect_countable_nodes},
};

fn chapter_nodes() -> (Document, Vec<CountableNode>) {
    let doc = Document::parse(CHAPTER_ONE).expect("Failed to parse chapter");
    let nodes = collect_countable_nodes(&doc, &CharacterCounter::new());
    (doc, nodes)
}

/// Lays nodes out one after another, `step` apart.
fn stacked_layout(nodes: &[CountableNode], step: f64) -> MockLayout {
    let mut layout = MockLayout::new(800.0, 4000.0);
    for (i, node) in nodes.iter().enumerate() {
        layout.place(node.id, i as f64 * step, step, 600.0);
    }
    layout
}

#[test]
fn test_accumulated_counts_are_monotonic() {
    let (_doc, nodes) = chapter_nodes();
    let layout = stacked_layout(&nodes, 100.0);
    let index = PositionIndex::build(&nodes, &layout, Flow::horizontal_tb(), 0.0);

    assert_eq!(index.accumulated_char_counts(), &[3, 17, 33]);
    assert_eq!(index.positions(), &[0.0, 100.0, 200.0]);
    assert_eq!(
        index.total_char_count(),
        nodes.iter().map(|n| n.char_count).sum::<usize>()
    );
    assert!(
        index
            .accumulated_char_counts()
            .windows(2)
            .all(|w| w[0] <= w[1])
    );
}

#[test]
fn test_lookups_in_both_directions() {
    let (_doc, nodes) = chapter_nodes();
    let layout = stacked_layout(&nodes, 100.0);
    let index = PositionIndex::build(&nodes, &layout, Flow::horizontal_tb(), 0.0);

    assert_eq!(index.char_count_at_position(-10.0), 0);
    assert_eq!(index.char_count_at_position(0.0), 3);
    assert_eq!(index.char_count_at_position(150.0), 17);
    assert_eq!(index.char_count_at_position(10_000.0), 33);

    // nothing read yet: ahead of the first node
    assert_eq!(index.position_at_char_count(0), -1.0);
    assert_eq!(index.char_count_at_position(-1.0), 0);
    assert_eq!(index.scroll_offset_at_char_count(0), 0.0);
    assert_eq!(index.position_at_char_count(20), 100.0);
    assert_eq!(index.position_at_char_count(33), 200.0);
}

#[test]
fn test_tie_resolves_to_largest_count() {
    let index = PositionIndex::from_samples([(3, 5.0), (4, 5.0)], Flow::default());
    assert_eq!(index.accumulated_char_counts(), &[3, 7]);
    assert_eq!(index.char_count_at_position(5.0), 7);
}

#[test]
fn test_degenerate_geometry_reuses_previous_position() {
    let (_doc, nodes) = chapter_nodes();
    let mut layout = MockLayout::new(800.0, 4000.0);
    layout.place(nodes[0].id, 5.0, 40.0, 600.0);
    // zero cross extent: the surface could not measure this node
    layout.place(nodes[1].id, 900.0, 0.0, 0.0);
    layout.place(nodes[2].id, 300.0, 40.0, 600.0);

    let index = PositionIndex::build(&nodes, &layout, Flow::horizontal_tb(), 0.0);
    assert_eq!(index.positions(), &[5.0, 5.0, 300.0]);
    assert_eq!(index.char_count_at_position(5.0), 17);
}

#[test]
fn test_unmeasured_leading_node_sits_at_zero() {
    let (_doc, nodes) = chapter_nodes();
    let mut layout = MockLayout::new(800.0, 4000.0);
    layout.place(nodes[1].id, 120.0, 40.0, 600.0);
    layout.place(nodes[2].id, 240.0, 40.0, 600.0);

    let index = PositionIndex::build(&nodes, &layout, Flow::horizontal_tb(), 0.0);
    assert_eq!(index.positions()[0], 0.0);
}

fn assert_round_trip_within(index: &PositionIndex, slack: usize) {
    for count in 0..=index.total_char_count() {
        let pos = index.position_at_char_count(count);
        let restored = index.char_count_at_position(pos);
        assert!(restored <= count, "count {count} restored as {restored}");
        assert!(count - restored <= slack, "count {count} restored as {restored}");
    }
}

#[test]
fn test_round_trip_never_exceeds_saved_count() {
    let index = PositionIndex::from_samples(
        [(3, 0.0), (4, 0.0), (5, 20.0), (1, 20.0), (6, 40.0)],
        Flow::default(),
    );
    assert_round_trip_within(&index, 6);
}

#[test]
fn test_round_trip_inside_first_node() {
    let index =
        PositionIndex::from_samples([(3, 0.0), (14, 100.0), (16, 200.0)], Flow::default());
    for count in 0..3 {
        assert_eq!(index.char_count_at_position(index.position_at_char_count(count)), 0);
    }
    assert_round_trip_within(&index, 15);
}

#[test]
fn test_round_trip_with_first_node_past_zero() {
    let index = PositionIndex::from_samples([(3, 40.0), (14, 100.0)], Flow::default());
    assert_eq!(index.position_at_char_count(2), -1.0);
    assert_round_trip_within(&index, 13);
}

#[test]
fn test_empty_index_degrades_to_zero() {
    let index = PositionIndex::empty(Flow::vertical_rl());
    assert_eq!(index.total_char_count(), 0);
    assert_eq!(index.char_count_at_position(500.0), 0);
    assert_eq!(index.position_at_char_count(12), 0.0);

    let doc = Document::new();
    let nodes = collect_countable_nodes(&doc, &CharacterCounter::new());
    let layout = MockLayout::new(800.0, 800.0);
    let built = PositionIndex::build(&nodes, &layout, Flow::default(), 0.0);
    assert!(built.is_empty());
}

#[test]
fn test_right_to_left_positions_grow_forward() {
    let (_doc, nodes) = chapter_nodes();
    let mut layout = MockLayout::right_to_left(800.0, 4000.0);
    // first column hugs the right edge of the container
    layout.place(nodes[0].id, 760.0, 40.0, 600.0);
    layout.place(nodes[1].id, 620.0, 40.0, 600.0);
    layout.place(nodes[2].id, 500.0, 40.0, 600.0);

    let index = PositionIndex::build(&nodes, &layout, Flow::vertical_rl(), 0.0);
    assert_eq!(index.positions(), &[0.0, 140.0, 260.0]);
    assert_eq!(index.scroll_offset_at_char_count(17), -140.0);
}

#[test]
fn test_scroll_position_and_padding_are_applied() {
    let (_doc, nodes) = chapter_nodes();
    let mut layout = MockLayout::new(800.0, 4000.0);
    layout.padding = 16.0;
    // measured while the view is scrolled 400 forward
    layout.place(nodes[0].id, -384.0, 40.0, 600.0);
    layout.place(nodes[1].id, -284.0, 40.0, 600.0);
    layout.place(nodes[2].id, 116.0, 40.0, 600.0);

    let index = PositionIndex::build(&nodes, &layout, Flow::horizontal_tb(), 400.0);
    assert_eq!(index.positions(), &[0.0, 100.0, 500.0]);
}

#[test]
fn test_update_positions_after_relayout() {
    let (_doc, nodes) = chapter_nodes();
    let layout = stacked_layout(&nodes, 100.0);
    let mut index = PositionIndex::build(&nodes, &layout, Flow::horizontal_tb(), 0.0);

    let wider = stacked_layout(&nodes, 250.0);
    index.update_positions(&wider, 0.0);
    assert_eq!(index.positions(), &[0.0, 250.0, 500.0]);
    assert_eq!(index.accumulated_char_counts(), &[3, 17, 33]);
    assert_eq!(index.char_count_at_position(260.0), 17);
}
