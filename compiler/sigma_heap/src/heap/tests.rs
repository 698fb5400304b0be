#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use std::alloc::Layout;

use pretty_assertions::assert_eq;

use super::*;

#[derive(Debug, PartialEq)]
enum Node {
    Leaf(u32),
    List(Vec<Gc>),
}

impl Trace for Node {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        if let Node::List(children) = self {
            tracer.visit_all(children.iter().copied());
        }
    }

    fn footprint(&self) -> Layout {
        match self {
            Node::Leaf(_) => Layout::new::<u32>(),
            Node::List(children) => {
                Layout::array::<Gc>(children.len()).unwrap_or(Layout::new::<Gc>())
            }
        }
    }
}

#[test]
fn alloc_and_get() {
    let mut heap = Heap::new();
    let a = heap.alloc(Node::Leaf(1));
    let b = heap.alloc(Node::Leaf(2));

    assert_eq!(heap.get(a).unwrap(), &Node::Leaf(1));
    assert_eq!(heap.get(b).unwrap(), &Node::Leaf(2));
    assert_eq!(heap.len(), 2);
    assert_eq!(heap.alive().collect::<Vec<_>>(), vec![a, b]);
}

#[test]
fn rooted_value_survives_sweep() {
    let mut heap = Heap::new();
    let kept = heap.alloc(Node::Leaf(1));

    heap.mark([kept]);
    let stats = heap.sweep();

    assert!(heap.contains(kept));
    assert_eq!(stats.survived, 1);
    assert_eq!(stats.freed, 0);
}

#[test]
fn unrooted_value_is_reclaimed() {
    let mut heap = Heap::new();
    let kept = heap.alloc(Node::Leaf(1));
    let dropped = heap.alloc(Node::Leaf(2));

    heap.mark([kept]);
    heap.sweep();

    assert!(heap.contains(kept));
    assert!(!heap.contains(dropped));
    assert!(!heap.alive().any(|gc| gc == dropped));
    assert_eq!(heap.get(dropped), Err(HeapError::StaleHandle(dropped)));
}

#[test]
fn children_of_roots_survive() {
    let mut heap = Heap::new();
    let leaf = heap.alloc(Node::Leaf(7));
    let inner = heap.alloc(Node::List(vec![leaf]));
    let outer = heap.alloc(Node::List(vec![inner]));

    heap.mark([outer]);
    assert!(heap.is_marked(leaf));
    heap.sweep();

    assert_eq!(heap.len(), 3);
    assert!(!heap.is_marked(leaf), "marks are cleared after sweep");
}

#[test]
fn cycles_terminate() {
    let mut heap = Heap::new();
    let a = heap.alloc(Node::List(vec![]));
    let b = heap.alloc(Node::List(vec![a]));
    *heap.get_mut(a).unwrap() = Node::List(vec![b]);

    heap.mark([a]);
    heap.sweep();
    assert_eq!(heap.len(), 2);

    heap.mark(std::iter::empty());
    heap.sweep();
    assert!(heap.is_empty());
}

#[test]
fn sweep_without_mark_keeps_only_pins() {
    let mut heap = Heap::new();
    let pinned = heap.alloc(Node::Leaf(1));
    let loose = heap.alloc(Node::Leaf(2));
    heap.pin(pinned).unwrap();

    heap.sweep();

    assert!(heap.contains(pinned));
    assert!(!heap.contains(loose));

    heap.unpin(pinned);
    heap.sweep();
    assert!(!heap.contains(pinned));
}

#[test]
fn pins_are_counted() {
    let mut heap = Heap::new();
    let gc = heap.alloc(Node::Leaf(1));
    heap.pin(gc).unwrap();
    heap.pin(gc).unwrap();

    heap.unpin(gc);
    assert!(heap.is_pinned(gc));
    heap.unpin(gc);
    assert!(!heap.is_pinned(gc));
}

#[test]
fn allocation_between_mark_and_sweep_is_born_marked() {
    let mut heap = Heap::new();
    let root = heap.alloc(Node::Leaf(0));
    heap.mark([root]);

    let fresh = heap.alloc(Node::Leaf(1));
    assert!(heap.is_marked(fresh));
    heap.sweep();
    assert!(heap.contains(fresh));

    // Not born in the next cycle, so it goes.
    heap.mark([root]);
    heap.sweep();
    assert!(!heap.contains(fresh));
}

#[test]
fn sweep_retraces_containers_updated_after_mark() {
    let mut heap = Heap::new();
    let loose = heap.alloc(Node::Leaf(9));
    let root = heap.alloc(Node::List(vec![]));

    heap.mark([root]);
    assert!(!heap.is_marked(loose));
    *heap.get_mut(root).unwrap() = Node::List(vec![loose]);
    heap.sweep();

    assert!(heap.contains(loose));
}

#[test]
fn marked_child_moved_out_of_its_root_survives() {
    let mut heap = Heap::new();
    let child = heap.alloc(Node::Leaf(1));
    let root = heap.alloc(Node::List(vec![child]));

    heap.mark([root]);
    // Now held only through a handle the arena never sees.
    let held = child;
    *heap.get_mut(root).unwrap() = Node::List(vec![]);
    heap.sweep();

    assert_eq!(heap.get(held).unwrap(), &Node::Leaf(1));
    assert!(!heap.is_marked(held));
}

#[test]
fn marked_children_keep_their_current_contents_alive() {
    let mut heap = Heap::new();
    let loose = heap.alloc(Node::Leaf(2));
    let inner = heap.alloc(Node::List(vec![]));
    let root = heap.alloc(Node::List(vec![inner]));

    heap.mark([root]);
    *heap.get_mut(inner).unwrap() = Node::List(vec![loose]);
    *heap.get_mut(root).unwrap() = Node::List(vec![]);
    heap.sweep();

    assert!(heap.contains(inner));
    assert!(heap.contains(loose));
}

#[test]
fn marked_value_dropped_after_mark_goes_next_cycle() {
    let mut heap = Heap::new();
    let child = heap.alloc(Node::Leaf(1));
    let root = heap.alloc(Node::List(vec![child]));

    heap.mark([root]);
    *heap.get_mut(root).unwrap() = Node::List(vec![]);
    heap.sweep();
    assert!(heap.contains(child));

    heap.mark([root]);
    heap.sweep();
    assert!(!heap.contains(child));
    assert!(heap.contains(root));
}

#[test]
fn freed_slot_is_reused_with_new_generation() {
    let mut heap = Heap::new();
    let old = heap.alloc(Node::Leaf(1));
    heap.sweep();

    let new = heap.alloc(Node::Leaf(2));
    assert_eq!(new.index(), old.index());
    assert_ne!(new.generation(), old.generation());
    assert!(heap.get(old).is_err());
    assert_eq!(heap.get(new).unwrap(), &Node::Leaf(2));
}

#[test]
fn replace_overwrites_for_every_handle() {
    let mut heap = Heap::new();
    let gc = heap.alloc(Node::Leaf(1));
    let alias = gc;

    let previous = heap.replace(gc, Node::Leaf(5)).unwrap();

    assert_eq!(previous, Node::Leaf(1));
    assert_eq!(heap.get(alias).unwrap(), &Node::Leaf(5));
}

#[test]
fn stats_track_bytes_and_collections() {
    let mut heap = Heap::new();
    let a = heap.alloc(Node::Leaf(1));
    heap.alloc(Node::Leaf(2));
    assert_eq!(heap.stats().live_bytes, 2 * Layout::new::<u32>().size());

    heap.mark([a]);
    heap.sweep();

    let stats = heap.stats();
    assert_eq!(stats.live, 1);
    assert_eq!(stats.free_slots, 1);
    assert_eq!(stats.collections, 1);
    assert_eq!(stats.last_sweep.freed, 1);
    assert_eq!(stats.live_bytes, Layout::new::<u32>().size());
}

#[test]
fn deep_chain_marks_without_recursion() {
    let mut heap = Heap::new();
    let mut head = heap.alloc(Node::Leaf(0));
    for _ in 0..100_000 {
        head = heap.alloc(Node::List(vec![head]));
    }

    heap.mark([head]);
    let stats = heap.sweep();

    assert_eq!(stats.survived, 100_001);
}
