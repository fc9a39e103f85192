use html::{DOM, MutationRecord, NodeId};
use tokio::sync::mpsc::UnboundedReceiver;

fn drain(rx: &mut UnboundedReceiver<Vec<MutationRecord>>) -> Vec<Vec<MutationRecord>> {
    let mut batches = Vec::new();
    while let Ok(batch) = rx.try_recv() {
        batches.push(batch);
    }
    batches
}

fn document_with_div() -> (DOM, NodeId) {
    let mut dom = DOM::new();
    let div = dom.create_element("div");
    dom.append_child(dom.root(), div).unwrap();
    (dom, div)
}

#[test]
fn each_edit_delivers_one_batch() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut dom, div) = document_with_div();
    let (_id, mut rx) = dom.observe(dom.root());

    let group = dom.create_fragment();
    let nodes: Vec<NodeId> = ["a", "b", "c"]
        .iter()
        .map(|tag| {
            let node = dom.create_element(tag);
            dom.append_child(group, node).unwrap();
            node
        })
        .collect();
    assert!(drain(&mut rx).is_empty(), "detached edits are unobserved");

    dom.append_child(div, group).unwrap();
    let batches = drain(&mut rx);
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0],
        vec![MutationRecord {
            target: div,
            added: nodes,
            removed: Vec::new(),
        }]
    );
}

#[test]
fn moves_report_removal_and_addition_together() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut dom, div) = document_with_div();
    let from = dom.create_element("p");
    let to = dom.create_element("p");
    let moved = dom.create_element("span");
    dom.append_child(div, from).unwrap();
    dom.append_child(div, to).unwrap();
    dom.append_child(from, moved).unwrap();
    let (_id, mut rx) = dom.observe(div);

    dom.append_child(to, moved).unwrap();
    let batches = drain(&mut rx);
    assert_eq!(batches.len(), 1);
    let targets: Vec<NodeId> = batches[0].iter().map(|record| record.target).collect();
    assert_eq!(targets, vec![from, to]);
    assert_eq!(batches[0][0].removed, vec![moved]);
    assert_eq!(batches[0][1].added, vec![moved]);
}

#[test]
fn observers_only_see_their_subtree() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut dom, div) = document_with_div();
    let sibling = dom.create_element("aside");
    dom.append_child(dom.root(), sibling).unwrap();
    let (_id, mut rx) = dom.observe(div);

    let outside = dom.create_element("b");
    dom.append_child(sibling, outside).unwrap();
    assert!(drain(&mut rx).is_empty());

    let inside = dom.create_text("hi");
    dom.append_child(div, inside).unwrap();
    assert_eq!(drain(&mut rx).len(), 1);
}

#[test]
fn suspended_observers_drop_records_until_resumed() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut dom, div) = document_with_div();
    let (id, mut rx) = dom.observe(dom.root());

    assert!(dom.suspend(id));
    let quiet = dom.create_element("a");
    dom.append_child(div, quiet).unwrap();
    assert!(dom.resume(id));
    assert!(drain(&mut rx).is_empty());

    dom.remove_child(div, quiet).unwrap();
    let batches = drain(&mut rx);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].removed, vec![quiet]);
}

#[test]
fn disconnect_is_idempotent_and_stops_delivery() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut dom, div) = document_with_div();
    let (id, mut rx) = dom.observe(dom.root());
    assert_eq!(dom.observer_count(), 1);

    assert!(dom.disconnect(id));
    assert!(!dom.disconnect(id));
    assert!(!dom.suspend(id));
    assert_eq!(dom.observer_count(), 0);

    let node = dom.create_element("a");
    dom.append_child(div, node).unwrap();
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn closed_receivers_are_pruned_on_delivery() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut dom, div) = document_with_div();
    let (_id, rx) = dom.observe(dom.root());
    drop(rx);

    let node = dom.create_element("a");
    dom.append_child(div, node).unwrap();
    assert_eq!(dom.observer_count(), 0);
}
