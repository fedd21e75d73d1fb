//! Item Ledger — FIFO lookup and settlement of unpaid item quantities.
//!
//! Matching is keyed on the item id; the selection's name is only an
//! assertion and a mismatch is logged, never rejected. Consumption is greedy
//! in structural order: oldest order first across a table, main note before
//! sub-notes inside an order unless a specific note is requested. Totals are
//! recomputed from scratch after every mutation — payments, cancellations
//! and transfers all touch the same lines, so incremental maintenance would
//! drift.

use shared::billing::{ItemSelection, Note, Order};

use super::money::{to_decimal, to_f64};
use rust_decimal::Decimal;

/// One unpaid occurrence of a selected item
#[derive(Debug, Clone, PartialEq)]
pub struct UnpaidInstance {
    pub order_id: String,
    pub note_id: String,
    pub unpaid_qty: i32,
}

/// One settled slice of an item line
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumedInstance {
    pub order_id: String,
    pub note_id: String,
    pub note_name: String,
    pub item_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
}

/// Result of a consume call; `consumed_qty` may be less than requested
/// (never more), and zero when nothing was available.
#[derive(Debug, Clone, Default)]
pub struct ConsumeOutcome {
    pub consumed_qty: i32,
    pub instances: Vec<ConsumedInstance>,
}

fn normalized(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Case- and whitespace-insensitive name comparison
fn names_match(a: &str, b: &str) -> bool {
    normalized(a) == normalized(b)
}

fn assert_name(sel: &ItemSelection, line_name: &str, order_id: &str) {
    if !names_match(&sel.name, line_name) {
        tracing::warn!(
            item_id = %sel.item_id,
            requested = %sel.name,
            matched = %line_name,
            order_id = %order_id,
            "Item name differs from matched line, accepting by id"
        );
    }
}

/// Indices of payable orders in FIFO order (ascending creation time)
///
/// Pending and declined orders never participate in matching.
fn fifo_indices(orders: &[Order]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..orders.len()).filter(|&i| orders[i].is_open()).collect();
    idx.sort_by_key(|&i| orders[i].created_at);
    idx
}

/// Locate unpaid quantity of a selected item across a table's orders
///
/// Visits orders oldest first; inside an order the notes keep their
/// structural order (main first). An `order_id` on the selection restricts
/// matching to that order, a `note_id` to that note; the two compose, which
/// is how one specific order's main note is addressed.
pub fn find_unpaid_instances(orders: &[Order], sel: &ItemSelection) -> Vec<UnpaidInstance> {
    let mut found = Vec::new();
    for i in fifo_indices(orders) {
        let order = &orders[i];
        if let Some(order_id) = &sel.order_id
            && order.id != *order_id
        {
            continue;
        }
        for note in &order.notes {
            if let Some(note_id) = &sel.note_id
                && note.id != *note_id
            {
                continue;
            }
            for line in &note.lines {
                if line.item_id != sel.item_id || line.unpaid_quantity() == 0 {
                    continue;
                }
                assert_name(sel, &line.name, &order.id);
                found.push(UnpaidInstance {
                    order_id: order.id.clone(),
                    note_id: note.id.clone(),
                    unpaid_qty: line.unpaid_quantity(),
                });
            }
        }
    }
    found
}

/// Consume up to `sel.quantity` units of the selected item, FIFO
///
/// Increments `paid_quantity` on the matched lines, splitting across
/// instances when one line cannot cover the request. Never consumes more
/// than requested or more than available; returns zero consumed (not an
/// error) when nothing matched. Callers must recompute totals afterwards.
pub fn consume(orders: &mut [Order], sel: &ItemSelection) -> ConsumeOutcome {
    let mut remaining = sel.quantity.max(0);
    let mut outcome = ConsumeOutcome::default();

    for i in fifo_indices(orders) {
        if remaining == 0 {
            break;
        }
        let order = &mut orders[i];
        if let Some(scoped) = &sel.order_id
            && order.id != *scoped
        {
            continue;
        }
        let order_id = order.id.clone();
        for note in &mut order.notes {
            if remaining == 0 {
                break;
            }
            if let Some(note_id) = &sel.note_id
                && note.id != *note_id
            {
                continue;
            }
            for line in &mut note.lines {
                if remaining == 0 {
                    break;
                }
                if line.item_id != sel.item_id {
                    continue;
                }
                let available = line.unpaid_quantity();
                if available == 0 {
                    continue;
                }
                assert_name(sel, &line.name, &order_id);
                let take = remaining.min(available);
                line.paid_quantity += take;
                debug_assert!(line.paid_quantity <= line.quantity);
                remaining -= take;
                outcome.consumed_qty += take;
                outcome.instances.push(ConsumedInstance {
                    order_id: order_id.clone(),
                    note_id: note.id.clone(),
                    note_name: note.name.clone(),
                    item_id: line.item_id.clone(),
                    name: line.name.clone(),
                    unit_price: line.unit_price,
                    quantity: take,
                });
            }
        }
    }

    outcome
}

/// Recompute a note's remaining total from its lines
///
/// Pure function of the item list: total = Σ price × (quantity − paid).
pub fn recompute_note_total(note: &mut Note) {
    let total: Decimal = note
        .lines
        .iter()
        .map(|l| to_decimal(l.unit_price) * Decimal::from(l.unpaid_quantity()))
        .sum();
    note.total = to_f64(total);
    note.paid = note.lines.iter().all(|l| l.unpaid_quantity() == 0);
}

/// Recompute an order's remaining total from all notes
pub fn recompute_order_total(order: &mut Order) {
    let mut total = Decimal::ZERO;
    for note in &mut order.notes {
        recompute_note_total(note);
        total += to_decimal(note.total);
    }
    order.total = to_f64(total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::billing::{ItemLine, OrderStatus};

    fn selection(item_id: &str, qty: i32) -> ItemSelection {
        ItemSelection {
            order_id: None,
            note_id: None,
            item_id: item_id.into(),
            name: item_id.into(),
            quantity: qty,
        }
    }

    fn order_with(table: &str, created_at: i64, lines: Vec<ItemLine>) -> Order {
        let mut order = Order::new(table, lines);
        order.created_at = created_at;
        recompute_order_total(&mut order);
        order
    }

    #[test]
    fn consumes_oldest_order_first() {
        let mut orders = vec![
            order_with("t1", 200, vec![ItemLine::new("cola", "Cola", 3.0, 2)]),
            order_with("t1", 100, vec![ItemLine::new("cola", "Cola", 3.0, 2)]),
        ];
        let newest = orders[0].id.clone();
        let oldest = orders[1].id.clone();

        let outcome = consume(&mut orders, &selection("cola", 3));
        assert_eq!(outcome.consumed_qty, 3);
        assert_eq!(outcome.instances.len(), 2);
        assert_eq!(outcome.instances[0].order_id, oldest);
        assert_eq!(outcome.instances[0].quantity, 2);
        assert_eq!(outcome.instances[1].order_id, newest);
        assert_eq!(outcome.instances[1].quantity, 1);
    }

    #[test]
    fn consume_clamps_to_available() {
        // Requesting 3 with only 2 unpaid must consume exactly 2, never error
        let mut orders = vec![order_with(
            "t1",
            100,
            vec![ItemLine::new("cola", "Cola", 3.0, 2)],
        )];
        let outcome = consume(&mut orders, &selection("cola", 3));
        assert_eq!(outcome.consumed_qty, 2);
        assert_eq!(orders[0].notes[0].lines[0].paid_quantity, 2);
    }

    #[test]
    fn consume_nothing_available_returns_zero() {
        let mut orders = vec![order_with(
            "t1",
            100,
            vec![ItemLine::new("cola", "Cola", 3.0, 1)],
        )];
        orders[0].notes[0].lines[0].paid_quantity = 1;
        let outcome = consume(&mut orders, &selection("cola", 1));
        assert_eq!(outcome.consumed_qty, 0);
        assert!(outcome.instances.is_empty());
    }

    #[test]
    fn consume_respects_note_scope() {
        let mut order = order_with("t1", 100, vec![ItemLine::new("cola", "Cola", 3.0, 2)]);
        order
            .notes
            .push(Note::sub("terrace", vec![ItemLine::new("cola", "Cola", 3.0, 2)]));
        let sub_id = order.notes[1].id.clone();
        let mut orders = vec![order];

        let sel = ItemSelection {
            note_id: Some(sub_id.clone()),
            ..selection("cola", 2)
        };
        let outcome = consume(&mut orders, &sel);
        assert_eq!(outcome.consumed_qty, 2);
        assert!(outcome.instances.iter().all(|c| c.note_id == sub_id));
        // Main note untouched
        assert_eq!(orders[0].notes[0].lines[0].paid_quantity, 0);
    }

    #[test]
    fn order_hint_confines_a_main_note_selection() {
        // Main notes all share the "main" id, so without the order hint a
        // qty-2 selection would drain both orders' main notes FIFO.
        let mut orders = vec![
            order_with("t1", 100, vec![ItemLine::new("cola", "Cola", 3.0, 1)]),
            order_with("t1", 200, vec![ItemLine::new("cola", "Cola", 3.0, 1)]),
        ];
        let second_id = orders[1].id.clone();

        let sel = ItemSelection {
            order_id: Some(second_id.clone()),
            note_id: Some("main".into()),
            ..selection("cola", 2)
        };
        let outcome = consume(&mut orders, &sel);

        // Only the hinted order's single unit is consumed
        assert_eq!(outcome.consumed_qty, 1);
        assert!(outcome.instances.iter().all(|c| c.order_id == second_id));
        assert_eq!(orders[0].notes[0].lines[0].paid_quantity, 0);
        assert_eq!(orders[1].notes[0].lines[0].paid_quantity, 1);
    }

    #[test]
    fn without_order_hint_main_notes_match_table_wide() {
        let mut orders = vec![
            order_with("t1", 100, vec![ItemLine::new("cola", "Cola", 3.0, 1)]),
            order_with("t1", 200, vec![ItemLine::new("cola", "Cola", 3.0, 1)]),
        ];
        let sel = ItemSelection {
            note_id: Some("main".into()),
            ..selection("cola", 2)
        };
        let outcome = consume(&mut orders, &sel);
        assert_eq!(outcome.consumed_qty, 2);
        let distinct: std::collections::HashSet<_> =
            outcome.instances.iter().map(|c| c.order_id.clone()).collect();
        assert_eq!(distinct.len(), 2);
    }

    #[test]
    fn main_note_visited_before_sub_notes() {
        let mut order = order_with("t1", 100, vec![ItemLine::new("cola", "Cola", 3.0, 1)]);
        order
            .notes
            .push(Note::sub("terrace", vec![ItemLine::new("cola", "Cola", 3.0, 1)]));
        let mut orders = vec![order];

        let outcome = consume(&mut orders, &selection("cola", 1));
        assert_eq!(outcome.instances[0].note_id, shared::billing::MAIN_NOTE_ID);
    }

    #[test]
    fn name_mismatch_is_accepted() {
        let mut orders = vec![order_with(
            "t1",
            100,
            vec![ItemLine::new("cola", "Coca-Cola 33cl", 3.0, 1)],
        )];
        let sel = ItemSelection {
            order_id: None,
            note_id: None,
            item_id: "cola".into(),
            name: "completely different".into(),
            quantity: 1,
        };
        let outcome = consume(&mut orders, &sel);
        assert_eq!(outcome.consumed_qty, 1);
    }

    #[test]
    fn name_comparison_ignores_case_and_whitespace() {
        assert!(names_match("Coca Cola", "cocacola"));
        assert!(names_match("  Café  Crème ", "cafécrème"));
        assert!(!names_match("Cola", "Fanta"));
    }

    #[test]
    fn recompute_is_pure_and_deterministic() {
        let mut order = order_with(
            "t1",
            100,
            vec![
                ItemLine::new("a", "A", 2.5, 4),
                ItemLine::new("b", "B", 1.2, 3),
            ],
        );
        order.notes[0].lines[0].paid_quantity = 1;
        recompute_order_total(&mut order);
        let first = order.total;
        recompute_order_total(&mut order);
        assert_eq!(order.total, first);
        // 2.5 * 3 + 1.2 * 3 = 11.1
        assert_eq!(order.total, 11.1);
    }

    #[test]
    fn recompute_marks_note_paid() {
        let mut order = order_with("t1", 100, vec![ItemLine::new("a", "A", 2.0, 2)]);
        order.notes[0].lines[0].paid_quantity = 2;
        recompute_order_total(&mut order);
        assert!(order.notes[0].paid);
        assert_eq!(order.total, 0.0);
        assert_eq!(order.status, OrderStatus::Open);
    }

    #[test]
    fn paid_quantity_never_exceeds_quantity() {
        let mut orders = vec![order_with(
            "t1",
            100,
            vec![ItemLine::new("a", "A", 2.0, 5)],
        )];
        consume(&mut orders, &selection("a", 2));
        consume(&mut orders, &selection("a", 9));
        let line = &orders[0].notes[0].lines[0];
        assert!(line.paid_quantity >= 0 && line.paid_quantity <= line.quantity);
        assert_eq!(line.paid_quantity, 5);
    }

    #[test]
    fn pending_orders_are_skipped() {
        let mut pending = order_with("t1", 100, vec![ItemLine::new("a", "A", 2.0, 2)]);
        pending.status = OrderStatus::PendingConfirmation;
        let mut orders = vec![pending];
        let outcome = consume(&mut orders, &selection("a", 1));
        assert_eq!(outcome.consumed_qty, 0);
    }

    #[test]
    fn find_lists_instances_in_fifo_order() {
        let orders = vec![
            order_with("t1", 300, vec![ItemLine::new("a", "A", 2.0, 1)]),
            order_with("t1", 100, vec![ItemLine::new("a", "A", 2.0, 2)]),
            order_with("t1", 200, vec![ItemLine::new("a", "A", 2.0, 3)]),
        ];
        let found = find_unpaid_instances(&orders, &selection("a", 1));
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].unpaid_qty, 2);
        assert_eq!(found[1].unpaid_qty, 3);
        assert_eq!(found[2].unpaid_qty, 1);
    }
}
