//! Transaction Reconciler — recovers real tender transactions from records.
//!
//! Every real transaction of a split act was written once per order it
//! touched, so within a group the occurrence count of a `(mode, entered)`
//! pair divided by the distinct-order count gives the number of real
//! transactions behind it. Two unrelated transactions of the same mode and
//! identical entered amount in one act will collapse into one; that behavior
//! is preserved deliberately so downstream reports stay comparable.

use std::collections::{HashMap, HashSet};

use shared::billing::{PaymentRecord, TenderMode};

use super::money::{round_money, to_mils};

/// One reconstructed tender transaction within an act
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledTransaction {
    pub mode: TenderMode,
    /// Amount actually tendered per real transaction
    pub entered_amount: f64,
    /// Number of real transactions behind this (mode, amount) pair
    pub count: u32,
    /// Sum of order-scoped allocated amounts for this mode
    pub allocated_total: f64,
}

/// One payment act after deduplication of its per-order records
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledAct {
    pub table_id: String,
    pub server: String,
    pub timestamp: i64,
    /// Present for split acts; singleton groups carry None
    pub split_payment_id: Option<String>,
    pub has_cash: bool,
    pub transactions: Vec<ReconciledTransaction>,
    /// Σ entered_amount × count over unique (mode, amount) pairs
    pub total_entered: f64,
    /// Σ allocated_amount over all records in the group, taken directly
    pub total_allocated: f64,
    /// max(0, entered − allocated), zeroed whenever cash participates
    pub tip: f64,
    /// Discount of the act, read once from any record in the group
    pub discount_amount: f64,
    pub discount: f64,
    pub is_percent_discount: bool,
}

fn reconcile_group(records: &[&PaymentRecord]) -> ReconciledAct {
    let first = records[0];

    // Occurrence count per (mode, entered-in-mils) pair
    let mut occurrences: HashMap<(TenderMode, i64), (f64, u32, f64)> = HashMap::new();
    let mut order_ids: HashSet<&str> = HashSet::new();
    let mut total_allocated = 0.0;
    let mut has_cash = false;

    for record in records {
        let key = (record.mode, to_mils(record.entered_amount));
        let entry = occurrences.entry(key).or_insert((record.entered_amount, 0, 0.0));
        entry.1 += 1;
        entry.2 += record.allocated_amount;
        order_ids.insert(record.order_id.as_str());
        total_allocated += record.allocated_amount;
        has_cash |= record.has_cash_in_payment;
    }

    let distinct_orders = order_ids.len().max(1) as f64;
    let mut transactions: Vec<ReconciledTransaction> = occurrences
        .into_iter()
        .map(|((mode, _), (entered, occ, allocated))| {
            let count = (occ as f64 / distinct_orders).round() as u32;
            ReconciledTransaction {
                mode,
                entered_amount: entered,
                count,
                allocated_total: round_money(allocated),
            }
        })
        .collect();
    transactions.sort_by(|a, b| a.mode.to_string().cmp(&b.mode.to_string()));

    let total_entered = round_money(
        transactions
            .iter()
            .map(|t| t.entered_amount * t.count as f64)
            .sum(),
    );
    let total_allocated = round_money(total_allocated);
    let tip = if has_cash {
        0.0
    } else {
        round_money((total_entered - total_allocated).max(0.0))
    };

    ReconciledAct {
        table_id: first.table_id.clone(),
        server: first.server.clone(),
        timestamp: first.timestamp,
        split_payment_id: first.split_payment_id.clone(),
        has_cash,
        transactions,
        total_entered,
        total_allocated,
        tip,
        discount_amount: first.discount_amount,
        discount: first.discount,
        is_percent_discount: first.is_percent_discount,
    }
}

/// Reduce order-scoped payment records to the acts that produced them
///
/// Split records group by `split_payment_id`; every non-split record stands
/// alone as a group of one. Group order follows first appearance in `records`.
pub fn reconcile(records: &[PaymentRecord]) -> Vec<ReconciledAct> {
    let mut acts: Vec<ReconciledAct> = Vec::new();
    let mut split_groups: Vec<(String, Vec<&PaymentRecord>)> = Vec::new();
    let mut split_index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match record.split_payment_id.as_deref() {
            Some(split_id) => match split_index.get(split_id) {
                Some(&i) => split_groups[i].1.push(record),
                None => {
                    split_index.insert(split_id, split_groups.len());
                    split_groups.push((split_id.to_string(), vec![record]));
                }
            },
            None => acts.push(reconcile_group(&[record])),
        }
    }
    for (_, group) in &split_groups {
        acts.push(reconcile_group(group));
    }
    acts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        order_id: &str,
        mode: TenderMode,
        subtotal: f64,
        allocated: f64,
        entered: f64,
        split_id: Option<&str>,
        has_cash: bool,
    ) -> PaymentRecord {
        PaymentRecord {
            payment_id: uuid::Uuid::new_v4().to_string(),
            timestamp: 1_700_000_000_000,
            table_id: "t1".into(),
            order_id: order_id.into(),
            server: "alice".into(),
            note_id: "main".into(),
            note_name: "main".into(),
            mode,
            subtotal,
            discount: 10.0,
            is_percent_discount: true,
            discount_amount: 10.0,
            allocated_amount: allocated,
            entered_amount: entered,
            excess_amount: None,
            has_cash_in_payment: has_cash,
            is_split_payment: split_id.is_some(),
            split_payment_id: split_id.map(String::from),
            items: Vec::new(),
            complete_payment: true,
        }
    }

    #[test]
    fn singleton_groups_carry_their_own_tip() {
        // Scenario A after allocation: entered 57/38, allocated 54/36
        let records = vec![
            record("a", TenderMode::Card, 60.0, 54.0, 57.0, None, false),
            record("b", TenderMode::Card, 40.0, 36.0, 38.0, None, false),
        ];
        let acts = reconcile(&records);
        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0].tip, 3.0);
        assert_eq!(acts[1].tip, 2.0);
        let total_tip: f64 = acts.iter().map(|a| a.tip).sum();
        assert_eq!(total_tip, 5.0);
    }

    #[test]
    fn split_act_reconstructs_entered_totals() {
        // Scenario B: TPE 50 + CHEQUE 45 over two orders, ticket 90
        let records = vec![
            record("a", TenderMode::Terminal, 60.0, 28.421, 50.0, Some("s1"), false),
            record("a", TenderMode::Cheque, 60.0, 25.579, 45.0, Some("s1"), false),
            record("b", TenderMode::Terminal, 40.0, 18.947, 50.0, Some("s1"), false),
            record("b", TenderMode::Cheque, 40.0, 17.053, 45.0, Some("s1"), false),
        ];
        let acts = reconcile(&records);
        assert_eq!(acts.len(), 1);
        let act = &acts[0];
        assert_eq!(act.total_entered, 95.0);
        assert_eq!(act.total_allocated, 90.0);
        assert_eq!(act.tip, 5.0);
        assert_eq!(act.transactions.len(), 2);
        assert!(act.transactions.iter().all(|t| t.count == 1));
    }

    #[test]
    fn duplicated_transactions_dedupe_to_real_count() {
        // 3 orders each holding copies of the same 2 real CARD transactions
        // of 20.0: 6 occurrences over 3 distinct orders gives exactly 2.
        let mut records = Vec::new();
        for note in ["a", "b", "c"] {
            for _ in 0..2 {
                records.push(record(note, TenderMode::Card, 30.0, 10.0, 20.0, Some("s1"), false));
            }
        }
        let acts = reconcile(&records);
        assert_eq!(acts.len(), 1);
        let tx = &acts[0].transactions[0];
        assert_eq!(tx.count, 2);
        assert_eq!(acts[0].total_entered, 40.0);
        assert_eq!(acts[0].total_allocated, 60.0);
    }

    #[test]
    fn same_amount_same_mode_transactions_collapse() {
        // Known heuristic gap, kept on purpose: two independent CARD
        // transactions of 25.0 touching one order each look like one
        // transaction repeated across two orders.
        let records = vec![
            record("a", TenderMode::Card, 25.0, 25.0, 25.0, Some("s1"), false),
            record("b", TenderMode::Card, 25.0, 25.0, 25.0, Some("s1"), false),
        ];
        let acts = reconcile(&records);
        assert_eq!(acts[0].transactions[0].count, 1);
        assert_eq!(acts[0].total_entered, 25.0);
    }

    #[test]
    fn sparse_pair_rounds_down_to_zero_transactions() {
        // A (mode, amount) pair seen once across three orders rounds to
        // zero real transactions; allocated sums are unaffected since
        // they are taken directly.
        let mut records = vec![
            record("a", TenderMode::Cheque, 30.0, 30.0, 30.0, Some("s1"), false),
            record("b", TenderMode::Cheque, 30.0, 30.0, 30.0, Some("s1"), false),
            record("c", TenderMode::Cheque, 30.0, 30.0, 30.0, Some("s1"), false),
        ];
        records.push(record("a", TenderMode::Card, 10.0, 10.0, 10.0, Some("s1"), false));

        let acts = reconcile(&records);
        let card = acts[0]
            .transactions
            .iter()
            .find(|t| t.mode == TenderMode::Card)
            .unwrap();
        assert_eq!(card.count, 0);
        // Entered total only counts reconstructed transactions
        assert_eq!(acts[0].total_entered, 30.0);
        assert_eq!(acts[0].total_allocated, 100.0);
    }

    #[test]
    fn cash_in_group_zeroes_the_tip() {
        // Scenario D: entered exceeds allocated but cash participates
        let records = vec![
            record("a", TenderMode::Card, 60.0, 54.0, 90.0, Some("s1"), true),
            record("a", TenderMode::Cash, 60.0, 6.0, 15.0, Some("s1"), true),
        ];
        let acts = reconcile(&records);
        assert_eq!(acts[0].tip, 0.0);
        assert!(acts[0].has_cash);
        assert!(acts[0].total_entered > acts[0].total_allocated);
    }

    #[test]
    fn entered_below_allocated_never_yields_negative_tip() {
        let records = vec![record("a", TenderMode::Card, 50.0, 50.0, 48.0, None, false)];
        let acts = reconcile(&records);
        assert_eq!(acts[0].tip, 0.0);
    }

    #[test]
    fn discount_is_read_once_per_group() {
        let records = vec![
            record("a", TenderMode::Card, 60.0, 54.0, 57.0, Some("s1"), false),
            record("b", TenderMode::Card, 40.0, 36.0, 57.0, Some("s1"), false),
        ];
        let acts = reconcile(&records);
        assert_eq!(acts.len(), 1);
        assert_eq!(acts[0].discount_amount, 10.0);
    }
}
