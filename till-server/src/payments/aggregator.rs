//! Aggregator — reporting totals over reconciled payment acts.
//!
//! Gross sales sum allocated amounts; collected revenue sums entered amounts
//! for cash and scriptural modes, substituting allocated whenever cash
//! participated in the act (so a scriptural overpayment is a tip, not
//! revenue). Deferred-debt money is never revenue. Discounts are counted once
//! per act, keyed so the per-order duplicates of one act collapse.

use std::collections::HashMap;

use serde::Serialize;
use shared::billing::{PaymentRecord, TenderMode};

use super::money::{round_money, to_mils};
use super::reconciler::{self, ReconciledAct};

/// Act identity for discount deduplication
///
/// Split acts are identified by their split id; single-mode acts by the
/// act timestamp, mode and discount rate, since each touched order wrote
/// its own singleton group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DiscountKey {
    Split { table_id: String, split_id: String },
    Single { table_id: String, timestamp: i64, mode: TenderMode, rate_mils: i64 },
}

impl DiscountKey {
    fn for_act(act: &ReconciledAct) -> Self {
        match &act.split_payment_id {
            Some(split_id) => DiscountKey::Split {
                table_id: act.table_id.clone(),
                split_id: split_id.clone(),
            },
            None => DiscountKey::Single {
                table_id: act.table_id.clone(),
                timestamp: act.timestamp,
                mode: act
                    .transactions
                    .first()
                    .map(|t| t.mode)
                    .unwrap_or(TenderMode::Cash),
                rate_mils: to_mils(act.discount),
            },
        }
    }
}

/// Reporting totals for one period
#[derive(Debug, Clone, Default, Serialize)]
pub struct SalesReport {
    /// Gross sales: Σ allocated over every reconciled act
    pub gross_sales: f64,
    /// Money actually collected, tips and deferred debt excluded
    pub collected_revenue: f64,
    /// Deferred-debt total, reported separately from revenue
    pub credit_total: f64,
    /// Collected revenue per tender mode
    pub mode_totals: HashMap<TenderMode, f64>,
    /// Tip totals per server
    pub server_tips: HashMap<String, f64>,
    pub tip_total: f64,
    /// Discount, counted once per unique act
    pub discount_total: f64,
    pub discount_count: u32,
    /// Real transactions recovered by reconciliation
    pub transaction_count: u32,
}

/// Build the period report from raw order-scoped payment records
pub fn aggregate(records: &[PaymentRecord]) -> SalesReport {
    let acts = reconciler::reconcile(records);
    aggregate_acts(&acts)
}

pub fn aggregate_acts(acts: &[ReconciledAct]) -> SalesReport {
    let mut report = SalesReport::default();
    let mut discounts_seen: HashMap<DiscountKey, ()> = HashMap::new();

    for act in acts {
        report.gross_sales += act.total_allocated;
        report.tip_total += act.tip;
        if act.tip > 0.0 {
            *report.server_tips.entry(act.server.clone()).or_default() += act.tip;
        }

        for tx in &act.transactions {
            report.transaction_count += tx.count;
            if tx.mode.is_credit() {
                report.credit_total += tx.allocated_total;
                continue;
            }
            // Cash in the act makes entered unreliable as revenue: the
            // scriptural surplus went back as change, so allocated is
            // what the till actually keeps.
            let revenue = if act.has_cash {
                tx.allocated_total
            } else {
                tx.entered_amount * tx.count as f64
            };
            report.collected_revenue += revenue;
            *report.mode_totals.entry(tx.mode).or_default() += revenue;
        }

        if act.discount_amount > 0.0
            && discounts_seen.insert(DiscountKey::for_act(act), ()).is_none()
        {
            report.discount_total += act.discount_amount;
            report.discount_count += 1;
        }
    }

    report.gross_sales = round_money(report.gross_sales);
    report.collected_revenue = round_money(report.collected_revenue);
    report.credit_total = round_money(report.credit_total);
    report.tip_total = round_money(report.tip_total);
    report.discount_total = round_money(report.discount_total);
    for value in report.mode_totals.values_mut() {
        *value = round_money(*value);
    }
    for value in report.server_tips.values_mut() {
        *value = round_money(*value);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        order_id: &str,
        mode: TenderMode,
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
            subtotal: allocated,
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
    fn scenario_a_report() {
        // Single-mode CARD act over two orders: allocated 54/36, entered 57/38
        let records = vec![
            record("a", TenderMode::Card, 54.0, 57.0, None, false),
            record("b", TenderMode::Card, 36.0, 38.0, None, false),
        ];
        let report = aggregate(&records);
        assert_eq!(report.gross_sales, 90.0);
        assert_eq!(report.collected_revenue, 95.0);
        assert_eq!(report.tip_total, 5.0);
        assert_eq!(report.server_tips["alice"], 5.0);
        assert_eq!(report.mode_totals[&TenderMode::Card], 95.0);
        // Two singleton groups, one act: discount counted once
        assert_eq!(report.discount_count, 1);
        assert_eq!(report.discount_total, 10.0);
    }

    #[test]
    fn cash_act_substitutes_allocated_for_revenue() {
        let records = vec![
            record("a", TenderMode::Card, 54.0, 90.0, Some("s1"), true),
            record("a", TenderMode::Cash, 36.0, 15.0, Some("s1"), true),
        ];
        let report = aggregate(&records);
        // entered exceeds allocated but cash participates: allocated wins
        assert_eq!(report.collected_revenue, 90.0);
        assert_eq!(report.tip_total, 0.0);
        assert!(report.server_tips.is_empty());
    }

    #[test]
    fn credit_excluded_from_revenue() {
        let records = vec![
            record("a", TenderMode::Credit, 40.0, 40.0, None, false),
            record("b", TenderMode::Card, 30.0, 30.0, None, false),
        ];
        let report = aggregate(&records);
        assert_eq!(report.gross_sales, 70.0);
        assert_eq!(report.collected_revenue, 30.0);
        assert_eq!(report.credit_total, 40.0);
        assert!(!report.mode_totals.contains_key(&TenderMode::Credit));
    }

    #[test]
    fn split_act_discount_counted_once() {
        let records = vec![
            record("a", TenderMode::Terminal, 28.421, 50.0, Some("s1"), false),
            record("a", TenderMode::Cheque, 25.579, 45.0, Some("s1"), false),
            record("b", TenderMode::Terminal, 18.947, 50.0, Some("s1"), false),
            record("b", TenderMode::Cheque, 17.053, 45.0, Some("s1"), false),
        ];
        let report = aggregate(&records);
        assert_eq!(report.discount_count, 1);
        assert_eq!(report.collected_revenue, 95.0);
        assert_eq!(report.gross_sales, 90.0);
        assert_eq!(report.transaction_count, 2);
    }

    #[test]
    fn two_acts_two_discounts() {
        let mut records = vec![record("a", TenderMode::Card, 54.0, 57.0, None, false)];
        let mut second = record("b", TenderMode::Card, 36.0, 38.0, None, false);
        second.timestamp += 60_000;
        records.push(second);
        let report = aggregate(&records);
        assert_eq!(report.discount_count, 2);
        assert_eq!(report.discount_total, 20.0);
    }

    #[test]
    fn empty_period_yields_zeroed_report() {
        let report = aggregate(&[]);
        assert_eq!(report.gross_sales, 0.0);
        assert_eq!(report.transaction_count, 0);
        assert!(report.mode_totals.is_empty());
    }
}
