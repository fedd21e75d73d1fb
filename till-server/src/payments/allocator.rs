//! Payment Allocator — turns a payment request into order-scoped records.
//!
//! Items are matched FIFO across the table, the discount and entered amounts
//! are allocated proportionally to each touched order's subtotal, and one
//! payment record is written per (order, mode). For multi-mode acts every
//! record carries the act's `split_payment_id` and the mode's entered amount
//! as a repeated constant; the reconciler later divides it back out by the
//! number of distinct orders a transaction touched.

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::billing::{Order, PaymentItem, PaymentRecord, PaymentRequest, TenderMode};

use super::error::{PaymentError, PaymentResult};
use super::ledger::{self, ConsumedInstance};
use super::money::{is_settled, to_decimal, to_f64, validate_payment_request};
use crate::credit::DebtEntry;

/// One mode of the act after normalization
#[derive(Debug, Clone)]
struct Tender {
    mode: TenderMode,
    entered: Decimal,
    credit_client_id: Option<String>,
}

/// Result of one allocation pass
#[derive(Debug, Clone, Default)]
pub struct AllocationOutcome {
    /// Ids of orders archived by this act
    pub archived_orders: Vec<String>,
    /// Total actually paid for the act (caller-declared final amount, or the
    /// ticket after discount)
    pub total_paid: f64,
    /// Every order this act touched, in FIFO order
    pub touched_orders: Vec<String>,
    /// Debt entries for the deferred-debt mode, one per touched order
    pub debts: Vec<DebtEntry>,
}

/// Per-order aggregate of the consumed instances
struct OrderShare {
    order_id: String,
    subtotal: Decimal,
    note_id: String,
    note_name: String,
    items: Vec<PaymentItem>,
}

fn normalize_tenders(req: &PaymentRequest) -> (Vec<Tender>, bool) {
    match &req.split_payments {
        Some(splits) => {
            let tenders = splits
                .iter()
                .map(|s| Tender {
                    mode: s.mode,
                    entered: to_decimal(s.entered_amount),
                    credit_client_id: s.credit_client_id.clone(),
                })
                .collect();
            (tenders, true)
        }
        None => {
            // validate_payment_request guarantees mode and entered_amount
            let tenders = vec![Tender {
                mode: req.mode.unwrap_or(TenderMode::Cash),
                entered: to_decimal(req.entered_amount.unwrap_or(0.0)),
                credit_client_id: req.credit_client_id.clone(),
            }];
            (tenders, false)
        }
    }
}

/// Group consumed instances per order, preserving FIFO order of first touch
fn order_shares(consumed: &[ConsumedInstance]) -> Vec<OrderShare> {
    let mut shares: Vec<OrderShare> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for inst in consumed {
        let value = to_decimal(inst.unit_price) * Decimal::from(inst.quantity);
        match index.get(&inst.order_id) {
            Some(&i) => {
                let share = &mut shares[i];
                share.subtotal += value;
                share.items.push(PaymentItem {
                    item_id: inst.item_id.clone(),
                    name: inst.name.clone(),
                    unit_price: inst.unit_price,
                    quantity: inst.quantity,
                });
            }
            None => {
                index.insert(inst.order_id.clone(), shares.len());
                shares.push(OrderShare {
                    order_id: inst.order_id.clone(),
                    subtotal: value,
                    note_id: inst.note_id.clone(),
                    note_name: inst.note_name.clone(),
                    items: vec![PaymentItem {
                        item_id: inst.item_id.clone(),
                        name: inst.name.clone(),
                        unit_price: inst.unit_price,
                        quantity: inst.quantity,
                    }],
                });
            }
        }
    }

    // Round each order subtotal to the monetary scale once, after summation
    for share in &mut shares {
        share.subtotal = to_decimal(to_f64(share.subtotal));
    }
    shares
}

/// Structural lookups fail before anything is consumed: an order hint or a
/// note id naming an entity that exists nowhere on the table is a not-found
/// error, distinct from a valid scope that merely holds no unpaid stock.
fn check_selection_scopes(orders: &[Order], req: &PaymentRequest) -> PaymentResult<()> {
    for sel in &req.items {
        match (&sel.order_id, &sel.note_id) {
            (Some(order_id), note) => {
                let order = orders
                    .iter()
                    .find(|o| o.id == *order_id)
                    .ok_or_else(|| PaymentError::OrderNotFound(order_id.clone()))?;
                if let Some(note_id) = note
                    && order.note(note_id).is_none()
                {
                    return Err(PaymentError::NoteNotFound(note_id.clone()));
                }
            }
            (None, Some(note_id)) => {
                if !orders.iter().any(|o| o.note(note_id).is_some()) {
                    return Err(PaymentError::NoteNotFound(note_id.clone()));
                }
            }
            (None, None) => {}
        }
    }
    Ok(())
}

/// Run the full allocation for one payment request against a table's orders
///
/// Mutates the orders in place: increments `paid_quantity` on covered lines,
/// appends the payment records, recomputes all touched totals and archives
/// any order whose remaining total fell within tolerance of zero. Caller
/// must hold the table lock for the whole call.
pub fn allocate(
    orders: &mut [Order],
    table_id: &str,
    req: &PaymentRequest,
) -> PaymentResult<AllocationOutcome> {
    validate_payment_request(req)?;
    check_selection_scopes(orders, req)?;

    // 1. Consume every selection FIFO across the table
    let mut consumed: Vec<ConsumedInstance> = Vec::new();
    for sel in &req.items {
        let outcome = ledger::consume(orders, sel);
        if outcome.consumed_qty == 0 {
            // Partial misses are tolerated; the act fails only if nothing matched
            tracing::warn!(
                table_id = %table_id,
                item_id = %sel.item_id,
                requested = sel.quantity,
                "No unpaid instance found for selection"
            );
        } else if outcome.consumed_qty < sel.quantity {
            tracing::warn!(
                table_id = %table_id,
                item_id = %sel.item_id,
                requested = sel.quantity,
                consumed = outcome.consumed_qty,
                "Selection only partially covered by unpaid stock"
            );
        }
        consumed.extend(outcome.instances);
    }
    if consumed.is_empty() {
        return Err(PaymentError::NoUnpaidItems);
    }

    // 2. Per-order subtotals and act totals
    let shares = order_shares(&consumed);
    let total_subtotal: Decimal = to_decimal(to_f64(shares.iter().map(|s| s.subtotal).sum()));

    // 3. Discount and ticket
    let total_discount = if req.is_percent_discount {
        to_decimal(to_f64(total_subtotal * to_decimal(req.discount) / Decimal::ONE_HUNDRED))
    } else {
        to_decimal(req.discount)
    };
    let ticket = total_subtotal - total_discount;

    // 4. Actual total paid: caller-declared final amount wins
    let actual_total_paid = req
        .final_amount
        .map(to_decimal)
        .unwrap_or(ticket);

    // 5. Tender normalization
    let (tenders, is_split) = normalize_tenders(req);
    let total_entered: Decimal = tenders.iter().map(|t| t.entered).sum();
    let has_cash = tenders.iter().any(|t| t.mode.is_cash());
    let split_payment_id = is_split.then(|| uuid::Uuid::new_v4().to_string());
    let timestamp = chrono::Utc::now().timestamp_millis();

    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, order) in orders.iter().enumerate() {
        index.insert(order.id.clone(), i);
    }

    let mut outcome = AllocationOutcome {
        total_paid: to_f64(actual_total_paid),
        ..Default::default()
    };
    // Record ids written this act, per order, for complete-payment flagging
    let mut written: HashMap<String, Vec<String>> = HashMap::new();

    // 6/7. One record per (order, mode)
    for share in &shares {
        let proportion = if total_subtotal.is_zero() {
            Decimal::ZERO
        } else {
            share.subtotal / total_subtotal
        };
        let discount_share = to_decimal(to_f64(total_discount * proportion));
        let allocated = to_decimal(to_f64(share.subtotal - discount_share));

        for tender in &tenders {
            let (entered_amount, allocated_amount, excess) = if is_split {
                // Mode's share of the ticket comes from entered-amount
                // proportions; entered stays the repeated act constant.
                let mode_share = if total_entered.is_zero() {
                    Decimal::ZERO
                } else {
                    tender.entered / total_entered
                };
                let allocated_for_mode = to_f64(allocated * mode_share);
                (to_f64(tender.entered), allocated_for_mode, None)
            } else {
                let entered_for_order = to_f64(tender.entered * proportion);
                let excess = (tender.mode.is_scriptural() && !has_cash).then(|| {
                    to_f64((to_decimal(entered_for_order) - allocated).max(Decimal::ZERO))
                });
                (entered_for_order, to_f64(allocated), excess)
            };

            let record = PaymentRecord {
                payment_id: uuid::Uuid::new_v4().to_string(),
                timestamp,
                table_id: table_id.to_string(),
                order_id: share.order_id.clone(),
                server: req.server.clone(),
                note_id: share.note_id.clone(),
                note_name: share.note_name.clone(),
                mode: tender.mode,
                subtotal: to_f64(share.subtotal),
                discount: req.discount,
                is_percent_discount: req.is_percent_discount,
                discount_amount: to_f64(total_discount),
                allocated_amount,
                entered_amount,
                excess_amount: excess,
                has_cash_in_payment: has_cash,
                is_split_payment: is_split,
                split_payment_id: split_payment_id.clone(),
                items: share.items.clone(),
                complete_payment: false,
            };

            if tender.mode.is_credit()
                && let Some(client_id) = &tender.credit_client_id
            {
                outcome.debts.push(DebtEntry {
                    client_id: client_id.clone(),
                    amount: allocated_amount,
                    table_id: table_id.to_string(),
                    order_id: share.order_id.clone(),
                    items: share.items.clone(),
                    discount_share: to_f64(discount_share),
                });
            }

            let i = index[&share.order_id];
            written
                .entry(share.order_id.clone())
                .or_default()
                .push(record.payment_id.clone());
            orders[i].payments.push(record);
        }
        outcome.touched_orders.push(share.order_id.clone());
    }

    // 8/10. Recompute everything touched, archive settled orders
    for share in &shares {
        let i = index[&share.order_id];
        let order = &mut orders[i];
        ledger::recompute_order_total(order);
        if is_settled(order.total) {
            order.status = shared::billing::OrderStatus::Archived;
            if let Some(ids) = written.get(&share.order_id) {
                for payment in &mut order.payments {
                    if ids.contains(&payment.payment_id) {
                        payment.complete_payment = true;
                    }
                }
            }
            outcome.archived_orders.push(share.order_id.clone());
            tracing::info!(
                table_id = %table_id,
                order_id = %share.order_id,
                "Order settled and archived"
            );
        }
    }

    Ok(outcome)
}
