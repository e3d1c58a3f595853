//! # Settlement Arithmetic
//!
//! The pure half of the shift engine and the cash ledger: given the recorded
//! rows, compute the frozen totals. The persistence layer calls these inside
//! its close/settle transactions so that what gets frozen is always
//! recomputed from the authoritative records, never from a cached running
//! total.
//!
//! ## Shift Close-Out
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  gross_revenue  = Σ sale.total_sale                             │
//! │  token_earnings = Σ sale.total_tokens                           │
//! │  loans_total    = Σ loan.amount                                 │
//! │  net_payable    = base_pay + token_earnings - loans_total       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `net_payable` may be negative: loans are not guarded against earnings.

use crate::money::Money;
use crate::types::{CashflowEntry, Loan, Sale, ShiftSummary};

/// Computes the close-out summary for a shift from its recorded sales and
/// loans.
///
/// ## Example
/// ```rust
/// # use cantina_core::money::Money;
/// # use cantina_core::settlement::summarize_shift;
/// let summary = summarize_shift(Money::from_pesos(30_000), &[], &[]);
/// assert_eq!(summary.net_payable.pesos(), 30_000);
/// ```
pub fn summarize_shift(base_pay: Money, sales: &[Sale], loans: &[Loan]) -> ShiftSummary {
    let gross_revenue: Money = sales.iter().map(Sale::total_sale).sum();
    let token_earnings: Money = sales.iter().map(Sale::total_tokens).sum();
    let loans_total: Money = loans.iter().map(Loan::amount).sum();

    ShiftSummary {
        gross_revenue,
        token_earnings,
        loans_total,
        base_pay,
        net_payable: base_pay + token_earnings - loans_total,
    }
}

/// Signed sum over a set of cash ledger entries: income counts positive,
/// expense negative.
///
/// The authoritative balance lives in a transactionally-maintained counter;
/// this function exists for the display window and for cross-checking the
/// counter in tests.
pub fn signed_sum<'a, I>(entries: I) -> Money
where
    I: IntoIterator<Item = &'a CashflowEntry>,
{
    entries
        .into_iter()
        .map(CashflowEntry::signed_amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryType;
    use chrono::Utc;

    fn sale(total_sale: i64, total_tokens: i64) -> Sale {
        Sale {
            id: "s".into(),
            shift_id: "sh".into(),
            product_id: "p".into(),
            product_name: "Aguila".into(),
            units: 1,
            unit_sale_price: total_sale,
            unit_token_price: total_tokens,
            total_sale,
            total_tokens,
            created_at: Utc::now(),
        }
    }

    fn loan(amount: i64) -> Loan {
        Loan {
            id: "l".into(),
            shift_id: "sh".into(),
            description: "advance".into(),
            amount,
            created_at: Utc::now(),
        }
    }

    fn entry(entry_type: EntryType, amount: i64) -> CashflowEntry {
        CashflowEntry {
            id: "e".into(),
            entry_type,
            amount,
            description: "x".into(),
            is_manual: false,
            recorded_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_arithmetic() {
        // base 30000, one sale earning 5000 in tokens, one 2000 loan
        let summary = summarize_shift(
            Money::from_pesos(30_000),
            &[sale(35_000, 5_000)],
            &[loan(2_000)],
        );

        assert_eq!(summary.gross_revenue.pesos(), 35_000);
        assert_eq!(summary.token_earnings.pesos(), 5_000);
        assert_eq!(summary.loans_total.pesos(), 2_000);
        assert_eq!(summary.net_payable.pesos(), 33_000);
    }

    #[test]
    fn test_empty_shift_pays_base_only() {
        let summary = summarize_shift(Money::from_pesos(25_000), &[], &[]);
        assert_eq!(summary.gross_revenue.pesos(), 0);
        assert_eq!(summary.net_payable.pesos(), 25_000);
    }

    #[test]
    fn test_loans_can_exceed_earnings() {
        let summary = summarize_shift(
            Money::from_pesos(10_000),
            &[sale(7_000, 1_000)],
            &[loan(20_000)],
        );
        assert_eq!(summary.net_payable.pesos(), -9_000);
    }

    #[test]
    fn test_signed_sum() {
        let entries = vec![
            entry(EntryType::Income, 35_000),
            entry(EntryType::Expense, 33_000),
            entry(EntryType::Expense, 1_000),
        ];
        assert_eq!(signed_sum(&entries).pesos(), 1_000);
    }

    #[test]
    fn test_signed_sum_empty() {
        assert_eq!(signed_sum(&[]).pesos(), 0);
    }
}
