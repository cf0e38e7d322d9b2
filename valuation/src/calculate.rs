use chrono::{DateTime, Utc};
use domain::{DerivedMetrics, HoldingRecord, PortfolioSnapshot, PortfolioTotals, ValuedHolding};

pub fn value_holding(record: &HoldingRecord) -> DerivedMetrics {
    let value = record.shares * record.current_price;
    let cost = record.shares * record.cost_basis;
    let gain = value - cost;
    DerivedMetrics {
        value,
        cost,
        gain,
        gain_percent: percent_of(gain, cost),
        // depends on the whole portfolio, filled in by build_snapshot
        allocation_percent: 0.0,
    }
}

/// Values every record and sums the aggregates in one pass, then a second
/// pass sets each holding's share of the total value.
///
/// Stored values are never rounded; rounding happens only when a report is
/// rendered.
pub fn build_snapshot(
    owner: &str,
    records: Vec<HoldingRecord>,
    skipped_records: usize,
    generated_at: DateTime<Utc>,
) -> PortfolioSnapshot {
    let mut total_value = 0.0;
    let mut total_cost = 0.0;
    let mut holdings: Vec<ValuedHolding> = records
        .into_iter()
        .map(|record| {
            let metrics = value_holding(&record);
            total_value += metrics.value;
            total_cost += metrics.cost;
            ValuedHolding { record, metrics }
        })
        .collect();

    for holding in &mut holdings {
        holding.metrics.allocation_percent = share_of(holding.metrics.value, total_value);
    }

    let total_gain = total_value - total_cost;
    let totals = PortfolioTotals {
        total_value,
        total_cost,
        total_gain,
        total_gain_percent: percent_of(total_gain, total_cost),
    };

    PortfolioSnapshot::new(owner, holdings, totals, skipped_records, generated_at)
}

pub(crate) fn percent_of(gain: f64, cost: f64) -> f64 {
    if cost > 0.0 {
        gain / cost * 100.0
    } else {
        0.0
    }
}

fn share_of(value: f64, total_value: f64) -> f64 {
    if total_value > 0.0 {
        value / total_value * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn record(id: &str, shares: f64, cost_basis: f64, current_price: f64) -> HoldingRecord {
        HoldingRecord {
            id: id.to_string(),
            name: format!("Asset {id}"),
            ticker: format!("A{id}-T"),
            shares,
            cost_basis,
            current_price,
            blockchain: "Ethereum".to_string(),
            logo: None,
        }
    }

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn tesla_position_matches_expected_metrics() {
        let metrics = value_holding(&record("1", 25.0, 230.45, 245.67));
        assert!(approx(metrics.value, 6141.75, EPS));
        assert!(approx(metrics.gain, 380.50, 1e-6));
        assert!(approx(metrics.gain_percent, 6.60, 0.005));
    }

    #[test]
    fn fractional_bitcoin_position_matches_expected_metrics() {
        let metrics = value_holding(&record("4", 0.5, 38900.0, 42305.67));
        assert!(approx(metrics.value, 21152.835, 1e-6));
        assert!(approx(metrics.gain, 1702.835, 1e-6));
        assert!(approx(metrics.gain_percent, 8.75, 0.005));
    }

    #[test]
    fn value_and_gain_identities_hold() {
        let cases = [
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 10.0),
            (3.5, 12.25, 0.0),
            (1000.0, 99.99, 100.01),
            (0.0001, 65000.0, 64000.0),
        ];
        for (shares, cost_basis, price) in cases {
            let metrics = value_holding(&record("x", shares, cost_basis, price));
            assert!(approx(metrics.value, shares * price, EPS));
            assert!(approx(metrics.gain, metrics.value - shares * cost_basis, EPS));
            assert!(approx(metrics.gain, shares * (price - cost_basis), 1e-6));
            assert!(metrics.gain_percent.is_finite());
        }
    }

    #[test]
    fn zero_shares_or_zero_cost_basis_yields_zero_percent() {
        let no_shares = value_holding(&record("1", 0.0, 100.0, 120.0));
        assert_eq!(no_shares.value, 0.0);
        assert_eq!(no_shares.gain, 0.0);
        assert_eq!(no_shares.gain_percent, 0.0);

        let free = value_holding(&record("2", 10.0, 0.0, 5.0));
        assert_eq!(free.gain, 50.0);
        assert_eq!(free.gain_percent, 0.0);
    }

    #[test]
    fn empty_input_yields_zero_totals() {
        let snapshot = build_snapshot("0xabc", Vec::new(), 0, Utc::now());
        let totals = snapshot.totals();
        assert!(snapshot.is_empty());
        assert_eq!(totals.total_value, 0.0);
        assert_eq!(totals.total_cost, 0.0);
        assert_eq!(totals.total_gain, 0.0);
        assert_eq!(totals.total_gain_percent, 0.0);
        assert!(!totals.total_gain_percent.is_nan());
    }

    #[test]
    fn aggregates_preserve_order_and_sum_positions() {
        let records = vec![
            record("1", 25.0, 230.45, 245.67),
            record("2", 50.0, 182.30, 189.45),
            record("3", 10.0, 2010.50, 2045.23),
            record("4", 0.5, 38900.0, 42305.67),
        ];
        let snapshot = build_snapshot("0xabc", records, 2, Utc::now());
        let ids: Vec<_> = snapshot
            .holdings()
            .iter()
            .map(|h| h.record.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "2", "3", "4"]);
        assert_eq!(snapshot.owner(), "0xabc");
        assert_eq!(snapshot.skipped_records(), 2);

        let totals = snapshot.totals();
        let expected_value = 6141.75 + 9472.5 + 20452.3 + 21152.835;
        let expected_cost = 5761.25 + 9115.0 + 20105.0 + 19450.0;
        assert!(approx(totals.total_value, expected_value, 1e-6));
        assert!(approx(totals.total_cost, expected_cost, 1e-6));
        assert!(approx(
            totals.total_gain,
            totals.total_value - totals.total_cost,
            EPS
        ));
        assert!(approx(
            totals.total_gain_percent,
            totals.total_gain / totals.total_cost * 100.0,
            EPS
        ));
    }

    #[test]
    fn allocation_splits_total_value() {
        let records = vec![
            record("1", 25.0, 230.45, 245.67),
            record("2", 0.5, 38900.0, 42305.67),
            record("3", 0.0, 10.0, 12.0),
        ];
        let snapshot = build_snapshot("0xabc", records, 0, Utc::now());
        let total = snapshot.totals().total_value;
        let shares: Vec<f64> = snapshot
            .holdings()
            .iter()
            .map(|h| h.metrics.allocation_percent)
            .collect();
        assert!(approx(shares[0], 6141.75 / total * 100.0, EPS));
        assert!(approx(shares[1], 21152.835 / total * 100.0, EPS));
        assert_eq!(shares[2], 0.0);
        assert!(approx(shares.iter().sum::<f64>(), 100.0, 1e-9));
    }

    #[test]
    fn allocation_is_zero_without_value() {
        let empty = build_snapshot("0xabc", Vec::new(), 0, Utc::now());
        assert!(empty.holdings().is_empty());

        let worthless = build_snapshot(
            "0xabc",
            vec![record("1", 10.0, 5.0, 0.0), record("2", 0.0, 5.0, 3.0)],
            0,
            Utc::now(),
        );
        assert_eq!(worthless.totals().total_value, 0.0);
        for holding in worthless.holdings() {
            assert_eq!(holding.metrics.allocation_percent, 0.0);
            assert!(!holding.metrics.allocation_percent.is_nan());
        }
    }

    #[test]
    fn recalculating_is_idempotent() {
        let records = vec![
            record("1", 25.0, 230.45, 245.67),
            record("2", 0.5, 38900.0, 42305.67),
        ];
        let now = Utc::now();
        let first = build_snapshot("owner", records.clone(), 0, now);
        let second = build_snapshot("owner", records, 0, now);
        assert_eq!(first.holdings(), second.holdings());
        assert_eq!(first.totals(), second.totals());
    }
}
