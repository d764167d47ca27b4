//! Plain-language insights derived from aggregate blocks.

use crate::engine::MetricData;

const HIGH_OCCUPANCY: f64 = 80.0;
const LOW_OCCUPANCY: f64 = 60.0;

/// Derive insights in a fixed order: largest origin market, occupancy
/// pricing signal, spend per visitor, then the capacity baseline.
#[must_use]
pub fn derive_insights(data: &MetricData) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(top) = data
        .arrivals
        .as_ref()
        .and_then(|arrivals| arrivals.top_origins.first())
    {
        insights.push(format!(
            "Visitors from {} represent your largest market with {} arrivals",
            top.origin,
            with_thousands(top.arrivals)
        ));
    }

    if let Some(occupancy) = &data.occupancy {
        let avg = occupancy.average_occupancy;
        if avg > HIGH_OCCUPANCY {
            insights.push(format!(
                "High occupancy rate of {avg:.1}% indicates strong demand - consider premium pricing strategies"
            ));
        } else if avg < LOW_OCCUPANCY {
            insights.push(format!(
                "Occupancy at {avg:.1}% suggests opportunity for targeted marketing campaigns"
            ));
        }
    }

    let spending = data.spending.as_ref().and_then(|s| s.summary());
    if let (Some(spending), Some(arrivals)) = (spending, &data.arrivals) {
        if arrivals.total_arrivals > 0 {
            #[allow(clippy::cast_precision_loss)]
            let per_visitor =
                spending.total_spending_millions * 1_000_000.0 / arrivals.total_arrivals as f64;
            if per_visitor > 0.0 {
                insights.push(format!(
                    "Average visitor spending is ${per_visitor:.0} - focus on high-value visitor segments"
                ));
            }
        }
    }

    if let Some(arrivals) = &data.arrivals {
        #[allow(clippy::cast_possible_truncation)]
        let average = arrivals.average_arrivals.trunc() as i64;
        insights.push(format!(
            "Average {} daily arrivals provides baseline for capacity planning",
            with_thousands(average)
        ));
    }

    insights
}

/// Format an integer with comma thousands separators.
#[must_use]
pub fn with_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
