use gatelog_core::record::LogRecord;

/// Column order for the metrics summary export.
pub const METRICS_COLUMNS: [&str; 4] = ["service", "request_avg", "proxy_avg", "gateway_avg"];

/// Running latency sums for one full-table drain of a service.
#[derive(Debug, Default)]
pub struct LatencySummary {
    count: u64,
    request_sum: u64,
    proxy_sum: u64,
    gateway_sum: u64,
}

impl LatencySummary {
    pub fn observe(&mut self, record: &LogRecord) {
        self.request_sum += record.latencies.request;
        self.proxy_sum += record.latencies.proxy;
        self.gateway_sum += record.latencies.gateway;
        self.count += 1;
    }

    pub fn observe_page(&mut self, records: &[LogRecord]) {
        for record in records {
            self.observe(record);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic means as (request, proxy, gateway). None when no records
    /// were observed — the zero-count case never produces NaN.
    pub fn means(&self) -> Option<(f64, f64, f64)> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some((
            self.request_sum as f64 / n,
            self.proxy_sum as f64 / n,
            self.gateway_sum as f64 / n,
        ))
    }

    /// Summary row matching [`METRICS_COLUMNS`], means formatted to two
    /// decimal places.
    pub fn to_row(&self, service: &str) -> Option<Vec<String>> {
        let (request_avg, proxy_avg, gateway_avg) = self.means()?;
        Some(vec![
            service.to_string(),
            format!("{request_avg:.2}"),
            format!("{proxy_avg:.2}"),
            format!("{gateway_avg:.2}"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatelog_core::record::Latencies;

    fn record(proxy: u64, gateway: u64, request: u64) -> LogRecord {
        LogRecord {
            latencies: Latencies { proxy, gateway, request },
            ..LogRecord::default()
        }
    }

    #[test]
    fn uniform_latencies_average_to_themselves() {
        let mut summary = LatencySummary::default();
        for _ in 0..30 {
            summary.observe(&record(42, 42, 42));
        }
        assert_eq!(summary.count(), 30);
        assert_eq!(
            summary.to_row("S1").unwrap(),
            vec!["S1", "42.00", "42.00", "42.00"]
        );
    }

    #[test]
    fn means_are_exact_arithmetic_averages() {
        let mut summary = LatencySummary::default();
        summary.observe_page(&[record(1, 2, 3), record(2, 3, 4)]);
        let (request, proxy, gateway) = summary.means().unwrap();
        assert_eq!(request, 3.5);
        assert_eq!(proxy, 1.5);
        assert_eq!(gateway, 2.5);
        assert_eq!(summary.to_row("S1").unwrap()[1], "3.50");
    }

    #[test]
    fn zero_records_yield_no_row() {
        let summary = LatencySummary::default();
        assert!(summary.means().is_none());
        assert!(summary.to_row("S1").is_none());
    }
}
