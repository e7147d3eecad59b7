//! The poll loop: fetch, report, record, wait.

use crate::cli::ui;
use crate::core::report::summary_line;
use crate::core::{Report, Sleeper};
use crate::fetcher::PriceFetcher;
use crate::ledger::{CsvLedger, LedgerRow};
use crate::notify::Notifier;
use anyhow::Result;
use std::time::Duration;
use tracing::{error, info, warn};

/// Pause between the end of one cycle and the start of the next.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// All values present; the ledger now holds `rows` rows.
    Recorded { rows: usize, notified: bool },
    /// Something was missing; neither mail nor ledger were touched.
    Skipped,
}

pub struct Tracker<N, S> {
    fetcher: PriceFetcher,
    notifier: N,
    ledger: CsvLedger,
    sleeper: S,
    local_currency: String,
}

impl<N: Notifier, S: Sleeper> Tracker<N, S> {
    pub fn new(
        fetcher: PriceFetcher,
        notifier: N,
        ledger: CsvLedger,
        sleeper: S,
        local_currency: &str,
    ) -> Self {
        Tracker {
            fetcher,
            notifier,
            ledger,
            sleeper,
            local_currency: local_currency.to_string(),
        }
    }

    pub fn ledger(&self) -> &CsvLedger {
        &self.ledger
    }

    /// Runs one cycle. Only a ledger failure is returned as an error.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let snapshot = self.fetcher.fetch_snapshot().await;

        let Some(complete) = snapshot.complete() else {
            let missing = snapshot.missing();
            warn!(?missing, "Incomplete market data, skipping cycle");
            ui::print_cycle_skipped(&missing);
            return Ok(CycleOutcome::Skipped);
        };

        ui::print_cycle_summary(&summary_line(&complete, &self.local_currency));

        let report = Report::compose(&complete, &self.local_currency);
        let notified = match self.notifier.send(&report).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = ?e, "Error sending email");
                false
            }
        };

        let rows = self.ledger.append(&LedgerRow::from(&complete))?;
        Ok(CycleOutcome::Recorded { rows, notified })
    }

    /// Repeats cycles separated by [`POLL_INTERVAL`]. Runs forever when `max_cycles` is `None`.
    pub async fn run(&self, max_cycles: Option<usize>) -> Result<()> {
        let mut completed = 0usize;
        while max_cycles.is_none_or(|max| completed < max) {
            if completed > 0 {
                self.sleeper.sleep(POLL_INTERVAL).await;
            }
            let outcome = self.run_cycle().await?;
            completed += 1;
            info!(cycle = completed, ?outcome, "Cycle finished");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        CryptoPriceProvider, ExchangeRateProvider, FetchError, MetalPriceProvider, Price,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct FixedMetal(Option<f64>);

    #[async_trait]
    impl MetalPriceProvider for FixedMetal {
        async fn price_per_gram(&self, _currency: &str) -> Result<Price, FetchError> {
            match self.0 {
                Some(p) => Price::try_from(p),
                None => Err(FetchError::Status(500)),
            }
        }
    }

    struct FixedFiat;

    #[async_trait]
    impl ExchangeRateProvider for FixedFiat {
        async fn rate(&self, from: &str, _to: &str) -> Result<Price, FetchError> {
            match from {
                "USD" => Price::try_from(49.5),
                _ => Price::try_from(53.2),
            }
        }
    }

    struct FailingFiat;

    #[async_trait]
    impl ExchangeRateProvider for FailingFiat {
        async fn rate(&self, _from: &str, _to: &str) -> Result<Price, FetchError> {
            Err(FetchError::Connection("connection refused".to_string()))
        }
    }

    struct FixedCrypto;

    #[async_trait]
    impl CryptoPriceProvider for FixedCrypto {
        async fn prices(
            &self,
            _ids: &[&str],
            _vs: &str,
        ) -> Result<HashMap<String, Price>, FetchError> {
            Ok(HashMap::from([
                ("bitcoin".to_string(), Price::from(65000u64)),
                ("ethereum".to_string(), Price::from(3400u64)),
            ]))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<Report>>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, report: &Report) -> Result<()> {
            if self.fail {
                anyhow::bail!("smtp down");
            }
            self.sent.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSleeper {
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    fn tracker(
        gold: Option<f64>,
        notifier: RecordingNotifier,
        sleeper: RecordingSleeper,
        dir: &TempDir,
    ) -> Tracker<RecordingNotifier, RecordingSleeper> {
        let fetcher = PriceFetcher::new(
            Box::new(FixedMetal(gold)),
            Box::new(FixedFiat),
            Box::new(FixedCrypto),
            "EGP",
        );
        let ledger = CsvLedger::new(dir.path().join("market_data.csv"), "EGP");
        Tracker::new(fetcher, notifier, ledger, sleeper, "EGP")
    }

    #[tokio::test]
    async fn test_complete_cycle_notifies_and_records() -> Result<()> {
        let dir = TempDir::new()?;
        let notifier = RecordingNotifier::default();
        let tracker = tracker(Some(4500.0), notifier.clone(), RecordingSleeper::default(), &dir);

        let outcome = tracker.run_cycle().await?;
        assert_eq!(
            outcome,
            CycleOutcome::Recorded {
                rows: 1,
                notified: true
            }
        );

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("Gold (24k/gram): 4500.0 EGP"));

        let rows = tracker.ledger().rows()?;
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "4500.0");
        assert_eq!(&rows[0][4], "65000");
        Ok(())
    }

    #[tokio::test]
    async fn test_incomplete_cycle_skips_notify_and_ledger() -> Result<()> {
        let dir = TempDir::new()?;
        let notifier = RecordingNotifier::default();
        let tracker = tracker(None, notifier.clone(), RecordingSleeper::default(), &dir);

        assert_eq!(tracker.run_cycle().await?, CycleOutcome::Skipped);
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert!(!tracker.ledger().path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_notify_failure_still_records() -> Result<()> {
        let dir = TempDir::new()?;
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let tracker = tracker(Some(4500.0), notifier, RecordingSleeper::default(), &dir);

        assert_eq!(
            tracker.run_cycle().await?,
            CycleOutcome::Recorded {
                rows: 1,
                notified: false
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_run_sleeps_between_cycles() -> Result<()> {
        let dir = TempDir::new()?;
        let sleeper = RecordingSleeper::default();
        let tracker = tracker(Some(4500.0), RecordingNotifier::default(), sleeper.clone(), &dir);

        tracker.run(Some(3)).await?;

        assert_eq!(tracker.ledger().rows()?.len(), 3);
        assert_eq!(*sleeper.sleeps.lock().unwrap(), vec![POLL_INTERVAL; 2]);
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_failure_stops_the_loop() {
        let notifier = RecordingNotifier::default();
        let sleeper = RecordingSleeper::default();
        let fetcher = PriceFetcher::new(
            Box::new(FixedMetal(Some(4500.0))),
            Box::new(FixedFiat),
            Box::new(FixedCrypto),
            "EGP",
        );
        let ledger = CsvLedger::new("/nonexistent-dir/market_data.csv", "EGP");
        let tracker = Tracker::new(fetcher, notifier, ledger, sleeper.clone(), "EGP");

        assert!(tracker.run(None).await.is_err());
        assert!(sleeper.sleeps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rates_failure_skips_notify_and_ledger() -> Result<()> {
        let dir = TempDir::new()?;
        let notifier = RecordingNotifier::default();
        let fetcher = PriceFetcher::new(
            Box::new(FixedMetal(Some(4500.0))),
            Box::new(FailingFiat),
            Box::new(FixedCrypto),
            "EGP",
        );
        let ledger = CsvLedger::new(dir.path().join("market_data.csv"), "EGP");
        let tracker = Tracker::new(
            fetcher,
            notifier.clone(),
            ledger,
            RecordingSleeper::default(),
            "EGP",
        );

        assert_eq!(tracker.run_cycle().await?, CycleOutcome::Skipped);
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert!(!tracker.ledger().path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_run_zero_cycles_does_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let notifier = RecordingNotifier::default();
        let sleeper = RecordingSleeper::default();
        let tracker = tracker(Some(4500.0), notifier.clone(), sleeper.clone(), &dir);

        tracker.run(Some(0)).await?;

        assert!(notifier.sent.lock().unwrap().is_empty());
        assert!(sleeper.sleeps.lock().unwrap().is_empty());
        assert!(!tracker.ledger().path().exists());
        Ok(())
    }
}
