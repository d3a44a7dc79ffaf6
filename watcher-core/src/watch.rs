use crate::config::WalletConfig;
use crate::models::Signature;
use std::collections::VecDeque;

/// Superseded cursors remembered per wallet so an older signature resurfacing at the head of
/// the list is not reported a second time.
const SUPERSEDED_HISTORY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletPhase {
    Idle,
    Fetching,
    Classifying,
    Reported,
    Skipped,
    Errored,
}

/// Cross-cycle state of one watched wallet. Owned by exactly one worker at a time.
#[derive(Debug, Clone)]
pub struct WalletWatch {
    pub name: String,
    pub address: String,
    last_signature: Option<Signature>,
    superseded: VecDeque<Signature>,
    phase: WalletPhase,
}

impl WalletWatch {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            last_signature: None,
            superseded: VecDeque::with_capacity(SUPERSEDED_HISTORY),
            phase: WalletPhase::Idle,
        }
    }

    pub fn last_signature(&self) -> Option<&Signature> {
        self.last_signature.as_ref()
    }

    pub fn phase(&self) -> WalletPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: WalletPhase) {
        self.phase = phase;
    }

    /// True unless `candidate` is the current cursor or one it already replaced.
    pub fn should_report(&self, candidate: &Signature) -> bool {
        if self.last_signature.as_ref() == Some(candidate) {
            return false;
        }
        !self.superseded.contains(candidate)
    }

    pub fn commit(&mut self, candidate: Signature) {
        if let Some(previous) = self.last_signature.replace(candidate) {
            if self.superseded.len() == SUPERSEDED_HISTORY {
                self.superseded.pop_front();
            }
            self.superseded.push_back(previous);
        }
    }
}

impl From<&WalletConfig> for WalletWatch {
    fn from(cfg: &WalletConfig) -> Self {
        WalletWatch::new(cfg.name.clone(), cfg.address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watch() -> WalletWatch {
        WalletWatch::new("frank", "CRVidEDtEUTYZisCxBZkpELzhQc9eauMLR3FWg74tReL")
    }

    #[test]
    fn test_empty_cursor_reports_first_signature() {
        let w = watch();
        assert!(w.last_signature().is_none());
        assert!(w.should_report(&Signature::from("S1")));
        assert_eq!(w.phase(), WalletPhase::Idle);
    }

    #[test]
    fn test_should_report_is_idempotent_until_commit() {
        let mut w = watch();
        let s1 = Signature::from("S1");
        assert!(w.should_report(&s1));
        assert!(w.should_report(&s1));

        w.commit(s1.clone());
        assert!(!w.should_report(&s1));
        assert_eq!(w.last_signature(), Some(&s1));
    }

    #[test]
    fn test_cursor_never_reverts_to_superseded() {
        let mut w = watch();
        w.commit(Signature::from("S1"));
        w.commit(Signature::from("S2"));

        assert!(!w.should_report(&Signature::from("S1")));
        assert!(!w.should_report(&Signature::from("S2")));
        assert!(w.should_report(&Signature::from("S3")));
        assert_eq!(w.last_signature().unwrap().as_str(), "S2");
    }

    #[test]
    fn test_superseded_history_is_bounded() {
        let mut w = watch();
        for i in 0..(SUPERSEDED_HISTORY + 5) {
            w.commit(Signature::new(format!("S{i}")));
        }
        assert_eq!(w.superseded.len(), SUPERSEDED_HISTORY);
        assert!(w.should_report(&Signature::from("S0")));
        assert!(!w.should_report(&Signature::new(format!("S{}", SUPERSEDED_HISTORY))));
    }

    #[test]
    fn test_from_wallet_config() {
        let cfg = WalletConfig {
            name: "dnf".to_string(),
            address: "DNfuF1L62WWyW3pNakVkyGGFzVVhj4Yr52jSmdTyeBHm".to_string(),
        };
        let w = WalletWatch::from(&cfg);
        assert_eq!(w.name, "dnf");
        assert_eq!(w.address, cfg.address);
    }
}
