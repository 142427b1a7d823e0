use cosmwasm_std::Uint128;
use tracing::warn;

use crate::codes::CodeCipher;
use crate::error::CoordinatorError;
use crate::store::ShadowStore;

/// What the delivery collaborator needs to reach a beneficiary. Assembled
/// here from shadow-record plaintext; never derived from ledger data.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimNotice {
    pub destination: String,
    pub claim_code: String,
    pub amount: Uint128,
    pub asset_label: String,
    pub claim_url: String,
}

/// External delivery collaborator (e-mail or otherwise)
pub trait Notifier {
    fn send(&self, notice: &ClaimNotice) -> Result<(), CoordinatorError>;
}

/// One pass of the polling due-date job: for every active shadow plan whose
/// schedule has come due, deliver claim notices to beneficiaries not yet
/// notified. `notification_sent` is the idempotence guard; the job runs on a
/// fixed interval and must not rely on exactly-once delivery. Returns the
/// number of notices delivered.
pub fn run_due_notifications<S: ShadowStore, N: Notifier>(
    store: &S,
    cipher: &CodeCipher,
    notifier: &N,
    claim_base_url: &str,
    now: u64,
) -> Result<usize, CoordinatorError> {
    let mut sent = 0;

    for mut plan in store.list_active()? {
        if !plan.schedule.is_due(now) {
            continue;
        }
        let local_id = plan.local_id;
        let Some(ledger_plan_id) = plan.ledger_plan_id else {
            // Active without a ledger id means a reconcile is owed; skip
            warn!(local_id, "active shadow plan missing ledger id");
            continue;
        };

        let version = plan.version;
        let mut changed = false;
        for beneficiary in &mut plan.beneficiaries {
            if beneficiary.notification_sent {
                continue;
            }
            // One unreadable record must not block the rest of the pass
            let claim_code = match cipher.decrypt(&beneficiary.encrypted_claim_code) {
                Ok(code) => code,
                Err(err) => {
                    warn!(local_id, error = %err, "stored claim code unreadable");
                    continue;
                }
            };
            let notice = ClaimNotice {
                destination: beneficiary.email.clone(),
                claim_code,
                amount: beneficiary.allocated_amount,
                asset_label: plan.denom.clone(),
                claim_url: format!("{claim_base_url}/claim/{ledger_plan_id}"),
            };
            match notifier.send(&notice) {
                Ok(()) => {
                    beneficiary.notification_sent = true;
                    changed = true;
                    sent += 1;
                }
                Err(err) => {
                    // Left unmarked so the next poll retries this one
                    warn!(local_id, error = %err, "claim notice delivery failed");
                }
            }
        }

        if changed {
            // A concurrent write loses this plan's flags, which only means
            // a re-send next poll; the rest of the pass goes on
            if let Err(err) = store.update(plan, version) {
                warn!(local_id, error = %err, "failed to persist notification flags");
            }
        }
    }

    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ShadowBeneficiary, ShadowPlan, ShadowStatus};
    use crate::store::MemoryShadowStore;
    use shared::commitment::commit_claim_code;
    use shared::schedule::{derive, DistributionMethod};
    use std::sync::Mutex;

    struct RecordingNotifier {
        sent: Mutex<Vec<ClaimNotice>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn new(fail: bool) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn send(&self, notice: &ClaimNotice) -> Result<(), CoordinatorError> {
            if self.fail {
                return Err(CoordinatorError::Notification("smtp down".to_string()));
            }
            self.sent.lock().unwrap().push(notice.clone());
            Ok(())
        }
    }

    fn active_plan(cipher: &CodeCipher, due_at: u64) -> ShadowPlan {
        let schedule = derive(
            Uint128::new(930),
            DistributionMethod::LumpSum,
            Some(due_at),
            None,
            due_at - 100,
        )
        .unwrap();
        ShadowPlan {
            local_id: 0,
            owner: "alice".to_string(),
            plan_name: "family".to_string(),
            description: String::new(),
            denom: "uatom".to_string(),
            requested_amount: Uint128::new(1000),
            net_amount: Uint128::new(930),
            creation_fee: Uint128::new(50),
            service_fee: Uint128::new(20),
            schedule,
            status: ShadowStatus::Active,
            ledger_plan_id: Some(7),
            tx_ref: Some("tx-1".to_string()),
            version: 0,
            beneficiaries: vec![ShadowBeneficiary {
                name: "Alice Doe".to_string(),
                email: "alice@example.com".to_string(),
                relationship: "daughter".to_string(),
                share_bps: 10_000,
                allocated_amount: Uint128::new(930),
                combined_commitment: "c".repeat(64),
                claim_code_commitment: commit_claim_code("AB12CD"),
                encrypted_claim_code: cipher.encrypt("AB12CD").unwrap(),
                notification_sent: false,
            }],
            created_at: due_at - 100,
        }
    }

    #[test]
    fn due_plans_notify_each_beneficiary_once() {
        let cipher = CodeCipher::new(&[1u8; 32]);
        let store = MemoryShadowStore::new();
        store.insert(active_plan(&cipher, 1_000)).unwrap();
        let notifier = RecordingNotifier::new(false);

        let sent = run_due_notifications(&store, &cipher, &notifier, "https://vault.example", 1_000)
            .unwrap();
        assert_eq!(sent, 1);

        let notices = notifier.sent.lock().unwrap();
        assert_eq!(notices[0].destination, "alice@example.com");
        assert_eq!(notices[0].claim_code, "AB12CD");
        assert_eq!(notices[0].claim_url, "https://vault.example/claim/7");
        drop(notices);

        // Second poll is a no-op
        let sent = run_due_notifications(&store, &cipher, &notifier, "https://vault.example", 1_000)
            .unwrap();
        assert_eq!(sent, 0);
    }

    #[test]
    fn not_yet_due_plans_are_skipped() {
        let cipher = CodeCipher::new(&[1u8; 32]);
        let store = MemoryShadowStore::new();
        store.insert(active_plan(&cipher, 2_000)).unwrap();
        let notifier = RecordingNotifier::new(false);

        let sent = run_due_notifications(&store, &cipher, &notifier, "https://vault.example", 1_500)
            .unwrap();
        assert_eq!(sent, 0);
    }

    #[test]
    fn unreadable_code_does_not_block_other_plans() {
        let cipher = CodeCipher::new(&[1u8; 32]);
        let store = MemoryShadowStore::new();

        let mut broken = active_plan(&cipher, 1_000);
        broken.beneficiaries[0].encrypted_claim_code = "deadbeef".to_string();
        store.insert(broken).unwrap();
        let healthy = store.insert(active_plan(&cipher, 1_000)).unwrap();

        let notifier = RecordingNotifier::new(false);
        let sent = run_due_notifications(&store, &cipher, &notifier, "https://vault.example", 1_000)
            .unwrap();
        assert_eq!(sent, 1);
        assert!(store.get(healthy).unwrap().beneficiaries[0].notification_sent);
    }

    #[test]
    fn flags_persist_when_a_later_code_is_unreadable() {
        let cipher = CodeCipher::new(&[1u8; 32]);
        let store = MemoryShadowStore::new();

        let mut plan = active_plan(&cipher, 1_000);
        let mut second = plan.beneficiaries[0].clone();
        second.email = "bob@example.com".to_string();
        second.encrypted_claim_code = "deadbeef".to_string();
        plan.beneficiaries.push(second);
        let id = store.insert(plan).unwrap();

        let notifier = RecordingNotifier::new(false);
        let sent = run_due_notifications(&store, &cipher, &notifier, "https://vault.example", 1_000)
            .unwrap();
        assert_eq!(sent, 1);

        let stored = store.get(id).unwrap();
        assert!(stored.beneficiaries[0].notification_sent);
        assert!(!stored.beneficiaries[1].notification_sent);
    }

    #[test]
    fn delivery_failure_leaves_flag_unset_for_retry() {
        let cipher = CodeCipher::new(&[1u8; 32]);
        let store = MemoryShadowStore::new();
        let id = store.insert(active_plan(&cipher, 1_000)).unwrap();

        let failing = RecordingNotifier::new(true);
        let sent = run_due_notifications(&store, &cipher, &failing, "https://vault.example", 1_000)
            .unwrap();
        assert_eq!(sent, 0);
        assert!(!store.get(id).unwrap().beneficiaries[0].notification_sent);

        // Next poll with delivery restored succeeds
        let working = RecordingNotifier::new(false);
        let sent = run_due_notifications(&store, &cipher, &working, "https://vault.example", 1_000)
            .unwrap();
        assert_eq!(sent, 1);
        assert!(store.get(id).unwrap().beneficiaries[0].notification_sent);
    }
}
