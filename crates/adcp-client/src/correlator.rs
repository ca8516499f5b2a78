use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

struct Pending {
    token: u64,
    tx: SyncSender<Bytes>,
}

/// A claimed exchange, held by the sender path while it waits.
pub struct ExchangeTicket {
    token: u64,
    rx: Receiver<Bytes>,
}

/// Pairs the single in-flight command with the next inbound response.
///
/// The protocol has no request ids, so correlation is purely positional: at
/// most one exchange may be outstanding, and the next response frame
/// belongs to it. The slot is the only state shared between the sender and
/// receiver paths; each pending exchange carries a one-slot rendezvous
/// channel, so delivery and timeout race cleanly without polling.
pub struct Correlator {
    slot: Mutex<Option<Pending>>,
    next_token: AtomicU64,
}

impl Correlator {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            next_token: AtomicU64::new(1),
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<Pending>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim the exchange slot before writing a command.
    ///
    /// Fails with `ExchangeInFlight` while another command awaits its
    /// response; callers must serialize, not pipeline.
    pub fn begin(&self) -> Result<ExchangeTicket> {
        let mut slot = self.lock_slot();
        if slot.is_some() {
            return Err(ClientError::ExchangeInFlight);
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = sync_channel(1);
        *slot = Some(Pending { token, tx });
        debug!(token, "exchange opened");
        Ok(ExchangeTicket { token, rx })
    }

    /// Receive path: hand an inbound response payload to the waiter.
    ///
    /// A response with no exchange in flight (late after a timeout, or
    /// unsolicited) is discarded, never buffered for a later exchange.
    pub fn deliver(&self, payload: Bytes) {
        let pending = self.lock_slot().take();
        match pending {
            Some(pending) => {
                debug!(token = pending.token, len = payload.len(), "response delivered");
                // The waiter may have raced us into its timeout and dropped
                // the receiver; the response is discarded either way.
                let _ = pending.tx.send(payload);
            }
            None => warn!(len = payload.len(), "discarding response with no exchange in flight"),
        }
    }

    /// Sender path: block until the response arrives or the window closes.
    ///
    /// On timeout the exchange is evicted so the connection is immediately
    /// usable for the next command; the eviction is token-guarded so a
    /// concurrent delivery cannot be mistaken for someone else's.
    pub fn wait(&self, ticket: ExchangeTicket, timeout: Duration) -> Result<Bytes> {
        match ticket.rx.recv_timeout(timeout) {
            Ok(payload) => Ok(payload),
            Err(RecvTimeoutError::Timeout) => {
                self.evict(ticket.token);
                Err(ClientError::ResponseTimeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.evict(ticket.token);
                Err(ClientError::Disconnected)
            }
        }
    }

    /// Give up an exchange without waiting (e.g. the write failed).
    pub fn abandon(&self, ticket: ExchangeTicket) {
        self.evict(ticket.token);
    }

    /// Whether no exchange is outstanding.
    pub fn is_idle(&self) -> bool {
        self.lock_slot().is_none()
    }

    fn evict(&self, token: u64) {
        let mut slot = self.lock_slot();
        if slot.as_ref().is_some_and(|pending| pending.token == token) {
            *slot = None;
            debug!(token, "exchange abandoned");
        }
    }
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn delivers_to_single_waiter() {
        let correlator = Arc::new(Correlator::new());
        let ticket = correlator.begin().unwrap();

        let delivery = {
            let correlator = Arc::clone(&correlator);
            thread::spawn(move || correlator.deliver(Bytes::from_static(&[0x00, 0x07])))
        };

        let payload = correlator.wait(ticket, Duration::from_secs(1)).unwrap();
        assert_eq!(payload.as_ref(), &[0x00, 0x07]);
        assert!(correlator.is_idle());
        delivery.join().unwrap();
    }

    #[test]
    fn second_begin_fails_while_awaiting() {
        let correlator = Correlator::new();
        let _ticket = correlator.begin().unwrap();
        assert!(matches!(
            correlator.begin(),
            Err(ClientError::ExchangeInFlight)
        ));
    }

    #[test]
    fn slot_frees_after_delivery() {
        let correlator = Correlator::new();
        let ticket = correlator.begin().unwrap();
        correlator.deliver(Bytes::from_static(&[0x00]));
        correlator.wait(ticket, Duration::from_secs(1)).unwrap();

        assert!(correlator.begin().is_ok());
    }

    #[test]
    fn timeout_returns_slot_to_idle() {
        let correlator = Correlator::new();
        let ticket = correlator.begin().unwrap();

        let err = correlator
            .wait(ticket, Duration::from_millis(10))
            .unwrap_err();
        assert!(matches!(err, ClientError::ResponseTimeout(_)));
        assert!(correlator.is_idle());
    }

    #[test]
    fn late_response_not_seen_by_next_exchange() {
        let correlator = Correlator::new();

        let ticket = correlator.begin().unwrap();
        let err = correlator
            .wait(ticket, Duration::from_millis(10))
            .unwrap_err();
        assert!(matches!(err, ClientError::ResponseTimeout(_)));

        // The stale response arrives while idle and must evaporate.
        correlator.deliver(Bytes::from_static(&[0x15]));

        let ticket = correlator.begin().unwrap();
        let fresh = {
            thread::scope(|scope| {
                let handle = scope.spawn(|| correlator.deliver(Bytes::from_static(&[0x00])));
                let payload = correlator.wait(ticket, Duration::from_secs(1)).unwrap();
                handle.join().unwrap();
                payload
            })
        };
        assert_eq!(fresh.as_ref(), &[0x00]);
    }

    #[test]
    fn unsolicited_response_is_discarded() {
        let correlator = Correlator::new();
        correlator.deliver(Bytes::from_static(&[0x00]));
        assert!(correlator.is_idle());

        // A following exchange still times out rather than seeing it.
        let ticket = correlator.begin().unwrap();
        assert!(matches!(
            correlator.wait(ticket, Duration::from_millis(10)),
            Err(ClientError::ResponseTimeout(_))
        ));
    }

    #[test]
    fn abandon_frees_the_slot() {
        let correlator = Correlator::new();
        let ticket = correlator.begin().unwrap();
        correlator.abandon(ticket);
        assert!(correlator.is_idle());
    }

    #[test]
    fn eviction_is_token_guarded() {
        let correlator = Correlator::new();

        let stale = correlator.begin().unwrap();
        let stale_token = stale.token;
        correlator.deliver(Bytes::from_static(&[0x00]));
        correlator.wait(stale, Duration::from_secs(1)).unwrap();

        // A new exchange occupies the slot; evicting with the old token
        // must not touch it.
        let _current = correlator.begin().unwrap();
        correlator.evict(stale_token);
        assert!(!correlator.is_idle());
    }
}
