/// ## Policy driver
///
/// Bridges the fixed-timestep loop to the blocking decision service.
/// One worker thread owns the service; the loop talks to it through a
/// bounded(1) request channel, so at most one request is ever in
/// flight. The loop never blocks: it fires a request, keeps simulating,
/// and polls for the reply each tick. A reply that misses the deadline
/// is abandoned (its slot drains on the next poll) and the caller is
/// told to fall back locally.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::domain::perception::PerceptionSnapshot;
use crate::domain::policy::{self, Action};

use super::service::{self, DecisionError, DecisionService, ServiceStatus};

/// What `poll` tells the loop this tick.
#[derive(Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// No request in flight.
    Idle,
    /// Request sent, reply not yet in, deadline not yet passed.
    Pending,
    /// Reply arrived and parsed to an action.
    Decided(Action),
    /// The decision failed; caller should use the fallback.
    Failed(DecisionError),
    /// Deadline passed with no reply; caller should use the fallback.
    TimedOut,
}

pub struct PolicyDriver {
    req_tx: Sender<String>,
    reply_rx: Receiver<Result<String, service::DecisionError>>,
    status: ServiceStatus,
    timeout: Duration,
    in_flight: Option<Instant>,
    worker: Option<JoinHandle<()>>,
}

impl PolicyDriver {
    pub fn spawn(mut service: Box<dyn DecisionService>, timeout: Duration) -> PolicyDriver {
        let status = service.status();
        let (req_tx, req_rx) = bounded::<String>(1);
        // Replies are unbounded so the worker can never block on a stale
        // slot; at most one reply per request exists anyway.
        let (reply_tx, reply_rx) = unbounded::<Result<String, service::DecisionError>>();
        let worker = thread::spawn(move || {
            // Exits when the driver drops its sender.
            while let Ok(request) = req_rx.recv() {
                let reply = service.decide(&request);
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
        });
        PolicyDriver {
            req_tx,
            reply_rx,
            status,
            timeout,
            in_flight: None,
            worker: Some(worker),
        }
    }

    pub fn status(&self) -> &ServiceStatus {
        &self.status
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Fire a decision request. Returns false if one is already in
    /// flight or the worker queue is full; the snapshot is simply
    /// dropped in that case and the caller keeps its current action.
    pub fn request(&mut self, snapshot: &PerceptionSnapshot) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        let payload = match serde_json::to_string(snapshot) {
            Ok(p) => p,
            Err(_) => return false,
        };
        match self.req_tx.try_send(payload) {
            Ok(()) => {
                self.in_flight = Some(Instant::now());
                true
            }
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Non-blocking check for the in-flight request, called once per tick.
    pub fn poll(&mut self) -> PollOutcome {
        let started = match self.in_flight {
            Some(t) => t,
            None => {
                // Drain replies that outlived their deadline.
                while self.reply_rx.try_recv().is_ok() {}
                return PollOutcome::Idle;
            }
        };
        match self.reply_rx.try_recv() {
            Ok(Ok(text)) => {
                self.in_flight = None;
                match service::extract_action(&text) {
                    Some(action) => PollOutcome::Decided(action),
                    None => PollOutcome::Failed(DecisionError::Malformed(format!(
                        "unrecognized reply: {}",
                        text.trim()
                    ))),
                }
            }
            Ok(Err(e)) => {
                self.in_flight = None;
                PollOutcome::Failed(e)
            }
            Err(TryRecvError::Empty) => {
                if started.elapsed() >= self.timeout {
                    // Abandon it; the worker's late reply drains later.
                    self.in_flight = None;
                    PollOutcome::TimedOut
                } else {
                    PollOutcome::Pending
                }
            }
            Err(TryRecvError::Disconnected) => {
                self.in_flight = None;
                PollOutcome::Failed(DecisionError::Unavailable(
                    "decision worker exited".to_string(),
                ))
            }
        }
    }

    /// Local substitute for a failed or absent decision.
    pub fn fallback(snapshot: &PerceptionSnapshot) -> Action {
        policy::fallback(snapshot)
    }
}

impl Drop for PolicyDriver {
    fn drop(&mut self) {
        // Replacing the sender disconnects the worker's recv loop.
        let (tx, _rx) = bounded(1);
        self.req_tx = tx;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::service::{DecisionError, DecisionReply, HeuristicService};
    use crate::domain::body::PhysicsBody;
    use crate::domain::perception;
    use crate::domain::tile::{Tile, TileWorld};

    fn grounded_snapshot() -> PerceptionSnapshot {
        let mut world = TileWorld::empty(30, 20);
        world.fill(0..=29, 18..=19, Tile::Solid);
        let mut body = PhysicsBody::new(100.0, 18.0 * 32.0 - 44.0);
        body.on_ground = true;
        perception::encode(&body, &world, 900.0, 32.0)
    }

    fn poll_until_settled(driver: &mut PolicyDriver, budget: Duration) -> PollOutcome {
        let deadline = Instant::now() + budget;
        loop {
            match driver.poll() {
                PollOutcome::Pending => {
                    assert!(Instant::now() < deadline, "worker never answered");
                    thread::sleep(Duration::from_millis(1));
                }
                outcome => return outcome,
            }
        }
    }

    #[test]
    fn heuristic_round_trip_through_the_worker() {
        let mut driver =
            PolicyDriver::spawn(Box::new(HeuristicService), Duration::from_secs(5));
        let snap = grounded_snapshot();
        assert!(driver.request(&snap));
        assert!(driver.in_flight());
        assert!(!driver.request(&snap), "second request while in flight");
        let outcome = poll_until_settled(&mut driver, Duration::from_secs(5));
        assert_eq!(outcome, PollOutcome::Decided(Action::RightJump));
        assert!(!driver.in_flight());
        assert_eq!(driver.poll(), PollOutcome::Idle);
    }

    struct SlowService(Duration);

    impl DecisionService for SlowService {
        fn decide(&mut self, _request: &str) -> Result<String, DecisionError> {
            thread::sleep(self.0);
            Ok(serde_json::to_string(&DecisionReply { action: "left".into() }).unwrap())
        }

        fn status(&self) -> ServiceStatus {
            ServiceStatus { configured: true, backend: "slow".into() }
        }
    }

    struct GarbageService;

    impl DecisionService for GarbageService {
        fn decide(&mut self, _request: &str) -> Result<String, DecisionError> {
            Ok("definitely not json".into())
        }

        fn status(&self) -> ServiceStatus {
            ServiceStatus { configured: true, backend: "garbage".into() }
        }
    }

    #[test]
    fn slow_reply_times_out_and_slot_recovers() {
        let mut driver = PolicyDriver::spawn(
            Box::new(SlowService(Duration::from_millis(300))),
            Duration::from_millis(30),
        );
        let snap = grounded_snapshot();
        assert!(driver.request(&snap));
        thread::sleep(Duration::from_millis(60));
        assert_eq!(driver.poll(), PollOutcome::TimedOut);
        assert!(!driver.in_flight());

        // The abandoned reply must not leak into the next cycle.
        thread::sleep(Duration::from_millis(400));
        assert_eq!(driver.poll(), PollOutcome::Idle);
        assert!(driver.request(&snap));
        let outcome = poll_until_settled(&mut driver, Duration::from_secs(5));
        assert_eq!(outcome, PollOutcome::Decided(Action::Left));
    }

    #[test]
    fn unparseable_reply_reports_malformed() {
        let mut driver =
            PolicyDriver::spawn(Box::new(GarbageService), Duration::from_secs(5));
        let snap = grounded_snapshot();
        assert!(driver.request(&snap));
        let outcome = poll_until_settled(&mut driver, Duration::from_secs(5));
        assert!(matches!(
            outcome,
            PollOutcome::Failed(DecisionError::Malformed(_))
        ));
    }

    struct CrashingService;

    impl DecisionService for CrashingService {
        fn decide(&mut self, _request: &str) -> Result<String, DecisionError> {
            panic!("service crashed")
        }

        fn status(&self) -> ServiceStatus {
            ServiceStatus { configured: true, backend: "crashing".into() }
        }
    }

    #[test]
    fn dead_worker_reports_unavailable() {
        let mut driver =
            PolicyDriver::spawn(Box::new(CrashingService), Duration::from_secs(5));
        let snap = grounded_snapshot();
        assert!(driver.request(&snap));
        let outcome = poll_until_settled(&mut driver, Duration::from_secs(5));
        assert!(matches!(
            outcome,
            PollOutcome::Failed(DecisionError::Unavailable(_))
        ));
        assert!(!driver.in_flight());
        // The slot is free again but the worker is gone
        assert!(!driver.request(&snap));
    }

    #[test]
    fn fallback_matches_local_policy() {
        let snap = grounded_snapshot();
        assert_eq!(PolicyDriver::fallback(&snap), policy::fallback(&snap));
    }
}
