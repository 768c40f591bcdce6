use super::*;
use crate::ID;
use crate::OptionIndex;
use crate::Round;
use crate::Slot;
use crate::network::*;
use crate::payoff::*;
use crate::records::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use std::collections::VecDeque;
use tokio::time::Instant;

/// Keeps topology draws off the payoff noise stream.
const TOPOLOGY_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Result of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Seated(Slot),
    Rejoined(Slot),
    Decoy(DecoyReason),
}

/// Snapshot for listings and health checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomStatus {
    pub room: String,
    pub stage: Stage,
    pub mode: Option<Mode>,
    pub round: Round,
    pub seated: usize,
    pub active: usize,
}

/// Pairing-variant state owned by the room.
#[derive(Debug)]
struct Network {
    config: NetworkConfig,
    graph: NetworkGraph,
    matchmaker: Matchmaker,
    pairing: Option<Pairing>,
    ballots: Option<Ostracism>,
}

/// Functional core of a room.
///
/// Owns the stage machine, roster, readiness tally, round choices, timer
/// epochs, payoff noise, and the optional network. Every operation runs to
/// completion synchronously and queues [`Effect`]s, which the room task
/// drains and carries out. Refused signals leave the state untouched.
#[derive(Debug)]
pub struct Coordinator {
    room: ID<Room>,
    config: RoomConfig,
    timing: TimerConfig,
    environments: Environments,
    seed: u64,
    noise: Gaussian<SmallRng>,
    stage: Stage,
    mode: Option<Mode>,
    round: Round,
    participants: Vec<Participant>,
    choices: Vec<Option<Choice>>,
    readiness: Readiness,
    timers: Timers,
    network: Option<Network>,
    vote_due: bool,
    ended: Option<EndReason>,
    triggers: VecDeque<Trigger>,
    advancing: bool,
    effects: Vec<Effect>,
}

impl Coordinator {
    /// Validates `config` and opens the first waiting room, arming its deadline.
    pub fn new(room: ID<Room>, config: RoomConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| room.low());
        let mut this = Self {
            room,
            timing: config.timers(),
            environments: config.environments(),
            noise: Gaussian::seeded(seed, config.noise_sd),
            seed,
            config,
            stage: Stage::FirstWaiting,
            mode: None,
            round: 0,
            participants: Vec::new(),
            choices: Vec::new(),
            readiness: Readiness::default(),
            timers: Timers::default(),
            network: None,
            vote_due: false,
            ended: None,
            triggers: VecDeque::new(),
            advancing: false,
            effects: Vec::new(),
        };
        this.readiness.reset();
        this.arm(TimerKind::WaitDeadline);
        log::debug!("[room {}] opened with seed {}", room, seed);
        Ok(this)
    }
    /// Takes the effects queued since the last drain.
    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

/// Accessors.
impl Coordinator {
    pub fn id(&self) -> ID<Room> {
        self.room
    }
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
    pub fn stage(&self) -> Stage {
        self.stage
    }
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }
    pub fn round(&self) -> Round {
        self.round
    }
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }
    pub fn participant(&self, slot: Slot) -> Option<&Participant> {
        self.participants.get(slot)
    }
    pub fn choice(&self, slot: Slot) -> Option<&Choice> {
        self.choices.get(slot).and_then(Option::as_ref)
    }
    pub fn ready_count(&self) -> usize {
        self.readiness.count()
    }
    pub fn active_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_active()).count()
    }
    pub fn graph(&self) -> Option<&NetworkGraph> {
        self.network.as_ref().map(|n| &n.graph)
    }
    pub fn pairing(&self) -> Option<&Pairing> {
        self.network.as_ref().and_then(|n| n.pairing.as_ref())
    }
    pub fn ballots(&self) -> Option<&Ostracism> {
        self.network.as_ref().and_then(|n| n.ballots.as_ref())
    }
    pub fn ended(&self) -> Option<EndReason> {
        self.ended
    }
    pub fn status(&self) -> RoomStatus {
        RoomStatus {
            room: self.room.to_string(),
            stage: self.stage,
            mode: self.mode,
            round: self.round,
            seated: self.participants.len(),
            active: self.active_count(),
        }
    }
}

/// Inbound operations.
impl Coordinator {
    /// Seats a new subject while the first waiting room is open and not full,
    /// reattaches a known subject to its slot, and routes everyone else to a decoy.
    pub fn join(&mut self, subject: &str, now: Instant) -> Admission {
        if let Some(slot) = self.slot_of(subject) {
            return self.rejoin(slot, now);
        }
        if self.stage != Stage::FirstWaiting || self.participants.len() >= self.config.max_group_size {
            log::info!("[room {}] {} routed to decoy ({})", self.room, subject, self.stage);
            return Admission::Decoy(DecoyReason::Closed);
        }
        let slot = self.participants.len();
        self.participants
            .push(Participant::new(subject.to_string(), slot, now));
        self.choices.push(None);
        log::info!("[room {}] {} seated as P{}", self.room, subject, slot);
        self.unicast(slot, self.joined(slot));
        self.check_start(now);
        Admission::Seated(slot)
    }
    /// Dispatches a client signal from a seated participant.
    /// Refusals are logged and answered with a rejection; nothing else changes.
    pub fn apply(&mut self, slot: Slot, message: ClientMessage) -> Result<(), ProtocolError> {
        let result = match message {
            ClientMessage::Join { .. } => Err(ProtocolError::AlreadyJoined(slot)),
            ClientMessage::ComprehensionPassed => {
                self.record_readiness(slot, Barrier::Comprehension)
            }
            ClientMessage::RoundReady { .. } => self.record_readiness(slot, Barrier::RoundReady),
            ClientMessage::ChoiceMade {
                option,
                timed_out,
                reaction_time_ms,
            } => self.record_choice(slot, option, timed_out, reaction_time_ms),
            ClientMessage::OstracismVote { partner, vote } => self.record_vote(slot, partner, vote),
            ClientMessage::SceneComplete { .. } => self.record_scene(slot),
            ClientMessage::Disconnect => self.handle_disconnect(slot),
        };
        if let Err(ref e) = result {
            self.fault(Fault::from(e.clone()));
            self.unicast(slot, ServerMessage::rejected(e));
        }
        result
    }
    /// Counts `slot` toward the current barrier once per occurrence.
    pub fn record_readiness(&mut self, slot: Slot, barrier: Barrier) -> Result<(), ProtocolError> {
        self.check_active(slot)?;
        if self.stage.barrier() != Some(barrier) || self.ballots().is_some() {
            return Err(ProtocolError::WrongStage {
                signal: barrier.signal(),
                stage: self.stage,
            });
        }
        match self.readiness.mark(slot) {
            true => self.check_barrier(),
            false => log::debug!("[room {}] P{} already {}", self.room, slot, barrier),
        }
        Ok(())
    }
    /// Records the one response `slot` may give this round.
    pub fn record_choice(
        &mut self,
        slot: Slot,
        option: Option<OptionIndex>,
        timed_out: bool,
        reaction_ms: Option<u64>,
    ) -> Result<(), ProtocolError> {
        self.check_active(slot)?;
        if self.stage != Stage::MainTask {
            return Err(ProtocolError::WrongStage {
                signal: "choice_made",
                stage: self.stage,
            });
        }
        if self.choices[slot].is_some() {
            return Err(ProtocolError::DuplicateChoice(slot));
        }
        if !self.expects(slot) {
            return Err(ProtocolError::SittingOut(slot));
        }
        match option {
            Some(option) if option >= self.config.option_count => {
                return Err(ProtocolError::InvalidOption {
                    option,
                    options: self.config.option_count,
                });
            }
            _ => {}
        }
        let option = if timed_out { None } else { option };
        self.choices[slot] = Some(Choice {
            slot,
            option,
            at: crate::epoch_millis(),
            reaction_ms,
            timed_out,
        });
        log::debug!("[room {}] P{} chose {:?} in round {}", self.room, slot, option, self.round);
        self.check_round();
        Ok(())
    }
    /// Casts `slot`'s ostracism vote on its current partner.
    pub fn record_vote(&mut self, slot: Slot, partner: Slot, vote: Vote) -> Result<(), ProtocolError> {
        self.check_active(slot)?;
        let stage = self.stage;
        self.network
            .as_mut()
            .and_then(|n| n.ballots.as_mut())
            .ok_or(ProtocolError::WrongStage {
                signal: "ostracism_vote",
                stage,
            })?
            .cast(slot, partner, vote)?;
        log::debug!("[room {}] P{} votes {:?} on P{}", self.room, slot, vote, partner);
        self.check_ballots();
        Ok(())
    }
    /// Scene completions close the feedback stage; elsewhere they are not expected.
    pub fn record_scene(&mut self, slot: Slot) -> Result<(), ProtocolError> {
        self.record_readiness(slot, Barrier::Feedback)
    }
    /// Marks `slot` inactive and re-evaluates whatever the room was waiting on.
    pub fn handle_disconnect(&mut self, slot: Slot) -> Result<(), ProtocolError> {
        let active = self
            .participants
            .get(slot)
            .map(Participant::is_active)
            .ok_or(ProtocolError::UnknownParticipant(slot))?;
        if !active {
            return Ok(());
        }
        let awaited = self.stage == Stage::MainTask && self.expects(slot) && self.choices[slot].is_none();
        self.participants[slot].set_presence(Presence::Inactive);
        log::info!("[room {}] P{} disconnected during {}", self.room, slot, self.stage);
        if awaited {
            self.fault(Fault::DisconnectDuringRound {
                slot,
                round: self.round,
            });
        }
        let present = self.active_count();
        let required = self.config.min_group_size;
        match self.stage {
            Stage::Finished => {}
            Stage::FirstWaiting => self.broadcast(ServerMessage::StageProgress {
                stage: Stage::FirstWaiting,
                k: present,
                n: required,
            }),
            _ if present == 0 => self.end(EndReason::Abandoned),
            _ if self.mode != Some(Mode::Individual) && present < required => {
                self.fault(Fault::QuorumNotMet { present, required });
                match self.config.degrade {
                    Degrade::EarlyExit => self.end(EndReason::EarlyExit),
                    Degrade::ContinueSmaller => self.recheck(),
                }
            }
            _ => self.recheck(),
        }
        Ok(())
    }
    /// Handles a timer firing. Stale epochs are discarded.
    pub fn on_timer(&mut self, kind: TimerKind, epoch: u64, now: Instant) {
        if !self.timers.fire(kind, epoch) {
            log::debug!("[room {}] discarded stale {} #{}", self.room, kind, epoch);
            return;
        }
        match kind {
            TimerKind::WaitDeadline => self.on_deadline(now),
            TimerKind::RoundTimeout => self.on_round_timeout(),
            TimerKind::VoteTimeout => self.on_vote_timeout(),
        }
    }
}

/// Session start and stage entry.
impl Coordinator {
    fn rejoin(&mut self, slot: Slot, now: Instant) -> Admission {
        if self.stage.is_finished() {
            log::info!("[room {}] P{} returned after the session ended", self.room, slot);
            return Admission::Decoy(DecoyReason::Concluded);
        }
        self.participants[slot].set_presence(Presence::Active);
        log::info!("[room {}] P{} reconnected during {}", self.room, slot, self.stage);
        self.unicast(slot, self.joined(slot));
        let assigned = self
            .pairing()
            .filter(|_| self.stage == Stage::MainTask)
            .map(|pairing| ServerMessage::PairingAssigned {
                round: pairing.round(),
                assignment: pairing.assignment(slot),
            });
        if let Some(message) = assigned {
            self.unicast(slot, message);
        }
        self.check_start(now);
        Admission::Rejoined(slot)
    }
    fn check_start(&mut self, now: Instant) {
        if self.stage != Stage::FirstWaiting {
            return;
        }
        let k = self.active_count();
        let n = self.config.min_group_size;
        match k >= n {
            true => self.start(self.grouped_mode(), now),
            false => self.broadcast(ServerMessage::StageProgress {
                stage: Stage::FirstWaiting,
                k,
                n,
            }),
        }
    }
    fn start(&mut self, mode: Mode, now: Instant) {
        self.disarm(TimerKind::WaitDeadline);
        self.mode = Some(mode);
        let rate = self.config.waiting_bonus_per_sec;
        for p in self.participants.iter_mut().filter(|p| p.is_active()) {
            let waited = now.saturating_duration_since(p.joined_at()).as_secs_f64();
            p.accrue_waiting(Outcome::round(waited * rate));
        }
        if let (Mode::Paired, Some(config)) = (mode, self.config.network) {
            let n = self.participants.len();
            let ref mut rng = SmallRng::seed_from_u64(self.seed ^ TOPOLOGY_SALT);
            self.network = Some(Network {
                config,
                graph: config.topology.build(n, rng),
                matchmaker: Matchmaker::new(n),
                pairing: None,
                ballots: None,
            });
        }
        log::info!(
            "[room {}] session started: {} participants, {:?}",
            self.room,
            self.active_count(),
            mode
        );
        self.broadcast(ServerMessage::SessionStarted {
            group: GroupInfo {
                size: self.active_count(),
                mode,
                condition: self.config.condition,
                options: self.config.option_count,
                rounds: self.config.rounds,
            },
        });
        self.advance(match mode {
            Mode::Individual => Trigger::DeadlineElapsed,
            Mode::Grouped | Mode::Paired => Trigger::GroupFilled,
        });
    }
    /// Queues `trigger`. Transitions raised while entering a stage run after
    /// that entry completes, so back-to-back rounds never nest.
    fn advance(&mut self, trigger: Trigger) {
        self.triggers.push_back(trigger);
        if self.advancing {
            return;
        }
        self.advancing = true;
        while let Some(trigger) = self.triggers.pop_front() {
            match self.stage.next(trigger) {
                Some(stage) => self.enter(stage),
                None => log::error!(
                    "[room {}] no transition from {} on {:?}",
                    self.room,
                    self.stage,
                    trigger
                ),
            }
        }
        self.advancing = false;
    }
    fn enter(&mut self, stage: Stage) {
        log::debug!("[room {}] {} -> {}", self.room, self.stage, stage);
        self.stage = stage;
        self.readiness.reset();
        if stage.is_finished() {
            return self.finish();
        }
        self.broadcast(ServerMessage::AllReady { next_stage: stage });
        match stage {
            Stage::MainTask => self.begin_round(),
            Stage::RoundBoundary => self.begin_boundary(),
            _ => {}
        }
    }
    fn begin_round(&mut self) {
        self.choices.iter_mut().for_each(|c| *c = None);
        let active = self
            .participants
            .iter()
            .map(Participant::is_active)
            .collect::<Vec<_>>();
        let round = self.round;
        let pairing = self.network.as_mut().map(|network| {
            let pairing = network.matchmaker.pair(&network.graph, &active, round);
            network.pairing = Some(pairing.clone());
            pairing
        });
        if let Some(pairing) = pairing {
            for p in self.participants.iter_mut() {
                p.set_isolated(pairing.assignment(p.slot()) == Assignment::Isolated);
            }
            for slot in (0..active.len()).filter(|s| active[*s]) {
                let message = ServerMessage::PairingAssigned {
                    round,
                    assignment: pairing.assignment(slot),
                };
                self.unicast(slot, message);
            }
        }
        self.arm(TimerKind::RoundTimeout);
        self.check_round();
    }
    fn begin_boundary(&mut self) {
        if !self.vote_due {
            return;
        }
        let opened = self.network.as_mut().and_then(|network| {
            network.ballots = network.pairing.as_ref().map(Ostracism::open);
            network.ballots.as_ref().map(|b| b.ballots().len())
        });
        if let Some(count) = opened {
            log::debug!("[room {}] {} ostracism ballot(s) open", self.room, count);
            self.arm(TimerKind::VoteTimeout);
            self.check_ballots();
        }
    }
    fn grouped_mode(&self) -> Mode {
        match self.config.network {
            Some(_) => Mode::Paired,
            None => Mode::Grouped,
        }
    }
}

/// Barrier, round, and ballot resolution.
impl Coordinator {
    fn check_barrier(&mut self) {
        if self.stage.barrier().is_none() || self.ballots().is_some() {
            return;
        }
        let n = self.active_count();
        let k = self
            .readiness
            .count_where(|s| self.participants[s].is_active());
        match n > 0 && k >= n {
            true => self.advance(Trigger::BarrierClosed),
            false => self.broadcast(ServerMessage::StageProgress {
                stage: self.stage,
                k,
                n,
            }),
        }
    }
    fn check_round(&mut self) {
        if self.stage == Stage::MainTask && self.pending().is_empty() {
            self.finalize();
        }
    }
    fn check_ballots(&mut self) {
        let complete = match self.ballots() {
            Some(ballots) => ballots.complete(|s| self.participants[s].is_active()),
            None => return,
        };
        if complete {
            self.resolve_ballots();
        }
    }
    fn recheck(&mut self) {
        match self.stage {
            Stage::MainTask => self.check_round(),
            Stage::RoundBoundary if self.ballots().is_some() => self.check_ballots(),
            _ => self.check_barrier(),
        }
    }
    /// Whether `slot` must respond for the round to close.
    fn expects(&self, slot: Slot) -> bool {
        self.participants[slot].is_active()
            && self
                .pairing()
                .is_none_or(|pairing| pairing.partner_of(slot).is_some())
    }
    fn pending(&self) -> Vec<Slot> {
        (0..self.participants.len())
            .filter(|s| self.expects(*s) && self.choices[*s].is_none())
            .collect()
    }
    /// Payoff groups with the quorum each must meet.
    fn groups(&self) -> Vec<(Vec<Slot>, usize)> {
        let n = self.participants.len();
        match (self.mode, self.pairing()) {
            (Some(Mode::Individual), _) => (0..n).map(|s| (vec![s], 1)).collect(),
            (_, Some(pairing)) => pairing
                .pairs()
                .into_iter()
                .map(|(a, b)| (vec![a, b], self.config.response_quorum.min(2)))
                .collect(),
            _ => vec![((0..n).collect(), self.config.response_quorum)],
        }
    }
    fn finalize(&mut self) {
        self.disarm(TimerKind::RoundTimeout);
        let n = self.participants.len();
        let round = self.round;
        let condition = self.config.condition;
        let means = self.environments.means(round).to_vec();
        let picks = self
            .choices
            .iter()
            .map(|c| c.and_then(|c| c.option))
            .collect::<Vec<_>>();
        let mut payoffs = vec![0.0; n];
        let mut records = vec![PayoffRecord::absent(condition); n];
        let mut paid = false;
        for (members, quorum) in self.groups() {
            let group = members.iter().map(|s| picks[*s]).collect::<Vec<_>>();
            let outcome = Outcome::settle(&group, &means, condition, quorum, &mut self.noise);
            if !outcome.paid() && members.iter().any(|s| self.participants[*s].is_active()) {
                self.fault(Fault::QuorumNotMet {
                    present: outcome.responders(),
                    required: quorum,
                });
            }
            paid |= outcome.paid();
            for (i, slot) in members.iter().enumerate() {
                payoffs[*slot] = outcome.payoff(i);
                records[*slot] = outcome.record(i);
            }
        }
        let recorded_at = crate::epoch_millis();
        let mut persisted = Vec::with_capacity(n);
        for (slot, participant) in self.participants.iter_mut().enumerate() {
            let choice = self.choices[slot];
            participant.settle(payoffs[slot], picks[slot].is_some());
            persisted.push(RoundRecord {
                room: self.room.to_string(),
                round,
                slot,
                subject: participant.subject().to_string(),
                partner: self
                    .network
                    .as_ref()
                    .and_then(|n| n.pairing.as_ref())
                    .and_then(|p| p.partner_of(slot)),
                chosen_at: choice.map(|c| c.at),
                reaction_ms: choice.and_then(|c| c.reaction_ms),
                timed_out: choice.is_some_and(|c| c.timed_out),
                recorded_at,
                payoff: records[slot].clone(),
            });
        }
        persisted
            .into_iter()
            .for_each(|r| self.effects.push(Effect::Persist(Record::from(r))));
        log::info!("[room {}] round {} settled: {:?}", self.room, round, payoffs);
        self.broadcast(ServerMessage::RoundResult {
            round,
            payoffs,
            frequencies: Outcome::tally(&picks, self.config.option_count),
            paid,
        });
        self.round += 1;
        let last = self.round >= self.config.rounds;
        self.vote_due = !last && self.ostracism_due();
        let pause = self.config.round_break || self.vote_due;
        self.advance(Trigger::RoundFinalized { last, pause });
    }
    fn ostracism_due(&self) -> bool {
        match self.network.as_ref().map(|n| n.config.ostracism_every) {
            Some(0) | None => false,
            Some(every) => self.round % every == 0,
        }
    }
    fn resolve_ballots(&mut self) {
        self.disarm(TimerKind::VoteTimeout);
        self.vote_due = false;
        let Some(network) = self.network.as_mut() else {
            return;
        };
        let Some(ballots) = network.ballots.take() else {
            return;
        };
        let removals = ballots.resolve(&mut network.graph);
        let summary = network.graph.summary();
        log::info!(
            "[room {}] ostracism removed {} edge(s), density {:.3}",
            self.room,
            removals.len(),
            summary.density
        );
        self.broadcast(ServerMessage::NetworkSummary {
            edges_removed: summary.edges_removed,
            density: summary.density,
            isolated: summary.isolated,
        });
        self.check_barrier();
    }
}

/// Timeouts and teardown.
impl Coordinator {
    fn on_deadline(&mut self, now: Instant) {
        if self.stage != Stage::FirstWaiting {
            return;
        }
        let present = self.active_count();
        let required = self.config.min_group_size;
        match present {
            0 => {
                log::info!("[room {}] nobody arrived before the deadline", self.room);
                self.end(EndReason::Abandoned);
            }
            n if n >= required => self.start(self.grouped_mode(), now),
            _ => {
                self.fault(Fault::QuorumNotMet { present, required });
                self.start(Mode::Individual, now);
            }
        }
    }
    fn on_round_timeout(&mut self) {
        if self.stage != Stage::MainTask {
            return;
        }
        let pending = self.pending();
        if !pending.is_empty() {
            self.fault(Fault::TimeoutExpired {
                kind: TimerKind::RoundTimeout,
                missing: pending.len(),
            });
        }
        for slot in pending {
            self.choices[slot] = Some(Choice::missing(slot));
        }
        self.finalize();
    }
    fn on_vote_timeout(&mut self) {
        let missing = match self.ballots() {
            Some(ballots) => ballots
                .ballots()
                .iter()
                .flat_map(|b| b.members().map(|m| (m, b.vote_of(m))))
                .filter(|(m, vote)| vote.is_none() && self.participants[*m].is_active())
                .count(),
            None => return,
        };
        if missing > 0 {
            self.fault(Fault::TimeoutExpired {
                kind: TimerKind::VoteTimeout,
                missing,
            });
        }
        self.resolve_ballots();
    }
    fn end(&mut self, reason: EndReason) {
        self.ended = Some(reason);
        self.advance(Trigger::Exit);
    }
    fn finish(&mut self) {
        let reason = *self.ended.get_or_insert(EndReason::Completed);
        for kind in TimerKind::all() {
            self.disarm(kind);
        }
        let recorded_at = crate::epoch_millis();
        let summaries = self
            .participants
            .iter()
            .map(|p| SummaryRecord {
                room: self.room.to_string(),
                slot: p.slot(),
                subject: p.subject().to_string(),
                total: Outcome::round(p.total()),
                waiting_bonus: p.waiting_bonus(),
                rounds_answered: p.answered(),
                rounds_played: self.round,
                reason,
                recorded_at,
            })
            .collect::<Vec<_>>();
        for summary in summaries {
            if self.participants[summary.slot].is_active() {
                let message = ServerMessage::SessionEnded {
                    summary: FinalSummary {
                        reason,
                        total: summary.total,
                        waiting_bonus: summary.waiting_bonus,
                        rounds_answered: summary.rounds_answered,
                        rounds_played: summary.rounds_played,
                    },
                };
                self.unicast(summary.slot, message);
            }
            self.effects.push(Effect::Persist(Record::from(summary)));
        }
        log::info!("[room {}] session {} after {} round(s)", self.room, reason, self.round);
        self.effects.push(Effect::Close);
    }
}

/// Effect helpers.
impl Coordinator {
    fn slot_of(&self, subject: &str) -> Option<Slot> {
        self.participants
            .iter()
            .find(|p| p.subject() == subject)
            .map(Participant::slot)
    }
    fn check_active(&self, slot: Slot) -> Result<(), ProtocolError> {
        match self.participants.get(slot) {
            None => Err(ProtocolError::UnknownParticipant(slot)),
            Some(p) if !p.is_active() => Err(ProtocolError::Inactive(slot)),
            Some(_) => Ok(()),
        }
    }
    fn joined(&self, slot: Slot) -> ServerMessage {
        ServerMessage::Joined {
            room: self.room.to_string(),
            slot,
            stage: self.stage,
        }
    }
    fn arm(&mut self, kind: TimerKind) {
        let epoch = self.timers.arm(kind);
        let after = self.timing.duration(kind);
        self.effects.push(Effect::Arm { kind, epoch, after });
    }
    fn disarm(&mut self, kind: TimerKind) {
        if self.timers.disarm(kind) {
            self.effects.push(Effect::Disarm(kind));
        }
    }
    fn unicast(&mut self, slot: Slot, message: ServerMessage) {
        self.effects.push(Effect::Unicast(slot, message));
    }
    fn broadcast(&mut self, message: ServerMessage) {
        self.effects.push(Effect::Broadcast(message));
    }
    fn fault(&self, fault: Fault) {
        fault.report(&self.room);
    }
}

