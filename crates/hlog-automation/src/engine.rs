//! Tick-driven runner for selection-tool automation jobs.
//!
//! One job at a time. Each END tick freezes the local player, burns down the
//! current delay, then performs at most one step. Chat lines are matched
//! against the pending corner confirmation between ticks.

use hlog_host_api::{ClientApi, LocalPlayer, MessageLevel, TickPhase};
use hlog_types::{BlockPos, Vec3};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::coords::{match_confirmation, Corner};
use crate::job::{ConfirmState, Job, JobRequest, Step};

/// Delay between arriving at a corner and sending its select command.
pub const TP_TO_POS_DELAY_TICKS: u32 = 1;
/// Delay after a confirmed corner and after applying the operation.
pub const STEP_DELAY_TICKS: u32 = 10;
pub const RETURN_TO_DESELECT_DELAY_TICKS: u32 = 14;
pub const DESELECT_DELAY_TICKS: u32 = 14;
/// Give up waiting for arrival and select anyway after this many ticks.
pub const TP_TIMEOUT_TICKS: u32 = 120;
pub const TP_RETRY_DELAY_TICKS: u32 = 12;
pub const POS_CONFIRM_TIMEOUT_TICKS: u32 = 40;
pub const TP_NEAR_TOLERANCE_XZ: f64 = 0.65;
pub const TP_NEAR_TOLERANCE_Y: f64 = 1.10;

const DESELECT_COMMAND: &str = "//desel";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("<blockID> cannot be empty.")]
    EmptyBlockId,
    #[error("Not in Housing (HOUSING scoreboard not detected).")]
    NotInTargetContext,
    #[error("Player not available.")]
    PlayerUnavailable,
    #[error("An automation job is already running.")]
    AlreadyRunning,
}

/// Faults that abort a running job.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("non-finite teleport coordinate {0}")]
    NonFiniteCoordinate(f64),
    #[error("no confirmation pending for {0}")]
    ConfirmStateLost(Corner),
}

/// What the step function asks the tick handler to do with the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Done,
    Aborted,
}

#[derive(Debug, Default)]
pub struct WorkflowEngine {
    job: Option<Job>,
}

impl WorkflowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.job.is_some()
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn current_step(&self) -> Option<Step> {
        self.job.as_ref().map(|j| j.step)
    }

    /// Drop the running job, if any. Nothing is sent to the host.
    pub fn cancel(&mut self) -> bool {
        self.job.take().is_some()
    }

    /// Begin a job from the local player's current position. Fails without
    /// touching a running job.
    pub fn start(&mut self, mut request: JobRequest, api: &mut dyn ClientApi) -> Result<(), StartError> {
        request.block_id = request.block_id.trim().to_string();
        if request.block_id.is_empty() {
            return Err(StartError::EmptyBlockId);
        }
        if !api.in_target_context() {
            return Err(StartError::NotInTargetContext);
        }
        let player = api.local_player().ok_or(StartError::PlayerUnavailable)?;
        if self.job.is_some() {
            return Err(StartError::AlreadyRunning);
        }

        let label = request.operation.command_name();
        info!(
            "Starting {label} automation: {} -> {} with {}",
            request.pos1, request.pos2, request.block_id
        );
        self.job = Some(Job::new(request, player));
        api.show_message(MessageLevel::Success, &format!("Starting {label} automation..."));
        Ok(())
    }

    pub fn on_tick(&mut self, phase: TickPhase, api: &mut dyn ClientApi) {
        if phase != TickPhase::End || self.job.is_none() {
            return;
        }
        let Some(player) = api.local_player() else {
            debug!("Local player gone, discarding automation job");
            self.job = None;
            return;
        };
        let Some(job) = self.job.as_mut() else {
            return;
        };

        api.freeze_movement();
        if job.wait_ticks > 0 {
            job.wait_ticks -= 1;
            return;
        }

        match advance(job, &player, api) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Done) | Ok(Flow::Aborted) => self.job = None,
            Err(e) => {
                warn!("Automation failed at {}: {e}", job.step);
                api.show_message(MessageLevel::Failure, &format!("Automation failed: {e}"));
                self.job = None;
            }
        }
    }

    /// Feed an incoming chat line. Returns true if it was taken as a
    /// confirmation (good or bad) for the pending corner.
    pub fn on_chat(&mut self, text: &str) -> bool {
        let Some(job) = self.job.as_mut() else {
            return false;
        };
        let Some(corner) = job.confirm.pending else {
            return false;
        };
        let Some(pos) = match_confirmation(text, corner) else {
            return false;
        };
        if pos == job.target(corner) {
            job.confirm.ok = true;
        } else {
            debug!("{corner} confirmed at {pos}, expected {}", job.target(corner));
            job.confirm.bad = true;
        }
        true
    }
}

fn advance(job: &mut Job, player: &LocalPlayer, api: &mut dyn ClientApi) -> Result<Flow, WorkflowError> {
    let step = job.step;
    match step {
        Step::Teleport(corner) => {
            api.send_chat_command(&tp_command(job.target(corner).floor_center())?);
            job.step = step.next();
            job.tp_wait_ticks = 0;
            job.wait_ticks = 0;
        }
        Step::AwaitArrival(corner) => {
            job.tp_wait_ticks += 1;
            if is_near_target(&player.position, job.target(corner)) || job.tp_wait_ticks >= TP_TIMEOUT_TICKS {
                job.step = step.next();
                job.wait_ticks = TP_TO_POS_DELAY_TICKS;
            }
        }
        Step::Select(corner) => {
            let command = corner.select_command();
            api.send_chat_command(&command);
            api.show_message(MessageLevel::Info, &format!("Executed {command}"));
            job.confirm = ConfirmState::begin(corner, POS_CONFIRM_TIMEOUT_TICKS, player.block_pos());
            job.step = step.next();
            job.wait_ticks = 0;
        }
        Step::Confirm(corner) => {
            if job.confirm.pending != Some(corner) {
                return Err(WorkflowError::ConfirmStateLost(corner));
            }
            let target = job.target(corner);
            if tick_confirm(&mut job.confirm, target) {
                api.show_message(
                    MessageLevel::Success,
                    &format!("{} confirmed at target", corner.select_command()),
                );
                job.step = step.next();
                job.wait_ticks = STEP_DELAY_TICKS;
            } else if job.confirm.bad || job.confirm.ticks_remaining == 0 {
                let left = job.retries_remaining(corner);
                if !job.take_retry(corner) {
                    api.show_message(
                        MessageLevel::Failure,
                        &format!(
                            "{} could not be set at the target block after retries.",
                            corner.select_command()
                        ),
                    );
                    return Ok(Flow::Aborted);
                }
                api.show_message(MessageLevel::Info, &format!("Retrying {corner} ({left} left)..."));
                job.confirm = ConfirmState::default();
                job.step = Step::Teleport(corner);
                job.wait_ticks = TP_RETRY_DELAY_TICKS;
            }
        }
        Step::Apply => {
            api.send_chat_command(&job.request.operation.apply_command(&job.request.block_id));
            job.step = step.next();
            job.wait_ticks = STEP_DELAY_TICKS;
        }
        Step::Return => {
            let back = job.return_to;
            api.send_chat_command(&tp_command(back.position)?);
            api.set_rotation(back.yaw, back.pitch);
            job.step = step.next();
            job.wait_ticks = RETURN_TO_DESELECT_DELAY_TICKS;
        }
        Step::Deselect => {
            api.send_chat_command(DESELECT_COMMAND);
            job.step = step.next();
            job.wait_ticks = DESELECT_DELAY_TICKS;
        }
        Step::Finish => {
            api.show_message(MessageLevel::Success, "Done.");
            return Ok(Flow::Done);
        }
    }
    Ok(Flow::Continue)
}

/// Advance the confirmation wait by one tick. True once the corner counts as
/// set: a matching chat line, or on timeout the player having stood on the
/// target when the select command went out.
fn tick_confirm(confirm: &mut ConfirmState, expected: BlockPos) -> bool {
    if confirm.ok {
        *confirm = ConfirmState::default();
        return true;
    }
    if confirm.bad {
        return false;
    }
    if confirm.ticks_remaining > 0 {
        confirm.ticks_remaining -= 1;
        if confirm.ticks_remaining > 0 {
            return false;
        }
    }
    if confirm.player_block_at_send == Some(expected) {
        *confirm = ConfirmState::default();
        return true;
    }
    false
}

fn is_near_target(position: &Vec3, target: BlockPos) -> bool {
    let t = target.floor_center();
    (position.x - t.x).abs() <= TP_NEAR_TOLERANCE_XZ
        && (position.z - t.z).abs() <= TP_NEAR_TOLERANCE_XZ
        && (position.y - t.y).abs() <= TP_NEAR_TOLERANCE_Y
}

fn tp_command(to: Vec3) -> Result<String, WorkflowError> {
    for v in [to.x, to.y, to.z] {
        if !v.is_finite() {
            return Err(WorkflowError::NonFiniteCoordinate(v));
        }
    }
    Ok(format!("/tp {:.3} {:.3} {:.3}", to.x, to.y, to.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlog_host_api::PlayerView;

    /// How the fake server answers a select command.
    enum Reply {
        Silent,
        /// Confirm at the player's current block.
        AtPlayer,
        Fixed(BlockPos),
    }

    struct FakeHost {
        in_context: bool,
        player: Option<LocalPlayer>,
        follow_tp: bool,
        reply: Reply,
        sent: Vec<String>,
        messages: Vec<(MessageLevel, String)>,
        inbox: Vec<String>,
        freezes: u32,
        rotation: Option<(f32, f32)>,
    }

    impl FakeHost {
        fn new(reply: Reply) -> Self {
            Self {
                in_context: true,
                player: Some(LocalPlayer {
                    position: Vec3::new(0.5, 64.0, 0.5),
                    yaw: 90.0,
                    pitch: 10.0,
                }),
                follow_tp: true,
                reply,
                sent: Vec::new(),
                messages: Vec::new(),
                inbox: Vec::new(),
                freezes: 0,
                rotation: None,
            }
        }

        fn count_sent(&self, command: &str) -> usize {
            self.sent.iter().filter(|s| *s == command).count()
        }

        fn has_message(&self, text: &str) -> bool {
            self.messages.iter().any(|(_, m)| m == text)
        }
    }

    impl ClientApi for FakeHost {
        fn in_target_context(&self) -> bool {
            self.in_context
        }
        fn dimension(&self) -> Option<i32> {
            None
        }
        fn players(&self) -> Vec<PlayerView> {
            Vec::new()
        }
        fn local_player(&self) -> Option<LocalPlayer> {
            self.player
        }
        fn send_chat_command(&mut self, text: &str) {
            self.sent.push(text.to_string());
            if let Some(rest) = text.strip_prefix("/tp ") {
                if self.follow_tp {
                    let v: Vec<f64> = rest.split_whitespace().map(|s| s.parse().unwrap()).collect();
                    if let Some(p) = self.player.as_mut() {
                        p.position = Vec3::new(v[0], v[1], v[2]);
                    }
                }
                return;
            }
            let n = match text {
                "//pos1" => 1,
                "//pos2" => 2,
                _ => return,
            };
            let at = match &self.reply {
                Reply::Silent => return,
                Reply::AtPlayer => self.player.unwrap().block_pos(),
                Reply::Fixed(p) => *p,
            };
            self.inbox.push(format!("Position {n} set to ({}, {}, {})", at.x, at.y, at.z));
        }
        fn show_message(&mut self, level: MessageLevel, text: &str) {
            self.messages.push((level, text.to_string()));
        }
        fn freeze_movement(&mut self) {
            self.freezes += 1;
        }
        fn set_rotation(&mut self, yaw: f32, pitch: f32) {
            self.rotation = Some((yaw, pitch));
        }
    }

    fn tick(engine: &mut WorkflowEngine, host: &mut FakeHost) {
        engine.on_tick(TickPhase::End, host);
        for line in std::mem::take(&mut host.inbox) {
            engine.on_chat(&line);
        }
    }

    /// Tick until the job ends; returns the number of ticks taken.
    fn run(engine: &mut WorkflowEngine, host: &mut FakeHost, max: usize) -> usize {
        for n in 1..=max {
            tick(engine, host);
            if !engine.is_active() {
                return n;
            }
        }
        panic!("job still running after {max} ticks");
    }

    fn tick_until(engine: &mut WorkflowEngine, host: &mut FakeHost, step: Step) {
        for _ in 0..500 {
            if engine.current_step() == Some(step) {
                return;
            }
            tick(engine, host);
        }
        panic!("never reached {step}");
    }

    const TARGET: BlockPos = BlockPos { x: 10, y: 65, z: -3 };

    #[test]
    fn setblock_full_sequence() {
        let mut host = FakeHost::new(Reply::AtPlayer);
        let mut engine = WorkflowEngine::new();
        engine
            .start(JobRequest::set_block(TARGET, " minecraft:stone "), &mut host)
            .unwrap();

        let ticks = run(&mut engine, &mut host, 1000);
        assert_eq!(ticks, 72);
        assert_eq!(
            host.sent,
            vec![
                "/tp 10.500 65.000 -2.500",
                "//pos1",
                "/tp 10.500 65.000 -2.500",
                "//pos2",
                "//set minecraft:stone",
                "/tp 0.500 64.000 0.500",
                "//desel",
            ]
        );
        let texts: Vec<&str> = host.messages.iter().map(|(_, m)| m.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Starting //setblock automation...",
                "Executed //pos1",
                "//pos1 confirmed at target",
                "Executed //pos2",
                "//pos2 confirmed at target",
                "Done.",
            ]
        );
        assert_eq!(host.rotation, Some((90.0, 10.0)));
        assert!(host.freezes >= 72);
    }

    #[test]
    fn fill_uses_both_corners() {
        let mut host = FakeHost::new(Reply::AtPlayer);
        let mut engine = WorkflowEngine::new();
        engine
            .start(
                JobRequest::fill(BlockPos::new(1, 70, 1), BlockPos::new(-4, 72, 8), "glass"),
                &mut host,
            )
            .unwrap();
        run(&mut engine, &mut host, 1000);
        assert_eq!(host.sent[0], "/tp 1.500 70.000 1.500");
        assert_eq!(host.sent[2], "/tp -3.500 72.000 8.500");
        assert_eq!(host.sent[4], "//fill glass");
        assert!(host.has_message("Starting //fillblocks automation..."));
        assert!(host.has_message("Done."));
    }

    #[test]
    fn second_start_leaves_running_job_alone() {
        let mut host = FakeHost::new(Reply::Silent);
        let mut engine = WorkflowEngine::new();
        engine.start(JobRequest::set_block(TARGET, "stone"), &mut host).unwrap();
        for _ in 0..5 {
            tick(&mut engine, &mut host);
        }
        let before = engine.job().cloned().unwrap();
        let sent = host.sent.len();
        let messages = host.messages.len();

        let err = engine
            .start(JobRequest::set_block(BlockPos::new(0, 0, 0), "dirt"), &mut host)
            .unwrap_err();
        assert_eq!(err, StartError::AlreadyRunning);

        let after = engine.job().unwrap();
        assert_eq!(after.step, before.step);
        assert_eq!(after.wait_ticks, before.wait_ticks);
        assert_eq!(after.confirm, before.confirm);
        assert_eq!(after.request, before.request);
        assert_eq!(host.sent.len(), sent);
        assert_eq!(host.messages.len(), messages);
    }

    #[test]
    fn start_validation() {
        let mut engine = WorkflowEngine::new();
        let mut host = FakeHost::new(Reply::Silent);
        assert_eq!(
            engine.start(JobRequest::set_block(TARGET, "   "), &mut host),
            Err(StartError::EmptyBlockId)
        );
        host.in_context = false;
        assert_eq!(
            engine.start(JobRequest::set_block(TARGET, "stone"), &mut host),
            Err(StartError::NotInTargetContext)
        );
        host.in_context = true;
        host.player = None;
        assert_eq!(
            engine.start(JobRequest::set_block(TARGET, "stone"), &mut host),
            Err(StartError::PlayerUnavailable)
        );
        assert!(!engine.is_active());
        assert!(host.messages.is_empty());
    }

    #[test]
    fn matching_confirmation_sets_ok() {
        let mut host = FakeHost::new(Reply::Silent);
        let mut engine = WorkflowEngine::new();
        engine.start(JobRequest::set_block(TARGET, "stone"), &mut host).unwrap();
        tick_until(&mut engine, &mut host, Step::Confirm(Corner::First));

        assert!(!engine.on_chat("Position 2 set to (10, 65, -3)"));
        assert!(engine.on_chat("Position 1 set to (10, 65, -3)"));
        let confirm = &engine.job().unwrap().confirm;
        assert!(confirm.ok);
        assert!(!confirm.bad);
    }

    #[test]
    fn mismatched_confirmation_sets_bad() {
        let mut host = FakeHost::new(Reply::Silent);
        let mut engine = WorkflowEngine::new();
        engine
            .start(JobRequest::set_block(BlockPos::new(10, 65, -4), "stone"), &mut host)
            .unwrap();
        tick_until(&mut engine, &mut host, Step::Confirm(Corner::First));

        assert!(engine.on_chat("Position 1 set to (10, 65, -3)"));
        let confirm = &engine.job().unwrap().confirm;
        assert!(confirm.bad);
        assert!(!confirm.ok);
    }

    #[test]
    fn chat_ignored_without_pending_confirm() {
        let mut host = FakeHost::new(Reply::Silent);
        let mut engine = WorkflowEngine::new();
        assert!(!engine.on_chat("Position 1 set to (10, 65, -3)"));
        engine.start(JobRequest::set_block(TARGET, "stone"), &mut host).unwrap();
        assert!(!engine.on_chat("Position 1 set to (10, 65, -3)"));
        assert!(engine.job().unwrap().confirm.pending.is_none());
    }

    #[test]
    fn retries_exhaust_then_abort() {
        let mut host = FakeHost::new(Reply::Fixed(BlockPos::new(10, 65, -4)));
        let mut engine = WorkflowEngine::new();
        engine.start(JobRequest::set_block(TARGET, "stone"), &mut host).unwrap();
        run(&mut engine, &mut host, 1000);

        assert_eq!(host.count_sent("//pos1"), 4);
        assert_eq!(host.count_sent("//pos2"), 0);
        assert!(host.has_message("Retrying pos1 (3 left)..."));
        assert!(host.has_message("Retrying pos1 (2 left)..."));
        assert!(host.has_message("Retrying pos1 (1 left)..."));
        let (level, last) = host.messages.last().unwrap();
        assert_eq!(*level, MessageLevel::Failure);
        assert_eq!(last, "//pos1 could not be set at the target block after retries.");
        assert!(!host.has_message("Done."));
    }

    #[test]
    fn silent_server_falls_back_to_standing_position() {
        let mut host = FakeHost::new(Reply::Silent);
        let mut engine = WorkflowEngine::new();
        engine.start(JobRequest::set_block(TARGET, "stone"), &mut host).unwrap();
        tick_until(&mut engine, &mut host, Step::Confirm(Corner::First));

        for _ in 0..POS_CONFIRM_TIMEOUT_TICKS - 1 {
            tick(&mut engine, &mut host);
            assert_eq!(engine.current_step(), Some(Step::Confirm(Corner::First)));
        }
        tick(&mut engine, &mut host);
        assert_eq!(engine.current_step(), Some(Step::Teleport(Corner::Second)));
        assert!(host.has_message("//pos1 confirmed at target"));

        run(&mut engine, &mut host, 1000);
        assert!(host.has_message("Done."));
        assert!(!host.messages.iter().any(|(_, m)| m.starts_with("Retrying")));
    }

    #[test]
    fn silent_server_off_target_retries() {
        let mut host = FakeHost::new(Reply::Silent);
        host.follow_tp = false;
        let mut engine = WorkflowEngine::new();
        engine.start(JobRequest::set_block(TARGET, "stone"), &mut host).unwrap();

        // Teleport, then the arrival timeout, then the select delay.
        for _ in 0..1 + TP_TIMEOUT_TICKS + TP_TO_POS_DELAY_TICKS {
            tick(&mut engine, &mut host);
        }
        assert_eq!(host.count_sent("//pos1"), 0);
        tick(&mut engine, &mut host);
        assert_eq!(host.count_sent("//pos1"), 1);

        run(&mut engine, &mut host, 5000);
        assert_eq!(host.count_sent("//pos1"), 4);
        assert!(host.has_message("//pos1 could not be set at the target block after retries."));
    }

    /// Teleport without following it, then place the player `dx`/`dy`/`dz`
    /// off the target's floor center.
    fn start_offset(dx: f64, dy: f64, dz: f64) -> (WorkflowEngine, FakeHost) {
        let mut host = FakeHost::new(Reply::AtPlayer);
        host.follow_tp = false;
        let mut engine = WorkflowEngine::new();
        engine.start(JobRequest::set_block(TARGET, "stone"), &mut host).unwrap();
        tick(&mut engine, &mut host);
        assert_eq!(engine.current_step(), Some(Step::AwaitArrival(Corner::First)));

        let c = TARGET.floor_center();
        if let Some(p) = host.player.as_mut() {
            p.position = Vec3::new(c.x + dx, c.y + dy, c.z + dz);
        }
        (engine, host)
    }

    #[test]
    fn arrival_within_tolerance_selects_next() {
        let (mut engine, mut host) = start_offset(0.64, 1.09, -0.64);
        tick(&mut engine, &mut host);
        assert_eq!(engine.current_step(), Some(Step::Select(Corner::First)));
        for _ in 0..=TP_TO_POS_DELAY_TICKS {
            tick(&mut engine, &mut host);
        }
        assert_eq!(host.count_sent("//pos1"), 1);
    }

    #[test]
    fn arrival_outside_tolerance_waits_for_timeout() {
        let (mut engine, mut host) = start_offset(0.66, 0.0, 0.66);
        for _ in 1..TP_TIMEOUT_TICKS {
            tick(&mut engine, &mut host);
        }
        assert_eq!(engine.current_step(), Some(Step::AwaitArrival(Corner::First)));
        tick(&mut engine, &mut host);
        assert_eq!(engine.current_step(), Some(Step::Select(Corner::First)));
    }

    #[test]
    fn arrival_tolerance_per_axis() {
        let t = TARGET;
        let c = t.floor_center();
        let at = |dx: f64, dy: f64, dz: f64| is_near_target(&Vec3::new(c.x + dx, c.y + dy, c.z + dz), t);

        assert!(at(0.0, 0.0, 0.0));
        assert!(at(-0.64, -1.09, 0.64));
        assert!(!at(0.66, 0.0, 0.0));
        assert!(!at(0.0, 0.0, -0.66));
        assert!(!at(0.0, 1.11, 0.0));
        // Horizontal and vertical limits differ.
        assert!(!at(0.9, 0.0, 0.0));
        assert!(at(0.0, 1.0, 0.0));
    }

    #[test]
    fn missing_player_discards_job_silently() {
        let mut host = FakeHost::new(Reply::Silent);
        let mut engine = WorkflowEngine::new();
        engine.start(JobRequest::set_block(TARGET, "stone"), &mut host).unwrap();
        let messages = host.messages.len();
        host.player = None;
        tick(&mut engine, &mut host);
        assert!(!engine.is_active());
        assert_eq!(host.messages.len(), messages);
        assert!(host.sent.is_empty());
    }

    #[test]
    fn start_phase_ticks_do_nothing() {
        let mut host = FakeHost::new(Reply::Silent);
        let mut engine = WorkflowEngine::new();
        engine.start(JobRequest::set_block(TARGET, "stone"), &mut host).unwrap();
        engine.on_tick(TickPhase::Start, &mut host);
        assert!(host.sent.is_empty());
        assert_eq!(host.freezes, 0);
    }

    #[test]
    fn step_fault_aborts_with_category() {
        let mut host = FakeHost::new(Reply::AtPlayer);
        host.player = Some(LocalPlayer {
            position: Vec3::new(f64::NAN, 64.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
        });
        let mut engine = WorkflowEngine::new();
        engine.start(JobRequest::set_block(TARGET, "stone"), &mut host).unwrap();
        run(&mut engine, &mut host, 1000);

        assert!(host.count_sent("//set stone") == 1);
        assert_eq!(host.count_sent("//desel"), 0);
        let (level, last) = host.messages.last().unwrap();
        assert_eq!(*level, MessageLevel::Failure);
        assert_eq!(last, "Automation failed: non-finite teleport coordinate NaN");
    }

    #[test]
    fn cancel_clears_job() {
        let mut host = FakeHost::new(Reply::Silent);
        let mut engine = WorkflowEngine::new();
        assert!(!engine.cancel());
        engine.start(JobRequest::set_block(TARGET, "stone"), &mut host).unwrap();
        assert!(engine.cancel());
        tick(&mut engine, &mut host);
        assert!(host.sent.is_empty());
    }

    #[test]
    fn tp_command_format() {
        assert_eq!(
            tp_command(Vec3::new(1.0, -2.25, 3.12345)).unwrap(),
            "/tp 1.000 -2.250 3.123"
        );
        assert_eq!(
            tp_command(Vec3::new(0.0, f64::INFINITY, 0.0)),
            Err(WorkflowError::NonFiniteCoordinate(f64::INFINITY))
        );
    }
}
