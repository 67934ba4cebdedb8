//! The client-side mod context: one registry, one auditor, one log worker and
//! one automation engine, driven by host events and chat commands.

use std::path::Path;
use std::sync::Arc;

use hlog_audit::{area_file, now_ms, AreaRegistry, AuditLogger, BlockAuditor, LoadedAreas, LogHandle, LogPaths};
use hlog_automation::{JobRequest, WorkflowEngine};
use hlog_command::{parse_line, AuditCommand, AutomationCommand, CommandResult, ParsedCommand};
use hlog_host_api::{ClientApi, ClientEvent, HighlightBox, MessageLevel};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;

pub struct HousingLogs {
    registry: Arc<AreaRegistry>,
    auditor: BlockAuditor,
    logger: AuditLogger,
    workflow: WorkflowEngine,
}

impl HousingLogs {
    /// Load the persisted areas and start the log worker.
    ///
    /// An unreadable area file is logged and replaced by an empty registry.
    pub fn init(config: &ClientConfig) -> Result<Self, ClientError> {
        let paths = config.log_paths();
        let logger = AuditLogger::spawn(paths.clone(), config.audit.queue_capacity)?;

        let loaded = match area_file::load(&paths.area_file) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(path = %paths.area_file.display(), "Failed to load areas: {e}");
                LoadedAreas::default()
            }
        };
        info!(
            "Loaded {} area(s), logging {}",
            loaded.areas.len(),
            if loaded.enabled { "enabled" } else { "disabled" }
        );

        let registry = Arc::new(AreaRegistry::from_loaded(loaded, logger.handle()));
        let auditor = BlockAuditor::new(Arc::clone(&registry), logger.handle());

        Ok(Self {
            registry,
            auditor,
            logger,
            workflow: WorkflowEngine::new(),
        })
    }

    pub fn registry(&self) -> &AreaRegistry {
        &self.registry
    }

    pub fn workflow(&self) -> &WorkflowEngine {
        &self.workflow
    }

    pub fn log_paths(&self) -> &LogPaths {
        self.logger.paths()
    }

    pub fn log_handle(&self) -> LogHandle {
        self.logger.handle()
    }

    /// Block until every queued disk task has been written.
    pub fn flush(&self) -> bool {
        self.logger.handle().flush()
    }

    pub fn highlight_boxes(&self) -> Vec<HighlightBox> {
        self.registry.highlight_boxes()
    }

    pub fn handle_event(&mut self, event: &ClientEvent, api: &mut dyn ClientApi) {
        self.handle_event_at(event, api, now_ms());
    }

    /// Dispatch a host event with an explicit clock reading.
    pub fn handle_event_at(&mut self, event: &ClientEvent, api: &mut dyn ClientApi, now_ms: u64) {
        match event {
            ClientEvent::BlockChange {
                pos,
                old,
                new,
                allow_heuristic,
            } => {
                self.auditor
                    .note_block_change(&*api, *pos, old, new, *allow_heuristic, now_ms);
            }
            ClientEvent::BreakAnimation {
                pos,
                breaker_entity_id,
                progress,
            } => {
                self.auditor
                    .note_break_animation(&*api, *pos, *breaker_entity_id, *progress, now_ms);
            }
            ClientEvent::ChatReceived { text } => {
                if self.workflow.on_chat(text) {
                    debug!("Selection confirmation: {text}");
                }
            }
            ClientEvent::Tick { phase } => self.workflow.on_tick(*phase, api),
        }
    }

    /// Run one command line and return what the user should see.
    pub fn execute_command(&mut self, line: &str, api: &mut dyn ClientApi) -> CommandResult {
        match parse_line(line) {
            Ok(ParsedCommand::Audit(cmd)) => self.execute_audit(cmd),
            Ok(ParsedCommand::Automation(cmd)) => self.start_automation(cmd, api),
            Err(e) => e.into(),
        }
    }

    /// Run a command line and show its messages through the host.
    pub fn run_command(&mut self, line: &str, api: &mut dyn ClientApi) -> bool {
        let result = self.execute_command(line, api);
        let level = if result.success {
            MessageLevel::Success
        } else {
            MessageLevel::Failure
        };
        for message in &result.messages {
            api.show_message(level, message);
        }
        result.success
    }

    fn execute_audit(&mut self, cmd: AuditCommand) -> CommandResult {
        match cmd {
            AuditCommand::Add { name, a, b, color } => {
                if self.registry.upsert(&name, a, b, color) {
                    CommandResult::ok(format!("Area '{name}' added/updated."))
                } else {
                    CommandResult::err("Invalid area name.")
                }
            }
            AuditCommand::Remove { name } => {
                if self.registry.remove(&name) {
                    CommandResult::ok(format!("Removed: {name}"))
                } else {
                    CommandResult::err(format!("No such area: {name}"))
                }
            }
            AuditCommand::List => {
                let areas = self.registry.list_snapshot();
                let mut lines = Vec::with_capacity(areas.len() + 1);
                lines.push(format!(
                    "Logging {}. Areas: {}",
                    if self.registry.is_enabled() { "enabled" } else { "disabled" },
                    areas.len()
                ));
                for a in &areas {
                    lines.push(format!(
                        "- {} highlight={} color={} ({},{},{}) -> ({},{},{})",
                        a.name,
                        if a.highlight { "on" } else { "off" },
                        a.color,
                        a.min.x,
                        a.min.y,
                        a.min.z,
                        a.max.x,
                        a.max.y,
                        a.max.z
                    ));
                }
                CommandResult::lines(true, lines)
            }
            AuditCommand::Clear => {
                self.auditor.clear_areas();
                CommandResult::ok("All areas cleared.")
            }
            AuditCommand::SetEnabled(enabled) => {
                self.registry.set_global_enabled(enabled);
                CommandResult::ok(if enabled {
                    "Logging enabled."
                } else {
                    "Logging disabled."
                })
            }
            AuditCommand::Highlight { name, state } => {
                let found = match state {
                    Some(on) => self.registry.set_highlight(&name, on),
                    None => self.registry.toggle_highlight(&name).is_some(),
                };
                if found {
                    CommandResult::ok(format!("Updated highlight for: {name}"))
                } else {
                    CommandResult::err(format!("No such area: {name}"))
                }
            }
            AuditCommand::Path => {
                let paths = self.logger.paths();
                CommandResult::lines(
                    true,
                    vec![
                        "Files:".to_string(),
                        format!("Areas: {}", absolute(&paths.area_file)),
                        format!("JSONL: {}", absolute(&paths.jsonl_log)),
                        format!("LOG: {}", absolute(&paths.text_log)),
                    ],
                )
            }
        }
    }

    fn start_automation(&mut self, cmd: AutomationCommand, api: &mut dyn ClientApi) -> CommandResult {
        let request = match cmd {
            AutomationCommand::SetBlock { target, block_id } => JobRequest::set_block(target, block_id),
            AutomationCommand::FillBlocks {
                pos1,
                pos2,
                block_id,
            } => JobRequest::fill(pos1, pos2, block_id),
        };
        match self.workflow.start(request, api) {
            // The engine reports the start itself.
            Ok(()) => CommandResult::lines(true, Vec::new()),
            Err(e) => CommandResult::err(e.to_string()),
        }
    }

    /// Cancel automation and drain the log worker.
    pub fn shutdown(mut self) {
        if self.workflow.cancel() {
            info!("Cancelled running automation job");
        }
        self.logger.shutdown();
    }
}

fn absolute(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
