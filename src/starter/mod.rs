mod config;
mod steps;
pub mod ui;
mod widgets;
mod wizard;

pub use config::{AutostartConfig, GeneralConfig, ProbeConfig, StarterConfig, StorageConfig};
pub use steps::StepId;
pub use widgets::StatusBarState;
pub use wizard::{Wizard, STEP_COUNT};

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{Result, StarterError};
use crate::packages::{
    Catalog, CommandProbe, DryrunProbe, InstallStatus, Package, PackageProbe, StatusResolver,
    StatusUpdate,
};
use crate::system::{self, AutostartService, Preferences};
use crate::ui::Theme;
use crate::vim::{parse_command, Command, InputBuffer, ModeAction, VimMode};

/// Work the event loop performs on behalf of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarterAction {
    /// Persist launch-at-startup and update the autostart entry
    SetLaunchAtStartup(bool),
}

/// Modal box drawn over the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Help,
    About,
}

/// Message displayed to the user
pub struct Message {
    pub text: String,
    pub is_error: bool,
}

/// Main wizard application state
pub struct StarterApp {
    pub config: StarterConfig,
    pub theme: Theme,

    // Vim mode state
    pub vim_mode: VimMode,
    pub command_buffer: InputBuffer,

    pub wizard: Wizard,
    pub catalog: Catalog,
    pub resolver: StatusResolver,
    pub preferences: Preferences,
    autostart: Arc<dyn AutostartService>,

    // Explorer: cursor over all packages in catalog order
    pub package_cursor: usize,
    pub package_scroll: usize,

    // UI state
    pub message: Option<Message>,
    pub overlay: Option<Overlay>,
    pub should_exit: bool,
    pub status_bar: StatusBarState,

    spinner_frame: usize,
}

impl StarterApp {
    pub fn new(
        config: StarterConfig,
        catalog: Catalog,
        resolver: StatusResolver,
        preferences: Preferences,
        autostart: Arc<dyn AutostartService>,
    ) -> Self {
        let mut app = Self {
            config,
            theme: Theme::default(),
            vim_mode: VimMode::Normal,
            command_buffer: InputBuffer::new(),
            wizard: Wizard::default(),
            catalog,
            resolver,
            preferences,
            autostart,
            package_cursor: 0,
            package_scroll: 0,
            message: None,
            overlay: None,
            should_exit: false,
            status_bar: StatusBarState::default(),
            spinner_frame: 0,
        };
        app.update_status_bar();
        app
    }

    /// Wire up probe, resolver, preference store and autostart from config.
    /// Dry runs swap in simulated versions of all three collaborators.
    pub async fn from_config(
        config: StarterConfig,
        notifier: Option<mpsc::UnboundedSender<StatusUpdate>>,
    ) -> Result<Self> {
        let dryrun = config.general.dryrun;

        let catalog = config.catalog()?;
        let probe = create_probe(&config.probe, dryrun)?;
        let timeout = Duration::from_secs(config.probe.timeout_secs.max(1));
        let resolver = match notifier {
            Some(tx) => StatusResolver::with_notifier(probe, timeout, tx),
            None => StatusResolver::with_timeout(probe, timeout),
        };

        let store = system::create_store(config.storage.path.as_deref(), dryrun)?;
        let autostart = system::create_autostart(
            &config.autostart.resource,
            config.autostart.directory.as_deref(),
            &config.autostart.file_name,
            dryrun,
        )?;

        let preferences = Preferences::load(store).await;
        preferences.check_divergence(autostart.as_ref());

        info!(
            "Initialized wizard with {} packages (dryrun={})",
            catalog.package_count(),
            dryrun
        );

        Ok(Self::new(config, catalog, resolver, preferences, autostart))
    }

    pub fn is_dryrun(&self) -> bool {
        self.config.general.dryrun
    }

    pub fn current_step(&self) -> Option<StepId> {
        StepId::from_index(self.wizard.active_step())
    }

    pub fn launch_at_startup(&self) -> bool {
        self.preferences.launch_at_startup()
    }

    pub fn selected_package(&self) -> Option<&Package> {
        self.catalog.packages().nth(self.package_cursor)
    }

    /// Status of a package as the view should show it
    pub fn status_of(&self, package: &Package) -> InstallStatus {
        self.catalog.status_of(&self.resolver, &package.identifier)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<StarterAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_exit = true;
            return None;
        }

        if self.overlay.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
                self.overlay = None;
            }
            return None;
        }

        let action = match self.vim_mode {
            VimMode::Normal => self.handle_normal_mode(key),
            VimMode::Command => self.handle_command_mode(key),
        };
        self.update_status_bar();
        action
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Option<StarterAction> {
        // Any key dismisses the current message
        self.message = None;

        match key.code {
            KeyCode::Char(':') => {
                self.vim_mode = self.vim_mode.transition(ModeAction::EnterCommand);
                self.command_buffer.clear();
                return None;
            }
            KeyCode::Char('?') => {
                self.overlay = Some(Overlay::Help);
                return None;
            }
            KeyCode::Char('q') => {
                self.should_exit = true;
                return None;
            }
            _ => {}
        }

        if self.wizard.is_finished() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char('r')) {
                self.reset();
            }
            return None;
        }

        match key.code {
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => {
                self.next_step();
            }
            KeyCode::Left | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Char('p') => {
                self.prev_step();
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_package_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_package_cursor(-1),
            KeyCode::Char('g') | KeyCode::Home => self.package_cursor = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.package_cursor = self.catalog.package_count().saturating_sub(1);
            }
            KeyCode::Char('t') | KeyCode::Char(' ') => {
                return Some(StarterAction::SetLaunchAtStartup(!self.launch_at_startup()));
            }
            _ => {}
        }

        None
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<StarterAction> {
        match key.code {
            KeyCode::Esc => {
                self.vim_mode = self.vim_mode.transition(ModeAction::Escape);
                self.command_buffer.clear();
            }
            KeyCode::Enter => {
                let input = self.command_buffer.content().to_string();
                self.command_buffer.clear();
                self.vim_mode = self.vim_mode.transition(ModeAction::Execute);
                return self.execute_command(&input);
            }
            KeyCode::Backspace => {
                if !self.command_buffer.delete_back() && self.command_buffer.is_empty() {
                    self.vim_mode = self.vim_mode.transition(ModeAction::Escape);
                }
            }
            KeyCode::Left => self.command_buffer.move_left(),
            KeyCode::Right => self.command_buffer.move_right(),
            KeyCode::Char(c) => self.command_buffer.insert(c),
            _ => {}
        }
        None
    }

    fn execute_command(&mut self, input: &str) -> Option<StarterAction> {
        let command = match parse_command(input) {
            Ok(cmd) => cmd,
            Err(e) => {
                self.set_error(e.to_string());
                return None;
            }
        };

        debug!("Executing command: {:?}", command);

        // The result view is left only through reset
        if self.wizard.is_finished()
            && !matches!(
                command,
                Command::Reset | Command::Help | Command::About | Command::Quit
            )
        {
            self.set_error("Setup is complete; use :reset to start over".to_string());
            return None;
        }

        match command {
            Command::Next => self.next_step(),
            Command::Prev => self.prev_step(),
            Command::Reset => self.reset(),
            Command::Launch(state) => {
                let enabled = state.unwrap_or(!self.launch_at_startup());
                return Some(StarterAction::SetLaunchAtStartup(enabled));
            }
            Command::Help => self.overlay = Some(Overlay::Help),
            Command::About => self.overlay = Some(Overlay::About),
            Command::Quit => self.should_exit = true,
        }
        None
    }

    fn next_step(&mut self) {
        let finishing = self.wizard.is_last_step();
        if self.wizard.next() {
            if finishing {
                info!("Setup finished");
            }
            self.on_step_changed();
        }
    }

    fn prev_step(&mut self) {
        if self.wizard.prev() {
            self.on_step_changed();
        }
    }

    fn reset(&mut self) {
        self.wizard.reset();
        self.package_cursor = 0;
        self.package_scroll = 0;
        self.on_step_changed();
    }

    fn on_step_changed(&mut self) {
        match self.current_step() {
            Some(step) => debug!("Entered step {} ({})", self.wizard.active_step(), step.label()),
            None => debug!("Entered result view"),
        }

        if self.current_step() == Some(StepId::Explorer) {
            self.catalog.prefetch(&self.resolver);
        }
    }

    fn move_package_cursor(&mut self, delta: isize) {
        if self.current_step() != Some(StepId::Explorer) {
            return;
        }
        let count = self.catalog.package_count();
        if count == 0 {
            return;
        }
        self.package_cursor = self
            .package_cursor
            .saturating_add_signed(delta)
            .min(count - 1);
    }

    /// Carry out [`StarterAction::SetLaunchAtStartup`]. Failures become a
    /// message; the toggle keeps the user's choice either way.
    pub async fn set_launch_at_startup(&mut self, enabled: bool) {
        let outcome = self
            .preferences
            .set_launch_at_startup(enabled, self.autostart.as_ref())
            .await;

        match outcome.error_message() {
            Some(text) => self.set_error(text),
            None if enabled => self.set_info("Will launch at startup".to_string()),
            None => self.set_info("Will not launch at startup".to_string()),
        }
        self.update_status_bar();
    }

    pub fn handle_status_update(&mut self, update: StatusUpdate) {
        debug!("{} settled: {}", update.identifier, update.status.label());
        if self.catalog.find(&update.identifier).is_none() {
            warn!("Status update for unknown package {}", update.identifier);
        }
        self.update_status_bar();
    }

    pub fn set_error(&mut self, text: String) {
        self.message = Some(Message {
            text,
            is_error: true,
        });
    }

    pub fn set_info(&mut self, text: String) {
        self.message = Some(Message {
            text,
            is_error: false,
        });
    }

    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
    }

    pub fn spinner_char(&self) -> char {
        SPINNER[self.spinner_frame]
    }

    pub fn update_status_bar(&mut self) {
        self.status_bar = if self.vim_mode == VimMode::Command {
            StatusBarState::command_mode()
        } else {
            match self.current_step() {
                Some(StepId::Welcome) => StatusBarState::welcome(),
                Some(StepId::Explorer) => {
                    let (_, _, pending) = self.catalog.status_summary(&self.resolver);
                    StatusBarState::explorer(pending)
                }
                Some(StepId::Configurations) => StatusBarState::configurations(),
                None => StatusBarState::result(),
            }
        };
    }
}

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

fn create_probe(config: &ProbeConfig, dryrun: bool) -> Result<Arc<dyn PackageProbe>> {
    if dryrun {
        return Ok(Arc::new(DryrunProbe::new(config.dryrun_installed.iter().cloned())));
    }

    let probe = CommandProbe::new(&config.command)
        .map_err(|e| StarterError::Config(format!("[probe] command {:?}: {}", config.command, e)))?;
    Ok(Arc::new(probe))
}
