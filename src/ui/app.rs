// 🖥️ Terminal UI state
// Everything the screens show and every key they react to, without a terminal.

use bakery_pricing::{
    compute_price, parse_amount, Catalog, CatalogEntry, CatalogStore, PriceBreakdown,
    PricingConfig, PricingError, RecipeSelection,
};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;

// ============================================================================
// PAGES & FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Calculator,
    Pantry,
    Settings,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Calculator, Page::Pantry, Page::Settings];

    pub fn next(&self) -> Self {
        match self {
            Page::Calculator => Page::Pantry,
            Page::Pantry => Page::Settings,
            Page::Settings => Page::Calculator,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Calculator => Page::Settings,
            Page::Pantry => Page::Calculator,
            Page::Settings => Page::Pantry,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Calculator => "Calculate Recipe",
            Page::Pantry => "My Pantry",
            Page::Settings => "Settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PantryColumn {
    Item,
    Price,
    Quantity,
    Unit,
}

impl PantryColumn {
    pub const ALL: [PantryColumn; 4] = [
        PantryColumn::Item,
        PantryColumn::Price,
        PantryColumn::Quantity,
        PantryColumn::Unit,
    ];

    pub fn next(&self) -> Self {
        match self {
            PantryColumn::Item => PantryColumn::Price,
            PantryColumn::Price => PantryColumn::Quantity,
            PantryColumn::Quantity => PantryColumn::Unit,
            PantryColumn::Unit => PantryColumn::Item,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            PantryColumn::Item => PantryColumn::Unit,
            PantryColumn::Price => PantryColumn::Item,
            PantryColumn::Quantity => PantryColumn::Price,
            PantryColumn::Unit => PantryColumn::Quantity,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PantryColumn::Item => "Item",
            PantryColumn::Price => "Price (R$)",
            PantryColumn::Quantity => "Pkg qty",
            PantryColumn::Unit => "Unit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    LaborRate,
    OvenRate,
    Margin,
}

impl SettingField {
    pub const ALL: [SettingField; 3] = [
        SettingField::LaborRate,
        SettingField::OvenRate,
        SettingField::Margin,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SettingField::LaborRate => "Hourly rate (R$)",
            SettingField::OvenRate => "Oven/gas per hour (R$)",
            SettingField::Margin => "Profit (%)",
        }
    }

    /// Step used by +/-
    fn step(&self) -> f64 {
        match self {
            SettingField::LaborRate => 1.0,
            SettingField::OvenRate => 0.25,
            SettingField::Margin => 1.0,
        }
    }
}

/// What the input line is currently editing
#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    Quantity(String),
    PrepMinutes,
    OvenMinutes,
    Cell { row: usize, column: PantryColumn },
    Setting(SettingField),
}

impl EditTarget {
    pub fn label(&self) -> String {
        match self {
            EditTarget::Quantity(name) => format!("Quantity of {}", name),
            EditTarget::PrepMinutes => "Hands-on time (minutes)".to_string(),
            EditTarget::OvenMinutes => "Oven time (minutes)".to_string(),
            EditTarget::Cell { row, column } => format!("{} (row {})", column.title(), row + 1),
            EditTarget::Setting(field) => field.title().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    pub target: EditTarget,
    pub buffer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

fn format_number(value: f64) -> String {
    bakery_pricing::report::format_quantity(value)
}

/// Move a table cursor one row with wrap-around.
fn step(state: &mut TableState, len: usize, forward: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => {
            if i >= len - 1 {
                0
            } else {
                i + 1
            }
        }
        Some(i) => {
            if i == 0 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    };
    state.select(Some(i));
}

fn clamp_selection(state: &mut TableState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        _ => {}
    }
}

// ============================================================================
// APP
// ============================================================================

pub struct App {
    store: Box<dyn CatalogStore>,
    /// Last successfully loaded pantry; what the calculator prices against
    pub catalog: Catalog,
    /// Pantry editor copy, written back on save
    pub draft: Catalog,
    pub load_error: Option<PricingError>,
    pub selection: RecipeSelection,
    pub config: PricingConfig,
    defaults: PricingConfig,
    pub current_page: Page,
    pub calculator_state: TableState,
    pub pantry_state: TableState,
    pub pantry_column: PantryColumn,
    pub settings_state: TableState,
    pub input: Option<InputState>,
    pub status: Option<StatusMessage>,
    pub dirty: bool,
    quit_armed: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: Box<dyn CatalogStore>, defaults: PricingConfig) -> Self {
        let mut settings_state = TableState::default();
        settings_state.select(Some(0));

        let mut app = Self {
            store,
            catalog: Catalog::default(),
            draft: Catalog::default(),
            load_error: None,
            selection: RecipeSelection::new(),
            config: defaults,
            defaults,
            current_page: Page::Calculator,
            calculator_state: TableState::default(),
            pantry_state: TableState::default(),
            pantry_column: PantryColumn::Item,
            settings_state,
            input: None,
            status: None,
            dirty: false,
            quit_armed: false,
            should_quit: false,
        };
        app.reload();
        app
    }

    pub fn store_label(&self) -> String {
        self.store.describe()
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Info,
            text: text.into(),
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Error,
            text: text.into(),
        });
    }

    // ------------------------------------------------------------------------
    // Store
    // ------------------------------------------------------------------------

    /// Fresh load from the store; discards unsaved pantry edits.
    pub fn reload(&mut self) {
        match self.store.load() {
            Ok(catalog) => {
                self.draft = catalog.clone();
                self.catalog = catalog;
                self.load_error = None;
                self.dirty = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "pantry load failed");
                self.error(err.to_string());
                self.load_error = Some(err);
            }
        }
        clamp_selection(&mut self.calculator_state, self.catalog.names().len());
        clamp_selection(&mut self.pantry_state, self.draft.len());
    }

    /// Write the editor copy back (blank rows dropped), then reload.
    pub fn save(&mut self) {
        match self.store.save(&self.draft) {
            Ok(saved) => {
                self.reload();
                if self.load_error.is_none() {
                    self.info(format!(
                        "✅ Saved {} rows at {}. The list was updated.",
                        saved,
                        Local::now().format("%H:%M:%S")
                    ));
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "pantry save failed");
                self.error(err.to_string());
            }
        }
    }

    // ------------------------------------------------------------------------
    // Calculator
    // ------------------------------------------------------------------------

    pub fn calculator_names(&self) -> Vec<String> {
        self.catalog.names().into_iter().map(str::to_string).collect()
    }

    fn selected_ingredient(&self) -> Option<String> {
        let names = self.catalog.names();
        self.calculator_state
            .selected()
            .and_then(|i| names.get(i).map(|name| name.to_string()))
    }

    /// Current breakdown, or why there isn't one.
    pub fn breakdown(&self) -> Result<PriceBreakdown, PricingError> {
        if let Some(err) = &self.load_error {
            return Err(err.clone());
        }
        compute_price(&self.selection, &self.catalog, &self.config)
    }

    pub fn toggle_current(&mut self) {
        if let Some(name) = self.selected_ingredient() {
            self.selection.toggle(&name);
        }
    }

    // ------------------------------------------------------------------------
    // Pantry editor
    // ------------------------------------------------------------------------

    pub fn add_row(&mut self) {
        self.draft.push(CatalogEntry::blank());
        let row = self.draft.len() - 1;
        self.pantry_state.select(Some(row));
        self.pantry_column = PantryColumn::Item;
        self.dirty = true;
        self.begin_edit(EditTarget::Cell {
            row,
            column: PantryColumn::Item,
        });
    }

    pub fn delete_row(&mut self) {
        if let Some(row) = self.pantry_state.selected() {
            if let Some(removed) = self.draft.remove(row) {
                self.dirty = true;
                self.info(format!("Removed '{}' (press s to save)", removed.name));
            }
        }
        clamp_selection(&mut self.pantry_state, self.draft.len());
    }

    fn cell_text(&self, row: usize, column: PantryColumn) -> String {
        let Some(entry) = self.draft.entries().get(row) else {
            return String::new();
        };
        match column {
            PantryColumn::Item => entry.name.clone(),
            PantryColumn::Price => entry.package_price.map(format_number).unwrap_or_default(),
            PantryColumn::Quantity => entry.package_quantity.map(format_number).unwrap_or_default(),
            PantryColumn::Unit => entry.unit.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    pub fn selected_setting(&self) -> SettingField {
        let index = self.settings_state.selected().unwrap_or(0);
        SettingField::ALL[index.min(SettingField::ALL.len() - 1)]
    }

    pub fn setting_value(&self, field: SettingField) -> f64 {
        match field {
            SettingField::LaborRate => self.config.hourly_labor_rate,
            SettingField::OvenRate => self.config.hourly_oven_rate,
            SettingField::Margin => self.config.profit_margin_percent,
        }
    }

    fn set_setting(&mut self, field: SettingField, value: f64) {
        match field {
            SettingField::LaborRate => self.config.hourly_labor_rate = value,
            SettingField::OvenRate => self.config.hourly_oven_rate = value,
            SettingField::Margin => self.config.profit_margin_percent = value,
        }
        self.config = self.config.sanitized();
    }

    pub fn nudge_setting(&mut self, up: bool) {
        let field = self.selected_setting();
        let delta = if up { field.step() } else { -field.step() };
        self.set_setting(field, self.setting_value(field) + delta);
    }

    pub fn reset_settings(&mut self) {
        self.config = self.defaults;
        self.info("Settings back to defaults");
    }

    // ------------------------------------------------------------------------
    // Input line
    // ------------------------------------------------------------------------

    pub fn begin_edit(&mut self, target: EditTarget) {
        let buffer = match &target {
            EditTarget::Quantity(name) => self
                .selection
                .quantity(name)
                .map(format_number)
                .unwrap_or_default(),
            EditTarget::PrepMinutes => self.selection.prep_minutes.to_string(),
            EditTarget::OvenMinutes => self.selection.oven_minutes.to_string(),
            EditTarget::Cell { row, column } => self.cell_text(*row, *column),
            EditTarget::Setting(field) => format_number(self.setting_value(*field)),
        };
        self.input = Some(InputState { target, buffer });
    }

    pub fn cancel_edit(&mut self) {
        self.input = None;
    }

    pub fn commit_edit(&mut self) {
        let Some(InputState { target, buffer }) = self.input.take() else {
            return;
        };

        match target {
            EditTarget::Quantity(name) => match parse_amount(&buffer) {
                Some(quantity) => {
                    self.selection.select(&name);
                    self.selection.set_quantity(&name, quantity);
                }
                None => self.error(format!("'{}' is not a quantity", buffer.trim())),
            },
            EditTarget::PrepMinutes | EditTarget::OvenMinutes => {
                match buffer.trim().parse::<u32>() {
                    Ok(minutes) if target == EditTarget::PrepMinutes => {
                        self.selection.prep_minutes = minutes
                    }
                    Ok(minutes) => self.selection.oven_minutes = minutes,
                    Err(_) => self.error(format!("'{}' is not a whole number of minutes", buffer.trim())),
                }
            }
            EditTarget::Cell { row, column } => {
                if let Some(entry) = self.draft.entries_mut().get_mut(row) {
                    match column {
                        PantryColumn::Item => entry.name = buffer.trim().to_string(),
                        // Same coercion as a load: garbage becomes an empty cell
                        PantryColumn::Price => entry.package_price = parse_amount(&buffer),
                        PantryColumn::Quantity => entry.package_quantity = parse_amount(&buffer),
                        PantryColumn::Unit => entry.unit = buffer.trim().to_string(),
                    }
                    self.dirty = true;
                }
            }
            EditTarget::Setting(field) => match parse_amount(&buffer) {
                Some(value) => self.set_setting(field, value),
                None => self.error(format!("'{}' is not a number", buffer.trim())),
            },
        }
    }

    // ------------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.input.is_some() {
            self.handle_input_key(key);
            return;
        }

        let quitting = matches!(key.code, KeyCode::Char('q') | KeyCode::Esc);
        if !quitting {
            self.quit_armed = false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.dirty && !self.quit_armed {
                    self.quit_armed = true;
                    self.error("Unsaved pantry edits: press q again to discard them, or s to save");
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.current_page = self.current_page.previous();
                } else {
                    self.current_page = self.current_page.next();
                }
            }
            KeyCode::BackTab => self.current_page = self.current_page.previous(),
            _ => match self.current_page {
                Page::Calculator => self.handle_calculator_key(key),
                Page::Pantry => self.handle_pantry_key(key),
                Page::Settings => self.handle_settings_key(key),
            },
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Enter => self.commit_edit(),
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Backspace => {
                input.buffer.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                input.buffer.push(c);
            }
            _ => {}
        }
    }

    fn handle_calculator_key(&mut self, key: KeyEvent) {
        let len = self.catalog.names().len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => step(&mut self.calculator_state, len, true),
            KeyCode::Up | KeyCode::Char('k') => step(&mut self.calculator_state, len, false),
            KeyCode::Char(' ') => self.toggle_current(),
            KeyCode::Enter => {
                if let Some(name) = self.selected_ingredient() {
                    self.begin_edit(EditTarget::Quantity(name));
                }
            }
            KeyCode::Char('p') => self.begin_edit(EditTarget::PrepMinutes),
            KeyCode::Char('o') => self.begin_edit(EditTarget::OvenMinutes),
            KeyCode::Char('c') => {
                self.selection.clear();
                self.info("Selection cleared");
            }
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
    }

    fn handle_pantry_key(&mut self, key: KeyEvent) {
        let len = self.draft.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => step(&mut self.pantry_state, len, true),
            KeyCode::Up | KeyCode::Char('k') => step(&mut self.pantry_state, len, false),
            KeyCode::Right | KeyCode::Char('l') => self.pantry_column = self.pantry_column.next(),
            KeyCode::Left | KeyCode::Char('h') => {
                self.pantry_column = self.pantry_column.previous()
            }
            KeyCode::Enter => {
                if let Some(row) = self.pantry_state.selected() {
                    self.begin_edit(EditTarget::Cell {
                        row,
                        column: self.pantry_column,
                    });
                }
            }
            KeyCode::Char('a') => self.add_row(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_row(),
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('r') => {
                self.reload();
                if self.load_error.is_none() {
                    self.info("Pantry reloaded");
                }
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        let len = SettingField::ALL.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => step(&mut self.settings_state, len, true),
            KeyCode::Up | KeyCode::Char('k') => step(&mut self.settings_state, len, false),
            KeyCode::Enter => self.begin_edit(EditTarget::Setting(self.selected_setting())),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => self.nudge_setting(true),
            KeyCode::Char('-') | KeyCode::Left => self.nudge_setting(false),
            KeyCode::Char('x') => self.reset_settings(),
            _ => {}
        }
    }
}
