use crate::config::DashboardConfig;
use crate::data::dates::DateRange;
use crate::data::filter::{FilterColumn, FilterStage};
use crate::data::loader::{self, DataSource, LoadedData};
use crate::data::model::Table;
use crate::pipeline::{self, DashboardView, UiSelections};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything that survives between frames: the loaded rows and the widget
/// selections. Derived tables are recomputed every frame.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a source resolves).
    pub dataset: Option<Table>,

    /// Where `dataset` came from.
    pub source_label: Option<String>,

    pub selections: UiSelections,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            source_label: None,
            selections: UiSelections::default(),
            status_message: None,
        }
    }

    /// Resolve `source` and replace the dataset on success. On failure the
    /// previous dataset stays and the error is shown.
    pub fn load(&mut self, source: DataSource) {
        match loader::resolve(&source, &self.config) {
            Ok(loaded) => {
                log::info!(
                    "Loaded {} rows with columns {:?} from {}",
                    loaded.table.len(),
                    loaded.table.column_names(),
                    loaded.source_label
                );
                self.set_dataset(loaded);
            }
            Err(e) => {
                log::error!("Failed to load {source:?}: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset every selection.
    pub fn set_dataset(&mut self, loaded: LoadedData) {
        self.dataset = Some(loaded.table);
        self.source_label = Some(loaded.source_label);
        self.selections = UiSelections::default();
        self.status_message = None;
    }

    /// Run the pipeline over the current dataset.
    pub fn view(&self) -> Option<DashboardView> {
        self.dataset
            .as_ref()
            .map(|raw| pipeline::render(raw, &self.selections))
    }

    /// Run the pipeline, pruning stale selections until the cascade settles.
    /// Each prune only shrinks the selections, so this terminates.
    pub fn current_view(&mut self) -> Option<DashboardView> {
        loop {
            let view = self.view()?;
            let before = self.selections.categorical.clone();
            self.prune_selections(&view.stages);
            if self.selections.categorical == before {
                return Some(view);
            }
        }
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.selections.date_range = Some(range);
    }

    /// Toggle a single value in a column's multiselect.
    pub fn toggle_filter_value(&mut self, column: FilterColumn, value: &str) {
        let selected = self.selections.categorical.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Select every offered value.
    pub fn select_all(&mut self, column: FilterColumn, options: &[String]) {
        self.selections
            .categorical
            .insert(column, options.iter().cloned().collect());
    }

    /// Clear a column's selection, i.e. stop filtering on it.
    pub fn select_none(&mut self, column: FilterColumn) {
        self.selections.categorical.remove(&column);
    }

    /// Forget selected values that are no longer offered because an earlier
    /// filter removed them.
    pub fn prune_selections(&mut self, stages: &[FilterStage]) {
        for stage in stages {
            let Ok(options) = &stage.options else {
                continue;
            };
            if let Some(selected) = self.selections.categorical.get_mut(&stage.column) {
                selected.retain(|v| options.contains(v));
                if selected.is_empty() {
                    self.selections.categorical.remove(&stage.column);
                }
            }
        }
    }
}
