//! Dashboard shell
//!
//! [`Dashboard`] is the composition root. It owns the backend handle, the
//! content cache and the credentials, and wires the page tree, the editors
//! and the edit wizard together. Every failing operation leaves an error
//! [`Notice`] behind as well as returning the error.

mod layout;
mod plan;

pub use layout::{LayoutMode, Notice, NoticeLevel};
pub use plan::{ComponentPlan, DetailsEdit, DraftEdit, EditPlan, PlanError};

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::backend::{require_token, AuthToken, ClientError, ContentBackend, HttpBackend, ImageUpload};
use crate::cache::ContentCache;
use crate::config::Config;
use crate::editors::{ContentEditor, EditableContent, EditorError, SaveOutcome};
use crate::models::{
    AboutUsItem, Card, CarouselItem, ComponentKind, Page, PageDraft, PageRef, ResourceKind,
};
use crate::tree::{self, NavState, Selection, TreeError, TreeRow};
use crate::wizard::{EditWizard, WizardEffect, WizardError, WizardEvent, WizardState};

/// Error types for dashboard operations
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Failed to read image '{path}': {source}")]
    ImageRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Page title cannot be empty")]
    EmptyTitle,

    #[error("Could not determine the id of new page '{0}'")]
    UnresolvedPage(String),
}

impl DashboardError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message().to_string(),
            Self::Editor(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Content of one page as shown in the main panel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageData {
    pub page_id: i64,
    pub cards: Vec<Card>,
    pub carousel: Vec<CarouselItem>,
    pub about_us: Vec<AboutUsItem>,
}

impl PageData {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty() && self.carousel.is_empty() && self.about_us.is_empty()
    }
}

/// What an applied plan did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanReport {
    pub page_id: Option<i64>,
    pub details_saved: bool,
    pub outcomes: Vec<SaveOutcome>,
    /// Components saved whose list could not be re-fetched afterwards
    pub refresh_failures: Vec<ComponentKind>,
    pub completed: bool,
}

pub struct Dashboard {
    backend: Arc<dyn ContentBackend>,
    cache: Arc<ContentCache>,
    token: Option<AuthToken>,
    config: Config,
    nav: NavState,
    tree: Vec<Page>,
    selected: Option<i64>,
    page_data: Option<PageData>,
    loading: bool,
    notice: Option<Notice>,
    layout: LayoutMode,
    sidebar_open: bool,
    wizard: Option<EditWizard>,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn ContentBackend>, config: Config) -> Self {
        let cache = Arc::new(ContentCache::new(
            backend.clone(),
            &config.cache,
            config.backend.media_origin.clone(),
        ));
        let token = config.auth.token.clone().map(AuthToken::new);
        let layout = LayoutMode::Desktop;

        Self {
            backend,
            cache,
            token,
            config,
            nav: NavState::new(),
            tree: Vec::new(),
            selected: None,
            page_data: None,
            loading: false,
            notice: None,
            layout,
            sidebar_open: layout.sidebar_open_by_default(),
            wizard: None,
        }
    }

    /// Dashboard talking to the configured HTTP backend
    pub fn connect(config: Config) -> Result<Self, ClientError> {
        let backend = Arc::new(HttpBackend::new(&config.backend)?);
        Ok(Self::new(backend, config))
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    pub fn tree(&self) -> &[Page] {
        &self.tree
    }

    pub fn selected_page(&self) -> Option<i64> {
        self.selected
    }

    pub fn page_data(&self) -> Option<&PageData> {
        self.page_data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn wizard(&self) -> Option<&EditWizard> {
        self.wizard.as_ref()
    }

    /// Current notice, unless a success notice has expired
    pub fn notice(&self) -> Option<&Notice> {
        let ttl = Duration::from_millis(self.config.dashboard.notice_ttl_ms);
        self.notice
            .as_ref()
            .filter(|notice| notice.is_visible_at(Instant::now(), ttl))
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// Re-evaluate the layout for a new viewport width
    pub fn resize(&mut self, width: u32) {
        self.layout = LayoutMode::from_width(width);
        self.sidebar_open = self.layout.sidebar_open_by_default();
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    /// Sidebar rows honoring the expand/collapse state
    pub fn sidebar_rows(&self) -> Vec<TreeRow> {
        self.nav
            .visible_rows(&self.tree, self.config.dashboard.indent_width)
    }

    /// Every page, fully expanded
    pub fn all_rows(&self) -> Vec<TreeRow> {
        tree::render_rows(&self.tree, self.config.dashboard.indent_width)
    }

    /// Load the page tree, preferring the nested navbar listing.
    pub async fn load_navigation(&mut self) -> Result<&[Page], DashboardError> {
        self.loading = true;
        let result = self.fetch_tree().await;
        self.loading = false;

        let tree = self.report(result)?;
        tracing::info!(roots = tree.len(), "Navigation loaded");
        self.tree = tree;
        Ok(&self.tree)
    }

    async fn fetch_tree(&self) -> Result<Vec<Page>, DashboardError> {
        let pages: Vec<Page> = match self.cache.load_typed(ResourceKind::Navbar).await {
            Ok(pages) if !pages.is_empty() => pages,
            Ok(_) => self.cache.load_typed(ResourceKind::Pages).await?,
            Err(e) => {
                tracing::warn!(error = %e, "Navbar unavailable, building tree from page list");
                self.cache.load_typed(ResourceKind::Pages).await?
            }
        };
        Ok(tree::build_tree(pages)?)
    }

    /// Handle a click on a sidebar row: leaves load, branches toggle.
    pub async fn select_page(&mut self, id: i64) -> Result<Selection, DashboardError> {
        let selection = self.nav.select(&self.tree, id);
        let selection = self.report(selection.map_err(DashboardError::from))?;

        if let Selection::Load(id) = selection {
            self.selected = Some(id);
            if self.layout.closes_sidebar_on_select() {
                self.sidebar_open = false;
            }
            self.load_page_data(id).await?;
        }
        Ok(selection)
    }

    /// Fetch the content of one page from the cache
    pub async fn load_page_data(&mut self, id: i64) -> Result<&PageData, DashboardError> {
        self.loading = true;
        let result = self.fetch_page_data(id).await;
        self.loading = false;

        let data = self.report(result)?;
        Ok(&*self.page_data.insert(data))
    }

    async fn fetch_page_data(&self, id: i64) -> Result<PageData, DashboardError> {
        Ok(PageData {
            page_id: id,
            cards: self.cache.filter_by_page(ResourceKind::Cards, id).await?,
            carousel: self.cache.filter_by_page(ResourceKind::Carousel, id).await?,
            about_us: self.cache.filter_by_page(ResourceKind::AboutUs, id).await?,
        })
    }

    /// The sidebar's quick "add title" action
    pub async fn add_page(&mut self, title: &str) -> Result<i64, DashboardError> {
        self.save_page_details(PageDraft {
            title: title.to_string(),
            ..PageDraft::default()
        })
        .await
    }

    /// Create or update a page and reload the navigation.
    ///
    /// Returns the page id, resolving it for newly created pages.
    pub async fn save_page_details(&mut self, draft: PageDraft) -> Result<i64, DashboardError> {
        let result = self.write_page(&draft).await;
        let id = self.report(result)?;

        self.cache.invalidate(ResourceKind::Pages).await;
        self.cache.invalidate(ResourceKind::Navbar).await;
        self.load_navigation().await?;
        if let Err(e) = self.nav.reveal(&self.tree, id) {
            tracing::debug!(id, error = %e, "Saved page not in the navigation yet");
        }
        self.notice = Some(Notice::success("Page saved successfully"));
        Ok(id)
    }

    async fn write_page(&self, draft: &PageDraft) -> Result<i64, DashboardError> {
        if draft.title.trim().is_empty() {
            return Err(DashboardError::EmptyTitle);
        }
        if let (Some(id), Some(parent)) = (draft.id, draft.parent) {
            tree::validate_parent(&self.tree, id, parent)?;
        }

        let token = self.token.as_ref();
        match draft.id {
            Some(id) => {
                self.backend.update_page(draft.to_body(), token).await?;
                tracing::info!(id, "Page updated");
                Ok(id)
            }
            None => {
                let response = self.backend.create_page(draft.to_body(), token).await?;
                let id = match created_page_id(&response) {
                    Some(id) => id,
                    None => self.find_created_page(&draft.title).await?,
                };
                tracing::info!(id, title = %draft.title, "Page created");
                Ok(id)
            }
        }
    }

    /// Newest page carrying `title`, from a fresh page list
    async fn find_created_page(&self, title: &str) -> Result<i64, DashboardError> {
        self.cache.refresh(ResourceKind::Pages).await?;
        let pages: Vec<Page> = self.cache.load_typed(ResourceKind::Pages).await?;
        pages
            .iter()
            .filter(|page| page.title.trim() == title.trim())
            .map(|page| page.id)
            .max()
            .ok_or_else(|| DashboardError::UnresolvedPage(title.to_string()))
    }

    /// Open the wizard on an existing page, or in new-page mode
    pub fn open_wizard(&mut self, page: Option<i64>) -> Result<&mut EditWizard, DashboardError> {
        let wizard = match page {
            Some(id) => {
                let page = tree::find_by_id(&self.tree, id).ok_or(TreeError::NotFound(id))?;
                EditWizard::for_page(page)
            }
            None => {
                let mut wizard = EditWizard::new();
                wizard.start_new_page()?;
                wizard
            }
        };
        if self.layout.closes_sidebar_on_select() {
            self.sidebar_open = false;
        }
        Ok(self.wizard.insert(wizard))
    }

    /// Refresh a component's list after its editor saved and redraw the page
    pub async fn on_component_saved(&mut self, kind: ComponentKind) -> Result<(), DashboardError> {
        let refreshed = self.cache.refresh(kind.resource()).await;
        self.report(refreshed.map_err(DashboardError::from))?;
        if let Some(id) = self.selected {
            self.load_page_data(id).await?;
        }
        self.notice = Some(Notice::success(format!("{} saved successfully", kind)));
        Ok(())
    }

    /// Delete one content item by id
    pub async fn delete_item(&mut self, kind: ComponentKind, id: i64) -> Result<(), DashboardError> {
        let result = match require_token(self.token.as_ref()) {
            Ok(token) => self.backend.delete(kind.resource(), id, token).await,
            Err(e) => Err(e),
        };
        self.report(result.map_err(DashboardError::from))?;

        self.cache.invalidate(kind.resource()).await;
        tracing::info!(%kind, id, "Item deleted");
        if let Some(page) = self.selected {
            self.load_page_data(page).await?;
        }
        self.notice = Some(Notice::success("Item deleted successfully"));
        Ok(())
    }

    /// Run one full wizard pass described by `plan`.
    ///
    /// Page details are written before the first editor opens; editors run
    /// in tick order. An editor failure cancels the rest of the pass.
    pub async fn apply_plan(&mut self, plan: &EditPlan) -> Result<PlanReport, DashboardError> {
        plan.validate()?;
        if self.tree.is_empty() {
            self.load_navigation().await?;
        }

        let mut wizard = self.open_wizard(plan.page)?.clone();
        let effects = match prepare_wizard(&mut wizard, plan) {
            Ok(effects) => effects,
            Err(e) => {
                cancel_wizard(&mut wizard);
                self.wizard = Some(wizard);
                return self.report(Err(e.into()));
            }
        };
        let result = self.run_wizard_effects(&mut wizard, effects, plan).await;
        self.wizard = Some(wizard);
        result
    }

    /// Execute wizard effects in order, feeding completions back in.
    ///
    /// Any failure cancels the wizard. A failed refresh after an editor saved
    /// only leaves a notice; the remaining editors still run.
    pub async fn run_wizard_effects(
        &mut self,
        wizard: &mut EditWizard,
        effects: Vec<WizardEffect>,
        plan: &EditPlan,
    ) -> Result<PlanReport, DashboardError> {
        let mut report = PlanReport {
            page_id: wizard.page_id(),
            ..PlanReport::default()
        };
        let result = self.drive_wizard(wizard, effects, plan, &mut report).await;
        if result.is_err() {
            cancel_wizard(wizard);
        }
        result.map(|()| report)
    }

    async fn drive_wizard(
        &mut self,
        wizard: &mut EditWizard,
        effects: Vec<WizardEffect>,
        plan: &EditPlan,
        report: &mut PlanReport,
    ) -> Result<(), DashboardError> {
        let mut queue: VecDeque<WizardEffect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                WizardEffect::SavePageDetails(draft) => {
                    let id = self.save_page_details(draft).await?;
                    wizard.details_saved(id);
                    report.page_id = Some(id);
                    report.details_saved = true;
                }
                WizardEffect::OpenEditor(kind) => {
                    let page = match wizard.page_id() {
                        Some(page) => page,
                        None => return self.report(Err(WizardError::NoPageSelected.into())),
                    };
                    tracing::info!(%kind, page, "Editor opened");
                    let saved = self.run_editor(kind, page, plan.edits_for(kind)).await;
                    let outcome = self.report(saved)?;
                    report.outcomes.push(outcome);
                    if let Err(e) = self.on_component_saved(outcome.kind).await {
                        tracing::warn!(%kind, error = %e, "Saved, but the page could not be refreshed");
                        report.refresh_failures.push(kind);
                    }
                    queue.extend(wizard.handle(WizardEvent::EditorCompleted(outcome.kind))?);
                }
                WizardEffect::Completed => {
                    report.completed = true;
                    if report.refresh_failures.is_empty() {
                        self.notice = Some(Notice::success("All changes saved"));
                    }
                }
                WizardEffect::Cancelled => {}
            }
        }

        Ok(())
    }

    async fn run_editor(
        &self,
        kind: ComponentKind,
        page: i64,
        edits: &[DraftEdit],
    ) -> Result<SaveOutcome, DashboardError> {
        match kind {
            ComponentKind::Cards => self.edit::<Card>(page, edits).await,
            ComponentKind::Carousel => self.edit::<CarouselItem>(page, edits).await,
            ComponentKind::AboutUs => self.edit::<AboutUsItem>(page, edits).await,
        }
    }

    async fn edit<T: EditableContent>(&self, page: i64, edits: &[DraftEdit]) -> Result<SaveOutcome, DashboardError> {
        let mut editor = ContentEditor::<T>::new(
            PageRef::from(page),
            self.cache.clone(),
            self.backend.clone(),
            self.config.images.clone(),
        );
        editor.load().await?;
        for edit in edits {
            self.apply_edit(&mut editor, edit).await?;
        }
        Ok(editor.save_all(self.token.as_ref()).await?)
    }

    async fn apply_edit<T: EditableContent>(
        &self,
        editor: &mut ContentEditor<T>,
        edit: &DraftEdit,
    ) -> Result<(), DashboardError> {
        match edit {
            DraftEdit::Add(fields) => {
                let index = editor.add();
                for (field, value) in fields {
                    editor.set_field(index, field, value.as_str())?;
                }
            }
            DraftEdit::Set { index, field, value } => {
                editor.set_field(*index, field, value.as_str())?;
            }
            DraftEdit::Remove(index) => {
                editor.remove(*index, self.token.as_ref()).await?;
            }
            DraftEdit::Image { index, path } => {
                let upload = self.read_image(path).await?;
                editor.attach_image(*index, upload)?;
            }
            DraftEdit::Module { index, title, subtitle } => {
                let module = editor.add_module(*index)?;
                editor.edit_module(*index, module, title.as_str(), subtitle.as_str())?;
            }
        }
        Ok(())
    }

    async fn read_image(&self, path: &std::path::Path) -> Result<ImageUpload, DashboardError> {
        let read_error = |source| DashboardError::ImageRead {
            path: path.display().to_string(),
            source,
        };
        let bytes = tokio::fs::read(path).await.map_err(read_error)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let content_type = self
            .config
            .images
            .mime_for_file_name(&file_name)
            .unwrap_or("application/octet-stream");
        Ok(ImageUpload::new(file_name, content_type, bytes))
    }

    /// Leave an error notice for a failed result
    fn report<T>(&mut self, result: Result<T, DashboardError>) -> Result<T, DashboardError> {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Dashboard operation failed");
            self.notice = Some(Notice::error(e.user_message()));
        }
        result
    }
}

/// Apply plan details and ticks, then press Next
fn prepare_wizard(wizard: &mut EditWizard, plan: &EditPlan) -> Result<Vec<WizardEffect>, WizardError> {
    let details = &plan.details;
    if let Some(title) = &details.title {
        wizard.set_title(title.as_str())?;
    }
    if let Some(subtitle) = &details.subtitle {
        wizard.set_subtitle(subtitle.as_str())?;
    }
    if let Some(parent) = details.parent {
        wizard.set_parent(Some(parent))?;
    }
    if let Some(nav_order) = details.nav_order {
        wizard.set_nav_order(nav_order)?;
    }
    for component in &plan.components {
        wizard.handle(WizardEvent::Toggle {
            component: component.kind,
            checked: true,
        })?;
    }
    wizard.handle(WizardEvent::Next)
}

fn cancel_wizard(wizard: &mut EditWizard) {
    if wizard.state() == WizardState::Closed {
        return;
    }
    if let Err(e) = wizard.handle(WizardEvent::Cancel) {
        tracing::warn!(error = %e, "Failed to cancel wizard");
    }
}

/// Id of a created page from the response body, if the backend returned one
fn created_page_id(response: &Value) -> Option<i64> {
    let id = response
        .get("data")
        .and_then(|data| data.get("id"))
        .or_else(|| response.get("id"))?;
    serde_json::from_value::<PageRef>(id.clone()).ok()?.as_id()
}
