//! Edit wizard
//!
//! A finite-state machine that walks one page through the editors the user
//! ticked, in the order they were ticked:
//!
//! ```text
//! ComponentSelector --Next--> Editing(first) --EditorCompleted--> Editing(next) ... --> Closed
//!         \___________________________Cancel (any state)___________________________/
//! ```
//!
//! The machine performs no I/O. [`EditWizard::handle`] returns effects that
//! the caller executes, in order, before feeding the next event.

use std::collections::VecDeque;

use crate::models::{ComponentKind, Page, PageDraft};

/// Error types for wizard transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("The wizard is closed")]
    Closed,

    #[error("{event} is not valid while {state:?}")]
    InvalidEvent { state: WizardState, event: &'static str },

    #[error("Completion of {got} received while expecting {expected:?}")]
    UnexpectedCompletion {
        expected: Option<ComponentKind>,
        got: ComponentKind,
    },

    #[error("A new page needs a title")]
    MissingTitle,

    #[error("No page selected")]
    NoPageSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    ComponentSelector,
    EditingCards,
    EditingCarousel,
    EditingAboutUs,
    Closed,
}

impl WizardState {
    fn editing(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Cards => Self::EditingCards,
            ComponentKind::Carousel => Self::EditingCarousel,
            ComponentKind::AboutUs => Self::EditingAboutUs,
        }
    }

    /// Component whose editor is open in this state
    pub fn editing_kind(&self) -> Option<ComponentKind> {
        match self {
            Self::EditingCards => Some(ComponentKind::Cards),
            Self::EditingCarousel => Some(ComponentKind::Carousel),
            Self::EditingAboutUs => Some(ComponentKind::AboutUs),
            Self::ComponentSelector | Self::Closed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEvent {
    /// A component checkbox changed
    Toggle { component: ComponentKind, checked: bool },
    Next,
    /// The open editor saved successfully
    EditorCompleted(ComponentKind),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEffect {
    /// Write the page details; must finish before the next effect runs
    SavePageDetails(PageDraft),
    OpenEditor(ComponentKind),
    Completed,
    Cancelled,
}

/// Which page the details form targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Existing(Option<i64>),
    New,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PageDetails {
    title: String,
    subtitle: String,
    parent: Option<i64>,
    nav_order: i32,
}

impl PageDetails {
    fn from_page(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            subtitle: page.subtitle.clone().unwrap_or_default(),
            parent: page.parent,
            nav_order: page.nav_order,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditWizard {
    state: WizardState,
    selected: Vec<ComponentKind>,
    pending: VecDeque<ComponentKind>,
    mode: PageMode,
    details: PageDetails,
    initial: PageDetails,
}

impl Default for EditWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl EditWizard {
    /// Wizard in existing-page mode with no page chosen yet
    pub fn new() -> Self {
        Self {
            state: WizardState::ComponentSelector,
            selected: Vec::new(),
            pending: VecDeque::new(),
            mode: PageMode::Existing(None),
            details: PageDetails::default(),
            initial: PageDetails::default(),
        }
    }

    /// Wizard opened on an existing page
    pub fn for_page(page: &Page) -> Self {
        let mut wizard = Self::new();
        wizard.load_page(page);
        wizard
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn mode(&self) -> PageMode {
        self.mode
    }

    /// Ticked components, in tick order
    pub fn selected(&self) -> &[ComponentKind] {
        &self.selected
    }

    pub fn page_id(&self) -> Option<i64> {
        match self.mode {
            PageMode::Existing(id) => id,
            PageMode::New => None,
        }
    }

    pub fn title(&self) -> &str {
        &self.details.title
    }

    /// Whether the details form differs from what was loaded or last saved
    pub fn is_dirty(&self) -> bool {
        self.details != self.initial
    }

    /// Switch the picker to an existing page and load its details
    pub fn select_page(&mut self, page: &Page) -> Result<(), WizardError> {
        self.expect_selector("select_page")?;
        self.load_page(page);
        Ok(())
    }

    /// Switch the picker to new-page mode with an empty form
    pub fn start_new_page(&mut self) -> Result<(), WizardError> {
        self.expect_selector("start_new_page")?;
        self.mode = PageMode::New;
        self.details = PageDetails::default();
        self.initial = PageDetails::default();
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), WizardError> {
        self.expect_selector("set_title")?;
        self.details.title = title.into();
        Ok(())
    }

    pub fn set_subtitle(&mut self, subtitle: impl Into<String>) -> Result<(), WizardError> {
        self.expect_selector("set_subtitle")?;
        self.details.subtitle = subtitle.into();
        Ok(())
    }

    pub fn set_parent(&mut self, parent: Option<i64>) -> Result<(), WizardError> {
        self.expect_selector("set_parent")?;
        self.details.parent = parent;
        Ok(())
    }

    pub fn set_nav_order(&mut self, nav_order: i32) -> Result<(), WizardError> {
        self.expect_selector("set_nav_order")?;
        self.details.nav_order = nav_order;
        Ok(())
    }

    /// Record that the details were written; a created page becomes the target.
    pub fn details_saved(&mut self, page_id: i64) {
        self.mode = PageMode::Existing(Some(page_id));
        self.initial = self.details.clone();
    }

    /// Apply one event and return the effects to run
    pub fn handle(&mut self, event: WizardEvent) -> Result<Vec<WizardEffect>, WizardError> {
        if self.state == WizardState::Closed {
            return Err(WizardError::Closed);
        }

        match event {
            WizardEvent::Cancel => {
                tracing::debug!(state = ?self.state, "Wizard cancelled");
                self.state = WizardState::Closed;
                self.pending.clear();
                Ok(vec![WizardEffect::Cancelled])
            }
            WizardEvent::Toggle { component, checked } => {
                self.expect_selector("Toggle")?;
                self.selected.retain(|k| *k != component);
                if checked {
                    self.selected.push(component);
                }
                Ok(Vec::new())
            }
            WizardEvent::Next => {
                self.expect_selector("Next")?;
                self.next()
            }
            WizardEvent::EditorCompleted(got) => {
                let expected = self.state.editing_kind();
                if expected != Some(got) {
                    return Err(WizardError::UnexpectedCompletion { expected, got });
                }
                Ok(vec![self.advance()])
            }
        }
    }

    fn next(&mut self) -> Result<Vec<WizardEffect>, WizardError> {
        if self.selected.is_empty() {
            return Ok(Vec::new());
        }

        let mut effects = Vec::new();
        match self.mode {
            PageMode::New => {
                if self.details.title.trim().is_empty() {
                    return Err(WizardError::MissingTitle);
                }
                effects.push(WizardEffect::SavePageDetails(self.draft(None)));
            }
            PageMode::Existing(None) => return Err(WizardError::NoPageSelected),
            PageMode::Existing(Some(id)) => {
                if self.is_dirty() {
                    effects.push(WizardEffect::SavePageDetails(self.draft(Some(id))));
                }
            }
        }

        self.pending = self.selected.iter().copied().collect();
        effects.push(self.advance());
        Ok(effects)
    }

    fn advance(&mut self) -> WizardEffect {
        match self.pending.pop_front() {
            Some(kind) => {
                self.state = WizardState::editing(kind);
                WizardEffect::OpenEditor(kind)
            }
            None => {
                self.state = WizardState::Closed;
                WizardEffect::Completed
            }
        }
    }

    fn draft(&self, id: Option<i64>) -> PageDraft {
        let subtitle = self.details.subtitle.trim();
        PageDraft {
            id,
            title: self.details.title.trim().to_string(),
            subtitle: (!subtitle.is_empty()).then(|| subtitle.to_string()),
            parent: self.details.parent,
            nav_order: self.details.nav_order,
        }
    }

    fn load_page(&mut self, page: &Page) {
        self.mode = PageMode::Existing(Some(page.id));
        self.details = PageDetails::from_page(page);
        self.initial = self.details.clone();
    }

    fn expect_selector(&self, event: &'static str) -> Result<(), WizardError> {
        match self.state {
            WizardState::ComponentSelector => Ok(()),
            WizardState::Closed => Err(WizardError::Closed),
            state => Err(WizardError::InvalidEvent { state, event }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(wizard: &mut EditWizard, kinds: &[ComponentKind]) {
        for &component in kinds {
            wizard
                .handle(WizardEvent::Toggle { component, checked: true })
                .unwrap();
        }
    }

    fn page() -> Page {
        let mut page = Page::new(4, "Events");
        page.subtitle = Some("What's on".into());
        page.nav_order = 2;
        page
    }

    #[test]
    fn test_editors_follow_tick_order() {
        let mut wizard = EditWizard::for_page(&page());
        tick(&mut wizard, &[ComponentKind::Carousel, ComponentKind::Cards]);

        let effects = wizard.handle(WizardEvent::Next).unwrap();
        assert_eq!(effects, vec![WizardEffect::OpenEditor(ComponentKind::Carousel)]);
        assert_eq!(wizard.state(), WizardState::EditingCarousel);

        let effects = wizard
            .handle(WizardEvent::EditorCompleted(ComponentKind::Carousel))
            .unwrap();
        assert_eq!(effects, vec![WizardEffect::OpenEditor(ComponentKind::Cards)]);
        assert_eq!(wizard.state(), WizardState::EditingCards);

        let effects = wizard
            .handle(WizardEvent::EditorCompleted(ComponentKind::Cards))
            .unwrap();
        assert_eq!(effects, vec![WizardEffect::Completed]);
        assert_eq!(wizard.state(), WizardState::Closed);
    }

    #[test]
    fn test_untick_and_retick_moves_to_end() {
        let mut wizard = EditWizard::for_page(&page());
        tick(
            &mut wizard,
            &[ComponentKind::Cards, ComponentKind::AboutUs, ComponentKind::Carousel],
        );
        wizard
            .handle(WizardEvent::Toggle {
                component: ComponentKind::Cards,
                checked: false,
            })
            .unwrap();
        tick(&mut wizard, &[ComponentKind::Cards]);

        assert_eq!(
            wizard.selected(),
            &[ComponentKind::AboutUs, ComponentKind::Carousel, ComponentKind::Cards]
        );
    }

    #[test]
    fn test_next_without_selection_is_noop() {
        let mut wizard = EditWizard::for_page(&page());
        assert!(wizard.handle(WizardEvent::Next).unwrap().is_empty());
        assert_eq!(wizard.state(), WizardState::ComponentSelector);
    }

    #[test]
    fn test_changed_details_saved_before_first_editor() {
        let mut wizard = EditWizard::for_page(&page());
        tick(&mut wizard, &[ComponentKind::Cards]);
        wizard.set_title("Upcoming events").unwrap();

        let effects = wizard.handle(WizardEvent::Next).unwrap();

        assert_eq!(
            effects,
            vec![
                WizardEffect::SavePageDetails(PageDraft {
                    id: Some(4),
                    title: "Upcoming events".into(),
                    subtitle: Some("What's on".into()),
                    parent: None,
                    nav_order: 2,
                }),
                WizardEffect::OpenEditor(ComponentKind::Cards),
            ]
        );
    }

    #[test]
    fn test_reverting_a_field_is_not_a_change() {
        let mut wizard = EditWizard::for_page(&page());
        tick(&mut wizard, &[ComponentKind::Cards]);
        wizard.set_nav_order(9).unwrap();
        wizard.set_nav_order(2).unwrap();

        assert!(!wizard.is_dirty());
        let effects = wizard.handle(WizardEvent::Next).unwrap();
        assert_eq!(effects, vec![WizardEffect::OpenEditor(ComponentKind::Cards)]);
    }

    #[test]
    fn test_new_page_requires_title() {
        let mut wizard = EditWizard::new();
        wizard.start_new_page().unwrap();
        tick(&mut wizard, &[ComponentKind::AboutUs]);

        assert_eq!(wizard.handle(WizardEvent::Next), Err(WizardError::MissingTitle));

        wizard.set_title("Team").unwrap();
        wizard.set_parent(Some(1)).unwrap();
        let effects = wizard.handle(WizardEvent::Next).unwrap();
        assert_eq!(
            effects[0],
            WizardEffect::SavePageDetails(PageDraft {
                id: None,
                title: "Team".into(),
                subtitle: None,
                parent: Some(1),
                nav_order: 0,
            })
        );

        wizard.details_saved(31);
        assert_eq!(wizard.page_id(), Some(31));
        assert!(!wizard.is_dirty());
    }

    #[test]
    fn test_existing_mode_needs_a_page() {
        let mut wizard = EditWizard::new();
        tick(&mut wizard, &[ComponentKind::Cards]);
        assert_eq!(wizard.handle(WizardEvent::Next), Err(WizardError::NoPageSelected));
    }

    #[test]
    fn test_cancel_closes_from_any_state() {
        let mut wizard = EditWizard::for_page(&page());
        tick(&mut wizard, &[ComponentKind::Cards, ComponentKind::Carousel]);
        wizard.handle(WizardEvent::Next).unwrap();

        assert_eq!(wizard.handle(WizardEvent::Cancel).unwrap(), vec![WizardEffect::Cancelled]);
        assert_eq!(wizard.state(), WizardState::Closed);
        assert_eq!(
            wizard.handle(WizardEvent::EditorCompleted(ComponentKind::Cards)),
            Err(WizardError::Closed)
        );
        assert_eq!(wizard.set_title("x"), Err(WizardError::Closed));
    }

    #[test]
    fn test_rejects_out_of_place_events() {
        let mut wizard = EditWizard::for_page(&page());
        assert_eq!(
            wizard.handle(WizardEvent::EditorCompleted(ComponentKind::Cards)),
            Err(WizardError::UnexpectedCompletion {
                expected: None,
                got: ComponentKind::Cards
            })
        );

        tick(&mut wizard, &[ComponentKind::Cards]);
        wizard.handle(WizardEvent::Next).unwrap();

        assert_eq!(
            wizard.handle(WizardEvent::EditorCompleted(ComponentKind::AboutUs)),
            Err(WizardError::UnexpectedCompletion {
                expected: Some(ComponentKind::Cards),
                got: ComponentKind::AboutUs
            })
        );
        assert!(matches!(
            wizard.handle(WizardEvent::Next),
            Err(WizardError::InvalidEvent { event: "Next", .. })
        ));
        assert!(matches!(
            wizard.set_title("late"),
            Err(WizardError::InvalidEvent { .. })
        ));
    }
}
